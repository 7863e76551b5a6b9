//! Type catalog adapters: discover and read the JSON catalogs an external metadata extractor
//! writes for compiled modules.
//!
//! This crate is allowed to do filesystem IO. It never loads or inspects binaries itself.

#![forbid(unsafe_code)]

mod discover;
mod parse;

use anyhow::Context;
use archguard_domain::dependency::in_namespace;
use archguard_types::{RepoPath, TypeDescriptor};
use camino::{Utf8Path, Utf8PathBuf};
use rayon::prelude::*;
use std::collections::BTreeSet;

pub use discover::{CATALOG_SUFFIX, discover_catalog_files};
pub use parse::parse_module_catalog;

/// Where type descriptors come from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CatalogSource {
    /// A single catalog file.
    File(Utf8PathBuf),
    /// A directory searched recursively for `*.types.json`.
    Directory(Utf8PathBuf),
}

impl CatalogSource {
    /// Directories become [`CatalogSource::Directory`]; anything else is treated as a file.
    pub fn detect(path: impl Into<Utf8PathBuf>) -> Self {
        let path = path.into();
        if path.is_dir() {
            CatalogSource::Directory(path)
        } else {
            CatalogSource::File(path)
        }
    }

    pub fn path(&self) -> &Utf8Path {
        match self {
            CatalogSource::File(p) | CatalogSource::Directory(p) => p,
        }
    }
}

/// Load every type descriptor from `source`.
///
/// Files are read in parallel but the result is ordered by catalog path, then by declaration
/// order inside each file. When `namespaces` is non-empty only types in one of them (or a
/// nested namespace) are kept. A full name seen twice keeps its first occurrence.
pub fn load_types(
    source: &CatalogSource,
    namespaces: &[String],
) -> anyhow::Result<Vec<TypeDescriptor>> {
    let (root, files) = match source {
        CatalogSource::File(path) => {
            let root = path.parent().map(Utf8Path::to_path_buf).unwrap_or_default();
            let rel = RepoPath::relative_to(path, &root);
            (root, vec![rel])
        }
        CatalogSource::Directory(dir) => {
            let files = discover_catalog_files(dir).context("discover type catalogs")?;
            (dir.clone(), files)
        }
    };
    tracing::debug!(root = %root, files = files.len(), "loading type catalogs");

    let modules = files
        .par_iter()
        .map(|rel| {
            let abs = root.join(rel.as_str());
            let text =
                std::fs::read_to_string(&abs).with_context(|| format!("read {abs}"))?;
            parse_module_catalog(rel, &text)
        })
        .collect::<anyhow::Result<Vec<_>>>()?;

    let mut seen = BTreeSet::new();
    let mut out = Vec::new();
    for module in modules {
        tracing::trace!(module = %module.module, types = module.types.len(), "module loaded");
        for ty in module.types {
            if !namespaces.is_empty() && !namespaces.iter().any(|ns| in_namespace(&ty.namespace, ns))
            {
                continue;
            }
            if !seen.insert(ty.full_name.clone()) {
                tracing::warn!(full_name = %ty.full_name, "duplicate type in catalog; keeping the first");
                continue;
            }
            out.push(ty);
        }
    }

    tracing::debug!(types = out.len(), "type catalogs loaded");
    Ok(out)
}
