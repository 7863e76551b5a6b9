use anyhow::Context;
use archguard_types::{ModuleCatalog, RepoPath, TypeDescriptor, namespace_of, simple_name_of};

/// Parse one module catalog and normalize its types.
///
/// Types without a `name` or `namespace` get them derived from `full_name`. Types without a
/// `source` are attributed to the catalog file itself.
pub fn parse_module_catalog(path: &RepoPath, text: &str) -> anyhow::Result<ModuleCatalog> {
    let mut catalog: ModuleCatalog =
        serde_json::from_str(text).with_context(|| format!("parse {}", path.as_str()))?;

    for (i, ty) in catalog.types.iter_mut().enumerate() {
        if ty.full_name.trim().is_empty() {
            anyhow::bail!("{}: type #{i} has an empty full_name", path.as_str());
        }
        normalize(ty, path);
    }

    Ok(catalog)
}

fn normalize(ty: &mut TypeDescriptor, path: &RepoPath) {
    if ty.name.is_empty() {
        ty.name = simple_name_of(&ty.full_name).to_string();
    }
    if ty.namespace.is_empty() {
        ty.namespace = namespace_of(&ty.full_name).to_string();
    }
    if ty.source.is_none() {
        ty.source = Some(path.clone());
    }
}
