use archguard_types::RepoPath;
use camino::{Utf8Path, Utf8PathBuf};
use std::path::PathBuf;
use walkdir::WalkDir;

/// File suffix of per-module catalogs inside a catalog directory.
pub const CATALOG_SUFFIX: &str = ".types.json";

/// Discover `*.types.json` files under `root`, as paths relative to `root`.
///
/// Hidden directories (`.git`, `.cache`, ...) are skipped. The result is sorted so that load
/// order does not depend on filesystem traversal order.
pub fn discover_catalog_files(root: &Utf8Path) -> anyhow::Result<Vec<RepoPath>> {
    if !root.is_dir() {
        anyhow::bail!("catalog directory not found: {root}");
    }

    let mut out: Vec<RepoPath> = WalkDir::new(root)
        .into_iter()
        .filter_entry(|e| e.depth() == 0 || !is_hidden(e.file_name()))
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .filter_map(|e| pathbuf_to_utf8(e.path().to_path_buf()))
        .filter(|abs| abs.as_str().ends_with(CATALOG_SUFFIX))
        .map(|abs| RepoPath::relative_to(&abs, root))
        .collect();

    // Stable order.
    out.sort();
    out.dedup();

    Ok(out)
}

fn is_hidden(name: &std::ffi::OsStr) -> bool {
    name.to_str().is_some_and(|s| s.starts_with('.'))
}

fn pathbuf_to_utf8(path: PathBuf) -> Option<Utf8PathBuf> {
    Utf8PathBuf::from_path_buf(path).ok()
}
