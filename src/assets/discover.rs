use std::path::{Path, PathBuf};

use anyhow::Context as _;

use crate::foundation::error::{ChromacutError, ChromacutResult};

/// A raster found under a root directory.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DiscoveredAsset {
    /// Absolute (or root-joined) path on disk.
    pub path: PathBuf,
    /// Path relative to the discovery root.
    pub rel: PathBuf,
}

/// Recursively collect files under `root` accepted by `accept`, sorted by relative path.
///
/// Fails with [`ChromacutError::MissingRoot`] when `root` is not a directory; unreadable
/// subdirectories are skipped.
pub fn discover(root: &Path, accept: impl Fn(&Path) -> bool) -> ChromacutResult<Vec<DiscoveredAsset>> {
    if !root.is_dir() {
        return Err(ChromacutError::MissingRoot(root.to_path_buf()));
    }

    let mut out = Vec::new();
    let mut pending = vec![root.to_path_buf()];
    while let Some(dir) = pending.pop() {
        let rd = match std::fs::read_dir(&dir) {
            Ok(rd) => rd,
            Err(e) if dir == root => {
                return Err(anyhow::Error::new(e)
                    .context(format!("read directory '{}'", dir.display()))
                    .into());
            }
            Err(e) => {
                tracing::warn!(dir = %dir.display(), error = %e, "skipping unreadable directory");
                continue;
            }
        };

        for entry in rd.flatten() {
            let path = entry.path();
            let file_type = entry
                .file_type()
                .with_context(|| format!("stat '{}'", path.display()))?;
            if file_type.is_dir() {
                pending.push(path);
                continue;
            }
            if !accept(&path) {
                continue;
            }
            let rel = path
                .strip_prefix(root)
                .map(Path::to_path_buf)
                .with_context(|| format!("relativize '{}'", path.display()))?;
            out.push(DiscoveredAsset { path, rel });
        }
    }

    out.sort_by(|a, b| a.rel.cmp(&b.rel));
    Ok(out)
}

#[cfg(test)]
#[path = "../../tests/unit/assets/discover.rs"]
mod tests;
