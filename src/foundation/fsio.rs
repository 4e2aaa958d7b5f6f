use std::{io::Write as _, path::Path, time::SystemTime};

use anyhow::Context as _;

use crate::foundation::error::ChromacutResult;

/// Create the parent directory of `path` if it has one.
pub fn ensure_parent_dir(path: &Path) -> ChromacutResult<()> {
    if let Some(parent) = path.parent() {
        if parent.as_os_str().is_empty() {
            return Ok(());
        }
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create output directory '{}'", parent.display()))?;
    }
    Ok(())
}

/// Write `bytes` to a uniquely named sibling temp file, then rename it over `path`.
///
/// Readers observe either the previous file or the complete new one, even when several writers
/// target the same path concurrently.
pub fn write_atomic(path: &Path, bytes: &[u8]) -> ChromacutResult<()> {
    ensure_parent_dir(path)?;
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let mut tmp = tempfile::NamedTempFile::new_in(dir)
        .with_context(|| format!("create temp file in '{}'", dir.display()))?;
    tmp.write_all(bytes)
        .with_context(|| format!("write temp file '{}'", tmp.path().display()))?;
    tmp.persist(path)
        .map_err(|e| anyhow::Error::new(e.error))
        .with_context(|| format!("replace '{}'", path.display()))?;
    Ok(())
}

/// Last-modified time, or `None` when the file does not exist.
pub fn modified_time(path: &Path) -> ChromacutResult<Option<SystemTime>> {
    match std::fs::metadata(path) {
        Ok(meta) => {
            let t = meta
                .modified()
                .with_context(|| format!("read mtime of '{}'", path.display()))?;
            Ok(Some(t))
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(e) => {
            Err(anyhow::Error::new(e).context(format!("stat '{}'", path.display())).into())
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/fsio.rs"]
mod tests;
