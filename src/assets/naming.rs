//! Pure naming rules linking blue-screen sources, derived artifacts and sidecars.

use std::path::{Path, PathBuf};

/// Extensions (lowercase) accepted as source rasters.
pub const SOURCE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg"];

/// Extension of every derived artifact.
pub const OUTPUT_EXTENSION: &str = "png";

/// Which `blue` token was stripped from a file stem.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BlueToken {
    /// `name-blue`
    HyphenSuffix,
    /// `nameblue`
    Suffix,
    /// `blue-name`
    HyphenPrefix,
}

/// Strip the first matching `blue` token from `stem`, case-insensitively.
///
/// Rules are tried in priority order `-blue` suffix, `blue` suffix, `blue-` prefix. A strip that
/// would leave an empty stem is not applied.
pub fn strip_blue_token(stem: &str) -> (&str, Option<BlueToken>) {
    let rules: [(BlueToken, &str); 3] = [
        (BlueToken::HyphenSuffix, "-blue"),
        (BlueToken::Suffix, "blue"),
        (BlueToken::HyphenPrefix, "blue-"),
    ];
    for (token, pat) in rules {
        let stripped = match token {
            BlueToken::HyphenSuffix | BlueToken::Suffix => strip_suffix_ignore_case(stem, pat),
            BlueToken::HyphenPrefix => strip_prefix_ignore_case(stem, pat),
        };
        if let Some(rest) = stripped {
            if rest.is_empty() {
                return (stem, None);
            }
            return (rest, Some(token));
        }
    }
    (stem, None)
}

/// Canonical derived file name for a source file name (`logo-blue.jpg` -> `logo.png`).
pub fn output_file_name(file_name: &str) -> String {
    let path = Path::new(file_name);
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy())
        .unwrap_or_default();
    let (stem, _) = strip_blue_token(&stem);
    format!("{stem}.{OUTPUT_EXTENSION}")
}

/// Derived path relative to an output root, keeping the source's subdirectories.
pub fn output_rel_path(source_rel: &Path) -> PathBuf {
    let name = source_rel
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let out_name = output_file_name(&name);
    match source_rel.parent() {
        Some(dir) => dir.join(out_name),
        None => PathBuf::from(out_name),
    }
}

/// `true` when the file extension is one of [`SOURCE_EXTENSIONS`].
pub fn is_source_raster(path: &Path) -> bool {
    has_extension(path, SOURCE_EXTENSIONS)
}

/// `true` for derived artifacts (`.png`, any case).
pub fn is_output_raster(path: &Path) -> bool {
    has_extension(path, &[OUTPUT_EXTENSION])
}

/// Sidecar JSON beside an asset: `<asset-filename>.json`.
pub fn sidecar_path(asset: &Path) -> PathBuf {
    let mut name = asset
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(".json");
    asset.with_file_name(name)
}

/// Source paths (relative to the source root) that may have produced `output_rel`.
///
/// Inverse of [`output_rel_path`] for the two conventions in use, each tried across
/// [`SOURCE_EXTENSIONS`]: every `name-blue.*` candidate comes before any `name.*` one.
pub fn source_candidates(output_rel: &Path) -> Vec<PathBuf> {
    let stem = output_rel
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let dir = output_rel.parent().map(Path::to_path_buf).unwrap_or_default();
    [format!("{stem}-blue"), stem]
        .iter()
        .flat_map(|base| {
            SOURCE_EXTENSIONS
                .iter()
                .map(|ext| dir.join(format!("{base}.{ext}")))
                .collect::<Vec<_>>()
        })
        .collect()
}

fn has_extension(path: &Path, exts: &[&str]) -> bool {
    let Some(ext) = path.extension().and_then(|s| s.to_str()) else {
        return false;
    };
    exts.iter().any(|e| ext.eq_ignore_ascii_case(e))
}

fn strip_suffix_ignore_case<'a>(s: &'a str, pat: &str) -> Option<&'a str> {
    let cut = s.len().checked_sub(pat.len())?;
    if !s.is_char_boundary(cut) || !s[cut..].eq_ignore_ascii_case(pat) {
        return None;
    }
    Some(&s[..cut])
}

fn strip_prefix_ignore_case<'a>(s: &'a str, pat: &str) -> Option<&'a str> {
    if s.len() < pat.len() || !s.is_char_boundary(pat.len()) {
        return None;
    }
    if !s[..pat.len()].eq_ignore_ascii_case(pat) {
        return None;
    }
    Some(&s[pat.len()..])
}

#[cfg(test)]
#[path = "../../tests/unit/assets/naming.rs"]
mod tests;
