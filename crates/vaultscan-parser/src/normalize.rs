//! Reference target normalization and classification.
//!
//! Pure string functions: no filesystem access, no allocation beyond the
//! returned values.

use vaultscan_core::{LinkClass, ScanConfig};

/// Byte index of the first heading (`#`) or block (`^`) marker.
fn fragment_start(raw: &str) -> Option<usize> {
    raw.find(['#', '^'])
}

/// Drop everything from the first `#` or `^`.
///
/// Returns an empty string for same-file heading links. Idempotent.
///
/// ```
/// use vaultscan_parser::normalize;
///
/// assert_eq!(normalize("Note#Heading"), "Note");
/// assert_eq!(normalize("Note#^block"), "Note");
/// assert_eq!(normalize("#Heading"), "");
/// assert_eq!(normalize(normalize("a^b#c")), "a");
/// ```
pub fn normalize(raw: &str) -> &str {
    split_fragment(raw).0
}

/// Split into (base, fragment) at the first `#` or `^`.
pub fn split_fragment(raw: &str) -> (&str, &str) {
    match fragment_start(raw) {
        Some(idx) => raw.split_at(idx),
        None => (raw, ""),
    }
}

/// URL schemes and mail links are never resolved against the vault.
pub fn is_external(raw: &str) -> bool {
    raw.contains("://") || raw.to_ascii_lowercase().starts_with("mailto:")
}

/// Lowercase extension of the last path segment, if any
pub fn last_segment_extension(raw: &str) -> Option<String> {
    let segment = raw.rsplit('/').next().unwrap_or(raw);
    let (stem, ext) = segment.rsplit_once('.')?;
    if stem.is_empty() || ext.is_empty() {
        return None;
    }
    Some(ext.to_lowercase())
}

/// Classify a raw target.
///
/// Order is fixed: external, folder, asset, note.
pub fn classify(raw: &str, config: &ScanConfig) -> LinkClass {
    if is_external(raw) {
        return LinkClass::External;
    }
    if raw.ends_with('/') {
        return LinkClass::Folder;
    }
    if let Some(ext) = last_segment_extension(raw)
        && config.is_asset_extension(&ext)
    {
        return LinkClass::Asset;
    }
    LinkClass::Note
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_strips_earliest_marker() {
        assert_eq!(normalize("note"), "note");
        assert_eq!(normalize("note#h1"), "note");
        assert_eq!(normalize("note^abc"), "note");
        assert_eq!(normalize("a^b#c"), "a");
        assert_eq!(normalize("a#b^c"), "a");
        assert_eq!(normalize("#heading"), "");
        assert_eq!(normalize(""), "");
    }

    #[test]
    fn test_normalize_idempotent() {
        for raw in ["x#y", "x^y", "dir/x#^blk", "#", "^", "plain", "a/b/"] {
            let once = normalize(raw);
            assert_eq!(normalize(once), once, "not idempotent for {raw:?}");
        }
    }

    #[test]
    fn test_split_fragment_recombines() {
        for raw in ["note#Heading", "dir/note#^id", "note", "#top"] {
            let (base, fragment) = split_fragment(raw);
            assert_eq!(format!("{base}{fragment}"), raw);
        }
        assert_eq!(split_fragment("n#^id"), ("n", "#^id"));
    }

    #[test]
    fn test_classify_order() {
        let config = ScanConfig::default();
        assert_eq!(classify("https://example.com/a.png", &config), LinkClass::External);
        assert_eq!(classify("MAILTO:me@example.com", &config), LinkClass::External);
        assert_eq!(classify("assets/", &config), LinkClass::Folder);
        assert_eq!(classify("images/logo.PNG", &config), LinkClass::Asset);
        assert_eq!(classify("paper.pdf", &config), LinkClass::Asset);
        assert_eq!(classify("note", &config), LinkClass::Note);
        assert_eq!(classify("v1.2/note", &config), LinkClass::Note);
        assert_eq!(classify("note.md", &config), LinkClass::Note);
        assert_eq!(classify(".png", &config), LinkClass::Note);
    }

    #[test]
    fn test_custom_asset_extension() {
        let config = ScanConfig::builder().asset_extension("heic").build().unwrap();
        assert_eq!(classify("photo.HEIC", &config), LinkClass::Asset);
    }
}
