//! Page identifier normalization.

/// Canonical form of a page id.
///
/// Page ids show up both dashed (`0e6b3e3d-4a4c-...`) and bare
/// (`0e6b3e3d4a4c...`), in either case. The canonical form is trimmed,
/// lower-cased and dash-free.
#[must_use]
pub fn normalize_id(id: &str) -> String {
    id.trim()
        .chars()
        .filter(|c| *c != '-')
        .map(|c| c.to_ascii_lowercase())
        .collect()
}
