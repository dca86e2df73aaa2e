use std::path::Path;

/// Normalize path separators to forward slashes.
#[must_use]
pub fn normalize_separators(path: &str) -> String {
    path.replace('\\', "/")
}

/// Format a path relative to `root` with forward-slash separators.
///
/// Falls back to the path as-is (normalized) when it is not a child of
/// `root`. Returns `"."` for an empty relative path.
#[must_use]
pub fn relative_display(path: &Path, root: &Path) -> String {
    let rel = path.strip_prefix(root).unwrap_or(path);
    let result = normalize_separators(&rel.to_string_lossy());
    if result.is_empty() {
        ".".to_string()
    } else {
        result
    }
}
