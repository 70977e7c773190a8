//! Path utilities.
//!
//! This module consolidates all path-related logic for:
//! - Cross-platform path normalization
//! - Path traversal validation before files are rewritten
//! - Java source discovery with gitignore support

use crate::constants::{DEFAULT_EXCLUDE_FOLDERS, JAVA_EXTENSION};

/// Normalizes a path for CLI display.
///
/// - Converts backslashes to forward slashes (for cross-platform consistency)
/// - Strips leading "./" or ".\" prefix (for cleaner output)
///
/// # Examples
/// ```
/// use std::path::Path;
/// use throwstrip::utils::normalize_display_path;
///
/// assert_eq!(normalize_display_path(Path::new(".\\src\\A.java")), "src/A.java");
/// assert_eq!(normalize_display_path(Path::new("./src/B.java")), "src/B.java");
/// ```
#[must_use]
pub fn normalize_display_path(path: &std::path::Path) -> String {
    let s = path.to_string_lossy();
    // Strip Windows extended path prefix if present
    let clean = s.trim_start_matches(r"\\?\");
    let normalized = clean.replace('\\', "/");
    normalized
        .strip_prefix("./")
        .unwrap_or(&normalized)
        .to_owned()
}

/// Checks if a name matches any exclusion pattern.
/// Supports exact matching and wildcard patterns starting with `*.`.
#[must_use]
pub fn is_excluded(name: &str, excludes: &[String]) -> bool {
    excludes.iter().any(|exclude| {
        match exclude.strip_prefix('*').filter(|s| s.starts_with('.')) {
            Some(suffix) => name.ends_with(suffix),
            None => name == exclude,
        }
    })
}

/// Validates that a path is contained within an allowed root directory.
///
/// Every file is checked before it is overwritten, so a symlink inside the
/// tree cannot redirect a write outside of it.
///
/// # Errors
///
/// Returns an error if the path or root cannot be canonicalized,
/// or if the path lies outside the root.
pub fn validate_path_within_root(
    path: &std::path::Path,
    root: &std::path::Path,
) -> anyhow::Result<std::path::PathBuf> {
    let canonical_path = path
        .canonicalize()
        .map_err(|e| anyhow::anyhow!("Failed to resolve path {}: {}", path.display(), e))?;
    let canonical_root = root
        .canonicalize()
        .map_err(|e| anyhow::anyhow!("Failed to resolve root {}: {}", root.display(), e))?;

    if canonical_path.starts_with(&canonical_root) {
        Ok(canonical_path)
    } else {
        anyhow::bail!(
            "Path traversal detected: {} is outside of {}",
            path.display(),
            root.display()
        )
    }
}

/// Collects `.java` files below `root` with gitignore support.
///
/// Uses the `ignore` crate to respect .gitignore, .git/info/exclude and the
/// global gitignore in addition to the default build-output exclusions.
///
/// # Arguments
/// * `root` - Root directory to search
/// * `exclude` - Additional user-specified exclusion patterns
/// * `include` - Folders to force-include (overrides excludes)
///
/// # Returns
/// Tuple of (Java files found in walk order, directory count)
#[must_use]
pub fn collect_java_files_gitignore(
    root: &std::path::Path,
    exclude: &[String],
    include: &[String],
) -> (Vec<std::path::PathBuf>, usize) {
    use ignore::WalkBuilder;

    let mut all_excludes: Vec<String> = exclude
        .iter()
        .cloned()
        .chain(DEFAULT_EXCLUDE_FOLDERS().iter().map(|&s| s.to_owned()))
        .collect();
    all_excludes.retain(|ex| !include.iter().any(|inc| ex == inc));

    let root_for_filter = root.to_path_buf();

    // filter_entry prunes excluded directories before descending into them.
    let walker = WalkBuilder::new(root)
        .hidden(false)
        .git_ignore(true)
        .git_global(true)
        .git_exclude(true)
        .sort_by_file_path(|a, b| a.cmp(b))
        .filter_entry(move |entry| {
            if entry.path() == root_for_filter {
                return true;
            }
            if !entry.file_type().is_some_and(|ft| ft.is_dir()) {
                return true;
            }
            entry
                .file_name()
                .to_str()
                .is_none_or(|name| !is_excluded(name, &all_excludes))
        })
        .build();

    let mut files = Vec::new();
    let mut dir_count = 0;

    for result in walker {
        match result {
            Ok(entry) => {
                let path = entry.path();
                if entry.file_type().is_some_and(|ft| ft.is_dir()) {
                    if path != root {
                        dir_count += 1;
                    }
                    continue;
                }
                if path.extension().is_some_and(|ext| ext == JAVA_EXTENSION) {
                    files.push(path.to_path_buf());
                }
            }
            Err(err) => tracing::debug!(error = %err, "walk error"),
        }
    }

    (files, dir_count)
}
