//! Content discovery by filesystem walking.
//!
//! Finds markdown files under the content directory and maps each one to the
//! page path it is served under. No file is read at this stage.

use std::fs;
use std::path::{Path, PathBuf};

/// Location of one content file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ContentRef {
    /// Page path relative to the language/version prefix (e.g., "", "get-started/quickstart").
    pub page_path: String,
    /// Path to the markdown file.
    pub file_path: PathBuf,
}

/// Walk `content_dir` and return a reference for every markdown file.
///
/// `index.md` maps to its directory's path. Hidden files and directories are
/// skipped. Returns an empty Vec if the directory doesn't exist. Results are
/// sorted by page path.
pub(crate) fn scan(content_dir: &Path) -> Vec<ContentRef> {
    let mut refs = Vec::new();
    if content_dir.is_dir() {
        scan_directory(content_dir, "", &mut refs);
    }
    refs.sort_by(|a, b| a.page_path.cmp(&b.page_path));
    refs
}

fn scan_directory(dir_path: &Path, url_prefix: &str, refs: &mut Vec<ContentRef>) {
    let Ok(entries) = fs::read_dir(dir_path) else {
        return;
    };

    for entry in entries.filter_map(Result::ok) {
        let name = entry.file_name().to_string_lossy().into_owned();
        if name.starts_with('.') {
            continue;
        }

        let path = entry.path();
        if entry.file_type().is_ok_and(|t| t.is_dir()) {
            scan_directory(&path, &join_url(url_prefix, &name), refs);
        } else if path.extension().is_some_and(|e| e == "md") {
            refs.push(ContentRef {
                page_path: file_name_to_url(&name, url_prefix),
                file_path: path,
            });
        }
    }
}

/// Convert a markdown file name to a page path under `base`.
///
/// - `index.md`, base `""` -> `""`
/// - `guide.md`, base `""` -> `"guide"`
/// - `index.md`, base `"domain"` -> `"domain"`
/// - `setup.md`, base `"domain"` -> `"domain/setup"`
fn file_name_to_url(file_name: &str, base: &str) -> String {
    let stem = file_name.strip_suffix(".md").unwrap_or(file_name);
    if stem.eq_ignore_ascii_case("index") {
        base.to_owned()
    } else {
        join_url(base, stem)
    }
}

fn join_url(base: &str, segment: &str) -> String {
    if base.is_empty() {
        segment.to_owned()
    } else {
        format!("{base}/{segment}")
    }
}
