//! Site data files under `data/`.
//!
//! - `versions.yaml`: version id to `{ versionTitle }`
//! - `redirects.yaml`: old page path to new page path
//! - `graphql/<version>/prerendered-*.html`: reference fragments per version

use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::io;
use std::path::Path;
use std::sync::Arc;

use rw_pages::{PrerenderedReference, VersionCatalog, VersionCatalogEntry};
use serde::Deserialize;

use crate::error::SiteError;

const VERSIONS_FILE: &str = "versions.yaml";
const REDIRECTS_FILE: &str = "redirects.yaml";
const GRAPHQL_DIR: &str = "graphql";

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct VersionEntryRaw {
    version_title: String,
}

/// Read a data file, treating a missing file as absent.
fn read_optional(path: &Path) -> Result<Option<String>, SiteError> {
    match fs::read_to_string(path) {
        Ok(content) => Ok(Some(content)),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(SiteError::io(path, e)),
    }
}

fn parse_yaml<T: for<'de> Deserialize<'de>>(content: &str, path: &Path) -> Result<T, SiteError> {
    serde_yaml::from_str(content).map_err(|e| SiteError::Data {
        path: path.to_path_buf(),
        message: e.to_string(),
    })
}

/// Load the version catalog. A missing file yields an empty catalog.
pub(crate) fn load_versions(data_dir: &Path) -> Result<VersionCatalog, SiteError> {
    let path = data_dir.join(VERSIONS_FILE);
    let Some(content) = read_optional(&path)? else {
        return Ok(VersionCatalog::new());
    };
    let raw: BTreeMap<String, VersionEntryRaw> = parse_yaml(&content, &path)?;
    Ok(raw
        .into_iter()
        .map(|(id, entry)| {
            (
                id,
                VersionCatalogEntry {
                    version_title: entry.version_title,
                },
            )
        })
        .collect())
}

/// Load the redirect table with both sides normalized to page paths.
pub(crate) fn load_redirects(data_dir: &Path) -> Result<HashMap<String, String>, SiteError> {
    let path = data_dir.join(REDIRECTS_FILE);
    let Some(content) = read_optional(&path)? else {
        return Ok(HashMap::new());
    };
    let raw: BTreeMap<String, String> = parse_yaml(&content, &path)?;
    Ok(raw
        .into_iter()
        .map(|(from, to)| (normalize_page_path(&from), normalize_page_path(&to)))
        .collect())
}

/// Load prerendered reference fragments for every version that has a directory.
///
/// Missing fragment files within a version directory are empty strings.
pub(crate) fn load_graphql(
    data_dir: &Path,
    versions: &VersionCatalog,
) -> Result<HashMap<String, Arc<PrerenderedReference>>, SiteError> {
    let root = data_dir.join(GRAPHQL_DIR);
    let mut references = HashMap::new();
    for version in versions.ids() {
        let dir = root.join(version);
        if !dir.is_dir() {
            continue;
        }
        let read = |name: &str| -> Result<String, SiteError> {
            Ok(read_optional(&dir.join(format!("prerendered-{name}.html")))?.unwrap_or_default())
        };
        let reference = PrerenderedReference {
            objects: read("objects")?,
            input_objects: read("input-objects")?,
            mutations: read("mutations")?,
        };
        references.insert(version.to_owned(), Arc::new(reference));
    }
    Ok(references)
}

/// Strip surrounding slashes so redirect entries match scanned page paths.
pub(crate) fn normalize_page_path(path: &str) -> String {
    path.trim().trim_matches('/').to_owned()
}
