//! YAML front matter parsing.
//!
//! Content files start with a `---` delimited YAML block:
//!
//! ```text
//! ---
//! title: Using the `gh` CLI
//! effectiveDate: 2021-06-01
//! showMiniToc: true
//! miniTocMaxHeadingLevel: 3
//! versions:
//!   - free-pro-team@latest
//!   - enterprise-server@3.5
//! ---
//! Body markdown...
//! ```

use std::path::Path;

use chrono::{DateTime, NaiveDate, Utc};
use serde::Deserialize;

use crate::error::SiteError;

/// Front matter delimiter line.
const DELIMITER: &str = "---";

/// Default deepest heading level for mini tables of contents.
const DEFAULT_MINI_TOC_LEVEL: u8 = 2;

/// Parsed front matter fields.
#[derive(Debug, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub(crate) struct FrontMatter {
    pub title: String,
    #[serde(default)]
    pub effective_date: Option<String>,
    #[serde(default)]
    pub show_mini_toc: bool,
    #[serde(default = "default_mini_toc_level")]
    pub mini_toc_max_heading_level: u8,
    #[serde(default)]
    pub versions: Option<Vec<String>>,
}

fn default_mini_toc_level() -> u8 {
    DEFAULT_MINI_TOC_LEVEL
}

/// Split a document into front matter and body, then parse the front matter.
pub(crate) fn parse(content: &str, path: &Path) -> Result<(FrontMatter, String), SiteError> {
    let invalid = |message: &str| SiteError::FrontMatter {
        path: path.to_path_buf(),
        message: message.to_owned(),
    };

    let content = content.strip_prefix('\u{feff}').unwrap_or(content);
    let mut lines = content.split_inclusive('\n');
    if lines.next().map(str::trim_end) != Some(DELIMITER) {
        return Err(invalid("document must start with ---"));
    }

    let mut yaml = String::new();
    let mut closed = false;
    for line in lines.by_ref() {
        if line.trim_end() == DELIMITER {
            closed = true;
            break;
        }
        yaml.push_str(line);
    }
    if !closed {
        return Err(invalid("unterminated front matter"));
    }
    let body: String = lines.collect();

    let front_matter: FrontMatter =
        serde_yaml::from_str(&yaml).map_err(|e| invalid(&e.to_string()))?;

    if !(2..=6).contains(&front_matter.mini_toc_max_heading_level) {
        return Err(invalid("miniTocMaxHeadingLevel must be between 2 and 6"));
    }

    Ok((front_matter, body))
}

/// Parse an `effectiveDate` value (`YYYY-MM-DD` or RFC 3339).
pub(crate) fn parse_effective_date(value: &str, path: &Path) -> Result<DateTime<Utc>, SiteError> {
    let value = value.trim();
    if let Ok(date) = DateTime::parse_from_rfc3339(value) {
        return Ok(date.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc())
        .ok_or_else(|| SiteError::InvalidEffectiveDate {
            path: path.to_path_buf(),
            value: value.to_owned(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    use chrono::TimeZone;
    use pretty_assertions::assert_eq;

    fn path() -> &'static Path {
        Path::new("content/page.md")
    }

    #[test]
    fn test_parse_minimal() {
        let (fm, body) = parse("---\ntitle: Hello\n---\n# Body\n", path()).unwrap();
        assert_eq!(
            fm,
            FrontMatter {
                title: "Hello".to_owned(),
                effective_date: None,
                show_mini_toc: false,
                mini_toc_max_heading_level: 2,
                versions: None,
            }
        );
        assert_eq!(body, "# Body\n");
    }

    #[test]
    fn test_parse_all_fields() {
        let content = "---\n\
title: Using `gh`\n\
effectiveDate: 2021-06-01\n\
showMiniToc: true\n\
miniTocMaxHeadingLevel: 3\n\
versions:\n  - free-pro-team@latest\n\
---\nBody";
        let (fm, body) = parse(content, path()).unwrap();
        assert_eq!(fm.title, "Using `gh`");
        assert_eq!(fm.effective_date.as_deref(), Some("2021-06-01"));
        assert!(fm.show_mini_toc);
        assert_eq!(fm.mini_toc_max_heading_level, 3);
        assert_eq!(fm.versions, Some(vec!["free-pro-team@latest".to_owned()]));
        assert_eq!(body, "Body");
    }

    #[test]
    fn test_parse_crlf() {
        let (fm, body) = parse("---\r\ntitle: Hi\r\n---\r\nText", path()).unwrap();
        assert_eq!(fm.title, "Hi");
        assert_eq!(body, "Text");
    }

    #[test]
    fn test_missing_front_matter() {
        let err = parse("# No front matter", path()).unwrap_err();
        assert!(matches!(err, SiteError::FrontMatter { .. }));
    }

    #[test]
    fn test_unterminated_front_matter() {
        let err = parse("---\ntitle: x\n", path()).unwrap_err();
        assert!(err.to_string().contains("unterminated"));
    }

    #[test]
    fn test_missing_title() {
        let err = parse("---\nshowMiniToc: true\n---\n", path()).unwrap_err();
        assert!(err.to_string().contains("title"));
    }

    #[test]
    fn test_heading_level_out_of_range() {
        let err = parse("---\ntitle: x\nminiTocMaxHeadingLevel: 7\n---\n", path()).unwrap_err();
        assert!(err.to_string().contains("miniTocMaxHeadingLevel"));
    }

    #[test]
    fn test_effective_date_formats() {
        assert_eq!(
            parse_effective_date("2021-06-01", path()).unwrap(),
            Utc.with_ymd_and_hms(2021, 6, 1, 0, 0, 0).unwrap()
        );
        assert_eq!(
            parse_effective_date("2021-06-01T10:00:00+02:00", path()).unwrap(),
            Utc.with_ymd_and_hms(2021, 6, 1, 8, 0, 0).unwrap()
        );
    }

    #[test]
    fn test_effective_date_invalid() {
        let err = parse_effective_date("June first", path()).unwrap_err();
        assert!(matches!(err, SiteError::InvalidEffectiveDate { .. }));
        assert!(err.to_string().contains("June first"));
    }
}
