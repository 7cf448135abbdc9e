//! Cross-language links for a document.

use crate::model::{Language, LanguageVariant};

/// Strip a leading language segment from `path`.
///
/// Only codes of configured languages are stripped. The result always
/// starts with `/` unless it is empty (the language homepage).
#[must_use]
pub fn path_without_language<'a>(path: &'a str, languages: &[Language]) -> &'a str {
    let Some(rest) = path.strip_prefix('/') else {
        return path;
    };
    let (first, tail) = rest.find('/').map_or((rest, ""), |i| rest.split_at(i));

    if languages.iter().any(|l| l.code == first) {
        tail.trim_end_matches('/')
    } else {
        path
    }
}

/// Compute the same-document link for every configured language.
#[must_use]
pub fn language_variants(path: &str, languages: &[Language]) -> Vec<LanguageVariant> {
    let rest = path_without_language(path, languages);

    languages
        .iter()
        .map(|language| LanguageVariant {
            name: language.name.clone(),
            native_name: language.native_name.clone(),
            code: language.code.clone(),
            href: format!("/{}{rest}", language.code),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    use pretty_assertions::assert_eq;

    fn languages() -> Vec<Language> {
        vec![
            Language {
                code: "en".to_owned(),
                name: "English".to_owned(),
                native_name: None,
            },
            Language {
                code: "ja".to_owned(),
                name: "Japanese".to_owned(),
                native_name: Some("日本語".to_owned()),
            },
        ]
    }

    #[test]
    fn test_path_without_language() {
        let langs = languages();
        assert_eq!(path_without_language("/en/get-started", &langs), "/get-started");
        assert_eq!(path_without_language("/ja", &langs), "");
        assert_eq!(path_without_language("/en/", &langs), "");
        assert_eq!(path_without_language("/de/get-started", &langs), "/de/get-started");
    }

    #[test]
    fn test_variants_cover_every_language() {
        let variants = language_variants("/en/enterprise-server@3.5/admin", &languages());

        let hrefs: Vec<&str> = variants.iter().map(|v| v.href.as_str()).collect();
        assert_eq!(
            hrefs,
            vec!["/en/enterprise-server@3.5/admin", "/ja/enterprise-server@3.5/admin"]
        );
        assert_eq!(variants[1].native_name.as_deref(), Some("日本語"));
    }

    #[test]
    fn test_variants_for_homepage() {
        let variants = language_variants("/ja", &languages());
        assert_eq!(variants[0].href, "/en");
        assert_eq!(variants[1].href, "/ja");
    }
}
