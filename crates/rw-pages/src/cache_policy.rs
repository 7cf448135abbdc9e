//! Cache-Control policies.
//!
//! A [`CachePolicy`] is built once at startup and applied to many responses.
//! The directive list follows the max-age:
//!
//! | max-age     | Directives                                                        |
//! |-------------|-------------------------------------------------------------------|
//! | 0           | `private, no-store`                                               |
//! | 1..3600     | `public, max-age=N`                                               |
//! | >= 3600     | `public, max-age=N, stale-while-revalidate=3600, stale-if-error=86400` |

use http::header::{CACHE_CONTROL, HeaderMap, HeaderValue};

/// Threshold above which stale-serving directives are added.
const ONE_HOUR: u64 = 60 * 60;

/// How long a stale response may be served when the origin errors.
const ONE_DAY: u64 = 24 * ONE_HOUR;

/// Directive for responses that must not be cached.
const NO_STORE: &str = "private, no-store";

/// A precomputed `Cache-Control` directive.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CachePolicy {
    value: HeaderValue,
}

impl CachePolicy {
    /// Build a policy allowing reuse for `max_age` seconds. Zero disables caching.
    #[must_use]
    pub fn with_max_age(max_age: u64) -> Self {
        if max_age == 0 {
            return Self {
                value: HeaderValue::from_static(NO_STORE),
            };
        }

        let mut directives = vec!["public".to_owned(), format!("max-age={max_age}")];
        if max_age >= ONE_HOUR {
            directives.push(format!("stale-while-revalidate={ONE_HOUR}"));
            directives.push(format!("stale-if-error={ONE_DAY}"));
        }

        // Directives are ASCII tokens and digits, so parsing never falls back.
        let value = HeaderValue::try_from(directives.join(", "))
            .unwrap_or_else(|_| HeaderValue::from_static(NO_STORE));
        Self { value }
    }

    /// Policy that forbids caching.
    #[must_use]
    pub fn no_cache() -> Self {
        Self::with_max_age(0)
    }

    /// The directive string.
    #[must_use]
    pub fn directive(&self) -> &str {
        // Built from ASCII only, so this never falls back.
        self.value.to_str().unwrap_or_default()
    }

    /// Set the `Cache-Control` header, replacing any previous value.
    pub fn apply(&self, headers: &mut HeaderMap) {
        headers.insert(CACHE_CONTROL, self.value.clone());
    }
}

/// The two policies the page pipeline uses.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CachePolicies {
    /// Applied to 404 and HEAD responses.
    pub no_cache: CachePolicy,
    /// Applied to rendered pages.
    pub html: CachePolicy,
}

impl CachePolicies {
    /// Build the policies with the given TTL for rendered pages.
    #[must_use]
    pub fn new(html_max_age: u64) -> Self {
        Self {
            no_cache: CachePolicy::no_cache(),
            html: CachePolicy::with_max_age(html_max_age),
        }
    }
}

impl Default for CachePolicies {
    fn default() -> Self {
        Self::new(0)
    }
}
