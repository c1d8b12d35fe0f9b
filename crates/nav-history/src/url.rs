//! URL mode
//!
//! Mirrors the active route into the URL as `{base_path}/{name}?{params}`
//! and reads it back on first load. Only string-valued params make it into
//! the query string; serializing anything else is the caller's job.

use nav_state::{Params, Route};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// URL mirroring configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct UrlMode {
    /// Path prefix the navigator lives under (e.g. `/app`)
    #[serde(default)]
    pub base_path: String,
}

impl UrlMode {
    /// Create a URL mode rooted at `base_path`
    pub fn new(base_path: impl Into<String>) -> Self {
        Self {
            base_path: base_path.into(),
        }
    }

    /// Base path segments
    fn base_segments(&self) -> Vec<&str> {
        self.base_path.split('/').filter(|s| !s.is_empty()).collect()
    }

    /// Build the URL for a route
    pub fn to_url(&self, route: &Route) -> String {
        let mut path = self.base_path.trim_end_matches('/').to_string();
        path.push('/');
        path.push_str(&urlencoding::encode(&route.name));

        let query: Vec<String> = route
            .params
            .iter()
            .flatten()
            .filter_map(|(key, value)| {
                value.as_str().map(|v| {
                    format!("{}={}", urlencoding::encode(key), urlencoding::encode(v))
                })
            })
            .collect();
        if !query.is_empty() {
            path.push('?');
            path.push_str(&query.join("&"));
        }
        path
    }

    /// Match a URL against the base path
    ///
    /// Returns the screen name and string params when exactly one path
    /// segment follows the base path.
    pub fn parse(&self, url: &str) -> Option<(String, Option<Params>)> {
        let (pathname, query) = match url.split_once('?') {
            Some((path, query)) => (path, Some(query)),
            None => (url, None),
        };

        let base = self.base_segments();
        let segments: Vec<&str> = pathname.split('/').filter(|s| !s.is_empty()).collect();
        if segments.len() != base.len() + 1 {
            return None;
        }
        for (expected, actual) in base.iter().zip(segments.iter()) {
            if expected != actual {
                return None;
            }
        }

        let name = urlencoding::decode(segments[base.len()]).ok()?.into_owned();
        Some((name, parse_query(query)))
    }
}

/// Parse a query string into string params
fn parse_query(query: Option<&str>) -> Option<Params> {
    let mut params = Params::new();
    if let Some(query) = query {
        for pair in query.split('&') {
            if let Some((key, value)) = pair.split_once('=') {
                if let (Ok(key), Ok(value)) = (urlencoding::decode(key), urlencoding::decode(value))
                {
                    params.insert(key.into_owned(), Value::String(value.into_owned()));
                }
            }
        }
    }
    (!params.is_empty()).then_some(params)
}

#[cfg(test)]
mod tests {
    use super::*;
    use nav_state::params;
    use serde_json::json;

    #[test]
    fn test_route_to_url() {
        let mode = UrlMode::new("/app/");
        let route = Route::new("Profile-1", "Profile", Some(params([("id", "42")])));
        assert_eq!(mode.to_url(&route), "/app/Profile?id=42");

        let home = Route::new("Home-0", "Home", None);
        assert_eq!(UrlMode::default().to_url(&home), "/Home");
    }

    #[test]
    fn test_non_string_params_are_left_out() {
        let mode = UrlMode::new("");
        let mut p = params([("q", "hello world")]);
        p.insert("page".to_string(), json!(3));
        let route = Route::new("Search-2", "Search", Some(p));
        assert_eq!(mode.to_url(&route), "/Search?q=hello%20world");
    }

    #[test]
    fn test_parse_url() {
        let mode = UrlMode::new("/app");
        assert_eq!(
            mode.parse("/app/Profile?id=42"),
            Some(("Profile".to_string(), Some(params([("id", "42")]))))
        );
        assert_eq!(mode.parse("/app/Home"), Some(("Home".to_string(), None)));
    }

    #[test]
    fn test_parse_rejects_foreign_paths() {
        let mode = UrlMode::new("/app");
        assert_eq!(mode.parse("/app"), None);
        assert_eq!(mode.parse("/other/Profile"), None);
        assert_eq!(mode.parse("/app/Profile/extra"), None);
    }

    #[test]
    fn test_parse_decodes_segments() {
        let mode = UrlMode::default();
        assert_eq!(
            mode.parse("/Post%20Detail?title=a%26b"),
            Some(("Post Detail".to_string(), Some(params([("title", "a&b")]))))
        );
    }
}
