//! Route entries and key generation
//!
//! A [`Route`] is one entry in the navigation stack: a screen name, its
//! parameters and a key that is unique for the lifetime of the navigator.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Parameters attached to a route
pub type Params = Map<String, Value>;

/// Separator between the screen name and the counter in a route key
const KEY_SEPARATOR: char = '-';

// =============================================================================
// Route
// =============================================================================

/// A navigation stack entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Route {
    /// Unique key for this entry
    pub key: String,
    /// Registered screen name
    pub name: String,
    /// Route parameters
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub params: Option<Params>,
}

impl Route {
    /// Create a route with an explicit key
    pub fn new(key: impl Into<String>, name: impl Into<String>, params: Option<Params>) -> Self {
        Self {
            key: key.into(),
            name: name.into(),
            params,
        }
    }

    /// Get a parameter by name
    pub fn param(&self, name: &str) -> Option<&Value> {
        self.params.as_ref().and_then(|p| p.get(name))
    }

    /// Get a string parameter by name
    pub fn param_str(&self, name: &str) -> Option<&str> {
        self.param(name).and_then(Value::as_str)
    }
}

/// Build a params map from string pairs
///
/// # Example
///
/// ```rust
/// use nav_state::route::params;
///
/// let p = params([("id", "42")]);
/// assert_eq!(p["id"], "42");
/// ```
pub fn params<I, K, V>(pairs: I) -> Params
where
    I: IntoIterator<Item = (K, V)>,
    K: Into<String>,
    V: Into<String>,
{
    pairs
        .into_iter()
        .map(|(k, v)| (k.into(), Value::String(v.into())))
        .collect()
}

// =============================================================================
// Key Generation
// =============================================================================

/// Generates route keys of the form `{name}-{n}`
///
/// The counter only ever increases, so two routes created in the same
/// tick still get distinct keys.
#[derive(Debug, Clone, Default)]
pub struct KeyGenerator {
    next: u64,
}

impl KeyGenerator {
    /// Create a generator starting at zero
    pub fn new() -> Self {
        Self::default()
    }

    /// Produce the next key for a screen name
    pub fn next_key(&mut self, name: &str) -> String {
        let key = format!("{}{}{}", name, KEY_SEPARATOR, self.next);
        self.next = self.next.saturating_add(1);
        key
    }

    /// Create a new route with a fresh key
    pub fn route(&mut self, name: impl Into<String>, params: Option<Params>) -> Route {
        let name = name.into();
        let key = self.next_key(&name);
        Route { key, name, params }
    }

    /// Advance the counter past every key in `routes`
    ///
    /// Keys restored from history were produced by an earlier generator
    /// (possibly before a reload); new keys must not collide with them.
    /// A suffix with no successor in `u64` is ignored.
    pub fn observe<'a>(&mut self, routes: impl IntoIterator<Item = &'a Route>) {
        for route in routes {
            if let Some(after) = key_counter(&route.key).and_then(|n| n.checked_add(1)) {
                self.next = self.next.max(after);
            }
        }
    }

    /// The counter value the next key will use
    pub fn peek(&self) -> u64 {
        self.next
    }
}

/// Extract the numeric suffix of a generated key
fn key_counter(key: &str) -> Option<u64> {
    key.rsplit_once(KEY_SEPARATOR)
        .and_then(|(_, n)| n.parse().ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keys_are_sequential() {
        let mut keys = KeyGenerator::new();
        assert_eq!(keys.next_key("Home"), "Home-0");
        assert_eq!(keys.next_key("Profile"), "Profile-1");
        assert_eq!(keys.next_key("Profile"), "Profile-2");
    }

    #[test]
    fn test_observe_skips_restored_keys() {
        let mut keys = KeyGenerator::new();
        let restored = vec![
            Route::new("Home-0", "Home", None),
            Route::new("Post-Detail-7", "Post-Detail", None),
            Route::new("foreign", "Settings", None),
        ];
        keys.observe(&restored);
        assert_eq!(keys.peek(), 8);
        assert_eq!(keys.next_key("Home"), "Home-8");
    }

    #[test]
    fn test_observe_never_rewinds() {
        let mut keys = KeyGenerator::new();
        for _ in 0..5 {
            keys.next_key("A");
        }
        keys.observe(&[Route::new("A-1", "A", None)]);
        assert_eq!(keys.peek(), 5);
    }

    #[test]
    fn test_observe_largest_suffix_does_not_overflow() {
        let mut keys = KeyGenerator::new();
        keys.observe(&[Route::new("A-18446744073709551615", "A", None)]);
        assert_eq!(keys.peek(), 0);

        keys.observe(&[Route::new("A-18446744073709551614", "A", None)]);
        assert_eq!(keys.peek(), u64::MAX);
        assert_eq!(keys.next_key("B"), "B-18446744073709551615");
        // Saturated counter keeps producing keys without panicking
        assert_eq!(keys.peek(), u64::MAX);
        keys.next_key("B");
    }

    #[test]
    fn test_route_params() {
        let route = Route::new("Profile-1", "Profile", Some(params([("id", "42")])));
        assert_eq!(route.param_str("id"), Some("42"));
        assert_eq!(route.param_str("missing"), None);
    }

    #[test]
    fn test_route_serialization_omits_missing_params() {
        let route = Route::new("Home-0", "Home", None);
        let json = serde_json::to_value(&route).unwrap();
        assert_eq!(json, serde_json::json!({ "key": "Home-0", "name": "Home" }));

        let parsed: Route = serde_json::from_value(json).unwrap();
        assert_eq!(parsed, route);
    }
}
