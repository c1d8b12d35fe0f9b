//! Navigator configuration

use nav_history::UrlMode;
use nav_state::Params;
use serde::{Deserialize, Serialize};

use crate::options::ScreenOptions;

/// Default initial screen name
pub const DEFAULT_INITIAL_ROUTE: &str = "Home";

/// Navigator configuration
///
/// # Example
///
/// ```rust
/// use nav_ui::config::NavigatorConfig;
///
/// let config = NavigatorConfig::from_json(r#"{
///     "initialRouteName": "Feed",
///     "urlMode": { "basePath": "/app" },
///     "screenOptions": { "animation": "fade" }
/// }"#).unwrap();
/// assert_eq!(config.initial_route_name, "Feed");
/// assert!(config.prune_dynamic_options);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NavigatorConfig {
    /// Screen mounted when history holds no snapshot
    pub initial_route_name: String,
    /// Params for the initial screen
    #[serde(skip_serializing_if = "Option::is_none")]
    pub initial_params: Option<Params>,
    /// Mirror the active route into the URL
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url_mode: Option<UrlMode>,
    /// Navigator-wide option defaults
    pub screen_options: ScreenOptions,
    /// Drop dynamic options of routes that left the stack
    pub prune_dynamic_options: bool,
}

impl Default for NavigatorConfig {
    fn default() -> Self {
        Self {
            initial_route_name: DEFAULT_INITIAL_ROUTE.to_string(),
            initial_params: None,
            url_mode: None,
            screen_options: ScreenOptions::default(),
            prune_dynamic_options: true,
        }
    }
}

impl NavigatorConfig {
    /// Create a config with the given initial screen
    pub fn new(initial_route_name: impl Into<String>) -> Self {
        Self {
            initial_route_name: initial_route_name.into(),
            ..Self::default()
        }
    }

    /// Parse a config from JSON
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Set initial params
    pub fn with_initial_params(mut self, params: Params) -> Self {
        self.initial_params = Some(params);
        self
    }

    /// Enable URL mode
    pub fn with_url_mode(mut self, base_path: impl Into<String>) -> Self {
        self.url_mode = Some(UrlMode::new(base_path));
        self
    }

    /// Set navigator-wide option defaults
    pub fn with_screen_options(mut self, options: ScreenOptions) -> Self {
        self.screen_options = options;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::Animation;

    #[test]
    fn test_defaults() {
        let config = NavigatorConfig::from_json("{}").unwrap();
        assert_eq!(config, NavigatorConfig::default());
        assert_eq!(config.initial_route_name, "Home");
        assert!(config.url_mode.is_none());
    }

    #[test]
    fn test_screen_options_from_json() {
        let config = NavigatorConfig::from_json(
            r##"{ "screenOptions": { "headerShown": false, "headerStyle": { "tintColor": "#fff" } } }"##,
        )
        .unwrap();
        assert_eq!(config.screen_options.header_shown, Some(false));
        assert_eq!(config.screen_options.header_style.tint_color.as_deref(), Some("#fff"));
        assert_eq!(config.screen_options.animation, None::<Animation>);
    }
}
