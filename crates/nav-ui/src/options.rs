//! Screen options
//!
//! Options come in three layers: navigator-wide defaults, per-screen
//! options (static or derived from the route), and dynamic overrides a
//! mounted screen sets at runtime. Later layers win; `header_style` is
//! merged field by field.

use nav_state::Route;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::presets::TransitionPreset;

/// Color value (hex string or CSS color)
pub type Color = String;

/// Identifier of a header render slot (e.g. a back button or menu)
pub type HeaderSlot = String;

// =============================================================================
// Option Types
// =============================================================================

/// Header appearance, merged key by key across layers
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HeaderStyle {
    /// Header background
    #[serde(skip_serializing_if = "Option::is_none")]
    pub background_color: Option<Color>,
    /// Color of header buttons
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tint_color: Option<Color>,
    /// Title text color
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title_color: Option<Color>,
    /// Show the bottom shadow
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shadow_visible: Option<bool>,
}

impl HeaderStyle {
    /// Overlay every field set in `other`
    pub fn merge(&mut self, other: &HeaderStyle) {
        if other.background_color.is_some() {
            self.background_color = other.background_color.clone();
        }
        if other.tint_color.is_some() {
            self.tint_color = other.tint_color.clone();
        }
        if other.title_color.is_some() {
            self.title_color = other.title_color.clone();
        }
        if other.shadow_visible.is_some() {
            self.shadow_visible = other.shadow_visible;
        }
    }
}

/// Animation used when a screen enters or leaves
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Animation {
    /// A built-in preset by name (`"slide"`, `"fade"`, `"modal"`, `"none"`)
    Named(String),
    /// A preset supplied inline
    Inline(TransitionPreset),
}

impl Animation {
    /// Shorthand for a named preset
    pub fn named(name: impl Into<String>) -> Self {
        Animation::Named(name.into())
    }

    /// Resolve to preset data
    ///
    /// Unknown names fall back to the default slide.
    pub fn preset(&self) -> TransitionPreset {
        match self {
            Animation::Named(name) => TransitionPreset::named(name).unwrap_or_else(|| {
                tracing::warn!("Unknown animation preset {}, using default", name);
                TransitionPreset::default()
            }),
            Animation::Inline(preset) => preset.clone(),
        }
    }
}

impl Default for Animation {
    fn default() -> Self {
        Animation::Named(crate::presets::names::SLIDE.to_string())
    }
}

/// Partial screen options; unset fields fall through to lower layers
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScreenOptions {
    /// Header title
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Show the header
    #[serde(skip_serializing_if = "Option::is_none")]
    pub header_shown: Option<bool>,
    /// Left header slot
    #[serde(skip_serializing_if = "Option::is_none")]
    pub header_left: Option<HeaderSlot>,
    /// Right header slot
    #[serde(skip_serializing_if = "Option::is_none")]
    pub header_right: Option<HeaderSlot>,
    /// Header appearance
    #[serde(default)]
    pub header_style: HeaderStyle,
    /// Transition animation
    #[serde(skip_serializing_if = "Option::is_none")]
    pub animation: Option<Animation>,
    /// Allow swipe-back gestures
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gesture_enabled: Option<bool>,
}

impl ScreenOptions {
    /// Create empty options
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the title
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Show or hide the header
    pub fn header_shown(mut self, shown: bool) -> Self {
        self.header_shown = Some(shown);
        self
    }

    /// Set the left header slot
    pub fn header_left(mut self, slot: impl Into<HeaderSlot>) -> Self {
        self.header_left = Some(slot.into());
        self
    }

    /// Set the right header slot
    pub fn header_right(mut self, slot: impl Into<HeaderSlot>) -> Self {
        self.header_right = Some(slot.into());
        self
    }

    /// Set the header style
    pub fn header_style(mut self, style: HeaderStyle) -> Self {
        self.header_style = style;
        self
    }

    /// Set the animation
    pub fn animation(mut self, animation: Animation) -> Self {
        self.animation = Some(animation);
        self
    }

    /// Enable or disable swipe-back
    pub fn gesture_enabled(mut self, enabled: bool) -> Self {
        self.gesture_enabled = Some(enabled);
        self
    }

    /// Overlay every field set in `other`
    pub fn merge(&mut self, other: &ScreenOptions) {
        if other.title.is_some() {
            self.title = other.title.clone();
        }
        if other.header_shown.is_some() {
            self.header_shown = other.header_shown;
        }
        if other.header_left.is_some() {
            self.header_left = other.header_left.clone();
        }
        if other.header_right.is_some() {
            self.header_right = other.header_right.clone();
        }
        self.header_style.merge(&other.header_style);
        if other.animation.is_some() {
            self.animation = other.animation.clone();
        }
        if other.gesture_enabled.is_some() {
            self.gesture_enabled = other.gesture_enabled;
        }
    }
}

/// Per-screen options: fixed, or computed from the route
#[derive(Clone)]
pub enum ScreenOptionsSource {
    /// Same options for every route of the screen
    Static(ScreenOptions),
    /// Options derived from the route (usually its params)
    Derived(Arc<dyn Fn(&Route) -> ScreenOptions + Send + Sync>),
}

impl ScreenOptionsSource {
    /// Evaluate for a route
    pub fn evaluate(&self, route: &Route) -> ScreenOptions {
        match self {
            ScreenOptionsSource::Static(options) => options.clone(),
            ScreenOptionsSource::Derived(derive) => derive(route),
        }
    }
}

impl Default for ScreenOptionsSource {
    fn default() -> Self {
        ScreenOptionsSource::Static(ScreenOptions::default())
    }
}

impl fmt::Debug for ScreenOptionsSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScreenOptionsSource::Static(options) => f.debug_tuple("Static").field(options).finish(),
            ScreenOptionsSource::Derived(_) => f.write_str("Derived(..)"),
        }
    }
}

impl From<ScreenOptions> for ScreenOptionsSource {
    fn from(options: ScreenOptions) -> Self {
        ScreenOptionsSource::Static(options)
    }
}

/// Fully resolved options for one route
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedOptions {
    /// Header title (defaults to the screen name)
    pub title: String,
    /// Show the header
    pub header_shown: bool,
    /// Left header slot
    pub header_left: Option<HeaderSlot>,
    /// Right header slot
    pub header_right: Option<HeaderSlot>,
    /// Header appearance
    pub header_style: HeaderStyle,
    /// Transition animation
    pub animation: Animation,
    /// Allow swipe-back gestures
    pub gesture_enabled: bool,
}

impl ResolvedOptions {
    /// Transition preset data for this route
    pub fn preset(&self) -> TransitionPreset {
        self.animation.preset()
    }
}

/// Merge the three layers for a route
pub fn resolve(
    defaults: &ScreenOptions,
    screen: Option<&ScreenOptionsSource>,
    dynamic: Option<&ScreenOptions>,
    route: &Route,
) -> ResolvedOptions {
    let mut merged = defaults.clone();
    if let Some(screen) = screen {
        merged.merge(&screen.evaluate(route));
    }
    if let Some(dynamic) = dynamic {
        merged.merge(dynamic);
    }

    ResolvedOptions {
        title: merged.title.unwrap_or_else(|| route.name.clone()),
        header_shown: merged.header_shown.unwrap_or(true),
        header_left: merged.header_left,
        header_right: merged.header_right,
        header_style: merged.header_style,
        animation: merged.animation.unwrap_or_default(),
        gesture_enabled: merged.gesture_enabled.unwrap_or(true),
    }
}

// =============================================================================
// Resolver
// =============================================================================

/// Holds the option layers and resolves them per route
#[derive(Debug, Clone, Default)]
pub struct OptionsResolver {
    defaults: ScreenOptions,
    screens: HashMap<String, ScreenOptionsSource>,
    dynamic: HashMap<String, ScreenOptions>,
}

impl OptionsResolver {
    /// Create a resolver with navigator-wide defaults
    pub fn new(defaults: ScreenOptions) -> Self {
        Self {
            defaults,
            screens: HashMap::new(),
            dynamic: HashMap::new(),
        }
    }

    /// Register options for a screen name
    pub fn register(&mut self, name: impl Into<String>, source: ScreenOptionsSource) {
        self.screens.insert(name.into(), source);
    }

    /// Whether a screen name is registered
    pub fn is_registered(&self, name: &str) -> bool {
        self.screens.contains_key(name)
    }

    /// Merge a dynamic override into a route's existing overrides
    pub fn set_dynamic(&mut self, key: &str, options: &ScreenOptions) {
        self.dynamic
            .entry(key.to_string())
            .or_default()
            .merge(options);
    }

    /// Dynamic overrides for a route key
    pub fn dynamic(&self, key: &str) -> Option<&ScreenOptions> {
        self.dynamic.get(key)
    }

    /// Drop overrides for keys that are no longer alive
    pub fn prune(&mut self, is_alive: impl Fn(&str) -> bool) {
        self.dynamic.retain(|key, _| is_alive(key));
    }

    /// Effective options for a route
    pub fn resolve(&self, route: &Route) -> ResolvedOptions {
        resolve(
            &self.defaults,
            self.screens.get(&route.name),
            self.dynamic.get(&route.key),
            route,
        )
    }
}
