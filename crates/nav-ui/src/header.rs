//! Header collaborator surface
//!
//! The header renderer itself lives outside this crate. It receives
//! [`HeaderProps`] per route and can look up the scroll container a screen
//! registered to drive scroll-linked header behavior.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::options::{HeaderSlot, HeaderStyle, ResolvedOptions};

/// Identifier of a scrollable container inside a screen
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ScrollContainerId(pub String);

impl From<&str> for ScrollContainerId {
    fn from(id: &str) -> Self {
        ScrollContainerId(id.to_string())
    }
}

/// Everything the header needs for one route
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HeaderProps {
    /// Title text
    pub title: String,
    /// Show the header
    pub header_shown: bool,
    /// Left slot
    pub header_left: Option<HeaderSlot>,
    /// Right slot
    pub header_right: Option<HeaderSlot>,
    /// Appearance
    pub header_style: HeaderStyle,
    /// Whether a back button makes sense
    pub can_go_back: bool,
    /// Scroll container registered by the screen
    pub scroll_container: Option<ScrollContainerId>,
}

impl HeaderProps {
    /// Build props from resolved options
    pub fn new(
        options: &ResolvedOptions,
        can_go_back: bool,
        scroll_container: Option<ScrollContainerId>,
    ) -> Self {
        Self {
            title: options.title.clone(),
            header_shown: options.header_shown,
            header_left: options.header_left.clone(),
            header_right: options.header_right.clone(),
            header_style: options.header_style.clone(),
            can_go_back,
            scroll_container,
        }
    }
}

/// Scroll containers keyed by route key
#[derive(Debug, Clone, Default)]
pub struct ScrollContainerRegistry {
    containers: HashMap<String, ScrollContainerId>,
}

impl ScrollContainerRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register (or replace) a route's scroll container
    pub fn register(&mut self, route_key: &str, id: ScrollContainerId) {
        self.containers.insert(route_key.to_string(), id);
    }

    /// Get a route's scroll container
    pub fn get(&self, route_key: &str) -> Option<&ScrollContainerId> {
        self.containers.get(route_key)
    }

    /// Forget a route's scroll container
    pub fn remove(&mut self, route_key: &str) -> Option<ScrollContainerId> {
        self.containers.remove(route_key)
    }

    /// Number of registered containers
    pub fn len(&self) -> usize {
        self.containers.len()
    }

    /// Whether nothing is registered
    pub fn is_empty(&self) -> bool {
        self.containers.is_empty()
    }
}
