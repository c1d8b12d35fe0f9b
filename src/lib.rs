//! Stack navigator for single-page applications
//!
//! A stack of routes kept in lockstep with the platform's session history,
//! with animated transitions between screens. The work is split across
//! three crates re-exported here:
//!
//! - [`state`] - Routes, keys and the route stack (`nav-state`)
//! - [`history`] - Platform history synchronization (`nav-history`)
//! - [`ui`] - Navigator, handles, options and transitions (`nav-ui`)

#![warn(missing_docs)]
#![warn(clippy::all)]

pub use nav_history as history;
pub use nav_state as state;
pub use nav_ui as ui;

pub use nav_history::{MemoryHistory, PlatformHistory, UrlMode};
pub use nav_state::{params, Params, Route, StackState};
pub use nav_ui::{
    Animation, EventKind, NavigationError, NavigationHandle, NavigatorConfig, ScreenConfig,
    ScreenOptions, StackNavigator, TransitionEvent,
};
