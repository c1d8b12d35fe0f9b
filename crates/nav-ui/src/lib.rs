//! Stack navigator UI layer
//!
//! This crate turns the route stack into screens: it resolves per-screen
//! options, runs the transition state machine, delivers lifecycle events
//! and hands each mounted screen a navigation handle.
//!
//! # Modules
//!
//! - [`navigator`] - The navigator, screen registration and rendering
//! - [`handle`] - Per-screen navigation API
//! - [`options`] - Screen options and their resolution
//! - [`presets`] - Transition presets (slide, fade, modal, none)
//! - [`transition`] - Screen lifecycle state machine
//! - [`events`] - Transition start/end listeners
//! - [`header`] - Props for the header collaborator
//! - [`config`] - Navigator configuration
//!
//! # Example
//!
//! ```rust
//! use nav_history::MemoryHistory;
//! use nav_state::params;
//! use nav_ui::{NavigatorConfig, ScreenConfig, ScreenOptions, StackNavigator};
//!
//! let history = MemoryHistory::new("/");
//! let navigator = StackNavigator::builder(NavigatorConfig::new("Home"))
//!     .screen(ScreenConfig::new("Home", |_, _| "home"))
//!     .screen(
//!         ScreenConfig::new("Profile", |_, _| "profile")
//!             .options_fn(|route| {
//!                 ScreenOptions::new().title(route.param_str("id").unwrap_or("Profile"))
//!             }),
//!     )
//!     .build(history.clone())
//!     .unwrap();
//!
//! let home = navigator.active_handle();
//! home.push("Profile", Some(params([("id", "42")]))).unwrap();
//!
//! let state = navigator.state();
//! assert_eq!(state.index, 1);
//! assert_eq!(navigator.resolved_options(&state.active().key).unwrap().title, "42");
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod error;
pub mod events;
pub mod handle;
pub mod header;
pub mod navigator;
pub mod options;
pub mod presets;
pub mod transition;

// Re-export commonly used types
pub use config::NavigatorConfig;
pub use error::{NavigationError, Result};
pub use events::{EventBus, EventKind, ListenerId, Subscription, TransitionEvent};
pub use handle::NavigationHandle;
pub use header::{HeaderProps, ScrollContainerId, ScrollContainerRegistry};
pub use navigator::{RenderedScreen, ScreenConfig, ScreenRenderer, StackNavigator, StackNavigatorBuilder};
pub use options::{
    Animation, HeaderStyle, OptionsResolver, ResolvedOptions, ScreenOptions, ScreenOptionsSource,
};
pub use presets::{Keyframe, Timing, TransitionPreset, Variant, Variants};
pub use transition::{MountedScreen, Phase, TransitionEngine};
