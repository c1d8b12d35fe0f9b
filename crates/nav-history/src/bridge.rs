//! History bridge
//!
//! Keeps the platform's current history entry in lockstep with the
//! in-memory [`StackState`]. Each entry stores the full stack snapshot
//! (`index` and `routes`) next to whatever other fields other code put
//! there.

use nav_state::{KeyGenerator, Params, StackError, StackState};
use serde_json::{Map, Value};
use thiserror::Error;

use crate::platform::{PlatformHistory, PopStateListener};
use crate::url::UrlMode;

/// History errors
#[derive(Debug, Error)]
pub enum HistoryError {
    /// Entry state carries no `routes` sequence
    #[error("History state has no routes")]
    MissingRoutes,

    /// Snapshot has an invalid stack shape
    #[error("Invalid stack snapshot: {0}")]
    Stack(#[from] StackError),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type for history operations
pub type Result<T> = std::result::Result<T, HistoryError>;

/// Where the initial stack came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InitialSource {
    /// Snapshot found in the current history entry
    Restored,
    /// Hydrated from the URL path
    Url,
    /// Default initial route
    Default,
}

/// Initial stack chosen on first mount
#[derive(Debug, Clone, PartialEq)]
pub struct InitialState {
    /// The stack to install
    pub state: StackState,
    /// Where it came from
    pub source: InitialSource,
}

// =============================================================================
// Snapshot Encoding
// =============================================================================

/// Read a stack snapshot out of a history entry state
pub fn read_snapshot(value: &Value) -> Result<StackState> {
    let has_routes = value
        .as_object()
        .and_then(|obj| obj.get("routes"))
        .is_some_and(Value::is_array);
    if !has_routes {
        return Err(HistoryError::MissingRoutes);
    }

    let state: StackState = serde_json::from_value(value.clone())?;
    state.validate()?;
    Ok(state)
}

/// Merge a stack snapshot into an existing entry state
///
/// Foreign fields of an object `base` are kept; anything that is not an
/// object is discarded.
pub fn write_snapshot(base: Option<Value>, state: &StackState) -> Result<Value> {
    let mut merged = match base {
        Some(Value::Object(map)) => map,
        _ => Map::new(),
    };
    merged.insert("index".to_string(), serde_json::to_value(state.index)?);
    merged.insert("routes".to_string(), serde_json::to_value(&state.routes)?);
    Ok(Value::Object(merged))
}

// =============================================================================
// Bridge
// =============================================================================

/// The navigator's only path to the platform history
pub struct HistoryBridge {
    platform: Box<dyn PlatformHistory>,
    url_mode: Option<UrlMode>,
}

impl HistoryBridge {
    /// Create a bridge over a platform history
    pub fn new(platform: Box<dyn PlatformHistory>, url_mode: Option<UrlMode>) -> Self {
        Self { platform, url_mode }
    }

    /// URL mode, if enabled
    pub fn url_mode(&self) -> Option<&UrlMode> {
        self.url_mode.as_ref()
    }

    /// Add a new history entry for `state`
    pub fn push(&mut self, state: &StackState) -> Result<()> {
        let entry = write_snapshot(None, state)?;
        let url = self.url_for(state);
        tracing::debug!("History push: index {} of {}", state.index, state.routes.len());
        self.platform.push_entry(entry, url);
        Ok(())
    }

    /// Overwrite the current entry's snapshot, keeping foreign fields
    pub fn replace(&mut self, state: &StackState) -> Result<()> {
        let entry = write_snapshot(self.platform.current_state(), state)?;
        let url = self.url_for(state);
        tracing::debug!("History replace: index {} of {}", state.index, state.routes.len());
        self.platform.replace_entry(entry, url);
        Ok(())
    }

    /// Ask the platform to traverse `delta` entries
    pub fn go(&mut self, delta: isize) -> bool {
        let accepted = self.platform.go(delta);
        if !accepted {
            tracing::warn!("Platform refused history traversal by {}", delta);
        }
        accepted
    }

    /// Raw state of the entry the platform is on now
    pub fn current_entry(&self) -> Option<Value> {
        self.platform.current_state()
    }

    /// Snapshot stored in the current entry
    pub fn current_snapshot(&self) -> Result<StackState> {
        match self.current_entry() {
            Some(value) => read_snapshot(&value),
            None => Err(HistoryError::MissingRoutes),
        }
    }

    /// Register for back/forward traversals
    pub fn on_external_change(&mut self, listener: PopStateListener) {
        self.platform.on_external_change(listener);
    }

    /// Pick the stack to mount with
    ///
    /// An existing router snapshot wins; otherwise, in URL mode, a URL
    /// naming a registered screen hydrates a single-route stack; otherwise
    /// the default route is used. Nothing is written here; the caller
    /// persists the result with [`HistoryBridge::replace`].
    pub fn initial_state(
        &self,
        keys: &mut KeyGenerator,
        is_registered: impl Fn(&str) -> bool,
        default_name: &str,
        default_params: Option<Params>,
    ) -> InitialState {
        match self.current_snapshot() {
            Ok(state) => {
                keys.observe(&state.routes);
                tracing::info!("Restored stack of {} routes from history", state.routes.len());
                return InitialState {
                    state,
                    source: InitialSource::Restored,
                };
            }
            Err(HistoryError::MissingRoutes) => {}
            Err(e) => tracing::warn!("Ignoring malformed history state: {}", e),
        }

        if let (Some(mode), Some(url)) = (&self.url_mode, self.platform.current_url()) {
            if let Some((name, params)) = mode.parse(&url) {
                if is_registered(&name) {
                    tracing::info!("Hydrated initial route {} from URL", name);
                    return InitialState {
                        state: StackState::single(keys.route(name, params)),
                        source: InitialSource::Url,
                    };
                }
            }
        }

        InitialState {
            state: StackState::single(keys.route(default_name, default_params)),
            source: InitialSource::Default,
        }
    }

    fn url_for(&self, state: &StackState) -> Option<String> {
        self.url_mode.as_ref().map(|mode| mode.to_url(state.active()))
    }
}
