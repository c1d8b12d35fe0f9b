//! Navigation stack model
//!
//! [`StackState`] is the unit that gets persisted into each history entry.
//! [`RouteStack`] wraps it with the shape-preserving mutations the
//! navigator is allowed to perform.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::route::Route;

/// Stack shape errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StackError {
    /// The stack holds no routes
    #[error("Stack has no routes")]
    EmptyStack,

    /// The active index points past the last route
    #[error("Index {index} out of bounds for stack of {len} routes")]
    IndexOutOfBounds {
        /// Active index
        index: usize,
        /// Number of routes
        len: usize,
    },
}

// =============================================================================
// Stack State
// =============================================================================

/// Ordered routes plus the active index
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StackState {
    /// Active position in `routes`
    pub index: usize,
    /// Stack entries (bottom to top)
    pub routes: Vec<Route>,
}

impl StackState {
    /// Create a single-route state
    pub fn single(route: Route) -> Self {
        Self {
            index: 0,
            routes: vec![route],
        }
    }

    /// Check the shape invariant: non-empty with the index in bounds
    pub fn validate(&self) -> Result<(), StackError> {
        if self.routes.is_empty() {
            return Err(StackError::EmptyStack);
        }
        if self.index >= self.routes.len() {
            return Err(StackError::IndexOutOfBounds {
                index: self.index,
                len: self.routes.len(),
            });
        }
        Ok(())
    }

    /// Get the active route
    pub fn active(&self) -> &Route {
        &self.routes[self.index]
    }

    /// Position of a route key, if present
    pub fn position(&self, key: &str) -> Option<usize> {
        self.routes.iter().position(|r| r.key == key)
    }

    /// Whether `key` is at or below the active index
    pub fn contains_live(&self, key: &str) -> bool {
        self.position(key).is_some_and(|pos| pos <= self.index)
    }
}

// =============================================================================
// Route Stack
// =============================================================================

/// The in-memory navigation stack
///
/// Popping only moves the index; entries above it stay until the next
/// forward mutation discards them, the same way browser history drops its
/// forward branch when you navigate after going back.
#[derive(Debug, Clone, PartialEq)]
pub struct RouteStack {
    state: StackState,
}

impl RouteStack {
    /// Create a stack holding only `initial`
    pub fn new(initial: Route) -> Self {
        Self {
            state: StackState::single(initial),
        }
    }

    /// Create a stack from a validated state
    pub fn from_state(state: StackState) -> Result<Self, StackError> {
        state.validate()?;
        Ok(Self { state })
    }

    /// Get the current state
    pub fn state(&self) -> &StackState {
        &self.state
    }

    /// Get the active route
    pub fn active(&self) -> &Route {
        self.state.active()
    }

    /// Get the active index
    pub fn index(&self) -> usize {
        self.state.index
    }

    /// Get all entries, including ones above the index awaiting truncation
    pub fn routes(&self) -> &[Route] {
        &self.state.routes
    }

    /// Push a route, dropping any forward branch first
    pub fn push(&mut self, route: Route) {
        self.truncate_forward();
        self.state.routes.push(route);
        self.state.index = self.state.routes.len() - 1;
    }

    /// Replace the active route
    pub fn replace(&mut self, route: Route) {
        self.truncate_forward();
        let index = self.state.index;
        self.state.routes[index] = route;
    }

    /// Go back one level
    pub fn go_back(&mut self) -> usize {
        self.pop(1)
    }

    /// Go back `count` levels, never below the root
    ///
    /// Returns how many levels were actually popped.
    pub fn pop(&mut self, count: usize) -> usize {
        let popped = count.min(self.state.index);
        self.state.index -= popped;
        popped
    }

    /// Go back to the root route
    pub fn pop_to_top(&mut self) -> usize {
        self.pop(self.state.index)
    }

    /// Discard every entry above the active index
    pub fn truncate_forward(&mut self) {
        self.state.routes.truncate(self.state.index + 1);
    }

    /// Install a state wholesale
    pub fn restore(&mut self, state: StackState) -> Result<(), StackError> {
        state.validate()?;
        self.state = state;
        Ok(())
    }

    /// Reset to a single route
    pub fn reset(&mut self, route: Route) {
        self.state = StackState::single(route);
    }

    /// Check if we can go back
    pub fn can_go_back(&self) -> bool {
        self.state.index > 0
    }

    /// Get stack depth up to and including the active route
    pub fn depth(&self) -> usize {
        self.state.index + 1
    }
}
