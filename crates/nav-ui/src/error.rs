//! Navigation errors

use nav_history::HistoryError;
use nav_state::StackError;
use thiserror::Error;

/// Navigation errors
#[derive(Debug, Error)]
pub enum NavigationError {
    /// A handle was used after its screen unmounted (or the navigator dropped)
    #[error("Navigation handle for {0} used outside of a mounted screen")]
    OutOfContext(String),

    /// No screen is registered under this name
    #[error("No screen registered with name {0}")]
    UnknownScreen(String),

    /// The navigator was built without screens
    #[error("Navigator has no screens registered")]
    NoScreens,

    /// Invalid stack shape
    #[error("Stack error: {0}")]
    Stack(#[from] StackError),

    /// History synchronization failed
    #[error("History error: {0}")]
    History(#[from] HistoryError),
}

/// Result type for navigation operations
pub type Result<T> = std::result::Result<T, NavigationError>;
