//! Platform history abstraction
//!
//! [`PlatformHistory`] is the narrow slice of a browser-style session
//! history the navigator needs. [`MemoryHistory`] implements it in memory
//! for tests and for hosts without a native history stack.

use parking_lot::Mutex;
use serde_json::Value;
use std::collections::VecDeque;
use std::sync::Arc;

/// Callback invoked with the restored entry state on back/forward
pub type PopStateListener = Box<dyn Fn(Option<Value>) + Send + Sync>;

/// Session history operations
#[cfg_attr(test, mockall::automock)]
pub trait PlatformHistory: Send {
    /// Add an entry after the current one, dropping any forward entries
    fn push_entry(&mut self, state: Value, url: Option<String>);

    /// Overwrite the current entry
    fn replace_entry(&mut self, state: Value, url: Option<String>);

    /// State stored in the current entry
    fn current_state(&self) -> Option<Value>;

    /// URL of the current entry
    fn current_url(&self) -> Option<String>;

    /// Traverse `delta` entries
    ///
    /// Returns false when the platform cannot traverse that far. A
    /// successful traversal is reported later through the external-change
    /// listeners, never synchronously.
    fn go(&mut self, delta: isize) -> bool;

    /// Register a listener for traversals (back/forward)
    fn on_external_change(&mut self, listener: PopStateListener);
}

// =============================================================================
// Memory History
// =============================================================================

/// One in-memory history entry
#[derive(Debug, Clone, PartialEq)]
pub struct MemoryEntry {
    /// Stored state
    pub state: Option<Value>,
    /// Entry URL
    pub url: String,
}

struct MemoryInner {
    entries: Vec<MemoryEntry>,
    cursor: usize,
    pending: VecDeque<Option<Value>>,
    listeners: Vec<Arc<dyn Fn(Option<Value>) + Send + Sync>>,
}

/// In-memory session history
///
/// Cloning yields another handle to the same history, so a test can keep
/// one handle to press "back" while the navigator owns another. Traversal
/// events are queued and only delivered by [`MemoryHistory::dispatch_pending`],
/// matching the asynchronous pop-state delivery of a browser.
///
/// # Example
///
/// ```rust
/// use nav_history::{MemoryHistory, PlatformHistory};
/// use serde_json::json;
///
/// let mut history = MemoryHistory::new("/");
/// history.push_entry(json!({ "page": 2 }), Some("/two".to_string()));
/// assert!(history.back());
/// assert_eq!(history.current_url().as_deref(), Some("/"));
/// assert_eq!(history.dispatch_pending(), 1);
/// ```
#[derive(Clone)]
pub struct MemoryHistory {
    inner: Arc<Mutex<MemoryInner>>,
}

impl MemoryHistory {
    /// Create a history with one empty entry at `url`
    pub fn new(url: impl Into<String>) -> Self {
        Self::with_entries(
            vec![MemoryEntry {
                state: None,
                url: url.into(),
            }],
            0,
        )
    }

    /// Create a history from existing entries, e.g. after a reload
    ///
    /// An empty `entries` list gets a single blank entry at `/`, and the
    /// cursor is clamped to the last entry.
    pub fn with_entries(mut entries: Vec<MemoryEntry>, cursor: usize) -> Self {
        if entries.is_empty() {
            entries.push(MemoryEntry {
                state: None,
                url: "/".to_string(),
            });
        }
        let cursor = cursor.min(entries.len() - 1);
        Self {
            inner: Arc::new(Mutex::new(MemoryInner {
                entries,
                cursor,
                pending: VecDeque::new(),
                listeners: Vec::new(),
            })),
        }
    }

    /// Simulate the user pressing back
    pub fn back(&self) -> bool {
        self.traverse(-1)
    }

    /// Simulate the user pressing forward
    pub fn forward(&self) -> bool {
        self.traverse(1)
    }

    /// Deliver queued traversal events to listeners
    ///
    /// Listeners run without the history lock held, so they are free to
    /// push or replace entries. Returns the number of events delivered.
    pub fn dispatch_pending(&self) -> usize {
        let mut delivered = 0;
        loop {
            let (event, listeners) = {
                let mut inner = self.inner.lock();
                match inner.pending.pop_front() {
                    Some(event) => (event, inner.listeners.clone()),
                    None => break,
                }
            };
            for listener in &listeners {
                listener(event.clone());
            }
            delivered += 1;
        }
        delivered
    }

    /// Number of queued traversal events
    pub fn pending_events(&self) -> usize {
        self.inner.lock().pending.len()
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.inner.lock().entries.len()
    }

    /// Whether the history has no entries (never true)
    pub fn is_empty(&self) -> bool {
        self.inner.lock().entries.is_empty()
    }

    /// Position of the current entry
    pub fn cursor(&self) -> usize {
        self.inner.lock().cursor
    }

    /// Copy of every entry
    pub fn entries(&self) -> Vec<MemoryEntry> {
        self.inner.lock().entries.clone()
    }

    fn traverse(&self, delta: isize) -> bool {
        let mut inner = self.inner.lock();
        if delta == 0 {
            return false;
        }
        let Some(target) = inner.cursor.checked_add_signed(delta) else {
            return false;
        };
        if target >= inner.entries.len() {
            return false;
        }
        inner.cursor = target;
        let state = inner.entries[target].state.clone();
        inner.pending.push_back(state);
        true
    }
}

impl PlatformHistory for MemoryHistory {
    fn push_entry(&mut self, state: Value, url: Option<String>) {
        let mut inner = self.inner.lock();
        let cursor = inner.cursor;
        let url = url.unwrap_or_else(|| inner.entries[cursor].url.clone());
        inner.entries.truncate(cursor + 1);
        inner.entries.push(MemoryEntry {
            state: Some(state),
            url,
        });
        inner.cursor = cursor + 1;
    }

    fn replace_entry(&mut self, state: Value, url: Option<String>) {
        let mut inner = self.inner.lock();
        let cursor = inner.cursor;
        let entry = &mut inner.entries[cursor];
        entry.state = Some(state);
        if let Some(url) = url {
            entry.url = url;
        }
    }

    fn current_state(&self) -> Option<Value> {
        let inner = self.inner.lock();
        inner.entries[inner.cursor].state.clone()
    }

    fn current_url(&self) -> Option<String> {
        let inner = self.inner.lock();
        Some(inner.entries[inner.cursor].url.clone())
    }

    fn go(&mut self, delta: isize) -> bool {
        self.traverse(delta)
    }

    fn on_external_change(&mut self, listener: PopStateListener) {
        self.inner.lock().listeners.push(Arc::from(listener));
    }
}
