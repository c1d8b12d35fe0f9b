//! Per-screen navigation handle
//!
//! Every mounted screen gets a [`NavigationHandle`] bound to its route key.
//! The handle holds only a weak reference to the navigator, so it never
//! keeps a dropped navigator alive, and every call reads the current
//! stack rather than a copy taken at render time.

use nav_state::{Params, Route};
use std::fmt;
use std::sync::{Arc, Weak};

use crate::error::{NavigationError, Result};
use crate::events::{EventKind, ListenerId, Subscription, TransitionEvent};
use crate::header::ScrollContainerId;
use crate::navigator::{Core, Shared};
use crate::options::ScreenOptions;

/// Navigation API for one mounted screen
#[derive(Clone)]
pub struct NavigationHandle {
    key: String,
    shared: Weak<Shared>,
}

impl fmt::Debug for NavigationHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NavigationHandle")
            .field("key", &self.key)
            .field("attached", &(self.shared.strong_count() > 0))
            .finish()
    }
}

impl NavigationHandle {
    pub(crate) fn new(key: impl Into<String>, shared: Weak<Shared>) -> Self {
        Self {
            key: key.into(),
            shared,
        }
    }

    /// Key of the route this handle belongs to
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Push a new route (alias of [`NavigationHandle::push`])
    pub fn navigate(&self, name: &str, params: Option<Params>) -> Result<()> {
        self.push(name, params)
    }

    /// Push a new route on top of the stack
    pub fn push(&self, name: &str, params: Option<Params>) -> Result<()> {
        self.mutate(|core| core.push(name, params))
    }

    /// Replace the active route
    pub fn replace(&self, name: &str, params: Option<Params>) -> Result<()> {
        self.mutate(|core| core.replace(name, params))
    }

    /// Go back one route; a no-op at the root
    pub fn go_back(&self) -> Result<()> {
        self.pop(1)
    }

    /// Go back `count` routes, clamped to the root
    pub fn pop(&self, count: usize) -> Result<()> {
        self.mutate(|core| core.go_back(count))
    }

    /// Go back to the first route
    pub fn pop_to_top(&self) -> Result<()> {
        self.mutate(Core::pop_to_top)
    }

    /// Replace the whole stack with a single route
    pub fn reset(&self, name: &str, params: Option<Params>) -> Result<()> {
        self.mutate(|core| core.reset(name, params))
    }

    /// Whether there is a route to go back to
    pub fn can_go_back(&self) -> Result<bool> {
        self.read(|core| core.state().index > 0)
    }

    /// Merge options into this route's dynamic overrides
    pub fn set_options(&self, options: ScreenOptions) -> Result<()> {
        self.mutate(|core| {
            core.set_options(&self.key, &options);
            Ok(Vec::new())
        })
    }

    /// The route this handle belongs to
    pub fn route(&self) -> Result<Route> {
        self.read(|core| core.mounted_route(&self.key).cloned())?
            .ok_or_else(|| NavigationError::OutOfContext(self.key.clone()))
    }

    /// Subscribe to navigator lifecycle events
    pub fn add_listener<F>(&self, kind: EventKind, listener: F) -> Result<Subscription>
    where
        F: Fn(&TransitionEvent) + Send + Sync + 'static,
    {
        let shared = self.attached()?;
        Ok(shared.bus().add_listener(kind, listener))
    }

    /// Remove a listener added through any handle
    pub fn remove_listener(&self, kind: EventKind, id: ListenerId) -> Result<()> {
        let shared = self.attached()?;
        if !shared.bus().remove_listener(kind, id) {
            tracing::debug!("Listener {:?} for {:?} was not registered", id, kind);
        }
        Ok(())
    }

    /// Tell the header which container scrolls this screen
    pub fn register_scroll_container(&self, id: ScrollContainerId) -> Result<()> {
        self.mutate(|core| {
            core.register_scroll_container(&self.key, id);
            Ok(Vec::new())
        })
    }

    fn attached(&self) -> Result<Arc<Shared>> {
        self.read(|_| ())?;
        self.shared
            .upgrade()
            .ok_or_else(|| NavigationError::OutOfContext(self.key.clone()))
    }

    fn read<T>(&self, f: impl FnOnce(&Core) -> T) -> Result<T> {
        self.mutate_with(|core| Ok((f(core), Vec::new())))
    }

    fn mutate(
        &self,
        f: impl FnOnce(&mut Core) -> Result<Vec<TransitionEvent>>,
    ) -> Result<()> {
        self.mutate_with(|core| Ok(((), f(core)?)))
    }

    fn mutate_with<T>(
        &self,
        f: impl FnOnce(&mut Core) -> Result<(T, Vec<TransitionEvent>)>,
    ) -> Result<T> {
        let shared = self
            .shared
            .upgrade()
            .ok_or_else(|| NavigationError::OutOfContext(self.key.clone()))?;
        shared.run(|core| {
            core.ensure_mounted(&self.key)?;
            f(core)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::NavigatorConfig;
    use crate::navigator::{ScreenConfig, StackNavigator};
    use nav_history::MemoryHistory;
    use nav_state::params;
    use parking_lot::Mutex;

    fn navigator() -> (StackNavigator<()>, MemoryHistory) {
        let history = MemoryHistory::new("/");
        let nav = StackNavigator::builder(NavigatorConfig::new("Home"))
            .screen(ScreenConfig::new("Home", |_, _| ()))
            .screen(ScreenConfig::new("Profile", |_, _| ()))
            .screen(ScreenConfig::new("Settings", |_, _| ()))
            .build(history.clone())
            .unwrap();
        (nav, history)
    }

    #[test]
    fn test_navigate_is_push() {
        let (nav, _history) = navigator();
        nav.active_handle().navigate("Profile", None).unwrap();
        nav.active_handle().navigate("Profile", None).unwrap();
        let keys: Vec<_> = nav.state().routes.into_iter().map(|r| r.key).collect();
        assert_eq!(keys, ["Home-0", "Profile-1", "Profile-2"]);
    }

    #[test]
    fn test_can_go_back_only_above_root() {
        let (nav, _history) = navigator();
        let home = nav.active_handle();
        assert!(!home.can_go_back().unwrap());
        home.push("Profile", None).unwrap();
        assert!(home.can_go_back().unwrap());
        assert!(nav.active_handle().can_go_back().unwrap());
    }

    #[test]
    fn test_go_back_at_root_is_noop() {
        let (nav, history) = navigator();
        nav.active_handle().go_back().unwrap();
        nav.active_handle().pop_to_top().unwrap();
        assert_eq!(history.pending_events(), 0);
        assert_eq!(nav.state().routes.len(), 1);
    }

    #[test]
    fn test_pop_clamps_to_root() {
        let (nav, history) = navigator();
        nav.active_handle().push("Profile", None).unwrap();
        nav.active_handle().push("Settings", None).unwrap();

        nav.active_handle().pop(10).unwrap();
        history.dispatch_pending();
        assert_eq!(nav.state().index, 0);
        assert_eq!(nav.state().active().key, "Home-0");
        assert_eq!(history.cursor(), 0);
    }

    #[test]
    fn test_pop_to_top_goes_to_first_route() {
        let (nav, history) = navigator();
        nav.active_handle().push("Profile", None).unwrap();
        nav.active_handle().push("Settings", None).unwrap();

        nav.active_handle().pop_to_top().unwrap();
        assert_eq!(history.dispatch_pending(), 1);
        assert_eq!(nav.state().active().key, "Home-0");
    }

    #[test]
    fn test_reset_replaces_current_entry() {
        let (nav, history) = navigator();
        nav.active_handle().push("Profile", None).unwrap();
        nav.active_handle()
            .reset("Settings", Some(params([("tab", "privacy")])))
            .unwrap();

        let state = nav.state();
        assert_eq!(state.routes.len(), 1);
        assert_eq!(state.active().param_str("tab"), Some("privacy"));
        assert_eq!(history.len(), 2);
        assert_eq!(nav.history_snapshot().unwrap(), state);
    }

    #[test]
    fn test_route_returns_own_route() {
        let (nav, _history) = navigator();
        let home = nav.active_handle();
        home.push("Profile", Some(params([("id", "7")]))).unwrap();

        assert_eq!(home.route().unwrap().key, "Home-0");
        let profile = nav.active_handle().route().unwrap();
        assert_eq!(profile.param_str("id"), Some("7"));
    }

    #[test]
    fn test_listener_can_call_back_into_handle() {
        let (nav, _history) = navigator();
        let home = nav.active_handle();
        let seen = Arc::new(Mutex::new(Vec::new()));

        let inner = home.clone();
        let log = seen.clone();
        home.add_listener(EventKind::TransitionStart, move |_| {
            log.lock().push(inner.can_go_back().unwrap_or(false));
        })
        .unwrap();

        home.push("Profile", None).unwrap();
        assert_eq!(*seen.lock(), [true]);
    }

    #[test]
    fn test_remove_listener_by_id() {
        let (nav, _history) = navigator();
        let home = nav.active_handle();
        let count = Arc::new(Mutex::new(0));
        let counter = count.clone();
        let sub = home
            .add_listener(EventKind::TransitionEnd, move |_| *counter.lock() += 1)
            .unwrap();

        home.remove_listener(EventKind::TransitionEnd, sub.id()).unwrap();
        home.push("Profile", None).unwrap();
        nav.finish_transitions();
        assert_eq!(*count.lock(), 0);
        assert_eq!(nav.events().listener_count(EventKind::TransitionEnd), 0);
    }

    #[test]
    fn test_handle_debug_shows_key() {
        let (nav, _history) = navigator();
        let rendered = format!("{:?}", nav.active_handle());
        assert!(rendered.contains("Home-0"));
    }
}
