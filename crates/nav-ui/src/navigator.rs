//! Stack navigator
//!
//! [`StackNavigator`] owns the route stack, the history bridge, the option
//! layers and the transition engine. Every mutation updates the stack and
//! the current history entry together before returning; lifecycle events
//! are delivered afterwards, with no internal lock held, so listeners and
//! renderers may call back into their [`NavigationHandle`].
//!
//! # Example
//!
//! ```rust
//! use nav_history::MemoryHistory;
//! use nav_ui::config::NavigatorConfig;
//! use nav_ui::navigator::{ScreenConfig, StackNavigator};
//!
//! let history = MemoryHistory::new("/");
//! let navigator = StackNavigator::builder(NavigatorConfig::new("Home"))
//!     .screen(ScreenConfig::new("Home", |route, _| format!("home {}", route.key)))
//!     .screen(ScreenConfig::new("Profile", |route, _| format!("profile {}", route.key)))
//!     .build(history.clone())
//!     .unwrap();
//!
//! navigator.active_handle().push("Profile", None).unwrap();
//! navigator.finish_transitions();
//!
//! let screens = navigator.render();
//! assert_eq!(screens.len(), 1);
//! assert_eq!(screens[0].view, "profile Profile-1");
//! ```

use nav_history::{read_snapshot, HistoryBridge, HistoryError, PlatformHistory};
use nav_state::{KeyGenerator, Params, Route, RouteStack, StackState};
use parking_lot::Mutex;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use crate::config::NavigatorConfig;
use crate::error::{NavigationError, Result};
use crate::events::{EventBus, TransitionEvent};
use crate::handle::NavigationHandle;
use crate::header::{HeaderProps, ScrollContainerId, ScrollContainerRegistry};
use crate::options::{OptionsResolver, ResolvedOptions, ScreenOptions, ScreenOptionsSource};
use crate::presets::{Keyframe, Timing};
use crate::transition::{MountedScreen, Phase, TransitionEngine};

/// Screen renderer: receives its route and handle explicitly
pub type ScreenRenderer<V> = Arc<dyn Fn(&Route, &NavigationHandle) -> V + Send + Sync>;

// =============================================================================
// Screen Registration
// =============================================================================

/// Static registration of one screen name
pub struct ScreenConfig<V> {
    /// Screen name used in routes
    pub name: String,
    /// Renderer
    pub renderer: ScreenRenderer<V>,
    /// Per-screen options
    pub options: ScreenOptionsSource,
}

impl<V> ScreenConfig<V> {
    /// Register a screen with default options
    pub fn new<F>(name: impl Into<String>, renderer: F) -> Self
    where
        F: Fn(&Route, &NavigationHandle) -> V + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            renderer: Arc::new(renderer),
            options: ScreenOptionsSource::default(),
        }
    }

    /// Set static options
    pub fn options(mut self, options: ScreenOptions) -> Self {
        self.options = ScreenOptionsSource::Static(options);
        self
    }

    /// Derive options from the route
    pub fn options_fn<F>(mut self, derive: F) -> Self
    where
        F: Fn(&Route) -> ScreenOptions + Send + Sync + 'static,
    {
        self.options = ScreenOptionsSource::Derived(Arc::new(derive));
        self
    }
}

/// One screen ready to draw
pub struct RenderedScreen<V> {
    /// Route being drawn
    pub route: Route,
    /// Lifecycle phase
    pub phase: Phase,
    /// Keyframe the animation starts from
    pub from: Keyframe,
    /// Keyframe the screen animates toward
    pub to: Keyframe,
    /// Timing of the animation
    pub timing: Timing,
    /// Resolved options
    pub options: ResolvedOptions,
    /// Props for the header collaborator
    pub header: HeaderProps,
    /// The renderer's output
    pub view: V,
    /// Handle given to the renderer
    pub handle: NavigationHandle,
}

// =============================================================================
// Core
// =============================================================================

/// Mutable navigator state, always accessed under one lock
pub(crate) struct Core {
    stack: RouteStack,
    keys: KeyGenerator,
    bridge: HistoryBridge,
    options: OptionsResolver,
    engine: TransitionEngine,
    scroll: ScrollContainerRegistry,
    initial_name: String,
    initial_params: Option<Params>,
    prune: bool,
}

impl Core {
    pub(crate) fn ensure_mounted(&self, key: &str) -> Result<()> {
        if self.engine.is_mounted(key) {
            Ok(())
        } else {
            Err(NavigationError::OutOfContext(key.to_string()))
        }
    }

    fn ensure_registered(&self, name: &str) -> Result<()> {
        if self.options.is_registered(name) {
            Ok(())
        } else {
            Err(NavigationError::UnknownScreen(name.to_string()))
        }
    }

    pub(crate) fn state(&self) -> &StackState {
        self.stack.state()
    }

    pub(crate) fn push(&mut self, name: &str, params: Option<Params>) -> Result<Vec<TransitionEvent>> {
        self.ensure_registered(name)?;
        let route = self.keys.route(name, params);
        tracing::debug!("Push {}", route.key);

        let mut next = self.stack.clone();
        next.push(route);
        self.bridge.push(next.state())?;
        Ok(self.commit(next))
    }

    pub(crate) fn replace(&mut self, name: &str, params: Option<Params>) -> Result<Vec<TransitionEvent>> {
        self.ensure_registered(name)?;
        let route = self.keys.route(name, params);
        tracing::debug!("Replace {} with {}", self.stack.active().key, route.key);

        let mut next = self.stack.clone();
        next.replace(route);
        self.bridge.replace(next.state())?;
        Ok(self.commit(next))
    }

    pub(crate) fn reset(&mut self, name: &str, params: Option<Params>) -> Result<Vec<TransitionEvent>> {
        self.ensure_registered(name)?;
        let route = self.keys.route(name, params);
        tracing::debug!("Reset stack to {}", route.key);

        let mut next = self.stack.clone();
        next.reset(route);
        self.bridge.replace(next.state())?;
        Ok(self.commit(next))
    }

    /// Ask the platform to go back; the stack changes on the pop-state
    pub(crate) fn go_back(&mut self, count: usize) -> Result<Vec<TransitionEvent>> {
        let count = count.min(self.stack.index());
        if count == 0 {
            return Ok(Vec::new());
        }
        let delta = -isize::try_from(count).unwrap_or(isize::MAX);
        if self.bridge.go(delta) {
            return Ok(Vec::new());
        }

        // The platform has no entries to go back to; pop locally instead
        let mut next = self.stack.clone();
        next.pop(count);
        next.truncate_forward();
        self.bridge.replace(next.state())?;
        Ok(self.commit(next))
    }

    pub(crate) fn pop_to_top(&mut self) -> Result<Vec<TransitionEvent>> {
        let depth = self.stack.index();
        self.go_back(depth)
    }

    /// Reconcile a back/forward traversal the platform reported
    ///
    /// The entry the platform is on now wins over the event payload: a
    /// navigation may have written a newer entry after the traversal was
    /// queued. The payload is only used when the entry has no state.
    pub(crate) fn apply_pop_state(&mut self, payload: Option<Value>) -> Result<Vec<TransitionEvent>> {
        let current = self.bridge.current_entry();
        let entry_is_blank = current.is_none();
        let snapshot = match current.or(payload) {
            Some(value) => read_snapshot(&value),
            None => Err(HistoryError::MissingRoutes),
        };

        let mut next = self.stack.clone();
        match snapshot {
            Ok(snapshot) => {
                tracing::debug!("Pop-state to index {} of {}", snapshot.index, snapshot.routes.len());
                self.keys.observe(&snapshot.routes);
                next.restore(snapshot)?;
                if entry_is_blank {
                    self.bridge.replace(next.state())?;
                }
            }
            Err(e) => {
                tracing::warn!("Pop-state without a usable snapshot ({}), resetting stack", e);
                let route = self.keys.route(&self.initial_name, self.initial_params.clone());
                next.reset(route);
                self.bridge.replace(next.state())?;
            }
        }
        Ok(self.commit(next))
    }

    pub(crate) fn set_options(&mut self, key: &str, options: &ScreenOptions) {
        self.options.set_dynamic(key, options);
    }

    pub(crate) fn register_scroll_container(&mut self, key: &str, id: ScrollContainerId) {
        self.scroll.register(key, id);
    }

    fn commit(&mut self, next: RouteStack) -> Vec<TransitionEvent> {
        let previous = std::mem::replace(&mut self.stack, next);
        let options = &self.options;
        let events = self
            .engine
            .sync(previous.state(), self.stack.state(), |route| options.resolve(route).preset());
        self.collect_garbage();
        events
    }

    fn animate(&mut self, step: impl FnOnce(&mut TransitionEngine) -> Vec<TransitionEvent>) -> Vec<TransitionEvent> {
        let events = step(&mut self.engine);
        self.collect_garbage();
        events
    }

    fn collect_garbage(&mut self) {
        for key in self.engine.drain_unmounted() {
            self.scroll.remove(&key);
        }
        if self.prune {
            let state = self.stack.state();
            let engine = &self.engine;
            self.options
                .prune(|key| state.position(key).is_some() || engine.is_mounted(key));
        }
    }

    pub(crate) fn resolved_options(&self, key: &str) -> Option<ResolvedOptions> {
        self.route(key).map(|route| self.options.resolve(route))
    }

    pub(crate) fn header_props(&self, key: &str) -> Option<HeaderProps> {
        let options = self.resolved_options(key)?;
        let can_go_back = self
            .stack
            .state()
            .position(key)
            .is_some_and(|pos| pos > 0);
        Some(HeaderProps::new(
            &options,
            can_go_back,
            self.scroll.get(key).cloned(),
        ))
    }

    pub(crate) fn mounted_route(&self, key: &str) -> Option<&Route> {
        self.engine.get(key).map(|s| &s.route)
    }

    fn route(&self, key: &str) -> Option<&Route> {
        self.mounted_route(key)
            .or_else(|| self.stack.routes().iter().find(|r| r.key == key))
    }
}

/// State shared between the navigator, its handles and the history listener
pub(crate) struct Shared {
    core: Mutex<Core>,
    bus: EventBus,
}

impl Shared {
    /// Run `f` under the core lock, then deliver the events it produced
    pub(crate) fn run<T>(
        &self,
        f: impl FnOnce(&mut Core) -> Result<(T, Vec<TransitionEvent>)>,
    ) -> Result<T> {
        let (out, events) = {
            let mut core = self.core.lock();
            f(&mut core)?
        };
        self.bus.emit_all(&events);
        Ok(out)
    }

    /// Run a step that cannot fail, then deliver its events
    pub(crate) fn drive(&self, f: impl FnOnce(&mut Core) -> Vec<TransitionEvent>) {
        let events = {
            let mut core = self.core.lock();
            f(&mut core)
        };
        self.bus.emit_all(&events);
    }

    pub(crate) fn bus(&self) -> &EventBus {
        &self.bus
    }

    fn pop_state(&self, state: Option<Value>) {
        if let Err(e) = self.run(|core| Ok(((), core.apply_pop_state(state)?))) {
            tracing::error!("Failed to apply pop-state: {}", e);
        }
    }
}

// =============================================================================
// Navigator
// =============================================================================

/// Builder for [`StackNavigator`]
pub struct StackNavigatorBuilder<V> {
    config: NavigatorConfig,
    screens: Vec<ScreenConfig<V>>,
}

impl<V> StackNavigatorBuilder<V> {
    /// Register a screen
    pub fn screen(mut self, screen: ScreenConfig<V>) -> Self {
        self.screens.push(screen);
        self
    }

    /// Mount the navigator on a platform history
    ///
    /// Picks the initial stack (history snapshot, then URL, then the
    /// configured initial route), writes it into the current entry and
    /// starts listening for back/forward traversals.
    pub fn build(self, history: impl PlatformHistory + 'static) -> Result<StackNavigator<V>> {
        let StackNavigatorBuilder { config, screens } = self;
        if screens.is_empty() {
            return Err(NavigationError::NoScreens);
        }

        let mut options = OptionsResolver::new(config.screen_options.clone());
        let mut renderers = HashMap::new();
        for screen in screens {
            options.register(screen.name.clone(), screen.options);
            renderers.insert(screen.name, screen.renderer);
        }
        if !options.is_registered(&config.initial_route_name) {
            return Err(NavigationError::UnknownScreen(config.initial_route_name));
        }

        let mut bridge = HistoryBridge::new(Box::new(history), config.url_mode.clone());
        let mut keys = KeyGenerator::new();
        let initial = bridge.initial_state(
            &mut keys,
            |name| options.is_registered(name),
            &config.initial_route_name,
            config.initial_params.clone(),
        );
        bridge.replace(&initial.state)?;
        tracing::info!(
            "Mounted navigator on {} ({:?})",
            initial.state.active().key,
            initial.source
        );

        let active = initial.state.active().clone();
        let engine = TransitionEngine::new(active.clone(), options.resolve(&active).preset());
        let stack = RouteStack::from_state(initial.state)?;

        let shared = Arc::new(Shared {
            core: Mutex::new(Core {
                stack,
                keys,
                bridge,
                options,
                engine,
                scroll: ScrollContainerRegistry::new(),
                initial_name: config.initial_route_name,
                initial_params: config.initial_params,
                prune: config.prune_dynamic_options,
            }),
            bus: EventBus::new(),
        });

        let weak = Arc::downgrade(&shared);
        shared
            .core
            .lock()
            .bridge
            .on_external_change(Box::new(move |state| {
                if let Some(shared) = weak.upgrade() {
                    shared.pop_state(state);
                }
            }));

        Ok(StackNavigator { shared, renderers })
    }
}

/// A stack navigator mounted on a platform history
pub struct StackNavigator<V> {
    shared: Arc<Shared>,
    renderers: HashMap<String, ScreenRenderer<V>>,
}

impl<V> StackNavigator<V> {
    /// Start building a navigator
    pub fn builder(config: NavigatorConfig) -> StackNavigatorBuilder<V> {
        StackNavigatorBuilder {
            config,
            screens: Vec::new(),
        }
    }

    /// Current stack
    pub fn state(&self) -> StackState {
        self.shared.core.lock().state().clone()
    }

    /// Snapshot stored in the platform's current history entry
    pub fn history_snapshot(&self) -> std::result::Result<StackState, HistoryError> {
        self.shared.core.lock().bridge.current_snapshot()
    }

    /// Navigator-wide event bus
    pub fn events(&self) -> &EventBus {
        self.shared.bus()
    }

    /// Handle for a mounted route
    pub fn handle(&self, key: &str) -> Result<NavigationHandle> {
        self.shared.core.lock().ensure_mounted(key)?;
        Ok(NavigationHandle::new(key, Arc::downgrade(&self.shared)))
    }

    /// Handle for the active route
    pub fn active_handle(&self) -> NavigationHandle {
        let key = self.shared.core.lock().state().active().key.clone();
        NavigationHandle::new(key, Arc::downgrade(&self.shared))
    }

    /// Reconcile a back/forward traversal delivered by the host
    pub fn handle_pop_state(&self, state: Option<Value>) -> Result<()> {
        self.shared
            .run(|core| Ok(((), core.apply_pop_state(state)?)))
    }

    /// Let animation time pass
    pub fn advance(&self, elapsed: Duration) {
        self.shared
            .drive(|core| core.animate(|engine| engine.advance(elapsed)));
    }

    /// Animation completion callback for one screen
    pub fn finish_transition(&self, key: &str) {
        self.shared
            .drive(|core| core.animate(|engine| engine.finish(key)));
    }

    /// Complete every running animation
    pub fn finish_transitions(&self) {
        self.shared
            .drive(|core| core.animate(TransitionEngine::finish_all));
    }

    /// Whether a transition is in flight
    pub fn is_transitioning(&self) -> bool {
        self.shared.core.lock().engine.is_transitioning()
    }

    /// Mounted screens, bottom to top
    pub fn mounted(&self) -> Vec<MountedScreen> {
        self.shared.core.lock().engine.mounted().to_vec()
    }

    /// Effective options of a route in the stack or still mounted
    pub fn resolved_options(&self, key: &str) -> Option<ResolvedOptions> {
        self.shared.core.lock().resolved_options(key)
    }

    /// Header props for a route
    pub fn header_props(&self, key: &str) -> Option<HeaderProps> {
        self.shared.core.lock().header_props(key)
    }

    /// Scroll container registered by a route
    pub fn scroll_container(&self, key: &str) -> Option<ScrollContainerId> {
        self.shared.core.lock().scroll.get(key).cloned()
    }

    /// Number of registered scroll containers
    pub fn scroll_container_count(&self) -> usize {
        self.shared.core.lock().scroll.len()
    }

    /// Render every mounted screen, bottom to top
    ///
    /// Screens whose name has no renderer are skipped with a warning.
    pub fn render(&self) -> Vec<RenderedScreen<V>> {
        let frames: Vec<(MountedScreen, ResolvedOptions, HeaderProps)> = {
            let core = self.shared.core.lock();
            core.engine
                .mounted()
                .iter()
                .filter_map(|screen| {
                    let options = core.resolved_options(screen.key())?;
                    let header = core.header_props(screen.key())?;
                    Some((screen.clone(), options, header))
                })
                .collect()
        };

        frames
            .into_iter()
            .filter_map(|(screen, options, header)| {
                let Some(renderer) = self.renderers.get(&screen.route.name) else {
                    tracing::warn!(
                        "No screen registered for {}, rendering nothing",
                        screen.route.name
                    );
                    return None;
                };
                let handle = NavigationHandle::new(screen.key(), Arc::downgrade(&self.shared));
                let view = renderer(&screen.route, &handle);
                Some(RenderedScreen {
                    from: *screen.from_keyframe(),
                    to: *screen.to_keyframe(),
                    timing: screen.timing().clone(),
                    phase: screen.phase,
                    route: screen.route,
                    options,
                    header,
                    view,
                    handle,
                })
            })
            .collect()
    }
}
