//! Shared fixtures for navigator integration tests

#![allow(dead_code)]

use parking_lot::Mutex;
use stack_navigator::{
    Animation, EventKind, MemoryHistory, NavigatorConfig, ScreenConfig, ScreenOptions,
    StackNavigator, TransitionEvent,
};
use std::sync::{Arc, Once};

static INIT: Once = Once::new();

/// Install a test-friendly tracing subscriber once per test binary
pub fn init_tracing() {
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
            )
            .with_test_writer()
            .try_init();
    });
}

/// Screens used across scenarios; renderers return the route key
pub fn screens(config: NavigatorConfig) -> stack_navigator::ui::StackNavigatorBuilder<String> {
    StackNavigator::builder(config)
        .screen(ScreenConfig::new("Home", |r, _| r.key.clone()))
        .screen(ScreenConfig::new("Profile", |r, _| r.key.clone()))
        .screen(ScreenConfig::new("Settings", |r, _| r.key.clone()))
        .screen(ScreenConfig::new("X", |r, _| r.key.clone()))
        .screen(
            ScreenConfig::new("Compose", |r, _| r.key.clone())
                .options(ScreenOptions::new().animation(Animation::named("modal"))),
        )
}

/// Navigator on a fresh in-memory history starting at Home
pub fn navigator() -> (StackNavigator<String>, MemoryHistory) {
    init_tracing();
    let history = MemoryHistory::new("/");
    let nav = screens(NavigatorConfig::new("Home"))
        .build(history.clone())
        .unwrap();
    (nav, history)
}

/// Record every start and end event in delivery order
pub fn record_events(nav: &StackNavigator<String>) -> Arc<Mutex<Vec<TransitionEvent>>> {
    let log = Arc::new(Mutex::new(Vec::new()));
    for kind in [EventKind::TransitionStart, EventKind::TransitionEnd] {
        let log = log.clone();
        nav.events()
            .add_listener(kind, move |event| log.lock().push(event.clone()));
    }
    log
}

/// Keys of the current stack, bottom to top
pub fn keys(nav: &StackNavigator<String>) -> Vec<String> {
    nav.state().routes.into_iter().map(|r| r.key).collect()
}
