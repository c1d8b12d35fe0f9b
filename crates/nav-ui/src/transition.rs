//! Screen transition state machine
//!
//! Each mounted screen is in one of four phases and animates toward one of
//! the preset's variants. The engine never interpolates anything itself:
//! it picks targets, tracks remaining animation time, unmounts screens
//! once their exit settles, and reports lifecycle events.
//!
//! ```text
//! entering ──> active ──> behind ──> (unmounted at transition end)
//!    │            │  ^        │
//!    │            v  └────────┘
//!    └───────> exiting ──> unmounted
//! ```

use nav_state::{Route, StackState};
use serde::Serialize;
use std::time::Duration;

use crate::events::TransitionEvent;
use crate::presets::{Keyframe, Timing, TransitionPreset, Variant};

/// Lifecycle phase of a mounted screen
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    /// Freshly pushed, animating from `enter` to `center`
    Entering,
    /// The active screen
    Active,
    /// Below the active screen
    Behind,
    /// Being removed, animating toward `exit`
    Exiting,
}

/// A screen the host should currently render
#[derive(Debug, Clone, PartialEq)]
pub struct MountedScreen {
    /// Route being rendered
    pub route: Route,
    /// Current phase
    pub phase: Phase,
    /// Variant the current animation started from
    pub from: Variant,
    /// Variant the screen is animating toward
    pub to: Variant,
    /// Preset driving the current animation
    pub preset: TransitionPreset,
    position: usize,
    remaining: Duration,
}

impl MountedScreen {
    fn settled(route: Route, position: usize, preset: TransitionPreset) -> Self {
        Self {
            route,
            phase: Phase::Active,
            from: Variant::Center,
            to: Variant::Center,
            preset,
            position,
            remaining: Duration::ZERO,
        }
    }

    /// Route key
    pub fn key(&self) -> &str {
        &self.route.key
    }

    /// Whether an animation is still running
    pub fn is_animating(&self) -> bool {
        !self.remaining.is_zero()
    }

    /// Time left on the current animation
    pub fn remaining(&self) -> Duration {
        self.remaining
    }

    /// Timing curve of the current animation
    pub fn timing(&self) -> &Timing {
        &self.preset.transition
    }

    /// Keyframe the current animation started from
    pub fn from_keyframe(&self) -> &Keyframe {
        self.preset.keyframe(self.from)
    }

    /// Keyframe the screen is animating toward
    pub fn to_keyframe(&self) -> &Keyframe {
        self.preset.keyframe(self.to)
    }

    fn retarget(&mut self, phase: Phase, to: Variant, preset: &TransitionPreset) {
        self.from = self.to;
        self.to = to;
        self.phase = phase;
        self.remaining = preset.transition.duration();
        self.preset = preset.clone();
    }
}

#[derive(Debug, Clone)]
struct InFlight {
    closing: bool,
    route_key: String,
    waiting: Vec<String>,
}

/// Decides which screens are mounted and where each is animating to
#[derive(Debug, Clone)]
pub struct TransitionEngine {
    mounted: Vec<MountedScreen>,
    in_flight: Option<InFlight>,
    unmounted: Vec<String>,
}

impl TransitionEngine {
    /// Mount the initial route, already settled
    pub fn new(initial: Route, preset: TransitionPreset) -> Self {
        Self {
            mounted: vec![MountedScreen::settled(initial, 0, preset)],
            in_flight: None,
            unmounted: Vec::new(),
        }
    }

    /// Mounted screens, bottom to top
    pub fn mounted(&self) -> &[MountedScreen] {
        &self.mounted
    }

    /// Get a mounted screen by route key
    pub fn get(&self, key: &str) -> Option<&MountedScreen> {
        self.mounted.iter().find(|s| s.route.key == key)
    }

    /// Whether a route is mounted
    pub fn is_mounted(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Whether a transition has started and not yet ended
    pub fn is_transitioning(&self) -> bool {
        self.in_flight.is_some()
    }

    /// Keys unmounted since the last call
    pub fn drain_unmounted(&mut self) -> Vec<String> {
        std::mem::take(&mut self.unmounted)
    }

    /// Move from `previous` to `next`
    ///
    /// `preset_for` resolves a route's animation. Forward transitions use
    /// the entering route's preset; closing transitions use the preset of
    /// the route being dismissed. Returns the events to emit, in order.
    pub fn sync(
        &mut self,
        previous: &StackState,
        next: &StackState,
        preset_for: impl Fn(&Route) -> TransitionPreset,
    ) -> Vec<TransitionEvent> {
        let mut events = Vec::new();
        let active = next.active();
        let prev_active = previous.active();

        if prev_active.key == active.key {
            self.reconcile(next);
            return events;
        }

        // An interrupted transition still gets its end before the next start
        if let Some(flight) = self.in_flight.take() {
            events.push(TransitionEvent::end(flight.closing, flight.route_key));
        }

        let closing = previous
            .position(&active.key)
            .is_some_and(|pos| pos < previous.index);
        let (driver, preset) = if closing {
            (prev_active, preset_for(prev_active))
        } else {
            (active, preset_for(active))
        };
        events.push(TransitionEvent::start(closing, driver.key.clone()));

        let below = next
            .index
            .checked_sub(1)
            .map(|i| next.routes[i].key.as_str());
        let mut waiting = Vec::new();

        for screen in &mut self.mounted {
            let key = screen.route.key.as_str();
            if key == active.key {
                screen.retarget(Phase::Active, Variant::Center, &preset);
            } else if next.contains_live(key) {
                let to = if Some(key) == below {
                    Variant::Behind
                } else {
                    Variant::Hidden
                };
                screen.retarget(Phase::Behind, to, &preset);
            } else if screen.phase != Phase::Exiting {
                screen.retarget(Phase::Exiting, Variant::Exit, &preset);
            } else {
                // Already leaving; let that animation run out
                continue;
            }
            waiting.push(screen.route.key.clone());
        }

        if !self.is_mounted(&active.key) {
            let (phase, from) = if closing {
                (Phase::Active, Variant::Behind)
            } else {
                (Phase::Entering, Variant::Enter)
            };
            self.mounted.push(MountedScreen {
                route: active.clone(),
                phase,
                from,
                to: Variant::Center,
                preset: preset.clone(),
                position: next.index,
                remaining: preset.transition.duration(),
            });
            waiting.push(active.key.clone());
        }

        self.reposition(next);
        self.in_flight = Some(InFlight {
            closing,
            route_key: driver.key.clone(),
            waiting,
        });
        self.settle(&mut events);
        events
    }

    /// Let `elapsed` time pass on every running animation
    pub fn advance(&mut self, elapsed: Duration) -> Vec<TransitionEvent> {
        for screen in &mut self.mounted {
            screen.remaining = screen.remaining.saturating_sub(elapsed);
        }
        let mut events = Vec::new();
        self.settle(&mut events);
        events
    }

    /// Completion callback for one screen's animation
    pub fn finish(&mut self, key: &str) -> Vec<TransitionEvent> {
        if let Some(screen) = self.mounted.iter_mut().find(|s| s.route.key == key) {
            screen.remaining = Duration::ZERO;
        }
        let mut events = Vec::new();
        self.settle(&mut events);
        events
    }

    /// Complete every running animation
    pub fn finish_all(&mut self) -> Vec<TransitionEvent> {
        for screen in &mut self.mounted {
            screen.remaining = Duration::ZERO;
        }
        let mut events = Vec::new();
        self.settle(&mut events);
        events
    }

    /// Same active route: drop screens that left the stack, no animation
    fn reconcile(&mut self, next: &StackState) {
        let active_key = next.active().key.as_str();
        let unmounted = &mut self.unmounted;
        self.mounted.retain(|s| {
            let keep = s.route.key == active_key
                || next.contains_live(&s.route.key)
                || (s.phase == Phase::Exiting && s.is_animating());
            if !keep {
                unmounted.push(s.route.key.clone());
            }
            keep
        });
        self.reposition(next);
    }

    fn reposition(&mut self, next: &StackState) {
        for screen in &mut self.mounted {
            if screen.phase != Phase::Exiting {
                if let Some(pos) = next.position(&screen.route.key) {
                    screen.position = pos;
                }
            }
        }
        // Exiting screens sit under a screen entering at the same position
        self.mounted
            .sort_by_key(|s| (s.position, s.phase != Phase::Exiting));
    }

    fn settle(&mut self, events: &mut Vec<TransitionEvent>) {
        let unmounted = &mut self.unmounted;
        self.mounted.retain_mut(|s| {
            if s.is_animating() {
                return true;
            }
            s.from = s.to;
            match s.phase {
                Phase::Entering => {
                    s.phase = Phase::Active;
                    true
                }
                Phase::Exiting => {
                    unmounted.push(s.route.key.clone());
                    false
                }
                Phase::Behind if s.to == Variant::Hidden => {
                    unmounted.push(s.route.key.clone());
                    false
                }
                _ => true,
            }
        });

        let finished = self.in_flight.as_ref().is_some_and(|flight| {
            flight
                .waiting
                .iter()
                .all(|key| self.get(key).map_or(true, |s| !s.is_animating()))
        });
        if !finished {
            return;
        }

        if let Some(flight) = self.in_flight.take() {
            // Screens behind the active one only stay mounted while animating
            let unmounted = &mut self.unmounted;
            self.mounted.retain(|s| {
                let keep = s.phase != Phase::Behind || s.is_animating();
                if !keep {
                    unmounted.push(s.route.key.clone());
                }
                keep
            });
            events.push(TransitionEvent::end(flight.closing, flight.route_key));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::EventKind;

    const STEP: Duration = Duration::from_millis(300);

    fn route(key: &str) -> Route {
        let name = key.split('-').next().unwrap_or(key);
        Route::new(key, name, None)
    }

    fn state(keys: &[&str], index: usize) -> StackState {
        StackState {
            index,
            routes: keys.iter().map(|k| route(k)).collect(),
        }
    }

    fn slide(_: &Route) -> TransitionPreset {
        TransitionPreset::slide()
    }

    fn engine() -> TransitionEngine {
        TransitionEngine::new(route("Home-0"), TransitionPreset::slide())
    }

    fn phases(engine: &TransitionEngine) -> Vec<(&str, Phase)> {
        engine.mounted().iter().map(|s| (s.key(), s.phase)).collect()
    }

    fn kinds(events: &[TransitionEvent]) -> Vec<(EventKind, bool, &str)> {
        events
            .iter()
            .map(|e| (e.kind, e.closing, e.route_key.as_str()))
            .collect()
    }

    #[test]
    fn test_push_moves_active_behind() {
        let mut engine = engine();
        let events = engine.sync(&state(&["Home-0"], 0), &state(&["Home-0", "A-1"], 1), slide);

        assert_eq!(kinds(&events), [(EventKind::TransitionStart, false, "A-1")]);
        assert_eq!(
            phases(&engine),
            [("Home-0", Phase::Behind), ("A-1", Phase::Entering)]
        );
        let entering = engine.get("A-1").unwrap();
        assert_eq!((entering.from, entering.to), (Variant::Enter, Variant::Center));
        assert_eq!(engine.get("Home-0").unwrap().to, Variant::Behind);

        let events = engine.advance(STEP);
        assert_eq!(kinds(&events), [(EventKind::TransitionEnd, false, "A-1")]);
        assert_eq!(phases(&engine), [("A-1", Phase::Active)]);
        assert_eq!(engine.drain_unmounted(), ["Home-0"]);
    }

    #[test]
    fn test_pop_exits_and_reveals() {
        let mut engine = engine();
        let one = state(&["Home-0", "A-1"], 1);
        engine.sync(&state(&["Home-0"], 0), &one, slide);
        engine.finish_all();

        let events = engine.sync(&one, &state(&["Home-0"], 0), slide);
        assert_eq!(kinds(&events), [(EventKind::TransitionStart, true, "A-1")]);
        assert_eq!(
            phases(&engine),
            [("Home-0", Phase::Active), ("A-1", Phase::Exiting)]
        );
        assert_eq!(engine.get("Home-0").unwrap().from, Variant::Behind);
        assert_eq!(engine.get("A-1").unwrap().to, Variant::Exit);

        // Half way: nothing settles yet
        assert!(engine.advance(STEP / 2).is_empty());
        assert!(engine.is_mounted("A-1"));

        let events = engine.advance(STEP / 2);
        assert_eq!(kinds(&events), [(EventKind::TransitionEnd, true, "A-1")]);
        assert_eq!(phases(&engine), [("Home-0", Phase::Active)]);
    }

    #[test]
    fn test_instant_preset_settles_in_sync() {
        let mut engine = engine();
        let events = engine.sync(
            &state(&["Home-0"], 0),
            &state(&["Home-0", "A-1"], 1),
            |_| TransitionPreset::none(),
        );
        assert_eq!(
            kinds(&events),
            [
                (EventKind::TransitionStart, false, "A-1"),
                (EventKind::TransitionEnd, false, "A-1"),
            ]
        );
        assert!(!engine.is_transitioning());
        assert_eq!(phases(&engine), [("A-1", Phase::Active)]);
    }

    #[test]
    fn test_interrupted_transition_ends_before_next_starts() {
        let mut engine = engine();
        let one = state(&["Home-0", "A-1"], 1);
        engine.sync(&state(&["Home-0"], 0), &one, slide);

        let events = engine.sync(&one, &state(&["Home-0", "A-1", "B-2"], 2), slide);
        assert_eq!(
            kinds(&events),
            [
                (EventKind::TransitionEnd, false, "A-1"),
                (EventKind::TransitionStart, false, "B-2"),
            ]
        );
        assert_eq!(engine.get("Home-0").unwrap().to, Variant::Hidden);
        assert_eq!(engine.get("A-1").unwrap().to, Variant::Behind);

        engine.finish_all();
        assert_eq!(phases(&engine), [("B-2", Phase::Active)]);
    }

    #[test]
    fn test_entering_screen_is_retargeted_to_exit() {
        let mut engine = engine();
        let one = state(&["Home-0", "A-1"], 1);
        engine.sync(&state(&["Home-0"], 0), &one, slide);
        engine.advance(STEP / 3);

        engine.sync(&one, &state(&["Home-0"], 0), slide);
        let leaving = engine.get("A-1").unwrap();
        assert_eq!(leaving.phase, Phase::Exiting);
        assert_eq!((leaving.from, leaving.to), (Variant::Center, Variant::Exit));
        assert_eq!(leaving.remaining(), STEP);

        engine.finish("A-1");
        assert!(!engine.is_mounted("A-1"));
        assert!(engine.is_transitioning());

        let events = engine.finish("Home-0");
        assert_eq!(kinds(&events), [(EventKind::TransitionEnd, true, "A-1")]);
        assert!(!engine.is_transitioning());
    }

    #[test]
    fn test_exiting_screen_finishes_after_its_pair_closed() {
        let mut engine = engine();
        let one = state(&["Home-0", "A-1"], 1);
        engine.sync(&state(&["Home-0"], 0), &one, slide);
        engine.finish_all();
        let home = state(&["Home-0"], 0);
        engine.sync(&one, &home, slide);
        engine.advance(STEP / 2);

        // A new push interrupts the pop; A keeps exiting on its own clock
        let events = engine.sync(&home, &state(&["Home-0", "C-2"], 1), slide);
        assert_eq!(events[0], TransitionEvent::end(true, "A-1"));
        assert_eq!(engine.get("A-1").unwrap().phase, Phase::Exiting);
        assert_eq!(engine.get("A-1").unwrap().remaining(), STEP / 2);

        engine.advance(STEP / 2);
        assert!(!engine.is_mounted("A-1"));
        assert!(engine.is_transitioning());

        let events = engine.advance(STEP / 2);
        assert_eq!(kinds(&events), [(EventKind::TransitionEnd, false, "C-2")]);
    }

    #[test]
    fn test_replace_orders_exiting_below_entering() {
        let mut engine = engine();
        let events = engine.sync(&state(&["Home-0"], 0), &state(&["X-1"], 0), slide);
        assert_eq!(kinds(&events), [(EventKind::TransitionStart, false, "X-1")]);
        assert_eq!(
            phases(&engine),
            [("Home-0", Phase::Exiting), ("X-1", Phase::Entering)]
        );
    }

    #[test]
    fn test_same_active_reconciles_without_events() {
        let mut engine = engine();
        let events = engine.sync(&state(&["Home-0"], 0), &state(&["Home-0"], 0), slide);
        assert!(events.is_empty());
        assert_eq!(phases(&engine), [("Home-0", Phase::Active)]);
    }

    #[test]
    fn test_closing_uses_dismissed_route_preset() {
        let mut engine = engine();
        let one = state(&["Home-0", "Sheet-1"], 1);
        let modal_for_sheet = |r: &Route| {
            if r.name == "Sheet" {
                TransitionPreset::modal()
            } else {
                TransitionPreset::fade()
            }
        };
        engine.sync(&state(&["Home-0"], 0), &one, modal_for_sheet);
        assert_eq!(engine.get("Sheet-1").unwrap().preset, TransitionPreset::modal());
        engine.finish_all();

        engine.sync(&one, &state(&["Home-0"], 0), modal_for_sheet);
        assert_eq!(engine.get("Home-0").unwrap().preset, TransitionPreset::modal());
    }
}
