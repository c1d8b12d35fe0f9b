//! Transition presets
//!
//! A preset is pure data: five keyframe-like variants and a timing curve.
//! The transition engine only decides which variant each mounted screen
//! animates toward; the host renderer interpolates between them.

use serde::{Deserialize, Serialize};

// =============================================================================
// Timing Tokens
// =============================================================================

/// Animation durations in milliseconds
pub mod duration {
    /// Instant (0ms)
    pub const INSTANT: u32 = 0;
    /// Fast (150ms), fades
    pub const FAST: u32 = 150;
    /// Normal (300ms), horizontal slides
    pub const NORMAL: u32 = 300;
    /// Slow (400ms), full-height sheets
    pub const SLOW: u32 = 400;
}

/// Easing curves
pub mod easing {
    /// Default easing curve (cubic-bezier)
    pub const DEFAULT: &str = "cubic-bezier(0.17, 0.73, 0.14, 1)";
    /// Linear
    pub const LINEAR: &str = "linear";
    /// Ease out
    pub const EASE_OUT: &str = "cubic-bezier(0, 0, 0.2, 1)";
    /// Ease in out
    pub const EASE_IN_OUT: &str = "cubic-bezier(0.4, 0, 0.2, 1)";
}

/// Built-in preset names
pub mod names {
    /// Horizontal push/pop
    pub const SLIDE: &str = "slide";
    /// Cross-fade
    pub const FADE: &str = "fade";
    /// Sheet rising from the bottom
    pub const MODAL: &str = "modal";
    /// No animation
    pub const NONE: &str = "none";
}

// =============================================================================
// Variants
// =============================================================================

/// Named animation targets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Variant {
    /// Where a pushed screen starts
    Enter,
    /// Resting position of the active screen
    Center,
    /// The screen directly under the active one
    Behind,
    /// Where a popped screen ends
    Exit,
    /// Screens further down the stack
    Hidden,
}

/// A single visual state
///
/// Translations are percentages of the container size.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Keyframe {
    /// Horizontal offset (%)
    #[serde(default)]
    pub translate_x: f32,
    /// Vertical offset (%)
    #[serde(default)]
    pub translate_y: f32,
    /// Opacity (0.0 - 1.0)
    #[serde(default = "default_one")]
    pub opacity: f32,
    /// Scale factor
    #[serde(default = "default_one")]
    pub scale: f32,
}

fn default_one() -> f32 {
    1.0
}

impl Default for Keyframe {
    fn default() -> Self {
        Self {
            translate_x: 0.0,
            translate_y: 0.0,
            opacity: 1.0,
            scale: 1.0,
        }
    }
}

impl Keyframe {
    fn x(translate_x: f32) -> Self {
        Self {
            translate_x,
            ..Self::default()
        }
    }

    fn y(translate_y: f32) -> Self {
        Self {
            translate_y,
            ..Self::default()
        }
    }

    fn faded(mut self, opacity: f32) -> Self {
        self.opacity = opacity;
        self
    }
}

/// The five variants of a preset
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct Variants {
    /// Start of a pushed screen
    pub enter: Keyframe,
    /// Active screen
    pub center: Keyframe,
    /// Screen under the active one
    pub behind: Keyframe,
    /// End of a popped screen
    pub exit: Keyframe,
    /// Screens further down
    pub hidden: Keyframe,
}

impl Variants {
    /// Get the keyframe for a variant
    pub fn get(&self, variant: Variant) -> &Keyframe {
        match variant {
            Variant::Enter => &self.enter,
            Variant::Center => &self.center,
            Variant::Behind => &self.behind,
            Variant::Exit => &self.exit,
            Variant::Hidden => &self.hidden,
        }
    }
}

/// Timing curve descriptor
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Timing {
    /// Duration in milliseconds
    pub duration_ms: u32,
    /// CSS-style easing curve
    pub easing: String,
}

impl Timing {
    /// Create a timing descriptor
    pub fn new(duration_ms: u32, easing: &str) -> Self {
        Self {
            duration_ms,
            easing: easing.to_string(),
        }
    }

    /// Duration as a [`std::time::Duration`]
    pub fn duration(&self) -> std::time::Duration {
        std::time::Duration::from_millis(u64::from(self.duration_ms))
    }

    /// Whether the transition happens without intermediate frames
    pub fn is_instant(&self) -> bool {
        self.duration_ms == 0
    }
}

/// A complete transition preset
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransitionPreset {
    /// Visual states
    pub variants: Variants,
    /// Timing curve
    pub transition: Timing,
}

impl TransitionPreset {
    /// Horizontal slide with a parallax peek of the screen behind
    pub fn slide() -> Self {
        Self {
            variants: Variants {
                enter: Keyframe::x(100.0),
                center: Keyframe::default(),
                behind: Keyframe::x(-30.0),
                exit: Keyframe::x(100.0),
                hidden: Keyframe::x(-30.0).faded(0.0),
            },
            transition: Timing::new(duration::NORMAL, easing::DEFAULT),
        }
    }

    /// Cross-fade
    pub fn fade() -> Self {
        let hidden = Keyframe::default().faded(0.0);
        Self {
            variants: Variants {
                enter: hidden,
                center: Keyframe::default(),
                behind: hidden,
                exit: hidden,
                hidden,
            },
            transition: Timing::new(duration::FAST, easing::EASE_IN_OUT),
        }
    }

    /// Sheet sliding up over a dimmed screen
    pub fn modal() -> Self {
        Self {
            variants: Variants {
                enter: Keyframe::y(100.0),
                center: Keyframe::default(),
                behind: Keyframe {
                    scale: 0.94,
                    ..Keyframe::default().faded(0.6)
                },
                exit: Keyframe::y(100.0),
                hidden: Keyframe::default().faded(0.0),
            },
            transition: Timing::new(duration::SLOW, easing::EASE_OUT),
        }
    }

    /// Instant change with no intermediate frame
    pub fn none() -> Self {
        Self {
            variants: Variants::default(),
            transition: Timing::new(duration::INSTANT, easing::LINEAR),
        }
    }

    /// Look up a built-in preset by name
    pub fn named(name: &str) -> Option<Self> {
        match name {
            names::SLIDE => Some(Self::slide()),
            names::FADE => Some(Self::fade()),
            names::MODAL => Some(Self::modal()),
            names::NONE => Some(Self::none()),
            _ => None,
        }
    }

    /// Get the keyframe for a variant
    pub fn keyframe(&self, variant: Variant) -> &Keyframe {
        self.variants.get(variant)
    }
}

impl Default for TransitionPreset {
    fn default() -> Self {
        Self::slide()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_named_presets() {
        for name in [names::SLIDE, names::FADE, names::MODAL, names::NONE] {
            assert!(TransitionPreset::named(name).is_some(), "{name} missing");
        }
        assert!(TransitionPreset::named("spin").is_none());
    }

    #[test]
    fn test_none_is_instant() {
        assert!(TransitionPreset::none().transition.is_instant());
        assert!(!TransitionPreset::slide().transition.is_instant());
    }

    #[test]
    fn test_slide_variants() {
        let slide = TransitionPreset::slide();
        assert_eq!(slide.keyframe(Variant::Enter).translate_x, 100.0);
        assert_eq!(slide.keyframe(Variant::Center).translate_x, 0.0);
        assert_eq!(slide.keyframe(Variant::Hidden).opacity, 0.0);
    }

    #[test]
    fn test_inline_preset_deserializes_with_defaults() {
        let json = serde_json::json!({
            "variants": {
                "enter": { "translateY": 50.0 },
                "center": {},
                "behind": { "opacity": 0.5 },
                "exit": { "translateY": 50.0 },
                "hidden": { "opacity": 0.0 }
            },
            "transition": { "durationMs": 250, "easing": "linear" }
        });
        let preset: TransitionPreset = serde_json::from_value(json).unwrap();
        assert_eq!(preset.variants.enter.translate_y, 50.0);
        assert_eq!(preset.variants.enter.opacity, 1.0);
        assert_eq!(preset.transition.duration().as_millis(), 250);
    }
}
