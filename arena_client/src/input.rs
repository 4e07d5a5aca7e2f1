//! Input handling.
//!
//! Platform code forwards raw device events into [`InputSampler`]; the
//! simulator reads it once per frame. There is no queueing or debouncing: the
//! sampler mirrors what is held right now and where the pointer is.

use std::collections::HashSet;

use arena_shared::{config::KeyBindings, math::Vec2};
use bitflags::bitflags;

bitflags! {
    /// Discrete intents the simulator understands.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct Intent: u8 {
        const UP    = 1 << 0;
        const DOWN  = 1 << 1;
        const LEFT  = 1 << 2;
        const RIGHT = 1 << 3;
        /// Primary pointer button.
        const FIRE  = 1 << 4;

        const MOVEMENT = Self::UP.bits() | Self::DOWN.bits() | Self::LEFT.bits() | Self::RIGHT.bits();
    }
}

impl Intent {
    /// Movement intents and their screen-space directions (+y is down).
    pub const AXES: [(Intent, Vec2); 4] = [
        (Intent::UP, Vec2::new(0.0, -1.0)),
        (Intent::DOWN, Vec2::new(0.0, 1.0)),
        (Intent::LEFT, Vec2::new(-1.0, 0.0)),
        (Intent::RIGHT, Vec2::new(1.0, 0.0)),
    ];
}

/// Pointer buttons.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerButton {
    Primary,
    Secondary,
    Other(u8),
}

/// Raw device events.
#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
    KeyDown(String),
    KeyUp(String),
    PointerDown(PointerButton),
    PointerUp(PointerButton),
    PointerMove { x: f32, y: f32 },
    /// Secondary-click menu request; swallowed so it never reaches the platform.
    ContextMenu,
}

/// Current-state mirror of the input devices.
#[derive(Debug, Clone, Default)]
pub struct InputSampler {
    bindings: KeyBindings,
    keys: HashSet<String>,
    pointer_fire: bool,
    pointer: Vec2,
}

impl InputSampler {
    pub fn new(bindings: KeyBindings) -> Self {
        Self {
            bindings,
            ..Self::default()
        }
    }

    /// Applies one device event. Returns true if the event was consumed and
    /// its platform default should be suppressed.
    pub fn handle(&mut self, event: InputEvent) -> bool {
        match event {
            InputEvent::KeyDown(key) => {
                self.keys.insert(key);
                false
            }
            InputEvent::KeyUp(key) => {
                self.keys.remove(&key);
                false
            }
            InputEvent::PointerDown(PointerButton::Primary) => {
                self.pointer_fire = true;
                false
            }
            InputEvent::PointerUp(PointerButton::Primary) => {
                self.pointer_fire = false;
                false
            }
            InputEvent::PointerDown(_) | InputEvent::PointerUp(_) => false,
            InputEvent::PointerMove { x, y } => {
                self.pointer = Vec2::new(x, y);
                false
            }
            InputEvent::ContextMenu => true,
        }
    }

    /// Returns true if every intent in `intent` is currently held.
    pub fn held(&self, intent: Intent) -> bool {
        self.intents().contains(intent)
    }

    /// All intents currently held.
    pub fn intents(&self) -> Intent {
        let mut out = Intent::empty();
        let b = &self.bindings;
        for (key, intent) in [
            (&b.up, Intent::UP),
            (&b.down, Intent::DOWN),
            (&b.left, Intent::LEFT),
            (&b.right, Intent::RIGHT),
        ] {
            if self.keys.contains(key) {
                out |= intent;
            }
        }
        if self.pointer_fire {
            out |= Intent::FIRE;
        }
        out
    }

    pub fn pointer(&self) -> Vec2 {
        self.pointer
    }

    /// Releases everything, e.g. when the window loses focus.
    pub fn clear(&mut self) {
        self.keys.clear();
        self.pointer_fire = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sampler() -> InputSampler {
        InputSampler::new(KeyBindings::default())
    }

    #[test]
    fn mirrors_held_keys() {
        let mut input = sampler();
        input.handle(InputEvent::KeyDown("w".into()));
        input.handle(InputEvent::KeyDown("d".into()));
        assert!(input.held(Intent::UP));
        assert!(input.held(Intent::UP | Intent::RIGHT));
        assert!(!input.held(Intent::DOWN));

        input.handle(InputEvent::KeyUp("w".into()));
        assert_eq!(input.intents(), Intent::RIGHT);
    }

    #[test]
    fn unbound_keys_map_to_nothing() {
        let mut input = sampler();
        input.handle(InputEvent::KeyDown("q".into()));
        assert!(input.intents().is_empty());
    }

    #[test]
    fn only_primary_button_fires() {
        let mut input = sampler();
        input.handle(InputEvent::PointerDown(PointerButton::Secondary));
        assert!(!input.held(Intent::FIRE));
        input.handle(InputEvent::PointerDown(PointerButton::Primary));
        assert!(input.held(Intent::FIRE));
        input.handle(InputEvent::PointerUp(PointerButton::Primary));
        assert!(!input.held(Intent::FIRE));
    }

    #[test]
    fn tracks_pointer_and_swallows_context_menu() {
        let mut input = sampler();
        assert!(!input.handle(InputEvent::PointerMove { x: 200.0, y: 100.0 }));
        assert_eq!(input.pointer(), Vec2::new(200.0, 100.0));
        assert!(input.handle(InputEvent::ContextMenu));
    }

    #[test]
    fn clear_releases_everything() {
        let mut input = sampler();
        input.handle(InputEvent::KeyDown("a".into()));
        input.handle(InputEvent::PointerDown(PointerButton::Primary));
        input.clear();
        assert!(input.intents().is_empty());
    }

    #[test]
    fn custom_bindings() {
        let mut input = InputSampler::new(KeyBindings {
            up: "ArrowUp".into(),
            ..KeyBindings::default()
        });
        input.handle(InputEvent::KeyDown("w".into()));
        assert!(!input.held(Intent::UP));
        input.handle(InputEvent::KeyDown("ArrowUp".into()));
        assert!(input.held(Intent::UP));
    }
}
