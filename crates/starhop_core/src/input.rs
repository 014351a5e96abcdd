//! Input state tracking with both edge-triggered and level-triggered queries.
//!
//! - **Level-triggered (held):** `is_held(key)` returns true every frame the key
//!   is physically down. Movement and jump both read held state, matching the
//!   original gameplay rules (jump is held-up while grounded, not press-up).
//!
//! - **Edge-triggered (just_pressed):** true only during the frame the press
//!   happened. Cleared by `end_frame()`, which the main loop calls only after at
//!   least one fixed simulation step has consumed the input. This prevents a
//!   press from being silently lost on a frame with zero simulation steps.

use std::collections::HashSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    Left,
    Right,
    Up,
    Down,
    Escape,
    F3,
    F4,
}

pub struct InputState {
    held: HashSet<Key>,
    just_pressed: HashSet<Key>,
}

impl InputState {
    pub fn new() -> Self {
        Self {
            held: HashSet::new(),
            just_pressed: HashSet::new(),
        }
    }

    pub fn key_down(&mut self, key: Key) {
        if self.held.insert(key) {
            self.just_pressed.insert(key);
        }
    }

    pub fn key_up(&mut self, key: Key) {
        self.held.remove(&key);
    }

    pub fn is_held(&self, key: Key) -> bool {
        self.held.contains(&key)
    }

    pub fn is_just_pressed(&self, key: Key) -> bool {
        self.just_pressed.contains(&key)
    }

    pub fn end_frame(&mut self) {
        self.just_pressed.clear();
    }
}

impl Default for InputState {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_down_sets_held_and_just_pressed() {
        let mut input = InputState::new();
        input.key_down(Key::Left);
        assert!(input.is_held(Key::Left));
        assert!(input.is_just_pressed(Key::Left));
    }

    #[test]
    fn key_up_clears_held() {
        let mut input = InputState::new();
        input.key_down(Key::Left);
        input.key_up(Key::Left);
        assert!(!input.is_held(Key::Left));
    }

    #[test]
    fn key_down_repeat_does_not_double_just_pressed() {
        let mut input = InputState::new();
        input.key_down(Key::Up);
        input.end_frame();
        // OS key-repeat delivers another down event while already held;
        // it must not re-arm just_pressed.
        input.key_down(Key::Up);
        assert!(input.is_held(Key::Up));
        assert!(!input.is_just_pressed(Key::Up));
    }

    #[test]
    fn end_frame_clears_transient_state_but_not_held() {
        let mut input = InputState::new();
        input.key_down(Key::Right);
        input.end_frame();
        assert!(!input.is_just_pressed(Key::Right));
        assert!(input.is_held(Key::Right));
    }

    #[test]
    fn multiple_keys_independent() {
        let mut input = InputState::new();
        input.key_down(Key::Left);
        input.key_down(Key::Up);
        input.key_up(Key::Left);
        assert!(!input.is_held(Key::Left));
        assert!(input.is_held(Key::Up));
    }
}
