//! Keyboard mapping and held-key tracking
//!
//! Key-down/key-up events arrive between frames; [`InputState`] folds them into
//! one [`TickInput`] per tick. Held keys persist, presses are consumed.

use crate::sim::{Steer, TickInput};

/// Game action bound to a physical key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InputAction {
    SteerLeft,
    SteerRight,
    Jump,
    Pause,
    ToggleCamera,
    ToggleFps,
    Reset,
    Ability,
}

impl InputAction {
    /// Map a `KeyboardEvent.code` to an action
    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "KeyA" | "ArrowLeft" => Some(InputAction::SteerLeft),
            "KeyD" | "ArrowRight" => Some(InputAction::SteerRight),
            "Space" | "ArrowUp" => Some(InputAction::Jump),
            "KeyP" | "Escape" => Some(InputAction::Pause),
            "KeyV" => Some(InputAction::ToggleCamera),
            "KeyF" => Some(InputAction::ToggleFps),
            "KeyR" => Some(InputAction::Reset),
            "KeyQ" => Some(InputAction::Ability),
            _ => None,
        }
    }

    /// Whether the browser default for this key should be suppressed
    pub fn prevents_default(&self) -> bool {
        matches!(self, InputAction::Jump)
    }
}

/// Input accumulated since the last tick
#[derive(Debug, Clone, Default)]
pub struct InputState {
    left_held: bool,
    right_held: bool,
    jump_pressed: bool,
    ability_pressed: bool,
    pause_pressed: bool,
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a key press. Toggles and reset are handled by the session.
    pub fn key_down(&mut self, action: InputAction) {
        match action {
            InputAction::SteerLeft => self.left_held = true,
            InputAction::SteerRight => self.right_held = true,
            InputAction::Jump => self.jump_pressed = true,
            InputAction::Ability => self.ability_pressed = true,
            InputAction::Pause => self.pause_pressed = true,
            InputAction::ToggleCamera | InputAction::ToggleFps | InputAction::Reset => {}
        }
    }

    pub fn key_up(&mut self, action: InputAction) {
        match action {
            InputAction::SteerLeft => self.left_held = false,
            InputAction::SteerRight => self.right_held = false,
            _ => {}
        }
    }

    /// Build this tick's input and consume one-shot presses
    pub fn take_tick_input(&mut self) -> TickInput {
        let input = TickInput {
            steer: Steer::from_keys(self.left_held, self.right_held),
            jump: self.jump_pressed,
            ability: self.ability_pressed,
            pause: self.pause_pressed,
        };
        self.jump_pressed = false;
        self.ability_pressed = false;
        self.pause_pressed = false;
        input
    }

    /// Forget everything (window blur, run reset)
    pub fn clear(&mut self) {
        *self = Self::default();
    }
}
