/// Platform-agnostic input handling system
use std::collections::HashSet;

/// Platform-independent input events
#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
    // Keyboard events
    KeyDown(String),
    KeyUp(String),

    // Pointer events, position in viewport pixels
    MouseDown { button: MouseButton, x: f32, y: f32 },

    // Window events
    FocusLost,
    Resized { width: u32, height: u32 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MouseButton {
    Left,
    Right,
    Middle,
    Other(u16),
}

impl MouseButton {
    pub fn from_web_button(button: i16) -> Self {
        match button {
            0 => MouseButton::Left,
            1 => MouseButton::Middle,
            2 => MouseButton::Right,
            other => MouseButton::Other(other.max(0) as u16),
        }
    }
}

/// Keys currently held, stored lower-cased
pub struct InputState {
    pub pressed_keys: HashSet<String>,
}

impl InputState {
    pub fn new() -> Self {
        Self {
            pressed_keys: HashSet::new(),
        }
    }

    /// Process an input event and update state
    pub fn process_event(&mut self, event: &InputEvent) {
        match event {
            InputEvent::KeyDown(key) => {
                self.pressed_keys.insert(key.to_lowercase());
            }
            InputEvent::KeyUp(key) => {
                self.pressed_keys.remove(&key.to_lowercase());
            }
            InputEvent::FocusLost => {
                self.clear_keys();
            }
            _ => {}
        }
    }

    pub fn is_key_pressed(&self, key: &str) -> bool {
        self.pressed_keys.contains(&key.to_lowercase())
    }

    pub fn clear_keys(&mut self) {
        self.pressed_keys.clear();
    }
}

impl Default for InputState {
    fn default() -> Self {
        Self::new()
    }
}

/// Key mapping configuration
#[derive(Clone)]
pub struct KeyBindings {
    pub forward: String,
    pub backward: String,
    pub left: String,
    pub right: String,
    pub jump: String,
}

impl Default for KeyBindings {
    fn default() -> Self {
        Self {
            forward: "w".to_string(),
            backward: "s".to_string(),
            left: "a".to_string(),
            right: "d".to_string(),
            jump: " ".to_string(),
        }
    }
}

/// Which movement keys are held this frame
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct MovementIntent {
    pub forward: bool,
    pub backward: bool,
    pub left: bool,
    pub right: bool,
    pub jump: bool,
}

/// High-level input processor
#[derive(Clone, Default)]
pub struct InputProcessor {
    bindings: KeyBindings,
}

impl InputProcessor {
    pub fn new(bindings: KeyBindings) -> Self {
        Self { bindings }
    }

    /// Snapshot of the movement keys, taken once per frame
    pub fn movement(&self, input: &InputState) -> MovementIntent {
        MovementIntent {
            forward: input.is_key_pressed(&self.bindings.forward),
            backward: input.is_key_pressed(&self.bindings.backward),
            left: input.is_key_pressed(&self.bindings.left),
            right: input.is_key_pressed(&self.bindings.right),
            jump: input.is_key_pressed(&self.bindings.jump),
        }
    }

    /// Keys whose browser default (scrolling) should be suppressed in game
    pub fn is_game_key(&self, key: &str) -> bool {
        let key = key.to_lowercase();
        [
            &self.bindings.forward,
            &self.bindings.backward,
            &self.bindings.left,
            &self.bindings.right,
            &self.bindings.jump,
        ]
        .iter()
        .any(|k| **k == key)
    }
}

#[cfg(target_arch = "wasm32")]
pub mod wasm {
    use super::*;
    use web_sys::{KeyboardEvent, MouseEvent};

    pub fn keyboard_event_to_input(e: &KeyboardEvent, is_down: bool) -> InputEvent {
        let key = e.key();
        if is_down {
            InputEvent::KeyDown(key)
        } else {
            InputEvent::KeyUp(key)
        }
    }

    pub fn mouse_down_to_input(e: &MouseEvent) -> InputEvent {
        InputEvent::MouseDown {
            button: MouseButton::from_web_button(e.button()),
            x: e.client_x() as f32,
            y: e.client_y() as f32,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keys_are_case_insensitive() {
        let mut input = InputState::new();
        input.process_event(&InputEvent::KeyDown("W".to_string()));
        assert!(input.is_key_pressed("w"));

        input.process_event(&InputEvent::KeyUp("w".to_string()));
        assert!(!input.is_key_pressed("W"));
    }

    #[test]
    fn test_focus_lost_releases_everything() {
        let mut input = InputState::new();
        input.process_event(&InputEvent::KeyDown("a".to_string()));
        input.process_event(&InputEvent::KeyDown(" ".to_string()));
        input.process_event(&InputEvent::FocusLost);
        assert!(input.pressed_keys.is_empty());
    }

    #[test]
    fn test_movement_snapshot() {
        let processor = InputProcessor::default();
        let mut input = InputState::new();
        for key in ["D", " ", "q", "Shift"] {
            input.process_event(&InputEvent::KeyDown(key.to_string()));
        }

        let intent = processor.movement(&input);
        assert_eq!(
            intent,
            MovementIntent { right: true, jump: true, ..Default::default() }
        );
    }

    #[test]
    fn test_web_buttons() {
        assert_eq!(MouseButton::from_web_button(0), MouseButton::Left);
        assert_eq!(MouseButton::from_web_button(2), MouseButton::Right);
        assert_eq!(MouseButton::from_web_button(1), MouseButton::Middle);
        assert_eq!(MouseButton::from_web_button(3), MouseButton::Other(3));
    }

    #[test]
    fn test_game_keys() {
        let processor = InputProcessor::default();
        assert!(processor.is_game_key("S"));
        assert!(processor.is_game_key(" "));
        assert!(!processor.is_game_key("Enter"));
    }
}
