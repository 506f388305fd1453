/// Platform-agnostic keyboard handling
use std::collections::HashSet;

/// Platform-independent input events
#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
    /// Physical key code, e.g. `ArrowUp`, `ShiftLeft`, `Space`.
    KeyDown(String),
    KeyUp(String),

    // Window events
    FocusLost,
    VisibilityChanged { visible: bool },
}

/// Raw key state, written by the host between frames.
#[derive(Debug, Default, Clone)]
pub struct KeyboardState {
    pub pressed_keys: HashSet<String>,
}

impl KeyboardState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Process an input event and update state
    pub fn process_event(&mut self, event: &InputEvent) {
        match event {
            InputEvent::KeyDown(code) => {
                self.pressed_keys.insert(code.clone());
            }
            InputEvent::KeyUp(code) => {
                self.pressed_keys.remove(code.as_str());
            }
            // Key-up events are lost while the page is hidden
            InputEvent::FocusLost | InputEvent::VisibilityChanged { .. } => {
                self.clear_keys();
            }
        }
    }

    pub fn is_key_pressed(&self, code: &str) -> bool {
        self.pressed_keys.contains(code)
    }

    pub fn clear_keys(&mut self) {
        self.pressed_keys.clear();
    }
}

/// Snapshot of the six driving controls for one step.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InputState {
    pub forward: bool,
    pub backward: bool,
    pub left: bool,
    pub right: bool,
    pub brake: bool,
    pub boost: bool,
}

impl InputState {
    pub fn idle() -> Self {
        Self::default()
    }

    pub fn throttle() -> Self {
        Self { forward: true, ..Self::default() }
    }
}

/// Key mapping configuration
#[derive(Debug, Clone, PartialEq)]
pub struct KeyBindings {
    pub forward: Vec<String>,
    pub backward: Vec<String>,
    pub left: Vec<String>,
    pub right: Vec<String>,
    pub brake: Vec<String>,
    pub boost: Vec<String>,
}

fn codes(list: &[&str]) -> Vec<String> {
    list.iter().map(|c| c.to_string()).collect()
}

impl Default for KeyBindings {
    fn default() -> Self {
        Self {
            forward: codes(&["ArrowUp", "KeyW"]),
            backward: codes(&["ArrowDown", "KeyS"]),
            left: codes(&["ArrowLeft", "KeyA"]),
            right: codes(&["ArrowRight", "KeyD"]),
            brake: codes(&["Space"]),
            boost: codes(&["ShiftLeft", "ShiftRight"]),
        }
    }
}

/// Turns raw key state into the control snapshot the physics reads.
#[derive(Debug, Clone, Default)]
pub struct InputProcessor {
    bindings: KeyBindings,
}

impl InputProcessor {
    pub fn new(bindings: KeyBindings) -> Self {
        Self { bindings }
    }

    pub fn bindings(&self) -> &KeyBindings {
        &self.bindings
    }

    fn any_pressed(keyboard: &KeyboardState, codes: &[String]) -> bool {
        codes.iter().any(|c| keyboard.is_key_pressed(c))
    }

    pub fn snapshot(&self, keyboard: &KeyboardState) -> InputState {
        InputState {
            forward: Self::any_pressed(keyboard, &self.bindings.forward),
            backward: Self::any_pressed(keyboard, &self.bindings.backward),
            left: Self::any_pressed(keyboard, &self.bindings.left),
            right: Self::any_pressed(keyboard, &self.bindings.right),
            brake: Self::any_pressed(keyboard, &self.bindings.brake),
            boost: Self::any_pressed(keyboard, &self.bindings.boost),
        }
    }

    /// Whether the host should suppress the browser default (page scroll).
    pub fn is_driving_key(&self, code: &str) -> bool {
        let b = &self.bindings;
        [&b.forward, &b.backward, &b.left, &b.right, &b.brake, &b.boost]
            .iter()
            .any(|list| list.iter().any(|c| c == code))
    }
}

pub mod wasm {
    use super::*;
    use web_sys::KeyboardEvent;

    pub fn keyboard_event_to_input(e: &KeyboardEvent, is_down: bool) -> InputEvent {
        let code = e.code();
        if is_down {
            InputEvent::KeyDown(code)
        } else {
            InputEvent::KeyUp(code)
        }
    }
}
