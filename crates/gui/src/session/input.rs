//! Window-independent input model consumed by the session.
//!
//! Positions are GL window coordinates: origin bottom-left, y up.

use glam::Vec2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Escape,
    Tab,
    T,
    Space,
    Num1,
    Num9,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MouseButton {
    Primary,
    Secondary,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Modifiers {
    pub shift: bool,
    pub ctrl: bool,
}

impl Modifiers {
    pub const NONE: Self = Self {
        shift: false,
        ctrl: false,
    };
    pub const SHIFT: Self = Self {
        shift: true,
        ctrl: false,
    };
    pub const CTRL: Self = Self {
        shift: false,
        ctrl: true,
    };
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputEvent {
    KeyDown(Key),
    MouseMove(Vec2),
    MouseDown {
        button: MouseButton,
        pos: Vec2,
        modifiers: Modifiers,
    },
    MouseUp {
        button: MouseButton,
        pos: Vec2,
        modifiers: Modifiers,
    },
    /// Positive is wheel down (zoom out)
    Wheel(f32),
    Quit,
}
