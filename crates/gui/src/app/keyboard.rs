//! Keyboard handling

use eframe::egui;

use crate::session::{InputEvent, Key, Modifiers, Session};
use crate::viewport::camera::MoveKeys;

/// Session keys and the egui keys that trigger them
const KEY_MAP: [(egui::Key, Key); 6] = [
    (egui::Key::Escape, Key::Escape),
    (egui::Key::Tab, Key::Tab),
    (egui::Key::T, Key::T),
    (egui::Key::Space, Key::Space),
    (egui::Key::Num1, Key::Num1),
    (egui::Key::Num9, Key::Num9),
];

/// Forward this frame's key presses to the session and return the held
/// movement keys and modifiers.
pub fn handle_keyboard(ctx: &egui::Context, session: &mut Session) -> (MoveKeys, Modifiers) {
    // Don't handle keys when a text field is focused
    if ctx.memory(|m| m.focused().is_some()) {
        return (MoveKeys::default(), Modifiers::NONE);
    }

    let (pressed, keys, modifiers) = ctx.input(|i| {
        let pressed: Vec<Key> = KEY_MAP
            .iter()
            .filter(|(egui_key, _)| i.key_pressed(*egui_key))
            .map(|&(_, key)| key)
            .collect();
        let keys = MoveKeys {
            forward: i.key_down(egui::Key::W) || i.key_down(egui::Key::ArrowUp),
            back: i.key_down(egui::Key::S) || i.key_down(egui::Key::ArrowDown),
            left: i.key_down(egui::Key::A) || i.key_down(egui::Key::ArrowLeft),
            right: i.key_down(egui::Key::D) || i.key_down(egui::Key::ArrowRight),
            up: i.key_down(egui::Key::Q) || i.key_down(egui::Key::PageUp),
            down: i.key_down(egui::Key::E) || i.key_down(egui::Key::PageDown),
        };
        let modifiers = Modifiers {
            shift: i.modifiers.shift,
            ctrl: i.modifiers.command || i.modifiers.ctrl,
        };
        (pressed, keys, modifiers)
    });

    for key in pressed {
        session.handle_event(InputEvent::KeyDown(key));
    }
    (keys, modifiers)
}
