use winit::dpi::LogicalPosition;
use winit::event::{ElementState, Ime, MouseButton as WinitMouseButton, MouseScrollDelta, WindowEvent};
use winit::keyboard::{KeyCode, PhysicalKey};

use crate::coords::Point;
use crate::input::dpi::scale_point;
use crate::input::{Button, Event, Key};

/// Translates winit input callbacks into window events.
///
/// Owned by the OS thread. Tracks the last cursor position because winit
/// does not attach one to button events.
#[derive(Debug)]
pub struct InputTranslator {
    ratio: u32,
    /// Last cursor position in truncated logical pixels.
    cursor: (f64, f64),
}

impl InputTranslator {
    pub fn new(ratio: u32) -> Self {
        Self {
            ratio: ratio.max(1),
            cursor: (0.0, 0.0),
        }
    }

    /// Appends the events produced by `event` to `out`.
    ///
    /// Window-lifecycle events (resize, close) are not handled here.
    pub fn translate(&mut self, event: &WindowEvent, scale_factor: f64, out: &mut Vec<Event>) {
        match event {
            WindowEvent::CursorMoved { position, .. } => {
                out.push(self.cursor_moved(position.to_logical(scale_factor)));
            }

            WindowEvent::MouseInput { state, button, .. } => {
                out.extend(self.button(*button, *state));
            }

            WindowEvent::MouseWheel { delta, .. } => {
                out.push(Event::Scroll(scroll_steps(*delta, scale_factor)));
            }

            WindowEvent::KeyboardInput { event, .. } => {
                key_events(
                    event.physical_key,
                    event.state,
                    event.repeat,
                    event.text.as_deref(),
                    out,
                );
            }

            WindowEvent::Ime(Ime::Commit(text)) => {
                out.extend(typed_chars(text).map(Event::Char));
            }

            _ => {}
        }
    }

    /// Records the new cursor position and reports it scaled by the ratio.
    pub fn cursor_moved(&mut self, pos: LogicalPosition<f64>) -> Event {
        self.cursor = (pos.x.trunc(), pos.y.trunc());
        Event::PointerMove(self.pointer())
    }

    /// Button press/release at the last known cursor position.
    ///
    /// Unsupported buttons produce nothing.
    pub fn button(&self, button: WinitMouseButton, state: ElementState) -> Option<Event> {
        let button = map_button(button)?;
        let pos = self.pointer();
        Some(match state {
            ElementState::Pressed => Event::PointerDown { pos, button },
            ElementState::Released => Event::PointerUp { pos, button },
        })
    }

    fn pointer(&self) -> Point {
        scale_point(self.cursor.0, self.cursor.1, self.ratio)
    }
}

/// Key transition plus any printable text the key produced.
///
/// Unsupported keys emit no key event; their text is still delivered.
pub fn key_events(
    physical_key: PhysicalKey,
    state: ElementState,
    repeat: bool,
    text: Option<&str>,
    out: &mut Vec<Event>,
) {
    if let Some(key) = map_physical_key(physical_key) {
        out.push(match (state, repeat) {
            (ElementState::Pressed, false) => Event::KeyDown(key),
            (ElementState::Pressed, true) => Event::KeyRepeat(key),
            (ElementState::Released, _) => Event::KeyUp(key),
        });
    }

    if state == ElementState::Pressed {
        if let Some(text) = text {
            out.extend(typed_chars(text).map(Event::Char));
        }
    }
}

/// Printable characters of `text`; control characters (enter, tab,
/// backspace, ...) are reported as keys instead.
pub fn typed_chars(text: &str) -> impl Iterator<Item = char> + '_ {
    text.chars().filter(|c| !c.is_control())
}

fn scroll_steps(delta: MouseScrollDelta, scale_factor: f64) -> Point {
    match delta {
        MouseScrollDelta::LineDelta(x, y) => Point::new(x as i32, y as i32),
        MouseScrollDelta::PixelDelta(p) => {
            let logical = p.to_logical::<f64>(scale_factor);
            Point::new(logical.x as i32, logical.y as i32)
        }
    }
}

pub fn map_button(b: WinitMouseButton) -> Option<Button> {
    match b {
        WinitMouseButton::Left => Some(Button::Left),
        WinitMouseButton::Right => Some(Button::Right),
        WinitMouseButton::Middle => Some(Button::Middle),
        _ => None,
    }
}

fn map_physical_key(pk: PhysicalKey) -> Option<Key> {
    match pk {
        PhysicalKey::Code(code) => map_key(code),
        PhysicalKey::Unidentified(_) => None,
    }
}

pub fn map_key(code: KeyCode) -> Option<Key> {
    let key = match code {
        KeyCode::ArrowLeft => Key::Left,
        KeyCode::ArrowRight => Key::Right,
        KeyCode::ArrowUp => Key::Up,
        KeyCode::ArrowDown => Key::Down,
        KeyCode::Escape => Key::Escape,
        KeyCode::Space => Key::Space,
        KeyCode::Backspace => Key::Backspace,
        KeyCode::Delete => Key::Delete,
        KeyCode::Enter | KeyCode::NumpadEnter => Key::Enter,
        KeyCode::Tab => Key::Tab,
        KeyCode::Home => Key::Home,
        KeyCode::End => Key::End,
        KeyCode::PageUp => Key::PageUp,
        KeyCode::PageDown => Key::PageDown,
        KeyCode::ShiftLeft | KeyCode::ShiftRight => Key::Shift,
        KeyCode::ControlLeft | KeyCode::ControlRight => Key::Ctrl,
        KeyCode::AltLeft | KeyCode::AltRight => Key::Alt,
        _ => return None,
    };
    Some(key)
}

#[cfg(test)]
mod tests {
    use winit::dpi::PhysicalPosition;
    use winit::keyboard::NativeKeyCode;

    use super::*;

    fn keys(code: KeyCode, state: ElementState, repeat: bool, text: Option<&str>) -> Vec<Event> {
        let mut out = Vec::new();
        key_events(PhysicalKey::Code(code), state, repeat, text, &mut out);
        out
    }

    #[test]
    fn unsupported_key_emits_nothing() {
        assert!(keys(KeyCode::F13, ElementState::Pressed, false, None).is_empty());
        assert!(keys(KeyCode::F13, ElementState::Released, false, None).is_empty());

        let mut out = Vec::new();
        key_events(
            PhysicalKey::Unidentified(NativeKeyCode::Unidentified),
            ElementState::Pressed,
            false,
            None,
            &mut out,
        );
        assert!(out.is_empty());
    }

    #[test]
    fn key_transitions_map_to_down_repeat_up() {
        assert_eq!(keys(KeyCode::ArrowUp, ElementState::Pressed, false, None), vec![Event::KeyDown(Key::Up)]);
        assert_eq!(keys(KeyCode::ArrowUp, ElementState::Pressed, true, None), vec![Event::KeyRepeat(Key::Up)]);
        assert_eq!(keys(KeyCode::ArrowUp, ElementState::Released, false, None), vec![Event::KeyUp(Key::Up)]);
    }

    #[test]
    fn left_and_right_modifiers_fold() {
        assert_eq!(map_key(KeyCode::ShiftLeft), map_key(KeyCode::ShiftRight));
        assert_eq!(map_key(KeyCode::ControlRight), Some(Key::Ctrl));
        assert_eq!(map_key(KeyCode::AltLeft), Some(Key::Alt));
        assert_eq!(map_key(KeyCode::SuperLeft), None);
    }

    #[test]
    fn typed_text_follows_key_event() {
        assert_eq!(
            keys(KeyCode::Space, ElementState::Pressed, false, Some(" ")),
            vec![Event::KeyDown(Key::Space), Event::Char(' ')]
        );
        // Letters are not in the key set but still type.
        assert_eq!(keys(KeyCode::KeyA, ElementState::Pressed, false, Some("a")), vec![Event::Char('a')]);
    }

    #[test]
    fn control_text_is_not_typed() {
        assert_eq!(
            keys(KeyCode::Enter, ElementState::Pressed, false, Some("\r")),
            vec![Event::KeyDown(Key::Enter)]
        );
        assert_eq!(typed_chars("a\tb\u{8}").collect::<String>(), "ab");
    }

    #[test]
    fn release_carries_no_text() {
        assert!(keys(KeyCode::KeyA, ElementState::Released, false, Some("a")).is_empty());
    }

    #[test]
    fn buttons_use_last_cursor_position_scaled() {
        let mut t = InputTranslator::new(2);
        assert_eq!(
            t.cursor_moved(LogicalPosition::new(10.7, 4.2)),
            Event::PointerMove(Point::new(20, 8))
        );
        assert_eq!(
            t.button(WinitMouseButton::Left, ElementState::Pressed),
            Some(Event::PointerDown { pos: Point::new(20, 8), button: Button::Left })
        );
        assert_eq!(
            t.button(WinitMouseButton::Right, ElementState::Released),
            Some(Event::PointerUp { pos: Point::new(20, 8), button: Button::Right })
        );
    }

    #[test]
    fn unsupported_buttons_are_dropped() {
        let t = InputTranslator::new(1);
        assert_eq!(t.button(WinitMouseButton::Back, ElementState::Pressed), None);
        assert_eq!(t.button(WinitMouseButton::Other(7), ElementState::Pressed), None);
    }

    #[test]
    fn button_before_any_move_reports_origin() {
        let t = InputTranslator::new(3);
        assert_eq!(
            t.button(WinitMouseButton::Middle, ElementState::Pressed),
            Some(Event::PointerDown { pos: Point::ZERO, button: Button::Middle })
        );
    }

    #[test]
    fn scroll_is_not_scaled() {
        assert_eq!(scroll_steps(MouseScrollDelta::LineDelta(0.0, -1.0), 2.0), Point::new(0, -1));
        assert_eq!(
            scroll_steps(MouseScrollDelta::PixelDelta(PhysicalPosition::new(8.0, 40.0)), 2.0),
            Point::new(4, 20)
        );
    }
}
