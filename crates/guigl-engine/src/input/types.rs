use std::fmt;

use crate::coords::{Point, Rect};

/// Keyboard keys reported by the window.
///
/// Deliberately small: keys outside this set are not forwarded. Left and
/// right modifier keys fold into a single variant.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum Key {
    Left,
    Right,
    Up,
    Down,
    Escape,
    Space,
    Backspace,
    Delete,
    Enter,
    Tab,
    Home,
    End,
    PageUp,
    PageDown,
    Shift,
    Ctrl,
    Alt,
}

impl Key {
    pub fn name(self) -> &'static str {
        match self {
            Key::Left => "left",
            Key::Right => "right",
            Key::Up => "up",
            Key::Down => "down",
            Key::Escape => "escape",
            Key::Space => "space",
            Key::Backspace => "backspace",
            Key::Delete => "delete",
            Key::Enter => "enter",
            Key::Tab => "tab",
            Key::Home => "home",
            Key::End => "end",
            Key::PageUp => "pageup",
            Key::PageDown => "pagedown",
            Key::Shift => "shift",
            Key::Ctrl => "ctrl",
            Key::Alt => "alt",
        }
    }
}

/// Mouse buttons reported by the window.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum Button {
    Left,
    Right,
    Middle,
}

impl Button {
    pub fn name(self) -> &'static str {
        match self {
            Button::Left => "left",
            Button::Right => "right",
            Button::Middle => "middle",
        }
    }
}

/// Events delivered to the caller, in OS arrival order.
///
/// Pointer positions are physical pixels: the OS position in logical pixels
/// multiplied by the window's DPI ratio.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Event {
    /// Framebuffer bounds changed. Always the first event of a window.
    Resize(Rect),

    /// The user asked to close the window. The window stays open until a
    /// submitter is closed.
    Close,

    PointerMove(Point),
    PointerDown { pos: Point, button: Button },
    PointerUp { pos: Point, button: Button },

    /// Scroll amount per axis, in wheel steps.
    Scroll(Point),

    KeyDown(Key),
    KeyUp(Key),

    /// Key held long enough to auto-repeat.
    KeyRepeat(Key),

    /// A printable character was typed.
    Char(char),
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl fmt::Display for Button {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Event::Resize(r) => write!(f, "resize/{}/{}/{}/{}", r.min.x, r.min.y, r.max.x, r.max.y),
            Event::Close => f.write_str("wi/close"),
            Event::PointerMove(p) => write!(f, "mo/move/{}/{}", p.x, p.y),
            Event::PointerDown { pos, button } => write!(f, "mo/down/{}/{}/{}", pos.x, pos.y, button),
            Event::PointerUp { pos, button } => write!(f, "mo/up/{}/{}/{}", pos.x, pos.y, button),
            Event::Scroll(p) => write!(f, "mo/scroll/{}/{}", p.x, p.y),
            Event::KeyDown(k) => write!(f, "kb/down/{k}"),
            Event::KeyUp(k) => write!(f, "kb/up/{k}"),
            Event::KeyRepeat(k) => write!(f, "kb/repeat/{k}"),
            Event::Char(c) => write!(f, "kb/type/{}", *c as u32),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pointer_events_format_with_button() {
        let down = Event::PointerDown { pos: Point::new(12, 7), button: Button::Left };
        let up = Event::PointerUp { pos: Point::new(0, 3), button: Button::Middle };
        assert_eq!(down.to_string(), "mo/down/12/7/left");
        assert_eq!(up.to_string(), "mo/up/0/3/middle");
        assert_eq!(Event::PointerMove(Point::new(-1, 2)).to_string(), "mo/move/-1/2");
        assert_eq!(Event::Scroll(Point::new(0, -1)).to_string(), "mo/scroll/0/-1");
    }

    #[test]
    fn keyboard_events_format() {
        assert_eq!(Event::KeyDown(Key::PageUp).to_string(), "kb/down/pageup");
        assert_eq!(Event::KeyUp(Key::Ctrl).to_string(), "kb/up/ctrl");
        assert_eq!(Event::KeyRepeat(Key::Backspace).to_string(), "kb/repeat/backspace");
        assert_eq!(Event::Char('a').to_string(), "kb/type/97");
    }

    #[test]
    fn window_events_format() {
        assert_eq!(Event::Close.to_string(), "wi/close");
        assert_eq!(Event::Resize(Rect::from_size(640, 480)).to_string(), "resize/0/0/640/480");
    }
}
