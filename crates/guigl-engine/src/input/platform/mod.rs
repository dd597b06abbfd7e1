//! Platform event translation.

mod winit;

pub use self::winit::{key_events, map_button, map_key, typed_chars, InputTranslator};
