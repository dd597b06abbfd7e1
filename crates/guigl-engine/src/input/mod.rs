//! Input subsystem.
//!
//! The public event types do not expose winit; `platform` translates winit
//! callbacks into them and `bridge` carries them to the caller.

mod bridge;
pub mod dpi;
pub mod platform;
mod types;

pub use bridge::{event_channel, EventBridge, Events};
pub use types::{Button, Event, Key};
