//! guigl engine crate.
//!
//! One OS window whose contents are a CPU RGBA surface composited over
//! arbitrary GPU drawing. Callers get a [`window::Win`] with an event stream
//! and two submitters: draw closures that paint into the surface and report
//! what they touched, and GPU closures that render with wgpu directly.

pub mod coords;
pub mod device;
pub mod input;
pub mod logging;
pub mod render;
pub mod surface;
pub mod window;
