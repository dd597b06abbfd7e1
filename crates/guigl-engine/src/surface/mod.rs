//! Damage-tracked CPU pixel surface.
//!
//! Draw closures write into an `image::RgbaImage` and report the rectangle
//! they touched. The union of those rectangles is what the next flush uploads.

mod fill;
mod pixels;

pub use fill::fill;
pub use pixels::PixelSurface;

pub use image::{Rgba, RgbaImage};
