use crate::coords::Point;

/// Integer scale between the requested logical width and the framebuffer width.
///
/// `floor(framebuffer / requested)`, never below one.
pub fn dpi_ratio(requested_width: u32, framebuffer_width: u32) -> u32 {
    if requested_width == 0 {
        return 1;
    }
    (framebuffer_width / requested_width).max(1)
}

/// Converts an OS position in logical pixels to reported physical pixels.
///
/// Fractional logical positions are truncated before scaling.
#[inline]
pub fn scale_point(x: f64, y: f64, ratio: u32) -> Point {
    Point::new(x as i32, y as i32) * ratio as i32
}
