use image::{Rgba, RgbaImage};

use crate::coords::Rect;

/// Paints `color` over `r` and returns the part of `r` actually written.
///
/// Pixels are replaced, not blended. The returned rectangle is the clipped
/// footprint, which is what a draw closure should report as its damage.
pub fn fill(img: &mut RgbaImage, r: Rect, color: Rgba<u8>) -> Rect {
    let bounds = Rect::from_size(img.width(), img.height());
    let Some(clip) = r.intersect(bounds) else {
        return Rect::ZERO;
    };

    let stride = img.width() as usize * 4;
    let x0 = clip.min.x as usize * 4;
    let x1 = clip.max.x as usize * 4;
    let buf: &mut [u8] = img;

    for row in buf
        .chunks_exact_mut(stride)
        .skip(clip.min.y as usize)
        .take(clip.height() as usize)
    {
        for px in row[x0..x1].chunks_exact_mut(4) {
            px.copy_from_slice(&color.0);
        }
    }

    clip
}
