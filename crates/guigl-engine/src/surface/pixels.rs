use image::RgbaImage;

use crate::coords::Rect;

/// CPU-side RGBA raster plus the damage accumulated since the last GPU sync.
///
/// Owned by the render thread. Submitters never touch it directly; they send
/// closures that run here, so no locking is involved.
pub struct PixelSurface {
    image: RgbaImage,
    damage: Rect,
}

impl PixelSurface {
    /// Allocates a transparent surface of `width x height`.
    ///
    /// The whole surface starts damaged so the first flush uploads everything.
    pub fn new(width: u32, height: u32) -> Self {
        let image = RgbaImage::new(width, height);
        Self {
            damage: Rect::from_size(width, height),
            image,
        }
    }

    /// Surface bounds; always anchored at the origin.
    #[inline]
    pub fn bounds(&self) -> Rect {
        Rect::from_size(self.image.width(), self.image.height())
    }

    #[inline]
    pub fn image(&self) -> &RgbaImage {
        &self.image
    }

    /// Runs a draw closure against the raster and records its footprint.
    ///
    /// Returns the footprint the closure reported.
    pub fn apply<F>(&mut self, draw: F) -> Rect
    where
        F: FnOnce(&mut RgbaImage) -> Rect,
    {
        let touched = draw(&mut self.image);
        self.damage = self.damage.union(touched);
        touched
    }

    /// Adds `r` to the pending damage without drawing.
    #[inline]
    pub fn mark(&mut self, r: Rect) {
        self.damage = self.damage.union(r);
    }

    /// Pending damage clipped to the current bounds.
    #[inline]
    pub fn damage(&self) -> Option<Rect> {
        self.damage.intersect(self.bounds())
    }

    /// Returns the pending damage clipped to the bounds and resets it.
    pub fn take_damage(&mut self) -> Option<Rect> {
        let pending = self.damage();
        self.damage = Rect::ZERO;
        pending
    }

    /// Reallocates the raster to `bounds`.
    ///
    /// Pixels in the overlap of old and new bounds are preserved; new pixels
    /// are transparent. The new bounds are marked fully damaged.
    pub fn resize(&mut self, bounds: Rect) {
        let width = bounds.width().max(0) as u32;
        let height = bounds.height().max(0) as u32;

        if (width, height) != self.image.dimensions() {
            let mut next = RgbaImage::new(width, height);
            image::imageops::replace(&mut next, &self.image, 0, 0);
            self.image = next;
        }

        self.mark(Rect::from_size(width, height));
    }

    /// Copies the pixels under `r` into a tightly packed RGBA buffer
    /// (`4 * width` bytes per row).
    ///
    /// `r` is clipped to the bounds; an empty clip yields an empty buffer.
    pub fn extract(&self, r: Rect) -> Vec<u8> {
        let Some(r) = r.intersect(self.bounds()) else {
            return Vec::new();
        };
        image::imageops::crop_imm(
            &self.image,
            r.min.x as u32,
            r.min.y as u32,
            r.width() as u32,
            r.height() as u32,
        )
        .to_image()
        .into_raw()
    }
}
