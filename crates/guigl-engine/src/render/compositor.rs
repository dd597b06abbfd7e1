use crate::coords::Rect;

/// GPU side of the render coordinator.
///
/// The coordinator decides when to upload, composite and present; an
/// implementation only knows how. All calls happen on the render thread.
pub trait Compositor {
    /// Closure type accepted by [`Compositor::run_gpu`].
    type GpuFn: Send + 'static;

    /// Reallocates the screen texture and back buffers for new framebuffer bounds.
    fn resize(&mut self, bounds: Rect);

    /// Writes `pixels` (tightly packed RGBA rows) into `region` of the screen texture.
    fn upload(&mut self, region: Rect, pixels: &[u8]);

    /// Composites the screen texture over the current back buffer with a
    /// full-viewport quad, depth-tested against existing content.
    ///
    /// With `Some(region)` depth is reset inside `region` first, so the fresh
    /// pixels there win over stale GPU content and earlier overlay passes.
    fn draw_overlay(&mut self, region: Option<Rect>);

    /// Shows the current back buffer and swaps to the other one.
    fn present(&mut self);

    /// Runs a caller GPU closure against the current back buffer.
    fn run_gpu(&mut self, f: Self::GpuFn);
}
