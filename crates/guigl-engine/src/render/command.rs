use std::fmt;

use image::RgbaImage;

use crate::coords::Rect;

use super::ctx::GpuCtx;

/// Closure run against the CPU surface. Returns the rectangle it touched.
pub type DrawFn = Box<dyn FnOnce(&mut RgbaImage) -> Rect + Send>;

/// Closure run on the render thread with access to the GPU.
pub type GpuFn = Box<dyn for<'a> FnOnce(&mut GpuCtx<'a>) + Send>;

/// Which submitter asked the render thread to stop.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Trigger {
    Draw,
    Gpu,
}

impl fmt::Display for Trigger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Trigger::Draw => f.write_str("draw"),
            Trigger::Gpu => f.write_str("gpu"),
        }
    }
}

/// Everything the render thread can be asked to do.
///
/// Generic over the GPU closure type so the coordinator can run against a
/// mock compositor.
pub enum RenderCommand<G> {
    /// Framebuffer changed size.
    Resize(Rect),
    Draw(DrawFn),
    Gpu(G),
    Close(Trigger),
}

impl<G> fmt::Debug for RenderCommand<G> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RenderCommand::Resize(r) => f.debug_tuple("Resize").field(r).finish(),
            RenderCommand::Draw(_) => f.write_str("Draw(..)"),
            RenderCommand::Gpu(_) => f.write_str("Gpu(..)"),
            RenderCommand::Close(t) => f.debug_tuple("Close").field(t).finish(),
        }
    }
}
