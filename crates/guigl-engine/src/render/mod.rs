//! Render thread: command stream, damage flushing and GPU compositing.
//!
//! Convention: integer physical pixels, top-left origin, +Y down. The
//! framebuffer uses the same origin, so damage rectangles are scissor
//! rectangles as-is.

mod command;
mod compositor;
mod coordinator;
mod ctx;
mod overlay;
mod thread;

#[cfg(test)]
pub(crate) mod testing;

pub use command::{DrawFn, GpuFn, RenderCommand, Trigger};
pub use compositor::Compositor;
pub use coordinator::{Coordinator, RenderState};
pub use ctx::GpuCtx;
pub use overlay::{WgpuCompositor, COLOR_FORMAT, DEPTH_FORMAT};
pub use thread::RenderThread;
