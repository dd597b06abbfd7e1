//! GPU device + surface management.
//!
//! Creates the wgpu adapter/device/queue, configures the window surface and
//! hands out frames for presentation.

mod context;
mod init;
mod surface;

pub use context::{Gpu, GpuFrame};
pub use init::GpuInit;
pub use surface::SurfaceErrorAction;
