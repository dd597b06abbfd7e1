//! Window lifecycle: configuration, the caller's handles, the OS loop and
//! the shutdown sequence.

mod config;
mod handle;
mod runtime;
mod shutdown;

pub use config::{Timing, WindowConfig};
pub use handle::{DrawSender, GpuSender, SubmitError, Win, WinParts};
pub use runtime::run;
pub use shutdown::ShutdownLatch;
