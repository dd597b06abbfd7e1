use std::time::Duration;

use winit::dpi::LogicalSize;
use winit::window::{Window, WindowAttributes};

use crate::device::GpuInit;

/// Render and OS-loop cadences.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timing {
    /// Longest a burst of commands may delay the damage flush.
    pub flush_interval: Duration,
    /// How often the OS loop wakes to check for shutdown.
    pub poll_interval: Duration,
}

impl Default for Timing {
    fn default() -> Self {
        Self {
            flush_interval: Duration::from_secs_f64(1.0 / 960.0),
            poll_interval: Duration::from_secs_f64(1.0 / 30.0),
        }
    }
}

/// Window configuration.
///
/// Sizes are in logical pixels. On displays where the framebuffer is an
/// integer multiple of that, the window is shrunk so the framebuffer ends up
/// `size` physical pixels (see [`crate::window::Win::ratio`]).
#[derive(Debug, Clone)]
pub struct WindowConfig {
    pub title: String,
    pub size: (u32, u32),
    pub resizable: bool,
    pub borderless: bool,
    pub maximized: bool,
    /// Whether the window accepts GPU closures at all.
    pub gpu_commands: bool,
    pub timing: Timing,
    pub gpu: GpuInit,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: String::new(),
            size: (640, 480),
            resizable: false,
            borderless: false,
            maximized: false,
            gpu_commands: true,
            timing: Timing::default(),
            gpu: GpuInit::default(),
        }
    }
}

impl WindowConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn size(mut self, width: u32, height: u32) -> Self {
        self.size = (width, height);
        self
    }

    pub fn resizable(mut self, resizable: bool) -> Self {
        self.resizable = resizable;
        self
    }

    pub fn borderless(mut self, borderless: bool) -> Self {
        self.borderless = borderless;
        self
    }

    pub fn maximized(mut self, maximized: bool) -> Self {
        self.maximized = maximized;
        self
    }

    pub fn gpu_commands(mut self, enabled: bool) -> Self {
        self.gpu_commands = enabled;
        self
    }

    pub fn flush_interval(mut self, interval: Duration) -> Self {
        self.timing.flush_interval = interval;
        self
    }

    pub fn poll_interval(mut self, interval: Duration) -> Self {
        self.timing.poll_interval = interval;
        self
    }

    pub fn gpu(mut self, gpu: GpuInit) -> Self {
        self.gpu = gpu;
        self
    }

    pub(crate) fn attributes(&self) -> WindowAttributes {
        let (width, height) = self.size;
        Window::default_attributes()
            .with_title(self.title.clone())
            .with_inner_size(LogicalSize::new(width as f64, height as f64))
            .with_resizable(self.resizable)
            .with_decorations(!self.borderless)
            .with_maximized(self.maximized)
    }
}
