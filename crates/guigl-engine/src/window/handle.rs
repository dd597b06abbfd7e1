use std::error::Error;
use std::fmt;
use std::sync::mpsc::SyncSender;

use image::RgbaImage;

use crate::coords::Rect;
use crate::input::Events;
use crate::render::{GpuCtx, GpuFn, RenderCommand, Trigger};

/// Why a closure could not be submitted.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum SubmitError {
    /// The submitter was closed, or the render thread has stopped.
    Closed,
    /// The window was created without GPU commands.
    Unavailable,
}

impl fmt::Display for SubmitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SubmitError::Closed => f.write_str("render submitter is closed"),
            SubmitError::Unavailable => f.write_str("gpu commands are disabled for this window"),
        }
    }
}

impl Error for SubmitError {}

/// Shared core of both submitters: a command sender that says goodbye once.
struct Submitter<G> {
    tx: Option<SyncSender<RenderCommand<G>>>,
    trigger: Trigger,
}

impl<G> Submitter<G> {
    fn submit(&self, cmd: RenderCommand<G>) -> Result<(), SubmitError> {
        let tx = self.tx.as_ref().ok_or(SubmitError::Closed)?;
        tx.send(cmd).map_err(|_| SubmitError::Closed)
    }

    fn close(&mut self) {
        if let Some(tx) = self.tx.take() {
            log::debug!("{} submitter closed", self.trigger);
            // The render thread may already be gone; nothing left to tell it.
            let _ = tx.send(RenderCommand::Close(self.trigger));
        }
    }
}

/// Sends draw closures to the render thread.
///
/// Closing it (or dropping it) shuts the window down.
pub struct DrawSender<G = GpuFn> {
    inner: Submitter<G>,
}

impl<G> DrawSender<G> {
    pub(crate) fn new(tx: SyncSender<RenderCommand<G>>) -> Self {
        Self {
            inner: Submitter {
                tx: Some(tx),
                trigger: Trigger::Draw,
            },
        }
    }

    /// Queues `f` to run against the pixel surface; blocks until the render
    /// thread takes it.
    ///
    /// `f` must return every pixel it changed, or those pixels may not reach
    /// the screen.
    pub fn send<F>(&self, f: F) -> Result<(), SubmitError>
    where
        F: FnOnce(&mut RgbaImage) -> Rect + Send + 'static,
    {
        self.inner.submit(RenderCommand::Draw(Box::new(f)))
    }

    pub fn close(&mut self) {
        self.inner.close();
    }

    pub fn is_closed(&self) -> bool {
        self.inner.tx.is_none()
    }
}

impl<G> Drop for DrawSender<G> {
    fn drop(&mut self) {
        self.inner.close();
    }
}

/// Sends GPU closures to the render thread.
///
/// Closing it (or dropping it) shuts the window down.
pub struct GpuSender<G = GpuFn> {
    inner: Submitter<G>,
}

impl<G> GpuSender<G> {
    pub(crate) fn new(tx: SyncSender<RenderCommand<G>>) -> Self {
        Self {
            inner: Submitter {
                tx: Some(tx),
                trigger: Trigger::Gpu,
            },
        }
    }

    pub(crate) fn submit(&self, g: G) -> Result<(), SubmitError> {
        self.inner.submit(RenderCommand::Gpu(g))
    }

    pub fn close(&mut self) {
        self.inner.close();
    }

    pub fn is_closed(&self) -> bool {
        self.inner.tx.is_none()
    }
}

impl GpuSender<GpuFn> {
    /// Queues `f` to run on the render thread; blocks until it is taken.
    ///
    /// The overlay is composited over whatever `f` drew and presented right
    /// after it returns.
    pub fn send<F>(&self, f: F) -> Result<(), SubmitError>
    where
        F: FnOnce(&mut GpuCtx<'_>) + Send + 'static,
    {
        self.submit(Box::new(f))
    }
}

impl<G> Drop for GpuSender<G> {
    fn drop(&mut self) {
        self.inner.close();
    }
}

/// The caller's side of an open window.
pub struct Win<G = GpuFn> {
    events: Events,
    draw: DrawSender<G>,
    gpu: Option<GpuSender<G>>,
    bounds: Rect,
    ratio: u32,
}

/// [`Win`] split into independently owned pieces.
pub struct WinParts<G = GpuFn> {
    pub events: Events,
    pub draw: DrawSender<G>,
    /// `None` when the window was created without GPU commands.
    pub gpu: Option<GpuSender<G>>,
}

impl<G> Win<G> {
    pub(crate) fn new(
        events: Events,
        draw: DrawSender<G>,
        gpu: Option<GpuSender<G>>,
        bounds: Rect,
        ratio: u32,
    ) -> Self {
        Self {
            events,
            draw,
            gpu,
            bounds,
            ratio,
        }
    }

    /// See [`DrawSender::send`].
    pub fn draw<F>(&self, f: F) -> Result<(), SubmitError>
    where
        F: FnOnce(&mut RgbaImage) -> Rect + Send + 'static,
    {
        self.draw.send(f)
    }

    /// Closes the draw submitter, which shuts the window down.
    pub fn close_draw(&mut self) {
        self.draw.close();
    }

    /// Closes the GPU submitter, which shuts the window down. No-op without
    /// GPU commands.
    pub fn close_gpu(&mut self) {
        if let Some(gpu) = self.gpu.as_mut() {
            gpu.close();
        }
    }

    pub fn events(&self) -> &Events {
        &self.events
    }

    /// Framebuffer pixels per logical OS pixel. Pointer positions are
    /// already multiplied by it.
    pub fn ratio(&self) -> u32 {
        self.ratio
    }

    /// Framebuffer bounds when the window opened.
    pub fn bounds(&self) -> Rect {
        self.bounds
    }

    pub fn into_parts(self) -> WinParts<G> {
        WinParts {
            events: self.events,
            draw: self.draw,
            gpu: self.gpu,
        }
    }
}

impl Win<GpuFn> {
    /// See [`GpuSender::send`].
    pub fn gpu<F>(&self, f: F) -> Result<(), SubmitError>
    where
        F: FnOnce(&mut GpuCtx<'_>) + Send + 'static,
    {
        self.gpu.as_ref().ok_or(SubmitError::Unavailable)?.send(f)
    }
}
