use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, SyncSender};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Instant;

use anyhow::{anyhow, bail, Context, Result};
use winit::application::ApplicationHandler;
use winit::dpi::LogicalSize;
use winit::event::{StartCause, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop, EventLoopProxy};
use winit::window::{Window, WindowId};

use crate::coords::Rect;
use crate::device::Gpu;
use crate::input::dpi::dpi_ratio;
use crate::input::platform::InputTranslator;
use crate::input::{event_channel, Event, EventBridge};
use crate::render::{GpuFn, RenderCommand, RenderThread, WgpuCompositor};

use super::config::WindowConfig;
use super::handle::{DrawSender, GpuSender, Win};
use super::shutdown::ShutdownLatch;

/// Set while a window is open in this process.
static WINDOW_OPEN: AtomicBool = AtomicBool::new(false);

/// Claim on the process's single window slot; released on drop.
struct WindowSlot;

impl WindowSlot {
    fn acquire() -> Result<Self> {
        if WINDOW_OPEN
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            bail!("a window is already open in this process");
        }
        Ok(Self)
    }
}

impl Drop for WindowSlot {
    fn drop(&mut self) {
        WINDOW_OPEN.store(false, Ordering::Release);
    }
}

/// Wakes the OS loop from other threads.
#[derive(Debug, Clone, Copy)]
enum Wake {
    Shutdown,
}

/// Opens a window and runs `app` against it on a new thread.
///
/// Must be called from the main thread; it drives the OS event loop until the
/// window is torn down, which happens once the draw or the GPU submitter is
/// closed. Returns after both the render thread and `app` have finished.
///
/// The caller must keep draining [`Win::events`]: delivery blocks the OS
/// loop until each event is taken.
pub fn run<F>(config: WindowConfig, app: F) -> Result<()>
where
    F: FnOnce(Win) + Send + 'static,
{
    let _slot = WindowSlot::acquire()?;

    let event_loop = EventLoop::<Wake>::with_user_event()
        .build()
        .context("failed to create winit EventLoop")?;
    let proxy = event_loop.create_proxy();

    let mut os = OsThread::new(config, app, proxy);
    event_loop
        .run_app(&mut os)
        .context("winit event loop terminated with error")?;

    os.finish()
}

/// What the OS thread holds while the window is open.
///
/// Released once, in order: event channel, resize sender, window.
struct OsHandles<W> {
    events: Option<EventBridge>,
    /// Used only for resize commands.
    render_tx: Option<SyncSender<RenderCommand<GpuFn>>>,
    window: Option<W>,
    released: bool,
}

impl<W> OsHandles<W> {
    fn new() -> Self {
        Self {
            events: None,
            render_tx: None,
            window: None,
            released: false,
        }
    }

    /// Returns `false` if the handles were already released.
    fn release(&mut self) -> bool {
        if self.released {
            return false;
        }
        self.released = true;

        if let Some(mut bridge) = self.events.take() {
            bridge.close();
            log::debug!("event channel closed");
        }
        self.render_tx = None;
        if let Some(window) = self.window.take() {
            drop(window);
            log::info!("window destroyed");
        }
        true
    }
}

/// State owned by the thread running the OS loop.
struct OsThread<F> {
    config: WindowConfig,
    app: Option<F>,
    proxy: EventLoopProxy<Wake>,
    latch: Arc<ShutdownLatch>,

    handles: OsHandles<Arc<Window>>,
    translator: InputTranslator,
    bounds: Rect,

    render: Option<RenderThread>,
    app_thread: Option<JoinHandle<()>>,
    error: Option<anyhow::Error>,
}

impl<F> OsThread<F>
where
    F: FnOnce(Win) + Send + 'static,
{
    fn new(config: WindowConfig, app: F, proxy: EventLoopProxy<Wake>) -> Self {
        Self {
            config,
            app: Some(app),
            proxy,
            latch: Arc::new(ShutdownLatch::new()),
            handles: OsHandles::new(),
            translator: InputTranslator::new(1),
            bounds: Rect::ZERO,
            render: None,
            app_thread: None,
            error: None,
        }
    }

    /// Creates the window, the GPU context, the render thread and the app thread.
    fn open(&mut self, event_loop: &ActiveEventLoop) -> Result<()> {
        let window = event_loop
            .create_window(self.config.attributes())
            .context("failed to create window")?;
        let window = Arc::new(window);

        let ratio = self.apply_dpi_ratio(&window);
        self.translator = InputTranslator::new(ratio);

        let gpu = pollster::block_on(Gpu::new(window.clone(), self.config.gpu.clone()))
            .context("GPU initialization failed")?;
        let size = gpu.size();
        self.bounds = Rect::from_size(size.width, size.height);
        log::info!(
            "window {:?} open: {}x{} framebuffer, ratio {}",
            self.config.title,
            size.width,
            size.height,
            ratio
        );

        let (render_tx, render_rx) = mpsc::sync_channel(0);
        let latch = self.latch.clone();
        let proxy = self.proxy.clone();
        let render = RenderThread::spawn(
            move || WgpuCompositor::new(gpu),
            self.bounds,
            self.config.timing.flush_interval,
            render_rx,
            move || {
                if latch.trip() {
                    log::debug!("render thread stopped; waking OS loop");
                    let _ = proxy.send_event(Wake::Shutdown);
                }
            },
        )?;
        self.render = Some(render);
        self.handles.window = Some(window);

        let (bridge, events) = event_channel();
        let draw = DrawSender::new(render_tx.clone());
        let gpu = self
            .config
            .gpu_commands
            .then(|| GpuSender::new(render_tx.clone()));
        let win = Win::new(events, draw, gpu, self.bounds, ratio);
        self.handles.render_tx = Some(render_tx);

        let app = self.app.take().context("window opened twice")?;
        let app_thread = thread::Builder::new()
            .name("guigl-app".to_string())
            .spawn(move || app(win))
            .context("failed to spawn app thread")?;
        self.app_thread = Some(app_thread);

        self.handles.events = Some(bridge);
        self.emit(Event::Resize(self.bounds));
        Ok(())
    }

    /// Computes the framebuffer-to-logical ratio and, when it exceeds one,
    /// shrinks the window so the framebuffer is the requested pixel size.
    fn apply_dpi_ratio(&self, window: &Window) -> u32 {
        let framebuffer = window.inner_size();
        let (requested_w, requested_h) = if self.config.maximized {
            (framebuffer.width, framebuffer.height)
        } else {
            self.config.size
        };

        let ratio = dpi_ratio(requested_w, framebuffer.width);
        if ratio > 1 {
            log::debug!("hidpi ratio {ratio}; shrinking logical window size");
            let _ = window.request_inner_size(LogicalSize::new(
                requested_w as f64 / ratio as f64,
                requested_h as f64 / ratio as f64,
            ));
        }
        ratio
    }

    fn emit(&self, ev: Event) {
        if let Some(bridge) = self.handles.events.as_ref() {
            if !bridge.emit(ev) {
                log::trace!("event {ev} dropped; nobody is listening");
            }
        }
    }

    fn resized(&mut self, bounds: Rect) {
        if bounds == self.bounds {
            return;
        }
        self.bounds = bounds;
        log::debug!("framebuffer resized to {}x{}", bounds.width(), bounds.height());

        if let Some(tx) = self.handles.render_tx.as_ref() {
            let _ = tx.send(RenderCommand::Resize(bounds));
        }
        self.emit(Event::Resize(bounds));
    }

    fn poll_shutdown(&mut self, event_loop: &ActiveEventLoop) {
        if self.latch.is_tripped() && !self.handles.released {
            self.teardown(event_loop);
        }
    }

    /// Closes the event channel, destroys the window and leaves the loop.
    fn teardown(&mut self, event_loop: &ActiveEventLoop) {
        if self.handles.release() {
            event_loop.exit();
        }
    }

    /// Joins every thread once the loop has returned.
    fn finish(mut self) -> Result<()> {
        self.handles.release();

        let render = self.render.take().map(RenderThread::join);
        let app = self
            .app_thread
            .take()
            .map(|h| h.join().map_err(|_| anyhow!("app thread panicked")));

        if let Some(e) = self.error.take() {
            return Err(e);
        }
        render.transpose()?;
        app.transpose()?;
        Ok(())
    }
}

impl<F> ApplicationHandler<Wake> for OsThread<F>
where
    F: FnOnce(Win) + Send + 'static,
{
    fn new_events(&mut self, event_loop: &ActiveEventLoop, _cause: StartCause) {
        self.poll_shutdown(event_loop);
    }

    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.handles.window.is_some() || self.handles.released {
            return;
        }

        if let Err(e) = self.open(event_loop) {
            log::error!("failed to open window: {e:#}");
            self.error = Some(e);
            self.teardown(event_loop);
        }
    }

    fn user_event(&mut self, event_loop: &ActiveEventLoop, event: Wake) {
        match event {
            Wake::Shutdown => self.poll_shutdown(event_loop),
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _window_id: WindowId, event: WindowEvent) {
        if self.handles.released {
            return;
        }

        match &event {
            WindowEvent::Resized(size) => self.resized(Rect::from_size(size.width, size.height)),

            // The window stays open until a submitter is closed.
            WindowEvent::CloseRequested => self.emit(Event::Close),

            _ => {
                let scale = self.handles.window.as_ref().map_or(1.0, |w| w.scale_factor());
                let mut out = Vec::new();
                self.translator.translate(&event, scale, &mut out);
                for ev in out {
                    self.emit(ev);
                }
            }
        }

        self.poll_shutdown(event_loop);
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        if self.handles.released {
            return;
        }
        event_loop.set_control_flow(ControlFlow::WaitUntil(
            Instant::now() + self.config.timing.poll_interval,
        ));
    }
}

#[cfg(test)]
mod tests {
    use std::sync::mpsc::{Receiver, TryRecvError};
    use std::sync::Mutex;

    use super::*;
    use crate::input::Events;

    /// Stands in for the window; records what was still open when it dropped.
    struct WindowStub {
        events: Events,
        render_rx: Receiver<RenderCommand<GpuFn>>,
        log: Arc<Mutex<Vec<String>>>,
    }

    impl Drop for WindowStub {
        fn drop(&mut self) {
            let events_closed = matches!(self.events.try_recv(), Err(TryRecvError::Disconnected));
            let render_closed = matches!(self.render_rx.try_recv(), Err(TryRecvError::Disconnected));
            self.log
                .lock()
                .unwrap()
                .push(format!("window dropped: events closed {events_closed}, render closed {render_closed}"));
        }
    }

    fn open_handles(log: Arc<Mutex<Vec<String>>>) -> OsHandles<WindowStub> {
        let (bridge, events) = event_channel();
        let (render_tx, render_rx) = mpsc::sync_channel(0);
        let mut handles = OsHandles::new();
        handles.events = Some(bridge);
        handles.render_tx = Some(render_tx);
        handles.window = Some(WindowStub { events, render_rx, log });
        handles
    }

    #[test]
    fn release_closes_channels_before_destroying_window() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut handles = open_handles(log.clone());

        assert!(handles.release());
        assert!(handles.events.is_none());
        assert!(handles.render_tx.is_none());
        assert!(handles.window.is_none());
        assert_eq!(
            *log.lock().unwrap(),
            vec!["window dropped: events closed true, render closed true"]
        );
    }

    #[test]
    fn release_runs_once() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut handles = open_handles(log.clone());

        assert!(handles.release());
        assert!(!handles.release());
        assert_eq!(log.lock().unwrap().len(), 1);
    }

    #[test]
    fn release_without_window_still_counts() {
        let mut handles: OsHandles<WindowStub> = OsHandles::new();
        assert!(handles.release());
        assert!(!handles.release());
    }

    #[test]
    fn only_one_window_slot_at_a_time() {
        let first = WindowSlot::acquire().unwrap();
        let second = WindowSlot::acquire();
        assert!(second.is_err());
        drop(first);
        assert!(WindowSlot::acquire().is_ok());
    }
}
