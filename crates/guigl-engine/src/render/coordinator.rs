use std::fmt;
use std::ops::ControlFlow;
use std::sync::mpsc::{Receiver, RecvTimeoutError};
use std::time::{Duration, Instant};

use crate::coords::Rect;
use crate::surface::PixelSurface;

use super::command::RenderCommand;
use super::compositor::Compositor;

/// Number of back buffers a damage flush must refresh.
const SWAP_BUFFERS: usize = 2;

/// Lifecycle of the render thread.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum RenderState {
    Uninitialized,
    /// GPU context owned by the render thread, bootstrap done.
    ContextBound,
    /// Servicing commands.
    Ready,
    /// A close was received; no further commands are taken.
    Draining,
    Closed,
}

impl fmt::Display for RenderState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            RenderState::Uninitialized => "uninitialized",
            RenderState::ContextBound => "context-bound",
            RenderState::Ready => "ready",
            RenderState::Draining => "draining",
            RenderState::Closed => "closed",
        };
        f.write_str(s)
    }
}

/// Serializes resizes, draw closures and GPU closures onto one GPU context.
///
/// Owns the CPU surface and the compositor. Commands are drained in bursts;
/// the accumulated damage is flushed once per burst, at most
/// `flush_interval` after the burst started.
pub struct Coordinator<C: Compositor> {
    compositor: C,
    surface: PixelSurface,
    state: RenderState,
    flush_interval: Duration,
}

impl<C: Compositor> Coordinator<C> {
    pub fn new(compositor: C, bounds: Rect, flush_interval: Duration) -> Self {
        let width = bounds.width().max(0) as u32;
        let height = bounds.height().max(0) as u32;
        Self {
            compositor,
            surface: PixelSurface::new(width, height),
            state: RenderState::ContextBound,
            flush_interval,
        }
    }

    #[inline]
    pub fn state(&self) -> RenderState {
        self.state
    }

    #[inline]
    pub fn surface(&self) -> &PixelSurface {
        &self.surface
    }

    fn transition(&mut self, next: RenderState) {
        log::debug!("render state {} -> {}", self.state, next);
        self.state = next;
    }

    /// Enters `Ready` and shows the initial (fully damaged) surface.
    pub fn start(&mut self) {
        self.transition(RenderState::Ready);
        self.flush();
    }

    /// Applies one command. `Break` once the coordinator starts draining.
    pub fn handle(&mut self, cmd: RenderCommand<C::GpuFn>) -> ControlFlow<()> {
        match cmd {
            RenderCommand::Resize(bounds) => {
                log::debug!("render resize {bounds:?}");
                self.surface.resize(bounds);
                self.compositor.resize(bounds);
            }
            RenderCommand::Draw(f) => {
                self.surface.apply(f);
            }
            RenderCommand::Gpu(f) => {
                self.compositor.run_gpu(f);
                self.composite_after_gpu();
            }
            RenderCommand::Close(trigger) => {
                log::info!("render close requested by {trigger} submitter");
                self.transition(RenderState::Draining);
                return ControlFlow::Break(());
            }
        }
        ControlFlow::Continue(())
    }

    /// Uploads the pending damage and refreshes it in both back buffers.
    ///
    /// No-op when nothing inside the bounds is damaged.
    pub fn flush(&mut self) {
        let Some(region) = self.surface.take_damage() else {
            return;
        };
        log::trace!("flush {region:?} ({} px)", region.area());

        let pixels = self.surface.extract(region);
        self.compositor.upload(region, &pixels);

        for _ in 0..SWAP_BUFFERS {
            self.compositor.draw_overlay(Some(region));
            self.compositor.present();
        }
    }

    /// GPU content was just drawn into the back buffer; put the overlay back
    /// on top and show it.
    ///
    /// Only the current back buffer is refreshed, so the damage stays pending
    /// and the next flush brings the other buffer up to date.
    fn composite_after_gpu(&mut self) {
        let region = self.surface.damage();
        if let Some(r) = region {
            let pixels = self.surface.extract(r);
            self.compositor.upload(r, &pixels);
        }
        self.compositor.draw_overlay(region);
        self.compositor.present();
    }

    /// Services `rx` until a close arrives or every sender is gone.
    pub fn run(mut self, rx: &Receiver<RenderCommand<C::GpuFn>>) -> C {
        if self.state != RenderState::Ready {
            self.start();
        }

        while self.burst(rx).is_continue() {
            self.flush();
        }

        if self.state != RenderState::Draining {
            log::info!("render commands disconnected");
            self.transition(RenderState::Draining);
        }
        self.transition(RenderState::Closed);
        self.compositor
    }

    /// One outer wait followed by draining until the flush deadline.
    fn burst(&mut self, rx: &Receiver<RenderCommand<C::GpuFn>>) -> ControlFlow<()> {
        let Ok(cmd) = rx.recv() else {
            return ControlFlow::Break(());
        };
        self.handle(cmd)?;

        let deadline = Instant::now() + self.flush_interval;
        loop {
            let timeout = deadline.saturating_duration_since(Instant::now());
            match rx.recv_timeout(timeout) {
                Ok(cmd) => self.handle(cmd)?,
                Err(RecvTimeoutError::Timeout) => return ControlFlow::Continue(()),
                Err(RecvTimeoutError::Disconnected) => return ControlFlow::Break(()),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::mpsc;
    use std::thread;

    use image::{Rgba, RgbaImage};

    use super::*;
    use crate::render::command::Trigger;
    use crate::render::testing::{Call, MockCompositor, MockGpuFn};
    use crate::surface::fill;

    const RED: Rgba<u8> = Rgba([255, 0, 0, 255]);

    fn coordinator(w: u32, h: u32) -> (Coordinator<MockCompositor>, MockCompositor) {
        let mock = MockCompositor::default();
        let mut c = Coordinator::new(mock.clone(), Rect::from_size(w, h), Duration::from_millis(1));
        c.start();
        mock.clear();
        (c, mock)
    }

    /// Overlay regions each back buffer received, following the swap on
    /// every present. Both buffers start at index 0 after `coordinator()`.
    fn overlays_per_buffer(calls: &[Call]) -> [Vec<Option<Rect>>; 2] {
        let mut buffers: [Vec<Option<Rect>>; 2] = Default::default();
        let mut back = 0;
        for call in calls {
            match call {
                Call::Overlay(region) => buffers[back].push(*region),
                Call::Present => back ^= 1,
                _ => {}
            }
        }
        buffers
    }

    fn draw(r: Rect) -> RenderCommand<MockGpuFn> {
        RenderCommand::Draw(Box::new(move |img: &mut RgbaImage| fill(img, r, RED)))
    }

    // ── flush ─────────────────────────────────────────────────────────────

    #[test]
    fn start_shows_whole_surface() {
        let mock = MockCompositor::default();
        let mut c = Coordinator::new(mock.clone(), Rect::from_size(8, 4), Duration::from_millis(1));
        assert_eq!(c.state(), RenderState::ContextBound);
        c.start();
        assert_eq!(c.state(), RenderState::Ready);

        let full = Rect::from_size(8, 4);
        assert_eq!(
            mock.calls(),
            vec![
                Call::Upload(full),
                Call::Overlay(Some(full)),
                Call::Present,
                Call::Overlay(Some(full)),
                Call::Present,
            ]
        );
    }

    #[test]
    fn red_fill_uploads_exactly_its_region() {
        let (mut c, mock) = coordinator(640, 480);
        let r = Rect::new(0, 0, 100, 100);
        assert!(c.handle(draw(r)).is_continue());
        c.flush();

        assert_eq!(mock.calls()[0], Call::Upload(r));
        let uploads = mock.uploads();
        assert_eq!(uploads.len(), 1);
        assert_eq!(uploads[0].len(), 100 * 100 * 4);
        assert!(uploads[0].chunks_exact(4).all(|px| px == [255, 0, 0, 255]));
    }

    #[test]
    fn disjoint_draws_upload_bounding_box_once() {
        let (mut c, mock) = coordinator(64, 64);
        let _ = c.handle(draw(Rect::new(0, 0, 4, 4)));
        let _ = c.handle(draw(Rect::new(10, 20, 12, 30)));
        c.flush();

        let bbox = Rect::new(0, 0, 12, 30);
        assert_eq!(
            mock.calls(),
            vec![
                Call::Upload(bbox),
                Call::Overlay(Some(bbox)),
                Call::Present,
                Call::Overlay(Some(bbox)),
                Call::Present,
            ]
        );
    }

    #[test]
    fn flush_without_damage_does_nothing() {
        let (mut c, mock) = coordinator(16, 16);
        c.flush();
        assert!(mock.calls().is_empty());
    }

    #[test]
    fn out_of_bounds_damage_is_dropped() {
        let (mut c, mock) = coordinator(16, 16);
        let cmd = RenderCommand::Draw(Box::new(|_: &mut RgbaImage| Rect::new(100, 100, 120, 120)));
        let _ = c.handle(cmd);
        c.flush();
        assert!(mock.calls().is_empty());
    }

    #[test]
    fn damage_is_reset_after_flush() {
        let (mut c, mock) = coordinator(16, 16);
        let _ = c.handle(draw(Rect::new(1, 1, 2, 2)));
        c.flush();
        mock.clear();
        c.flush();
        assert!(mock.calls().is_empty());
    }

    // ── resize ────────────────────────────────────────────────────────────

    #[test]
    fn resize_reallocates_both_sides_and_damages_everything() {
        let (mut c, mock) = coordinator(16, 16);
        let bigger = Rect::from_size(32, 24);
        let _ = c.handle(RenderCommand::Resize(bigger));
        assert_eq!(c.surface().bounds(), bigger);
        assert_eq!(mock.calls(), vec![Call::Resize(bigger)]);

        mock.clear();
        c.flush();
        assert_eq!(mock.calls()[0], Call::Upload(bigger));
    }

    // ── gpu closures ──────────────────────────────────────────────────────

    #[test]
    fn gpu_closure_is_followed_by_one_composite() {
        let (mut c, mock) = coordinator(16, 16);
        let _ = c.handle(RenderCommand::Gpu(Box::new(|| {})));
        assert_eq!(mock.calls(), vec![Call::Gpu, Call::Overlay(None), Call::Present]);
    }

    #[test]
    fn gpu_closure_uploads_pending_damage() {
        let (mut c, mock) = coordinator(16, 16);
        let r = Rect::new(2, 2, 6, 6);
        let _ = c.handle(draw(r));
        let _ = c.handle(RenderCommand::Gpu(Box::new(|| {})));
        assert_eq!(
            mock.calls(),
            vec![Call::Gpu, Call::Upload(r), Call::Overlay(Some(r)), Call::Present]
        );

        // Still pending: the other back buffer has not seen it yet.
        mock.clear();
        c.flush();
        assert_eq!(
            mock.calls(),
            vec![
                Call::Upload(r),
                Call::Overlay(Some(r)),
                Call::Present,
                Call::Overlay(Some(r)),
                Call::Present,
            ]
        );
    }

    #[test]
    fn gpu_composite_reaches_both_back_buffers() {
        let (mut c, mock) = coordinator(64, 64);
        let a = Rect::new(0, 0, 8, 8);
        let b = Rect::new(20, 20, 30, 30);

        let _ = c.handle(draw(a));
        let _ = c.handle(RenderCommand::Gpu(Box::new(|| {})));
        let _ = c.handle(draw(b));
        c.flush();

        let buffers = overlays_per_buffer(&mock.calls());
        for (i, overlays) in buffers.iter().enumerate() {
            assert!(
                overlays.iter().any(|o| o.is_none_or(|r| r.contains_rect(a))),
                "buffer {i} never composited {a:?}: {overlays:?}"
            );
        }
    }

    // ── run loop ──────────────────────────────────────────────────────────

    #[test]
    fn close_stops_without_final_flush() {
        let mock = MockCompositor::default();
        let c = Coordinator::new(mock.clone(), Rect::from_size(4, 4), Duration::from_secs(5));
        let (tx, rx) = mpsc::sync_channel(0);

        let render = thread::spawn(move || {
            c.run(&rx);
        });

        tx.send(draw(Rect::new(0, 0, 1, 1))).unwrap();
        tx.send(RenderCommand::Close(Trigger::Draw)).unwrap();
        render.join().unwrap();

        // Only the start-up flush of the initial surface.
        let uploads: Vec<Call> = mock
            .calls()
            .into_iter()
            .filter(|c| matches!(c, Call::Upload(_)))
            .collect();
        assert_eq!(uploads, vec![Call::Upload(Rect::from_size(4, 4))]);
    }

    #[test]
    fn burst_is_flushed_when_the_deadline_passes() {
        let mock = MockCompositor::default();
        let c = Coordinator::new(mock.clone(), Rect::from_size(8, 8), Duration::from_millis(1));
        let (tx, rx) = mpsc::sync_channel(0);
        let render = thread::spawn(move || {
            c.run(&rx);
        });

        let r = Rect::new(1, 1, 3, 3);
        tx.send(draw(r)).unwrap();
        thread::sleep(Duration::from_millis(50));
        tx.send(RenderCommand::Close(Trigger::Gpu)).unwrap();
        render.join().unwrap();

        assert!(mock.calls().contains(&Call::Upload(r)));
    }

    #[test]
    fn dropped_senders_end_the_loop() {
        let mock = MockCompositor::default();
        let c = Coordinator::new(mock.clone(), Rect::from_size(2, 2), Duration::from_millis(1));
        let (tx, rx) = mpsc::sync_channel::<RenderCommand<MockGpuFn>>(0);
        drop(tx);
        c.run(&rx);
        assert_eq!(mock.calls().last(), Some(&Call::Present));
    }

    #[test]
    fn close_moves_to_draining() {
        let (mut c, _mock) = coordinator(2, 2);
        assert!(c.handle(RenderCommand::Close(Trigger::Draw)).is_break());
        assert_eq!(c.state(), RenderState::Draining);
    }
}
