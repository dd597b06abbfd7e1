use std::sync::mpsc::{self, Receiver};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use anyhow::{anyhow, Context, Result};

use crate::coords::Rect;

use super::command::RenderCommand;
use super::compositor::Compositor;
use super::coordinator::{Coordinator, RenderState};

/// Handle to the thread that owns the GPU context.
pub struct RenderThread {
    handle: JoinHandle<()>,
}

/// Runs `on_exit` when the render thread ends, including by panic.
struct ExitGuard<F: FnOnce()>(Option<F>);

impl<F: FnOnce()> Drop for ExitGuard<F> {
    fn drop(&mut self) {
        if let Some(f) = self.0.take() {
            f();
        }
    }
}

impl RenderThread {
    /// Spawns the render thread and waits for its bootstrap.
    ///
    /// `bootstrap` runs on the new thread and builds the compositor there, so
    /// every GPU object is created by the thread that uses it. Returns only
    /// once bootstrap has finished; a failed or panicking bootstrap is
    /// returned as an error. `on_exit` runs exactly once when the thread
    /// stops for any reason.
    pub fn spawn<C, B, F>(
        bootstrap: B,
        bounds: Rect,
        flush_interval: Duration,
        commands: Receiver<RenderCommand<C::GpuFn>>,
        on_exit: F,
    ) -> Result<Self>
    where
        C: Compositor,
        B: FnOnce() -> Result<C> + Send + 'static,
        F: FnOnce() + Send + 'static,
    {
        let (ready_tx, ready_rx) = mpsc::sync_channel::<Result<()>>(1);

        let handle = thread::Builder::new()
            .name("guigl-render".to_string())
            .spawn(move || {
                let _guard = ExitGuard(Some(on_exit));
                log::debug!("render state {}", RenderState::Uninitialized);

                let compositor = match bootstrap() {
                    Ok(c) => c,
                    Err(e) => {
                        let _ = ready_tx.send(Err(e));
                        return;
                    }
                };

                let coordinator = Coordinator::new(compositor, bounds, flush_interval);
                log::debug!("render state {}", coordinator.state());
                let _ = ready_tx.send(Ok(()));
                drop(ready_tx);

                coordinator.run(&commands);
                log::info!("render thread finished");
            })
            .context("failed to spawn render thread")?;

        match ready_rx.recv() {
            Ok(Ok(())) => Ok(Self { handle }),
            Ok(Err(e)) => {
                let _ = handle.join();
                Err(e.context("render bootstrap failed"))
            }
            Err(_) => {
                let _ = handle.join();
                Err(anyhow!("render thread panicked during bootstrap"))
            }
        }
    }

    /// Waits for the render thread to stop.
    pub fn join(self) -> Result<()> {
        self.handle
            .join()
            .map_err(|_| anyhow!("render thread panicked"))
    }
}
