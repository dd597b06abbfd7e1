//! Spinning cube behind a column of clickable colour swatches.
//!
//! Swatches are painted through draw closures; the cube is drawn by GPU
//! closures. Clicking a swatch changes the cube's clear colour. Pressing a
//! supported key or the close button quits; typed text does not.

mod cube;

use std::sync::mpsc::TryRecvError;
use std::sync::{Arc, Mutex};
use std::time::Instant;

use anyhow::Result;
use guigl_engine::coords::Rect;
use guigl_engine::input::Event;
use guigl_engine::logging::{init_logging, LoggingConfig};
use guigl_engine::surface::{fill, Rgba};
use guigl_engine::window::{self, SubmitError, Win, WindowConfig};

use cube::{CubeFrame, CubeRenderer};

const RECT_WIDTH: u32 = 200;
const RECT_HEIGHT: u32 = 103;
const WINDOW_WIDTH: u32 = 1280;
const WINDOW_HEIGHT: u32 = 721;
const SWATCHES: u32 = 6;

/// Radians per second.
const SPIN_SPEED: f32 = 1.0;

fn palette(index: u32) -> Rgba<u8> {
    match index {
        0..=4 => {
            let step = (index * 50) as u8;
            Rgba([step, 255 - step, 30, 255])
        }
        5 => Rgba([255, 255, 255, 255]),
        _ => Rgba([0, 0, 0, 255]),
    }
}

fn swatch(index: u32) -> Rect {
    Rect::new(
        (WINDOW_WIDTH - RECT_WIDTH) as i32,
        (index * RECT_HEIGHT) as i32,
        WINDOW_WIDTH as i32,
        ((index + 1) * RECT_HEIGHT) as i32,
    )
}

/// Swatch under a framebuffer position, if any.
fn swatch_at(x: i32, y: i32) -> Option<u32> {
    if x <= (WINDOW_WIDTH - RECT_WIDTH) as i32 || y < 0 {
        return None;
    }
    Some(y as u32 / RECT_HEIGHT)
}

/// Whether `ev` ends the demo.
fn quits(ev: &Event) -> bool {
    matches!(ev, Event::Close | Event::KeyDown(_))
}

/// State owned by the caller loop.
struct Demo {
    clear: Rgba<u8>,
    started: Instant,
}

impl Demo {
    fn new() -> Self {
        Self {
            clear: Rgba([20, 20, 28, 255]),
            started: Instant::now(),
        }
    }

    fn frame(&self) -> CubeFrame {
        CubeFrame {
            angle: self.started.elapsed().as_secs_f32() * SPIN_SPEED,
            clear: self.clear,
        }
    }
}

type SharedRenderer = Arc<Mutex<Option<CubeRenderer>>>;

fn main() -> Result<()> {
    init_logging(LoggingConfig::default());

    let config = WindowConfig::new()
        .title("wgpu/gui")
        .size(WINDOW_WIDTH, WINDOW_HEIGHT);

    window::run(config, |mut win| {
        if let Err(e) = drive(&win) {
            log::warn!("stopping: {e}");
        }
        win.close_draw();
    })
}

fn drive(win: &Win) -> Result<(), SubmitError> {
    for i in 0..SWATCHES {
        let (r, color) = (swatch(i), palette(i));
        win.draw(move |img| fill(img, r, color))?;
    }

    let renderer = SharedRenderer::default();
    {
        let renderer = renderer.clone();
        win.gpu(move |ctx| {
            if let Ok(mut slot) = renderer.lock() {
                *slot = Some(CubeRenderer::new(ctx));
            }
        })?;
    }

    let mut demo = Demo::new();
    loop {
        match win.events().try_recv() {
            Ok(ev) if quits(&ev) => return Ok(()),
            Ok(Event::PointerDown { pos, .. }) => {
                if let Some(index) = swatch_at(pos.x, pos.y) {
                    demo.clear = palette(index);
                }
            }
            Ok(_) => {}
            Err(TryRecvError::Empty) => {
                let frame = demo.frame();
                let renderer = renderer.clone();
                win.gpu(move |ctx| {
                    if let Ok(slot) = renderer.lock() {
                        if let Some(cube) = slot.as_ref() {
                            cube.draw(ctx, frame);
                        }
                    }
                })?;
            }
            Err(TryRecvError::Disconnected) => return Ok(()),
        }
    }
}
