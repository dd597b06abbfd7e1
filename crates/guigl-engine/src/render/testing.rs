//! Recording compositor for exercising the coordinator without a GPU.

use std::sync::{Arc, Mutex};

use crate::coords::Rect;

use super::compositor::Compositor;

pub type MockGpuFn = Box<dyn FnOnce() + Send>;

#[derive(Debug, Clone, Eq, PartialEq)]
pub enum Call {
    Resize(Rect),
    Upload(Rect),
    Overlay(Option<Rect>),
    Present,
    Gpu,
}

#[derive(Clone, Default)]
pub struct MockCompositor {
    calls: Arc<Mutex<Vec<Call>>>,
    uploads: Arc<Mutex<Vec<Vec<u8>>>>,
}

impl MockCompositor {
    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn uploads(&self) -> Vec<Vec<u8>> {
        self.uploads.lock().unwrap().clone()
    }

    pub fn clear(&self) {
        self.calls.lock().unwrap().clear();
        self.uploads.lock().unwrap().clear();
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }
}

impl Compositor for MockCompositor {
    type GpuFn = MockGpuFn;

    fn resize(&mut self, bounds: Rect) {
        self.record(Call::Resize(bounds));
    }

    fn upload(&mut self, region: Rect, pixels: &[u8]) {
        self.record(Call::Upload(region));
        self.uploads.lock().unwrap().push(pixels.to_vec());
    }

    fn draw_overlay(&mut self, region: Option<Rect>) {
        self.record(Call::Overlay(region));
    }

    fn present(&mut self) {
        self.record(Call::Present);
    }

    fn run_gpu(&mut self, f: Self::GpuFn) {
        f();
        self.record(Call::Gpu);
    }
}
