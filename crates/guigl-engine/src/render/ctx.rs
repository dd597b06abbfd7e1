/// GPU access handed to GPU closures on the render thread.
///
/// `target` is the back buffer the next present will show and `depth` is the
/// depth buffer shared by both back buffers. Their contents are unspecified:
/// closures clear what they need. Command buffers must be submitted by the
/// closure itself through `queue`.
pub struct GpuCtx<'a> {
    pub device: &'a wgpu::Device,
    pub queue: &'a wgpu::Queue,
    pub target: &'a wgpu::TextureView,
    pub depth: &'a wgpu::TextureView,
    pub format: wgpu::TextureFormat,
    pub depth_format: wgpu::TextureFormat,
    /// Target size in physical pixels.
    pub size: (u32, u32),
}

impl GpuCtx<'_> {
    /// Width over height, never dividing by zero.
    #[inline]
    pub fn aspect(&self) -> f32 {
        self.size.0.max(1) as f32 / self.size.1.max(1) as f32
    }
}
