use super::pipeline::{Pipelines, COLOR_FORMAT, DEPTH_FORMAT};

/// One of the two persistent back buffers.
pub(super) struct BackBuffer {
    pub view: wgpu::TextureView,
    /// Binds `view` as the blit source.
    pub source: wgpu::BindGroup,
}

/// Size-dependent GPU resources. Rebuilt on every resize.
pub(super) struct Targets {
    pub size: (u32, u32),
    pub screen: wgpu::Texture,
    /// Binds the screen texture for the overlay pass.
    pub screen_source: wgpu::BindGroup,
    pub buffers: [BackBuffer; 2],
    /// Shared by both back buffers.
    pub depth: wgpu::TextureView,
}

impl Targets {
    /// Allocates every target at `width x height` (clamped to at least 1x1)
    /// and clears them: colour transparent, depth far.
    pub fn new(device: &wgpu::Device, queue: &wgpu::Queue, pipelines: &Pipelines, width: u32, height: u32) -> Self {
        let size = (width.max(1), height.max(1));

        let screen = create_texture(
            device,
            "guigl screen texture",
            size,
            COLOR_FORMAT,
            wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
        );
        let screen_view = screen.create_view(&wgpu::TextureViewDescriptor::default());
        let screen_source = pipelines.texture_bind_group(device, "guigl screen bind group", &screen_view);

        let buffers = ["guigl back buffer 0", "guigl back buffer 1"].map(|label| {
            let texture = create_texture(
                device,
                label,
                size,
                COLOR_FORMAT,
                wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::TEXTURE_BINDING,
            );
            let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
            let source = pipelines.texture_bind_group(device, label, &view);
            BackBuffer { view, source }
        });

        let depth = create_texture(
            device,
            "guigl depth buffer",
            size,
            DEPTH_FORMAT,
            wgpu::TextureUsages::RENDER_ATTACHMENT,
        )
        .create_view(&wgpu::TextureViewDescriptor::default());

        let targets = Self {
            size,
            screen,
            screen_source,
            buffers,
            depth,
        };
        targets.clear(device, queue);
        targets
    }

    fn clear(&self, device: &wgpu::Device, queue: &wgpu::Queue) {
        let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("guigl clear encoder"),
        });

        for buffer in &self.buffers {
            let _pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("guigl clear pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &buffer.view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color::TRANSPARENT),
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.depth,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                timestamp_writes: None,
                occlusion_query_set: None,
                multiview_mask: None,
            });
        }

        queue.submit(std::iter::once(encoder.finish()));
    }
}

fn create_texture(
    device: &wgpu::Device,
    label: &str,
    (width, height): (u32, u32),
    format: wgpu::TextureFormat,
    usage: wgpu::TextureUsages,
) -> wgpu::Texture {
    device.create_texture(&wgpu::TextureDescriptor {
        label: Some(label),
        size: wgpu::Extent3d {
            width,
            height,
            depth_or_array_layers: 1,
        },
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format,
        usage,
        view_formats: &[],
    })
}
