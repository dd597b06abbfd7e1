//! wgpu implementation of [`Compositor`].
//!
//! Emulates a double-buffered default framebuffer: two persistent back
//! buffers share one depth buffer, and presenting blits the current back
//! buffer into the acquired surface texture before swapping. The CPU surface
//! lives in a screen texture that is composited over the back buffer with a
//! full-viewport quad.

mod pipeline;
mod targets;

use anyhow::Result;
use wgpu::util::DeviceExt;
use winit::dpi::PhysicalSize;

use crate::coords::Rect;
use crate::device::{Gpu, SurfaceErrorAction};

use self::pipeline::{Pipelines, QUAD_VERTICES};
use self::targets::Targets;
use super::command::GpuFn;
use super::compositor::Compositor;
use super::ctx::GpuCtx;

pub use self::pipeline::{COLOR_FORMAT, DEPTH_FORMAT};

pub struct WgpuCompositor {
    gpu: Gpu,
    pipelines: Pipelines,
    quad: wgpu::Buffer,
    targets: Targets,
    /// Index of the back buffer the next present shows.
    back: usize,
    /// Set after a fatal surface error; presenting stops.
    lost: bool,
}

impl WgpuCompositor {
    /// Builds pipelines, the screen texture and the back buffers for the
    /// current surface size. Fails if a shader does not compile.
    pub fn new(gpu: Gpu) -> Result<Self> {
        let pipelines = Pipelines::new(gpu.device(), gpu.surface_format())?;

        let quad = gpu
            .device()
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("guigl quad vbo"),
                contents: bytemuck::cast_slice(&QUAD_VERTICES),
                usage: wgpu::BufferUsages::VERTEX,
            });

        let size = gpu.size();
        let targets = Targets::new(gpu.device(), gpu.queue(), &pipelines, size.width, size.height);
        log::debug!("compositor ready at {}x{}", targets.size.0, targets.size.1);

        Ok(Self {
            gpu,
            pipelines,
            quad,
            targets,
            back: 0,
            lost: false,
        })
    }

    fn target_bounds(&self) -> Rect {
        Rect::from_size(self.targets.size.0, self.targets.size.1)
    }
}

impl Compositor for WgpuCompositor {
    type GpuFn = GpuFn;

    fn resize(&mut self, bounds: Rect) {
        let width = bounds.width().max(0) as u32;
        let height = bounds.height().max(0) as u32;

        self.gpu.resize(PhysicalSize::new(width, height));
        self.targets = Targets::new(self.gpu.device(), self.gpu.queue(), &self.pipelines, width, height);
        self.back = 0;
    }

    fn upload(&mut self, region: Rect, pixels: &[u8]) {
        let Some(r) = region.intersect(self.target_bounds()) else {
            return;
        };
        if r != region {
            log::warn!("upload {region:?} exceeds screen texture; skipped");
            return;
        }

        let (width, height) = (r.width() as u32, r.height() as u32);
        if pixels.len() != (4 * width * height) as usize {
            log::warn!("upload {region:?} has {} bytes; skipped", pixels.len());
            return;
        }

        self.gpu.queue().write_texture(
            wgpu::TexelCopyTextureInfo {
                texture: &self.targets.screen,
                mip_level: 0,
                origin: wgpu::Origin3d {
                    x: r.min.x as u32,
                    y: r.min.y as u32,
                    z: 0,
                },
                aspect: wgpu::TextureAspect::All,
            },
            pixels,
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(4 * width),
                rows_per_image: Some(height),
            },
            wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
        );
    }

    fn draw_overlay(&mut self, region: Option<Rect>) {
        let Some((reset, full)) = overlay_clips(region, self.target_bounds()) else {
            return;
        };

        let device = self.gpu.device();
        let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("guigl overlay encoder"),
        });

        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("guigl overlay pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &self.targets.buffers[self.back].view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Load,
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.targets.depth,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Load,
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                timestamp_writes: None,
                occlusion_query_set: None,
                multiview_mask: None,
            });

            pass.set_vertex_buffer(0, self.quad.slice(..));

            // Framebuffer origin is top-left, same as the surface: no flip.
            if let Some(r) = reset {
                set_scissor(&mut pass, r);
                pass.set_pipeline(&self.pipelines.depth_reset);
                pass.draw(0..QUAD_VERTICES.len() as u32, 0..1);
            }

            set_scissor(&mut pass, full);
            pass.set_pipeline(&self.pipelines.overlay);
            pass.set_bind_group(0, &self.targets.screen_source, &[]);
            pass.draw(0..QUAD_VERTICES.len() as u32, 0..1);
        }

        self.gpu.queue().submit(std::iter::once(encoder.finish()));
    }

    fn present(&mut self) {
        let size = self.gpu.size();
        if self.lost || size.width == 0 || size.height == 0 {
            return;
        }

        let mut frame = match self.gpu.begin_frame() {
            Ok(frame) => frame,
            Err(err) => {
                let reason = err.to_string();
                match self.gpu.handle_surface_error(err) {
                    SurfaceErrorAction::Reconfigured => log::debug!("surface reconfigured; frame skipped"),
                    SurfaceErrorAction::SkipFrame => log::warn!("surface frame skipped: {reason}"),
                    SurfaceErrorAction::Fatal => {
                        log::error!("surface lost for good: {reason}");
                        self.lost = true;
                    }
                }
                return;
            }
        };

        {
            let mut pass = frame.encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("guigl blit pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &frame.view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
                multiview_mask: None,
            });

            pass.set_pipeline(&self.pipelines.blit);
            pass.set_bind_group(0, &self.targets.buffers[self.back].source, &[]);
            pass.set_vertex_buffer(0, self.quad.slice(..));
            pass.draw(0..QUAD_VERTICES.len() as u32, 0..1);
        }

        self.gpu.present(frame);
        self.back ^= 1;
    }

    fn run_gpu(&mut self, f: GpuFn) {
        let mut ctx = GpuCtx {
            device: self.gpu.device(),
            queue: self.gpu.queue(),
            target: &self.targets.buffers[self.back].view,
            depth: &self.targets.depth,
            format: COLOR_FORMAT,
            depth_format: DEPTH_FORMAT,
            size: self.targets.size,
        };
        f(&mut ctx);
    }
}

/// Scissor rectangles for one overlay pass: the depth reset is clipped to the
/// damaged region, the quad always covers the whole target.
///
/// `None` when `region` misses the target, in which case nothing is drawn.
fn overlay_clips(region: Option<Rect>, target: Rect) -> Option<(Option<Rect>, Rect)> {
    match region {
        Some(r) => r.intersect(target).map(|r| (Some(r), target)),
        None => Some((None, target)),
    }
}

fn set_scissor(pass: &mut wgpu::RenderPass<'_>, r: Rect) {
    pass.set_scissor_rect(r.min.x as u32, r.min.y as u32, r.width() as u32, r.height() as u32);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overlay_quad_is_never_clipped_to_damage() {
        let target = Rect::from_size(640, 480);
        let damage = Rect::new(10, 10, 50, 40);
        assert_eq!(overlay_clips(Some(damage), target), Some((Some(damage), target)));
        assert_eq!(overlay_clips(None, target), Some((None, target)));
    }

    #[test]
    fn depth_reset_is_clipped_to_target() {
        let target = Rect::from_size(100, 100);
        let clips = overlay_clips(Some(Rect::new(90, 90, 200, 200)), target);
        assert_eq!(clips, Some((Some(Rect::new(90, 90, 100, 100)), target)));
    }

    #[test]
    fn damage_outside_target_draws_nothing() {
        let target = Rect::from_size(100, 100);
        assert_eq!(overlay_clips(Some(Rect::new(200, 200, 300, 300)), target), None);
    }
}
