use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec3};
use guigl_engine::render::GpuCtx;
use guigl_engine::surface::Rgba;
use wgpu::util::DeviceExt;

/// Per-frame input for [`CubeRenderer::draw`].
#[derive(Debug, Copy, Clone)]
pub struct CubeFrame {
    /// Rotation around the vertical axis, radians.
    pub angle: f32,
    pub clear: Rgba<u8>,
}

#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable)]
struct CubeVertex {
    pos: [f32; 3],
    color: [f32; 3],
}

impl CubeVertex {
    const ATTRS: [wgpu::VertexAttribute; 2] = wgpu::vertex_attr_array![
        0 => Float32x3, // pos
        1 => Float32x3  // color
    ];

    fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<CubeVertex>() as u64,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRS,
        }
    }
}

#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable)]
struct CameraUniform {
    mvp: [[f32; 4]; 4],
}

/// Unit cube, one colour per face, counter-clockwise from outside.
fn cube_geometry() -> (Vec<CubeVertex>, Vec<u16>) {
    // (normal axis, sign, colour)
    let faces: [(usize, f32, [f32; 3]); 6] = [
        (0, 1.0, [0.90, 0.30, 0.25]),
        (0, -1.0, [0.25, 0.70, 0.35]),
        (1, 1.0, [0.30, 0.45, 0.90]),
        (1, -1.0, [0.95, 0.80, 0.25]),
        (2, 1.0, [0.75, 0.35, 0.85]),
        (2, -1.0, [0.30, 0.80, 0.85]),
    ];

    let mut vertices = Vec::with_capacity(24);
    let mut indices = Vec::with_capacity(36);

    for (axis, sign, color) in faces {
        let normal = Vec3::from_array({
            let mut n = [0.0; 3];
            n[axis] = sign;
            n
        });
        // Two tangents spanning the face; their cross product points along `normal`.
        let u = Vec3::from_array({
            let mut t = [0.0; 3];
            t[(axis + 1) % 3] = 1.0;
            t
        });
        let v = normal.cross(u);

        let base = vertices.len() as u16;
        for (su, sv) in [(-1.0, -1.0), (1.0, -1.0), (1.0, 1.0), (-1.0, 1.0)] {
            let p = normal + u * su + v * sv;
            vertices.push(CubeVertex {
                pos: (p * 0.5).to_array(),
                color,
            });
        }
        indices.extend_from_slice(&[base, base + 1, base + 2, base, base + 2, base + 3]);
    }

    (vertices, indices)
}

/// GPU resources for the spinning cube. Lives on the render thread.
pub struct CubeRenderer {
    pipeline: wgpu::RenderPipeline,
    vbo: wgpu::Buffer,
    ibo: wgpu::Buffer,
    index_count: u32,
    camera_ubo: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
}

impl CubeRenderer {
    pub fn new(ctx: &GpuCtx<'_>) -> Self {
        let device = ctx.device;

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("cube shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("shaders/cube.wgsl").into()),
        });

        let (vertices, indices) = cube_geometry();
        let vbo = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("cube vbo"),
            contents: bytemuck::cast_slice(&vertices),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let ibo = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("cube ibo"),
            contents: bytemuck::cast_slice(&indices),
            usage: wgpu::BufferUsages::INDEX,
        });

        let camera_ubo = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("cube camera ubo"),
            size: std::mem::size_of::<CameraUniform>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let bgl = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("cube bgl"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            }],
        });

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("cube bind group"),
            layout: &bgl,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: camera_ubo.as_entire_binding(),
            }],
        });

        let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("cube pipeline layout"),
            bind_group_layouts: &[&bgl],
            immediate_size: 0,
        });

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("cube pipeline"),
            layout: Some(&layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                compilation_options: Default::default(),
                buffers: &[CubeVertex::layout()],
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                compilation_options: Default::default(),
                targets: &[Some(wgpu::ColorTargetState {
                    format: ctx.format,
                    blend: None,
                    write_mask: wgpu::ColorWrites::ALL,
                })],
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                strip_index_format: None,
                front_face: wgpu::FrontFace::Ccw,
                cull_mode: Some(wgpu::Face::Back),
                polygon_mode: wgpu::PolygonMode::Fill,
                unclipped_depth: false,
                conservative: false,
            },
            depth_stencil: Some(wgpu::DepthStencilState {
                format: ctx.depth_format,
                depth_write_enabled: true,
                depth_compare: wgpu::CompareFunction::Less,
                stencil: wgpu::StencilState::default(),
                bias: wgpu::DepthBiasState::default(),
            }),
            multisample: wgpu::MultisampleState::default(),
            multiview_mask: None,
            cache: None,
        });

        log::info!("cube renderer ready ({} indices)", indices.len());

        Self {
            pipeline,
            vbo,
            ibo,
            index_count: indices.len() as u32,
            camera_ubo,
            bind_group,
        }
    }

    /// Clears the target and draws the cube at `frame.angle`.
    pub fn draw(&self, ctx: &GpuCtx<'_>, frame: CubeFrame) {
        let camera = CameraUniform {
            mvp: camera_matrix(ctx.aspect(), frame.angle).to_cols_array_2d(),
        };
        ctx.queue.write_buffer(&self.camera_ubo, 0, bytemuck::bytes_of(&camera));

        let mut encoder = ctx.device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("cube encoder"),
        });

        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("cube pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: ctx.target,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(clear_color(frame.clear)),
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: ctx.depth,
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

            pass.set_pipeline(&self.pipeline);
            pass.set_bind_group(0, &self.bind_group, &[]);
            pass.set_vertex_buffer(0, self.vbo.slice(..));
            pass.set_index_buffer(self.ibo.slice(..), wgpu::IndexFormat::Uint16);
            pass.draw_indexed(0..self.index_count, 0, 0..1);
        }

        ctx.queue.submit(std::iter::once(encoder.finish()));
    }
}

fn camera_matrix(aspect: f32, angle: f32) -> Mat4 {
    let projection = Mat4::perspective_rh(45f32.to_radians(), aspect, 0.1, 10.0);
    let view = Mat4::look_at_rh(Vec3::new(3.0, 3.0, 3.0), Vec3::ZERO, Vec3::Y);
    projection * view * Mat4::from_rotation_y(angle)
}

fn clear_color(c: Rgba<u8>) -> wgpu::Color {
    let [r, g, b, a] = c.0.map(|v| v as f64 / 255.0);
    wgpu::Color { r, g, b, a }
}
