//! Instanced point-sprite renderer.
//!
//! Each particle is one instance of a six-vertex quad. Instance data comes
//! from two vertex buffers:
//!
//! | Slot | Contents | Format | Written |
//! |------|----------|--------|---------|
//! | 0 | position | `Float32x3` | every tick |
//! | 1 | `[rendered_size, seed]` | `Float32x2` | once per rebuild |

use bytemuck::{Pod, Zeroable};
use glam::Mat4;
use wgpu::util::DeviceExt;

use super::{blend_state, Camera, GpuState, DEPTH_FORMAT};
use crate::bridge::{FrameUniforms, RenderTarget};
use crate::buffer::{InstanceAttributes, ParticleBuffer};
use crate::visuals::{PointMaterial, POINT_ATTENUATION};
use crate::Vec3;

/// Uniform block shared by every shading program. Field order matches the
/// `Uniforms` struct in the generated WGSL.
#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
pub struct GpuUniforms {
    pub view: [[f32; 4]; 4],
    pub proj: [[f32; 4]; 4],
    pub model: [[f32; 4]; 4],
    pub color: [f32; 3],
    pub opacity: f32,
    pub viewport: [f32; 2],
    pub time: f32,
    pub size_scale: f32,
    pub attenuation: f32,
    pub _padding: [f32; 3],
}

impl GpuUniforms {
    pub fn compose(camera: &Camera, viewport: [f32; 2], frame: &FrameUniforms) -> Self {
        let aspect = viewport[0] / viewport[1].max(1.0);
        let material = &frame.material;
        Self {
            view: camera.view_matrix().to_cols_array_2d(),
            proj: camera.projection_matrix(aspect).to_cols_array_2d(),
            model: Mat4::from_rotation_y(frame.rotation_y).to_cols_array_2d(),
            color: material.color.to_array(),
            opacity: material.opacity,
            viewport,
            time: material.time,
            size_scale: material.size_scale,
            attenuation: POINT_ATTENUATION,
            _padding: [0.0; 3],
        }
    }
}

/// A position slice may only be written into a mirror built for exactly as
/// many instances.
fn fits_mirror(positions: &[Vec3], instance_count: u32) -> bool {
    positions.len() == instance_count as usize
}

/// GPU objects that live exactly as long as one particle system build.
struct PointMirror {
    pipeline: wgpu::RenderPipeline,
    position_buffer: wgpu::Buffer,
    attribute_buffer: wgpu::Buffer,
    instance_count: u32,
}

/// Draws a particle system into a window surface.
pub struct PointRenderer {
    gpu: GpuState,
    pub camera: Camera,
    uniform_buffer: wgpu::Buffer,
    uniform_bind_group_layout: wgpu::BindGroupLayout,
    uniform_bind_group: wgpu::BindGroup,
    mirror: Option<PointMirror>,
}

impl PointRenderer {
    pub fn new(gpu: GpuState) -> Self {
        let camera = Camera::new();

        let uniform_buffer = gpu.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Point Uniform Buffer"),
            size: std::mem::size_of::<GpuUniforms>() as wgpu::BufferAddress,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let uniform_bind_group_layout =
            gpu.device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("Point Uniform Bind Group Layout"),
                entries: &[wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                }],
            });

        let uniform_bind_group = gpu.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Point Uniform Bind Group"),
            layout: &uniform_bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: uniform_buffer.as_entire_binding(),
            }],
        });

        Self {
            gpu,
            camera,
            uniform_buffer,
            uniform_bind_group_layout,
            uniform_bind_group,
            mirror: None,
        }
    }

    pub fn resize(&mut self, new_size: winit::dpi::PhysicalSize<u32>) {
        self.gpu.resize(new_size);
    }

    /// Recover from a lost or outdated surface. Particle buffers survive.
    pub fn reconfigure_surface(&mut self) {
        self.gpu.reconfigure();
    }

    fn create_pipeline(&self, material: &PointMaterial) -> wgpu::RenderPipeline {
        let device = &self.gpu.device;
        let label = material.program.name();

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some(label),
            source: wgpu::ShaderSource::Wgsl(material.shader_source().into()),
        });

        let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Point Pipeline Layout"),
            bind_group_layouts: &[&self.uniform_bind_group_layout],
            push_constant_ranges: &[],
        });

        let position_attributes = [wgpu::VertexAttribute {
            offset: 0,
            shader_location: 0,
            format: wgpu::VertexFormat::Float32x3,
        }];
        let instance_attributes = [wgpu::VertexAttribute {
            offset: 0,
            shader_location: 1,
            format: wgpu::VertexFormat::Float32x2,
        }];

        device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some(label),
            layout: Some(&layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                buffers: &[
                    wgpu::VertexBufferLayout {
                        array_stride: std::mem::size_of::<Vec3>() as wgpu::BufferAddress,
                        step_mode: wgpu::VertexStepMode::Instance,
                        attributes: &position_attributes,
                    },
                    wgpu::VertexBufferLayout {
                        array_stride: std::mem::size_of::<InstanceAttributes>() as wgpu::BufferAddress,
                        step_mode: wgpu::VertexStepMode::Instance,
                        attributes: &instance_attributes,
                    },
                ],
                compilation_options: Default::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                targets: &[Some(wgpu::ColorTargetState {
                    format: self.gpu.config.format,
                    blend: Some(blend_state(material.blend_mode)),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: Default::default(),
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                strip_index_format: None,
                front_face: wgpu::FrontFace::Ccw,
                cull_mode: None,
                polygon_mode: wgpu::PolygonMode::Fill,
                unclipped_depth: false,
                conservative: false,
            },
            depth_stencil: Some(wgpu::DepthStencilState {
                format: DEPTH_FORMAT,
                depth_write_enabled: material.depth_write,
                depth_compare: wgpu::CompareFunction::Less,
                stencil: wgpu::StencilState::default(),
                bias: wgpu::DepthBiasState::default(),
            }),
            multisample: wgpu::MultisampleState::default(),
            multiview: None,
            cache: None,
        })
    }
}

impl RenderTarget for PointRenderer {
    type Error = wgpu::SurfaceError;

    fn rebuild(&mut self, material: &PointMaterial, buffer: &ParticleBuffer) {
        // Old buffers and pipeline are released when the mirror is replaced.
        self.mirror = None;

        let pipeline = self.create_pipeline(material);
        let position_buffer = self.gpu.device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Particle Positions"),
            contents: buffer.position_bytes(),
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
        });
        let attributes = buffer.instance_attributes();
        let attribute_buffer = self.gpu.device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Particle Size/Seed"),
            contents: bytemuck::cast_slice(&attributes),
            usage: wgpu::BufferUsages::VERTEX,
        });

        tracing::info!(
            program = material.program.name(),
            instances = buffer.len(),
            blend = ?material.blend_mode,
            "point pipeline rebuilt"
        );

        self.mirror = Some(PointMirror {
            pipeline,
            position_buffer,
            attribute_buffer,
            instance_count: buffer.len() as u32,
        });
    }

    fn upload(&mut self, positions: &[Vec3], frame: &FrameUniforms) {
        let uniforms = GpuUniforms::compose(&self.camera, self.gpu.viewport(), frame);
        self.gpu
            .queue
            .write_buffer(&self.uniform_buffer, 0, bytemuck::bytes_of(&uniforms));

        let Some(mirror) = &self.mirror else {
            return;
        };
        if !fits_mirror(positions, mirror.instance_count) {
            tracing::warn!(
                positions = positions.len(),
                instances = mirror.instance_count,
                "position upload does not match the mirrored buffer; skipped"
            );
            return;
        }
        if !positions.is_empty() {
            self.gpu
                .queue
                .write_buffer(&mirror.position_buffer, 0, bytemuck::cast_slice(positions));
        }
    }

    fn draw(&mut self) -> Result<(), wgpu::SurfaceError> {
        let output = self.gpu.surface.get_current_texture()?;
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = self
            .gpu
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Point Render Encoder"),
            });

        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Point Render Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.gpu.depth_texture,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            if let Some(mirror) = &self.mirror {
                render_pass.set_pipeline(&mirror.pipeline);
                render_pass.set_bind_group(0, &self.uniform_bind_group, &[]);
                render_pass.set_vertex_buffer(0, mirror.position_buffer.slice(..));
                render_pass.set_vertex_buffer(1, mirror.attribute_buffer.slice(..));
                render_pass.draw(0..6, 0..mirror.instance_count);
            }
        }

        self.gpu.queue.submit(std::iter::once(encoder.finish()));
        output.present();

        Ok(())
    }
}
