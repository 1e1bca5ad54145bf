use crate::camera::OrbitCamera;
use crate::mesh::{Vertex, unit_box_mesh};
use crate::shaders;
use crate::stars::{StarfieldConfig, starfield};
use borgshield_common::{Rgb, Transform};
use borgshield_kernel::{IMPACT_CAPACITY, ShieldParameters, ShieldScene};
use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec3};
use wgpu::util::DeviceExt;

#[repr(C)]
#[derive(Copy, Clone, Pod, Zeroable)]
struct CameraUniforms {
    view_proj: [[f32; 4]; 4],
    position: [f32; 4],
}

#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
pub(crate) struct ShieldUniforms {
    model: [[f32; 4]; 4],
    base_color: [f32; 4],
    rim_color: [f32; 4],
    params: [f32; 4],
    hits: [[f32; 4]; IMPACT_CAPACITY],
}

impl ShieldUniforms {
    /// Pack shield parameters. `linear` converts the sRGB-authored colours
    /// for an sRGB render target.
    pub(crate) fn new(model: Mat4, params: &ShieldParameters, linear: bool) -> Self {
        let encode = |c: Vec3| {
            let c = if linear {
                Rgb::new(c.x, c.y, c.z).to_linear()
            } else {
                c
            };
            c.extend(1.0).to_array()
        };
        Self {
            model: model.to_cols_array_2d(),
            base_color: encode(params.base_color),
            rim_color: encode(params.rim_color),
            params: [params.time, 0.0, 0.0, 0.0],
            hits: params.impacts.map(|e| e.position.extend(e.time).to_array()),
        }
    }
}

#[repr(C)]
#[derive(Copy, Clone, Pod, Zeroable)]
struct InstanceData {
    model_0: [f32; 4],
    model_1: [f32; 4],
    model_2: [f32; 4],
    model_3: [f32; 4],
    color: [f32; 4],
}

#[repr(C)]
#[derive(Copy, Clone, Pod, Zeroable)]
struct StarVertex {
    position: [f32; 3],
    color: [f32; 4],
}

/// Dark gunmetal hull. The cube has no texture.
const CUBE_COLOR: [f32; 4] = [0.08, 0.085, 0.08, 1.0];

/// Matches `#050505` in linear light.
const CLEAR_COLOR: wgpu::Color = wgpu::Color {
    r: 0.0015,
    g: 0.0015,
    b: 0.0015,
    a: 1.0,
};

fn model_matrix(edge: f32, transform: &Transform) -> Mat4 {
    Mat4::from_scale_rotation_translation(
        transform.scale * edge,
        transform.rotation,
        transform.position,
    )
}

/// Additive blending: colour scaled by its alpha, added onto the target.
const ADDITIVE: wgpu::BlendState = wgpu::BlendState {
    color: wgpu::BlendComponent {
        src_factor: wgpu::BlendFactor::SrcAlpha,
        dst_factor: wgpu::BlendFactor::One,
        operation: wgpu::BlendOperation::Add,
    },
    alpha: wgpu::BlendComponent {
        src_factor: wgpu::BlendFactor::One,
        dst_factor: wgpu::BlendFactor::One,
        operation: wgpu::BlendOperation::Add,
    },
};

fn mesh_layout() -> wgpu::VertexBufferLayout<'static> {
    const ATTRS: [wgpu::VertexAttribute; 3] = wgpu::vertex_attr_array![
        0 => Float32x3,
        1 => Float32x3,
        2 => Float32x2,
    ];
    wgpu::VertexBufferLayout {
        array_stride: std::mem::size_of::<Vertex>() as u64,
        step_mode: wgpu::VertexStepMode::Vertex,
        attributes: &ATTRS,
    }
}

fn uniform_layout(device: &wgpu::Device, label: &str) -> wgpu::BindGroupLayout {
    device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        label: Some(label),
        entries: &[wgpu::BindGroupLayoutEntry {
            binding: 0,
            visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
            ty: wgpu::BindingType::Buffer {
                ty: wgpu::BufferBindingType::Uniform,
                has_dynamic_offset: false,
                min_binding_size: None,
            },
            count: None,
        }],
    })
}

fn uniform_bind_group(
    device: &wgpu::Device,
    label: &str,
    layout: &wgpu::BindGroupLayout,
    buffer: &wgpu::Buffer,
) -> wgpu::BindGroup {
    device.create_bind_group(&wgpu::BindGroupDescriptor {
        label: Some(label),
        layout,
        entries: &[wgpu::BindGroupEntry {
            binding: 0,
            resource: buffer.as_entire_binding(),
        }],
    })
}

/// wgpu-based scene renderer: starfield, opaque cube, additive shield.
pub struct WgpuRenderer {
    star_pipeline: wgpu::RenderPipeline,
    cube_pipeline: wgpu::RenderPipeline,
    shield_pipeline: wgpu::RenderPipeline,
    camera_buffer: wgpu::Buffer,
    camera_bind_group: wgpu::BindGroup,
    shield_buffer: wgpu::Buffer,
    shield_bind_group: wgpu::BindGroup,
    box_vertex_buffer: wgpu::Buffer,
    box_index_buffer: wgpu::Buffer,
    box_index_count: u32,
    cube_instance_buffer: wgpu::Buffer,
    star_vertex_buffer: wgpu::Buffer,
    star_vertex_count: u32,
    depth_texture: wgpu::TextureView,
    surface_format: wgpu::TextureFormat,
}

impl WgpuRenderer {
    pub fn new(
        device: &wgpu::Device,
        surface_format: wgpu::TextureFormat,
        width: u32,
        height: u32,
        star_count: u32,
    ) -> Self {
        let camera_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("camera_buffer"),
            contents: bytemuck::bytes_of(&CameraUniforms {
                view_proj: Mat4::IDENTITY.to_cols_array_2d(),
                position: [0.0; 4],
            }),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });
        let camera_layout = uniform_layout(device, "camera_bind_group_layout");
        let camera_bind_group =
            uniform_bind_group(device, "camera_bind_group", &camera_layout, &camera_buffer);

        let idle = ShieldParameters::idle(0.0, Vec3::ZERO, Vec3::ZERO);
        let shield_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("shield_buffer"),
            contents: bytemuck::bytes_of(&ShieldUniforms::new(Mat4::IDENTITY, &idle, false)),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });
        let shield_layout = uniform_layout(device, "shield_bind_group_layout");
        let shield_bind_group =
            uniform_bind_group(device, "shield_bind_group", &shield_layout, &shield_buffer);

        let camera_only = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("camera_pipeline_layout"),
            bind_group_layouts: &[&camera_layout],
            push_constant_ranges: &[],
        });
        let camera_and_shield = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("shield_pipeline_layout"),
            bind_group_layouts: &[&camera_layout, &shield_layout],
            push_constant_ranges: &[],
        });

        let opaque_depth = wgpu::DepthStencilState {
            format: wgpu::TextureFormat::Depth32Float,
            depth_write_enabled: true,
            depth_compare: wgpu::CompareFunction::Less,
            stencil: Default::default(),
            bias: Default::default(),
        };

        // Cube pipeline
        let cube_shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("cube_shader"),
            source: wgpu::ShaderSource::Wgsl(shaders::CUBE_SHADER.into()),
        });
        let cube_pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("cube_pipeline"),
            layout: Some(&camera_only),
            vertex: wgpu::VertexState {
                module: &cube_shader,
                entry_point: Some("vs_main"),
                compilation_options: Default::default(),
                buffers: &[
                    mesh_layout(),
                    wgpu::VertexBufferLayout {
                        array_stride: std::mem::size_of::<InstanceData>() as u64,
                        step_mode: wgpu::VertexStepMode::Instance,
                        attributes: &wgpu::vertex_attr_array![
                            3 => Float32x4,
                            4 => Float32x4,
                            5 => Float32x4,
                            6 => Float32x4,
                            7 => Float32x4,
                        ],
                    },
                ],
            },
            fragment: Some(wgpu::FragmentState {
                module: &cube_shader,
                entry_point: Some("fs_main"),
                compilation_options: Default::default(),
                targets: &[Some(wgpu::ColorTargetState {
                    format: surface_format,
                    blend: Some(wgpu::BlendState::REPLACE),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                cull_mode: Some(wgpu::Face::Back),
                ..Default::default()
            },
            depth_stencil: Some(opaque_depth.clone()),
            multisample: Default::default(),
            multiview: None,
            cache: None,
        });

        // Shield pipeline: depth tested against the cube but never written,
        // so overlapping shield fragments accumulate.
        let shield_shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("shield_shader"),
            source: wgpu::ShaderSource::Wgsl(shaders::SHIELD_SHADER.into()),
        });
        let shield_pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("shield_pipeline"),
            layout: Some(&camera_and_shield),
            vertex: wgpu::VertexState {
                module: &shield_shader,
                entry_point: Some("vs_shield"),
                compilation_options: Default::default(),
                buffers: &[mesh_layout()],
            },
            fragment: Some(wgpu::FragmentState {
                module: &shield_shader,
                entry_point: Some("fs_shield"),
                compilation_options: Default::default(),
                targets: &[Some(wgpu::ColorTargetState {
                    format: surface_format,
                    blend: Some(ADDITIVE),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                cull_mode: Some(wgpu::Face::Back),
                ..Default::default()
            },
            depth_stencil: Some(wgpu::DepthStencilState {
                depth_write_enabled: false,
                ..opaque_depth.clone()
            }),
            multisample: Default::default(),
            multiview: None,
            cache: None,
        });

        // Star pipeline
        let star_shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("star_shader"),
            source: wgpu::ShaderSource::Wgsl(shaders::STAR_SHADER.into()),
        });
        let star_pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("star_pipeline"),
            layout: Some(&camera_only),
            vertex: wgpu::VertexState {
                module: &star_shader,
                entry_point: Some("vs_star"),
                compilation_options: Default::default(),
                buffers: &[wgpu::VertexBufferLayout {
                    array_stride: std::mem::size_of::<StarVertex>() as u64,
                    step_mode: wgpu::VertexStepMode::Vertex,
                    attributes: &wgpu::vertex_attr_array![
                        0 => Float32x3,
                        1 => Float32x4,
                    ],
                }],
            },
            fragment: Some(wgpu::FragmentState {
                module: &star_shader,
                entry_point: Some("fs_star"),
                compilation_options: Default::default(),
                targets: &[Some(wgpu::ColorTargetState {
                    format: surface_format,
                    blend: Some(wgpu::BlendState::REPLACE),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::PointList,
                ..Default::default()
            },
            depth_stencil: Some(opaque_depth),
            multisample: Default::default(),
            multiview: None,
            cache: None,
        });

        // Box mesh shared by cube and shield
        let (box_verts, box_indices) = unit_box_mesh();
        let box_vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("box_vertex_buffer"),
            contents: bytemuck::cast_slice(&box_verts),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let box_index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("box_index_buffer"),
            contents: bytemuck::cast_slice(&box_indices),
            usage: wgpu::BufferUsages::INDEX,
        });
        let box_index_count = box_indices.len() as u32;

        let cube_instance_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("cube_instance_buffer"),
            size: std::mem::size_of::<InstanceData>() as u64,
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        // Starfield
        let stars: Vec<StarVertex> = starfield(&StarfieldConfig {
            count: star_count,
            ..StarfieldConfig::default()
        })
        .into_iter()
        .map(|s| StarVertex {
            position: s.position,
            color: [s.brightness, s.brightness, s.brightness, 1.0],
        })
        .collect();
        let star_vertex_count = stars.len() as u32;
        let star_vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("star_vertex_buffer"),
            contents: bytemuck::cast_slice(&stars),
            usage: wgpu::BufferUsages::VERTEX,
        });

        let depth_texture = Self::create_depth_texture(device, width, height);

        tracing::debug!(star_vertex_count, "renderer created");

        Self {
            star_pipeline,
            cube_pipeline,
            shield_pipeline,
            camera_buffer,
            camera_bind_group,
            shield_buffer,
            shield_bind_group,
            box_vertex_buffer,
            box_index_buffer,
            box_index_count,
            cube_instance_buffer,
            star_vertex_buffer,
            star_vertex_count,
            depth_texture,
            surface_format,
        }
    }

    pub fn resize(&mut self, device: &wgpu::Device, width: u32, height: u32) {
        self.depth_texture = Self::create_depth_texture(device, width, height);
    }

    /// Render one frame: stars, then the cube, then the shield over both.
    pub fn render(
        &self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        view: &wgpu::TextureView,
        camera: &OrbitCamera,
        scene: &ShieldScene,
        params: &ShieldParameters,
    ) {
        let config = scene.config();
        queue.write_buffer(
            &self.camera_buffer,
            0,
            bytemuck::bytes_of(&CameraUniforms {
                view_proj: camera.view_projection().to_cols_array_2d(),
                position: camera.position().extend(1.0).to_array(),
            }),
        );

        let cols = model_matrix(config.cube_edge, &scene.cube_transform()).to_cols_array_2d();
        queue.write_buffer(
            &self.cube_instance_buffer,
            0,
            bytemuck::bytes_of(&InstanceData {
                model_0: cols[0],
                model_1: cols[1],
                model_2: cols[2],
                model_3: cols[3],
                color: CUBE_COLOR,
            }),
        );

        let shield_model = model_matrix(config.shield_edge, &scene.shield_transform());
        queue.write_buffer(
            &self.shield_buffer,
            0,
            bytemuck::bytes_of(&ShieldUniforms::new(
                shield_model,
                params,
                self.surface_format.is_srgb(),
            )),
        );

        let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("render_encoder"),
        });

        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("main_pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(CLEAR_COLOR),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.depth_texture,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                ..Default::default()
            });

            pass.set_bind_group(0, &self.camera_bind_group, &[]);

            // Stars
            pass.set_pipeline(&self.star_pipeline);
            pass.set_vertex_buffer(0, self.star_vertex_buffer.slice(..));
            pass.draw(0..self.star_vertex_count, 0..1);

            // Opaque cube
            pass.set_pipeline(&self.cube_pipeline);
            pass.set_vertex_buffer(0, self.box_vertex_buffer.slice(..));
            pass.set_vertex_buffer(1, self.cube_instance_buffer.slice(..));
            pass.set_index_buffer(self.box_index_buffer.slice(..), wgpu::IndexFormat::Uint16);
            pass.draw_indexed(0..self.box_index_count, 0, 0..1);

            // Shield, last so it layers over everything opaque
            pass.set_pipeline(&self.shield_pipeline);
            pass.set_bind_group(1, &self.shield_bind_group, &[]);
            pass.set_vertex_buffer(0, self.box_vertex_buffer.slice(..));
            pass.draw_indexed(0..self.box_index_count, 0, 0..1);
        }

        queue.submit(std::iter::once(encoder.finish()));
    }

    fn create_depth_texture(
        device: &wgpu::Device,
        width: u32,
        height: u32,
    ) -> wgpu::TextureView {
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("depth_texture"),
            size: wgpu::Extent3d {
                width: width.max(1),
                height: height.max(1),
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Depth32Float,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        });
        texture.create_view(&Default::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use borgshield_kernel::ImpactBuffer;

    #[test]
    fn shield_uniform_layout_matches_wgsl() {
        // mat4 + 3 vec4 + array<vec4, 5>
        assert_eq!(std::mem::size_of::<ShieldUniforms>(), 64 + 3 * 16 + 5 * 16);
        assert_eq!(std::mem::size_of::<CameraUniforms>(), 80);
    }

    #[test]
    fn shield_uniforms_pack_hits_as_xyz_time() {
        let mut buf = ImpactBuffer::new();
        buf.record(Vec3::new(1.0, 2.0, 3.0), 4.5);
        let params = ShieldParameters {
            time: 5.0,
            base_color: Vec3::new(0.0, 1.0, 0.0),
            rim_color: Vec3::ONE,
            impacts: buf.snapshot(),
        };
        let u = ShieldUniforms::new(Mat4::IDENTITY, &params, false);
        assert_eq!(u.hits[4], [1.0, 2.0, 3.0, 4.5]);
        assert_eq!(u.hits[0][3], -100.0);
        assert_eq!(u.params[0], 5.0);
        assert_eq!(u.base_color, [0.0, 1.0, 0.0, 1.0]);
    }

    #[test]
    fn srgb_target_linearizes_colours() {
        let params = ShieldParameters::idle(0.0, Vec3::splat(0.5), Vec3::ONE);
        let u = ShieldUniforms::new(Mat4::IDENTITY, &params, true);
        assert!(u.base_color[0] < 0.5);
        assert!((u.rim_color[0] - 1.0).abs() < 1e-6);
    }

    #[test]
    fn model_matrix_scales_edge() {
        let m = model_matrix(3.2, &Transform::default());
        let corner = m.transform_point3(Vec3::splat(0.5));
        assert!((corner - Vec3::splat(1.6)).length() < 1e-6);
    }
}
