use std::collections::HashMap;

use bytemuck::{Pod, Zeroable};
use wgpu::util::DeviceExt;

use crate::assets::Vertex;
use crate::render::plan::FramePlan;

use super::resources::{
    texture_layout_entry, uniform_layout_entry, Targets, DEPTH_FORMAT, HDR_FORMAT,
};

/// Stride between per-draw uniforms; matches the default
/// `min_uniform_buffer_offset_alignment`.
const DRAW_STRIDE: u64 = 256;

#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable)]
struct GlobalsUniform {
    view_proj: [[f32; 4]; 4],
    ambient: [f32; 4],
    env: [f32; 4],
}

#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable)]
struct DrawUniform {
    model: [[f32; 4]; 4],
    base_color: [f32; 4],
}

struct GpuMesh {
    vertices: wgpu::Buffer,
    indices: wgpu::Buffer,
    index_count: u32,
}

/// Scene pass: draws every mesh of the plan into the first colour target,
/// lit by the summed ambient lights and the environment map.
pub(crate) struct MeshPass {
    pipeline: wgpu::RenderPipeline,
    globals_bgl: wgpu::BindGroupLayout,
    draw_bgl: wgpu::BindGroupLayout,
    globals: wgpu::Buffer,
    draws: Option<(wgpu::Buffer, u64, wgpu::BindGroup)>,
    meshes: HashMap<(u64, usize), GpuMesh>,
}

impl MeshPass {
    pub fn new(device: &wgpu::Device) -> Self {
        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("vitrine mesh shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("../shaders/mesh.wgsl").into()),
        });

        let globals_size = std::mem::size_of::<GlobalsUniform>() as u64;
        let globals_bgl = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("vitrine mesh globals bgl"),
            entries: &[
                uniform_layout_entry(
                    0,
                    wgpu::ShaderStages::VERTEX_FRAGMENT,
                    false,
                    globals_size,
                ),
                texture_layout_entry(1, wgpu::ShaderStages::FRAGMENT, false),
            ],
        });
        let draw_bgl = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("vitrine mesh draw bgl"),
            entries: &[uniform_layout_entry(
                0,
                wgpu::ShaderStages::VERTEX_FRAGMENT,
                true,
                std::mem::size_of::<DrawUniform>() as u64,
            )],
        });

        let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("vitrine mesh pipeline layout"),
            bind_group_layouts: &[&globals_bgl, &draw_bgl],
            immediate_size: 0,
        });

        const ATTRS: [wgpu::VertexAttribute; 2] = wgpu::vertex_attr_array![
            0 => Float32x3, // pos
            1 => Float32x3  // nrm
        ];

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("vitrine mesh pipeline"),
            layout: Some(&layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                compilation_options: Default::default(),
                buffers: &[wgpu::VertexBufferLayout {
                    array_stride: std::mem::size_of::<Vertex>() as u64,
                    step_mode: wgpu::VertexStepMode::Vertex,
                    attributes: &ATTRS,
                }],
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                compilation_options: Default::default(),
                targets: &[Some(wgpu::ColorTargetState {
                    format: HDR_FORMAT,
                    blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                front_face: wgpu::FrontFace::Ccw,
                // Scaled glTF nodes may flip winding; draw both faces.
                cull_mode: None,
                ..Default::default()
            },
            depth_stencil: Some(wgpu::DepthStencilState {
                format: DEPTH_FORMAT,
                depth_write_enabled: true,
                depth_compare: wgpu::CompareFunction::Less,
                stencil: wgpu::StencilState::default(),
                bias: wgpu::DepthBiasState::default(),
            }),
            multisample: wgpu::MultisampleState::default(),
            multiview_mask: None,
            cache: None,
        });

        let globals = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("vitrine mesh globals"),
            size: globals_size,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        Self {
            pipeline,
            globals_bgl,
            draw_bgl,
            globals,
            draws: None,
            meshes: HashMap::new(),
        }
    }

    /// Uploads meshes first seen in `plan`.
    fn upload_meshes(&mut self, device: &wgpu::Device, plan: &FramePlan) {
        for d in &plan.draws {
            let key = (d.mesh.model.key(), d.mesh.mesh);
            if self.meshes.contains_key(&key) {
                continue;
            }
            let Some(cpu) = d.mesh.model.meshes.get(d.mesh.mesh) else {
                log::warn!("mesh index {} out of range for model {}", d.mesh.mesh, key.0);
                continue;
            };

            let label = cpu.name.as_deref().unwrap_or("vitrine mesh");
            let vertices = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some(label),
                contents: bytemuck::cast_slice(&cpu.vertices),
                usage: wgpu::BufferUsages::VERTEX,
            });
            let indices = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some(label),
                contents: bytemuck::cast_slice(&cpu.indices),
                usage: wgpu::BufferUsages::INDEX,
            });
            log::debug!(
                "uploaded mesh {:?} ({} vertices)",
                cpu.name,
                cpu.vertices.len()
            );
            self.meshes.insert(
                key,
                GpuMesh {
                    vertices,
                    indices,
                    index_count: cpu.indices.len() as u32,
                },
            );
        }
    }

    fn ensure_draw_capacity(&mut self, device: &wgpu::Device, count: usize) {
        let needed = (count.max(1) as u64) * DRAW_STRIDE;
        if self.draws.as_ref().is_some_and(|(_, cap, _)| *cap >= needed) {
            return;
        }

        let capacity = needed.next_power_of_two().max(16 * DRAW_STRIDE);
        let buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("vitrine mesh draws"),
            size: capacity,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("vitrine mesh draws bg"),
            layout: &self.draw_bgl,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: wgpu::BindingResource::Buffer(wgpu::BufferBinding {
                    buffer: &buffer,
                    offset: 0,
                    size: wgpu::BufferSize::new(std::mem::size_of::<DrawUniform>() as u64),
                }),
            }],
        });
        self.draws = Some((buffer, capacity, bind_group));
    }

    #[allow(clippy::too_many_arguments)]
    pub fn render(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        encoder: &mut wgpu::CommandEncoder,
        targets: &Targets,
        environment: Option<&wgpu::TextureView>,
        fallback_env: &wgpu::TextureView,
        plan: &FramePlan,
    ) {
        self.upload_meshes(device, plan);
        self.ensure_draw_capacity(device, plan.draws.len());

        let globals = GlobalsUniform {
            view_proj: plan.view_proj.to_cols_array_2d(),
            ambient: [plan.ambient[0], plan.ambient[1], plan.ambient[2], 0.0],
            env: [if environment.is_some() { 1.0 } else { 0.0 }, 0.0, 0.0, 0.0],
        };
        queue.write_buffer(&self.globals, 0, bytemuck::bytes_of(&globals));

        let globals_bg = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("vitrine mesh globals bg"),
            layout: &self.globals_bgl,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: self.globals.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::TextureView(
                        environment.unwrap_or(fallback_env),
                    ),
                },
            ],
        });

        let Some((draw_buf, _, draw_bg)) = self.draws.as_ref() else { return };

        let mut staging = vec![0u8; plan.draws.len() * DRAW_STRIDE as usize];
        for (i, d) in plan.draws.iter().enumerate() {
            let base_color = d
                .mesh
                .model
                .meshes
                .get(d.mesh.mesh)
                .map_or([1.0; 4], |m| m.base_color);
            let u = DrawUniform {
                model: d.world.to_cols_array_2d(),
                base_color,
            };
            let at = i * DRAW_STRIDE as usize;
            staging[at..at + std::mem::size_of::<DrawUniform>()]
                .copy_from_slice(bytemuck::bytes_of(&u));
        }
        if !staging.is_empty() {
            queue.write_buffer(draw_buf, 0, &staging);
        }

        let mut rpass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("vitrine scene pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: &targets.color[0],
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(plan.clear.to_wgpu()),
                    store: wgpu::StoreOp::Store,
                },
                depth_slice: None,
            })],
            depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                view: &targets.depth,
                depth_ops: Some(wgpu::Operations {
                    load: wgpu::LoadOp::Clear(1.0),
                    store: wgpu::StoreOp::Discard,
                }),
                stencil_ops: None,
            }),
            timestamp_writes: None,
            occlusion_query_set: None,
            multiview_mask: None,
        });

        rpass.set_pipeline(&self.pipeline);
        rpass.set_bind_group(0, &globals_bg, &[]);

        for (i, d) in plan.draws.iter().enumerate() {
            let Some(mesh) = self.meshes.get(&(d.mesh.model.key(), d.mesh.mesh)) else {
                continue;
            };
            let offset = (i as u64 * DRAW_STRIDE) as u32;
            rpass.set_bind_group(1, draw_bg, &[offset]);
            rpass.set_vertex_buffer(0, mesh.vertices.slice(..));
            rpass.set_index_buffer(mesh.indices.slice(..), wgpu::IndexFormat::Uint32);
            rpass.draw_indexed(0..mesh.index_count, 0, 0..1);
        }
    }
}
