use std::sync::Arc;

use crate::assets::TextureData;
use crate::render::plan::EffectFrame;

use super::resources::{
    fullscreen_pipeline, sampler_layout_entry, texture_layout_entry, uniform_layout_entry,
    upload_texture, CachedTexture, HDR_FORMAT,
};

/// Pipeline and uniform storage of one effect stage.
pub(crate) struct EffectPass {
    pipeline: wgpu::RenderPipeline,
    bgl: wgpu::BindGroupLayout,
    uniforms: wgpu::Buffer,
    uniform_size: u64,
    aux: Option<CachedTexture>,
}

impl EffectPass {
    pub fn new(device: &wgpu::Device, frame: &EffectFrame) -> Self {
        let uniform_size = (frame.uniforms.len() as u64).max(16);
        let bgl = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some(frame.label),
            entries: &[
                texture_layout_entry(0, wgpu::ShaderStages::FRAGMENT, true),
                sampler_layout_entry(1),
                uniform_layout_entry(2, wgpu::ShaderStages::FRAGMENT, false, uniform_size),
                texture_layout_entry(3, wgpu::ShaderStages::FRAGMENT, true),
                sampler_layout_entry(4),
            ],
        });
        let pipeline = fullscreen_pipeline(device, frame.label, frame.shader, &bgl, HDR_FORMAT);
        let uniforms = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some(frame.label),
            size: uniform_size,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        log::debug!("effect pipeline `{}` created", frame.label);

        Self {
            pipeline,
            bgl,
            uniforms,
            uniform_size,
            aux: None,
        }
    }

    /// `false` when the uniform block no longer fits the layout built for it.
    pub fn fits(&self, frame: &EffectFrame) -> bool {
        frame.uniforms.len() as u64 <= self.uniform_size
    }

    /// Re-uploads the auxiliary texture when the effect hands out a new one.
    fn refresh_aux(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        texture: Option<&Arc<TextureData>>,
        label: &str,
    ) {
        let Some(texture) = texture else {
            self.aux = None;
            return;
        };
        let stale = self
            .aux
            .as_ref()
            .is_none_or(|c| !Arc::ptr_eq(&c.source, texture));
        if stale {
            self.aux = Some(CachedTexture {
                source: Arc::clone(texture),
                view: upload_texture(device, queue, texture, label),
            });
        }
    }

    #[allow(clippy::too_many_arguments)]
    pub fn render(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        encoder: &mut wgpu::CommandEncoder,
        frame: &EffectFrame,
        src: &wgpu::TextureView,
        dst: &wgpu::TextureView,
        sampler: &wgpu::Sampler,
        white: &wgpu::TextureView,
    ) {
        if !frame.uniforms.is_empty() {
            queue.write_buffer(&self.uniforms, 0, &frame.uniforms);
        }

        self.refresh_aux(device, queue, frame.texture.as_ref(), frame.label);
        let aux = self.aux.as_ref().map_or(white, |c| &c.view);

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some(frame.label),
            layout: &self.bgl,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(src),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(sampler),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: self.uniforms.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 3,
                    resource: wgpu::BindingResource::TextureView(aux),
                },
                wgpu::BindGroupEntry {
                    binding: 4,
                    resource: wgpu::BindingResource::Sampler(sampler),
                },
            ],
        });

        let mut rpass = fullscreen_pass(encoder, frame.label, dst);
        rpass.set_pipeline(&self.pipeline);
        rpass.set_bind_group(0, &bind_group, &[]);
        rpass.draw(0..3, 0..1);
    }
}

/// Tone-maps the last intermediate target onto the surface.
pub(crate) struct OutputPass {
    pipeline: wgpu::RenderPipeline,
    bgl: wgpu::BindGroupLayout,
    format: wgpu::TextureFormat,
}

impl OutputPass {
    pub fn new(device: &wgpu::Device, format: wgpu::TextureFormat) -> Self {
        let bgl = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("vitrine output bgl"),
            entries: &[
                texture_layout_entry(0, wgpu::ShaderStages::FRAGMENT, true),
                sampler_layout_entry(1),
            ],
        });
        let pipeline = fullscreen_pipeline(
            device,
            "vitrine output pipeline",
            include_str!("../shaders/output.wgsl"),
            &bgl,
            format,
        );
        Self {
            pipeline,
            bgl,
            format,
        }
    }

    pub fn format(&self) -> wgpu::TextureFormat {
        self.format
    }

    pub fn render(
        &self,
        device: &wgpu::Device,
        encoder: &mut wgpu::CommandEncoder,
        src: &wgpu::TextureView,
        dst: &wgpu::TextureView,
        sampler: &wgpu::Sampler,
    ) {
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("vitrine output bg"),
            layout: &self.bgl,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(src),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(sampler),
                },
            ],
        });

        let mut rpass = fullscreen_pass(encoder, "vitrine output pass", dst);
        rpass.set_pipeline(&self.pipeline);
        rpass.set_bind_group(0, &bind_group, &[]);
        rpass.draw(0..3, 0..1);
    }
}

fn fullscreen_pass<'e>(
    encoder: &'e mut wgpu::CommandEncoder,
    label: &str,
    dst: &wgpu::TextureView,
) -> wgpu::RenderPass<'e> {
    encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
        label: Some(label),
        color_attachments: &[Some(wgpu::RenderPassColorAttachment {
            view: dst,
            resolve_target: None,
            ops: wgpu::Operations {
                // Every pixel is overwritten.
                load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                store: wgpu::StoreOp::Store,
            },
            depth_slice: None,
        })],
        depth_stencil_attachment: None,
        timestamp_writes: None,
        occlusion_query_set: None,
        multiview_mask: None,
    })
}
