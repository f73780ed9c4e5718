use std::collections::HashMap;
use std::sync::Arc;

use crate::render::composer::PassId;
use crate::render::ctx::{RenderCtx, RenderTarget};
use crate::render::plan::FramePlan;

use super::effect_pass::{EffectPass, OutputPass};
use super::mesh_pass::MeshPass;
use super::resources::{
    linear_sampler, solid_texture, upload_environment, CachedEnvironment, Targets,
};

/// Executes [`FramePlan`]s on the GPU.
///
/// The scene pass renders into an HDR target, each effect reads the previous
/// target and writes the other one, and a final pass tone-maps the result onto
/// the surface. GPU objects are created on first use and cached.
#[derive(Default)]
pub struct Compositor {
    sampler: Option<wgpu::Sampler>,
    white: Option<wgpu::TextureView>,
    black_env: Option<wgpu::TextureView>,
    targets: Option<Targets>,
    mesh: Option<MeshPass>,
    environment: Option<CachedEnvironment>,
    effects: HashMap<PassId, EffectPass>,
    output: Option<OutputPass>,
}

impl Compositor {
    pub fn new() -> Self {
        Self::default()
    }

    fn ensure_shared(&mut self, ctx: &RenderCtx<'_>) {
        if self.sampler.is_none() {
            self.sampler = Some(linear_sampler(ctx.device, "vitrine sampler"));
        }
        if self.white.is_none() {
            self.white = Some(solid_texture(
                ctx.device,
                ctx.queue,
                wgpu::TextureFormat::Rgba8Unorm,
                &[255; 4],
                "vitrine white",
            ));
        }
        if self.black_env.is_none() {
            self.black_env = Some(solid_texture(
                ctx.device,
                ctx.queue,
                wgpu::TextureFormat::Rgba32Float,
                bytemuck::cast_slice(&[0.0f32; 4]),
                "vitrine black environment",
            ));
        }
        if self.mesh.is_none() {
            self.mesh = Some(MeshPass::new(ctx.device));
        }
        if self.output.as_ref().map(OutputPass::format) != Some(ctx.surface_format) {
            self.output = Some(OutputPass::new(ctx.device, ctx.surface_format));
        }
    }

    fn ensure_targets(&mut self, device: &wgpu::Device, plan: &FramePlan) {
        let fresh = self
            .targets
            .as_ref()
            .is_some_and(|t| t.generation == plan.generation && t.size == plan.size);
        if !fresh {
            log::debug!(
                "compositor: targets {}x{} (generation {})",
                plan.size.0,
                plan.size.1,
                plan.generation
            );
            self.targets = Some(Targets::new(device, plan.size, plan.generation));
        }
    }

    fn ensure_environment(&mut self, ctx: &RenderCtx<'_>, plan: &FramePlan) {
        let Some(env) = plan.environment.as_ref() else {
            self.environment = None;
            return;
        };
        let stale = self
            .environment
            .as_ref()
            .is_none_or(|c| !Arc::ptr_eq(&c.source, env));
        if stale {
            self.environment = Some(CachedEnvironment {
                source: Arc::clone(env),
                view: upload_environment(ctx.device, ctx.queue, env),
            });
        }
    }

    fn ensure_effects(&mut self, device: &wgpu::Device, plan: &FramePlan) {
        self.effects
            .retain(|id, _| plan.effects.iter().any(|e| e.pass == *id));
        for frame in &plan.effects {
            let rebuild = self.effects.get(&frame.pass).is_none_or(|p| !p.fits(frame));
            if rebuild {
                self.effects.insert(frame.pass, EffectPass::new(device, frame));
            }
        }
    }

    /// Draws `plan` into `target.surface`.
    pub fn render(&mut self, ctx: &RenderCtx<'_>, target: &mut RenderTarget<'_>, plan: &FramePlan) {
        if !ctx.matches(plan) {
            log::trace!(
                "compositor: plan {:?} drawn onto surface {:?}",
                plan.size,
                ctx.surface_size
            );
        }
        self.ensure_shared(ctx);
        self.ensure_targets(ctx.device, plan);
        self.ensure_environment(ctx, plan);
        self.ensure_effects(ctx.device, plan);

        let (Some(sampler), Some(white), Some(black_env), Some(targets), Some(mesh), Some(output)) = (
            self.sampler.as_ref(),
            self.white.as_ref(),
            self.black_env.as_ref(),
            self.targets.as_ref(),
            self.mesh.as_mut(),
            self.output.as_ref(),
        ) else {
            return;
        };

        mesh.render(
            ctx.device,
            ctx.queue,
            target.encoder,
            targets,
            self.environment.as_ref().map(|c| &c.view),
            black_env,
            plan,
        );

        let mut src = 0;
        for frame in &plan.effects {
            let Some(pass) = self.effects.get_mut(&frame.pass) else { continue };
            let dst = 1 - src;
            pass.render(
                ctx.device,
                ctx.queue,
                target.encoder,
                frame,
                &targets.color[src],
                &targets.color[dst],
                sampler,
                white,
            );
            src = dst;
        }

        output.render(
            ctx.device,
            target.encoder,
            &targets.color[src],
            target.surface,
            sampler,
        );
    }
}
