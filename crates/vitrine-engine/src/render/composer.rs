use glam::Mat4;

use crate::coords::{ColorRgba, Viewport};
use crate::effect::Effect;
use crate::error::{EngineError, Result};
use crate::input::InputEvent;
use crate::scene::{Content, SceneGraph};

use super::camera::OrthoCamera;
use super::plan::{EffectFrame, FramePlan, MeshDraw};

/// Identifies a pass of the [`Composer`].
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct PassId(u32);

struct EffectPass {
    id: PassId,
    effect: Box<dyn Effect>,
}

/// Ordered pass pipeline: the scene pass, then every effect stage in the
/// order it was added.
pub struct Composer {
    size: (u32, u32),
    generation: u64,
    clear: ColorRgba,
    effects: Vec<EffectPass>,
    next_id: u32,
}

impl Composer {
    /// The base pass that renders the scene graph.
    pub const SCENE_PASS: PassId = PassId(0);

    pub fn new(size: (u32, u32), clear: ColorRgba) -> Self {
        Self {
            size: (size.0.max(1), size.1.max(1)),
            generation: 0,
            clear,
            effects: Vec::new(),
            next_id: 1,
        }
    }

    pub fn size(&self) -> (u32, u32) {
        self.size
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Resizes the internal buffers. Returns `false` if the size is unchanged.
    pub fn resize(&mut self, width: u32, height: u32) -> bool {
        let size = (width.max(1), height.max(1));
        if size == self.size {
            return false;
        }
        self.size = size;
        self.generation += 1;
        true
    }

    /// Appends an effect stage after every existing pass.
    pub fn add_effect(&mut self, effect: Box<dyn Effect>) -> PassId {
        let id = PassId(self.next_id);
        self.next_id += 1;
        log::debug!("composer: pass {id:?} `{}` added", effect.label());
        self.effects.push(EffectPass { id, effect });
        id
    }

    pub fn remove_effect(&mut self, id: PassId) -> Result<Box<dyn Effect>> {
        let pos = self
            .effects
            .iter()
            .position(|p| p.id == id)
            .ok_or(EngineError::UnknownPass(id))?;
        Ok(self.effects.remove(pos).effect)
    }

    pub fn effect_mut(&mut self, id: PassId) -> Option<&mut dyn Effect> {
        for pass in &mut self.effects {
            if pass.id == id {
                return Some(pass.effect.as_mut());
            }
        }
        None
    }

    /// Scene pass first, then effects in insertion order.
    pub fn passes(&self) -> Vec<PassId> {
        std::iter::once(Self::SCENE_PASS)
            .chain(self.effects.iter().map(|p| p.id))
            .collect()
    }

    /// Offers `event` to every effect; returns `true` if any of them used it.
    pub fn handle_input(&mut self, event: &InputEvent, viewport: Viewport) -> bool {
        let mut used = false;
        for pass in &mut self.effects {
            used |= pass.effect.handle_input(event, viewport);
        }
        used
    }

    pub fn resize_effects(&mut self, viewport: Viewport) {
        for pass in &mut self.effects {
            pass.effect.resize(viewport);
        }
    }

    /// Records the frame as it stands now.
    pub fn compose(
        &self,
        dt: f32,
        viewport: Viewport,
        camera: &OrthoCamera,
        graph: &SceneGraph,
    ) -> FramePlan {
        let mut draws = Vec::new();
        let mut ambient = [0.0f32; 3];

        let mut stack = vec![(graph.root(), Mat4::IDENTITY)];
        while let Some((id, parent_world)) = stack.pop() {
            let Some(node) = graph.get(id) else { continue };
            let world = parent_world * node.transform.matrix();

            match &node.content {
                Content::Group => {}
                Content::Mesh(mesh) => draws.push(MeshDraw {
                    node: id,
                    mesh: mesh.clone(),
                    world,
                }),
                Content::AmbientLight { color, intensity } => {
                    for (acc, c) in ambient.iter_mut().zip(color) {
                        *acc += c * intensity;
                    }
                }
            }

            stack.extend(node.children().iter().rev().map(|c| (*c, world)));
        }

        let effects = self
            .effects
            .iter()
            .map(|p| EffectFrame {
                pass: p.id,
                label: p.effect.label(),
                shader: p.effect.fragment_source(),
                uniforms: p.effect.uniforms(viewport),
                texture: p.effect.texture(),
            })
            .collect();

        FramePlan {
            dt,
            viewport,
            size: self.size,
            generation: self.generation,
            clear: self.clear,
            view_proj: camera.view_proj(),
            draws,
            ambient,
            environment: graph.environment().cloned(),
            effects,
        }
    }
}
