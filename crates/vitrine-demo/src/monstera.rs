use std::sync::Arc;

use anyhow::Context;
use glam::Vec3;

use vitrine_engine::assets::ModelData;
use vitrine_engine::scene::{NodeCtx, NodeId, Renderable, ResizeEvent, Transform, Updatable};

/// Node names inside `monstera.glb`.
pub const PLANT_NODE: &str = "SM_MZRa_Monstera_B02";
pub const GROUND_NODE: &str = "Cube";

/// Radians per second.
const SPIN_SPEED: f32 = 0.75;
const MODEL_SCALE: f32 = 0.75;
const GROUND_WIDTH_RATIO: f32 = 0.6;
const GROUP_Y: f32 = -0.6;

/// Spins the plant and keeps the ground plate proportional to the view.
#[derive(Debug, Default)]
pub struct Monstera {
    plant: Option<NodeId>,
    ground: Option<NodeId>,
}

impl Monstera {
    /// Builds the showcase subtree: an ambient light and the model, lifted
    /// below the centre of the view.
    pub fn renderable(model: &Arc<ModelData>) -> Renderable {
        Renderable::new("monstera")
            .with_transform(Transform::from_translation(Vec3::new(0.0, GROUP_Y, 0.0)))
            .with_behavior(Self::default())
            .with_child(Renderable::ambient_light("ambient", [1.0, 1.0, 1.0], 1.0))
            .with_child(
                Renderable::from_model("monstera.glb", model)
                    .with_transform(Transform::from_scale(MODEL_SCALE)),
            )
    }

    fn fit_ground(&self, ctx: &mut NodeCtx<'_>, camera_width: f32) -> anyhow::Result<()> {
        let ground = self.ground.context("ground node not attached")?;
        let t = ctx
            .transform_mut(ground)
            .context("ground node no longer in the scene")?;
        t.scale.x = camera_width * GROUND_WIDTH_RATIO;
        Ok(())
    }
}

impl Updatable for Monstera {
    fn attach(&mut self, ctx: &mut NodeCtx<'_>) -> anyhow::Result<()> {
        let plant = ctx
            .find(PLANT_NODE)
            .with_context(|| format!("model has no `{PLANT_NODE}` node"))?;
        let ground = ctx
            .find(GROUND_NODE)
            .with_context(|| format!("model has no `{GROUND_NODE}` node"))?;
        self.plant = Some(plant);
        self.ground = Some(ground);

        let width = ctx.camera().bounds().width();
        self.fit_ground(ctx, width)
    }

    fn update(&mut self, dt: f32, ctx: &mut NodeCtx<'_>) -> anyhow::Result<()> {
        let plant = self.plant.context("plant node not attached")?;
        let t = ctx
            .transform_mut(plant)
            .context("plant node no longer in the scene")?;
        t.rotate_y(dt * SPIN_SPEED);
        Ok(())
    }

    fn resize(&mut self, event: &ResizeEvent, ctx: &mut NodeCtx<'_>) -> anyhow::Result<()> {
        self.fit_ground(ctx, event.camera.width())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vitrine_engine::assets::{CpuMesh, ModelNode, Vertex};
    use vitrine_engine::coords::Viewport;
    use vitrine_engine::render::{Renderer, RendererConfig};

    fn node(name: &str, mesh: Option<usize>) -> ModelNode {
        ModelNode {
            name: name.to_string(),
            transform: Transform::default(),
            mesh,
            children: Vec::new(),
        }
    }

    fn model() -> Arc<ModelData> {
        let tri = CpuMesh {
            name: Some("tri".to_string()),
            vertices: vec![
                Vertex { pos: [0.0, 0.0, 0.0], nrm: [0.0, 0.0, 1.0] },
                Vertex { pos: [1.0, 0.0, 0.0], nrm: [0.0, 0.0, 1.0] },
                Vertex { pos: [0.0, 1.0, 0.0], nrm: [0.0, 0.0, 1.0] },
            ],
            indices: vec![0, 1, 2],
            base_color: [1.0; 4],
        };
        let nodes = vec![node(PLANT_NODE, Some(0)), node(GROUND_NODE, Some(0))];
        Arc::new(ModelData::new(vec![tri], nodes, vec![0, 1]))
    }

    fn scale_x(renderer: &Renderer, name: &str) -> f32 {
        let graph = renderer.graph();
        let id = graph.find(graph.root(), name).expect("node exists");
        graph.get(id).expect("live node").transform.scale.x
    }

    #[test]
    fn ground_tracks_camera_width() {
        // 1600x800: aspect 2, camera spans [-2, 2].
        let mut renderer =
            Renderer::new(Viewport::new(1600.0, 800.0), 1.0, RendererConfig::default());
        renderer.add(Monstera::renderable(&model())).expect("add");
        assert!((scale_x(&renderer, GROUND_NODE) - 4.0 * 0.6).abs() < 1e-5);

        renderer.resize(Viewport::new(800.0, 800.0), 1.0);
        assert!((scale_x(&renderer, GROUND_NODE) - 2.0 * 0.6).abs() < 1e-5);
    }

    #[test]
    fn plant_spins_at_constant_rate() {
        let mut renderer =
            Renderer::new(Viewport::new(800.0, 600.0), 1.0, RendererConfig::default());
        renderer.add(Monstera::renderable(&model())).expect("add");

        for _ in 0..4 {
            renderer.frame(0.5);
        }

        let graph = renderer.graph();
        let plant = graph.find(graph.root(), PLANT_NODE).expect("plant");
        let (axis, angle) = graph.get(plant).expect("live").transform.rotation.to_axis_angle();
        assert!((angle - 1.5).abs() < 1e-4, "angle {angle}");
        assert!((axis.y.abs() - 1.0).abs() < 1e-4);
    }

    #[test]
    fn group_sits_below_centre() {
        let mut renderer =
            Renderer::new(Viewport::new(800.0, 600.0), 1.0, RendererConfig::default());
        let id = renderer.add(Monstera::renderable(&model())).expect("add");
        let world = renderer.graph().world_matrix(id).expect("world");
        assert!((world.w_axis.y - GROUP_Y).abs() < 1e-6);
        assert!(renderer.is_registered(id));
    }
}
