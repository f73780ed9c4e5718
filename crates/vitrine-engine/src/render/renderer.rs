use std::collections::HashSet;

use crate::assets::{AssetId, AssetPipeline};
use crate::coords::{ColorRgba, Viewport};
use crate::effect::Effect;
use crate::error::{EngineError, Result};
use crate::input::InputEvent;
use crate::scene::{Node, NodeCtx, NodeId, Renderable, ResizeEvent, SceneGraph, Updatable};
use crate::time::{Ticker, TickerId};

use super::camera::OrthoCamera;
use super::composer::{Composer, PassId};
use super::plan::FramePlan;

/// Renderer construction parameters.
#[derive(Debug, Clone)]
pub struct RendererConfig {
    pub clear_color: ColorRgba,
    /// Camera position on +Z.
    pub camera_distance: f32,
    pub near: f32,
    pub far: f32,
}

impl Default for RendererConfig {
    fn default() -> Self {
        Self {
            clear_color: ColorRgba::transparent(),
            camera_distance: 5.0,
            near: 0.1,
            far: 2000.0,
        }
    }
}

/// Pass plus the ticker callback that drives it.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct EffectHandle {
    pub pass: PassId,
    pub ticker: TickerId,
}

/// Render orchestrator.
///
/// Owns the scene graph, the camera and the composer, and keeps a registry of
/// the nodes that carry [`Updatable`] hooks. The registry always equals the
/// set of updatable nodes reachable from the root: `add` registers a whole
/// subtree, `remove` deregisters it before the graph frees it.
///
/// Each frame is composed before the registered nodes are updated, so the
/// recorded plan lags the latest update by one frame.
pub struct Renderer {
    config: RendererConfig,
    graph: SceneGraph,
    camera: OrthoCamera,
    composer: Composer,
    updatables: HashSet<NodeId>,
    viewport: Viewport,
    scale_factor: f32,
    pending: Option<FramePlan>,
}

impl Renderer {
    pub fn new(viewport: Viewport, scale_factor: f32, config: RendererConfig) -> Self {
        let camera = OrthoCamera::new(
            viewport.aspect(),
            config.camera_distance,
            config.near,
            config.far,
        );
        let composer = Composer::new(viewport.physical_size(scale_factor), config.clear_color);

        Self {
            config,
            graph: SceneGraph::new(),
            camera,
            composer,
            updatables: HashSet::new(),
            viewport,
            scale_factor,
            pending: None,
        }
    }

    /// Creates the renderer and registers its per-frame callback on `ticker`.
    ///
    /// `C` is the context the ticker drives; it must expose the renderer.
    pub fn init<C>(
        viewport: Viewport,
        scale_factor: f32,
        config: RendererConfig,
        ticker: &mut Ticker<C>,
    ) -> Self
    where
        C: AsMut<Renderer> + 'static,
    {
        let renderer = Self::new(viewport, scale_factor, config);
        ticker.add(|ctx: &mut C, dt| {
            ctx.as_mut().frame(dt);
            Ok(())
        });
        log::info!(
            "renderer initialized at {}x{} (scale {scale_factor})",
            viewport.width,
            viewport.height
        );
        renderer
    }

    pub fn config(&self) -> &RendererConfig {
        &self.config
    }

    pub fn graph(&self) -> &SceneGraph {
        &self.graph
    }

    pub fn camera(&self) -> &OrthoCamera {
        &self.camera
    }

    pub fn composer(&self) -> &Composer {
        &self.composer
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn scale_factor(&self) -> f32 {
        self.scale_factor
    }

    pub fn is_registered(&self, id: NodeId) -> bool {
        self.updatables.contains(&id)
    }

    pub fn updatable_count(&self) -> usize {
        self.updatables.len()
    }

    /// Registered nodes, in unspecified order.
    pub fn registered(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.updatables.iter().copied()
    }

    // ── scene ─────────────────────────────────────────────────────────────

    /// Adds `renderable` under the scene root.
    pub fn add(&mut self, renderable: Renderable) -> Result<NodeId> {
        self.add_under(self.graph.root(), renderable)
    }

    /// Adds `renderable` under `parent` and registers every updatable node of
    /// the new subtree. Each registered node gets its `attach` hook once.
    pub fn add_under(&mut self, parent: NodeId, renderable: Renderable) -> Result<NodeId> {
        if !self.graph.is_reachable(parent) {
            return Err(EngineError::UnknownNode(parent));
        }
        let id = self.graph.insert(parent, renderable)?;

        let fresh: Vec<NodeId> = self
            .graph
            .descendants(id)
            .into_iter()
            .filter(|n| self.graph.get(*n).is_some_and(Node::is_updatable))
            .collect();

        for node in &fresh {
            self.updatables.insert(*node);
        }
        for node in fresh {
            self.run_hook(node, "attach", |b, ctx| b.attach(ctx));
        }

        log::debug!(
            "added {id:?}; {} updatable node(s) registered",
            self.updatables.len()
        );
        Ok(id)
    }

    /// Deregisters and frees the subtree rooted at `id`.
    pub fn remove(&mut self, id: NodeId) -> Result<()> {
        if id == self.graph.root() {
            return Err(EngineError::RootRemoval);
        }
        if !self.graph.contains(id) {
            return Err(EngineError::UnknownNode(id));
        }

        for node in self.graph.descendants(id) {
            self.updatables.remove(&node);
        }
        let freed = self.graph.remove(id)?;
        log::debug!("removed {id:?} ({freed} node(s))");
        Ok(())
    }

    /// Uses a resolved environment map for ambient lighting and reflections.
    pub fn set_environment(&mut self, assets: &AssetPipeline, id: &AssetId) -> Result<()> {
        let env = assets.environment_map(id)?;
        log::debug!("environment set to `{id}` ({}x{})", env.width, env.height);
        self.graph.set_environment(env);
        Ok(())
    }

    // ── passes ────────────────────────────────────────────────────────────

    /// Appends an effect stage after every existing pass.
    ///
    /// The effect's own `update` is not scheduled; see
    /// [`attach_effect`](Self::attach_effect).
    pub fn add_effect_pass(&mut self, effect: impl Effect) -> PassId {
        let pass = self.composer.add_effect(Box::new(effect));
        let viewport = self.viewport;
        if let Some(fx) = self.composer.effect_mut(pass) {
            fx.resize(viewport);
        }
        pass
    }

    /// Appends an effect stage and schedules its `update` on `ticker`.
    pub fn attach_effect<C>(&mut self, effect: impl Effect, ticker: &mut Ticker<C>) -> EffectHandle
    where
        C: AsMut<Renderer> + 'static,
    {
        let pass = self.add_effect_pass(effect);
        let ticker_id = ticker.add(move |ctx: &mut C, dt| ctx.as_mut().update_effect(pass, dt));
        EffectHandle {
            pass,
            ticker: ticker_id,
        }
    }

    /// Removes an attached effect and its ticker callback.
    pub fn detach_effect<C>(
        &mut self,
        handle: EffectHandle,
        ticker: &mut Ticker<C>,
    ) -> Result<Box<dyn Effect>> {
        ticker.remove(handle.ticker);
        self.composer.remove_effect(handle.pass)
    }

    pub fn update_effect(&mut self, pass: PassId, dt: f32) -> anyhow::Result<()> {
        let effect = self
            .composer
            .effect_mut(pass)
            .ok_or(EngineError::UnknownPass(pass))?;
        effect.update(dt)
    }

    // ── events ────────────────────────────────────────────────────────────

    /// Applies a viewport change: camera extent, output size, composer
    /// buffers, then every registered node.
    ///
    /// Returns the number of `resize` hooks invoked.
    pub fn resize(&mut self, viewport: Viewport, scale_factor: f32) -> usize {
        self.viewport = viewport;
        self.scale_factor = scale_factor;
        self.camera.set_aspect(viewport.aspect());

        let (w, h) = viewport.physical_size(scale_factor);
        if self.composer.resize(w, h) {
            log::debug!("composer buffers resized to {w}x{h}");
        }
        self.composer.resize_effects(viewport);

        let event = ResizeEvent {
            viewport,
            scale_factor,
            camera: self.camera.bounds(),
        };

        let ids: Vec<NodeId> = self.updatables.iter().copied().collect();
        for id in &ids {
            self.run_hook(*id, "resize", |b, ctx| b.resize(&event, ctx));
        }
        ids.len()
    }

    /// Forwards input to the effect stages.
    pub fn handle_input(&mut self, event: &InputEvent) -> bool {
        self.composer.handle_input(event, self.viewport)
    }

    /// Per-frame work: compose the frame, then update every registered node.
    pub fn frame(&mut self, dt: f32) {
        let plan = self
            .composer
            .compose(dt, self.viewport, &self.camera, &self.graph);
        self.pending = Some(plan);

        let ids: Vec<NodeId> = self.updatables.iter().copied().collect();
        for id in ids {
            self.run_hook(id, "update", |b, ctx| b.update(dt, ctx));
        }
    }

    /// Takes the most recently composed frame, if any.
    pub fn take_frame(&mut self) -> Option<FramePlan> {
        self.pending.take()
    }

    /// Runs one hook of `id` with failures logged and isolated.
    fn run_hook<F>(&mut self, id: NodeId, hook: &str, f: F) -> bool
    where
        F: FnOnce(&mut dyn Updatable, &mut NodeCtx<'_>) -> anyhow::Result<()>,
    {
        let Some(mut behavior) = self.graph.take_behavior(id) else {
            log::warn!("{hook}: node {id:?} has no hooks");
            return false;
        };

        let result = {
            let mut ctx = NodeCtx::new(id, &mut self.graph, &self.camera);
            f(behavior.as_mut(), &mut ctx)
        };
        self.graph.restore_behavior(id, behavior);

        match result {
            Ok(()) => true,
            Err(err) => {
                log::error!("{hook} hook of node {id:?} failed: {err:#}");
                false
            }
        }
    }
}

impl AsMut<Renderer> for Renderer {
    fn as_mut(&mut self) -> &mut Renderer {
        self
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::collections::HashSet;
    use std::rc::Rc;

    use super::*;
    use crate::assets::fixtures::{self, HDR_PATH, MODEL_PATH, TEXTURE_PATH};
    use crate::assets::AssetKind;
    use crate::scene::{Content, Transform};

    const VIEWPORT: Viewport = Viewport {
        width: 1600.0,
        height: 800.0,
    };

    type Journal = Rc<RefCell<Vec<String>>>;

    /// Records every hook call as `"<tag>:<hook>"`.
    struct Probe {
        tag: &'static str,
        journal: Journal,
        fail_update: bool,
    }

    impl Probe {
        fn new(tag: &'static str, journal: &Journal) -> Self {
            Self {
                tag,
                journal: Rc::clone(journal),
                fail_update: false,
            }
        }

        fn failing(mut self) -> Self {
            self.fail_update = true;
            self
        }

        fn note(&self, hook: &str) {
            self.journal.borrow_mut().push(format!("{}:{hook}", self.tag));
        }
    }

    impl Updatable for Probe {
        fn attach(&mut self, _: &mut NodeCtx<'_>) -> anyhow::Result<()> {
            self.note("attach");
            Ok(())
        }

        fn update(&mut self, _: f32, _: &mut NodeCtx<'_>) -> anyhow::Result<()> {
            self.note("update");
            if self.fail_update {
                anyhow::bail!("{} refuses to update", self.tag);
            }
            Ok(())
        }

        fn resize(&mut self, _: &ResizeEvent, _: &mut NodeCtx<'_>) -> anyhow::Result<()> {
            self.note("resize");
            Ok(())
        }
    }

    /// Moves its node by one unit on +X per update.
    struct Slide;

    impl Updatable for Slide {
        fn update(&mut self, _: f32, ctx: &mut NodeCtx<'_>) -> anyhow::Result<()> {
            let id = ctx.id();
            if let Some(t) = ctx.transform_mut(id) {
                t.translation.x += 1.0;
            }
            Ok(())
        }
    }

    struct CountingEffect {
        label: &'static str,
        updates: Rc<RefCell<u32>>,
    }

    impl Effect for CountingEffect {
        fn label(&self) -> &'static str {
            self.label
        }

        fn fragment_source(&self) -> &'static str {
            ""
        }

        fn uniforms(&self, _: Viewport) -> Vec<u8> {
            let n = *self.updates.borrow() as f32;
            bytemuck::bytes_of(&[n, 0.0, 0.0, 0.0]).to_vec()
        }

        fn update(&mut self, _: f32) -> anyhow::Result<()> {
            *self.updates.borrow_mut() += 1;
            Ok(())
        }
    }

    fn renderer() -> Renderer {
        Renderer::new(VIEWPORT, 1.0, RendererConfig::default())
    }

    fn loaded_model() -> std::sync::Arc<crate::assets::ModelData> {
        let mut assets = AssetPipeline::new(fixtures::memory_source());
        assets.add_model("glb", MODEL_PATH).expect("queue");
        assets.load().expect("load");
        assets.model(&AssetId::from_static("glb")).expect("model")
    }

    fn journal() -> Journal {
        Rc::new(RefCell::new(Vec::new()))
    }

    fn entries(j: &Journal, suffix: &str) -> usize {
        j.borrow().iter().filter(|e| e.ends_with(suffix)).count()
    }

    // ── registry ──────────────────────────────────────────────────────────

    #[test]
    fn add_registers_every_updatable_descendant() {
        let j = journal();
        let mut r = renderer();
        let tree = Renderable::new("outer")
            .with_behavior(Probe::new("outer", &j))
            .with_child(Renderable::new("plain"))
            .with_child(
                Renderable::new("middle")
                    .with_child(Renderable::new("inner").with_behavior(Probe::new("inner", &j))),
            );

        let id = r.add(tree).expect("add");
        assert_eq!(r.updatable_count(), 2);
        assert!(r.is_registered(id));
        assert_eq!(entries(&j, ":attach"), 2);

        let expected: HashSet<NodeId> = r.graph().updatable_nodes().into_iter().collect();
        assert_eq!(r.registered().collect::<HashSet<_>>(), expected);
    }

    #[test]
    fn add_then_remove_restores_empty_registry() {
        let j = journal();
        let mut r = renderer();
        let id = r
            .add(
                Renderable::new("a")
                    .with_behavior(Probe::new("a", &j))
                    .with_child(Renderable::new("b").with_behavior(Probe::new("b", &j))),
            )
            .expect("add");

        r.remove(id).expect("remove");
        assert_eq!(r.updatable_count(), 0);
        assert_eq!(r.graph().len(), 1);

        r.frame(0.016);
        assert_eq!(entries(&j, ":update"), 0);
    }

    #[test]
    fn registry_tracks_reachability_across_mixed_edits() {
        let j = journal();
        let mut r = renderer();
        let mut live: Vec<NodeId> = Vec::new();

        // Deterministic LCG so the sequence is reproducible.
        let mut seed: u32 = 0x2545_f491;
        let mut next = move || {
            seed = seed.wrapping_mul(1_664_525).wrapping_add(1_013_904_223);
            seed >> 8
        };

        for step in 0..200 {
            let roll = next();
            if roll % 3 == 0 && !live.is_empty() {
                let victim = live[(next() as usize) % live.len()];
                // Removing a parent may already have freed this node.
                if r.graph().contains(victim) {
                    r.remove(victim).expect("remove live node");
                }
                live.retain(|n| r.graph().contains(*n));
            } else {
                let parent = if live.is_empty() || roll % 2 == 0 {
                    r.graph().root()
                } else {
                    live[(next() as usize) % live.len()]
                };
                let mut node = Renderable::new(format!("n{step}"));
                if roll % 5 != 0 {
                    node = node.with_behavior(Probe::new("n", &j));
                }
                live.push(r.add_under(parent, node).expect("add"));
            }

            let expected: HashSet<NodeId> = r.graph().updatable_nodes().into_iter().collect();
            let actual: HashSet<NodeId> = r.registered().collect();
            assert_eq!(actual, expected, "step {step}");
        }
    }

    #[test]
    fn remove_rejects_root_and_stale_ids() {
        let mut r = renderer();
        assert!(matches!(r.remove(r.graph().root()), Err(EngineError::RootRemoval)));

        let id = r.add(Renderable::new("x")).expect("add");
        r.remove(id).expect("first remove");
        assert!(matches!(r.remove(id), Err(EngineError::UnknownNode(_))));
        assert!(matches!(
            r.add_under(id, Renderable::new("y")),
            Err(EngineError::UnknownNode(_))
        ));
    }

    // ── resize ────────────────────────────────────────────────────────────

    #[test]
    fn resize_recomputes_camera_and_notifies_each_node_once() {
        let j = journal();
        let mut r = renderer();
        r.add(Renderable::new("a").with_behavior(Probe::new("a", &j)))
            .expect("add a");
        r.add(Renderable::new("b").with_behavior(Probe::new("b", &j)))
            .expect("add b");
        r.add(Renderable::new("static")).expect("add static");

        let calls = r.resize(Viewport::new(900.0, 600.0), 2.0);
        assert_eq!(calls, 2);
        assert_eq!(entries(&j, "a:resize"), 1);
        assert_eq!(entries(&j, "b:resize"), 1);

        let b = r.camera().bounds();
        assert!((b.right - 1.5).abs() < 1e-6);
        assert!((b.left + 1.5).abs() < 1e-6);
        assert_eq!((b.top, b.bottom), (1.0, -1.0));
        assert_eq!(r.composer().size(), (1800, 1200));
        assert_eq!(r.composer().generation(), 1);
    }

    // ── frame ─────────────────────────────────────────────────────────────

    #[test]
    fn frame_composes_before_updating() {
        let model = loaded_model();
        let mut r = renderer();
        r.add(Renderable::from_model("slider", &model).with_behavior(Slide))
            .expect("add");

        r.frame(0.016);
        let first = r.take_frame().expect("first plan");
        r.frame(0.016);
        let second = r.take_frame().expect("second plan");
        assert!(r.take_frame().is_none());

        // Each plan predates the update of its own frame.
        let x = |p: &FramePlan| p.draws[0].world.w_axis.x;
        assert_eq!(x(&first), 0.0);
        assert_eq!(x(&second), 1.0);
    }

    #[test]
    fn failing_update_is_isolated() {
        let j = journal();
        let mut r = renderer();
        r.add(Renderable::new("bad").with_behavior(Probe::new("bad", &j).failing()))
            .expect("add bad");
        r.add(Renderable::new("good").with_behavior(Probe::new("good", &j)))
            .expect("add good");

        r.frame(0.016);
        r.frame(0.016);
        assert_eq!(entries(&j, "good:update"), 2);
        assert_eq!(entries(&j, "bad:update"), 2);
    }

    #[test]
    fn plan_collects_meshes_lights_and_world_transforms() {
        let model = loaded_model();
        let mut r = renderer();
        r.add(
            Renderable::new("group")
                .with_transform(Transform::from_translation(glam::Vec3::new(0.0, -0.6, 0.0)))
                .with_child(Renderable::from_model("monstera", &model))
                .with_child(Renderable::ambient_light("ambient", [1.0, 1.0, 1.0], 0.5)),
        )
        .expect("add");

        r.frame(0.0);
        let plan = r.take_frame().expect("plan");
        assert_eq!(plan.draws.len(), 2);
        assert_eq!(plan.ambient, [0.5, 0.5, 0.5]);

        let ground = plan
            .draws
            .iter()
            .find(|d| {
                r.graph()
                    .get(d.node)
                    .is_some_and(|n| n.name == fixtures::GROUND_NODE)
            })
            .expect("ground draw");
        let origin = ground.world.transform_point3(glam::Vec3::ZERO);
        assert!((origin.y - -1.6).abs() < 1e-5);
        assert!(matches!(
            r.graph().get(ground.node).map(|n| &n.content),
            Some(Content::Mesh(_))
        ));
    }

    // ── effects ───────────────────────────────────────────────────────────

    #[test]
    fn effect_passes_run_in_insertion_order() {
        let mut r = renderer();
        let counter = Rc::new(RefCell::new(0));
        let a = r.add_effect_pass(CountingEffect {
            label: "a",
            updates: Rc::clone(&counter),
        });
        let b = r.add_effect_pass(CountingEffect {
            label: "b",
            updates: Rc::clone(&counter),
        });

        assert_eq!(r.composer().passes(), [Composer::SCENE_PASS, a, b]);

        r.frame(0.016);
        let labels: Vec<&str> = r
            .take_frame()
            .expect("plan")
            .effects
            .iter()
            .map(|e| e.label)
            .collect();
        assert_eq!(labels, ["a", "b"]);
    }

    #[test]
    fn attached_effect_updates_after_composite() {
        let mut ticker: Ticker<Renderer> = Ticker::new();
        let mut r = Renderer::init(VIEWPORT, 1.0, RendererConfig::default(), &mut ticker);
        let updates = Rc::new(RefCell::new(0u32));
        let handle = r.attach_effect(
            CountingEffect {
                label: "count",
                updates: Rc::clone(&updates),
            },
            &mut ticker,
        );
        assert_eq!(ticker.len(), 2);

        assert_eq!(ticker.advance(&mut r, 0.016), 0);
        assert_eq!(*updates.borrow(), 1);

        // The uniform snapshot predates this tick's effect update.
        let plan = r.take_frame().expect("plan");
        let recorded: [f32; 4] = bytemuck::pod_read_unaligned(&plan.effects[0].uniforms);
        assert_eq!(recorded[0], 0.0);

        r.detach_effect(handle, &mut ticker).expect("detach");
        assert_eq!(ticker.len(), 1);
        assert_eq!(r.composer().passes(), [Composer::SCENE_PASS]);
    }

    #[test]
    fn update_of_removed_pass_is_reported() {
        let mut r = renderer();
        let pass = r.add_effect_pass(CountingEffect {
            label: "gone",
            updates: Rc::new(RefCell::new(0)),
        });
        r.composer.remove_effect(pass).expect("remove");
        let err = r.update_effect(pass, 0.016).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<EngineError>(),
            Some(EngineError::UnknownPass(_))
        ));
    }

    // ── environment ───────────────────────────────────────────────────────

    #[test]
    fn end_to_end_load_then_set_environment() {
        let glass = AssetId::from_static("texture-glass");
        let monstera = AssetId::from_static("glb-monstera");
        let studio = AssetId::from_static("hdr-studio");

        let mut assets = AssetPipeline::new(fixtures::memory_source());
        assets.add_texture(glass.clone(), TEXTURE_PATH).expect("queue texture");
        assets.add_model(monstera.clone(), MODEL_PATH).expect("queue model");
        assets.add_environment_map(studio.clone(), HDR_PATH).expect("queue hdr");
        assets.load().expect("load");

        assert_eq!(assets.get_asset(&glass).expect("glass").kind(), AssetKind::Texture);
        assert_eq!(assets.get_asset(&monstera).expect("glb").kind(), AssetKind::Model);
        assert_eq!(
            assets.get_asset(&studio).expect("hdr").kind(),
            AssetKind::EnvironmentMap
        );

        let mut r = renderer();
        r.set_environment(&assets, &studio).expect("environment");
        assert!(r.graph().environment().is_some());

        let unqueued = AssetId::from_static("hdr-missing");
        assert!(matches!(
            r.set_environment(&assets, &unqueued),
            Err(EngineError::UnknownAsset(_))
        ));
        assert!(matches!(
            r.set_environment(&assets, &glass),
            Err(EngineError::AssetKindMismatch { .. })
        ));
    }
}
