use std::path::PathBuf;
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::thread;

use anyhow::Context;

use vitrine_engine::assets::{AssetPipeline, DirSource};
use vitrine_engine::core::{App, AppControl, FrameCtx};
use vitrine_engine::coords::{ColorRgba, Viewport};
use vitrine_engine::effect::{PixelationConfig, PixelationEffect};
use vitrine_engine::input::{InputEvent, Key, KeyState};
use vitrine_engine::render::{Compositor, Renderer, RendererConfig};
use vitrine_engine::time::Ticker;

use crate::ids;
use crate::monstera::Monstera;

const LOADING_CLEAR: ColorRgba = ColorRgba::new(0.02, 0.02, 0.025, 1.0);

enum Stage {
    /// Waiting on the background load.
    Loading(Receiver<anyhow::Result<AssetPipeline>>),
    Ready,
    /// Load failed; the loading screen stays up.
    Failed,
}

/// The showcase: a spinning monstera seen through the pixelation effect.
pub struct Showcase {
    title: String,
    stage: Stage,
    renderer: Renderer,
    ticker: Ticker<Renderer>,
    compositor: Compositor,
    /// Kept alive for the lifetime of the scene.
    assets: Option<AssetPipeline>,
    title_dirty: bool,
}

impl Showcase {
    pub fn new(title: impl Into<String>, assets_root: PathBuf, viewport: Viewport) -> Self {
        let mut ticker = Ticker::new();
        let renderer = Renderer::init(viewport, 1.0, RendererConfig::default(), &mut ticker);
        ticker.start();

        Self {
            title: title.into(),
            stage: Stage::Loading(spawn_loader(assets_root)),
            renderer,
            ticker,
            compositor: Compositor::new(),
            assets: None,
            title_dirty: true,
        }
    }

    fn window_title(&self) -> String {
        match self.stage {
            Stage::Loading(_) => format!("{} (loading)", self.title),
            Stage::Ready => self.title.clone(),
            Stage::Failed => format!("{} (failed to load)", self.title),
        }
    }

    fn poll_loader(&mut self) {
        let Stage::Loading(rx) = &self.stage else { return };

        let next = match rx.try_recv() {
            Err(TryRecvError::Empty) => return,
            Ok(Ok(assets)) => match self.build_scene(&assets) {
                Ok(()) => {
                    self.assets = Some(assets);
                    Stage::Ready
                }
                Err(err) => {
                    log::error!("scene construction failed: {err:#}");
                    Stage::Failed
                }
            },
            Ok(Err(err)) => {
                log::error!("asset load failed: {err:#}");
                Stage::Failed
            }
            Err(TryRecvError::Disconnected) => {
                log::error!("asset loader exited without a result");
                Stage::Failed
            }
        };
        self.stage = next;
        self.title_dirty = true;
    }

    fn build_scene(&mut self, assets: &AssetPipeline) -> anyhow::Result<()> {
        self.renderer
            .set_environment(assets, &ids::HDR_STUDIO)
            .context("studio environment")?;

        let effect =
            PixelationEffect::from_assets(assets, &ids::TEXTURE_GLASS, PixelationConfig::default())
                .context("pixelation effect")?;
        self.renderer.attach_effect(effect, &mut self.ticker);

        let model = assets.model(&ids::GLB_MONSTERA).context("monstera model")?;
        self.renderer.add(Monstera::renderable(&model))?;

        log::info!(
            "scene ready: {} node(s), {} updatable",
            self.renderer.graph().len(),
            self.renderer.updatable_count()
        );
        Ok(())
    }
}

/// Loads every showcase asset off the event-loop thread.
fn spawn_loader(root: PathBuf) -> Receiver<anyhow::Result<AssetPipeline>> {
    let (tx, rx) = mpsc::channel();
    thread::spawn(move || {
        let result = load_assets(root);
        // The receiver is gone only if the app already exited.
        let _ = tx.send(result);
    });
    rx
}

fn load_assets(root: PathBuf) -> anyhow::Result<AssetPipeline> {
    log::info!("loading assets from {}", root.display());
    let mut assets = AssetPipeline::new(DirSource::new(root));
    assets.add_model(ids::GLB_MONSTERA, ids::MONSTERA_PATH)?;
    assets.add_environment_map(ids::HDR_STUDIO, ids::STUDIO_PATH)?;
    assets.add_texture(ids::TEXTURE_GLASS, ids::GLASS_PATH)?;
    assets.load()?;
    Ok(assets)
}

impl App for Showcase {
    fn on_resize(&mut self, viewport: Viewport, scale_factor: f32) {
        if !viewport.is_valid() {
            return;
        }
        self.renderer.resize(viewport, scale_factor);
    }

    fn on_input(&mut self, event: &InputEvent) -> AppControl {
        if let InputEvent::Key {
            key: Key::Escape,
            state: KeyState::Pressed,
            ..
        } = event
        {
            return AppControl::Exit;
        }
        self.renderer.handle_input(event);
        AppControl::Continue
    }

    fn on_frame(&mut self, ctx: &mut FrameCtx<'_, '_>) -> AppControl {
        self.poll_loader();
        if self.title_dirty {
            ctx.runtime.set_title(self.window_title());
            self.title_dirty = false;
        }

        if !matches!(self.stage, Stage::Ready) {
            return ctx.render(LOADING_CLEAR, |_, _| {});
        }

        self.ticker.tick(&mut self.renderer);
        let Some(plan) = self.renderer.take_frame() else {
            return AppControl::Continue;
        };

        let compositor = &mut self.compositor;
        ctx.render(plan.clear, |rctx, target| compositor.render(rctx, target, &plan))
    }
}
