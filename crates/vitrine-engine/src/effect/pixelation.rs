use std::sync::Arc;

use bytemuck::{Pod, Zeroable};
use glam::Vec2;

use crate::assets::{AssetId, AssetPipeline, TextureData};
use crate::coords::Viewport;
use crate::error::Result;
use crate::input::{InputEvent, Key, KeyState, MouseButtonState, PointerButtonEvent};

use super::latch::PointerLatch;
use super::smoothing::{damp, damp_vec2};
use super::stage::Effect;

/// Tuning of [`PixelationEffect`].
#[derive(Debug, Clone, PartialEq)]
pub struct PixelationConfig {
    /// Side of one pixelated block, in logical pixels.
    pub pixel_size: f32,
    /// Fraction of the cursor lag left after one second.
    pub cursor_decay: f32,
    /// Fraction of the window-scale lag left after one second.
    pub scale_decay: f32,
    /// Window growth while pressed, as a fraction of the viewport height.
    pub active_scale_ratio: f32,
    pub toggle_key: Key,
}

impl Default for PixelationConfig {
    fn default() -> Self {
        Self {
            pixel_size: 20.0,
            cursor_decay: 0.01,
            scale_decay: 0.1,
            active_scale_ratio: 0.9,
            toggle_key: Key::Space,
        }
    }
}

/// Continuous state of the reveal window.
///
/// `target_*` fields are written by input, `current_*` fields follow them
/// once per frame.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct EffectState {
    /// Pointer in normalized coordinates, origin bottom-left.
    pub target_cursor: Vec2,
    pub current_cursor: Vec2,
    pub target_scale: f32,
    pub current_scale: f32,
    /// `false`: clear inside the window, pixelated around it. `true`: the
    /// reverse.
    pub mode: bool,
}

impl Default for EffectState {
    fn default() -> Self {
        Self {
            target_cursor: Vec2::splat(0.5),
            current_cursor: Vec2::splat(0.5),
            target_scale: 0.0,
            current_scale: 0.0,
            mode: false,
        }
    }
}

#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable)]
struct PixelationUniform {
    resolution: [f32; 2],
    cursor: [f32; 2],
    scale: f32,
    pixel_size: f32,
    mode: f32,
    _pad: f32,
}

/// Pointer-driven pixelation with a glass-bordered reveal window.
///
/// - pointer move retargets the window centre
/// - pressing any button grows the window; releasing it, or the window
///   losing focus, shrinks it back
/// - the toggle key swaps which side of the border is pixelated
pub struct PixelationEffect {
    config: PixelationConfig,
    glass: Arc<TextureData>,
    state: EffectState,
    latch: PointerLatch,
}

impl PixelationEffect {
    pub fn new(glass: Arc<TextureData>, config: PixelationConfig) -> Self {
        Self {
            config,
            glass,
            state: EffectState::default(),
            latch: PointerLatch::Inactive,
        }
    }

    /// Builds the effect around a border texture resolved by `assets`.
    pub fn from_assets(
        assets: &AssetPipeline,
        glass: &AssetId,
        config: PixelationConfig,
    ) -> Result<Self> {
        Ok(Self::new(assets.texture(glass)?, config))
    }

    pub fn state(&self) -> EffectState {
        self.state
    }

    pub fn latch(&self) -> PointerLatch {
        self.latch
    }

    pub fn config(&self) -> &PixelationConfig {
        &self.config
    }

    /// `x`/`y` are logical pixels, origin top-left.
    pub fn pointer_moved(&mut self, x: f32, y: f32, viewport: Viewport) {
        if !viewport.is_valid() {
            return;
        }
        let target = Vec2::new(x / viewport.width, 1.0 - y / viewport.height);
        if target.is_finite() {
            self.state.target_cursor = target;
        }
    }

    pub fn pointer_pressed(&mut self, viewport: Viewport) {
        if !self.latch.press() {
            log::trace!("pixelation: press while already active");
        }
        self.state.target_scale = viewport.height * self.config.active_scale_ratio;
    }

    pub fn pointer_released(&mut self) {
        if self.latch.release() {
            self.state.target_scale = 0.0;
        }
    }

    pub fn toggle_mode(&mut self) {
        self.state.mode = !self.state.mode;
        log::debug!("pixelation mode -> {}", u8::from(self.state.mode));
    }
}

impl Effect for PixelationEffect {
    fn label(&self) -> &'static str {
        "pixelation"
    }

    fn fragment_source(&self) -> &'static str {
        include_str!("shaders/pixelation.wgsl")
    }

    fn uniforms(&self, viewport: Viewport) -> Vec<u8> {
        let u = PixelationUniform {
            resolution: [viewport.width.max(1.0), viewport.height.max(1.0)],
            cursor: [self.state.current_cursor.x, self.state.current_cursor.y],
            scale: self.state.current_scale,
            pixel_size: self.config.pixel_size.max(1.0),
            mode: if self.state.mode { 1.0 } else { 0.0 },
            _pad: 0.0,
        };
        bytemuck::bytes_of(&u).to_vec()
    }

    fn texture(&self) -> Option<Arc<TextureData>> {
        Some(Arc::clone(&self.glass))
    }

    fn update(&mut self, dt: f32) -> anyhow::Result<()> {
        let s = &mut self.state;
        s.current_cursor = damp_vec2(s.current_cursor, s.target_cursor, self.config.cursor_decay, dt);
        s.current_scale = damp(s.current_scale, s.target_scale, self.config.scale_decay, dt);
        Ok(())
    }

    fn handle_input(&mut self, event: &InputEvent, viewport: Viewport) -> bool {
        match event {
            InputEvent::PointerMoved(p) => {
                self.pointer_moved(p.x, p.y, viewport);
                true
            }
            InputEvent::PointerButton(PointerButtonEvent { state, .. }) => {
                match state {
                    MouseButtonState::Pressed => self.pointer_pressed(viewport),
                    MouseButtonState::Released => self.pointer_released(),
                }
                true
            }
            InputEvent::Key {
                key,
                state: KeyState::Pressed,
                repeat: false,
                ..
            } if *key == self.config.toggle_key => {
                self.toggle_mode();
                true
            }
            // The release would be delivered elsewhere.
            InputEvent::Focused(false) if self.latch.is_active() => {
                self.pointer_released();
                true
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::{Modifiers, MouseButton, PointerMoveEvent};

    const VIEWPORT: Viewport = Viewport {
        width: 1280.0,
        height: 720.0,
    };

    fn effect() -> PixelationEffect {
        let glass = Arc::new(TextureData {
            width: 1,
            height: 1,
            pixels: vec![255; 4],
        });
        PixelationEffect::new(glass, PixelationConfig::default())
    }

    fn button(state: MouseButtonState) -> InputEvent {
        press_with(MouseButton::Left, state)
    }

    fn press_with(button: MouseButton, state: MouseButtonState) -> InputEvent {
        InputEvent::PointerButton(PointerButtonEvent {
            button,
            state,
            x: 0.0,
            y: 0.0,
            modifiers: Modifiers::default(),
        })
    }

    // ── pointer ───────────────────────────────────────────────────────────

    #[test]
    fn starts_centred_and_closed() {
        let s = effect().state();
        assert_eq!(s.current_cursor, Vec2::new(0.5, 0.5));
        assert_eq!(s.target_scale, 0.0);
        assert!(!s.mode);
    }

    #[test]
    fn pointer_move_sets_target_without_smoothing() {
        let mut fx = effect();
        let ev = InputEvent::PointerMoved(PointerMoveEvent { x: 320.0, y: 180.0 });
        assert!(fx.handle_input(&ev, VIEWPORT));

        let s = fx.state();
        assert_eq!(s.target_cursor, Vec2::new(0.25, 0.75));
        assert_eq!(s.current_cursor, Vec2::new(0.5, 0.5));
    }

    #[test]
    fn press_then_release_restores_inactive_latch() {
        let mut fx = effect();
        fx.handle_input(&button(MouseButtonState::Pressed), VIEWPORT);
        assert!(fx.latch().is_active());
        assert!((fx.state().target_scale - 648.0).abs() < 1e-3);

        fx.handle_input(&button(MouseButtonState::Released), VIEWPORT);
        assert_eq!(fx.latch(), PointerLatch::Inactive);
        assert_eq!(fx.state().target_scale, 0.0);
    }

    #[test]
    fn duplicate_press_needs_a_single_release() {
        let mut fx = effect();
        fx.handle_input(&button(MouseButtonState::Pressed), VIEWPORT);
        fx.handle_input(&button(MouseButtonState::Pressed), VIEWPORT);
        fx.handle_input(&button(MouseButtonState::Released), VIEWPORT);
        assert_eq!(fx.latch(), PointerLatch::Inactive);
        assert_eq!(fx.state().target_scale, 0.0);

        // A stray release while inactive changes nothing.
        fx.handle_input(&button(MouseButtonState::Released), VIEWPORT);
        assert_eq!(fx.latch(), PointerLatch::Inactive);
    }

    #[test]
    fn any_button_opens_the_window() {
        for b in [MouseButton::Right, MouseButton::Middle, MouseButton::Other(7)] {
            let mut fx = effect();
            assert!(fx.handle_input(&press_with(b, MouseButtonState::Pressed), VIEWPORT));
            assert!(fx.latch().is_active(), "{b:?}");
            fx.handle_input(&press_with(b, MouseButtonState::Released), VIEWPORT);
            assert_eq!(fx.latch(), PointerLatch::Inactive);
        }
    }

    #[test]
    fn focus_loss_releases_the_latch() {
        let mut fx = effect();
        assert!(!fx.handle_input(&InputEvent::Focused(false), VIEWPORT));

        fx.handle_input(&button(MouseButtonState::Pressed), VIEWPORT);
        assert!(fx.handle_input(&InputEvent::Focused(false), VIEWPORT));
        assert_eq!(fx.latch(), PointerLatch::Inactive);
        assert_eq!(fx.state().target_scale, 0.0);
    }

    #[test]
    fn toggle_key_flips_mode_and_ignores_repeats() {
        let mut fx = effect();
        let key = |repeat| InputEvent::Key {
            key: Key::Space,
            state: KeyState::Pressed,
            modifiers: Modifiers::default(),
            code: 0,
            repeat,
        };
        fx.handle_input(&key(false), VIEWPORT);
        assert!(fx.state().mode);
        assert!(!fx.handle_input(&key(true), VIEWPORT));
        assert!(fx.state().mode);
        fx.handle_input(&key(false), VIEWPORT);
        assert!(!fx.state().mode);
    }

    // ── update ────────────────────────────────────────────────────────────

    #[test]
    fn update_follows_the_smoothing_law() {
        let mut fx = effect();
        fx.pointer_pressed(VIEWPORT);
        fx.update(0.016).expect("update");
        let expected = 648.0 * (1.0 - 0.1_f32.powf(0.016));
        assert!((fx.state().current_scale - expected).abs() < 1e-3);
    }

    #[test]
    fn split_frames_reach_the_same_state() {
        let mut a = effect();
        let mut b = effect();
        for fx in [&mut a, &mut b] {
            fx.pointer_moved(1280.0, 0.0, VIEWPORT);
            fx.pointer_pressed(VIEWPORT);
        }

        a.update(0.05).expect("update");
        b.update(0.025).expect("update");
        b.update(0.025).expect("update");

        let (sa, sb) = (a.state(), b.state());
        assert!((sa.current_scale - sb.current_scale).abs() < 1e-3);
        assert!(sa.current_cursor.distance(sb.current_cursor) < 1e-5);
    }

    #[test]
    fn uniforms_pack_current_state() {
        let mut fx = effect();
        fx.toggle_mode();
        let bytes = fx.uniforms(VIEWPORT);
        assert_eq!(bytes.len(), 32);

        let u: PixelationUniform = bytemuck::pod_read_unaligned(&bytes);
        assert_eq!(u.resolution, [1280.0, 720.0]);
        assert_eq!(u.cursor, [0.5, 0.5]);
        assert_eq!(u.pixel_size, 20.0);
        assert_eq!(u.mode, 1.0);
    }
}
