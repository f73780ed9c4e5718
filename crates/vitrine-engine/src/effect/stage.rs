use std::sync::Arc;

use crate::assets::TextureData;
use crate::coords::Viewport;
use crate::input::InputEvent;

/// Full-screen post-processing stage.
///
/// An effect supplies a WGSL fragment that is appended to the shared
/// full-screen vertex stage. The fragment must define `fs_main(in: VsOut)`
/// and may use these bindings of group 0:
///
/// | binding | resource                                    |
/// |---------|---------------------------------------------|
/// | 0       | `src_tex: texture_2d<f32>` (previous stage) |
/// | 1       | `src_samp: sampler`                         |
/// | 2       | `params: <effect uniform struct>`           |
/// | 3       | `aux_tex: texture_2d<f32>`                  |
/// | 4       | `aux_samp: sampler`                         |
///
/// `aux_tex` is [`Effect::texture`] or a 1x1 white texel.
pub trait Effect: 'static {
    /// Stable name used for GPU object labels and logs.
    fn label(&self) -> &'static str;

    fn fragment_source(&self) -> &'static str;

    /// Bytes of the `params` uniform for the current state.
    ///
    /// Size must be a non-zero multiple of 16.
    fn uniforms(&self, viewport: Viewport) -> Vec<u8>;

    fn texture(&self) -> Option<Arc<TextureData>> {
        None
    }

    /// Advances interpolated state by `dt` seconds.
    fn update(&mut self, dt: f32) -> anyhow::Result<()>;

    /// Returns `true` if the event changed the effect's state.
    fn handle_input(&mut self, event: &InputEvent, viewport: Viewport) -> bool {
        let _ = (event, viewport);
        false
    }

    fn resize(&mut self, viewport: Viewport) {
        let _ = viewport;
    }
}
