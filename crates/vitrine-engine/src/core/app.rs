use crate::coords::Viewport;
use crate::input::InputEvent;

use super::ctx::FrameCtx;

/// Control directive returned by app callbacks.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum AppControl {
    Continue,
    Exit,
}

/// Application contract driven by [`Runtime`](crate::window::Runtime).
///
/// Callbacks arrive on the event-loop thread in this order: one `on_resize`
/// once the window exists, then any mix of `on_input` and `on_frame`, with
/// `on_resize` again whenever the drawable size or scale factor changes.
pub trait App {
    /// `viewport` is in logical pixels.
    fn on_resize(&mut self, viewport: Viewport, scale_factor: f32) {
        let _ = (viewport, scale_factor);
    }

    fn on_input(&mut self, event: &InputEvent) -> AppControl {
        let _ = event;
        AppControl::Continue
    }

    /// Called once per redraw.
    fn on_frame(&mut self, ctx: &mut FrameCtx<'_, '_>) -> AppControl;
}
