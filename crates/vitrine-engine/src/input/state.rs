use super::types::{InputEvent, Modifiers, PointerButtonEvent, PointerMoveEvent};

/// Input state the runtime tracks for one window.
///
/// winit reports neither the pointer position nor the modifiers with button
/// events; both are remembered here and stamped onto
/// [`PointerButtonEvent`]s during translation.
#[derive(Debug, Default)]
pub struct InputState {
    pub modifiers: Modifiers,

    /// Pointer position in logical pixels, `None` while outside the window.
    pub pointer_pos: Option<(f32, f32)>,
}

impl InputState {
    pub fn apply_event(&mut self, ev: &InputEvent) {
        match ev {
            InputEvent::ModifiersChanged(m) => self.modifiers = *m,
            InputEvent::PointerMoved(PointerMoveEvent { x, y }) => {
                self.pointer_pos = Some((*x, *y));
            }
            InputEvent::PointerLeft => self.pointer_pos = None,
            InputEvent::PointerButton(PointerButtonEvent { x, y, modifiers, .. }) => {
                self.pointer_pos = Some((*x, *y));
                self.modifiers = *modifiers;
            }
            InputEvent::Key { modifiers, .. } => self.modifiers = *modifiers,
            InputEvent::Focused(_) => {}
        }
    }
}
