/// Two-state pointer latch: armed by a press, disarmed by a release.
///
/// Transitions only happen from the opposite state, so a repeated press while
/// active (or a stray release while inactive) is reported and ignored.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq)]
pub enum PointerLatch {
    #[default]
    Inactive,
    Active,
}

impl PointerLatch {
    /// Returns `true` if the latch moved from inactive to active.
    pub fn press(&mut self) -> bool {
        match self {
            PointerLatch::Inactive => {
                *self = PointerLatch::Active;
                true
            }
            PointerLatch::Active => false,
        }
    }

    /// Returns `true` if the latch moved from active to inactive.
    pub fn release(&mut self) -> bool {
        match self {
            PointerLatch::Active => {
                *self = PointerLatch::Inactive;
                true
            }
            PointerLatch::Inactive => false,
        }
    }

    pub fn is_active(self) -> bool {
        self == PointerLatch::Active
    }
}
