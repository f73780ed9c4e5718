/// Viewport size in logical pixels.
///
/// The physical drawable size is `logical * scale_factor`, rounded and clamped
/// to at least one pixel per axis.
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
}

impl Viewport {
    #[inline]
    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    #[inline]
    pub fn is_valid(self) -> bool {
        self.width > 0.0 && self.height > 0.0 && self.width.is_finite() && self.height.is_finite()
    }

    /// Width over height. Degenerate viewports (minimized windows) report `1.0`.
    #[inline]
    pub fn aspect(self) -> f32 {
        if self.is_valid() {
            self.width / self.height
        } else {
            1.0
        }
    }

    /// Drawable size in physical pixels.
    pub fn physical_size(self, scale_factor: f32) -> (u32, u32) {
        let scale = if scale_factor.is_finite() && scale_factor > 0.0 { scale_factor } else { 1.0 };
        let w = (self.width.max(0.0) * scale).round() as u32;
        let h = (self.height.max(0.0) * scale).round() as u32;
        (w.max(1), h.max(1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn aspect_of_landscape_viewport() {
        assert_eq!(Viewport::new(1600.0, 800.0).aspect(), 2.0);
    }

    #[test]
    fn aspect_of_degenerate_viewport_is_one() {
        assert_eq!(Viewport::new(1600.0, 0.0).aspect(), 1.0);
    }

    #[test]
    fn physical_size_applies_scale_and_clamps() {
        assert_eq!(Viewport::new(640.0, 360.0).physical_size(2.0), (1280, 720));
        assert_eq!(Viewport::new(0.0, 0.0).physical_size(1.0), (1, 1));
    }
}
