use glam::{Mat4, Vec3};

/// Orthographic frustum extents in world units.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct CameraBounds {
    pub left: f32,
    pub right: f32,
    pub top: f32,
    pub bottom: f32,
}

impl CameraBounds {
    /// Horizontal extent spans `[-aspect, aspect]`, vertical extent `[-1, 1]`.
    pub fn for_aspect(aspect: f32) -> Self {
        Self {
            left: -aspect,
            right: aspect,
            top: 1.0,
            bottom: -1.0,
        }
    }

    pub fn width(&self) -> f32 {
        self.right - self.left
    }

    pub fn height(&self) -> f32 {
        self.top - self.bottom
    }
}

/// Orthographic camera on the +Z axis looking at the origin.
#[derive(Debug, Clone, PartialEq)]
pub struct OrthoCamera {
    bounds: CameraBounds,
    distance: f32,
    near: f32,
    far: f32,
}

impl OrthoCamera {
    pub fn new(aspect: f32, distance: f32, near: f32, far: f32) -> Self {
        Self {
            bounds: CameraBounds::for_aspect(aspect),
            distance,
            near,
            far,
        }
    }

    /// Recomputes the horizontal extent; the vertical extent stays fixed.
    pub fn set_aspect(&mut self, aspect: f32) {
        self.bounds = CameraBounds::for_aspect(aspect);
    }

    pub fn bounds(&self) -> CameraBounds {
        self.bounds
    }

    pub fn position(&self) -> Vec3 {
        Vec3::new(0.0, 0.0, self.distance)
    }

    pub fn view(&self) -> Mat4 {
        Mat4::look_at_rh(self.position(), Vec3::ZERO, Vec3::Y)
    }

    pub fn projection(&self) -> Mat4 {
        let b = self.bounds;
        Mat4::orthographic_rh(b.left, b.right, b.bottom, b.top, self.near, self.far)
    }

    pub fn view_proj(&self) -> Mat4 {
        self.projection() * self.view()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bounds_follow_aspect() {
        let mut cam = OrthoCamera::new(1.0, 5.0, 0.1, 2000.0);
        cam.set_aspect(1600.0 / 800.0);
        let b = cam.bounds();
        assert_eq!((b.left, b.right, b.top, b.bottom), (-2.0, 2.0, 1.0, -1.0));
        assert_eq!(b.width(), 4.0);
        assert_eq!(b.height(), 2.0);
    }

    #[test]
    fn view_proj_maps_extents_to_clip_edges() {
        let cam = OrthoCamera::new(2.0, 5.0, 0.1, 2000.0);
        let m = cam.view_proj();

        let right_top = m.project_point3(Vec3::new(2.0, 1.0, 0.0));
        assert!((right_top.x - 1.0).abs() < 1e-5);
        assert!((right_top.y - 1.0).abs() < 1e-5);

        // Origin sits between near and far in wgpu's [0, 1] depth range.
        let origin = m.project_point3(Vec3::ZERO);
        assert!(origin.z > 0.0 && origin.z < 1.0);
    }
}
