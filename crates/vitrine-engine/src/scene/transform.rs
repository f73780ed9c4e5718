use glam::{Mat4, Quat, Vec3};

/// Local translation / rotation / scale of a scene node.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Transform {
    pub translation: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
}

impl Transform {
    pub const IDENTITY: Self = Self {
        translation: Vec3::ZERO,
        rotation: Quat::IDENTITY,
        scale: Vec3::ONE,
    };

    pub fn from_translation(translation: Vec3) -> Self {
        Self { translation, ..Self::IDENTITY }
    }

    pub fn from_scale(scale: f32) -> Self {
        Self { scale: Vec3::splat(scale), ..Self::IDENTITY }
    }

    pub fn with_translation(mut self, translation: Vec3) -> Self {
        self.translation = translation;
        self
    }

    pub fn with_scale(mut self, scale: Vec3) -> Self {
        self.scale = scale;
        self
    }

    /// Applies a rotation of `angle` radians about the local Y axis.
    pub fn rotate_y(&mut self, angle: f32) {
        self.rotation = (self.rotation * Quat::from_rotation_y(angle)).normalize();
    }

    /// Scale, then rotation, then translation.
    pub fn matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(self.scale, self.rotation, self.translation)
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matrix_applies_scale_before_translation() {
        let t = Transform::from_scale(2.0).with_translation(Vec3::new(0.0, -0.6, 0.0));
        let p = t.matrix().transform_point3(Vec3::new(1.0, 1.0, 0.0));
        assert!((p - Vec3::new(2.0, 1.4, 0.0)).length() < 1e-6);
    }

    #[test]
    fn rotate_y_accumulates() {
        let mut t = Transform::IDENTITY;
        t.rotate_y(std::f32::consts::FRAC_PI_4);
        t.rotate_y(std::f32::consts::FRAC_PI_4);
        let p = t.matrix().transform_point3(Vec3::X);
        assert!((p - Vec3::new(0.0, 0.0, -1.0)).length() < 1e-5);
    }
}
