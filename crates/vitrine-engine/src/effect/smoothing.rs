use glam::Vec2;

/// Frame-rate independent exponential approach of `current` toward `target`.
///
/// `decay` is the fraction of the remaining distance still left after one
/// second, so the blend factor for a step of `dt` seconds is `1 - decay^dt`.
/// Splitting a step into smaller ones lands on the same value.
#[inline]
pub fn damp(current: f32, target: f32, decay: f32, dt: f32) -> f32 {
    current + (target - current) * blend_factor(decay, dt)
}

/// [`damp`] applied to both components.
#[inline]
pub fn damp_vec2(current: Vec2, target: Vec2, decay: f32, dt: f32) -> Vec2 {
    current.lerp(target, blend_factor(decay, dt))
}

#[inline]
fn blend_factor(decay: f32, dt: f32) -> f32 {
    1.0 - decay.powf(dt.max(0.0))
}
