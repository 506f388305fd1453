/// Linear interpolation, same form as three.js `MathUtils.lerp`.
#[inline]
pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    (1.0 - t) * a + t * b
}

/// Interpolation factor that reaches ~63% of a target after `tau` seconds,
/// independent of frame rate.
#[inline]
pub fn time_constant_factor(dt: f32, tau: f32) -> f32 {
    if tau <= 0.0 {
        return 1.0;
    }
    1.0 - (-dt / tau).exp()
}

/// Negative, NaN and infinite time deltas become zero.
#[inline]
pub fn sanitize_dt(dt: f32) -> f32 {
    if dt.is_finite() { dt.max(0.0) } else { 0.0 }
}
