/// Visual intensity of the two flame layers. Read by the renderer only.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FlameIntensity {
    pub inner_opacity: f32,
    pub outer_opacity: f32,
    /// Y scale of the flame group.
    pub length_scale: f32,
}

impl Default for FlameIntensity {
    fn default() -> Self {
        Self {
            inner_opacity: 0.0,
            outer_opacity: 0.0,
            length_scale: 1.0,
        }
    }
}

impl FlameIntensity {
    pub fn is_visible(&self) -> bool {
        self.inner_opacity > f32::EPSILON || self.outer_opacity > f32::EPSILON
    }
}
