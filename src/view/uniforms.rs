use glam::{Mat4, Vec3};

use crate::model::{Camera, FlameIntensity};

#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct CameraUniform {
    pub view_proj: [[f32; 4]; 4],
    pub eye: [f32; 3],
    pub _pad: f32,
}

impl CameraUniform {
    pub fn from_camera(camera: &Camera) -> Self {
        Self {
            view_proj: camera.view_proj().to_cols_array_2d(),
            eye: camera.eye.to_array(),
            _pad: 0.0,
        }
    }
}

#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct TransformUniform {
    pub transform: [[f32; 4]; 4],
}

impl TransformUniform {
    pub fn from_matrix(m: &Mat4) -> Self {
        Self { transform: m.to_cols_array_2d() }
    }
}

/// Shared by the inner and outer flame layers.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct FlameUniform {
    pub time: f32,
    pub inner_opacity: f32,
    pub outer_opacity: f32,
    pub length_scale: f32,
}

impl FlameUniform {
    pub fn new(time: f32, flame: &FlameIntensity) -> Self {
        Self {
            time,
            inner_opacity: flame.inner_opacity,
            outer_opacity: flame.outer_opacity,
            length_scale: flame.length_scale,
        }
    }
}

/// Grass sway time and the car position the blades bend away from.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct GrassUniform {
    pub player_pos: [f32; 3],
    pub time: f32,
}

impl GrassUniform {
    pub fn new(time: f32, player_pos: Vec3) -> Self {
        Self { player_pos: player_pos.to_array(), time }
    }
}
