use glam::{Mat4, Quat, Vec3};

use crate::model::VehicleState;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RigTuning {
    /// Uniform scale applied to the imported car model.
    pub model_scale: f32,
    /// Wheel roll per step, per unit of speed.
    pub wheel_spin: f32,
    /// Steering wheel roll per radian of wheel steer.
    pub steering_ratio: f32,
}

impl Default for RigTuning {
    fn default() -> Self {
        Self {
            model_scale: 2.5,
            wheel_spin: 1.5,
            steering_ratio: 4.0,
        }
    }
}

/// Transforms the renderer applies to the car mesh and its sub-meshes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CarRig {
    pub tuning: RigTuning,
    /// Car world transform: scale, yaw, then translation.
    pub transform: Mat4,
    /// Yaw of both front wheel hubs.
    pub front_hub_yaw: f32,
    /// Accumulated roll (x rotation) shared by all four wheels.
    pub wheel_roll: f32,
    /// Z rotation of the steering wheel mesh.
    pub steering_wheel_roll: f32,
}

impl CarRig {
    pub fn new(tuning: RigTuning) -> Self {
        Self {
            tuning,
            transform: Mat4::from_scale(Vec3::splat(tuning.model_scale)),
            front_hub_yaw: 0.0,
            wheel_roll: 0.0,
            steering_wheel_roll: 0.0,
        }
    }

    pub fn world_transform(tuning: &RigTuning, state: &VehicleState) -> Mat4 {
        Mat4::from_scale_rotation_translation(
            Vec3::splat(tuning.model_scale),
            Quat::from_rotation_y(state.heading),
            state.position(),
        )
    }

    pub fn update(&mut self, state: &VehicleState) {
        self.transform = Self::world_transform(&self.tuning, state);
        self.front_hub_yaw = state.steering_angle;
        self.wheel_roll -= state.speed * self.tuning.wheel_spin;
        self.steering_wheel_roll = -state.steering_angle * self.tuning.steering_ratio;
    }
}

impl Default for CarRig {
    fn default() -> Self {
        Self::new(RigTuning::default())
    }
}
