use glam::{Mat4, Vec3};

use crate::config::Smoothing;
use crate::model::Camera;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraTuning {
    /// Desired eye position in car-local space (before model scale).
    pub offset: Vec3,
    /// Per-step interpolation factor toward the desired eye.
    pub follow: f32,
    pub fov_y_degrees: f32,
    pub z_near: f32,
    pub z_far: f32,
}

impl Default for CameraTuning {
    fn default() -> Self {
        Self {
            offset: Vec3::new(0.0, 2.5, -6.0),
            follow: 0.1,
            fov_y_degrees: 75.0,
            z_near: 0.1,
            z_far: 1000.0,
        }
    }
}

/// Chase camera trailing the car.
#[derive(Debug, Clone)]
pub struct CameraController {
    pub tuning: CameraTuning,
    smoothing: Smoothing,
}

impl CameraController {
    pub fn new(tuning: CameraTuning, smoothing: Smoothing) -> Self {
        Self { tuning, smoothing }
    }

    pub fn create_camera(&self, width: u32, height: u32) -> Camera {
        let mut camera = Camera::new(width, height);
        camera.fov_y = self.tuning.fov_y_degrees.to_radians();
        camera.z_near = self.tuning.z_near;
        camera.z_far = self.tuning.z_far;
        camera
    }

    /// Where the eye wants to be for a given car world transform.
    pub fn desired_eye(&self, car_transform: &Mat4) -> Vec3 {
        car_transform.transform_point3(self.tuning.offset)
    }

    /// Ease the eye toward the chase position and aim at the car.
    pub fn follow(&self, camera: &mut Camera, car_transform: &Mat4, car_position: Vec3, dt: f32) {
        let desired = self.desired_eye(car_transform);
        let k = self.smoothing.factor(self.tuning.follow, dt);
        camera.eye = camera.eye.lerp(desired, k);
        camera.look_at(car_position);
    }

    /// Jump straight to the chase position, e.g. after a reset.
    pub fn snap(&self, camera: &mut Camera, car_transform: &Mat4, car_position: Vec3) {
        camera.eye = self.desired_eye(car_transform);
        camera.look_at(car_position);
    }
}

impl Default for CameraController {
    fn default() -> Self {
        Self::new(CameraTuning::default(), Smoothing::PerStep)
    }
}
