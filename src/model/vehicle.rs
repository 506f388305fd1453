use glam::Vec3;

use crate::config::{finite, positive, ConfigError};

/// Arcade handling constants. All rates are per step, not per second.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VehicleTuning {
    pub max_speed: f32,
    pub acceleration: f32,
    pub boost_max_speed: f32,
    pub boost_acceleration: f32,
    /// Multiplier applied every step while the brake is held.
    pub brake: f32,
    /// Multiplier applied every step while the brake is released.
    pub friction: f32,
    pub steer_rate: f32,
    pub max_steer: f32,
    /// Self-centering multiplier when no steering key is held.
    pub steer_return: f32,
    pub turn_sensitivity: f32,
    /// Below this |speed| the heading is frozen.
    pub stationary_threshold: f32,
}

impl Default for VehicleTuning {
    fn default() -> Self {
        Self {
            max_speed: 0.8,
            acceleration: 0.05,
            boost_max_speed: 2.5,
            boost_acceleration: 0.15,
            brake: 0.92,
            friction: 0.99,
            steer_rate: 0.04,
            max_steer: 0.15,
            steer_return: 0.85,
            turn_sensitivity: 0.35,
            stationary_threshold: 0.01,
        }
    }
}

impl VehicleTuning {
    pub fn max_speed_for(&self, boost_active: bool) -> f32 {
        if boost_active { self.boost_max_speed } else { self.max_speed }
    }

    pub fn acceleration_for(&self, boost_active: bool) -> f32 {
        if boost_active { self.boost_acceleration } else { self.acceleration }
    }

    /// Caps and the steering limit must be positive; every other constant finite.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (name, value) in [
            ("vehicle.max_speed", self.max_speed),
            ("vehicle.boost_max_speed", self.boost_max_speed),
            ("vehicle.max_steer", self.max_steer),
        ] {
            positive(name, value)?;
        }
        for (name, value) in [
            ("vehicle.acceleration", self.acceleration),
            ("vehicle.boost_acceleration", self.boost_acceleration),
            ("vehicle.brake", self.brake),
            ("vehicle.friction", self.friction),
            ("vehicle.steer_rate", self.steer_rate),
            ("vehicle.steer_return", self.steer_return),
            ("vehicle.turn_sensitivity", self.turn_sensitivity),
            ("vehicle.stationary_threshold", self.stationary_threshold),
        ] {
            finite(name, value)?;
        }
        Ok(())
    }
}

/// Kinematic state of the car on the ground plane.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct VehicleState {
    pub speed: f32,
    pub steering_angle: f32,
    pub x: f32,
    pub z: f32,
    /// Yaw around +Y in radians. Accumulates without wrapping.
    pub heading: f32,
    pub boost_active: bool,
    /// Cap that was in force for the last step.
    pub effective_max_speed: f32,
}

impl VehicleState {
    pub fn at_rest() -> Self {
        Self {
            effective_max_speed: VehicleTuning::default().max_speed,
            ..Default::default()
        }
    }

    /// World position with y pinned to the ground.
    pub fn position(&self) -> Vec3 {
        Vec3::new(self.x, 0.0, self.z)
    }

    /// Unit vector the car is facing.
    pub fn forward(&self) -> Vec3 {
        Vec3::new(self.heading.sin(), 0.0, self.heading.cos())
    }

    /// Signed fraction of the current cap, used to stretch the flame.
    pub fn speed_ratio(&self) -> f32 {
        if self.effective_max_speed > 0.0 {
            self.speed / self.effective_max_speed
        } else {
            0.0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_boost_selects_caps() {
        let t = VehicleTuning::default();
        assert_eq!(t.max_speed_for(false), 0.8);
        assert_eq!(t.max_speed_for(true), 2.5);
        assert_eq!(t.acceleration_for(false), 0.05);
        assert_eq!(t.acceleration_for(true), 0.15);
    }

    #[test]
    fn test_validate_rejects_inverted_steer_limit() {
        assert_eq!(VehicleTuning::default().validate(), Ok(()));
        let t = VehicleTuning { max_steer: -0.15, ..Default::default() };
        assert!(matches!(
            t.validate(),
            Err(ConfigError::NotPositive { name: "vehicle.max_steer", .. })
        ));
        let t = VehicleTuning { friction: f32::NAN, ..Default::default() };
        assert_eq!(t.validate(), Err(ConfigError::NotFinite { name: "vehicle.friction" }));
    }

    #[test]
    fn test_forward_follows_heading() {
        let mut state = VehicleState::at_rest();
        assert_eq!(state.forward(), Vec3::Z);

        state.heading = std::f32::consts::FRAC_PI_2;
        let f = state.forward();
        assert!((f.x - 1.0).abs() < 1e-6 && f.z.abs() < 1e-6, "got {f:?}");
    }

    #[test]
    fn test_speed_ratio_handles_zero_cap() {
        let state = VehicleState::default();
        assert_eq!(state.speed_ratio(), 0.0);
    }
}
