use crate::config::ConfigError;
use crate::controller::input::InputState;
use crate::model::{VehicleState, VehicleTuning};

/// Arcade car integrator. Every constant is applied once per step, so the
/// car's motion scales with the rate at which `step` is called.
#[derive(Debug, Clone)]
pub struct VehiclePhysics {
    pub tuning: VehicleTuning,
    state: VehicleState,
}

impl VehiclePhysics {
    pub fn new(tuning: VehicleTuning) -> Result<Self, ConfigError> {
        Self::with_state(tuning, VehicleState::default())
    }

    pub fn with_state(tuning: VehicleTuning, state: VehicleState) -> Result<Self, ConfigError> {
        tuning.validate()?;
        Ok(Self::from_parts(tuning, state))
    }

    /// Caller guarantees `tuning` already passed validation.
    fn from_parts(tuning: VehicleTuning, mut state: VehicleState) -> Self {
        state.effective_max_speed = tuning.max_speed_for(state.boost_active);
        Self { tuning, state }
    }

    pub fn state(&self) -> &VehicleState {
        &self.state
    }

    pub fn reset(&mut self) {
        *self = Self::from_parts(self.tuning, VehicleState::default());
    }

    /// Advance the car by one step and return the new state.
    pub fn step(&mut self, input: &InputState) -> VehicleState {
        let t = &self.tuning;
        let s = &mut self.state;

        s.boost_active = input.boost && input.forward;
        let max_speed = t.max_speed_for(s.boost_active);
        let accel = t.acceleration_for(s.boost_active);
        s.effective_max_speed = max_speed;

        // Forward wins when both are held
        if input.forward {
            s.speed += accel;
        } else if input.backward {
            s.speed -= accel;
        }

        s.speed *= if input.brake { t.brake } else { t.friction };

        // Clamp after damping; reverse is capped at half the forward cap
        if s.speed > max_speed {
            s.speed = max_speed;
        }
        if s.speed < -max_speed / 2.0 {
            s.speed = -max_speed / 2.0;
        }

        // Left wins when both are held
        if input.left {
            s.steering_angle -= t.steer_rate;
        } else if input.right {
            s.steering_angle += t.steer_rate;
        } else {
            s.steering_angle *= t.steer_return;
        }
        s.steering_angle = s.steering_angle.clamp(-t.max_steer, t.max_steer);

        if s.speed.abs() > t.stationary_threshold {
            s.heading -= s.steering_angle * s.speed * t.turn_sensitivity;
        }

        let forward = s.forward();
        s.x += forward.x * s.speed;
        s.z += forward.z * s.speed;

        *s
    }
}

impl Default for VehiclePhysics {
    fn default() -> Self {
        Self::from_parts(VehicleTuning::default(), VehicleState::default())
    }
}
