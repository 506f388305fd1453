use glam::Vec3;

use crate::config::{ConfigError, SimConfig, StepMode, MAX_FIXED_STEPS_PER_FRAME, MAX_FRAME_DT};
use crate::controller::camera_controller::CameraController;
use crate::controller::input::{InputProcessor, InputState, KeyboardState};
use crate::controller::nitro::NitroEffectSimulator;
use crate::controller::physics::VehiclePhysics;
use crate::model::{Camera, FlameIntensity, ParticlePool, VehicleState};
use crate::utils::sanitize_dt;
use crate::view::{CameraUniform, CarRig, FlameUniform, GrassUniform, TransformUniform};

/// Everything the renderer reads after one frame.
#[derive(Debug, Clone, Copy)]
pub struct FrameOutput<'a> {
    pub dt: f32,
    /// Seconds since the first frame, for shader animation.
    pub time: f32,
    pub physics_steps: u32,
    pub vehicle: VehicleState,
    pub flame: FlameIntensity,
    pub alive_particles: usize,
    /// x, y, z per particle, ready for a vertex buffer upload.
    pub particle_positions: &'a [f32],
    pub rig: CarRig,
    pub camera: CameraUniform,
    pub car: TransformUniform,
    pub flame_uniform: FlameUniform,
    pub grass: GrassUniform,
}

/// Main loop state and per-frame update logic
pub struct FrameLoop {
    config: SimConfig,
    input_processor: InputProcessor,
    physics: VehiclePhysics,
    nitro: NitroEffectSimulator,
    rig: CarRig,
    camera_controller: CameraController,
    camera: Camera,
    last_time: Option<f64>,
    elapsed: f32,
    accumulator: f32,
    previous_position: Vec3,
    frames: u64,
}

impl FrameLoop {
    pub fn new(config: SimConfig, width: u32, height: u32) -> Result<Self, ConfigError> {
        config.validate()?;
        let physics = VehiclePhysics::new(config.vehicle)?;
        let nitro = NitroEffectSimulator::new(config.nitro, config.smoothing, config.seed)?;
        let input_processor = InputProcessor::new(config.bindings.clone());
        let rig = CarRig::new(config.rig);
        let camera_controller = CameraController::new(config.camera, config.smoothing);
        let camera = camera_controller.create_camera(width, height);

        tracing::info!(
            particles = config.nitro.capacity,
            step_mode = ?config.step_mode,
            smoothing = ?config.smoothing,
            seed = config.seed,
            "simulation configured"
        );

        Ok(Self {
            config,
            input_processor,
            physics,
            nitro,
            rig,
            camera_controller,
            camera,
            last_time: None,
            elapsed: 0.0,
            accumulator: 0.0,
            previous_position: Vec3::ZERO,
            frames: 0,
        })
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    pub fn input_processor(&self) -> &InputProcessor {
        &self.input_processor
    }

    pub fn vehicle(&self) -> &VehicleState {
        self.physics.state()
    }

    pub fn flame(&self) -> &FlameIntensity {
        self.nitro.flame()
    }

    pub fn particles(&self) -> &ParticlePool {
        self.nitro.pool()
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn rig(&self) -> &CarRig {
        &self.rig
    }

    pub fn elapsed(&self) -> f32 {
        self.elapsed
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        self.camera.set_aspect(width, height);
    }

    /// Put the car back at the origin and snap the camera behind it.
    pub fn reset(&mut self) {
        self.physics.reset();
        self.rig = CarRig::new(self.config.rig);
        self.rig.update(self.physics.state());
        self.accumulator = 0.0;
        self.previous_position = Vec3::ZERO;
        let car = *self.physics.state();
        self.camera_controller
            .snap(&mut self.camera, &self.rig.transform, car.position());
        tracing::info!("vehicle reset");
    }

    /// Poll the keyboard and advance using a host timestamp in seconds.
    /// The first call only primes the clock. A non-finite timestamp counts
    /// as a zero-length frame and leaves the clock untouched.
    pub fn update(&mut self, keyboard: &KeyboardState, now_seconds: f64) -> FrameOutput<'_> {
        let dt = if now_seconds.is_finite() {
            let dt = match self.last_time {
                Some(last) => ((now_seconds - last) as f32).clamp(0.0, MAX_FRAME_DT),
                None => 0.0,
            };
            self.last_time = Some(now_seconds);
            dt
        } else {
            tracing::warn!(now_seconds, "ignoring non-finite frame timestamp");
            0.0
        };
        let input = self.input_processor.snapshot(keyboard);
        self.advance(&input, dt)
    }

    /// Advance one rendered frame with an explicit input snapshot and delta.
    pub fn advance(&mut self, input: &InputState, dt: f32) -> FrameOutput<'_> {
        let dt = sanitize_dt(dt);
        self.elapsed += dt;
        self.frames += 1;
        self.previous_position = self.physics.state().position();

        let physics_steps = self.physics_steps_for(dt);
        for _ in 0..physics_steps {
            let state = self.physics.step(input);
            self.rig.update(&state);
        }
        let vehicle = *self.physics.state();

        let effect = self.nitro.step(&vehicle, dt);

        self.camera_controller
            .follow(&mut self.camera, &self.rig.transform, vehicle.position(), dt);

        FrameOutput {
            dt,
            time: self.elapsed,
            physics_steps,
            vehicle,
            flame: effect.flame,
            alive_particles: effect.alive,
            particle_positions: effect.positions,
            rig: self.rig,
            camera: CameraUniform::from_camera(&self.camera),
            car: TransformUniform::from_matrix(&self.rig.transform),
            flame_uniform: FlameUniform::new(self.elapsed, &effect.flame),
            grass: GrassUniform::new(self.elapsed, self.previous_position),
        }
    }

    fn physics_steps_for(&mut self, dt: f32) -> u32 {
        match self.config.step_mode {
            StepMode::PerFrame => 1,
            StepMode::Fixed { hz } => {
                let tick = 1.0 / hz;
                self.accumulator += dt;
                let mut steps = 0;
                while self.accumulator >= tick && steps < MAX_FIXED_STEPS_PER_FRAME {
                    self.accumulator -= tick;
                    steps += 1;
                }
                if self.accumulator >= tick {
                    tracing::warn!(
                        behind_s = self.accumulator,
                        "fixed-step catch-up capped; dropping backlog"
                    );
                    self.accumulator = 0.0;
                }
                steps
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Smoothing;
    use crate::controller::input::InputEvent;

    fn frame_loop(config: SimConfig) -> FrameLoop {
        FrameLoop::new(config, 800, 600).unwrap()
    }

    #[test]
    fn test_rejects_invalid_config() {
        let mut config = SimConfig::default();
        config.nitro.capacity = 0;
        assert!(matches!(
            FrameLoop::new(config, 800, 600),
            Err(ConfigError::ZeroParticleCapacity)
        ));
    }

    #[test]
    fn test_first_update_primes_clock() {
        let mut fl = frame_loop(SimConfig::default());
        let keyboard = KeyboardState::new();
        let out = fl.update(&keyboard, 10.0);
        assert_eq!(out.dt, 0.0);
        let out = fl.update(&keyboard, 10.016);
        assert!((out.dt - 0.016).abs() < 1e-5);
    }

    #[test]
    fn test_dt_is_clamped() {
        let mut fl = frame_loop(SimConfig::default());
        let keyboard = KeyboardState::new();
        fl.update(&keyboard, 1.0);
        assert_eq!(fl.update(&keyboard, 5.0).dt, MAX_FRAME_DT);
        // clock going backwards
        assert_eq!(fl.update(&keyboard, 2.0).dt, 0.0);
    }

    #[test]
    fn test_non_finite_timestamp_keeps_clock() {
        let mut fl = frame_loop(SimConfig::default());
        let keyboard = KeyboardState::new();
        fl.update(&keyboard, 1.0);
        assert_eq!(fl.update(&keyboard, f64::NAN).dt, 0.0);
        assert_eq!(fl.update(&keyboard, f64::INFINITY).dt, 0.0);
        let out = fl.update(&keyboard, 1.05);
        assert!((out.dt - 0.05).abs() < 1e-5, "dt {}", out.dt);
    }

    #[test]
    fn test_fixed_mode_keeps_stepping_after_bad_timestamp() {
        let config = SimConfig { step_mode: StepMode::Fixed { hz: 60.0 }, ..Default::default() };
        let mut fl = frame_loop(config);
        let mut keyboard = KeyboardState::new();
        keyboard.process_event(&InputEvent::KeyDown("ArrowUp".into()));
        fl.update(&keyboard, 0.0);
        fl.update(&keyboard, f64::NAN);
        let out = fl.update(&keyboard, 0.06);
        assert_eq!(out.physics_steps, 3);
        assert!(out.vehicle.speed > 0.0);
    }

    #[test]
    fn test_rejects_invalid_vehicle_tuning() {
        let mut config = SimConfig::default();
        config.vehicle.max_steer = -0.15;
        assert!(matches!(
            FrameLoop::new(config, 800, 600),
            Err(ConfigError::NotPositive { name: "vehicle.max_steer", .. })
        ));
    }

    #[test]
    fn test_custom_bindings_from_config() {
        let mut config = SimConfig::default();
        config.bindings.forward = vec!["KeyI".to_string()];
        let mut fl = frame_loop(config);
        let mut keyboard = KeyboardState::new();
        keyboard.process_event(&InputEvent::KeyDown("ArrowUp".into()));
        fl.update(&keyboard, 0.0);
        assert_eq!(fl.vehicle().speed, 0.0);
        keyboard.process_event(&InputEvent::KeyDown("KeyI".into()));
        assert!(fl.update(&keyboard, 0.016).vehicle.speed > 0.0);
    }

    #[test]
    fn test_output_positions_match_pool() {
        let mut fl = frame_loop(SimConfig::default());
        let out = fl.advance(&InputState::throttle(), 0.016);
        let flat: Vec<f32> = out.particle_positions.to_vec();
        assert_eq!(flat.as_slice(), fl.particles().positions_flat());
    }

    #[test]
    fn test_keyboard_drives_car() {
        let mut fl = frame_loop(SimConfig::default());
        let mut keyboard = KeyboardState::new();
        keyboard.process_event(&InputEvent::KeyDown("ArrowUp".into()));
        keyboard.process_event(&InputEvent::KeyDown("ShiftLeft".into()));
        let mut now = 0.0;
        for _ in 0..60 {
            now += 1.0 / 60.0;
            fl.update(&keyboard, now);
        }
        let car = fl.vehicle();
        assert!(car.boost_active);
        assert!(car.speed > 0.8, "boost should exceed the normal cap, got {}", car.speed);
        assert!(car.z > 0.0);
        assert!(fl.flame().inner_opacity > 0.9);
    }

    #[test]
    fn test_per_frame_mode_steps_once_regardless_of_dt() {
        let mut fl = frame_loop(SimConfig::default());
        for dt in [0.0, 0.001, 0.1] {
            assert_eq!(fl.advance(&InputState::throttle(), dt).physics_steps, 1);
        }
    }

    #[test]
    fn test_fixed_mode_accumulates_ticks() {
        let config = SimConfig { step_mode: StepMode::Fixed { hz: 60.0 }, ..Default::default() };
        let mut fl = frame_loop(config);
        let input = InputState::throttle();
        assert_eq!(fl.advance(&input, 0.01).physics_steps, 0);
        assert_eq!(fl.advance(&input, 0.01).physics_steps, 1);
        assert_eq!(fl.advance(&input, 0.05).physics_steps, 3);
    }

    #[test]
    fn test_fixed_mode_caps_catch_up() {
        let config = SimConfig { step_mode: StepMode::Fixed { hz: 120.0 }, ..Default::default() };
        let mut fl = frame_loop(config);
        let out = fl.advance(&InputState::throttle(), MAX_FRAME_DT);
        assert_eq!(out.physics_steps, MAX_FIXED_STEPS_PER_FRAME);
        assert_eq!(fl.advance(&InputState::idle(), 0.0).physics_steps, 0);
    }

    #[test]
    fn test_grass_sees_previous_position() {
        let mut fl = frame_loop(SimConfig::default());
        let first = fl.advance(&InputState::throttle(), 0.016).vehicle;
        let out = fl.advance(&InputState::throttle(), 0.016);
        assert_eq!(out.grass.player_pos, [first.x, 0.0, first.z]);
        assert!(out.vehicle.z > first.z);
    }

    #[test]
    fn test_output_carries_particle_buffer() {
        let mut fl = frame_loop(SimConfig::default());
        let out = fl.advance(&InputState::idle(), 0.016);
        assert_eq!(out.particle_positions.len(), 3000 * 3);
        assert_eq!(out.alive_particles, 3000);
        assert!((out.time - 0.016).abs() < 1e-7);
        assert_eq!(out.flame_uniform.length_scale, 1.0);
    }

    #[test]
    fn test_camera_trails_car() {
        let config = SimConfig { smoothing: Smoothing::PerStep, ..Default::default() };
        let mut fl = frame_loop(config);
        for _ in 0..400 {
            fl.advance(&InputState::idle(), 0.016);
        }
        // at rest the eye settles at the scaled offset behind the car
        let eye = fl.camera().eye;
        assert!((eye - Vec3::new(0.0, 6.25, -15.0)).length() < 1e-3, "eye {eye}");
        assert_eq!(fl.camera().target, Vec3::ZERO);
    }

    #[test]
    fn test_reset() {
        let mut fl = frame_loop(SimConfig::default());
        for _ in 0..30 {
            fl.advance(&InputState::throttle(), 0.016);
        }
        fl.reset();
        assert_eq!(fl.vehicle().speed, 0.0);
        assert_eq!(fl.vehicle().z, 0.0);
        assert_eq!(fl.rig().wheel_roll, 0.0);
        assert!((fl.camera().eye - Vec3::new(0.0, 6.25, -15.0)).length() < 1e-5);
    }
}
