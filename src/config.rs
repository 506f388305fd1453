use std::{env, fmt, str::FromStr};

use crate::controller::{CameraTuning, KeyBindings};
use crate::model::{NitroTuning, VehicleTuning};
use crate::utils::time_constant_factor;
use crate::view::RigTuning;

// Runtime knobs live here; handling constants live next to the state they tune.

pub const DEFAULT_SEED: u64 = 0x6e69_7472_6f21;
/// Longest frame the loop will integrate in one go.
pub const MAX_FRAME_DT: f32 = 0.1;
/// Fixed-step catch-up limit per rendered frame.
pub const MAX_FIXED_STEPS_PER_FRAME: u32 = 5;

/// How the frame loop advances the per-step physics.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum StepMode {
    /// One physics step per rendered frame. Motion speed follows frame rate.
    PerFrame,
    /// Physics steps at a fixed rate, independent of frame rate.
    Fixed { hz: f32 },
}

/// How targets (flame opacity, camera position) are approached.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Smoothing {
    /// Constant interpolation factor per step.
    PerStep,
    /// `1 - exp(-dt / tau)`, frame-rate independent.
    TimeConstant { tau: f32 },
}

impl Smoothing {
    /// Interpolation factor for this step, given the per-step default.
    pub fn factor(&self, per_step: f32, dt: f32) -> f32 {
        match *self {
            Smoothing::PerStep => per_step,
            Smoothing::TimeConstant { tau } => time_constant_factor(dt, tau),
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        match *self {
            Smoothing::PerStep => Ok(()),
            Smoothing::TimeConstant { tau } => positive("smoothing.tau", tau),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    ZeroParticleCapacity,
    EmptyRange { name: &'static str, min: f32, max: f32 },
    NotPositive { name: &'static str, value: f32 },
    Negative { name: &'static str, value: f32 },
    NotFinite { name: &'static str },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::ZeroParticleCapacity => write!(f, "particle capacity must be at least 1"),
            ConfigError::EmptyRange { name, min, max } => {
                write!(f, "{name}: range [{min}, {max}) is empty")
            }
            ConfigError::NotPositive { name, value } => {
                write!(f, "{name} must be positive, got {value}")
            }
            ConfigError::Negative { name, value } => {
                write!(f, "{name} must not be negative, got {value}")
            }
            ConfigError::NotFinite { name } => write!(f, "{name} must be finite"),
        }
    }
}

impl std::error::Error for ConfigError {}

#[derive(Debug, Clone, PartialEq)]
pub struct SimConfig {
    pub vehicle: VehicleTuning,
    pub nitro: NitroTuning,
    pub camera: CameraTuning,
    pub rig: RigTuning,
    pub bindings: KeyBindings,
    pub step_mode: StepMode,
    pub smoothing: Smoothing,
    pub seed: u64,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            vehicle: VehicleTuning::default(),
            nitro: NitroTuning::default(),
            camera: CameraTuning::default(),
            rig: RigTuning::default(),
            bindings: KeyBindings::default(),
            step_mode: StepMode::PerFrame,
            smoothing: Smoothing::PerStep,
            seed: DEFAULT_SEED,
        }
    }
}

impl SimConfig {
    /// Defaults overridden by `NITRO_*` environment variables.
    pub fn from_env() -> Self {
        let mut cfg = Self::default();
        if let Some(seed) = env_parse::<u64>("NITRO_SEED") {
            cfg.seed = seed;
        }
        if let Some(capacity) = env_parse::<usize>("NITRO_PARTICLES") {
            cfg.nitro.capacity = capacity;
        }
        if let Some(hz) = env_parse::<f32>("NITRO_FIXED_HZ") {
            cfg.step_mode = StepMode::Fixed { hz };
        }
        if let Some(tau) = env_parse::<f32>("NITRO_SMOOTHING_TAU") {
            cfg.smoothing = Smoothing::TimeConstant { tau };
        }
        if let Some(gated) = env_parse::<bool>("NITRO_EMIT_WHILE_BOOSTING") {
            cfg.nitro.emit_only_while_boosting = gated;
        }
        cfg
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.vehicle.validate()?;
        self.nitro.validate()?;
        finite("camera.follow", self.camera.follow)?;
        positive("camera.fov_y_degrees", self.camera.fov_y_degrees)?;
        positive("rig.model_scale", self.rig.model_scale)?;

        if let StepMode::Fixed { hz } = self.step_mode {
            positive("step_mode.hz", hz)?;
        }
        self.smoothing.validate()
    }
}

fn env_parse<T: FromStr>(key: &str) -> Option<T> {
    let raw = env::var(key).ok()?;
    match raw.trim().parse() {
        Ok(value) => Some(value),
        Err(_) => {
            tracing::warn!(key, value = %raw, "ignoring unparsable environment override");
            None
        }
    }
}

pub(crate) fn finite(name: &'static str, value: f32) -> Result<(), ConfigError> {
    if value.is_finite() { Ok(()) } else { Err(ConfigError::NotFinite { name }) }
}

pub(crate) fn positive(name: &'static str, value: f32) -> Result<(), ConfigError> {
    finite(name, value)?;
    if value > 0.0 { Ok(()) } else { Err(ConfigError::NotPositive { name, value }) }
}

pub(crate) fn non_negative(name: &'static str, value: f32) -> Result<(), ConfigError> {
    finite(name, value)?;
    if value >= 0.0 { Ok(()) } else { Err(ConfigError::Negative { name, value }) }
}

pub(crate) fn range(name: &'static str, min: f32, max: f32) -> Result<(), ConfigError> {
    finite(name, min)?;
    finite(name, max)?;
    if min < max { Ok(()) } else { Err(ConfigError::EmptyRange { name, min, max }) }
}
