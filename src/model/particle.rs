use glam::Vec3;
use rand::Rng;

use crate::config::{finite, non_negative, positive, range, ConfigError};

pub const DEFAULT_PARTICLE_CAPACITY: usize = 3000;

/// Emitter shape and flame targets for the nitro effect.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NitroTuning {
    pub capacity: usize,
    /// Half extent of the spawn square around the nozzle (x/y). Zero spawns
    /// every particle on the nozzle axis.
    pub spawn_jitter: f32,
    /// Half extent of the lateral/vertical velocity jitter. Zero disables it.
    pub velocity_jitter: f32,
    /// Backward speed range; the z velocity is the negated sample.
    pub backward_speed: (f32, f32),
    pub lifetime: (f32, f32),
    pub inner_opacity: f32,
    pub outer_opacity: f32,
    /// Extra flame length at full speed, as a fraction of the base length.
    pub stretch: f32,
    /// Per-step interpolation factor for the flame opacities.
    pub fade: f32,
    /// Only respawn dead slots on boosted steps.
    pub emit_only_while_boosting: bool,
}

impl Default for NitroTuning {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_PARTICLE_CAPACITY,
            spawn_jitter: 0.05,
            velocity_jitter: 0.1,
            backward_speed: (0.5, 1.5),
            lifetime: (0.5, 1.5),
            inner_opacity: 1.0,
            outer_opacity: 0.6,
            stretch: 0.3,
            fade: 0.1,
            emit_only_while_boosting: false,
        }
    }
}

impl NitroTuning {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.capacity == 0 {
            return Err(ConfigError::ZeroParticleCapacity);
        }
        non_negative("nitro.spawn_jitter", self.spawn_jitter)?;
        non_negative("nitro.velocity_jitter", self.velocity_jitter)?;
        range("nitro.backward_speed", self.backward_speed.0, self.backward_speed.1)?;
        range("nitro.lifetime", self.lifetime.0, self.lifetime.1)?;
        // A fresh particle has to be alive
        positive("nitro.lifetime", self.lifetime.0)?;
        for (name, value) in [
            ("nitro.inner_opacity", self.inner_opacity),
            ("nitro.outer_opacity", self.outer_opacity),
            ("nitro.stretch", self.stretch),
            ("nitro.fade", self.fade),
        ] {
            finite(name, value)?;
        }
        Ok(())
    }
}

/// Uniform sample in `(-half, half)`, or exactly zero when the extent is zero.
fn jitter<R: Rng + ?Sized>(rng: &mut R, half: f32) -> f32 {
    if half > 0.0 { rng.gen_range(-half..half) } else { 0.0 }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Particle {
    pub position: Vec3,
    pub velocity: Vec3,
    /// Seconds left. `<= 0` marks the slot as free.
    pub remaining_lifetime: f32,
}

impl Particle {
    pub fn is_alive(&self) -> bool {
        self.remaining_lifetime > 0.0
    }

    /// Reset the slot at the nozzle with fresh random velocity and lifetime.
    pub fn respawn<R: Rng + ?Sized>(&mut self, tuning: &NitroTuning, rng: &mut R) {
        let j = tuning.spawn_jitter;
        let v = tuning.velocity_jitter;
        self.position = Vec3::new(jitter(rng, j), jitter(rng, j), 0.0);
        self.velocity = Vec3::new(
            jitter(rng, v),
            jitter(rng, v),
            -rng.gen_range(tuning.backward_speed.0..tuning.backward_speed.1),
        );
        self.remaining_lifetime = rng.gen_range(tuning.lifetime.0..tuning.lifetime.1);
    }

    /// Explicit Euler step. Returns whether the particle is still alive.
    pub fn advance(&mut self, dt: f32) -> bool {
        self.position += self.velocity * dt;
        self.remaining_lifetime -= dt;
        self.is_alive()
    }
}

/// Fixed-capacity particle arena plus the flat position buffer handed to the
/// renderer. Both are allocated once and never resized.
pub struct ParticlePool {
    slots: Box<[Particle]>,
    positions: Box<[[f32; 3]]>,
}

impl ParticlePool {
    pub fn new(capacity: usize) -> Self {
        Self {
            slots: vec![Particle::default(); capacity].into_boxed_slice(),
            positions: vec![[0.0; 3]; capacity].into_boxed_slice(),
        }
    }

    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    pub fn alive_count(&self) -> usize {
        self.slots.iter().filter(|p| p.is_alive()).count()
    }

    pub fn dead_count(&self) -> usize {
        self.capacity() - self.alive_count()
    }

    pub fn particles(&self) -> &[Particle] {
        &self.slots
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut Particle> {
        self.slots.get_mut(index)
    }

    /// Slots and the position buffer, split for a single pass.
    pub(crate) fn slots_and_positions_mut(&mut self) -> (&mut [Particle], &mut [[f32; 3]]) {
        (&mut self.slots, &mut self.positions)
    }

    /// Positions as x, y, z triples in slot order.
    pub fn positions(&self) -> &[[f32; 3]] {
        &self.positions
    }

    pub fn positions_flat(&self) -> &[f32] {
        bytemuck::cast_slice(&self.positions)
    }
}
