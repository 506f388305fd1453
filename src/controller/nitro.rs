use rand::rngs::SmallRng;
use rand::SeedableRng;

use crate::config::{ConfigError, Smoothing};
use crate::model::{FlameIntensity, NitroTuning, ParticlePool, VehicleState};
use crate::utils::{lerp, sanitize_dt};

/// What the renderer needs from one nitro step.
#[derive(Debug, Clone, Copy)]
pub struct EffectState<'a> {
    pub flame: FlameIntensity,
    /// x, y, z per particle in emitter-local space.
    pub positions: &'a [f32],
    pub alive: usize,
}

/// Flame fade plus a single-emitter particle pool behind the car's nozzle.
pub struct NitroEffectSimulator {
    tuning: NitroTuning,
    smoothing: Smoothing,
    flame: FlameIntensity,
    pool: ParticlePool,
    rng: SmallRng,
    was_boosting: bool,
}

impl NitroEffectSimulator {
    pub fn new(tuning: NitroTuning, smoothing: Smoothing, seed: u64) -> Result<Self, ConfigError> {
        tuning.validate()?;
        smoothing.validate()?;
        Ok(Self {
            pool: ParticlePool::new(tuning.capacity),
            tuning,
            smoothing,
            flame: FlameIntensity::default(),
            rng: SmallRng::seed_from_u64(seed),
            was_boosting: false,
        })
    }

    pub fn tuning(&self) -> &NitroTuning {
        &self.tuning
    }

    pub fn flame(&self) -> &FlameIntensity {
        &self.flame
    }

    pub fn pool(&self) -> &ParticlePool {
        &self.pool
    }

    pub fn pool_mut(&mut self) -> &mut ParticlePool {
        &mut self.pool
    }

    /// Advance the flame and every particle slot by `dt` seconds.
    pub fn step(&mut self, vehicle: &VehicleState, dt: f32) -> EffectState<'_> {
        let dt = sanitize_dt(dt);
        let boosting = vehicle.boost_active;
        if boosting != self.was_boosting {
            tracing::debug!(boosting, speed = vehicle.speed, "nitro toggled");
            self.was_boosting = boosting;
        }

        self.update_flame(vehicle, dt);
        let alive = self.update_particles(boosting, dt);

        EffectState {
            flame: self.flame,
            positions: self.pool.positions_flat(),
            alive,
        }
    }

    fn update_flame(&mut self, vehicle: &VehicleState, dt: f32) {
        let t = &self.tuning;
        let (inner, outer, length) = if vehicle.boost_active {
            (t.inner_opacity, t.outer_opacity, 1.0 + vehicle.speed_ratio() * t.stretch)
        } else {
            (0.0, 0.0, 1.0)
        };

        let k = self.smoothing.factor(t.fade, dt);
        self.flame.inner_opacity = lerp(self.flame.inner_opacity, inner, k);
        self.flame.outer_opacity = lerp(self.flame.outer_opacity, outer, k);
        // The length snaps; only the opacities fade
        self.flame.length_scale = length;
    }

    /// Full scan over the arena. Returns the number of live slots afterwards.
    fn update_particles(&mut self, boosting: bool, dt: f32) -> usize {
        let emit = boosting || !self.tuning.emit_only_while_boosting;
        let tuning = &self.tuning;
        let rng = &mut self.rng;
        let (slots, positions) = self.pool.slots_and_positions_mut();

        let mut alive = 0;
        for (p, out) in slots.iter_mut().zip(positions.iter_mut()) {
            let live = if p.is_alive() {
                // Expired slots are refilled on the same step
                p.advance(dt) || emit
            } else {
                emit
            };
            if live && !p.is_alive() {
                p.respawn(tuning, rng);
            }
            if p.is_alive() {
                alive += 1;
            }
            *out = p.position.to_array();
        }
        alive
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DEFAULT_SEED;
    use glam::Vec3;

    fn boosted(speed: f32) -> VehicleState {
        VehicleState {
            speed,
            boost_active: true,
            effective_max_speed: 2.5,
            ..Default::default()
        }
    }

    fn simulator() -> NitroEffectSimulator {
        NitroEffectSimulator::new(NitroTuning::default(), Smoothing::PerStep, DEFAULT_SEED).unwrap()
    }

    #[test]
    fn test_first_step_respawns_every_slot() {
        let mut sim = simulator();
        assert_eq!(sim.pool().alive_count(), 0);
        let effect = sim.step(&VehicleState::at_rest(), 0.016);
        assert_eq!(effect.alive, 3000);
        assert_eq!(effect.positions.len(), 3000 * 3);
    }

    #[test]
    fn test_pool_is_conserved() {
        let mut sim = simulator();
        for i in 0..300 {
            let vehicle = if i % 50 < 25 { boosted(1.0) } else { VehicleState::at_rest() };
            let dt = if i % 7 == 0 { 0.2 } else { 0.016 };
            let alive = sim.step(&vehicle, dt).alive;
            assert_eq!(alive + sim.pool().dead_count(), sim.pool().capacity());
            assert_eq!(sim.pool().capacity(), 3000);
        }
    }

    #[test]
    fn test_expired_slot_respawns_same_step() {
        let mut sim = simulator();
        sim.step(&VehicleState::at_rest(), 0.0);
        {
            let p = sim.pool_mut().get_mut(0).unwrap();
            p.remaining_lifetime = 0.3;
            p.position = Vec3::new(9.0, 9.0, 9.0);
        }
        sim.step(&VehicleState::at_rest(), 0.5);
        let p = sim.pool().particles()[0];
        assert!(p.is_alive(), "slot left dead for a frame");
        assert!((0.5..=1.5).contains(&p.remaining_lifetime));
        assert!(p.position.x.abs() <= 0.05 && p.position.y.abs() <= 0.05);
        assert_eq!(p.position.z, 0.0);
        assert_eq!(sim.pool().positions()[0], p.position.to_array());
    }

    #[test]
    fn test_live_slot_integrates_with_dt() {
        let mut sim = simulator();
        sim.step(&VehicleState::at_rest(), 0.0);
        let before = sim.pool().particles()[5];
        sim.step(&VehicleState::at_rest(), 0.1);
        let after = sim.pool().particles()[5];
        assert_eq!(after.position, before.position + before.velocity * 0.1);
        assert_eq!(after.remaining_lifetime, before.remaining_lifetime - 0.1);
    }

    #[test]
    fn test_negative_dt_is_treated_as_zero() {
        let mut sim = simulator();
        sim.step(&VehicleState::at_rest(), 0.0);
        let before = sim.pool().particles()[3];
        sim.step(&VehicleState::at_rest(), -1.0);
        assert_eq!(sim.pool().particles()[3], before);
    }

    #[test]
    fn test_flame_fades_in_and_out() {
        let mut sim = simulator();
        let flame = sim.step(&boosted(0.0), 0.016).flame;
        assert_eq!(flame.inner_opacity, 0.1);
        assert_eq!(flame.outer_opacity, lerp(0.0, 0.6, 0.1));

        for _ in 0..200 {
            sim.step(&boosted(2.5), 0.016);
        }
        let flame = *sim.flame();
        assert!((flame.inner_opacity - 1.0).abs() < 1e-4);
        assert!((flame.outer_opacity - 0.6).abs() < 1e-4);
        assert!((flame.length_scale - 1.3).abs() < 1e-6);

        let flame = sim.step(&VehicleState::at_rest(), 0.016).flame;
        assert!((flame.inner_opacity - 0.9).abs() < 1e-4);
        assert_eq!(flame.length_scale, 1.0);

        for _ in 0..200 {
            sim.step(&VehicleState::at_rest(), 0.016);
        }
        assert!(!sim.flame().is_visible());
    }

    #[test]
    fn test_length_scale_tracks_speed_ratio() {
        let mut sim = simulator();
        let flame = sim.step(&boosted(1.25), 0.016).flame;
        assert!((flame.length_scale - 1.15).abs() < 1e-6);
    }

    #[test]
    fn test_time_constant_smoothing_ignores_frame_split() {
        let tuning = NitroTuning::default();
        let mut coarse = NitroEffectSimulator::new(tuning, Smoothing::TimeConstant { tau: 0.2 }, 1).unwrap();
        let mut fine = NitroEffectSimulator::new(tuning, Smoothing::TimeConstant { tau: 0.2 }, 1).unwrap();
        coarse.step(&boosted(1.0), 0.1);
        fine.step(&boosted(1.0), 0.05);
        fine.step(&boosted(1.0), 0.05);
        let a = coarse.flame().inner_opacity;
        let b = fine.flame().inner_opacity;
        assert!((a - b).abs() < 1e-5, "{a} vs {b}");
    }

    #[test]
    fn test_gated_emitter_only_spawns_while_boosting() {
        let tuning = NitroTuning { emit_only_while_boosting: true, ..Default::default() };
        let mut sim = NitroEffectSimulator::new(tuning, Smoothing::PerStep, 3).unwrap();
        assert_eq!(sim.step(&VehicleState::at_rest(), 0.016).alive, 0);
        assert_eq!(sim.step(&boosted(1.0), 0.016).alive, 3000);
        // Everything dies within the longest lifetime once boost stops
        for _ in 0..20 {
            sim.step(&VehicleState::at_rest(), 0.1);
        }
        assert_eq!(sim.pool().alive_count(), 0);
    }

    #[test]
    fn test_new_validates_tuning_and_smoothing() {
        let degenerate = NitroTuning { lifetime: (1.0, 1.0), ..Default::default() };
        assert!(matches!(
            NitroEffectSimulator::new(degenerate, Smoothing::PerStep, 1),
            Err(ConfigError::EmptyRange { name: "nitro.lifetime", .. })
        ));
        let bad_tau = Smoothing::TimeConstant { tau: 0.0 };
        assert!(NitroEffectSimulator::new(NitroTuning::default(), bad_tau, 1).is_err());
    }

    #[test]
    fn test_zero_spawn_jitter_steps_cleanly() {
        let tuning = NitroTuning { spawn_jitter: 0.0, ..Default::default() };
        let mut sim = NitroEffectSimulator::new(tuning, Smoothing::PerStep, 1).unwrap();
        let effect = sim.step(&VehicleState::at_rest(), 0.016);
        assert_eq!(effect.alive, 3000);
        assert!(effect.positions.chunks(3).all(|p| p[0] == 0.0 && p[1] == 0.0));
    }

    #[test]
    fn test_same_seed_same_particles() {
        let mut a = simulator();
        let mut b = simulator();
        for _ in 0..30 {
            a.step(&boosted(1.0), 0.05);
            b.step(&boosted(1.0), 0.05);
        }
        assert_eq!(a.pool().positions(), b.pool().positions());
    }
}
