// MODEL: plain simulation state
pub mod vehicle;
pub mod particle;
pub mod flame;
pub mod camera;

pub use vehicle::{VehicleState, VehicleTuning};
pub use particle::{NitroTuning, Particle, ParticlePool, DEFAULT_PARTICLE_CAPACITY};
pub use flame::FlameIntensity;
pub use camera::Camera;
