// VIEW: what the external renderer consumes each frame
pub mod rig;
pub mod uniforms;

pub use rig::{CarRig, RigTuning};
pub use uniforms::{CameraUniform, FlameUniform, GrassUniform, TransformUniform};
