// CONTROLLER: Input, simulation steps, and update loop
pub mod input;
pub mod physics;
pub mod nitro;
pub mod camera_controller;
pub mod frame_loop;

pub use input::{InputEvent, InputProcessor, InputState, KeyBindings, KeyboardState};
pub use physics::VehiclePhysics;
pub use nitro::{EffectState, NitroEffectSimulator};
pub use camera_controller::{CameraController, CameraTuning};
pub use frame_loop::{FrameLoop, FrameOutput};
