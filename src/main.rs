//! Headless driver: runs a scripted lap at a fixed 60 fps clock and logs the
//! trajectory. Useful for checking handling changes without a browser.

use std::process::ExitCode;

use nitro_drive::{logging, FrameLoop, InputEvent, KeyboardState, SimConfig};

const FRAME_SECONDS: f64 = 1.0 / 60.0;
const LOG_EVERY: u64 = 30;

/// (frames, keys held)
const SCRIPT: &[(u32, &[&str])] = &[
    (90, &["ArrowUp"]),
    (120, &["ArrowUp", "ShiftLeft"]),
    (60, &["ArrowUp", "ShiftLeft", "ArrowLeft"]),
    (45, &["ArrowUp", "ArrowRight"]),
    (40, &["Space"]),
    (60, &["ArrowDown"]),
    (90, &[]),
];

fn main() -> ExitCode {
    logging::init();

    let config = SimConfig::from_env();
    let mut frame_loop = match FrameLoop::new(config, 1280, 720) {
        Ok(frame_loop) => frame_loop,
        Err(e) => {
            tracing::error!("invalid configuration: {e}");
            return ExitCode::FAILURE;
        }
    };

    let mut keyboard = KeyboardState::new();
    let mut now = 0.0;
    let mut frame: u64 = 0;
    let _span = tracing::info_span!("scripted_drive").entered();

    for (phase, &(frames, keys)) in SCRIPT.iter().enumerate() {
        keyboard.process_event(&InputEvent::FocusLost);
        for key in keys {
            keyboard.process_event(&InputEvent::KeyDown(key.to_string()));
        }
        tracing::info!(phase, ?keys, frames, "phase start");

        for _ in 0..frames {
            now += FRAME_SECONDS;
            frame += 1;
            let out = frame_loop.update(&keyboard, now);
            if frame % LOG_EVERY == 0 {
                let v = out.vehicle;
                tracing::info!(
                    frame,
                    x = v.x,
                    z = v.z,
                    heading = v.heading,
                    speed = v.speed,
                    steer = v.steering_angle,
                    boost = v.boost_active,
                    flame = out.flame.inner_opacity,
                    particles = out.alive_particles,
                    "tick"
                );
            }
        }
    }

    let v = frame_loop.vehicle();
    tracing::info!(
        frames = frame_loop.frames(),
        elapsed_s = frame_loop.elapsed(),
        x = v.x,
        z = v.z,
        heading = v.heading,
        "drive finished"
    );
    ExitCode::SUCCESS
}
