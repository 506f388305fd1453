// Re-export all public modules so they can be used from main.rs
pub mod config;
pub mod logging;
pub mod utils;

// MVC Architecture
pub mod model;
pub mod view;
pub mod controller;

pub use config::{ConfigError, SimConfig, Smoothing, StepMode};
pub use controller::{FrameLoop, FrameOutput, InputEvent, InputState, KeyboardState};

#[cfg(target_arch = "wasm32")]
pub use web::NitroDrive;

/// Browser host. The page's three.js scene polls this handle once per
/// animation frame and copies the outputs onto its meshes and buffers.
#[cfg(target_arch = "wasm32")]
mod web {
    use std::cell::RefCell;
    use std::rc::Rc;

    use wasm_bindgen::closure::Closure;
    use wasm_bindgen::{prelude::wasm_bindgen, JsCast, JsValue};
    use web_sys::{Event, KeyboardEvent};

    use crate::config::SimConfig;
    use crate::controller::input::wasm::keyboard_event_to_input;
    use crate::controller::{FrameLoop, InputEvent, KeyboardState};
    use crate::logging;

    #[wasm_bindgen(start)]
    pub fn start() {
        logging::init();
    }

    #[wasm_bindgen]
    pub struct NitroDrive {
        frame_loop: FrameLoop,
        keyboard: Rc<RefCell<KeyboardState>>,
    }

    impl NitroDrive {
        fn with_config(config: SimConfig, width: u32, height: u32) -> Result<NitroDrive, JsValue> {
            let frame_loop = FrameLoop::new(config, width, height)
                .map_err(|e| js_error(format!("invalid simulation config: {e}")))?;
            Ok(Self {
                frame_loop,
                keyboard: Rc::new(RefCell::new(KeyboardState::new())),
            })
        }
    }

    #[wasm_bindgen]
    impl NitroDrive {
        #[wasm_bindgen(constructor)]
        pub fn new(width: u32, height: u32) -> Result<NitroDrive, JsValue> {
            Self::with_config(SimConfig::default(), width, height)
        }

        #[wasm_bindgen(js_name = withSeed)]
        pub fn with_seed(width: u32, height: u32, seed: u64) -> Result<NitroDrive, JsValue> {
            Self::with_config(SimConfig { seed, ..SimConfig::default() }, width, height)
        }

        /// Install keydown/keyup/blur/visibilitychange listeners on the page.
        #[wasm_bindgen(js_name = attachKeyboard)]
        pub fn attach_keyboard(&self) -> Result<(), JsValue> {
            let window = web_sys::window().ok_or_else(|| js_error("no global `window`"))?;
            let document = window.document().ok_or_else(|| js_error("no document on window"))?;
            let processor = self.frame_loop.input_processor().clone();

            for (kind, is_down) in [("keydown", true), ("keyup", false)] {
                let keyboard = self.keyboard.clone();
                let processor = processor.clone();
                let handler = Closure::wrap(Box::new(move |e: KeyboardEvent| {
                    if processor.is_driving_key(&e.code()) {
                        e.prevent_default();
                    }
                    keyboard.borrow_mut().process_event(&keyboard_event_to_input(&e, is_down));
                }) as Box<dyn FnMut(KeyboardEvent)>);
                document.add_event_listener_with_callback(kind, handler.as_ref().unchecked_ref())?;
                handler.forget();
            }

            {
                let keyboard = self.keyboard.clone();
                let blur = Closure::wrap(Box::new(move |_e: Event| {
                    keyboard.borrow_mut().process_event(&InputEvent::FocusLost);
                }) as Box<dyn FnMut(Event)>);
                window.add_event_listener_with_callback("blur", blur.as_ref().unchecked_ref())?;
                blur.forget();
            }

            {
                let keyboard = self.keyboard.clone();
                let doc = document.clone();
                let visibility = Closure::wrap(Box::new(move |_e: Event| {
                    let visible = !doc.hidden();
                    keyboard
                        .borrow_mut()
                        .process_event(&InputEvent::VisibilityChanged { visible });
                }) as Box<dyn FnMut(Event)>);
                document.add_event_listener_with_callback(
                    "visibilitychange",
                    visibility.as_ref().unchecked_ref(),
                )?;
                visibility.forget();
            }

            tracing::info!("keyboard listeners attached");
            Ok(())
        }

        #[wasm_bindgen(js_name = keyDown)]
        pub fn key_down(&self, code: String) {
            self.keyboard.borrow_mut().process_event(&InputEvent::KeyDown(code));
        }

        #[wasm_bindgen(js_name = keyUp)]
        pub fn key_up(&self, code: String) {
            self.keyboard.borrow_mut().process_event(&InputEvent::KeyUp(code));
        }

        pub fn blur(&self) {
            self.keyboard.borrow_mut().process_event(&InputEvent::FocusLost);
        }

        pub fn resize(&mut self, width: u32, height: u32) {
            self.frame_loop.resize(width, height);
        }

        pub fn reset(&mut self) {
            self.frame_loop.reset();
        }

        /// Advance one frame using a `performance.now()` timestamp.
        pub fn tick(&mut self, now_ms: f64) {
            let keyboard = self.keyboard.borrow();
            self.frame_loop.update(&keyboard, now_ms / 1000.0);
        }

        /// Advance one frame reading the clock from `window.performance`.
        #[wasm_bindgen(js_name = tickNow)]
        pub fn tick_now(&mut self) {
            let now = web_sys::window()
                .and_then(|w| w.performance())
                .map(|p| p.now())
                .unwrap_or(0.0);
            self.tick(now);
        }

        #[wasm_bindgen(getter)]
        pub fn x(&self) -> f32 {
            self.frame_loop.vehicle().x
        }

        #[wasm_bindgen(getter)]
        pub fn z(&self) -> f32 {
            self.frame_loop.vehicle().z
        }

        #[wasm_bindgen(getter)]
        pub fn heading(&self) -> f32 {
            self.frame_loop.vehicle().heading
        }

        #[wasm_bindgen(getter)]
        pub fn speed(&self) -> f32 {
            self.frame_loop.vehicle().speed
        }

        #[wasm_bindgen(getter, js_name = steeringAngle)]
        pub fn steering_angle(&self) -> f32 {
            self.frame_loop.vehicle().steering_angle
        }

        #[wasm_bindgen(getter, js_name = boostActive)]
        pub fn boost_active(&self) -> bool {
            self.frame_loop.vehicle().boost_active
        }

        #[wasm_bindgen(getter, js_name = innerOpacity)]
        pub fn inner_opacity(&self) -> f32 {
            self.frame_loop.flame().inner_opacity
        }

        #[wasm_bindgen(getter, js_name = outerOpacity)]
        pub fn outer_opacity(&self) -> f32 {
            self.frame_loop.flame().outer_opacity
        }

        #[wasm_bindgen(getter, js_name = flameLength)]
        pub fn flame_length(&self) -> f32 {
            self.frame_loop.flame().length_scale
        }

        #[wasm_bindgen(getter, js_name = wheelRoll)]
        pub fn wheel_roll(&self) -> f32 {
            self.frame_loop.rig().wheel_roll
        }

        #[wasm_bindgen(getter, js_name = frontHubYaw)]
        pub fn front_hub_yaw(&self) -> f32 {
            self.frame_loop.rig().front_hub_yaw
        }

        #[wasm_bindgen(getter, js_name = steeringWheelRoll)]
        pub fn steering_wheel_roll(&self) -> f32 {
            self.frame_loop.rig().steering_wheel_roll
        }

        #[wasm_bindgen(getter)]
        pub fn time(&self) -> f32 {
            self.frame_loop.elapsed()
        }

        /// Column-major car world matrix.
        #[wasm_bindgen(js_name = carMatrix)]
        pub fn car_matrix(&self) -> Vec<f32> {
            self.frame_loop.rig().transform.to_cols_array().to_vec()
        }

        #[wasm_bindgen(js_name = cameraEye)]
        pub fn camera_eye(&self) -> Vec<f32> {
            self.frame_loop.camera().eye.to_array().to_vec()
        }

        #[wasm_bindgen(js_name = cameraTarget)]
        pub fn camera_target(&self) -> Vec<f32> {
            self.frame_loop.camera().target.to_array().to_vec()
        }

        #[wasm_bindgen(getter, js_name = particleCount)]
        pub fn particle_count(&self) -> usize {
            self.frame_loop.particles().capacity()
        }

        /// Copy of the particle positions, 3 floats per particle. Each call
        /// allocates a fresh JS array; the simulation's own buffer is fixed.
        /// Call once per frame, after `tick`.
        #[wasm_bindgen(js_name = particlePositions)]
        pub fn particle_positions(&self) -> js_sys::Float32Array {
            js_sys::Float32Array::from(self.frame_loop.particles().positions_flat())
        }
    }

    fn js_error<E: Into<String>>(msg: E) -> JsValue {
        JsValue::from_str(&msg.into())
    }
}
