// Re-export all public modules so they can be used from main.rs
pub mod config;
pub mod logging;
pub mod utils;
pub mod ui;

// MVC Architecture
pub mod model;
pub mod view;
pub mod controller;

cfg_if::cfg_if! {
    if #[cfg(target_arch = "wasm32")] {
        use std::cell::RefCell;
        use std::rc::Rc;

        use tracing::{error, info, warn};
        use wasm_bindgen::closure::Closure;
        use wasm_bindgen::{prelude::wasm_bindgen, JsCast, JsValue};
        use web_sys::{Document, Event, HtmlCanvasElement, KeyboardEvent, MouseEvent, Window};

        use config::DemoConfig;
        use controller::input::{wasm as web_input, InputEvent, MouseButton};
        use controller::{AppContext, FrameLoopContext};
        use view::GpuContext;

        type EguiEvents = Rc<RefCell<Vec<egui::Event>>>;

        #[wasm_bindgen(start)]
        pub async fn start() -> Result<(), JsValue> {
            logging::init();
            let (window, document, canvas) = init_canvas()?;
            setup_app(&window, &document, &canvas).await
        }

        /// Main application setup for WASM
        async fn setup_app(
            window: &Window,
            document: &Document,
            canvas: &HtmlCanvasElement,
        ) -> Result<(), JsValue> {
            let (width, height) = (canvas.width(), canvas.height());
            let mut gpu = GpuContext::new(canvas, width, height)
                .await
                .map_err(|e| js_error(format!("GPU init failed: {e}")))?;
            info!("GPU ready, surface {:?} {}x{}", gpu.format, width, height);

            let app = Rc::new(RefCell::new(AppContext::new(DemoConfig::default(), width, height)));
            let egui_ctx = egui::Context::default();
            let egui_events: EguiEvents = Rc::new(RefCell::new(Vec::new()));

            setup_input_listeners(document, window, app.clone(), egui_ctx.clone(), egui_events.clone())?;

            let mut frame_ctx = FrameLoopContext::new(&gpu, app, egui_ctx);

            // Continuous redraw using requestAnimationFrame
            let f = RcCellCallback::new(window.clone(), {
                let window = window.clone();
                let canvas = canvas.clone();

                move || {
                    let dpr = window.device_pixel_ratio() as f32;
                    let size = physical_window_size(&window);
                    if size != frame_ctx.size() && size.0 > 0 && size.1 > 0 {
                        canvas.set_width(size.0);
                        canvas.set_height(size.1);
                        frame_ctx.resize(&mut gpu, size.0, size.1);
                    }

                    let now = window.performance().map(|p| p.now()).unwrap_or(0.0);
                    let raw_input = web_raw_input(frame_ctx.size(), dpr, now, &egui_events);

                    if let Err(e) = frame_ctx.frame(&gpu, raw_input, now) {
                        warn!("frame skipped: {e}");
                    }
                }
            });
            f.start();

            Ok(())
        }

        /// Collect the egui events queued by the DOM listeners into this frame's input
        fn web_raw_input(size: (u32, u32), dpr: f32, now_ms: f64, events: &EguiEvents) -> egui::RawInput {
            let mut raw_input = egui::RawInput {
                screen_rect: Some(egui::Rect::from_min_size(
                    egui::Pos2::ZERO,
                    egui::vec2(size.0 as f32 / dpr, size.1 as f32 / dpr),
                )),
                time: Some(now_ms / 1000.0),
                ..Default::default()
            };
            raw_input
                .viewports
                .entry(egui::ViewportId::ROOT)
                .or_default()
                .native_pixels_per_point = Some(dpr);
            raw_input.events.extend(events.borrow_mut().drain(..));
            raw_input
        }

        fn egui_modifiers(alt: bool, ctrl: bool, shift: bool, meta: bool) -> egui::Modifiers {
            egui::Modifiers {
                alt,
                ctrl,
                shift,
                mac_cmd: meta,
                command: ctrl || meta,
            }
        }

        fn egui_button(button: MouseButton) -> Option<egui::PointerButton> {
            match button {
                MouseButton::Left => Some(egui::PointerButton::Primary),
                MouseButton::Right => Some(egui::PointerButton::Secondary),
                MouseButton::Middle => Some(egui::PointerButton::Middle),
                MouseButton::Other(_) => None,
            }
        }

        /// Forward a DOM key to egui so the start screen's text field works
        fn push_egui_key(events: &EguiEvents, e: &KeyboardEvent, pressed: bool) {
            let key = e.key();
            let modifiers = egui_modifiers(e.alt_key(), e.ctrl_key(), e.shift_key(), e.meta_key());
            let mut events = events.borrow_mut();
            if let Some(egui_key) = egui::Key::from_name(&key) {
                events.push(egui::Event::Key {
                    key: egui_key,
                    physical_key: None,
                    pressed,
                    repeat: e.repeat(),
                    modifiers,
                });
            }
            if pressed && key.chars().count() == 1 && !modifiers.command {
                events.push(egui::Event::Text(key));
            }
        }

        fn push_egui_pointer(events: &EguiEvents, e: &MouseEvent, pressed: bool) {
            let pos = egui::pos2(e.client_x() as f32, e.client_y() as f32);
            let Some(button) = egui_button(MouseButton::from_web_button(e.button())) else {
                return;
            };
            let modifiers = egui_modifiers(e.alt_key(), e.ctrl_key(), e.shift_key(), e.meta_key());
            events.borrow_mut().push(egui::Event::PointerButton { pos, button, pressed, modifiers });
        }

        /// DOM listeners feed both egui and the game
        fn setup_input_listeners(
            document: &Document,
            window: &Window,
            app: Rc<RefCell<AppContext>>,
            egui_ctx: egui::Context,
            egui_events: EguiEvents,
        ) -> Result<(), JsValue> {
            // Keyboard down
            {
                let app = app.clone();
                let egui_events = egui_events.clone();
                let keydown = Closure::wrap(Box::new(move |e: KeyboardEvent| {
                    push_egui_key(&egui_events, &e, true);

                    let mut app = app.borrow_mut();
                    if app.is_started() && app.input_processor().is_game_key(&e.key()) {
                        e.prevent_default();
                    }
                    app.handle_event(&web_input::keyboard_event_to_input(&e, true));
                }) as Box<dyn FnMut(KeyboardEvent)>);
                document.add_event_listener_with_callback("keydown", keydown.as_ref().unchecked_ref())?;
                keydown.forget();
            }

            // Keyboard up
            {
                let app = app.clone();
                let egui_events = egui_events.clone();
                let keyup = Closure::wrap(Box::new(move |e: KeyboardEvent| {
                    push_egui_key(&egui_events, &e, false);
                    app.borrow_mut().handle_event(&web_input::keyboard_event_to_input(&e, false));
                }) as Box<dyn FnMut(KeyboardEvent)>);
                document.add_event_listener_with_callback("keyup", keyup.as_ref().unchecked_ref())?;
                keyup.forget();
            }

            // Focus loss - clear all keys
            {
                let app = app.clone();
                let egui_events = egui_events.clone();
                let blur = Closure::wrap(Box::new(move |_e: Event| {
                    app.borrow_mut().handle_event(&InputEvent::FocusLost);
                    egui_events.borrow_mut().push(egui::Event::WindowFocused(false));
                }) as Box<dyn FnMut(Event)>);
                window.add_event_listener_with_callback("blur", blur.as_ref().unchecked_ref())?;
                blur.forget();
            }

            // Hidden tab never sees the keyup
            {
                let app = app.clone();
                let visibility = Closure::wrap(Box::new(move |_e: Event| {
                    app.borrow_mut().handle_event(&InputEvent::FocusLost);
                }) as Box<dyn FnMut(Event)>);
                document.add_event_listener_with_callback("visibilitychange", visibility.as_ref().unchecked_ref())?;
                visibility.forget();
            }

            // Mouse move
            {
                let egui_events = egui_events.clone();
                let mm = Closure::wrap(Box::new(move |e: MouseEvent| {
                    let pos = egui::pos2(e.client_x() as f32, e.client_y() as f32);
                    egui_events.borrow_mut().push(egui::Event::PointerMoved(pos));
                }) as Box<dyn FnMut(MouseEvent)>);
                document.add_event_listener_with_callback("mousemove", mm.as_ref().unchecked_ref())?;
                mm.forget();
            }

            // Mouse down - place/remove unless the click lands on egui
            {
                let app = app.clone();
                let egui_events = egui_events.clone();
                let window = window.clone();
                let mousedown = Closure::wrap(Box::new(move |e: MouseEvent| {
                    push_egui_pointer(&egui_events, &e, true);
                    if egui_ctx.is_pointer_over_area() || egui_ctx.wants_pointer_input() {
                        return;
                    }

                    // picking works in canvas pixels, DOM reports CSS pixels
                    let dpr = window.device_pixel_ratio() as f32;
                    if let InputEvent::MouseDown { button, x, y } = web_input::mouse_down_to_input(&e) {
                        app.borrow_mut().handle_event(&InputEvent::MouseDown { button, x: x * dpr, y: y * dpr });
                    }
                }) as Box<dyn FnMut(MouseEvent)>);
                document.add_event_listener_with_callback("mousedown", mousedown.as_ref().unchecked_ref())?;
                mousedown.forget();
            }

            // Mouse up
            {
                let egui_events = egui_events.clone();
                let mouseup = Closure::wrap(Box::new(move |e: MouseEvent| {
                    push_egui_pointer(&egui_events, &e, false);
                }) as Box<dyn FnMut(MouseEvent)>);
                document.add_event_listener_with_callback("mouseup", mouseup.as_ref().unchecked_ref())?;
                mouseup.forget();
            }

            // Context menu prevention
            {
                let contextmenu = Closure::wrap(Box::new(move |e: MouseEvent| {
                    e.prevent_default();
                }) as Box<dyn FnMut(MouseEvent)>);
                document.add_event_listener_with_callback("contextmenu", contextmenu.as_ref().unchecked_ref())?;
                contextmenu.forget();
            }

            Ok(())
        }

        /// Window size in device pixels
        fn physical_window_size(window: &Window) -> (u32, u32) {
            let dpr = window.device_pixel_ratio();
            let css = |v: Result<JsValue, JsValue>| v.ok().and_then(|v| v.as_f64()).unwrap_or(0.0);
            let w = css(window.inner_width()) * dpr;
            let h = css(window.inner_height()) * dpr;
            (w.round() as u32, h.round() as u32)
        }

        fn init_canvas() -> Result<(Window, Document, HtmlCanvasElement), JsValue> {
            let window = web_sys::window().ok_or(js_error("no global `window`"))?;
            let document = window.document().ok_or(js_error("no document on window"))?;
            let body = document.body().ok_or(js_error("no body on document"))?;
            let canvas_el = document
                .create_element("canvas")?
                .dyn_into::<HtmlCanvasElement>()
                .map_err(|_| js_error("failed to create canvas"))?;

            let (width, height) = physical_window_size(&window);
            canvas_el.set_width(width.max(1));
            canvas_el.set_height(height.max(1));
            canvas_el.set_attribute("style", "display:block;width:100vw;height:100vh")?;
            body.append_child(&canvas_el)?;
            Ok((window, document, canvas_el))
        }

        fn js_error<E: Into<String>>(msg: E) -> JsValue {
            JsValue::from_str(&msg.into())
        }

        struct RcCellCallback {
            inner: Rc<RefCell<Box<dyn FnMut()>>>,
            window: Window,
        }

        impl RcCellCallback {
            fn new(window: Window, f: impl FnMut() + 'static) -> Self {
                Self {
                    inner: Rc::new(RefCell::new(Box::new(f))),
                    window,
                }
            }

            fn start(self) {
                let inner = self.inner.clone();
                let window = self.window.clone();

                let callback = Rc::new(RefCell::new(None::<Closure<dyn FnMut()>>));
                let callback_clone = callback.clone();

                *callback.borrow_mut() = Some(Closure::wrap(Box::new(move || {
                    inner.borrow_mut().as_mut()();

                    // Schedule next frame
                    if let Some(cb) = callback_clone.borrow().as_ref() {
                        if let Err(e) = window.request_animation_frame(cb.as_ref().unchecked_ref()) {
                            error!("requestAnimationFrame failed: {e:?}");
                        }
                    }
                }) as Box<dyn FnMut()>));

                if let Some(cb) = callback.borrow().as_ref() {
                    if let Err(e) = self.window.request_animation_frame(cb.as_ref().unchecked_ref()) {
                        error!("requestAnimationFrame failed to start: {e:?}");
                    }
                }

                // Leak the closure to keep it alive
                std::mem::forget(callback);
            }
        }
    }
}
