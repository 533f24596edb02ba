use std::cell::RefCell;
use std::error::Error;
use std::rc::Rc;
use std::sync::Arc;
use std::time::Instant;

use tracing::{error, info, warn};
use winit::{
    application::ApplicationHandler,
    dpi::PhysicalPosition,
    event::{ElementState, KeyEvent, WindowEvent},
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    keyboard::{Key, NamedKey},
    window::{Window, WindowId},
};

// Import from the library crate
use voxel_demo::config::DemoConfig;
use voxel_demo::controller::{AppContext, FrameLoopContext, InputEvent, MouseButton};
use voxel_demo::logging;
use voxel_demo::view::GpuContext;

/// Everything that only exists once the window does
struct Running {
    window: Arc<Window>,
    gpu: GpuContext,
    frame_ctx: FrameLoopContext,
    egui_state: egui_winit::State,
    cursor_pos: PhysicalPosition<f64>,
}

struct App {
    config: DemoConfig,
    started_at: Instant,
    running: Option<Running>,
    init_error: Option<Box<dyn Error>>,
}

impl App {
    fn new(config: DemoConfig) -> Self {
        Self {
            config,
            started_at: Instant::now(),
            running: None,
            init_error: None,
        }
    }

    fn init(&self, event_loop: &ActiveEventLoop) -> Result<Running, Box<dyn Error>> {
        let window_attributes = Window::default_attributes()
            .with_title("Voxel Demo")
            .with_inner_size(winit::dpi::LogicalSize::new(1280, 720));
        let window = Arc::new(event_loop.create_window(window_attributes)?);
        let size = window.inner_size();

        let gpu = pollster::block_on(GpuContext::new_native(window.clone(), size.width, size.height))?;
        info!("GPU ready, surface {:?} {}x{}", gpu.format, gpu.config.width, gpu.config.height);

        let app = Rc::new(RefCell::new(AppContext::new(
            self.config.clone(),
            gpu.config.width,
            gpu.config.height,
        )));
        let egui_ctx = egui::Context::default();
        let egui_state = egui_winit::State::new(
            egui_ctx.clone(),
            egui::ViewportId::ROOT,
            &window,
            None,
            None,
            None,
        );
        let frame_ctx = FrameLoopContext::new(&gpu, app, egui_ctx);

        Ok(Running {
            window,
            gpu,
            frame_ctx,
            egui_state,
            cursor_pos: PhysicalPosition::new(0.0, 0.0),
        })
    }
}

impl Running {
    fn redraw(&mut self, now_ms: f64, event_loop: &ActiveEventLoop) {
        let raw_input = self.egui_state.take_egui_input(&self.window);
        match self.frame_ctx.frame(&self.gpu, raw_input, now_ms) {
            Ok(platform_output) => {
                self.egui_state.handle_platform_output(&self.window, platform_output);
            }
            Err(wgpu::SurfaceError::OutOfMemory) => {
                error!("surface out of memory, exiting");
                event_loop.exit();
            }
            Err(e) => warn!("frame skipped: {e}"),
        }
    }

    fn handle_game_event(&mut self, event: &WindowEvent, egui_consumed: bool) {
        let app = &self.frame_ctx.app;
        match event {
            WindowEvent::KeyboardInput { event: KeyEvent { logical_key, state, .. }, .. } if !egui_consumed => {
                if let Some(key) = key_name(logical_key) {
                    let input = match state {
                        ElementState::Pressed => InputEvent::KeyDown(key),
                        ElementState::Released => InputEvent::KeyUp(key),
                    };
                    app.borrow_mut().handle_event(&input);
                }
            }
            WindowEvent::CursorMoved { position, .. } => {
                self.cursor_pos = *position;
            }
            WindowEvent::MouseInput { state: ElementState::Pressed, button, .. } => {
                if egui_consumed || self.frame_ctx.egui_ctx.is_pointer_over_area() {
                    return;
                }
                let input = InputEvent::MouseDown {
                    button: mouse_button(*button),
                    x: self.cursor_pos.x as f32,
                    y: self.cursor_pos.y as f32,
                };
                app.borrow_mut().handle_event(&input);
            }
            WindowEvent::Focused(false) => {
                app.borrow_mut().handle_event(&InputEvent::FocusLost);
            }
            _ => {}
        }
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.running.is_some() {
            return;
        }
        match self.init(event_loop) {
            Ok(running) => self.running = Some(running),
            Err(e) => {
                error!("startup failed: {e}");
                self.init_error = Some(e);
                event_loop.exit();
            }
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, window_id: WindowId, event: WindowEvent) {
        let now_ms = self.started_at.elapsed().as_secs_f64() * 1000.0;
        let Some(running) = self.running.as_mut() else {
            return;
        };
        if window_id != running.window.id() {
            return;
        }

        let consumed = running.egui_state.on_window_event(&running.window, &event).consumed;

        match event {
            WindowEvent::CloseRequested => event_loop.exit(),
            WindowEvent::Resized(size) => {
                running.frame_ctx.resize(&mut running.gpu, size.width, size.height);
            }
            WindowEvent::RedrawRequested => running.redraw(now_ms, event_loop),
            other => running.handle_game_event(&other, consumed),
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(running) = self.running.as_ref() {
            running.window.request_redraw();
        }
    }
}

/// Same key names the browser reports, lower-cased
fn key_name(key: &Key) -> Option<String> {
    match key {
        Key::Character(c) => Some(c.to_lowercase()),
        Key::Named(NamedKey::Space) => Some(" ".to_string()),
        _ => None,
    }
}

fn mouse_button(button: winit::event::MouseButton) -> MouseButton {
    match button {
        winit::event::MouseButton::Left => MouseButton::Left,
        winit::event::MouseButton::Right => MouseButton::Right,
        winit::event::MouseButton::Middle => MouseButton::Middle,
        winit::event::MouseButton::Back => MouseButton::Other(3),
        winit::event::MouseButton::Forward => MouseButton::Other(4),
        winit::event::MouseButton::Other(n) => MouseButton::Other(n),
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    logging::init();

    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = App::new(DemoConfig::default());
    event_loop.run_app(&mut app)?;

    match app.init_error.take() {
        Some(e) => Err(e),
        None => Ok(()),
    }
}
