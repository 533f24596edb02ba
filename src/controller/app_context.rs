use tracing::{debug, info};

use super::avatar_controller::AvatarController;
use super::camera_controller::CameraController;
use super::input::{InputEvent, InputProcessor, InputState, MouseButton};
use super::picking::{self, PickOutcome};
use crate::config::DemoConfig;
use crate::model::{Avatar, Camera, World};
use crate::ui::StartScreen;

/// Everything the demo knows about, in one place. Built once at startup and
/// kept for the lifetime of the page/window.
pub struct AppContext {
    pub config: DemoConfig,
    pub camera: Camera,
    pub world: World,
    pub avatar: Option<Avatar>,
    pub input: InputState,
    /// Present until the player presses Start
    pub start_screen: Option<StartScreen>,

    avatar_controller: AvatarController,
    camera_controller: CameraController,
    input_processor: InputProcessor,
    viewport: (u32, u32),
}

impl AppContext {
    pub fn new(config: DemoConfig, width: u32, height: u32) -> Self {
        Self {
            camera: Camera::new(width, height, &config.camera),
            world: World::new(&config.world),
            avatar: None,
            input: InputState::new(),
            start_screen: Some(StartScreen::new(&config.default_username)),
            avatar_controller: AvatarController::new(&config.avatar),
            camera_controller: CameraController::new(&config.camera),
            input_processor: InputProcessor::default(),
            viewport: (width.max(1), height.max(1)),
            config,
        }
    }

    pub fn is_started(&self) -> bool {
        self.avatar.is_some()
    }

    pub fn viewport(&self) -> (u32, u32) {
        self.viewport
    }

    pub fn input_processor(&self) -> &InputProcessor {
        &self.input_processor
    }

    /// Leave the start screen and spawn the avatar. An empty name falls back
    /// to the configured default. Calling it again is a no-op.
    pub fn start_game(&mut self, name_input: &str) {
        if self.is_started() {
            return;
        }
        let name = if name_input.is_empty() {
            self.config.default_username.as_str()
        } else {
            name_input
        };
        info!("starting game as {name:?}");
        self.avatar = Some(Avatar::new(name, &self.config.avatar));
        self.start_screen = None;
    }

    pub fn set_username(&mut self, name: &str) {
        if let Some(avatar) = self.avatar.as_mut() {
            info!("renaming {:?} to {name:?}", avatar.name());
            avatar.set_username(name);
        }
    }

    /// Apply one discrete event. Game input only counts once the avatar exists.
    pub fn handle_event(&mut self, event: &InputEvent) -> Option<PickOutcome> {
        match event {
            InputEvent::Resized { width, height } => {
                self.resize(*width, *height);
                None
            }
            InputEvent::MouseDown { button, x, y } => self.pointer_down(*button, *x, *y),
            InputEvent::KeyDown(_) | InputEvent::KeyUp(_) if !self.is_started() => None,
            _ => {
                self.input.process_event(event);
                None
            }
        }
    }

    /// Pick against the world; `None` before the game has started
    pub fn pointer_down(&mut self, button: MouseButton, x: f32, y: f32) -> Option<PickOutcome> {
        if !self.is_started() {
            return None;
        }
        let outcome =
            picking::pick_from_pixel(&mut self.world, &self.camera, button, x, y, self.viewport);
        match outcome {
            PickOutcome::Placed { id, cell } => {
                debug!("placed block {id:?} at {cell}, {} total", self.world.len())
            }
            PickOutcome::Removed { id } => {
                debug!("removed block {id:?}, {} left", self.world.len())
            }
            _ => {}
        }
        Some(outcome)
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }
        debug!("viewport resized to {width}x{height}");
        self.viewport = (width, height);
        self.camera.set_aspect(width, height);
    }

    /// Per-frame simulation: avatar step, then camera follow
    pub fn tick(&mut self) {
        let Some(avatar) = self.avatar.as_mut() else {
            return;
        };
        let intent = self.input_processor.movement(&self.input);
        self.avatar_controller.update(avatar, &intent, self.camera.eye);
        self.camera_controller.follow(&mut self.camera, avatar.position);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::{IVec3, Vec3};

    fn app() -> AppContext {
        AppContext::new(DemoConfig::default(), 800, 600)
    }

    fn key_down(app: &mut AppContext, key: &str) {
        app.handle_event(&InputEvent::KeyDown(key.to_string()));
    }

    #[test]
    fn test_empty_name_falls_back() {
        let mut app = app();
        assert!(app.start_screen.is_some());
        app.start_game("");
        assert_eq!(app.avatar.as_ref().unwrap().name(), "Player");
        assert!(app.start_screen.is_none());
    }

    #[test]
    fn test_start_only_once() {
        let mut app = app();
        app.start_game("Alex");
        app.start_game("Sam");
        assert_eq!(app.avatar.as_ref().unwrap().name(), "Alex");
    }

    #[test]
    fn test_input_ignored_before_start() {
        let mut app = app();
        key_down(&mut app, "d");
        assert!(app.input.pressed_keys.is_empty());

        let outcome = app.handle_event(&InputEvent::MouseDown {
            button: MouseButton::Left,
            x: 400.0,
            y: 300.0,
        });
        assert_eq!(outcome, None);
        assert!(app.world.is_empty());

        app.tick();
        assert!(app.avatar.is_none());
    }

    #[test]
    fn test_tick_moves_avatar_and_camera() {
        let mut app = app();
        app.start_game("Alex");
        key_down(&mut app, "D");
        let eye_before = app.camera.eye;

        for _ in 0..10 {
            app.tick();
        }

        let pos = app.avatar.as_ref().unwrap().position;
        assert!((pos.x - 1.5).abs() < 1e-4);
        assert_eq!(app.camera.target, pos);
        assert!(app.camera.eye.x > eye_before.x);

        app.handle_event(&InputEvent::KeyUp("d".to_string()));
        app.tick();
        assert!((app.avatar.as_ref().unwrap().position.x - 1.5).abs() < 1e-4);
    }

    #[test]
    fn test_click_places_then_removes() {
        let mut app = app();
        app.start_game("Alex");
        // camera sits at (0, 5, 10) looking at the origin before any tick
        let place = app.pointer_down(MouseButton::Left, 400.0, 300.0);
        assert!(matches!(place, Some(PickOutcome::Placed { cell, .. }) if cell == IVec3::ZERO));
        assert_eq!(app.world.len(), 1);

        let remove = app.pointer_down(MouseButton::Right, 400.0, 300.0);
        assert!(matches!(remove, Some(PickOutcome::Removed { .. })));
        assert!(app.world.is_empty());
    }

    #[test]
    fn test_resize_updates_aspect() {
        let mut app = app();
        app.handle_event(&InputEvent::Resized { width: 1000, height: 500 });
        assert_eq!(app.viewport(), (1000, 500));
        assert!((app.camera.aspect - 2.0).abs() < 1e-6);

        app.resize(0, 300);
        assert_eq!(app.viewport(), (1000, 500));
    }

    #[test]
    fn test_rename_swaps_label() {
        let mut app = app();
        app.start_game("Player");
        let old = app.avatar.as_ref().unwrap().label().id;
        app.set_username("Alex");
        let avatar = app.avatar.as_ref().unwrap();
        assert_eq!(avatar.label().text, "Alex");
        assert!(avatar.label().id != old);
        assert_eq!(avatar.position, Vec3::ZERO);
    }
}
