// CONTROLLER: Input, game logic, and update loop
pub mod input;
pub mod physics;
pub mod avatar_controller;
pub mod camera_controller;
pub mod picking;
pub mod app_context;
pub mod frame_loop;

pub use input::{InputEvent, InputState, InputProcessor, KeyBindings, MouseButton, MovementIntent};
pub use physics::PhysicsSystem;
pub use avatar_controller::AvatarController;
pub use camera_controller::CameraController;
pub use picking::{Pick, PickOutcome, PickTarget};
pub use app_context::AppContext;
pub use frame_loop::{FrameLoopContext, FpsCounter, CameraUniform, LightingUniform};
