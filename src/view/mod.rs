// VIEW: GPU setup and drawing
pub mod render;
pub mod gpu_init;

pub use render::{RenderState, CameraResources};
pub use gpu_init::{GpuContext, GpuInitError};
