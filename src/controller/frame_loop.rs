use std::cell::RefCell;
use std::rc::Rc;

use glam::Vec3;
use tracing::trace;

use super::app_context::AppContext;
use crate::config::SceneConfig;
use crate::model::scene::collect_instances;
use crate::ui;
use crate::utils::{self, InstanceRaw};
use crate::view::render::{self, RenderState};
use crate::view::GpuContext;

#[repr(C)]
#[derive(Clone, Copy, bytemuck::Pod, bytemuck::Zeroable)]
pub struct CameraUniform {
    pub view_proj: [[f32; 4]; 4],
}

#[repr(C)]
#[derive(Clone, Copy, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct LightingUniform {
    pub sun_dir: [f32; 3],
    pub sun_intensity: f32,
    pub ambient: f32,
    pub _pad1: f32,
    pub _pad2: f32,
    pub _pad3: f32,
}

impl LightingUniform {
    /// Directional sun shining from `sun_position` towards the origin
    pub fn from_scene(scene: &SceneConfig) -> Self {
        let sun_dir = scene.sun_position.try_normalize().unwrap_or(Vec3::Y);
        Self {
            sun_dir: sun_dir.to_array(),
            sun_intensity: scene.sun_intensity,
            ambient: scene.ambient,
            _pad1: 0.0,
            _pad2: 0.0,
            _pad3: 0.0,
        }
    }
}

/// Frames per second averaged over roughly one second of wall time
#[derive(Debug, Default)]
pub struct FpsCounter {
    last_ms: Option<f64>,
    window_ms: f64,
    frames: u32,
    fps: f32,
}

impl FpsCounter {
    pub fn tick(&mut self, now_ms: f64) -> f32 {
        if let Some(last) = self.last_ms {
            self.window_ms += (now_ms - last).max(0.0);
            self.frames += 1;
            if self.window_ms >= 1000.0 {
                self.fps = (self.frames as f64 * 1000.0 / self.window_ms) as f32;
                self.frames = 0;
                self.window_ms = 0.0;
            }
        }
        self.last_ms = Some(now_ms);
        self.fps
    }
}

/// Owns the GPU-side state of the demo and drives one frame at a time.
/// The same loop body serves requestAnimationFrame and winit redraws.
pub struct FrameLoopContext {
    pub app: Rc<RefCell<AppContext>>,
    pub egui_ctx: egui::Context,
    pub render_state: RenderState,
    camera_buffer: wgpu::Buffer,
    camera_data: CameraUniform,
    fps: FpsCounter,
}

impl FrameLoopContext {
    pub fn new(gpu: &GpuContext, app: Rc<RefCell<AppContext>>, egui_ctx: egui::Context) -> Self {
        let device = gpu.device.as_ref();
        let width = gpu.config.width;
        let height = gpu.config.height;

        let camera_resources = render::create_camera_resources(device);
        let (camera_data, lighting, clear_color) = {
            let app = app.borrow();
            let sky = app.config.scene.sky_color;
            (
                CameraUniform { view_proj: app.camera.view_proj().to_cols_array_2d() },
                LightingUniform::from_scene(&app.config.scene),
                wgpu::Color { r: sky[0] as f64, g: sky[1] as f64, b: sky[2] as f64, a: 1.0 },
            )
        };
        gpu.queue.write_buffer(&camera_resources.camera_buffer, 0, bytemuck::bytes_of(&camera_data));
        gpu.queue.write_buffer(&camera_resources.lighting_buffer, 0, bytemuck::bytes_of(&lighting));

        let pipeline = render::create_cube_pipeline(device, gpu.format, &camera_resources.bind_group_layout);
        let (_, depth_view) = render::create_depth_texture(device, width, height);
        let instance_capacity = 64;

        let render_state = RenderState {
            format: gpu.format,
            alpha_mode: gpu.config.alpha_mode,
            width,
            height,
            depth_view,
            clear_color,
            pipeline,
            camera_bind_group: camera_resources.camera_bind_group,
            cube_mesh: utils::create_cube_mesh().upload(device),
            instance_buffer: render::create_instance_buffer(device, instance_capacity),
            instance_capacity,
            egui_renderer: egui_wgpu::Renderer::new(device, gpu.format, egui_wgpu::RendererOptions::default()),
            egui_primitives: None,
            egui_textures: None,
            egui_dpr: 1.0,
        };

        Self {
            app,
            egui_ctx,
            render_state,
            camera_buffer: camera_resources.camera_buffer,
            camera_data,
            fps: FpsCounter::default(),
        }
    }

    /// Simulate, lay out the UI and draw. `raw_input` carries the egui
    /// events gathered since the previous frame.
    pub fn frame(
        &mut self,
        gpu: &GpuContext,
        raw_input: egui::RawInput,
        now_ms: f64,
    ) -> Result<egui::PlatformOutput, wgpu::SurfaceError> {
        let fps = self.fps.tick(now_ms);

        let (full_output, instances) = {
            let mut app = self.app.borrow_mut();
            app.tick();

            let full_output = ui::build_ui(&self.egui_ctx, raw_input, &mut app, fps);

            self.camera_data.view_proj = app.camera.view_proj().to_cols_array_2d();
            let instances: Vec<InstanceRaw> = collect_instances(&app.world, app.avatar.as_ref())
                .iter()
                .map(InstanceRaw::from)
                .collect();
            (full_output, instances)
        };
        gpu.queue.write_buffer(&self.camera_buffer, 0, bytemuck::bytes_of(&self.camera_data));
        trace!("drawing {} cube instances", instances.len());

        let egui::FullOutput { platform_output, textures_delta, shapes, pixels_per_point, .. } = full_output;
        self.render_state.egui_primitives = Some(self.egui_ctx.tessellate(shapes, pixels_per_point));
        self.render_state.egui_textures = Some(textures_delta);
        self.render_state.egui_dpr = pixels_per_point;

        self.render_state.draw_frame(gpu.device.as_ref(), gpu.queue.as_ref(), &gpu.surface, &instances)?;
        Ok(platform_output)
    }

    /// Follow a new canvas/window size through swap chain, depth buffer and camera
    pub fn resize(&mut self, gpu: &mut GpuContext, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }
        gpu.resize(width, height);
        self.render_state.resize(gpu.device.as_ref(), width, height);
        self.app.borrow_mut().resize(width, height);
    }

    pub fn size(&self) -> (u32, u32) {
        (self.render_state.width, self.render_state.height)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uniform_layouts() {
        assert_eq!(std::mem::size_of::<CameraUniform>(), 64);
        assert_eq!(std::mem::size_of::<LightingUniform>(), 32);
    }

    #[test]
    fn test_lighting_from_scene() {
        let scene = SceneConfig::default();
        let lighting = LightingUniform::from_scene(&scene);
        let dir = Vec3::from(lighting.sun_dir);
        assert!((dir.length() - 1.0).abs() < 1e-6);
        assert!(dir.y > 0.0);
        assert_eq!(lighting.ambient, 0.6);
        assert_eq!(lighting.sun_intensity, 1.0);
    }

    #[test]
    fn test_fps_counter_averages_over_a_second() {
        let mut fps = FpsCounter::default();
        assert_eq!(fps.tick(0.0), 0.0);
        let mut last = 0.0;
        for i in 1..=61 {
            last = fps.tick(i as f64 * 1000.0 / 60.0);
        }
        assert!((last - 60.0).abs() < 0.5, "got {last}");
    }

    #[test]
    fn test_fps_counter_ignores_clock_going_backwards() {
        let mut fps = FpsCounter::default();
        fps.tick(500.0);
        fps.tick(400.0);
        assert_eq!(fps.window_ms, 0.0);
    }
}
