use glam::{Mat4, Vec2, Vec3};

use super::raycast::Ray;
use crate::config::CameraConfig;

/// Perspective camera described by an eye position and a look target
pub struct Camera {
    pub eye: Vec3,
    pub target: Vec3,
    pub up: Vec3,
    pub fov_y: f32,
    pub aspect: f32,
    pub z_near: f32,
    pub z_far: f32,
}

impl Camera {
    pub fn new(width: u32, height: u32, config: &CameraConfig) -> Self {
        Self {
            eye: config.follow_offset,
            target: Vec3::ZERO,
            up: Vec3::Y,
            fov_y: config.fov_y_degrees.to_radians(),
            aspect: aspect_ratio(width, height),
            z_near: config.z_near,
            z_far: config.z_far,
        }
    }

    pub fn forward(&self) -> Vec3 {
        (self.target - self.eye).normalize_or_zero()
    }

    pub fn set_aspect(&mut self, width: u32, height: u32) {
        self.aspect = aspect_ratio(width, height);
    }

    pub fn look_at(&mut self, target: Vec3) {
        self.target = target;
    }

    pub fn view(&self) -> Mat4 {
        Mat4::look_at_rh(self.eye, self.target, self.up)
    }

    pub fn projection(&self) -> Mat4 {
        Mat4::perspective_rh(self.fov_y, self.aspect, self.z_near, self.z_far)
    }

    pub fn view_proj(&self) -> Mat4 {
        self.projection() * self.view()
    }

    /// Ray from the eye through a point in normalized device coordinates
    /// (x right, y up, both in -1..1)
    pub fn ray_from_ndc(&self, ndc: Vec2) -> Ray {
        let forward = self.forward();
        let right = forward.cross(self.up).normalize_or_zero();
        let up = right.cross(forward);
        let half_h = (self.fov_y * 0.5).tan();
        let direction = forward + right * (ndc.x * half_h * self.aspect) + up * (ndc.y * half_h);
        Ray::new(self.eye, direction)
    }

    /// World position to normalized device coordinates, `None` when the point
    /// is behind the eye
    pub fn project(&self, point: Vec3) -> Option<Vec3> {
        let clip = self.view_proj() * point.extend(1.0);
        if clip.w <= 0.0 {
            return None;
        }
        Some(clip.truncate() / clip.w)
    }
}

fn aspect_ratio(width: u32, height: u32) -> f32 {
    width.max(1) as f32 / height.max(1) as f32
}
