use glam::Vec3;

use crate::config::CameraConfig;
use crate::model::Camera;

/// Third-person follow camera
pub struct CameraController {
    pub follow_offset: Vec3,
    pub follow_blend: f32,
}

impl CameraController {
    pub fn new(config: &CameraConfig) -> Self {
        Self {
            follow_offset: config.follow_offset,
            follow_blend: config.follow_blend,
        }
    }

    /// Ease the eye a fixed fraction towards its spot behind the avatar and
    /// aim at the avatar. Fraction is per frame, so the feel depends on the
    /// frame rate.
    pub fn follow(&self, camera: &mut Camera, avatar_position: Vec3) {
        let wanted = avatar_position + self.follow_offset;
        camera.eye = camera.eye.lerp(wanted, self.follow_blend);
        camera.look_at(avatar_position);
    }
}
