use glam::{Vec2, Vec3};

/// Tunables for the whole demo.
///
/// Usage:
///   // Use the stock values
///   let config = DemoConfig::default();
///
///   // Or customize:
///   let mut config = DemoConfig::default();
///   config.avatar.move_speed = 0.3;     // faster walking
///   config.camera.follow_blend = 0.25;  // stiffer camera
#[derive(Clone, Debug)]
pub struct DemoConfig {
    pub avatar: AvatarConfig,
    pub camera: CameraConfig,
    pub world: WorldConfig,
    pub scene: SceneConfig,
    /// Name used when the start screen is submitted empty
    pub default_username: String,
}

impl Default for DemoConfig {
    fn default() -> Self {
        Self {
            avatar: AvatarConfig::default(),
            camera: CameraConfig::default(),
            world: WorldConfig::default(),
            scene: SceneConfig::default(),
            default_username: "Player".to_string(),
        }
    }
}

/// Movement, physics and body layout of the avatar. All rates are per frame.
#[derive(Clone, Copy, Debug)]
pub struct AvatarConfig {
    pub move_speed: f32,
    pub jump_speed: f32,
    /// Subtracted from the vertical velocity every airborne frame
    pub gravity: f32,
    pub floor_height: f32,

    // Walk animation
    pub walk_phase_step: f32,
    pub swing_amplitude: f32,

    // Name label
    pub label_offset: Vec3,
    pub label_size: Vec2,

    pub body_color: [f32; 4],
    pub skin_color: [f32; 4],
}

impl Default for AvatarConfig {
    fn default() -> Self {
        Self {
            move_speed: 0.15,
            jump_speed: 0.25,
            gravity: 0.02,
            floor_height: 0.0,
            walk_phase_step: 0.1,
            swing_amplitude: 0.5,
            label_offset: Vec3::new(0.0, 3.0, 0.0),
            label_size: Vec2::new(2.0, 0.5),
            body_color: rgb_hex(0xff0000),
            skin_color: rgb_hex(0xffcc99),
        }
    }
}

#[derive(Clone, Copy, Debug)]
pub struct CameraConfig {
    pub fov_y_degrees: f32,
    pub z_near: f32,
    pub z_far: f32,
    /// Where the camera wants to sit relative to the avatar
    pub follow_offset: Vec3,
    /// Fraction of the remaining distance covered each frame
    pub follow_blend: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            fov_y_degrees: 70.0,
            z_near: 0.1,
            z_far: 1000.0,
            follow_offset: Vec3::new(0.0, 5.0, 10.0),
            follow_blend: 0.1,
        }
    }
}

#[derive(Clone, Copy, Debug)]
pub struct WorldConfig {
    pub ground_center: Vec3,
    pub ground_size: Vec3,
    pub ground_color: [f32; 4],
    pub block_color: [f32; 4],
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            // top face sits exactly on y = 0
            ground_center: Vec3::new(0.0, -0.5, 0.0),
            ground_size: Vec3::new(50.0, 1.0, 50.0),
            ground_color: rgb_hex(0x228b22),
            block_color: rgb_hex(0x00aaff),
        }
    }
}

#[derive(Clone, Copy, Debug)]
pub struct SceneConfig {
    pub sky_color: [f32; 4],
    pub ambient: f32,
    pub sun_position: Vec3,
    pub sun_intensity: f32,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            sky_color: rgb_hex(0x87ceeb),
            ambient: 0.6,
            sun_position: Vec3::new(10.0, 20.0, 10.0),
            sun_intensity: 1.0,
        }
    }
}

/// Convert a 0xRRGGBB sRGB colour to linear RGBA for the shaders
pub fn rgb_hex(hex: u32) -> [f32; 4] {
    let channel = |shift: u32| {
        let c = ((hex >> shift) & 0xff) as f32 / 255.0;
        if c <= 0.04045 {
            c / 12.92
        } else {
            ((c + 0.055) / 1.055).powf(2.4)
        }
    };
    [channel(16), channel(8), channel(0), 1.0]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rgb_hex_extremes() {
        assert_eq!(rgb_hex(0x000000), [0.0, 0.0, 0.0, 1.0]);
        let white = rgb_hex(0xffffff);
        for c in &white[..3] {
            assert!((c - 1.0).abs() < 1e-6);
        }
    }

    #[test]
    fn test_default_tunables() {
        let config = DemoConfig::default();
        assert_eq!(config.default_username, "Player");
        assert_eq!(config.avatar.move_speed, 0.15);
        assert_eq!(config.camera.follow_blend, 0.1);
        // ground top face on the floor height
        let top = config.world.ground_center.y + config.world.ground_size.y / 2.0;
        assert_eq!(top, config.avatar.floor_height);
    }
}
