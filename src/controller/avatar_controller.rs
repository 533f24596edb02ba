use glam::Vec3;

use super::input::MovementIntent;
use super::physics::PhysicsSystem;
use crate::config::AvatarConfig;
use crate::model::Avatar;

/// Drives the avatar once per frame: walk, fall/jump, animate, turn the label
pub struct AvatarController {
    pub move_speed: f32,
    pub walk_phase_step: f32,
    pub swing_amplitude: f32,
    pub physics: PhysicsSystem,
}

impl AvatarController {
    pub fn new(config: &AvatarConfig) -> Self {
        Self {
            move_speed: config.move_speed,
            walk_phase_step: config.walk_phase_step,
            swing_amplitude: config.swing_amplitude,
            physics: PhysicsSystem::new(config),
        }
    }

    pub fn update(&self, avatar: &mut Avatar, intent: &MovementIntent, camera_eye: Vec3) {
        // Planar displacement, opposing keys cancel
        let mut dx = 0.0;
        let mut dz = 0.0;
        if intent.forward {
            dz -= self.move_speed;
        }
        if intent.backward {
            dz += self.move_speed;
        }
        if intent.left {
            dx -= self.move_speed;
        }
        if intent.right {
            dx += self.move_speed;
        }

        avatar.position.x += dx;
        avatar.position.z += dz;

        self.physics.integrate(
            &mut avatar.position.y,
            &mut avatar.velocity_y,
            &mut avatar.grounded,
            intent.jump,
        );

        if dx != 0.0 || dz != 0.0 {
            avatar.walk_phase += self.walk_phase_step;
            avatar.pose_limbs(self.swing_amplitude);
        } else {
            avatar.reset_pose();
        }

        avatar.face_label_towards(camera_eye);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EYE: Vec3 = Vec3::new(0.0, 5.0, 10.0);

    fn setup() -> (AvatarController, Avatar) {
        let config = AvatarConfig::default();
        (AvatarController::new(&config), Avatar::new("Player", &config))
    }

    fn keys(forward: bool, backward: bool, left: bool, right: bool) -> MovementIntent {
        MovementIntent { forward, backward, left, right, jump: false }
    }

    #[test]
    fn test_walking_stays_on_floor() {
        let (ctrl, mut avatar) = setup();
        let pattern = [
            keys(true, false, false, false),
            keys(false, false, true, true),
            keys(true, false, true, false),
            keys(false, true, false, true),
            keys(false, false, false, false),
        ];
        for i in 0..200 {
            ctrl.update(&mut avatar, &pattern[i % pattern.len()], EYE);
            assert_eq!(avatar.position.y, 0.0);
            assert!(avatar.grounded);
        }
    }

    #[test]
    fn test_hold_d_moves_along_x() {
        let (ctrl, mut avatar) = setup();
        let n = 40;
        for _ in 0..n {
            ctrl.update(&mut avatar, &keys(false, false, false, true), EYE);
        }
        assert!((avatar.position.x - n as f32 * ctrl.move_speed).abs() < 1e-4);
        assert_eq!(avatar.position.y, 0.0);
        assert_eq!(avatar.position.z, 0.0);
    }

    #[test]
    fn test_jump_only_from_ground() {
        let (ctrl, mut avatar) = setup();
        let jump = MovementIntent { jump: true, ..Default::default() };

        ctrl.update(&mut avatar, &jump, EYE);
        assert_eq!(avatar.velocity_y, ctrl.physics.jump_speed);

        // still holding jump in the air: gravity only
        let mut prev = avatar.velocity_y;
        ctrl.update(&mut avatar, &jump, EYE);
        assert!(!avatar.grounded);
        assert!((avatar.velocity_y - (prev - ctrl.physics.gravity)).abs() < 1e-6);
        prev = avatar.velocity_y;
        ctrl.update(&mut avatar, &jump, EYE);
        assert!((avatar.velocity_y - (prev - ctrl.physics.gravity)).abs() < 1e-6);
    }

    #[test]
    fn test_gravity_decreases_velocity_each_airborne_frame() {
        let (ctrl, mut avatar) = setup();
        let jump = MovementIntent { jump: true, ..Default::default() };
        ctrl.update(&mut avatar, &jump, EYE);

        let idle = MovementIntent::default();
        let mut frames = 0;
        while avatar.position.y > 0.0 {
            let before = avatar.velocity_y;
            ctrl.update(&mut avatar, &idle, EYE);
            if avatar.grounded {
                break;
            }
            assert!((avatar.velocity_y - (before - ctrl.physics.gravity)).abs() < 1e-6);
            frames += 1;
            assert!(frames < 100);
        }
        // lands eventually and rests
        for _ in 0..3 {
            ctrl.update(&mut avatar, &idle, EYE);
        }
        assert_eq!(avatar.position.y, 0.0);
        assert!(avatar.grounded);
        assert!(frames > 0);
    }

    #[test]
    fn test_walk_cycle_advances_and_resets() {
        let (ctrl, mut avatar) = setup();
        for _ in 0..3 {
            ctrl.update(&mut avatar, &keys(true, false, false, false), EYE);
        }
        assert!((avatar.walk_phase - 0.3).abs() < 1e-6);
        assert!(avatar.left_leg.swing != 0.0);
        assert!((avatar.left_leg.swing + avatar.right_leg.swing).abs() < 1e-6);

        // w + s cancel out: no displacement, so the pose resets
        ctrl.update(&mut avatar, &keys(true, true, false, false), EYE);
        assert_eq!(avatar.walk_phase, 0.0);
        assert_eq!(avatar.left_arm.swing, 0.0);
        assert_eq!(avatar.right_leg.swing, 0.0);
    }

    #[test]
    fn test_label_tracks_camera() {
        let (ctrl, mut avatar) = setup();
        let eye = Vec3::new(20.0, 3.0, 0.0);
        ctrl.update(&mut avatar, &MovementIntent::default(), eye);
        let z = avatar.label().facing * Vec3::Z;
        assert!((z - Vec3::X).length() < 1e-5);
    }
}
