use glam::{Mat3, Quat, Vec2, Vec3};

use crate::config::AvatarConfig;

/// Identity of a name label instance. A new label gets a new id.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct LabelId(u64);

/// Billboard showing the avatar's name above its head
#[derive(Clone, Debug)]
pub struct NameLabel {
    pub id: LabelId,
    pub text: String,
    /// Relative to the avatar origin
    pub offset: Vec3,
    pub size: Vec2,
    /// Rotation turning the label's +Z towards the viewer
    pub facing: Quat,
}

impl NameLabel {
    /// Point the label's +Z axis at `target`. Keeps the previous rotation when
    /// the target is straight above or below.
    pub fn look_at(&mut self, label_position: Vec3, target: Vec3) {
        let forward = target - label_position;
        if forward.length_squared() < f32::EPSILON {
            return;
        }
        let z = forward.normalize();
        let x = Vec3::Y.cross(z);
        if x.length_squared() < f32::EPSILON {
            return;
        }
        let x = x.normalize();
        let y = z.cross(x);
        self.facing = Quat::from_mat3(&Mat3::from_cols(x, y, z));
    }
}

/// One box of the jointed body
#[derive(Clone, Copy, Debug)]
pub struct BodyPart {
    pub size: Vec3,
    /// Centre of the box relative to the avatar origin
    pub offset: Vec3,
    pub color: [f32; 4],
    /// Rotation around the local X axis, radians
    pub swing: f32,
}

impl BodyPart {
    fn new(size: Vec3, offset: Vec3, color: [f32; 4]) -> Self {
        Self { size, offset, color, swing: 0.0 }
    }
}

/// The player-controlled humanoid
pub struct Avatar {
    pub position: Vec3,
    pub velocity_y: f32,
    pub grounded: bool,
    pub walk_phase: f32,

    pub torso: BodyPart,
    pub head: BodyPart,
    pub left_arm: BodyPart,
    pub right_arm: BodyPart,
    pub left_leg: BodyPart,
    pub right_leg: BodyPart,

    name: String,
    label: NameLabel,
    next_label_id: u64,
}

impl Avatar {
    pub fn new(name: &str, config: &AvatarConfig) -> Self {
        let body = config.body_color;
        let limb = Vec3::new(0.3, 1.0, 0.3);

        let mut avatar = Self {
            position: Vec3::ZERO,
            velocity_y: 0.0,
            grounded: true,
            walk_phase: 0.0,

            torso: BodyPart::new(Vec3::new(0.8, 1.2, 0.4), Vec3::new(0.0, 1.5, 0.0), body),
            head: BodyPart::new(Vec3::splat(0.6), Vec3::new(0.0, 2.4, 0.0), config.skin_color),
            left_arm: BodyPart::new(limb, Vec3::new(-0.55, 1.5, 0.0), body),
            right_arm: BodyPart::new(limb, Vec3::new(0.55, 1.5, 0.0), body),
            left_leg: BodyPart::new(limb, Vec3::new(-0.2, 0.5, 0.0), body),
            right_leg: BodyPart::new(limb, Vec3::new(0.2, 0.5, 0.0), body),

            name: String::new(),
            label: NameLabel {
                id: LabelId(0),
                text: String::new(),
                offset: config.label_offset,
                size: config.label_size,
                facing: Quat::IDENTITY,
            },
            next_label_id: 0,
        };
        avatar.set_username(name);
        avatar
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn label(&self) -> &NameLabel {
        &self.label
    }

    pub fn label_position(&self) -> Vec3 {
        self.position + self.label.offset
    }

    /// Replace the displayed name. The old label is dropped and a fresh one
    /// built; its text is never edited in place.
    pub fn set_username(&mut self, new_name: &str) {
        self.name = new_name.to_string();
        let label = NameLabel {
            id: LabelId(self.next_label_id),
            text: new_name.to_string(),
            offset: self.label.offset,
            size: self.label.size,
            facing: Quat::IDENTITY,
        };
        self.next_label_id += 1;
        self.label = label;
    }

    pub fn face_label_towards(&mut self, viewer: Vec3) {
        let at = self.label_position();
        self.label.look_at(at, viewer);
    }

    /// All six parts, torso first
    pub fn parts(&self) -> [&BodyPart; 6] {
        [
            &self.torso,
            &self.head,
            &self.left_arm,
            &self.right_arm,
            &self.left_leg,
            &self.right_leg,
        ]
    }

    /// Swing the limbs for the current phase; opposite limbs run half a cycle apart
    pub fn pose_limbs(&mut self, amplitude: f32) {
        let forward = self.walk_phase.sin() * amplitude;
        let back = (self.walk_phase + std::f32::consts::PI).sin() * amplitude;
        self.left_leg.swing = forward;
        self.right_leg.swing = back;
        self.left_arm.swing = back;
        self.right_arm.swing = forward;
    }

    pub fn reset_pose(&mut self) {
        self.walk_phase = 0.0;
        self.left_leg.swing = 0.0;
        self.right_leg.swing = 0.0;
        self.left_arm.swing = 0.0;
        self.right_arm.swing = 0.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_avatar_is_grounded_at_origin() {
        let avatar = Avatar::new("Steve", &AvatarConfig::default());
        assert_eq!(avatar.position, Vec3::ZERO);
        assert!(avatar.grounded);
        assert_eq!(avatar.name(), "Steve");
        assert_eq!(avatar.label().text, "Steve");
        assert_eq!(avatar.parts().len(), 6);
    }

    #[test]
    fn test_set_username_replaces_label() {
        let mut avatar = Avatar::new("Player", &AvatarConfig::default());
        let old = avatar.label().id;

        avatar.set_username("Alex");

        assert_eq!(avatar.label().text, "Alex");
        assert_eq!(avatar.name(), "Alex");
        assert!(avatar.label().id != old);
        assert_eq!(avatar.label().offset, Vec3::new(0.0, 3.0, 0.0));
    }

    #[test]
    fn test_limbs_in_counter_phase() {
        let mut avatar = Avatar::new("Player", &AvatarConfig::default());
        avatar.walk_phase = 0.7;
        avatar.pose_limbs(0.5);
        assert!((avatar.left_leg.swing + avatar.right_leg.swing).abs() < 1e-6);
        assert!((avatar.left_arm.swing - avatar.right_leg.swing).abs() < 1e-6);
        assert!((avatar.left_leg.swing - 0.7f32.sin() * 0.5).abs() < 1e-6);

        avatar.reset_pose();
        assert!(avatar.parts().iter().all(|p| p.swing == 0.0));
        assert_eq!(avatar.walk_phase, 0.0);
    }

    #[test]
    fn test_label_faces_viewer() {
        let mut avatar = Avatar::new("Player", &AvatarConfig::default());
        let viewer = Vec3::new(0.0, 3.0, 10.0);
        avatar.face_label_towards(viewer);
        let z = avatar.label().facing * Vec3::Z;
        assert!((z - Vec3::Z).length() < 1e-5);

        let viewer = Vec3::new(10.0, 3.0, 0.0);
        avatar.face_label_towards(viewer);
        let z = avatar.label().facing * Vec3::Z;
        assert!((z - Vec3::X).length() < 1e-5);
    }
}
