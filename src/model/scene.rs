use glam::{Mat4, Quat, Vec3};

use super::avatar::Avatar;
use super::world::World;

/// A coloured box to draw: the unit cube mesh transformed by `model`
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CubeInstance {
    pub model: Mat4,
    pub color: [f32; 4],
}

/// Flatten everything visible into cube instances: ground, blocks (in
/// placement order), then the avatar's body parts.
pub fn collect_instances(world: &World, avatar: Option<&Avatar>) -> Vec<CubeInstance> {
    let mut out = Vec::with_capacity(world.len() + 7);

    let ground = world.ground();
    out.push(CubeInstance {
        model: Mat4::from_scale_rotation_translation(ground.size, Quat::IDENTITY, ground.center),
        color: world.ground_color(),
    });

    let block_color = world.block_color();
    out.extend(world.all().iter().map(|b| CubeInstance {
        model: Mat4::from_translation(b.center()),
        color: block_color,
    }));

    if let Some(avatar) = avatar {
        for part in avatar.parts() {
            // limbs pivot around their own centre
            let model = Mat4::from_translation(avatar.position + part.offset)
                * Mat4::from_rotation_x(part.swing)
                * Mat4::from_scale(part.size);
            out.push(CubeInstance { model, color: part.color });
        }
    }

    out
}

/// World-space centre of an instance
pub fn instance_center(instance: &CubeInstance) -> Vec3 {
    instance.model.transform_point3(Vec3::ZERO)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{AvatarConfig, WorldConfig};

    #[test]
    fn test_ground_only() {
        let world = World::new(&WorldConfig::default());
        let instances = collect_instances(&world, None);
        assert_eq!(instances.len(), 1);
        assert_eq!(instance_center(&instances[0]), Vec3::new(0.0, -0.5, 0.0));
    }

    #[test]
    fn test_removed_block_not_drawn() {
        let mut world = World::new(&WorldConfig::default());
        world.add(2, 0, 3);
        let gone = world.add(5, 0, 5);
        world.remove(gone);

        let instances = collect_instances(&world, None);
        assert_eq!(instances.len(), 2);
        assert_eq!(instance_center(&instances[1]), Vec3::new(2.0, 0.0, 3.0));
    }

    #[test]
    fn test_avatar_parts_follow_position() {
        let world = World::new(&WorldConfig::default());
        let mut avatar = Avatar::new("Player", &AvatarConfig::default());
        avatar.position = Vec3::new(4.0, 1.0, -2.0);

        let instances = collect_instances(&world, Some(&avatar));
        assert_eq!(instances.len(), 7);
        // torso
        assert!((instance_center(&instances[1]) - Vec3::new(4.0, 2.5, -2.0)).length() < 1e-5);
    }
}
