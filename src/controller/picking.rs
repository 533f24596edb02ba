use glam::{IVec3, Vec2, Vec3};

use super::input::MouseButton;
use crate::model::{BlockId, Camera, Ray, World};

/// What a pick ray struck
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PickTarget {
    Block(BlockId),
    Ground,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Pick {
    pub target: PickTarget,
    pub distance: f32,
    pub point: Vec3,
    pub normal: Vec3,
}

/// Result of a pointer press in the world
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PickOutcome {
    /// Ray hit nothing
    Missed,
    Placed { id: BlockId, cell: IVec3 },
    Removed { id: BlockId },
    /// Something was hit but the button has nothing to do with it
    Ignored,
}

/// Viewport pixel (origin top-left, y down) to normalized device coordinates
pub fn pixel_to_ndc(x: f32, y: f32, width: u32, height: u32) -> Vec2 {
    let w = width.max(1) as f32;
    let h = height.max(1) as f32;
    Vec2::new(x / w * 2.0 - 1.0, -(y / h) * 2.0 + 1.0)
}

/// Nearest hit along the ray. Blocks are tested in placement order, then the
/// ground; on equal distance the earlier candidate wins.
pub fn pick(ray: &Ray, world: &World) -> Option<Pick> {
    let blocks = world
        .all()
        .iter()
        .map(|b| (PickTarget::Block(b.id), b.aabb()));
    let ground = std::iter::once((PickTarget::Ground, world.ground().aabb()));

    let mut best: Option<Pick> = None;
    for (target, aabb) in blocks.chain(ground) {
        if let Some(hit) = aabb.intersect(ray) {
            if best.map_or(true, |b| hit.distance < b.distance) {
                best = Some(Pick {
                    target,
                    distance: hit.distance,
                    point: hit.point,
                    normal: hit.normal,
                });
            }
        }
    }
    best
}

/// Cell for a new block against a struck face: step half a unit out along
/// the normal and round each axis. An exact .5 rounds up, except on the
/// normal axis where it rounds back towards the struck face.
pub fn placement_cell(point: Vec3, normal: Vec3) -> IVec3 {
    let p = point + normal * 0.5;
    let round_axis = |v: f32, n: f32| {
        if n > 0.0 {
            (v - 0.5).ceil()
        } else {
            (v + 0.5).floor()
        }
    };
    IVec3::new(
        round_axis(p.x, normal.x) as i32,
        round_axis(p.y, normal.y) as i32,
        round_axis(p.z, normal.z) as i32,
    )
}

/// Place (left) or remove (right) against whatever the ray hits first
pub fn apply_pick(world: &mut World, ray: &Ray, button: MouseButton) -> PickOutcome {
    let Some(hit) = pick(ray, world) else {
        return PickOutcome::Missed;
    };

    match (button, hit.target) {
        (MouseButton::Left, _) => {
            let cell = placement_cell(hit.point, hit.normal);
            let id = world.add(cell.x, cell.y, cell.z);
            PickOutcome::Placed { id, cell }
        }
        (MouseButton::Right, PickTarget::Block(id)) => match world.remove(id) {
            Some(_) => PickOutcome::Removed { id },
            None => PickOutcome::Ignored,
        },
        _ => PickOutcome::Ignored,
    }
}

/// Convenience for pointer handlers: pixel -> ray -> pick
pub fn pick_from_pixel(
    world: &mut World,
    camera: &Camera,
    button: MouseButton,
    x: f32,
    y: f32,
    viewport: (u32, u32),
) -> PickOutcome {
    let ndc = pixel_to_ndc(x, y, viewport.0, viewport.1);
    let ray = camera.ray_from_ndc(ndc);
    apply_pick(world, &ray, button)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{CameraConfig, WorldConfig};

    fn world() -> World {
        World::new(&WorldConfig::default())
    }

    fn down_at(x: f32, z: f32) -> Ray {
        Ray::new(Vec3::new(x, 10.0, z), Vec3::NEG_Y)
    }

    #[test]
    fn test_ndc_corners() {
        assert_eq!(pixel_to_ndc(0.0, 0.0, 800, 600), Vec2::new(-1.0, 1.0));
        assert_eq!(pixel_to_ndc(800.0, 600.0, 800, 600), Vec2::new(1.0, -1.0));
        assert_eq!(pixel_to_ndc(400.0, 300.0, 800, 600), Vec2::ZERO);
    }

    #[test]
    fn test_place_on_ground() {
        let mut world = world();
        let ray = down_at(0.5, 0.5);

        let hit = pick(&ray, &world).unwrap();
        assert_eq!(hit.target, PickTarget::Ground);
        assert_eq!(hit.point, Vec3::new(0.5, 0.0, 0.5));
        assert_eq!(hit.normal, Vec3::Y);

        let outcome = apply_pick(&mut world, &ray, MouseButton::Left);
        assert!(matches!(outcome, PickOutcome::Placed { cell, .. } if cell == IVec3::new(1, 0, 1)));
        assert_eq!(world.len(), 1);
        assert_eq!(world.all()[0].position, IVec3::new(1, 0, 1));
    }

    #[test]
    fn test_stack_on_block_top() {
        let mut world = world();
        world.add(1, 0, 1);
        let outcome = apply_pick(&mut world, &down_at(1.2, 0.9), MouseButton::Left);
        assert!(matches!(outcome, PickOutcome::Placed { cell, .. } if cell == IVec3::new(1, 1, 1)));
    }

    #[test]
    fn test_place_against_side_face() {
        let mut world = world();
        world.add(0, 0, 0);
        let ray = Ray::new(Vec3::new(-5.0, 0.2, 0.1), Vec3::X);
        let outcome = apply_pick(&mut world, &ray, MouseButton::Left);
        assert!(matches!(outcome, PickOutcome::Placed { cell, .. } if cell == IVec3::new(-1, 0, 0)));
    }

    #[test]
    fn test_remove_block_roundtrip() {
        let mut world = world();
        world.add(5, 0, 5);
        let before = world.len();

        let ray = down_at(0.5, 0.5);
        let placed = apply_pick(&mut world, &ray, MouseButton::Left);
        let PickOutcome::Placed { id, .. } = placed else {
            panic!("expected placement, got {placed:?}");
        };

        let outcome = apply_pick(&mut world, &down_at(1.0, 1.0), MouseButton::Right);
        assert_eq!(outcome, PickOutcome::Removed { id });
        assert_eq!(world.len(), before);
    }

    #[test]
    fn test_ground_cannot_be_removed() {
        let mut world = world();
        for (x, z) in [(0.0, 0.0), (-10.0, 7.5), (24.0, -24.0)] {
            let outcome = apply_pick(&mut world, &down_at(x, z), MouseButton::Right);
            assert_eq!(outcome, PickOutcome::Ignored);
        }
        assert!(pick(&down_at(0.0, 0.0), &world).is_some());
    }

    #[test]
    fn test_miss_and_other_buttons() {
        let mut world = world();
        let sky = Ray::new(Vec3::new(0.0, 10.0, 0.0), Vec3::Y);
        assert_eq!(apply_pick(&mut world, &sky, MouseButton::Left), PickOutcome::Missed);

        let ground = down_at(0.0, 0.0);
        assert_eq!(apply_pick(&mut world, &ground, MouseButton::Middle), PickOutcome::Ignored);
        assert_eq!(apply_pick(&mut world, &ground, MouseButton::Other(3)), PickOutcome::Ignored);
        assert!(world.is_empty());
    }

    #[test]
    fn test_nearest_block_wins() {
        let mut world = world();
        let low = world.add(2, 0, 2);
        let high = world.add(2, 3, 2);
        let hit = pick(&down_at(2.0, 2.0), &world).unwrap();
        assert_eq!(hit.target, PickTarget::Block(high));
        assert!(hit.target != PickTarget::Block(low));
    }

    #[test]
    fn test_overlapping_placement_permitted() {
        let mut world = world();
        world.add(1, 0, 1);
        world.add(1, 0, 1);
        let hit = pick(&down_at(1.0, 1.0), &world).unwrap();
        // equal distance: first placed block wins
        assert_eq!(hit.target, PickTarget::Block(world.all()[0].id));
    }

    #[test]
    fn test_pick_from_screen_center() {
        let mut world = world();
        let camera = Camera::new(800, 600, &CameraConfig::default());
        let outcome = pick_from_pixel(&mut world, &camera, MouseButton::Left, 400.0, 300.0, (800, 600));
        // camera looks at the origin from (0, 5, 10)
        assert!(matches!(outcome, PickOutcome::Placed { cell, .. } if cell == IVec3::new(0, 0, 0)));
    }
}
