use glam::Vec3;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Ray {
    pub origin: Vec3,
    /// Always normalized
    pub direction: Vec3,
}

impl Ray {
    pub fn new(origin: Vec3, direction: Vec3) -> Self {
        Self { origin, direction: direction.normalize() }
    }

    pub fn at(&self, distance: f32) -> Vec3 {
        self.origin + self.direction * distance
    }
}

/// Axis-aligned box
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

/// Where a ray enters a box
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RayHit {
    pub distance: f32,
    pub point: Vec3,
    /// Outward normal of the face the ray entered through
    pub normal: Vec3,
}

impl Aabb {
    pub fn from_center_size(center: Vec3, size: Vec3) -> Self {
        let half = size * 0.5;
        Self { min: center - half, max: center + half }
    }

    pub fn unit_cube(center: Vec3) -> Self {
        Self::from_center_size(center, Vec3::ONE)
    }

    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    /// Slab test against the front faces only: a ray starting inside the box
    /// sees no face pointing at it and misses.
    pub fn intersect(&self, ray: &Ray) -> Option<RayHit> {
        let mut t_enter = f32::NEG_INFINITY;
        let mut t_exit = f32::INFINITY;
        let mut enter_axis = None;

        for axis in 0..3 {
            let o = ray.origin[axis];
            let d = ray.direction[axis];
            let (lo, hi) = (self.min[axis], self.max[axis]);

            if d.abs() < f32::EPSILON {
                // parallel to this slab
                if o < lo || o > hi {
                    return None;
                }
                continue;
            }

            let inv = 1.0 / d;
            let (t0, t1) = if inv >= 0.0 {
                ((lo - o) * inv, (hi - o) * inv)
            } else {
                ((hi - o) * inv, (lo - o) * inv)
            };

            if t0 > t_enter {
                t_enter = t0;
                enter_axis = Some(axis);
            }
            t_exit = t_exit.min(t1);
            if t_enter > t_exit {
                return None;
            }
        }

        let axis = enter_axis?;
        if t_enter <= 0.0 {
            return None;
        }

        let mut normal = Vec3::ZERO;
        normal[axis] = -ray.direction[axis].signum();

        // pin the point onto the face plane so callers can round it safely
        let mut point = ray.at(t_enter);
        point[axis] = if normal[axis] > 0.0 { self.max[axis] } else { self.min[axis] };

        Some(RayHit { distance: t_enter, point, normal })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hit_top_face() {
        let cube = Aabb::unit_cube(Vec3::new(1.0, 0.0, 1.0));
        let ray = Ray::new(Vec3::new(1.2, 10.0, 0.9), Vec3::NEG_Y);
        let hit = cube.intersect(&ray).unwrap();
        assert!((hit.distance - 9.5).abs() < 1e-5);
        assert_eq!(hit.normal, Vec3::Y);
        assert_eq!(hit.point.y, 0.5);
    }

    #[test]
    fn test_hit_side_face() {
        let cube = Aabb::unit_cube(Vec3::ZERO);
        let ray = Ray::new(Vec3::new(-5.0, 0.1, 0.2), Vec3::X);
        let hit = cube.intersect(&ray).unwrap();
        assert_eq!(hit.normal, Vec3::NEG_X);
        assert_eq!(hit.point.x, -0.5);
    }

    #[test]
    fn test_miss_beside_box() {
        let cube = Aabb::unit_cube(Vec3::ZERO);
        let ray = Ray::new(Vec3::new(2.0, 10.0, 0.0), Vec3::NEG_Y);
        assert!(cube.intersect(&ray).is_none());
    }

    #[test]
    fn test_box_behind_ray() {
        let cube = Aabb::unit_cube(Vec3::ZERO);
        let ray = Ray::new(Vec3::new(0.0, 5.0, 0.0), Vec3::Y);
        assert!(cube.intersect(&ray).is_none());
    }

    #[test]
    fn test_origin_inside_box() {
        let cube = Aabb::from_center_size(Vec3::ZERO, Vec3::splat(4.0));
        let ray = Ray::new(Vec3::ZERO, Vec3::new(1.0, 0.3, 0.0));
        assert!(cube.intersect(&ray).is_none());
    }
}
