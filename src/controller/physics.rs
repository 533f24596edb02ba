use crate::config::AvatarConfig;

/// Handles avatar physics (gravity, floor clamp, jumping).
/// Rates are per frame, not per second.
pub struct PhysicsSystem {
    pub gravity: f32,
    pub jump_speed: f32,
    pub floor_height: f32,
}

impl PhysicsSystem {
    pub fn new(config: &AvatarConfig) -> Self {
        Self {
            gravity: config.gravity,
            jump_speed: config.jump_speed,
            floor_height: config.floor_height,
        }
    }

    /// One vertical step. At or below the floor the body is snapped onto it
    /// and may take off; above it, gravity pulls. Velocity is applied last.
    pub fn integrate(&self, y: &mut f32, vel_y: &mut f32, grounded: &mut bool, jump: bool) {
        if *y <= self.floor_height {
            *y = self.floor_height;
            *vel_y = 0.0;
            *grounded = true;
            if jump {
                *vel_y = self.jump_speed;
            }
        } else {
            *vel_y -= self.gravity;
            *grounded = false;
        }
        *y += *vel_y;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn physics() -> PhysicsSystem {
        PhysicsSystem::new(&AvatarConfig::default())
    }

    #[test]
    fn test_resting_on_floor() {
        let physics = physics();
        let (mut y, mut vel, mut grounded) = (0.0, 0.0, false);
        for _ in 0..10 {
            physics.integrate(&mut y, &mut vel, &mut grounded, false);
        }
        assert_eq!(y, 0.0);
        assert_eq!(vel, 0.0);
        assert!(grounded);
    }

    #[test]
    fn test_below_floor_snaps_up() {
        let physics = physics();
        let (mut y, mut vel, mut grounded) = (-0.3, -0.1, false);
        physics.integrate(&mut y, &mut vel, &mut grounded, false);
        assert_eq!(y, 0.0);
        assert_eq!(vel, 0.0);
        assert!(grounded);
    }

    #[test]
    fn test_jump_arc_lands() {
        let physics = physics();
        let (mut y, mut vel, mut grounded) = (0.0, 0.0, true);
        physics.integrate(&mut y, &mut vel, &mut grounded, true);
        assert_eq!(vel, 0.25);
        assert_eq!(y, 0.25);

        let mut frames = 0;
        while !(grounded && y == 0.0) {
            physics.integrate(&mut y, &mut vel, &mut grounded, false);
            frames += 1;
            assert!(frames < 100, "never landed");
        }
        assert_eq!(vel, 0.0);
    }
}
