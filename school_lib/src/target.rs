use glam::Vec2;

use crate::options::TargetMotion;

/// Units per second a target driven by an input axis moves at full deflection.
pub const TARGET_SPEED: f32 = 5.;

/// The single point the whole school steers towards.
#[derive(Debug, Clone, Copy)]
pub struct Target {
    pub position: Vec2,
    pub motion: TargetMotion,
    origin: Vec2,
    elapsed: f32,
}

impl Target {
    pub fn new(position: Vec2, motion: TargetMotion) -> Self {
        let mut target = Target {
            position,
            motion,
            origin: position,
            elapsed: 0.,
        };
        // an orbit starts on its circle, not at its center
        target.place();
        target
    }

    /// Moves the target according to its motion by `delta_time` seconds.
    pub fn advance(&mut self, delta_time: f32) {
        self.elapsed += delta_time;

        match self.motion {
            TargetMotion::Fixed => (),
            TargetMotion::Axis { x, y } => {
                let axis = Vec2::new(x.clamp(-1., 1.), y.clamp(-1., 1.));
                self.position += axis * TARGET_SPEED * delta_time;
            }
            TargetMotion::Orbit { .. } => self.place(),
        }
    }

    /// Replaces the motion, e.g. when a host feeds in fresh input.
    pub fn set_motion(&mut self, motion: TargetMotion) {
        self.motion = motion;
        self.origin = self.position;
        self.elapsed = 0.;
        self.place();
    }

    fn place(&mut self) {
        if let TargetMotion::Orbit {
            radius,
            angular_speed,
        } = self.motion
        {
            let angle = angular_speed * self.elapsed;
            self.position = self.origin + Vec2::new(angle.cos(), angle.sin()) * radius;
        }
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;
    use glam::Vec2;

    use super::{Target, TARGET_SPEED};
    use crate::options::TargetMotion;

    #[test]
    fn fixed_target_stays_put() {
        let mut t = Target::new(Vec2::new(3., 4.), TargetMotion::Fixed);
        t.advance(10.);
        assert_eq!(t.position, Vec2::new(3., 4.));
    }

    #[test]
    fn axis_target_moves_at_fixed_speed() {
        let mut t = Target::new(Vec2::ZERO, TargetMotion::Axis { x: 1., y: -3. });
        t.advance(0.5);

        // the axis is clamped to full deflection
        assert_relative_eq!(t.position.x, TARGET_SPEED * 0.5);
        assert_relative_eq!(t.position.y, -TARGET_SPEED * 0.5);
    }

    #[test]
    fn orbit_target_circles_its_origin() {
        let motion = TargetMotion::Orbit {
            radius: 10.,
            angular_speed: std::f32::consts::FRAC_PI_2,
        };
        let mut t = Target::new(Vec2::new(1., 1.), motion);
        assert_relative_eq!(t.position.x, 11.);
        assert_relative_eq!(t.position.y, 1.);

        t.advance(1.);
        assert_relative_eq!(t.position.x, 1., epsilon = 1e-4);
        assert_relative_eq!(t.position.y, 11., epsilon = 1e-4);
    }
}
