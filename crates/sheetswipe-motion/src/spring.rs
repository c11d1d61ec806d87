//! L4 Atomic Layer: damped-spring motion for spring-back transitions
//!
//! Closed-form damped harmonic oscillator (mass 1), so a frame's position
//! depends only on elapsed time and never accumulates integration error.

use sheetswipe_core::SpringConfig;

/// Springs that never settle are forced to rest after this long.
pub const MAX_SPRING_MS: f64 = 5000.0;

/// Damping ratios this close above 1.0 use the critically damped solution
const CRITICAL_EPSILON: f64 = 1e-6;

/// Physical spring constants derived from tension/friction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpringParams {
    pub stiffness: f64,
    pub damping: f64,
    pub rest_displacement_threshold: f64,
    pub rest_speed_threshold: f64,
}

impl SpringParams {
    /// Convert tension/friction to stiffness/damping with the Origami mapping
    /// most mobile animation drivers use.
    pub fn from_config(config: &SpringConfig) -> Self {
        Self {
            stiffness: ((config.tension - 30.0) * 3.62 + 194.0).max(f64::EPSILON),
            damping: ((config.friction - 8.0) * 3.0 + 25.0).max(0.0),
            rest_displacement_threshold: config.rest_displacement_threshold,
            rest_speed_threshold: config.rest_speed_threshold,
        }
    }

    /// 1.0 is critical; below bounces, above creeps
    pub fn damping_ratio(&self) -> f64 {
        self.damping / (2.0 * self.stiffness.sqrt())
    }
}

/// One spring transition from `from` toward `to`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpringMotion {
    pub params: SpringParams,
    pub from: f64,
    pub to: f64,
    /// Units per second
    pub initial_velocity: f64,
}

impl SpringMotion {
    pub fn new(params: SpringParams, from: f64, to: f64, initial_velocity: f64) -> Self {
        Self {
            params,
            from,
            to,
            initial_velocity,
        }
    }

    /// Position and velocity (units/s) after `elapsed_ms`
    pub fn sample(&self, elapsed_ms: f64) -> (f64, f64) {
        let t = elapsed_ms.max(0.0) / 1000.0;
        let k = self.params.stiffness;
        let c = self.params.damping;
        let omega0 = k.sqrt();
        let zeta = c / (2.0 * omega0);
        let x0 = self.to - self.from;
        let v0 = -self.initial_velocity;

        if zeta < 1.0 {
            let omega1 = omega0 * (1.0 - zeta * zeta).sqrt();
            let envelope = (-zeta * omega0 * t).exp();
            let a = (v0 + zeta * omega0 * x0) / omega1;
            let (sin, cos) = (omega1 * t).sin_cos();
            let position = self.to - envelope * (a * sin + x0 * cos);
            let velocity = zeta * omega0 * envelope * (a * sin + x0 * cos)
                - envelope * (a * omega1 * cos - omega1 * x0 * sin);
            (position, velocity)
        } else if zeta - 1.0 <= CRITICAL_EPSILON {
            let envelope = (-omega0 * t).exp();
            let position = self.to - envelope * (x0 + (v0 + omega0 * x0) * t);
            let velocity = envelope * (v0 * (t * omega0 - 1.0) + t * x0 * omega0 * omega0);
            (position, velocity)
        } else {
            // Two real decay rates; the slower one dominates the tail
            let root = omega0 * (zeta * zeta - 1.0).sqrt();
            let r1 = -zeta * omega0 + root;
            let r2 = -zeta * omega0 - root;
            let a = (v0 - r2 * x0) / (r1 - r2);
            let b = x0 - a;
            let (e1, e2) = ((r1 * t).exp(), (r2 * t).exp());
            let position = self.to - (a * e1 + b * e2);
            let velocity = -(a * r1 * e1 + b * r2 * e2);
            (position, velocity)
        }
    }

    /// Whether the spring has settled within its rest thresholds
    pub fn is_at_rest(&self, elapsed_ms: f64) -> bool {
        if elapsed_ms >= MAX_SPRING_MS {
            return true;
        }
        let (position, velocity) = self.sample(elapsed_ms);
        velocity.abs() <= self.params.rest_speed_threshold
            && (self.to - position).abs() <= self.params.rest_displacement_threshold
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn standard() -> SpringParams {
        SpringParams::from_config(&SpringConfig {
            tension: 40.0,
            friction: 8.0,
            rest_displacement_threshold: 0.5,
            rest_speed_threshold: 0.5,
        })
    }

    fn gentle() -> SpringParams {
        SpringParams::from_config(&SpringConfig {
            tension: 30.0,
            friction: 12.0,
            rest_displacement_threshold: 0.1,
            rest_speed_threshold: 0.1,
        })
    }

    #[test]
    fn test_origami_conversion() {
        let params = standard();
        assert!((params.stiffness - 230.2).abs() < 1e-9);
        assert!((params.damping - 25.0).abs() < 1e-9);
        assert!(params.damping_ratio() < 1.0);
        assert!(gentle().damping_ratio() >= 1.0);
    }

    #[test]
    fn test_starts_at_origin() {
        let motion = SpringMotion::new(standard(), 120.0, 0.0, 0.0);
        let (position, velocity) = motion.sample(0.0);
        assert!((position - 120.0).abs() < 1e-9);
        assert!(velocity.abs() < 1e-9);
    }

    #[test]
    fn test_settles_at_target() {
        for params in [standard(), gentle()] {
            let motion = SpringMotion::new(params, 200.0, 0.0, 0.0);
            let (position, _) = motion.sample(3000.0);
            assert!(position.abs() < 0.5, "position {}", position);
            assert!(motion.is_at_rest(3000.0));
            assert!(!motion.is_at_rest(16.0));
        }
    }

    #[test]
    fn test_gentle_spring_does_not_overshoot() {
        let motion = SpringMotion::new(gentle(), 15.0, 0.0, 0.0);
        for frame in 0..300 {
            let (position, _) = motion.sample(frame as f64 * 16.0);
            assert!(position >= -1e-9, "overshot to {} at frame {}", position, frame);
        }
    }

    fn spring_with_friction(friction: f64) -> SpringParams {
        SpringParams::from_config(&SpringConfig {
            tension: 30.0,
            friction,
            rest_displacement_threshold: 0.1,
            rest_speed_threshold: 0.1,
        })
    }

    #[test]
    fn test_overdamped_friction_changes_trajectory() {
        let soft = SpringMotion::new(spring_with_friction(12.0), 15.0, 0.0, 0.0);
        let stiff = SpringMotion::new(spring_with_friction(40.0), 15.0, 0.0, 0.0);
        for ms in [100.0, 200.0, 400.0] {
            let (a, _) = soft.sample(ms);
            let (b, _) = stiff.sample(ms);
            // More friction creeps back more slowly
            assert!(b > a + 0.5, "t={} friction 12: {} friction 40: {}", ms, a, b);
        }
    }

    #[test]
    fn test_overdamped_matches_closed_form() {
        let params = gentle();
        assert!(params.damping_ratio() > 1.0);
        let motion = SpringMotion::new(params, 15.0, 0.0, 0.0);

        // x(t) = 15 * (r1 e^(r2 t) - r2 e^(r1 t)) / (r1 - r2), starting at rest
        let omega0 = params.stiffness.sqrt();
        let zeta = params.damping_ratio();
        let root = omega0 * (zeta * zeta - 1.0).sqrt();
        let (r1, r2) = (-zeta * omega0 + root, -zeta * omega0 - root);
        let expected = |t: f64| 15.0 * (r1 * (r2 * t).exp() - r2 * (r1 * t).exp()) / (r1 - r2);

        for ms in [0.0, 50.0, 100.0, 200.0, 500.0] {
            let (position, _) = motion.sample(ms);
            let want = expected(ms / 1000.0);
            assert!((position - want).abs() < 1e-9, "t={} got {} want {}", ms, position, want);
        }
        let (at_200, _) = motion.sample(200.0);
        assert!((at_200 - 5.3255).abs() < 1e-3, "{}", at_200);
    }

    #[test]
    fn test_overdamped_velocity_is_derivative() {
        let motion = SpringMotion::new(gentle(), 15.0, 0.0, 40.0);
        let (_, velocity) = motion.sample(0.0);
        assert!((velocity - 40.0).abs() < 1e-9);

        let h = 1e-3;
        let (before, _) = motion.sample(100.0 - h);
        let (after, _) = motion.sample(100.0 + h);
        let (_, velocity) = motion.sample(100.0);
        let numeric = (after - before) / (2.0 * h / 1000.0);
        assert!((velocity - numeric).abs() < 1e-3, "{} vs {}", velocity, numeric);
    }

    #[test]
    fn test_critical_damping() {
        let params = SpringParams {
            stiffness: 100.0,
            damping: 20.0,
            rest_displacement_threshold: 0.1,
            rest_speed_threshold: 0.1,
        };
        assert!((params.damping_ratio() - 1.0).abs() < 1e-12);
        let motion = SpringMotion::new(params, 10.0, 0.0, 0.0);
        let (position, _) = motion.sample(100.0);
        // 10 * e^-1 * (1 + 1)
        assert!((position - 20.0 * (-1.0f64).exp()).abs() < 1e-9);
    }

    #[test]
    fn test_rest_forced_after_max_duration() {
        let params = SpringParams {
            stiffness: 1.0,
            damping: 0.0,
            rest_displacement_threshold: 0.0,
            rest_speed_threshold: 0.0,
        };
        let motion = SpringMotion::new(params, 100.0, 0.0, 0.0);
        assert!(motion.is_at_rest(MAX_SPRING_MS));
    }
}
