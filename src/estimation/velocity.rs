use super::integrator::TriAxisIntegrator;
use super::{Timestamp, Vector3};

/// Dead-reckoned world-frame velocity (m/s)
///
/// Accumulates integrated acceleration forever; drift is never corrected.
#[derive(Debug, Clone, Default)]
pub struct VelocityEstimator {
    velocity: Vector3,
    integrator: TriAxisIntegrator,
}

impl VelocityEstimator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn update(&mut self, world_acceleration: &Vector3, timestamp: Timestamp) {
        self.velocity += self.integrator.integrate(world_acceleration, timestamp);
    }

    pub fn velocity(&self) -> Vector3 {
        self.velocity
    }

    pub fn reset(&mut self) {
        self.velocity = Vector3::zeros();
        self.integrator.reset();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn integrate_constant(accel: Vector3, total_ms: u64, steps: u64) -> Vector3 {
        let mut estimator = VelocityEstimator::new();
        let dt = total_ms / steps;
        for i in 0..=steps {
            estimator.update(&accel, i * dt);
        }
        estimator.velocity()
    }

    #[test]
    fn test_constant_acceleration() {
        let accel = Vector3::new(0.5, -1.0, 9.8);
        for steps in [1, 10, 100, 1000] {
            let v = integrate_constant(accel, 2000, steps);
            assert!((v - accel * 2.0).norm() < 1e-9);
        }
    }

    #[test]
    fn test_ramp_converges_with_more_steps() {
        // a(t) = t; exact v(1 s) = 0.5, trapezoid is exact for linear input
        let mut estimator = VelocityEstimator::new();
        for ms in (0..=1000u64).step_by(50) {
            let t = ms as f64 / 1000.0;
            estimator.update(&Vector3::new(t, 0.0, 0.0), ms);
        }
        assert!((estimator.velocity().x - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_first_sample_does_not_move() {
        let mut estimator = VelocityEstimator::new();
        estimator.update(&Vector3::new(100.0, 100.0, 100.0), 10_000);
        assert_eq!(estimator.velocity(), Vector3::zeros());
    }

    #[test]
    fn test_reset() {
        let mut estimator = VelocityEstimator::new();
        estimator.update(&Vector3::new(1.0, 0.0, 0.0), 0);
        estimator.update(&Vector3::new(1.0, 0.0, 0.0), 1000);
        estimator.reset();
        assert_eq!(estimator.velocity(), Vector3::zeros());
        estimator.update(&Vector3::new(1.0, 0.0, 0.0), 5000);
        assert_eq!(estimator.velocity(), Vector3::zeros());
    }
}
