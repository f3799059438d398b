/**
 * Trapezoidal Integrators
 *
 * Numerical integration over irregularly spaced samples. Timestamps are
 * milliseconds, results are in value-seconds.
 */

use super::{Timestamp, Vector3};

/// Integrates one scalar channel sample by sample
#[derive(Debug, Clone, Copy, Default)]
pub struct ScalarIntegrator {
    last: Option<(f64, Timestamp)>,
}

impl ScalarIntegrator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Area under the curve between the previous sample and this one.
    ///
    /// The first sample only seeds the history and always yields 0.
    /// A timestamp older than the previous one is a caller error: it is
    /// logged and produces a sign-flipped area.
    pub fn integrate(&mut self, value: f64, timestamp: Timestamp) -> f64 {
        let mut area = 0.0;
        if let Some((last_value, last_timestamp)) = self.last {
            if timestamp < last_timestamp {
                tracing::warn!(
                    "integrator timestamp went backwards: {} -> {} ms",
                    last_timestamp,
                    timestamp
                );
            }
            let min = last_value.min(value);
            let max = last_value.max(value);
            let elapsed_ms = timestamp as f64 - last_timestamp as f64;
            area = (min + (max - min) * 0.5) * elapsed_ms / 1000.0;
        }
        self.last = Some((value, timestamp));
        area
    }

    /// Forget the history; the next sample starts a fresh baseline
    pub fn reset(&mut self) {
        self.last = None;
    }
}

/// Three independent scalar integrators, one per axis
#[derive(Debug, Clone, Copy, Default)]
pub struct TriAxisIntegrator {
    x: ScalarIntegrator,
    y: ScalarIntegrator,
    z: ScalarIntegrator,
}

impl TriAxisIntegrator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn integrate(&mut self, value: &Vector3, timestamp: Timestamp) -> Vector3 {
        Vector3::new(
            self.x.integrate(value.x, timestamp),
            self.y.integrate(value.y, timestamp),
            self.z.integrate(value.z, timestamp),
        )
    }

    pub fn reset(&mut self) {
        self.x.reset();
        self.y.reset();
        self.z.reset();
    }
}
