use super::{Timestamp, Vector3};

/// Dead-reckoned world-frame position (m)
#[derive(Debug, Clone, Default)]
pub struct PositionEstimator {
    position: Vector3,
    last_update: Option<Timestamp>,
}

impl PositionEstimator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Advance by `velocity * elapsed`. The first call only sets the baseline.
    pub fn update(&mut self, world_velocity: &Vector3, timestamp: Timestamp) {
        if let Some(last) = self.last_update {
            let elapsed_s = (timestamp as f64 - last as f64) / 1000.0;
            self.position += world_velocity * elapsed_s;
        }
        self.last_update = Some(timestamp);
    }

    pub fn position(&self) -> Vector3 {
        self.position
    }

    pub fn last_update(&self) -> Option<Timestamp> {
        self.last_update
    }

    pub fn reset(&mut self) {
        self.position = Vector3::zeros();
        self.last_update = None;
    }
}
