/**
 * Sensor Fusion Pipeline
 *
 * Turns IMU reports into world-frame kinematics:
 * 1. rotation-vector reports update the stored orientation
 * 2. linear-acceleration reports are rotated into the world frame with the
 *    latest stored orientation, then integrated into velocity and position
 *
 * Orientation and acceleration reports are not timestamp-synchronised; the
 * acceleration is always rotated with whatever orientation arrived last.
 */

pub mod events;

pub use events::{
    EventSink, KinematicState, SensorDriver, SensorEvent, SensorKind, Speed, TelemetryEvent,
};

use crate::estimation::{body_to_world, Orientation, PositionEstimator, Timestamp, Vector3, VelocityEstimator};
use events::to_array;

/// Sensor timestamps are microseconds; the pipeline works in whole milliseconds
pub fn micros_to_millis(timestamp_us: u64) -> Timestamp {
    timestamp_us / 1000
}

/// Single owner of the kinematic state
#[derive(Debug, Clone, Default)]
pub struct SensorFusionPipeline {
    state: KinematicState,
    velocity: VelocityEstimator,
    position: PositionEstimator,
}

impl SensorFusionPipeline {
    pub fn new() -> Self {
        Self::default()
    }

    /// Process one driver report and emit the derived telemetry
    pub fn handle<S: EventSink + ?Sized>(&mut self, event: &SensorEvent, sink: &mut S) {
        match *event {
            SensorEvent::RotationVector { yaw, pitch, roll } => {
                self.state.orientation = Orientation::from_sensor(yaw, pitch, roll);
                sink.emit(TelemetryEvent::Orientation(self.state.orientation.to_array()));
            }
            SensorEvent::LinearAcceleration { x, y, z, timestamp_us } => {
                let timestamp = micros_to_millis(timestamp_us);
                self.on_linear_acceleration(Vector3::new(x, y, z), timestamp, sink);
            }
            SensorEvent::Unknown { report_id } => {
                tracing::trace!("ignoring sensor report 0x{:02X}", report_id);
            }
        }
    }

    fn on_linear_acceleration<S: EventSink + ?Sized>(
        &mut self,
        body: Vector3,
        timestamp: Timestamp,
        sink: &mut S,
    ) {
        let world = body_to_world(&body, &self.state.orientation);
        self.velocity.update(&world, timestamp);
        let velocity = self.velocity.velocity();
        self.position.update(&velocity, timestamp);

        self.state.acceleration_world = world;
        self.state.velocity_world = velocity;
        self.state.position_world = self.position.position();
        self.state.last_update = Some(timestamp);

        tracing::debug!("speed {:.3} m/s at {} ms", velocity.norm(), timestamp);

        sink.emit(TelemetryEvent::Acceleration(to_array(&world)));
        sink.emit(TelemetryEvent::Speed(Speed {
            x: velocity.x,
            y: velocity.y,
            z: velocity.z,
            timestamp,
        }));
        sink.emit(TelemetryEvent::Location(to_array(&self.state.position_world)));
    }

    pub fn state(&self) -> &KinematicState {
        &self.state
    }

    /// Drop all accumulated dead-reckoning, e.g. between sessions
    pub fn reset(&mut self) {
        self.state = KinematicState::default();
        self.velocity.reset();
        self.position.reset();
    }

    /// Ask the driver for both reports at the given interval.
    ///
    /// Failures are logged and swallowed; the pipeline keeps running on
    /// whatever cadence the driver falls back to.
    pub fn enable_sensors<D: SensorDriver + ?Sized>(driver: &mut D, interval_ms: u32) {
        for kind in [SensorKind::RotationVector, SensorKind::LinearAcceleration] {
            if let Err(e) = driver.enable_sensor(kind, interval_ms) {
                tracing::error!("failed to enable {:?} at {} ms: {}", kind, interval_ms, e);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DriverError;

    fn accel(x: f64, y: f64, z: f64, timestamp_us: u64) -> SensorEvent {
        SensorEvent::LinearAcceleration { x, y, z, timestamp_us }
    }

    #[test]
    fn test_micros_floor_to_millis() {
        assert_eq!(micros_to_millis(0), 0);
        assert_eq!(micros_to_millis(999), 0);
        assert_eq!(micros_to_millis(1_999), 1);
        assert_eq!(micros_to_millis(100_000), 100);
    }

    #[test]
    fn test_rotation_emits_orientation() {
        let mut pipeline = SensorFusionPipeline::new();
        let mut sink: Vec<TelemetryEvent> = Vec::new();
        pipeline.handle(&SensorEvent::RotationVector { yaw: 0.1, pitch: 0.2, roll: 0.3 }, &mut sink);
        assert_eq!(sink, vec![TelemetryEvent::Orientation([0.1, 0.2, 0.3])]);
        assert_eq!(pipeline.state().orientation, Orientation::new(0.1, 0.2, 0.3));
    }

    #[test]
    fn test_end_to_end_level_vehicle() {
        let mut pipeline = SensorFusionPipeline::new();
        let mut sink: Vec<TelemetryEvent> = Vec::new();
        pipeline.handle(&SensorEvent::RotationVector { yaw: 0.0, pitch: 0.0, roll: 0.0 }, &mut sink);
        pipeline.handle(&accel(0.0, 0.0, 9.8, 0), &mut sink);
        pipeline.handle(&accel(0.0, 0.0, 9.8, 100_000), &mut sink);

        // orientation + 2 * (acceleration, speed, location)
        assert_eq!(sink.len(), 7);
        assert_eq!(sink[1].name(), "acceleration");
        assert_eq!(sink[2].name(), "speed");
        assert_eq!(sink[3].name(), "location");

        match sink[5] {
            TelemetryEvent::Speed(speed) => {
                // body z maps to world y; 9.8 m/s² for 0.1 s
                assert!(speed.x.abs() < 1e-12);
                assert!((speed.y - 0.98).abs() < 1e-12);
                assert!(speed.z.abs() < 1e-12);
                assert_eq!(speed.timestamp, 100);
            }
            ref other => panic!("expected speed, got {:?}", other),
        }
        match sink[6] {
            TelemetryEvent::Location(location) => {
                assert!((location[1] - 0.098).abs() < 1e-12);
            }
            ref other => panic!("expected location, got {:?}", other),
        }

        let state = pipeline.state();
        assert!((state.acceleration_world - Vector3::new(0.0, 9.8, 0.0)).norm() < 1e-12);
        assert_eq!(state.last_update, Some(100));
    }

    #[test]
    fn test_uses_latest_orientation() {
        let mut pipeline = SensorFusionPipeline::new();
        let mut sink: Vec<TelemetryEvent> = Vec::new();
        pipeline.handle(&accel(1.0, 0.0, 0.0, 0), &mut sink);
        pipeline.handle(
            &SensorEvent::RotationVector { yaw: std::f64::consts::PI, pitch: 0.0, roll: 0.0 },
            &mut sink,
        );
        pipeline.handle(&accel(1.0, 0.0, 0.0, 1_000), &mut sink);
        // yaw of pi flips body x onto world -x
        assert!((pipeline.state().acceleration_world.x + 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_unknown_reports_are_ignored() {
        let mut pipeline = SensorFusionPipeline::new();
        let mut sink: Vec<TelemetryEvent> = Vec::new();
        pipeline.handle(&SensorEvent::Unknown { report_id: 0x2A }, &mut sink);
        assert!(sink.is_empty());
        assert_eq!(*pipeline.state(), KinematicState::default());
    }

    #[test]
    fn test_reset_clears_dead_reckoning() {
        let mut pipeline = SensorFusionPipeline::new();
        let mut sink: Vec<TelemetryEvent> = Vec::new();
        pipeline.handle(&accel(1.0, 0.0, 0.0, 0), &mut sink);
        pipeline.handle(&accel(1.0, 0.0, 0.0, 1_000_000), &mut sink);
        assert!(pipeline.state().velocity_world.norm() > 0.0);

        pipeline.reset();
        assert_eq!(*pipeline.state(), KinematicState::default());
        pipeline.handle(&accel(1.0, 0.0, 0.0, 5_000_000), &mut sink);
        assert_eq!(pipeline.state().velocity_world, Vector3::zeros());
    }

    struct FlakyDriver {
        enabled: Vec<(SensorKind, u32)>,
    }

    impl SensorDriver for FlakyDriver {
        fn enable_sensor(&mut self, kind: SensorKind, interval_ms: u32) -> Result<(), DriverError> {
            if kind == SensorKind::RotationVector {
                return Err(DriverError::Rejected("interrupt pin unavailable".to_string()));
            }
            self.enabled.push((kind, interval_ms));
            Ok(())
        }

        fn disable_sensor(&mut self, _kind: SensorKind) -> Result<(), DriverError> {
            Ok(())
        }

        fn poll_events(&mut self) -> Result<Vec<SensorEvent>, DriverError> {
            Ok(Vec::new())
        }
    }

    #[test]
    fn test_enable_sensors_survives_failure() {
        let mut driver = FlakyDriver { enabled: Vec::new() };
        SensorFusionPipeline::enable_sensors(&mut driver, 20);
        assert_eq!(driver.enabled, vec![(SensorKind::LinearAcceleration, 20)]);
    }
}
