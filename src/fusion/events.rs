use crate::control::Wrench;
use crate::error::DriverError;
use crate::estimation::{Orientation, Timestamp, Vector3};

/// Report types the IMU can be asked to stream
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum SensorKind {
    RotationVector = 0x05,
    LinearAcceleration = 0x06,
}

/// Raw report from the IMU driver
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SensorEvent {
    /// Absolute attitude in radians
    RotationVector { yaw: f64, pitch: f64, roll: f64 },
    /// Gravity-free acceleration in the body frame (m/s²)
    LinearAcceleration { x: f64, y: f64, z: f64, timestamp_us: u64 },
    /// Any report id the pipeline does not consume
    Unknown { report_id: u8 },
}

/// World-frame velocity sample
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Speed {
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub timestamp: Timestamp,
}

/// Outbound telemetry, fire-and-forget
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TelemetryEvent {
    /// [yaw, pitch, roll]
    Orientation([f64; 3]),
    Acceleration([f64; 3]),
    Speed(Speed),
    Location([f64; 3]),
    Wrench(Wrench),
}

impl TelemetryEvent {
    pub fn name(&self) -> &'static str {
        match self {
            TelemetryEvent::Orientation(_) => "orientation",
            TelemetryEvent::Acceleration(_) => "acceleration",
            TelemetryEvent::Speed(_) => "speed",
            TelemetryEvent::Location(_) => "location",
            TelemetryEvent::Wrench(_) => "wrench",
        }
    }
}

/// Consumer of telemetry events (UI bridge, bus, test recorder)
pub trait EventSink {
    fn emit(&mut self, event: TelemetryEvent);
}

impl EventSink for Vec<TelemetryEvent> {
    fn emit(&mut self, event: TelemetryEvent) {
        self.push(event);
    }
}

/// Inbound side of the IMU driver
pub trait SensorDriver {
    fn enable_sensor(&mut self, kind: SensorKind, interval_ms: u32) -> Result<(), DriverError>;
    fn disable_sensor(&mut self, kind: SensorKind) -> Result<(), DriverError>;
    /// Drain whatever reports arrived since the last call
    fn poll_events(&mut self) -> Result<Vec<SensorEvent>, DriverError>;
}

/// Snapshot of everything the pipeline knows
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct KinematicState {
    pub orientation: Orientation,
    pub acceleration_world: Vector3,
    pub velocity_world: Vector3,
    pub position_world: Vector3,
    pub last_update: Option<Timestamp>,
}

pub(crate) fn to_array(v: &Vector3) -> [f64; 3] {
    [v.x, v.y, v.z]
}
