pub mod error;
pub mod estimation;
pub mod fusion;
pub mod control;
pub mod config;
pub mod pubsub;
pub mod uart;
pub mod ffi;

#[cfg(feature = "python")]
pub mod python;

pub use error::{ConfigError, DriverError};
pub use config::DroneConfig;

pub use estimation::{
    body_to_world, Orientation,
    ScalarIntegrator, TriAxisIntegrator,
    VelocityEstimator, PositionEstimator,
    Timestamp, Vector3,
};

pub use fusion::{
    SensorFusionPipeline, SensorEvent, SensorKind, SensorDriver,
    TelemetryEvent, EventSink, KinematicState, Speed,
};

pub use control::{
    VehicleController, ActuatorDriver, WrenchSource,
    RemoteCommandDebouncer, RemoteCommand, CommandState,
    ActuatorMixer, MixingProfile, MotorSpec, PwmOutput, Wrench,
};

pub use pubsub::{Message, Topic, Subscriber, TelemetryBus};
