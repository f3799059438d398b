/**
 * Control Module
 *
 * Command-to-actuator path:
 * - wrench types and remote command debouncing
 * - per-thruster output stage
 * - wrench-to-thruster mixing
 * - controller tying it to the actuator driver
 */

pub mod controller;
pub mod debouncer;
pub mod mixer;
pub mod motor;
pub mod wrench;

pub use controller::{ActuatorDriver, VehicleController, WrenchSource};
pub use debouncer::{CommandState, RemoteCommand, RemoteCommandDebouncer};
pub use mixer::{ActuatorMixer, MixingProfile};
pub use motor::{MotorSpec, PwmOutput};
pub use wrench::Wrench;
