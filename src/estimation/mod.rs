/**
 * Kinematic Estimation
 *
 * Leaf building blocks of the measurement pipeline:
 * - trapezoidal integrators over irregular timestamps
 * - body-to-world frame transform
 * - dead-reckoned velocity and position
 */

pub mod frame;
pub mod integrator;
pub mod position;
pub mod velocity;

pub use frame::{body_to_world, Orientation};
pub use integrator::{ScalarIntegrator, TriAxisIntegrator};
pub use position::PositionEstimator;
pub use velocity::VelocityEstimator;

/// Monotonic time in milliseconds
pub type Timestamp = u64;

/// Physical 3-vector; the frame (body or world) is fixed by each caller
pub type Vector3 = nalgebra::Vector3<f64>;
