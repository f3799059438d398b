/**
 * Actuator Mixer
 *
 * Converts a 6-DoF wrench (heave, sway, surge, yaw, pitch, roll) into one
 * power value per physical thruster.
 *
 * The geometry matrix (6 x N) says how much each thruster pushes every axis.
 * The allocation matrix (N x 6) goes the other way and is what `apply` uses;
 * it is either the Moore-Penrose pseudo-inverse of the geometry or derived
 * from a fixed calibration matrix.
 */

use nalgebra::DMatrix;

use super::motor::MotorSpec;
use super::wrench::{Wrench, AXIS_COUNT};
use crate::error::ConfigError;
use crate::estimation::Vector3;

const PINV_EPSILON: f64 = 1e-9;

/// How the allocation matrix is obtained
#[derive(Debug, Clone, PartialEq)]
pub enum MixingProfile {
    /// Pseudo-inverse of the geometry matrix
    PseudoInverse,
    /// Hand-tuned 6 x N matrix; its transpose is used as the allocation
    Calibration(DMatrix<f64>),
}

impl MixingProfile {
    /// Simplified 5-thruster layout flown on the first hardware revision:
    /// four corner thrusters plus one rear surge thruster.
    /// Columns are thrusters, rows are [heave, sway, surge, yaw, pitch, roll].
    #[rustfmt::skip]
    pub fn reference_five_motor() -> Self {
        let matrix = DMatrix::from_row_slice(AXIS_COUNT, 5, &[
             1.0,  1.0, -1.0, -1.0, 0.0, // heave
             0.0,  0.0,  0.0,  0.0, 0.0, // sway
             0.0,  0.0,  0.0,  0.0, 1.0, // surge
             1.0, -1.0,  1.0, -1.0, 0.0, // yaw
             1.0,  1.0,  1.0,  1.0, 0.0, // pitch
            -1.0,  1.0,  1.0, -1.0, 0.0, // roll
        ]);
        MixingProfile::Calibration(matrix)
    }
}

/// Geometry matrix: one column per motor,
/// `[force.y, force.x, force.z, torque.y, torque.x, torque.z]`
pub fn geometry_matrix(motors: &[MotorSpec], center_of_mass: &Vector3) -> DMatrix<f64> {
    let mut matrix = DMatrix::zeros(AXIS_COUNT, motors.len());
    for (col, motor) in motors.iter().enumerate() {
        let arm = motor.position - center_of_mass;
        let force = motor.orientation;
        let torque = arm.cross(&motor.orientation);
        let column = [force.y, force.x, force.z, torque.y, torque.x, torque.z];
        for (row, value) in column.iter().enumerate() {
            matrix[(row, col)] = *value;
        }
    }
    matrix
}

#[derive(Debug, Clone)]
pub struct ActuatorMixer {
    geometry: DMatrix<f64>,
    allocation: DMatrix<f64>,
}

impl ActuatorMixer {
    pub fn new(
        motors: &[MotorSpec],
        center_of_mass: &Vector3,
        profile: &MixingProfile,
    ) -> Result<Self, ConfigError> {
        if motors.is_empty() {
            return Err(ConfigError::NoMotors);
        }
        let geometry = geometry_matrix(motors, center_of_mass);
        tracing::info!("mapping matrix:{:.2}", geometry);

        let allocation = match profile {
            MixingProfile::PseudoInverse => {
                tracing::info!("mixing profile: pseudo-inverse of motor geometry");
                geometry.clone().pseudo_inverse(PINV_EPSILON).map_err(ConfigError::PseudoInverse)?
            }
            MixingProfile::Calibration(matrix) => {
                if matrix.nrows() != AXIS_COUNT || matrix.ncols() != motors.len() {
                    return Err(ConfigError::MatrixShape {
                        rows: matrix.nrows(),
                        cols: matrix.ncols(),
                        motors: motors.len(),
                    });
                }
                tracing::warn!("mixing profile: fixed calibration matrix, motor geometry ignored");
                matrix.transpose()
            }
        };
        tracing::info!("allocation matrix:{:.2}", allocation);

        Ok(Self { geometry, allocation })
    }

    /// Use an N x 6 allocation matrix as-is
    pub fn from_allocation(allocation: DMatrix<f64>) -> Result<Self, ConfigError> {
        if allocation.ncols() != AXIS_COUNT || allocation.nrows() == 0 {
            return Err(ConfigError::AllocationShape {
                rows: allocation.nrows(),
                cols: allocation.ncols(),
            });
        }
        let geometry = allocation.transpose();
        Ok(Self { geometry, allocation })
    }

    /// Per-motor power: `sum(wrench[axis] * allocation[motor][axis])`.
    /// Not saturated; see [`MotorSpec::output_power`].
    pub fn apply(&self, wrench: &Wrench) -> Vec<f64> {
        let axes = wrench.to_array();
        self.allocation
            .row_iter()
            .map(|row| row.iter().zip(axes.iter()).map(|(c, w)| c * w).sum::<f64>())
            .collect()
    }

    pub fn motor_count(&self) -> usize {
        self.allocation.nrows()
    }

    pub fn geometry(&self) -> &DMatrix<f64> {
        &self.geometry
    }

    pub fn allocation(&self) -> &DMatrix<f64> {
        &self.allocation
    }

    /// Coefficient of `axis` for motor `motor`, `None` when out of range
    pub fn coefficient(&self, motor: usize, axis: usize) -> Option<f64> {
        self.allocation.get((motor, axis)).copied()
    }
}
