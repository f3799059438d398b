/**
 * Configuration
 *
 * Load-once JSON description of the vehicle. Everything is validated up
 * front: a vehicle with a wrong mixing matrix must not start.
 */

use std::collections::HashSet;
use std::path::Path;

use nalgebra::DMatrix;
use serde::Deserialize;

use crate::control::controller::DEFAULT_GROUND_CONTROL_TIMEOUT_MS;
use crate::control::debouncer::DEFAULT_KEYUP_TIMEOUT_MS;
use crate::control::mixer::MixingProfile;
use crate::control::motor::{MotorSpec, PwmOutput};
use crate::control::wrench::AXIS_COUNT;
use crate::error::ConfigError;
use crate::estimation::Vector3;

pub const DEFAULT_SAMPLING_INTERVAL_MS: u32 = 20;
pub const DEFAULT_SERIAL_PORT: &str = "/dev/ttyACM0";
pub const DEFAULT_BAUD: u32 = 115_200;

#[derive(Debug, Clone, Deserialize)]
pub struct DroneConfig {
    #[serde(default)]
    pub center_of_mass: [f64; 3],
    pub motors: Vec<MotorConfig>,
    #[serde(default)]
    pub mixing: MixingConfig,
    #[serde(default = "default_keyup_timeout")]
    pub remote_keyup_timeout_ms: u64,
    #[serde(default = "default_sampling_interval")]
    pub sampling_interval_ms: u32,
    #[serde(default = "default_ground_control_timeout")]
    pub ground_control_timeout_ms: u64,
    #[serde(default)]
    pub serial: SerialConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MotorConfig {
    pub name: String,
    pub position: [f64; 3],
    pub orientation: [f64; 3],
    #[serde(default = "default_scale")]
    pub scale: f64,
    #[serde(default)]
    pub invert_rotation_direction: bool,
    #[serde(default)]
    pub invert_pwm: bool,
    pub pwm_channel: u8,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(tag = "profile", rename_all = "snake_case")]
pub enum MixingConfig {
    #[default]
    PseudoInverse,
    ReferenceFiveMotor,
    /// Rows are axes (heave, sway, surge, yaw, pitch, roll), columns motors
    Calibration { matrix: Vec<Vec<f64>> },
}

#[derive(Debug, Clone, Deserialize)]
pub struct SerialConfig {
    #[serde(default = "default_port")]
    pub port: String,
    #[serde(default = "default_baud")]
    pub baud: u32,
}

impl Default for SerialConfig {
    fn default() -> Self {
        Self { port: default_port(), baud: default_baud() }
    }
}

fn default_keyup_timeout() -> u64 {
    DEFAULT_KEYUP_TIMEOUT_MS
}

fn default_sampling_interval() -> u32 {
    DEFAULT_SAMPLING_INTERVAL_MS
}

fn default_ground_control_timeout() -> u64 {
    DEFAULT_GROUND_CONTROL_TIMEOUT_MS
}

fn default_scale() -> f64 {
    1.0
}

fn default_port() -> String {
    DEFAULT_SERIAL_PORT.to_string()
}

fn default_baud() -> u32 {
    DEFAULT_BAUD
}

impl DroneConfig {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json(&text)
    }

    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        let config: DroneConfig = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.remote_keyup_timeout_ms == 0 {
            return Err(ConfigError::InvalidTiming("remote_keyup_timeout_ms"));
        }
        if self.sampling_interval_ms == 0 {
            return Err(ConfigError::InvalidTiming("sampling_interval_ms"));
        }
        if self.ground_control_timeout_ms == 0 {
            return Err(ConfigError::InvalidTiming("ground_control_timeout_ms"));
        }
        if !self.center_of_mass.iter().all(|v| v.is_finite()) {
            return Err(ConfigError::InvalidMotor {
                name: "center_of_mass".to_string(),
                reason: "non-finite coordinate",
            });
        }
        self.motor_specs()?;
        self.mixing_profile()?;
        Ok(())
    }

    pub fn center_of_mass(&self) -> Vector3 {
        Vector3::from(self.center_of_mass)
    }

    /// Motors in declaration order; this order is the mixing matrix column order
    pub fn motor_specs(&self) -> Result<Vec<MotorSpec>, ConfigError> {
        if self.motors.is_empty() {
            return Err(ConfigError::NoMotors);
        }
        let mut names = HashSet::new();
        let mut channels = HashSet::new();
        let mut specs = Vec::with_capacity(self.motors.len());
        for motor in &self.motors {
            if !names.insert(motor.name.as_str()) {
                return Err(ConfigError::DuplicateMotor(motor.name.clone()));
            }
            if !channels.insert(motor.pwm_channel) {
                return Err(ConfigError::DuplicateChannel(motor.pwm_channel));
            }
            specs.push(motor.to_spec()?);
        }
        Ok(specs)
    }

    pub fn mixing_profile(&self) -> Result<MixingProfile, ConfigError> {
        match &self.mixing {
            MixingConfig::PseudoInverse => Ok(MixingProfile::PseudoInverse),
            MixingConfig::ReferenceFiveMotor => {
                let profile = MixingProfile::reference_five_motor();
                if let MixingProfile::Calibration(matrix) = &profile {
                    if matrix.ncols() != self.motors.len() {
                        return Err(ConfigError::MatrixShape {
                            rows: matrix.nrows(),
                            cols: matrix.ncols(),
                            motors: self.motors.len(),
                        });
                    }
                }
                Ok(profile)
            }
            MixingConfig::Calibration { matrix } => {
                let rows = matrix.len();
                let cols = matrix.first().map_or(0, |r| r.len());
                let ragged = matrix.iter().any(|r| r.len() != cols);
                if rows != AXIS_COUNT || cols != self.motors.len() || ragged {
                    return Err(ConfigError::MatrixShape { rows, cols, motors: self.motors.len() });
                }
                let flat: Vec<f64> = matrix.iter().flatten().copied().collect();
                Ok(MixingProfile::Calibration(DMatrix::from_row_slice(rows, cols, &flat)))
            }
        }
    }
}

impl MotorConfig {
    fn to_spec(&self) -> Result<MotorSpec, ConfigError> {
        let invalid = |reason| ConfigError::InvalidMotor { name: self.name.clone(), reason };

        let position = Vector3::from(self.position);
        let orientation = Vector3::from(self.orientation);
        if !position.iter().chain(orientation.iter()).all(|v| v.is_finite()) {
            return Err(invalid("non-finite position or orientation"));
        }
        if !self.scale.is_finite() {
            return Err(invalid("non-finite scale"));
        }
        let norm = orientation.norm();
        if norm < 1e-9 {
            return Err(invalid("orientation is a zero-length vector"));
        }
        if (norm - 1.0).abs() > 1e-6 {
            tracing::warn!("{}: orientation has length {:.4}, normalising", self.name, norm);
        }

        Ok(MotorSpec {
            name: self.name.clone(),
            position,
            orientation: orientation / norm,
            scale: self.scale,
            invert_rotation_direction: self.invert_rotation_direction,
            pwm: PwmOutput { channel: self.pwm_channel, invert: self.invert_pwm },
        })
    }
}
