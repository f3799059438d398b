use std::fmt;

/// Startup failures. Any of these means the vehicle must not run.
#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(serde_json::Error),
    NoMotors,
    DuplicateMotor(String),
    DuplicateChannel(u8),
    InvalidMotor { name: String, reason: &'static str },
    InvalidTiming(&'static str),
    MatrixShape { rows: usize, cols: usize, motors: usize },
    AllocationShape { rows: usize, cols: usize },
    PseudoInverse(&'static str),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "cannot read config: {}", e),
            ConfigError::Parse(e) => write!(f, "malformed config: {}", e),
            ConfigError::NoMotors => write!(f, "config declares no motors"),
            ConfigError::DuplicateMotor(name) => write!(f, "motor '{}' declared twice", name),
            ConfigError::DuplicateChannel(ch) => write!(f, "pwm channel {} used by two motors", ch),
            ConfigError::InvalidMotor { name, reason } => write!(f, "motor '{}': {}", name, reason),
            ConfigError::InvalidTiming(what) => write!(f, "{} must be greater than zero", what),
            ConfigError::MatrixShape { rows, cols, motors } => write!(
                f,
                "mixing matrix is {}x{}, expected 6x{} for the configured motors",
                rows, cols, motors
            ),
            ConfigError::AllocationShape { rows, cols } => write!(
                f,
                "allocation matrix is {}x{}, expected one row of 6 coefficients per motor",
                rows, cols
            ),
            ConfigError::PseudoInverse(e) => write!(f, "cannot invert mixing matrix: {}", e),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::Io(e) => Some(e),
            ConfigError::Parse(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for ConfigError {
    fn from(e: std::io::Error) -> Self {
        ConfigError::Io(e)
    }
}

impl From<serde_json::Error> for ConfigError {
    fn from(e: serde_json::Error) -> Self {
        ConfigError::Parse(e)
    }
}

/// Transient I/O failures at the driver boundary; logged, never fatal
#[derive(Debug)]
pub enum DriverError {
    Serial(serialport::Error),
    Io(std::io::Error),
    PayloadTooLarge(usize),
    Rejected(String),
}

impl fmt::Display for DriverError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DriverError::Serial(e) => write!(f, "serial port: {}", e),
            DriverError::Io(e) => write!(f, "io: {}", e),
            DriverError::PayloadTooLarge(len) => write!(f, "payload of {} bytes too large", len),
            DriverError::Rejected(why) => write!(f, "rejected by driver: {}", why),
        }
    }
}

impl std::error::Error for DriverError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            DriverError::Serial(e) => Some(e),
            DriverError::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<serialport::Error> for DriverError {
    fn from(e: serialport::Error) -> Self {
        DriverError::Serial(e)
    }
}

impl From<std::io::Error> for DriverError {
    fn from(e: std::io::Error) -> Self {
        DriverError::Io(e)
    }
}
