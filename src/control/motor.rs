use crate::estimation::Vector3;

/// Driver-side PWM descriptor; the core only passes it through
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PwmOutput {
    pub channel: u8,
    /// Duty cycle is inverted by the driver (active-low ESC input)
    pub invert: bool,
}

/// One physical thruster, immutable after config load
#[derive(Debug, Clone, PartialEq)]
pub struct MotorSpec {
    pub name: String,
    /// Mount point in the body frame (m)
    pub position: Vector3,
    /// Thrust direction for positive power, unit length
    pub orientation: Vector3,
    pub scale: f64,
    pub invert_rotation_direction: bool,
    pub pwm: PwmOutput,
}

impl MotorSpec {
    /// Scale, direction-correct and saturate one mixed value for the driver
    pub fn output_power(&self, mixed: f64) -> f64 {
        if !mixed.is_finite() {
            tracing::warn!("{}: non-finite power {}, holding at 0", self.name, mixed);
            return 0.0;
        }
        let direction = if self.invert_rotation_direction { -1.0 } else { 1.0 };
        (mixed * self.scale * direction).clamp(-1.0, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn motor(scale: f64, invert: bool) -> MotorSpec {
        MotorSpec {
            name: "test".to_string(),
            position: Vector3::zeros(),
            orientation: Vector3::new(0.0, 0.0, 1.0),
            scale,
            invert_rotation_direction: invert,
            pwm: PwmOutput { channel: 0, invert: false },
        }
    }

    #[test]
    fn test_scale_and_clamp() {
        let m = motor(0.5, false);
        assert_eq!(m.output_power(1.0), 0.5);
        assert_eq!(m.output_power(4.0), 1.0);
        assert_eq!(m.output_power(-4.0), -1.0);
    }

    #[test]
    fn test_inverted_rotation() {
        let m = motor(1.0, true);
        assert_eq!(m.output_power(0.25), -0.25);
    }

    #[test]
    fn test_nan_is_held_at_zero() {
        let m = motor(1.0, false);
        assert_eq!(m.output_power(f64::NAN), 0.0);
        assert_eq!(m.output_power(f64::INFINITY), 0.0);
    }
}
