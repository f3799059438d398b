/**
 * Vehicle Controller
 *
 * Owns the command-to-actuator path:
 * 1. accepts a continuous local wrench target (ground control sticks)
 * 2. accepts discrete remote command pulses (keyboard remote)
 * 3. picks the wrench source on every tick
 * 4. mixes the wrench and hands per-thruster power to the actuator driver
 *
 * Local input wins while it keeps arriving; once it has been quiet for the
 * ground-control timeout the debounced remote wrench takes over.
 */

use super::debouncer::RemoteCommandDebouncer;
use super::mixer::ActuatorMixer;
use super::motor::{MotorSpec, PwmOutput};
use super::wrench::Wrench;
use crate::config::DroneConfig;
use crate::error::{ConfigError, DriverError};
use crate::estimation::Timestamp;
use crate::fusion::{EventSink, TelemetryEvent};

pub const DEFAULT_GROUND_CONTROL_TIMEOUT_MS: u64 = 1000;

/// Outbound side of the PWM driver
pub trait ActuatorDriver {
    /// `power` is normalised to [-1, 1]; scaling to a duty cycle is the driver's job
    fn set_duty_cycle(&mut self, output: &PwmOutput, power: f64) -> Result<(), DriverError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WrenchSource {
    Local,
    Remote,
}

pub struct VehicleController<D: ActuatorDriver> {
    driver: D,
    mixer: ActuatorMixer,
    motors: Vec<MotorSpec>,
    debouncer: RemoteCommandDebouncer,
    local_wrench: Wrench,
    last_local_input: Option<Timestamp>,
    ground_control_timeout_ms: u64,
    last_outputs: Vec<f64>,
}

impl<D: ActuatorDriver> VehicleController<D> {
    pub fn new(
        driver: D,
        motors: Vec<MotorSpec>,
        mixer: ActuatorMixer,
        debouncer: RemoteCommandDebouncer,
        ground_control_timeout_ms: u64,
    ) -> Result<Self, ConfigError> {
        if mixer.motor_count() != motors.len() {
            return Err(ConfigError::MatrixShape {
                rows: 6,
                cols: mixer.motor_count(),
                motors: motors.len(),
            });
        }
        let last_outputs = vec![0.0; motors.len()];
        Ok(Self {
            driver,
            mixer,
            motors,
            debouncer,
            local_wrench: Wrench::default(),
            last_local_input: None,
            ground_control_timeout_ms,
            last_outputs,
        })
    }

    pub fn from_config(driver: D, config: &DroneConfig) -> Result<Self, ConfigError> {
        let motors = config.motor_specs()?;
        let mixer = ActuatorMixer::new(&motors, &config.center_of_mass(), &config.mixing_profile()?)?;
        let debouncer = RemoteCommandDebouncer::new(config.remote_keyup_timeout_ms);
        Self::new(driver, motors, mixer, debouncer, config.ground_control_timeout_ms)
    }

    /// New local target; applied immediately
    pub fn set_local_wrench<S: EventSink + ?Sized>(&mut self, wrench: Wrench, now: Timestamp, sink: &mut S) {
        self.local_wrench = wrench.clamped();
        self.last_local_input = Some(now);
        self.apply_wrench(self.local_wrench, sink);
    }

    /// Remote key pulse. Returns false for unknown commands.
    pub fn on_remote_pulse(&mut self, command: &str, now: Timestamp) -> bool {
        self.debouncer.pulse(command, now).is_some()
    }

    pub fn active_source(&self, now: Timestamp) -> WrenchSource {
        match self.last_local_input {
            Some(t) if now.saturating_sub(t) < self.ground_control_timeout_ms => WrenchSource::Local,
            _ => WrenchSource::Remote,
        }
    }

    /// Periodic control step: release expired remote keys, select the
    /// source and drive the motors. Returns the wrench that was applied.
    pub fn tick<S: EventSink + ?Sized>(&mut self, now: Timestamp, sink: &mut S) -> Wrench {
        self.debouncer.expire(now);
        let wrench = match self.active_source(now) {
            WrenchSource::Local => self.local_wrench,
            WrenchSource::Remote => self.debouncer.wrench(),
        };
        self.apply_wrench(wrench, sink);
        wrench
    }

    /// Mix `wrench` and write every motor. Driver failures are logged and
    /// skipped so one bad channel never stalls the others.
    pub fn apply_wrench<S: EventSink + ?Sized>(&mut self, wrench: Wrench, sink: &mut S) {
        let mixed = self.mixer.apply(&wrench);
        tracing::debug!(
            "virtual power set to [{}, {}, {}, {}, {}, {}]",
            wrench.heave, wrench.sway, wrench.surge, wrench.yaw, wrench.pitch, wrench.roll
        );

        for (i, (motor, value)) in self.motors.iter().zip(mixed.iter()).enumerate() {
            let power = motor.output_power(*value);
            self.last_outputs[i] = power;
            if let Err(e) = self.driver.set_duty_cycle(&motor.pwm, power) {
                tracing::warn!("{} (channel {}): write failed: {}", motor.name, motor.pwm.channel, e);
            }
        }

        sink.emit(TelemetryEvent::Wrench(wrench));
    }

    /// Zero every input and drive all motors to 0
    pub fn stop<S: EventSink + ?Sized>(&mut self, sink: &mut S) {
        self.local_wrench = Wrench::default();
        self.last_local_input = None;
        self.debouncer.reset();
        self.apply_wrench(Wrench::default(), sink);
    }

    pub fn motor_outputs(&self) -> &[f64] {
        &self.last_outputs
    }

    pub fn motors(&self) -> &[MotorSpec] {
        &self.motors
    }

    pub fn mixer(&self) -> &ActuatorMixer {
        &self.mixer
    }

    pub fn debouncer(&self) -> &RemoteCommandDebouncer {
        &self.debouncer
    }

    pub fn driver(&self) -> &D {
        &self.driver
    }

    pub fn driver_mut(&mut self) -> &mut D {
        &mut self.driver
    }
}
