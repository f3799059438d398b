/**
 * Remote Command Debouncer
 *
 * The ground station sends a stream of pulses while a key is held. Each
 * pulse (re)arms a per-command deadline; once no pulse arrives within the
 * keyup timeout the command is released.
 *
 * Per command:  Idle --pulse--> Active --pulse--> Active --timeout--> Idle
 */

use super::wrench::Wrench;
use crate::estimation::Timestamp;

pub const DEFAULT_KEYUP_TIMEOUT_MS: u64 = 60;

/// Every command the remote can send
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RemoteCommand {
    PitchUp,
    PitchDown,
    RollLeft,
    RollRight,
    YawLeft,
    YawRight,
    SurgeForward,
    SurgeBack,
    HeaveUp,
    HeaveDown,
    VisibleLed,
    InfraredLed,
    UltravioletLed,
}

impl RemoteCommand {
    pub const COUNT: usize = 13;

    pub const ALL: [RemoteCommand; Self::COUNT] = [
        RemoteCommand::PitchUp,
        RemoteCommand::PitchDown,
        RemoteCommand::RollLeft,
        RemoteCommand::RollRight,
        RemoteCommand::YawLeft,
        RemoteCommand::YawRight,
        RemoteCommand::SurgeForward,
        RemoteCommand::SurgeBack,
        RemoteCommand::HeaveUp,
        RemoteCommand::HeaveDown,
        RemoteCommand::VisibleLed,
        RemoteCommand::InfraredLed,
        RemoteCommand::UltravioletLed,
    ];

    /// Wire name as sent by the ground station
    pub fn name(&self) -> &'static str {
        match self {
            RemoteCommand::PitchUp => "pitch_up",
            RemoteCommand::PitchDown => "pitch_down",
            RemoteCommand::RollLeft => "roll_left",
            RemoteCommand::RollRight => "roll_right",
            RemoteCommand::YawLeft => "yaw_left",
            RemoteCommand::YawRight => "yaw_right",
            RemoteCommand::SurgeForward => "surge_forward",
            RemoteCommand::SurgeBack => "surge_back",
            RemoteCommand::HeaveUp => "heave_up",
            RemoteCommand::HeaveDown => "heave_down",
            RemoteCommand::VisibleLed => "visible-led",
            RemoteCommand::InfraredLed => "infrared-led",
            RemoteCommand::UltravioletLed => "ultraviolet-led",
        }
    }

    pub fn parse(name: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|cmd| cmd.name() == name)
    }

    /// Light toggles; they never contribute to the wrench
    pub fn is_auxiliary(&self) -> bool {
        matches!(
            self,
            RemoteCommand::VisibleLed | RemoteCommand::InfraredLed | RemoteCommand::UltravioletLed
        )
    }

    fn index(&self) -> usize {
        *self as usize
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandState {
    Idle,
    Active { deadline: Timestamp },
}

#[derive(Debug, Clone)]
pub struct RemoteCommandDebouncer {
    states: [CommandState; RemoteCommand::COUNT],
    timeout_ms: u64,
    wrench: Wrench,
}

impl Default for RemoteCommandDebouncer {
    fn default() -> Self {
        Self::new(DEFAULT_KEYUP_TIMEOUT_MS)
    }
}

impl RemoteCommandDebouncer {
    pub fn new(timeout_ms: u64) -> Self {
        Self {
            states: [CommandState::Idle; RemoteCommand::COUNT],
            timeout_ms,
            wrench: Wrench::default(),
        }
    }

    /// Handle a pulse by wire name. Unknown names are dropped and yield `None`.
    pub fn pulse(&mut self, name: &str, now: Timestamp) -> Option<Wrench> {
        match RemoteCommand::parse(name) {
            Some(cmd) => Some(self.pulse_command(cmd, now)),
            None => {
                tracing::debug!("ignoring unknown remote command '{}'", name);
                None
            }
        }
    }

    /// Activate `cmd` and replace its deadline with `now + timeout`.
    /// Commands already lapsed at `now` are released first.
    pub fn pulse_command(&mut self, cmd: RemoteCommand, now: Timestamp) -> Wrench {
        self.expire(now);
        self.states[cmd.index()] = CommandState::Active {
            deadline: now.saturating_add(self.timeout_ms),
        };
        self.recompute();
        self.wrench
    }

    /// Release every command whose deadline has passed.
    /// Returns the new wrench if anything changed.
    pub fn expire(&mut self, now: Timestamp) -> Option<Wrench> {
        let mut changed = false;
        for cmd in RemoteCommand::ALL {
            if let CommandState::Active { deadline } = self.states[cmd.index()] {
                if now >= deadline {
                    tracing::info!("remote command keyup timeout for command: {}", cmd.name());
                    self.states[cmd.index()] = CommandState::Idle;
                    changed = true;
                }
            }
        }
        if changed {
            self.recompute();
            Some(self.wrench)
        } else {
            None
        }
    }

    /// Earliest pending deadline, for schedulers that sleep until the next expiry
    pub fn next_deadline(&self) -> Option<Timestamp> {
        self.states
            .iter()
            .filter_map(|state| match state {
                CommandState::Active { deadline } => Some(*deadline),
                CommandState::Idle => None,
            })
            .min()
    }

    pub fn state(&self, cmd: RemoteCommand) -> CommandState {
        self.states[cmd.index()]
    }

    pub fn is_active(&self, cmd: RemoteCommand) -> bool {
        matches!(self.states[cmd.index()], CommandState::Active { .. })
    }

    pub fn wrench(&self) -> Wrench {
        self.wrench
    }

    pub fn timeout_ms(&self) -> u64 {
        self.timeout_ms
    }

    pub fn reset(&mut self) {
        self.states = [CommandState::Idle; RemoteCommand::COUNT];
        self.wrench = Wrench::default();
    }

    fn recompute(&mut self) {
        use RemoteCommand::*;
        // heave and sway have no remote binding
        self.wrench = Wrench {
            heave: 0.0,
            sway: 0.0,
            surge: self.axis(SurgeBack, SurgeForward),
            yaw: self.axis(YawLeft, YawRight),
            pitch: self.axis(PitchDown, PitchUp),
            roll: self.axis(RollLeft, RollRight),
        };
    }

    fn axis(&self, negative: RemoteCommand, positive: RemoteCommand) -> f64 {
        match (self.is_active(negative), self.is_active(positive)) {
            (true, false) => -1.0,
            (false, true) => 1.0,
            _ => 0.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_names() {
        for cmd in RemoteCommand::ALL {
            assert_eq!(RemoteCommand::parse(cmd.name()), Some(cmd));
        }
        assert_eq!(RemoteCommand::parse("barrel_roll"), None);
        assert_eq!(RemoteCommand::parse("surge"), None);
    }

    #[test]
    fn test_single_command_until_timeout() {
        let mut debouncer = RemoteCommandDebouncer::new(60);
        let wrench = debouncer.pulse("surge_forward", 1000).unwrap();
        assert_eq!(wrench.surge, 1.0);

        assert_eq!(debouncer.expire(1059), None);
        assert_eq!(debouncer.wrench().surge, 1.0);

        let released = debouncer.expire(1060).unwrap();
        assert_eq!(released.surge, 0.0);
        assert_eq!(debouncer.state(RemoteCommand::SurgeForward), CommandState::Idle);
    }

    #[test]
    fn test_opposites_cancel() {
        let mut debouncer = RemoteCommandDebouncer::new(60);
        debouncer.pulse("surge_forward", 0);
        let wrench = debouncer.pulse("surge_back", 30).unwrap();
        assert_eq!(wrench.surge, 0.0);

        // forward expires first, back is still held
        let wrench = debouncer.expire(60).unwrap();
        assert_eq!(wrench.surge, -1.0);
        let wrench = debouncer.expire(90).unwrap();
        assert_eq!(wrench.surge, 0.0);
    }

    #[test]
    fn test_pulse_releases_lapsed_commands() {
        let mut debouncer = RemoteCommandDebouncer::new(60);
        debouncer.pulse("surge_forward", 0);
        let wrench = debouncer.pulse("surge_back", 100).unwrap();
        assert_eq!(wrench.surge, -1.0);
        assert_eq!(debouncer.wrench().surge, -1.0);
        assert_eq!(debouncer.state(RemoteCommand::SurgeForward), CommandState::Idle);
    }

    #[test]
    fn test_repulse_replaces_deadline() {
        let mut debouncer = RemoteCommandDebouncer::new(60);
        debouncer.pulse("yaw_right", 0);
        debouncer.pulse("yaw_right", 50);
        assert_eq!(
            debouncer.state(RemoteCommand::YawRight),
            CommandState::Active { deadline: 110 }
        );
        // the first deadline is gone, not scheduled alongside
        assert_eq!(debouncer.expire(60), None);
        assert_eq!(debouncer.wrench().yaw, 1.0);
        assert!(debouncer.expire(110).is_some());
        assert_eq!(debouncer.wrench().yaw, 0.0);
    }

    #[test]
    fn test_axis_bindings() {
        let mut debouncer = RemoteCommandDebouncer::default();
        debouncer.pulse("pitch_down", 0);
        debouncer.pulse("roll_right", 0);
        let wrench = debouncer.pulse("yaw_left", 0).unwrap();
        assert_eq!(wrench.pitch, -1.0);
        assert_eq!(wrench.roll, 1.0);
        assert_eq!(wrench.yaw, -1.0);
        assert_eq!(wrench.surge, 0.0);
    }

    #[test]
    fn test_heave_and_sway_stay_zero() {
        let mut debouncer = RemoteCommandDebouncer::default();
        let wrench = debouncer.pulse("heave_up", 0).unwrap();
        assert!(debouncer.is_active(RemoteCommand::HeaveUp));
        assert_eq!(wrench.heave, 0.0);
        assert_eq!(wrench.sway, 0.0);
    }

    #[test]
    fn test_unknown_and_auxiliary_commands() {
        let mut debouncer = RemoteCommandDebouncer::default();
        assert_eq!(debouncer.pulse("launch_torpedo", 0), None);

        let wrench = debouncer.pulse("visible-led", 0).unwrap();
        assert!(wrench.is_zero());
        assert!(debouncer.is_active(RemoteCommand::VisibleLed));
        assert!(RemoteCommand::VisibleLed.is_auxiliary());
        assert!(!RemoteCommand::HeaveUp.is_auxiliary());
    }

    #[test]
    fn test_next_deadline_and_reset() {
        let mut debouncer = RemoteCommandDebouncer::new(100);
        assert_eq!(debouncer.next_deadline(), None);
        debouncer.pulse("roll_left", 40);
        debouncer.pulse("pitch_up", 10);
        assert_eq!(debouncer.next_deadline(), Some(110));

        debouncer.reset();
        assert_eq!(debouncer.next_deadline(), None);
        assert!(debouncer.wrench().is_zero());
    }
}
