use std::fmt;
use std::str::FromStr;

/// The LeRobot CLI entry points this runner knows how to launch.
///
/// The set is closed: anything else is rejected during validation. Adding an
/// entry point means adding a variant here; the runner itself does not care
/// which one it launches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CommandKind {
    Record,
    Calibrate,
    Teleoperate,
    FindPort,
}

impl CommandKind {
    pub const ALL: [CommandKind; 4] = [
        CommandKind::Record,
        CommandKind::Calibrate,
        CommandKind::Teleoperate,
        CommandKind::FindPort,
    ];

    /// The executable name as it appears on `PATH`.
    pub fn as_str(self) -> &'static str {
        match self {
            CommandKind::Record => "lerobot-record",
            CommandKind::Calibrate => "lerobot-calibrate",
            CommandKind::Teleoperate => "lerobot-teleoperate",
            CommandKind::FindPort => "lerobot-find-port",
        }
    }
}

impl fmt::Display for CommandKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CommandKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        CommandKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| format!("unsupported command: {s}"))
    }
}

/// Lifecycle of the runner's single job slot.
///
/// - `Idle`: nothing active; `start` is accepted.
/// - `Starting`: session opened, worker spawned, child not yet launched.
/// - `Running`: child process is alive and being drained.
/// - `Stopping`: `stop` delivered the cooperative signal and is waiting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RunnerState {
    #[default]
    Idle,
    Starting,
    Running,
    Stopping,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn command_kind_round_trips_through_its_name() {
        for kind in CommandKind::ALL {
            assert_eq!(kind.as_str().parse::<CommandKind>(), Ok(kind));
        }
    }

    #[test]
    fn command_kind_rejects_near_misses() {
        assert!("lerobot_record".parse::<CommandKind>().is_err());
        assert!("LEROBOT-RECORD".parse::<CommandKind>().is_err());
        assert!(" lerobot-record".parse::<CommandKind>().is_err());
    }
}
