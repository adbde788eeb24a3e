//! First-run vs restart state for the transport solver.

use serde::{Deserialize, Serialize};

/// Whether the next solver launch starts fresh or continues from restart files.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RunMode {
    #[default]
    Fresh,
    Restarting,
}

impl RunMode {
    /// Mode after a successful solver step. `Restarting` is sticky.
    pub fn after_step(self) -> Self {
        RunMode::Restarting
    }

    /// Whether the solver invocation must carry the `restart` directive.
    pub fn restart_directive(self) -> Option<&'static str> {
        match self {
            RunMode::Fresh => None,
            RunMode::Restarting => Some("restart"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn successful_step_moves_to_restarting() {
        assert_eq!(RunMode::Fresh.after_step(), RunMode::Restarting);
        assert_eq!(RunMode::Restarting.after_step(), RunMode::Restarting);
    }

    #[test]
    fn only_restarting_appends_directive() {
        assert_eq!(RunMode::Fresh.restart_directive(), None);
        assert_eq!(RunMode::Restarting.restart_directive(), Some("restart"));
    }

    #[test]
    fn serializes_lowercase() {
        let json = serde_json::to_string(&RunMode::Restarting).expect("serialize");
        assert_eq!(json, "\"restarting\"");
    }
}
