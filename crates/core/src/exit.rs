//! Process exit codes understood by the calling automation tool.
//!
//! | Code | Meaning                                              |
//! |------|------------------------------------------------------|
//! | 0    | enough free space, ingestion may proceed             |
//! | 1    | still short of space after any reclaim attempt       |
//! | 2    | operational error (config, filesystem, client API)   |

use crate::gatekeeper::{GatekeeperError, Outcome};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExitStatus {
    Proceed,
    InsufficientSpace,
    OperationalError,
}

impl ExitStatus {
    pub const fn code(self) -> u8 {
        match self {
            ExitStatus::Proceed => 0,
            ExitStatus::InsufficientSpace => 1,
            ExitStatus::OperationalError => 2,
        }
    }

    pub fn from_result(result: &Result<Outcome, GatekeeperError>) -> Self {
        match result {
            Ok(outcome) => Self::from(outcome),
            Err(e) => Self::from(e),
        }
    }
}

impl From<&Outcome> for ExitStatus {
    fn from(outcome: &Outcome) -> Self {
        match outcome {
            Outcome::Sufficient { .. } | Outcome::Reclaimed { .. } => ExitStatus::Proceed,
            Outcome::Insufficient { .. } => ExitStatus::InsufficientSpace,
        }
    }
}

impl From<&GatekeeperError> for ExitStatus {
    fn from(error: &GatekeeperError) -> Self {
        match error {
            GatekeeperError::Filesystem(_)
            | GatekeeperError::ClientApi(_)
            | GatekeeperError::Config(_) => ExitStatus::OperationalError,
        }
    }
}

impl From<ExitStatus> for std::process::ExitCode {
    fn from(status: ExitStatus) -> Self {
        std::process::ExitCode::from(status.code())
    }
}
