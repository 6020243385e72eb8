use thiserror::Error;

use crate::registry::ActionKind;
use crate::schema::SchemaVersion;

#[derive(Debug, Error)]
pub enum ActionError {
    #[error("Invalid customization args for {kind}: {reason}")]
    Validation { kind: ActionKind, reason: String },
    #[error("Unknown action type '{action_type}' in learner action dict: {dict}")]
    UnknownActionType { action_type: String, dict: String },
    #[error("Invalid learner action dict: {reason}")]
    InvalidWireFormat { reason: String },
    #[error("Invalid schema version {0}: must be an integer >= 1")]
    InvalidSchemaVersion(u64),
    #[error("Latest schema version is already initialized to {current}")]
    SchemaVersionAlreadyInitialized { current: SchemaVersion },
}

impl ActionError {
    pub(crate) fn wire(reason: impl Into<String>) -> Self {
        Self::InvalidWireFormat {
            reason: reason.into(),
        }
    }

    /// `true` if a dict named an action type this build does not know.
    #[must_use]
    pub fn is_unknown_action_type(&self) -> bool {
        matches!(self, Self::UnknownActionType { .. })
    }

    #[must_use]
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation { .. })
    }
}

pub type Result<T> = std::result::Result<T, ActionError>;
