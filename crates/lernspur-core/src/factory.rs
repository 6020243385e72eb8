//! Erzeugung neuer Learner Actions mit der aktuellen Schemaversion.

use serde_json::{json, Map, Value};

use crate::action::LearnerAction;
use crate::codec::decode_payload;
use crate::error::{ActionError, Result};
use crate::registry::{
    ActionArgs, ActionKind, AnswerSubmitArgs, ExplorationQuitArgs, ExplorationStartArgs,
    TimeSpentMsecs,
};
use crate::schema::{latest_schema_version, SchemaVersion};

/// Stempelt neue Actions mit einer festen Schemaversion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActionFactory {
    schema_version: SchemaVersion,
}

impl Default for ActionFactory {
    fn default() -> Self {
        Self::latest()
    }
}

impl ActionFactory {
    #[must_use]
    pub fn new(schema_version: SchemaVersion) -> Self {
        Self { schema_version }
    }

    /// Factory mit der prozessweiten "latest schema version".
    #[must_use]
    pub fn latest() -> Self {
        Self::new(latest_schema_version())
    }

    #[must_use]
    pub fn schema_version(&self) -> SchemaVersion {
        self.schema_version
    }

    /// Die Art folgt aus dem Payload-Typ.
    #[must_use]
    pub fn create<A: ActionArgs>(&self, args: A) -> LearnerAction {
        LearnerAction::from_parts(args.into_payload(), self.schema_version)
    }

    #[must_use]
    pub fn create_exploration_start(&self, state_name: impl Into<String>) -> LearnerAction {
        self.create(ExplorationStartArgs {
            state_name: state_name.into(),
        })
    }

    #[must_use]
    pub fn create_answer_submit(&self, args: AnswerSubmitArgs) -> LearnerAction {
        self.create(args)
    }

    #[must_use]
    pub fn create_exploration_quit(
        &self,
        state_name: impl Into<String>,
        time_spent_in_state_msecs: TimeSpentMsecs,
    ) -> LearnerAction {
        self.create(ExplorationQuitArgs {
            state_name: state_name.into(),
            time_spent_in_state_msecs,
        })
    }

    /// Erzeugt eine Action aus untypisierten, unverpackten Feldern.
    ///
    /// `args` ist ein flaches Objekt mit den Wire-Keys der Art, z. B.
    /// `{"state_name": "Intro"}`. Fehlende, zusätzliche oder falsch typisierte
    /// Felder ergeben [`ActionError::Validation`].
    pub fn create_from_args(&self, kind: ActionKind, args: &Value) -> Result<LearnerAction> {
        let fields = args
            .as_object()
            .ok_or_else(|| validation(kind, "customization args must be a JSON object"))?;

        let expected = kind.wire_keys();
        if let Some(extra) = fields.keys().find(|key| !expected.contains(&key.as_str())) {
            return Err(validation(kind, format!("unexpected field `{extra}`")));
        }
        if let Some(missing) = expected.iter().find(|key| !fields.contains_key(**key)) {
            return Err(validation(kind, format!("missing field `{missing}`")));
        }

        let wrapped: Map<String, Value> = fields
            .iter()
            .map(|(key, value)| (key.clone(), json!({ "value": value })))
            .collect();
        let payload = decode_payload(kind, &Value::Object(wrapped))
            .map_err(|e| validation(kind, e.to_string()))?;

        Ok(LearnerAction::from_parts(payload, self.schema_version))
    }
}

fn validation(kind: ActionKind, reason: impl Into<String>) -> ActionError {
    ActionError::Validation {
        kind,
        reason: reason.into(),
    }
}
