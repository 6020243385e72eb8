//! Die Learner Action als Wert: Payload plus Schemaversion.

use crate::registry::{
    ActionArgsMut, ActionKind, ActionPayload, AnswerSubmitArgs, ExplorationQuitArgs,
    ExplorationStartArgs,
};
use crate::schema::SchemaVersion;

/// Ein aufgezeichnetes Lernenden-Ereignis.
///
/// Entsteht nur über [`ActionFactory`](crate::ActionFactory) (neue Ereignisse)
/// oder [`decode`](crate::decode) (historische Ereignisse). Der Tag steht für
/// die Lebensdauer des Werts fest; die Felder der Payload dürfen über
/// [`customization_args_mut`](Self::customization_args_mut) verändert werden.
#[derive(Debug, Clone, PartialEq)]
pub struct LearnerAction {
    payload: ActionPayload,
    schema_version: SchemaVersion,
}

impl LearnerAction {
    pub(crate) fn from_parts(payload: ActionPayload, schema_version: SchemaVersion) -> Self {
        Self {
            payload,
            schema_version,
        }
    }

    #[must_use]
    pub fn kind(&self) -> ActionKind {
        self.payload.kind()
    }

    #[must_use]
    pub fn schema_version(&self) -> SchemaVersion {
        self.schema_version
    }

    #[must_use]
    pub fn customization_args(&self) -> &ActionPayload {
        &self.payload
    }

    /// Veränderbarer Zugriff auf die Felder; die Variante bleibt fixiert.
    pub fn customization_args_mut(&mut self) -> ActionArgsMut<'_> {
        match &mut self.payload {
            ActionPayload::ExplorationStart(args) => ActionArgsMut::ExplorationStart(args),
            ActionPayload::AnswerSubmit(args) => ActionArgsMut::AnswerSubmit(args),
            ActionPayload::ExplorationQuit(args) => ActionArgsMut::ExplorationQuit(args),
        }
    }

    #[must_use]
    pub fn into_customization_args(self) -> ActionPayload {
        self.payload
    }

    #[must_use]
    pub fn state_name(&self) -> &str {
        self.payload.state_name()
    }

    #[must_use]
    pub fn as_exploration_start(&self) -> Option<&ExplorationStartArgs> {
        match &self.payload {
            ActionPayload::ExplorationStart(args) => Some(args),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_answer_submit(&self) -> Option<&AnswerSubmitArgs> {
        match &self.payload {
            ActionPayload::AnswerSubmit(args) => Some(args),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_exploration_quit(&self) -> Option<&ExplorationQuitArgs> {
        match &self.payload {
            ActionPayload::ExplorationQuit(args) => Some(args),
            _ => None,
        }
    }
}
