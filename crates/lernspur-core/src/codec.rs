//! Umwandlung zwischen [`LearnerAction`] und dem Wire-Dict.
//!
//! ```json
//! {
//!   "action_type": "ExplorationQuit",
//!   "action_customization_args": {
//!     "state_name": { "value": "End" },
//!     "time_spent_in_state_in_msecs": { "value": 2000 }
//!   },
//!   "schema_version": 1
//! }
//! ```
//!
//! Decodieren ist alles-oder-nichts: unbekannte Tags, fehlende oder
//! zusätzliche Felder und unverpackte Werte werden abgelehnt.

use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{json, Value};

use crate::action::LearnerAction;
use crate::error::{ActionError, Result};
use crate::registry::{
    ActionArgs, ActionKind, ActionPayload, AnswerSubmitArgs, ExplorationQuitArgs,
    ExplorationStartArgs,
};
use crate::schema::SchemaVersion;

const ACTION_TYPE: &str = "action_type";
const CUSTOMIZATION_ARGS: &str = "action_customization_args";
const SCHEMA_VERSION: &str = "schema_version";

/// Serialisiert eine Action ins Wire-Dict. Total über alle Arten.
#[must_use]
pub fn encode(action: &LearnerAction) -> Value {
    json!({
        ACTION_TYPE: action.kind().as_str(),
        CUSTOMIZATION_ARGS: Value::Object(action.customization_args().to_wire_args()),
        SCHEMA_VERSION: action.schema_version().get(),
    })
}

/// Rekonstruiert eine Action aus einem Wire-Dict.
///
/// Die Schemaversion wird unverändert übernommen. Ein `action_type` außerhalb
/// der bekannten Arten ergibt [`ActionError::UnknownActionType`] mit dem
/// serialisierten Dict; jeder andere Strukturfehler ergibt
/// [`ActionError::InvalidWireFormat`].
pub fn decode(dict: &Value) -> Result<LearnerAction> {
    let obj = dict.as_object().ok_or_else(|| {
        ActionError::wire(format!("expected an object, found {}", json_type(dict)))
    })?;

    let tag = obj
        .get(ACTION_TYPE)
        .ok_or_else(|| ActionError::wire(format!("missing field `{ACTION_TYPE}`")))?
        .as_str()
        .ok_or_else(|| ActionError::wire(format!("`{ACTION_TYPE}` must be a string")))?;

    let Some(kind) = ActionKind::from_wire(tag) else {
        warn_unknown_action_type(tag);
        return Err(ActionError::UnknownActionType {
            action_type: tag.to_string(),
            dict: dict.to_string(),
        });
    };

    if let Some(key) = obj
        .keys()
        .find(|key| ![ACTION_TYPE, CUSTOMIZATION_ARGS, SCHEMA_VERSION].contains(&key.as_str()))
    {
        return Err(ActionError::wire(format!("unknown field `{key}`")));
    }

    let schema_version = obj
        .get(SCHEMA_VERSION)
        .ok_or_else(|| ActionError::wire(format!("missing field `{SCHEMA_VERSION}`")))
        .and_then(|raw| {
            SchemaVersion::deserialize(raw)
                .map_err(|e| ActionError::wire(format!("`{SCHEMA_VERSION}`: {e}")))
        })?;

    let args = obj
        .get(CUSTOMIZATION_ARGS)
        .ok_or_else(|| ActionError::wire(format!("missing field `{CUSTOMIZATION_ARGS}`")))?;
    let payload = decode_payload(kind, args)
        .map_err(|e| ActionError::wire(format!("{kind} {CUSTOMIZATION_ARGS}: {e}")))?;

    #[cfg(feature = "telemetry")]
    tracing::debug!(action_type = %kind, %schema_version, "decoded learner action");

    Ok(LearnerAction::from_parts(payload, schema_version))
}

/// Wie [`decode`], aber aus JSON-Text.
pub fn decode_str(text: &str) -> Result<LearnerAction> {
    let dict: Value = serde_json::from_str(text)
        .map_err(|e| ActionError::wire(format!("not valid JSON: {e}")))?;
    decode(&dict)
}

/// Liest verpackte Customization Args in die Payload der gegebenen Art.
///
/// Dieses `match` muss jede Art abdecken; eine neue Variante in
/// [`ActionKind`] ohne Zweig hier kompiliert nicht.
pub(crate) fn decode_payload(
    kind: ActionKind,
    args: &Value,
) -> std::result::Result<ActionPayload, serde_json::Error> {
    let payload = match kind {
        ActionKind::ExplorationStart => decode_args::<ExplorationStartArgs>(args)?.into_payload(),
        ActionKind::AnswerSubmit => decode_args::<AnswerSubmitArgs>(args)?.into_payload(),
        ActionKind::ExplorationQuit => decode_args::<ExplorationQuitArgs>(args)?.into_payload(),
    };
    Ok(payload)
}

fn decode_args<A: ActionArgs>(args: &Value) -> std::result::Result<A, serde_json::Error> {
    A::deserialize(args)
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(feature = "telemetry")]
fn warn_unknown_action_type(tag: &str) {
    tracing::warn!(action_type = tag, "rejecting learner action with unknown action type");
}

#[cfg(not(feature = "telemetry"))]
fn warn_unknown_action_type(_tag: &str) {}

impl LearnerAction {
    /// Kurzform für [`encode`].
    #[must_use]
    pub fn to_wire(&self) -> Value {
        encode(self)
    }
}

impl Serialize for LearnerAction {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        encode(self).serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for LearnerAction {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let dict = Value::deserialize(deserializer)?;
        decode(&dict).map_err(serde::de::Error::custom)
    }
}

impl FromStr for LearnerAction {
    type Err = ActionError;

    fn from_str(s: &str) -> Result<Self> {
        decode_str(s)
    }
}
