//! Die geschlossene Menge der Learner-Action-Arten und ihrer Payloads.
//!
//! Dieses Modul ist die einzige Quelle der Wahrheit dafür, welche Arten es
//! gibt und welche Felder jede Art trägt. Eine neue Art bedeutet: Variante in
//! [`ActionKind`], [`ActionPayload`] und [`ActionArgsMut`] ergänzen, eine
//! Payload-Struktur mit [`ActionArgs`]-Impl anlegen; der Compiler meldet dann
//! jedes `match` in Factory und Codec, das die Art noch nicht kennt.
//!
//! Die Wire-Keys der Felder sind Kompatibilitätsvertrag mit persistierten
//! Daten und dürfen nur mit einem Schemaversions-Sprung geändert werden.

use std::fmt;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::{json, Map, Number, Value};

/// Diskriminante einer Learner Action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ActionKind {
    ExplorationStart,
    AnswerSubmit,
    ExplorationQuit,
}

impl ActionKind {
    /// Alle Arten in Deklarationsreihenfolge.
    pub const ALL: [ActionKind; 3] = [
        ActionKind::ExplorationStart,
        ActionKind::AnswerSubmit,
        ActionKind::ExplorationQuit,
    ];

    /// Der Wert von `action_type` im Wire-Dict.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            ActionKind::ExplorationStart => "ExplorationStart",
            ActionKind::AnswerSubmit => "AnswerSubmit",
            ActionKind::ExplorationQuit => "ExplorationQuit",
        }
    }

    /// Löst einen Wire-Tag auf; `None` für alles außerhalb der geschlossenen Menge.
    #[must_use]
    pub fn from_wire(tag: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.as_str() == tag)
    }

    /// Die exakten Keys unter `action_customization_args` für diese Art.
    #[must_use]
    pub fn wire_keys(self) -> &'static [&'static str] {
        match self {
            ActionKind::ExplorationStart => &[keys::STATE_NAME],
            ActionKind::AnswerSubmit => &[
                keys::STATE_NAME,
                keys::DEST_STATE_NAME,
                keys::INTERACTION_ID,
                keys::SUBMITTED_ANSWER,
                keys::FEEDBACK,
                keys::ANSWER_TIME_SPENT,
            ],
            ActionKind::ExplorationQuit => &[keys::STATE_NAME, keys::QUIT_TIME_SPENT],
        }
    }
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

mod keys {
    pub const STATE_NAME: &str = "state_name";
    pub const DEST_STATE_NAME: &str = "dest_state_name";
    pub const INTERACTION_ID: &str = "interaction_id";
    pub const SUBMITTED_ANSWER: &str = "submitted_answer";
    pub const FEEDBACK: &str = "feedback";
    // AnswerSubmit und ExplorationQuit schreiben die Verweildauer unter
    // unterschiedlichen Keys.
    pub const ANSWER_TIME_SPENT: &str = "time_spent_state_in_msecs";
    pub const QUIT_TIME_SPENT: &str = "time_spent_in_state_in_msecs";
}

/// Verweildauer in Millisekunden; immer eine endliche JSON-Zahl.
///
/// Hält die Zahl so, wie sie im Wire-Dict stand: `1500` bleibt `1500`,
/// `1500.5` bleibt `1500.5`. Gleichheit vergleicht den Zahlenwert.
#[derive(Debug, Clone)]
pub struct TimeSpentMsecs(Number);

impl TimeSpentMsecs {
    /// `None` für NaN und ±∞, die kein JSON-Wert darstellen kann.
    #[must_use]
    pub fn new(msecs: f64) -> Option<Self> {
        Number::from_f64(msecs).map(Self)
    }

    #[must_use]
    pub fn as_f64(&self) -> f64 {
        // Ohne `arbitrary_precision` liefert jede `Number` einen f64.
        self.0.as_f64().unwrap_or_default()
    }

    fn to_value(&self) -> Value {
        Value::Number(self.0.clone())
    }
}

impl From<u32> for TimeSpentMsecs {
    fn from(msecs: u32) -> Self {
        Self(Number::from(msecs))
    }
}

impl From<u64> for TimeSpentMsecs {
    fn from(msecs: u64) -> Self {
        Self(Number::from(msecs))
    }
}

impl PartialEq for TimeSpentMsecs {
    fn eq(&self, other: &Self) -> bool {
        self.as_f64() == other.as_f64()
    }
}

impl fmt::Display for TimeSpentMsecs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl<'de> Deserialize<'de> for TimeSpentMsecs {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Number::deserialize(deserializer).map(Self)
    }
}

/// Payload von `ExplorationStart`.
///
/// `Deserialize` liest die Wire-Form: jedes Feld als `{"value": ...}`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ExplorationStartArgs {
    #[serde(deserialize_with = "unwrap_value")]
    pub state_name: String,
}

/// Payload von `AnswerSubmit`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AnswerSubmitArgs {
    #[serde(deserialize_with = "unwrap_value")]
    pub state_name: String,
    #[serde(deserialize_with = "unwrap_value")]
    pub dest_state_name: String,
    #[serde(deserialize_with = "unwrap_value")]
    pub interaction_id: String,
    #[serde(deserialize_with = "unwrap_value")]
    pub submitted_answer: String,
    #[serde(deserialize_with = "unwrap_value")]
    pub feedback: String,
    #[serde(
        rename = "time_spent_state_in_msecs",
        deserialize_with = "unwrap_value"
    )]
    pub time_spent_in_state_msecs: TimeSpentMsecs,
}

/// Payload von `ExplorationQuit`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ExplorationQuitArgs {
    #[serde(deserialize_with = "unwrap_value")]
    pub state_name: String,
    #[serde(
        rename = "time_spent_in_state_in_msecs",
        deserialize_with = "unwrap_value"
    )]
    pub time_spent_in_state_msecs: TimeSpentMsecs,
}

mod sealed {
    pub trait Sealed {}
    impl Sealed for super::ExplorationStartArgs {}
    impl Sealed for super::AnswerSubmitArgs {}
    impl Sealed for super::ExplorationQuitArgs {}
}

/// Typ-Ebene der Tabelle Art → Payload.
///
/// Nur die Payload-Strukturen dieses Crates implementieren das Trait, daher
/// kann eine Action nie mit nicht passender Art/Payload-Kombination entstehen.
pub trait ActionArgs: sealed::Sealed + DeserializeOwned + Sized {
    const KIND: ActionKind;

    fn into_payload(self) -> ActionPayload;

    /// Projektion auf `action_customization_args`, jedes Feld verpackt.
    fn to_wire_args(&self) -> Map<String, Value>;
}

impl ActionArgs for ExplorationStartArgs {
    const KIND: ActionKind = ActionKind::ExplorationStart;

    fn into_payload(self) -> ActionPayload {
        ActionPayload::ExplorationStart(self)
    }

    fn to_wire_args(&self) -> Map<String, Value> {
        wire_args([(keys::STATE_NAME, self.state_name.as_str().into())])
    }
}

impl ActionArgs for AnswerSubmitArgs {
    const KIND: ActionKind = ActionKind::AnswerSubmit;

    fn into_payload(self) -> ActionPayload {
        ActionPayload::AnswerSubmit(self)
    }

    fn to_wire_args(&self) -> Map<String, Value> {
        wire_args([
            (keys::STATE_NAME, self.state_name.as_str().into()),
            (keys::DEST_STATE_NAME, self.dest_state_name.as_str().into()),
            (keys::INTERACTION_ID, self.interaction_id.as_str().into()),
            (keys::SUBMITTED_ANSWER, self.submitted_answer.as_str().into()),
            (keys::FEEDBACK, self.feedback.as_str().into()),
            (keys::ANSWER_TIME_SPENT, self.time_spent_in_state_msecs.to_value()),
        ])
    }
}

impl ActionArgs for ExplorationQuitArgs {
    const KIND: ActionKind = ActionKind::ExplorationQuit;

    fn into_payload(self) -> ActionPayload {
        ActionPayload::ExplorationQuit(self)
    }

    fn to_wire_args(&self) -> Map<String, Value> {
        wire_args([
            (keys::STATE_NAME, self.state_name.as_str().into()),
            (keys::QUIT_TIME_SPENT, self.time_spent_in_state_msecs.to_value()),
        ])
    }
}

/// Die Customization Args einer Action; die Variante ist ihr Tag.
#[derive(Debug, Clone, PartialEq)]
pub enum ActionPayload {
    ExplorationStart(ExplorationStartArgs),
    AnswerSubmit(AnswerSubmitArgs),
    ExplorationQuit(ExplorationQuitArgs),
}

impl ActionPayload {
    #[must_use]
    pub fn kind(&self) -> ActionKind {
        match self {
            ActionPayload::ExplorationStart(_) => ActionKind::ExplorationStart,
            ActionPayload::AnswerSubmit(_) => ActionKind::AnswerSubmit,
            ActionPayload::ExplorationQuit(_) => ActionKind::ExplorationQuit,
        }
    }

    /// Jede Art referenziert den State, in dem sie aufgetreten ist.
    #[must_use]
    pub fn state_name(&self) -> &str {
        match self {
            ActionPayload::ExplorationStart(args) => &args.state_name,
            ActionPayload::AnswerSubmit(args) => &args.state_name,
            ActionPayload::ExplorationQuit(args) => &args.state_name,
        }
    }

    pub(crate) fn to_wire_args(&self) -> Map<String, Value> {
        match self {
            ActionPayload::ExplorationStart(args) => args.to_wire_args(),
            ActionPayload::AnswerSubmit(args) => args.to_wire_args(),
            ActionPayload::ExplorationQuit(args) => args.to_wire_args(),
        }
    }
}

/// Veränderbarer Zugriff auf die Payload bei fixiertem Tag.
///
/// Die Felder dürfen sich ändern, die Art der Action nicht.
#[derive(Debug)]
pub enum ActionArgsMut<'a> {
    ExplorationStart(&'a mut ExplorationStartArgs),
    AnswerSubmit(&'a mut AnswerSubmitArgs),
    ExplorationQuit(&'a mut ExplorationQuitArgs),
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct Wrapped<T> {
    value: T,
}

fn unwrap_value<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Wrapped::<T>::deserialize(deserializer).map(|wrapped| wrapped.value)
}

fn wire_args<const N: usize>(fields: [(&str, Value); N]) -> Map<String, Value> {
    fields
        .into_iter()
        .map(|(key, value)| (key.to_string(), json!({ "value": value })))
        .collect()
}

#[cfg(test)]
#[allow(clippy::expect_used)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn answer() -> AnswerSubmitArgs {
        AnswerSubmitArgs {
            state_name: "S1".into(),
            dest_state_name: "S2".into(),
            interaction_id: "TextInput".into(),
            submitted_answer: "42".into(),
            feedback: "Good".into(),
            time_spent_in_state_msecs: TimeSpentMsecs::from(1500u32),
        }
    }

    #[test]
    fn tags_resolve_to_their_kind_only() {
        for kind in ActionKind::ALL {
            assert_eq!(ActionKind::from_wire(kind.as_str()), Some(kind));
            assert_eq!(kind.to_string(), kind.as_str());
        }
        assert_eq!(ActionKind::from_wire("Unknown"), None);
        assert_eq!(ActionKind::from_wire("explorationstart"), None);
        assert_eq!(ActionKind::from_wire(""), None);
    }

    #[test]
    fn wire_keys_match_encoded_args() {
        let payloads = [
            ExplorationStartArgs {
                state_name: "Intro".into(),
            }
            .into_payload(),
            answer().into_payload(),
            ExplorationQuitArgs {
                state_name: "End".into(),
                time_spent_in_state_msecs: TimeSpentMsecs::from(10u32),
            }
            .into_payload(),
        ];
        // Eine Payload pro Art, sonst fehlt hier eine Variante.
        let kinds: Vec<ActionKind> = payloads.iter().map(ActionPayload::kind).collect();
        assert_eq!(kinds, ActionKind::ALL.to_vec());

        for payload in &payloads {
            let mut encoded: Vec<String> = payload.to_wire_args().keys().cloned().collect();
            let mut expected: Vec<String> = payload
                .kind()
                .wire_keys()
                .iter()
                .map(|k| (*k).to_string())
                .collect();
            encoded.sort();
            expected.sort();
            assert_eq!(encoded, expected, "key drift for {}", payload.kind());
        }
    }

    #[test]
    fn every_field_is_wrapped() {
        let args = answer().to_wire_args();
        assert_eq!(args.len(), 6);
        for (key, value) in &args {
            let obj = value
                .as_object()
                .unwrap_or_else(|| panic!("{key} is not wrapped: {value}"));
            assert_eq!(obj.len(), 1);
            assert!(obj.contains_key("value"));
        }
        assert_eq!(args["time_spent_state_in_msecs"], json!({ "value": 1500 }));
    }

    #[test]
    fn time_spent_rejects_non_finite_values() {
        assert!(TimeSpentMsecs::new(f64::NAN).is_none());
        assert!(TimeSpentMsecs::new(f64::INFINITY).is_none());
        assert!(TimeSpentMsecs::new(f64::NEG_INFINITY).is_none());
        let half = TimeSpentMsecs::new(12.5).expect("finite");
        assert!((half.as_f64() - 12.5).abs() < f64::EPSILON);
    }

    #[test]
    fn time_spent_keeps_integer_form_but_compares_by_value() {
        let int = TimeSpentMsecs::from(1500u32);
        let float = TimeSpentMsecs::new(1500.0).expect("finite");
        assert_eq!(int, float);
        assert_eq!(int.to_value(), json!(1500));
        assert_eq!(float.to_value(), json!(1500.0));
        let parsed: TimeSpentMsecs = serde_json::from_value(json!(1500)).expect("number");
        assert_eq!(parsed.to_value(), json!(1500));
        assert!(serde_json::from_value::<TimeSpentMsecs>(json!(null)).is_err());
        assert!(serde_json::from_value::<TimeSpentMsecs>(json!("1500")).is_err());
    }

    #[test]
    fn wrapper_with_extra_keys_is_rejected() {
        let raw = json!({ "state_name": { "value": "Intro", "extra": 1 } });
        assert!(serde_json::from_value::<ExplorationStartArgs>(raw).is_err());
    }

    #[test]
    fn quit_and_answer_use_distinct_time_keys() {
        let raw = json!({
            "state_name": { "value": "End" },
            "time_spent_state_in_msecs": { "value": 3.0 }
        });
        let err = serde_json::from_value::<ExplorationQuitArgs>(raw)
            .expect_err("answer key must not decode as quit");
        assert!(err.to_string().contains("time_spent_state_in_msecs"));
    }

    #[test]
    fn state_name_is_shared_by_all_kinds() {
        assert_eq!(answer().into_payload().state_name(), "S1");
    }
}
