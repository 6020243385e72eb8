#![warn(clippy::unwrap_used, clippy::expect_used)]

//! Learner Actions einer Exploration-Engine und ihr versioniertes Wire-Format.
//!
//! - [`registry`]: die geschlossene Menge der Arten und ihre Payloads
//! - [`schema`]: die prozessweite "latest schema version"
//! - [`ActionFactory`]: neue Actions, gestempelt mit der aktuellen Version
//! - [`encode`] / [`decode`]: Wire-Dict hin und zurück

pub mod action;
pub mod codec;
pub mod error;
pub mod factory;
pub mod registry;
pub mod schema;

pub use action::LearnerAction;
pub use codec::{decode, decode_str, encode};
pub use error::{ActionError, Result};
pub use factory::ActionFactory;
pub use registry::{
    ActionArgs, ActionArgsMut, ActionKind, ActionPayload, AnswerSubmitArgs, ExplorationQuitArgs,
    ExplorationStartArgs, TimeSpentMsecs,
};
pub use schema::{
    init_latest_schema_version, latest_schema_version, SchemaVersion,
    DEFAULT_LATEST_SCHEMA_VERSION,
};
