//! Schemaversion der Learner-Action-Dicts.
//!
//! Die "latest schema version" ist eine prozessweite Konstante: sie wird genau
//! einmal beim Start gesetzt (z. B. aus der CLI-Konfiguration) und danach nur
//! noch gelesen. Wird sie gelesen, bevor jemand sie gesetzt hat, gilt
//! [`DEFAULT_LATEST_SCHEMA_VERSION`] und ist ab dann fixiert.

use std::fmt;
use std::num::NonZeroU32;
use std::sync::OnceLock;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::{ActionError, Result};

/// Schemaversion, die gilt, solange beim Start nichts anderes gesetzt wurde.
pub const DEFAULT_LATEST_SCHEMA_VERSION: u32 = 1;

static LATEST: OnceLock<SchemaVersion> = OnceLock::new();

/// Revision des Wire-Formats, mit der eine Action geschrieben wurde (immer >= 1).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SchemaVersion(NonZeroU32);

impl SchemaVersion {
    /// Erzeugt eine Schemaversion; `0` ist ungültig.
    pub fn new(version: u32) -> Result<Self> {
        NonZeroU32::new(version)
            .map(Self)
            .ok_or(ActionError::InvalidSchemaVersion(0))
    }

    #[must_use]
    pub fn get(self) -> u32 {
        self.0.get()
    }
}

impl Default for SchemaVersion {
    fn default() -> Self {
        Self(NonZeroU32::MIN.saturating_add(DEFAULT_LATEST_SCHEMA_VERSION - 1))
    }
}

impl TryFrom<u64> for SchemaVersion {
    type Error = ActionError;

    fn try_from(raw: u64) -> Result<Self> {
        u32::try_from(raw)
            .ok()
            .and_then(NonZeroU32::new)
            .map(Self)
            .ok_or(ActionError::InvalidSchemaVersion(raw))
    }
}

impl fmt::Display for SchemaVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Serialize for SchemaVersion {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_u32(self.get())
    }
}

impl<'de> Deserialize<'de> for SchemaVersion {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let raw = u64::deserialize(deserializer)?;
        Self::try_from(raw).map_err(serde::de::Error::custom)
    }
}

/// Setzt die prozessweite "latest schema version".
///
/// Ein erneuter Aufruf mit demselben Wert ist ein No-op. Jeder andere Wert
/// scheitert mit [`ActionError::SchemaVersionAlreadyInitialized`], ebenso wenn
/// der Default bereits über [`latest_schema_version`] gelesen wurde.
pub fn init_latest_schema_version(version: SchemaVersion) -> Result<()> {
    let current = *LATEST.get_or_init(|| version);
    if current == version {
        Ok(())
    } else {
        Err(ActionError::SchemaVersionAlreadyInitialized { current })
    }
}

/// Liefert die aktuell gültige "latest schema version".
#[must_use]
pub fn latest_schema_version() -> SchemaVersion {
    *LATEST.get_or_init(SchemaVersion::default)
}
