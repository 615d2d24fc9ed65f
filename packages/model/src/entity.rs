//! Actors that create and change blocks.

use std::fmt;

use chrono::{DateTime, FixedOffset, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{ModelError, Result};

/// Entity types with a defined meaning. Other type strings are accepted.
pub const WELL_KNOWN_ENTITY_TYPES: [&str; 5] = ["duns", "email", "gln", "openID", "x509"];

/// An actor that performed a change: a typed identifier plus the time of the
/// change.
///
/// Full equality compares the timestamp too. Use [`Entity::same_actor`] to ask
/// whether two records name the same actor.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Entity {
    #[serde(rename = "type")]
    entity_type: String,
    value: String,
    date: DateTime<FixedOffset>,
}

impl Entity {
    pub fn new(
        entity_type: impl Into<String>,
        value: impl Into<String>,
        date: DateTime<FixedOffset>,
    ) -> Self {
        Self {
            entity_type: entity_type.into(),
            value: value.into(),
            date,
        }
    }

    /// An entity stamped with the current UTC time.
    pub fn now(entity_type: impl Into<String>, value: impl Into<String>) -> Self {
        Self::new(entity_type, value, Utc::now().into())
    }

    /// Build an entity from an ISO-8601 timestamp string.
    pub fn parse(
        entity_type: impl Into<String>,
        value: impl Into<String>,
        iso8601: &str,
    ) -> Result<Self> {
        let date = DateTime::parse_from_rfc3339(iso8601).map_err(|e| ModelError::InvalidValue {
            field: "date",
            message: format!("'{}': {}", iso8601, e),
        })?;
        Ok(Self::new(entity_type, value, date))
    }

    pub fn entity_type(&self) -> &str {
        &self.entity_type
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn date(&self) -> DateTime<FixedOffset> {
        self.date
    }

    pub fn date_iso8601(&self) -> String {
        self.date.to_rfc3339_opts(SecondsFormat::AutoSi, false)
    }

    /// Same type and value, regardless of when the change happened.
    pub fn same_actor(&self, other: &Entity) -> bool {
        self.entity_type == other.entity_type && self.value == other.value
    }

    pub fn is_well_known_type(&self) -> bool {
        WELL_KNOWN_ENTITY_TYPES.contains(&self.entity_type.as_str())
    }
}

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{} @ {}",
            self.entity_type,
            self.value,
            self.date_iso8601()
        )
    }
}
