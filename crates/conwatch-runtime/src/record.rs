//! Raw `ps --format json` record parsing and normalization.
//!
//! Docker emits one JSON object per line; podman emits a single JSON array.
//! Field spellings differ between the two (`ID` vs `Id`, `Names` as a
//! comma-separated string vs an array). Both shapes are accepted here, and
//! a record missing its id is skipped rather than failing the whole cycle.

use conwatch_common::error::{ConwatchError, Result};
use conwatch_common::types::{ContainerStatus, display_name, short_id};
use serde::Deserialize;

/// The `Names` field as reported by either runtime.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum NamesField {
    /// Docker: a single comma-separated string.
    Joined(String),
    /// Podman: an array of names.
    Listed(Vec<String>),
}

impl NamesField {
    /// Returns the primary (first) name, if any.
    fn primary(&self) -> Option<&str> {
        match self {
            Self::Joined(joined) => joined.split(',').next().filter(|n| !n.is_empty()),
            Self::Listed(names) => names.iter().map(String::as_str).find(|n| !n.is_empty()),
        }
    }
}

/// One container entry as deserialized from `ps --format json` output.
#[derive(Debug, Clone, Deserialize)]
pub struct RawRecord {
    /// Full container identifier.
    #[serde(alias = "ID", alias = "Id", default)]
    pub id: String,
    /// Container name(s); absent for some transient entries.
    #[serde(alias = "Names", default)]
    pub names: Option<NamesField>,
    /// Lifecycle state string.
    #[serde(alias = "State", default)]
    pub state: String,
}

impl RawRecord {
    /// Normalizes this record into a display [`ContainerStatus`].
    ///
    /// Short or absent names and short ids are defaulted, never a reason to
    /// fail; only a record without any id is malformed.
    ///
    /// # Errors
    ///
    /// Returns [`ConwatchError::MalformedRecord`] if the record has no id.
    /// Callers skip such records; they never abort a poll cycle.
    pub fn normalize(&self) -> Result<ContainerStatus> {
        if self.id.is_empty() {
            return Err(ConwatchError::MalformedRecord {
                message: "container record without an id".to_string(),
            });
        }
        let name = self
            .names
            .as_ref()
            .and_then(NamesField::primary)
            .map_or_else(|| display_name(""), display_name);
        let status = if self.state.is_empty() {
            "unknown".to_string()
        } else {
            self.state.clone()
        };
        Ok(ContainerStatus {
            id: short_id(&self.id),
            name,
            status,
        })
    }
}

/// Parses raw `ps --format json` output into records.
///
/// Accepts a JSON array (podman) or newline-delimited objects (docker).
/// Individual unparseable lines are logged and skipped; they never abort
/// the poll cycle.
#[must_use]
pub fn parse_ps_output(output: &str) -> Vec<RawRecord> {
    let trimmed = output.trim();
    if trimmed.is_empty() {
        return Vec::new();
    }

    if trimmed.starts_with('[') {
        match serde_json::from_str::<Vec<RawRecord>>(trimmed) {
            Ok(records) => return records,
            Err(error) => {
                tracing::warn!(%error, "container list is not a valid JSON array");
                return Vec::new();
            }
        }
    }

    trimmed
        .lines()
        .filter(|line| !line.trim().is_empty())
        .filter_map(|line| match serde_json::from_str::<RawRecord>(line) {
            Ok(record) => Some(record),
            Err(error) => {
                tracing::warn!(%error, "skipping unparseable container record");
                None
            }
        })
        .collect()
}
