//! Domain primitive types used across the Conwatch workspace.

use std::fmt;
use std::ops::Deref;
use std::sync::Arc;

use serde::{Deserialize, Serialize, Serializer};

use crate::constants::{SHORT_ID_LEN, UNNAMED_PLACEHOLDER};

/// Display status of a single container, as pushed to observers.
///
/// Immutable value; a fresh set is produced on every poll cycle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContainerStatus {
    /// Short display identifier (truncated to 12 characters).
    pub id: String,
    /// Human-readable name with the runtime's leading `/` stripped.
    pub name: String,
    /// Lifecycle state string (`running`, `exited`, `paused`, `created`, ...).
    pub status: String,
}

/// One complete, immutable listing of all containers at a point in time.
///
/// Cheap to clone; every session reads the same shared sequence. Serializes
/// as a plain JSON array of [`ContainerStatus`] records in snapshot order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot(Arc<[ContainerStatus]>);

impl Snapshot {
    /// Creates an empty snapshot.
    #[must_use]
    pub fn empty() -> Self {
        Self(Arc::from(Vec::new()))
    }

    /// Returns the contained statuses in order.
    #[must_use]
    pub fn statuses(&self) -> &[ContainerStatus] {
        &self.0
    }
}

impl From<Vec<ContainerStatus>> for Snapshot {
    fn from(statuses: Vec<ContainerStatus>) -> Self {
        Self(Arc::from(statuses))
    }
}

impl Deref for Snapshot {
    type Target = [ContainerStatus];

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl Serialize for Snapshot {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        self.0.as_ref().serialize(serializer)
    }
}

impl fmt::Display for Snapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} containers", self.0.len())
    }
}

/// Truncates a container ID to its short display form.
///
/// IDs shorter than the display length pass through unchanged. Truncation
/// respects character boundaries and never panics.
#[must_use]
pub fn short_id(id: &str) -> String {
    id.chars().take(SHORT_ID_LEN).collect()
}

/// Normalizes a runtime-reported container name for display.
///
/// Strips the single leading `/` the runtime prepends; an empty or
/// slash-only name becomes the [`UNNAMED_PLACEHOLDER`].
#[must_use]
pub fn display_name(name: &str) -> String {
    let stripped = name.strip_prefix('/').unwrap_or(name);
    if stripped.is_empty() {
        UNNAMED_PLACEHOLDER.to_string()
    } else {
        stripped.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_id_truncates_long_id() {
        assert_eq!(short_id("abc123def456789"), "abc123def456");
    }

    #[test]
    fn short_id_passes_short_id_through() {
        assert_eq!(short_id("abc"), "abc");
        assert_eq!(short_id(""), "");
    }

    #[test]
    fn display_name_strips_leading_slash() {
        assert_eq!(display_name("/web"), "web");
    }

    #[test]
    fn display_name_without_slash_unchanged() {
        assert_eq!(display_name("db"), "db");
    }

    #[test]
    fn display_name_empty_uses_placeholder() {
        assert_eq!(display_name(""), UNNAMED_PLACEHOLDER);
        assert_eq!(display_name("/"), UNNAMED_PLACEHOLDER);
    }

    #[test]
    fn snapshot_serializes_as_array() {
        let snapshot = Snapshot::from(vec![ContainerStatus {
            id: "abc123def456".into(),
            name: "web".into(),
            status: "running".into(),
        }]);
        let json = serde_json::to_string(&snapshot).unwrap();
        assert_eq!(
            json,
            r#"[{"id":"abc123def456","name":"web","status":"running"}]"#
        );
    }

    #[test]
    fn empty_snapshot_serializes_as_empty_array() {
        let json = serde_json::to_string(&Snapshot::empty()).unwrap();
        assert_eq!(json, "[]");
    }
}
