//! Runtime client trait and the CLI-backed implementation.

use std::process::Stdio;

use async_trait::async_trait;
use conwatch_common::error::{ConwatchError, Result};
use conwatch_common::types::Snapshot;
use tokio::process::Command;

use crate::record;

/// Queries the container runtime for the live container set.
///
/// Implementations do not retry internally; retry cadence belongs to the
/// poller. The shipped implementation is [`CliRuntime`]; tests substitute
/// in-memory clients.
#[async_trait]
pub trait RuntimeClient: Send + Sync {
    /// Lists all containers, including stopped ones, as a normalized snapshot.
    ///
    /// # Errors
    ///
    /// Returns [`ConwatchError::RuntimeUnavailable`] if the runtime cannot
    /// be queried. Malformed individual records are skipped, not errors.
    async fn list_containers(&self) -> Result<Snapshot>;
}

/// Runtime client that shells out to the docker or podman CLI.
#[derive(Debug, Clone)]
pub struct CliRuntime {
    binary: String,
}

impl CliRuntime {
    /// Creates a client with auto-detected runtime binary.
    ///
    /// Prefers docker, falls back to podman. If neither is on the PATH the
    /// client is still constructed; every query will then surface
    /// `RuntimeUnavailable` and the poller keeps retrying.
    #[must_use]
    pub fn detect() -> Self {
        for candidate in ["docker", "podman"] {
            if which::which(candidate).is_ok() {
                tracing::info!(binary = candidate, "container runtime detected");
                return Self {
                    binary: candidate.to_string(),
                };
            }
        }
        tracing::warn!("no container runtime found on PATH, defaulting to docker");
        Self {
            binary: "docker".to_string(),
        }
    }

    /// Creates a client with an explicit runtime binary.
    #[must_use]
    pub fn with_binary(binary: impl Into<String>) -> Self {
        Self {
            binary: binary.into(),
        }
    }

    /// Returns the runtime binary this client invokes.
    #[must_use]
    pub fn binary(&self) -> &str {
        &self.binary
    }
}

#[async_trait]
impl RuntimeClient for CliRuntime {
    async fn list_containers(&self) -> Result<Snapshot> {
        let output = Command::new(&self.binary)
            .args(["ps", "-a", "--format", "json"])
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|e| ConwatchError::RuntimeUnavailable {
                message: format!("failed to run {} ps: {e}", self.binary),
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(ConwatchError::RuntimeUnavailable {
                message: format!("{} ps exited with {}: {}", self.binary, output.status, stderr.trim()),
            });
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        let mut statuses = Vec::new();
        for raw in record::parse_ps_output(&stdout) {
            match raw.normalize() {
                Ok(status) => statuses.push(status),
                Err(error) => tracing::warn!(%error, "skipping malformed container record"),
            }
        }

        tracing::debug!(count = statuses.len(), "container set listed");
        Ok(Snapshot::from(statuses))
    }
}
