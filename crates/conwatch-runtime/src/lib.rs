//! Container runtime client adapter for Conwatch.
//!
//! Abstracts "list all containers with their id, name, and lifecycle state"
//! behind the [`RuntimeClient`] trait. The shipped implementation shells out
//! to the docker or podman CLI; tests substitute in-memory clients.

pub mod client;
pub mod record;

pub use client::{CliRuntime, RuntimeClient};
