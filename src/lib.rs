//! # Riff-Raff Publisher
//!
//! CI credential broker and artifact publisher for Riff-Raff deployments.
//!
//! Runs once per pipeline invocation: it exchanges the workflow's short-lived
//! OIDC identity token for temporary role credentials via web-identity
//! federation, describes the build in a `build.json` manifest, and uploads
//! the manifest plus every file under the artifact directory to S3.
//!
//! ## Quick Start
//!
//! Publish a build from a workflow step:
//! ```bash
//! riffraff-publisher publish \
//!     --role-to-assume=arn:aws:iam::0123456789:role/riffraff-uploader \
//!     --region=eu-west-1 \
//!     --artifact-bucket=riffraff-artifact \
//!     --build-bucket=riffraff-builds \
//!     --artifact-directory=target/riffraff
//! ```
//!
//! Or hand the role to later steps instead of uploading:
//! ```bash
//! riffraff-publisher export-credentials \
//!     --role-to-assume=arn:aws:iam::0123456789:role/riffraff-uploader \
//!     --region=eu-west-1
//! ```

pub mod artifacts;
pub mod cli;
pub mod config;
pub mod credentials;
pub mod env_export;
pub mod error;
pub mod manifest;
pub mod publish;
#[cfg(test)]
mod tests;
pub mod token;

// Re-export error types
pub use error::{Error, Result};

/// Initialize logging for the CLI
///
/// Debug lines are opt-in via `RUST_LOG=debug`.
pub fn init_logging() -> Result<()> {
    env_logger::try_init().map_err(|e| Error::InitializationError(e.to_string()))
}

// Re-export commonly used types and traits
pub use publish::ObjectStore;
