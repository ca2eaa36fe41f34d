use thiserror::Error;

/// Errors produced anywhere in the publisher.
///
/// Every variant is terminal for the run: there is no retry or local
/// recovery, the error propagates to `main`, is formatted once and the
/// process exits non-zero.
#[derive(Error, Debug)]
pub enum Error {
    #[error("missing configuration value: {0}")]
    MissingConfiguration(String),
    #[error("failed to fetch identity token: {0}")]
    TokenFetchFailed(String),
    #[error("failed to exchange identity token for role credentials: {0}")]
    CredentialExchangeFailed(String),
    #[error("repository identifier is not in owner/repo form: {0}")]
    InvalidRepositoryIdentifier(String),
    #[error("cannot find the file {0}")]
    MissingManifestDescriptor(String),
    #[error("failed to read directory: {0}")]
    DirectoryReadFailed(String),
    #[error("failed to publish {key}: {message}")]
    PublishFailed { key: String, message: String },
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("initialization error: {0}")]
    InitializationError(String),
}

pub type Result<T> = std::result::Result<T, Error>;
