pub mod commands;
pub mod handlers;

use crate::error::Error;

// Re-export commonly used items
pub use commands::{ExportArgs, PublishArgs};
pub use handlers::{handle_export_credentials, handle_publish};

pub const CLI_VERSION: &str = env!("CARGO_PKG_VERSION");
pub const CLI_NAME: &str = "riffraff-publisher";

pub fn format_error(error: &Error) -> String {
    match error {
        Error::MissingConfiguration(name) => format!("Missing configuration: {name}"),
        Error::TokenFetchFailed(msg) => format!("Token fetch failed: {msg}"),
        Error::CredentialExchangeFailed(msg) => format!("Credential exchange failed: {msg}"),
        Error::InvalidRepositoryIdentifier(repo) => {
            format!("Invalid repository identifier (expected owner/repo): {repo}")
        }
        Error::MissingManifestDescriptor(path) => format!("Cannot find the file {path}"),
        Error::DirectoryReadFailed(msg) => format!("Directory read failed: {msg}"),
        Error::PublishFailed { key, message } => format!("Publish failed for {key}: {message}"),
        Error::Io(err) => format!("IO error: {err}"),
        Error::Json(err) => format!("JSON error: {err}"),
        Error::InitializationError(msg) => format!("Initialization error: {msg}"),
    }
}
