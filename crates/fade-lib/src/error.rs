use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum FadeError {
    #[error("Invalid value for {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("No FADe project found at {path}. Run 'fade init' first")]
    ProjectNotInitialized { path: PathBuf },

    #[error("A FADe project already exists at {path}")]
    ProjectAlreadyInitialized { path: PathBuf },

    #[error("Project state at {path} is corrupt: {reason}")]
    CorruptState { path: PathBuf, reason: String },

    #[error("Project configuration is incomplete: {field} is missing")]
    IncompleteConfig { field: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to read payload file {path}: {reason}")]
    PayloadRead { path: PathBuf, reason: String },

    #[error("Failed to write {path}: {reason}")]
    AtomicWrite { path: PathBuf, reason: String },

    #[error("Editor failed for {script}: {reason}")]
    Editor { script: String, reason: String },

    #[error("Failed to host package on {address}: {reason}")]
    Host { address: String, reason: String },

    #[error("Invalid arguments: {details}")]
    CliArgumentValidation { details: String },

    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("JSON serialization/deserialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Debian packaging error: {0}")]
    DebianPackaging(#[from] debian_packaging::error::DebianError),

    #[error("Unexpected error: {0}")]
    Unexpected(#[from] eyre::Report),
}

impl FadeError {
    pub(crate) fn validation(field: &str, reason: impl Into<String>) -> Self {
        Self::Validation {
            field: field.to_string(),
            reason: reason.into(),
        }
    }

    pub(crate) fn missing(field: &str) -> Self {
        Self::validation(field, "required field is missing")
    }
}
