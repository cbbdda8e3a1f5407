use serde::{Deserialize, Serialize};
use std::fmt;

/// Failure categories surfaced by the progress core and its bootstrap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Persisted record exists but cannot be parsed into a `ProgressState`.
    /// Fatal at startup.
    #[error("storage_corrupt")]
    StorageCorrupt,
    /// Writing the record back failed. The in-memory state already moved on.
    #[error("persistence")]
    Persistence,
    #[error("io")]
    Io,
    #[error("config")]
    Config,
    #[error("startup")]
    Startup,
}

/// Unified error type for the progress service.
/// All fallible functions return `Result<T, ProgressError>` rather than strings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProgressError {
    pub message: String,
    pub kind: ErrorKind,
    pub context: Option<String>,
    pub source: Option<String>,
}

impl ProgressError {
    pub fn new<S: Into<String>>(message: S, kind: ErrorKind) -> Self {
        ProgressError {
            message: message.into(),
            kind,
            context: None,
            source: None,
        }
    }

    pub fn storage_corrupt<S: Into<String>>(message: S) -> Self {
        Self::new(message, ErrorKind::StorageCorrupt)
    }

    pub fn persistence<S: Into<String>>(message: S) -> Self {
        Self::new(message, ErrorKind::Persistence)
    }

    /// Add additional context information (usually the path involved)
    pub fn with_context<S: Into<String>>(mut self, context: S) -> Self {
        self.context = Some(context.into());
        self
    }

    /// Add source error information
    pub fn with_source<S: Into<String>>(mut self, source: S) -> Self {
        self.source = Some(source.into());
        self
    }

    pub fn is_fatal(&self) -> bool {
        matches!(self.kind, ErrorKind::StorageCorrupt | ErrorKind::Startup | ErrorKind::Config)
    }
}

impl fmt::Display for ProgressError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.kind, self.message)?;
        if let Some(ref context) = self.context {
            write!(f, " (context: {})", context)?;
        }
        if let Some(ref source) = self.source {
            write!(f, " (source: {})", source)?;
        }
        Ok(())
    }
}

impl std::error::Error for ProgressError {}

impl From<std::io::Error> for ProgressError {
    fn from(err: std::io::Error) -> Self {
        ProgressError::new(format!("I/O error: {}", err), ErrorKind::Io).with_source("std::io")
    }
}

impl From<serde_json::Error> for ProgressError {
    fn from(err: serde_json::Error) -> Self {
        ProgressError::storage_corrupt(format!("JSON error: {}", err)).with_source("serde_json")
    }
}

impl From<toml::de::Error> for ProgressError {
    fn from(err: toml::de::Error) -> Self {
        ProgressError::new(format!("TOML error: {}", err), ErrorKind::Config).with_source("toml")
    }
}
