//! Error types for shadow-core

use crate::record::ResourceKind;

/// Result type for shadow-core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while describing resources
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A request parameter carried a value the engine cannot act on
    #[error("Value ({value}) for parameter {parameter} is invalid. {reason}")]
    InvalidParameterValue {
        parameter: String,
        value: String,
        reason: String,
    },

    /// An explicitly requested id or name was not resolved by the pass
    #[error("The {kind} '{id}' does not exist ({code})")]
    NotFound {
        kind: ResourceKind,
        code: String,
        id: String,
    },

    /// No registry entry exists for the resource kind
    #[error("Unknown resource kind: {kind}")]
    UnknownKind { kind: ResourceKind },

    /// A filter schema or kinds manifest failed validation
    #[error("Invalid schema for {kind}: {message}")]
    InvalidSchema { kind: String, message: String },

    /// Failure reported by a local store implementation
    #[error("Store error: {message}")]
    Store { message: String },

    /// Failure reported by an external provider
    #[error("Provider error for {kind}: {message}")]
    Provider { kind: ResourceKind, message: String },

    /// Error in ledger operations
    #[error("Ledger error: {message}")]
    LedgerError { message: String },

    /// Standard I/O error
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error
    #[error(transparent)]
    Json(#[from] serde_json::Error),

    /// TOML deserialization error
    #[error(transparent)]
    TomlDe(#[from] toml::de::Error),

    /// TOML serialization error
    #[error(transparent)]
    TomlSer(#[from] toml::ser::Error),
}

impl Error {
    /// The error raised for a filter name the active kind does not declare.
    pub fn invalid_filter(name: impl Into<String>) -> Self {
        Self::InvalidParameterValue {
            parameter: "filter".to_string(),
            value: name.into(),
            reason: "invalid filter".to_string(),
        }
    }

    /// Whether this error reports an unresolved id or name.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Client-facing error code.
    ///
    /// Not-found errors carry the code registered for their kind; everything
    /// that is not the caller's fault maps to `InternalError`.
    pub fn code(&self) -> &str {
        match self {
            Self::InvalidParameterValue { .. } => "InvalidParameterValue",
            Self::NotFound { code, .. } => code,
            Self::UnknownKind { .. } | Self::InvalidSchema { .. } => "InvalidConfiguration",
            _ => "InternalError",
        }
    }
}
