//! Error types for configuration resolution

use crate::overlay::Mode;

/// Errors raised while selecting, building or inspecting a configuration
#[derive(Debug, thiserror::Error)]
pub enum ConfigurationError {
    #[error("Unrecognized mode '{0}': expected one of {}", Mode::names().join(", "))]
    UnknownMode(String),

    #[error("No mode selected: pass --mode, set PACKCFG_MODE, or set 'mode' in the settings file")]
    MissingMode,

    #[error("Configuration root must be an object, found {0}")]
    NotAnObject(packcfg_merge::ValueKind),

    #[error("Invalid pattern '{pattern}': {message}")]
    InvalidPattern { pattern: String, message: String },

    #[error("Canonicalization error: {0}")]
    Canonicalize(String),

    #[error("Serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
}
