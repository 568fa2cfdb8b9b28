//! Model error types.
//!
//! The engine distinguishes two failure classes:
//!
//! - **Validation**: a parameter outside its documented domain (non-positive
//!   decay rate, negative budget, empty attacker list). These fail fast
//!   before any stage runs and are surfaced verbatim to the caller.
//! - **Numeric degeneracy** is *not* an error variant: divisions that could
//!   produce non-finite values (zero damping, near-zero effective threat)
//!   are guarded locally with minimum-epsilon substitutions inside the
//!   stages, so NaN/Infinity never propagates into `Results`.
//!
//! There are no other failure modes: the engine performs no I/O and holds no
//! state, so the `Config`/`Json`/`Io` variants only ever originate from the
//! configuration layer and the CLI.

use thiserror::Error;

/// Model engine errors.
#[derive(Error, Debug)]
pub enum ModelError {
    /// A parameter is outside its documented domain.
    #[error("Invalid parameter: {0}")]
    Validation(String),

    /// Configuration error.
    #[error("Config error: {0}")]
    Config(String),

    /// Unknown sweep parameter or scenario name.
    #[error("Unknown name: {0}")]
    UnknownName(String),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// I/O error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for model operations
pub type Result<T> = std::result::Result<T, ModelError>;

impl From<toml::de::Error> for ModelError {
    fn from(err: toml::de::Error) -> Self {
        ModelError::Config(err.to_string())
    }
}
