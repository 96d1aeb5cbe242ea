//! Fatal errors surfaced by the validator.
//!
//! Constraint violations are never errors in this sense: they are returned as
//! data inside a validation result. [`ValidatorError`] covers the conditions
//! that prevent validation from producing a result at all.

use crate::path::JsonPointer;

/// Errors that prevent a validation result from being produced.
#[derive(Debug, thiserror::Error)]
pub enum ValidatorError {
    /// The configured schema could not be compiled into a validator.
    #[error("schema compilation failed at '{schema_path}': {message}")]
    SchemaCompilation {
        /// Location in the schema that was rejected.
        schema_path: JsonPointer,
        /// Description of the problem reported by the engine.
        message: String,
    },

    /// An `errorMessage` annotation in the schema is malformed.
    #[error("invalid errorMessage at '{schema_path}': {reason}")]
    InvalidErrorMessage {
        /// Location of the offending `errorMessage` keyword.
        schema_path: JsonPointer,
        /// Why the annotation was rejected.
        reason: String,
    },

    /// Source text could not be parsed as JSON.
    #[error("failed to parse document: {0}")]
    Parse(#[source] serde_json::Error),

    /// A value could not be represented as JSON.
    #[error("value is not representable as JSON: {0}")]
    Serialization(#[source] serde_json::Error),
}

impl ValidatorError {
    /// Returns true for errors caused by the schema rather than the input.
    pub fn is_schema_error(&self) -> bool {
        matches!(
            self,
            Self::SchemaCompilation { .. } | Self::InvalidErrorMessage { .. }
        )
    }
}
