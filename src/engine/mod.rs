//! Constraint engine abstraction.
//!
//! The pipeline does not evaluate JSON Schema itself. It compiles the active
//! schema through a [`ConstraintEngine`] and runs the resulting
//! [`CompiledValidator`] to obtain an ordered list of [`RawViolation`]s. The
//! default engine, [`JsonSchemaEngine`], is backed by the `jsonschema` crate
//! and applies `errorMessage` annotations while collecting violations.

mod json_schema;
mod messages;
mod walk;

use std::sync::Arc;

use serde_json::Value;

use crate::error::{RawViolation, ValidatorError};

pub use self::json_schema::JsonSchemaEngine;

/// Compiles schemas into runnable validators.
///
/// Implementations must collect all violations in one pass rather than
/// stopping at the first failure.
pub trait ConstraintEngine: Send + Sync {
    /// Compiles `schema` into a validator.
    ///
    /// # Errors
    ///
    /// Returns a schema-level `ValidatorError` if the schema is malformed.
    fn compile(&self, schema: &Value) -> Result<Arc<dyn CompiledValidator>, ValidatorError>;
}

/// A compiled, read-only validator for a single schema.
///
/// Compiled validators are shared between threads during batch validation and
/// must not rely on interior mutability for correctness.
pub trait CompiledValidator: Send + Sync {
    /// Returns every violation of `target`, in evaluation order.
    ///
    /// An empty list means the target is valid.
    fn check(&self, target: &Value) -> Vec<RawViolation>;
}
