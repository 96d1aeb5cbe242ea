//! Violation types produced by validation.
//!
//! This module provides [`RawViolation`] for constraint failures as they come
//! out of the constraint engine, and [`NormalizedError`] for the public,
//! consumer-facing shape returned in validation results.

use std::fmt::{self, Display};

use serde::{Serialize, Serializer};
use serde_json::{json, Map, Value};

use crate::path::JsonPointer;
use crate::positions::PositionPointer;

/// Keyword-specific structured data attached to a violation.
pub type Params = Map<String, Value>;

/// A single constraint failure as produced by the constraint engine.
///
/// `errors` holds nested sub-violations. It is only populated for composite
/// violations, such as the ones synthesized for an `errorMessage` annotation,
/// where it lists the underlying failures the custom message replaced.
///
/// # Example
///
/// ```rust
/// use coroner::{JsonPointer, RawViolation};
/// use serde_json::json;
///
/// let violation = RawViolation::new("required", "must have required property 'id'")
///     .with_schema_path(JsonPointer::parse("/required"))
///     .with_param("missingProperty", json!("id"));
///
/// assert_eq!(violation.params["missingProperty"], "id");
/// assert!(violation.errors.is_empty());
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct RawViolation {
    /// The schema keyword that failed (`required`, `type`, `if`, ...).
    pub keyword: String,
    /// Where in the validated document the failure happened.
    pub instance_path: JsonPointer,
    /// Where in the schema the failing keyword lives.
    pub schema_path: JsonPointer,
    /// Keyword-specific parameters.
    pub params: Params,
    /// Human-readable message.
    pub message: String,
    /// Nested sub-violations of a composite failure.
    pub errors: Vec<RawViolation>,
}

impl RawViolation {
    /// Creates a violation at the document root with empty params.
    pub fn new(keyword: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            keyword: keyword.into(),
            instance_path: JsonPointer::root(),
            schema_path: JsonPointer::root(),
            params: Params::new(),
            message: message.into(),
            errors: Vec::new(),
        }
    }

    /// Sets the instance path and returns self for chaining.
    pub fn with_instance_path(mut self, path: JsonPointer) -> Self {
        self.instance_path = path;
        self
    }

    /// Sets the schema path and returns self for chaining.
    pub fn with_schema_path(mut self, path: JsonPointer) -> Self {
        self.schema_path = path;
        self
    }

    /// Adds a single parameter and returns self for chaining.
    pub fn with_param(mut self, name: impl Into<String>, value: Value) -> Self {
        self.params.insert(name.into(), value);
        self
    }

    /// Replaces the parameters and returns self for chaining.
    pub fn with_params(mut self, params: Params) -> Self {
        self.params = params;
        self
    }

    /// Sets the nested sub-violations and returns self for chaining.
    pub fn with_errors(mut self, errors: Vec<RawViolation>) -> Self {
        self.errors = errors;
        self
    }

    /// Renders the violation the way Ajv-based tooling reports it.
    ///
    /// Nested sub-violations appear under `params.errors`.
    pub fn to_json(&self) -> Value {
        let mut params = self.params.clone();
        if !self.errors.is_empty() {
            params.insert(
                "errors".to_string(),
                Value::Array(self.errors.iter().map(RawViolation::to_json).collect()),
            );
        }

        json!({
            "keyword": self.keyword,
            "instancePath": self.instance_path.to_string(),
            "schemaPath": self.schema_path.to_string(),
            "params": params,
            "message": self.message,
        })
    }
}

impl Serialize for RawViolation {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_json().serialize(serializer)
    }
}

impl Display for RawViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt_located(f, &self.instance_path, &self.message)
    }
}

/// The public error shape returned in a validation result.
///
/// Unlike [`RawViolation`], a normalized error never carries nested
/// violations directly: they are relocated under `params.rawErrors`, so the
/// `params` map never contains an `errors` key.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NormalizedError {
    /// The schema keyword that failed.
    pub keyword: String,
    /// Where in the validated document the failure happened.
    pub instance_path: JsonPointer,
    /// Where in the schema the failing keyword lives.
    pub schema_path: JsonPointer,
    /// The message, possibly authored in the schema via `errorMessage`.
    pub message: String,
    /// Keyword-specific parameters, including `rawErrors` when present.
    pub params: Params,
    /// Source location of the failing value, when known.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position: Option<PositionPointer>,
}

impl NormalizedError {
    /// Returns the raw causes behind a custom message, if any.
    pub fn raw_errors(&self) -> Option<&Vec<Value>> {
        self.params.get("rawErrors").and_then(Value::as_array)
    }

    /// Returns the error as JSON (`instancePath`, `schemaPath`, `position`, ...).
    pub fn to_json(&self) -> Value {
        serde_json::to_value(self).unwrap_or_default()
    }
}

impl Display for NormalizedError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt_located(f, &self.instance_path, &self.message)?;
        if let Some(start) = self.position.as_ref().and_then(PositionPointer::start) {
            write!(f, " (line {}, column {})", start.line + 1, start.column + 1)?;
        }
        Ok(())
    }
}

fn fmt_located(f: &mut fmt::Formatter<'_>, path: &JsonPointer, message: &str) -> fmt::Result {
    if path.is_root() {
        write!(f, "(root): {}", message)
    } else {
        write!(f, "{}: {}", path, message)
    }
}
