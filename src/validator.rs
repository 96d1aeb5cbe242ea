//! Validation entry point.
//!
//! This module provides the [`Validator`] type that checks objects against the
//! active schema and returns normalized results, along with the result types
//! for single objects ([`ValidationResult`]) and batches ([`BatchResult`]).

use std::sync::Arc;

use rayon::prelude::*;
use serde::Serialize;
use serde_json::Value;
use tracing::trace;

use crate::engine::{CompiledValidator, ConstraintEngine, JsonSchemaEngine};
use crate::error::{NormalizedError, ValidatorError};
use crate::json;
use crate::options::ValidatorOptions;
use crate::positions::{PathPositionMap, SourceDocument};
use crate::store::SchemaStore;
use crate::transform;

/// Validates objects against a replaceable JSON Schema.
///
/// Constraint violations never surface as `Err`: they are reported in the
/// returned result. `Err` is reserved for problems that prevent validation
/// altogether, such as a schema that does not compile.
///
/// # Example
///
/// ```rust
/// use coroner::Validator;
/// use serde_json::json;
///
/// let validator = Validator::new(json!({
///     "type": "object",
///     "required": ["id"],
///     "properties": { "id": { "type": "string" } }
/// }));
///
/// let result = validator.validate(&json!({ "id": "number_1" })).unwrap();
/// assert!(result.valid);
/// assert!(result.errors.is_none());
///
/// let result = validator.validate(&json!({})).unwrap();
/// assert!(!result.valid);
/// assert_eq!(result.errors()[0].params["missingProperty"], "id");
/// ```
pub struct Validator {
    store: SchemaStore,
    options: ValidatorOptions,
}

impl Validator {
    /// Creates a validator for `schema` with default options.
    pub fn new(schema: Value) -> Self {
        Self::with_options(schema, ValidatorOptions::default())
    }

    /// Creates a validator for `schema` backed by the `jsonschema` engine.
    pub fn with_options(schema: Value, options: ValidatorOptions) -> Self {
        let engine = Arc::new(JsonSchemaEngine::new(options.clone()));
        Self {
            store: SchemaStore::new(schema, engine),
            options,
        }
    }

    /// Creates a validator for `schema` backed by a custom engine.
    pub fn with_engine(schema: Value, engine: Arc<dyn ConstraintEngine>) -> Self {
        Self {
            store: SchemaStore::new(schema, engine),
            options: ValidatorOptions::default(),
        }
    }

    /// Enables or disables parallel batch validation.
    pub fn with_parallel_batches(mut self, enabled: bool) -> Self {
        self.options.parallel_batches = enabled;
        self
    }

    /// Returns the validator's options.
    pub fn options(&self) -> &ValidatorOptions {
        &self.options
    }

    /// Returns the schema store.
    pub fn store(&self) -> &SchemaStore {
        &self.store
    }

    /// Returns the active schema.
    pub fn get_schema(&self) -> Arc<Value> {
        self.store.get_schema()
    }

    /// Replaces the active schema. Subsequent calls validate against it.
    pub fn set_schema(&self, schema: Value) {
        self.store.set_schema(schema);
    }

    /// Validates a single object.
    ///
    /// # Errors
    ///
    /// Returns a schema-level `ValidatorError` if the active schema cannot be
    /// compiled.
    pub fn validate(&self, object: &Value) -> Result<ValidationResult, ValidatorError> {
        let compiled = self.store.compiled()?;
        Ok(check(compiled.as_ref(), object, None))
    }

    /// Validates a document parsed from text, attaching source positions to
    /// its errors.
    ///
    /// # Errors
    ///
    /// Returns a schema-level `ValidatorError` if the active schema cannot be
    /// compiled.
    pub fn validate_document(
        &self,
        document: &SourceDocument,
    ) -> Result<ValidationResult, ValidatorError> {
        let compiled = self.store.compiled()?;
        Ok(check(
            compiled.as_ref(),
            document.value(),
            Some(document.positions()),
        ))
    }

    /// Parses JSON text and validates it with source positions.
    ///
    /// # Errors
    ///
    /// Returns `ValidatorError::Parse` for malformed text, or a schema-level
    /// error if the active schema cannot be compiled.
    pub fn validate_str(&self, text: &str) -> Result<ValidationResult, ValidatorError> {
        let document = SourceDocument::parse(text)?;
        self.validate_document(&document)
    }

    /// Converts a serializable value to JSON and validates it.
    ///
    /// # Errors
    ///
    /// Returns `ValidatorError::Serialization` if the value has no JSON
    /// representation (a map with non-string keys, a NaN or infinite float), or a
    /// schema-level error if the active schema cannot be compiled.
    pub fn validate_serializable<T>(&self, value: &T) -> Result<ValidationResult, ValidatorError>
    where
        T: Serialize + ?Sized,
    {
        let object = json::to_value(value).map_err(ValidatorError::Serialization)?;
        self.validate(&object)
    }

    /// Validates every object, in order, without stopping at invalid ones.
    ///
    /// The schema is compiled once for the whole batch. With parallel batches
    /// enabled the objects are spread across the rayon thread pool; results
    /// keep the input order either way.
    ///
    /// # Errors
    ///
    /// Returns a schema-level `ValidatorError` if the active schema cannot be
    /// compiled.
    pub fn validate_all(&self, objects: &[Value]) -> Result<BatchResult, ValidatorError> {
        let compiled = self.store.compiled()?;
        let compiled = compiled.as_ref();

        let results = if self.options.parallel_batches {
            objects
                .par_iter()
                .map(|object| check(compiled, object, None))
                .collect()
        } else {
            objects
                .iter()
                .map(|object| check(compiled, object, None))
                .collect()
        };

        Ok(BatchResult::from_results(results))
    }
}

fn check(
    compiled: &dyn CompiledValidator,
    object: &Value,
    positions: Option<&PathPositionMap>,
) -> ValidationResult {
    let violations = compiled.check(object);
    let errors = if violations.is_empty() {
        Vec::new()
    } else {
        transform::normalize(violations, positions)
    };

    trace!(errors = errors.len(), "validated object");
    ValidationResult::new(object.clone(), errors)
}

/// The outcome of validating a single object.
///
/// `errors` is `None` exactly when `valid` is true; an invalid result always
/// carries at least one error.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValidationResult {
    /// Whether the object satisfies the schema.
    pub valid: bool,
    /// The validated object.
    pub object: Value,
    /// The normalized errors of an invalid object.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<Vec<NormalizedError>>,
}

impl ValidationResult {
    /// Creates a result, deriving validity from the error list.
    pub fn new(object: Value, errors: Vec<NormalizedError>) -> Self {
        if errors.is_empty() {
            Self {
                valid: true,
                object,
                errors: None,
            }
        } else {
            Self {
                valid: false,
                object,
                errors: Some(errors),
            }
        }
    }

    /// Returns the errors, or an empty slice for a valid object.
    pub fn errors(&self) -> &[NormalizedError] {
        self.errors.as_deref().unwrap_or_default()
    }

    /// Returns the result as `{ valid, object, errors? }`.
    pub fn to_json(&self) -> Value {
        serde_json::to_value(self).unwrap_or_default()
    }
}

/// The outcome of validating a list of objects.
///
/// `results` corresponds one-to-one, in order, with the validated objects.
/// The valid/errored split is available as a projection of it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BatchResult {
    /// Whether every object is valid. True for an empty batch.
    pub valid: bool,
    /// Per-object results, in input order.
    pub results: Vec<ValidationResult>,
}

impl BatchResult {
    /// Creates a batch result from per-object results.
    pub fn from_results(results: Vec<ValidationResult>) -> Self {
        Self {
            valid: results.iter().all(|result| result.valid),
            results,
        }
    }

    /// Returns the number of validated objects.
    pub fn len(&self) -> usize {
        self.results.len()
    }

    /// Returns true if no objects were validated.
    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    /// Returns the valid objects, in input order.
    pub fn valid_objects(&self) -> Vec<&Value> {
        self.results
            .iter()
            .filter(|result| result.valid)
            .map(|result| &result.object)
            .collect()
    }

    /// Returns the results of invalid objects, in input order.
    pub fn errored_objects(&self) -> Vec<&ValidationResult> {
        self.results.iter().filter(|result| !result.valid).collect()
    }

    /// Returns the valid/errored split, keeping the batch.
    pub fn partition(&self) -> BatchPartition {
        self.clone().into_partition()
    }

    /// Splits the batch into valid and errored objects.
    pub fn into_partition(self) -> BatchPartition {
        let mut partition = BatchPartition::default();
        for result in self.results {
            match result.errors {
                Some(errors) => partition.errored_objects.push(ErroredObject {
                    object: result.object,
                    errors,
                }),
                None => partition.valid_objects.push(result.object),
            }
        }
        partition
    }

    /// Returns the batch as `{ valid, results }`.
    pub fn to_json(&self) -> Value {
        serde_json::to_value(self).unwrap_or_default()
    }
}

/// A batch split into valid and errored objects.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchPartition {
    /// Objects that passed validation, in input order.
    pub valid_objects: Vec<Value>,
    /// Objects that failed validation with their errors, in input order.
    pub errored_objects: Vec<ErroredObject>,
}

impl BatchPartition {
    /// Returns the partition as `{ validObjects, erroredObjects }`.
    pub fn to_json(&self) -> Value {
        serde_json::to_value(self).unwrap_or_default()
    }
}

/// An object that failed validation, with its errors.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ErroredObject {
    /// The invalid object.
    pub object: Value,
    /// Its normalized errors.
    pub errors: Vec<NormalizedError>,
}
