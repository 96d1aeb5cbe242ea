//! # Coroner
//!
//! JSON Schema validation that reports every violation of an object in a
//! normalized, source-aware form.
//!
//! ## Overview
//!
//! A [`Validator`] holds a replaceable schema and checks objects against it.
//! Raw engine violations go through a fixed sequence of normalization passes
//! (see [`transform`]) before they are returned:
//!
//! - nested violations are moved to `params.rawErrors`
//! - supportive `if` violations are dropped in favor of the `then`/`else`
//!   violation that explains them
//! - when the object was parsed from text, each error gets the line and
//!   column of the offending value
//!
//! Constraint violations are data, never `Err`. Only problems that prevent
//! validation, like a schema that does not compile, are reported as
//! [`ValidatorError`].
//!
//! ## Core Types
//!
//! - [`Validator`]: Validates single objects and batches
//! - [`SchemaStore`]: The active schema and its cached compiled validator
//! - [`ValidationResult`] / [`BatchResult`]: Per-object and per-batch outcomes
//! - [`NormalizedError`]: A single violation in its public shape
//! - [`SourceDocument`]: Parsed JSON text with a pointer-to-position map
//!
//! ## Example
//!
//! ```rust
//! use coroner::Validator;
//! use serde_json::json;
//!
//! let validator = Validator::new(json!({
//!     "type": "object",
//!     "required": ["id"],
//!     "properties": {
//!         "id": { "type": "string", "pattern": "^number_" }
//!     }
//! }));
//!
//! let batch = validator
//!     .validate_all(&[json!({ "id": "number_1" }), json!({ "id": "foo" })])
//!     .unwrap();
//!
//! assert!(!batch.valid);
//! assert_eq!(batch.valid_objects(), vec![&json!({ "id": "number_1" })]);
//!
//! let errored = batch.errored_objects();
//! assert_eq!(errored[0].errors()[0].keyword, "pattern");
//! assert_eq!(errored[0].errors()[0].instance_path.to_string(), "/id");
//! ```
//!
//! Parsing from text attaches positions:
//!
//! ```rust
//! use coroner::Validator;
//! use serde_json::json;
//!
//! let validator = Validator::new(json!({ "properties": { "id": { "type": "string" } } }));
//! let result = validator.validate_str("{\n  \"id\": 42\n}").unwrap();
//!
//! let position = result.errors()[0].position.unwrap();
//! let value = position.value.unwrap();
//! assert_eq!((value.line, value.column), (1, 8));
//! ```

pub mod engine;
pub mod error;
mod json;
pub mod options;
pub mod path;
pub mod positions;
pub mod store;
pub mod transform;
pub mod validator;

pub use engine::{CompiledValidator, ConstraintEngine, JsonSchemaEngine};
pub use error::{NormalizedError, Params, RawViolation, ValidatorError};
pub use jsonschema::Draft;
pub use options::ValidatorOptions;
pub use path::JsonPointer;
pub use positions::{map_positions, PathPositionMap, Position, PositionPointer, SourceDocument};
pub use store::SchemaStore;
pub use validator::{BatchPartition, BatchResult, ErroredObject, ValidationResult, Validator};

// Validators are shared across threads and rayon workers.
const _: () = {
    const fn assert_send<T: Send>() {}
    const fn assert_sync<T: Sync>() {}
    assert_send::<Validator>();
    assert_sync::<Validator>();
    assert_sync::<SchemaStore>();
};
