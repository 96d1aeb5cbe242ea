//! Active schema storage with a compiled-validator cache.
//!
//! This module provides the [`SchemaStore`] type that holds the schema a
//! validator currently checks against, and the validator compiled from it.

use parking_lot::RwLock;
use serde_json::Value;
use std::sync::Arc;
use tracing::debug;

use crate::engine::{CompiledValidator, ConstraintEngine};
use crate::error::ValidatorError;

/// A thread-safe holder for the active schema.
///
/// The schema is compiled lazily, on first use, and the compiled validator is
/// cached until the schema is replaced. Each replacement bumps a generation
/// counter so that a compilation racing with [`SchemaStore::set_schema`] never
/// caches a validator for the schema it replaced.
///
/// # Thread Safety
///
/// The store uses `RwLock` for its state:
/// - Multiple threads can read the schema and the cached validator concurrently
/// - Replacing the schema is serialized (write access)
///
/// # Example
///
/// ```rust
/// use coroner::{JsonSchemaEngine, SchemaStore};
/// use serde_json::json;
/// use std::sync::Arc;
///
/// let store = SchemaStore::new(json!({ "type": "string" }), Arc::new(JsonSchemaEngine::default()));
/// assert!(!store.is_compiled());
///
/// store.compiled().unwrap();
/// assert!(store.is_compiled());
///
/// store.set_schema(json!({ "type": "number" }));
/// assert!(!store.is_compiled());
/// ```
pub struct SchemaStore {
    engine: Arc<dyn ConstraintEngine>,
    state: RwLock<StoreState>,
}

struct StoreState {
    schema: Arc<Value>,
    generation: u64,
    compiled: Option<Arc<dyn CompiledValidator>>,
}

impl SchemaStore {
    /// Creates a store for `schema`, compiled by `engine` when first needed.
    pub fn new(schema: Value, engine: Arc<dyn ConstraintEngine>) -> Self {
        Self {
            engine,
            state: RwLock::new(StoreState {
                schema: Arc::new(schema),
                generation: 0,
                compiled: None,
            }),
        }
    }

    /// Returns the active schema.
    pub fn get_schema(&self) -> Arc<Value> {
        Arc::clone(&self.state.read().schema)
    }

    /// Replaces the active schema and drops the compiled validator.
    ///
    /// The new schema is not checked here; a malformed schema is reported by
    /// the next call that needs a compiled validator.
    pub fn set_schema(&self, schema: Value) {
        let mut state = self.state.write();
        state.schema = Arc::new(schema);
        state.generation += 1;
        state.compiled = None;
        debug!(generation = state.generation, "replaced schema");
    }

    /// Returns the number of times the schema has been replaced.
    pub fn generation(&self) -> u64 {
        self.state.read().generation
    }

    /// Returns true if a compiled validator is cached for the active schema.
    pub fn is_compiled(&self) -> bool {
        self.state.read().compiled.is_some()
    }

    /// Returns the compiled validator for the active schema, compiling it if needed.
    ///
    /// # Errors
    ///
    /// Returns the engine's error if the schema cannot be compiled. Failures
    /// are not cached: the next call tries again.
    pub fn compiled(&self) -> Result<Arc<dyn CompiledValidator>, ValidatorError> {
        let (schema, generation) = {
            let state = self.state.read();
            if let Some(compiled) = &state.compiled {
                return Ok(Arc::clone(compiled));
            }
            (Arc::clone(&state.schema), state.generation)
        };

        let compiled = self.engine.compile(&schema)?;

        let mut state = self.state.write();
        if state.generation == generation {
            state.compiled = Some(Arc::clone(&compiled));
            debug!(generation, "cached compiled validator");
        }
        Ok(compiled)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RawViolation;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingEngine {
        compilations: AtomicUsize,
    }

    struct AlwaysValid;

    impl CompiledValidator for AlwaysValid {
        fn check(&self, _target: &Value) -> Vec<RawViolation> {
            Vec::new()
        }
    }

    impl ConstraintEngine for CountingEngine {
        fn compile(&self, schema: &Value) -> Result<Arc<dyn CompiledValidator>, ValidatorError> {
            self.compilations.fetch_add(1, Ordering::SeqCst);
            if schema.is_object() {
                Ok(Arc::new(AlwaysValid))
            } else {
                Err(ValidatorError::SchemaCompilation {
                    schema_path: crate::path::JsonPointer::root(),
                    message: "not an object".to_string(),
                })
            }
        }
    }

    fn store(schema: Value) -> (SchemaStore, Arc<CountingEngine>) {
        let engine = Arc::new(CountingEngine {
            compilations: AtomicUsize::new(0),
        });
        (SchemaStore::new(schema, engine.clone()), engine)
    }

    #[test]
    fn test_get_schema_returns_active_schema() {
        let (store, _) = store(json!({ "type": "string" }));
        assert_eq!(*store.get_schema(), json!({ "type": "string" }));

        store.set_schema(json!({ "type": "number" }));
        assert_eq!(*store.get_schema(), json!({ "type": "number" }));
        assert_eq!(store.generation(), 1);
    }

    #[test]
    fn test_compiled_validator_is_cached() {
        let (store, engine) = store(json!({}));

        store.compiled().unwrap();
        store.compiled().unwrap();

        assert_eq!(engine.compilations.load(Ordering::SeqCst), 1);
        assert!(store.is_compiled());
    }

    #[test]
    fn test_set_schema_invalidates_cache() {
        let (store, engine) = store(json!({}));

        store.compiled().unwrap();
        store.set_schema(json!({ "type": "object" }));
        assert!(!store.is_compiled());

        store.compiled().unwrap();
        assert_eq!(engine.compilations.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_compile_failures_are_not_cached() {
        let (store, engine) = store(json!(42));

        assert!(store.compiled().is_err());
        assert!(store.compiled().is_err());
        assert!(!store.is_compiled());
        assert_eq!(engine.compilations.load(Ordering::SeqCst), 2);
    }
}
