//! Tests for thread-safe concurrent access to a shared validator.

use coroner::Validator;
use serde_json::json;
use std::sync::Arc;
use std::thread;

fn schema() -> serde_json::Value {
    json!({
        "type": "object",
        "required": ["name", "age"],
        "properties": {
            "name": { "type": "string", "minLength": 1 },
            "age": { "type": "integer", "minimum": 0 }
        }
    })
}

#[test]
fn test_concurrent_validation() {
    let validator = Arc::new(Validator::new(schema()));

    let handles: Vec<_> = (0..10)
        .map(|i| {
            let validator = Arc::clone(&validator);
            thread::spawn(move || {
                let result = validator
                    .validate(&json!({
                        "name": format!("User{}", i),
                        "age": 20 + i
                    }))
                    .unwrap();
                assert!(result.valid);
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }
}

#[test]
fn test_concurrent_schema_access() {
    let validator = Arc::new(Validator::new(schema()));

    let handles: Vec<_> = (0..10)
        .map(|_| {
            let validator = Arc::clone(&validator);
            thread::spawn(move || {
                let schema = validator.get_schema();
                assert_eq!(schema["required"], json!(["name", "age"]));
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }
}

#[test]
fn test_concurrent_invalid_objects() {
    let validator = Arc::new(Validator::new(schema()));

    let handles: Vec<_> = (0..10)
        .map(|i| {
            let validator = Arc::clone(&validator);
            thread::spawn(move || {
                let result = validator.validate(&json!({ "name": "", "age": -i - 1 })).unwrap();
                assert!(!result.valid);
                assert_eq!(result.errors().len(), 2);
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }
}

#[test]
fn test_schema_replacement_between_threads() {
    let validator = Arc::new(Validator::new(schema()));
    let object = json!({ "name": "Ann", "age": 30, "extra": true });

    assert!(validator.validate(&object).unwrap().valid);

    let writer = {
        let validator = Arc::clone(&validator);
        thread::spawn(move || {
            let mut strict = schema();
            strict["additionalProperties"] = json!(false);
            validator.set_schema(strict);
        })
    };
    writer.join().unwrap();

    let reader = {
        let validator = Arc::clone(&validator);
        let object = object.clone();
        thread::spawn(move || validator.validate(&object).unwrap())
    };
    let result = reader.join().unwrap();

    assert!(!result.valid);
    assert_eq!(result.errors()[0].params["additionalProperty"], "extra");
}

#[test]
fn test_validator_is_send_and_sync() {
    fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<Validator>();
    assert_send_sync::<coroner::SchemaStore>();
}
