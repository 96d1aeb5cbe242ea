//! Tests for single-object validation.

use coroner::{Validator, ValidatorError};
use serde::Serialize;
use serde_json::{json, Value};
use std::collections::{BTreeMap, HashMap};

fn schema() -> Value {
    serde_json::from_str(include_str!("fixtures/json-schema/schema.json")).unwrap()
}

fn strict_schema() -> Value {
    serde_json::from_str(include_str!("fixtures/json-schema/schema-no-additional.json")).unwrap()
}

#[test]
fn test_valid_object_has_no_errors() {
    let validator = Validator::new(schema());
    let object = json!({ "id": "number_1" });

    let result = validator.validate(&object).unwrap();

    assert!(result.valid);
    assert!(result.errors.is_none());
    assert_eq!(result.object, object);
}

#[test]
fn test_pattern_uses_custom_message() {
    let validator = Validator::new(schema());

    let result = validator.validate(&json!({ "id": "x" })).unwrap();

    assert!(!result.valid);
    let errors = result.errors();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].message, "must start with <number_>");
    assert_eq!(errors[0].keyword, "errorMessage");
    assert_eq!(errors[0].instance_path.to_string(), "/id");
}

#[test]
fn test_custom_message_keeps_raw_errors() {
    let validator = Validator::new(schema());

    let result = validator.validate(&json!({ "id": "x" })).unwrap();
    let error = &result.errors()[0];

    assert!(error.params.get("errors").is_none());
    let raw = error.raw_errors().unwrap();
    assert_eq!(raw.len(), 1);
    assert_eq!(raw[0]["keyword"], "pattern");
    assert_eq!(raw[0]["params"]["pattern"], "^number_");
}

#[test]
fn test_missing_required_property() {
    let validator = Validator::new(schema());

    let result = validator.validate(&json!({})).unwrap();

    assert!(!result.valid);
    let errors = result.errors();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].keyword, "required");
    assert_eq!(errors[0].params["missingProperty"], "id");
    assert_eq!(errors[0].message, "must have required property 'id'");
    assert!(errors[0].instance_path.is_root());
}

#[test]
fn test_supportive_conditional_errors_are_dropped() {
    let validator = Validator::new(schema());

    let result = validator.validate(&json!({ "id": "x", "type": "Bar" })).unwrap();

    assert!(!result.valid);
    assert_eq!(result.errors().len(), 2);
    assert!(result.errors().iter().all(|error| error.keyword != "if"));
}

#[test]
fn test_templated_message_interpolates_value() {
    let validator = Validator::new(schema());

    let result = validator
        .validate(&json!({ "id": "number_1", "type": "Bar" }))
        .unwrap();

    let errors = result.errors();
    assert_eq!(errors.len(), 1);
    assert_eq!(
        errors[0].message,
        "invalid property type \"Bar\"; must be any of { String, Number }"
    );
    assert_eq!(errors[0].instance_path.to_string(), "/type");
    assert_eq!(errors[0].raw_errors().unwrap()[0]["keyword"], "enum");
}

#[test]
fn test_additional_property_is_reported() {
    let validator = Validator::new(strict_schema());

    let result = validator
        .validate(&json!({ "id": "number_1", "extra": true }))
        .unwrap();

    assert!(!result.valid);
    let errors = result.errors();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].keyword, "additionalProperties");
    assert_eq!(errors[0].params["additionalProperty"], "extra");
    assert_eq!(errors[0].message, "must NOT have additional properties");
}

#[test]
fn test_set_schema_changes_outcome() {
    let validator = Validator::new(schema());
    let object = json!({ "id": "number_1", "bar": 1 });

    assert!(validator.validate(&object).unwrap().valid);

    validator.set_schema(strict_schema());
    let result = validator.validate(&object).unwrap();

    assert!(!result.valid);
    assert_eq!(result.errors()[0].params["additionalProperty"], "bar");
    assert_eq!(*validator.get_schema(), strict_schema());
}

#[test]
fn test_validation_is_idempotent() {
    let validator = Validator::new(schema());
    let object = json!({ "id": "x", "type": "Bar", "foo": 3 });

    let first = validator.validate(&object).unwrap();
    let second = validator.validate(&object).unwrap();

    assert_eq!(first, second);
}

#[test]
fn test_valid_iff_no_errors() {
    let validator = Validator::new(schema());
    let objects = [
        json!({}),
        json!({ "id": "number_1" }),
        json!({ "id": 5 }),
        json!({ "id": "number_1", "foo": "bar", "type": "Number" }),
        json!("not an object"),
    ];

    for object in &objects {
        let result = validator.validate(object).unwrap();
        assert_eq!(result.valid, result.errors.is_none());
        assert_eq!(result.valid, result.errors().is_empty());
    }
}

#[test]
fn test_object_is_not_mutated() {
    let validator = Validator::new(schema());
    let object = json!({ "id": "x", "nested": { "a": [1, 2] } });
    let before = object.clone();

    let result = validator.validate(&object).unwrap();

    assert_eq!(object, before);
    assert_eq!(result.object, before);
}

#[test]
fn test_invalid_schema_is_fatal() {
    let validator = Validator::new(json!({ "type": "strin" }));

    let error = validator.validate(&json!({})).unwrap_err();

    assert!(error.is_schema_error());
    assert!(matches!(error, ValidatorError::SchemaCompilation { .. }));
}

#[test]
fn test_malformed_error_message_is_fatal() {
    let validator = Validator::new(json!({ "errorMessage": 42 }));

    let error = validator.validate(&json!({})).unwrap_err();

    assert!(matches!(error, ValidatorError::InvalidErrorMessage { .. }));
}

#[test]
fn test_recovers_after_schema_fix() {
    let validator = Validator::new(json!({ "type": "strin" }));
    assert!(validator.validate(&json!("a")).is_err());

    validator.set_schema(json!({ "type": "string" }));
    assert!(validator.validate(&json!("a")).unwrap().valid);
}

#[derive(Serialize)]
struct Record {
    id: String,
    #[serde(rename = "type")]
    kind: String,
}

#[test]
fn test_validate_serializable() {
    let validator = Validator::new(schema());

    let result = validator
        .validate_serializable(&Record {
            id: "number_7".to_string(),
            kind: "Number".to_string(),
        })
        .unwrap();
    assert!(result.valid);

    let result = validator
        .validate_serializable(&Record {
            id: "7".to_string(),
            kind: "Number".to_string(),
        })
        .unwrap();
    assert!(!result.valid);
}

#[test]
fn test_unrepresentable_value_is_an_error() {
    let validator = Validator::new(schema());
    let mut map = HashMap::new();
    map.insert((1, 2), "tuple keys have no JSON form");

    let error = validator.validate_serializable(&map).unwrap_err();

    assert!(matches!(error, ValidatorError::Serialization(_)));
    assert!(!error.is_schema_error());
}

#[test]
fn test_non_finite_floats_are_an_error() {
    let validator = Validator::new(json!({ "type": "null" }));

    let error = validator.validate_serializable(&f64::NAN).unwrap_err();
    assert!(matches!(error, ValidatorError::Serialization(_)));

    let validator = Validator::new(json!({
        "properties": { "score": { "type": ["number", "null"] } }
    }));
    let scores = BTreeMap::from([("score", f64::INFINITY)]);

    let error = validator.validate_serializable(&scores).unwrap_err();
    assert!(matches!(error, ValidatorError::Serialization(_)));

    let scores = BTreeMap::from([("score", 0.5)]);
    assert!(validator.validate_serializable(&scores).unwrap().valid);
}
