//! Tests for batch validation and its result projections.

use coroner::{Validator, ValidatorOptions};
use serde_json::{json, Value};

fn schema() -> Value {
    serde_json::from_str(include_str!("fixtures/json-schema/schema.json")).unwrap()
}

fn objects() -> Vec<Value> {
    serde_json::from_str(include_str!("fixtures/samples/batch.json")).unwrap()
}

#[test]
fn test_batch_reports_every_object() {
    let validator = Validator::new(schema());
    let objects = objects();

    let batch = validator.validate_all(&objects).unwrap();

    assert!(!batch.valid);
    assert_eq!(batch.len(), objects.len());
    let flags: Vec<bool> = batch.results.iter().map(|r| r.valid).collect();
    assert_eq!(flags, vec![false, false, true, true, true, false]);

    for (result, object) in batch.results.iter().zip(&objects) {
        assert_eq!(&result.object, object);
    }
}

#[test]
fn test_valid_objects_projection() {
    let validator = Validator::new(schema());
    let objects = objects();

    let batch = validator.validate_all(&objects).unwrap();

    assert_eq!(
        batch.valid_objects(),
        vec![&objects[2], &objects[3], &objects[4]]
    );

    let errored: Vec<&Value> = batch
        .errored_objects()
        .into_iter()
        .map(|result| &result.object)
        .collect();
    assert_eq!(errored, vec![&objects[0], &objects[1], &objects[5]]);
}

#[test]
fn test_partition_keeps_errors() {
    let validator = Validator::new(schema());
    let objects = objects();

    let batch = validator.validate_all(&objects).unwrap();
    let partition = batch.partition();
    assert_eq!(partition, batch.into_partition());

    assert_eq!(partition.valid_objects, objects[2..5].to_vec());
    assert_eq!(partition.errored_objects.len(), 3);

    let first = &partition.errored_objects[0];
    assert_eq!(first.object, objects[0]);
    assert_eq!(first.errors[0].params["missingProperty"], "id");

    let last = &partition.errored_objects[2];
    assert_eq!(last.object, objects[5]);
    assert_eq!(
        last.errors[0].message,
        "invalid property type \"Bar\"; must be any of { String, Number }"
    );
}

#[test]
fn test_batch_matches_single_validation() {
    let validator = Validator::new(schema());
    let objects = objects();

    let batch = validator.validate_all(&objects).unwrap();

    for (result, object) in batch.results.iter().zip(&objects) {
        assert_eq!(result, &validator.validate(object).unwrap());
    }
}

#[test]
fn test_all_valid_batch() {
    let validator = Validator::new(schema());
    let objects = vec![json!({ "id": "number_1" }), json!({ "id": "number_2" })];

    let batch = validator.validate_all(&objects).unwrap();

    assert!(batch.valid);
    assert!(batch.errored_objects().is_empty());
}

#[test]
fn test_empty_batch_is_valid() {
    let validator = Validator::new(schema());

    let batch = validator.validate_all(&[]).unwrap();

    assert!(batch.valid);
    assert!(batch.results.is_empty());
    assert_eq!(batch.to_json(), json!({ "valid": true, "results": [] }));
}

#[test]
fn test_parallel_batch_preserves_order() {
    let sequential = Validator::new(schema());
    let parallel = Validator::with_options(
        schema(),
        ValidatorOptions::new().with_parallel_batches(true),
    );

    let objects: Vec<Value> = (0..200)
        .map(|i| {
            if i % 3 == 0 {
                json!({ "id": format!("bad_{i}") })
            } else {
                json!({ "id": format!("number_{i}") })
            }
        })
        .collect();

    let expected = sequential.validate_all(&objects).unwrap();
    let actual = parallel.validate_all(&objects).unwrap();

    assert_eq!(actual, expected);
    assert!(!actual.valid);
}

#[test]
fn test_invalid_schema_fails_whole_batch() {
    let validator = Validator::new(json!({ "minLength": "three" }));

    let result = validator.validate_all(&[json!("a"), json!("b")]);

    assert!(result.unwrap_err().is_schema_error());
}
