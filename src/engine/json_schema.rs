//! Constraint engine backed by the `jsonschema` crate.
//!
//! Errors reported by `jsonschema` are converted into [`RawViolation`]s that
//! follow Ajv's conventions, which is what schema authors and downstream
//! tooling expect: one violation per missing or unexpected property, Ajv
//! parameter names (`missingProperty`, `allowedValues`, `limit`, ...) and
//! Ajv wording for messages. A failing `then`/`else` branch is additionally
//! reported as an `if` violation on the conditional itself.

use std::cmp::Reverse;
use std::sync::Arc;

use ::jsonschema::error::ValidationErrorKind;
use ::jsonschema::{ValidationError, Validator};
use indexmap::IndexMap;
use serde_json::{json, Value};
use tracing::{debug, trace};

use super::messages::ErrorMessages;
use super::walk;
use super::{CompiledValidator, ConstraintEngine};
use crate::error::{Params, RawViolation, ValidatorError};
use crate::options::ValidatorOptions;
use crate::path::JsonPointer;

/// The default [`ConstraintEngine`].
///
/// # Example
///
/// ```rust
/// use coroner::{ConstraintEngine, JsonSchemaEngine};
/// use serde_json::json;
///
/// let engine = JsonSchemaEngine::default();
/// let validator = engine.compile(&json!({ "required": ["id"] })).unwrap();
///
/// let violations = validator.check(&json!({}));
/// assert_eq!(violations[0].params["missingProperty"], "id");
/// ```
#[derive(Debug, Clone, Default)]
pub struct JsonSchemaEngine {
    options: ValidatorOptions,
}

impl JsonSchemaEngine {
    /// Creates an engine with the given compilation options.
    pub fn new(options: ValidatorOptions) -> Self {
        Self { options }
    }

    /// Returns the compilation options.
    pub fn options(&self) -> &ValidatorOptions {
        &self.options
    }
}

impl ConstraintEngine for JsonSchemaEngine {
    fn compile(&self, schema: &Value) -> Result<Arc<dyn CompiledValidator>, ValidatorError> {
        let messages = ErrorMessages::compile(schema)?;

        let mut options = ::jsonschema::options();
        if let Some(draft) = self.options.draft {
            options.with_draft(draft);
        }
        if let Some(enabled) = self.options.format_assertions {
            options.should_validate_formats(enabled);
        }

        let validator = options
            .build(schema)
            .map_err(|error| ValidatorError::SchemaCompilation {
                schema_path: JsonPointer::parse(&error.instance_path.to_string()),
                message: error.to_string(),
            })?;

        debug!(draft = ?self.options.draft, "compiled schema");

        Ok(Arc::new(JsonSchemaValidator {
            validator,
            schema: schema.clone(),
            messages,
        }))
    }
}

struct JsonSchemaValidator {
    validator: Validator,
    schema: Value,
    messages: ErrorMessages,
}

impl CompiledValidator for JsonSchemaValidator {
    fn check(&self, target: &Value) -> Vec<RawViolation> {
        let violations: Vec<RawViolation> = self
            .validator
            .iter_errors(target)
            .flat_map(|error| convert(&self.schema, &error))
            .collect();

        trace!(count = violations.len(), "collected engine violations");

        let violations = add_conditional_failures(&self.schema, violations);
        self.messages.apply(&self.schema, target, violations)
    }
}

fn convert(schema: &Value, error: &ValidationError<'_>) -> Vec<RawViolation> {
    let instance_path = JsonPointer::parse(&error.instance_path.to_string());
    let schema_path = JsonPointer::parse(&error.schema_path.to_string());
    let located = |keyword: &str, message: String| {
        RawViolation::new(keyword, message)
            .with_instance_path(instance_path.clone())
            .with_schema_path(schema_path.clone())
    };

    match &error.kind {
        ValidationErrorKind::Required { property } => {
            let name = property
                .as_str()
                .map(str::to_string)
                .unwrap_or_else(|| property.to_string());
            vec![
                located("required", format!("must have required property '{name}'"))
                    .with_param("missingProperty", json!(name)),
            ]
        }
        ValidationErrorKind::AdditionalProperties { unexpected } => unexpected
            .iter()
            .map(|name| {
                located("additionalProperties", "must NOT have additional properties".into())
                    .with_param("additionalProperty", json!(name))
            })
            .collect(),
        ValidationErrorKind::FalseSchema { .. } => {
            vec![located("false schema", "boolean schema is false".into())]
        }
        _ => {
            let keyword = schema_path.last().unwrap_or_default().to_string();
            let violation = located(&keyword, error.to_string());
            match describe(&keyword, walk::constraint(schema, &violation)) {
                Some((params, message)) => {
                    let mut violation = violation.with_params(params);
                    violation.message = message;
                    vec![violation]
                }
                None => vec![violation],
            }
        }
    }
}

/// Ajv parameters and message for a failed keyword with the given constraint.
fn describe(keyword: &str, constraint: Option<&Value>) -> Option<(Params, String)> {
    let fixed = |message: &str| Some((Params::new(), message.to_string()));
    match keyword {
        "anyOf" => return fixed("must match a schema in anyOf"),
        "oneOf" => return fixed("must match exactly one schema in oneOf"),
        "not" => return fixed("must NOT be valid"),
        "contains" => return fixed("must contain at least 1 valid item(s)"),
        _ => {}
    }

    let constraint = constraint?;
    let described = match keyword {
        "type" => {
            let names = match constraint {
                Value::String(name) => name.clone(),
                Value::Array(names) => names
                    .iter()
                    .filter_map(Value::as_str)
                    .collect::<Vec<_>>()
                    .join(","),
                _ => return None,
            };
            (params([("type", constraint.clone())]), format!("must be {names}"))
        }
        "pattern" => (
            params([("pattern", constraint.clone())]),
            format!("must match pattern \"{}\"", constraint.as_str()?),
        ),
        "format" => (
            params([("format", constraint.clone())]),
            format!("must match format \"{}\"", constraint.as_str()?),
        ),
        "enum" => (
            params([("allowedValues", constraint.clone())]),
            "must be equal to one of the allowed values".to_string(),
        ),
        "const" => (
            params([("allowedValue", constraint.clone())]),
            "must be equal to constant".to_string(),
        ),
        "minLength" | "maxLength" | "minItems" | "maxItems" | "minProperties"
        | "maxProperties" => {
            let limit = constraint.as_u64()?;
            let bound = if keyword.starts_with("min") { "fewer" } else { "more" };
            let noun = match keyword {
                "minLength" | "maxLength" => "characters",
                "minItems" | "maxItems" => "items",
                _ => "properties",
            };
            (
                params([("limit", constraint.clone())]),
                format!("must NOT have {bound} than {limit} {noun}"),
            )
        }
        "minimum" | "maximum" | "exclusiveMinimum" | "exclusiveMaximum" => {
            if !constraint.is_number() {
                return None;
            }
            let comparison = match keyword {
                "minimum" => ">=",
                "maximum" => "<=",
                "exclusiveMinimum" => ">",
                _ => "<",
            };
            (
                params([("comparison", json!(comparison)), ("limit", constraint.clone())]),
                format!("must be {comparison} {constraint}"),
            )
        }
        "multipleOf" => (
            params([("multipleOf", constraint.clone())]),
            format!("must be multiple of {constraint}"),
        ),
        _ => return None,
    };
    Some(described)
}

fn params<const N: usize>(entries: [(&str, Value); N]) -> Params {
    entries
        .into_iter()
        .map(|(name, value)| (name.to_string(), value))
        .collect()
}

/// Adds an `if` violation after the last violation raised by each failing
/// `then`/`else` branch.
fn add_conditional_failures(schema: &Value, violations: Vec<RawViolation>) -> Vec<RawViolation> {
    let mut conditionals: IndexMap<String, (usize, RawViolation)> = IndexMap::new();

    for (index, violation) in violations.iter().enumerate() {
        let tokens = violation.schema_path.tokens();
        for frame in walk::frames(schema, violation) {
            let Some(branch) = tokens.get(frame.schema_len) else {
                continue;
            };
            if !matches!(branch.as_str(), "then" | "else") || frame.node.get("if").is_none() {
                continue;
            }

            let schema_path = violation.schema_path.truncate(frame.schema_len).push("if");
            let instance_path = violation.instance_path.truncate(frame.instance_len);
            let key = format!("{schema_path}|{instance_path}");

            conditionals
                .entry(key)
                .or_insert_with(|| {
                    let supportive = RawViolation::new("if", format!("must match \"{branch}\" schema"))
                        .with_instance_path(instance_path)
                        .with_schema_path(schema_path)
                        .with_param("failingKeyword", json!(branch));
                    (index, supportive)
                })
                .0 = index;
        }
    }

    if conditionals.is_empty() {
        return violations;
    }

    let mut pending: Vec<(usize, RawViolation)> = conditionals.into_values().collect();
    pending.sort_by_key(|(index, violation)| (*index, Reverse(violation.schema_path.len())));
    let mut pending = pending.into_iter().peekable();

    let mut output = Vec::with_capacity(violations.len() + pending.len());
    for (index, violation) in violations.into_iter().enumerate() {
        output.push(violation);
        while let Some((_, supportive)) = pending.next_if(|(last, _)| *last == index) {
            output.push(supportive);
        }
    }
    output
}
