//! Custom error messages declared in the schema.
//!
//! A subschema may carry an `errorMessage` keyword that replaces the
//! violations it raises with an authored message:
//!
//! ```json
//! { "pattern": "^number_", "errorMessage": "must start with <number_>" }
//! ```
//!
//! The string form replaces every violation raised inside the subschema. The
//! object form picks messages per keyword (`"pattern": "..."`), per missing
//! property (`"required": { "id": "..." }`), per property
//! (`"properties": { "id": "..." }`), per tuple item (`"items": ["..."]`),
//! with `_` as the fallback. Each replacement is a single `errorMessage`
//! violation whose nested `errors` are the violations it replaced.
//!
//! Messages may interpolate instance values with `${<json pointer>}`, either
//! relative to the failing value (`${0}`, `${1/name}`) or absolute
//! (`${/name}`). Values are rendered as JSON.

use std::sync::LazyLock;

use indexmap::IndexMap;
use regex::{Captures, Regex};
use serde_json::Value;

use super::walk::{self, Frame};
use crate::error::{RawViolation, ValidatorError};
use crate::path::JsonPointer;

const KEYWORD: &str = "errorMessage";

/// Keywords whose object value maps names to subschemas.
const SCHEMA_MAPS: &[&str] = &[
    "properties",
    "patternProperties",
    "definitions",
    "$defs",
    "dependencies",
    "dependentSchemas",
];

/// Keywords whose values are data rather than subschemas.
const DATA_KEYWORDS: &[&str] = &["enum", "const", "default", "examples", KEYWORD];

/// Matches `${pointer}` placeholders in message templates.
static PLACEHOLDER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\$\{([^}]*)\}").expect("placeholder pattern is valid"));

/// Applies `errorMessage` annotations to raw violations.
#[derive(Debug, Clone)]
pub(crate) struct ErrorMessages {
    enabled: bool,
}

impl ErrorMessages {
    /// Checks every annotation in `schema` and prepares message templates.
    ///
    /// # Errors
    ///
    /// Returns `ValidatorError::InvalidErrorMessage` for malformed annotations.
    pub(crate) fn compile(schema: &Value) -> Result<Self, ValidatorError> {
        let mut found = 0;
        check_annotations(schema, &JsonPointer::root(), &mut found)?;

        Ok(Self { enabled: found > 0 })
    }

    /// Replaces the violations covered by an annotation with custom messages.
    ///
    /// Violations not covered by any annotation are passed through. A custom
    /// message takes the place of the first violation it replaces.
    pub(crate) fn apply(
        &self,
        schema: &Value,
        instance: &Value,
        violations: Vec<RawViolation>,
    ) -> Vec<RawViolation> {
        if !self.enabled {
            return violations;
        }

        let targets: Vec<Option<Target>> = violations
            .iter()
            .map(|violation| find_target(schema, violation))
            .collect();

        let mut groups: IndexMap<String, Group> = IndexMap::new();
        for (violation, target) in violations.iter().zip(&targets) {
            if let Some(target) = target {
                groups
                    .entry(target.group_key())
                    .or_insert_with(|| Group {
                        target: target.clone(),
                        errors: Vec::new(),
                    })
                    .errors
                    .push(violation.clone());
            }
        }

        let mut output = Vec::with_capacity(violations.len());
        for (violation, target) in violations.into_iter().zip(targets) {
            let Some(target) = target else {
                output.push(violation);
                continue;
            };
            if let Some(group) = groups.swap_remove(&target.group_key()) {
                output.push(self.synthesize(instance, group));
            }
        }
        output
    }

    fn synthesize(&self, instance: &Value, group: Group) -> RawViolation {
        let Target {
            annotation_path,
            instance_path,
            template,
            ..
        } = group.target;

        let message = self.render(&template, instance, &instance_path);
        RawViolation::new(KEYWORD, message)
            .with_instance_path(instance_path)
            .with_schema_path(annotation_path)
            .with_errors(group.errors)
    }

    /// Interpolates `${pointer}` placeholders against the instance.
    fn render(&self, template: &str, instance: &Value, base: &JsonPointer) -> String {
        PLACEHOLDER
            .replace_all(template, |caps: &Captures<'_>| {
                lookup(instance, base, &caps[1])
                    .and_then(|value| serde_json::to_string(value).ok())
                    .unwrap_or_else(|| "undefined".to_string())
            })
            .into_owned()
    }
}

/// Where a violation's custom message comes from.
#[derive(Debug, Clone)]
struct Target {
    annotation_path: JsonPointer,
    instance_path: JsonPointer,
    selector: String,
    template: String,
}

impl Target {
    fn group_key(&self) -> String {
        format!(
            "{}|{}|{}",
            self.annotation_path, self.instance_path, self.selector
        )
    }
}

#[derive(Debug)]
struct Group {
    target: Target,
    errors: Vec<RawViolation>,
}

/// Finds the innermost annotation that has a message for `violation`.
fn find_target(schema: &Value, violation: &RawViolation) -> Option<Target> {
    walk::frames(schema, violation)
        .into_iter()
        .rev()
        .find_map(|frame| match_annotation(&frame, violation))
}

fn match_annotation(frame: &Frame<'_>, violation: &RawViolation) -> Option<Target> {
    let annotation = frame.node.get(KEYWORD)?;
    let base_schema = violation.schema_path.truncate(frame.schema_len);
    let base_instance = violation.instance_path.truncate(frame.instance_len);
    let rel_schema = &violation.schema_path.tokens()[frame.schema_len..];
    let rel_instance = &violation.instance_path.tokens()[frame.instance_len..];

    let target = |selector: String, instance_path: JsonPointer, template: &str| Target {
        annotation_path: base_schema.push(KEYWORD),
        instance_path,
        selector,
        template: template.to_string(),
    };

    let messages = match annotation {
        Value::String(template) => {
            return Some(target("_".to_string(), base_instance, template));
        }
        Value::Object(messages) => messages,
        _ => return None,
    };

    if let [keyword] = rel_schema {
        if rel_instance.is_empty() {
            match (keyword.as_str(), messages.get(keyword)) {
                ("required", Some(Value::Object(per_property))) => {
                    let property = violation.params.get("missingProperty").and_then(Value::as_str);
                    if let Some((property, Value::String(template))) =
                        property.and_then(|p| per_property.get(p).map(|t| (p, t)))
                    {
                        return Some(target(format!("required/{property}"), base_instance, template));
                    }
                }
                ("properties" | "items", _) => {}
                (_, Some(Value::String(template))) => {
                    return Some(target(keyword.clone(), base_instance, template));
                }
                _ => {}
            }
        }
    }

    if let [keyword, name, ..] = rel_schema {
        let child = match (keyword.as_str(), messages.get(keyword)) {
            ("properties", Some(Value::Object(per_property))) => per_property.get(name),
            ("items", Some(Value::Array(per_item))) => {
                name.parse::<usize>().ok().and_then(|i| per_item.get(i))
            }
            _ => None,
        };
        if let Some(Value::String(template)) = child {
            let at_child = rel_instance.first().is_some_and(|token| token == name);
            if at_child {
                return Some(target(
                    format!("{keyword}/{name}"),
                    base_instance.push(name.clone()),
                    template,
                ));
            }
        }
    }

    match messages.get("_") {
        Some(Value::String(template)) => Some(target("_".to_string(), base_instance, template)),
        _ => None,
    }
}

/// Resolves a relative (`0`, `1/name`) or absolute (`/name`) pointer.
fn lookup<'a>(instance: &'a Value, base: &JsonPointer, expression: &str) -> Option<&'a Value> {
    let expression = expression.trim();
    if expression.is_empty() || expression.starts_with('/') {
        return JsonPointer::parse(expression).resolve(instance);
    }

    let digits = expression
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(expression.len());
    let up: usize = expression[..digits].parse().ok()?;
    let rest = &expression[digits..];
    if !rest.is_empty() && !rest.starts_with('/') {
        return None;
    }

    let depth = base.len().checked_sub(up)?;
    base.truncate(depth)
        .join(&JsonPointer::parse(rest))
        .resolve(instance)
}

fn check_annotations(
    schema: &Value,
    path: &JsonPointer,
    found: &mut usize,
) -> Result<(), ValidatorError> {
    match schema {
        Value::Object(map) => {
            if let Some(annotation) = map.get(KEYWORD) {
                check_annotation(annotation, &path.push(KEYWORD))?;
                *found += 1;
            }
            for (key, value) in map {
                if DATA_KEYWORDS.contains(&key.as_str()) {
                    continue;
                }
                let child_path = path.push(key.clone());
                match value {
                    Value::Object(named) if SCHEMA_MAPS.contains(&key.as_str()) => {
                        for (name, subschema) in named {
                            check_annotations(subschema, &child_path.push(name.clone()), found)?;
                        }
                    }
                    _ => check_annotations(value, &child_path, found)?,
                }
            }
            Ok(())
        }
        Value::Array(items) => {
            for (index, item) in items.iter().enumerate() {
                check_annotations(item, &path.push_index(index), found)?;
            }
            Ok(())
        }
        _ => Ok(()),
    }
}

fn check_annotation(annotation: &Value, path: &JsonPointer) -> Result<(), ValidatorError> {
    let invalid = |reason: String| ValidatorError::InvalidErrorMessage {
        schema_path: path.clone(),
        reason,
    };

    let messages = match annotation {
        Value::String(_) => return Ok(()),
        Value::Object(messages) => messages,
        other => return Err(invalid(format!("expected string or object, got {other}"))),
    };

    for (keyword, message) in messages {
        let valid = match (keyword.as_str(), message) {
            (_, Value::String(_)) => keyword != "properties" && keyword != "items",
            ("properties" | "required", Value::Object(named)) => {
                named.values().all(Value::is_string)
            }
            ("items", Value::Array(items)) => items.iter().all(Value::is_string),
            _ => false,
        };
        if !valid {
            return Err(invalid(format!("unsupported message for '{keyword}'")));
        }
    }
    Ok(())
}
