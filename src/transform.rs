//! Normalization passes turning raw violations into public errors.
//!
//! Each pass is a pure function, and [`normalize`] composes them in a fixed
//! order:
//!
//! 1. [`wrap_raw_errors`]: nested violations move from `errors` to
//!    `params.rawErrors`.
//! 2. [`drop_supportive`]: `if` violations are removed; a failing conditional
//!    always comes with the more specific `then`/`else` violation.
//! 3. [`attach_position`]: when a position map is available, each error gets
//!    the source ranges of its instance path.
//!
//! Position lookup runs last and relies on instance paths exactly as the
//! engine reported them.

use serde_json::Value;

use crate::error::{NormalizedError, RawViolation};
use crate::positions::PathPositionMap;

/// Keyword of violations that only support a more specific violation.
pub const SUPPORTIVE_KEYWORD: &str = "if";

/// Runs all normalization passes over the violations of one object.
///
/// # Example
///
/// ```rust
/// use coroner::{transform, RawViolation};
///
/// let violations = vec![
///     RawViolation::new("pattern", "must match pattern \"^a\""),
///     RawViolation::new("if", "must match \"then\" schema"),
/// ];
///
/// let errors = transform::normalize(violations, None);
/// assert_eq!(errors.len(), 1);
/// assert_eq!(errors[0].keyword, "pattern");
/// ```
pub fn normalize(
    violations: Vec<RawViolation>,
    positions: Option<&PathPositionMap>,
) -> Vec<NormalizedError> {
    let wrapped = violations.into_iter().map(wrap_raw_errors).collect();
    let actionable = drop_supportive(wrapped);

    match positions {
        Some(positions) => actionable
            .into_iter()
            .map(|error| attach_position(error, positions))
            .collect(),
        None => actionable,
    }
}

/// Converts a raw violation, relocating its nested violations to
/// `params.rawErrors`.
///
/// Both nested violations attached by the engine and an `errors` entry already
/// present in the params are relocated; the result never has `params.errors`.
pub fn wrap_raw_errors(violation: RawViolation) -> NormalizedError {
    let RawViolation {
        keyword,
        instance_path,
        schema_path,
        mut params,
        message,
        errors,
    } = violation;

    let mut raw_errors = match params.remove("errors") {
        Some(Value::Array(items)) => items,
        Some(other) => vec![other],
        None => Vec::new(),
    };
    raw_errors.extend(errors.iter().map(RawViolation::to_json));

    if !raw_errors.is_empty() {
        params.insert("rawErrors".to_string(), Value::Array(raw_errors));
    }

    NormalizedError {
        keyword,
        instance_path,
        schema_path,
        message,
        params,
        position: None,
    }
}

/// Removes supportive `if` violations.
pub fn drop_supportive(errors: Vec<NormalizedError>) -> Vec<NormalizedError> {
    errors
        .into_iter()
        .filter(|error| !is_supportive(error))
        .collect()
}

/// Returns true for violations that carry no information of their own.
pub fn is_supportive(error: &NormalizedError) -> bool {
    error.keyword == SUPPORTIVE_KEYWORD
}

/// Attaches the source position of the error's instance path.
///
/// Paths missing from the map leave the error without a position.
pub fn attach_position(mut error: NormalizedError, positions: &PathPositionMap) -> NormalizedError {
    error.position = positions.get(&error.instance_path.to_string()).copied();
    error
}
