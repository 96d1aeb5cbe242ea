//! Error types for validation.
//!
//! This module separates fatal validator errors from constraint violations,
//! which are reported as data.

mod validator_error;
mod violation;

pub use validator_error::ValidatorError;
pub use violation::{NormalizedError, Params, RawViolation};
