//! Validator configuration.

use jsonschema::Draft;

/// Options controlling schema compilation and batch execution.
///
/// # Example
///
/// ```rust
/// use coroner::{Draft, ValidatorOptions};
///
/// let options = ValidatorOptions::new()
///     .with_draft(Draft::Draft7)
///     .with_format_assertions(true)
///     .with_parallel_batches(true);
///
/// assert_eq!(options.draft, Some(Draft::Draft7));
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ValidatorOptions {
    /// JSON Schema draft to compile against. Detected from `$schema` when unset.
    pub draft: Option<Draft>,
    /// Whether `format` is asserted. Uses the draft's default when unset.
    pub format_assertions: Option<bool>,
    /// Whether `validate_all` spreads objects across the rayon thread pool.
    pub parallel_batches: bool,
}

impl ValidatorOptions {
    /// Creates options with every setting at its default.
    pub fn new() -> Self {
        Self::default()
    }

    /// Pins the JSON Schema draft.
    pub fn with_draft(mut self, draft: Draft) -> Self {
        self.draft = Some(draft);
        self
    }

    /// Turns `format` assertions on or off.
    pub fn with_format_assertions(mut self, enabled: bool) -> Self {
        self.format_assertions = Some(enabled);
        self
    }

    /// Enables or disables parallel batch validation.
    pub fn with_parallel_batches(mut self, enabled: bool) -> Self {
        self.parallel_batches = enabled;
        self
    }
}
