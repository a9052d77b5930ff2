//! Error types for generation, property evaluation and configuration.

use thiserror::Error;

/// A generator could not produce a value within its budget
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GenerationError {
    /// `elements` was given an empty collection
    #[error("cannot pick from an empty list of elements")]
    NoElements,

    /// `one_of` was given no generators
    #[error("cannot choose from an empty list of generators")]
    NoGenerators,

    /// `choose` was given bounds with `low > high`
    #[error("empty range: {low} > {high}")]
    EmptyRange { low: String, high: String },

    /// `frequency` weights summed to zero
    #[error("frequency weights must sum to a positive value")]
    NonPositiveWeight,

    /// `such_that` rejected every draw within its retry ceiling
    #[error("such_that predicate rejected {tries} consecutive draws")]
    SuchThatExhausted { tries: usize },
}

/// A property faulted instead of passing or failing.
///
/// This is the payload of an errored trial. The report keeps it apart from an
/// ordinary falsification so that "fails" and "faults" are never confused.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PropertyError {
    /// Value generation failed
    #[error("generation failed: {0}")]
    Generation(#[from] GenerationError),

    /// The property body panicked
    #[error("property panicked: {message}")]
    Panicked { message: String },

    /// No arbitrary is registered for the requested type
    #[error("no arbitrary registered for type `{type_name}`")]
    NoArbitrary { type_name: &'static str },
}

impl PropertyError {
    /// Build a panic error from a `catch_unwind` payload
    pub fn from_panic(payload: Box<dyn std::any::Any + Send>) -> Self {
        let message = if let Some(text) = payload.downcast_ref::<&str>() {
            (*text).to_string()
        } else if let Some(text) = payload.downcast_ref::<String>() {
            text.clone()
        } else {
            "non-string panic payload".to_string()
        };
        Self::Panicked { message }
    }
}

/// Invalid check configuration, raised before any trial runs
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// `max_tests` must be at least one
    #[error("invalid max_tests: {0} (must be > 0)")]
    InvalidMaxTests(usize),

    /// Size bounds must be positive and ordered
    #[error("invalid size bounds: start {start}, end {end} (need 0 < start <= end)")]
    InvalidSizeBounds { start: usize, end: usize },

    /// `frequency` was given no weighted generators
    #[error("frequency needs at least one weighted generator")]
    EmptyFrequency,

    /// The process-wide registry can only be populated once
    #[error("the global arbitrary registry is already initialized")]
    RegistryAlreadyInitialized,
}
