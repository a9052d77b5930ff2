//! Command sequence generation

use std::sync::Arc;

use falsify::{GenerationError, Generator};
use rand::{Rng, RngCore};
use tracing::debug;

use crate::operations::{CommandSequence, Specification};

/// Default number of draws per step before the sequence is cut short
pub const DEFAULT_MAX_RETRIES: usize = 100;

/// Generates precondition-legal command sequences.
///
/// The model starts at [`Specification::initial_model`]. For each step a
/// command is drawn from [`Specification::next`] and redrawn while its
/// precondition rejects the current model; accepted commands advance the
/// model with `run_model`. The length is drawn from `0..=size`. When no legal
/// command turns up within `max_retries` draws the sequence ends there.
pub struct SequenceGenerator<S> {
    spec: Arc<S>,
    max_retries: usize,
}

impl<S> Clone for SequenceGenerator<S> {
    fn clone(&self) -> Self {
        Self {
            spec: Arc::clone(&self.spec),
            max_retries: self.max_retries,
        }
    }
}

impl<S: Specification> SequenceGenerator<S> {
    /// Create a new sequence generator
    pub fn new(spec: Arc<S>) -> Self {
        Self {
            spec,
            max_retries: DEFAULT_MAX_RETRIES,
        }
    }

    /// Override the per-step draw ceiling
    pub fn max_retries(mut self, max_retries: usize) -> Self {
        self.max_retries = max_retries;
        self
    }
}

impl<S: Specification> Generator<CommandSequence<S::Actual, S::Model>> for SequenceGenerator<S> {
    fn generate(
        &self,
        size: usize,
        rng: &mut dyn RngCore,
    ) -> Result<CommandSequence<S::Actual, S::Model>, GenerationError> {
        let length = rng.gen_range(0..=size);
        let mut model = self.spec.initial_model();
        let mut sequence = CommandSequence::new();

        for step in 0..length {
            let candidates = self.spec.next(&model);
            let mut accepted = None;
            for _ in 0..self.max_retries {
                let command = candidates.generate(size, rng)?;
                if command.precondition(&model) {
                    accepted = Some(command);
                    break;
                }
            }

            let Some(command) = accepted else {
                debug!(step, retries = self.max_retries, "no legal command, ending sequence");
                break;
            };
            model = command.run_model(model);
            sequence.push(command);
        }

        Ok(sequence)
    }
}
