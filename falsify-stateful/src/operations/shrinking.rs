//! Shrinking command sequences by removing contiguous spans
//!
//! Candidates drop one span of commands and keep the rest in order. Longer
//! spans come first so that a failing sequence collapses quickly; spans of a
//! single command come last. The empty sequence is never proposed, and a
//! candidate is only offered if its preconditions still hold when replayed
//! against the model from the initial state.

use std::sync::Arc;

use falsify::Shrinker;
use falsify::shrink::remove_span;

use crate::operations::{CommandSequence, Specification};

/// Span-removal shrinker for command sequences
pub struct SpanShrinker<S> {
    spec: Arc<S>,
}

impl<S> Clone for SpanShrinker<S> {
    fn clone(&self) -> Self {
        Self {
            spec: Arc::clone(&self.spec),
        }
    }
}

impl<S: Specification> SpanShrinker<S> {
    /// Create a shrinker that validates candidates against `spec`
    pub fn new(spec: Arc<S>) -> Self {
        Self { spec }
    }
}

impl<S: Specification> Shrinker<CommandSequence<S::Actual, S::Model>> for SpanShrinker<S> {
    fn shrink(
        &self,
        sequence: &CommandSequence<S::Actual, S::Model>,
    ) -> Box<dyn Iterator<Item = CommandSequence<S::Actual, S::Model>>> {
        let commands = sequence.commands().to_vec();
        let len = commands.len();
        let spec = Arc::clone(&self.spec);

        let spans = (1..len)
            .rev()
            .flat_map(move |span| (0..=len - span).map(move |start| (start, span)));

        Box::new(
            spans
                .map(move |(start, span)| {
                    CommandSequence::from_vec(remove_span(&commands, start, span))
                })
                .filter(move |candidate| candidate.is_legal(spec.as_ref())),
        )
    }
}
