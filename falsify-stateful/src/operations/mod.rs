//! Commands, specifications and command sequences

pub mod generator;
pub mod sequence;
pub mod shrinking;

use std::fmt;
use std::sync::Arc;

use falsify::BoxedGenerator;

/// One state transition, applied to both the real subject and the model
pub trait Command<Actual, Model>: Send + Sync {
    /// Name shown in sequences and failure traces
    fn name(&self) -> String;

    /// Whether the command may run in the given model state
    fn precondition(&self, _model: &Model) -> bool {
        true
    }

    /// Apply the command to the real subject
    fn run_actual(&self, actual: Actual) -> Actual;

    /// Apply the command to the model
    fn run_model(&self, model: Model) -> Model;

    /// Compare the subject with the model after both have run
    fn postcondition(&self, actual: &Actual, model: &Model) -> bool;
}

/// A shareable command
pub type BoxedCommand<Actual, Model> = Arc<dyn Command<Actual, Model>>;

/// Describes a subject under test and the model it is checked against
pub trait Specification: Send + Sync + 'static {
    /// The real subject
    type Actual: 'static;
    /// The abstract model
    type Model: 'static;

    /// Fresh subject and model, in corresponding states
    fn initial(&self) -> (Self::Actual, Self::Model);

    /// Generator for the commands worth trying in the given model state
    fn next(&self, model: &Self::Model) -> BoxedGenerator<BoxedCommand<Self::Actual, Self::Model>>;

    /// Fresh model alone; override when building the subject is expensive
    fn initial_model(&self) -> Self::Model {
        self.initial().1
    }
}

/// An ordered list of commands
pub struct CommandSequence<Actual, Model> {
    commands: Vec<BoxedCommand<Actual, Model>>,
}

impl<Actual, Model> Clone for CommandSequence<Actual, Model> {
    fn clone(&self) -> Self {
        Self {
            commands: self.commands.clone(),
        }
    }
}

impl<Actual, Model> CommandSequence<Actual, Model> {
    /// Create a new empty sequence
    pub fn new() -> Self {
        Self {
            commands: Vec::new(),
        }
    }

    pub fn from_vec(commands: Vec<BoxedCommand<Actual, Model>>) -> Self {
        Self { commands }
    }

    pub fn push(&mut self, command: BoxedCommand<Actual, Model>) {
        self.commands.push(command);
    }

    pub fn commands(&self) -> &[BoxedCommand<Actual, Model>] {
        &self.commands
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Names of the commands, in order
    pub fn names(&self) -> Vec<String> {
        self.commands.iter().map(|command| command.name()).collect()
    }

    /// Replay the preconditions against the model from `initial_model`.
    ///
    /// Only the model runs; the subject is never touched.
    pub fn is_legal<S>(&self, spec: &S) -> bool
    where
        S: Specification<Actual = Actual, Model = Model>,
    {
        let mut model = spec.initial_model();
        for command in &self.commands {
            if !command.precondition(&model) {
                return false;
            }
            model = command.run_model(model);
        }
        true
    }
}

impl<Actual, Model> Default for CommandSequence<Actual, Model> {
    fn default() -> Self {
        Self::new()
    }
}

impl<Actual, Model> fmt::Debug for CommandSequence<Actual, Model> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.names()).finish()
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use falsify::{GeneratorExt, elements};

    /// A counter whose subject refuses to go below zero
    pub(crate) struct Counter;

    pub(crate) struct Inc;
    pub(crate) struct Dec;

    impl Command<u32, i64> for Inc {
        fn name(&self) -> String {
            "Inc".to_string()
        }

        fn run_actual(&self, actual: u32) -> u32 {
            actual + 1
        }

        fn run_model(&self, model: i64) -> i64 {
            model + 1
        }

        fn postcondition(&self, actual: &u32, model: &i64) -> bool {
            i64::from(*actual) == *model
        }
    }

    impl Command<u32, i64> for Dec {
        fn name(&self) -> String {
            "Dec".to_string()
        }

        fn run_actual(&self, actual: u32) -> u32 {
            actual.saturating_sub(1)
        }

        fn run_model(&self, model: i64) -> i64 {
            model - 1
        }

        fn postcondition(&self, actual: &u32, model: &i64) -> bool {
            i64::from(*actual) == *model
        }
    }

    impl Specification for Counter {
        type Actual = u32;
        type Model = i64;

        fn initial(&self) -> (u32, i64) {
            (0, 0)
        }

        fn next(&self, _model: &i64) -> BoxedGenerator<BoxedCommand<u32, i64>> {
            elements(vec![inc(), dec()]).boxed()
        }
    }

    pub(crate) fn inc() -> BoxedCommand<u32, i64> {
        Arc::new(Inc)
    }

    pub(crate) fn dec() -> BoxedCommand<u32, i64> {
        Arc::new(Dec)
    }

    /// Dec only when the model is positive
    pub(crate) struct GuardedDec;

    impl Command<u32, i64> for GuardedDec {
        fn name(&self) -> String {
            "GuardedDec".to_string()
        }

        fn precondition(&self, model: &i64) -> bool {
            *model > 0
        }

        fn run_actual(&self, actual: u32) -> u32 {
            actual.saturating_sub(1)
        }

        fn run_model(&self, model: i64) -> i64 {
            model - 1
        }

        fn postcondition(&self, actual: &u32, model: &i64) -> bool {
            i64::from(*actual) == *model
        }
    }

    #[test]
    fn test_sequence_debug_shows_names() {
        let sequence = CommandSequence::from_vec(vec![inc(), dec(), inc()]);
        assert_eq!(format!("{:?}", sequence), r#"["Inc", "Dec", "Inc"]"#);
        assert_eq!(sequence.len(), 3);
    }

    #[test]
    fn test_legality_replays_preconditions() {
        let guarded: BoxedCommand<u32, i64> = Arc::new(GuardedDec);

        let legal = CommandSequence::from_vec(vec![inc(), Arc::clone(&guarded)]);
        assert!(legal.is_legal(&Counter));

        let illegal = CommandSequence::from_vec(vec![Arc::clone(&guarded), inc()]);
        assert!(!illegal.is_legal(&Counter));

        assert!(CommandSequence::<u32, i64>::new().is_legal(&Counter));
    }
}
