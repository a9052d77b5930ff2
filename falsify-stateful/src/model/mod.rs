//! Model-based checking - run a command sequence against subject and model

use std::sync::Arc;

use falsify::{
    Arbitrary, CommandTrace, Config, ConfigError, Property, Report, TrialResult,
    check_with_config, for_all,
};
use tracing::debug;

use crate::operations::sequence::SequenceGenerator;
use crate::operations::shrinking::SpanShrinker;
use crate::operations::{CommandSequence, Specification};

/// Execute a sequence from the initial state.
///
/// Each command runs against the subject, then the model, then its
/// postcondition is checked. The first false postcondition falsifies the
/// run and nothing after it executes; the trace holds the executed prefix.
/// A command whose precondition rejects the model discards the run.
pub fn run_sequence<S: Specification>(
    spec: &S,
    sequence: &CommandSequence<S::Actual, S::Model>,
) -> TrialResult {
    let (mut actual, mut model) = spec.initial();

    for (step, command) in sequence.commands().iter().enumerate() {
        if !command.precondition(&model) {
            debug!(step, command = %command.name(), "precondition rejected, discarding");
            return TrialResult::discarded();
        }
        actual = command.run_actual(actual);
        model = command.run_model(model);

        if !command.postcondition(&actual, &model) {
            let name = command.name();
            debug!(step, command = %name, "postcondition failed");
            let executed = sequence.commands()[..=step]
                .iter()
                .map(|command| command.name())
                .collect();
            let reason = format!("postcondition of {} failed at step {}", name, step);
            return TrialResult::falsified(reason).with_commands(CommandTrace {
                commands: executed,
                failed_step: step,
            });
        }
    }

    TrialResult::passed()
}

/// The arbitrary of legal command sequences for `spec`
pub fn sequences<S: Specification>(spec: Arc<S>) -> Arbitrary<CommandSequence<S::Actual, S::Model>> {
    Arbitrary::new(
        SequenceGenerator::new(Arc::clone(&spec)),
        SpanShrinker::new(spec),
    )
}

/// A property that holds when every generated sequence keeps the subject
/// in line with the model
pub fn commands_property<S: Specification>(spec: S) -> Property {
    let spec = Arc::new(spec);
    let arbitrary = sequences(Arc::clone(&spec));
    for_all(arbitrary, move |sequence| run_sequence(spec.as_ref(), &sequence))
}

/// Check a specification; a failure report carries the minimal command trace
pub fn check_commands<S: Specification>(config: &Config, spec: S) -> Result<Report, ConfigError> {
    check_with_config(config, commands_property(spec))
}
