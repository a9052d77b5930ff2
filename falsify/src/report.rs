//! What a check hands back: counts, labels and the final status.

use std::fmt;

use crate::error::PropertyError;
use crate::result::CommandTrace;
use crate::statistics::LabelStats;

/// A minimal failing case and how it was reached
#[derive(Debug, Clone, PartialEq)]
pub struct Counterexample {
    /// Zero-based index of the trial that failed, discarded trials included
    pub test_index: usize,
    /// Size that trial ran at
    pub size: usize,
    /// Arguments after shrinking, outermost quantifier first
    pub arguments: Vec<String>,
    /// Arguments as first generated
    pub original_arguments: Vec<String>,
    /// Accepted shrink steps
    pub shrinks: usize,
    /// Why the minimal case failed
    pub reason: String,
    /// The fault, for errored checks
    pub error: Option<PropertyError>,
    /// Command trace, for model-based checks
    pub commands: Option<CommandTrace>,
    /// Labels on the minimal case
    pub labels: Vec<String>,
}

/// How a check ended
#[derive(Debug, Clone, PartialEq)]
pub enum Status {
    /// `max_tests` trials passed
    Passed,
    /// A trial failed; the counterexample is shrunk
    Falsified(Counterexample),
    /// `max_fail` trials were discarded before enough passed
    Exhausted,
    /// A trial faulted; the counterexample is shrunk
    Errored(Counterexample),
}

/// The result of running a check
#[derive(Debug, Clone, PartialEq)]
pub struct Report {
    /// Name from the configuration, or empty
    pub name: String,
    /// Seed that reproduces this run through `Config::with_replay`
    pub seed: u64,
    /// Passing trials
    pub tests: usize,
    /// Discarded trials
    pub discards: usize,
    /// Label distribution over the passing trials
    pub labels: LabelStats,
    /// How the check ended
    pub status: Status,
}

impl Report {
    /// True if the check passed
    pub fn is_passed(&self) -> bool {
        matches!(self.status, Status::Passed)
    }

    /// The counterexample of a falsified or errored check
    pub fn counterexample(&self) -> Option<&Counterexample> {
        match &self.status {
            Status::Falsified(counterexample) | Status::Errored(counterexample) => {
                Some(counterexample)
            }
            Status::Passed | Status::Exhausted => None,
        }
    }

    fn title(&self) -> &str {
        if self.name.is_empty() { "property" } else { &self.name }
    }
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.status {
            Status::Passed => {
                write!(f, "+++ {}: OK, passed {} tests", self.title(), self.tests)?;
                if self.discards > 0 {
                    write!(f, "; {} discarded", self.discards)?;
                }
                writeln!(f, ".")?;
                write!(f, "{}", self.labels)
            }
            Status::Exhausted => writeln!(
                f,
                "*** {}: gave up after {} tests and {} discards (seed {}).",
                self.title(),
                self.tests,
                self.discards,
                self.seed
            ),
            Status::Falsified(counterexample) => {
                writeln!(
                    f,
                    "*** {}: falsified after {} tests and {} shrinks (seed {}, size {}):",
                    self.title(),
                    counterexample.test_index + 1,
                    counterexample.shrinks,
                    self.seed,
                    counterexample.size
                )?;
                write_counterexample(f, counterexample)
            }
            Status::Errored(counterexample) => {
                writeln!(
                    f,
                    "*** {}: errored after {} tests and {} shrinks (seed {}, size {}):",
                    self.title(),
                    counterexample.test_index + 1,
                    counterexample.shrinks,
                    self.seed,
                    counterexample.size
                )?;
                write_counterexample(f, counterexample)
            }
        }
    }
}

fn write_counterexample(f: &mut fmt::Formatter<'_>, counterexample: &Counterexample) -> fmt::Result {
    for argument in &counterexample.arguments {
        writeln!(f, "  {}", argument)?;
    }
    if let Some(trace) = &counterexample.commands {
        writeln!(f, "commands:")?;
        write!(f, "{}", trace)?;
    }
    if !counterexample.labels.is_empty() {
        writeln!(f, "labels: {}", counterexample.labels.join(", "))?;
    }
    writeln!(f, "{}", counterexample.reason)
}
