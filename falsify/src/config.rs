//! Check configuration.
//!
//! [`Config`] is an immutable value. Every `with_*` method consumes the
//! configuration and returns an updated copy, so partially built configs can
//! be shared between checks without surprises.

use std::fmt;
use std::sync::Arc;

use crate::arbitrary::{Arbitrary, ArbitraryRegistry};
use crate::error::ConfigError;

/// Hook called after every trial with the trial number and its arguments
pub type TrialHook = Arc<dyn Fn(usize, &[String]) -> String + Send + Sync>;

/// Hook called after every accepted shrink with the new arguments
pub type ShrinkHook = Arc<dyn Fn(&[String]) -> String + Send + Sync>;

/// Configuration for a single check
#[derive(Clone)]
pub struct Config {
    /// Number of passing trials required
    pub max_tests: usize,
    /// Number of discarded trials tolerated before giving up
    pub max_fail: usize,
    /// Name shown in the report
    pub name: String,
    /// Size used for the first trial
    pub start_size: usize,
    /// Size reached by the last trial
    pub end_size: usize,
    /// Upper bound on accepted shrink steps
    pub max_shrinks: usize,
    /// Optional per-trial hook; its output is logged
    pub on_every_trial: Option<TrialHook>,
    /// Optional per-shrink hook; its output is logged
    pub on_every_shrink: Option<ShrinkHook>,
    /// Replay a run with this seed instead of a fresh one
    pub replay: Option<u64>,
    /// Arbitraries consulted before the global registry
    pub arbitraries: Arc<ArbitraryRegistry>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_tests: 100,
            max_fail: 1000,
            name: String::new(),
            start_size: 1,
            end_size: 100,
            max_shrinks: 1000,
            on_every_trial: None,
            on_every_shrink: None,
            replay: None,
            arbitraries: Arc::new(ArbitraryRegistry::new()),
        }
    }
}

impl Config {
    /// The default configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Passing trials needed for the check to pass
    pub fn with_max_tests(self, max_tests: usize) -> Self {
        Self { max_tests, ..self }
    }

    /// Discarded trials tolerated before giving up
    pub fn with_max_fail(self, max_fail: usize) -> Self {
        Self { max_fail, ..self }
    }

    /// Name shown in the report
    pub fn with_name(self, name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..self
        }
    }

    /// Set both ends of the size schedule
    pub fn with_sizes(self, start_size: usize, end_size: usize) -> Self {
        Self {
            start_size,
            end_size,
            ..self
        }
    }

    /// Cap on accepted shrink steps
    pub fn with_max_shrinks(self, max_shrinks: usize) -> Self {
        Self {
            max_shrinks,
            ..self
        }
    }

    /// Rerun with a seed taken from an earlier report
    pub fn with_replay(self, seed: u64) -> Self {
        Self {
            replay: Some(seed),
            ..self
        }
    }

    /// Call `hook` after every trial with its index and arguments; the
    /// returned line is logged at info level
    pub fn with_on_every_trial<F>(self, hook: F) -> Self
    where
        F: Fn(usize, &[String]) -> String + Send + Sync + 'static,
    {
        Self {
            on_every_trial: Some(Arc::new(hook)),
            ..self
        }
    }

    /// Call `hook` after every accepted shrink with the new arguments; the
    /// returned line is logged at info level
    pub fn with_on_every_shrink<F>(self, hook: F) -> Self
    where
        F: Fn(&[String]) -> String + Send + Sync + 'static,
    {
        Self {
            on_every_shrink: Some(Arc::new(hook)),
            ..self
        }
    }

    /// Replace the per-check arbitraries
    pub fn with_arbitraries(self, arbitraries: ArbitraryRegistry) -> Self {
        Self {
            arbitraries: Arc::new(arbitraries),
            ..self
        }
    }

    /// Add one arbitrary to the per-check overlay.
    ///
    /// The overlay is copied on write, so configs derived earlier keep the
    /// registrations they had.
    pub fn with_arbitrary<T: 'static>(self, arbitrary: Arbitrary<T>) -> Self {
        let mut arbitraries = (*self.arbitraries).clone();
        arbitraries.register(arbitrary);
        Self {
            arbitraries: Arc::new(arbitraries),
            ..self
        }
    }

    /// Check the configuration before any trial runs
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_tests == 0 {
            return Err(ConfigError::InvalidMaxTests(self.max_tests));
        }
        if self.start_size == 0 || self.end_size == 0 || self.start_size > self.end_size {
            return Err(ConfigError::InvalidSizeBounds {
                start: self.start_size,
                end: self.end_size,
            });
        }
        Ok(())
    }

    /// Size for the trial that follows `passed` successful ones.
    ///
    /// Grows linearly from `start_size` to `end_size` over `max_tests`
    /// trials. Discarded trials do not advance it.
    pub fn size_for(&self, passed: usize) -> usize {
        let span = self.end_size - self.start_size;
        let steps = self.max_tests.saturating_sub(1).max(1);
        let passed = passed.min(steps);
        self.start_size + span * passed / steps
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("max_tests", &self.max_tests)
            .field("max_fail", &self.max_fail)
            .field("name", &self.name)
            .field("start_size", &self.start_size)
            .field("end_size", &self.end_size)
            .field("max_shrinks", &self.max_shrinks)
            .field("on_every_trial", &self.on_every_trial.is_some())
            .field("on_every_shrink", &self.on_every_shrink.is_some())
            .field("replay", &self.replay)
            .field("arbitraries", &self.arbitraries.len())
            .finish()
    }
}
