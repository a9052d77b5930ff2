//! Running independent checks concurrently.
//!
//! Each check stays single-threaded; only whole checks are spread over the
//! worker pool. Result trees never cross threads.

use std::panic::{AssertUnwindSafe, catch_unwind};

use crossbeam::channel;
use tracing::{debug, warn};

use crate::config::Config;
use crate::error::{ConfigError, PropertyError};
use crate::execution::check_with_config;
use crate::property::Property;
use crate::report::{Counterexample, Report, Status};
use crate::statistics::LabelStats;

/// Settings for [`check_all_with`]
#[derive(Debug, Clone)]
pub struct ParallelConfig {
    /// Worker threads to start; never more than there are checks
    pub num_threads: usize,
}

impl Default for ParallelConfig {
    fn default() -> Self {
        Self {
            num_threads: num_cpus::get(),
        }
    }
}

/// Check every named property, one worker per CPU.
///
/// Reports come back in input order, one per property, each named after
/// its property. Every check gets its own copy of `config`; a fixed `replay`
/// seed therefore replays every check with that seed. A check that panics
/// outside its property, in a hook for instance, still gets an entry: an
/// errored report with no arguments.
pub fn check_all(
    config: &Config,
    properties: Vec<(String, Property)>,
) -> Vec<Result<Report, ConfigError>> {
    check_all_with(&ParallelConfig::default(), config, properties)
}

/// [`check_all`] with an explicit worker count
pub fn check_all_with(
    parallel: &ParallelConfig,
    config: &Config,
    properties: Vec<(String, Property)>,
) -> Vec<Result<Report, ConfigError>> {
    if let Err(error) = config.validate() {
        return properties.iter().map(|_| Err(error.clone())).collect();
    }

    let total = properties.len();
    let workers = parallel.num_threads.clamp(1, total.max(1));
    debug!(checks = total, workers, "running checks in parallel");

    let names: Vec<String> = properties.iter().map(|(name, _)| name.clone()).collect();
    let (job_sender, job_receiver) = channel::unbounded::<(usize, String, Property)>();
    let (result_sender, result_receiver) = channel::unbounded();
    for (index, (name, property)) in properties.into_iter().enumerate() {
        // The receiver lives until the end of this function.
        let _ = job_sender.send((index, name, property));
    }
    drop(job_sender);

    let scoped = crossbeam::scope(|scope| {
        for _ in 0..workers {
            let jobs = job_receiver.clone();
            let results = result_sender.clone();
            scope.spawn(move |_| {
                for (index, name, property) in jobs.iter() {
                    let config = config.clone().with_name(name);
                    let outcome = catch_unwind(AssertUnwindSafe(|| {
                        check_with_config(&config, property)
                    }));
                    let report = outcome.unwrap_or_else(|payload| {
                        let error = PropertyError::from_panic(payload);
                        warn!(name = %config.name, %error, "check panicked");
                        Ok(crashed(&config, error))
                    });
                    let _ = results.send((index, report));
                }
            });
        }
    });
    drop(result_sender);
    if scoped.is_err() {
        warn!("a check worker panicked");
    }

    let mut slots: Vec<Option<Result<Report, ConfigError>>> = (0..total).map(|_| None).collect();
    for (index, report) in result_receiver.iter() {
        slots[index] = Some(report);
    }
    slots
        .into_iter()
        .zip(names)
        .map(|(slot, name)| {
            slot.unwrap_or_else(|| {
                let error = PropertyError::Panicked {
                    message: "check did not report".to_string(),
                };
                Ok(crashed(&config.clone().with_name(name), error))
            })
        })
        .collect()
}

/// The report for a check that panicked outside its property
fn crashed(config: &Config, error: PropertyError) -> Report {
    let counterexample = Counterexample {
        test_index: 0,
        size: config.start_size,
        arguments: Vec::new(),
        original_arguments: Vec::new(),
        shrinks: 0,
        reason: error.to_string(),
        error: Some(error),
        commands: None,
        labels: Vec::new(),
    };
    Report {
        name: config.name.clone(),
        seed: config.replay.unwrap_or_default(),
        tests: 0,
        discards: 0,
        labels: LabelStats::new(),
        status: Status::Errored(counterexample),
    }
}
