//! The check runner: trial loop, size schedule and shrink walk.

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::config::Config;
use crate::error::ConfigError;
use crate::property::{Testable, TrialContext};
use crate::report::{Counterexample, Report, Status};
use crate::result::{Outcome, ResultTree};
use crate::rng::Random;
use crate::statistics::LabelStats;

/// Check a property with the default configuration
pub fn check(property: impl Testable) -> Result<Report, ConfigError> {
    check_with_config(&Config::default(), property)
}

/// Check a property.
///
/// Runs trials until `max_tests` have passed, one fails, or `max_fail` have
/// been discarded. A failing trial is shrunk by walking its result tree:
/// the first child failing the same way is accepted, repeatedly, until none
/// does or `max_shrinks` steps have been taken.
///
/// The trial and shrink hooks are called whether or not a `tracing`
/// subscriber is listening; only their logged output depends on one.
///
/// The configuration is validated before anything runs. With the same
/// `replay` seed the whole run, shrinking included, is reproduced exactly.
pub fn check_with_config(config: &Config, property: impl Testable) -> Result<Report, ConfigError> {
    config.validate()?;
    let property = property.into_property();

    let master = config.replay.map(Random::from_seed).unwrap_or_else(Random::from_entropy);
    let seed = master.seed();
    let mut random = master;

    let mut passed = 0;
    let mut discards = 0;
    let mut trials = 0;
    let mut labels = LabelStats::new();

    debug!(name = %config.name, seed, "starting check");

    while passed < config.max_tests {
        let (trial_random, rest) = random.split();
        random = rest;
        let size = config.size_for(passed);
        let ctx = TrialContext {
            size,
            random: trial_random,
            arbitraries: Arc::clone(&config.arbitraries),
        };

        let tree = property.evaluate(&ctx);
        trials += 1;
        debug!(trial = trials, size, outcome = %tree.result().outcome, "trial finished");
        if let Some(hook) = &config.on_every_trial {
            let line = hook(trials, &tree.result().arguments);
            info!("{}", line);
        }

        match &tree.result().outcome {
            Outcome::Passed => {
                labels.record(&tree.result().labels);
                passed += 1;
            }
            Outcome::Discarded => {
                discards += 1;
                if discards >= config.max_fail {
                    warn!(
                        name = %config.name,
                        seed,
                        passed,
                        discards,
                        "gave up after too many discards"
                    );
                    return Ok(Report {
                        name: config.name.clone(),
                        seed,
                        tests: passed,
                        discards,
                        labels,
                        status: Status::Exhausted,
                    });
                }
            }
            Outcome::Falsified(_) | Outcome::Errored(_) => {
                let original_arguments = tree.result().arguments.clone();
                let (minimal, shrinks) = shrink(tree, config);
                let result = minimal.result();

                let counterexample = Counterexample {
                    test_index: trials - 1,
                    size,
                    arguments: result.arguments.clone(),
                    original_arguments,
                    shrinks,
                    reason: result.outcome.to_string(),
                    error: match &result.outcome {
                        Outcome::Errored(error) => Some(error.clone()),
                        _ => None,
                    },
                    commands: result.commands.clone(),
                    labels: result.labels.iter().cloned().collect(),
                };
                let status = if counterexample.error.is_some() {
                    warn!(name = %config.name, seed, shrinks, "property errored");
                    Status::Errored(counterexample)
                } else {
                    info!(name = %config.name, seed, shrinks, "property falsified");
                    Status::Falsified(counterexample)
                };
                return Ok(Report {
                    name: config.name.clone(),
                    seed,
                    tests: passed,
                    discards,
                    labels,
                    status,
                });
            }
        }
    }

    info!(name = %config.name, tests = passed, discards, "property passed");
    Ok(Report {
        name: config.name.clone(),
        seed,
        tests: passed,
        discards,
        labels,
        status: Status::Passed,
    })
}

/// Walk down the tree to a local minimum; returns it with the step count.
///
/// Only children that fail the same way as the root are accepted, so a
/// falsification never turns into a fault while shrinking, or back.
fn shrink(tree: ResultTree, config: &Config) -> (ResultTree, usize) {
    let root = tree.result().outcome.clone();
    let mut current = tree;
    let mut shrinks = 0;

    while shrinks < config.max_shrinks {
        let Some(child) = current
            .children()
            .find(|child| child.result().outcome.same_failure_kind(&root))
        else {
            break;
        };
        shrinks += 1;
        debug!(step = shrinks, arguments = ?child.result().arguments, "accepted shrink");
        if let Some(hook) = &config.on_every_shrink {
            let line = hook(&child.result().arguments);
            info!("{}", line);
        }
        current = child;
    }

    if shrinks == config.max_shrinks {
        debug!(max_shrinks = config.max_shrinks, "shrink budget spent");
    }
    (current, shrinks)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arbitrary::{Arbitrary, DefaultArbitrary};
    use crate::error::PropertyError;
    use crate::generator::constant;
    use crate::property::{for_all, for_any, implies};
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_passing_property() {
        let config = Config::new().with_replay(1).with_name("addition commutes");
        let report = check_with_config(
            &config,
            for_all(<(i32, i32)>::arbitrary(), |(a, b)| a.wrapping_add(b) == b.wrapping_add(a)),
        )
        .unwrap();

        assert!(report.is_passed());
        assert_eq!(report.tests, 100);
        assert_eq!(report.seed, 1);
        assert_eq!(report.name, "addition commutes");
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = Config::new().with_max_tests(0);
        assert_eq!(
            check_with_config(&config, true).unwrap_err(),
            ConfigError::InvalidMaxTests(0)
        );
    }

    #[test]
    fn test_falsified_and_shrunk() {
        let config = Config::new().with_replay(5);
        let report = check_with_config(&config, for_all(u32::arbitrary(), |x| x < 30)).unwrap();

        let Status::Falsified(counterexample) = &report.status else {
            panic!("expected falsification, got {:?}", report.status);
        };
        assert_eq!(counterexample.arguments, vec!["30"]);
        assert!(counterexample.error.is_none());
    }

    #[test]
    fn test_errored_is_not_falsified() {
        let config = Config::new().with_replay(3);
        let property = for_all(Arbitrary::from_generator(constant(0u8)), |_| -> bool {
            panic!("broken invariant")
        });
        let report = check_with_config(&config, property).unwrap();

        let Status::Errored(counterexample) = &report.status else {
            panic!("expected an error, got {:?}", report.status);
        };
        assert_eq!(
            counterexample.error,
            Some(PropertyError::Panicked {
                message: "broken invariant".to_string()
            })
        );
    }

    #[test]
    fn test_exhausted_after_max_fail_discards() {
        let config = Config::new().with_replay(9).with_max_fail(50);
        let property = for_all(u32::arbitrary(), |x| implies(x > 1_000_000, true));
        let report = check_with_config(&config, property).unwrap();

        assert_eq!(report.status, Status::Exhausted);
        assert_eq!(report.discards, 50);
        assert_eq!(report.tests, 0);
    }

    #[test]
    fn test_max_shrinks_bounds_the_walk() {
        let config = Config::new().with_replay(11).with_max_shrinks(1).with_sizes(1000, 1000);
        let report = check_with_config(&config, for_all(u64::arbitrary(), |x| x < 3)).unwrap();

        let counterexample = report.counterexample().unwrap();
        assert!(counterexample.shrinks <= 1);
    }

    #[test]
    fn test_hooks_are_called() {
        let trials = Arc::new(AtomicUsize::new(0));
        let seen = Arc::clone(&trials);
        let config = Config::new()
            .with_replay(2)
            .with_max_tests(10)
            .with_on_every_trial(move |trial, _| {
                seen.fetch_add(1, Ordering::SeqCst);
                format!("trial {}", trial)
            });

        let report = check_with_config(&config, true).unwrap();
        assert!(report.is_passed());
        assert_eq!(trials.load(Ordering::SeqCst), 10);
    }

    #[test]
    fn test_overlay_arbitraries_reach_for_any() {
        let config = Config::new()
            .with_replay(4)
            .with_arbitrary(Arbitrary::from_generator(constant('z')));
        let report = check_with_config(&config, for_any(|c: char| c == 'z')).unwrap();
        assert!(report.is_passed());
    }

    #[test]
    fn test_replay_is_deterministic() {
        let run = || {
            let config = Config::new().with_replay(77);
            let property = for_all(Vec::<i16>::arbitrary(), |v| v.iter().all(|x| *x < 40));
            check_with_config(&config, property).unwrap()
        };
        assert_eq!(run(), run());
    }

    #[test]
    fn test_labels_collected_on_pass() {
        let config = Config::new().with_replay(6);
        let property = for_all(u8::arbitrary(), |x| {
            true.into_property().classify(x % 2 == 0, "even")
        });
        let report = check_with_config(&config, property).unwrap();

        assert!(report.is_passed());
        assert_eq!(report.labels.trials(), 100);
        assert!(report.labels.count(&["even"]) > 0);
    }
}
