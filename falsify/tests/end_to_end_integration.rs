//! End-to-end tests for the check runner
//!
//! These drive whole checks through the public API: generation, evaluation,
//! shrinking and reporting together.

use falsify::{
    Arbitrary, Config, DefaultArbitrary, GeneratorExt, Outcome, PropertyError, Random,
    ShrinkableShrinker, Status, Testable, TrialContext, check_with_config, choose, constant,
    elements, for_all, for_all_gen, frequency, implies, list_of,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

fn is_sorted(v: &[i32]) -> bool {
    v.windows(2).all(|pair| pair[0] <= pair[1])
}

#[test]
fn test_same_seed_same_report() {
    let run = |seed| {
        let property = for_all(Vec::<i32>::arbitrary(), |v| is_sorted(&v));
        check_with_config(&Config::new().with_replay(seed), property).unwrap()
    };

    let first = run(1234);
    let second = run(1234);
    assert_eq!(first, second);
    assert!(matches!(first.status, Status::Falsified(_)));
}

#[test]
fn test_unsorted_counterexample_is_minimal() {
    let property = for_all(Vec::<i32>::arbitrary(), |v| is_sorted(&v));
    let report = check_with_config(&Config::new().with_replay(42), property).unwrap();

    let counterexample = report.counterexample().unwrap();
    let minimal = counterexample.arguments[0].as_str();
    // Two elements out of order, each as close to zero as the order allows
    assert!(minimal == "[1, 0]" || minimal == "[0, -1]", "{}", minimal);
    assert_ne!(counterexample.original_arguments, counterexample.arguments);
}

#[test]
fn test_shrunk_lists_never_grow() {
    let property = for_all(Vec::<u8>::arbitrary(), |v| v.iter().all(|x| *x < 30));

    let mut checked = 0;
    for seed in 0..40 {
        let ctx = TrialContext::new(100, Random::from_seed(seed));
        let mut current = property.evaluate(&ctx);
        if !current.is_failure() {
            continue;
        }
        checked += 1;

        let mut steps = 0;
        while let Some(child) = current.children().find(|child| child.is_failure()) {
            let parent_len = current.result().arguments[0].matches(',').count();
            let child_len = child.result().arguments[0].matches(',').count();
            assert!(child_len <= parent_len);
            steps += 1;
            assert!(steps < 500, "shrinking did not terminate");
            current = child;
        }
        assert_eq!(current.result().arguments, vec!["[30]"]);
    }
    assert!(checked > 0);
}

#[test]
fn test_frequency_weights_three_to_one() {
    let generator =
        frequency(vec![(3, constant('a').boxed()), (1, constant('b').boxed())]).unwrap();
    let samples = generator.sample_many(10_000, 10, Random::from_seed(2)).unwrap();

    let a = samples.iter().filter(|c| **c == 'a').count() as f64;
    let share = a / samples.len() as f64;
    assert!((share - 0.75).abs() < 0.02, "share of 'a' was {}", share);
}

#[test]
fn test_discards_exhaust_the_check() {
    let config = Config::new().with_replay(19);
    let property = for_all(u32::arbitrary(), |x| implies(x > 1_000_000, true));
    let report = check_with_config(&config, property).unwrap();

    assert_eq!(report.status, Status::Exhausted);
    assert_eq!(report.discards, 1000);
    assert_eq!(report.tests, 0);
    assert!(report.to_string().contains("gave up"));
}

#[test]
fn test_conjunction_reports_failing_side_only() {
    let left = for_all(u8::arbitrary(), |x| x < 5).label("left");
    let right = for_all(u8::arbitrary(), |_| true).label("right");

    let config = Config::new().with_replay(30).with_sizes(50, 100);
    let report = check_with_config(&config, left.and(right)).unwrap();

    let counterexample = report.counterexample().unwrap();
    assert_eq!(counterexample.arguments, vec!["5"]);
    assert_eq!(counterexample.labels, vec!["left"]);
}

#[test]
fn test_conjunction_second_failure_when_first_holds() {
    let config = Config::new().with_replay(31).with_sizes(50, 100);
    let property = true.into_property().and(for_all(u16::arbitrary(), |x| x < 7));
    let report = check_with_config(&config, property).unwrap();
    assert_eq!(report.counterexample().unwrap().arguments, vec!["7"]);
}

#[test]
fn test_errored_and_falsified_are_distinct() {
    let config = Config::new().with_replay(5);

    let falsified = check_with_config(&config, for_all(u8::arbitrary(), |x| x < 3)).unwrap();
    assert!(matches!(falsified.status, Status::Falsified(_)));

    let errored = check_with_config(
        &config,
        for_all(u8::arbitrary(), |x| {
            let divisor = x.saturating_sub(x);
            (100 / divisor) > 0
        }),
    )
    .unwrap();
    let Status::Errored(counterexample) = &errored.status else {
        panic!("expected an error, got {:?}", errored.status);
    };
    assert!(matches!(counterexample.error, Some(PropertyError::Panicked { .. })));
    // Every input panics, so shrinking reaches the simplest one
    assert_eq!(counterexample.arguments, vec!["0"]);
    assert!(errored.to_string().contains("errored"));
}

#[test]
fn test_falsification_is_not_shrunk_into_a_panic() {
    let config = Config::new().with_replay(5).with_sizes(1000, 1000);
    let property = for_all(u32::arbitrary(), |x| {
        if x == 0 {
            panic!("zero is not allowed");
        }
        x < 10
    });
    let report = check_with_config(&config, property).unwrap();

    // Zero is the first candidate for every value and panics; it is skipped
    let Status::Falsified(counterexample) = &report.status else {
        panic!("expected falsification, got {:?}", report.status);
    };
    assert_eq!(counterexample.arguments, vec!["10"]);
    assert!(counterexample.error.is_none());
}

#[test]
fn test_hooks_run_without_a_subscriber() {
    let trials = Arc::new(AtomicUsize::new(0));
    let shrunk = Arc::new(Mutex::new(Vec::new()));
    let (trial_count, shrink_log) = (Arc::clone(&trials), Arc::clone(&shrunk));

    let config = Config::new()
        .with_replay(5)
        .with_sizes(1000, 1000)
        .with_on_every_trial(move |index, _| {
            trial_count.fetch_add(1, Ordering::SeqCst);
            format!("trial {}", index)
        })
        .with_on_every_shrink(move |arguments| {
            shrink_log.lock().unwrap().push(arguments.to_vec());
            String::new()
        });
    let report = check_with_config(&config, for_all(u32::arbitrary(), |x| x < 30)).unwrap();

    let counterexample = report.counterexample().unwrap();
    assert_eq!(trials.load(Ordering::SeqCst), counterexample.test_index + 1);
    let shrunk = shrunk.lock().unwrap();
    assert_eq!(shrunk.len(), counterexample.shrinks);
    assert_eq!(shrunk.last(), Some(&vec!["30".to_string()]));
}

#[test]
fn test_failing_trial_index_counts_discards() {
    let config = Config::new().with_replay(5);
    let property = for_all(u32::arbitrary(), |x| implies(x % 2 == 0, x < 40));
    let report = check_with_config(&config, property).unwrap();

    let counterexample = report.counterexample().unwrap();
    assert!(report.discards > 0);
    assert_eq!(counterexample.test_index, report.tests + report.discards);
}

#[test]
fn test_generation_errors_are_reported() {
    let config = Config::new().with_replay(1);
    let property = for_all_gen(elements::<u8>(Vec::new()), |_| true);
    let report = check_with_config(&config, property).unwrap();

    let Status::Errored(counterexample) = &report.status else {
        panic!("expected an error, got {:?}", report.status);
    };
    assert!(counterexample.arguments.is_empty());
    assert!(matches!(counterexample.error, Some(PropertyError::Generation(_))));
}

#[test]
fn test_multi_argument_quantifiers_settle_on_the_boundary() {
    let operand = Arbitrary::new(choose(0u32, 1000), ShrinkableShrinker);
    let inner = operand.clone();
    let config = Config::new().with_replay(8);
    let property = for_all(operand, move |a| for_all(inner.clone(), move |b| a + b < 500));

    let report = check_with_config(&config, property).unwrap();
    let counterexample = report.counterexample().unwrap();
    assert_eq!(counterexample.arguments.len(), 2);

    let a: u32 = counterexample.arguments[0].parse().unwrap();
    let b: u32 = counterexample.arguments[1].parse().unwrap();
    assert_eq!(a + b, 500);
}

#[test]
fn test_list_lengths_follow_the_size() {
    let lists = Arbitrary::from_generator(list_of(choose(0u8, 1)));
    let config = Config::new().with_replay(12).with_max_tests(50).with_sizes(1, 40);
    let property = for_all(lists, |v| v.len() <= 40);
    let report = check_with_config(&config, property).unwrap();
    assert!(report.is_passed());
}

#[test]
fn test_passing_report_shows_label_distribution() {
    let config = Config::new().with_replay(77).with_name("classified");
    let property = for_all(u8::arbitrary(), |x| {
        true.into_property()
            .classify(x < 10, "small")
            .classify(x >= 10, "large")
    });
    let report = check_with_config(&config, property).unwrap();

    assert!(report.is_passed());
    let rendered = report.to_string();
    assert!(rendered.starts_with("+++ classified: OK, passed 100 tests."));
    assert!(rendered.contains("% small"));
    assert!(rendered.contains("% large"));
    assert_eq!(
        report.labels.count(&["small"]) + report.labels.count(&["large"]),
        100
    );
}

#[test]
fn test_trial_outcomes_are_exposed() {
    let tree = implies(false, true).evaluate(&TrialContext::new(1, Random::from_seed(0)));
    assert_eq!(tree.result().outcome, Outcome::Discarded);
}
