//! Example: a counter that cannot go below zero, checked against a model
//! that can.
//!
//! The minimal failing sequence is a single `Dec` on a fresh counter.

use falsify::{BoxedGenerator, Config, Status};
use falsify_stateful::prelude::*;
use std::sync::Arc;

/// The subject: an unsigned counter with a saturating decrement
#[derive(Debug, Default)]
struct Counter {
    value: u32,
}

struct Inc;
struct Dec;

impl Command<Counter, i64> for Inc {
    fn name(&self) -> String {
        "Inc".to_string()
    }

    fn run_actual(&self, counter: Counter) -> Counter {
        Counter {
            value: counter.value + 1,
        }
    }

    fn run_model(&self, model: i64) -> i64 {
        model + 1
    }

    fn postcondition(&self, counter: &Counter, model: &i64) -> bool {
        i64::from(counter.value) == *model
    }
}

impl Command<Counter, i64> for Dec {
    fn name(&self) -> String {
        "Dec".to_string()
    }

    fn run_actual(&self, counter: Counter) -> Counter {
        Counter {
            value: counter.value.saturating_sub(1),
        }
    }

    fn run_model(&self, model: i64) -> i64 {
        model - 1
    }

    fn postcondition(&self, counter: &Counter, model: &i64) -> bool {
        i64::from(counter.value) == *model
    }
}

struct CounterSpec;

impl Specification for CounterSpec {
    type Actual = Counter;
    type Model = i64;

    fn initial(&self) -> (Counter, i64) {
        (Counter::default(), 0)
    }

    fn next(&self, _model: &i64) -> BoxedGenerator<BoxedCommand<Counter, i64>> {
        let inc: BoxedCommand<Counter, i64> = Arc::new(Inc);
        let dec: BoxedCommand<Counter, i64> = Arc::new(Dec);
        weighted_pool(vec![(3, inc), (1, dec)])
    }
}

fn main() {
    println!("=== Saturating counter vs integer model ===\n");

    let config = Config::new()
        .with_name("counter")
        .with_on_every_shrink(|arguments| format!("shrunk to {}", arguments.join(" ")));

    let report = match check_commands(&config, CounterSpec) {
        Ok(report) => report,
        Err(error) => {
            eprintln!("invalid configuration: {}", error);
            return;
        }
    };

    println!("{}", report);
    match &report.status {
        Status::Falsified(counterexample) => {
            println!("replay with Config::with_replay({})", report.seed);
            if let Some(trace) = &counterexample.commands {
                let steps = trace.commands.len();
                println!("{} command(s), failed at step {}", steps, trace.failed_step);
            }
        }
        other => println!("unexpected status: {:?}", other),
    }
}
