//! Example: checking a bounded stack against a plain Vec model
//!
//! The stack silently drops its oldest item once it holds `CAPACITY` items.
//! The model has no such limit, so pushing past capacity and popping back
//! down exposes the difference.

use falsify::{BoxedGenerator, Config, GeneratorExt, choose, one_of};
use falsify_stateful::prelude::*;
use std::sync::Arc;

const CAPACITY: usize = 4;

/// A fixed-capacity stack that evicts from the bottom when full
#[derive(Debug, Clone, Default)]
struct BoundedStack {
    items: Vec<i32>,
}

impl BoundedStack {
    fn push(&mut self, item: i32) {
        if self.items.len() == CAPACITY {
            self.items.remove(0);
        }
        self.items.push(item);
    }

    fn pop(&mut self) -> Option<i32> {
        self.items.pop()
    }

    fn len(&self) -> usize {
        self.items.len()
    }
}

/// The stack with the value the last command returned
type Observed = (BoundedStack, Option<i32>);
type StackCommand = BoxedCommand<Observed, Vec<i32>>;

struct Push(i32);
struct Pop;
struct Len;

// The actual side carries the last observed return value next to the stack
impl Command<Observed, Vec<i32>> for Push {
    fn name(&self) -> String {
        format!("Push({})", self.0)
    }

    fn run_actual(&self, (mut stack, _): Observed) -> Observed {
        stack.push(self.0);
        (stack, None)
    }

    fn run_model(&self, mut model: Vec<i32>) -> Vec<i32> {
        model.push(self.0);
        model
    }

    fn postcondition(&self, _actual: &Observed, _model: &Vec<i32>) -> bool {
        true
    }
}

impl Command<Observed, Vec<i32>> for Pop {
    fn name(&self) -> String {
        "Pop".to_string()
    }

    fn precondition(&self, model: &Vec<i32>) -> bool {
        !model.is_empty()
    }

    fn run_actual(&self, (mut stack, _): Observed) -> Observed {
        let popped = stack.pop();
        (stack, popped)
    }

    fn run_model(&self, mut model: Vec<i32>) -> Vec<i32> {
        model.pop();
        model
    }

    fn postcondition(&self, (stack, popped): &Observed, model: &Vec<i32>) -> bool {
        // The model had an item, so the stack must too
        popped.is_some() && stack.items.len() == model.len()
    }
}

impl Command<Observed, Vec<i32>> for Len {
    fn name(&self) -> String {
        "Len".to_string()
    }

    fn run_actual(&self, actual: Observed) -> Observed {
        let len = actual.0.len() as i32;
        (actual.0, Some(len))
    }

    fn run_model(&self, model: Vec<i32>) -> Vec<i32> {
        model
    }

    fn postcondition(&self, (_, len): &Observed, model: &Vec<i32>) -> bool {
        *len == Some(model.len() as i32)
    }
}

struct StackSpec;

impl Specification for StackSpec {
    type Actual = Observed;
    type Model = Vec<i32>;

    fn initial(&self) -> (Self::Actual, Vec<i32>) {
        ((BoundedStack::default(), None), Vec::new())
    }

    fn next(&self, _model: &Vec<i32>) -> BoxedGenerator<StackCommand> {
        let push = choose(0, 9).map(|value| Arc::new(Push(value)) as StackCommand);
        let pop: StackCommand = Arc::new(Pop);
        let len: StackCommand = Arc::new(Len);
        one_of(vec![
            push.boxed(),
            command_pool(vec![pop]),
            command_pool(vec![len]),
        ])
        .boxed()
    }
}

fn main() {
    println!("=== Bounded stack vs unbounded model ===\n");

    let config = Config::new().with_name("bounded stack").with_replay(2024);
    match check_commands(&config, StackSpec) {
        Ok(report) => {
            println!("{}", report);
            if let Some(counterexample) = report.counterexample() {
                println!(
                    "original sequence: {}",
                    counterexample.original_arguments.join(" ")
                );
                println!("minimal sequence:  {}", counterexample.arguments.join(" "));
            }
        }
        Err(error) => eprintln!("invalid configuration: {}", error),
    }
}
