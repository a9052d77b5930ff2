//! # Falsify Stateful
//!
//! Model-based testing for falsify: generate legal sequences of commands,
//! run each one against the real subject and an abstract model, fail on the
//! first divergence and shrink the sequence to a minimal reproduction.
//!
//! ## Features
//!
//! - **Commands**: values implementing [`Command`], with a precondition on the
//!   model, a transition for each side and a postcondition comparing them
//! - **Specifications**: the initial subject and model, plus the commands worth
//!   trying in each model state
//! - **Legal generation**: preconditions are enforced while sequences are drawn
//! - **Span shrinking**: failing sequences lose contiguous spans until no
//!   shorter legal sequence fails
//!
//! ## Quick Example
//!
//! ```rust
//! use falsify::{BoxedGenerator, Config, Status};
//! use falsify_stateful::prelude::*;
//! use std::sync::Arc;
//!
//! // A Vec checked against a model that only tracks its length
//! struct Push;
//! struct Pop;
//!
//! impl Command<Vec<u8>, usize> for Push {
//!     fn name(&self) -> String { "Push".to_string() }
//!     fn run_actual(&self, mut stack: Vec<u8>) -> Vec<u8> { stack.push(1); stack }
//!     fn run_model(&self, len: usize) -> usize { len + 1 }
//!     fn postcondition(&self, stack: &Vec<u8>, len: &usize) -> bool { stack.len() == *len }
//! }
//!
//! impl Command<Vec<u8>, usize> for Pop {
//!     fn name(&self) -> String { "Pop".to_string() }
//!     fn precondition(&self, len: &usize) -> bool { *len > 0 }
//!     fn run_actual(&self, mut stack: Vec<u8>) -> Vec<u8> { stack.pop(); stack }
//!     fn run_model(&self, len: usize) -> usize { len - 1 }
//!     fn postcondition(&self, stack: &Vec<u8>, len: &usize) -> bool { stack.len() == *len }
//! }
//!
//! struct StackSpec;
//!
//! impl Specification for StackSpec {
//!     type Actual = Vec<u8>;
//!     type Model = usize;
//!
//!     fn initial(&self) -> (Vec<u8>, usize) { (Vec::new(), 0) }
//!
//!     fn next(&self, _len: &usize) -> BoxedGenerator<BoxedCommand<Vec<u8>, usize>> {
//!         let push: BoxedCommand<Vec<u8>, usize> = Arc::new(Push);
//!         let pop: BoxedCommand<Vec<u8>, usize> = Arc::new(Pop);
//!         command_pool(vec![push, pop])
//!     }
//! }
//!
//! let report = check_commands(&Config::new().with_replay(1), StackSpec).unwrap();
//! assert_eq!(report.status, Status::Passed);
//! ```

pub mod model;
pub mod operations;

pub use model::{check_commands, commands_property, run_sequence, sequences};
pub use operations::generator::{command_pool, weighted_pool};
pub use operations::sequence::{DEFAULT_MAX_RETRIES, SequenceGenerator};
pub use operations::shrinking::SpanShrinker;
pub use operations::{BoxedCommand, Command, CommandSequence, Specification};

/// Re-exports for convenient imports
pub mod prelude {
    pub use crate::model::*;
    pub use crate::operations::generator::*;
    pub use crate::operations::sequence::SequenceGenerator;
    pub use crate::operations::shrinking::SpanShrinker;
    pub use crate::operations::*;
}
