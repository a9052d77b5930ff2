//! # Falsify - Randomized Property Checking for Rust
//!
//! Falsify checks that a property holds over many randomly generated inputs
//! and, when one fails, shrinks it to a locally minimal counterexample.
//!
//! Every evaluation produces a lazy result tree: the failing trial at the
//! root, and under it the results of the property re-run against each
//! simpler candidate. Shrinking is a walk down that tree that only pays for
//! the branches it visits.
//!
//! ## Quick Start
//!
//! ```rust
//! use falsify::{Config, DefaultArbitrary, check_with_config, for_all};
//!
//! let property = for_all(Vec::<i32>::arbitrary(), |v| {
//!     let mut twice = v.clone();
//!     twice.reverse();
//!     twice.reverse();
//!     twice == v
//! });
//!
//! let report = check_with_config(&Config::new().with_name("reverse twice"), property).unwrap();
//! assert!(report.is_passed());
//! ```
//!
//! ## Counterexamples
//!
//! ```rust
//! use falsify::{Config, DefaultArbitrary, Status, check_with_config, for_all};
//!
//! let property = for_all(u32::arbitrary(), |x| x < 50);
//! let report = check_with_config(&Config::new().with_replay(7), property).unwrap();
//!
//! if let Status::Falsified(counterexample) = &report.status {
//!     assert_eq!(counterexample.arguments, vec!["50"]);
//! }
//! ```
//!
//! ## Generators
//!
//! Generators are pure functions of a size and a random state, composed with
//! the functions in [`generator`] and the methods of [`GeneratorExt`]:
//!
//! ```rust
//! use falsify::{GeneratorExt, Random, choose, constant, frequency};
//!
//! let digits = choose(0u8, 9).map(|d| d * 2);
//! let mostly_zero = frequency(vec![(3, constant(0u8).boxed()), (1, digits.boxed())]).unwrap();
//! let sample = mostly_zero.sample(10, Random::from_seed(42)).unwrap();
//! assert!(sample <= 18 && sample % 2 == 0);
//! ```

pub mod arbitrary;
pub mod config;
pub mod error;
pub mod execution;
pub mod generator;
pub mod lazy;
pub mod parallel;
pub mod property;
pub mod report;
pub mod result;
pub mod rng;
pub mod shrink;
pub mod statistics;

// Re-export the main public API
pub use arbitrary::{
    Arbitrary, ArbitraryRegistry, DefaultArbitrary, global_registry, initialize_registry, resolve,
};
pub use config::{Config, ShrinkHook, TrialHook};
pub use error::{ConfigError, GenerationError, PropertyError};
pub use execution::{check, check_with_config};
pub use generator::{
    BoxedGenerator, Generator, GeneratorExt, choose, constant, elements, frequency, list_of,
    non_empty_list_of, one_of, resize, sized, such_that, vec_of_length, zip,
};
pub use lazy::LazySeq;
pub use parallel::{ParallelConfig, check_all, check_all_with};
pub use property::{Property, Testable, TrialContext, for_all, for_all_gen, for_any, implies};
pub use report::{Counterexample, Report, Status};
pub use result::{CommandTrace, Outcome, ResultTree, TrialResult};
pub use rng::Random;
pub use shrink::{BoxedShrinker, Shrinkable, ShrinkableShrinker, Shrinker, no_shrink};
pub use statistics::LabelStats;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_root_exports_compose() {
        let config = Config::new().with_replay(3).with_max_tests(20);
        let property = for_all(<(bool, u8)>::arbitrary(), |(flag, n)| {
            implies(flag, n as u16 + 1 > n as u16)
        });

        let report = check_with_config(&config, property).unwrap();
        assert!(report.is_passed());
        assert!(report.tests == 20);
    }

    #[test]
    fn test_error_display() {
        let error = PropertyError::from(GenerationError::NoElements);
        assert_eq!(
            error.to_string(),
            "generation failed: cannot pick from an empty list of elements"
        );
    }
}
