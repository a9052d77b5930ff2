//! Command pools: the generators a [`Specification::next`] usually returns
//!
//! [`Specification::next`]: crate::operations::Specification::next

use falsify::{BoxedGenerator, GeneratorExt, elements, frequency};

use crate::operations::BoxedCommand;

/// Draw uniformly from a fixed set of commands
pub fn command_pool<Actual, Model>(
    commands: Vec<BoxedCommand<Actual, Model>>,
) -> BoxedGenerator<BoxedCommand<Actual, Model>>
where
    Actual: 'static,
    Model: 'static,
{
    elements(commands).boxed()
}

/// Draw commands with probability proportional to their weight
///
/// A command with weight 5 comes up five times as often as one with weight 1.
/// Like [`command_pool`], an empty pool fails when drawn from.
pub fn weighted_pool<Actual, Model>(
    weighted: Vec<(u32, BoxedCommand<Actual, Model>)>,
) -> BoxedGenerator<BoxedCommand<Actual, Model>>
where
    Actual: 'static,
    Model: 'static,
{
    let weighted = weighted
        .into_iter()
        .map(|(weight, command)| (weight, falsify::constant(command).boxed()))
        .collect();
    match frequency(weighted) {
        Ok(pool) => pool.boxed(),
        Err(_) => elements(Vec::new()).boxed(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::operations::tests::{dec, inc};
    use falsify::{GenerationError, Random};

    #[test]
    fn test_weighted_pool_respects_weights() {
        let pool = weighted_pool(vec![(5, inc()), (1, dec())]);
        let drawn = pool.sample_many(6000, 10, Random::from_seed(31)).unwrap();

        let incs = drawn.iter().filter(|command| command.name() == "Inc").count();
        let ratio = incs as f64 / (drawn.len() - incs) as f64;
        assert!(ratio > 4.0 && ratio < 6.0, "ratio was {}", ratio);
    }

    #[test]
    fn test_empty_pools_fail_at_draw_time() {
        let pool = command_pool::<u32, i64>(Vec::new());
        assert_eq!(
            pool.sample(5, Random::from_seed(1)).err(),
            Some(GenerationError::NoElements)
        );

        let pool = weighted_pool::<u32, i64>(vec![(0, inc())]);
        assert_eq!(
            pool.sample(5, Random::from_seed(1)).err(),
            Some(GenerationError::NonPositiveWeight)
        );

        let pool = weighted_pool::<u32, i64>(Vec::new());
        assert_eq!(
            pool.sample(5, Random::from_seed(1)).err(),
            Some(GenerationError::NoElements)
        );
    }
}
