//! Core generator infrastructure and composition combinators.
//!
//! A generator is a pure function of `(size, random state)`. Combinators build
//! new generators out of existing ones without mutating anything, so a single
//! generator value can be shared by every trial of every check.

use std::fmt::Debug;
use std::marker::PhantomData;
use std::sync::Arc;

use rand::distributions::uniform::SampleUniform;
use rand::{Rng, RngCore};

use crate::error::{ConfigError, GenerationError};
use crate::rng::Random;

/// Default retry ceiling for [`such_that`]
pub const DEFAULT_SUCH_THAT_TRIES: usize = 100;

/// Core generator trait for creating random test data
pub trait Generator<T> {
    /// Generate a value at the given size, drawing randomness from `rng`
    fn generate(&self, size: usize, rng: &mut dyn RngCore) -> Result<T, GenerationError>;
}

/// A cloneable, type-erased generator
pub struct BoxedGenerator<T> {
    inner: Arc<dyn Generator<T> + Send + Sync>,
}

impl<T> BoxedGenerator<T> {
    /// Erase the type of a generator
    pub fn new<G: Generator<T> + Send + Sync + 'static>(generator: G) -> Self {
        Self {
            inner: Arc::new(generator),
        }
    }
}

impl<T> Clone for BoxedGenerator<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T> Generator<T> for BoxedGenerator<T> {
    fn generate(&self, size: usize, rng: &mut dyn RngCore) -> Result<T, GenerationError> {
        self.inner.generate(size, rng)
    }
}

impl<T> Debug for BoxedGenerator<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("BoxedGenerator")
    }
}

/// Composition methods available on every generator
pub trait GeneratorExt<T>: Generator<T> + Sized + Send + Sync + 'static {
    /// Transform every generated value
    fn map<U, F>(self, f: F) -> Map<Self, F, T>
    where
        F: Fn(T) -> U + Send + Sync + 'static,
    {
        Map {
            generator: self,
            mapper: f,
            _phantom: PhantomData,
        }
    }

    /// Feed every generated value into a function choosing the next generator
    fn bind<U, F>(self, f: F) -> Bind<Self, F, T>
    where
        F: Fn(T) -> BoxedGenerator<U> + Send + Sync + 'static,
    {
        Bind {
            generator: self,
            binder: f,
            _phantom: PhantomData,
        }
    }

    /// Keep drawing until `predicate` holds, see [`such_that`]
    fn such_that<P>(self, predicate: P) -> SuchThat<Self, P>
    where
        P: Fn(&T) -> bool + Send + Sync + 'static,
    {
        such_that(self, predicate)
    }

    /// Ignore the propagated size and use `size` instead
    fn resize(self, size: usize) -> Resize<Self> {
        resize(size, self)
    }

    /// Erase the type of this generator
    fn boxed(self) -> BoxedGenerator<T> {
        BoxedGenerator::new(self)
    }

    /// Draw a single value from a random state
    fn sample(&self, size: usize, random: Random) -> Result<T, GenerationError> {
        self.generate(size, &mut random.rng())
    }

    /// Draw `count` values from one RNG stream
    fn sample_many(
        &self,
        count: usize,
        size: usize,
        random: Random,
    ) -> Result<Vec<T>, GenerationError> {
        let mut rng = random.rng();
        (0..count).map(|_| self.generate(size, &mut rng)).collect()
    }
}

impl<T, G> GeneratorExt<T> for G where G: Generator<T> + Sized + Send + Sync + 'static {}

/// Always produces the same value
#[derive(Debug, Clone)]
pub struct Constant<T> {
    value: T,
}

impl<T: Clone> Generator<T> for Constant<T> {
    fn generate(&self, _size: usize, _rng: &mut dyn RngCore) -> Result<T, GenerationError> {
        Ok(self.value.clone())
    }
}

/// Picks uniformly from a fixed list of values
#[derive(Debug, Clone)]
pub struct Elements<T> {
    values: Vec<T>,
}

impl<T: Clone> Generator<T> for Elements<T> {
    fn generate(&self, _size: usize, rng: &mut dyn RngCore) -> Result<T, GenerationError> {
        if self.values.is_empty() {
            return Err(GenerationError::NoElements);
        }
        let index = rng.gen_range(0..self.values.len());
        Ok(self.values[index].clone())
    }
}

/// Uniform value in an inclusive range
#[derive(Debug, Clone)]
pub struct Choose<T> {
    low: T,
    high: T,
}

impl<T> Generator<T> for Choose<T>
where
    T: SampleUniform + PartialOrd + Copy + Debug,
{
    fn generate(&self, _size: usize, rng: &mut dyn RngCore) -> Result<T, GenerationError> {
        if self.low > self.high {
            return Err(GenerationError::EmptyRange {
                low: format!("{:?}", self.low),
                high: format!("{:?}", self.high),
            });
        }
        Ok(rng.gen_range(self.low..=self.high))
    }
}

/// Picks a generator uniformly, then draws from it
#[derive(Debug, Clone)]
pub struct OneOf<T> {
    generators: Vec<BoxedGenerator<T>>,
}

impl<T> Generator<T> for OneOf<T> {
    fn generate(&self, size: usize, rng: &mut dyn RngCore) -> Result<T, GenerationError> {
        if self.generators.is_empty() {
            return Err(GenerationError::NoGenerators);
        }
        let index = rng.gen_range(0..self.generators.len());
        self.generators[index].generate(size, rng)
    }
}

/// Picks a generator with probability proportional to its weight
#[derive(Debug, Clone)]
pub struct Frequency<T> {
    weighted: Vec<(u32, BoxedGenerator<T>)>,
    total_weight: u64,
}

impl<T> Generator<T> for Frequency<T> {
    fn generate(&self, size: usize, rng: &mut dyn RngCore) -> Result<T, GenerationError> {
        if self.total_weight == 0 {
            return Err(GenerationError::NonPositiveWeight);
        }

        let mut roll = rng.gen_range(0..self.total_weight);
        for (weight, generator) in &self.weighted {
            let weight = u64::from(*weight);
            if roll < weight {
                return generator.generate(size, rng);
            }
            roll -= weight;
        }

        Err(GenerationError::NonPositiveWeight)
    }
}

/// Hands the current size to a generator-building function
pub struct SizedGenerator<F> {
    builder: F,
}

impl<T, F> Generator<T> for SizedGenerator<F>
where
    F: Fn(usize) -> BoxedGenerator<T>,
{
    fn generate(&self, size: usize, rng: &mut dyn RngCore) -> Result<T, GenerationError> {
        (self.builder)(size).generate(size, rng)
    }
}

/// Overrides the size seen by a subtree
#[derive(Debug, Clone)]
pub struct Resize<G> {
    size: usize,
    generator: G,
}

impl<T, G: Generator<T>> Generator<T> for Resize<G> {
    fn generate(&self, _size: usize, rng: &mut dyn RngCore) -> Result<T, GenerationError> {
        self.generator.generate(self.size, rng)
    }
}

/// A generator whose values are transformed by a function
pub struct Map<G, F, T> {
    generator: G,
    mapper: F,
    _phantom: PhantomData<fn() -> T>,
}

impl<T, U, G, F> Generator<U> for Map<G, F, T>
where
    G: Generator<T>,
    F: Fn(T) -> U,
{
    fn generate(&self, size: usize, rng: &mut dyn RngCore) -> Result<U, GenerationError> {
        self.generator.generate(size, rng).map(&self.mapper)
    }
}

/// A generator whose values select the next generator
pub struct Bind<G, F, T> {
    generator: G,
    binder: F,
    _phantom: PhantomData<fn() -> T>,
}

impl<T, U, G, F> Generator<U> for Bind<G, F, T>
where
    G: Generator<T>,
    F: Fn(T) -> BoxedGenerator<U>,
{
    fn generate(&self, size: usize, rng: &mut dyn RngCore) -> Result<U, GenerationError> {
        let value = self.generator.generate(size, rng)?;
        (self.binder)(value).generate(size, rng)
    }
}

/// Retries a generator until a predicate holds
pub struct SuchThat<G, P> {
    generator: G,
    predicate: P,
    max_tries: usize,
}

impl<G, P> SuchThat<G, P> {
    /// Change the retry ceiling
    pub fn max_tries(mut self, max_tries: usize) -> Self {
        self.max_tries = max_tries;
        self
    }
}

impl<T, G, P> Generator<T> for SuchThat<G, P>
where
    G: Generator<T>,
    P: Fn(&T) -> bool,
{
    fn generate(&self, size: usize, rng: &mut dyn RngCore) -> Result<T, GenerationError> {
        for attempt in 0..self.max_tries {
            // widen the search a little on every rejection
            let value = self
                .generator
                .generate(size.saturating_add(attempt * 2), rng)?;
            if (self.predicate)(&value) {
                return Ok(value);
            }
        }
        Err(GenerationError::SuchThatExhausted {
            tries: self.max_tries,
        })
    }
}

/// Lists whose length is bounded by the size, or fixed
pub struct ListOf<G> {
    generator: G,
    length: ListLength,
}

#[derive(Debug, Clone, Copy)]
enum ListLength {
    UpToSize,
    NonEmpty,
    Exact(usize),
}

impl<T, G: Generator<T>> Generator<Vec<T>> for ListOf<G> {
    fn generate(&self, size: usize, rng: &mut dyn RngCore) -> Result<Vec<T>, GenerationError> {
        let length = match self.length {
            ListLength::UpToSize => rng.gen_range(0..=size),
            ListLength::NonEmpty => rng.gen_range(1..=size.max(1)),
            ListLength::Exact(length) => length,
        };
        (0..length)
            .map(|_| self.generator.generate(size, rng))
            .collect()
    }
}

/// Pairs drawn left then right
#[derive(Debug, Clone)]
pub struct Zip<A, B> {
    left: A,
    right: B,
}

impl<T, U, A, B> Generator<(T, U)> for Zip<A, B>
where
    A: Generator<T>,
    B: Generator<U>,
{
    fn generate(&self, size: usize, rng: &mut dyn RngCore) -> Result<(T, U), GenerationError> {
        let left = self.left.generate(size, rng)?;
        let right = self.right.generate(size, rng)?;
        Ok((left, right))
    }
}

/// Create a generator that always produces `value`
pub fn constant<T: Clone>(value: T) -> Constant<T> {
    Constant { value }
}

/// Create a generator that picks uniformly from `values`
pub fn elements<T: Clone>(values: Vec<T>) -> Elements<T> {
    Elements { values }
}

/// Create a generator for values in `low..=high`
pub fn choose<T>(low: T, high: T) -> Choose<T>
where
    T: SampleUniform + PartialOrd + Copy,
{
    Choose { low, high }
}

/// Create a generator that picks one of `generators` uniformly
pub fn one_of<T>(generators: Vec<BoxedGenerator<T>>) -> OneOf<T> {
    OneOf { generators }
}

/// Create a generator that picks by weight.
///
/// An empty list is rejected here with [`ConfigError::EmptyFrequency`]. A
/// non-empty list whose weights are all zero builds fine and fails each draw
/// with [`GenerationError::NonPositiveWeight`].
pub fn frequency<T>(
    weighted: Vec<(u32, BoxedGenerator<T>)>,
) -> Result<Frequency<T>, ConfigError> {
    if weighted.is_empty() {
        return Err(ConfigError::EmptyFrequency);
    }
    let total_weight = weighted.iter().map(|(weight, _)| u64::from(*weight)).sum();
    Ok(Frequency {
        weighted,
        total_weight,
    })
}

/// Create a generator from a function of the current size
pub fn sized<T, F>(builder: F) -> SizedGenerator<F>
where
    F: Fn(usize) -> BoxedGenerator<T>,
{
    SizedGenerator { builder }
}

/// Override the size for `generator`
pub fn resize<G>(size: usize, generator: G) -> Resize<G> {
    Resize { size, generator }
}

/// Retry `generator` until `predicate` holds.
///
/// Each rejection grows the size by two. After [`DEFAULT_SUCH_THAT_TRIES`]
/// rejections the draw fails with [`GenerationError::SuchThatExhausted`].
pub fn such_that<G, P>(generator: G, predicate: P) -> SuchThat<G, P> {
    SuchThat {
        generator,
        predicate,
        max_tries: DEFAULT_SUCH_THAT_TRIES,
    }
}

/// Lists of length `0..=size`
pub fn list_of<G>(generator: G) -> ListOf<G> {
    ListOf {
        generator,
        length: ListLength::UpToSize,
    }
}

/// Lists of length `1..=max(size, 1)`
pub fn non_empty_list_of<G>(generator: G) -> ListOf<G> {
    ListOf {
        generator,
        length: ListLength::NonEmpty,
    }
}

/// Lists of exactly `length` elements
pub fn vec_of_length<G>(length: usize, generator: G) -> ListOf<G> {
    ListOf {
        generator,
        length: ListLength::Exact(length),
    }
}

/// Pairs of values from two generators
pub fn zip<A, B>(left: A, right: B) -> Zip<A, B> {
    Zip { left, right }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn random() -> Random {
        Random::from_seed(7)
    }

    #[test]
    fn test_constant_generator() {
        let generator = constant(42);
        for value in generator.sample_many(10, 5, random()).unwrap() {
            assert_eq!(value, 42);
        }
    }

    #[test]
    fn test_elements_generator() {
        let values = vec![1, 2, 3, 4, 5];
        let generator = elements(values.clone());
        for value in generator.sample_many(50, 10, random()).unwrap() {
            assert!(values.contains(&value));
        }
    }

    #[test]
    fn test_elements_empty_fails() {
        let generator = elements::<i32>(vec![]);
        assert_eq!(
            generator.sample(10, random()),
            Err(GenerationError::NoElements)
        );
    }

    #[test]
    fn test_choose_generator() {
        let generator = choose(1, 10);
        for value in generator.sample_many(100, 10, random()).unwrap() {
            assert!((1..=10).contains(&value));
        }
    }

    #[test]
    fn test_choose_empty_range_fails() {
        let generator = choose(10, 1);
        assert!(matches!(
            generator.sample(10, random()),
            Err(GenerationError::EmptyRange { .. })
        ));
    }

    #[test]
    fn test_one_of_generator() {
        let generator = one_of(vec![constant(1).boxed(), constant(2).boxed()]);
        let values = generator.sample_many(100, 10, random()).unwrap();
        assert!(values.contains(&1));
        assert!(values.contains(&2));
    }

    #[test]
    fn test_one_of_empty_fails() {
        let generator = one_of::<i32>(vec![]);
        assert_eq!(
            generator.sample(10, random()),
            Err(GenerationError::NoGenerators)
        );
    }

    #[test]
    fn test_frequency_zero_weight_fails() {
        let generator = frequency(vec![(0, constant("a").boxed())]).unwrap();
        assert_eq!(
            generator.sample(10, random()),
            Err(GenerationError::NonPositiveWeight)
        );
    }

    #[test]
    fn test_frequency_rejects_empty_list() {
        assert_eq!(
            frequency::<&str>(vec![]).err(),
            Some(ConfigError::EmptyFrequency)
        );
    }

    #[test]
    fn test_frequency_skips_zero_weights() {
        let generator =
            frequency(vec![(0, constant("a").boxed()), (5, constant("b").boxed())]).unwrap();
        for value in generator.sample_many(100, 10, random()).unwrap() {
            assert_eq!(value, "b");
        }
    }

    #[test]
    fn test_sized_sees_current_size() {
        let generator = sized(|size| constant(size).boxed());
        assert_eq!(generator.sample(17, random()), Ok(17));
    }

    #[test]
    fn test_resize_overrides_size() {
        let generator = sized(|size| constant(size).boxed()).resize(3);
        assert_eq!(generator.sample(50, random()), Ok(3));
    }

    #[test]
    fn test_map_and_bind() {
        let generator = choose(1, 5).map(|x| x * 2);
        for value in generator.sample_many(50, 10, random()).unwrap() {
            assert!(value % 2 == 0 && (2..=10).contains(&value));
        }

        let generator = choose(1usize, 4).bind(|n| vec_of_length(n, constant('x')).boxed());
        for value in generator.sample_many(50, 10, random()).unwrap() {
            assert!((1..=4).contains(&value.len()));
        }
    }

    #[test]
    fn test_such_that_filters() {
        let generator = choose(1, 100).such_that(|x| x % 2 == 0);
        for value in generator.sample_many(50, 10, random()).unwrap() {
            assert_eq!(value % 2, 0);
        }
    }

    #[test]
    fn test_such_that_escalates_size() {
        // only sizes above the starting size can satisfy the predicate
        let generator = sized(|size| constant(size).boxed()).such_that(|size| *size >= 10);
        assert_eq!(generator.sample(4, random()), Ok(10));
    }

    #[test]
    fn test_such_that_ceiling() {
        let generator = constant(1).such_that(|x| *x > 1).max_tries(5);
        assert_eq!(
            generator.sample(10, random()),
            Err(GenerationError::SuchThatExhausted { tries: 5 })
        );
    }

    #[test]
    fn test_list_lengths() {
        let generator = list_of(constant(0));
        for value in generator.sample_many(50, 6, random()).unwrap() {
            assert!(value.len() <= 6);
        }

        let generator = non_empty_list_of(constant(0));
        for value in generator.sample_many(50, 0, random()).unwrap() {
            assert_eq!(value.len(), 1);
        }

        let generator = vec_of_length(4, constant(0));
        assert_eq!(generator.sample(100, random()), Ok(vec![0, 0, 0, 0]));
    }

    #[test]
    fn test_zip_draws_in_order() {
        let generator = zip(constant("left"), choose(1, 5));
        let (left, right) = generator.sample(10, random()).unwrap();
        assert_eq!(left, "left");
        assert!((1..=5).contains(&right));
    }

    #[test]
    fn test_generation_is_deterministic() {
        let generator = list_of(choose(-100, 100));
        assert_eq!(
            generator.sample(20, Random::from_seed(99)),
            generator.sample(20, Random::from_seed(99))
        );
    }
}
