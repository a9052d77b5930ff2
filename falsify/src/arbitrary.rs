//! Arbitraries: registered (generator, shrinker) pairs per type.
//!
//! Lookups never fall back to a silent default. A type is only available to
//! [`crate::property::for_any`] once its arbitrary has been registered, either
//! in the per-check overlay carried by [`crate::config::Config`] or in the
//! process-wide registry populated once through [`initialize_registry`].

use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::sync::{Arc, OnceLock};

use rand::Rng;

use crate::error::{ConfigError, PropertyError};
use crate::generator::{
    BoxedGenerator, Generator, GeneratorExt, choose, constant, list_of, sized, zip,
};
use crate::shrink::{BoxedShrinker, Shrinkable, ShrinkableShrinker, Shrinker, no_shrink};

/// A generator paired with the shrinker for its values
pub struct Arbitrary<T> {
    generator: BoxedGenerator<T>,
    shrinker: BoxedShrinker<T>,
}

impl<T> Clone for Arbitrary<T> {
    fn clone(&self) -> Self {
        Self {
            generator: self.generator.clone(),
            shrinker: self.shrinker.clone(),
        }
    }
}

impl<T: 'static> Arbitrary<T> {
    /// Pair a generator with a shrinker
    pub fn new<G, S>(generator: G, shrinker: S) -> Self
    where
        G: Generator<T> + Send + Sync + 'static,
        S: Shrinker<T> + Send + Sync + 'static,
    {
        Self {
            generator: BoxedGenerator::new(generator),
            shrinker: BoxedShrinker::new(shrinker),
        }
    }

    /// An arbitrary whose values are never shrunk
    pub fn from_generator<G>(generator: G) -> Self
    where
        G: Generator<T> + Send + Sync + 'static,
    {
        Self::new(generator, no_shrink())
    }

    /// The generator half
    pub fn generator(&self) -> &BoxedGenerator<T> {
        &self.generator
    }

    /// The shrinker half
    pub fn shrinker(&self) -> &BoxedShrinker<T> {
        &self.shrinker
    }

    /// Map to another type through a bijection.
    ///
    /// Values of `U` shrink by converting back with `from`, shrinking the
    /// original, and converting each candidate forward with `to`.
    pub fn convert<U, To, From>(self, to: To, from: From) -> Arbitrary<U>
    where
        U: 'static,
        To: Fn(T) -> U + Send + Sync + 'static,
        From: Fn(&U) -> T + Send + Sync + 'static,
    {
        let to = Arc::new(to);
        let generator = {
            let to = Arc::clone(&to);
            self.generator.map(move |value| to(value))
        };
        let shrinker = self.shrinker;
        let shrink = move |value: &U| -> Box<dyn Iterator<Item = U>> {
            let to = Arc::clone(&to);
            Box::new(shrinker.shrink(&from(value)).map(move |value| to(value)))
        };
        Arbitrary::new(generator, shrink)
    }

    /// Restrict to values satisfying `predicate`, for generation and shrinking alike
    pub fn filter<P>(self, predicate: P) -> Arbitrary<T>
    where
        P: Fn(&T) -> bool + Send + Sync + 'static,
    {
        let predicate = Arc::new(predicate);
        let generator = {
            let predicate = Arc::clone(&predicate);
            self.generator.such_that(move |value| predicate(value))
        };
        let shrinker = self.shrinker;
        let shrink = move |value: &T| -> Box<dyn Iterator<Item = T>> {
            let predicate = Arc::clone(&predicate);
            Box::new(
                shrinker
                    .shrink(value)
                    .filter(move |candidate| predicate(candidate)),
            )
        };
        Arbitrary::new(generator, shrink)
    }
}

impl<T> std::fmt::Debug for Arbitrary<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Arbitrary")
            .field("type", &std::any::type_name::<T>())
            .finish()
    }
}

/// Types with a built-in arbitrary
pub trait DefaultArbitrary: Sized + 'static {
    /// The built-in arbitrary for this type
    fn arbitrary() -> Arbitrary<Self>;
}

macro_rules! impl_default_arbitrary_signed {
    ($($t:ty),*) => {
        $(
            impl DefaultArbitrary for $t {
                fn arbitrary() -> Arbitrary<Self> {
                    let generator = sized(|size| {
                        let bound = <$t>::try_from(size).unwrap_or(<$t>::MAX);
                        choose(-bound, bound).boxed()
                    });
                    Arbitrary::new(generator, ShrinkableShrinker)
                }
            }
        )*
    };
}

macro_rules! impl_default_arbitrary_unsigned {
    ($($t:ty),*) => {
        $(
            impl DefaultArbitrary for $t {
                fn arbitrary() -> Arbitrary<Self> {
                    let generator = sized(|size| {
                        let bound = <$t>::try_from(size).unwrap_or(<$t>::MAX);
                        choose(0, bound).boxed()
                    });
                    Arbitrary::new(generator, ShrinkableShrinker)
                }
            }
        )*
    };
}

impl_default_arbitrary_signed!(i8, i16, i32, i64, isize);
impl_default_arbitrary_unsigned!(u8, u16, u32, u64, usize);

impl DefaultArbitrary for bool {
    fn arbitrary() -> Arbitrary<Self> {
        Arbitrary::new(
            crate::generator::elements(vec![false, true]),
            ShrinkableShrinker,
        )
    }
}

/// Printable ASCII characters
struct AsciiChar;

impl Generator<char> for AsciiChar {
    fn generate(
        &self,
        _size: usize,
        rng: &mut dyn rand::RngCore,
    ) -> Result<char, crate::error::GenerationError> {
        Ok(char::from(rng.gen_range(b' '..=b'~')))
    }
}

impl DefaultArbitrary for char {
    fn arbitrary() -> Arbitrary<Self> {
        Arbitrary::new(AsciiChar, ShrinkableShrinker)
    }
}

impl DefaultArbitrary for String {
    fn arbitrary() -> Arbitrary<Self> {
        let generator =
            list_of(AsciiChar).map(|chars: Vec<char>| chars.into_iter().collect::<String>());
        Arbitrary::new(generator, ShrinkableShrinker)
    }
}

impl<T> DefaultArbitrary for Vec<T>
where
    T: DefaultArbitrary + Shrinkable + Clone,
{
    fn arbitrary() -> Arbitrary<Self> {
        Arbitrary::new(list_of(T::arbitrary().generator), ShrinkableShrinker)
    }
}

impl<T> DefaultArbitrary for Option<T>
where
    T: DefaultArbitrary + Shrinkable + Clone + Send + Sync,
{
    fn arbitrary() -> Arbitrary<Self> {
        // None one time in four
        let some = T::arbitrary().generator.map(Some).boxed();
        let generator = choose(0u8, 3).bind(move |roll| {
            if roll == 0 { constant(None).boxed() } else { some.clone() }
        });
        Arbitrary::new(generator, ShrinkableShrinker)
    }
}

impl<A, B> DefaultArbitrary for (A, B)
where
    A: DefaultArbitrary + Shrinkable + Clone,
    B: DefaultArbitrary + Shrinkable + Clone,
{
    fn arbitrary() -> Arbitrary<Self> {
        let generator = zip(A::arbitrary().generator, B::arbitrary().generator);
        Arbitrary::new(generator, ShrinkableShrinker)
    }
}

impl<A, B, C> DefaultArbitrary for (A, B, C)
where
    A: DefaultArbitrary + Shrinkable + Clone,
    B: DefaultArbitrary + Shrinkable + Clone,
    C: DefaultArbitrary + Shrinkable + Clone,
{
    fn arbitrary() -> Arbitrary<Self> {
        let generator = zip(
            A::arbitrary().generator,
            zip(B::arbitrary().generator, C::arbitrary().generator),
        )
        .map(|(a, (b, c)): (A, (B, C))| (a, b, c));
        Arbitrary::new(generator, ShrinkableShrinker)
    }
}

/// Type-safe registry of arbitraries
#[derive(Default, Clone)]
pub struct ArbitraryRegistry {
    arbitraries: HashMap<TypeId, Arc<dyn Any + Send + Sync>>,
}

impl ArbitraryRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self {
            arbitraries: HashMap::new(),
        }
    }

    /// A registry holding the built-in arbitraries for primitive types
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register_default::<i8>();
        registry.register_default::<i16>();
        registry.register_default::<i32>();
        registry.register_default::<i64>();
        registry.register_default::<isize>();
        registry.register_default::<u8>();
        registry.register_default::<u16>();
        registry.register_default::<u32>();
        registry.register_default::<u64>();
        registry.register_default::<usize>();
        registry.register_default::<bool>();
        registry.register_default::<char>();
        registry.register_default::<String>();
        registry
    }

    /// Register an arbitrary, replacing any previous one for `T`
    pub fn register<T: 'static>(&mut self, arbitrary: Arbitrary<T>) {
        self.arbitraries
            .insert(TypeId::of::<T>(), Arc::new(arbitrary));
    }

    /// Register the built-in arbitrary for `T`
    pub fn register_default<T: DefaultArbitrary>(&mut self) {
        self.register(T::arbitrary());
    }

    /// Get the arbitrary for `T`, if registered
    pub fn get<T: 'static>(&self) -> Option<Arbitrary<T>> {
        self.arbitraries
            .get(&TypeId::of::<T>())
            .and_then(|stored| stored.downcast_ref::<Arbitrary<T>>())
            .cloned()
    }

    /// Get the arbitrary for `T` or fail with [`PropertyError::NoArbitrary`]
    pub fn lookup<T: 'static>(&self) -> Result<Arbitrary<T>, PropertyError> {
        self.get::<T>().ok_or(PropertyError::NoArbitrary {
            type_name: std::any::type_name::<T>(),
        })
    }

    /// Check if an arbitrary is registered for `T`
    pub fn contains<T: 'static>(&self) -> bool {
        self.arbitraries.contains_key(&TypeId::of::<T>())
    }

    /// Number of registered arbitraries
    pub fn len(&self) -> usize {
        self.arbitraries.len()
    }

    /// Check if the registry is empty
    pub fn is_empty(&self) -> bool {
        self.arbitraries.is_empty()
    }
}

impl std::fmt::Debug for ArbitraryRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ArbitraryRegistry")
            .field("len", &self.arbitraries.len())
            .finish()
    }
}

static GLOBAL_REGISTRY: OnceLock<ArbitraryRegistry> = OnceLock::new();

/// Populate the process-wide registry.
///
/// Must happen before any concurrent check starts. The registry is read-only
/// afterwards; a second call fails with
/// [`ConfigError::RegistryAlreadyInitialized`].
pub fn initialize_registry(registry: ArbitraryRegistry) -> Result<(), ConfigError> {
    GLOBAL_REGISTRY
        .set(registry)
        .map_err(|_| ConfigError::RegistryAlreadyInitialized)
}

/// The process-wide registry, if initialized
pub fn global_registry() -> Option<&'static ArbitraryRegistry> {
    GLOBAL_REGISTRY.get()
}

/// Resolve the arbitrary for `T`: the overlay first, then the global registry
pub fn resolve<T: 'static>(overlay: &ArbitraryRegistry) -> Result<Arbitrary<T>, PropertyError> {
    overlay
        .get::<T>()
        .or_else(|| global_registry().and_then(|registry| registry.get::<T>()))
        .ok_or(PropertyError::NoArbitrary {
            type_name: std::any::type_name::<T>(),
        })
}
