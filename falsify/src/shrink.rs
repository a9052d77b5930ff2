//! Shrinking functionality for minimizing failing test cases.
//!
//! A shrinker maps a value to a lazy sequence of strictly simpler candidates.
//! The sequence may be empty, never contains the value itself, and repeated
//! application from any starting point reaches an empty sequence in finitely
//! many steps. Composite values vary one component at a time with the others
//! held fixed.

use std::sync::Arc;

use num_traits::{CheckedNeg, PrimInt};

/// Produces simpler candidates for a value
pub trait Shrinker<T> {
    /// Lazily enumerate candidates, simplest first
    fn shrink(&self, value: &T) -> Box<dyn Iterator<Item = T>>;
}

impl<T, F> Shrinker<T> for F
where
    F: Fn(&T) -> Box<dyn Iterator<Item = T>>,
{
    fn shrink(&self, value: &T) -> Box<dyn Iterator<Item = T>> {
        self(value)
    }
}

/// A cloneable, type-erased shrinker
pub struct BoxedShrinker<T> {
    inner: Arc<dyn Shrinker<T> + Send + Sync>,
}

impl<T> BoxedShrinker<T> {
    /// Erase the type of a shrinker
    pub fn new<S: Shrinker<T> + Send + Sync + 'static>(shrinker: S) -> Self {
        Self {
            inner: Arc::new(shrinker),
        }
    }
}

impl<T> Clone for BoxedShrinker<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T> Shrinker<T> for BoxedShrinker<T> {
    fn shrink(&self, value: &T) -> Box<dyn Iterator<Item = T>> {
        self.inner.shrink(value)
    }
}

/// A shrinker that never proposes candidates
#[derive(Debug, Clone, Copy, Default)]
pub struct NoShrink;

impl<T: 'static> Shrinker<T> for NoShrink {
    fn shrink(&self, _value: &T) -> Box<dyn Iterator<Item = T>> {
        Box::new(std::iter::empty())
    }
}

/// Create a shrinker that never proposes candidates
pub fn no_shrink() -> NoShrink {
    NoShrink
}

/// Shrinks any [`Shrinkable`] type with its own strategy
#[derive(Debug, Clone, Copy, Default)]
pub struct ShrinkableShrinker;

impl<T: Shrinkable> Shrinker<T> for ShrinkableShrinker {
    fn shrink(&self, value: &T) -> Box<dyn Iterator<Item = T>> {
        value.shrink()
    }
}

/// Trait for types that can be shrunk to smaller values
pub trait Shrinkable: Sized {
    /// Create a lazy iterator of shrunk values
    fn shrink(&self) -> Box<dyn Iterator<Item = Self>>;
}

/// Candidates strictly between zero and `value`, approaching `value`.
///
/// Yields `value - value/2`, `value - value/4`, ... so that the first
/// candidates make the biggest jumps.
fn halvings_towards<T: PrimInt + 'static>(value: T) -> impl Iterator<Item = T> {
    let two = T::one() + T::one();
    std::iter::successors(Some(value / two), move |delta| Some(*delta / two))
        .take_while(|delta| !delta.is_zero())
        .map(move |delta| value - delta)
}

/// Integer shrinking towards zero
fn shrink_integer<T: PrimInt + 'static>(value: T) -> Box<dyn Iterator<Item = T>> {
    if value.is_zero() {
        return Box::new(std::iter::empty());
    }
    Box::new(std::iter::once(T::zero()).chain(halvings_towards(value)))
}

/// Signed integers also try the positive mirror before halving
fn shrink_signed<T: PrimInt + CheckedNeg + 'static>(value: T) -> Box<dyn Iterator<Item = T>> {
    let mirror = if value < T::zero() {
        value.checked_neg()
    } else {
        None
    };
    if value.is_zero() {
        return Box::new(std::iter::empty());
    }
    Box::new(
        std::iter::once(T::zero())
            .chain(mirror)
            .chain(halvings_towards(value)),
    )
}

macro_rules! impl_shrinkable_unsigned {
    ($($t:ty),*) => {
        $(
            impl Shrinkable for $t {
                fn shrink(&self) -> Box<dyn Iterator<Item = Self>> {
                    shrink_integer(*self)
                }
            }
        )*
    };
}

macro_rules! impl_shrinkable_signed {
    ($($t:ty),*) => {
        $(
            impl Shrinkable for $t {
                fn shrink(&self) -> Box<dyn Iterator<Item = Self>> {
                    shrink_signed(*self)
                }
            }
        )*
    };
}

impl_shrinkable_unsigned!(u8, u16, u32, u64, usize);
impl_shrinkable_signed!(i8, i16, i32, i64, isize);

impl Shrinkable for bool {
    fn shrink(&self) -> Box<dyn Iterator<Item = Self>> {
        if *self {
            Box::new(std::iter::once(false))
        } else {
            Box::new(std::iter::empty())
        }
    }
}

impl Shrinkable for char {
    fn shrink(&self) -> Box<dyn Iterator<Item = Self>> {
        // towards 'a', through the code points in between
        let code = *self as u32;
        let target = 'a' as u32;
        if code == target {
            return Box::new(std::iter::empty());
        }
        let distance = code.abs_diff(target);
        let towards_a = halvings_towards(distance).filter_map(move |offset| {
            if code > target {
                char::from_u32(target + offset)
            } else {
                char::from_u32(target - offset)
            }
        });
        Box::new(std::iter::once('a').chain(towards_a))
    }
}

impl<T: Shrinkable + Clone + 'static> Shrinkable for Vec<T> {
    fn shrink(&self) -> Box<dyn Iterator<Item = Self>> {
        Box::new(shrink_vec(self.clone()))
    }
}

/// Remove chunks (largest first), then shrink one element at a time
fn shrink_vec<T: Shrinkable + Clone + 'static>(items: Vec<T>) -> impl Iterator<Item = Vec<T>> {
    let len = items.len();
    let removals = {
        let items = items.clone();
        std::iter::successors(Some(len), |chunk| Some(chunk / 2))
            .take_while(|chunk| *chunk > 0)
            .flat_map(move |chunk| {
                let items = items.clone();
                (0..len)
                    .step_by(chunk)
                    .map(move |start| remove_span(&items, start, chunk))
            })
    };

    let element_shrinks = (0..len).flat_map(move |index| {
        let items = items.clone();
        items[index].shrink().map(move |candidate| {
            let mut shrunk = items.clone();
            shrunk[index] = candidate;
            shrunk
        })
    });

    removals.chain(element_shrinks)
}

/// Copy of `items` with `items[start..start + len]` removed
pub fn remove_span<T: Clone>(items: &[T], start: usize, len: usize) -> Vec<T> {
    let end = (start + len).min(items.len());
    let mut kept = Vec::with_capacity(items.len() - (end - start));
    kept.extend_from_slice(&items[..start]);
    kept.extend_from_slice(&items[end..]);
    kept
}

impl Shrinkable for String {
    fn shrink(&self) -> Box<dyn Iterator<Item = Self>> {
        let chars: Vec<char> = self.chars().collect();
        Box::new(shrink_vec(chars).map(|chars| chars.into_iter().collect()))
    }
}

impl<T: Shrinkable + Clone + 'static> Shrinkable for Option<T> {
    fn shrink(&self) -> Box<dyn Iterator<Item = Self>> {
        match self {
            None => Box::new(std::iter::empty()),
            Some(value) => Box::new(std::iter::once(None).chain(value.shrink().map(Some))),
        }
    }
}

impl<A, B> Shrinkable for (A, B)
where
    A: Shrinkable + Clone + 'static,
    B: Shrinkable + Clone + 'static,
{
    fn shrink(&self) -> Box<dyn Iterator<Item = Self>> {
        let (a, b) = self.clone();
        let first = {
            let b = b.clone();
            a.shrink().map(move |a| (a, b.clone()))
        };
        let second = b.shrink().map(move |b| (a.clone(), b));
        Box::new(first.chain(second))
    }
}

impl<A, B, C> Shrinkable for (A, B, C)
where
    A: Shrinkable + Clone + 'static,
    B: Shrinkable + Clone + 'static,
    C: Shrinkable + Clone + 'static,
{
    fn shrink(&self) -> Box<dyn Iterator<Item = Self>> {
        let (a, b, c) = self.clone();
        let first = {
            let (b, c) = (b.clone(), c.clone());
            a.shrink().map(move |a| (a, b.clone(), c.clone()))
        };
        let second = {
            let (a, c) = (a.clone(), c.clone());
            b.shrink().map(move |b| (a.clone(), b, c.clone()))
        };
        let third = c.shrink().map(move |c| (a.clone(), b.clone(), c));
        Box::new(first.chain(second).chain(third))
    }
}
