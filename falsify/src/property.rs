//! Properties, quantifiers and property combinators.
//!
//! A [`Property`] is a function from a [`TrialContext`] to a [`ResultTree`].
//! Nothing is evaluated until the check runner asks, and shrink candidates
//! are only evaluated when the shrink walk reaches them.

use std::fmt::Debug;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Arc;

use tracing::warn;

use crate::arbitrary::{Arbitrary, ArbitraryRegistry, resolve};
use crate::error::PropertyError;
use crate::generator::Generator;
use crate::lazy::LazySeq;
use crate::result::{Outcome, ResultTree, TrialResult};
use crate::rng::Random;
use crate::shrink::{Shrinker, no_shrink};

/// Everything a property needs to evaluate one trial
#[derive(Debug, Clone)]
pub struct TrialContext {
    /// Generator size for this trial
    pub size: usize,
    /// Random state for this trial
    pub random: Random,
    /// Per-check arbitraries consulted before the global registry
    pub arbitraries: Arc<ArbitraryRegistry>,
}

impl TrialContext {
    /// A context with an empty arbitrary overlay
    pub fn new(size: usize, random: Random) -> Self {
        Self {
            size,
            random,
            arbitraries: Arc::new(ArbitraryRegistry::new()),
        }
    }

    /// The same context with a different random state
    pub fn with_random(&self, random: Random) -> Self {
        Self {
            size: self.size,
            random,
            arbitraries: Arc::clone(&self.arbitraries),
        }
    }
}

/// A lazily evaluated, composable property
#[derive(Clone)]
pub struct Property {
    evaluate: Arc<dyn Fn(&TrialContext) -> ResultTree + Send + Sync>,
}

impl Property {
    /// Build a property from an evaluation function
    pub fn new<F>(evaluate: F) -> Self
    where
        F: Fn(&TrialContext) -> ResultTree + Send + Sync + 'static,
    {
        Self {
            evaluate: Arc::new(evaluate),
        }
    }

    /// A property that always has the given result
    pub fn from_result(result: TrialResult) -> Self {
        Self::new(move |_| ResultTree::leaf(result.clone()))
    }

    /// Evaluate once. Panics inside the property become errored results.
    pub fn evaluate(&self, ctx: &TrialContext) -> ResultTree {
        protect(|| (self.evaluate)(ctx))
    }

    /// Conjunction: fails if either side fails.
    ///
    /// `self` is evaluated first. When it fails, its tree is the result and
    /// `other` is never evaluated, so only its arguments get shrunk.
    pub fn and(self, other: impl Testable) -> Property {
        let other = other.into_property();
        Property::new(move |ctx| {
            let (left_random, right_random) = ctx.random.split();
            let left = self.evaluate(&ctx.with_random(left_random));
            if left.is_failure() {
                return left;
            }
            let right = other.evaluate(&ctx.with_random(right_random));
            if right.is_failure() {
                return right;
            }
            ResultTree::leaf(merge_passing(left.result(), right.result()))
        })
    }

    /// Disjunction: fails only if both sides fail
    pub fn or(self, other: impl Testable) -> Property {
        let other = other.into_property();
        Property::new(move |ctx| {
            let (left_random, right_random) = ctx.random.split();
            let left = self.evaluate(&ctx.with_random(left_random));
            if matches!(left.result().outcome, Outcome::Passed) {
                return left;
            }
            let right = other.evaluate(&ctx.with_random(right_random));
            if !right.is_failure() || !left.is_failure() {
                return if right.is_failure() { left } else { right };
            }
            both_failed(left, right)
        })
    }

    /// Attach a label to every result of this property
    pub fn label(self, label: impl Into<String>) -> Property {
        let label = label.into();
        Property::new(move |ctx| self.evaluate(ctx).add_label(label.clone()))
    }

    /// Attach `label` when `condition` holds
    pub fn classify(self, condition: bool, label: impl Into<String>) -> Property {
        if condition { self.label(label) } else { self }
    }

    /// Attach the rendering of `value` as a label
    pub fn collect<V: Debug>(self, value: V) -> Property {
        self.label(format!("{:?}", value))
    }
}

impl Debug for Property {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Property")
    }
}

/// Run `evaluate`, turning a panic into an errored leaf
fn protect<F: FnOnce() -> ResultTree>(evaluate: F) -> ResultTree {
    match catch_unwind(AssertUnwindSafe(evaluate)) {
        Ok(tree) => tree,
        Err(payload) => ResultTree::leaf(TrialResult::errored(PropertyError::from_panic(payload))),
    }
}

/// Shrink candidates of `value`.
///
/// A shrinker that panics, up front or while producing a candidate, ends
/// the sequence there; the candidates already produced stay usable.
fn guarded_shrinks<T: 'static>(
    arbitrary: &Arbitrary<T>,
    value: &T,
) -> Box<dyn Iterator<Item = T>> {
    let started = catch_unwind(AssertUnwindSafe(|| arbitrary.shrinker().shrink(value)));
    let mut candidates = match started {
        Ok(candidates) => Some(candidates),
        Err(_) => {
            warn!("shrinker panicked before producing candidates");
            None
        }
    };
    Box::new(std::iter::from_fn(move || {
        let next = catch_unwind(AssertUnwindSafe(|| candidates.as_mut()?.next()));
        next.unwrap_or_else(|_| {
            warn!("shrinker panicked; no further candidates");
            candidates = None;
            None
        })
    }))
}

/// Combine two non-failing results
fn merge_passing(left: &TrialResult, right: &TrialResult) -> TrialResult {
    let outcome = if left.outcome == Outcome::Discarded {
        left.outcome.clone()
    } else {
        right.outcome.clone()
    };
    let mut merged = TrialResult::new(outcome);
    merged.arguments = left.arguments.clone();
    merged.arguments.extend(right.arguments.iter().cloned());
    merged.labels = left.labels.union(&right.labels).cloned().collect();
    merged
}

/// Combine two failing trees; shrinks the left side first, then the right
fn both_failed(left: ResultTree, right: ResultTree) -> ResultTree {
    let (l, r) = (left.result(), right.result());
    let outcome = match (&l.outcome, &r.outcome) {
        (Outcome::Errored(error), _) | (_, Outcome::Errored(error)) => {
            Outcome::Errored(error.clone())
        }
        (left_outcome, right_outcome) => Outcome::Falsified(format!(
            "{} and {}",
            reason(left_outcome),
            reason(right_outcome)
        )),
    };
    let mut result = TrialResult::new(outcome);
    result.arguments = l.arguments.clone();
    result.arguments.extend(r.arguments.iter().cloned());
    result.labels = l.labels.union(&r.labels).cloned().collect();
    result.commands = l.commands.clone().or_else(|| r.commands.clone());

    let shrink_left = {
        let right = right.clone();
        left.child_seq()
            .map(move |child: ResultTree| combine_or(child, right.clone()))
    };
    let shrink_right = {
        let left = left.clone();
        right
            .child_seq()
            .map(move |child: ResultTree| combine_or(left.clone(), child))
    };
    ResultTree::new(result, shrink_left.chain(&shrink_right))
}

fn combine_or(left: ResultTree, right: ResultTree) -> ResultTree {
    if left.is_failure() && right.is_failure() {
        both_failed(left, right)
    } else if left.is_failure() {
        right.without_children()
    } else {
        left.without_children()
    }
}

fn reason(outcome: &Outcome) -> String {
    match outcome {
        Outcome::Falsified(reason) => reason.clone(),
        other => other.to_string(),
    }
}

/// Things that can be turned into a property
pub trait Testable {
    /// Convert into a property
    fn into_property(self) -> Property;
}

impl Testable for Property {
    fn into_property(self) -> Property {
        self
    }
}

impl Testable for bool {
    fn into_property(self) -> Property {
        if self {
            Property::from_result(TrialResult::passed())
        } else {
            Property::from_result(TrialResult::falsified("property returned false"))
        }
    }
}

impl Testable for () {
    fn into_property(self) -> Property {
        Property::from_result(TrialResult::passed())
    }
}

impl Testable for Result<(), String> {
    fn into_property(self) -> Property {
        match self {
            Ok(()) => Property::from_result(TrialResult::passed()),
            Err(reason) => Property::from_result(TrialResult::falsified(reason)),
        }
    }
}

impl Testable for TrialResult {
    fn into_property(self) -> Property {
        Property::from_result(self)
    }
}

/// Implication: a false `condition` discards the trial without shrinking
pub fn implies(condition: bool, property: impl Testable) -> Property {
    if condition {
        property.into_property()
    } else {
        Property::from_result(TrialResult::discarded())
    }
}

/// Universal quantification over an arbitrary.
///
/// Draws a value, evaluates `body`, and on failure exposes as children the
/// trees of `body` re-evaluated against each shrink candidate (depth-first,
/// left to right) followed by the failing tree's own children. Nested
/// quantifiers therefore settle the outer value before the inner one starts
/// shrinking.
pub fn for_all<T, R, F>(arbitrary: Arbitrary<T>, body: F) -> Property
where
    T: Clone + Debug + 'static,
    R: Testable,
    F: Fn(T) -> R + Send + Sync + 'static,
{
    let quantifier = Arc::new(Quantifier {
        arbitrary,
        body: Box::new(move |value| body(value).into_property()),
    });
    Property::new(move |ctx| {
        let (value_random, body_random) = ctx.random.split();
        let mut rng = value_random.rng();
        let drawn = catch_unwind(AssertUnwindSafe(|| {
            quantifier.arbitrary.generator().generate(ctx.size, &mut rng)
        }));
        match drawn {
            Ok(Ok(value)) => {
                Quantifier::evaluate_case(&quantifier, value, ctx.with_random(body_random))
            }
            Ok(Err(error)) => ResultTree::leaf(TrialResult::errored(error)),
            Err(payload) => {
                ResultTree::leaf(TrialResult::errored(PropertyError::from_panic(payload)))
            }
        }
    })
}

/// Quantify over a bare generator; failures are reported unshrunk
pub fn for_all_gen<T, G, R, F>(generator: G, body: F) -> Property
where
    T: Clone + Debug + 'static,
    G: Generator<T> + Send + Sync + 'static,
    R: Testable,
    F: Fn(T) -> R + Send + Sync + 'static,
{
    for_all(Arbitrary::new(generator, no_shrink()), body)
}

/// Quantify over the registered arbitrary for `T`.
///
/// The lookup happens at evaluation time, against the check's overlay and
/// then the global registry. A missing arbitrary errors the trial.
pub fn for_any<T, R, F>(body: F) -> Property
where
    T: Clone + Debug + 'static,
    R: Testable,
    F: Fn(T) -> R + Send + Sync + 'static,
{
    let body = Arc::new(body);
    Property::new(move |ctx| match resolve::<T>(&ctx.arbitraries) {
        Ok(arbitrary) => {
            let body = Arc::clone(&body);
            for_all(arbitrary, move |value| body(value)).evaluate(ctx)
        }
        Err(error) => ResultTree::leaf(TrialResult::errored(error)),
    })
}

type Body<T> = Box<dyn Fn(T) -> Property + Send + Sync>;

struct Quantifier<T> {
    arbitrary: Arbitrary<T>,
    body: Body<T>,
}

impl<T: Clone + Debug + 'static> Quantifier<T> {
    fn evaluate_case(this: &Arc<Self>, value: T, ctx: TrialContext) -> ResultTree {
        let argument = format!("{:?}", value);
        let tree = protect(|| (this.body)(value.clone()).evaluate(&ctx)).prepend_argument(argument);
        if !tree.is_failure() {
            return tree.without_children();
        }

        let quantifier = Arc::clone(this);
        let shrinks = LazySeq::new(
            guarded_shrinks(&this.arbitrary, &value)
                .map(move |candidate| Quantifier::evaluate_case(&quantifier, candidate, ctx.clone())),
        );
        let inner = tree.child_seq().clone();
        tree.with_children(shrinks.chain(&inner))
    }
}
