//! Trial outcomes and the lazy result tree that drives shrink search.

use std::collections::BTreeSet;
use std::fmt;
use std::rc::Rc;

use crate::error::PropertyError;
use crate::lazy::{LazyIter, LazySeq};

/// The verdict of evaluating a property once
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// The property held
    Passed,
    /// The property was falsified
    Falsified(String),
    /// A precondition did not hold; the trial does not count
    Discarded,
    /// The property faulted
    Errored(PropertyError),
}

impl Outcome {
    /// Falsified or errored
    pub fn is_failure(&self) -> bool {
        matches!(self, Outcome::Falsified(_) | Outcome::Errored(_))
    }

    /// Both falsified, or both errored
    pub fn same_failure_kind(&self, other: &Outcome) -> bool {
        matches!(
            (self, other),
            (Outcome::Falsified(_), Outcome::Falsified(_))
                | (Outcome::Errored(_), Outcome::Errored(_))
        )
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Passed => write!(f, "passed"),
            Outcome::Falsified(reason) => write!(f, "falsified: {}", reason),
            Outcome::Discarded => write!(f, "discarded"),
            Outcome::Errored(error) => write!(f, "errored: {}", error),
        }
    }
}

/// Where a command sequence diverged from its model
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandTrace {
    /// Name of every command in the sequence, in order
    pub commands: Vec<String>,
    /// Index of the command whose postcondition failed
    pub failed_step: usize,
}

impl fmt::Display for CommandTrace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (index, name) in self.commands.iter().enumerate() {
            let marker = if index == self.failed_step {
                " <- postcondition failed"
            } else {
                ""
            };
            writeln!(f, "  {:>3}. {}{}", index, name, marker)?;
        }
        Ok(())
    }
}

/// Everything recorded about one evaluation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrialResult {
    /// The verdict
    pub outcome: Outcome,
    /// Rendered arguments, outermost quantifier first
    pub arguments: Vec<String>,
    /// Labels attached by `label`, `classify` and `collect`
    pub labels: BTreeSet<String>,
    /// Command trace for model-based failures
    pub commands: Option<CommandTrace>,
}

impl TrialResult {
    /// A result with the given outcome and nothing else
    pub fn new(outcome: Outcome) -> Self {
        Self {
            outcome,
            arguments: Vec::new(),
            labels: BTreeSet::new(),
            commands: None,
        }
    }

    /// A passing result
    pub fn passed() -> Self {
        Self::new(Outcome::Passed)
    }

    /// A falsified result
    pub fn falsified(reason: impl Into<String>) -> Self {
        Self::new(Outcome::Falsified(reason.into()))
    }

    /// A discarded result
    pub fn discarded() -> Self {
        Self::new(Outcome::Discarded)
    }

    /// An errored result
    pub fn errored(error: impl Into<PropertyError>) -> Self {
        Self::new(Outcome::Errored(error.into()))
    }

    /// Attach a command trace
    pub fn with_commands(mut self, trace: CommandTrace) -> Self {
        self.commands = Some(trace);
        self
    }

    /// Falsified or errored
    pub fn is_failure(&self) -> bool {
        self.outcome.is_failure()
    }
}

/// A trial result together with the lazily computed results of its shrinks.
///
/// Every child's arguments are strictly simpler than the parent's according
/// to the shrinker that produced them. Children are only computed when a
/// walker reaches them.
#[derive(Clone)]
pub struct ResultTree {
    result: Rc<TrialResult>,
    children: LazySeq<ResultTree>,
}

impl ResultTree {
    /// A tree with the given root and children
    pub fn new(result: TrialResult, children: LazySeq<ResultTree>) -> Self {
        Self {
            result: Rc::new(result),
            children,
        }
    }

    /// A tree with no children
    pub fn leaf(result: TrialResult) -> Self {
        Self::new(result, LazySeq::empty())
    }

    /// The root result
    pub fn result(&self) -> &TrialResult {
        &self.result
    }

    /// Falsified or errored at the root
    pub fn is_failure(&self) -> bool {
        self.result.is_failure()
    }

    /// Iterate children, computing each on demand
    pub fn children(&self) -> LazyIter<ResultTree> {
        self.children.iter()
    }

    /// The children as a shareable sequence
    pub fn child_seq(&self) -> &LazySeq<ResultTree> {
        &self.children
    }

    /// Replace the children
    pub fn with_children(self, children: LazySeq<ResultTree>) -> Self {
        Self {
            result: self.result,
            children,
        }
    }

    /// Drop the children
    pub fn without_children(self) -> Self {
        self.with_children(LazySeq::empty())
    }

    /// Rewrite the result of every node, lazily for the descendants
    pub fn map_results<F>(self, f: F) -> Self
    where
        F: Fn(TrialResult) -> TrialResult + 'static,
    {
        self.map_shared(Rc::new(f))
    }

    fn map_shared(self, f: Rc<dyn Fn(TrialResult) -> TrialResult>) -> Self {
        let result = f(self.result.as_ref().clone());
        let children = self
            .children
            .map(move |child: ResultTree| child.map_shared(Rc::clone(&f)));
        Self::new(result, children)
    }

    /// Put `argument` in front of the arguments of every node
    pub fn prepend_argument(self, argument: String) -> Self {
        self.map_results(move |mut result| {
            result.arguments.insert(0, argument.clone());
            result
        })
    }

    /// Add `label` to every node
    pub fn add_label(self, label: String) -> Self {
        self.map_results(move |mut result| {
            result.labels.insert(label.clone());
            result
        })
    }
}

impl fmt::Debug for ResultTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResultTree")
            .field("result", &self.result)
            .field("forced_children", &self.children.forced_len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chain_tree(depth: usize) -> ResultTree {
        let result = TrialResult {
            arguments: vec![depth.to_string()],
            ..TrialResult::falsified("boom")
        };
        if depth == 0 {
            return ResultTree::leaf(result);
        }
        let children = LazySeq::new((0..1).map(move |_| chain_tree(depth - 1)));
        ResultTree::new(result, children)
    }

    #[test]
    fn test_outcome_failure_classification() {
        assert!(!Outcome::Passed.is_failure());
        assert!(!Outcome::Discarded.is_failure());
        assert!(Outcome::Falsified("x".into()).is_failure());
        assert!(Outcome::Errored(PropertyError::Panicked { message: "p".into() }).is_failure());
    }

    #[test]
    fn test_prepend_argument_reaches_descendants() {
        let tree = chain_tree(2).prepend_argument("outer".to_string());
        assert_eq!(tree.result().arguments, vec!["outer", "2"]);

        let child = tree.children().next().unwrap();
        assert_eq!(child.result().arguments, vec!["outer", "1"]);

        let grandchild = child.children().next().unwrap();
        assert_eq!(grandchild.result().arguments, vec!["outer", "0"]);
        assert!(grandchild.children().next().is_none());
    }

    #[test]
    fn test_map_results_is_lazy() {
        let tree = chain_tree(3).add_label("tagged".to_string());
        assert_eq!(tree.child_seq().forced_len(), 0);
        assert!(tree.result().labels.contains("tagged"));
    }

    #[test]
    fn test_without_children() {
        let tree = chain_tree(2).without_children();
        assert!(tree.children().next().is_none());
        assert!(tree.is_failure());
    }

    #[test]
    fn test_command_trace_display() {
        let trace = CommandTrace {
            commands: vec!["Inc".to_string(), "Dec".to_string()],
            failed_step: 1,
        };
        let rendered = trace.to_string();
        assert!(rendered.contains("0. Inc\n"));
        assert!(rendered.contains("1. Dec <- postcondition failed"));
    }

    #[test]
    fn test_failure_kinds() {
        let falsified = Outcome::Falsified("no".to_string());
        let errored = Outcome::Errored(PropertyError::Panicked {
            message: "boom".to_string(),
        });

        assert!(falsified.same_failure_kind(&Outcome::Falsified("other".to_string())));
        assert!(errored.same_failure_kind(&errored));
        assert!(!falsified.same_failure_kind(&errored));
        assert!(!errored.same_failure_kind(&falsified));
        assert!(!Outcome::Passed.same_failure_kind(&Outcome::Passed));
    }
}
