//! Label distribution collected over the passing trials of a check.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

/// Counts how often each label combination was seen
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LabelStats {
    /// Passing trials recorded, labelled or not
    trials: usize,
    /// Trials per distinct, non-empty label combination
    combinations: BTreeMap<Vec<String>, usize>,
}

impl LabelStats {
    /// Create an empty collector
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the labels of one passing trial
    pub fn record(&mut self, labels: &BTreeSet<String>) {
        self.trials += 1;
        if labels.is_empty() {
            return;
        }
        let key: Vec<String> = labels.iter().cloned().collect();
        *self.combinations.entry(key).or_insert(0) += 1;
    }

    /// Number of recorded trials
    pub fn trials(&self) -> usize {
        self.trials
    }

    /// True if no trial carried a label
    pub fn is_empty(&self) -> bool {
        self.combinations.is_empty()
    }

    /// How many trials carried exactly this label combination
    pub fn count(&self, labels: &[&str]) -> usize {
        let mut key: Vec<String> = labels.iter().map(|label| label.to_string()).collect();
        key.sort();
        key.dedup();
        self.combinations.get(&key).copied().unwrap_or(0)
    }

    /// Label combinations with their share of all trials, most frequent first
    pub fn distribution(&self) -> Vec<(String, f64)> {
        let mut rows: Vec<(String, usize)> = self
            .combinations
            .iter()
            .map(|(labels, count)| (labels.join(", "), *count))
            .collect();
        rows.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));

        let total = self.trials.max(1) as f64;
        rows.into_iter()
            .map(|(labels, count)| (labels, count as f64 * 100.0 / total))
            .collect()
    }
}

impl fmt::Display for LabelStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (labels, percentage) in self.distribution() {
            writeln!(f, "{:>6.2}% {}", percentage, labels)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn labels(names: &[&str]) -> BTreeSet<String> {
        names.iter().map(|name| name.to_string()).collect()
    }

    #[test]
    fn test_counts_combinations() {
        let mut stats = LabelStats::new();
        stats.record(&labels(&["small"]));
        stats.record(&labels(&["small"]));
        stats.record(&labels(&["small", "even"]));
        stats.record(&labels(&[]));

        assert_eq!(stats.trials(), 4);
        assert_eq!(stats.count(&["small"]), 2);
        assert_eq!(stats.count(&["small", "even"]), 1);
        assert_eq!(stats.count(&["even", "small"]), 1);
        assert_eq!(stats.count(&["large"]), 0);
    }

    #[test]
    fn test_distribution_percentages() {
        let mut stats = LabelStats::new();
        for _ in 0..3 {
            stats.record(&labels(&["a"]));
        }
        stats.record(&labels(&["b"]));

        let distribution = stats.distribution();
        assert_eq!(distribution[0], ("a".to_string(), 75.0));
        assert_eq!(distribution[1], ("b".to_string(), 25.0));
    }

    #[test]
    fn test_display() {
        let mut stats = LabelStats::new();
        stats.record(&labels(&["trivial"]));
        stats.record(&labels(&[]));

        assert_eq!(stats.to_string(), " 50.00% trivial\n");
        assert!(LabelStats::new().to_string().is_empty());
    }
}
