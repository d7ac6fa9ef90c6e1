//! Per-class evaluation metrics.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassMetrics {
    pub label: String,
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
    /// Number of actual occurrences of this class.
    pub support: usize,
}

/// Accuracy plus per-class precision/recall/F1 over a set of
/// (actual, predicted) label pairs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassificationReport {
    pub accuracy: f64,
    pub per_class: Vec<ClassMetrics>,
    pub total: usize,
}

impl ClassificationReport {
    pub fn from_pairs<'a, I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        #[derive(Default)]
        struct Tally {
            tp: usize,
            fp: usize,
            fn_: usize,
            support: usize,
        }

        let mut tallies: BTreeMap<&str, Tally> = BTreeMap::new();
        let mut correct = 0usize;
        let mut total = 0usize;

        for (actual, predicted) in pairs {
            total += 1;
            let actual_tally = tallies.entry(actual).or_default();
            actual_tally.support += 1;
            if actual == predicted {
                actual_tally.tp += 1;
                correct += 1;
            } else {
                actual_tally.fn_ += 1;
                tallies.entry(predicted).or_default().fp += 1;
            }
        }

        let per_class = tallies
            .into_iter()
            .map(|(label, t)| {
                let precision = ratio(t.tp, t.tp + t.fp);
                let recall = ratio(t.tp, t.tp + t.fn_);
                let f1 = if precision + recall > 0.0 {
                    2.0 * precision * recall / (precision + recall)
                } else {
                    0.0
                };
                ClassMetrics {
                    label: label.to_string(),
                    precision,
                    recall,
                    f1,
                    support: t.support,
                }
            })
            .collect();

        ClassificationReport {
            accuracy: ratio(correct, total),
            per_class,
            total,
        }
    }
}

fn ratio(numerator: usize, denominator: usize) -> f64 {
    if denominator == 0 {
        0.0
    } else {
        numerator as f64 / denominator as f64
    }
}

impl fmt::Display for ClassificationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "{:<12} {:>10} {:>10} {:>10} {:>10}",
            "", "precision", "recall", "f1-score", "support"
        )?;
        for metrics in &self.per_class {
            writeln!(
                f,
                "{:<12} {:>10.2} {:>10.2} {:>10.2} {:>10}",
                metrics.label, metrics.precision, metrics.recall, metrics.f1, metrics.support
            )?;
        }
        writeln!(f)?;
        write!(
            f,
            "{:<12} {:>43.2} {:>10}",
            "accuracy", self.accuracy, self.total
        )
    }
}
