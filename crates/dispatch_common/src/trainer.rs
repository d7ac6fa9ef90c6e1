//! Offline training: dataset assembly, stratified split, fit, evaluation.
//!
//! One-shot batch job; everything runs strictly in sequence. The
//! vectorizer is fit on the training partition only, so no test-set
//! vocabulary leaks into the model.

use crate::artifact::ModelArtifact;
use crate::compose::compose;
use crate::error::{DispatchError, Result};
use crate::forest::{ForestParams, RandomForest};
use crate::report::ClassificationReport;
use crate::ticket::Ticket;
use crate::vectorizer::{TfidfVectorizer, DEFAULT_MAX_FEATURES};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::info;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrainParams {
    /// Fraction of labeled tickets held out for evaluation.
    pub test_fraction: f64,
    pub max_features: usize,
    pub forest: ForestParams,
}

impl Default for TrainParams {
    fn default() -> Self {
        Self {
            test_fraction: 0.2,
            max_features: DEFAULT_MAX_FEATURES,
            forest: ForestParams::default(),
        }
    }
}

#[derive(Debug)]
pub struct TrainOutcome {
    pub artifact: ModelArtifact,
    pub report: ClassificationReport,
    pub train_size: usize,
    pub test_size: usize,
    /// Label distribution of the full labeled dataset, most frequent first.
    pub class_counts: Vec<(String, usize)>,
}

/// Train a dispatch model from historical tickets.
///
/// Tickets whose assignee does not normalize to a canonical identity are
/// discarded. Fails when the surviving data covers fewer than 2 identities.
pub fn train(tickets: &[Ticket], params: &TrainParams) -> Result<TrainOutcome> {
    let samples: Vec<(String, String)> = tickets
        .iter()
        .filter_map(|ticket| {
            ticket
                .actual_tech()
                .map(|tech| (compose(ticket), tech.as_str().to_string()))
        })
        .collect();

    if samples.is_empty() {
        return Err(DispatchError::Dataset(
            "no tickets with a recognizable assignee".to_string(),
        ));
    }

    let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
    for (_, label) in &samples {
        *counts.entry(label.as_str()).or_insert(0) += 1;
    }
    if counts.len() < 2 {
        return Err(DispatchError::DegenerateLabels(counts.len()));
    }

    let mut class_counts: Vec<(String, usize)> = counts
        .iter()
        .map(|(label, &count)| (label.to_string(), count))
        .collect();
    class_counts.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));

    info!("Training on {} labeled tickets, {} techs", samples.len(), counts.len());
    for (label, count) in &class_counts {
        info!("  {:<12} {}", label, count);
    }

    let labels: Vec<&str> = samples.iter().map(|(_, label)| label.as_str()).collect();
    let (train_idx, test_idx) =
        stratified_split(&labels, params.test_fraction, params.forest.seed);

    let train_texts: Vec<String> = train_idx
        .iter()
        .map(|&i| samples[i].0.clone())
        .collect();
    let train_labels: Vec<String> = train_idx
        .iter()
        .map(|&i| samples[i].1.clone())
        .collect();

    let mut vectorizer = TfidfVectorizer::new(params.max_features);
    vectorizer.fit(&train_texts)?;

    let train_features = train_texts
        .iter()
        .map(|text| vectorizer.transform(text))
        .collect::<Result<Vec<_>>>()?;
    let forest = RandomForest::fit(&train_features, &train_labels, &params.forest)?;

    let mut pairs: Vec<(&str, &str)> = Vec::with_capacity(test_idx.len());
    for &i in &test_idx {
        let (text, actual) = &samples[i];
        let features = vectorizer.transform(text)?;
        pairs.push((actual.as_str(), forest.predict(&features)));
    }
    let report = ClassificationReport::from_pairs(pairs.iter().copied());

    info!(
        "Held-out evaluation: accuracy {:.2}% over {} tickets",
        report.accuracy * 100.0,
        report.total
    );

    Ok(TrainOutcome {
        artifact: ModelArtifact::new(vectorizer, forest),
        report,
        train_size: train_idx.len(),
        test_size: test_idx.len(),
        class_counts,
    })
}

/// Split sample indices into (train, test) preserving each label's
/// proportion. Every label keeps at least one training sample; singleton
/// labels go to training only. Deterministic for a fixed seed.
pub fn stratified_split(
    labels: &[&str],
    test_fraction: f64,
    seed: u64,
) -> (Vec<usize>, Vec<usize>) {
    let test_fraction = test_fraction.clamp(0.0, 0.5);

    let mut groups: BTreeMap<&str, Vec<usize>> = BTreeMap::new();
    for (index, &label) in labels.iter().enumerate() {
        groups.entry(label).or_default().push(index);
    }

    let mut rng = StdRng::seed_from_u64(seed);
    let mut train = Vec::new();
    let mut test = Vec::new();

    for (_, mut indices) in groups {
        indices.shuffle(&mut rng);
        let n_test = ((indices.len() as f64) * test_fraction).round() as usize;
        let n_test = n_test.min(indices.len().saturating_sub(1));
        test.extend_from_slice(&indices[..n_test]);
        train.extend_from_slice(&indices[n_test..]);
    }

    train.sort_unstable();
    test.sort_unstable();
    (train, test)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ticket::{Comment, TicketUser};

    fn labeled_ticket(subject: &str, full_name: &str) -> Ticket {
        Ticket {
            subject: subject.to_string(),
            user: Some(TicketUser { full_name: Some(full_name.to_string()) }),
            ..Ticket::default()
        }
    }

    fn synthetic_tickets() -> Vec<Ticket> {
        let mut tickets = Vec::new();
        for i in 0..20 {
            tickets.push(labeled_ticket(
                &format!("printer jammed tray {}", i),
                "Carl Labrador",
            ));
            tickets.push(labeled_ticket(
                &format!("network outage switch {}", i),
                "Michael Barbin",
            ));
        }
        tickets
    }

    #[test]
    fn stratified_split_preserves_class_proportions() {
        let labels: Vec<&str> = std::iter::repeat("A")
            .take(80)
            .chain(std::iter::repeat("B").take(20))
            .collect();
        let (train, test) = stratified_split(&labels, 0.2, 42);

        assert_eq!(train.len() + test.len(), 100);
        let test_a = test.iter().filter(|&&i| labels[i] == "A").count();
        let test_b = test.iter().filter(|&&i| labels[i] == "B").count();
        assert_eq!(test_a, 16);
        assert_eq!(test_b, 4);
    }

    #[test]
    fn stratified_split_is_deterministic() {
        let labels: Vec<&str> = (0..50)
            .map(|i| if i % 3 == 0 { "A" } else { "B" })
            .collect();
        assert_eq!(
            stratified_split(&labels, 0.2, 7),
            stratified_split(&labels, 0.2, 7)
        );
    }

    #[test]
    fn singleton_class_stays_in_training() {
        let labels = vec!["A", "A", "A", "A", "B"];
        let (train, test) = stratified_split(&labels, 0.2, 42);
        assert!(train.contains(&4));
        assert!(!test.contains(&4));
    }

    #[test]
    fn train_produces_artifact_and_report() {
        let tickets = synthetic_tickets();
        let params = TrainParams {
            forest: ForestParams { n_trees: 25, ..ForestParams::default() },
            ..TrainParams::default()
        };
        let outcome = train(&tickets, &params).unwrap();
        assert_eq!(outcome.train_size + outcome.test_size, 40);
        assert_eq!(outcome.class_counts.len(), 2);
        assert!(outcome.artifact.vectorizer.is_fitted());
    }

    #[test]
    fn train_is_reproducible_for_a_fixed_seed() {
        let tickets = synthetic_tickets();
        let params = TrainParams {
            forest: ForestParams { n_trees: 25, ..ForestParams::default() },
            ..TrainParams::default()
        };
        let a = train(&tickets, &params).unwrap();
        let b = train(&tickets, &params).unwrap();
        assert_eq!(a.report, b.report);
    }

    #[test]
    fn unlabeled_tickets_are_discarded() {
        let mut tickets = synthetic_tickets();
        tickets.push(Ticket {
            subject: "no assignee".to_string(),
            comments: vec![Comment { body: Some("dangling".to_string()) }],
            ..Ticket::default()
        });
        tickets.push(labeled_ticket("unknown person", "Alice Example"));

        let params = TrainParams {
            forest: ForestParams { n_trees: 10, ..ForestParams::default() },
            ..TrainParams::default()
        };
        let outcome = train(&tickets, &params).unwrap();
        assert_eq!(outcome.train_size + outcome.test_size, 40);
    }

    #[test]
    fn single_tech_dataset_fails() {
        let tickets: Vec<Ticket> = (0..10)
            .map(|i| labeled_ticket(&format!("ticket {}", i), "Carl Tagle"))
            .collect();
        let err = train(&tickets, &TrainParams::default()).unwrap_err();
        assert!(matches!(err, DispatchError::DegenerateLabels(1)));
    }

    #[test]
    fn empty_dataset_fails() {
        let err = train(&[], &TrainParams::default()).unwrap_err();
        assert!(matches!(err, DispatchError::Dataset(_)));
    }
}
