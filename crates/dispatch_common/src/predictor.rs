//! Serving-side prediction over a loaded artifact.
//!
//! [`DispatchPredictor`] is an explicitly constructed, immutable handle:
//! load it once at process start, then share it read-only across
//! concurrent requests. Nothing here mutates after construction, so no
//! locking is needed and a failed request cannot corrupt the model.

use crate::artifact::ModelArtifact;
use crate::compose::compose;
use crate::error::Result;
use crate::normalize::Tech;
use crate::ticket::Ticket;
use serde::Serialize;
use std::path::Path;

/// A single dispatch prediction.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Prediction {
    pub tech: Option<Tech>,
    /// Max class probability from the ensemble — an uncalibrated vote
    /// fraction; treat it as a relative score, not a likelihood.
    pub confidence: f64,
}

/// Per-ticket row of an offline batch replay.
#[derive(Debug, Clone, Serialize)]
pub struct BatchPrediction {
    pub number: Option<u64>,
    pub subject: String,
    pub predicted: Option<Tech>,
    pub confidence: f64,
    pub actual: Option<Tech>,
}

pub struct DispatchPredictor {
    artifact: ModelArtifact,
}

impl DispatchPredictor {
    /// Load the persisted artifact. Serving cannot start without one;
    /// callers should treat an error here as fatal.
    pub fn load(path: &Path) -> Result<Self> {
        Ok(Self { artifact: ModelArtifact::load(path)? })
    }

    pub fn from_artifact(artifact: ModelArtifact) -> Self {
        Self { artifact }
    }

    pub fn classes(&self) -> &[String] {
        self.artifact.forest.classes()
    }

    pub fn trained_at(&self) -> chrono::DateTime<chrono::Utc> {
        self.artifact.trained_at
    }

    /// Predict the dispatch identity for one ticket: compose, transform,
    /// classify, then normalize the raw predicted label.
    pub fn predict(&self, ticket: &Ticket) -> Result<Prediction> {
        let text = compose(ticket);
        let features = self.artifact.vectorizer.transform(&text)?;
        let proba = self.artifact.forest.predict_proba(&features);

        let (best, confidence) = proba
            .iter()
            .enumerate()
            .max_by(|a, b| a.1.total_cmp(b.1).then(b.0.cmp(&a.0)))
            .map(|(index, &p)| (index, p))
            .unwrap_or((0, 0.0));
        let label = &self.artifact.forest.classes()[best];

        Ok(Prediction {
            tech: Tech::normalize(Some(label)),
            confidence,
        })
    }

    /// Replay every ticket through the model, keeping the ground truth
    /// alongside for offline validation of a newly trained artifact.
    pub fn predict_batch(&self, tickets: &[Ticket]) -> Result<Vec<BatchPrediction>> {
        tickets
            .iter()
            .map(|ticket| {
                let prediction = self.predict(ticket)?;
                Ok(BatchPrediction {
                    number: ticket.number,
                    subject: ticket.subject.clone(),
                    predicted: prediction.tech,
                    confidence: prediction.confidence,
                    actual: ticket.actual_tech(),
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ticket::TicketUser;
    use crate::trainer::{train, TrainParams};
    use crate::forest::ForestParams;

    fn labeled_ticket(subject: &str, full_name: &str) -> Ticket {
        Ticket {
            subject: subject.to_string(),
            user: Some(TicketUser { full_name: Some(full_name.to_string()) }),
            ..Ticket::default()
        }
    }

    fn fitted_predictor() -> DispatchPredictor {
        let mut tickets = Vec::new();
        for i in 0..15 {
            tickets.push(labeled_ticket(&format!("printer jammed {}", i), "Carl Labrador"));
            tickets.push(labeled_ticket(&format!("network outage {}", i), "Michael Barbin"));
        }
        let params = TrainParams {
            forest: ForestParams { n_trees: 25, ..ForestParams::default() },
            ..TrainParams::default()
        };
        DispatchPredictor::from_artifact(train(&tickets, &params).unwrap().artifact)
    }

    #[test]
    fn predicts_a_canonical_identity_with_confidence() {
        let predictor = fitted_predictor();
        let ticket = Ticket { subject: "printer jammed again".to_string(), ..Ticket::default() };
        let prediction = predictor.predict(&ticket).unwrap();
        assert_eq!(prediction.tech, Some(Tech::CarlL));
        assert!(prediction.confidence >= 0.5);
        assert!(prediction.confidence <= 1.0);
    }

    #[test]
    fn absent_fields_are_treated_as_empty() {
        let predictor = fitted_predictor();
        let ticket = Ticket { subject: "VPN down".to_string(), ..Ticket::default() };
        let prediction = predictor.predict(&ticket).unwrap();
        assert!(prediction.confidence >= 0.0);
    }

    #[test]
    fn batch_replay_keeps_ground_truth() {
        let predictor = fitted_predictor();
        let tickets = vec![
            labeled_ticket("printer jammed", "Carl Labrador"),
            Ticket { subject: "network outage".to_string(), ..Ticket::default() },
        ];
        let batch = predictor.predict_batch(&tickets).unwrap();
        assert_eq!(batch.len(), 2);
        assert_eq!(batch[0].actual, Some(Tech::CarlL));
        assert!(batch[1].actual.is_none());
    }

    #[test]
    fn independent_handles_are_independent() {
        // The handle is constructed state, not a process-wide singleton.
        let a = fitted_predictor();
        let b = fitted_predictor();
        let ticket = Ticket { subject: "printer jammed".to_string(), ..Ticket::default() };
        assert_eq!(a.predict(&ticket).unwrap(), b.predict(&ticket).unwrap());
    }
}
