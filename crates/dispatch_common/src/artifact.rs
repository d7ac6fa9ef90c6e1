//! Trained model artifact: the fitted vectorizer/classifier pair.
//!
//! The pair is serialized as a single blob so a classifier can never be
//! mixed with a vocabulary it was not trained against. A retrain always
//! writes a whole new artifact; nothing is mutated in place.

use crate::error::{DispatchError, Result};
use crate::forest::RandomForest;
use crate::persist;
use crate::vectorizer::TfidfVectorizer;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Bumped whenever the serialized layout changes incompatibly.
pub const ARTIFACT_FORMAT_VERSION: u32 = 1;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelArtifact {
    pub format_version: u32,
    pub trained_at: DateTime<Utc>,
    pub vectorizer: TfidfVectorizer,
    pub forest: RandomForest,
}

impl ModelArtifact {
    pub fn new(vectorizer: TfidfVectorizer, forest: RandomForest) -> Self {
        Self {
            format_version: ARTIFACT_FORMAT_VERSION,
            trained_at: Utc::now(),
            vectorizer,
            forest,
        }
    }

    /// Persist atomically; on failure no partial artifact is visible.
    pub fn save(&self, path: &Path) -> Result<()> {
        let blob = serde_json::to_string(self)?;
        persist::atomic_write_str(path, &blob).map_err(|e| {
            DispatchError::Artifact(format!("cannot write {}: {}", path.display(), e))
        })
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            DispatchError::Artifact(format!("cannot read {}: {}", path.display(), e))
        })?;
        let artifact: ModelArtifact = serde_json::from_str(&content).map_err(|e| {
            DispatchError::Artifact(format!("corrupt artifact {}: {}", path.display(), e))
        })?;
        if artifact.format_version != ARTIFACT_FORMAT_VERSION {
            return Err(DispatchError::Artifact(format!(
                "unsupported artifact format {} (expected {})",
                artifact.format_version, ARTIFACT_FORMAT_VERSION
            )));
        }
        Ok(artifact)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::forest::ForestParams;

    fn tiny_artifact() -> ModelArtifact {
        let docs = vec![
            "printer jammed tray".to_string(),
            "network outage switch".to_string(),
            "printer toner empty".to_string(),
            "network cable loose".to_string(),
        ];
        let labels = vec![
            "Printer".to_string(),
            "Network".to_string(),
            "Printer".to_string(),
            "Network".to_string(),
        ];
        let mut vectorizer = TfidfVectorizer::new(100);
        vectorizer.fit(&docs).unwrap();
        let features: Vec<_> = docs.iter().map(|d| vectorizer.transform(d).unwrap()).collect();
        let params = ForestParams { n_trees: 10, min_samples_split: 2, min_samples_leaf: 1, ..ForestParams::default() };
        let forest = RandomForest::fit(&features, &labels, &params).unwrap();
        ModelArtifact::new(vectorizer, forest)
    }

    #[test]
    fn save_load_round_trip_preserves_predictions() {
        let artifact = tiny_artifact();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("model.json");

        artifact.save(&path).unwrap();
        let loaded = ModelArtifact::load(&path).unwrap();

        let x = artifact.vectorizer.transform("printer jammed").unwrap();
        let y = loaded.vectorizer.transform("printer jammed").unwrap();
        assert_eq!(x, y);
        assert_eq!(
            artifact.forest.predict_proba(&x),
            loaded.forest.predict_proba(&y)
        );
    }

    #[test]
    fn missing_artifact_is_an_artifact_error() {
        let err = ModelArtifact::load(Path::new("/nonexistent/model.json")).unwrap_err();
        assert!(matches!(err, DispatchError::Artifact(_)));
    }

    #[test]
    fn corrupt_artifact_is_an_artifact_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("model.json");
        fs::write(&path, "{ not json").unwrap();
        let err = ModelArtifact::load(&path).unwrap_err();
        assert!(matches!(err, DispatchError::Artifact(_)));
    }
}
