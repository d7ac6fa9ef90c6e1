//! Bagged decision-tree ensemble over sparse TF-IDF features.
//!
//! Each tree is grown on a bootstrap sample with a random √n feature
//! subset considered at every split. The ensemble's class distribution is
//! the mean of the trees' leaf distributions, which doubles as the
//! serving-time confidence score (a vote fraction, not a calibrated
//! probability). Class imbalance is handled by weighting samples inversely
//! to their class frequency, both in the split criterion and in leaf
//! distributions.

use crate::error::{DispatchError, Result};
use crate::vectorizer::SparseVector;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

/// Ensemble hyperparameters. `seed` makes fitting deterministic; two runs
/// with the same data and seed produce identical trees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ForestParams {
    pub n_trees: usize,
    pub max_depth: usize,
    pub min_samples_split: usize,
    pub min_samples_leaf: usize,
    pub seed: u64,
}

impl Default for ForestParams {
    fn default() -> Self {
        Self {
            n_trees: 200,
            max_depth: 20,
            min_samples_split: 5,
            min_samples_leaf: 2,
            seed: 42,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
enum Node {
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
    Leaf {
        /// Class distribution at this leaf, normalized to sum 1.
        dist: Vec<f64>,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct DecisionTree {
    nodes: Vec<Node>,
}

impl DecisionTree {
    fn leaf_dist(&self, x: &SparseVector) -> &[f64] {
        let mut index = 0;
        loop {
            match &self.nodes[index] {
                Node::Leaf { dist } => return dist,
                Node::Split { feature, threshold, left, right } => {
                    index = if x.get(*feature) <= *threshold { *left } else { *right };
                }
            }
        }
    }
}

/// Trained random-forest classifier.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RandomForest {
    classes: Vec<String>,
    trees: Vec<DecisionTree>,
    params: ForestParams,
}

impl RandomForest {
    /// Fit the ensemble. Labels are arbitrary strings; the distinct sorted
    /// label set becomes the class axis of [`Self::predict_proba`].
    pub fn fit(
        features: &[SparseVector],
        labels: &[String],
        params: &ForestParams,
    ) -> Result<Self> {
        if features.is_empty() || features.len() != labels.len() {
            return Err(DispatchError::Dataset(format!(
                "feature/label shape mismatch: {} features, {} labels",
                features.len(),
                labels.len()
            )));
        }

        let mut classes: Vec<String> = labels.to_vec();
        classes.sort();
        classes.dedup();
        if classes.len() < 2 {
            return Err(DispatchError::DegenerateLabels(classes.len()));
        }

        let y: Vec<usize> = labels
            .iter()
            .map(|label| {
                classes
                    .binary_search(label)
                    .map_err(|_| DispatchError::Inference("label not in class set".to_string()))
            })
            .collect::<Result<_>>()?;

        // Balanced class weights: n_samples / (n_classes * count).
        let mut counts = vec![0usize; classes.len()];
        for &class in &y {
            counts[class] += 1;
        }
        let n = y.len() as f64;
        let k = classes.len() as f64;
        let class_weight: Vec<f64> = counts
            .iter()
            .map(|&count| n / (k * count as f64))
            .collect();

        let n_features = features[0].dim;
        let mtry = ((n_features as f64).sqrt().round() as usize).clamp(1, n_features.max(1));

        let trees = (0..params.n_trees)
            .map(|tree_index| {
                let mut rng = StdRng::seed_from_u64(params.seed.wrapping_add(tree_index as u64));
                let sample: Vec<usize> = (0..features.len())
                    .map(|_| rng.gen_range(0..features.len()))
                    .collect();
                let mut builder = TreeBuilder {
                    x: features,
                    y: &y,
                    class_weight: &class_weight,
                    n_classes: classes.len(),
                    n_features,
                    mtry,
                    params,
                    nodes: Vec::new(),
                    rng,
                };
                builder.build(sample, 0);
                DecisionTree { nodes: builder.nodes }
            })
            .collect();

        Ok(Self { classes, trees, params: *params })
    }

    /// Distinct class labels, sorted; the axis of [`Self::predict_proba`].
    pub fn classes(&self) -> &[String] {
        &self.classes
    }

    pub fn params(&self) -> &ForestParams {
        &self.params
    }

    /// Mean of the trees' leaf distributions; sums to 1.
    pub fn predict_proba(&self, x: &SparseVector) -> Vec<f64> {
        let mut proba = vec![0.0; self.classes.len()];
        for tree in &self.trees {
            for (slot, p) in proba.iter_mut().zip(tree.leaf_dist(x)) {
                *slot += p;
            }
        }
        let n_trees = self.trees.len() as f64;
        for slot in &mut proba {
            *slot /= n_trees;
        }
        proba
    }

    /// Arg-max class of [`Self::predict_proba`]; ties resolve to the
    /// lexically first class.
    pub fn predict(&self, x: &SparseVector) -> &str {
        let proba = self.predict_proba(x);
        let best = proba
            .iter()
            .enumerate()
            .max_by(|a, b| a.1.total_cmp(b.1).then(b.0.cmp(&a.0)))
            .map(|(index, _)| index)
            .unwrap_or(0);
        &self.classes[best]
    }
}

struct TreeBuilder<'a> {
    x: &'a [SparseVector],
    y: &'a [usize],
    class_weight: &'a [f64],
    n_classes: usize,
    n_features: usize,
    mtry: usize,
    params: &'a ForestParams,
    nodes: Vec<Node>,
    rng: StdRng,
}

struct BestSplit {
    feature: usize,
    threshold: f64,
    impurity: f64,
}

impl TreeBuilder<'_> {
    /// Grow a subtree over `samples`; returns the node index.
    fn build(&mut self, samples: Vec<usize>, depth: usize) -> usize {
        let hist = self.weighted_histogram(&samples);

        if depth >= self.params.max_depth
            || samples.len() < self.params.min_samples_split
            || is_pure(&hist)
        {
            return self.push_leaf(hist);
        }

        let parent_impurity = gini(&hist);
        match self.best_split(&samples, parent_impurity) {
            Some(split) => {
                let (left, right): (Vec<usize>, Vec<usize>) = samples
                    .into_iter()
                    .partition(|&s| self.x[s].get(split.feature) <= split.threshold);
                let node_index = self.nodes.len();
                // Placeholder; children indices patched after recursion.
                self.nodes.push(Node::Leaf { dist: Vec::new() });
                let left_index = self.build(left, depth + 1);
                let right_index = self.build(right, depth + 1);
                self.nodes[node_index] = Node::Split {
                    feature: split.feature,
                    threshold: split.threshold,
                    left: left_index,
                    right: right_index,
                };
                node_index
            }
            None => self.push_leaf(hist),
        }
    }

    fn push_leaf(&mut self, hist: Vec<f64>) -> usize {
        let total: f64 = hist.iter().sum();
        let dist = if total > 0.0 {
            hist.iter().map(|w| w / total).collect()
        } else {
            vec![1.0 / self.n_classes as f64; self.n_classes]
        };
        self.nodes.push(Node::Leaf { dist });
        self.nodes.len() - 1
    }

    fn weighted_histogram(&self, samples: &[usize]) -> Vec<f64> {
        let mut hist = vec![0.0; self.n_classes];
        for &s in samples {
            hist[self.y[s]] += self.class_weight[self.y[s]];
        }
        hist
    }

    /// Search a random feature subset for the weighted-Gini-minimizing
    /// threshold. Returns None when nothing improves on the parent.
    fn best_split(&mut self, samples: &[usize], parent_impurity: f64) -> Option<BestSplit> {
        let candidates = rand::seq::index::sample(
            &mut self.rng,
            self.n_features,
            self.mtry.min(self.n_features),
        );

        let mut best: Option<BestSplit> = None;
        for feature in candidates {
            // (value, class) pairs sorted by value; TF-IDF weights are
            // finite so total_cmp is a plain ordering.
            let mut pairs: Vec<(f64, usize)> = samples
                .iter()
                .map(|&s| (self.x[s].get(feature), self.y[s]))
                .collect();
            pairs.sort_by(|a, b| a.0.total_cmp(&b.0));

            if pairs[0].0 == pairs[pairs.len() - 1].0 {
                continue; // constant feature on this sample set
            }

            let mut left_hist = vec![0.0; self.n_classes];
            let mut right_hist = self.weighted_histogram(samples);
            let mut left_count = 0usize;

            for boundary in 0..pairs.len() - 1 {
                let (value, class) = pairs[boundary];
                left_hist[class] += self.class_weight[class];
                right_hist[class] -= self.class_weight[class];
                left_count += 1;

                let next_value = pairs[boundary + 1].0;
                if value == next_value {
                    continue; // threshold must separate distinct values
                }
                let right_count = pairs.len() - left_count;
                if left_count < self.params.min_samples_leaf
                    || right_count < self.params.min_samples_leaf
                {
                    continue;
                }

                let left_weight: f64 = left_hist.iter().sum();
                let right_weight: f64 = right_hist.iter().sum();
                let total_weight = left_weight + right_weight;
                let impurity = (left_weight * gini(&left_hist)
                    + right_weight * gini(&right_hist))
                    / total_weight;

                if impurity + 1e-12 < parent_impurity
                    && best.as_ref().map_or(true, |b| impurity < b.impurity)
                {
                    best = Some(BestSplit {
                        feature,
                        threshold: (value + next_value) / 2.0,
                        impurity,
                    });
                }
            }
        }
        best
    }
}

fn is_pure(hist: &[f64]) -> bool {
    hist.iter().filter(|&&w| w > 0.0).count() <= 1
}

/// Gini impurity of a weighted class histogram.
fn gini(hist: &[f64]) -> f64 {
    let total: f64 = hist.iter().sum();
    if total <= 0.0 {
        return 0.0;
    }
    1.0 - hist
        .iter()
        .map(|w| {
            let p = w / total;
            p * p
        })
        .sum::<f64>()
}
