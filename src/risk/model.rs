//! Multi-class decision-tree classifier.
//!
//! A deterministic CART tree over the aligned feature vectors: Gini
//! impurity, midpoint thresholds, features scanned in index order so the
//! same training data always yields the same tree. Leaf probabilities are
//! class proportions over the fixed label universe, which gives the
//! serving layer a proper probability simplex without calibration.

use serde::{Deserialize, Serialize};

#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    #[error("model has not been trained")]
    NotTrained,
    #[error("feature vector has width {found}, model expects {expected}")]
    WidthMismatch { expected: usize, found: usize },
    #[error("training data is empty")]
    EmptyDataset,
    #[error("training sample {row} has width {found}, expected {expected}")]
    RaggedDataset {
        row: usize,
        expected: usize,
        found: usize,
    },
    #[error("label {label} is outside the {n_classes}-class universe")]
    LabelOutOfRange { label: usize, n_classes: usize },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
enum Node {
    Leaf {
        probabilities: Vec<f64>,
    },
    Split {
        feature: usize,
        threshold: f64,
        left: Box<Node>,
        right: Box<Node>,
    },
}

/// CART classifier with configurable depth and split-size limits.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecisionTreeClassifier {
    max_depth: usize,
    min_samples_split: usize,
    n_classes: usize,
    n_features: usize,
    root: Option<Node>,
}

impl DecisionTreeClassifier {
    pub fn new() -> Self {
        Self {
            max_depth: 8,
            min_samples_split: 2,
            n_classes: 0,
            n_features: 0,
            root: None,
        }
    }

    #[must_use]
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    #[must_use]
    pub fn with_min_samples_split(mut self, min_samples_split: usize) -> Self {
        self.min_samples_split = min_samples_split;
        self
    }

    /// Width of the aligned vectors this model was trained on.
    pub fn n_features(&self) -> usize {
        self.n_features
    }

    pub fn is_trained(&self) -> bool {
        self.root.is_some()
    }

    /// Trains the tree on aligned feature vectors and encoded labels.
    pub fn fit(&mut self, x: &[Vec<f64>], y: &[usize], n_classes: usize) -> Result<(), ModelError> {
        if x.is_empty() || y.is_empty() || x.len() != y.len() {
            return Err(ModelError::EmptyDataset);
        }

        let n_features = x[0].len();
        for (row, sample) in x.iter().enumerate() {
            if sample.len() != n_features {
                return Err(ModelError::RaggedDataset {
                    row,
                    expected: n_features,
                    found: sample.len(),
                });
            }
        }
        for &label in y {
            if label >= n_classes {
                return Err(ModelError::LabelOutOfRange { label, n_classes });
            }
        }

        self.n_classes = n_classes;
        self.n_features = n_features;

        let indices: Vec<usize> = (0..x.len()).collect();
        self.root = Some(self.grow(x, y, &indices, 0));
        Ok(())
    }

    /// Predicts the label index and the per-class probability distribution
    /// for one aligned vector.
    ///
    /// A vector whose width differs from the training width is a
    /// precondition violation and is rejected synchronously.
    pub fn predict(&self, vector: &[f64]) -> Result<(usize, Vec<f64>), ModelError> {
        let root = self.root.as_ref().ok_or(ModelError::NotTrained)?;
        if vector.len() != self.n_features {
            return Err(ModelError::WidthMismatch {
                expected: self.n_features,
                found: vector.len(),
            });
        }

        let mut node = root;
        loop {
            match node {
                Node::Leaf { probabilities } => {
                    let label = argmax(probabilities);
                    return Ok((label, probabilities.clone()));
                }
                Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    node = if vector[*feature] <= *threshold {
                        left
                    } else {
                        right
                    };
                }
            }
        }
    }

    fn grow(&self, x: &[Vec<f64>], y: &[usize], indices: &[usize], depth: usize) -> Node {
        let counts = self.class_counts(y, indices);
        let node_gini = gini(&counts, indices.len());

        let should_stop = depth >= self.max_depth
            || indices.len() < self.min_samples_split
            || node_gini == 0.0;
        if should_stop {
            return self.leaf(&counts, indices.len());
        }

        let Some((feature, threshold)) = self.best_split(x, y, indices, node_gini) else {
            return self.leaf(&counts, indices.len());
        };

        let (left, right): (Vec<usize>, Vec<usize>) = indices
            .iter()
            .copied()
            .partition(|&i| x[i][feature] <= threshold);

        Node::Split {
            feature,
            threshold,
            left: Box::new(self.grow(x, y, &left, depth + 1)),
            right: Box::new(self.grow(x, y, &right, depth + 1)),
        }
    }

    /// Scans features in index order and thresholds in ascending order;
    /// strictly-better impurity wins, so the search is deterministic.
    fn best_split(
        &self,
        x: &[Vec<f64>],
        y: &[usize],
        indices: &[usize],
        node_gini: f64,
    ) -> Option<(usize, f64)> {
        let total = indices.len();
        let mut best: Option<(usize, f64)> = None;
        let mut best_impurity = node_gini;

        for feature in 0..self.n_features {
            let mut values: Vec<f64> = indices.iter().map(|&i| x[i][feature]).collect();
            values.sort_by(|a, b| a.total_cmp(b));
            values.dedup();

            for pair in values.windows(2) {
                let threshold = (pair[0] + pair[1]) / 2.0;

                let mut left_counts = vec![0usize; self.n_classes];
                let mut left_total = 0usize;
                for &i in indices {
                    if x[i][feature] <= threshold {
                        left_counts[y[i]] += 1;
                        left_total += 1;
                    }
                }
                let right_total = total - left_total;
                if left_total == 0 || right_total == 0 {
                    continue;
                }

                let full_counts = self.class_counts(y, indices);
                let right_counts: Vec<usize> = full_counts
                    .iter()
                    .zip(left_counts.iter())
                    .map(|(full, left)| full - left)
                    .collect();

                let weighted = (left_total as f64 / total as f64)
                    * gini(&left_counts, left_total)
                    + (right_total as f64 / total as f64) * gini(&right_counts, right_total);

                if weighted < best_impurity {
                    best_impurity = weighted;
                    best = Some((feature, threshold));
                }
            }
        }

        best
    }

    fn class_counts(&self, y: &[usize], indices: &[usize]) -> Vec<usize> {
        let mut counts = vec![0usize; self.n_classes];
        for &i in indices {
            counts[y[i]] += 1;
        }
        counts
    }

    fn leaf(&self, counts: &[usize], total: usize) -> Node {
        let probabilities = counts
            .iter()
            .map(|&count| count as f64 / total as f64)
            .collect();
        Node::Leaf { probabilities }
    }
}

impl Default for DecisionTreeClassifier {
    fn default() -> Self {
        Self::new()
    }
}

fn gini(counts: &[usize], total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    let sum_squares: f64 = counts
        .iter()
        .map(|&count| {
            let p = count as f64 / total as f64;
            p * p
        })
        .sum();
    1.0 - sum_squares
}

/// First index of the maximum value; ties resolve to the lowest index.
fn argmax(values: &[f64]) -> usize {
    let mut best = 0;
    for (index, value) in values.iter().enumerate().skip(1) {
        if *value > values[best] {
            best = index;
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;

    fn toy_dataset() -> (Vec<Vec<f64>>, Vec<usize>) {
        // Three bands of a single feature, plus a noise dimension.
        let x = vec![
            vec![1.0, 0.3],
            vec![2.0, 0.7],
            vec![3.0, 0.1],
            vec![10.0, 0.9],
            vec![11.0, 0.2],
            vec![12.0, 0.5],
            vec![20.0, 0.4],
            vec![21.0, 0.8],
            vec![22.0, 0.6],
        ];
        let y = vec![0, 0, 0, 1, 1, 1, 2, 2, 2];
        (x, y)
    }

    #[test]
    fn fits_and_recovers_training_labels() {
        let (x, y) = toy_dataset();
        let mut model = DecisionTreeClassifier::new();
        model.fit(&x, &y, 3).expect("model fits");

        for (sample, &label) in x.iter().zip(y.iter()) {
            let (predicted, _) = model.predict(sample).expect("prediction succeeds");
            assert_eq!(predicted, label);
        }
    }

    #[test]
    fn probabilities_form_a_simplex() {
        let (x, y) = toy_dataset();
        let mut model = DecisionTreeClassifier::new();
        model.fit(&x, &y, 3).expect("model fits");

        let (_, probabilities) = model.predict(&[11.5, 0.5]).expect("prediction succeeds");
        assert_eq!(probabilities.len(), 3);
        let sum: f64 = probabilities.iter().sum();
        assert!((sum - 1.0).abs() < 1e-9);
        assert!(probabilities.iter().all(|p| (0.0..=1.0).contains(p)));
    }

    #[test]
    fn rejects_wrong_width_vectors() {
        let (x, y) = toy_dataset();
        let mut model = DecisionTreeClassifier::new();
        model.fit(&x, &y, 3).expect("model fits");

        let err = model.predict(&[1.0]).expect_err("width mismatch rejected");
        assert!(matches!(
            err,
            ModelError::WidthMismatch {
                expected: 2,
                found: 1
            }
        ));
    }

    #[test]
    fn untrained_model_refuses_to_predict() {
        let model = DecisionTreeClassifier::new();
        assert!(matches!(
            model.predict(&[1.0, 2.0]),
            Err(ModelError::NotTrained)
        ));
    }

    #[test]
    fn rejects_ragged_and_empty_input() {
        let mut model = DecisionTreeClassifier::new();
        assert!(matches!(
            model.fit(&[], &[], 3),
            Err(ModelError::EmptyDataset)
        ));

        let x = vec![vec![1.0, 2.0], vec![3.0]];
        let y = vec![0, 1];
        assert!(matches!(
            model.fit(&x, &y, 3),
            Err(ModelError::RaggedDataset { row: 1, .. })
        ));
    }

    #[test]
    fn rejects_labels_outside_universe() {
        let mut model = DecisionTreeClassifier::new();
        let x = vec![vec![1.0], vec![2.0]];
        let y = vec![0, 3];
        assert!(matches!(
            model.fit(&x, &y, 3),
            Err(ModelError::LabelOutOfRange { label: 3, .. })
        ));
    }

    #[test]
    fn serialized_model_predicts_identically() {
        let (x, y) = toy_dataset();
        let mut model = DecisionTreeClassifier::new();
        model.fit(&x, &y, 3).expect("model fits");

        let json = serde_json::to_string(&model).expect("model serializes");
        let restored: DecisionTreeClassifier =
            serde_json::from_str(&json).expect("model deserializes");

        for sample in &x {
            assert_eq!(
                model.predict(sample).expect("original predicts"),
                restored.predict(sample).expect("restored predicts")
            );
        }
    }

    #[test]
    fn depth_limit_produces_impure_leaves() {
        let (x, y) = toy_dataset();
        let mut model = DecisionTreeClassifier::new().with_max_depth(0);
        model.fit(&x, &y, 3).expect("model fits");

        let (_, probabilities) = model.predict(&x[0]).expect("prediction succeeds");
        // A depth-zero tree is a single leaf holding the class priors.
        assert!((probabilities[0] - 1.0 / 3.0).abs() < 1e-9);
    }
}
