//! Offline training pipeline.
//!
//! Builds the synthetic dataset, freezes the feature schema, trains the
//! classifier with a seeded holdout evaluation, then refits on the full
//! dataset and hands back the artifact set. Everything downstream of the
//! dataset synthesizer is deterministic.

use crate::risk::artifacts::{ArtifactError, ModelArtifacts};
use crate::risk::dataset::{standard_training_set, DatasetError};
use crate::risk::encoding::{encode_features, FeatureSchema};
use crate::risk::labels::LabelCodec;
use crate::risk::model::{DecisionTreeClassifier, ModelError};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use std::path::Path;
use tracing::info;

#[derive(Debug, thiserror::Error)]
pub enum TrainingError {
    #[error("dataset construction failed: {0}")]
    Dataset(#[from] DatasetError),
    #[error("model fitting failed: {0}")]
    Model(#[from] ModelError),
    #[error("artifact persistence failed: {0}")]
    Artifact(#[from] ArtifactError),
}

/// Hyperparameters and evaluation controls.
#[derive(Debug, Clone)]
pub struct TrainingConfig {
    pub max_depth: usize,
    pub min_samples_split: usize,
    /// Fraction of rows held out for evaluation before the final refit.
    pub holdout_fraction: f64,
    pub shuffle_seed: u64,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            max_depth: 8,
            min_samples_split: 2,
            holdout_fraction: 0.25,
            shuffle_seed: 42,
        }
    }
}

/// Outcome of a training run.
#[derive(Debug)]
pub struct TrainingReport {
    pub artifacts: ModelArtifacts,
    pub n_samples: usize,
    pub n_features: usize,
    /// Accuracy on the held-out split, when the split was non-trivial.
    pub holdout_accuracy: Option<f64>,
    /// Accuracy of the final model over the full dataset.
    pub training_accuracy: f64,
}

/// Runs the full pipeline and returns the artifacts without persisting.
pub fn train(config: &TrainingConfig) -> Result<TrainingReport, TrainingError> {
    let tables = crate::risk::tables::RiskTables::standard();
    let rows = standard_training_set(&tables)?;
    info!(samples = rows.len(), "training dataset constructed");

    let pairs: Vec<_> = rows
        .iter()
        .map(|row| (&row.record, &row.features))
        .collect();
    let schema = FeatureSchema::fit(pairs);
    let codec = LabelCodec::fixed();

    let vectors: Vec<Vec<f64>> = rows
        .iter()
        .map(|row| schema.align(&encode_features(&row.record, &row.features)))
        .collect();
    let labels: Vec<usize> = rows.iter().map(|row| codec.encode(row.tier)).collect();

    info!(
        features = schema.len(),
        classes = codec.len(),
        "feature schema frozen"
    );

    let holdout_accuracy = evaluate_holdout(config, &vectors, &labels, codec.len())?;
    if let Some(accuracy) = holdout_accuracy {
        info!(accuracy, "holdout evaluation complete");
    }

    let mut model = DecisionTreeClassifier::new()
        .with_max_depth(config.max_depth)
        .with_min_samples_split(config.min_samples_split);
    model.fit(&vectors, &labels, codec.len())?;

    let training_accuracy = accuracy(&model, &vectors, &labels)?;
    info!(accuracy = training_accuracy, "final model fitted");

    Ok(TrainingReport {
        n_samples: vectors.len(),
        n_features: schema.len(),
        holdout_accuracy,
        training_accuracy,
        artifacts: ModelArtifacts {
            model,
            schema,
            codec,
        },
    })
}

/// Runs the pipeline and persists the artifacts to `dir`.
pub fn train_and_save(config: &TrainingConfig, dir: &Path) -> Result<TrainingReport, TrainingError> {
    let report = train(config)?;
    report.artifacts.save(dir)?;
    info!(dir = %dir.display(), "artifacts saved");
    Ok(report)
}

/// Seeded shuffle split; returns `None` when either side would be empty.
fn evaluate_holdout(
    config: &TrainingConfig,
    vectors: &[Vec<f64>],
    labels: &[usize],
    n_classes: usize,
) -> Result<Option<f64>, TrainingError> {
    let n_holdout = (vectors.len() as f64 * config.holdout_fraction).round() as usize;
    if n_holdout == 0 || n_holdout >= vectors.len() {
        return Ok(None);
    }

    let mut indices: Vec<usize> = (0..vectors.len()).collect();
    let mut rng = StdRng::seed_from_u64(config.shuffle_seed);
    indices.shuffle(&mut rng);

    let (holdout_idx, train_idx) = indices.split_at(n_holdout);
    let train_x: Vec<Vec<f64>> = train_idx.iter().map(|&i| vectors[i].clone()).collect();
    let train_y: Vec<usize> = train_idx.iter().map(|&i| labels[i]).collect();

    let mut model = DecisionTreeClassifier::new()
        .with_max_depth(config.max_depth)
        .with_min_samples_split(config.min_samples_split);
    model.fit(&train_x, &train_y, n_classes)?;

    let mut correct = 0usize;
    for &i in holdout_idx {
        let (predicted, _) = model.predict(&vectors[i])?;
        if predicted == labels[i] {
            correct += 1;
        }
    }

    Ok(Some(correct as f64 / holdout_idx.len() as f64))
}

fn accuracy(
    model: &DecisionTreeClassifier,
    vectors: &[Vec<f64>],
    labels: &[usize],
) -> Result<f64, TrainingError> {
    let mut correct = 0usize;
    for (vector, &label) in vectors.iter().zip(labels.iter()) {
        let (predicted, _) = model.predict(vector)?;
        if predicted == label {
            correct += 1;
        }
    }
    Ok(correct as f64 / vectors.len() as f64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn training_produces_consistent_artifacts() {
        let report = train(&TrainingConfig::default()).expect("training succeeds");
        assert_eq!(report.n_samples, 30);
        assert_eq!(report.n_features, report.artifacts.schema.len());
        assert_eq!(report.artifacts.model.n_features(), report.n_features);
        assert_eq!(report.artifacts.codec.len(), 3);
    }

    #[test]
    fn final_model_fits_the_training_data_well() {
        let report = train(&TrainingConfig::default()).expect("training succeeds");
        assert!(
            report.training_accuracy >= 0.9,
            "fully grown tree should fit the small dataset, got {}",
            report.training_accuracy
        );
    }

    #[test]
    fn holdout_evaluation_runs_for_default_config() {
        let report = train(&TrainingConfig::default()).expect("training succeeds");
        let accuracy = report.holdout_accuracy.expect("holdout split evaluated");
        assert!((0.0..=1.0).contains(&accuracy));
    }

    #[test]
    fn degenerate_holdout_fraction_skips_evaluation() {
        let config = TrainingConfig {
            holdout_fraction: 0.0,
            ..TrainingConfig::default()
        };
        let report = train(&config).expect("training succeeds");
        assert!(report.holdout_accuracy.is_none());
    }

    #[test]
    fn training_is_deterministic() {
        let first = train(&TrainingConfig::default()).expect("training succeeds");
        let second = train(&TrainingConfig::default()).expect("training succeeds");
        assert_eq!(first.artifacts.schema, second.artifacts.schema);
        assert_eq!(first.training_accuracy, second.training_accuracy);
        assert_eq!(first.holdout_accuracy, second.holdout_accuracy);
    }
}
