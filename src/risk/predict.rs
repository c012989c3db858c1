//! Inference pipeline: transform, align, classify, decode.

use crate::risk::artifacts::ModelArtifacts;
use crate::risk::encoding::encode_features;
use crate::risk::features::engineer_features;
use crate::risk::labels::{LabelError, RiskTier};
use crate::risk::model::ModelError;
use crate::risk::supplier::SupplierRecord;
use crate::risk::tables::RiskTables;
use axum::http::StatusCode;
use serde::Serialize;

/// Prediction failures surfaced to HTTP callers.
///
/// The Display strings of the first two variants are the documented wire
/// payloads and must not change.
#[derive(Debug, thiserror::Error)]
pub enum PredictionError {
    #[error("Model is not loaded.")]
    ModelNotLoaded,
    #[error("No input data provided.")]
    EmptyInput,
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("{0}")]
    Model(#[from] ModelError),
    #[error("{0}")]
    Label(#[from] LabelError),
}

impl PredictionError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            PredictionError::EmptyInput | PredictionError::InvalidInput(_) => {
                StatusCode::BAD_REQUEST
            }
            PredictionError::ModelNotLoaded
            | PredictionError::Model(_)
            | PredictionError::Label(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Per-class confidence, always carrying exactly the three tier keys in
/// declared order.
#[derive(Debug, Clone, Serialize)]
pub struct ConfidenceScores {
    #[serde(rename = "Low")]
    pub low: f64,
    #[serde(rename = "Medium")]
    pub medium: f64,
    #[serde(rename = "High")]
    pub high: f64,
}

impl ConfidenceScores {
    pub fn score(&self, tier: RiskTier) -> f64 {
        match tier {
            RiskTier::Low => self.low,
            RiskTier::Medium => self.medium,
            RiskTier::High => self.high,
        }
    }

    pub fn total(&self) -> f64 {
        self.low + self.medium + self.high
    }
}

/// One prediction result as returned to the caller.
#[derive(Debug, Clone, Serialize)]
pub struct Prediction {
    pub prediction: RiskTier,
    #[serde(rename = "confidenceScores")]
    pub confidence_scores: ConfidenceScores,
}

/// Stateless predictor over immutable, training-produced artifacts.
#[derive(Debug, Clone)]
pub struct RiskPredictor {
    tables: RiskTables,
    artifacts: ModelArtifacts,
}

impl RiskPredictor {
    pub fn new(tables: RiskTables, artifacts: ModelArtifacts) -> Self {
        Self { tables, artifacts }
    }

    pub fn artifacts(&self) -> &ModelArtifacts {
        &self.artifacts
    }

    /// Runs the full inference pipeline for one record.
    ///
    /// The transform and alignment never fail for well-typed records, so
    /// the only error sources are artifact-level: a model/schema width
    /// disagreement or a label index outside the codec.
    pub fn predict(&self, record: &SupplierRecord) -> Result<Prediction, PredictionError> {
        let features = engineer_features(record, &self.tables);
        let encoded = encode_features(record, &features);
        let vector = self.artifacts.schema.align(&encoded);

        let (label_index, distribution) = self.artifacts.model.predict(&vector)?;
        let prediction = self.artifacts.codec.decode(label_index)?;

        let mut scores = ConfidenceScores {
            low: 0.0,
            medium: 0.0,
            high: 0.0,
        };
        for (index, tier) in self.artifacts.codec.classes().iter().enumerate() {
            let probability = distribution.get(index).copied().unwrap_or(0.0);
            match tier {
                RiskTier::Low => scores.low = probability,
                RiskTier::Medium => scores.medium = probability,
                RiskTier::High => scores.high = probability,
            }
        }

        Ok(Prediction {
            prediction,
            confidence_scores: scores,
        })
    }
}
