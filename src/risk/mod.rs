//! Supplier ESG risk domain: feature engineering, schema alignment,
//! synthetic dataset construction, classifier training and prediction.

pub mod artifacts;
pub mod dataset;
pub mod encoding;
pub mod features;
pub mod labeler;
pub mod labels;
pub mod model;
pub mod predict;
pub mod supplier;
pub mod tables;
pub mod train;

pub use artifacts::ModelArtifacts;
pub use encoding::FeatureSchema;
pub use features::{engineer_features, EngineeredFeatureRecord};
pub use labels::{LabelCodec, RiskTier};
pub use predict::{Prediction, PredictionError, RiskPredictor};
pub use supplier::SupplierRecord;
pub use tables::RiskTables;
