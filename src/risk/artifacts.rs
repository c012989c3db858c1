//! Persistence for the trained model artifacts.
//!
//! Three files mirror the three training outputs: the classifier, the
//! frozen column list and the label codec. They are written once by the
//! training pipeline and loaded read-only at serving startup. A missing
//! artifact set is not a startup failure; the serving layer reports it per
//! request instead.

use crate::risk::encoding::FeatureSchema;
use crate::risk::labels::LabelCodec;
use crate::risk::model::DecisionTreeClassifier;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

pub const MODEL_FILE: &str = "esg_risk_model.json";
pub const COLUMNS_FILE: &str = "model_columns.json";
pub const LABEL_CODEC_FILE: &str = "label_encoder.json";

#[derive(Debug, thiserror::Error)]
pub enum ArtifactError {
    #[error("failed to read artifact {path}: {source}")]
    Read {
        path: PathBuf,
        source: io::Error,
    },
    #[error("failed to write artifact {path}: {source}")]
    Write {
        path: PathBuf,
        source: io::Error,
    },
    #[error("artifact {path} is malformed: {source}")]
    Malformed {
        path: PathBuf,
        source: serde_json::Error,
    },
}

/// The trained model plus everything needed to reproduce training-time
/// encoding at serve time.
#[derive(Debug, Clone)]
pub struct ModelArtifacts {
    pub model: DecisionTreeClassifier,
    pub schema: FeatureSchema,
    pub codec: LabelCodec,
}

impl ModelArtifacts {
    /// Writes the three artifact files, creating the directory if needed.
    pub fn save(&self, dir: &Path) -> Result<(), ArtifactError> {
        fs::create_dir_all(dir).map_err(|source| ArtifactError::Write {
            path: dir.to_path_buf(),
            source,
        })?;

        write_json(&dir.join(MODEL_FILE), &self.model)?;
        write_json(&dir.join(COLUMNS_FILE), &self.schema)?;
        write_json(&dir.join(LABEL_CODEC_FILE), &self.codec)?;
        Ok(())
    }

    /// Loads all three artifacts from the directory.
    pub fn load(dir: &Path) -> Result<Self, ArtifactError> {
        Ok(Self {
            model: read_json(&dir.join(MODEL_FILE))?,
            schema: read_json(&dir.join(COLUMNS_FILE))?,
            codec: read_json(&dir.join(LABEL_CODEC_FILE))?,
        })
    }

    /// Startup-friendly load: a missing artifact set yields `Ok(None)`
    /// rather than an error, while corrupt files still fail loudly.
    pub fn load_optional(dir: &Path) -> Result<Option<Self>, ArtifactError> {
        match Self::load(dir) {
            Ok(artifacts) => Ok(Some(artifacts)),
            Err(ArtifactError::Read { ref source, .. })
                if source.kind() == io::ErrorKind::NotFound =>
            {
                Ok(None)
            }
            Err(err) => Err(err),
        }
    }
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<(), ArtifactError> {
    let text = serde_json::to_string_pretty(value).map_err(|source| ArtifactError::Malformed {
        path: path.to_path_buf(),
        source,
    })?;
    fs::write(path, text).map_err(|source| ArtifactError::Write {
        path: path.to_path_buf(),
        source,
    })
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, ArtifactError> {
    let text = fs::read_to_string(path).map_err(|source| ArtifactError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&text).map_err(|source| ArtifactError::Malformed {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::risk::model::DecisionTreeClassifier;

    fn trained_artifacts() -> ModelArtifacts {
        let mut model = DecisionTreeClassifier::new();
        let x = vec![vec![0.0, 1.0], vec![1.0, 0.0], vec![2.0, 2.0]];
        let y = vec![0, 1, 2];
        model.fit(&x, &y, 3).expect("toy model fits");

        ModelArtifacts {
            model,
            schema: FeatureSchema::from_columns(vec!["a".to_string(), "b".to_string()]),
            codec: LabelCodec::fixed(),
        }
    }

    #[test]
    fn save_then_load_round_trips() {
        let dir = tempfile::tempdir().expect("tempdir created");
        let artifacts = trained_artifacts();
        artifacts.save(dir.path()).expect("artifacts save");

        let restored = ModelArtifacts::load(dir.path()).expect("artifacts load");
        assert_eq!(restored.schema, artifacts.schema);
        assert_eq!(restored.codec, artifacts.codec);
        assert_eq!(
            restored.model.predict(&[0.0, 1.0]).expect("predicts"),
            artifacts.model.predict(&[0.0, 1.0]).expect("predicts")
        );
    }

    #[test]
    fn missing_directory_loads_as_none() {
        let dir = tempfile::tempdir().expect("tempdir created");
        let missing = dir.path().join("never-written");
        let loaded = ModelArtifacts::load_optional(&missing).expect("missing set tolerated");
        assert!(loaded.is_none());
    }

    #[test]
    fn partial_artifact_set_loads_as_none() {
        let dir = tempfile::tempdir().expect("tempdir created");
        let artifacts = trained_artifacts();
        artifacts.save(dir.path()).expect("artifacts save");
        std::fs::remove_file(dir.path().join(COLUMNS_FILE)).expect("column file removed");

        let loaded = ModelArtifacts::load_optional(dir.path()).expect("partial set tolerated");
        assert!(loaded.is_none());
    }

    #[test]
    fn corrupt_artifact_fails_loudly() {
        let dir = tempfile::tempdir().expect("tempdir created");
        let artifacts = trained_artifacts();
        artifacts.save(dir.path()).expect("artifacts save");
        std::fs::write(dir.path().join(MODEL_FILE), "not json").expect("file overwritten");

        let err = ModelArtifacts::load_optional(dir.path()).expect_err("corrupt model rejected");
        assert!(matches!(err, ArtifactError::Malformed { .. }));
    }
}
