pub mod adapter;
pub mod error;
pub mod provider;
pub mod risk_model;

pub use adapter::{normalize_debt_to_equity, RiskClassifierAdapter};
pub use error::{MLError, MLResult};
pub use provider::{ClassifierLoader, FileModelStore, RiskClassifier, RiskFeatures};
pub use risk_model::{reference_training_set, RiskModel, TrainingSample};

use std::path::PathBuf;

/// Well-known name the trained classifier is stored under.
pub const RISK_MODEL_NAME: &str = "risk_model";

/// Configuration for the classifier artifact store
#[derive(Debug, Clone)]
pub struct MLConfig {
    pub model_dir: PathBuf,
    pub model_name: String,
}

impl Default for MLConfig {
    fn default() -> Self {
        Self {
            model_dir: std::env::var("RISK_MODEL_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from(".")),
            model_name: RISK_MODEL_NAME.to_string(),
        }
    }
}

impl MLConfig {
    pub fn with_model_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.model_dir = dir.into();
        self
    }

    pub fn model_path(&self) -> PathBuf {
        FileModelStore::new(&self.model_dir).path_for(&self.model_name)
    }
}
