use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::error::{MLError, MLResult};
use crate::risk_model::RiskModel;
use crate::MLConfig;

/// Classifier input: the latest solvency score plus the auxiliary ratios.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RiskFeatures {
    pub score: f64,
    pub current_ratio: f64,
    pub debt_to_equity: f64,
    pub revenue_growth: f64,
}

impl RiskFeatures {
    pub const NAMES: [&'static str; 4] = ["z_score", "current_ratio", "debt_to_equity", "revenue_growth"];

    pub fn new(score: f64, current_ratio: f64, debt_to_equity: f64, revenue_growth: f64) -> Self {
        Self {
            score,
            current_ratio,
            debt_to_equity,
            revenue_growth,
        }
    }

    pub fn to_array(&self) -> [f64; 4] {
        [self.score, self.current_ratio, self.debt_to_equity, self.revenue_growth]
    }

    pub fn is_finite(&self) -> bool {
        self.to_array().iter().all(|v| v.is_finite())
    }
}

/// A trained classifier mapping a feature vector to a category label.
///
/// Implementations are read-only after construction so one instance can be
/// shared between analyses.
pub trait RiskClassifier: Send + Sync {
    fn predict(&self, features: &RiskFeatures) -> MLResult<String>;

    fn backend_name(&self) -> &'static str;
}

/// Loads a classifier artifact by name.
pub trait ClassifierLoader: Send + Sync {
    fn load(&self, name: &str) -> MLResult<Arc<dyn RiskClassifier>>;
}

/// Artifact store backed by `<dir>/<name>.json` files.
#[derive(Debug, Clone)]
pub struct FileModelStore {
    dir: PathBuf,
}

impl FileModelStore {
    pub fn new(dir: impl AsRef<Path>) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
        }
    }

    pub fn path_for(&self, name: &str) -> PathBuf {
        self.dir.join(format!("{}.json", name))
    }

    pub fn save(&self, name: &str, model: &RiskModel) -> MLResult<PathBuf> {
        let path = self.path_for(name);
        model.save(&path)?;
        Ok(path)
    }

    pub fn load_model(&self, name: &str) -> MLResult<RiskModel> {
        let path = self.path_for(name);
        if !path.is_file() {
            return Err(MLError::ModelUnavailable(format!(
                "no artifact at {}",
                path.display()
            )));
        }
        RiskModel::load(&path)
    }
}

impl From<&MLConfig> for FileModelStore {
    fn from(config: &MLConfig) -> Self {
        Self::new(&config.model_dir)
    }
}

impl ClassifierLoader for FileModelStore {
    fn load(&self, name: &str) -> MLResult<Arc<dyn RiskClassifier>> {
        let model = self.load_model(name)?;
        tracing::info!(
            "Loaded {} classifier '{}' ({} labels)",
            model.backend_name(),
            name,
            model.centroids.len()
        );
        Ok(Arc::new(model))
    }
}
