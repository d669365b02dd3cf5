use ml_client::MLConfig;
use std::path::PathBuf;

/// Where the engine finds statements and the classifier artifact.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub statements_dir: PathBuf,
    pub ml: MLConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            statements_dir: std::env::var("STATEMENTS_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("data/statements")),
            ml: MLConfig::default(),
        }
    }
}

impl EngineConfig {
    pub fn with_statements_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.statements_dir = dir.into();
        self
    }

    pub fn with_model_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.ml = self.ml.with_model_dir(dir);
        self
    }
}
