use analysis_core::{AuxiliaryRatios, RiskAssessment, ScoreHistory};
use std::sync::Arc;

use crate::provider::{RiskClassifier, RiskFeatures};

/// Leverage above this is assumed to be quoted in percent.
pub const DEBT_TO_EQUITY_PERCENT_CUTOFF: f64 = 10.0;

/// Providers report debt-to-equity either as a ratio (2.5) or in percent (250).
pub fn normalize_debt_to_equity(raw: f64) -> f64 {
    if raw > DEBT_TO_EQUITY_PERCENT_CUTOFF {
        raw / 100.0
    } else {
        raw
    }
}

/// Turns the latest solvency score and auxiliary ratios into a risk label.
#[derive(Clone, Default)]
pub struct RiskClassifierAdapter {
    classifier: Option<Arc<dyn RiskClassifier>>,
}

impl RiskClassifierAdapter {
    pub fn new(classifier: Option<Arc<dyn RiskClassifier>>) -> Self {
        Self { classifier }
    }

    pub fn is_model_loaded(&self) -> bool {
        self.classifier.is_some()
    }

    pub fn features(latest_score: f64, ratios: &AuxiliaryRatios) -> RiskFeatures {
        RiskFeatures::new(
            latest_score,
            ratios.current_ratio,
            normalize_debt_to_equity(ratios.debt_to_equity),
            ratios.revenue_growth,
        )
    }

    pub fn assess(&self, history: &ScoreHistory, ratios: &AuxiliaryRatios) -> RiskAssessment {
        let Some(latest_score) = history.latest_score() else {
            return RiskAssessment::no_data();
        };

        let Some(classifier) = &self.classifier else {
            return RiskAssessment::model_not_loaded(latest_score);
        };

        let features = Self::features(latest_score, ratios);
        match classifier.predict(&features) {
            Ok(label) => RiskAssessment::classified(label, latest_score),
            Err(e) => {
                tracing::warn!(
                    "{} classifier failed on {:?}: {}",
                    classifier.backend_name(),
                    features,
                    e
                );
                RiskAssessment::model_not_loaded(latest_score)
            }
        }
    }
}
