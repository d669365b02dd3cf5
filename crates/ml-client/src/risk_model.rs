//! Nearest-centroid risk classifier.
//!
//! Features are standardized with the training mean and (population) standard
//! deviation; each label is represented by the centroid of its standardized
//! samples and a prediction is the label of the closest centroid.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

use crate::error::{MLError, MLResult};
use crate::provider::{RiskClassifier, RiskFeatures};

const FEATURE_COUNT: usize = 4;

#[derive(Debug, Clone, PartialEq)]
pub struct TrainingSample {
    pub features: RiskFeatures,
    pub label: String,
}

impl TrainingSample {
    pub fn new(features: [f64; 4], label: &str) -> Self {
        let [score, current_ratio, debt_to_equity, revenue_growth] = features;
        Self {
            features: RiskFeatures::new(score, current_ratio, debt_to_equity, revenue_growth),
            label: label.to_string(),
        }
    }
}

/// The fixed labelled set the shipped model is trained on.
pub fn reference_training_set() -> Vec<TrainingSample> {
    vec![
        TrainingSample::new([4.5, 3.0, 0.1, 0.2], "Healthy"),
        TrainingSample::new([3.8, 2.5, 0.2, 0.15], "Healthy"),
        TrainingSample::new([1.1, 0.8, 2.5, -0.3], "High Risk"),
        TrainingSample::new([0.5, 0.4, 4.0, -0.5], "High Risk"),
        TrainingSample::new([2.1, 1.5, 0.8, 0.05], "Moderate"),
    ]
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabelCentroid {
    pub label: String,
    /// Centroid in standardized feature space
    pub center: [f64; FEATURE_COUNT],
    pub support: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskModel {
    pub feature_names: Vec<String>,
    pub means: [f64; FEATURE_COUNT],
    pub scales: [f64; FEATURE_COUNT],
    pub centroids: Vec<LabelCentroid>,
    pub trained_at: DateTime<Utc>,
}

impl RiskModel {
    pub fn fit(samples: &[TrainingSample]) -> MLResult<Self> {
        if samples.is_empty() {
            return Err(MLError::InvalidFeatures("no training samples".to_string()));
        }
        if let Some(bad) = samples.iter().find(|s| !s.features.is_finite()) {
            return Err(MLError::InvalidFeatures(format!(
                "non-finite features for label '{}'",
                bad.label
            )));
        }

        let rows: Vec<[f64; FEATURE_COUNT]> = samples.iter().map(|s| s.features.to_array()).collect();
        let n = rows.len() as f64;

        let mut means = [0.0; FEATURE_COUNT];
        let mut scales = [1.0; FEATURE_COUNT];
        for j in 0..FEATURE_COUNT {
            let mean = rows.iter().map(|r| r[j]).sum::<f64>() / n;
            let variance = rows.iter().map(|r| (r[j] - mean).powi(2)).sum::<f64>() / n;
            let sd = variance.sqrt();
            means[j] = mean;
            // Zero-variance features keep scale 1.0.
            if sd > f64::EPSILON {
                scales[j] = sd;
            }
        }

        let mut grouped: BTreeMap<&str, Vec<[f64; FEATURE_COUNT]>> = BTreeMap::new();
        for (sample, row) in samples.iter().zip(&rows) {
            grouped
                .entry(sample.label.as_str())
                .or_default()
                .push(standardize(row, &means, &scales));
        }

        let centroids = grouped
            .into_iter()
            .map(|(label, members)| {
                let mut center = [0.0; FEATURE_COUNT];
                for member in &members {
                    for j in 0..FEATURE_COUNT {
                        center[j] += member[j];
                    }
                }
                for value in center.iter_mut() {
                    *value /= members.len() as f64;
                }
                LabelCentroid {
                    label: label.to_string(),
                    center,
                    support: members.len(),
                }
            })
            .collect();

        Ok(Self {
            feature_names: RiskFeatures::NAMES.iter().map(|s| s.to_string()).collect(),
            means,
            scales,
            centroids,
            trained_at: Utc::now(),
        })
    }

    pub fn labels(&self) -> Vec<&str> {
        self.centroids.iter().map(|c| c.label.as_str()).collect()
    }

    /// Euclidean distance from the features to every centroid, in centroid order.
    pub fn distances(&self, features: &RiskFeatures) -> Vec<(&str, f64)> {
        let point = standardize(&features.to_array(), &self.means, &self.scales);
        self.centroids
            .iter()
            .map(|c| {
                let dist = point
                    .iter()
                    .zip(&c.center)
                    .map(|(a, b)| (a - b).powi(2))
                    .sum::<f64>()
                    .sqrt();
                (c.label.as_str(), dist)
            })
            .collect()
    }

    pub fn save(&self, path: &Path) -> MLResult<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    pub fn load(path: &Path) -> MLResult<Self> {
        let json = std::fs::read_to_string(path)?;
        let model: Self = serde_json::from_str(&json)?;
        model.validate()?;
        Ok(model)
    }

    fn validate(&self) -> MLResult<()> {
        if self.feature_names.len() != FEATURE_COUNT {
            return Err(MLError::InvalidModel(format!(
                "expected {} features, artifact has {}",
                FEATURE_COUNT,
                self.feature_names.len()
            )));
        }
        if self.centroids.is_empty() {
            return Err(MLError::InvalidModel("artifact has no labels".to_string()));
        }
        if self.scales.iter().any(|s| !s.is_finite() || *s <= 0.0) {
            return Err(MLError::InvalidModel("feature scales must be positive".to_string()));
        }
        Ok(())
    }
}

fn standardize(
    row: &[f64; FEATURE_COUNT],
    means: &[f64; FEATURE_COUNT],
    scales: &[f64; FEATURE_COUNT],
) -> [f64; FEATURE_COUNT] {
    let mut out = [0.0; FEATURE_COUNT];
    for j in 0..FEATURE_COUNT {
        out[j] = (row[j] - means[j]) / scales[j];
    }
    out
}

impl RiskClassifier for RiskModel {
    fn predict(&self, features: &RiskFeatures) -> MLResult<String> {
        if !features.is_finite() {
            return Err(MLError::InvalidFeatures(format!("{:?}", features)));
        }

        // Ties resolve to the first centroid (labels are stored sorted).
        self.distances(features)
            .into_iter()
            .fold(None, |best: Option<(&str, f64)>, (label, dist)| match best {
                Some((_, best_dist)) if best_dist <= dist => best,
                _ => Some((label, dist)),
            })
            .map(|(label, _)| label.to_string())
            .ok_or(MLError::ModelNotLoaded)
    }

    fn backend_name(&self) -> &'static str {
        "nearest-centroid"
    }
}
