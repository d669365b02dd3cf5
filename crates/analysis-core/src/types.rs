use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};
use std::fmt;

/// One reporting period of a raw statement, keyed by line-item name.
///
/// Line-item names differ between providers ("Total Assets" vs "Assets") and
/// values may be null or carry an unexpected type; the normalizer sorts that out.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawStatementRow {
    pub period: String,
    #[serde(default)]
    pub items: BTreeMap<String, Value>,
}

impl RawStatementRow {
    pub fn new(period: impl Into<String>) -> Self {
        Self {
            period: period.into(),
            items: BTreeMap::new(),
        }
    }

    pub fn with_item(mut self, name: &str, value: impl Into<Value>) -> Self {
        self.items.insert(name.to_string(), value.into());
        self
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.items.get(name)
    }
}

/// Point-in-time key-value metadata for an entity (provider naming, e.g. `currentRatio`).
pub type InfoSnapshot = HashMap<String, Value>;

/// Canonical line items for one period. `total_assets` is always > 0.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NormalizedPeriod {
    pub period_date: NaiveDate,
    pub total_assets: f64,
    pub current_assets: f64,
    pub current_liabilities: f64,
    pub ebit: f64,
    pub revenue: f64,
    pub retained_earnings: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoredPeriod {
    pub period_date: NaiveDate,
    pub score: f64,
}

/// Solvency scores ordered latest period first.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ScoreHistory {
    periods: Vec<ScoredPeriod>,
}

impl ScoreHistory {
    pub fn new(periods: Vec<ScoredPeriod>) -> Self {
        Self { periods }
    }

    pub fn is_empty(&self) -> bool {
        self.periods.is_empty()
    }

    pub fn len(&self) -> usize {
        self.periods.len()
    }

    /// The current period, i.e. the first entry.
    pub fn latest(&self) -> Option<&ScoredPeriod> {
        self.periods.first()
    }

    pub fn latest_score(&self) -> Option<f64> {
        self.latest().map(|p| p.score)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ScoredPeriod> {
        self.periods.iter()
    }
}

impl<'a> IntoIterator for &'a ScoreHistory {
    type Item = &'a ScoredPeriod;
    type IntoIter = std::slice::Iter<'a, ScoredPeriod>;

    fn into_iter(self) -> Self::IntoIter {
        self.periods.iter()
    }
}

/// Secondary ratios used only as classifier features.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AuxiliaryRatios {
    pub current_ratio: f64,
    pub debt_to_equity: f64,
    pub revenue_growth: f64,
}

impl AuxiliaryRatios {
    pub const CURRENT_RATIO_KEY: &'static str = "currentRatio";
    pub const DEBT_TO_EQUITY_KEY: &'static str = "debtToEquity";
    pub const REVENUE_GROWTH_KEY: &'static str = "revenueGrowth";

    /// Read the ratios from an info snapshot, falling back to defaults for
    /// absent or non-numeric entries.
    pub fn from_info(info: &InfoSnapshot) -> Self {
        let defaults = Self::default();
        let read = |key: &str, fallback: f64| {
            info.get(key)
                .and_then(|v| v.as_f64())
                .filter(|v| v.is_finite())
                .unwrap_or(fallback)
        };

        Self {
            current_ratio: read(Self::CURRENT_RATIO_KEY, defaults.current_ratio),
            debt_to_equity: read(Self::DEBT_TO_EQUITY_KEY, defaults.debt_to_equity),
            revenue_growth: read(Self::REVENUE_GROWTH_KEY, defaults.revenue_growth),
        }
    }
}

impl Default for AuxiliaryRatios {
    fn default() -> Self {
        Self {
            current_ratio: 1.0,
            debt_to_equity: 0.0,
            revenue_growth: 0.0,
        }
    }
}

/// Fixed interpretation bands for a solvency score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SolvencyZone {
    Safe,
    Grey,
    Distress,
}

impl SolvencyZone {
    pub const SAFE_THRESHOLD: f64 = 3.0;
    pub const DISTRESS_THRESHOLD: f64 = 1.8;

    /// Both bounds are strict: 3.0 is Grey, 1.8 is Distress.
    pub fn from_score(score: f64) -> Self {
        if score > Self::SAFE_THRESHOLD {
            SolvencyZone::Safe
        } else if score > Self::DISTRESS_THRESHOLD {
            SolvencyZone::Grey
        } else {
            SolvencyZone::Distress
        }
    }

    /// Human-readable status for the zone
    pub fn to_label(&self) -> &'static str {
        match self {
            SolvencyZone::Safe => "STRONG",
            SolvencyZone::Grey => "WATCHLIST",
            SolvencyZone::Distress => "DISTRESS",
        }
    }
}

impl fmt::Display for SolvencyZone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.to_label())
    }
}

/// Classifier output, or one of the sentinels used when classification was not possible.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum RiskLabel {
    Category(String),
    NoData,
    ModelNotLoaded,
}

impl RiskLabel {
    pub const NO_DATA: &'static str = "No Data";
    pub const MODEL_NOT_LOADED: &'static str = "Model Not Loaded";

    pub fn as_str(&self) -> &str {
        match self {
            RiskLabel::Category(label) => label,
            RiskLabel::NoData => Self::NO_DATA,
            RiskLabel::ModelNotLoaded => Self::MODEL_NOT_LOADED,
        }
    }

    pub fn is_sentinel(&self) -> bool {
        !matches!(self, RiskLabel::Category(_))
    }
}

impl From<String> for RiskLabel {
    fn from(label: String) -> Self {
        match label.as_str() {
            Self::NO_DATA => RiskLabel::NoData,
            Self::MODEL_NOT_LOADED => RiskLabel::ModelNotLoaded,
            _ => RiskLabel::Category(label),
        }
    }
}

impl From<RiskLabel> for String {
    fn from(label: RiskLabel) -> Self {
        match label {
            RiskLabel::Category(label) => label,
            other => other.as_str().to_string(),
        }
    }
}

impl fmt::Display for RiskLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskAssessment {
    pub label: RiskLabel,
    pub score: f64,
}

impl RiskAssessment {
    pub fn no_data() -> Self {
        Self {
            label: RiskLabel::NoData,
            score: 0.0,
        }
    }

    pub fn model_not_loaded(score: f64) -> Self {
        Self {
            label: RiskLabel::ModelNotLoaded,
            score,
        }
    }

    pub fn classified(label: impl Into<String>, score: f64) -> Self {
        Self {
            label: RiskLabel::Category(label.into()),
            score,
        }
    }
}

/// Everything the presentation layer needs for one analysis round
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskReport {
    pub symbol: String,
    pub history: ScoreHistory,
    pub assessment: RiskAssessment,
}

impl RiskReport {
    /// Incomplete data is an empty history or a non-finite score; nothing
    /// should be charted or tabulated in that case.
    pub fn is_complete(&self) -> bool {
        !self.history.is_empty() && self.assessment.score.is_finite()
    }

    pub fn zone(&self) -> Option<SolvencyZone> {
        self.is_complete()
            .then(|| SolvencyZone::from_score(self.assessment.score))
    }
}
