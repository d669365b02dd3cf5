use analysis_core::{
    AuxiliaryRatios, RawStatementRow, RiskAssessment, RiskReport, ScoreHistory, StatementSource,
};
use fundamental_analysis::SolvencyAnalysisEngine;
use ml_client::{ClassifierLoader, FileModelStore, RiskClassifier, RiskClassifierAdapter};
use std::sync::Arc;

pub mod config;
pub mod source;

pub use config::EngineConfig;
pub use source::{JsonDirectorySource, StatementDocument, StaticSource};

/// Load a classifier, downgrading any failure to "no model".
pub fn load_classifier(loader: &dyn ClassifierLoader, name: &str) -> Option<Arc<dyn RiskClassifier>> {
    match loader.load(name) {
        Ok(classifier) => Some(classifier),
        Err(e) => {
            tracing::warn!("Risk classifier '{}' unavailable: {}", name, e);
            None
        }
    }
}

/// Per-entity facade over the statement source, the solvency scorer and the
/// risk classifier.
///
/// Every query goes back to the source; nothing is cached between calls and
/// source failures never reach the caller.
pub struct RiskEngine {
    symbol: String,
    source: Arc<dyn StatementSource>,
    solvency: SolvencyAnalysisEngine,
    classifier: RiskClassifierAdapter,
}

impl RiskEngine {
    /// Build an engine, loading the well-known classifier artifact once.
    pub fn new(symbol: &str, source: Arc<dyn StatementSource>, loader: &dyn ClassifierLoader) -> Self {
        let classifier = load_classifier(loader, ml_client::RISK_MODEL_NAME);
        Self::with_classifier(symbol, source, classifier)
    }

    /// Build an engine around an already loaded (possibly shared) classifier.
    pub fn with_classifier(
        symbol: &str,
        source: Arc<dyn StatementSource>,
        classifier: Option<Arc<dyn RiskClassifier>>,
    ) -> Self {
        Self {
            symbol: symbol.trim().to_uppercase(),
            source,
            solvency: SolvencyAnalysisEngine::new(),
            classifier: RiskClassifierAdapter::new(classifier),
        }
    }

    pub fn from_config(symbol: &str, config: &EngineConfig) -> Self {
        let source = Arc::new(JsonDirectorySource::new(&config.statements_dir));
        let store = FileModelStore::from(&config.ml);
        let classifier = load_classifier(&store, &config.ml.model_name);
        Self::with_classifier(symbol, source, classifier)
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn is_model_loaded(&self) -> bool {
        self.classifier.is_model_loaded()
    }

    pub async fn get_history(&self) -> ScoreHistory {
        let (balance_sheet, income_statement, _) = self.fetch_round().await;
        self.solvency.score_history(&balance_sheet, &income_statement)
    }

    pub async fn get_assessment(&self) -> RiskAssessment {
        self.analyze().await.assessment
    }

    /// One full round: history plus assessment from a single fetch.
    pub async fn analyze(&self) -> RiskReport {
        tracing::info!("Starting solvency analysis for {}", self.symbol);

        let (balance_sheet, income_statement, ratios) = self.fetch_round().await;

        let history = self.solvency.score_history(&balance_sheet, &income_statement);
        let assessment = self.classifier.assess(&history, &ratios);

        tracing::info!(
            "Finished analysis for {}: {} periods, latest score {}, label '{}'",
            self.symbol,
            history.len(),
            assessment.score,
            assessment.label
        );

        RiskReport {
            symbol: self.symbol.clone(),
            history,
            assessment,
        }
    }

    /// One snapshot from the source; each failed part degrades to empty data.
    async fn fetch_round(&self) -> (Vec<RawStatementRow>, Vec<RawStatementRow>, AuxiliaryRatios) {
        let snapshot = self.source.snapshot(&self.symbol).await;

        let balance_sheet = snapshot.balance_sheet.unwrap_or_else(|e| {
            tracing::warn!("Balance sheet unavailable for {}: {}", self.symbol, e);
            Vec::new()
        });
        let income_statement = snapshot.income_statement.unwrap_or_else(|e| {
            tracing::warn!("Income statement unavailable for {}: {}", self.symbol, e);
            Vec::new()
        });
        let ratios = match snapshot.info {
            Ok(info) => AuxiliaryRatios::from_info(&info),
            Err(e) => {
                tracing::warn!(
                    "Info snapshot unavailable for {}, using default ratios: {}",
                    self.symbol,
                    e
                );
                AuxiliaryRatios::default()
            }
        };

        (balance_sheet, income_statement, ratios)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use analysis_core::{AnalysisError, InfoSnapshot, RiskLabel, SolvencyZone};
    use async_trait::async_trait;
    use ml_client::{MLError, MLResult, RiskFeatures};
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    struct StubClassifier {
        seen: Mutex<Vec<RiskFeatures>>,
    }

    impl RiskClassifier for StubClassifier {
        fn predict(&self, features: &RiskFeatures) -> MLResult<String> {
            self.seen.lock().unwrap().push(*features);
            Ok(if features.score > 3.0 { "Healthy" } else { "Moderate" }.to_string())
        }

        fn backend_name(&self) -> &'static str {
            "stub"
        }
    }

    struct StubLoader {
        available: bool,
    }

    impl ClassifierLoader for StubLoader {
        fn load(&self, name: &str) -> MLResult<Arc<dyn RiskClassifier>> {
            assert_eq!(name, "risk_model");
            if self.available {
                Ok(Arc::new(StubClassifier {
                    seen: Mutex::new(Vec::new()),
                }))
            } else {
                Err(MLError::ModelUnavailable("no artifact".to_string()))
            }
        }
    }

    /// Source that fails every call.
    struct OfflineSource;

    #[async_trait]
    impl StatementSource for OfflineSource {
        async fn balance_sheet(&self, _symbol: &str) -> Result<Vec<RawStatementRow>, AnalysisError> {
            Err(AnalysisError::DataUnavailable("offline".to_string()))
        }

        async fn income_statement(&self, _symbol: &str) -> Result<Vec<RawStatementRow>, AnalysisError> {
            Err(AnalysisError::DataUnavailable("offline".to_string()))
        }

        async fn info(&self, _symbol: &str) -> Result<InfoSnapshot, AnalysisError> {
            Err(AnalysisError::DataUnavailable("offline".to_string()))
        }
    }

    /// Counts every statement call it forwards.
    struct CountingSource {
        inner: StaticSource,
        calls: AtomicUsize,
    }

    #[async_trait]
    impl StatementSource for CountingSource {
        async fn balance_sheet(&self, symbol: &str) -> Result<Vec<RawStatementRow>, AnalysisError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.inner.balance_sheet(symbol).await
        }

        async fn income_statement(&self, symbol: &str) -> Result<Vec<RawStatementRow>, AnalysisError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.inner.income_statement(symbol).await
        }

        async fn info(&self, symbol: &str) -> Result<InfoSnapshot, AnalysisError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.inner.info(symbol).await
        }
    }

    fn scenario_a_document() -> StatementDocument {
        let mut info = InfoSnapshot::new();
        info.insert("currentRatio".to_string(), json!(2.5));
        info.insert("debtToEquity".to_string(), json!(150.0));
        info.insert("revenueGrowth".to_string(), json!(0.08));

        StatementDocument {
            balance_sheet: vec![
                RawStatementRow::new("2022-12-31")
                    .with_item("Total Assets", 900.0)
                    .with_item("Current Assets", 600.0)
                    .with_item("Current Liabilities", 150.0)
                    .with_item("Retained Earnings", 500.0),
                RawStatementRow::new("2023-12-31")
                    .with_item("Total Assets", 1000.0)
                    .with_item("Current Assets", 500.0)
                    .with_item("Current Liabilities", 200.0)
                    .with_item("Retained Earnings", 300.0),
            ],
            income_statement: vec![
                RawStatementRow::new("2023-12-31")
                    .with_item("EBIT", 150.0)
                    .with_item("Total Revenue", 900.0),
                RawStatementRow::new("2022-12-31")
                    .with_item("EBIT", 200.0)
                    .with_item("Total Revenue", 1000.0),
            ],
            info,
        }
    }

    fn source() -> Arc<dyn StatementSource> {
        Arc::new(
            StaticSource::new()
                .with_document("ACME", scenario_a_document())
                .with_document("EMPTY", StatementDocument::default()),
        )
    }

    #[tokio::test]
    async fn test_scenario_a_history_and_assessment() {
        let engine = RiskEngine::new("acme", source(), &StubLoader { available: true });
        assert_eq!(engine.symbol(), "ACME");
        assert!(engine.is_model_loaded());

        let history = engine.get_history().await;
        assert_eq!(history.len(), 2);
        assert_eq!(history.latest_score(), Some(2.84));
        assert_eq!(history.latest().unwrap().period_date.to_string(), "2023-12-31");

        let assessment = engine.get_assessment().await;
        assert_eq!(assessment, RiskAssessment::classified("Moderate", 2.84));
        assert_eq!(SolvencyZone::from_score(assessment.score), SolvencyZone::Grey);
    }

    #[tokio::test]
    async fn test_classifier_receives_normalized_features() {
        let stub = Arc::new(StubClassifier {
            seen: Mutex::new(Vec::new()),
        });
        let shared: Arc<dyn RiskClassifier> = stub.clone();
        let engine = RiskEngine::with_classifier("ACME", source(), Some(shared));

        engine.get_assessment().await;

        let seen = stub.seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].score, 2.84);
        assert_eq!(seen[0].current_ratio, 2.5);
        assert_eq!(seen[0].debt_to_equity, 1.5);
        assert_eq!(seen[0].revenue_growth, 0.08);
    }

    #[tokio::test]
    async fn test_scenario_b_empty_statements() {
        let engine = RiskEngine::new("EMPTY", source(), &StubLoader { available: true });

        assert!(engine.get_history().await.is_empty());
        assert_eq!(engine.get_assessment().await, RiskAssessment::no_data());

        let report = engine.analyze().await;
        assert!(!report.is_complete());
        assert_eq!(report.zone(), None);
    }

    #[tokio::test]
    async fn test_scenario_c_model_missing() {
        let engine = RiskEngine::new("ACME", source(), &StubLoader { available: false });
        assert!(!engine.is_model_loaded());

        let report = engine.analyze().await;
        assert_eq!(report.assessment.label, RiskLabel::ModelNotLoaded);
        assert_eq!(report.assessment.score, 2.84);
        assert!(report.is_complete());
        assert_eq!(report.history.len(), 2);
        assert!(report.history.to_csv().unwrap().starts_with("Date,Z_Score"));
    }

    #[tokio::test]
    async fn test_unknown_and_offline_entities_yield_no_data() {
        let unknown = RiskEngine::new("ZZZZ", source(), &StubLoader { available: true });
        assert!(unknown.get_history().await.is_empty());
        assert_eq!(unknown.get_assessment().await, RiskAssessment::no_data());

        let offline = RiskEngine::new("ACME", Arc::new(OfflineSource), &StubLoader { available: true });
        let report = offline.analyze().await;
        assert!(report.history.is_empty());
        assert_eq!(report.assessment, RiskAssessment::no_data());
    }

    #[tokio::test]
    async fn test_analyze_reads_each_part_once() {
        let source = Arc::new(CountingSource {
            inner: StaticSource::new().with_document("ACME", scenario_a_document()),
            calls: AtomicUsize::new(0),
        });
        let engine = RiskEngine::with_classifier("ACME", source.clone(), None);

        let report = engine.analyze().await;
        assert_eq!(report.history.latest_score(), Some(2.84));
        assert_eq!(source.calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_history_is_idempotent() {
        let engine = RiskEngine::new("ACME", source(), &StubLoader { available: false });
        let first = engine.get_history().await;
        let second = engine.get_history().await;
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_classifier_shared_across_engines() {
        let classifier = load_classifier(&StubLoader { available: true }, "risk_model");
        let a = RiskEngine::with_classifier("ACME", source(), classifier.clone());
        let b = RiskEngine::with_classifier("EMPTY", source(), classifier);

        let (ra, rb) = tokio::join!(a.analyze(), b.analyze());
        assert_eq!(ra.assessment.label, RiskLabel::Category("Moderate".to_string()));
        assert_eq!(rb.assessment.label, RiskLabel::NoData);
    }

    #[tokio::test]
    async fn test_from_config_with_trained_model() {
        let statements = tempfile::tempdir().unwrap();
        let models = tempfile::tempdir().unwrap();
        std::fs::write(
            statements.path().join("ACME.json"),
            serde_json::to_string(&scenario_a_document()).unwrap(),
        )
        .unwrap();
        let model = ml_client::RiskModel::fit(&ml_client::reference_training_set()).unwrap();
        FileModelStore::new(models.path())
            .save(ml_client::RISK_MODEL_NAME, &model)
            .unwrap();

        let config = EngineConfig::default()
            .with_statements_dir(statements.path())
            .with_model_dir(models.path());
        let engine = RiskEngine::from_config("ACME", &config);
        assert!(engine.is_model_loaded());

        let report = engine.analyze().await;
        assert_eq!(report.history.latest_score(), Some(2.84));
        assert!(!report.assessment.label.is_sentinel());
    }
}
