use async_trait::async_trait;
use crate::{AnalysisError, InfoSnapshot, RawStatementRow};

/// Everything one analysis round reads from a source. Each part fails on its own.
#[derive(Debug)]
pub struct SourceSnapshot {
    pub balance_sheet: Result<Vec<RawStatementRow>, AnalysisError>,
    pub income_statement: Result<Vec<RawStatementRow>, AnalysisError>,
    pub info: Result<InfoSnapshot, AnalysisError>,
}

impl SourceSnapshot {
    /// Every part fails with the same cause.
    pub fn failed(error: AnalysisError) -> Self {
        let message = error.to_string();
        Self {
            balance_sheet: Err(error),
            income_statement: Err(AnalysisError::DataUnavailable(message.clone())),
            info: Err(AnalysisError::DataUnavailable(message)),
        }
    }
}

/// Source of raw financial statements for an entity.
///
/// Implementations own transport concerns (retries, timeouts, rate limits).
/// Rows are returned in whatever order the source keeps them.
#[async_trait]
pub trait StatementSource: Send + Sync {
    async fn balance_sheet(&self, symbol: &str) -> Result<Vec<RawStatementRow>, AnalysisError>;

    async fn income_statement(&self, symbol: &str) -> Result<Vec<RawStatementRow>, AnalysisError>;

    /// Point-in-time key-value snapshot (current ratio, leverage, growth, ...)
    async fn info(&self, symbol: &str) -> Result<InfoSnapshot, AnalysisError>;

    /// All three parts for one round. Sources that keep them in a single
    /// document override this so the parts come from one read.
    async fn snapshot(&self, symbol: &str) -> SourceSnapshot {
        SourceSnapshot {
            balance_sheet: self.balance_sheet(symbol).await,
            income_statement: self.income_statement(symbol).await,
            info: self.info(symbol).await,
        }
    }
}
