use analysis_core::{NormalizedPeriod, RawStatementRow, ScoreHistory};

pub mod normalizer;
pub mod solvency;

pub use normalizer::{normalize_statements, LineItem, StatementKind};
pub use solvency::{build_history, round_score, score_period, SolvencyComponents};

/// Raw statements in, solvency history out.
pub struct SolvencyAnalysisEngine;

impl SolvencyAnalysisEngine {
    pub fn new() -> Self {
        Self
    }

    pub fn normalize(
        &self,
        balance_sheet: &[RawStatementRow],
        income_statement: &[RawStatementRow],
    ) -> Vec<NormalizedPeriod> {
        normalize_statements(balance_sheet, income_statement)
    }

    /// Pure over its inputs: the same rows always give the same history.
    pub fn score_history(
        &self,
        balance_sheet: &[RawStatementRow],
        income_statement: &[RawStatementRow],
    ) -> ScoreHistory {
        let periods = self.normalize(balance_sheet, income_statement);
        let history = build_history(&periods);
        tracing::debug!(
            "Scored {} of {} normalized periods",
            history.len(),
            periods.len()
        );
        history
    }
}

impl Default for SolvencyAnalysisEngine {
    fn default() -> Self {
        Self::new()
    }
}
