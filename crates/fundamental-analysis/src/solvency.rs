use analysis_core::{AnalysisError, NormalizedPeriod, ScoreHistory, ScoredPeriod};

pub const WORKING_CAPITAL_WEIGHT: f64 = 1.2;
pub const RETAINED_EARNINGS_WEIGHT: f64 = 1.4;
pub const OPERATING_RETURN_WEIGHT: f64 = 3.3;
pub const STABILITY_WEIGHT: f64 = 0.6;
pub const ASSET_TURNOVER_WEIGHT: f64 = 1.0;

/// Stands in for the market-value leverage ratio of the classical model.
pub const STABILITY_TERM: f64 = 1.1;

/// The five sub-ratios behind a solvency score.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SolvencyComponents {
    /// (current assets - current liabilities) / total assets
    pub working_capital: f64,
    /// retained earnings / total assets
    pub retained_earnings: f64,
    /// EBIT / total assets
    pub operating_return: f64,
    pub stability: f64,
    /// revenue / total assets
    pub asset_turnover: f64,
}

impl SolvencyComponents {
    pub fn from_period(period: &NormalizedPeriod) -> Self {
        let ta = period.total_assets;
        Self {
            working_capital: (period.current_assets - period.current_liabilities) / ta,
            retained_earnings: period.retained_earnings / ta,
            operating_return: period.ebit / ta,
            stability: STABILITY_TERM,
            asset_turnover: period.revenue / ta,
        }
    }

    /// Unrounded weighted sum.
    pub fn score(&self) -> f64 {
        (WORKING_CAPITAL_WEIGHT * self.working_capital)
            + (RETAINED_EARNINGS_WEIGHT * self.retained_earnings)
            + (OPERATING_RETURN_WEIGHT * self.operating_return)
            + (STABILITY_WEIGHT * self.stability)
            + (ASSET_TURNOVER_WEIGHT * self.asset_turnover)
    }
}

/// Two decimals, half away from zero. Magnitudes too large to scale are
/// already integral and come back unchanged.
pub fn round_score(score: f64) -> f64 {
    let scaled = score * 100.0;
    if scaled.is_finite() {
        scaled.round() / 100.0
    } else {
        score
    }
}

/// Score one period. Non-finite results are reported as degenerate.
pub fn score_period(period: &NormalizedPeriod) -> Result<ScoredPeriod, AnalysisError> {
    let raw = SolvencyComponents::from_period(period).score();
    if !raw.is_finite() {
        return Err(AnalysisError::DegenerateScore(period.period_date.to_string()));
    }

    Ok(ScoredPeriod {
        period_date: period.period_date,
        score: round_score(raw),
    })
}

/// Score every period independently, keeping input order and dropping degenerate scores.
pub fn build_history(periods: &[NormalizedPeriod]) -> ScoreHistory {
    let scored = periods
        .iter()
        .filter_map(|period| match score_period(period) {
            Ok(scored) => Some(scored),
            Err(e) => {
                tracing::debug!("Excluding period from history: {}", e);
                None
            }
        })
        .collect();

    ScoreHistory::new(scored)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use chrono::NaiveDate;

    fn scenario_a() -> NormalizedPeriod {
        NormalizedPeriod {
            period_date: NaiveDate::from_ymd_opt(2023, 12, 31).unwrap(),
            total_assets: 1000.0,
            current_assets: 500.0,
            current_liabilities: 200.0,
            ebit: 150.0,
            revenue: 900.0,
            retained_earnings: 300.0,
        }
    }

    #[test]
    fn test_components() {
        let c = SolvencyComponents::from_period(&scenario_a());
        assert_relative_eq!(c.working_capital, 0.3);
        assert_relative_eq!(c.retained_earnings, 0.3);
        assert_relative_eq!(c.operating_return, 0.15);
        assert_relative_eq!(c.stability, 1.1);
        assert_relative_eq!(c.asset_turnover, 0.9);
        assert_relative_eq!(c.score(), 2.835, epsilon = 1e-12);
    }

    #[test]
    fn test_scenario_a_rounds_up() {
        let scored = score_period(&scenario_a()).unwrap();
        assert_eq!(scored.score, 2.84);
        assert_eq!(scored.period_date, NaiveDate::from_ymd_opt(2023, 12, 31).unwrap());
    }

    #[test]
    fn test_round_score() {
        assert_eq!(round_score(1.234), 1.23);
        assert_eq!(round_score(-0.305), -0.31);
        assert_eq!(round_score(3.0), 3.0);
    }

    #[test]
    fn test_empty_balance_sheet_scores_stability_only() {
        let period = NormalizedPeriod {
            current_assets: 0.0,
            current_liabilities: 0.0,
            ebit: 0.0,
            revenue: 0.0,
            retained_earnings: 0.0,
            ..scenario_a()
        };
        assert_eq!(score_period(&period).unwrap().score, 0.66);
    }

    #[test]
    fn test_degenerate_score_is_excluded() {
        let overflow = NormalizedPeriod {
            period_date: NaiveDate::from_ymd_opt(2022, 12, 31).unwrap(),
            total_assets: 1e-300,
            revenue: 1e300,
            ..scenario_a()
        };
        assert!(matches!(
            score_period(&overflow),
            Err(AnalysisError::DegenerateScore(_))
        ));

        let history = build_history(&[scenario_a(), overflow]);
        assert_eq!(history.len(), 1);
        assert_eq!(history.latest_score(), Some(2.84));
    }

    #[test]
    fn test_huge_finite_score_is_kept() {
        let huge = NormalizedPeriod {
            total_assets: 1.0,
            revenue: 1e307,
            ..scenario_a()
        };
        assert_eq!(round_score(1e307), 1e307);
        assert_eq!(score_period(&huge).unwrap().score, 1e307);
    }

    #[test]
    fn test_history_keeps_input_order() {
        let older = NormalizedPeriod {
            period_date: NaiveDate::from_ymd_opt(2022, 12, 31).unwrap(),
            ebit: -50.0,
            ..scenario_a()
        };
        let history = build_history(&[scenario_a(), older]);
        let dates: Vec<_> = history.iter().map(|p| p.period_date).collect();
        assert_eq!(dates, vec![scenario_a().period_date, older.period_date]);
        let scores: Vec<f64> = history.iter().map(|p| p.score).collect();
        assert!(scores[1] < scores[0]);
    }
}
