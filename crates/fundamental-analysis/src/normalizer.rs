//! Statement normalization.
//!
//! Providers disagree on line-item names and leave many cells empty. Each
//! canonical field carries an ordered list of provider names; the first
//! non-null value wins and anything unresolved is 0. Balance-sheet and
//! income-statement rows are merged by period label before resolution.

use analysis_core::{AnalysisError, NormalizedPeriod, RawStatementRow};
use chrono::NaiveDate;
use serde_json::Value;
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatementKind {
    BalanceSheet,
    IncomeStatement,
}

/// A canonical line item, the statement that owns it, and its candidate names.
#[derive(Debug, Clone, Copy)]
pub struct LineItem {
    pub field: &'static str,
    pub owner: StatementKind,
    pub candidates: &'static [&'static str],
}

pub const TOTAL_ASSETS: LineItem = LineItem {
    field: "total_assets",
    owner: StatementKind::BalanceSheet,
    candidates: &["Total Assets", "Assets"],
};

pub const CURRENT_ASSETS: LineItem = LineItem {
    field: "current_assets",
    owner: StatementKind::BalanceSheet,
    candidates: &["Current Assets", "Total Current Assets"],
};

pub const CURRENT_LIABILITIES: LineItem = LineItem {
    field: "current_liabilities",
    owner: StatementKind::BalanceSheet,
    candidates: &["Current Liabilities", "Total Current Liabilities"],
};

pub const RETAINED_EARNINGS: LineItem = LineItem {
    field: "retained_earnings",
    owner: StatementKind::BalanceSheet,
    candidates: &["Retained Earnings"],
};

pub const EBIT: LineItem = LineItem {
    field: "ebit",
    owner: StatementKind::IncomeStatement,
    candidates: &["EBIT", "Operating Income"],
};

pub const REVENUE: LineItem = LineItem {
    field: "revenue",
    owner: StatementKind::IncomeStatement,
    candidates: &["Total Revenue", "Revenue", "Operating Revenue"],
};

/// First candidate present with a non-null value.
///
/// `Ok(None)` when no candidate is present; `Err` when the winning cell is not a number.
pub fn resolve_field(row: &RawStatementRow, candidates: &[&str]) -> Result<Option<f64>, String> {
    for name in candidates {
        match row.get(name) {
            None | Some(Value::Null) => continue,
            Some(value) => {
                return value
                    .as_f64()
                    .map(Some)
                    .ok_or_else(|| format!("'{}' is not numeric ({})", name, value));
            }
        }
    }
    Ok(None)
}

/// Accepts `YYYY-MM-DD`, optionally followed by a time part.
pub fn parse_period_date(label: &str) -> Result<NaiveDate, AnalysisError> {
    let trimmed = label.trim();
    if let Ok(date) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
        return Ok(date);
    }

    let date_part = trimmed.get(..10);
    let rest = trimmed.get(10..).unwrap_or_default();
    match date_part {
        Some(d) if rest.starts_with('T') || rest.starts_with(' ') => {
            NaiveDate::parse_from_str(d, "%Y-%m-%d")
                .map_err(|e| AnalysisError::malformed(label, format!("bad period date: {}", e)))
        }
        _ => Err(AnalysisError::malformed(label, "period label is not a date")),
    }
}

/// Both statements' rows for one period-end date.
#[derive(Debug, Clone, Copy)]
struct PeriodRows<'a> {
    period_date: NaiveDate,
    label: &'a str,
    balance: Option<&'a RawStatementRow>,
    income: Option<&'a RawStatementRow>,
}

impl<'a> PeriodRows<'a> {
    fn row(&self, kind: StatementKind) -> Option<&'a RawStatementRow> {
        match kind {
            StatementKind::BalanceSheet => self.balance,
            StatementKind::IncomeStatement => self.income,
        }
    }

    /// Owning statement first, then the other one; 0 when nothing resolves.
    fn resolve(&self, item: &LineItem) -> Result<f64, AnalysisError> {
        let other = match item.owner {
            StatementKind::BalanceSheet => StatementKind::IncomeStatement,
            StatementKind::IncomeStatement => StatementKind::BalanceSheet,
        };

        for kind in [item.owner, other] {
            if let Some(row) = self.row(kind) {
                let resolved = resolve_field(row, item.candidates).map_err(|reason| {
                    AnalysisError::malformed(self.label, format!("{}: {}", item.field, reason))
                })?;
                if let Some(value) = resolved {
                    return Ok(value);
                }
            }
        }
        Ok(0.0)
    }
}

/// Merge rows by period-end date, in order of first appearance.
///
/// Labels that spell the same date differently land in one period. Rows whose
/// label is not a date are logged and dropped. A date repeated within one
/// statement keeps its first row.
fn merge_by_period<'a>(
    balance: &'a [RawStatementRow],
    income: &'a [RawStatementRow],
) -> Vec<PeriodRows<'a>> {
    let mut merged: Vec<PeriodRows<'a>> = Vec::new();
    let mut index: HashMap<NaiveDate, usize> = HashMap::new();

    let tagged = balance
        .iter()
        .map(|row| (StatementKind::BalanceSheet, row))
        .chain(income.iter().map(|row| (StatementKind::IncomeStatement, row)));

    for (kind, row) in tagged {
        let label = row.period.trim();
        let period_date = match parse_period_date(label) {
            Ok(date) => date,
            Err(e) => {
                tracing::warn!("Skipping {:?} row: {}", kind, e);
                continue;
            }
        };

        let slot = *index.entry(period_date).or_insert_with(|| {
            merged.push(PeriodRows {
                period_date,
                label,
                balance: None,
                income: None,
            });
            merged.len() - 1
        });

        let entry = &mut merged[slot];
        let target = match kind {
            StatementKind::BalanceSheet => &mut entry.balance,
            StatementKind::IncomeStatement => &mut entry.income,
        };
        if target.is_some() {
            tracing::debug!(
                "Duplicate {:?} row for period {}, keeping the first",
                kind,
                period_date
            );
        } else {
            *target = Some(row);
        }
    }

    merged
}

/// Normalize one merged period. `Ok(None)` means the period has no usable total assets.
fn normalize_period(rows: &PeriodRows<'_>) -> Result<Option<NormalizedPeriod>, AnalysisError> {
    let total_assets = rows.resolve(&TOTAL_ASSETS)?;
    if total_assets <= 0.0 {
        return Ok(None);
    }

    Ok(Some(NormalizedPeriod {
        period_date: rows.period_date,
        total_assets,
        current_assets: rows.resolve(&CURRENT_ASSETS)?,
        current_liabilities: rows.resolve(&CURRENT_LIABILITIES)?,
        ebit: rows.resolve(&EBIT)?,
        revenue: rows.resolve(&REVENUE)?,
        retained_earnings: rows.resolve(&RETAINED_EARNINGS)?,
    }))
}

/// Turn raw statement rows into canonical periods, latest first.
///
/// Returns an empty sequence when either statement has no periods. Periods
/// without positive total assets are dropped silently; malformed periods are
/// logged and dropped.
pub fn normalize_statements(
    balance_sheet: &[RawStatementRow],
    income_statement: &[RawStatementRow],
) -> Vec<NormalizedPeriod> {
    if balance_sheet.is_empty() || income_statement.is_empty() {
        tracing::debug!(
            "Statement data missing (balance sheet: {} periods, income statement: {} periods)",
            balance_sheet.len(),
            income_statement.len()
        );
        return Vec::new();
    }

    let mut periods: Vec<NormalizedPeriod> = Vec::new();
    for rows in merge_by_period(balance_sheet, income_statement) {
        match normalize_period(&rows) {
            Ok(Some(period)) => periods.push(period),
            Ok(None) => {
                tracing::debug!("Skipping period {}: total assets not positive", rows.period_date);
            }
            Err(e) => {
                tracing::warn!("Skipping period {}: {}", rows.period_date, e);
            }
        }
    }

    periods.sort_by(|a, b| b.period_date.cmp(&a.period_date));
    periods
}
