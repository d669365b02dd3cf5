use analysis_core::{RiskReport, SolvencyZone};
use std::fmt::Write;
use std::path::{Path, PathBuf};

pub fn verdict(symbol: &str, zone: SolvencyZone) -> String {
    match zone {
        SolvencyZone::Distress => format!(
            "{} shows high financial distress. Check upcoming debt maturity dates.",
            symbol
        ),
        SolvencyZone::Grey => format!(
            "{} is in a stable but cautious position. Monitor EBIT margins closely.",
            symbol
        ),
        SolvencyZone::Safe => format!(
            "{} is financially robust. A high Z-Score suggests a strong balance sheet.",
            symbol
        ),
    }
}

/// Text rendering of a report. Incomplete data gets a notice and no table.
pub fn render(report: &RiskReport) -> String {
    let mut out = String::new();

    let Some(zone) = report.zone() else {
        let _ = writeln!(out, "Incomplete data for {}", report.symbol);
        let _ = writeln!(
            out,
            "The source could not provide the required balance sheet items. \
             This often happens with very new companies or unsupported tickers."
        );
        return out;
    };

    let _ = writeln!(out, "Solvency risk analysis: {}", report.symbol);
    let _ = writeln!(out, "  Altman Z-Score:          {:.2}", report.assessment.score);
    let _ = writeln!(out, "  ML risk classification:  {}", report.assessment.label);
    let _ = writeln!(out, "  Financial status:        {}", zone);
    let _ = writeln!(out);
    let _ = writeln!(out, "  {:<12} {:>8}", "Date", "Z_Score");
    for period in &report.history {
        let _ = writeln!(out, "  {:<12} {:>8.2}", period.period_date.to_string(), period.score);
    }
    let _ = writeln!(out);
    let _ = writeln!(out, "Quick verdict: {}", verdict(&report.symbol, zone));
    out
}

/// A directory target gets the default `<SYMBOL>_risk_report.csv` file name.
pub fn export_path(target: &Path, symbol: &str) -> PathBuf {
    if target.is_dir() {
        target.join(format!("{}_risk_report.csv", symbol))
    } else {
        target.to_path_buf()
    }
}
