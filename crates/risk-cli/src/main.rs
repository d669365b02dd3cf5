//! risk-analyzer: solvency score history and risk classification for one ticker.
//!
//! Usage:
//!   cargo run -p risk-cli --bin risk-analyzer -- AAPL
//!   cargo run -p risk-cli --bin risk-analyzer -- --symbol MSFT --data-dir data/statements
//!   cargo run -p risk-cli --bin risk-analyzer -- TSLA --export reports/

use analysis_orchestrator::{EngineConfig, RiskEngine};
use anyhow::Context;
use std::path::PathBuf;

mod report;

fn flag_value<'a>(args: &'a [String], flag: &str) -> Option<&'a str> {
    args.iter()
        .position(|a| a == flag)
        .and_then(|i| args.get(i + 1))
        .map(|s| s.as_str())
}

const VALUE_FLAGS: &[&str] = &["--symbol", "--data-dir", "--model-dir", "--export"];

/// First argument that is neither a flag nor a flag's value.
fn positional_symbol(args: &[String]) -> Option<&str> {
    let mut skip_next = false;
    for arg in args.iter().skip(1) {
        if skip_next {
            skip_next = false;
            continue;
        }
        if VALUE_FLAGS.contains(&arg.as_str()) {
            skip_next = true;
            continue;
        }
        if !arg.starts_with("--") {
            return Some(arg.as_str());
        }
    }
    None
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "risk_cli=info,analysis_orchestrator=info,ml_client=info".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = std::env::args().collect();

    let Some(symbol) = flag_value(&args, "--symbol").or_else(|| positional_symbol(&args)) else {
        eprintln!("Usage:");
        eprintln!("  risk-analyzer TICKER                 Analyze one ticker");
        eprintln!("  risk-analyzer --symbol TICKER        Same, explicit flag");
        eprintln!();
        eprintln!("Options:");
        eprintln!("  --data-dir DIR     Statement documents (default: $STATEMENTS_DIR or data/statements)");
        eprintln!("  --model-dir DIR    Classifier artifact directory (default: $RISK_MODEL_DIR or .)");
        eprintln!("  --export PATH      Write the Date,Z_Score history as CSV (file or directory)");
        std::process::exit(1);
    };

    let mut config = EngineConfig::default();
    if let Some(dir) = flag_value(&args, "--data-dir") {
        config = config.with_statements_dir(dir);
    }
    if let Some(dir) = flag_value(&args, "--model-dir") {
        config = config.with_model_dir(dir);
    }
    tracing::debug!(
        "statements_dir={}, model={}",
        config.statements_dir.display(),
        config.ml.model_path().display()
    );

    let engine = RiskEngine::from_config(symbol, &config);
    let report = engine.analyze().await;

    print!("{}", report::render(&report));

    if !report.is_complete() {
        return Ok(());
    }

    if let Some(target) = flag_value(&args, "--export") {
        let path = report::export_path(&PathBuf::from(target), &report.symbol);
        let csv = report.history.to_csv()?;
        std::fs::write(&path, csv)
            .with_context(|| format!("failed to write report to {}", path.display()))?;
        tracing::info!("Exported {} periods to {}", report.history.len(), path.display());
        println!("Report written to {}", path.display());
    }

    Ok(())
}
