//! train-risk-model: fit the risk classifier on the reference samples and store it.
//!
//! Usage:
//!   cargo run -p risk-cli --bin train-risk-model
//!   cargo run -p risk-cli --bin train-risk-model -- --model-dir models/

use anyhow::Context;
use ml_client::{reference_training_set, FileModelStore, MLConfig, RiskClassifier, RiskModel};

fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "train_risk_model=info,ml_client=info".into()),
        )
        .init();

    let args: Vec<String> = std::env::args().collect();
    let mut config = MLConfig::default();
    if let Some(dir) = args
        .iter()
        .position(|a| a == "--model-dir")
        .and_then(|i| args.get(i + 1))
    {
        config = config.with_model_dir(dir);
    }

    let samples = reference_training_set();
    let model = RiskModel::fit(&samples).context("failed to fit risk model")?;

    let correct = samples
        .iter()
        .filter(|s| model.predict(&s.features).ok().as_deref() == Some(s.label.as_str()))
        .count();
    tracing::info!(
        "Fitted {} on {} samples, labels {:?}, training accuracy {}/{}",
        model.backend_name(),
        samples.len(),
        model.labels(),
        correct,
        samples.len()
    );

    let path = FileModelStore::from(&config)
        .save(&config.model_name, &model)
        .with_context(|| format!("failed to write {}", config.model_path().display()))?;

    println!("Risk model written to {}", path.display());
    Ok(())
}
