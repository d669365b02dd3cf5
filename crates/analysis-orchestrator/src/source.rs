use analysis_core::{AnalysisError, InfoSnapshot, RawStatementRow, SourceSnapshot, StatementSource};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Everything a source knows about one entity.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StatementDocument {
    #[serde(default)]
    pub balance_sheet: Vec<RawStatementRow>,
    #[serde(default)]
    pub income_statement: Vec<RawStatementRow>,
    #[serde(default)]
    pub info: InfoSnapshot,
}

/// Identifiers become file names; anything that could escape the directory is rejected.
fn validate_symbol(symbol: &str) -> Result<String, AnalysisError> {
    let symbol = symbol.trim().to_uppercase();
    let valid = !symbol.is_empty()
        && !symbol.starts_with('.')
        && symbol
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_' | '^' | '='));
    if valid {
        Ok(symbol)
    } else {
        Err(AnalysisError::DataUnavailable(format!("unrecognized identifier '{}'", symbol)))
    }
}

/// Reads `<dir>/<SYMBOL>.json` statement documents.
#[derive(Debug, Clone)]
pub struct JsonDirectorySource {
    dir: PathBuf,
}

impl JsonDirectorySource {
    pub fn new(dir: impl AsRef<Path>) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
        }
    }

    pub fn path_for(&self, symbol: &str) -> Result<PathBuf, AnalysisError> {
        Ok(self.dir.join(format!("{}.json", validate_symbol(symbol)?)))
    }

    pub async fn read_document(&self, symbol: &str) -> Result<StatementDocument, AnalysisError> {
        let path = self.path_for(symbol)?;
        let json = match tokio::fs::read_to_string(&path).await {
            Ok(json) => json,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(AnalysisError::DataUnavailable(format!(
                    "no statements for {} at {}",
                    symbol,
                    path.display()
                )));
            }
            Err(e) => return Err(e.into()),
        };
        Ok(serde_json::from_str(&json)?)
    }
}

#[async_trait]
impl StatementSource for JsonDirectorySource {
    async fn balance_sheet(&self, symbol: &str) -> Result<Vec<RawStatementRow>, AnalysisError> {
        Ok(self.read_document(symbol).await?.balance_sheet)
    }

    async fn income_statement(&self, symbol: &str) -> Result<Vec<RawStatementRow>, AnalysisError> {
        Ok(self.read_document(symbol).await?.income_statement)
    }

    async fn info(&self, symbol: &str) -> Result<InfoSnapshot, AnalysisError> {
        Ok(self.read_document(symbol).await?.info)
    }

    async fn snapshot(&self, symbol: &str) -> SourceSnapshot {
        match self.read_document(symbol).await {
            Ok(document) => SourceSnapshot {
                balance_sheet: Ok(document.balance_sheet),
                income_statement: Ok(document.income_statement),
                info: Ok(document.info),
            },
            Err(e) => SourceSnapshot::failed(e),
        }
    }
}

/// In-memory source keyed by upper-cased symbol.
#[derive(Debug, Clone, Default)]
pub struct StaticSource {
    documents: HashMap<String, StatementDocument>,
}

impl StaticSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_document(mut self, symbol: &str, document: StatementDocument) -> Self {
        self.insert(symbol, document);
        self
    }

    pub fn insert(&mut self, symbol: &str, document: StatementDocument) {
        self.documents.insert(symbol.trim().to_uppercase(), document);
    }

    fn document(&self, symbol: &str) -> Result<&StatementDocument, AnalysisError> {
        self.documents
            .get(&symbol.trim().to_uppercase())
            .ok_or_else(|| AnalysisError::DataUnavailable(format!("no statements for {}", symbol)))
    }
}

#[async_trait]
impl StatementSource for StaticSource {
    async fn balance_sheet(&self, symbol: &str) -> Result<Vec<RawStatementRow>, AnalysisError> {
        Ok(self.document(symbol)?.balance_sheet.clone())
    }

    async fn income_statement(&self, symbol: &str) -> Result<Vec<RawStatementRow>, AnalysisError> {
        Ok(self.document(symbol)?.income_statement.clone())
    }

    async fn info(&self, symbol: &str) -> Result<InfoSnapshot, AnalysisError> {
        Ok(self.document(symbol)?.info.clone())
    }
}
