//! Tabular export of a score history.
//!
//! The CSV layout is two columns, `Date` and `Z_Score`, one row per period in
//! history order (latest first).

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::{AnalysisError, ScoreHistory, ScoredPeriod};

#[derive(Debug, Serialize, Deserialize)]
struct CsvScoreRow {
    #[serde(rename = "Date")]
    date: NaiveDate,
    #[serde(rename = "Z_Score")]
    z_score: f64,
}

impl ScoreHistory {
    pub fn to_csv(&self) -> Result<String, AnalysisError> {
        let mut writer = csv::WriterBuilder::new()
            .has_headers(true)
            .from_writer(Vec::new());

        // Headers come from the first serialized record; write them by hand so
        // an empty history still yields a valid table.
        if self.is_empty() {
            writer.write_record(["Date", "Z_Score"])?;
        }
        for period in self {
            writer.serialize(CsvScoreRow {
                date: period.period_date,
                z_score: period.score,
            })?;
        }

        let bytes = writer
            .into_inner()
            .map_err(|e| AnalysisError::InvalidData(e.to_string()))?;
        String::from_utf8(bytes).map_err(|e| AnalysisError::InvalidData(e.to_string()))
    }

    pub fn from_csv(csv_data: &str) -> Result<Self, AnalysisError> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .trim(csv::Trim::All)
            .from_reader(csv_data.as_bytes());

        let mut periods = Vec::new();
        for result in reader.deserialize::<CsvScoreRow>() {
            let row = result?;
            periods.push(ScoredPeriod {
                period_date: row.date,
                score: row.z_score,
            });
        }

        Ok(ScoreHistory::new(periods))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn sample_history() -> ScoreHistory {
        ScoreHistory::new(vec![
            ScoredPeriod {
                period_date: NaiveDate::from_ymd_opt(2024, 9, 28).unwrap(),
                score: 7.05,
            },
            ScoredPeriod {
                period_date: NaiveDate::from_ymd_opt(2023, 9, 30).unwrap(),
                score: 2.84,
            },
            ScoredPeriod {
                period_date: NaiveDate::from_ymd_opt(2022, 9, 24).unwrap(),
                score: -0.31,
            },
        ])
    }

    #[test]
    fn test_csv_layout() {
        let csv = sample_history().to_csv().unwrap();
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines[0], "Date,Z_Score");
        assert_eq!(lines[1], "2024-09-28,7.05");
        assert_eq!(lines[3], "2022-09-24,-0.31");
        assert_eq!(lines.len(), 4);
    }

    #[test]
    fn test_csv_round_trip_preserves_order() {
        let history = sample_history();
        let parsed = ScoreHistory::from_csv(&history.to_csv().unwrap()).unwrap();

        assert_eq!(parsed.len(), history.len());
        for (a, b) in parsed.iter().zip(history.iter()) {
            assert_eq!(a.period_date, b.period_date);
            assert_relative_eq!(a.score, b.score);
        }
    }

    #[test]
    fn test_empty_history_exports_header_only() {
        let csv = ScoreHistory::default().to_csv().unwrap();
        assert_eq!(csv.trim(), "Date,Z_Score");
        assert!(ScoreHistory::from_csv(&csv).unwrap().is_empty());
    }

    #[test]
    fn test_from_csv_rejects_bad_date() {
        let result = ScoreHistory::from_csv("Date,Z_Score\nlast year,1.2\n");
        assert!(matches!(result, Err(AnalysisError::Csv(_))));
    }
}
