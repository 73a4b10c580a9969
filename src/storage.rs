//! File-backed and in-memory implementations of the output ports.

use anyhow::{Context, Result};
use csv::WriterBuilder;
use std::fs;
use std::path::PathBuf;
use std::sync::Mutex;
use tracing::debug;

use crate::app::ports::{ExtractSink, IntegratedSink};
use crate::domain::IntegratedRecord;
use crate::pipeline::processing::mismatch::MismatchRow;

/// Writes the integrated dataset as a pretty-printed JSON array.
pub struct JsonIntegratedSink {
    path: PathBuf,
}

impl JsonIntegratedSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl IntegratedSink for JsonIntegratedSink {
    fn write_integrated(&self, records: &[IntegratedRecord]) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(records)?;
        fs::write(&self.path, json)
            .with_context(|| format!("failed to write '{}'", self.path.display()))?;
        debug!(count = records.len(), path = %self.path.display(), "Wrote integrated dataset");
        Ok(())
    }
}

/// Writes the unmatched extract as CSV with a header row.
pub struct CsvExtractSink {
    path: PathBuf,
}

impl CsvExtractSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl ExtractSink for CsvExtractSink {
    fn write_extract(&self, rows: &[MismatchRow]) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let mut writer = WriterBuilder::new()
            .from_path(&self.path)
            .with_context(|| format!("failed to open '{}'", self.path.display()))?;
        for row in rows {
            writer.serialize(row)?;
        }
        writer.flush()?;
        debug!(count = rows.len(), path = %self.path.display(), "Wrote unmatched extract");
        Ok(())
    }
}

/// In-memory sink for tests and dry runs.
#[derive(Default)]
pub struct InMemorySink {
    integrated: Mutex<Vec<IntegratedRecord>>,
    extract: Mutex<Vec<MismatchRow>>,
}

impl InMemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn integrated(&self) -> Vec<IntegratedRecord> {
        self.integrated.lock().unwrap().clone()
    }

    pub fn extract(&self) -> Vec<MismatchRow> {
        self.extract.lock().unwrap().clone()
    }
}

impl IntegratedSink for InMemorySink {
    fn write_integrated(&self, records: &[IntegratedRecord]) -> Result<()> {
        *self.integrated.lock().unwrap() = records.to_vec();
        Ok(())
    }
}

impl ExtractSink for InMemorySink {
    fn write_extract(&self, rows: &[MismatchRow]) -> Result<()> {
        *self.extract.lock().unwrap() = rows.to_vec();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn record(code: &str) -> IntegratedRecord {
        IntegratedRecord {
            stationcode: code.to_string(),
            rent: 9.5,
            company: "東京都".to_string(),
            line: "三田線".to_string(),
            station: "巣鴨".to_string(),
        }
    }

    #[test]
    fn json_sink_writes_an_array() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("integrated.json");
        let sink = JsonIntegratedSink::new(&path);

        sink.write_integrated(&[record("000100")]).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        let parsed: Vec<IntegratedRecord> = serde_json::from_str(&content).unwrap();
        assert_eq!(parsed.len(), 1);
        assert_eq!(parsed[0].stationcode, "000100");
    }

    #[test]
    fn csv_sink_writes_header_and_rows() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("unmatched.csv");
        let sink = CsvExtractSink::new(&path);

        let row = MismatchRow {
            company: "ＪＲ西日本".to_string(),
            line: "ＪＲ神戸線".to_string(),
            station: "三ノ宮".to_string(),
            norm_company: "jr西日本".to_string(),
            norm_line: "神戸線".to_string(),
            norm_station: "三ノ宮".to_string(),
        };
        sink.write_extract(&[row]).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        let mut lines = content.lines();
        assert_eq!(
            lines.next().unwrap(),
            "company,line,station,norm_company,norm_line,norm_station"
        );
        assert!(lines.next().unwrap().contains("jr西日本"));
    }

    #[test]
    fn in_memory_sink_captures_writes() {
        let sink = InMemorySink::new();
        sink.write_integrated(&[record("000100")]).unwrap();
        assert_eq!(sink.integrated().len(), 1);
        assert!(sink.extract().is_empty());
    }
}
