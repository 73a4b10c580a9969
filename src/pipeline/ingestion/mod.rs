//! Dataset loading. Every loader is all-or-nothing: a missing file or
//! malformed structure propagates as an error before the pipeline produces
//! any output.

use std::fs;
use std::path::Path;
use tracing::info;

use crate::domain::{IntegratedRecord, MasterRecord, SourceRecord};
use crate::error::{IntegratorError, Result};

pub fn load_master(path: &Path) -> Result<Vec<MasterRecord>> {
    let records: Vec<MasterRecord> = load_json(path)?;
    info!(count = records.len(), path = %path.display(), "Loaded station master");
    Ok(records)
}

pub fn load_source(path: &Path) -> Result<Vec<SourceRecord>> {
    let records: Vec<SourceRecord> = load_json(path)?;
    info!(count = records.len(), path = %path.display(), "Loaded rent data");
    Ok(records)
}

pub fn load_integrated(path: &Path) -> Result<Vec<IntegratedRecord>> {
    let records: Vec<IntegratedRecord> = load_json(path)?;
    info!(count = records.len(), path = %path.display(), "Loaded integrated data");
    Ok(records)
}

fn load_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<Vec<T>> {
    let content = fs::read_to_string(path).map_err(|e| {
        IntegratorError::Dataset(format!("failed to read '{}': {}", path.display(), e))
    })?;
    serde_json::from_str(&content).map_err(|e| {
        IntegratorError::Dataset(format!("malformed dataset '{}': {}", path.display(), e))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn loads_master_records_from_json_array() {
        let mut file = NamedTempFile::new().unwrap();
        write!(
            file,
            r#"[{{"company": "都営地下鉄", "line": "三田線", "station": "巣鴨",
                 "stationcode": 100, "coordinates": [139.73, 35.73]}}]"#
        )
        .unwrap();

        let records = load_master(file.path()).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].stationcode, "000100");
    }

    #[test]
    fn missing_file_is_an_error() {
        let result = load_source(Path::new("does/not/exist.json"));
        assert!(result.is_err());
    }

    #[test]
    fn malformed_structure_is_an_error() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, r#"{{"not": "an array"}}"#).unwrap();
        assert!(load_source(file.path()).is_err());
    }
}
