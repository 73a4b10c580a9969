use serde::de::{Deserializer, Error as DeError};
use serde::{Deserialize, Serialize};

/// One row of the canonical station master. Read-only ground truth: loaded
/// once, never mutated by the pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MasterRecord {
    #[serde(alias = "company_name", deserialize_with = "text_or_empty", default)]
    pub company: String,
    #[serde(alias = "line_name", deserialize_with = "text_or_empty", default)]
    pub line: String,
    #[serde(alias = "station_name", deserialize_with = "text_or_empty", default)]
    pub station: String,
    /// Fixed-width zero-padded numeric identifier, unique within the master
    #[serde(deserialize_with = "station_code")]
    pub stationcode: String,
    /// Ordered pair: longitude, latitude. Some master rows lack it.
    #[serde(default)]
    pub coordinates: Option<[f64; 2]>,
}

impl MasterRecord {
    pub fn latitude(&self) -> Option<f64> {
        self.coordinates.map(|c| c[1])
    }
}

/// One row of the rental price table. Carries no station code; attaching one
/// is the job of the pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceRecord {
    #[serde(deserialize_with = "text_or_empty", default)]
    pub company: String,
    #[serde(deserialize_with = "text_or_empty", default)]
    pub line: String,
    #[serde(deserialize_with = "text_or_empty", default)]
    pub station: String,
    pub rent: f64,
}

/// A rent record with its resolved station code. Field order matches the
/// integrated JSON layout. Station codes are unique across an output set.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IntegratedRecord {
    #[serde(deserialize_with = "station_code")]
    pub stationcode: String,
    pub rent: f64,
    pub company: String,
    pub line: String,
    pub station: String,
}

/// Accepts any JSON value for a textual field and degrades non-text to the
/// empty string, so a single malformed field cannot abort a bulk load.
fn text_or_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(match value {
        serde_json::Value::String(s) => s,
        _ => String::new(),
    })
}

/// Station codes arrive as strings or bare numbers depending on the export;
/// both are canonicalized to the 6-character zero-padded form.
fn station_code<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    let raw = match value {
        serde_json::Value::String(s) => s,
        serde_json::Value::Number(n) => n.to_string(),
        other => {
            return Err(D::Error::custom(format!(
                "stationcode must be a string or number, got {}",
                other
            )))
        }
    };
    Ok(format!("{:0>6}", raw.trim()))
}
