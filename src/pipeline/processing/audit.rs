//! Read-only diagnostics over a finished integration run.
//!
//! Coverage measures how much of the raw rent data survived into the
//! integrated set. The homonym check cross-references assigned station codes
//! with master coordinates, because the loose tier can hand a station the
//! rent of its distant namesake and nothing else in the pipeline would
//! notice.

use serde::Serialize;
use std::collections::{HashMap, HashSet};
use std::fmt;

use crate::domain::{IntegratedRecord, MasterRecord, SourceRecord};
use crate::pipeline::processing::matching::pct;

/// Station names duplicated under the same or similar operator naming across
/// distant regions: 福島 (Fukushima/Osaka), 白石 (Miyagi/Hokkaido),
/// 郡山 (Fukushima/Nara).
pub const DEFAULT_HOMONYM_WATCHLIST: &[&str] = &["福島", "白石", "郡山"];

/// How much of the original rent data is represented in the integrated set,
/// measured on the raw (pre-normalization) triples.
#[derive(Debug, Clone, Serialize)]
pub struct CoverageReport {
    pub total: usize,
    pub matched: usize,
    pub unmatched: usize,
    pub top_unmatched_companies: Vec<(String, usize)>,
    pub top_unmatched_lines: Vec<(String, usize)>,
}

impl CoverageReport {
    pub fn match_rate(&self) -> f64 {
        pct(self.matched, self.total)
    }
}

/// Counts raw source triples present among the integrated output's triples.
pub fn coverage(
    raw: &[SourceRecord],
    integrated: &[IntegratedRecord],
    top_n: usize,
) -> CoverageReport {
    let integrated_keys: HashSet<(&str, &str, &str)> = integrated
        .iter()
        .map(|r| (r.company.as_str(), r.line.as_str(), r.station.as_str()))
        .collect();

    let mut unmatched: Vec<&SourceRecord> = Vec::new();
    for record in raw {
        let key = (
            record.company.as_str(),
            record.line.as_str(),
            record.station.as_str(),
        );
        if !integrated_keys.contains(&key) {
            unmatched.push(record);
        }
    }

    CoverageReport {
        total: raw.len(),
        matched: raw.len() - unmatched.len(),
        unmatched: unmatched.len(),
        top_unmatched_companies: top_frequencies(
            unmatched.iter().map(|r| r.company.as_str()),
            top_n,
        ),
        top_unmatched_lines: top_frequencies(unmatched.iter().map(|r| r.line.as_str()), top_n),
    }
}

/// Coarse latitude band; enough resolution to tell Hokkaido from Osaka.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum LatitudeBand {
    Hokkaido,
    TohokuKanto,
    KansaiChubu,
    KyushuShikoku,
    /// Master row carries no coordinates
    Unknown,
}

impl LatitudeBand {
    pub fn from_latitude(latitude: f64) -> Self {
        if latitude > 41.0 {
            LatitudeBand::Hokkaido
        } else if latitude > 36.0 {
            LatitudeBand::TohokuKanto
        } else if latitude > 34.0 {
            LatitudeBand::KansaiChubu
        } else {
            LatitudeBand::KyushuShikoku
        }
    }
}

impl fmt::Display for LatitudeBand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            LatitudeBand::Hokkaido => "Hokkaido",
            LatitudeBand::TohokuKanto => "Tohoku/Kanto",
            LatitudeBand::KansaiChubu => "Kansai/Chubu",
            LatitudeBand::KyushuShikoku => "Kyushu/Shikoku",
            LatitudeBand::Unknown => "Unknown",
        };
        f.write_str(label)
    }
}

/// One watchlisted integrated record with its geographic band.
#[derive(Debug, Clone, Serialize)]
pub struct HomonymFinding {
    pub station: String,
    pub stationcode: String,
    pub line: String,
    pub rent: f64,
    pub latitude: Option<f64>,
    pub band: LatitudeBand,
}

/// Joins watchlisted integrated records to master coordinates by station
/// code. Findings come out grouped in watchlist order so a reader can scan
/// one ambiguous name at a time.
pub fn homonym_risk(
    integrated: &[IntegratedRecord],
    master: &[MasterRecord],
    watchlist: &[String],
) -> Vec<HomonymFinding> {
    let coordinates_by_code: HashMap<&str, Option<f64>> = master
        .iter()
        .map(|m| (m.stationcode.as_str(), m.latitude()))
        .collect();

    let mut findings = Vec::new();
    for name in watchlist {
        for record in integrated.iter().filter(|r| r.station == *name) {
            let latitude = coordinates_by_code
                .get(record.stationcode.as_str())
                .copied()
                .flatten();
            findings.push(HomonymFinding {
                station: record.station.clone(),
                stationcode: record.stationcode.clone(),
                line: record.line.clone(),
                rent: record.rent,
                latitude,
                band: match latitude {
                    Some(lat) => LatitudeBand::from_latitude(lat),
                    None => LatitudeBand::Unknown,
                },
            });
        }
    }
    findings
}

/// Descending frequency count, ties broken alphabetically, truncated to `n`.
pub(crate) fn top_frequencies<'a>(
    values: impl Iterator<Item = &'a str>,
    n: usize,
) -> Vec<(String, usize)> {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for value in values {
        *counts.entry(value).or_insert(0) += 1;
    }
    let mut ranked: Vec<(&str, usize)> = counts.into_iter().collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
    ranked
        .into_iter()
        .take(n)
        .map(|(value, count)| (value.to_string(), count))
        .collect()
}
