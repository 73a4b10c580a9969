//! Development aid for alias-table curation.
//!
//! Recomputes normalized strict keys on both sides with the production
//! Normalizer and alias tables, then reports every rent record whose key the
//! master does not contain, with raw and normalized fields side by side. Not
//! part of the resolution path; its output exists to be read by a human
//! hunting for the next alias entry.

use serde::Serialize;
use std::collections::HashSet;

use crate::domain::{MasterRecord, SourceRecord};
use crate::pipeline::processing::alias::AliasTable;
use crate::pipeline::processing::audit::top_frequencies;
use crate::pipeline::processing::matching::{pct, NormalizedFields, StrictKey};

/// One unmatched rent record, raw and normalized, as exported to the extract.
#[derive(Debug, Clone, Serialize)]
pub struct MismatchRow {
    pub company: String,
    pub line: String,
    pub station: String,
    pub norm_company: String,
    pub norm_line: String,
    pub norm_station: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct MismatchReport {
    pub total: usize,
    pub rows: Vec<MismatchRow>,
    pub top_unmatched_companies: Vec<(String, usize)>,
    pub top_unmatched_lines: Vec<(String, usize)>,
}

impl MismatchReport {
    pub fn unmatched(&self) -> usize {
        self.rows.len()
    }

    pub fn mismatch_rate(&self) -> f64 {
        pct(self.rows.len(), self.total)
    }

    /// True when every rent record found a strict master key.
    pub fn is_clean(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Collects the rent records whose normalized strict key is absent from the
/// master key set.
pub fn analyze(
    master: &[MasterRecord],
    source: &[SourceRecord],
    aliases: &AliasTable,
    top_n: usize,
) -> MismatchReport {
    let master_keys: HashSet<StrictKey> = master
        .iter()
        .map(|m| {
            NormalizedFields::from_parts(&m.company, &m.line, &m.station, aliases).strict_key()
        })
        .collect();

    let mut rows = Vec::new();
    for record in source {
        let normalized =
            NormalizedFields::from_parts(&record.company, &record.line, &record.station, aliases);
        if !master_keys.contains(&normalized.strict_key()) {
            rows.push(MismatchRow {
                company: record.company.clone(),
                line: record.line.clone(),
                station: record.station.clone(),
                norm_company: normalized.company,
                norm_line: normalized.line,
                norm_station: normalized.station,
            });
        }
    }

    MismatchReport {
        total: source.len(),
        top_unmatched_companies: top_frequencies(rows.iter().map(|r| r.company.as_str()), top_n),
        top_unmatched_lines: top_frequencies(rows.iter().map(|r| r.line.as_str()), top_n),
        rows,
    }
}
