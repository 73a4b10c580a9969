//! Two-tier join of rent records against the station master.
//!
//! Tier 1 joins on the strict (operator, line, station) key; only records the
//! strict tier leaves unmatched fall through to the loose (operator, station)
//! key, which deliberately ignores the line and so can fan out to several
//! candidates. One-to-many collisions are typed outcomes here, never errors.

use serde::Serialize;
use std::collections::HashMap;

use crate::domain::{MasterRecord, SourceRecord};
use crate::pipeline::processing::alias::{AliasKind, AliasTable};
use crate::pipeline::processing::normalize::{normalize, normalize_line};

/// Join fields of one record after normalization and alias resolution.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NormalizedFields {
    pub company: String,
    pub line: String,
    pub station: String,
}

impl NormalizedFields {
    pub fn from_parts(company: &str, line: &str, station: &str, aliases: &AliasTable) -> Self {
        Self {
            company: aliases.resolve(AliasKind::Operator, &normalize(company)),
            line: aliases.resolve(AliasKind::Line, &normalize_line(line)),
            station: normalize(station),
        }
    }

    pub fn strict_key(&self) -> StrictKey {
        StrictKey(
            self.company.clone(),
            self.line.clone(),
            self.station.clone(),
        )
    }

    pub fn loose_key(&self) -> LooseKey {
        LooseKey(self.company.clone(), self.station.clone())
    }
}

/// Normalized (operator, line, station) triple: the high-confidence key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct StrictKey(pub String, pub String, pub String);

/// Normalized (operator, station) pair: the fallback key, line ignored.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LooseKey(pub String, pub String);

/// Which matching pass produced a candidate set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum MatchTier {
    Strict,
    Loose,
}

/// Per-record join result. Candidate values are indices into the master
/// slice, sorted by station code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MatchOutcome {
    /// Exactly one master row shares the strict key
    StrictUnique(usize),
    /// The master itself holds duplicate strict keys; surfaced, not resolved
    StrictAmbiguous(Vec<usize>),
    /// Exactly one master row shares the loose key
    LooseUnique(usize),
    /// Several master rows share the loose key, typically one operator
    /// running the same station name on multiple lines
    LooseAmbiguous(Vec<usize>),
    /// No master row shares either key
    Unmatched,
}

impl MatchOutcome {
    pub fn tier(&self) -> Option<MatchTier> {
        match self {
            MatchOutcome::StrictUnique(_) | MatchOutcome::StrictAmbiguous(_) => {
                Some(MatchTier::Strict)
            }
            MatchOutcome::LooseUnique(_) | MatchOutcome::LooseAmbiguous(_) => {
                Some(MatchTier::Loose)
            }
            MatchOutcome::Unmatched => None,
        }
    }
}

/// One source record together with its normalized fields and join outcome.
#[derive(Debug, Clone)]
pub struct SourceMatch {
    /// Index into the source slice the matcher ran over
    pub source_index: usize,
    pub normalized: NormalizedFields,
    pub outcome: MatchOutcome,
}

/// Per-category counts over one matcher run. The five categories partition
/// the source set: they always sum to `total`.
#[derive(Debug, Clone, Default, Serialize)]
pub struct MatchReport {
    pub total: usize,
    pub strict_unique: usize,
    pub strict_ambiguous: usize,
    pub loose_unique: usize,
    pub loose_ambiguous: usize,
    pub unmatched: usize,
}

impl MatchReport {
    pub fn matched(&self) -> usize {
        self.strict_unique + self.strict_ambiguous + self.loose_unique + self.loose_ambiguous
    }

    pub fn match_rate(&self) -> f64 {
        pct(self.matched(), self.total)
    }
}

pub fn pct(part: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        (part as f64 / total as f64) * 100.0
    }
}

/// Everything a matcher run produces: one entry per source record, in source
/// order, plus the category counts.
#[derive(Debug, Clone)]
pub struct MatchResult {
    pub matches: Vec<SourceMatch>,
    pub report: MatchReport,
}

/// State-free two-tier matcher. Indexes the master once; `run` may then be
/// applied to any number of source slices.
pub struct Matcher<'a> {
    aliases: &'a AliasTable,
    strict_index: HashMap<StrictKey, Vec<usize>>,
    loose_index: HashMap<LooseKey, Vec<usize>>,
}

impl<'a> Matcher<'a> {
    pub fn new(master: &'a [MasterRecord], aliases: &'a AliasTable) -> Self {
        let mut strict_index: HashMap<StrictKey, Vec<usize>> = HashMap::new();
        let mut loose_index: HashMap<LooseKey, Vec<usize>> = HashMap::new();

        for (index, record) in master.iter().enumerate() {
            let fields = NormalizedFields::from_parts(
                &record.company,
                &record.line,
                &record.station,
                aliases,
            );
            strict_index.entry(fields.strict_key()).or_default().push(index);
            loose_index.entry(fields.loose_key()).or_default().push(index);
        }

        // Candidate order must not depend on master input order
        for candidates in strict_index.values_mut().chain(loose_index.values_mut()) {
            candidates.sort_by(|a, b| master[*a].stationcode.cmp(&master[*b].stationcode));
        }

        Self {
            aliases,
            strict_index,
            loose_index,
        }
    }

    /// Runs both tiers over the source set. The loose tier only ever sees the
    /// strict tier's unmatched residual.
    pub fn run(&self, source: &[SourceRecord]) -> MatchResult {
        let mut matches = Vec::with_capacity(source.len());
        let mut report = MatchReport {
            total: source.len(),
            ..MatchReport::default()
        };

        for (source_index, record) in source.iter().enumerate() {
            let normalized = NormalizedFields::from_parts(
                &record.company,
                &record.line,
                &record.station,
                self.aliases,
            );

            let outcome = match self.strict_index.get(&normalized.strict_key()) {
                Some(candidates) if candidates.len() == 1 => {
                    report.strict_unique += 1;
                    MatchOutcome::StrictUnique(candidates[0])
                }
                Some(candidates) => {
                    report.strict_ambiguous += 1;
                    MatchOutcome::StrictAmbiguous(candidates.clone())
                }
                None => match self.loose_index.get(&normalized.loose_key()) {
                    Some(candidates) if candidates.len() == 1 => {
                        report.loose_unique += 1;
                        MatchOutcome::LooseUnique(candidates[0])
                    }
                    Some(candidates) => {
                        report.loose_ambiguous += 1;
                        MatchOutcome::LooseAmbiguous(candidates.clone())
                    }
                    None => {
                        report.unmatched += 1;
                        MatchOutcome::Unmatched
                    }
                },
            };

            matches.push(SourceMatch {
                source_index,
                normalized,
                outcome,
            });
        }

        MatchResult { matches, report }
    }
}
