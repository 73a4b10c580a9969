//! Reduces match candidates to exactly one integrated record per station
//! code.
//!
//! Two deterministic tie-breaks replace the order-dependent duplicate drop of
//! the batch this pipeline descends from:
//! - an ambiguous candidate set resolves to its smallest station code;
//! - when several source records land on one station code, the strict-tier
//!   record wins over the loose-tier one, then the smallest normalized
//!   (operator, line, station) triple.
//!
//! The second rule is lossy by design: two stations sharing operator and name
//! but differing by line can silently swap rents. Every record dropped here
//! is reported so the auditor can surface that risk rather than hide it.

use serde::Serialize;
use tracing::{debug, warn};

use crate::domain::{IntegratedRecord, MasterRecord, SourceRecord};
use crate::pipeline::processing::matching::{MatchOutcome, MatchTier, SourceMatch};

/// A source record that lost the one-record-per-station-code contest.
#[derive(Debug, Clone, Serialize)]
pub struct DroppedRecord {
    pub stationcode: String,
    pub company: String,
    pub line: String,
    pub station: String,
    pub rent: f64,
}

/// What conflation did to one matcher run.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ConflationReport {
    /// Records emitted into the integrated set
    pub emitted: usize,
    /// Ambiguous candidate sets resolved by the smallest-code rule
    pub ambiguous_resolved: usize,
    /// Records dropped by the station-code uniqueness pass
    pub dropped: Vec<DroppedRecord>,
}

impl ConflationReport {
    pub fn collisions_dropped(&self) -> usize {
        self.dropped.len()
    }
}

/// Merges all tiers' outcomes into the station-code-keyed result set,
/// enforcing one record per station code. Output is sorted by station code,
/// so identical inputs always produce identical output.
pub fn conflate(
    master: &[MasterRecord],
    source: &[SourceRecord],
    matches: &[SourceMatch],
) -> (Vec<IntegratedRecord>, ConflationReport) {
    let mut report = ConflationReport::default();

    // Resolve every matched record to a single master candidate
    let mut picks: Vec<&SourceMatch> = Vec::new();
    let mut chosen: Vec<usize> = Vec::new();
    for m in matches {
        let master_index = match &m.outcome {
            MatchOutcome::StrictUnique(index) | MatchOutcome::LooseUnique(index) => *index,
            MatchOutcome::StrictAmbiguous(candidates)
            | MatchOutcome::LooseAmbiguous(candidates) => {
                report.ambiguous_resolved += 1;
                // candidate lists are sorted by station code; the smallest wins
                let index = candidates[0];
                debug!(
                    station = %m.normalized.station,
                    picked = %master[index].stationcode,
                    candidates = candidates.len(),
                    "Resolved ambiguous match"
                );
                index
            }
            MatchOutcome::Unmatched => continue,
        };
        picks.push(m);
        chosen.push(master_index);
    }

    // Station-code uniqueness: order so the survivor of each code group is
    // the first entry, then keep-first
    let mut order: Vec<usize> = (0..picks.len()).collect();
    order.sort_by(|a, b| {
        let (ma, mb) = (&master[chosen[*a]], &master[chosen[*b]]);
        ma.stationcode
            .cmp(&mb.stationcode)
            .then_with(|| tier_rank(picks[*a]).cmp(&tier_rank(picks[*b])))
            .then_with(|| picks[*a].normalized.cmp(&picks[*b].normalized))
            .then_with(|| picks[*a].source_index.cmp(&picks[*b].source_index))
    });

    let mut integrated: Vec<IntegratedRecord> = Vec::new();
    for position in order {
        let m = picks[position];
        let code = &master[chosen[position]].stationcode;
        let record = &source[m.source_index];

        if integrated.last().is_some_and(|prev| prev.stationcode == *code) {
            warn!(
                stationcode = %code,
                station = %record.station,
                "Dropping colliding record for already-assigned station code"
            );
            report.dropped.push(DroppedRecord {
                stationcode: code.clone(),
                company: record.company.clone(),
                line: record.line.clone(),
                station: record.station.clone(),
                rent: record.rent,
            });
            continue;
        }

        integrated.push(IntegratedRecord {
            stationcode: code.clone(),
            rent: record.rent,
            company: record.company.clone(),
            line: record.line.clone(),
            station: record.station.clone(),
        });
    }

    report.emitted = integrated.len();
    (integrated, report)
}

fn tier_rank(m: &SourceMatch) -> u8 {
    match m.outcome.tier() {
        Some(MatchTier::Strict) => 0,
        Some(MatchTier::Loose) => 1,
        None => 2,
    }
}
