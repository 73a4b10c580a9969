use anyhow::Result;
use std::sync::Arc;
use tracing::{info, warn};

use crate::app::ports::IntegratedSink;
use crate::domain::{MasterRecord, SourceRecord};
use crate::pipeline::processing::alias::AliasTable;
use crate::pipeline::processing::conflation::{conflate, ConflationReport};
use crate::pipeline::processing::matching::{MatchReport, Matcher};

/// Use case for resolving rent records against the station master and
/// writing the integrated dataset.
pub struct IntegrateUseCase {
    aliases: AliasTable,
    sink: Arc<dyn IntegratedSink>,
}

/// What one integration run produced, for reporting.
#[derive(Debug, Clone)]
pub struct IntegrationSummary {
    pub match_report: MatchReport,
    pub conflation: ConflationReport,
}

impl IntegrateUseCase {
    /// Create an integrate use case backed by the curated alias tables.
    pub fn new(sink: Arc<dyn IntegratedSink>) -> Self {
        Self::with_aliases(AliasTable::curated().clone(), sink)
    }

    /// Create an integrate use case with an explicit alias table.
    pub fn with_aliases(aliases: AliasTable, sink: Arc<dyn IntegratedSink>) -> Self {
        Self { aliases, sink }
    }

    pub fn run(
        &self,
        master: &[MasterRecord],
        source: &[SourceRecord],
    ) -> Result<IntegrationSummary> {
        info!(
            master = master.len(),
            source = source.len(),
            "Starting integration"
        );

        let matcher = Matcher::new(master, &self.aliases);
        let result = matcher.run(source);
        let report = &result.report;
        info!(
            strict_unique = report.strict_unique,
            strict_ambiguous = report.strict_ambiguous,
            loose_unique = report.loose_unique,
            loose_ambiguous = report.loose_ambiguous,
            unmatched = report.unmatched,
            "Matching finished"
        );
        if report.strict_ambiguous > 0 {
            warn!(
                count = report.strict_ambiguous,
                "Master contains duplicate strict keys"
            );
        }

        let (integrated, conflation) = conflate(master, source, &result.matches);
        if !conflation.dropped.is_empty() {
            warn!(
                dropped = conflation.dropped.len(),
                "Station-code collisions dropped records"
            );
        }

        self.sink.write_integrated(&integrated)?;
        info!(count = integrated.len(), "Integration complete");

        Ok(IntegrationSummary {
            match_report: result.report,
            conflation,
        })
    }
}
