use anyhow::Result;
use std::sync::Arc;
use tracing::info;

use crate::app::ports::ExtractSink;
use crate::domain::{MasterRecord, SourceRecord};
use crate::pipeline::processing::alias::AliasTable;
use crate::pipeline::processing::mismatch::{analyze, MismatchReport};

/// Use case for the mismatch analyzer: report source keys the master does
/// not contain and export them for alias-table curation.
pub struct MismatchUseCase {
    aliases: AliasTable,
    top_n: usize,
    sink: Arc<dyn ExtractSink>,
}

impl MismatchUseCase {
    pub fn new(top_n: usize, sink: Arc<dyn ExtractSink>) -> Self {
        Self {
            aliases: AliasTable::curated().clone(),
            top_n,
            sink,
        }
    }

    pub fn run(
        &self,
        master: &[MasterRecord],
        source: &[SourceRecord],
    ) -> Result<MismatchReport> {
        let report = analyze(master, source, &self.aliases, self.top_n);
        info!(
            total = report.total,
            unmatched = report.unmatched(),
            "Mismatch analysis finished"
        );

        if !report.is_clean() {
            self.sink.write_extract(&report.rows)?;
        }
        Ok(report)
    }
}
