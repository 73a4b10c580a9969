use anyhow::Result;

use crate::domain::IntegratedRecord;
use crate::pipeline::processing::mismatch::MismatchRow;

/// Sink for the resolved, station-code-keyed dataset.
pub trait IntegratedSink: Send + Sync {
    fn write_integrated(&self, records: &[IntegratedRecord]) -> Result<()>;
}

/// Sink for the unmatched-records extract produced by the mismatch analyzer.
pub trait ExtractSink: Send + Sync {
    fn write_extract(&self, rows: &[MismatchRow]) -> Result<()>;
}
