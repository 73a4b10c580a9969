use tracing::info;

use crate::domain::{IntegratedRecord, MasterRecord, SourceRecord};
use crate::pipeline::processing::audit::{
    coverage, homonym_risk, CoverageReport, HomonymFinding,
};

/// Use case for the two read-only diagnostics: coverage against the raw rent
/// data, and the homonym-collision geography check.
pub struct AuditUseCase {
    top_n: usize,
    watchlist: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct AuditSummary {
    pub coverage: CoverageReport,
    pub homonyms: Vec<HomonymFinding>,
}

impl AuditUseCase {
    pub fn new(top_n: usize, watchlist: Vec<String>) -> Self {
        Self { top_n, watchlist }
    }

    pub fn run(
        &self,
        raw: &[SourceRecord],
        integrated: &[IntegratedRecord],
        master: &[MasterRecord],
    ) -> AuditSummary {
        let coverage = coverage(raw, integrated, self.top_n);
        info!(
            matched = coverage.matched,
            unmatched = coverage.unmatched,
            "Coverage computed"
        );

        let homonyms = homonym_risk(integrated, master, &self.watchlist);
        info!(findings = homonyms.len(), "Homonym risk check finished");

        AuditSummary { coverage, homonyms }
    }
}

impl AuditSummary {
    /// Prints the textual summary report.
    pub fn print_report(&self) {
        let coverage = &self.coverage;
        println!("Original Rent Records: {}", coverage.total);
        println!(
            "Matched: {} / {} ({:.1}%)",
            coverage.matched,
            coverage.total,
            coverage.match_rate()
        );
        println!("Unmatched: {}", coverage.unmatched);

        if !coverage.top_unmatched_companies.is_empty() {
            println!("\n--- Top Unmatched Companies ---");
            for (company, count) in &coverage.top_unmatched_companies {
                println!("   {count:>5}  {company}");
            }
        }
        if !coverage.top_unmatched_lines.is_empty() {
            println!("\n--- Top Unmatched Lines ---");
            for (line, count) in &coverage.top_unmatched_lines {
                println!("   {count:>5}  {line}");
            }
        }

        println!("\n--- Homonym Risk Check ---");
        if self.homonyms.is_empty() {
            println!("   No watchlisted stations in the integrated set");
        }
        for finding in &self.homonyms {
            let latitude = finding
                .latitude
                .map(|lat| format!("{lat:.1}"))
                .unwrap_or_else(|| "-".to_string());
            println!(
                "   {}: Code: {}, Line: {}, Rent: {}, Lat: {} ({})",
                finding.station,
                finding.stationcode,
                finding.line,
                finding.rent,
                latitude,
                finding.band
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn summary_carries_both_checks() {
        let masters = vec![MasterRecord {
            company: "東日本旅客鉄道".to_string(),
            line: "東北線".to_string(),
            station: "福島".to_string(),
            stationcode: "000200".to_string(),
            coordinates: Some([140.4, 37.7]),
        }];
        let raw = vec![SourceRecord {
            company: "東日本旅客鉄道".to_string(),
            line: "東北線".to_string(),
            station: "福島".to_string(),
            rent: 6.0,
        }];
        let integrated = vec![IntegratedRecord {
            stationcode: "000200".to_string(),
            rent: 6.0,
            company: "東日本旅客鉄道".to_string(),
            line: "東北線".to_string(),
            station: "福島".to_string(),
        }];

        let use_case = AuditUseCase::new(10, vec!["福島".to_string()]);
        let summary = use_case.run(&raw, &integrated, &masters);

        assert_eq!(summary.coverage.matched, 1);
        assert_eq!(summary.homonyms.len(), 1);
        // printing must not panic on a populated summary
        summary.print_report();
    }
}
