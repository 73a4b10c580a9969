use anyhow::Result;
use std::fs;
use std::sync::Arc;
use tempfile::tempdir;

use station_integrator::app::audit_use_case::AuditUseCase;
use station_integrator::app::integrate_use_case::IntegrateUseCase;
use station_integrator::app::mismatch_use_case::MismatchUseCase;
use station_integrator::domain::{IntegratedRecord, MasterRecord, SourceRecord};
use station_integrator::pipeline::ingestion;
use station_integrator::pipeline::processing::audit::LatitudeBand;
use station_integrator::storage::{CsvExtractSink, InMemorySink, JsonIntegratedSink};

fn write_master(dir: &std::path::Path) -> std::path::PathBuf {
    let path = dir.join("stationcode.json");
    fs::write(
        &path,
        r#"[
            {"company": "都営地下鉄", "line": "三田線", "station": "巣鴨",
             "stationcode": 100, "coordinates": [139.73, 35.73]},
            {"company": "東日本旅客鉄道", "line": "東北本線", "station": "福島",
             "stationcode": 200, "coordinates": [140.45, 37.75]},
            {"company": "西日本旅客鉄道", "line": "大阪環状線", "station": "福島",
             "stationcode": 300, "coordinates": [135.48, 34.69]},
            {"company": "東急電鉄", "line": "東横線", "station": "代官山",
             "stationcode": 400, "coordinates": [139.7, 35.64]}
        ]"#,
    )
    .unwrap();
    path
}

fn write_rent(dir: &std::path::Path) -> std::path::PathBuf {
    let path = dir.join("rent_marketprice.json");
    fs::write(
        &path,
        r#"[
            {"company": "東京都", "line": "三田線", "station": "巣鴨", "rent": 9.5},
            {"company": "東日本旅客鉄道", "line": "ＪＲ東北線", "station": "福島", "rent": 6.2},
            {"company": "西日本旅客鉄道", "line": "環状線", "station": "福島", "rent": 11.4},
            {"company": "東急", "line": "東横線", "station": "代官山", "rent": 15.8},
            {"company": "架空鉄道", "line": "架空線", "station": "どこか", "rent": 5.0}
        ]"#,
    )
    .unwrap();
    path
}

#[test]
fn full_pipeline_resolves_and_audits() -> Result<()> {
    let temp_dir = tempdir()?;
    let master_path = write_master(temp_dir.path());
    let rent_path = write_rent(temp_dir.path());
    let integrated_path = temp_dir.path().join("integrated.json");

    let master = ingestion::load_master(&master_path)?;
    let source = ingestion::load_source(&rent_path)?;

    // Integrate
    let sink = Arc::new(JsonIntegratedSink::new(&integrated_path));
    let summary = IntegrateUseCase::new(sink).run(&master, &source)?;

    let report = &summary.match_report;
    assert_eq!(report.total, 5);
    // 巣鴨 via operator alias, 福島 via trunk-line collapse, 代官山 via 東急 alias
    assert_eq!(report.strict_unique, 3);
    // 環状線 fails strict; both 福島 masters share the (jr, 福島) loose key
    assert_eq!(report.loose_ambiguous, 1);
    assert_eq!(report.unmatched, 1);
    assert_eq!(
        report.strict_unique
            + report.strict_ambiguous
            + report.loose_unique
            + report.loose_ambiguous
            + report.unmatched,
        report.total
    );

    // The loose-ambiguous 福島 resolves to the smallest code (000200), which
    // the strict 福島 record already owns; the loose record is dropped and
    // the drop is visible in the report
    assert_eq!(summary.conflation.collisions_dropped(), 1);
    assert_eq!(summary.conflation.dropped[0].line, "環状線");

    // Read the integrated dataset back through the loader
    let integrated = ingestion::load_integrated(&integrated_path)?;
    assert_eq!(integrated.len(), 3);
    let codes: Vec<_> = integrated.iter().map(|r| r.stationcode.as_str()).collect();
    assert_eq!(codes, vec!["000100", "000200", "000400"]);

    // Audit the result: every surviving raw triple is covered
    let audit = AuditUseCase::new(10, vec!["福島".to_string()]);
    let audit_summary = audit.run(&source, &integrated, &master);
    assert_eq!(audit_summary.coverage.matched, 3);
    assert_eq!(audit_summary.coverage.unmatched, 2);
    assert_eq!(
        audit_summary.coverage.top_unmatched_companies,
        vec![
            ("架空鉄道".to_string(), 1),
            ("西日本旅客鉄道".to_string(), 1)
        ]
    );

    // The surviving 福島 is banded where the Tohoku station sits
    assert_eq!(audit_summary.homonyms.len(), 1);
    assert_eq!(audit_summary.homonyms[0].band, LatitudeBand::TohokuKanto);

    Ok(())
}

#[test]
fn loose_ambiguity_is_resolved_deterministically() -> Result<()> {
    // Two same-operator 福島 stations on different lines; the source line
    // strict-matches neither
    let master: Vec<MasterRecord> = serde_json::from_str(
        r#"[
            {"company": "東日本旅客鉄道", "line": "東北線", "station": "福島",
             "stationcode": 210, "coordinates": [140.45, 37.75]},
            {"company": "東日本旅客鉄道", "line": "奥羽線", "station": "福島",
             "stationcode": 205, "coordinates": [140.45, 37.75]}
        ]"#,
    )?;
    let source: Vec<SourceRecord> = serde_json::from_str(
        r#"[{"company": "北海道旅客鉄道", "line": "福島交通線", "station": "福島", "rent": 6.0}]"#,
    )?;

    let mut previous: Option<Vec<IntegratedRecord>> = None;
    for _ in 0..3 {
        let sink = Arc::new(InMemorySink::new());
        let summary = IntegrateUseCase::new(sink.clone()).run(&master, &source)?;
        assert_eq!(summary.match_report.loose_ambiguous, 1);

        let integrated = sink.integrated();
        assert_eq!(integrated.len(), 1);
        // smallest station code wins
        assert_eq!(integrated[0].stationcode, "000205");

        if let Some(previous) = &previous {
            assert_eq!(previous[0].stationcode, integrated[0].stationcode);
        }
        previous = Some(integrated);
    }
    Ok(())
}

#[test]
fn unmatched_records_surface_in_the_mismatch_extract() -> Result<()> {
    let temp_dir = tempdir()?;
    let master_path = write_master(temp_dir.path());
    let rent_path = write_rent(temp_dir.path());
    let extract_path = temp_dir.path().join("unmatched.csv");

    let master = ingestion::load_master(&master_path)?;
    let source = ingestion::load_source(&rent_path)?;

    let sink = Arc::new(CsvExtractSink::new(&extract_path));
    let report = MismatchUseCase::new(10, sink).run(&master, &source)?;

    // 環状線/福島 cannot strict-match (the analyzer has no loose tier), and
    // the fictional operator matches nothing at all
    assert_eq!(report.unmatched(), 2);
    assert!(!report.is_clean());

    let content = fs::read_to_string(&extract_path)?;
    assert!(content.lines().next().unwrap().starts_with("company,"));
    assert!(content.contains("架空鉄道"));
    assert!(content.contains("環状線"));

    Ok(())
}

#[test]
fn load_failure_aborts_before_any_output() {
    let temp_dir = tempdir().unwrap();
    let missing = temp_dir.path().join("missing.json");
    assert!(ingestion::load_master(&missing).is_err());
    assert!(ingestion::load_source(&missing).is_err());

    // nothing was created on the way out
    assert!(!temp_dir.path().join("integrated.json").exists());
}
