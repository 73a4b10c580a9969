use clap::{Parser, Subcommand};
use std::sync::Arc;
use tracing::error;

use station_integrator::app::audit_use_case::AuditUseCase;
use station_integrator::app::integrate_use_case::{IntegrateUseCase, IntegrationSummary};
use station_integrator::app::mismatch_use_case::MismatchUseCase;
use station_integrator::config::Config;
use station_integrator::logging;
use station_integrator::pipeline::ingestion;
use station_integrator::storage::{CsvExtractSink, JsonIntegratedSink};

#[derive(Parser)]
#[command(name = "station_integrator")]
#[command(about = "Attaches canonical station codes to rental market price records")]
#[command(version = "0.1.0")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Resolve rent records against the station master and write the
    /// integrated dataset
    Integrate,
    /// Audit an existing integrated dataset: coverage and homonym risk
    Audit,
    /// Report rent records whose normalized key the master does not contain
    Mismatches,
    /// Run integration followed by the audit
    Run,
}

fn run_integrate(config: &Config) -> anyhow::Result<IntegrationSummary> {
    let master = ingestion::load_master(&config.paths.master)?;
    let source = ingestion::load_source(&config.paths.rent)?;

    let sink = Arc::new(JsonIntegratedSink::new(&config.paths.integrated));
    let use_case = IntegrateUseCase::new(sink);
    let summary = use_case.run(&master, &source)?;

    let report = &summary.match_report;
    println!("\n📊 Integration results:");
    println!("   Total rent records: {}", report.total);
    println!("   Strict unique: {}", report.strict_unique);
    println!("   Strict ambiguous: {}", report.strict_ambiguous);
    println!("   Loose unique: {}", report.loose_unique);
    println!("   Loose ambiguous: {}", report.loose_ambiguous);
    println!("   Unmatched: {}", report.unmatched);
    println!("   Match rate: {:.1}%", report.match_rate());
    println!("   Integrated records: {}", summary.conflation.emitted);
    if summary.conflation.collisions_dropped() > 0 {
        println!(
            "\n⚠️  {} record(s) dropped on station-code collisions:",
            summary.conflation.collisions_dropped()
        );
        for dropped in &summary.conflation.dropped {
            println!(
                "   - {} {} {} (code {}, rent {})",
                dropped.company, dropped.line, dropped.station, dropped.stationcode, dropped.rent
            );
        }
    }
    println!("   Output file: {}", config.paths.integrated.display());

    Ok(summary)
}

fn run_audit(config: &Config) -> anyhow::Result<()> {
    let master = ingestion::load_master(&config.paths.master)?;
    let raw = ingestion::load_source(&config.paths.rent)?;
    let integrated = ingestion::load_integrated(&config.paths.integrated)?;

    let use_case = AuditUseCase::new(config.audit.top_n, config.audit.homonym_watchlist.clone());
    let summary = use_case.run(&raw, &integrated, &master);
    summary.print_report();
    Ok(())
}

fn run_mismatches(config: &Config) -> anyhow::Result<()> {
    let master = ingestion::load_master(&config.paths.master)?;
    let source = ingestion::load_source(&config.paths.rent)?;

    let sink = Arc::new(CsvExtractSink::new(&config.paths.unmatched_extract));
    let use_case = MismatchUseCase::new(config.audit.top_n, sink);
    let report = use_case.run(&master, &source)?;

    if report.is_clean() {
        println!("✅ Perfect match! No unmatched records.");
        return Ok(());
    }

    println!("Total Rent Records: {}", report.total);
    println!("Unmatched Records: {}", report.unmatched());
    println!("Mismatch Rate: {:.1}%", report.mismatch_rate());
    println!("\n--- Top Unmatched Companies ---");
    for (company, count) in &report.top_unmatched_companies {
        println!("   {count:>5}  {company}");
    }
    println!("\n--- Top Unmatched Lines ---");
    for (line, count) in &report.top_unmatched_lines {
        println!("   {count:>5}  {line}");
    }
    println!(
        "\nUnmatched details saved to: {}",
        config.paths.unmatched_extract.display()
    );
    Ok(())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    logging::init_logging();

    let cli = Cli::parse();
    let config = Config::load_or_default()?;

    match cli.command {
        Commands::Integrate => {
            println!("🔄 Running integration...");
            if let Err(e) = run_integrate(&config) {
                error!("Integration failed: {}", e);
                println!("❌ Integration failed: {}", e);
                std::process::exit(1);
            }
        }
        Commands::Audit => {
            println!("🔎 Auditing integrated dataset...");
            if let Err(e) = run_audit(&config) {
                error!("Audit failed: {}", e);
                println!("❌ Audit failed: {}", e);
                std::process::exit(1);
            }
        }
        Commands::Mismatches => {
            println!("🧮 Analyzing unmatched records...");
            if let Err(e) = run_mismatches(&config) {
                error!("Mismatch analysis failed: {}", e);
                println!("❌ Mismatch analysis failed: {}", e);
                std::process::exit(1);
            }
        }
        Commands::Run => {
            println!("🚀 Running full pipeline (integrate + audit)...");

            println!("\n📥 Step 1: Integrating...");
            if let Err(e) = run_integrate(&config) {
                error!("Integration failed: {}", e);
                println!("❌ Integration failed: {}", e);
                std::process::exit(1);
            }

            println!("\n🔎 Step 2: Auditing...");
            match run_audit(&config) {
                Ok(()) => println!("\n✅ Full pipeline completed successfully!"),
                Err(e) => {
                    error!("Audit failed: {}", e);
                    println!("❌ Audit failed: {}", e);
                    std::process::exit(1);
                }
            }
        }
    }
    Ok(())
}
