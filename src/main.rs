use clap::Parser;
use tabular_extract::utils::{logger, validation::Validate};
use tabular_extract::{CliConfig, ExtractEngine, ExtractionReport};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = CliConfig::parse();

    logger::init_cli_logger(cli.verbose, cli.json_logs);

    tracing::info!("Starting tabular-extract");
    if cli.verbose {
        tracing::debug!("CLI config: {:?}", cli);
    }

    let config = match cli.resolve().and_then(|config| {
        config.validate()?;
        Ok(config)
    }) {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("❌ Configuration validation failed: {}", e);
            tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
            eprintln!("❌ {}", e);
            std::process::exit(1);
        }
    };

    if config.monitoring.enabled {
        tracing::info!("🔍 System monitoring enabled");
    }

    let engine = match ExtractEngine::from_config(&config) {
        Ok(engine) => engine,
        Err(e) => {
            eprintln!("❌ {}", e);
            eprintln!("💡 {}", e.recovery_suggestion());
            std::process::exit(1);
        }
    };

    let report = engine.run().await;
    print_report(&report, cli.preview)?;

    if !report.all_succeeded() {
        std::process::exit(2);
    }

    Ok(())
}

fn print_report(report: &ExtractionReport, preview: usize) -> anyhow::Result<()> {
    for outcome in report.outcomes() {
        match &outcome.result {
            Ok(table) => {
                println!(
                    "✅ {:<8} {} records, {} columns ({:?}) - {}",
                    outcome.kind(),
                    table.len(),
                    table.columns().len(),
                    outcome.elapsed,
                    outcome.descriptor
                );
                for row in (0..preview.min(table.len())).filter_map(|i| table.row_json(i)) {
                    println!("    {}", serde_json::to_string(&row)?);
                }
            }
            Err(e) => {
                println!(
                    "❌ {:<8} {} - {}",
                    outcome.kind(),
                    e,
                    outcome.descriptor
                );
                println!("    💡 {}", e.recovery_suggestion());
            }
        }
    }
    Ok(())
}
