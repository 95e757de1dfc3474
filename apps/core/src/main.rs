// Review Analyzer CLI entry point

use anyhow::{Context, Result};
use chrono::Local;
use clap::{Parser, Subcommand};
use review_analyzer::analysis::ThemeCatalog;
use review_analyzer::capabilities::HttpCapabilities;
use review_analyzer::storage::ReviewStore;
use review_analyzer::{
    ingest, output, preflight, telemetry, AppConfig, BatchSummary, ReviewAnalyzer,
};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{error, info};

#[derive(Parser, Debug)]
#[command(name = "review-analyzer")]
#[command(version)]
#[command(about = "Language, sentiment and theme analysis of bank app reviews", long_about = None)]
struct Cli {
    /// Emit logs as JSON
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Analyze a review CSV and write the analyzed CSV
    Analyze {
        /// Input CSV with columns review,rating,date,bank,source
        #[arg(short, long)]
        input: PathBuf,

        /// Output CSV (default: data/analyzed_reviews_<timestamp>.csv)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Drop blank and duplicate reviews and normalize dates first
        #[arg(long)]
        clean: bool,

        /// Also store the analyzed reviews (overrides REVIEWS_DATABASE_URL)
        #[arg(long)]
        database_url: Option<String>,
    },

    /// Print the verification queries of the review store
    Verify {
        /// Store to query (overrides REVIEWS_DATABASE_URL)
        #[arg(long)]
        database_url: Option<String>,
    },

    /// Check that every classification capability is ready
    Preflight,
}

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        error!("{:#}", e);
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    let cli = Cli::parse();
    dotenv::dotenv().ok();
    telemetry::init_tracing(cli.json);

    let config = AppConfig::from_env().context("Invalid configuration")?;

    match cli.command {
        Commands::Analyze {
            input,
            output,
            clean,
            database_url,
        } => {
            let database_url = database_url.or_else(|| config.database_url.clone());
            analyze(&config, input, output, clean, database_url).await
        }
        Commands::Verify { database_url } => {
            let url = database_url
                .or_else(|| config.database_url.clone())
                .context("No database configured: pass --database-url or set REVIEWS_DATABASE_URL")?;
            verify(&url).await
        }
        Commands::Preflight => {
            let capabilities = http_capabilities(&config)?;
            let report =
                preflight::run_preflight_checks(&capabilities, config.call_timeout()).await;
            println!("{}", serde_json::to_string_pretty(&report)?);
            if report.all_passed {
                Ok(())
            } else {
                anyhow::bail!("{}", report.summary)
            }
        }
    }
}

fn http_capabilities(config: &AppConfig) -> Result<review_analyzer::capabilities::Capabilities> {
    let base_url = config
        .inference_url()
        .context("Invalid inference sidecar URL")?;
    let client = HttpCapabilities::new(base_url, config.detector_seed, config.call_timeout())
        .context("Failed to build inference client")?;
    Ok(client.into_capabilities())
}

fn load_catalog(config: &AppConfig) -> Result<ThemeCatalog> {
    match &config.theme_catalog {
        Some(path) => ThemeCatalog::load(path)
            .with_context(|| format!("Failed to load theme catalog {}", path.display())),
        None => Ok(ThemeCatalog::builtin()),
    }
}

async fn analyze(
    config: &AppConfig,
    input: PathBuf,
    output: Option<PathBuf>,
    clean: bool,
    database_url: Option<String>,
) -> Result<()> {
    // Startup: catalog and capabilities must be ready before any record runs
    let catalog = Arc::new(load_catalog(config)?);
    let capabilities = http_capabilities(config)?;
    let ready = preflight::prepare(capabilities, config.call_timeout())
        .await
        .context("Classification capabilities are not ready")?;

    let mut reviews = ingest::read_reviews(&input)
        .with_context(|| format!("Failed to read reviews from {}", input.display()))?;
    if clean {
        reviews = ingest::clean_reviews(reviews);
    }

    let analyzer = ReviewAnalyzer::new(ready, catalog, config.pipeline_settings());
    let analyzed = analyzer.analyze_batch(reviews).await;

    let output_path = output.unwrap_or_else(|| {
        PathBuf::from("data").join(format!(
            "analyzed_reviews_{}.csv",
            Local::now().format("%Y%m%d_%H%M%S")
        ))
    });
    output::write_analyzed_file(&output_path, &analyzed)
        .with_context(|| format!("Failed to write {}", output_path.display()))?;

    if let Some(url) = database_url {
        let store = ReviewStore::connect(&url)
            .await
            .with_context(|| format!("Failed to open review store {}", url))?;
        let report = store.store_batch(&analyzed).await;
        info!("Review store: {} stored, {} failed", report.stored, report.failed);
        store.close().await;
    }

    BatchSummary::from_records(&analyzed).log();
    info!("✅ Analysis complete! Results saved to {}", output_path.display());
    Ok(())
}

async fn verify(url: &str) -> Result<()> {
    let store = ReviewStore::connect(url)
        .await
        .with_context(|| format!("Failed to open review store {}", url))?;

    println!("Reviews per bank:");
    for row in store.reviews_per_bank().await? {
        println!("  {:<30} {}", row.bank_name, row.review_count);
    }

    println!("Average rating per bank:");
    for row in store.average_rating_by_bank().await? {
        match row.avg_rating {
            Some(avg) => println!("  {:<30} {:.2} ({} rated)", row.bank_name, avg, row.rated_reviews),
            None => println!("  {:<30} n/a", row.bank_name),
        }
    }

    println!("Sentiment distribution per bank:");
    for row in store.sentiment_distribution().await? {
        println!(
            "  {:<30} {:<10} {:>6} ({:.2}%)",
            row.bank_name, row.sentiment_label, row.count, row.percentage
        );
    }

    store.close().await;
    Ok(())
}
