//! Catalog-Crawl main entry point
//!
//! Command-line interface for the resumable academic catalog extractor.

use anyhow::Context;
use catalog_crawl::config::load_config_with_hash;
use catalog_crawl::crawler::crawl;
use catalog_crawl::session::{HttpSessionFactory, PageSession, SessionFactory};
use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Catalog-Crawl: a resumable academic catalog extractor
///
/// Extracts program catalogs (year → program variant → course category →
/// course records) from a form-driven source. Completed and failed
/// entities are ledgered per year, so re-running after an interruption
/// picks up exactly where the previous run stopped.
#[derive(Parser, Debug)]
#[command(name = "catalog-crawl")]
#[command(version)]
#[command(about = "A resumable academic catalog extractor", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(value_name = "CONFIG")]
    config: PathBuf,

    /// Enrollment year to process (repeatable)
    #[arg(short = 'y', long = "year", value_name = "YEAR")]
    years: Vec<i32>,

    /// Program-type label, exactly as the source's form offers it
    #[arg(short = 'p', long = "program-type", value_name = "LABEL")]
    program_type: Option<String>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Print the labels the source's form offers and exit
    #[arg(long, conflicts_with = "dry_run")]
    list_options: bool,

    /// Validate config and show what would be crawled without crawling
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    tracing::info!("Loading configuration from: {}", cli.config.display());
    let (config, config_hash) =
        load_config_with_hash(&cli.config).context("failed to load configuration")?;
    tracing::info!("Configuration loaded (hash: {})", config_hash);

    if cli.list_options {
        handle_list_options(&config).await
    } else if cli.dry_run {
        handle_dry_run(&config, &cli);
        Ok(())
    } else {
        handle_crawl(config, &cli).await
    }
}

/// Sets up the tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("catalog_crawl=info,warn"),
            1 => EnvFilter::new("catalog_crawl=debug,info"),
            2 => EnvFilter::new("catalog_crawl=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Handles --list-options: asks the live form for its valid labels
async fn handle_list_options(config: &catalog_crawl::Config) -> anyhow::Result<()> {
    let factory = HttpSessionFactory::new(config.source.clone(), config.client.clone());
    let session = factory.open().await?;

    println!("Program types ({}):", config.source.type_selector);
    for label in session.option_labels(&config.source.type_selector)? {
        println!("  - {}", label);
    }

    println!("\nEnrollment years ({}):", config.source.scope_selector);
    for label in session.option_labels(&config.source.scope_selector)? {
        println!("  - {}", label);
    }

    Ok(())
}

/// Handles --dry-run: validates config and shows what would be crawled
fn handle_dry_run(config: &catalog_crawl::Config, cli: &Cli) {
    println!("=== Catalog-Crawl Dry Run ===\n");

    println!("Source:");
    println!("  Query page: {}", config.source.base_url);
    println!("  Entity table: {}", config.source.entity_table_id);
    println!("  Category table: {}", config.source.category_table_id);
    println!("  Record tables: {}", config.source.record_table_ids.join(", "));

    println!("\nCrawl:");
    println!("  Enter timeout: {}s", config.crawl.enter_timeout_secs);
    println!(
        "  Form retries: {} ({}ms apart)",
        config.crawl.form_retry_attempts, config.crawl.form_retry_delay_ms
    );

    println!("\nOutput:");
    println!("  Data directory: {}", config.output.data_dir);

    match &cli.program_type {
        Some(label) => println!("\nProgram type: {}", label),
        None => println!("\nProgram type: (not given)"),
    }
    let years: Vec<String> = cli.years.iter().map(|y| y.to_string()).collect();
    println!(
        "Years: {}",
        if years.is_empty() { "(none given)".to_string() } else { years.join(", ") }
    );

    println!("\n✓ Configuration is valid");
}

/// Handles the main crawl operation
async fn handle_crawl(config: catalog_crawl::Config, cli: &Cli) -> anyhow::Result<()> {
    let program_type = cli
        .program_type
        .as_deref()
        .context("--program-type is required to crawl")?;
    anyhow::ensure!(!cli.years.is_empty(), "at least one --year is required to crawl");

    tracing::info!(
        "Starting crawl: {} year(s), program type '{}'",
        cli.years.len(),
        program_type
    );

    let stats = crawl(config, program_type, &cli.years).await?;

    println!("\n=== Crawl Summary ===");
    for s in &stats {
        println!(
            "{}: {} entities, {} completed, {} failed, {} skipped (prior runs), {} structural skips",
            s.scope, s.entities, s.completed, s.failed, s.skipped, s.structural_skips
        );
    }

    Ok(())
}
