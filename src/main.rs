use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use contactfinder::address;
use contactfinder::board::BoardClient;
use contactfinder::boundary::{AddressSource, CostMode};
use contactfinder::cli::Cli;
use contactfinder::config::{AppConfig, CONFIG_PATH};
use contactfinder::logger::{RunLogger, VerbosityLevel};
use contactfinder::provider::ProviderClient;
use contactfinder::report::{export_json, RunSummary};
use contactfinder::Pipeline;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    if cli.init {
        let path = AppConfig::create_default_config()?;
        println!("Created default configuration file at: {}", path.display());
        println!("Fill in your API tokens before running.");
        return Ok(());
    }

    init_tracing(cli.verbose);

    let config_path = cli
        .config
        .as_deref()
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(CONFIG_PATH));
    let config = AppConfig::load_from(&config_path)?;
    config.validate()?;

    let board_id = cli.board.as_deref().unwrap_or(&config.board.board_id);
    let limit = cli.limit.unwrap_or(config.board.item_limit);
    let search_mode = if cli.purchase {
        CostMode::Purchase
    } else {
        CostMode::CachedOnly
    };

    let logger = RunLogger::new(VerbosityLevel::from_verbose_count(cli.verbose));
    logger.info(&format!(
        "Fetching up to {} items from board {}",
        limit, board_id
    ));

    let http = reqwest::Client::builder()
        .timeout(Duration::from_secs(config.provider.timeout_secs))
        .build()
        .context("Failed to create HTTP client")?;
    let board = BoardClient::new(&config.board, http);
    let items = board
        .fetch_items(board_id, limit)
        .await
        .with_context(|| format!("Failed to fetch items from board {}", board_id))?;

    if items.is_empty() {
        logger.error("No items found on the board; nothing to do");
        return Ok(());
    }

    // Items with no address-like text still get a report entry; an empty
    // candidate fails parsing and lands in the "no address" terminal state.
    let addresses: Vec<String> = items
        .iter()
        .map(|item| address::candidate_from_item(item).unwrap_or_default())
        .collect();
    logger.info(&format!("Processing {} addresses", addresses.len()));

    let provider = ProviderClient::new(&config.provider, config.lookup.alternate_endpoints.clone());
    let pipeline = Pipeline::new(
        &provider,
        &logger,
        Duration::from_millis(config.lookup.pause_ms),
        search_mode,
    );

    logger.start_progress(addresses.len() as u64);
    let records = pipeline.run(&addresses).await;
    logger.finish_progress();

    let output_path = resolve_output_path(&cli, &config);
    export_json(&records, &output_path)?;

    let summary = RunSummary::from_records(&records);
    logger.print_summary(&summary, &output_path.display().to_string());

    Ok(())
}

fn init_tracing(verbose: u8) {
    let default_filter = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .compact()
        .init();
}

fn resolve_output_path(cli: &Cli, config: &AppConfig) -> PathBuf {
    if let Some(output) = &cli.output {
        return PathBuf::from(output);
    }
    let directory = if config.output.directory.is_empty() {
        dirs::desktop_dir().unwrap_or_else(|| PathBuf::from("."))
    } else {
        PathBuf::from(&config.output.directory)
    };
    directory.join(Path::new(&config.output.filename))
}
