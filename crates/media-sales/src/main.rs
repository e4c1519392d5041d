//! Media Sales Viewer
//!
//! Pulls the sales sheet from its Apps Script endpoint and reports sales
//! totals per referring media, filtered by contract month, store and referrer.

mod config;
mod constants;
mod fetch;
mod reports;

use anyhow::Result;
use clap::{Args as ClapArgs, Parser, Subcommand};
use sales_core::{parse_records, FilterCriteria, MonthKey, SalesRecord, SalesView};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use config::{Config, FileConfig};

#[derive(Parser, Debug)]
#[command(name = "media-sales")]
#[command(about = "Sales by referring media, from the sales sheet endpoint")]
struct Args {
    /// Config file (optional; defaults apply when missing)
    #[arg(short, long, default_value = constants::CONFIG_FILE, global = true)]
    config: PathBuf,

    /// Endpoint URL (overrides source.url in the config file)
    #[arg(long, global = true)]
    url: Option<String>,

    /// Read rows from a saved JSON payload instead of the endpoint
    #[arg(short, long, global = true)]
    input: Option<PathBuf>,

    #[command(flatten)]
    selection: SelectionArgs,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

/// Operator selections; omitted means "all"
#[derive(ClapArgs, Debug, Clone, Default)]
struct SelectionArgs {
    /// Contract month (YYYY-MM)
    #[arg(long, global = true)]
    month: Option<MonthKey>,

    /// Store name (exact match)
    #[arg(long, global = true)]
    store: Option<String>,

    /// Referrer (exact match; use the unrecorded label for rows without one)
    #[arg(long, global = true)]
    referrer: Option<String>,
}

impl SelectionArgs {
    fn criteria(&self) -> FilterCriteria {
        FilterCriteria {
            month: self.month.clone(),
            store: self.store.clone(),
            referrer: self.referrer.clone(),
        }
    }
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Show the referrer summary and itemized records (default)
    Show,

    /// List the selectable months, stores and referrers
    Facets,

    /// Export the referrer summary and itemized records to CSV
    Export {
        /// Output directory for generated CSV reports
        #[arg(short, long, default_value = "./output")]
        output_dir: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing(args.verbose);

    let file_config = FileConfig::load_or_default(&args.config)?;
    let config = Config::from_file(&file_config, args.url)?;
    let criteria = args.selection.criteria();
    debug!("Criteria: {:?}, view options: {:?}", criteria, config.view);

    let input = args.input.as_deref();

    match args.command.unwrap_or(Command::Show) {
        Command::Show => {
            let records = load_records_or_empty(input, &config).await;
            let view = SalesView::build(&records, &criteria, &config.view);
            reports::print_view(&view, &criteria);
        }

        Command::Facets => {
            let records = load_records_or_empty(input, &config).await;
            let view = SalesView::build(&records, &FilterCriteria::any(), &config.view);
            reports::print_facets(&view.facets);
        }

        Command::Export { output_dir } => {
            // A failed fetch must not overwrite earlier exports with empty files
            let records = load_records(input, &config).await?;
            let view = SalesView::build(&records, &criteria, &config.view);

            println!("Generating reports for {}...", reports::describe_criteria(&criteria));
            reports::generate_all_reports(&output_dir, &view)?;
            println!(
                "\n{} record(s), {} referrer(s), total {}",
                view.filtered.len(),
                view.summary.len(),
                reports::format_yen(view.grand_total)
            );
        }
    }

    Ok(())
}

/// Initialize tracing; `RUST_LOG` takes precedence over `--verbose`
fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

/// Load and parse records from the input file or the endpoint
async fn load_records(input: Option<&Path>, config: &Config) -> Result<Vec<SalesRecord>> {
    let rows = match input {
        Some(path) => fetch::load_records_file(path).await?,
        None => {
            info!("Fetching sales records from {}", config.source.url);
            fetch::fetch_records(&config.source).await?
        }
    };

    let parsed = parse_records(&rows, &config.schema);
    if parsed.skipped > 0 {
        warn!("Skipped {} row(s) that were not JSON objects", parsed.skipped);
    }
    Ok(parsed.records)
}

/// Like [`load_records`], but an unavailable source yields an empty record set
async fn load_records_or_empty(input: Option<&Path>, config: &Config) -> Vec<SalesRecord> {
    match load_records(input, config).await {
        Ok(records) => records,
        Err(e) => {
            warn!("Sales records unavailable: {:#}", e);
            Vec::new()
        }
    }
}
