use analytics::report::{DashboardReport, TileUnit};
use analytics::{AnalyticsEngine, MetricTile};
use anyhow::Context;
use clap::{Parser, Subcommand};
use comfy_table::{Table, presets::UTF8_FULL};
use configuration::{Config, DateRangeArgs};
use core_types::TableName;
use database::{DbRepository, connect, run_migrations};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// The main entry point for the logistics dashboard.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    // Keep the guard alive so buffered log lines are flushed on exit.
    let _guard = init_tracing();

    let config = configuration::load_config_from(&cli.config)
        .with_context(|| format!("Failed to load {}", cli.config.display()))?;

    match cli.command {
        Commands::Seed(args) => handle_seed(args, config).await,
        Commands::Report(args) => handle_report(args, config).await,
        Commands::Serve(args) => {
            let mut config = config;
            if let Some(port) = args.port {
                config.server.port = port;
            }
            web_server::run_server(config).await
        }
    }
}

// ==============================================================================
// CLI Structure
// ==============================================================================

/// Logistics and sales dashboard: seed the database, print a report or serve the API.
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to the TOML configuration file.
    #[arg(long, global = true, default_value = configuration::DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate the sample tables and write them to the database.
    Seed(SeedArgs),
    /// Compute the dashboard for a date range and print it.
    Report(ReportArgs),
    /// Start the JSON API.
    Serve(ServeArgs),
}

#[derive(Parser)]
struct SeedArgs {
    /// Overrides `sample_data.seed`.
    #[arg(long)]
    seed: Option<u64>,

    /// Overrides `sample_data.days`.
    #[arg(long)]
    days: Option<usize>,

    /// Delete existing rows before writing.
    #[arg(long)]
    replace: bool,
}

#[derive(Parser)]
struct ReportArgs {
    #[command(flatten)]
    range: DateRangeArgs,
}

#[derive(Parser)]
struct ServeArgs {
    /// Overrides `server.port`.
    #[arg(long)]
    port: Option<u16>,
}

fn init_tracing() -> WorkerGuard {
    let file_appender = tracing_appender::rolling::daily("logs", "dashboard.log");
    let (file_writer, guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(fmt::layer())
        .with(fmt::layer().with_writer(file_writer).with_ansi(false))
        .init();

    guard
}

async fn open_repository(config: &Config) -> anyhow::Result<DbRepository> {
    let pool = connect(&config.database.url, config.database.max_connections)
        .await
        .context("Failed to connect to the database")?;
    run_migrations(&pool)
        .await
        .context("Failed to run database migrations")?;
    Ok(DbRepository::new(pool))
}

// ==============================================================================
// Seed Command Logic
// ==============================================================================

async fn handle_seed(args: SeedArgs, config: Config) -> anyhow::Result<()> {
    let mut settings = config.sample_data.clone();
    if let Some(seed) = args.seed {
        settings.seed = seed;
    }
    if let Some(days) = args.days {
        anyhow::ensure!(days > 0, "--days must be at least 1");
        settings.days = days;
    }

    let db_repo = open_repository(&config).await?;
    let snapshot = sample_data::generate(&settings)?;

    let progress_bar = ProgressBar::new(TableName::ALL.len() as u64);
    progress_bar.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")?
            .progress_chars("#>-"),
    );

    // One transaction: with --replace, a failed insert leaves the old tables untouched.
    let result = db_repo
        .save_snapshot_with_progress(&snapshot, args.replace, |table, rows| {
            progress_bar.set_message(format!("Wrote {rows} rows to {table}"));
            progress_bar.inc(1);
        })
        .await;
    let inserted = match result {
        Ok(inserted) => {
            progress_bar.finish_with_message("Seeding complete!");
            inserted
        }
        Err(e) => {
            progress_bar.abandon_with_message("Seeding rolled back");
            return Err(e.into());
        }
    };

    tracing::info!(
        seed = settings.seed,
        rows = inserted,
        replace = args.replace,
        "Seeded dashboard tables"
    );
    Ok(())
}

// ==============================================================================
// Report Command Logic
// ==============================================================================

async fn handle_report(args: ReportArgs, config: Config) -> anyhow::Result<()> {
    let (start, end) = args.range.resolve(&config.dashboard);
    let db_repo = open_repository(&config).await?;

    let snapshot = match db_repo.load_snapshot().await {
        Err(database::DbError::NotFound) => {
            anyhow::bail!("The database is empty; run `seed` first")
        }
        other => other?,
    };

    let engine = AnalyticsEngine::new(config.dashboard.options());
    let report = engine.build_dashboard(&snapshot, start, end)?;
    print_report(&report);

    let rows = db_repo.count_rows(TableName::SalesData).await?;
    tracing::info!(%start, %end, stored_days = rows, in_range = report.sales.len(), "Report complete");
    Ok(())
}

fn print_report(report: &DashboardReport) {
    println!("\nDashboard for {} to {}", report.range.start, report.range.end);

    let mut tiles = Table::new();
    tiles
        .load_preset(UTF8_FULL)
        .set_header(vec!["Metric", "Value", "Delta"]);
    for tile in &report.tiles {
        tiles.add_row(vec![tile.label.clone(), format_tile(tile), format_delta(tile.delta)]);
    }
    println!("{tiles}");

    let mut stats = Table::new();
    stats
        .load_preset(UTF8_FULL)
        .set_header(vec!["Column", "Count", "Mean", "Std", "Min", "Median", "Max"]);
    for column in &report.statistics {
        let s = &column.statistics;
        stats.add_row(vec![
            column.field.to_string(),
            s.count.to_string(),
            format_number(s.mean),
            format_number(s.std),
            format_number(s.min),
            format_number(s.quartiles.map(|q| q.median)),
            format_number(s.max),
        ]);
    }
    println!("{stats}");

    let mut status = Table::new();
    status.load_preset(UTF8_FULL).set_header(vec!["Status", "Orders"]);
    for group in &report.delivery_status.statuses {
        status.add_row(vec![
            group.label.clone(),
            format_number(group.measure("orders")),
        ]);
    }
    status.add_row(vec![
        "Total".to_string(),
        format!("{:.0}", report.delivery_status.total_orders),
    ]);
    println!("{status}");
}

fn format_tile(tile: &MetricTile) -> String {
    match (tile.value, tile.unit) {
        (None, _) => "n/a".to_string(),
        (Some(v), TileUnit::Currency) => format!("${v:.0}"),
        (Some(v), TileUnit::Ratio) => format!("{v:.2}"),
        (Some(v), TileUnit::Days) => format!("{v:.2} days"),
    }
}

fn format_delta(delta: Option<f64>) -> String {
    delta.map_or_else(|| "n/a".to_string(), |d| format!("{:+.1}%", d * 100.0))
}

fn format_number(value: Option<f64>) -> String {
    value.map_or_else(|| "n/a".to_string(), |v| format!("{v:.2}"))
}
