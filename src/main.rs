use analytics::format::{
    format_currency, format_market_cap, format_naive_date, format_number, format_percentage,
    format_price_change, format_volume, CurrencyFormat, DateFormat, NumberFormat, PercentFormat,
};
use analytics::{
    latest_quote, market_summary, market_snapshot, range_stats, sector_performance,
    technical_indicators_with,
};
use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use comfy_table::{presets::UTF8_FULL, Cell, Table};
use configuration::{load_config, Config, LogFormat, LoggingSettings};
use database::{DbRepository, InMemoryRepository, MarketRepository};
use rust_decimal::Decimal;
use std::net::IpAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter, Layer, Registry};
use web_server::AppState;

/// The main entry point for the Tickerboard market dashboard.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file, if there is one
    dotenvy::dotenv().ok();

    // Parse command-line arguments
    let cli = Cli::parse();

    let config = load_config(&cli.config)
        .with_context(|| format!("failed to load configuration from {}", cli.config.display()))?;
    let _log_guard = init_tracing(&config.logging, cli.log_format);

    // Execute the appropriate command
    match cli.command {
        Commands::Serve(args) => handle_serve(args, config).await,
        Commands::Summary(source) => handle_summary(source, &config).await,
        Commands::Indicators(args) => handle_indicators(args, &config).await,
    }
}

// ==============================================================================
// CLI Structure
// ==============================================================================

/// Indian stock market dashboard: REST API and terminal reports.
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to the TOML configuration file.
    #[arg(long, global = true, default_value = "config.toml")]
    config: PathBuf,

    /// Overrides `logging.format` from the configuration.
    #[arg(long, global = true, value_enum)]
    log_format: Option<LogFormat>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the REST API.
    Serve(ServeArgs),
    /// Print the market summary and a per-company table.
    Summary(DataSource),
    /// Print moving averages and range statistics for one company.
    Indicators(IndicatorsArgs),
}

#[derive(Args)]
struct DataSource {
    /// Serve data from a JSON fixture instead of PostgreSQL.
    #[arg(long)]
    fixture: Option<PathBuf>,
}

#[derive(Args)]
struct ServeArgs {
    /// Overrides `server.host`.
    #[arg(long)]
    host: Option<IpAddr>,

    /// Overrides `server.port`.
    #[arg(long)]
    port: Option<u16>,

    #[command(flatten)]
    source: DataSource,
}

#[derive(Args)]
struct IndicatorsArgs {
    #[arg(long)]
    company_id: i32,

    /// Days of history to analyse (defaults to `market.default_history_days`).
    #[arg(long)]
    days: Option<u32>,

    #[command(flatten)]
    source: DataSource,
}

// ==============================================================================
// Startup
// ==============================================================================

/// Installs the global subscriber. The returned guard flushes the log file on drop.
fn init_tracing(settings: &LoggingSettings, format_override: Option<LogFormat>) -> Option<WorkerGuard> {
    let stdout_layer: Box<dyn Layer<Registry> + Send + Sync> =
        match format_override.unwrap_or(settings.format) {
            LogFormat::Full => fmt::layer().with_target(false).boxed(),
            LogFormat::Compact => fmt::layer().compact().boxed(),
            LogFormat::Pretty => fmt::layer().pretty().boxed(),
        };

    let (file_layer, guard) = match &settings.directory {
        Some(directory) => {
            let appender = tracing_appender::rolling::daily(directory, "tickerboard.log");
            let (writer, guard) = tracing_appender::non_blocking(appender);
            (Some(fmt::layer().with_ansi(false).with_writer(writer)), Some(guard))
        }
        None => (None, None),
    };

    // RUST_LOG wins over the configured level.
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&settings.level));

    tracing_subscriber::registry()
        .with(stdout_layer)
        .with(file_layer)
        .with(filter)
        .init();

    guard
}

/// Opens the fixture when one is given, otherwise connects to PostgreSQL.
async fn open_repository(
    source: &DataSource,
    config: &Config,
) -> anyhow::Result<Arc<dyn MarketRepository>> {
    if let Some(path) = &source.fixture {
        let repo = InMemoryRepository::from_fixture(path)
            .await
            .with_context(|| format!("failed to load fixture {}", path.display()))?;
        return Ok(Arc::new(repo));
    }

    let pool = database::connect(&config.database)
        .await
        .context("failed to connect to the database")?;
    if config.database.run_migrations {
        database::run_migrations(&pool)
            .await
            .context("failed to run database migrations")?;
    }
    Ok(Arc::new(DbRepository::new(pool)))
}

// ==============================================================================
// Command Logic
// ==============================================================================

async fn handle_serve(args: ServeArgs, config: Config) -> anyhow::Result<()> {
    let mut server = config.server.clone();
    if let Some(host) = args.host {
        server.host = host;
    }
    if let Some(port) = args.port {
        server.port = port;
    }

    let repo = open_repository(&args.source, &config).await?;
    let backend = if args.source.fixture.is_some() { "fixture" } else { "postgres" };
    tracing::info!(backend, "Market data repository ready.");

    web_server::run_server(server.socket_addr(), AppState::new(repo, config.market)).await
}

async fn handle_summary(source: DataSource, config: &Config) -> anyhow::Result<()> {
    let repo = open_repository(&source, config).await?;
    let companies = repo.list_companies().await?;

    let summary = market_summary(&companies);
    println!(
        "Companies: {}  Gainers: {}  Losers: {}  Unchanged: {}  Total market cap: {}",
        summary.total_companies(),
        summary.gainers,
        summary.losers,
        summary.unchanged,
        format_market_cap(Some(summary.total_market_cap)),
    );

    let by_id: std::collections::HashMap<i32, _> = companies.iter().map(|c| (c.id, c)).collect();
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_header(vec!["Symbol", "Name", "Sector", "Price", "Change", "Change %", "Volume", "Market Cap"]);
    for row in market_snapshot(&companies) {
        let change = by_id
            .get(&row.id)
            .map(|c| format_price_change(c.current_price, c.previous_close));
        let (absolute, percentage) = change
            .map(|c| (c.absolute, c.percentage))
            .unwrap_or_default();
        table.add_row(vec![
            Cell::new(&row.symbol),
            Cell::new(&row.name),
            Cell::new(&row.sector),
            Cell::new(format_currency(row.current_price, CurrencyFormat::default())),
            Cell::new(absolute),
            Cell::new(percentage),
            Cell::new(format_volume(row.volume)),
            Cell::new(format_market_cap(row.market_cap)),
        ]);
    }
    println!("{table}");

    let mut sectors = Table::new();
    sectors
        .load_preset(UTF8_FULL)
        .set_header(vec!["Sector", "Companies", "Average Price", "Market Cap"]);
    for sector in sector_performance(&companies) {
        sectors.add_row(vec![
            Cell::new(&sector.sector),
            Cell::new(sector.company_count),
            Cell::new(format_currency(sector.average_price, CurrencyFormat::default())),
            Cell::new(format_market_cap(sector.total_market_cap)),
        ]);
    }
    println!("{sectors}");

    Ok(())
}

async fn handle_indicators(args: IndicatorsArgs, config: &Config) -> anyhow::Result<()> {
    let repo = open_repository(&args.source, config).await?;
    let company = repo
        .get_company(args.company_id)
        .await
        .with_context(|| format!("company {} not found", args.company_id))?;

    let market = &config.market;
    let long_days = u32::try_from(market.sma_long_period).unwrap_or(u32::MAX);
    let days = market.history_days(args.days.or(Some(market.default_history_days.max(long_days))));
    let bars = repo.price_history(company.id, days).await?;

    println!("{} ({}): {} bars", company.name, company.symbol, bars.len());
    let Some(quote) = latest_quote(&bars).map(|q| q.rounded()) else {
        println!("No stock data found.");
        return Ok(());
    };

    let indicators =
        technical_indicators_with(&bars, market.sma_short_period, market.sma_long_period);
    let stats = range_stats(&bars);
    let price = |value: Option<Decimal>| format_currency(value, CurrencyFormat::default());

    let mut table = Table::new();
    table.load_preset(UTF8_FULL).set_header(vec!["Metric", "Value"]);
    table.add_row(vec![
        Cell::new("As of"),
        Cell::new(format_naive_date(quote.date, DateFormat::default())),
    ]);
    table.add_row(vec![Cell::new("Last close"), Cell::new(price(Some(quote.price)))]);
    table.add_row(vec![
        Cell::new("Change"),
        Cell::new(format!(
            "{} ({})",
            price(Some(quote.change)),
            format_percentage(Some(quote.change_percent), PercentFormat::default())
        )),
    ]);
    table.add_row(vec![
        Cell::new(format!("SMA {}", market.sma_short_period)),
        Cell::new(price(indicators.sma_20)),
    ]);
    table.add_row(vec![
        Cell::new(format!("SMA {}", market.sma_long_period)),
        Cell::new(price(indicators.sma_50)),
    ]);
    if let Some(stats) = stats {
        table.add_row(vec![Cell::new("Period high"), Cell::new(price(Some(stats.high)))]);
        table.add_row(vec![Cell::new("Period low"), Cell::new(price(Some(stats.low)))]);
        table.add_row(vec![Cell::new("Range"), Cell::new(price(Some(stats.range)))]);
        table.add_row(vec![
            Cell::new("Average volume"),
            Cell::new(format_number(
                Some(stats.average_volume),
                NumberFormat { compact: true, decimals: 1 },
            )),
        ]);
    }
    println!("{table}");

    Ok(())
}
