use analytics::{MarketReport, MetricsEngine};
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use clap::{Args, Parser, Subcommand};
use comfy_table::presets::UTF8_FULL;
use comfy_table::Table;
use configuration::Config;
use market::Market;
use simulator::TradeGenerator;
use std::path::PathBuf;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

/// The main entry point for the stock market simulator.
fn main() -> Result<()> {
    // Logs go to stderr so `report --json` output stays clean.
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    // Parse command-line arguments
    let cli = Cli::parse();

    let config = configuration::load_config(&cli.config).with_context(|| {
        format!("Failed to load configuration from {}", cli.config.display())
    })?;

    // Execute the appropriate command
    match cli.command {
        Commands::Report(args) => handle_report(args, &config),
        Commands::Trades(args) => handle_trades(args, &config),
    }
}

// ==============================================================================
// CLI Structure
// ==============================================================================

/// A toy stock exchange: random trades, dividend and price metrics, all-share index.
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to the configuration file.
    #[arg(long, global = true, default_value = "config.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Simulate a trading session and print every stock metric and the all-share index.
    Report(ReportArgs),
    /// Simulate a trading session and print the generated trades.
    Trades(TradesArgs),
}

/// Overrides for the `[simulation]` section of the configuration.
#[derive(Args)]
struct SimulationArgs {
    /// Seed for the random trade generator, for reproducible sessions.
    #[arg(long)]
    seed: Option<u64>,

    /// Total number of trades to generate across all stocks.
    #[arg(long)]
    trades: Option<usize>,
}

#[derive(Args)]
struct ReportArgs {
    #[command(flatten)]
    simulation: SimulationArgs,

    /// Trailing window of the volume-weighted stock price, in minutes.
    #[arg(long)]
    window: Option<u32>,

    /// Print the report as JSON instead of tables.
    #[arg(long)]
    json: bool,
}

#[derive(Args)]
struct TradesArgs {
    #[command(flatten)]
    simulation: SimulationArgs,

    /// Only show trades of this stock.
    #[arg(long)]
    symbol: Option<String>,
}

// ==============================================================================
// Command Logic
// ==============================================================================

fn handle_report(args: ReportArgs, config: &Config) -> Result<()> {
    let now = Utc::now();
    let market = simulate_session(config, &args.simulation, now)?;

    let window = args.window.unwrap_or(config.metrics.vwap_window_minutes);
    let report = MetricsEngine::new()
        .report(&market, now, window)
        .context("Failed to calculate stock metrics")?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_stocks(&market);
        print_report(&report);
    }
    Ok(())
}

fn handle_trades(args: TradesArgs, config: &Config) -> Result<()> {
    let market = simulate_session(config, &args.simulation, Utc::now())?;
    if let Some(symbol) = &args.symbol {
        // Surface a typo as an error instead of an empty table.
        market.trades(symbol)?;
    }

    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_header(vec!["Symbol", "Timestamp", "Action", "Quantity", "Price"]);

    for (stock, trades) in market.listings() {
        if args.symbol.as_deref().is_some_and(|symbol| symbol != stock.symbol) {
            continue;
        }
        for trade in trades {
            table.add_row(vec![
                stock.symbol.clone(),
                trade.timestamp.format("%Y-%m-%d %H:%M:%S").to_string(),
                trade.action.to_string(),
                trade.quantity.to_string(),
                format!("{:.2}", trade.price),
            ]);
        }
    }

    println!("{table}");
    Ok(())
}

/// Lists the configured stocks, fills them with random trades and captures their prices.
fn simulate_session(
    config: &Config,
    overrides: &SimulationArgs,
    now: DateTime<Utc>,
) -> Result<Market> {
    let mut market = Market::new();
    for listing in &config.market.stocks {
        market.try_register_stock(listing.to_stock()?)?;
    }

    let mut params = config.simulation.clone();
    if let Some(seed) = overrides.seed {
        params.seed = Some(seed);
    }
    if let Some(trades) = overrides.trades {
        params.trade_count = trades;
    }

    let mut generator =
        TradeGenerator::from_params(params).context("Invalid simulation parameters")?;
    generator
        .capture_trades(&mut market, now)
        .context("Failed to generate trades")?;
    generator
        .capture_stock_prices(&mut market)
        .context("Failed to capture stock prices")?;

    tracing::info!(
        stocks = market.len(),
        trades = market.trade_count(),
        seed = ?generator.params().seed,
        "Simulated trading session"
    );
    Ok(market)
}

fn print_stocks(market: &Market) {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL).set_header(vec![
        "Symbol",
        "Type",
        "Last Dividend",
        "Fixed Dividend",
        "Par Value",
        "Price",
    ]);

    for stock in market.stocks() {
        table.add_row(vec![
            stock.symbol.clone(),
            stock.stock_type.to_string(),
            stock.last_dividend.to_string(),
            stock.fixed_dividend.to_string(),
            stock.par_value.to_string(),
            stock
                .price()
                .map_or_else(|| "-".to_string(), |price| format!("{:.2}", price)),
        ]);
    }
    println!("{table}");
}

fn print_report(report: &MarketReport) {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL).set_header(vec![
        "Symbol".to_string(),
        "Dividend Yield".to_string(),
        "P/E Ratio".to_string(),
        format!("VWAP ({}m)", report.window_minutes),
        "Trades".to_string(),
    ]);

    for metrics in &report.stocks {
        table.add_row(vec![
            metrics.symbol.clone(),
            format!("{:.2}", metrics.dividend_yield),
            format!("{:.2}", metrics.pe_ratio),
            format!("{:.2}", metrics.volume_weighted_price),
            metrics.trade_count.to_string(),
        ]);
    }
    println!("{table}");
    println!("All Share Index: {:.2}", report.all_share_index);
}
