//! CLI argument definitions for orderdesk.
//!
//! # Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `order` | Submit a stock order through the brokerage proxy |
//! | `clock` | Print the dashboard clock once per second |
//!
//! # Global Options
//!
//! | Option | Default | Description |
//! |--------|---------|-------------|
//! | `--format` | `text` | Output format (text, json) |
//! | `--base-url` | `$ORDERDESK_BASE_URL` | Dashboard backend URL |
//! | `--timeout-ms` | `$ORDERDESK_TIMEOUT_MS` | Request timeout in ms |
//!
//! # Examples
//!
//! ```bash
//! # Market order for one share
//! orderdesk order --symbol 005930
//!
//! # Limit order on NXT
//! orderdesk order --market NXT --symbol 005930 --qty 10 --price 70000 --trade-type 0
//!
//! # Clock seeded from the server, five lines
//! orderdesk clock --server --ticks 5
//! ```

use clap::{Args, Parser, Subcommand, ValueEnum};
use orderdesk_core::{Market, TradeType};

/// Order entry and clock for the trading dashboard.
#[derive(Debug, Parser)]
#[command(
    name = "orderdesk",
    author,
    version,
    about = "Order entry and clock for the trading dashboard"
)]
pub struct Cli {
    /// Output format for results.
    #[arg(long, global = true, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,

    /// Dashboard backend base URL (overrides ORDERDESK_BASE_URL).
    #[arg(long, global = true)]
    pub base_url: Option<String>,

    /// Request timeout budget in milliseconds (overrides ORDERDESK_TIMEOUT_MS).
    #[arg(long, global = true)]
    pub timeout_ms: Option<u64>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Plain text, one message per line.
    Text,
    /// One JSON object per line.
    Json,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Submit a stock order (broker operation kt10000).
    ///
    /// Blank --price and --cond-price are sent as null.
    ///
    /// # Examples
    ///
    ///   orderdesk order --symbol 005930
    ///   orderdesk order --symbol 005930 --price 70000 --trade-type 0
    Order(OrderArgs),

    /// Print the dashboard clock every second until interrupted.
    Clock(ClockArgs),
}

#[derive(Debug, Args)]
pub struct OrderArgs {
    /// Exchange code (KRX, NXT, SOR).
    #[arg(long, default_value = "KRX")]
    pub market: Market,

    /// Security code, e.g. 005930.
    #[arg(long, default_value = "")]
    pub symbol: String,

    /// Order quantity.
    #[arg(long, default_value = "1")]
    pub qty: String,

    /// Limit price; leave blank for none.
    #[arg(long, default_value = "")]
    pub price: String,

    /// Trade-type code (0 limit, 3 market, 5 conditional limit, ...).
    #[arg(long, default_value = "3")]
    pub trade_type: TradeType,

    /// Conditional price; leave blank for none.
    #[arg(long, default_value = "")]
    pub cond_price: String,
}

#[derive(Debug, Args)]
pub struct ClockArgs {
    /// Seed the display from the server's /api/v1/system/time endpoint.
    #[arg(long, default_value_t = false)]
    pub server: bool,

    /// Stop after printing this many lines.
    #[arg(long, value_parser = clap::value_parser!(u64).range(1..))]
    pub ticks: Option<u64>,
}
