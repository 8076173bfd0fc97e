//! CLI argument definitions for the screener.
//!
//! # Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `rows` | Screener table for the all or favorites tab |
//! | `cards` | Currency/index summary cards |
//! | `favorites` | The signed-in user's favorite tickers |
//! | `toggle` | Flip one ticker's favorite state |
//! | `chart-symbol` | Convert between display tickers and chart symbols |
//!
//! # Global Options
//!
//! | Option | Default | Description |
//! |--------|---------|-------------|
//! | `--format` | `json` | Output format (json, table) |
//! | `--pretty` | `false` | Pretty-print JSON output |
//! | `--api-base` | `SCREENER_API_BASE` | API origin |
//! | `--cookie` | `SCREENER_SESSION_COOKIE` | Session cookie for favorites |
//! | `--timeout-ms` | `SCREENER_TIMEOUT_MS` | Request timeout in ms |
//! | `--log-level` | `warn` | `tracing` filter directive, logged to stderr |
//!
//! # Examples
//!
//! ```bash
//! screener rows --search bank --format table
//! screener rows --tab favorites --favorites-search hava --cookie "session=..."
//! screener toggle THYAO --cookie "session=..."
//! screener chart-symbol THYAO.IS
//! ```

use clap::{Args, Parser, Subcommand, ValueEnum};
use screener_core::Tab;

/// Equity screener client.
#[derive(Debug, Parser)]
#[command(
    name = "screener",
    author,
    version,
    about = "Equity screener client",
    long_about = "Loads the screener's equity list, currency cards, and favorites from the \
backend and prints the projected view.\n\
\n\
Use 'screener <command> --help' for command-specific help."
)]
pub struct Cli {
    /// Output format for results.
    #[arg(long, global = true, value_enum, default_value_t = OutputFormat::Json)]
    pub format: OutputFormat,

    /// Pretty-print JSON output with indentation.
    #[arg(long, global = true, default_value_t = false)]
    pub pretty: bool,

    /// API origin; overrides SCREENER_API_BASE.
    #[arg(long, global = true)]
    pub api_base: Option<String>,

    /// Session cookie sent with favorites calls; overrides SCREENER_SESSION_COOKIE.
    #[arg(long, global = true)]
    pub cookie: Option<String>,

    /// Per-request timeout in milliseconds; overrides SCREENER_TIMEOUT_MS.
    #[arg(long, global = true)]
    pub timeout_ms: Option<u64>,

    /// Log filter, e.g. `info` or `screener_core=debug`.
    #[arg(long, global = true, default_value = "warn")]
    pub log_level: String,

    #[command(subcommand)]
    pub command: Command,
}

/// Output format options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Aligned columns for terminal display.
    Table,
    /// Single JSON object output.
    Json,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum TabArg {
    All,
    Favorites,
}

impl From<TabArg> for Tab {
    fn from(value: TabArg) -> Self {
        match value {
            TabArg::All => Tab::All,
            TabArg::Favorites => Tab::Favorites,
        }
    }
}

/// Available CLI commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Print the screener rows for one tab.
    ///
    /// # Examples
    ///
    ///   screener rows
    ///   screener rows --search bank --format table
    ///   screener rows --tab favorites --favorites-search hava
    Rows(RowsArgs),

    /// Print the currency/index cards, falling back to built-in cards when
    /// the feed is unavailable.
    Cards,

    /// Print the favorite tickers of the session in --cookie.
    Favorites,

    /// Add or remove one ticker from favorites.
    ///
    /// # Examples
    ///
    ///   screener toggle THYAO --cookie "session=..."
    Toggle(ToggleArgs),

    /// Strip the exchange suffix from a ticker, or re-apply it with --reverse.
    ///
    /// # Examples
    ///
    ///   screener chart-symbol THYAO.IS
    ///   screener chart-symbol THYAO --reverse
    ChartSymbol(ChartSymbolArgs),
}

#[derive(Debug, Args)]
pub struct RowsArgs {
    /// Search term for the all tab.
    #[arg(long, default_value = "")]
    pub search: String,

    /// Search term for the favorites tab.
    #[arg(long, default_value = "")]
    pub favorites_search: String,

    /// Tab to print.
    #[arg(long, value_enum, default_value_t = TabArg::All)]
    pub tab: TabArg,
}

#[derive(Debug, Args)]
pub struct ToggleArgs {
    /// Ticker to toggle, with or without the exchange suffix.
    pub ticker: String,
}

#[derive(Debug, Args)]
pub struct ChartSymbolArgs {
    pub ticker: String,

    /// Convert a chart symbol back to the display ticker.
    #[arg(long, default_value_t = false)]
    pub reverse: bool,
}
