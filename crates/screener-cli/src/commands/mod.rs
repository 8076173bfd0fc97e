mod cards;
mod chart_symbol;
mod favorites;
mod rows;
mod toggle;

use screener_core::{FeedSource, FeedState, Screener, ScreenerConfig};
use serde::Serialize;
use serde_json::Value;

use crate::cli::{Cli, Command};
use crate::error::CliError;

/// A feed that failed while the command still produced output.
#[derive(Debug, Clone, Serialize)]
pub struct FeedIssue {
    pub source: FeedSource,
    pub code: &'static str,
    pub message: String,
}

/// Column-oriented view used by the table renderer.
#[derive(Debug, Default)]
pub struct Table {
    pub headers: Vec<&'static str>,
    pub rows: Vec<Vec<String>>,
}

impl Table {
    pub fn new(headers: Vec<&'static str>) -> Self {
        Self {
            headers,
            rows: Vec::new(),
        }
    }

    pub fn push(&mut self, row: Vec<String>) {
        self.rows.push(row);
    }
}

pub struct CommandResult {
    pub data: Value,
    pub table: Table,
    pub errors: Vec<FeedIssue>,
}

impl CommandResult {
    pub fn ok(data: Value, table: Table) -> Self {
        Self {
            data,
            table,
            errors: Vec::new(),
        }
    }

    /// Records `state`'s failure, if any.
    pub fn with_feed<T>(mut self, source: FeedSource, state: &FeedState<T>) -> Self {
        if let Some(error) = state.error() {
            self.errors.push(FeedIssue {
                source,
                code: error.code(),
                message: error.message().to_owned(),
            });
        }
        self
    }
}

pub async fn run(cli: &Cli) -> Result<CommandResult, CliError> {
    if let Command::ChartSymbol(args) = &cli.command {
        return chart_symbol::run(args);
    }

    let screener = Screener::from_config(&load_config(cli)?);

    match &cli.command {
        Command::Rows(args) => rows::run(args, &screener).await,
        Command::Cards => cards::run(&screener).await,
        Command::Favorites => favorites::run(&screener).await,
        Command::Toggle(args) => toggle::run(args, &screener).await,
        Command::ChartSymbol(args) => chart_symbol::run(args),
    }
}

/// Environment configuration with command-line overrides applied.
fn load_config(cli: &Cli) -> Result<ScreenerConfig, CliError> {
    let mut config = ScreenerConfig::from_env()?;
    if let Some(api_base) = &cli.api_base {
        config = config.with_api_base(api_base.clone())?;
    }
    if let Some(cookie) = &cli.cookie {
        config.session_cookie = Some(cookie.clone());
    }
    if let Some(timeout_ms) = cli.timeout_ms {
        config.timeout_ms = timeout_ms;
    }
    Ok(config)
}
