use serde::Serialize;

use screener_core::Ticker;

use crate::cli::ChartSymbolArgs;
use crate::error::CliError;

use super::{CommandResult, Table};

#[derive(Debug, Serialize)]
struct ChartSymbolResponseData<'a> {
    ticker: &'a str,
    chart_symbol: &'a str,
}

pub fn run(args: &ChartSymbolArgs) -> Result<CommandResult, CliError> {
    let ticker = if args.reverse {
        Ticker::from_chart_symbol(&args.ticker)?
    } else {
        Ticker::parse(&args.ticker)?
    };

    let mut table = Table::new(vec!["ticker", "chart_symbol"]);
    table.push(vec![ticker.to_string(), ticker.chart_symbol().to_owned()]);

    let data = serde_json::to_value(ChartSymbolResponseData {
        ticker: ticker.as_str(),
        chart_symbol: ticker.chart_symbol(),
    })?;

    Ok(CommandResult::ok(data, table))
}
