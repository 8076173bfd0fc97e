use serde::Serialize;

use screener_core::{FeedSource, Screener, Ticker};

use crate::error::CliError;

use super::{CommandResult, Table};

#[derive(Debug, Serialize)]
struct FavoritesResponseData<'a> {
    favorites: Vec<&'a Ticker>,
}

pub async fn run(screener: &Screener) -> Result<CommandResult, CliError> {
    let state = screener.favorites().initialize().await;
    let favorites: Vec<&Ticker> = state.data().map(|set| set.iter().collect()).unwrap_or_default();

    let mut table = Table::new(vec!["ticker", "chart_symbol"]);
    for ticker in &favorites {
        table.push(vec![ticker.to_string(), ticker.chart_symbol().to_owned()]);
    }

    let data = serde_json::to_value(FavoritesResponseData { favorites })?;
    Ok(CommandResult::ok(data, table).with_feed(FeedSource::Favorites, &state))
}
