use serde::Serialize;
use time::OffsetDateTime;

use screener_core::{FeedSource, MarketCard, Screener, SparkPoint};

use crate::error::CliError;

use super::{CommandResult, Table};

#[derive(Debug, Serialize)]
struct CardView<'a> {
    symbol: &'a str,
    value: String,
    change: String,
    negative: bool,
    sparkline: Vec<SparkPoint>,
}

#[derive(Debug, Serialize)]
struct CardsResponseData<'a> {
    cards: Vec<CardView<'a>>,
}

pub async fn run(screener: &Screener) -> Result<CommandResult, CliError> {
    let state = screener.feeds().load_currency_series().await;
    let cards: &[MarketCard] = state.data().map(|cards| &cards[..]).unwrap_or_default();
    let today = OffsetDateTime::now_utc().date();

    let mut table = Table::new(vec!["symbol", "value", "change", "points"]);
    let views: Vec<CardView<'_>> = cards
        .iter()
        .map(|card| {
            table.push(vec![
                card.symbol.clone(),
                card.display_value(),
                card.display_change(),
                card.sparkline.len().to_string(),
            ]);
            CardView {
                symbol: &card.symbol,
                value: card.display_value(),
                change: card.display_change(),
                negative: card.is_negative(),
                sparkline: card.dated_sparkline(today),
            }
        })
        .collect();

    let data = serde_json::to_value(CardsResponseData { cards: views })?;
    Ok(CommandResult::ok(data, table).with_feed(FeedSource::Currency, &state))
}
