use serde::Serialize;

use screener_core::{FavoriteState, FeedSource, Screener, Ticker};

use crate::cli::ToggleArgs;
use crate::error::CliError;

use super::{CommandResult, Table};

#[derive(Debug, Serialize)]
struct ToggleResponseData<'a> {
    ticker: &'a Ticker,
    state: FavoriteState,
    favorites: usize,
}

pub async fn run(args: &ToggleArgs, screener: &Screener) -> Result<CommandResult, CliError> {
    let ticker = Ticker::parse(&args.ticker)?;

    // The toggle needs the listed rows and the current membership.
    let (equities, favorites) = tokio::join!(
        screener.feeds().load_equities(),
        screener.favorites().initialize(),
    );

    let server_set = screener.toggle_favorite(&ticker).await?;
    let state = screener.membership(&ticker);

    let mut table = Table::new(vec!["ticker", "state", "favorites"]);
    table.push(vec![
        ticker.to_string(),
        state_label(state).to_owned(),
        server_set.len().to_string(),
    ]);

    let data = serde_json::to_value(ToggleResponseData {
        ticker: &ticker,
        state,
        favorites: server_set.len(),
    })?;

    Ok(CommandResult::ok(data, table)
        .with_feed(FeedSource::Equities, &equities)
        .with_feed(FeedSource::Favorites, &favorites))
}

fn state_label(state: FavoriteState) -> &'static str {
    match state {
        FavoriteState::Favorite => "favorite",
        FavoriteState::NotFavorite => "not favorite",
        FavoriteState::PendingAdd => "adding",
        FavoriteState::PendingRemove => "removing",
    }
}
