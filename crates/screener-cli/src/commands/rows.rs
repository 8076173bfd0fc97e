use serde::Serialize;

use screener_core::{FeedSource, ProjectedRow, Screener, Tab};

use crate::cli::RowsArgs;
use crate::error::CliError;

use super::{CommandResult, Table};

#[derive(Debug, Serialize)]
struct RowsResponseData<'a> {
    tab: Tab,
    search: &'a str,
    rows: &'a [ProjectedRow],
}

pub async fn run(args: &RowsArgs, screener: &Screener) -> Result<CommandResult, CliError> {
    let (equities, favorites) = tokio::join!(
        screener.feeds().load_equities(),
        screener.favorites().initialize(),
    );

    let store = screener.store();
    store.set_search(Tab::All, args.search.as_str());
    store.set_search(Tab::Favorites, args.favorites_search.as_str());
    store.set_active_tab(args.tab.into());

    let projection = screener.projection();
    let rows = projection.active_rows();
    let tab = projection.active_tab;
    let search = match tab {
        Tab::All => args.search.as_str(),
        Tab::Favorites => args.favorites_search.as_str(),
    };
    let data = serde_json::to_value(RowsResponseData { tab, search, rows })?;

    let mut table = Table::new(vec![
        "#", "ticker", "company", "price", "day", "month", "year", "market_cap", "fav",
    ]);
    for projected in rows {
        let row = &projected.row;
        table.push(vec![
            row.key.to_string(),
            row.ticker.to_string(),
            row.company.clone(),
            row.display_price(),
            row.display_day_change(),
            row.display_month_change(),
            row.display_year_change(),
            row.market_cap.clone(),
            favorite_marker(projected).to_owned(),
        ]);
    }

    Ok(CommandResult::ok(data, table)
        .with_feed(FeedSource::Equities, &equities)
        .with_feed(FeedSource::Favorites, &favorites))
}

fn favorite_marker(projected: &ProjectedRow) -> &'static str {
    match (projected.is_favorite, projected.state.is_pending()) {
        (true, false) => "*",
        (true, true) => "+",
        (false, true) => "-",
        (false, false) => "",
    }
}
