//! # Domain Models
//!
//! Normalized screener types and the helpers that derive them from raw feed
//! payloads.
//!
//! | Type | Description |
//! |------|-------------|
//! | [`Ticker`] | Exchange-qualified equity ticker |
//! | [`EquityRow`] | One screener table row |
//! | [`MarketCard`] | Currency/index summary card with sparkline |
//! | [`FavoriteSet`] | A user's favorited tickers |
//!
//! Normalization never fails a batch: a malformed record is dropped and
//! logged at `debug`.

mod equity;
mod favorite_set;
pub mod format;
mod market_card;
mod ticker;

pub use equity::{normalize_equities, EquityRow};
pub use favorite_set::FavoriteSet;
pub use market_card::{fallback_cards, normalize_series, MarketCard, SparkPoint};
pub use ticker::{to_chart_symbol, to_display_ticker, Ticker, EXCHANGE_SUFFIX};
