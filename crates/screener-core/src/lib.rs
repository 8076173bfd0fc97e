//! # Screener Core
//!
//! Market-view synchronization for the equity screener: feed loading with
//! fallbacks, optimistic favorites, and the searchable two-tab projection.
//!
//! ## Overview
//!
//! - **Feed orchestration** for the equity list and currency/index series,
//!   each resolving to a [`FeedState`] that carries fallback data on failure
//! - **Favorites synchronization** with optimistic toggles, per-ticker
//!   queuing, and rollback with a user notice
//! - **View projection** that filters and annotates rows, recomputed from
//!   the current snapshot on every read
//! - **Ticker normalization** between exchange-qualified and chart symbols
//!
//! ## Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`api`] | REST client for the screener backend |
//! | [`config`] | Environment configuration |
//! | [`domain`] | Tickers, rows, cards, favorite sets |
//! | [`error`] | Error types |
//! | [`favorites`] | Favorites synchronizer |
//! | [`feed`] | Feed orchestrator and `FeedState` |
//! | [`http_client`] | HTTP transport abstraction |
//! | [`projector`] | Search and tab projection |
//! | [`retry`] | Retry policy for GET feeds |
//! | [`screener`] | Mounted screener instance |
//! | [`store`] | Per-instance snapshot store |
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use screener_core::{Screener, ScreenerConfig, Tab};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let screener = Screener::from_config(&ScreenerConfig::from_env()?);
//!     screener.load_all().await;
//!
//!     screener.store().set_search(Tab::All, "bank");
//!     for projected in screener.projection().active_rows() {
//!         println!("{} {}", projected.row.ticker, projected.row.display_price());
//!     }
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────┐     ┌──────────────────────┐
//! │ Feed            │     │ Favorites            │
//! │ Orchestrator    │     │ Synchronizer         │
//! └────────┬────────┘     └──────────┬───────────┘
//!          │ slots                   │ slot + pending log
//!          ▼                         ▼
//! ┌──────────────────────────────────────────────┐
//! │ ScreenerStore (watch channel, per instance)  │
//! └────────────────────────┬─────────────────────┘
//!                          │ snapshot
//!                          ▼
//!                 ┌─────────────────┐
//!                 │ View Projector  │
//!                 └─────────────────┘
//! ```
//!
//! ## Error Handling
//!
//! Feed failures never escape as errors; they are kept in the state next to
//! the fallback data:
//!
//! ```rust
//! use screener_core::{FeedErrorKind, FeedState, MarketCard};
//!
//! fn describe(state: &FeedState<Vec<MarketCard>>) -> &'static str {
//!     match state.error().map(|error| error.kind()) {
//!         None => "live",
//!         Some(FeedErrorKind::Unauthenticated) => "signed out",
//!         Some(_) => "showing fallback",
//!     }
//! }
//! ```

pub mod api;
pub mod config;
pub mod domain;
pub mod error;
pub mod favorites;
pub mod feed;
pub mod http_client;
pub mod projector;
pub mod retry;
pub mod screener;
pub mod store;

// Re-export commonly used types at crate root for convenience

// API client
pub use api::ScreenerApi;

// Configuration
pub use config::{ScreenerConfig, DEFAULT_API_BASE};

// Domain models
pub use domain::{
    fallback_cards, normalize_equities, normalize_series, to_chart_symbol, to_display_ticker,
    EquityRow, FavoriteSet, MarketCard, SparkPoint, Ticker, EXCHANGE_SUFFIX,
};

// Error types
pub use error::{
    ConfigError, FeedError, FeedErrorKind, ToggleError, ToggleFailure, ValidationError,
};

// Favorites
pub use favorites::{FavoriteState, FavoritesSynchronizer, PendingToggle, ToggleAction};

// Feeds
pub use feed::{FeedOrchestrator, FeedSource, FeedState, FeedStatus};

// HTTP client types
pub use http_client::{
    HttpAuth, HttpClient, HttpError, HttpMethod, HttpRequest, HttpResponse, ReqwestHttpClient,
};

// Projection
pub use projector::{
    all_view, favorites_view, matches_search, project, ProjectedRow, Projection, Tab, ViewState,
};

// Retry logic
pub use retry::{Backoff, RetryPolicy};

// Screener instance
pub use screener::{LoadReport, Screener};

// Store
pub use store::{FavoritesSlot, Notice, ScreenerSnapshot, ScreenerStore};
