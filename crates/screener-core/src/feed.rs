//! Feed orchestration: the equity and currency fetches, their per-source
//! state, and the fallback policy.
//!
//! Every fetch resolves to a [`FeedState`]. A failure is recorded next to its
//! fallback data instead of being returned as an error, so the presentation
//! layer can always render something.

use std::fmt::{Display, Formatter};
use std::sync::Arc;

use serde::Serialize;
use tracing::{info, warn};

use crate::api::ScreenerApi;
use crate::domain::{fallback_cards, normalize_equities, normalize_series};
use crate::store::ScreenerStore;
use crate::{EquityRow, FeedError, MarketCard};

/// The three independent upstream sources.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FeedSource {
    Equities,
    Currency,
    Favorites,
}

impl FeedSource {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Equities => "equities",
            Self::Currency => "currency",
            Self::Favorites => "favorites",
        }
    }
}

impl Display for FeedSource {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Status flag surfaced to the presentation layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FeedStatus {
    Pending,
    Ready,
    Failed,
}

/// Per-source result.
#[derive(Debug, Clone, PartialEq)]
pub enum FeedState<T> {
    Pending,
    Ready(T),
    /// The fetch failed; `fallback` is what the view shows instead.
    Failed { fallback: T, error: FeedError },
}

impl<T> FeedState<T> {
    pub const fn status(&self) -> FeedStatus {
        match self {
            Self::Pending => FeedStatus::Pending,
            Self::Ready(_) => FeedStatus::Ready,
            Self::Failed { .. } => FeedStatus::Failed,
        }
    }

    pub const fn is_pending(&self) -> bool {
        matches!(self, Self::Pending)
    }

    /// Data to render: the payload when ready, the fallback when failed.
    pub const fn data(&self) -> Option<&T> {
        match self {
            Self::Pending => None,
            Self::Ready(data) | Self::Failed { fallback: data, .. } => Some(data),
        }
    }

    pub fn data_mut(&mut self) -> Option<&mut T> {
        match self {
            Self::Pending => None,
            Self::Ready(data) | Self::Failed { fallback: data, .. } => Some(data),
        }
    }

    pub const fn error(&self) -> Option<&FeedError> {
        match self {
            Self::Failed { error, .. } => Some(error),
            _ => None,
        }
    }
}

impl<T> Default for FeedState<T> {
    fn default() -> Self {
        Self::Pending
    }
}

/// Issues the equity and currency fetches and writes their results into the
/// store. It never touches favorites or view state.
pub struct FeedOrchestrator {
    api: Arc<ScreenerApi>,
    store: ScreenerStore,
}

impl FeedOrchestrator {
    pub fn new(api: Arc<ScreenerApi>, store: ScreenerStore) -> Self {
        Self { api, store }
    }

    /// Fetches and normalizes the equity list. Failure yields an empty list.
    pub async fn load_equities(&self) -> FeedState<Arc<[EquityRow]>> {
        let state = match self.api.list_equities().await {
            Ok(records) => {
                let received = records.len();
                let rows = normalize_equities(records);
                info!(
                    instance = %self.store.instance(),
                    received,
                    rows = rows.len(),
                    "equity feed loaded"
                );
                FeedState::Ready(Arc::from(rows))
            }
            Err(error) => {
                warn!(instance = %self.store.instance(), source = "equities", %error, "feed failed");
                FeedState::Failed {
                    fallback: Arc::from(Vec::new()),
                    error,
                }
            }
        };

        self.store.apply_equities(state.clone());
        state
    }

    /// Fetches the currency/index series. Failure, or a response with no
    /// usable series, yields the built-in fallback cards.
    pub async fn load_currency_series(&self) -> FeedState<Arc<[MarketCard]>> {
        let state = match self.api.list_currency_series().await {
            Ok(raw) => {
                let mut cards = normalize_series(raw);
                if cards.is_empty() {
                    info!(instance = %self.store.instance(), "currency feed empty, using fallback cards");
                    cards = fallback_cards();
                } else {
                    info!(instance = %self.store.instance(), cards = cards.len(), "currency feed loaded");
                }
                FeedState::Ready(Arc::from(cards))
            }
            Err(error) => {
                warn!(instance = %self.store.instance(), source = "currency", %error, "feed failed");
                FeedState::Failed {
                    fallback: Arc::from(fallback_cards()),
                    error,
                }
            }
        };

        self.store.apply_cards(state.clone());
        state
    }
}
