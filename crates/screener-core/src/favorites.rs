//! Favorites synchronization: optimistic toggles against the favorites API.
//!
//! A toggle writes a [`PendingToggle`] into the store before the request is
//! sent, so the view shows `PendingAdd`/`PendingRemove` immediately. The
//! server's answer either replaces the confirmed set or rolls the ticker back
//! to the membership recorded in the pending entry.
//!
//! Toggles on the same ticker queue behind a per-ticker async lock; toggles
//! on different tickers run concurrently.

use std::collections::HashMap;
use std::fmt::{Display, Formatter};
use std::sync::{Arc, Mutex, PoisonError};

use serde::Serialize;
use tokio::sync::Mutex as AsyncMutex;
use tracing::{debug, info, warn};

use crate::api::ScreenerApi;
use crate::feed::FeedState;
use crate::store::ScreenerStore;
use crate::{FavoriteSet, Ticker, ToggleError, ToggleFailure};

/// Per-ticker favorite state as seen by the view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FavoriteState {
    NotFavorite,
    Favorite,
    PendingAdd,
    PendingRemove,
}

impl FavoriteState {
    pub const fn settled(favorite: bool) -> Self {
        if favorite {
            Self::Favorite
        } else {
            Self::NotFavorite
        }
    }

    /// Effective membership: a pending add counts as favorited, a pending
    /// remove does not.
    pub const fn is_favorite(self) -> bool {
        matches!(self, Self::Favorite | Self::PendingAdd)
    }

    pub const fn is_pending(self) -> bool {
        matches!(self, Self::PendingAdd | Self::PendingRemove)
    }
}

/// Direction of a toggle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ToggleAction {
    Add,
    Remove,
}

impl ToggleAction {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Add => "add",
            Self::Remove => "remove",
        }
    }
}

impl Display for ToggleAction {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An in-flight toggle. `previous` is the terminal state restored on
/// rollback; `requested` is the terminal state the request asks for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PendingToggle {
    pub ticker: Ticker,
    pub previous: FavoriteState,
    pub requested: FavoriteState,
}

impl PendingToggle {
    pub(crate) fn from_membership(ticker: Ticker, favorite: bool) -> Self {
        Self {
            ticker,
            previous: FavoriteState::settled(favorite),
            requested: FavoriteState::settled(!favorite),
        }
    }

    pub const fn action(&self) -> ToggleAction {
        match self.requested {
            FavoriteState::Favorite | FavoriteState::PendingAdd => ToggleAction::Add,
            FavoriteState::NotFavorite | FavoriteState::PendingRemove => ToggleAction::Remove,
        }
    }

    /// State shown while the request is in flight.
    pub const fn visible_state(&self) -> FavoriteState {
        match self.action() {
            ToggleAction::Add => FavoriteState::PendingAdd,
            ToggleAction::Remove => FavoriteState::PendingRemove,
        }
    }
}

type TickerGates = Mutex<HashMap<Ticker, Arc<AsyncMutex<()>>>>;

/// Owns the favorite set and every mutation of it.
pub struct FavoritesSynchronizer {
    api: Arc<ScreenerApi>,
    store: ScreenerStore,
    gates: TickerGates,
}

impl FavoritesSynchronizer {
    pub fn new(api: Arc<ScreenerApi>, store: ScreenerStore) -> Self {
        Self {
            api,
            store,
            gates: Mutex::new(HashMap::new()),
        }
    }

    /// Loads the user's favorites. A failure leaves an empty set behind the
    /// `Failed` status so the screener stays usable.
    ///
    /// The result is not stored if a toggle settled while the request was in
    /// flight; the server's toggle answer is newer than this snapshot.
    pub async fn initialize(&self) -> FeedState<Arc<FavoriteSet>> {
        let fetched_at = self.store.favorites_generation();
        let state = match self.api.get_favorites().await {
            Ok(set) => {
                info!(instance = %self.store.instance(), favorites = set.len(), "favorites loaded");
                FeedState::Ready(Arc::new(set))
            }
            Err(error) => {
                warn!(instance = %self.store.instance(), source = "favorites", %error, "feed failed");
                FeedState::Failed {
                    fallback: Arc::new(FavoriteSet::new()),
                    error,
                }
            }
        };

        self.store.apply_favorites(state.clone(), fetched_at);
        state
    }

    pub fn membership(&self, ticker: &Ticker) -> FavoriteState {
        self.store.membership(ticker)
    }

    /// Flips the favorite state of `ticker` and returns the server's set.
    ///
    /// The direction is decided once this toggle holds the ticker's lock,
    /// from the confirmed membership at that moment.
    pub async fn toggle(&self, ticker: &Ticker) -> Result<FavoriteSet, ToggleError> {
        if self.store.is_closed() {
            return Err(ToggleError::Closed);
        }

        let lease = GateLease::acquire(&self.gates, ticker);
        let _permit = lease.gate.lock().await;
        self.toggle_exclusive(ticker).await
    }

    async fn toggle_exclusive(&self, ticker: &Ticker) -> Result<FavoriteSet, ToggleError> {
        let record = self.store.begin_toggle(ticker)?;
        let action = record.action();
        let mut guard = RollbackOnDrop {
            store: &self.store,
            record: Some(record.clone()),
        };

        debug!(instance = %self.store.instance(), %ticker, %action, "sending favorite toggle");
        let outcome = match action {
            ToggleAction::Add => self.api.add_favorite(ticker).await,
            ToggleAction::Remove => self.api.remove_favorite(ticker).await,
        };
        guard.disarm();

        match outcome {
            Ok(server_set) => {
                self.store.confirm_toggle(&record, server_set.clone())?;
                info!(
                    instance = %self.store.instance(),
                    %ticker,
                    %action,
                    favorites = server_set.len(),
                    "favorite toggle confirmed"
                );
                Ok(server_set)
            }
            Err(cause) => {
                let failure = ToggleFailure {
                    ticker: ticker.clone(),
                    action,
                    cause,
                };
                warn!(instance = %self.store.instance(), %ticker, error = %failure, "favorite toggle rolled back");
                self.store.rollback_toggle(&record, &failure)?;
                Err(ToggleError::Rejected(failure))
            }
        }
    }
}

/// Shared handle on a ticker's queue lock. The map entry is removed when the
/// last lease for that ticker is dropped.
struct GateLease<'a> {
    gates: &'a TickerGates,
    ticker: Ticker,
    gate: Arc<AsyncMutex<()>>,
}

impl<'a> GateLease<'a> {
    fn acquire(gates: &'a TickerGates, ticker: &Ticker) -> Self {
        let gate = gates
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(ticker.clone())
            .or_default()
            .clone();

        Self {
            gates,
            ticker: ticker.clone(),
            gate,
        }
    }
}

impl Drop for GateLease<'_> {
    fn drop(&mut self) {
        let mut gates = self.gates.lock().unwrap_or_else(PoisonError::into_inner);
        // One reference in the map, one here: nobody else is queued.
        if Arc::strong_count(&self.gate) == 2 {
            gates.remove(&self.ticker);
        }
    }
}

/// Restores the pre-toggle membership if the toggle future is dropped while
/// its request is in flight.
struct RollbackOnDrop<'a> {
    store: &'a ScreenerStore,
    record: Option<PendingToggle>,
}

impl RollbackOnDrop<'_> {
    fn disarm(&mut self) {
        self.record = None;
    }
}

impl Drop for RollbackOnDrop<'_> {
    fn drop(&mut self) {
        if let Some(record) = self.record.take() {
            debug!(ticker = %record.ticker, "toggle dropped in flight, restoring membership");
            self.store.abandon_toggle(&record);
        }
    }
}
