//! Per-instance screener state behind a `tokio::sync::watch` channel.
//!
//! Each mounted [`Screener`](crate::Screener) owns one store. Writers go
//! through [`ScreenerStore`] methods; every write bumps the snapshot revision
//! and wakes subscribers. Once [`close`](ScreenerStore::close) is called all
//! writes are discarded, so a fetch or toggle that resolves after teardown
//! cannot touch anything.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

use serde::Serialize;
use tokio::sync::watch;
use tracing::debug;
use uuid::Uuid;

use crate::favorites::{FavoriteState, PendingToggle};
use crate::feed::FeedState;
use crate::projector::{project, Projection, Tab, ViewState};
use crate::{EquityRow, FavoriteSet, MarketCard, Ticker, ToggleError, ToggleFailure};

static NO_FAVORITES: FavoriteSet = FavoriteSet::new();

/// Dismissible notification raised when a toggle is rolled back.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notice {
    pub id: u64,
    pub ticker: Ticker,
    pub message: String,
}

/// Confirmed favorites plus the toggles still waiting on the server.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FavoritesSlot {
    pub confirmed: FeedState<Arc<FavoriteSet>>,
    pub pending: BTreeMap<Ticker, PendingToggle>,
    /// Bumped whenever a settled toggle rewrites `confirmed`. A favorites
    /// fetch started under an older generation is stale.
    pub generation: u64,
}

impl FavoritesSlot {
    /// A settled slot holding `set`, mostly useful for tests.
    pub fn from_set(set: FavoriteSet) -> Self {
        Self {
            confirmed: FeedState::Ready(Arc::new(set)),
            pending: BTreeMap::new(),
            generation: 0,
        }
    }

    /// Last server-confirmed set; empty while the initial load is pending.
    pub fn confirmed_set(&self) -> &FavoriteSet {
        self.confirmed.data().map_or(&NO_FAVORITES, |set| &**set)
    }

    /// Confirmed set with every pending intent applied on top.
    pub fn effective(&self) -> FavoriteSet {
        let mut set = self.confirmed_set().clone();
        for record in self.pending.values() {
            set.set_membership(&record.ticker, record.requested.is_favorite());
        }
        set
    }

    pub fn state_of(&self, ticker: &Ticker) -> FavoriteState {
        match self.pending.get(ticker) {
            Some(record) => record.visible_state(),
            None => FavoriteState::settled(self.confirmed_set().contains(ticker)),
        }
    }

    fn adopt(&mut self, record: &PendingToggle, server_set: FavoriteSet) {
        self.pending.remove(&record.ticker);
        self.confirmed = match std::mem::take(&mut self.confirmed) {
            FeedState::Failed { error, .. } => FeedState::Failed {
                fallback: Arc::new(server_set),
                error,
            },
            _ => FeedState::Ready(Arc::new(server_set)),
        };
        self.generation += 1;
    }

    fn restore(&mut self, record: &PendingToggle) {
        self.pending.remove(&record.ticker);
        if let Some(set) = self.confirmed.data_mut() {
            Arc::make_mut(set).set_membership(&record.ticker, record.previous.is_favorite());
        }
        self.generation += 1;
    }
}

/// Everything the presentation layer reads.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScreenerSnapshot {
    /// Incremented on every accepted write.
    pub revision: u64,
    pub equities: FeedState<Arc<[EquityRow]>>,
    pub cards: FeedState<Arc<[MarketCard]>>,
    pub favorites: FavoritesSlot,
    pub view: ViewState,
    pub notices: Vec<Notice>,
}

impl ScreenerSnapshot {
    pub fn rows(&self) -> &[EquityRow] {
        self.equities.data().map(|rows| &rows[..]).unwrap_or_default()
    }

    pub fn cards(&self) -> &[MarketCard] {
        self.cards.data().map(|cards| &cards[..]).unwrap_or_default()
    }

    pub fn effective_favorites(&self) -> FavoriteSet {
        self.favorites.effective()
    }

    pub fn projection(&self) -> Projection {
        project(self)
    }

    fn is_listed(&self, ticker: &Ticker) -> bool {
        self.rows().iter().any(|row| &row.ticker == ticker)
    }
}

#[derive(Debug)]
struct StoreInner {
    instance: Uuid,
    closed: AtomicBool,
    next_notice: AtomicU64,
    state: watch::Sender<ScreenerSnapshot>,
}

/// Cheaply clonable handle on one instance's state.
#[derive(Debug, Clone)]
pub struct ScreenerStore {
    inner: Arc<StoreInner>,
}

impl Default for ScreenerStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ScreenerStore {
    pub fn new() -> Self {
        let (state, _) = watch::channel(ScreenerSnapshot::default());
        Self {
            inner: Arc::new(StoreInner {
                instance: Uuid::new_v4(),
                closed: AtomicBool::new(false),
                next_notice: AtomicU64::new(1),
                state,
            }),
        }
    }

    pub fn instance(&self) -> Uuid {
        self.inner.instance
    }

    pub fn snapshot(&self) -> ScreenerSnapshot {
        self.inner.state.borrow().clone()
    }

    /// Receiver that is notified after every accepted write.
    pub fn subscribe(&self) -> watch::Receiver<ScreenerSnapshot> {
        self.inner.state.subscribe()
    }

    /// Projection of the current snapshot, recomputed on every call.
    pub fn projection(&self) -> Projection {
        project(&self.inner.state.borrow())
    }

    pub fn membership(&self, ticker: &Ticker) -> FavoriteState {
        self.inner.state.borrow().favorites.state_of(ticker)
    }

    /// Detaches the instance; later writes are dropped.
    pub fn close(&self) {
        if !self.inner.closed.swap(true, Ordering::SeqCst) {
            debug!(instance = %self.inner.instance, "screener instance closed");
        }
    }

    pub fn is_closed(&self) -> bool {
        self.inner.closed.load(Ordering::SeqCst)
    }

    pub fn set_search(&self, tab: Tab, term: impl Into<String>) {
        let term = term.into();
        self.update(|snapshot| snapshot.view.set_search(tab, term));
    }

    pub fn set_active_tab(&self, tab: Tab) {
        self.update(|snapshot| snapshot.view.active_tab = tab);
    }

    /// Returns whether a notice with `id` was present.
    pub fn dismiss_notice(&self, id: u64) -> bool {
        self.update(|snapshot| {
            let before = snapshot.notices.len();
            snapshot.notices.retain(|notice| notice.id != id);
            snapshot.notices.len() != before
        })
        .unwrap_or(false)
    }

    pub(crate) fn apply_equities(&self, state: FeedState<Arc<[EquityRow]>>) -> bool {
        self.update(|snapshot| snapshot.equities = state).is_some()
    }

    pub(crate) fn apply_cards(&self, state: FeedState<Arc<[MarketCard]>>) -> bool {
        self.update(|snapshot| snapshot.cards = state).is_some()
    }

    /// Generation to pass back to [`apply_favorites`](Self::apply_favorites)
    /// when the fetch it tags resolves.
    pub(crate) fn favorites_generation(&self) -> u64 {
        self.inner.state.borrow().favorites.generation
    }

    /// Stores a favorites fetch result unless a toggle settled after the
    /// fetch started at `fetched_at`; such a result predates the server's
    /// newer answer and is dropped.
    pub(crate) fn apply_favorites(
        &self,
        state: FeedState<Arc<FavoriteSet>>,
        fetched_at: u64,
    ) -> bool {
        let outcome = self.try_update(|snapshot| {
            let current = snapshot.favorites.generation;
            if current != fetched_at {
                return Err(current);
            }
            snapshot.favorites.confirmed = state;
            Ok(())
        });

        match outcome {
            Some(Ok(())) => true,
            Some(Err(current)) => {
                debug!(
                    instance = %self.inner.instance,
                    fetched_at,
                    current,
                    "discarding favorites superseded by a settled toggle"
                );
                false
            }
            None => false,
        }
    }

    /// Records the optimistic change for `ticker` and returns its record.
    ///
    /// Rejected while the favorites load is pending: the direction of a
    /// toggle is only known once the confirmed set has arrived.
    pub(crate) fn begin_toggle(&self, ticker: &Ticker) -> Result<PendingToggle, ToggleError> {
        self.try_update(|snapshot| {
            if !snapshot.is_listed(ticker) {
                return Err(ToggleError::UnknownTicker {
                    ticker: ticker.clone(),
                });
            }
            if snapshot.favorites.confirmed.is_pending() {
                return Err(ToggleError::FavoritesLoading {
                    ticker: ticker.clone(),
                });
            }

            let favorite = snapshot.favorites.confirmed_set().contains(ticker);
            let record = PendingToggle::from_membership(ticker.clone(), favorite);
            snapshot
                .favorites
                .pending
                .insert(ticker.clone(), record.clone());
            Ok(record)
        })
        .unwrap_or(Err(ToggleError::Closed))
    }

    /// Adopts the server's set. Other pending intents stay in the log and
    /// keep overlaying the new set.
    pub(crate) fn confirm_toggle(
        &self,
        record: &PendingToggle,
        server_set: FavoriteSet,
    ) -> Result<(), ToggleError> {
        self.update(|snapshot| snapshot.favorites.adopt(record, server_set))
            .ok_or(ToggleError::Closed)
    }

    /// Restores the pre-toggle membership and raises one notice.
    pub(crate) fn rollback_toggle(
        &self,
        record: &PendingToggle,
        failure: &ToggleFailure,
    ) -> Result<Notice, ToggleError> {
        let notice = Notice {
            id: self.inner.next_notice.fetch_add(1, Ordering::Relaxed),
            ticker: record.ticker.clone(),
            message: format!("Could not {} {} in favorites.", failure.action, record.ticker),
        };

        self.update(|snapshot| {
            snapshot.favorites.restore(record);
            snapshot.notices.push(notice.clone());
        })
        .map(|()| notice)
        .ok_or(ToggleError::Closed)
    }

    /// Restores the pre-toggle membership without a notice.
    pub(crate) fn abandon_toggle(&self, record: &PendingToggle) {
        self.update(|snapshot| snapshot.favorites.restore(record));
    }

    /// Applies `write` unless the instance is closed.
    fn update<R>(&self, write: impl FnOnce(&mut ScreenerSnapshot) -> R) -> Option<R> {
        if self.is_closed() {
            debug!(instance = %self.inner.instance, "discarding write to closed instance");
            return None;
        }

        let mut output = None;
        self.inner.state.send_modify(|snapshot| {
            snapshot.revision += 1;
            output = Some(write(snapshot));
        });
        output
    }

    /// Like [`update`](Self::update), but an `Err` from `write` leaves the
    /// revision alone and wakes nobody. `write` must not mutate the snapshot
    /// before returning `Err`. `None` means the instance is closed.
    fn try_update<T, E>(
        &self,
        write: impl FnOnce(&mut ScreenerSnapshot) -> Result<T, E>,
    ) -> Option<Result<T, E>> {
        if self.is_closed() {
            debug!(instance = %self.inner.instance, "discarding write to closed instance");
            return None;
        }

        let mut output = None;
        self.inner.state.send_if_modified(|snapshot| {
            let result = write(snapshot);
            let modified = result.is_ok();
            if modified {
                snapshot.revision += 1;
            }
            output = Some(result);
            modified
        });
        output
    }
}
