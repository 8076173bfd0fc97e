//! One mounted screener: a store plus the two components that write to it.

use std::sync::Arc;

use tokio::task::JoinHandle;
use tracing::info;

use crate::api::ScreenerApi;
use crate::config::ScreenerConfig;
use crate::favorites::{FavoriteState, FavoritesSynchronizer};
use crate::feed::{FeedOrchestrator, FeedStatus};
use crate::projector::Projection;
use crate::store::{ScreenerSnapshot, ScreenerStore};
use crate::{FavoriteSet, Ticker, ToggleError};

/// Status of each source after [`Screener::load_all`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadReport {
    pub equities: FeedStatus,
    pub currency: FeedStatus,
    pub favorites: FeedStatus,
}

impl LoadReport {
    pub fn any_failed(&self) -> bool {
        [self.equities, self.currency, self.favorites].contains(&FeedStatus::Failed)
    }
}

/// Screener instance. Dropping it closes its store, so results still in
/// flight are discarded.
#[derive(Clone)]
pub struct Screener {
    store: ScreenerStore,
    feeds: Arc<FeedOrchestrator>,
    favorites: Arc<FavoritesSynchronizer>,
    _lifetime: Arc<CloseOnDrop>,
}

impl Screener {
    pub fn new(api: Arc<ScreenerApi>) -> Self {
        let store = ScreenerStore::new();
        Self {
            feeds: Arc::new(FeedOrchestrator::new(Arc::clone(&api), store.clone())),
            favorites: Arc::new(FavoritesSynchronizer::new(api, store.clone())),
            _lifetime: Arc::new(CloseOnDrop(store.clone())),
            store,
        }
    }

    pub fn from_config(config: &ScreenerConfig) -> Self {
        Self::new(Arc::new(ScreenerApi::from_config(config)))
    }

    pub fn store(&self) -> &ScreenerStore {
        &self.store
    }

    pub fn feeds(&self) -> &FeedOrchestrator {
        &self.feeds
    }

    pub fn favorites(&self) -> &FavoritesSynchronizer {
        &self.favorites
    }

    /// Runs the three initial fetches concurrently. Each source writes its
    /// slot as soon as it resolves.
    pub async fn load_all(&self) -> LoadReport {
        load_sources(&self.feeds, &self.favorites, &self.store).await
    }

    /// Spawns the initial fetches on the current runtime. The task does not
    /// keep the instance open: dropping the last `Screener` handle still
    /// closes the store and discards whatever the task resolves afterwards.
    pub fn mount(&self) -> JoinHandle<LoadReport> {
        let feeds = Arc::clone(&self.feeds);
        let favorites = Arc::clone(&self.favorites);
        let store = self.store.clone();
        tokio::spawn(async move { load_sources(&feeds, &favorites, &store).await })
    }

    pub async fn toggle_favorite(&self, ticker: &Ticker) -> Result<FavoriteSet, ToggleError> {
        self.favorites.toggle(ticker).await
    }

    pub fn membership(&self, ticker: &Ticker) -> FavoriteState {
        self.store.membership(ticker)
    }

    pub fn snapshot(&self) -> ScreenerSnapshot {
        self.store.snapshot()
    }

    pub fn projection(&self) -> Projection {
        self.store.projection()
    }

    pub fn close(&self) {
        self.store.close();
    }
}

async fn load_sources(
    feeds: &FeedOrchestrator,
    synchronizer: &FavoritesSynchronizer,
    store: &ScreenerStore,
) -> LoadReport {
    let (equities, currency, favorites) = tokio::join!(
        feeds.load_equities(),
        feeds.load_currency_series(),
        synchronizer.initialize(),
    );

    let report = LoadReport {
        equities: equities.status(),
        currency: currency.status(),
        favorites: favorites.status(),
    };
    info!(
        instance = %store.instance(),
        equities = ?report.equities,
        currency = ?report.currency,
        favorites = ?report.favorites,
        "screener loaded"
    );
    report
}

struct CloseOnDrop(ScreenerStore);

impl Drop for CloseOnDrop {
    fn drop(&mut self) {
        self.0.close();
    }
}
