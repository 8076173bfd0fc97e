use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::Ticker;

/// Snapshot of one user's favorited tickers.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FavoriteSet(BTreeSet<Ticker>);

impl FavoriteSet {
    pub const fn new() -> Self {
        Self(BTreeSet::new())
    }

    pub fn contains(&self, ticker: &Ticker) -> bool {
        self.0.contains(ticker)
    }

    /// Sets membership of `ticker` to exactly `favorite`.
    pub fn set_membership(&mut self, ticker: &Ticker, favorite: bool) {
        if favorite {
            self.0.insert(ticker.clone());
        } else {
            self.0.remove(ticker);
        }
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Ticker> {
        self.0.iter()
    }
}

impl FromIterator<Ticker> for FavoriteSet {
    fn from_iter<I: IntoIterator<Item = Ticker>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a FavoriteSet {
    type Item = &'a Ticker;
    type IntoIter = std::collections::btree_set::Iter<'a, Ticker>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}
