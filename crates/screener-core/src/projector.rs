//! View projection: search filtering and favorite annotation.
//!
//! Everything here is pure. A [`Projection`] is recomputed from a snapshot
//! on every read, so it is correct for any order in which the feeds and
//! toggles resolve.

use serde::{Deserialize, Serialize};

use crate::favorites::FavoriteState;
use crate::store::{FavoritesSlot, ScreenerSnapshot};
use crate::EquityRow;

/// The two screener tabs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tab {
    #[default]
    All,
    Favorites,
}

impl Tab {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::All => "all",
            Self::Favorites => "favorites",
        }
    }
}

/// User-controlled view inputs. Each tab keeps its own search term.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ViewState {
    pub all_search: String,
    pub favorites_search: String,
    pub active_tab: Tab,
}

impl ViewState {
    pub fn search(&self, tab: Tab) -> &str {
        match tab {
            Tab::All => &self.all_search,
            Tab::Favorites => &self.favorites_search,
        }
    }

    pub fn set_search(&mut self, tab: Tab, term: String) {
        match tab {
            Tab::All => self.all_search = term,
            Tab::Favorites => self.favorites_search = term,
        }
    }
}

/// A row annotated with its favorite state.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProjectedRow {
    #[serde(flatten)]
    pub row: EquityRow,
    pub is_favorite: bool,
    pub state: FavoriteState,
}

/// Both tab lists plus the loading flag.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Projection {
    pub all: Vec<ProjectedRow>,
    pub favorites: Vec<ProjectedRow>,
    pub active_tab: Tab,
    /// True while equities or favorites have not resolved yet.
    pub loading: bool,
}

impl Projection {
    pub fn active_rows(&self) -> &[ProjectedRow] {
        match self.active_tab {
            Tab::All => &self.all,
            Tab::Favorites => &self.favorites,
        }
    }
}

/// Case-insensitive substring match of `term` against `company`. A blank
/// term matches everything.
pub fn matches_search(company: &str, term: &str) -> bool {
    let term = term.trim();
    term.is_empty() || company.to_lowercase().contains(&term.to_lowercase())
}

/// Rows matching `term`, in feed order.
pub fn all_view(rows: &[EquityRow], favorites: &FavoritesSlot, term: &str) -> Vec<ProjectedRow> {
    annotated(rows, favorites, term).collect()
}

/// Favorited rows matching `term`, in feed order. Pending adds are included
/// and pending removes are not.
pub fn favorites_view(
    rows: &[EquityRow],
    favorites: &FavoritesSlot,
    term: &str,
) -> Vec<ProjectedRow> {
    annotated(rows, favorites, term)
        .filter(|projected| projected.is_favorite)
        .collect()
}

pub fn project(snapshot: &ScreenerSnapshot) -> Projection {
    let rows = snapshot.rows();
    let favorites = &snapshot.favorites;

    Projection {
        all: all_view(rows, favorites, snapshot.view.search(Tab::All)),
        favorites: favorites_view(rows, favorites, snapshot.view.search(Tab::Favorites)),
        active_tab: snapshot.view.active_tab,
        loading: snapshot.equities.is_pending() || favorites.confirmed.is_pending(),
    }
}

fn annotated<'a>(
    rows: &'a [EquityRow],
    favorites: &'a FavoritesSlot,
    term: &'a str,
) -> impl Iterator<Item = ProjectedRow> + 'a {
    rows.iter()
        .filter(move |row| matches_search(&row.company, term))
        .map(move |row| {
            let state = favorites.state_of(&row.ticker);
            ProjectedRow {
                row: row.clone(),
                is_favorite: state.is_favorite(),
                state,
            }
        })
}
