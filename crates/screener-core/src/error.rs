use std::fmt::{Display, Formatter};

use thiserror::Error;

use crate::favorites::ToggleAction;
use crate::Ticker;

/// Validation errors raised while building domain values.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("ticker cannot be empty")]
    EmptyTicker,
    #[error("ticker length {len} exceeds max {max}")]
    TickerTooLong { len: usize, max: usize },
    #[error("ticker contains invalid character '{ch}' at index {index}")]
    TickerInvalidChar { ch: char, index: usize },
    #[error("ticker '{raw}' is not exchange-qualified upper case")]
    NonCanonicalTicker { raw: String },

    #[error("field '{field}' is missing")]
    MissingField { field: &'static str },
    #[error("field '{field}' must be finite")]
    NonFiniteValue { field: &'static str },
    #[error("field '{field}' must be non-negative")]
    NegativeValue { field: &'static str },
}

/// Environment/configuration errors.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{name} must be an unsigned integer, got '{value}'")]
    InvalidNumber { name: &'static str, value: String },
    #[error("{name} must be an http:// or https:// url, got '{value}'")]
    InvalidUrl { name: &'static str, value: String },
}

/// Classification of a failed upstream call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedErrorKind {
    /// Connection, timeout, or body read failure.
    Transport,
    /// Non-success HTTP status.
    Status,
    /// 401/403 on a credentialed call.
    Unauthenticated,
    /// Body was not the expected JSON shape.
    Parse,
}

/// Structured fetch failure. Never thrown past the feed boundary; it is kept
/// next to the fallback data so the presentation layer can show a status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedError {
    kind: FeedErrorKind,
    message: String,
    retryable: bool,
    status: Option<u16>,
}

impl FeedError {
    pub fn transport(message: impl Into<String>, retryable: bool) -> Self {
        Self {
            kind: FeedErrorKind::Transport,
            message: message.into(),
            retryable,
            status: None,
        }
    }

    pub fn status(status: u16) -> Self {
        let (kind, retryable) = match status {
            401 | 403 => (FeedErrorKind::Unauthenticated, false),
            408 | 429 | 500..=599 => (FeedErrorKind::Status, true),
            _ => (FeedErrorKind::Status, false),
        };

        Self {
            kind,
            message: format!("upstream returned status {status}"),
            retryable,
            status: Some(status),
        }
    }

    pub fn parse(message: impl Into<String>) -> Self {
        Self {
            kind: FeedErrorKind::Parse,
            message: message.into(),
            retryable: false,
            status: None,
        }
    }

    pub const fn kind(&self) -> FeedErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub const fn retryable(&self) -> bool {
        self.retryable
    }

    pub const fn status_code(&self) -> Option<u16> {
        self.status
    }

    pub const fn code(&self) -> &'static str {
        match self.kind {
            FeedErrorKind::Transport => "feed.transport",
            FeedErrorKind::Status => "feed.status",
            FeedErrorKind::Unauthenticated => "feed.unauthenticated",
            FeedErrorKind::Parse => "feed.parse",
        }
    }
}

impl Display for FeedError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.message, self.code())
    }
}

impl std::error::Error for FeedError {}

/// A favorite add/remove that the server rejected or never answered.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("could not {action} favorite '{ticker}': {cause}")]
pub struct ToggleFailure {
    pub ticker: Ticker,
    pub action: ToggleAction,
    pub cause: FeedError,
}

/// Errors returned by [`FavoritesSynchronizer::toggle`](crate::FavoritesSynchronizer::toggle).
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ToggleError {
    #[error("ticker '{ticker}' is not in the loaded equity list")]
    UnknownTicker { ticker: Ticker },

    /// The favorites load has not resolved yet; retry once it has.
    #[error("favorites are still loading, cannot toggle '{ticker}' yet")]
    FavoritesLoading { ticker: Ticker },

    /// The optimistic change was rolled back.
    #[error(transparent)]
    Rejected(#[from] ToggleFailure),

    #[error("screener instance was closed before the toggle resolved")]
    Closed,
}
