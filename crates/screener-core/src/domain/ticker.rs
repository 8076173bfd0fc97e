use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

use crate::ValidationError;

/// Market qualifier carried by every equity-feed ticker (Borsa Istanbul).
pub const EXCHANGE_SUFFIX: &str = ".IS";

const MAX_TICKER_LEN: usize = 20;

/// Exchange-qualified equity ticker, e.g. `THYAO.IS`.
///
/// Parsing upper-cases the input and appends [`EXCHANGE_SUFFIX`] when it is
/// absent, so every `Ticker` converts to a chart symbol and back unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Ticker(String);

impl Ticker {
    pub fn parse(input: &str) -> Result<Self, ValidationError> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(ValidationError::EmptyTicker);
        }

        let normalized = trimmed.to_ascii_uppercase();
        for (index, ch) in normalized.chars().enumerate() {
            let valid = ch.is_ascii_alphanumeric() || ch == '.' || ch == '-';
            if !valid {
                return Err(ValidationError::TickerInvalidChar { ch, index });
            }
        }

        let qualified = if normalized.ends_with(EXCHANGE_SUFFIX) {
            normalized
        } else {
            to_display_ticker(&normalized)
        };

        if to_chart_symbol(&qualified).is_empty() {
            return Err(ValidationError::EmptyTicker);
        }

        let len = qualified.chars().count();
        if len > MAX_TICKER_LEN {
            return Err(ValidationError::TickerTooLong {
                len,
                max: MAX_TICKER_LEN,
            });
        }

        Ok(Self(qualified))
    }

    /// Accepts a ticker exactly as the equity feed issued it. Unlike
    /// [`parse`](Self::parse), nothing is rewritten: favorites requests must
    /// echo the server's own identifier.
    pub fn from_upstream(raw: &str) -> Result<Self, ValidationError> {
        let trimmed = raw.trim();
        let ticker = Self::parse(trimmed)?;
        if ticker.as_str() != trimmed {
            return Err(ValidationError::NonCanonicalTicker {
                raw: trimmed.to_owned(),
            });
        }
        Ok(ticker)
    }

    /// Rebuilds a ticker from the bare symbol used by the chart view.
    pub fn from_chart_symbol(bare: &str) -> Result<Self, ValidationError> {
        Self::parse(&to_display_ticker(bare.trim()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn chart_symbol(&self) -> &str {
        to_chart_symbol(&self.0)
    }
}

impl Display for Ticker {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<String> for Ticker {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl TryFrom<&str> for Ticker {
    type Error = ValidationError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::parse(value)
    }
}

impl From<Ticker> for String {
    fn from(value: Ticker) -> Self {
        value.0
    }
}

/// Strips one trailing exchange qualifier. Input without it is returned as is.
pub fn to_chart_symbol(ticker: &str) -> &str {
    ticker.strip_suffix(EXCHANGE_SUFFIX).unwrap_or(ticker)
}

/// Re-applies the exchange qualifier removed by [`to_chart_symbol`].
pub fn to_display_ticker(bare: &str) -> String {
    format!("{bare}{EXCHANGE_SUFFIX}")
}
