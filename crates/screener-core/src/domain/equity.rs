use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::domain::format::{format_percent, format_price};
use crate::{Ticker, ValidationError};

/// One normalized screener table row.
///
/// All three change fields are percentages (already scaled by 100).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EquityRow {
    /// 1-based ordinal in the upstream order, after filtering.
    pub key: usize,
    pub ticker: Ticker,
    pub company: String,
    pub price: f64,
    pub day_change: f64,
    pub month_change: f64,
    pub year_change: f64,
    pub market_cap: String,
}

impl EquityRow {
    pub fn display_price(&self) -> String {
        format_price(self.price)
    }

    pub fn display_day_change(&self) -> String {
        format_percent(self.day_change)
    }

    pub fn display_month_change(&self) -> String {
        format_percent(self.month_change)
    }

    pub fn display_year_change(&self) -> String {
        format_percent(self.year_change)
    }
}

/// Upstream equity record as served by `GET /api/stocks/`.
///
/// `dayChange` is a percentage; `monthChange` and `yearChange` are fractions.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawEquityRecord {
    ticker: Option<String>,
    company: Option<String>,
    price: Option<f64>,
    day_change: Option<f64>,
    month_change: Option<f64>,
    year_change: Option<f64>,
    #[serde(default)]
    market_cap: Option<Value>,
    #[serde(default)]
    error: Option<Value>,
}

impl RawEquityRecord {
    fn is_flagged(&self) -> bool {
        match &self.error {
            Some(Value::Bool(flag)) => *flag,
            Some(Value::String(message)) => !message.trim().is_empty(),
            _ => false,
        }
    }

    fn into_row(self, key: usize) -> Result<EquityRow, ValidationError> {
        let ticker = Ticker::from_upstream(self.ticker.as_deref().unwrap_or_default())?;
        let company = self
            .company
            .map(|company| company.trim().to_owned())
            .filter(|company| !company.is_empty())
            .ok_or(ValidationError::MissingField { field: "company" })?;

        let price = required_finite("price", self.price)?;
        if price < 0.0 {
            return Err(ValidationError::NegativeValue { field: "price" });
        }

        Ok(EquityRow {
            key,
            ticker,
            company,
            price,
            day_change: required_finite("dayChange", self.day_change)?,
            month_change: required_finite("monthChange", self.month_change)? * 100.0,
            year_change: required_finite("yearChange", self.year_change)? * 100.0,
            market_cap: match self.market_cap {
                Some(Value::String(text)) => text,
                Some(Value::Number(number)) => number.to_string(),
                _ => String::new(),
            },
        })
    }
}

fn required_finite(field: &'static str, value: Option<f64>) -> Result<f64, ValidationError> {
    let value = value.ok_or(ValidationError::MissingField { field })?;
    if !value.is_finite() {
        return Err(ValidationError::NonFiniteValue { field });
    }
    Ok(value)
}

/// Normalizes the raw equity array into table rows.
///
/// Flagged, malformed, and duplicate-ticker records are dropped without
/// failing the batch and do not consume an ordinal key.
pub fn normalize_equities(records: Vec<Value>) -> Vec<EquityRow> {
    let mut rows: Vec<EquityRow> = Vec::with_capacity(records.len());
    let mut seen = HashSet::new();

    for (position, value) in records.into_iter().enumerate() {
        let record: RawEquityRecord = match serde_json::from_value(value) {
            Ok(record) => record,
            Err(error) => {
                debug!(position, %error, "skipping unparsable equity record");
                continue;
            }
        };

        if record.is_flagged() {
            debug!(position, "skipping equity record flagged as erroneous");
            continue;
        }

        match record.into_row(rows.len() + 1) {
            Ok(row) if seen.insert(row.ticker.clone()) => rows.push(row),
            Ok(row) => debug!(position, ticker = %row.ticker, "skipping duplicate ticker"),
            Err(error) => debug!(position, %error, "skipping invalid equity record"),
        }
    }

    rows
}
