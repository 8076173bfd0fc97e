use serde::{Deserialize, Serialize, Serializer};
use serde_json::{Map, Value};
use time::{Date, Duration};
use tracing::debug;

use crate::domain::format::{change_percent, format_percent};

/// Summary card for one currency or index series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketCard {
    pub symbol: String,
    pub latest_value: f64,
    pub change_percent: f64,
    /// Observations oldest first, unchanged from the feed.
    pub sparkline: Vec<f64>,
}

/// A sparkline observation pinned to a synthetic calendar date.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SparkPoint {
    #[serde(serialize_with = "serialize_date")]
    pub date: Date,
    pub value: f64,
}

fn serialize_date<S: Serializer>(date: &Date, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.collect_str(date)
}

impl MarketCard {
    /// Builds a card from an oldest-first series. Empty series yield `None`.
    pub fn from_series(symbol: impl Into<String>, observations: Vec<f64>) -> Option<Self> {
        let first = *observations.first()?;
        let last = *observations.last()?;

        Some(Self {
            symbol: symbol.into(),
            latest_value: last,
            change_percent: change_percent(first, last),
            sparkline: observations,
        })
    }

    pub fn display_value(&self) -> String {
        format!("{:.2}", self.latest_value)
    }

    pub fn display_change(&self) -> String {
        format_percent(self.change_percent)
    }

    pub fn is_negative(&self) -> bool {
        self.display_change().starts_with('-')
    }

    /// Pairs observation `i` with `today - (len - 1 - i)` days, so the newest
    /// observation lands on `today`.
    pub fn dated_sparkline(&self, today: Date) -> Vec<SparkPoint> {
        let len = self.sparkline.len();
        self.sparkline
            .iter()
            .enumerate()
            .map(|(index, value)| {
                let days_back = (len - 1 - index) as i64;
                SparkPoint {
                    date: today.checked_sub(Duration::days(days_back)).unwrap_or(Date::MIN),
                    value: *value,
                }
            })
            .collect()
    }
}

/// Normalizes the `symbol -> [observations]` map served by `GET /api/currency/`.
///
/// Upstream key order is kept. Symbols with an empty or non-numeric series are
/// dropped.
pub fn normalize_series(raw: Map<String, Value>) -> Vec<MarketCard> {
    raw.into_iter()
        .filter_map(|(symbol, value)| {
            let Value::Array(items) = value else {
                debug!(%symbol, "skipping series that is not an array");
                return None;
            };

            let observations = items
                .iter()
                .map(Value::as_f64)
                .collect::<Option<Vec<_>>>();
            let Some(observations) = observations else {
                debug!(%symbol, "skipping series with non-numeric observations");
                return None;
            };

            MarketCard::from_series(symbol, observations)
        })
        .collect()
}

/// Built-in cards shown whenever the currency feed fails or comes back empty.
pub fn fallback_cards() -> Vec<MarketCard> {
    vec![
        MarketCard {
            symbol: String::from("S&P 500"),
            latest_value: 5648.40,
            change_percent: 0.44,
            sparkline: vec![5600.0, 5625.0, 5648.0, 5640.0, 5650.0],
        },
        MarketCard {
            symbol: String::from("Nasdaq 100"),
            latest_value: 17713.53,
            change_percent: 1.13,
            sparkline: vec![17600.0, 17680.0, 17713.0, 17700.0, 17750.0],
        },
        MarketCard {
            symbol: String::from("VIX"),
            latest_value: 15.00,
            change_percent: -4.15,
            sparkline: vec![16.5, 15.8, 15.0, 14.9, 14.5],
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use time::Month;

    #[test]
    fn derives_latest_value_and_change() {
        let card = MarketCard::from_series("USDTRY", vec![30.0, 31.5, 33.0]).expect("card");
        assert_eq!(card.latest_value, 33.0);
        assert!((card.change_percent - 10.0).abs() < 1e-9);
        assert_eq!(card.display_value(), "33.00");
        assert_eq!(card.display_change(), "+10.00%");
        assert!(!card.is_negative());
    }

    #[test]
    fn zero_first_observation_does_not_divide() {
        let card = MarketCard::from_series("XU100", vec![0.0, 4.0]).expect("card");
        assert_eq!(card.change_percent, 0.0);
        assert!(card.change_percent.is_finite());
    }

    #[test]
    fn drops_empty_and_non_numeric_series() {
        let raw = json!({
            "USDTRY": [32.1, 32.4],
            "EMPTY": [],
            "BROKEN": [1.0, "x"],
            "SCALAR": 4.2,
        });
        let Value::Object(map) = raw else {
            panic!("fixture must be an object");
        };

        let cards = normalize_series(map);
        assert_eq!(cards.len(), 1);
        assert_eq!(cards[0].symbol, "USDTRY");
    }

    #[test]
    fn dated_sparkline_ends_today() {
        let card = MarketCard::from_series("EURTRY", vec![1.0, 2.0, 3.0]).expect("card");
        let today = Date::from_calendar_date(2024, Month::March, 2).expect("date");
        let points = card.dated_sparkline(today);

        assert_eq!(points.len(), 3);
        assert_eq!(points[2].date, today);
        assert_eq!(
            points[0].date,
            Date::from_calendar_date(2024, Month::February, 29).expect("date")
        );
        assert_eq!(points[0].value, 1.0);
    }

    #[test]
    fn fallback_set_is_never_empty() {
        let cards = fallback_cards();
        assert_eq!(cards.len(), 3);
        assert!(cards[2].is_negative());
    }
}
