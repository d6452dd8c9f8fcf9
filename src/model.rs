use std::{collections::BTreeMap, fmt};

use chrono::NaiveDateTime;
use derive_more::{Deref, From};
use serde::Serialize;

use crate::utils::parse_instant;

pub type Price = f64;

/// One trading day.
///
/// Optional indicator fields are `None` when the column or the cell is
/// missing and `Some(NaN)` when the cell held something unparseable.
#[derive(Default, Debug, Clone, PartialEq, Serialize)]
pub struct StockRecord {
    date: String,
    #[serde(skip)]
    instant: Option<NaiveDateTime>,
    pub open: Price,
    pub high: Price,
    pub low: Price,
    pub close: Price,
    pub volume: f64,
    pub daily_return: Option<f64>,
    pub volatility_20d: Option<f64>,
    #[serde(flatten)]
    pub indicators: BTreeMap<String, f64>,
}

impl StockRecord {
    pub fn new(date: impl Into<String>) -> Self {
        let date = date.into();
        let instant = parse_instant(&date);

        Self {
            date,
            instant,
            ..Default::default()
        }
    }

    /// The date cell exactly as it appeared in the source.
    pub fn date(&self) -> &str {
        &self.date
    }

    pub fn instant(&self) -> Option<NaiveDateTime> {
        self.instant
    }

    pub fn with_ohlc(mut self, open: Price, high: Price, low: Price, close: Price) -> Self {
        self.open = open;
        self.high = high;
        self.low = low;
        self.close = close;
        self
    }

    pub fn with_close(mut self, close: Price) -> Self {
        self.close = close;
        self
    }

    pub fn with_volume(mut self, volume: f64) -> Self {
        self.volume = volume;
        self
    }

    pub fn with_daily_return(mut self, value: f64) -> Self {
        self.daily_return = Some(value);
        self
    }

    pub fn with_volatility_20d(mut self, value: f64) -> Self {
        self.volatility_20d = Some(value);
        self
    }

    pub fn with_indicator(mut self, name: impl Into<String>, value: f64) -> Self {
        self.indicators.insert(name.into(), value);
        self
    }
}

/// Ordered sequence of records. Date-ascending once normalized.
#[derive(Default, Debug, Clone, PartialEq, Serialize, Deref, From)]
pub struct Series(Vec<StockRecord>);

impl Series {
    pub fn into_inner(self) -> Vec<StockRecord> {
        self.0
    }

    pub fn records(&self) -> &[StockRecord] {
        &self.0
    }
}

impl FromIterator<StockRecord> for Series {
    fn from_iter<I: IntoIterator<Item = StockRecord>>(iter: I) -> Self {
        Series(iter.into_iter().collect())
    }
}

impl IntoIterator for Series {
    type Item = StockRecord;
    type IntoIter = std::vec::IntoIter<StockRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

/// A column of the series, addressable by its CSV header name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub enum Field {
    Date,
    Open,
    High,
    Low,
    Close,
    Volume,
    DailyReturn,
    Volatility20d,
    Indicator(String),
}

impl Field {
    pub const REQUIRED: [Field; 6] = [
        Field::Date,
        Field::Close,
        Field::Open,
        Field::High,
        Field::Low,
        Field::Volume,
    ];

    pub fn column_name(&self) -> &str {
        match self {
            Field::Date => "Date",
            Field::Open => "Open",
            Field::High => "High",
            Field::Low => "Low",
            Field::Close => "Close",
            Field::Volume => "Volume",
            Field::DailyReturn => "Daily_Return",
            Field::Volatility20d => "Volatility_20d",
            Field::Indicator(name) => name,
        }
    }

    /// Numeric view of the field. Dates become Unix seconds.
    pub fn value(&self, record: &StockRecord) -> Option<f64> {
        match self {
            Field::Date => record
                .instant()
                .map(|instant| instant.and_utc().timestamp() as f64),
            Field::Open => Some(record.open),
            Field::High => Some(record.high),
            Field::Low => Some(record.low),
            Field::Close => Some(record.close),
            Field::Volume => Some(record.volume),
            Field::DailyReturn => record.daily_return,
            Field::Volatility20d => record.volatility_20d,
            Field::Indicator(name) => record.indicators.get(name).copied(),
        }
    }
}

impl From<&str> for Field {
    fn from(name: &str) -> Self {
        let name = name.trim();
        match name.to_ascii_lowercase().as_str() {
            "date" => Field::Date,
            "open" => Field::Open,
            "high" => Field::High,
            "low" => Field::Low,
            "close" => Field::Close,
            "volume" => Field::Volume,
            "daily_return" => Field::DailyReturn,
            "volatility_20d" => Field::Volatility20d,
            _ => Field::Indicator(name.to_owned()),
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.column_name())
    }
}
