use chrono::{Months, NaiveDateTime};
use derive_more::Display;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::model::StockRecord;

/// Named look-back window, anchored at the last record's date.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Display, Serialize, Deserialize)]
pub enum TimeRange {
    #[display(fmt = "1m")]
    #[serde(rename = "1m")]
    OneMonth,
    #[display(fmt = "3m")]
    #[serde(rename = "3m")]
    ThreeMonths,
    #[display(fmt = "6m")]
    #[serde(rename = "6m")]
    SixMonths,
    #[default]
    #[display(fmt = "1y")]
    #[serde(rename = "1y")]
    OneYear,
    #[display(fmt = "3y")]
    #[serde(rename = "3y")]
    ThreeYears,
    #[display(fmt = "all")]
    #[serde(rename = "all")]
    All,
}

impl TimeRange {
    pub const ALL: [TimeRange; 6] = [
        TimeRange::OneMonth,
        TimeRange::ThreeMonths,
        TimeRange::SixMonths,
        TimeRange::OneYear,
        TimeRange::ThreeYears,
        TimeRange::All,
    ];

    pub fn months(&self) -> Option<u32> {
        match self {
            TimeRange::OneMonth => Some(1),
            TimeRange::ThreeMonths => Some(3),
            TimeRange::SixMonths => Some(6),
            TimeRange::OneYear => Some(12),
            TimeRange::ThreeYears => Some(36),
            TimeRange::All => None,
        }
    }

    /// First instant inside the window ending at `anchor`.
    pub fn start(&self, anchor: NaiveDateTime) -> Option<NaiveDateTime> {
        self.months()
            .and_then(|months| anchor.checked_sub_months(Months::new(months)))
    }
}

impl From<&str> for TimeRange {
    fn from(token: &str) -> Self {
        match token.trim() {
            "1m" => TimeRange::OneMonth,
            "3m" => TimeRange::ThreeMonths,
            "6m" => TimeRange::SixMonths,
            "1y" => TimeRange::OneYear,
            "3y" => TimeRange::ThreeYears,
            "all" => TimeRange::All,
            other => {
                debug!(token = other, "unknown time range, using 1y");
                TimeRange::OneYear
            }
        }
    }
}

/// Returns the trailing records whose dates fall inside `range`.
///
/// `records` must be normalized. Undated records never fall inside a
/// window, so for anything but [`TimeRange::All`] they are cut off.
pub fn filter(records: &[StockRecord], range: TimeRange) -> &[StockRecord] {
    if range == TimeRange::All {
        return records;
    }

    let dated = records.partition_point(|r| r.instant().is_some());
    let records = &records[..dated];

    let Some(anchor) = records.last().and_then(StockRecord::instant) else {
        return &[];
    };

    let begin = match range.start(anchor) {
        Some(start) => records.partition_point(|r| r.instant().is_some_and(|i| i < start)),
        None => 0,
    };

    &records[begin..]
}
