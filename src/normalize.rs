use std::cmp::Ordering;

use tracing::debug;

use crate::model::{Series, StockRecord};

/// Sorts ascending by calendar instant. Ties keep their input order and
/// undated records go last.
pub fn normalize(series: Series) -> Series {
    let mut records = series.into_inner();
    records.sort_by(compare_instants);
    Series::from(records)
}

/// Keeps the first record for each instant. Expects a normalized series.
pub fn dedup_dates(series: Series) -> Series {
    let mut records = series.into_inner();
    let before = records.len();

    records.dedup_by(|later, earlier| {
        later.instant().is_some() && later.instant() == earlier.instant()
    });

    if records.len() != before {
        debug!(
            dropped = before - records.len(),
            "dropped records with duplicate dates"
        );
    }

    Series::from(records)
}

pub(crate) fn compare_instants(a: &StockRecord, b: &StockRecord) -> Ordering {
    match (a.instant(), b.instant()) {
        (Some(a), Some(b)) => a.cmp(&b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}
