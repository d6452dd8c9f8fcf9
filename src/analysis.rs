use std::collections::BTreeMap;

use chrono::Datelike;
use itertools::Itertools;
use serde::Serialize;

use crate::model::{Field, StockRecord};

/// Growth of one unit since the first record, in percent. Missing returns
/// count as flat days.
pub fn cumulative_returns(records: &[StockRecord]) -> Vec<f64> {
    records
        .iter()
        .scan(1.0, |growth, record| {
            let r = record.daily_return.filter(|r| r.is_finite()).unwrap_or(0.0);
            *growth *= 1.0 + r / 100.0;
            Some((*growth - 1.0) * 100.0)
        })
        .collect_vec()
}

/// Sum of daily returns per calendar year.
pub fn yearly_returns(records: &[StockRecord]) -> BTreeMap<i32, f64> {
    grouped_returns(records, |instant| instant.year())
}

/// Sum of daily returns per (year, month).
pub fn monthly_returns(records: &[StockRecord]) -> BTreeMap<(i32, u32), f64> {
    grouped_returns(records, |instant| (instant.year(), instant.month()))
}

fn grouped_returns<K, F>(records: &[StockRecord], key: F) -> BTreeMap<K, f64>
where
    K: Ord,
    F: Fn(chrono::NaiveDateTime) -> K,
{
    let mut groups = BTreeMap::new();

    for record in records {
        let Some(instant) = record.instant() else {
            continue;
        };

        let sum = groups.entry(key(instant)).or_insert(0.0);
        if let Some(r) = record.daily_return.filter(|r| r.is_finite()) {
            *sum += r;
        }
    }

    groups
}

/// Pearson correlation between every pair of `fields`, using the records
/// where both values are finite.
pub fn correlation_matrix(records: &[StockRecord], fields: &[Field]) -> Vec<Vec<Option<f64>>> {
    fields
        .iter()
        .map(|a| {
            fields
                .iter()
                .map(|b| {
                    let pairs = records
                        .iter()
                        .filter_map(|r| Some((a.value(r)?, b.value(r)?)))
                        .filter(|(x, y)| x.is_finite() && y.is_finite())
                        .collect_vec();
                    pearson(&pairs)
                })
                .collect_vec()
        })
        .collect_vec()
}

fn pearson(pairs: &[(f64, f64)]) -> Option<f64> {
    if pairs.len() < 2 {
        return None;
    }

    let n = pairs.len() as f64;
    let mean_x = pairs.iter().map(|(x, _)| x).sum::<f64>() / n;
    let mean_y = pairs.iter().map(|(_, y)| y).sum::<f64>() / n;

    let (mut cov, mut var_x, mut var_y) = (0.0, 0.0, 0.0);
    for (x, y) in pairs {
        let (dx, dy) = (x - mean_x, y - mean_y);
        cov += dx * dy;
        var_x += dx * dx;
        var_y += dy * dy;
    }

    if var_x == 0.0 || var_y == 0.0 {
        return None;
    }

    Some(cov / (var_x * var_y).sqrt())
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistogramBin {
    pub lower: f64,
    pub upper: f64,
    pub count: usize,
}

/// Equal-width histogram of the present daily returns. The last bin is
/// closed on the right so the maximum lands inside it.
pub fn return_histogram(records: &[StockRecord], bins: usize) -> Vec<HistogramBin> {
    let returns = records
        .iter()
        .filter_map(|r| r.daily_return)
        .filter(|r| r.is_finite())
        .collect_vec();

    let Some((min, max)) = returns.iter().copied().minmax_by(f64::total_cmp).into_option() else {
        return Vec::new();
    };
    if bins == 0 {
        return Vec::new();
    }

    if min == max {
        return vec![HistogramBin {
            lower: min,
            upper: max,
            count: returns.len(),
        }];
    }

    let width = (max - min) / bins as f64;
    let mut histogram = (0..bins)
        .map(|ix| HistogramBin {
            lower: min + width * ix as f64,
            upper: if ix + 1 == bins { max } else { min + width * (ix + 1) as f64 },
            count: 0,
        })
        .collect_vec();

    for r in returns {
        let ix = (((r - min) / width) as usize).min(bins - 1);
        histogram[ix].count += 1;
    }

    histogram
}

/// The last `count` records.
pub fn tail(records: &[StockRecord], count: usize) -> &[StockRecord] {
    &records[records.len().saturating_sub(count)..]
}
