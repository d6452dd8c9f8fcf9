//! Period-level performance and risk metrics over a normalized series.
//!
//! [`summarize`] is a stateless reduction: it reads a date-ascending slice
//! and produces an immutable [`SummaryStats`] snapshot. Metrics that cannot
//! be computed for the given input are `None` and surface as
//! [`SeriesError::UndefinedMetric`] through [`SummaryStats::require`].

use std::fmt;

use itertools::Itertools;
use serde::Serialize;
use tracing::debug;

use crate::{
    error::{Result, SeriesError},
    model::StockRecord,
    utils::{finite, RunningMean},
};

const SECONDS_PER_DAY: f64 = 86_400.0;
const DAYS_PER_YEAR: f64 = 365.0;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Metric {
    InitialPrice,
    FinalPrice,
    OverallReturn,
    AnnualizedReturn,
    AverageDailyReturn,
    MedianDailyReturn,
    MaxDailyGain,
    MaxDailyLoss,
    DailyReturnStdDev,
    PositiveDays,
    NegativeDays,
    AverageVolume,
    MaxVolume,
    MinVolume,
    HighestPrice,
    LowestPrice,
    PriceRange,
    AverageVolatility20d,
}

impl Metric {
    /// Report order.
    pub const ALL: [Metric; 18] = [
        Metric::InitialPrice,
        Metric::FinalPrice,
        Metric::OverallReturn,
        Metric::AnnualizedReturn,
        Metric::AverageDailyReturn,
        Metric::MedianDailyReturn,
        Metric::MaxDailyGain,
        Metric::MaxDailyLoss,
        Metric::DailyReturnStdDev,
        Metric::PositiveDays,
        Metric::NegativeDays,
        Metric::AverageVolume,
        Metric::MaxVolume,
        Metric::MinVolume,
        Metric::HighestPrice,
        Metric::LowestPrice,
        Metric::PriceRange,
        Metric::AverageVolatility20d,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Metric::InitialPrice => "Initial Price",
            Metric::FinalPrice => "Final Price",
            Metric::OverallReturn => "Overall Return (%)",
            Metric::AnnualizedReturn => "Annualized Return (%)",
            Metric::AverageDailyReturn => "Average Daily Return (%)",
            Metric::MedianDailyReturn => "Median Daily Return (%)",
            Metric::MaxDailyGain => "Max Daily Gain (%)",
            Metric::MaxDailyLoss => "Max Daily Loss (%)",
            Metric::DailyReturnStdDev => "Daily Return Std Dev (%)",
            Metric::PositiveDays => "Positive Days (%)",
            Metric::NegativeDays => "Negative Days (%)",
            Metric::AverageVolume => "Average Volume",
            Metric::MaxVolume => "Max Volume",
            Metric::MinVolume => "Min Volume",
            Metric::HighestPrice => "Highest Price",
            Metric::LowestPrice => "Lowest Price",
            Metric::PriceRange => "Price Range",
            Metric::AverageVolatility20d => "Average Volatility (20d)",
        }
    }
}

/// Immutable snapshot of one series. Recompute it when the series changes.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummaryStats {
    // I. Period
    pub start_date: String,
    pub end_date: String,
    pub trading_days: usize,

    // II. Performance
    pub initial_price: Option<f64>,
    pub final_price: Option<f64>,
    pub overall_return_pct: Option<f64>,
    pub annualized_return_pct: Option<f64>, // None for a zero-length period

    // III. Daily returns, over present values only
    pub average_daily_return_pct: Option<f64>,
    pub median_daily_return_pct: Option<f64>,
    pub max_daily_gain_pct: Option<f64>,
    pub max_daily_loss_pct: Option<f64>,
    pub daily_return_std_dev_pct: Option<f64>,
    pub positive_days_pct: f64,
    pub negative_days_pct: f64,

    // IV. Volume
    pub average_volume: Option<f64>,
    pub max_volume: Option<f64>,
    pub min_volume: Option<f64>,

    // V. Price extremes
    pub highest_price: Option<f64>,
    pub lowest_price: Option<f64>,
    pub price_range: Option<f64>,

    pub average_volatility_20d: Option<f64>,
}

impl SummaryStats {
    fn new(first: &StockRecord, last: &StockRecord, trading_days: usize) -> Self {
        Self {
            start_date: first.date().to_owned(),
            end_date: last.date().to_owned(),
            trading_days,
            initial_price: finite(first.close),
            final_price: finite(last.close),
            overall_return_pct: None,
            annualized_return_pct: None,
            average_daily_return_pct: None,
            median_daily_return_pct: None,
            max_daily_gain_pct: None,
            max_daily_loss_pct: None,
            daily_return_std_dev_pct: None,
            positive_days_pct: 0.0,
            negative_days_pct: 0.0,
            average_volume: None,
            max_volume: None,
            min_volume: None,
            highest_price: None,
            lowest_price: None,
            price_range: None,
            average_volatility_20d: None,
        }
    }

    pub fn get(&self, metric: Metric) -> Option<f64> {
        match metric {
            Metric::InitialPrice => self.initial_price,
            Metric::FinalPrice => self.final_price,
            Metric::OverallReturn => self.overall_return_pct,
            Metric::AnnualizedReturn => self.annualized_return_pct,
            Metric::AverageDailyReturn => self.average_daily_return_pct,
            Metric::MedianDailyReturn => self.median_daily_return_pct,
            Metric::MaxDailyGain => self.max_daily_gain_pct,
            Metric::MaxDailyLoss => self.max_daily_loss_pct,
            Metric::DailyReturnStdDev => self.daily_return_std_dev_pct,
            Metric::PositiveDays => Some(self.positive_days_pct),
            Metric::NegativeDays => Some(self.negative_days_pct),
            Metric::AverageVolume => self.average_volume,
            Metric::MaxVolume => self.max_volume,
            Metric::MinVolume => self.min_volume,
            Metric::HighestPrice => self.highest_price,
            Metric::LowestPrice => self.lowest_price,
            Metric::PriceRange => self.price_range,
            Metric::AverageVolatility20d => self.average_volatility_20d,
        }
    }

    pub fn require(&self, metric: Metric) -> Result<f64> {
        self.get(metric)
            .ok_or(SeriesError::UndefinedMetric(metric.label()))
    }

    /// Plain-text report: a title, an underline, then one line per metric.
    pub fn report(&self, title: &str) -> String {
        let mut out = format!("{title}\n{}\n\n", "=".repeat(title.chars().count()));

        out.push_str(&format!("Start Date: {}\n", self.start_date));
        out.push_str(&format!("End Date: {}\n", self.end_date));
        out.push_str(&format!("Trading Days: {}\n", self.trading_days));

        for metric in Metric::ALL {
            match self.get(metric) {
                Some(value) => out.push_str(&format!("{}: {value:.2}\n", metric.label())),
                None => out.push_str(&format!("{}: N/A\n", metric.label())),
            }
        }

        out
    }
}

impl fmt::Display for SummaryStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.report("Stock Analysis Summary Statistics"))
    }
}

/// Reduces a normalized series into a [`SummaryStats`] snapshot.
pub fn summarize(records: &[StockRecord]) -> Result<SummaryStats> {
    let (Some(first), Some(last)) = (records.first(), records.last()) else {
        return Err(SeriesError::InsufficientData);
    };

    let mut stats = SummaryStats::new(first, last, records.len());

    summarize_period(first, last, &mut stats);
    summarize_returns(records, &mut stats);
    summarize_volume(records, &mut stats);
    summarize_prices(records, &mut stats);

    stats.average_volatility_20d = records
        .iter()
        .filter_map(|r| r.volatility_20d)
        .collect::<RunningMean>()
        .avg();

    debug!(
        trading_days = stats.trading_days,
        start = %stats.start_date,
        end = %stats.end_date,
        "summarized series"
    );

    Ok(stats)
}

fn summarize_period(first: &StockRecord, last: &StockRecord, stats: &mut SummaryStats) {
    let ratio = last.close / first.close;
    stats.overall_return_pct = finite((ratio - 1.0) * 100.0);

    let elapsed_days = match (first.instant(), last.instant()) {
        (Some(start), Some(end)) => (end - start).num_seconds() as f64 / SECONDS_PER_DAY,
        _ => 0.0,
    };

    if elapsed_days > 0.0 {
        stats.annualized_return_pct =
            finite((ratio.powf(DAYS_PER_YEAR / elapsed_days) - 1.0) * 100.0);
    }
}

fn summarize_returns(records: &[StockRecord], stats: &mut SummaryStats) {
    let mut returns = records
        .iter()
        .filter_map(|r| r.daily_return)
        .filter(|r| r.is_finite())
        .collect_vec();

    let total = records.len() as f64;
    let positive = returns.iter().filter(|r| **r > 0.0).count() as f64;
    let negative = returns.iter().filter(|r| **r < 0.0).count() as f64;
    stats.positive_days_pct = positive / total * 100.0;
    stats.negative_days_pct = negative / total * 100.0;

    let Some(mean) = returns.iter().copied().collect::<RunningMean>().avg() else {
        return;
    };
    stats.average_daily_return_pct = Some(mean);

    let variance = returns.iter().map(|r| (r - mean) * (r - mean)).sum::<f64>()
        / returns.len() as f64;
    stats.daily_return_std_dev_pct = Some(variance.sqrt());

    returns.sort_by(f64::total_cmp);

    // upper median: index n / 2 even when n is even
    stats.median_daily_return_pct = returns.get(returns.len() / 2).copied();
    stats.max_daily_loss_pct = returns.first().copied();
    stats.max_daily_gain_pct = returns.last().copied();
}

fn summarize_volume(records: &[StockRecord], stats: &mut SummaryStats) {
    let volumes = records
        .iter()
        .map(|r| r.volume)
        .filter(|v| v.is_finite())
        .collect_vec();

    stats.average_volume = volumes.iter().copied().collect::<RunningMean>().avg();

    if let Some((min, max)) = volumes.into_iter().minmax_by(f64::total_cmp).into_option() {
        stats.min_volume = Some(min);
        stats.max_volume = Some(max);
    }
}

fn summarize_prices(records: &[StockRecord], stats: &mut SummaryStats) {
    stats.highest_price = records
        .iter()
        .map(|r| r.high)
        .filter(|p| p.is_finite())
        .max_by(f64::total_cmp);

    stats.lowest_price = records
        .iter()
        .map(|r| r.low)
        .filter(|p| p.is_finite())
        .min_by(f64::total_cmp);

    if let (Some(highest), Some(lowest)) = (stats.highest_price, stats.lowest_price) {
        stats.price_range = Some(highest - lowest);
    }
}
