use chrono::{DateTime, NaiveDate, NaiveDateTime};

use crate::model::Price;

/// Running arithmetic mean that only counts finite values.
#[derive(Default, Debug, Clone, Copy)]
pub struct RunningMean {
    value: Price,
    length: usize,
}

impl RunningMean {
    pub fn feed(&mut self, value: Price) {
        if value.is_finite() {
            self.value += value;
            self.length += 1;
        }
    }

    pub fn clear(&mut self) {
        self.value = Price::default();
        self.length = 0;
    }

    pub fn len(&self) -> usize {
        self.length
    }

    pub fn is_empty(&self) -> bool {
        self.length == 0
    }

    pub fn avg(&self) -> Option<f64> {
        if self.length == 0 {
            return None;
        }
        Some(self.value / self.length as Price)
    }
}

impl FromIterator<Price> for RunningMean {
    fn from_iter<I: IntoIterator<Item = Price>>(iter: I) -> Self {
        let mut mean = RunningMean::default();
        for value in iter {
            mean.feed(value);
        }
        mean
    }
}

const DATE_TIME_FORMATS: [&str; 2] = ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"];

/// Parses a date cell into a calendar instant.
///
/// Plain dates land on midnight. RFC 3339 values are converted to UTC.
pub fn parse_instant(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();

    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return date.and_hms_opt(0, 0, 0);
    }

    for format in DATE_TIME_FORMATS {
        if let Ok(instant) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(instant);
        }
    }

    DateTime::parse_from_rfc3339(raw)
        .ok()
        .map(|instant| instant.naive_utc())
}

pub fn finite(value: f64) -> Option<f64> {
    value.is_finite().then_some(value)
}

#[cfg(test)]
pub(crate) fn assert_close(actual: f64, expected: f64) {
    assert!(
        (actual - expected).abs() < 1e-9,
        "expected {expected}, got {actual}"
    );
}
