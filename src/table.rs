use std::cmp::Ordering;

use derive_more::Display;
use itertools::Itertools;
use serde::{Deserialize, Serialize};

use crate::{
    model::{Field, StockRecord},
    normalize::compare_instants,
};

#[derive(Debug, Default, Copy, Clone, PartialEq, Eq, Display, Serialize, Deserialize)]
pub enum SortDirection {
    #[display(fmt = "asc")]
    Ascending,
    #[default]
    #[display(fmt = "desc")]
    Descending,
}

impl SortDirection {
    pub fn flipped(self) -> Self {
        match self {
            SortDirection::Ascending => SortDirection::Descending,
            SortDirection::Descending => SortDirection::Ascending,
        }
    }
}

/// Column and direction of the table view. Owned by the caller.
#[derive(Debug, Clone, PartialEq)]
pub struct SortState {
    pub field: Field,
    pub direction: SortDirection,
}

impl Default for SortState {
    fn default() -> Self {
        Self {
            field: Field::Date,
            direction: SortDirection::Descending,
        }
    }
}

impl SortState {
    /// Header click: the active column flips, any other column starts
    /// descending.
    pub fn toggle(self, field: Field) -> Self {
        if self.field == field {
            Self {
                direction: self.direction.flipped(),
                ..self
            }
        } else {
            Self {
                field,
                direction: SortDirection::Descending,
            }
        }
    }
}

/// Orders records by `field`. Missing and NaN values go last either way.
pub fn sort_records<'a>(
    records: &'a [StockRecord],
    field: &Field,
    direction: SortDirection,
) -> Vec<&'a StockRecord> {
    records
        .iter()
        .sorted_unstable_by(|a, b| compare_by(a, b, field, direction))
        .collect_vec()
}

fn compare_by(a: &StockRecord, b: &StockRecord, field: &Field, direction: SortDirection) -> Ordering {
    let ordering = match field {
        Field::Date => match (a.instant(), b.instant()) {
            (Some(a), Some(b)) => a.cmp(&b),
            _ => return compare_instants(a, b),
        },
        _ => {
            let a = field.value(a).filter(|v| !v.is_nan());
            let b = field.value(b).filter(|v| !v.is_nan());
            match (a, b) {
                (Some(a), Some(b)) => a.total_cmp(&b),
                (Some(_), None) => return Ordering::Less,
                (None, Some(_)) => return Ordering::Greater,
                (None, None) => return Ordering::Equal,
            }
        }
    };

    match direction {
        SortDirection::Ascending => ordering,
        SortDirection::Descending => ordering.reverse(),
    }
}

/// Slice of the 1-based `page`. Out of range pages are empty.
pub fn paginate<T>(items: &[T], page: usize, page_size: usize) -> &[T] {
    if page == 0 || page_size == 0 {
        return &[];
    }

    let start = (page - 1).saturating_mul(page_size);
    if start >= items.len() {
        return &[];
    }

    let end = start.saturating_add(page_size).min(items.len());
    &items[start..end]
}

pub fn total_pages(len: usize, page_size: usize) -> usize {
    if page_size == 0 {
        return 0;
    }
    len.div_ceil(page_size)
}

/// Restricts `page` to `[1, total_pages]`, page 1 when there are none.
pub fn clamp_page(page: usize, len: usize, page_size: usize) -> usize {
    page.clamp(1, total_pages(len, page_size).max(1))
}

/// One rendered page of the table view.
#[derive(Debug, Clone, Serialize)]
pub struct Page<'a> {
    pub number: usize,
    pub total_pages: usize,
    pub rows: Vec<&'a StockRecord>,
}

pub fn table_page<'a>(
    records: &'a [StockRecord],
    sort: &SortState,
    page: usize,
    page_size: usize,
) -> Page<'a> {
    let sorted = sort_records(records, &sort.field, sort.direction);

    Page {
        number: page,
        total_pages: total_pages(records.len(), page_size),
        rows: paginate(&sorted, page, page_size).to_vec(),
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use itertools::Itertools;

    use super::{
        clamp_page, paginate, sort_records, table_page, total_pages, SortDirection, SortState,
    };
    use crate::model::{Field, StockRecord};

    fn records(count: u64) -> Vec<StockRecord> {
        NaiveDate::from_ymd_opt(2024, 1, 1)
            .unwrap()
            .iter_days()
            .take(count as usize)
            .enumerate()
            .map(|(ix, day)| {
                StockRecord::new(day.format("%Y-%m-%d").to_string())
                    .with_close(((ix * 7) % 11) as f64)
            })
            .collect()
    }

    #[test]
    fn unittest_pagination_37_by_15() {
        let records = records(37);

        assert_eq!(paginate(&records, 1, 15).len(), 15);
        assert_eq!(paginate(&records, 2, 15).len(), 15);
        assert_eq!(paginate(&records, 3, 15).len(), 7);
        assert!(paginate(&records, 4, 15).is_empty());
        assert!(paginate(&records, 0, 15).is_empty());
        assert_eq!(total_pages(records.len(), 15), 3);
    }

    #[test]
    fn unittest_clamp_page() {
        assert_eq!(clamp_page(0, 37, 15), 1);
        assert_eq!(clamp_page(2, 37, 15), 2);
        assert_eq!(clamp_page(9, 37, 15), 3);
        assert_eq!(clamp_page(5, 0, 15), 1);
    }

    #[test]
    fn unittest_date_desc_is_reverse_of_asc() {
        let records = records(20);

        let asc = sort_records(&records, &Field::Date, SortDirection::Ascending)
            .into_iter()
            .map(StockRecord::date)
            .collect_vec();
        let mut desc = sort_records(&records, &Field::Date, SortDirection::Descending)
            .into_iter()
            .map(StockRecord::date)
            .collect_vec();

        desc.reverse();
        assert_eq!(asc, desc);
        assert_eq!(asc.first(), Some(&"2024-01-01"));
    }

    #[test]
    fn unittest_sort_numeric_field() {
        let records = records(11);

        let closes = sort_records(&records, &Field::Close, SortDirection::Ascending)
            .into_iter()
            .map(|r| r.close)
            .collect_vec();
        assert_eq!(closes, (0..11).map(|v| v as f64).collect_vec());

        let top = sort_records(&records, &Field::Close, SortDirection::Descending);
        assert_eq!(top[0].close, 10.0);
    }

    #[test]
    fn unittest_missing_values_sort_last() {
        let records = vec![
            StockRecord::new("2024-01-01").with_indicator("RSI", 50.0),
            StockRecord::new("2024-01-02"),
            StockRecord::new("2024-01-03").with_indicator("RSI", f64::NAN),
            StockRecord::new("2024-01-04").with_indicator("RSI", 70.0),
        ];
        let rsi = Field::from("RSI");

        let asc = sort_records(&records, &rsi, SortDirection::Ascending);
        assert_eq!(asc[0].date(), "2024-01-01");
        assert_eq!(asc[1].date(), "2024-01-04");

        let desc = sort_records(&records, &rsi, SortDirection::Descending);
        assert_eq!(desc[0].date(), "2024-01-04");
        assert_eq!(desc[1].date(), "2024-01-01");
        assert!(desc[2..].iter().all(|r| r.indicators.get("RSI").map_or(true, |v| v.is_nan())));
    }

    #[test]
    fn unittest_undated_rows_sort_last() {
        let records = vec![
            StockRecord::new("??"),
            StockRecord::new("2024-01-01"),
            StockRecord::new("2024-01-02"),
        ];

        let desc = sort_records(&records, &Field::Date, SortDirection::Descending);
        assert_eq!(desc[0].date(), "2024-01-02");
        assert_eq!(desc[2].date(), "??");
    }

    #[test]
    fn unittest_sort_state_toggle() {
        let state = SortState::default();
        assert_eq!(state.field, Field::Date);
        assert_eq!(state.direction, SortDirection::Descending);

        let state = state.toggle(Field::Date);
        assert_eq!(state.direction, SortDirection::Ascending);

        let state = state.toggle(Field::Close);
        assert_eq!(state.field, Field::Close);
        assert_eq!(state.direction, SortDirection::Descending);
    }

    #[test]
    fn unittest_table_page_defaults_to_newest_first() {
        let records = records(37);
        let page = table_page(&records, &SortState::default(), 1, 15);

        assert_eq!(page.total_pages, 3);
        assert_eq!(page.rows.len(), 15);
        assert_eq!(page.rows[0].date(), "2024-02-06");

        let last = table_page(&records, &SortState::default(), 3, 15);
        assert_eq!(last.rows.len(), 7);
        assert_eq!(last.rows[6].date(), "2024-01-01");
    }
}
