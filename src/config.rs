use std::path::PathBuf;

use crate::{table::SortState, window::TimeRange};

#[derive(Debug, Clone)]
pub struct DashboardConfig {
    pub data_path: PathBuf,
    pub page_size: usize,
    pub time_range: TimeRange,
    pub sort: SortState,
    pub tail_days: usize,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            data_path: PathBuf::from("./data/processed_stock_data.csv"),
            page_size: 15,
            time_range: TimeRange::OneYear,
            sort: SortState::default(),
            tail_days: 90,
        }
    }
}

impl DashboardConfig {
    pub fn with_data_path(mut self, value: impl Into<PathBuf>) -> Self {
        self.data_path = value.into();
        self
    }

    pub fn with_page_size(mut self, value: usize) -> Self {
        self.page_size = value.max(1);
        self
    }

    pub fn with_time_range(mut self, value: TimeRange) -> Self {
        self.time_range = value;
        self
    }

    pub fn with_sort(mut self, value: SortState) -> Self {
        self.sort = value;
        self
    }

    pub fn with_tail_days(mut self, value: usize) -> Self {
        self.tail_days = value;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::DashboardConfig;
    use crate::{model::Field, table::SortDirection, window::TimeRange};

    #[test]
    fn unittest_defaults() {
        let config = DashboardConfig::default();

        assert_eq!(config.page_size, 15);
        assert_eq!(config.time_range, TimeRange::OneYear);
        assert_eq!(config.sort.field, Field::Date);
        assert_eq!(config.sort.direction, SortDirection::Descending);
        assert_eq!(config.tail_days, 90);
    }

    #[test]
    fn unittest_builders() {
        let config = DashboardConfig::default()
            .with_data_path("x.csv")
            .with_page_size(0)
            .with_time_range(TimeRange::All)
            .with_tail_days(30);

        assert_eq!(config.data_path.to_str(), Some("x.csv"));
        assert_eq!(config.page_size, 1);
        assert_eq!(config.time_range, TimeRange::All);
        assert_eq!(config.tail_days, 30);
    }
}
