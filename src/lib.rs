//! Daily stock series analytics.
//!
//! Raw CSV text flows through [`parser`] and [`normalize`] into a
//! date-ascending [`Series`]. From there three independent, pure views are
//! derived: [`window::filter`] for charts, [`summary::summarize`] for the
//! summary panel and [`table::table_page`] for the paginated table.

pub mod analysis;
pub mod config;
pub mod error;
pub mod loader;
pub mod model;
pub mod normalize;
pub mod parser;
pub mod summary;
pub mod table;
pub mod utils;
pub mod window;

pub use config::DashboardConfig;
pub use error::SeriesError;
pub use loader::{FileLoader, LoadSequencer, SeriesLoader};
pub use model::{Field, Series, StockRecord};
pub use summary::{summarize, SummaryStats};
pub use table::{SortDirection, SortState};
pub use window::TimeRange;
