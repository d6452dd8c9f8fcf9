use std::path::PathBuf;

use clap::{Parser, Subcommand};
use itertools::Itertools;
use stock_insight::{
    analysis::{
        correlation_matrix, cumulative_returns, monthly_returns, return_histogram, tail,
        yearly_returns,
    },
    summarize,
    table::{clamp_page, table_page},
    window, DashboardConfig, Field, FileLoader, SeriesLoader, SortDirection, SortState,
    StockRecord, TimeRange,
};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[derive(Parser)]
#[command(author, version, about = "Summaries and views over a daily stock series")]
struct Cli {
    /// Path to the processed CSV file.
    #[arg(long, global = true, env = "STOCK_INSIGHT_DATA")]
    data: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Period-level performance and risk metrics.
    Summary {
        #[arg(long)]
        json: bool,
    },
    /// Records inside a look-back window (1m, 3m, 6m, 1y, 3y, all).
    Window {
        #[arg(long, default_value = "1y")]
        range: String,
        #[arg(long)]
        json: bool,
    },
    /// One page of the sorted table.
    Table {
        #[arg(long, default_value = "Date")]
        sort: String,
        #[arg(long)]
        asc: bool,
        #[arg(long, default_value_t = 1)]
        page: usize,
        #[arg(long, default_value_t = 15)]
        page_size: usize,
        #[arg(long)]
        json: bool,
    },
    /// Yearly and monthly sums of daily returns.
    Performance,
    /// Histogram of daily returns.
    Distribution {
        #[arg(long, default_value_t = 50)]
        bins: usize,
    },
    /// Pearson correlation between columns.
    Correlation {
        #[arg(
            long,
            value_delimiter = ',',
            default_value = "Close,Volume,Daily_Return,Volatility_20d,RSI,MACD"
        )]
        columns: Vec<String>,
    },
    /// The most recent trading days with their cumulative return.
    Tail {
        #[arg(long, default_value_t = 90)]
        days: usize,
    },
}

fn main() -> eyre::Result<()> {
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let cli = Cli::parse();

    let mut config = DashboardConfig::default();
    if let Some(path) = cli.data {
        config = config.with_data_path(path);
    }

    let series = FileLoader::new(&config.data_path).load()?;

    match cli.command {
        Commands::Summary { json } => {
            let stats = summarize(&series)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&stats)?);
            } else {
                print!("{stats}");
            }
        }
        Commands::Window { range, json } => {
            let config = config.with_time_range(TimeRange::from(range.as_str()));
            let records = window::filter(&series, config.time_range);
            if json {
                println!("{}", serde_json::to_string_pretty(records)?);
            } else {
                println!("{} records in {}", records.len(), config.time_range);
                records.iter().for_each(print_row);
            }
        }
        Commands::Table {
            sort,
            asc,
            page,
            page_size,
            json,
        } => {
            let direction = if asc {
                SortDirection::Ascending
            } else {
                SortDirection::Descending
            };
            let config = config.with_page_size(page_size).with_sort(SortState {
                field: Field::from(sort.as_str()),
                direction,
            });
            let page = clamp_page(page, series.len(), config.page_size);
            let view = table_page(&series, &config.sort, page, config.page_size);

            if json {
                println!("{}", serde_json::to_string_pretty(&view)?);
            } else {
                println!(
                    "Page {} of {} sorted by {} {}",
                    view.number, view.total_pages, config.sort.field, config.sort.direction
                );
                view.rows.into_iter().for_each(print_row);
            }
        }
        Commands::Performance => {
            println!("Yearly Return (%)");
            for (year, sum) in yearly_returns(&series) {
                println!("{year}: {sum:.2}");
            }
            println!();
            println!("Monthly Return (%)");
            for ((year, month), sum) in monthly_returns(&series) {
                println!("{year}-{month:02}: {sum:.1}");
            }
        }
        Commands::Distribution { bins } => {
            for bin in return_histogram(&series, bins) {
                println!("{:>8.2} .. {:>8.2} {:>6}", bin.lower, bin.upper, bin.count);
            }
        }
        Commands::Correlation { columns } => {
            let fields = columns.iter().map(|c| Field::from(c.as_str())).collect_vec();
            let matrix = correlation_matrix(&series, &fields);

            println!("{:>16} {}", "", fields.iter().map(|f| format!("{f:>16}")).join(" "));
            for (field, row) in fields.iter().zip(matrix) {
                let cells = row
                    .into_iter()
                    .map(|c| c.map_or_else(|| format!("{:>16}", "N/A"), |c| format!("{c:>16.2}")))
                    .join(" ");
                println!("{:>16} {cells}", field.to_string());
            }
        }
        Commands::Tail { days } => {
            let config = config.with_tail_days(days);
            let curve = cumulative_returns(&series);
            let skip = series.len() - tail(&series, config.tail_days).len();

            for (record, cumulative) in series.iter().zip(curve).skip(skip) {
                println!("{} {:>10.2} {:>8.2}%", record.date(), record.close, cumulative);
            }
        }
    }

    Ok(())
}

fn print_row(record: &StockRecord) {
    let fmt = |value: Option<f64>| match value.filter(|v| v.is_finite()) {
        Some(v) => format!("{v:.2}"),
        None => "N/A".to_owned(),
    };

    println!(
        "{} {:>10} {:>10} {:>10} {:>10} {:>14} {:>8} {:>8}",
        record.date(),
        fmt(Some(record.open)),
        fmt(Some(record.high)),
        fmt(Some(record.low)),
        fmt(Some(record.close)),
        fmt(Some(record.volume)),
        fmt(record.daily_return),
        fmt(record.indicators.get("RSI").copied()),
    );
}
