use itertools::Itertools;
use tracing::{debug, warn};

use crate::{
    error::{Result, SeriesError},
    model::{Field, Series, StockRecord},
};

/// A numeric cell that could not be parsed and was replaced by `NaN`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldParseFailure {
    /// 1-based line number in the source text.
    pub line: usize,
    pub column: String,
    pub raw: String,
}

#[derive(Debug, Default)]
pub struct ParsedSeries {
    pub columns: Vec<Field>,
    pub series: Series,
    pub failures: Vec<FieldParseFailure>,
}

/// Parses comma separated text into a series, in input line order.
pub fn parse(text: &str) -> Result<Series> {
    let parsed = parse_with_failures(text)?;

    if !parsed.failures.is_empty() {
        warn!(
            failures = parsed.failures.len(),
            "replaced unparseable fields with NaN"
        );
    }

    Ok(parsed.series)
}

pub fn parse_with_failures(text: &str) -> Result<ParsedSeries> {
    let mut lines = text.lines().map(|line| line.trim_end_matches('\r'));

    let header = match lines.next() {
        Some(header) if !header.trim().is_empty() => header,
        _ => return Err(SeriesError::MalformedInput("missing header line".to_owned())),
    };

    let columns = header.split(',').map(Field::from).collect_vec();

    if columns.first() != Some(&Field::Date) {
        return Err(SeriesError::MalformedInput(
            "header has no 'Date' column in first position".to_owned(),
        ));
    }

    if let Some(missing) = Field::REQUIRED.iter().find(|f| !columns.contains(f)) {
        return Err(SeriesError::MalformedInput(format!(
            "header has no '{missing}' column"
        )));
    }

    let mut records = Vec::new();
    let mut failures = Vec::new();

    for (ix, line) in lines.enumerate() {
        if line.trim().is_empty() {
            continue;
        }

        // header is line 1
        let line_number = ix + 2;
        let cells = line.split(',').map(str::trim).collect_vec();
        let mut record = StockRecord::new(cells[0]);

        for (field, raw) in columns.iter().zip(cells.iter()).skip(1) {
            let value = match parse_cell(raw) {
                Cell::Empty => None,
                Cell::Number(value) => Some(value),
                Cell::Invalid => {
                    warn!(line = line_number, column = %field, raw, "unparseable field");
                    failures.push(FieldParseFailure {
                        line: line_number,
                        column: field.column_name().to_owned(),
                        raw: (*raw).to_owned(),
                    });
                    Some(f64::NAN)
                }
            };

            assign(&mut record, field, value);
        }

        // required columns missing from a short row
        for field in columns.iter().skip(cells.len()) {
            assign(&mut record, field, None);
        }

        records.push(record);
    }

    debug!(
        records = records.len(),
        columns = columns.len(),
        "parsed series text"
    );

    Ok(ParsedSeries {
        columns,
        series: Series::from(records),
        failures,
    })
}

enum Cell {
    Empty,
    Number(f64),
    Invalid,
}

fn parse_cell(raw: &str) -> Cell {
    if raw.is_empty() {
        return Cell::Empty;
    }

    match raw.parse::<f64>() {
        Ok(value) => Cell::Number(value),
        Err(_) => Cell::Invalid,
    }
}

fn assign(record: &mut StockRecord, field: &Field, value: Option<f64>) {
    let required = value.unwrap_or(f64::NAN);

    match field {
        Field::Date => {}
        Field::Open => record.open = required,
        Field::High => record.high = required,
        Field::Low => record.low = required,
        Field::Close => record.close = required,
        Field::Volume => record.volume = required,
        Field::DailyReturn => record.daily_return = value,
        Field::Volatility20d => record.volatility_20d = value,
        Field::Indicator(name) => {
            if let Some(value) = value {
                record.indicators.insert(name.clone(), value);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{parse, parse_with_failures};
    use crate::{error::SeriesError, model::Field};

    const HEADER: &str = "Date,Close,High,Low,Open,Volume,Daily_Return,Volatility_20d,RSI";

    #[test]
    fn unittest_parse_rows_in_input_order() -> eyre::Result<()> {
        let text = format!(
            "{HEADER}\n\
             2024-01-03,11,12,10,10.5,1000,4.76,,\n\
             2024-01-02,10.5,11,10,10,900,,,48.2\n"
        );
        let series = parse(&text)?;

        assert_eq!(series.len(), 2);
        assert_eq!(series[0].date(), "2024-01-03");
        assert_eq!(series[0].close, 11.0);
        assert_eq!(series[0].open, 10.5);
        assert_eq!(series[0].volume, 1000.0);
        assert_eq!(series[0].daily_return, Some(4.76));
        assert_eq!(series[0].volatility_20d, None);
        assert!(series[0].indicators.is_empty());

        assert_eq!(series[1].date(), "2024-01-02");
        assert_eq!(series[1].daily_return, None);
        assert_eq!(series[1].indicators.get("RSI"), Some(&48.2));

        Ok(())
    }

    #[test]
    fn unittest_parse_skips_blank_lines_and_crlf() -> eyre::Result<()> {
        let text = format!("{HEADER}\r\n\r\n2024-01-02,1,1,1,1,1,0,,\r\n   \n2024-01-03,2,2,2,2,2,100,,\r\n");
        let series = parse(&text)?;

        assert_eq!(series.len(), 2);
        assert_eq!(series[1].daily_return, Some(100.0));

        Ok(())
    }

    #[test]
    fn unittest_parse_is_deterministic() -> eyre::Result<()> {
        let text = format!("{HEADER}\n2024-01-02,1,1,1,1,1,0,,\n2024-01-03,2,2,2,2,2,x,,\n");

        let first = parse(&text)?;
        let second = parse(&text)?;

        assert_eq!(first.len(), second.len());
        for (a, b) in first.iter().zip(second.iter()) {
            assert_eq!(a.date(), b.date());
            assert_eq!(a.close, b.close);
        }

        Ok(())
    }

    #[test]
    fn unittest_unparseable_field_becomes_nan() -> eyre::Result<()> {
        let text = format!("{HEADER}\n2024-01-02,abc,1,1,1,1,oops,,\n");
        let parsed = parse_with_failures(&text)?;

        let record = &parsed.series[0];
        assert!(record.close.is_nan());
        assert!(record.daily_return.is_some_and(f64::is_nan));
        assert_eq!(record.volatility_20d, None);

        assert_eq!(parsed.failures.len(), 2);
        assert_eq!(parsed.failures[0].line, 2);
        assert_eq!(parsed.failures[0].column, "Close");
        assert_eq!(parsed.failures[0].raw, "abc");
        assert_eq!(parsed.failures[1].column, "Daily_Return");

        Ok(())
    }

    #[test]
    fn unittest_short_row_leaves_fields_absent() -> eyre::Result<()> {
        let text = format!("{HEADER}\n2024-01-02,5,6\n");
        let parsed = parse_with_failures(&text)?;

        let record = &parsed.series[0];
        assert_eq!(record.close, 5.0);
        assert_eq!(record.high, 6.0);
        assert!(record.low.is_nan());
        assert!(record.volume.is_nan());
        assert_eq!(record.daily_return, None);
        assert!(parsed.failures.is_empty());

        Ok(())
    }

    #[test]
    fn unittest_header_columns_are_resolved() -> eyre::Result<()> {
        let parsed = parse_with_failures(&format!("{HEADER}\n"))?;

        assert!(parsed.series.is_empty());
        assert_eq!(parsed.columns[0], Field::Date);
        assert_eq!(parsed.columns[6], Field::DailyReturn);
        assert_eq!(parsed.columns[8], Field::Indicator("RSI".to_owned()));

        Ok(())
    }

    #[test]
    fn unittest_missing_header_is_malformed() {
        assert!(matches!(parse(""), Err(SeriesError::MalformedInput(_))));
        assert!(matches!(
            parse("\n2024-01-02,1,1,1,1,1"),
            Err(SeriesError::MalformedInput(_))
        ));
    }

    #[test]
    fn unittest_missing_date_column_is_malformed() {
        let result = parse("Close,Open,High,Low,Volume\n100,1,2,0.5,10\n110,1,2,0.5,10\n");
        match result {
            Err(SeriesError::MalformedInput(message)) => assert!(message.contains("Date")),
            other => panic!("expected MalformedInput, got {other:?}"),
        }

        let moved = parse("Close,Date,Open,High,Low,Volume\n100,2024-01-02,1,2,0.5,10\n");
        assert!(matches!(moved, Err(SeriesError::MalformedInput(_))));
    }

    #[test]
    fn unittest_missing_required_column_is_malformed() {
        let result = parse("Date,Close,High,Low,Open\n2024-01-02,1,1,1,1\n");
        match result {
            Err(SeriesError::MalformedInput(message)) => assert!(message.contains("Volume")),
            other => panic!("expected MalformedInput, got {other:?}"),
        }
    }
}
