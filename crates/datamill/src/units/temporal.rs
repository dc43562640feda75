//! Datetime parsing and calendar feature extraction.

use chrono::{NaiveDate, NaiveDateTime};
use polars::prelude::*;
use serde::Deserialize;

use crate::error::{PipelineError, Result, ResultExt};
use crate::unit::{impl_unit_spec, OutputKind, TransformUnit};
use crate::utils;

fn default_format() -> String {
    "%Y-%m-%d".to_string()
}

/// Parse a string column into a millisecond datetime column, in place.
///
/// The format is a chrono strftime pattern; a date-only pattern parses to
/// midnight. Nulls stay null, an unparseable value is an error.
#[derive(Debug, Clone, Deserialize)]
pub struct ParseDatetime {
    col: String,
    #[serde(default = "default_format")]
    format: String,
}

impl ParseDatetime {
    pub fn new(col: impl Into<String>, format: impl Into<String>) -> Self {
        Self {
            col: col.into(),
            format: format.into(),
        }
    }

    fn parse_millis(&self, value: &str) -> Result<i64> {
        let parsed = NaiveDateTime::parse_from_str(value, &self.format)
            .or_else(|_| {
                NaiveDate::parse_from_str(value, &self.format)
                    .map(|date| date.and_time(chrono::NaiveTime::MIN))
            })
            .map_err(|_| PipelineError::DatetimeParse {
                column: self.col.clone(),
                value: value.to_string(),
            })?;
        Ok(parsed.and_utc().timestamp_millis())
    }
}

impl TransformUnit for ParseDatetime {
    fn apply(&mut self, df: DataFrame) -> Result<DataFrame> {
        let series = utils::column(&df, &self.col)?;
        let ca = series.str().context(format!(
            "column '{}' must be a string column to parse datetimes",
            self.col
        ))?;

        let mut millis: Vec<Option<i64>> = Vec::with_capacity(ca.len());
        for value in ca.into_iter() {
            match value {
                Some(value) => millis.push(Some(self.parse_millis(value)?)),
                None => millis.push(None),
            }
        }

        let parsed = Series::new(self.col.as_str().into(), millis)
            .cast(&DataType::Datetime(TimeUnit::Milliseconds, None))?;

        let mut df = df;
        df.replace(&self.col, parsed)?;
        Ok(df)
    }

    fn output_kind(&self) -> OutputKind {
        OutputKind::Rewrite
    }

    fn name(&self) -> &'static str {
        "parse_datetime"
    }
}

impl_unit_spec!(ParseDatetime, "parse_datetime");

fn as_datetime(df: &DataFrame, name: &str) -> Result<Series> {
    utils::column(df, name)?
        .cast(&DataType::Datetime(TimeUnit::Milliseconds, None))
        .context(format!("column '{}' is not datetime-like", name))
}

macro_rules! calendar_unit {
    ($ty:ident, $name:literal, $extract:expr, $doc:literal) => {
        #[doc = $doc]
        ///
        /// Emits one `{prefix}_{col}` column; the prefix defaults to the
        /// unit name.
        #[derive(Debug, Clone, Deserialize)]
        pub struct $ty {
            col: String,
            #[serde(default)]
            prefix: Option<String>,
        }

        impl $ty {
            pub fn new(col: impl Into<String>) -> Self {
                Self {
                    col: col.into(),
                    prefix: None,
                }
            }
        }

        impl TransformUnit for $ty {
            fn apply(&mut self, df: DataFrame) -> Result<DataFrame> {
                let datetime = as_datetime(&df, &self.col)?;
                let extract: fn(&Series) -> PolarsResult<Series> = $extract;
                let mut feature = extract(&datetime)?;

                let prefix = self.prefix.as_deref().unwrap_or($name);
                feature.rename(format!("{}_{}", prefix, self.col).into());

                Ok(DataFrame::new(vec![feature.into_column()])?)
            }

            fn output_kind(&self) -> OutputKind {
                OutputKind::NewColumns
            }

            fn name(&self) -> &'static str {
                $name
            }
        }

        impl_unit_spec!($ty, $name);
    };
}

calendar_unit!(
    DayOfYear,
    "day_of_year",
    |s| s.ordinal_day()?.into_series().cast(&DataType::Int32),
    "Day of the year, 1 through 366."
);
calendar_unit!(
    MonthOfYear,
    "month_of_year",
    |s| s.month()?.into_series().cast(&DataType::Int32),
    "Month number, 1 through 12."
);
calendar_unit!(
    DayOfMonth,
    "day_of_month",
    |s| s.day()?.into_series().cast(&DataType::Int32),
    "Day of the month, 1 through 31."
);
calendar_unit!(
    DayOfWeek,
    "day_of_week",
    |s| s.weekday()?.into_series().cast(&DataType::Int32),
    "ISO weekday, Monday = 1 through Sunday = 7."
);
calendar_unit!(
    IsWeekend,
    "is_weekend",
    |s| Ok(s.weekday()?.gt_eq(6).into_series()),
    "Whether the date falls on Saturday or Sunday."
);

#[cfg(test)]
mod tests {
    use super::*;

    fn dates() -> DataFrame {
        // 2024-01-06 is a Saturday, 2024-02-29 a leap-year Thursday.
        df!["when" => ["2024-01-06", "2024-02-29"]].unwrap()
    }

    fn feature(df: &DataFrame, name: &str, row: usize) -> i32 {
        df.column(name)
            .unwrap()
            .get(row)
            .unwrap()
            .try_extract::<i32>()
            .unwrap()
    }

    #[test]
    fn test_parse_then_extract_calendar_features() {
        let mut parse = ParseDatetime::new("when", "%Y-%m-%d");
        let df = parse.apply(dates()).unwrap();
        assert!(matches!(
            df.column("when").unwrap().dtype(),
            DataType::Datetime(TimeUnit::Milliseconds, None)
        ));

        let out = DayOfYear::new("when").apply(df.clone()).unwrap();
        assert_eq!(feature(&out, "day_of_year_when", 0), 6);
        assert_eq!(feature(&out, "day_of_year_when", 1), 60);

        let out = MonthOfYear::new("when").apply(df.clone()).unwrap();
        assert_eq!(feature(&out, "month_of_year_when", 1), 2);

        let out = DayOfMonth::new("when").apply(df.clone()).unwrap();
        assert_eq!(feature(&out, "day_of_month_when", 1), 29);

        let out = DayOfWeek::new("when").apply(df).unwrap();
        assert_eq!(feature(&out, "day_of_week_when", 0), 6);
        assert_eq!(feature(&out, "day_of_week_when", 1), 4);
    }

    #[test]
    fn test_is_weekend_flags_saturday_not_thursday() {
        let mut parse = ParseDatetime::new("when", "%Y-%m-%d");
        let df = parse.apply(dates()).unwrap();

        let out = IsWeekend::new("when").apply(df).unwrap();
        let flags = out.column("is_weekend_when").unwrap();
        assert_eq!(flags.get(0).unwrap(), AnyValue::Boolean(true));
        assert_eq!(flags.get(1).unwrap(), AnyValue::Boolean(false));
    }

    #[test]
    fn test_parse_datetime_with_time_component() {
        let df = df!["when" => ["2024-01-06 13:45:00"]].unwrap();
        let mut parse = ParseDatetime::new("when", "%Y-%m-%d %H:%M:%S");
        let out = parse.apply(df).unwrap();

        let millis = out
            .column("when")
            .unwrap()
            .cast(&DataType::Int64)
            .unwrap();
        let value = millis.get(0).unwrap().try_extract::<i64>().unwrap();
        assert_eq!(value % 86_400_000, 49_500_000); // 13:45:00 into the day
    }

    #[test]
    fn test_parse_datetime_rejects_garbage() {
        let df = df!["when" => ["not a date"]].unwrap();
        let mut parse = ParseDatetime::new("when", "%Y-%m-%d");

        let err = parse.apply(df).unwrap_err();
        assert!(matches!(
            err,
            PipelineError::DatetimeParse { ref column, ref value }
                if column == "when" && value == "not a date"
        ));
    }

    #[test]
    fn test_parse_datetime_keeps_nulls() {
        let df = df!["when" => [Some("2024-01-06"), None]].unwrap();
        let mut parse = ParseDatetime::new("when", "%Y-%m-%d");
        let out = parse.apply(df).unwrap();
        assert_eq!(out.column("when").unwrap().null_count(), 1);
    }
}
