use std::path::Path;

use chrono::{Datelike, NaiveDate, Weekday};
use log::info;

use crate::{
    data::{raw::RawStateDaily, warehouse::DimDate},
    errors::{Error, ErrorKind, Result},
};

use super::{extract_raw, tables, Etl};

pub const ETL_NAME: &str = "dim_date";
pub const TABLE_NAME: &str = "dim_date";
pub const OUTPUT_FILE_NAME: &str = "dim_date.csv";
pub const COLUMNS: &[&str] = &[
    "date_id",
    "date",
    "day_name",
    "day_of_week",
    "day",
    "day_of_year",
    "month",
    "month_name",
    "week",
    "quarter",
    "year",
    "year_half",
    "is_weekend",
];

/// Parses a YYYYMMDD date id.
pub fn parse_date_id(date_id: i64) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(&date_id.to_string(), "%Y%m%d")
        .map_err(|err| Error::malformed_value(format!("date {date_id} is not YYYYMMDD: {err}")))
}

pub fn date_id(date: NaiveDate) -> i64 {
    i64::from(date.year()) * 10_000 + i64::from(date.month()) * 100 + i64::from(date.day())
}

fn calendar_row(date: NaiveDate) -> DimDate {
    let month = date.month();
    DimDate {
        date_id: date_id(date),
        date,
        day_name: date.format("%A").to_string(),
        day_of_week: date.weekday().number_from_monday(),
        day: date.day(),
        day_of_year: date.ordinal(),
        month,
        month_name: date.format("%B").to_string(),
        week: date.iso_week().week(),
        quarter: (month - 1) / 3 + 1,
        year: date.year(),
        year_half: if month < 7 { 1 } else { 2 },
        is_weekend: matches!(date.weekday(), Weekday::Sat | Weekday::Sun),
    }
}

/// One calendar row per day from `start` to `end`, both included.
pub fn build_dim_date(start: NaiveDate, end: NaiveDate) -> Result<Vec<DimDate>> {
    if end < start {
        return Err(Error::new(
            ErrorKind::InvalidDateRange,
            format!("date range ends ({end}) before it starts ({start})"),
        ));
    }

    let days = (end - start).num_days() + 1;
    let mut dates = Vec::with_capacity(days as usize);
    let mut current = Some(start);
    while let Some(date) = current.filter(|date| *date <= end) {
        dates.push(calendar_row(date));
        current = date.succ_opt();
    }

    info!(etl_name = ETL_NAME, rows = dates.len(); "Built date dimension");
    Ok(dates)
}

/// First and last reporting day of the daily testing table.
pub fn reporting_range(daily: &[RawStateDaily]) -> Result<(NaiveDate, NaiveDate)> {
    let mut ids = daily.iter().filter_map(|row| row.date);
    let first = ids
        .next()
        .ok_or_else(|| Error::empty_input(extract_raw::STATES_DAILY_TABLE))?;
    let (min, max) = ids.fold((first, first), |(min, max), id| (min.min(id), max.max(id)));
    Ok((parse_date_id(min)?, parse_date_id(max)?))
}

pub struct DimDateEtl {
}

impl DimDateEtl {
    pub fn new() -> DimDateEtl {
        DimDateEtl {}
    }
}

impl Etl for DimDateEtl {
    type Input = (NaiveDate, NaiveDate);
    type Output = Vec<DimDate>;

    fn etl_name(&self) -> &str {
        ETL_NAME
    }

    fn output_file_names(&self) -> &[&str] {
        &[OUTPUT_FILE_NAME]
    }

    fn extract(&mut self, dir: &Path) -> Result<Self::Input> {
        let raw = extract_raw::read_raw_tables(dir)?;
        reporting_range(&raw.states_daily)
    }

    fn transform(&mut self, input: Self::Input) -> Result<Self::Output> {
        let (start, end) = input;
        build_dim_date(start, end)
    }

    fn load(&mut self, dir: &Path, output: Self::Output) -> Result<()> {
        tables::write_table(dir, TABLE_NAME, COLUMNS, &output)?;
        Ok(())
    }
}
