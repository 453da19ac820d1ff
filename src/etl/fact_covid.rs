use std::{collections::BTreeMap, path::Path};

use log::{info, warn};

use crate::{
    data::{
        raw::RawStateDaily,
        warehouse::{DimHospital, DimRegion, FactCovid},
    },
    errors::{Error, Result},
};

use super::{dim_hospital, dim_region, extract_raw, keys, tables, Etl};

pub const ETL_NAME: &str = "fact_covid";
pub const TABLE_NAME: &str = "fact_covid";
pub const OUTPUT_FILE_NAME: &str = "fact_covid.csv";
pub const COLUMNS: &[&str] = &[
    "date",
    "state_fips",
    "state",
    "positive",
    "positiveincrease",
    "negative",
    "death",
    "deathincrease",
    "recovered",
    "hospitalized",
    "hospitalizedcurrently",
    "hospitalizeddischarged",
    "hospitalizedcumulative",
    "hospitalizedincrease",
    "region_sk",
    "hosp_sk",
];

/// Lowest surrogate key per state. A state is represented by a single region
/// (and hospital) even though it has many.
fn first_key_per_state<'a>(rows: impl Iterator<Item = (&'a str, i64)>) -> BTreeMap<&'a str, i64> {
    let mut first: BTreeMap<&str, i64> = BTreeMap::new();
    for (state_fips, key) in rows {
        first
            .entry(state_fips)
            .and_modify(|current| *current = (*current).min(key))
            .or_insert(key);
    }
    first
}

/// Builds one fact row per reporting day and state.
///
/// Daily rows whose state has no region or no hospital are dropped, as are rows
/// missing the state code, the abbreviation or the date. Missing counters are 0.
pub fn build_fact_covid(
    daily: &[RawStateDaily],
    dim_region: &[DimRegion],
    dim_hospital: &[DimHospital],
) -> Result<Vec<FactCovid>> {
    if daily.is_empty() {
        return Err(Error::empty_input(extract_raw::STATES_DAILY_TABLE));
    }

    let region_keys = first_key_per_state(dim_region.iter().map(|r| (r.state_fips.as_str(), r.region_sk)));
    let hospital_keys = first_key_per_state(dim_hospital.iter().map(|h| (h.state_fips.as_str(), h.hosp_sk)));

    let mut incomplete = 0usize;
    let mut unmatched = 0usize;
    let mut facts = Vec::with_capacity(daily.len());
    for row in daily {
        let (Some(raw_fips), Some(state), Some(date_id)) = (row.fips.as_deref(), row.state.as_ref(), row.date) else {
            incomplete += 1;
            continue;
        };
        let state_fips = keys::normalize_fips(raw_fips, 2)?;
        let (Some(region_sk), Some(hosp_sk)) =
            (region_keys.get(state_fips.as_str()), hospital_keys.get(state_fips.as_str()))
        else {
            unmatched += 1;
            continue;
        };
        facts.push(FactCovid {
            date_id,
            state: state.clone(),
            positive: row.positive.unwrap_or(0),
            positiveincrease: row.positiveincrease.unwrap_or(0),
            negative: row.negative.unwrap_or(0),
            death: row.death.unwrap_or(0),
            deathincrease: row.deathincrease.unwrap_or(0),
            recovered: row.recovered.unwrap_or(0),
            hospitalized: row.hospitalized.unwrap_or(0),
            hospitalizedcurrently: row.hospitalizedcurrently.unwrap_or(0),
            hospitalizeddischarged: row.hospitalizeddischarged.unwrap_or(0),
            hospitalizedcumulative: row.hospitalizedcumulative.unwrap_or(0),
            hospitalizedincrease: row.hospitalizedincrease.unwrap_or(0),
            region_sk: *region_sk,
            hosp_sk: *hosp_sk,
            state_fips,
        });
    }

    // stable, so rows of a state keep the source order
    facts.sort_by(|a, b| a.state_fips.cmp(&b.state_fips));

    if incomplete > 0 {
        warn!(etl_name = ETL_NAME, dropped = incomplete; "Dropped daily rows without fips, state or date");
    }
    if unmatched > 0 {
        warn!(etl_name = ETL_NAME, dropped = unmatched; "Dropped daily rows of states without a region or hospital");
    }
    info!(etl_name = ETL_NAME, rows = facts.len(); "Built fact table");
    Ok(facts)
}

pub struct FactCovidEtl {
}

impl FactCovidEtl {
    pub fn new() -> FactCovidEtl {
        FactCovidEtl {}
    }
}

pub struct FactInput {
    pub daily: Vec<RawStateDaily>,
    pub dim_region: Vec<DimRegion>,
    pub dim_hospital: Vec<DimHospital>,
}

impl Etl for FactCovidEtl {
    type Input = FactInput;
    type Output = Vec<FactCovid>;

    fn etl_name(&self) -> &str {
        ETL_NAME
    }

    fn output_file_names(&self) -> &[&str] {
        &[OUTPUT_FILE_NAME]
    }

    fn extract(&mut self, dir: &Path) -> Result<Self::Input> {
        Ok(FactInput {
            daily: extract_raw::read_raw_tables(dir)?.states_daily,
            dim_region: tables::read_table(dir, dim_region::TABLE_NAME)?,
            dim_hospital: tables::read_table(dir, dim_hospital::TABLE_NAME)?,
        })
    }

    fn transform(&mut self, input: Self::Input) -> Result<Self::Output> {
        build_fact_covid(&input.daily, &input.dim_region, &input.dim_hospital)
    }

    fn load(&mut self, dir: &Path, output: Self::Output) -> Result<()> {
        tables::write_table(dir, TABLE_NAME, COLUMNS, &output)?;
        Ok(())
    }
}
