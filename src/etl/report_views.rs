//! Local rendition of the warehouse reporting views, computed from the star
//! tables the same way the view SQL in [`super::warehouse_script`] does.

use std::{collections::{BTreeMap, HashMap}, path::Path};

use chrono::NaiveDate;
use log::{info, warn};

use crate::{
    data::{
        views::{StateDailyRow, StateTotal, UsTotal},
        warehouse::{DimDate, DimRegion, FactCovid},
    },
    errors::Result,
};

use super::{dim_date, dim_region, fact_covid, tables, Etl};

pub const ETL_NAME: &str = "report_views";

pub const STATE_TOTALS: &str = "state_totals";
pub const US_TOTALS: &str = "us_totals";
pub const STATE_DAILY: &str = "state_daily";

pub const STATE_TOTALS_COLUMNS: &[&str] = &[
    "state",
    "state_abv",
    "total_positive_cases",
    "total_deaths",
    "avg_hospitalized",
];
pub const US_TOTALS_COLUMNS: &[&str] = &["positive_cases", "deaths", "begin_date", "end_date"];
pub const STATE_DAILY_COLUMNS: &[&str] = &[
    "date",
    "state",
    "state_abv",
    "positive",
    "pos_increase",
    "negative",
    "deaths",
    "death_increase",
    "recovered",
    "hospitalized",
    "hosp_currently",
    "hosp_increase",
    "latitude",
    "longitude",
];

pub struct ViewInput {
    pub fact_covid: Vec<FactCovid>,
    pub dim_region: Vec<DimRegion>,
    pub dim_date: Vec<DimDate>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReportViews {
    pub state_totals: Vec<StateTotal>,
    pub us_totals: Vec<UsTotal>,
    pub state_daily: Vec<StateDailyRow>,
}

#[derive(Default)]
struct StateAccumulator {
    positive: i64,
    deaths: i64,
    hospitalized_sum: f64,
    rows: u32,
}

/// Totals per state, ordered by state abbreviation.
pub fn state_totals(facts: &[FactCovid], regions: &[DimRegion]) -> Vec<StateTotal> {
    let by_key: HashMap<i64, &DimRegion> = regions.iter().map(|r| (r.region_sk, r)).collect();

    let mut groups: BTreeMap<(&str, Option<&str>), StateAccumulator> = BTreeMap::new();
    for fact in facts {
        let Some(region) = by_key.get(&fact.region_sk) else {
            continue;
        };
        let group = groups
            .entry((fact.state.as_str(), region.province_state.as_deref()))
            .or_default();
        group.positive += fact.positive;
        group.deaths += fact.death;
        group.hospitalized_sum += fact.hospitalizedcurrently as f64;
        group.rows += 1;
    }

    groups
        .into_iter()
        .map(|((state_abv, state), group)| StateTotal {
            state: state.map(str::to_string),
            state_abv: state_abv.to_string(),
            total_positive_cases: group.positive,
            total_deaths: group.deaths,
            avg_hospitalized: (group.hospitalized_sum / f64::from(group.rows)).round() as i64,
        })
        .collect()
}

/// Country-wide totals and the reporting period, always a single row.
pub fn us_totals(facts: &[FactCovid]) -> UsTotal {
    UsTotal {
        positive_cases: facts.iter().map(|f| f.positive).sum(),
        deaths: facts.iter().map(|f| f.death).sum(),
        begin_date: facts.iter().map(|f| f.date_id).min(),
        end_date: facts.iter().map(|f| f.date_id).max(),
    }
}

#[derive(PartialEq, Eq, PartialOrd, Ord)]
struct DailyKey<'a> {
    date: NaiveDate,
    state_abv: &'a str,
    state: Option<&'a str>,
    measures: [i64; 9],
}

/// Daily figures per state with the coordinates of the state's region, ordered
/// by (date, state abbreviation).
pub fn state_daily(facts: &[FactCovid], regions: &[DimRegion], dates: &[DimDate]) -> Vec<StateDailyRow> {
    let by_key: HashMap<i64, &DimRegion> = regions.iter().map(|r| (r.region_sk, r)).collect();
    let by_id: HashMap<i64, NaiveDate> = dates.iter().map(|d| (d.date_id, d.date)).collect();

    let mut groups: BTreeMap<DailyKey, (f64, f64)> = BTreeMap::new();
    for fact in facts {
        let (Some(region), Some(date)) = (by_key.get(&fact.region_sk), by_id.get(&fact.date_id)) else {
            continue;
        };
        let key = DailyKey {
            date: *date,
            state_abv: fact.state.as_str(),
            state: region.province_state.as_deref(),
            measures: [
                fact.positive,
                fact.positiveincrease,
                fact.negative,
                fact.death,
                fact.deathincrease,
                fact.recovered,
                fact.hospitalized,
                fact.hospitalizedcurrently,
                fact.hospitalizedincrease,
            ],
        };
        groups
            .entry(key)
            .and_modify(|(lat, lon)| {
                *lat = lat.min(region.latitude);
                *lon = lon.min(region.longitude);
            })
            .or_insert((region.latitude, region.longitude));
    }

    groups
        .into_iter()
        .map(|(key, (latitude, longitude))| {
            let [positive, pos_increase, negative, deaths, death_increase, recovered, hospitalized, hosp_currently, hosp_increase] =
                key.measures;
            StateDailyRow {
                date: key.date,
                state: key.state.map(str::to_string),
                state_abv: key.state_abv.to_string(),
                positive,
                pos_increase,
                negative,
                deaths,
                death_increase,
                recovered,
                hospitalized,
                hosp_currently,
                hosp_increase,
                latitude,
                longitude,
            }
        })
        .collect()
}

pub fn build_report_views(input: &ViewInput) -> ReportViews {
    let views = ReportViews {
        state_totals: state_totals(&input.fact_covid, &input.dim_region),
        us_totals: vec![us_totals(&input.fact_covid)],
        state_daily: state_daily(&input.fact_covid, &input.dim_region, &input.dim_date),
    };
    if views.state_daily.len() < input.fact_covid.len() {
        warn!(
            etl_name = ETL_NAME,
            facts = input.fact_covid.len(),
            rows = views.state_daily.len();
            "Daily view has fewer rows than the fact table"
        );
    }
    info!(
        etl_name = ETL_NAME,
        state_totals = views.state_totals.len(),
        state_daily = views.state_daily.len();
        "Computed reporting views"
    );
    views
}

pub struct ReportViewsEtl {
}

impl ReportViewsEtl {
    pub fn new() -> ReportViewsEtl {
        ReportViewsEtl {}
    }
}

impl Etl for ReportViewsEtl {
    type Input = ViewInput;
    type Output = ReportViews;

    fn etl_name(&self) -> &str {
        ETL_NAME
    }

    fn output_file_names(&self) -> &[&str] {
        &["state_totals.csv", "us_totals.csv", "state_daily.csv"]
    }

    fn extract(&mut self, dir: &Path) -> Result<Self::Input> {
        Ok(ViewInput {
            fact_covid: tables::read_table(dir, fact_covid::TABLE_NAME)?,
            dim_region: tables::read_table(dir, dim_region::TABLE_NAME)?,
            dim_date: tables::read_table(dir, dim_date::TABLE_NAME)?,
        })
    }

    fn transform(&mut self, input: Self::Input) -> Result<Self::Output> {
        Ok(build_report_views(&input))
    }

    fn load(&mut self, dir: &Path, output: Self::Output) -> Result<()> {
        tables::write_table(dir, STATE_TOTALS, STATE_TOTALS_COLUMNS, &output.state_totals)?;
        tables::write_table(dir, US_TOTALS, US_TOTALS_COLUMNS, &output.us_totals)?;
        tables::write_table(dir, STATE_DAILY, STATE_DAILY_COLUMNS, &output.state_daily)?;
        Ok(())
    }
}
