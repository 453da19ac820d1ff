//! Star schema rows. Field order is the CSV column order the warehouse loads by
//! position, so it must not be rearranged.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct DimRegion {
    pub region_sk: i64,
    pub fips: String,
    pub state_fips: String,
    pub county_fips: String,
    pub province_state: Option<String>,
    pub county: Option<String>,
    pub country_region: Option<String>,
    pub latitude: f64,
    pub longitude: f64,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct DimHospital {
    pub hosp_sk: i64,
    pub fips: String,
    pub state_fips: String,
    pub county_fips: String,
    pub state_name: String,
    pub county_name: Option<String>,
    pub hospital_name: Option<String>,
    pub hq_address: Option<String>,
    pub hq_city: Option<String>,
    pub hq_state: Option<String>,
    pub hq_zip_code: Option<String>,
    pub hospital_type: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct DimDate {
    pub date_id: i64,
    pub date: NaiveDate,
    pub day_name: String,
    /// ISO, Monday = 1.
    pub day_of_week: u32,
    pub day: u32,
    pub day_of_year: u32,
    pub month: u32,
    pub month_name: String,
    /// ISO week number.
    pub week: u32,
    pub quarter: u32,
    pub year: i32,
    pub year_half: u32,
    pub is_weekend: bool,
}

/// One row per (date, state_fips). The region and hospital keys point at the
/// first region/hospital of the state, not at a county.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct FactCovid {
    #[serde(rename = "date")]
    pub date_id: i64,
    pub state_fips: String,
    pub state: String,
    pub positive: i64,
    pub positiveincrease: i64,
    pub negative: i64,
    pub death: i64,
    pub deathincrease: i64,
    pub recovered: i64,
    pub hospitalized: i64,
    pub hospitalizedcurrently: i64,
    pub hospitalizeddischarged: i64,
    pub hospitalizedcumulative: i64,
    pub hospitalizedincrease: i64,
    pub region_sk: i64,
    pub hosp_sk: i64,
}
