//! Rows of the reporting views, column names as exposed by the warehouse views.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct StateTotal {
    pub state: Option<String>,
    pub state_abv: String,
    pub total_positive_cases: i64,
    pub total_deaths: i64,
    pub avg_hospitalized: i64,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct UsTotal {
    pub positive_cases: i64,
    pub deaths: i64,
    pub begin_date: Option<i64>,
    pub end_date: Option<i64>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct StateDailyRow {
    pub date: NaiveDate,
    pub state: Option<String>,
    pub state_abv: String,
    pub positive: i64,
    pub pos_increase: i64,
    pub negative: i64,
    pub deaths: i64,
    pub death_increase: i64,
    pub recovered: i64,
    pub hospitalized: i64,
    pub hosp_currently: i64,
    pub hosp_increase: i64,
    pub latitude: f64,
    pub longitude: f64,
}
