//! The warehouse script: fixed star schema DDL, bulk loads of the CSV tables,
//! reporting views and the unloads of those views.

use std::{fs, path::Path};

use log::info;

use crate::{errors::Result, WarehouseConfig};

use super::{dim_date, dim_hospital, dim_region, fact_covid, report_views, tables, Etl};

pub const ETL_NAME: &str = "warehouse_script";
pub const OUTPUT_FILE_NAME: &str = "warehouse.sql";

pub const DIM_DATE_DDL: &str = r#"CREATE TABLE IF NOT EXISTS "dim_date" (
    "date_id" INTEGER,
    "date" DATE NOT NULL,
    "day_name" VARCHAR(9) NOT NULL,
    "day_of_week" INTEGER NOT NULL,
    "day" INTEGER NOT NULL,
    "day_of_year" INTEGER NOT NULL,
    "month" INTEGER NOT NULL,
    "month_name" VARCHAR(10) NOT NULL,
    "week" INTEGER NOT NULL,
    "quarter" INTEGER NOT NULL,
    "year" INTEGER NOT NULL,
    "year_half" INTEGER NOT NULL,
    "is_weekend" BOOLEAN NOT NULL,
    PRIMARY KEY (date_id)
)
SORTKEY (date);"#;

pub const DIM_HOSPITAL_DDL: &str = r#"CREATE TABLE IF NOT EXISTS "dim_hospital" (
    "hosp_sk" INTEGER IDENTITY(1, 1),
    "fips" VARCHAR(6) NOT NULL,
    "state_fips" VARCHAR(2) NOT NULL,
    "county_fips" VARCHAR(3) NOT NULL,
    "state_name" VARCHAR(30) NOT NULL,
    "county_name" VARCHAR(120),
    "hospital_name" TEXT NOT NULL,
    "hq_address" VARCHAR(150),
    "hq_city" VARCHAR(150),
    "hq_state" CHAR(2),
    "hq_zip_code" CHAR(5),
    "hospital_type" VARCHAR(150),
    "latitude" REAL,
    "longitude" REAL,
    PRIMARY KEY (hosp_sk)
)
SORTKEY (state_name);"#;

pub const DIM_REGION_DDL: &str = r#"CREATE TABLE IF NOT EXISTS "dim_region" (
    "region_sk" INTEGER IDENTITY(1, 1),
    "fips" VARCHAR(6) NOT NULL,
    "state_fips" VARCHAR(2) NOT NULL,
    "county_fips" VARCHAR(3) NOT NULL,
    "state" VARCHAR(30) NOT NULL,
    "county" VARCHAR(120),
    "country" VARCHAR(20),
    "latitude" REAL,
    "longitude" REAL,
    PRIMARY KEY (region_sk)
)
SORTKEY (state);"#;

pub const FACT_COVID_DDL: &str = r#"CREATE TABLE IF NOT EXISTS "fact_covid" (
    "date" INTEGER,
    "state_fips" VARCHAR(3) NOT NULL,
    "state" VARCHAR(30) NOT NULL,
    "positive" REAL,
    "positiveincrease" INTEGER,
    "negative" REAL,
    "death" REAL,
    "deathincrease" INTEGER,
    "recovered" REAL,
    "hospitalized" REAL,
    "hospitalizedcurrently" REAL,
    "hospitalizeddischarged" REAL,
    "hospitalizedcumulative" REAL,
    "hospitalizedincrease" INTEGER,
    "region_sk" INTEGER,
    "hosp_sk" INTEGER,
    PRIMARY KEY (date, state_fips),
    FOREIGN KEY (date) REFERENCES dim_date (date_id),
    FOREIGN KEY (region_sk) REFERENCES dim_region (region_sk),
    FOREIGN KEY (hosp_sk) REFERENCES dim_hospital (hosp_sk)
)
SORTKEY (date, state);"#;

pub const STATE_TOTALS_VIEW: &str = r#"CREATE OR REPLACE VIEW state_totals (
    state, state_abv, total_positive_cases, total_deaths, avg_hospitalized) AS
    SELECT dr.state AS state_name, fc.state, SUM(positive) AS positive_cases,
        SUM(death) AS deaths, ROUND(AVG(hospitalizedcurrently), 0) AS avg_hospitalized
    FROM fact_covid fc
        JOIN dim_region dr ON fc.region_sk = dr.region_sk
    GROUP BY dr.state, fc.state
    ORDER BY fc.state;"#;

pub const US_TOTALS_VIEW: &str = r#"CREATE OR REPLACE VIEW us_totals (
    positive_cases, deaths, begin_date, end_date) AS
    SELECT SUM(positive) AS positive_cases, SUM(death) AS deaths,
        MIN(date) AS begin_date, MAX(date) AS end_date
    FROM fact_covid;"#;

pub const STATE_DAILY_VIEW: &str = r#"CREATE OR REPLACE VIEW state_daily (
    date, state, state_abv, positive, pos_increase, negative, deaths, death_increase,
    recovered, hospitalized, hosp_currently, hosp_increase, latitude, longitude) AS
    SELECT dd.date, dr.state AS state_name, fc.state, fc.positive, fc.positiveincrease,
        fc.negative, fc.death, fc.deathincrease, fc.recovered, fc.hospitalized,
        fc.hospitalizedcurrently, fc.hospitalizedincrease,
        MIN(dr.latitude) AS latitude, MIN(dr.longitude) AS longitude
    FROM fact_covid fc
        JOIN dim_date dd ON fc.date = dd.date_id
        JOIN dim_region dr ON fc.region_sk = dr.region_sk
    GROUP BY dd.date, dr.state, fc.state, fc.positive, fc.positiveincrease,
        fc.negative, fc.death, fc.deathincrease, fc.recovered, fc.hospitalized,
        fc.hospitalizedcurrently, fc.hospitalizedincrease
    ORDER BY dd.date, fc.state;"#;

/// Tables in load order, dimensions before the fact table referencing them.
/// Surrogate keys are loaded as computed, not generated by the warehouse.
const LOADS: &[(&str, bool)] = &[
    (dim_date::TABLE_NAME, false),
    (dim_region::TABLE_NAME, true),
    (dim_hospital::TABLE_NAME, true),
    (fact_covid::TABLE_NAME, false),
];

const VIEWS: &[&str] = &[report_views::US_TOTALS, report_views::STATE_TOTALS, report_views::STATE_DAILY];

pub fn copy_sql(config: &WarehouseConfig, table: &str, explicit_ids: bool) -> String {
    let mut sql = format!(
        "COPY {table} FROM 's3://{}/{}{}'\nCREDENTIALS 'aws_iam_role={}'\nREGION '{}'\nDELIMITER ','\n",
        config.s3_bucket,
        config.output_prefix,
        tables::table_file_name(table),
        config.iam_role_arn,
        config.region,
    );
    if explicit_ids {
        sql.push_str("EXPLICIT_IDS\n");
    }
    sql.push_str("IGNOREHEADER 1\nCOMPUPDATE OFF;");
    sql
}

pub fn unload_sql(config: &WarehouseConfig, view: &str) -> String {
    format!(
        "UNLOAD ('SELECT * FROM {view}')\nTO 's3://{}/{}{view}'\nCREDENTIALS 'aws_iam_role={}'\nREGION '{}'\n\
         DELIMITER AS ','\nHEADER\nADDQUOTES\nNULL AS ''\nPARALLEL OFF;",
        config.s3_bucket, config.unload_prefix, config.iam_role_arn, config.region,
    )
}

/// All statements in execution order.
pub fn render_script(config: &WarehouseConfig) -> Vec<String> {
    let mut statements: Vec<String> = [DIM_DATE_DDL, DIM_HOSPITAL_DDL, DIM_REGION_DDL, FACT_COVID_DDL]
        .iter()
        .map(|ddl| ddl.to_string())
        .collect();
    statements.extend(LOADS.iter().map(|(table, explicit_ids)| copy_sql(config, table, *explicit_ids)));
    statements.extend([STATE_TOTALS_VIEW, US_TOTALS_VIEW, STATE_DAILY_VIEW].iter().map(|view| view.to_string()));
    statements.extend(VIEWS.iter().map(|view| unload_sql(config, view)));
    statements
}

pub struct WarehouseScriptEtl<'a> {
    config: &'a WarehouseConfig,
}

impl WarehouseScriptEtl<'_> {
    pub fn new(config: &WarehouseConfig) -> WarehouseScriptEtl {
        WarehouseScriptEtl {
            config
        }
    }
}

impl Etl for WarehouseScriptEtl<'_> {
    type Input = ();
    type Output = Vec<String>;

    fn etl_name(&self) -> &str {
        ETL_NAME
    }

    fn output_file_names(&self) -> &[&str] {
        &[OUTPUT_FILE_NAME]
    }

    fn extract(&mut self, _dir: &Path) -> Result<Self::Input> {
        Ok(())
    }

    fn transform(&mut self, _input: ()) -> Result<Self::Output> {
        let statements = render_script(self.config);
        info!(etl_name = ETL_NAME, statements = statements.len(); "Rendered warehouse script");
        Ok(statements)
    }

    fn load(&mut self, dir: &Path, output: Self::Output) -> Result<()> {
        fs::write(dir.join(OUTPUT_FILE_NAME), output.join("\n\n") + "\n")?;
        Ok(())
    }
}
