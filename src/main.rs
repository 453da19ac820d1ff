mod etl;
mod data;
mod errors;

use std::env;
use std::fs::{create_dir_all, File};
use std::io;
use std::path::{Path, PathBuf};

use log::info;
use serde::Deserialize;
use structured_logger::json::new_writer;
use structured_logger::Builder;

use crate::errors::{Error, ErrorKind, Result};
use crate::etl::dim_date::DimDateEtl;
use crate::etl::dim_hospital::DimHospitalEtl;
use crate::etl::dim_region::DimRegionEtl;
use crate::etl::extract_raw::ExtractRawEtl;
use crate::etl::fact_covid::FactCovidEtl;
use crate::etl::report_views::ReportViewsEtl;
use crate::etl::schema_draft::SchemaDraftEtl;
use crate::etl::warehouse_script::WarehouseScriptEtl;
use crate::etl::Etl;

const DEFAULT_CONFIG_PATH: &str = "config/covid_dw.json";

#[derive(Deserialize, Debug, Clone)]
pub struct UserConfig {
    /// Directory holding the extracted source tables.
    pub data_path: String,
    /// Working directory the stages write into.
    pub dest_path: String,
    #[serde(default = "default_log_level")]
    pub log_level: String,
    #[serde(default)]
    pub refresh_raw_cache: bool,
    #[serde(default)]
    pub inputs: InputFiles,
    pub warehouse: WarehouseConfig,
}

/// File names of the extracted source tables, relative to `data_path`.
#[derive(Deserialize, Debug, Clone)]
#[serde(default)]
pub struct InputFiles {
    pub jhu: String,
    pub nyt_county: String,
    pub hospital_beds: String,
    pub states_daily: String,
}

impl Default for InputFiles {
    fn default() -> Self {
        InputFiles {
            jhu: "enigma_jhu.csv".to_string(),
            nyt_county: "nytimes_data_us_county.csv".to_string(),
            hospital_beds: "rearc_usa_hospital_beds.csv".to_string(),
            states_daily: "rearc_testing_states_daily.csv".to_string(),
        }
    }
}

#[derive(Deserialize, Debug, Clone)]
pub struct WarehouseConfig {
    pub s3_bucket: String,
    #[serde(default = "default_output_prefix")]
    pub output_prefix: String,
    #[serde(default = "default_unload_prefix")]
    pub unload_prefix: String,
    pub iam_role_arn: String,
    pub region: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_output_prefix() -> String {
    "output/".to_string()
}

fn default_unload_prefix() -> String {
    "queries/".to_string()
}

fn load_user_config(path: &str) -> Result<UserConfig> {
    let file = File::open(path).map_err(|err| {
        Error::new(ErrorKind::Config, format!("could not open config file {path}: {err}"))
    })?;
    let config = serde_json::from_reader(file).map_err(|err| {
        Error::new(ErrorKind::Config, format!("could not parse config file {path}: {err}"))
    })?;
    Ok(config)
}

fn create_output_dir(config: &UserConfig) -> Result<PathBuf> {
    let output_dir = Path::new(&config.dest_path).to_path_buf();
    create_dir_all(&output_dir)?;
    Ok(output_dir)
}

fn setup_logging(level: &str) {
    Builder::with_level(level)
        .with_target_writer("*", new_writer(io::stdout()))
        .init();
}

/// Runs every stage once. Derived tables are always rebuilt; only the parsed
/// source tables may come from the cache.
fn run_pipeline(config: &UserConfig, output_dir: &Path) -> Result<()> {
    ExtractRawEtl::new(config).process(output_dir)?;

    DimRegionEtl::new().rebuild(output_dir)?;
    DimHospitalEtl::new().rebuild(output_dir)?;
    DimDateEtl::new().rebuild(output_dir)?;
    FactCovidEtl::new().rebuild(output_dir)?;

    SchemaDraftEtl::new().rebuild(output_dir)?;
    WarehouseScriptEtl::new(&config.warehouse).rebuild(output_dir)?;
    ReportViewsEtl::new().rebuild(output_dir)?;
    Ok(())
}

fn main() -> Result<()> {
    let config_path = env::args().nth(1).unwrap_or_else(|| DEFAULT_CONFIG_PATH.to_string());
    let user_config = load_user_config(&config_path)?;
    setup_logging(&user_config.log_level);

    let output_dir = create_output_dir(&user_config)?;
    run_pipeline(&user_config, &output_dir)?;

    let output_dir = output_dir.display().to_string();
    info!(output_dir = output_dir.as_str(); "Pipeline finished");
    Ok(())
}
