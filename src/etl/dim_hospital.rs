use std::path::Path;

use log::info;

use crate::{
    data::{raw::RawHospitalBed, warehouse::DimHospital},
    errors::{Error, Result},
};

use super::{extract_raw, keys, tables, Etl};

pub const ETL_NAME: &str = "dim_hospital";
pub const TABLE_NAME: &str = "dim_hospital";
pub const OUTPUT_FILE_NAME: &str = "dim_hospital.csv";
pub const COLUMNS: &[&str] = &[
    "hosp_sk",
    "fips",
    "state_fips",
    "county_fips",
    "state_name",
    "county_name",
    "hospital_name",
    "hq_address",
    "hq_city",
    "hq_state",
    "hq_zip_code",
    "hospital_type",
    "latitude",
    "longitude",
];

/// Builds the hospital dimension. Every hospital with a fips code and a state
/// is kept; keys are numbered 1..N in (state_fips, county_fips) order.
pub fn build_dim_hospital(beds: &[RawHospitalBed]) -> Result<Vec<DimHospital>> {
    if beds.is_empty() {
        return Err(Error::empty_input(extract_raw::HOSPITAL_BEDS_TABLE));
    }

    let mut hospitals = Vec::with_capacity(beds.len());
    for bed in beds {
        let (Some(raw_fips), Some(state_name)) = (bed.fips.as_deref(), bed.state_name.as_ref()) else {
            continue;
        };
        let fips = keys::normalize_fips(raw_fips, 5)?;
        let (state_fips, county_fips) = keys::split_county_fips(&fips);
        hospitals.push(DimHospital {
            hosp_sk: 0,
            fips,
            state_fips,
            county_fips,
            state_name: state_name.clone(),
            county_name: bed.county_name.clone(),
            hospital_name: bed.hospital_name.clone(),
            hq_address: bed.hq_address.clone(),
            hq_city: bed.hq_city.clone(),
            hq_state: bed.hq_state.clone(),
            // zip codes keep their spelling, only short ones get padded
            hq_zip_code: bed.hq_zip_code.as_deref().map(|zip| keys::zero_pad(zip, 5)),
            hospital_type: bed.hospital_type.clone(),
            latitude: bed.latitude,
            longitude: bed.longitude,
        });
    }

    hospitals.sort_by(|a, b| (&a.state_fips, &a.county_fips).cmp(&(&b.state_fips, &b.county_fips)));
    for (idx, hospital) in hospitals.iter_mut().enumerate() {
        hospital.hosp_sk = idx as i64 + 1;
    }

    let dropped = beds.len() - hospitals.len();
    info!(etl_name = ETL_NAME, rows = hospitals.len(), dropped = dropped; "Built hospital dimension");
    Ok(hospitals)
}

pub struct DimHospitalEtl {
}

impl DimHospitalEtl {
    pub fn new() -> DimHospitalEtl {
        DimHospitalEtl {}
    }
}

impl Etl for DimHospitalEtl {
    type Input = Vec<RawHospitalBed>;
    type Output = Vec<DimHospital>;

    fn etl_name(&self) -> &str {
        ETL_NAME
    }

    fn output_file_names(&self) -> &[&str] {
        &[OUTPUT_FILE_NAME]
    }

    fn extract(&mut self, dir: &Path) -> Result<Self::Input> {
        Ok(extract_raw::read_raw_tables(dir)?.hospital_beds)
    }

    fn transform(&mut self, input: Self::Input) -> Result<Self::Output> {
        build_dim_hospital(&input)
    }

    fn load(&mut self, dir: &Path, output: Self::Output) -> Result<()> {
        tables::write_table(dir, TABLE_NAME, COLUMNS, &output)?;
        Ok(())
    }
}
