use self::raw::{RawHospitalBed, RawJhuRecord, RawNytCounty, RawStateDaily, SourceFile};

pub mod raw;
pub mod views;
pub mod warehouse;

/// The four raw tables handed over by the extraction step, parsed but otherwise
/// untouched. Cached between runs by the raw extraction stage.

#[derive(rkyv::Archive, rkyv::Deserialize, rkyv::Serialize, Debug, Default, Clone, PartialEq)]
pub struct RawTables {
    pub jhu: Vec<RawJhuRecord>,
    pub nyt_county: Vec<RawNytCounty>,
    pub hospital_beds: Vec<RawHospitalBed>,
    pub states_daily: Vec<RawStateDaily>,
    /// The input files the tables were read from.
    pub sources: Vec<SourceFile>,
}
