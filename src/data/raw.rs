//! Rows of the extracted source tables. Every column may be missing in the
//! source, so nullability is kept as is and resolved by the builders.

/// County-level case report row (Enigma JHU).
#[derive(rkyv::Archive, rkyv::Deserialize, rkyv::Serialize, Debug, Default, Clone, PartialEq)]
pub struct RawJhuRecord {
    pub fips: Option<String>,
    pub province_state: Option<String>,
    pub country_region: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

/// County reference row (NYT us_county).
#[derive(rkyv::Archive, rkyv::Deserialize, rkyv::Serialize, Debug, Default, Clone, PartialEq)]
pub struct RawNytCounty {
    pub fips: Option<String>,
    pub county: Option<String>,
}

/// Hospital directory row (Rearc USA hospital beds).
#[derive(rkyv::Archive, rkyv::Deserialize, rkyv::Serialize, Debug, Default, Clone, PartialEq)]
pub struct RawHospitalBed {
    pub fips: Option<String>,
    pub state_name: Option<String>,
    pub county_name: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub hospital_name: Option<String>,
    pub hq_address: Option<String>,
    pub hq_city: Option<String>,
    pub hq_state: Option<String>,
    pub hq_zip_code: Option<String>,
    pub hospital_type: Option<String>,
}

/// Daily state testing row (Rearc COVID-19 testing, states_daily).
#[derive(rkyv::Archive, rkyv::Deserialize, rkyv::Serialize, Debug, Default, Clone, PartialEq)]
pub struct RawStateDaily {
    pub fips: Option<String>,
    /// YYYYMMDD
    pub date: Option<i64>,
    pub state: Option<String>,
    pub positive: Option<i64>,
    pub positiveincrease: Option<i64>,
    pub negative: Option<i64>,
    pub death: Option<i64>,
    pub deathincrease: Option<i64>,
    pub recovered: Option<i64>,
    pub hospitalized: Option<i64>,
    pub hospitalizedcurrently: Option<i64>,
    pub hospitalizeddischarged: Option<i64>,
    pub hospitalizedcumulative: Option<i64>,
    pub hospitalizedincrease: Option<i64>,
}

/// Identity of a source file at extraction time. A cache built from files that
/// have since moved or changed is stale.
#[derive(rkyv::Archive, rkyv::Deserialize, rkyv::Serialize, Debug, Default, Clone, PartialEq, Eq)]
pub struct SourceFile {
    pub path: String,
    pub len: u64,
    /// Modification time in nanoseconds since the epoch, when the platform has one.
    pub modified_ns: Option<u64>,
}
