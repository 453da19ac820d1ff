use std::{collections::HashMap, fs::{self, File}, io::{BufReader, Read, Write}, path::{Path, PathBuf}, time::UNIX_EPOCH};

use csv::StringRecord;
use log::{info, warn};
use rkyv::AlignedVec;
use serde_json::Value;

use crate::{
    data::{
        raw::{RawHospitalBed, RawJhuRecord, RawNytCounty, RawStateDaily, SourceFile},
        RawTables,
    },
    errors::{Error, ErrorKind, Result},
    UserConfig,
};

use super::{keys, Etl};

pub const ETL_NAME: &str = "extract_raw";
pub const OUTPUT_FILE_NAME: &str = "raw_tables.rkyv";

pub const JHU_TABLE: &str = "enigma_jhu";
pub const NYT_COUNTY_TABLE: &str = "nytimes_data_us_county";
pub const HOSPITAL_BEDS_TABLE: &str = "rearc_usa_hospital_beds";
pub const STATES_DAILY_TABLE: &str = "rearc_testing_states_daily";

/// Reads the four extracted source tables from `data_path` and caches them in
/// the working directory.
pub struct ExtractRawEtl<'a> {
    config: &'a UserConfig,
}

/// Header name (lowercased) to column index.
struct HeaderMap {
    file: String,
    columns: HashMap<String, usize>,
}

impl HeaderMap {
    fn new(file: &Path, headers: &StringRecord) -> Self {
        let columns = headers
            .iter()
            .enumerate()
            .map(|(idx, name)| (name.trim().to_lowercase(), idx))
            .collect();
        HeaderMap {
            file: file.display().to_string(),
            columns,
        }
    }

    fn require(&self, names: &[&str]) -> Result<()> {
        for name in names {
            if !self.columns.contains_key(*name) {
                return Err(Error::new(
                    ErrorKind::MissingColumn,
                    format!("{} has no column {name:?}", self.file),
                ));
            }
        }
        Ok(())
    }
}

/// One data line of a source file.
struct SourceRow<'a> {
    headers: &'a HeaderMap,
    record: &'a StringRecord,
    line: usize,
}

impl SourceRow<'_> {
    fn text(&self, name: &str) -> Option<String> {
        let idx = self.headers.columns.get(name)?;
        self.record
            .get(*idx)
            .map(str::trim)
            .filter(|s| !is_null(s))
            .map(str::to_string)
    }

    fn float(&self, name: &str) -> Result<Option<f64>> {
        match self.text(name) {
            None => Ok(None),
            Some(raw) => parse_float(&raw)
                .map(Some)
                .ok_or_else(|| self.malformed(name, &raw)),
        }
    }

    fn count(&self, name: &str) -> Result<Option<i64>> {
        match self.text(name) {
            None => Ok(None),
            Some(raw) => keys::cast_integer(&raw)
                .map(Some)
                .ok_or_else(|| self.malformed(name, &raw)),
        }
    }

    fn malformed(&self, column: &str, raw: &str) -> Error {
        Error::malformed_value(format!(
            "{} line {}: column {column} has unparsable value {raw:?}",
            self.headers.file, self.line
        ))
    }
}

/// Spellings of a missing value in the extracts, the default markers of the
/// dataframe tooling that produced them.
const NULL_MARKERS: &[&str] = &[
    "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN",
    "<NA>", "N/A", "NA", "NULL", "None", "n/a", "null",
];

fn is_null(raw: &str) -> bool {
    raw.is_empty() || raw.eq_ignore_ascii_case("nan") || NULL_MARKERS.contains(&raw)
}

fn parse_float(raw: &str) -> Option<f64> {
    let value: f64 = raw.parse().ok()?;
    if value.is_finite() {
        Some(value)
    } else {
        None
    }
}

fn read_csv<T>(path: &Path, required: &[&str], parse_row: impl Fn(&SourceRow<'_>) -> Result<T>) -> Result<Vec<T>> {
    let file = File::open(path).map_err(|err| {
        Error::new(ErrorKind::Io, format!("could not open {}: {err}", path.display()))
    })?;
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_reader(BufReader::new(file));
    let headers = HeaderMap::new(path, reader.headers()?);
    headers.require(required)?;

    let mut rows = Vec::new();
    for (idx, record) in tqdm::tqdm(reader.records().enumerate()) {
        let record = record?;
        let row = SourceRow {
            headers: &headers,
            record: &record,
            // header is line 1
            line: idx + 2,
        };
        rows.push(parse_row(&row)?);
    }
    Ok(rows)
}

fn parse_jhu(row: &SourceRow) -> Result<RawJhuRecord> {
    Ok(RawJhuRecord {
        fips: row.text("fips"),
        province_state: row.text("province_state"),
        country_region: row.text("country_region"),
        latitude: row.float("latitude")?,
        longitude: row.float("longitude")?,
    })
}

fn parse_nyt_county(row: &SourceRow) -> Result<RawNytCounty> {
    Ok(RawNytCounty {
        fips: row.text("fips"),
        county: row.text("county"),
    })
}

fn parse_hospital_bed(row: &SourceRow) -> Result<RawHospitalBed> {
    let longitude = match row.float("longtitude")? {
        Some(value) => Some(value),
        None => row.float("longitude")?,
    };
    Ok(RawHospitalBed {
        fips: row.text("fips"),
        state_name: row.text("state_name"),
        county_name: row.text("county_name"),
        latitude: row.float("latitude")?,
        longitude,
        hospital_name: row.text("hospital_name"),
        hq_address: row.text("hq_address"),
        hq_city: row.text("hq_city"),
        hq_state: row.text("hq_state"),
        hq_zip_code: row.text("hq_zip_code"),
        hospital_type: row.text("hospital_type"),
    })
}

fn parse_state_daily(row: &SourceRow) -> Result<RawStateDaily> {
    Ok(RawStateDaily {
        fips: row.text("fips"),
        date: row.count("date")?,
        state: row.text("state"),
        positive: row.count("positive")?,
        positiveincrease: row.count("positiveincrease")?,
        negative: row.count("negative")?,
        death: row.count("death")?,
        deathincrease: row.count("deathincrease")?,
        recovered: row.count("recovered")?,
        hospitalized: row.count("hospitalized")?,
        hospitalizedcurrently: row.count("hospitalizedcurrently")?,
        hospitalizeddischarged: row.count("hospitalizeddischarged")?,
        hospitalizedcumulative: row.count("hospitalizedcumulative")?,
        hospitalizedincrease: row.count("hospitalizedincrease")?,
    })
}

fn geojson_text(properties: &serde_json::Map<String, Value>, name: &str) -> Option<String> {
    match properties.get(name)? {
        Value::String(s) => Some(s.trim().to_string()).filter(|s| !is_null(s)),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn geojson_float(properties: &serde_json::Map<String, Value>, name: &str) -> Result<Option<f64>> {
    match properties.get(name) {
        Some(Value::Number(n)) => Ok(n.as_f64()),
        Some(Value::String(s)) if !is_null(s.trim()) => parse_float(s.trim())
            .map(Some)
            .ok_or_else(|| Error::malformed_value(format!("property {name} has unparsable value {s:?}"))),
        _ => Ok(None),
    }
}

/// Point geometry coordinates as (longitude, latitude).
fn geojson_point(feature: &Value) -> Option<(f64, f64)> {
    let coordinates = feature.get("geometry")?.get("coordinates")?.as_array()?;
    Some((coordinates.first()?.as_f64()?, coordinates.get(1)?.as_f64()?))
}

/// Reads the hospital directory as published, a GeoJSON feature collection with
/// one feature per hospital.
fn read_hospital_geojson(path: &Path) -> Result<Vec<RawHospitalBed>> {
    let mut text = String::new();
    File::open(path)?.read_to_string(&mut text)?;
    let document: Value = serde_json::from_str(&text)?;
    let features = document
        .get("features")
        .and_then(Value::as_array)
        .ok_or_else(|| Error::new(ErrorKind::MissingColumn, format!("{} has no features array", path.display())))?;

    let mut rows = Vec::with_capacity(features.len());
    for feature in features {
        let empty = serde_json::Map::new();
        let properties = feature
            .get("properties")
            .and_then(Value::as_object)
            .unwrap_or(&empty);
        let point = geojson_point(feature);
        let latitude = match geojson_float(properties, "latitude")? {
            Some(value) => Some(value),
            None => point.map(|(_, lat)| lat),
        };
        let longitude = match geojson_float(properties, "longtitude")? {
            Some(value) => Some(value),
            None => match geojson_float(properties, "longitude")? {
                Some(value) => Some(value),
                None => point.map(|(lon, _)| lon),
            },
        };
        rows.push(RawHospitalBed {
            fips: geojson_text(properties, "fips"),
            state_name: geojson_text(properties, "state_name"),
            county_name: geojson_text(properties, "county_name"),
            latitude,
            longitude,
            hospital_name: geojson_text(properties, "hospital_name"),
            hq_address: geojson_text(properties, "hq_address"),
            hq_city: geojson_text(properties, "hq_city"),
            hq_state: geojson_text(properties, "hq_state"),
            hq_zip_code: geojson_text(properties, "hq_zip_code"),
            hospital_type: geojson_text(properties, "hospital_type"),
        });
    }
    Ok(rows)
}

fn is_geojson(path: &Path) -> bool {
    matches!(
        path.extension().and_then(|ext| ext.to_str()),
        Some("geojson") | Some("json")
    )
}

pub fn read_jhu(path: &Path) -> Result<Vec<RawJhuRecord>> {
    read_csv(path, &["fips", "province_state", "latitude", "longitude"], parse_jhu)
}

pub fn read_nyt_county(path: &Path) -> Result<Vec<RawNytCounty>> {
    read_csv(path, &["fips", "county"], parse_nyt_county)
}

pub fn read_hospital_beds(path: &Path) -> Result<Vec<RawHospitalBed>> {
    if is_geojson(path) {
        read_hospital_geojson(path)
    } else {
        read_csv(path, &["fips", "state_name"], parse_hospital_bed)
    }
}

pub fn read_states_daily(path: &Path) -> Result<Vec<RawStateDaily>> {
    read_csv(path, &["fips", "date", "state"], parse_state_daily)
}

/// Fails on the first table without rows.
pub fn ensure_not_empty(tables: &RawTables) -> Result<()> {
    let counts = [
        (JHU_TABLE, tables.jhu.len()),
        (NYT_COUNTY_TABLE, tables.nyt_county.len()),
        (HOSPITAL_BEDS_TABLE, tables.hospital_beds.len()),
        (STATES_DAILY_TABLE, tables.states_daily.len()),
    ];
    for (table, rows) in counts {
        if rows == 0 {
            return Err(Error::empty_input(table));
        }
    }
    Ok(())
}

pub fn source_file(path: &Path) -> Result<SourceFile> {
    let metadata = fs::metadata(path).map_err(|err| {
        Error::new(ErrorKind::Io, format!("could not open {}: {err}", path.display()))
    })?;
    let modified_ns = metadata
        .modified()
        .ok()
        .and_then(|time| time.duration_since(UNIX_EPOCH).ok())
        .and_then(|since| u64::try_from(since.as_nanos()).ok());
    Ok(SourceFile {
        path: path.display().to_string(),
        len: metadata.len(),
        modified_ns,
    })
}

/// Loads the tables cached by [`ExtractRawEtl`].
pub fn read_raw_tables(dir: &Path) -> Result<RawTables> {
    let path = dir.join(OUTPUT_FILE_NAME);
    let mut input_file = File::open(&path).map_err(|err| {
        Error::new(ErrorKind::Cache, format!("could not open {}: {err}", path.display()))
    })?;

    let mut buf_vec: Vec<u8> = Vec::new();
    input_file.read_to_end(&mut buf_vec)?;
    let mut bytes = AlignedVec::with_capacity(buf_vec.len());
    bytes.extend_from_slice(&buf_vec);

    // SAFETY: the cache is only ever written by `ExtractRawEtl::load` from a
    // `RawTables` value.
    let tables: RawTables = unsafe {
        rkyv::from_bytes_unchecked::<RawTables>(&bytes)
            .map_err(|err| Error::new(ErrorKind::Cache, format!("could not deserialize raw table cache: {err:?}")))?
    };
    Ok(tables)
}

impl ExtractRawEtl<'_> {
    fn input_path(&self, file_name: &str) -> PathBuf {
        Path::new(&self.config.data_path).join(file_name)
    }

    /// Input paths in `RawTables` field order.
    fn input_paths(&self) -> [PathBuf; 4] {
        let inputs = &self.config.inputs;
        [
            self.input_path(&inputs.jhu),
            self.input_path(&inputs.nyt_county),
            self.input_path(&inputs.hospital_beds),
            self.input_path(&inputs.states_daily),
        ]
    }

    fn current_sources(&self) -> Result<Vec<SourceFile>> {
        self.input_paths().iter().map(|path| source_file(path)).collect()
    }

    pub fn new(config: &UserConfig) -> ExtractRawEtl {
        ExtractRawEtl {
            config
        }
    }
}

impl Etl for ExtractRawEtl<'_> {
    type Input = RawTables;
    type Output = RawTables;

    fn etl_name(&self) -> &str {
        ETL_NAME
    }

    fn output_file_names(&self) -> &[&str] {
        &[OUTPUT_FILE_NAME]
    }

    fn is_cached(&self, dir: &Path) -> Result<bool> {
        if self.config.refresh_raw_cache {
            return Ok(false);
        }
        if !dir.join(OUTPUT_FILE_NAME).try_exists()? {
            return Ok(false);
        }
        // a missing input is reported by the extraction itself
        let Ok(current) = self.current_sources() else {
            return Ok(false);
        };
        let cached = read_raw_tables(dir)?;
        if cached.sources != current {
            warn!(etl_name = ETL_NAME; "Input files changed since the raw cache was written");
            return Ok(false);
        }
        Ok(true)
    }

    fn extract(&mut self, _dir: &Path) -> Result<Self::Input> {
        let sources = self.current_sources()?;
        let [jhu, nyt_county, hospital_beds, states_daily] = self.input_paths();
        Ok(RawTables {
            jhu: read_jhu(&jhu)?,
            nyt_county: read_nyt_county(&nyt_county)?,
            hospital_beds: read_hospital_beds(&hospital_beds)?,
            states_daily: read_states_daily(&states_daily)?,
            sources,
        })
    }

    fn transform(&mut self, input: Self::Input) -> Result<Self::Output> {
        ensure_not_empty(&input)?;
        info!(
            etl_name = ETL_NAME,
            jhu = input.jhu.len(),
            nyt_county = input.nyt_county.len(),
            hospital_beds = input.hospital_beds.len(),
            states_daily = input.states_daily.len();
            "Read raw tables"
        );
        Ok(input)
    }

    fn load(&mut self, dir: &Path, output: Self::Output) -> Result<()> {
        let mut output_file = File::create(dir.join(OUTPUT_FILE_NAME))?;
        let bytes = rkyv::to_bytes::<_, 256>(&output)
            .map_err(|err| Error::new(ErrorKind::Cache, format!("could not serialize raw tables: {err:?}")))?;
        output_file.write_all(&bytes)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;
    use crate::tests::test_config;

    fn write(dir: &Path, name: &str, contents: &str) -> PathBuf {
        let path = dir.join(name);
        fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn reads_jhu_with_nulls() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(
            dir.path(),
            "jhu.csv",
            "fips,admin2,province_state,country_region,last_update,latitude,longitude,confirmed\n\
             1001,Autauga,Alabama,US,2020-04-01,32.5,-86.6,10\n\
             ,,Grand Princess,US,2020-04-01,,,3\n",
        );
        let rows = read_jhu(&path).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].fips.as_deref(), Some("1001"));
        assert_eq!(rows[0].latitude, Some(32.5));
        assert_eq!(rows[1].fips, None);
        assert_eq!(rows[1].province_state.as_deref(), Some("Grand Princess"));
        assert_eq!(rows[1].longitude, None);
    }

    #[test]
    fn daily_headers_match_case_insensitively() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(
            dir.path(),
            "daily.csv",
            "date,state,positive,negative,hospitalizedCurrently,death,positiveIncrease,fips\n\
             20200401,AL,1077.0,6697,NaN,26,96,01\n",
        );
        let rows = read_states_daily(&path).unwrap();
        assert_eq!(rows.len(), 1);
        let row = &rows[0];
        assert_eq!(row.date, Some(20200401));
        assert_eq!(row.positive, Some(1077));
        assert_eq!(row.positiveincrease, Some(96));
        assert_eq!(row.hospitalizedcurrently, None);
        // column absent altogether
        assert_eq!(row.recovered, None);
        assert_eq!(row.fips.as_deref(), Some("01"));
    }

    #[test]
    fn unparsable_counter_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(dir.path(), "daily.csv", "date,state,fips,positive\n20200401,AL,1,lots\n");
        let err = read_states_daily(&path).unwrap_err();
        assert_eq!(err.kind, ErrorKind::MalformedValue);
        assert!(err.message.contains("line 2"));
    }

    #[test]
    fn null_markers_read_as_missing() {
        let dir = tempfile::tempdir().unwrap();
        for marker in NULL_MARKERS.iter().chain(["", "NaN", "nan"].iter()) {
            let path = write(
                dir.path(),
                "beds.csv",
                &format!(
                    "fips,state_name,county_name,latitude,longtitude,hospital_name\n\
                     \"{marker}\",Alabama,\"{marker}\",\"{marker}\",\"{marker}\",General\n"
                ),
            );
            let rows = read_hospital_beds(&path).unwrap();
            assert_eq!(rows[0].fips, None, "{marker:?}");
            assert_eq!(rows[0].county_name, None, "{marker:?}");
            assert_eq!(rows[0].latitude, None, "{marker:?}");
            assert_eq!(rows[0].longitude, None, "{marker:?}");
            assert_eq!(rows[0].state_name.as_deref(), Some("Alabama"));
        }
    }

    #[test]
    fn null_markers_in_counters() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(
            dir.path(),
            "daily.csv",
            "fips,date,state,positive,death,recovered\n1,20200401,AL,NULL,N/A,<NA>\n",
        );
        let rows = read_states_daily(&path).unwrap();
        assert_eq!(rows[0].positive, None);
        assert_eq!(rows[0].death, None);
        assert_eq!(rows[0].recovered, None);
    }

    #[test]
    fn null_markers_in_geojson_properties() {
        let dir = tempfile::tempdir().unwrap();
        for marker in NULL_MARKERS {
            let feature = serde_json::json!({
                "type": "FeatureCollection",
                "features": [{
                    "type": "Feature",
                    "geometry": null,
                    "properties": {
                        "fips": marker,
                        "state_name": "Ohio",
                        "latitude": marker,
                        "longtitude": marker,
                    }
                }]
            });
            let path = write(dir.path(), "beds.geojson", &feature.to_string());
            let rows = read_hospital_beds(&path).unwrap();
            assert_eq!(rows[0].fips, None, "{marker:?}");
            assert_eq!(rows[0].latitude, None, "{marker:?}");
            assert_eq!(rows[0].longitude, None, "{marker:?}");
        }
    }

    #[test]
    fn missing_required_column() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(dir.path(), "county.csv", "date,county,state\n2020-04-01,Autauga,Alabama\n");
        let err = read_nyt_county(&path).unwrap_err();
        assert_eq!(err.kind, ErrorKind::MissingColumn);
    }

    #[test]
    fn hospital_csv_accepts_source_spelling_of_longitude() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(
            dir.path(),
            "beds.csv",
            "fips,state_name,county_name,latitude,longtitude,hospital_name,hq_zip_code\n\
             36061,New York,New York,40.7,-73.9,Bellevue,10016\n",
        );
        let rows = read_hospital_beds(&path).unwrap();
        assert_eq!(rows[0].longitude, Some(-73.9));
        assert_eq!(rows[0].hq_zip_code.as_deref(), Some("10016"));
    }

    #[test]
    fn reads_hospital_geojson() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(
            dir.path(),
            "beds.geojson",
            r#"{
                "type": "FeatureCollection",
                "features": [
                    {
                        "type": "Feature",
                        "geometry": {"type": "Point", "coordinates": [-71.06, 42.36]},
                        "properties": {
                            "fips": 25025,
                            "state_name": "Massachusetts",
                            "county_name": "Suffolk",
                            "hospital_name": "General",
                            "hq_zip_code": 2114,
                            "hospital_type": "Short Term Acute Care Hospital"
                        }
                    },
                    {
                        "type": "Feature",
                        "geometry": null,
                        "properties": {"fips": "", "state_name": "Ohio", "latitude": 40.0, "longtitude": -83.0}
                    }
                ]
            }"#,
        );
        let rows = read_hospital_beds(&path).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].fips.as_deref(), Some("25025"));
        assert_eq!(rows[0].hq_zip_code.as_deref(), Some("2114"));
        assert_eq!(rows[0].latitude, Some(42.36));
        assert_eq!(rows[0].longitude, Some(-71.06));
        assert_eq!(rows[1].fips, None);
        assert_eq!(rows[1].latitude, Some(40.0));
        assert_eq!(rows[1].longitude, Some(-83.0));
    }

    #[test]
    fn empty_table_is_fatal() {
        let tables = RawTables {
            jhu: vec![RawJhuRecord::default()],
            nyt_county: vec![RawNytCounty::default()],
            hospital_beds: Vec::new(),
            states_daily: vec![RawStateDaily::default()],
            sources: Vec::new(),
        };
        let err = ensure_not_empty(&tables).unwrap_err();
        assert_eq!(err.kind, ErrorKind::EmptyInput);
        assert!(err.message.contains(HOSPITAL_BEDS_TABLE));
    }

    #[test]
    fn caches_raw_tables_between_runs() {
        let data = tempfile::tempdir().unwrap();
        let work = tempfile::tempdir().unwrap();
        write(data.path(), "enigma_jhu.csv", "fips,province_state,country_region,latitude,longitude\n1001,Alabama,US,32.5,-86.6\n");
        write(data.path(), "nytimes_data_us_county.csv", "fips,county\n1001,Autauga\n");
        write(data.path(), "rearc_usa_hospital_beds.csv", "fips,state_name\n1001,Alabama\n");
        write(data.path(), "rearc_testing_states_daily.csv", "fips,date,state,positive\n1,20200401,AL,5\n");

        let mut config = test_config(data.path(), work.path());
        let mut etl = ExtractRawEtl::new(&config);
        etl.process(work.path()).unwrap();
        let cached = read_raw_tables(work.path()).unwrap();
        assert_eq!(cached.jhu[0].fips.as_deref(), Some("1001"));
        assert_eq!(cached.states_daily[0].positive, Some(5));

        assert_eq!(cached.sources.len(), 4);
        assert!(ExtractRawEtl::new(&config).is_cached(work.path()).unwrap());

        config.refresh_raw_cache = true;
        assert!(!ExtractRawEtl::new(&config).is_cached(work.path()).unwrap());
    }

    #[test]
    fn changed_inputs_invalidate_the_cache() {
        let data = tempfile::tempdir().unwrap();
        let work = tempfile::tempdir().unwrap();
        write(data.path(), "enigma_jhu.csv", "fips,province_state,country_region,latitude,longitude\n1001,Alabama,US,32.5,-86.6\n");
        write(data.path(), "jhu_v2.csv", "fips,province_state,country_region,latitude,longitude\n1003,Alabama,US,30.7,-87.7\n");
        write(data.path(), "nytimes_data_us_county.csv", "fips,county\n1001,Autauga\n");
        write(data.path(), "rearc_usa_hospital_beds.csv", "fips,state_name\n1001,Alabama\n");
        write(data.path(), "rearc_testing_states_daily.csv", "fips,date,state,positive\n1,20200401,AL,5\n");

        let mut config = test_config(data.path(), work.path());
        ExtractRawEtl::new(&config).process(work.path()).unwrap();
        assert!(ExtractRawEtl::new(&config).is_cached(work.path()).unwrap());

        // another file name
        config.inputs.jhu = "jhu_v2.csv".to_string();
        assert!(!ExtractRawEtl::new(&config).is_cached(work.path()).unwrap());
        ExtractRawEtl::new(&config).process(work.path()).unwrap();
        assert_eq!(read_raw_tables(work.path()).unwrap().jhu[0].fips.as_deref(), Some("1003"));
        assert!(ExtractRawEtl::new(&config).is_cached(work.path()).unwrap());

        // same file, new contents
        write(data.path(), "rearc_testing_states_daily.csv", "fips,date,state,positive\n1,20200401,AL,5\n1,20200402,AL,9\n");
        assert!(!ExtractRawEtl::new(&config).is_cached(work.path()).unwrap());

        // another data directory
        let moved = tempfile::tempdir().unwrap();
        let config = test_config(moved.path(), work.path());
        assert!(!ExtractRawEtl::new(&config).is_cached(work.path()).unwrap());
    }
}
