use std::{collections::{HashMap, HashSet}, path::Path};

use log::info;

use crate::{
    data::{
        raw::{RawJhuRecord, RawNytCounty},
        warehouse::DimRegion,
    },
    errors::{Error, Result},
};

use super::{extract_raw, keys, tables, Etl};

pub const ETL_NAME: &str = "dim_region";
pub const TABLE_NAME: &str = "dim_region";
pub const OUTPUT_FILE_NAME: &str = "dim_region.csv";
pub const COLUMNS: &[&str] = &[
    "region_sk",
    "fips",
    "state_fips",
    "county_fips",
    "province_state",
    "county",
    "country_region",
    "latitude",
    "longitude",
];

/// Cruise ship cases are reported as if it were a state.
const EXCLUDED_PROVINCE: &str = "Grand Princess";

/// A case report row joined to its county name, before key normalization.
struct JoinedRegion<'a> {
    fips: &'a str,
    province_state: Option<&'a str>,
    country_region: Option<&'a str>,
    latitude: f64,
    longitude: f64,
    county: Option<&'a str>,
}

impl<'a> JoinedRegion<'a> {
    /// Identity for duplicate removal; coordinates compare by bit pattern.
    fn identity(&self) -> (&'a str, Option<&'a str>, Option<&'a str>, u64, u64, Option<&'a str>) {
        (
            self.fips,
            self.province_state,
            self.country_region,
            self.latitude.to_bits(),
            self.longitude.to_bits(),
            self.county,
        )
    }
}

/// Builds the region dimension from the case reports and the county reference.
///
/// Rows are joined on the fips code exactly as the sources spell it, the
/// surviving distinct rows get 5-digit codes and are numbered 1..N in
/// (state_fips, county_fips) order.
pub fn build_dim_region(jhu: &[RawJhuRecord], nyt_county: &[RawNytCounty]) -> Result<Vec<DimRegion>> {
    if jhu.is_empty() {
        return Err(Error::empty_input(extract_raw::JHU_TABLE));
    }
    if nyt_county.is_empty() {
        return Err(Error::empty_input(extract_raw::NYT_COUNTY_TABLE));
    }

    // The county table is a time series, so collapse it to distinct names per
    // code first. First-seen order is kept.
    let mut counties: HashMap<&str, Vec<Option<&str>>> = HashMap::new();
    for row in nyt_county {
        if let Some(fips) = row.fips.as_deref() {
            let names = counties.entry(fips).or_default();
            let county = row.county.as_deref();
            if !names.contains(&county) {
                names.push(county);
            }
        }
    }

    let mut seen = HashSet::new();
    let mut joined: Vec<JoinedRegion> = Vec::new();
    for record in jhu {
        if record.province_state.as_deref() == Some(EXCLUDED_PROVINCE) {
            continue;
        }
        let (Some(fips), Some(latitude), Some(longitude)) =
            (record.fips.as_deref(), record.latitude, record.longitude)
        else {
            continue;
        };
        let Some(names) = counties.get(fips) else {
            continue;
        };
        for county in names {
            let row = JoinedRegion {
                fips,
                province_state: record.province_state.as_deref(),
                country_region: record.country_region.as_deref(),
                latitude,
                longitude,
                county: *county,
            };
            if seen.insert(row.identity()) {
                joined.push(row);
            }
        }
    }

    let mut regions = Vec::with_capacity(joined.len());
    for row in joined {
        let fips = keys::normalize_fips(row.fips, 5)?;
        let (state_fips, county_fips) = keys::split_county_fips(&fips);
        regions.push(DimRegion {
            region_sk: 0,
            state_fips: keys::remap_territory_state(state_fips),
            county_fips,
            fips,
            province_state: row.province_state.map(str::to_string),
            county: row.county.map(str::to_string),
            country_region: row.country_region.map(str::to_string),
            latitude: row.latitude,
            longitude: row.longitude,
        });
    }

    regions.sort_by(|a, b| (&a.state_fips, &a.county_fips).cmp(&(&b.state_fips, &b.county_fips)));
    for (idx, region) in regions.iter_mut().enumerate() {
        region.region_sk = idx as i64 + 1;
    }

    info!(etl_name = ETL_NAME, rows = regions.len(); "Built region dimension");
    Ok(regions)
}

pub struct DimRegionEtl {
}

impl DimRegionEtl {
    pub fn new() -> DimRegionEtl {
        DimRegionEtl {}
    }
}

impl Etl for DimRegionEtl {
    type Input = (Vec<RawJhuRecord>, Vec<RawNytCounty>);
    type Output = Vec<DimRegion>;

    fn etl_name(&self) -> &str {
        ETL_NAME
    }

    fn output_file_names(&self) -> &[&str] {
        &[OUTPUT_FILE_NAME]
    }

    fn extract(&mut self, dir: &Path) -> Result<Self::Input> {
        let raw = extract_raw::read_raw_tables(dir)?;
        Ok((raw.jhu, raw.nyt_county))
    }

    fn transform(&mut self, input: Self::Input) -> Result<Self::Output> {
        let (jhu, nyt_county) = input;
        build_dim_region(&jhu, &nyt_county)
    }

    fn load(&mut self, dir: &Path, output: Self::Output) -> Result<()> {
        tables::write_table(dir, TABLE_NAME, COLUMNS, &output)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ErrorKind;

    pub fn jhu(fips: Option<&str>, province_state: &str, latitude: Option<f64>, longitude: Option<f64>) -> RawJhuRecord {
        RawJhuRecord {
            fips: fips.map(str::to_string),
            province_state: Some(province_state.to_string()),
            country_region: Some("US".to_string()),
            latitude,
            longitude,
        }
    }

    pub fn county(fips: &str, name: &str) -> RawNytCounty {
        RawNytCounty {
            fips: Some(fips.to_string()),
            county: Some(name.to_string()),
        }
    }

    #[test]
    fn joins_normalizes_and_numbers_regions() {
        let jhu_rows = vec![
            jhu(Some("6037"), "California", Some(34.3), Some(-118.2)),
            jhu(Some("1001"), "Alabama", Some(32.5), Some(-86.6)),
            jhu(Some("1003"), "Alabama", Some(30.7), Some(-87.7)),
        ];
        let nyt_rows = vec![
            county("1003", "Baldwin"),
            county("6037", "Los Angeles"),
            county("1001", "Autauga"),
        ];

        let regions = build_dim_region(&jhu_rows, &nyt_rows).unwrap();
        let fips: Vec<&str> = regions.iter().map(|r| r.fips.as_str()).collect();
        assert_eq!(fips, vec!["01001", "01003", "06037"]);
        let keys: Vec<i64> = regions.iter().map(|r| r.region_sk).collect();
        assert_eq!(keys, vec![1, 2, 3]);
        assert_eq!(regions[2].county.as_deref(), Some("Los Angeles"));
        assert_eq!(regions[2].country_region.as_deref(), Some("US"));

        for region in &regions {
            assert_eq!(region.fips.len(), 5);
            assert_eq!(region.state_fips, &region.fips[..2]);
            assert_eq!(region.county_fips, &region.fips[2..]);
        }
    }

    #[test]
    fn excludes_grand_princess() {
        let jhu_rows = vec![
            jhu(Some("99999"), "Grand Princess", Some(37.6), Some(-122.6)),
            jhu(Some("1001"), "Alabama", Some(32.5), Some(-86.6)),
        ];
        let nyt_rows = vec![county("99999", "Ship"), county("1001", "Autauga")];

        let regions = build_dim_region(&jhu_rows, &nyt_rows).unwrap();
        assert_eq!(regions.len(), 1);
        assert_eq!(regions[0].province_state.as_deref(), Some("Alabama"));
    }

    #[test]
    fn drops_rows_without_fips_or_coordinates() {
        let jhu_rows = vec![
            jhu(None, "Alabama", Some(32.5), Some(-86.6)),
            jhu(Some("1001"), "Alabama", None, Some(-86.6)),
            jhu(Some("1003"), "Alabama", Some(30.7), None),
            jhu(Some("1005"), "Alabama", Some(31.8), Some(-85.4)),
        ];
        let nyt_rows = vec![county("1001", "Autauga"), county("1003", "Baldwin"), county("1005", "Barbour")];

        let regions = build_dim_region(&jhu_rows, &nyt_rows).unwrap();
        assert_eq!(regions.len(), 1);
        assert_eq!(regions[0].fips, "01005");
    }

    #[test]
    fn join_uses_fips_as_spelled() {
        // "01001" and "1001" only meet after normalization, which happens later
        let jhu_rows = vec![jhu(Some("01001"), "Alabama", Some(32.5), Some(-86.6))];
        let nyt_rows = vec![county("1001", "Autauga")];

        let regions = build_dim_region(&jhu_rows, &nyt_rows).unwrap();
        assert!(regions.is_empty());
    }

    #[test]
    fn removes_duplicates_from_time_series() {
        let jhu_rows = vec![
            jhu(Some("1001"), "Alabama", Some(32.5), Some(-86.6)),
            jhu(Some("1001"), "Alabama", Some(32.5), Some(-86.6)),
            jhu(Some("1001"), "Alabama", Some(32.5), Some(-86.6)),
        ];
        let nyt_rows = vec![county("1001", "Autauga"), county("1001", "Autauga")];

        let regions = build_dim_region(&jhu_rows, &nyt_rows).unwrap();
        assert_eq!(regions.len(), 1);
        assert_eq!(regions[0].region_sk, 1);
    }

    #[test]
    fn remaps_unassigned_state_code() {
        let jhu_rows = vec![
            jhu(Some("127"), "Puerto Rico", Some(18.2), Some(-66.5)),
            jhu(Some("72001"), "Puerto Rico", Some(18.1), Some(-66.7)),
            jhu(Some("56045"), "Wyoming", Some(43.8), Some(-104.5)),
        ];
        let nyt_rows = vec![county("127", "Unassigned"), county("72001", "Adjuntas"), county("56045", "Weston")];

        let regions = build_dim_region(&jhu_rows, &nyt_rows).unwrap();
        let states: Vec<(&str, &str, i64)> = regions
            .iter()
            .map(|r| (r.fips.as_str(), r.state_fips.as_str(), r.region_sk))
            .collect();
        assert_eq!(states, vec![("56045", "56", 1), ("72001", "72", 2), ("00127", "72", 3)]);
    }

    #[test]
    fn malformed_fips_fails_the_build() {
        let jhu_rows = vec![jhu(Some("10O1"), "Alabama", Some(32.5), Some(-86.6))];
        let nyt_rows = vec![county("10O1", "Autauga")];

        let err = build_dim_region(&jhu_rows, &nyt_rows).unwrap_err();
        assert_eq!(err.kind, ErrorKind::MalformedKey);
    }

    #[test]
    fn negative_fips_is_not_filed_under_a_territory() {
        let jhu_rows = vec![
            jhu(Some("1001"), "Alabama", Some(32.5), Some(-86.6)),
            jhu(Some("-5"), "Nowhere", Some(0.0), Some(0.0)),
        ];
        let nyt_rows = vec![county("1001", "Autauga"), county("-5", "Nowhere")];

        let err = build_dim_region(&jhu_rows, &nyt_rows).unwrap_err();
        assert_eq!(err.kind, ErrorKind::MalformedKey);
        assert!(err.message.contains("-5"));
    }

    #[test]
    fn empty_sources_are_fatal() {
        let err = build_dim_region(&[], &[county("1001", "Autauga")]).unwrap_err();
        assert_eq!(err.kind, ErrorKind::EmptyInput);
    }

    #[test]
    fn rebuilding_is_deterministic() {
        let jhu_rows = vec![
            jhu(Some("1003"), "Alabama", Some(30.7), Some(-87.7)),
            jhu(Some("1001"), "Alabama", Some(32.5), Some(-86.6)),
        ];
        let nyt_rows = vec![county("1001", "Autauga"), county("1003", "Baldwin")];

        let first = build_dim_region(&jhu_rows, &nyt_rows).unwrap();
        let second = build_dim_region(&jhu_rows, &nyt_rows).unwrap();
        assert_eq!(first, second);
    }
}
