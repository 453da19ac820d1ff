//! Drafts `CREATE TABLE` statements from the materialized tables by looking at
//! the values each column holds. The result is meant for review; the warehouse
//! itself is created from the hand-written DDL in [`super::warehouse_script`].

use std::{fmt, fs, path::Path};

use log::info;
use regex::Regex;

use crate::errors::Result;

use super::{dim_date, dim_hospital, dim_region, fact_covid, tables, Etl};

pub const ETL_NAME: &str = "schema_draft";
pub const OUTPUT_FILE_NAME: &str = "schema_draft.sql";

/// Tables drafted, in the order the statements are written.
pub const DRAFTED_TABLES: &[&str] = &[
    fact_covid::TABLE_NAME,
    dim_date::TABLE_NAME,
    dim_hospital::TABLE_NAME,
    dim_region::TABLE_NAME,
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SqlType {
    Integer,
    Real,
    Boolean,
    Date,
    Text,
}

impl fmt::Display for SqlType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SqlType::Integer => "INTEGER",
            SqlType::Real => "REAL",
            SqlType::Boolean => "BOOLEAN",
            SqlType::Date => "DATE",
            SqlType::Text => "TEXT",
        };
        f.write_str(name)
    }
}

/// A table as written to disk: column names and untyped cells.
#[derive(Debug, Clone, PartialEq)]
pub struct MaterializedTable {
    pub name: String,
    pub columns: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ColumnSchema {
    pub name: String,
    pub sql_type: SqlType,
}

pub fn read_materialized(dir: &Path, table: &str) -> Result<MaterializedTable> {
    let mut reader = csv::Reader::from_path(tables::table_path(dir, table))?;
    let columns = reader.headers()?.iter().map(str::to_string).collect();
    let mut rows = Vec::new();
    for record in reader.records() {
        rows.push(record?.iter().map(str::to_string).collect());
    }
    Ok(MaterializedTable {
        name: table.to_string(),
        columns,
        rows,
    })
}

pub struct TypeInference {
    integer: Regex,
    real: Regex,
    date: Regex,
}

impl TypeInference {
    pub fn new() -> Result<Self> {
        Ok(TypeInference {
            integer: Regex::new(r"^[+-]?\d+$")?,
            real: Regex::new(r"^[+-]?(\d+\.?\d*|\.\d+)([eE][+-]?\d+)?$")?,
            date: Regex::new(r"^\d{4}-\d{2}-\d{2}$")?,
        })
    }

    fn value_type(&self, value: &str) -> SqlType {
        if self.integer.is_match(value) {
            SqlType::Integer
        } else if self.real.is_match(value) {
            SqlType::Real
        } else if value.eq_ignore_ascii_case("true") || value.eq_ignore_ascii_case("false") {
            SqlType::Boolean
        } else if self.date.is_match(value) {
            SqlType::Date
        } else {
            SqlType::Text
        }
    }

    /// Narrowest type holding every non-empty value of the column. Integers widen
    /// to REAL, any other disagreement falls back to TEXT.
    pub fn column_type<'a>(&self, values: impl Iterator<Item = &'a str>) -> SqlType {
        let mut inferred: Option<SqlType> = None;
        for value in values.filter(|v| !v.is_empty()) {
            let value_type = self.value_type(value);
            inferred = Some(match (inferred, value_type) {
                (None, t) => t,
                (Some(a), b) if a == b => a,
                (Some(SqlType::Integer), SqlType::Real) | (Some(SqlType::Real), SqlType::Integer) => SqlType::Real,
                _ => SqlType::Text,
            });
            if inferred == Some(SqlType::Text) {
                break;
            }
        }
        inferred.unwrap_or(SqlType::Text)
    }

    pub fn infer_schema(&self, table: &MaterializedTable) -> Vec<ColumnSchema> {
        table
            .columns
            .iter()
            .enumerate()
            .map(|(idx, name)| ColumnSchema {
                name: name.clone(),
                sql_type: self.column_type(table.rows.iter().filter_map(|row| row.get(idx).map(String::as_str))),
            })
            .collect()
    }
}

pub fn create_table_sql(table: &str, columns: &[ColumnSchema]) -> String {
    let definitions: Vec<String> = columns
        .iter()
        .map(|column| format!("    \"{}\" {}", column.name, column.sql_type))
        .collect();
    format!("CREATE TABLE \"{table}\" (\n{}\n);\n", definitions.join(",\n"))
}

pub struct SchemaDraftEtl {
}

impl SchemaDraftEtl {
    pub fn new() -> SchemaDraftEtl {
        SchemaDraftEtl {}
    }
}

impl Etl for SchemaDraftEtl {
    type Input = Vec<MaterializedTable>;
    type Output = Vec<String>;

    fn etl_name(&self) -> &str {
        ETL_NAME
    }

    fn output_file_names(&self) -> &[&str] {
        &[OUTPUT_FILE_NAME]
    }

    fn extract(&mut self, dir: &Path) -> Result<Self::Input> {
        DRAFTED_TABLES
            .iter()
            .map(|table| read_materialized(dir, table))
            .collect()
    }

    fn transform(&mut self, input: Self::Input) -> Result<Self::Output> {
        let inference = TypeInference::new()?;
        let statements = input
            .iter()
            .map(|table| create_table_sql(&table.name, &inference.infer_schema(table)))
            .collect::<Vec<_>>();
        info!(etl_name = ETL_NAME, tables = statements.len(); "Drafted table DDL");
        Ok(statements)
    }

    fn load(&mut self, dir: &Path, output: Self::Output) -> Result<()> {
        fs::write(dir.join(OUTPUT_FILE_NAME), output.join("\n"))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(columns: &[&str], rows: &[&[&str]]) -> MaterializedTable {
        MaterializedTable {
            name: "t".to_string(),
            columns: columns.iter().map(|c| c.to_string()).collect(),
            rows: rows
                .iter()
                .map(|row| row.iter().map(|v| v.to_string()).collect())
                .collect(),
        }
    }

    #[test]
    fn infers_column_types() {
        let inference = TypeInference::new().unwrap();
        let t = table(
            &["id", "lat", "name", "flag", "day", "mixed", "blank", "zip"],
            &[
                &["1", "32.5", "Autauga", "true", "2020-01-01", "1", "", "02114"],
                &["2", "-86", "Baldwin", "false", "2020-01-02", "x", "", "10016"],
                &["3", "", "", "", "", "2", "", "K1A"],
            ],
        );

        let types: Vec<SqlType> = inference.infer_schema(&t).iter().map(|c| c.sql_type).collect();
        assert_eq!(
            types,
            vec![
                SqlType::Integer,
                SqlType::Real,
                SqlType::Text,
                SqlType::Boolean,
                SqlType::Date,
                SqlType::Text,
                SqlType::Text,
                SqlType::Text,
            ]
        );
    }

    #[test]
    fn renders_create_table() {
        let columns = vec![
            ColumnSchema { name: "date_id".to_string(), sql_type: SqlType::Integer },
            ColumnSchema { name: "is_weekend".to_string(), sql_type: SqlType::Boolean },
        ];
        assert_eq!(
            create_table_sql("dim_date", &columns),
            "CREATE TABLE \"dim_date\" (\n    \"date_id\" INTEGER,\n    \"is_weekend\" BOOLEAN\n);\n"
        );
    }

    #[test]
    fn drafts_from_written_tables() {
        use chrono::NaiveDate;

        let dir = tempfile::tempdir().unwrap();
        let start = NaiveDate::from_ymd_opt(2020, 1, 1).unwrap();
        let dates = dim_date::build_dim_date(start, start).unwrap();
        tables::write_table(dir.path(), dim_date::TABLE_NAME, dim_date::COLUMNS, &dates).unwrap();

        let materialized = read_materialized(dir.path(), dim_date::TABLE_NAME).unwrap();
        let schema = TypeInference::new().unwrap().infer_schema(&materialized);
        let find = |name: &str| schema.iter().find(|c| c.name == name).unwrap().sql_type;
        assert_eq!(find("date_id"), SqlType::Integer);
        assert_eq!(find("date"), SqlType::Date);
        assert_eq!(find("day_name"), SqlType::Text);
        assert_eq!(find("is_weekend"), SqlType::Boolean);
    }
}
