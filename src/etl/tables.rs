//! CSV reading and writing of materialized tables.

use std::path::{Path, PathBuf};

use serde::{de::DeserializeOwned, Serialize};

use crate::errors::Result;

pub fn table_file_name(table: &str) -> String {
    format!("{table}.csv")
}

pub fn table_path(dir: &Path, table: &str) -> PathBuf {
    dir.join(table_file_name(table))
}

/// Writes `rows` to `<dir>/<table>.csv`. The header comes from `columns` so that
/// empty tables still carry one.
pub fn write_table<T: Serialize>(dir: &Path, table: &str, columns: &[&str], rows: &[T]) -> Result<PathBuf> {
    let path = table_path(dir, table);
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_path(&path)?;
    writer.write_record(columns)?;
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush()?;
    Ok(path)
}

pub fn read_table<T: DeserializeOwned>(dir: &Path, table: &str) -> Result<Vec<T>> {
    let mut reader = csv::Reader::from_path(table_path(dir, table))?;
    let mut rows = Vec::new();
    for row in reader.deserialize() {
        rows.push(row?);
    }
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Serialize, Deserialize, Debug, PartialEq)]
    struct Row {
        id: i64,
        name: Option<String>,
        value: f64,
    }

    #[test]
    fn writes_header_and_reads_rows_back() {
        let dir = tempfile::tempdir().unwrap();
        let rows = vec![
            Row { id: 1, name: Some("a, b".to_string()), value: 1.5 },
            Row { id: 2, name: None, value: -3.25 },
        ];
        write_table(dir.path(), "things", &["id", "name", "value"], &rows).unwrap();

        let text = std::fs::read_to_string(dir.path().join("things.csv")).unwrap();
        assert_eq!(text.lines().next(), Some("id,name,value"));
        assert_eq!(text.lines().nth(1), Some("1,\"a, b\",1.5"));
        assert_eq!(text.lines().nth(2), Some("2,,-3.25"));

        let back: Vec<Row> = read_table(dir.path(), "things").unwrap();
        assert_eq!(back, rows);
    }

    #[test]
    fn empty_table_keeps_header() {
        let dir = tempfile::tempdir().unwrap();
        write_table::<Row>(dir.path(), "empty", &["id", "name", "value"], &[]).unwrap();
        let text = std::fs::read_to_string(dir.path().join("empty.csv")).unwrap();
        assert_eq!(text, "id,name,value\n");
        let back: Vec<Row> = read_table(dir.path(), "empty").unwrap();
        assert!(back.is_empty());
    }
}
