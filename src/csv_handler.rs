use crate::error::{CrateError, Result};
use serde_json::{Map, Value};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Column names the cleaner reads and writes.
#[derive(Debug, Clone)]
pub struct ColumnConfig {
    pub family: String,
    pub species: String,
    pub genus: String,
}

impl Default for ColumnConfig {
    fn default() -> Self {
        Self {
            family: "CORAL_FAMILY".to_string(),
            species: "CORAL_SPECIES".to_string(),
            genus: "CORAL_GENUS".to_string(),
        }
    }
}

/// A whole survey sheet: header plus positional rows.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Table {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl Table {
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    pub fn require_column(&self, name: &str) -> Result<usize> {
        self.column_index(name)
            .ok_or_else(|| CrateError::MissingHeader(name.to_string()))
    }

    /// Inserts an empty column at `at` in the header and every row.
    pub fn insert_column(&mut self, at: usize, name: &str) {
        self.headers.insert(at, name.to_string());
        for row in &mut self.rows {
            let at = at.min(row.len());
            row.insert(at, String::new());
        }
    }

    /// Sorts rows by the integer value of their first column.
    pub fn sort_by_id(&mut self) -> Result<()> {
        let mut keyed = Vec::with_capacity(self.rows.len());
        for (i, row) in self.rows.drain(..).enumerate() {
            let raw = row.first().map(|v| v.trim()).unwrap_or("");
            let id: i64 = raw.parse().map_err(|_| CrateError::InvalidRowId {
                row: i + 2,
                value: raw.to_string(),
            })?;
            keyed.push((id, row));
        }
        keyed.sort_by_key(|(id, _)| *id);
        self.rows = keyed.into_iter().map(|(_, row)| row).collect();
        Ok(())
    }
}

// Loads the survey CSV. Rows whose field count differs from the header are rejected.
pub fn read_table(file_path: &Path) -> Result<Table> {
    let mut reader = csv::Reader::from_path(file_path)?;
    let mut headers: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();
    if let Some(first) = headers.first_mut() {
        if let Some(stripped) = first.strip_prefix('\u{feff}') {
            *first = stripped.to_string();
        }
    }

    let mut rows = Vec::new();
    for result in reader.records() {
        let record = result?;
        rows.push(record.iter().map(str::to_string).collect());
    }

    Ok(Table { headers, rows })
}

pub fn write_table(file_path: &Path, table: &Table) -> Result<()> {
    let mut writer = csv::Writer::from_path(file_path)?;
    writer.write_record(&table.headers)?;
    for row in &table.rows {
        writer.write_record(row)?;
    }
    writer.flush()?;
    Ok(())
}

/// Writes the table as a JSON array of objects keyed by header, in column order.
pub fn write_table_json(file_path: &Path, table: &Table) -> Result<()> {
    let records: Vec<Value> = table
        .rows
        .iter()
        .map(|row| {
            let object: Map<String, Value> = table
                .headers
                .iter()
                .zip(row)
                .map(|(header, value)| (header.clone(), Value::String(value.clone())))
                .collect();
            Value::Object(object)
        })
        .collect();

    let mut writer = BufWriter::new(File::create(file_path)?);
    serde_json::to_writer_pretty(&mut writer, &records).map_err(CrateError::JsonWriteError)?;
    writer.write_all(b"\n")?;
    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn create_test_csv(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "{}", content).unwrap();
        file
    }

    #[test]
    fn test_read_table() {
        let content = "REEF_ID,CORAL_FAMILY,CORAL_SPECIES\n2,Acroporidae,\"Acropora sp., Porites\"\n1,,Pocillopora damicornis";
        let file = create_test_csv(content);
        let table = read_table(file.path()).unwrap();
        assert_eq!(table.headers, vec!["REEF_ID", "CORAL_FAMILY", "CORAL_SPECIES"]);
        assert_eq!(table.rows.len(), 2);
        assert_eq!(table.rows[0][2], "Acropora sp., Porites");
        assert_eq!(table.rows[1][1], "");
    }

    #[test]
    fn test_byte_order_mark_stripped() {
        let content = "\u{feff}REEF_ID,CORAL_FAMILY,CORAL_SPECIES\n1,Faviidae,Favia";
        let file = create_test_csv(content);
        let table = read_table(file.path()).unwrap();
        assert_eq!(table.column_index("REEF_ID"), Some(0));
    }

    #[test]
    fn test_missing_header() {
        let file = create_test_csv("REEF_ID,CORAL_FAMILY\n1,Faviidae");
        let table = read_table(file.path()).unwrap();
        let result = table.require_column("CORAL_SPECIES");
        assert!(matches!(result, Err(CrateError::MissingHeader(h)) if h == "CORAL_SPECIES"));
    }

    #[test]
    fn test_malformed_csv() {
        let content = "REEF_ID,CORAL_FAMILY,CORAL_SPECIES\n1,Faviidae"; // Missing species field
        let file = create_test_csv(content);
        let result = read_table(file.path());
        assert!(matches!(result, Err(CrateError::CsvError(_))));
    }

    #[test]
    fn test_insert_column() {
        let mut table = Table {
            headers: vec!["ID".into(), "CORAL_SPECIES".into()],
            rows: vec![vec!["1".into(), "Favia".into()]],
        };
        table.insert_column(1, "CORAL_GENUS");
        assert_eq!(table.headers, vec!["ID", "CORAL_GENUS", "CORAL_SPECIES"]);
        assert_eq!(table.rows[0], vec!["1", "", "Favia"]);
    }

    #[test]
    fn test_sort_by_id() {
        let mut table = Table {
            headers: vec!["ID".into()],
            rows: vec![vec!["10".into()], vec![" 2".into()], vec!["1".into()]],
        };
        table.sort_by_id().unwrap();
        let ids: Vec<&str> = table.rows.iter().map(|r| r[0].as_str()).collect();
        assert_eq!(ids, vec!["1", " 2", "10"]);
    }

    #[test]
    fn test_sort_by_id_rejects_non_integer() {
        let mut table = Table {
            headers: vec!["ID".into()],
            rows: vec![vec!["1".into()], vec!["reef-a".into()]],
        };
        let result = table.sort_by_id();
        assert!(
            matches!(result, Err(CrateError::InvalidRowId { row, value }) if row == 3 && value == "reef-a")
        );
    }

    #[test]
    fn test_write_quotes_multi_value_cells() {
        let table = Table {
            headers: vec!["ID".into(), "CORAL_FAMILY".into()],
            rows: vec![vec!["1".into(), "Acroporidae, Poritidae".into()]],
        };
        let file = NamedTempFile::new().unwrap();
        write_table(file.path(), &table).unwrap();
        let written = fs::read_to_string(file.path()).unwrap();
        assert_eq!(written, "ID,CORAL_FAMILY\n1,\"Acroporidae, Poritidae\"\n");
    }

    #[test]
    fn test_write_json_keeps_column_order() {
        let table = Table {
            headers: vec!["ID".into(), "CORAL_GENUS".into(), "CORAL_SPECIES".into()],
            rows: vec![vec!["1".into(), "Pocillopora".into(), "Pocillopora damicornis".into()]],
        };
        let file = NamedTempFile::new().unwrap();
        write_table_json(file.path(), &table).unwrap();
        let written = fs::read_to_string(file.path()).unwrap();
        let id = written.find("\"ID\"").unwrap();
        let genus = written.find("\"CORAL_GENUS\"").unwrap();
        let species = written.find("\"CORAL_SPECIES\"").unwrap();
        assert!(id < genus && genus < species);

        let parsed: Value = serde_json::from_str(&written).unwrap();
        assert_eq!(parsed[0]["CORAL_GENUS"], "Pocillopora");
    }
}
