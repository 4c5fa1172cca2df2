//! In-memory table loaded from a comma-separated export.
//!
//! The first row names the columns. Every other row is kept verbatim as a
//! [`csv::StringRecord`], so columns the pipelines never look at pass
//! through to the cleaned output unchanged.

use crate::error::{DedupError, OptionExt, Result};
use csv::{ReaderBuilder, StringRecord, WriterBuilder};
use std::collections::HashSet;
use std::io::{Read, Write};
use std::path::Path;
use tracing::{debug, info};

/// Cell values treated as "not available", matching the defaults of common
/// dataframe loaders. Comparison is exact.
pub const NA_VALUES: &[&str] = &[
    "", "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN",
    "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

/// Returns true when a raw cell value counts as absent.
pub fn is_absent(value: &str) -> bool {
    NA_VALUES.contains(&value)
}

/// A resolved column: header name plus position in each record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Column {
    name: String,
    index: usize,
}

impl Column {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn index(&self) -> usize {
        self.index
    }
}

/// Ordered rows sharing one header. Row indices are file order, starting at 0.
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    headers: StringRecord,
    rows: Vec<StringRecord>,
}

impl Table {
    /// Load a table from a CSV file.
    ///
    /// Fails with [`DedupError::InputNotFound`] when the path does not exist.
    /// Short rows are padded with absent cells; a row with more fields than
    /// the header is a [`DedupError::MalformedRow`].
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(DedupError::InputNotFound(path.to_path_buf()));
        }

        let reader = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_path(path)?;
        let table = Self::from_csv_reader(reader)?;

        info!(
            path = %path.display(),
            records = table.len(),
            columns = table.headers.len(),
            "Loaded table"
        );
        Ok(table)
    }

    /// Parse a table from any reader (header row first).
    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        let reader = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(reader);
        Self::from_csv_reader(reader)
    }

    fn from_csv_reader<R: Read>(mut reader: csv::Reader<R>) -> Result<Self> {
        let headers = reader.headers()?.clone();
        let width = headers.len();

        let mut rows = Vec::new();
        for record in reader.records() {
            let mut record = record?;
            if record.len() > width {
                return Err(DedupError::MalformedRow {
                    line: record.position().map_or(0, |p| p.line()),
                    expected: width,
                    found: record.len(),
                });
            }
            // missing trailing cells are absent
            while record.len() < width {
                record.push_field("");
            }
            rows.push(record);
        }
        Ok(Self { headers, rows })
    }

    /// Header names in file order.
    pub fn column_names(&self) -> Vec<&str> {
        self.headers.iter().collect()
    }

    /// Resolve a column by exact header name.
    pub fn column(&self, name: &str) -> Result<Column> {
        let index = self
            .headers
            .iter()
            .position(|h| h.trim_start_matches('\u{feff}') == name)
            .ok_or_missing_column(name)?;
        debug!(column = name, index, "Resolved column");
        Ok(Column {
            name: name.to_string(),
            index,
        })
    }

    /// Cell value, or `None` when the value is absent.
    pub fn cell(&self, row: usize, column: &Column) -> Option<&str> {
        self.rows
            .get(row)
            .and_then(|r| r.get(column.index))
            .filter(|v| !is_absent(v))
    }

    /// All values of a column in row order.
    pub fn values<'a>(&'a self, column: &'a Column) -> impl Iterator<Item = Option<&'a str>> + 'a {
        (0..self.rows.len()).map(move |row| self.cell(row, column))
    }

    /// Number of rows whose value in `column` is present.
    pub fn count_present(&self, column: &Column) -> usize {
        self.values(column).filter(Option::is_some).count()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Build a new table without the given row indices. Survivors keep
    /// their relative order and every column.
    pub fn without_rows(&self, drop: &[usize]) -> Self {
        let drop: HashSet<usize> = drop.iter().copied().collect();
        let rows = self
            .rows
            .iter()
            .enumerate()
            .filter(|(idx, _)| !drop.contains(idx))
            .map(|(_, row)| row.clone())
            .collect();
        Self {
            headers: self.headers.clone(),
            rows,
        }
    }

    /// Write header and rows as comma-separated text.
    pub fn to_writer<W: Write>(&self, writer: W) -> Result<()> {
        let mut wtr = WriterBuilder::new().has_headers(false).from_writer(writer);
        wtr.write_record(&self.headers)?;
        for row in &self.rows {
            wtr.write_record(row)?;
        }
        wtr.flush()?;
        Ok(())
    }

    /// Write the table to a new CSV file, truncating any existing one.
    pub fn write_csv(&self, path: &Path) -> Result<()> {
        let file = std::fs::File::create(path)?;
        self.to_writer(file)?;
        info!(path = %path.display(), records = self.len(), "Saved table");
        Ok(())
    }
}
