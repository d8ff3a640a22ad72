//! In-memory CSV tables with normalized headers.

use std::io::Read;

use crate::LoadError;

/// How header names are cleaned up before lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeaderStyle {
    /// Trim surrounding whitespace and lowercase.
    Lowercase,
    /// Trim surrounding whitespace only.
    Trim,
}

/// Trims and lowercases a column name.
#[must_use]
pub fn normalize_column_name(name: &str) -> String {
    name.trim().to_lowercase()
}

/// A single data row with its position in the source.
#[derive(Debug, Clone)]
pub struct Row {
    /// Zero-based data row index (header excluded).
    pub index: usize,
    /// One-based line number in the file.
    pub line: u64,
    record: csv::StringRecord,
}

impl Row {
    /// Returns the trimmed value at `column`, or `""` if the row is short.
    #[must_use]
    pub fn get(&self, column: usize) -> &str {
        self.record.get(column).map_or("", str::trim)
    }
}

/// A fully-read CSV table.
#[derive(Debug, Clone)]
pub struct Table {
    file: String,
    headers: Vec<String>,
    rows: Vec<Row>,
}

impl Table {
    /// Reads every record from `reader`.
    ///
    /// Rows may have fewer or more fields than the header; missing fields
    /// read as empty.
    ///
    /// # Errors
    ///
    /// Returns [`LoadError::Csv`] on malformed CSV and
    /// [`LoadError::EmptyTable`] if there is no header row.
    pub fn read<R: Read>(reader: R, file: &str, style: HeaderStyle) -> Result<Self, LoadError> {
        let csv_err = |source| LoadError::Csv {
            file: file.to_string(),
            source,
        };

        let mut reader = csv::ReaderBuilder::new()
            .flexible(true)
            .from_reader(reader);

        let headers: Vec<String> = reader
            .headers()
            .map_err(csv_err)?
            .iter()
            .map(|h| match style {
                HeaderStyle::Lowercase => normalize_column_name(h),
                HeaderStyle::Trim => h.trim().to_string(),
            })
            .collect();

        if headers.is_empty() || headers.iter().all(String::is_empty) {
            return Err(LoadError::EmptyTable {
                file: file.to_string(),
            });
        }

        let mut rows = Vec::new();
        for (index, result) in reader.records().enumerate() {
            let record = result.map_err(csv_err)?;
            let line = record.position().map_or(0, csv::Position::line);
            rows.push(Row {
                index,
                line,
                record,
            });
        }

        log::debug!(
            "Read {} rows x {} columns from {file}",
            rows.len(),
            headers.len()
        );

        Ok(Self {
            file: file.to_string(),
            headers,
            rows,
        })
    }

    /// File label used in error messages.
    #[must_use]
    pub fn file(&self) -> &str {
        &self.file
    }

    /// Normalized header names in source order.
    #[must_use]
    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    /// Data rows in source order.
    #[must_use]
    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    /// Index of the first column named exactly `name`.
    #[must_use]
    pub fn find(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    /// Index of a column that must be present.
    ///
    /// # Errors
    ///
    /// Returns [`LoadError::MissingColumn`] if no header equals `name`.
    pub fn require(&self, name: &str) -> Result<usize, LoadError> {
        self.find(name).ok_or_else(|| LoadError::MissingColumn {
            file: self.file.clone(),
            column: name.to_string(),
        })
    }
}
