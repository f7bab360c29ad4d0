//! Persisted table store: CSV on disk plus a JSON metadata sidecar.
//!
//! Layout: `{table}.csv` and `{table}.csv.meta.json` next to it.
//!
//! - Header is `Date` followed by the table's columns; missing cells are empty.
//! - Saves are atomic (write `.tmp`, rename into place).
//! - Loading accepts older timestamp forms and collapses duplicate dates.

use crate::domain::{ConsolidatedTable, TableRow};
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use polars::prelude::ParquetWriter;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const DATE_HEADER: &str = "Date";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("table not found at {path}")]
    MissingSource { path: PathBuf },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("table header has no 'Date' column")]
    MissingDateColumn,

    #[error("row {row}: unparseable date '{value}'")]
    InvalidDate { row: usize, value: String },

    #[error("row {row}, column '{column}': unparseable value '{value}'")]
    InvalidCell {
        row: usize,
        column: String,
        value: String,
    },

    #[error("metadata error: {0}")]
    Metadata(String),

    #[error("parquet export failed: {0}")]
    Parquet(String),
}

/// Sidecar written next to every saved table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableMeta {
    pub rows: usize,
    pub first_date: Option<NaiveDate>,
    pub last_date: Option<NaiveDate>,
    pub columns: Vec<String>,
    /// blake3 of the CSV bytes as written.
    pub content_hash: String,
    pub saved_at: DateTime<Utc>,
}

pub struct TableStore {
    path: PathBuf,
}

impl TableStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn meta_path(&self) -> PathBuf {
        let mut name = self.path.as_os_str().to_owned();
        name.push(".meta.json");
        PathBuf::from(name)
    }

    pub fn exists(&self) -> bool {
        self.path.is_file()
    }

    /// Load the table. A missing file is [`StoreError::MissingSource`].
    pub fn load(&self) -> Result<ConsolidatedTable, StoreError> {
        if !self.exists() {
            return Err(StoreError::MissingSource {
                path: self.path.clone(),
            });
        }
        let file = fs::File::open(&self.path)?;
        let table = read_csv(file)?;
        tracing::debug!(
            path = %self.path.display(),
            rows = table.len(),
            columns = table.columns().len(),
            "loaded table"
        );
        Ok(table)
    }

    /// Like [`TableStore::load`], but a missing file is `Ok(None)`.
    pub fn load_optional(&self) -> Result<Option<ConsolidatedTable>, StoreError> {
        match self.load() {
            Ok(table) => Ok(Some(table)),
            Err(StoreError::MissingSource { .. }) => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Replace the stored table atomically and refresh the sidecar.
    pub fn save(&self, table: &ConsolidatedTable) -> Result<TableMeta, StoreError> {
        let mut bytes = Vec::new();
        write_csv(table, &mut bytes)?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        write_atomic(&self.path, &bytes)?;

        let meta = TableMeta {
            rows: table.len(),
            first_date: table.first_date(),
            last_date: table.last_date(),
            columns: table.columns().to_vec(),
            content_hash: blake3::hash(&bytes).to_hex().to_string(),
            saved_at: Utc::now(),
        };
        let meta_json = serde_json::to_vec_pretty(&meta)
            .map_err(|e| StoreError::Metadata(format!("serialization: {e}")))?;
        write_atomic(&self.meta_path(), &meta_json)?;

        tracing::info!(
            path = %self.path.display(),
            rows = meta.rows,
            columns = meta.columns.len(),
            "saved table"
        );
        Ok(meta)
    }

    /// The sidecar, if present and readable.
    pub fn read_meta(&self) -> Option<TableMeta> {
        let content = fs::read(self.meta_path()).ok()?;
        serde_json::from_slice(&content).ok()
    }

    /// Whether the file on disk still matches the sidecar's hash.
    pub fn verify(&self) -> Result<bool, StoreError> {
        let meta = self
            .read_meta()
            .ok_or_else(|| StoreError::Metadata("no readable sidecar".into()))?;
        let bytes = fs::read(&self.path)?;
        Ok(blake3::hash(&bytes).to_hex().as_str() == meta.content_hash)
    }
}

fn write_atomic(path: &Path, bytes: &[u8]) -> Result<(), StoreError> {
    let mut tmp_name = path.as_os_str().to_owned();
    tmp_name.push(".tmp");
    let tmp_path = PathBuf::from(tmp_name);

    {
        let mut file = fs::File::create(&tmp_path)?;
        file.write_all(bytes)?;
        file.sync_all()?;
    }
    fs::rename(&tmp_path, path).map_err(|e| {
        let _ = fs::remove_file(&tmp_path);
        StoreError::Io(e)
    })
}

/// Serialize `table` as CSV: `Date` then columns in table order.
pub fn write_csv<W: Write>(table: &ConsolidatedTable, writer: W) -> Result<(), StoreError> {
    let mut wtr = csv::Writer::from_writer(writer);

    let mut header = Vec::with_capacity(table.columns().len() + 1);
    header.push(DATE_HEADER.to_string());
    header.extend(table.columns().iter().cloned());
    wtr.write_record(&header)?;

    for row in table.rows() {
        let mut record = Vec::with_capacity(header.len());
        record.push(row.date.format("%Y-%m-%d").to_string());
        for column in table.columns() {
            record.push(row.get(column).map(|v| v.to_string()).unwrap_or_default());
        }
        wtr.write_record(&record)?;
    }
    wtr.flush()?;
    Ok(())
}

/// Parse a CSV table. Rows are sorted and duplicate dates collapsed.
pub fn read_csv<R: Read>(reader: R) -> Result<ConsolidatedTable, StoreError> {
    let mut rdr = csv::ReaderBuilder::new().flexible(true).from_reader(reader);
    let headers = rdr.headers()?.clone();

    let date_idx = headers
        .iter()
        .position(|h| h.trim() == DATE_HEADER)
        .ok_or(StoreError::MissingDateColumn)?;
    let columns: Vec<(usize, String)> = headers
        .iter()
        .enumerate()
        .filter(|(i, _)| *i != date_idx)
        .map(|(i, h)| (i, h.trim().to_string()))
        .collect();

    let mut rows = Vec::new();
    for (n, record) in rdr.records().enumerate() {
        let record = record?;
        // Header is line 1.
        let row_no = n + 2;
        let raw_date = record.get(date_idx).unwrap_or("").trim();
        if raw_date.is_empty() {
            continue;
        }
        let date = parse_date_cell(raw_date).ok_or_else(|| StoreError::InvalidDate {
            row: row_no,
            value: raw_date.to_string(),
        })?;

        let mut row = TableRow::new(date);
        for (i, name) in &columns {
            let cell = record.get(*i).unwrap_or("").trim();
            if cell.is_empty() {
                continue;
            }
            let value: f64 = cell.parse().map_err(|_| StoreError::InvalidCell {
                row: row_no,
                column: name.clone(),
                value: cell.to_string(),
            })?;
            row.set(name.clone(), value);
        }
        rows.push(row);
    }

    let names = columns.into_iter().map(|(_, name)| name).collect();
    Ok(ConsolidatedTable::from_rows(names, rows))
}

/// Calendar date of a stored date cell.
///
/// Accepts plain dates and timestamps with or without an offset. Timestamps
/// are taken to UTC before the time of day is dropped; ones without an offset
/// are read as UTC.
pub fn parse_date_cell(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    if let Ok(d) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Some(d);
    }
    for fmt in ["%Y-%m-%d %H:%M:%S%:z", "%Y-%m-%d %H:%M:%S%.f%:z", "%Y-%m-%dT%H:%M:%S%.f%:z"] {
        if let Ok(ts) = DateTime::parse_from_str(raw, fmt) {
            return Some(ts.with_timezone(&Utc).date_naive());
        }
    }
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts.with_timezone(&Utc).date_naive());
    }
    for fmt in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"] {
        if let Ok(ts) = NaiveDateTime::parse_from_str(raw, fmt) {
            return Some(ts.date());
        }
    }
    None
}

/// Write a columnar snapshot of `table` to a Parquet file.
pub fn export_parquet(table: &ConsolidatedTable, path: &Path) -> Result<(), StoreError> {
    let mut df = table
        .to_dataframe()
        .map_err(|e| StoreError::Parquet(format!("dataframe creation: {e}")))?;
    let file = fs::File::create(path)?;
    ParquetWriter::new(file)
        .finish(&mut df)
        .map_err(|e| StoreError::Parquet(format!("write parquet: {e}")))?;
    tracing::info!(path = %path.display(), rows = table.len(), "exported parquet snapshot");
    Ok(())
}
