//! JSON and CSV export of a table in its current row order.

use std::collections::HashSet;
use std::fmt;
use std::io;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;
use thiserror::Error;

use crate::table::TableView;

/// Export failures. Sources are flattened to text so the error can travel
/// back to the UI inside a [`crate::Completion`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExportError {
    #[error("unsupported export format: {0}")]
    UnsupportedFormat(String),
    #[error("serialization error: {0}")]
    Json(String),
    #[error("IO error: {message}")]
    Io { kind: io::ErrorKind, message: String },
    #[error("export task failed: {0}")]
    Task(String),
}

impl From<serde_json::Error> for ExportError {
    fn from(e: serde_json::Error) -> Self {
        Self::Json(e.to_string())
    }
}

impl From<io::Error> for ExportError {
    fn from(e: io::Error) -> Self {
        Self::Io {
            kind: e.kind(),
            message: e.to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Json,
    Csv,
}

impl ExportFormat {
    pub fn extension(self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Csv => "csv",
        }
    }
}

impl FromStr for ExportFormat {
    type Err = ExportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "json" => Ok(Self::Json),
            "csv" => Ok(Self::Csv),
            other => Err(ExportError::UnsupportedFormat(other.to_string())),
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

/// Snapshot of a table taken at click time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportJob {
    pub table: String,
    pub format: ExportFormat,
    pub columns: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

/// Where an export landed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportReceipt {
    pub path: PathBuf,
    pub rows: usize,
}

#[derive(Serialize)]
struct JsonExport<'a> {
    table: &'a str,
    exported_at: String,
    columns: &'a [String],
    rows: Vec<serde_json::Map<String, serde_json::Value>>,
}

impl ExportJob {
    pub fn from_table(table: &TableView, format: ExportFormat) -> Self {
        let width = table.columns().len();
        Self {
            table: table.id().to_string(),
            format,
            columns: table.columns().iter().map(|c| c.label.clone()).collect(),
            rows: table
                .rows()
                .iter()
                .map(|row| (0..width).map(|i| row.cell(i).to_string()).collect())
                .collect(),
        }
    }

    /// `<table>_data.<ext>`, with anything outside `[A-Za-z0-9_-]` replaced.
    pub fn file_name(&self) -> String {
        let stem: String = self
            .table
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                    c
                } else {
                    '_'
                }
            })
            .collect();
        format!("{}_data.{}", stem, self.format.extension())
    }

    pub fn render(&self, exported_at: DateTime<Utc>) -> Result<String, ExportError> {
        match self.format {
            ExportFormat::Json => self.render_json(exported_at),
            ExportFormat::Csv => Ok(self.render_csv()),
        }
    }

    fn render_json(&self, exported_at: DateTime<Utc>) -> Result<String, ExportError> {
        let keys = unique_keys(&self.columns);
        let rows = self
            .rows
            .iter()
            .map(|row| {
                keys.iter()
                    .zip(row)
                    .map(|(key, cell)| (key.clone(), serde_json::Value::String(cell.clone())))
                    .collect()
            })
            .collect();
        let doc = JsonExport {
            table: &self.table,
            exported_at: exported_at.to_rfc3339_opts(SecondsFormat::Secs, true),
            columns: &keys,
            rows,
        };
        Ok(serde_json::to_string_pretty(&doc)?)
    }

    fn render_csv(&self) -> String {
        let mut csv = String::new();
        for row in std::iter::once(&self.columns).chain(&self.rows) {
            let line = row
                .iter()
                .map(|field| escape_csv(field))
                .collect::<Vec<_>>()
                .join(",");
            csv.push_str(&line);
            csv.push('\n');
        }
        csv
    }
}

/// Column labels as JSON object keys. A repeated label gets a ` (n)` suffix
/// so no cell is overwritten by a later column.
fn unique_keys(labels: &[String]) -> Vec<String> {
    let mut seen = HashSet::new();
    labels
        .iter()
        .map(|label| {
            let mut key = label.clone();
            let mut n = 2;
            while !seen.insert(key.clone()) {
                key = format!("{} ({})", label, n);
                n += 1;
            }
            key
        })
        .collect()
}

fn escape_csv(value: &str) -> String {
    let needs_quotes = value.contains(',') || value.contains('"') || value.contains('\n');
    if needs_quotes {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

/// Render `job` and write it into `dir`, creating the directory if needed.
pub fn write_export(dir: &Path, job: &ExportJob) -> Result<ExportReceipt, ExportError> {
    let body = job.render(Utc::now())?;
    std::fs::create_dir_all(dir)?;
    let path = dir.join(job.file_name());
    std::fs::write(&path, body)?;
    log::info!("exported {} rows of {} to {}", job.rows.len(), job.table, path.display());
    Ok(ExportReceipt {
        path,
        rows: job.rows.len(),
    })
}
