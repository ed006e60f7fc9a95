//! History notification seam.
//!
//! The history store itself is an external collaborator (a CMS-style document
//! store in the original deployment). The pipeline only supplies the record
//! fields; sinks decide what to do with them. Export treats sink failures as
//! non-fatal.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{QrsmithError, Result};
use crate::types::{Colour, ExportFormat, QrStyle};

/// Fields describing one completed export.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryRecord {
    pub url: String,
    pub style: QrStyle,
    pub foreground: Colour,
    pub background: Colour,
    pub format: ExportFormat,
    /// RFC 3339 timestamp of the export.
    pub exported_at: String,
}

/// Destination for history records.
pub trait HistorySink {
    fn record(&mut self, record: &HistoryRecord) -> Result<()>;
}

/// Sink that drops every record.
#[derive(Debug, Default)]
pub struct NullHistory;

impl HistorySink for NullHistory {
    fn record(&mut self, _record: &HistoryRecord) -> Result<()> {
        Ok(())
    }
}

/// Sink appending one JSON object per line to a file.
#[derive(Debug)]
pub struct JsonlHistory {
    path: PathBuf,
}

impl JsonlHistory {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl HistorySink for JsonlHistory {
    fn record(&mut self, record: &HistoryRecord) -> Result<()> {
        let line = serde_json::to_string(record).map_err(|e| QrsmithError::Io {
            path: self.path.clone(),
            message: format!("Failed to serialize history record: {}", e),
        })?;

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|e| QrsmithError::Io {
                path: self.path.clone(),
                message: format!("Failed to open history file: {}", e),
            })?;

        writeln!(file, "{}", line).map_err(|e| QrsmithError::Io {
            path: self.path.clone(),
            message: format!("Failed to append history record: {}", e),
        })?;

        Ok(())
    }
}
