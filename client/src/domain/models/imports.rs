//! Student CSV import payloads.

use bytes::Bytes;
use serde::{Deserialize, Serialize};

/// Column mapping sent alongside a student CSV.
///
/// Each field names the CSV column holding that attribute.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StudentCsvMapping {
    /// Column with the SIS student identifier.
    pub sis_id: String,
    /// Column with the first name.
    pub first_name: String,
    /// Column with the last name.
    pub last_name: String,
    /// Column with the numeric grade level.
    pub grade_level: String,
    /// Column with the school name.
    pub school_name: String,
    /// Column with the enrollment status.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enrollment_status: Option<String>,
    /// Column with the ELL flag.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ell_status: Option<String>,
    /// Column with the IDEA flag.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub idea_flag: Option<String>,
}

/// CSV file to upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CsvFile {
    /// File name reported to the server.
    pub file_name: String,
    /// Raw file content.
    pub content: Bytes,
}

impl CsvFile {
    /// Wrap file content under a file name.
    pub fn new(file_name: impl Into<String>, content: impl Into<Bytes>) -> Self {
        Self {
            file_name: file_name.into(),
            content: content.into(),
        }
    }
}

/// Outcome of a CSV import.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CsvImportResult {
    /// Data rows read from the file.
    pub rows_processed: u64,
    /// Students inserted.
    pub students_created: u64,
    /// Students updated.
    pub students_updated: u64,
    /// Per-row error messages.
    pub errors: Vec<String>,
    /// Identifier of the ingest batch.
    pub ingest_batch_id: String,
}
