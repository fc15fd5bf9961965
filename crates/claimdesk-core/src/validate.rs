//! # Validate Module
//!
//! Checks that reject input before any request is sent.

use crate::failure::Failure;
use std::path::{Path, PathBuf};

/// Smallest `top_k` the client sends.
pub const TOP_K_MIN: u8 = 1;

/// Largest `top_k` the client sends.
pub const TOP_K_MAX: u8 = 10;

/// `top_k` used when the user does not choose one.
pub const DEFAULT_TOP_K: u8 = 3;

pub const PDF_CONTENT_TYPE: &str = "application/pdf";
pub const CSV_CONTENT_TYPE: &str = "text/csv";
pub const OCTET_STREAM: &str = "application/octet-stream";

// =============================================================================
// SELECTED FILE
// =============================================================================

/// A file the user picked for upload.
///
/// Only metadata is held here. The bytes are read by whoever sends the request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectedFile {
    pub path: PathBuf,
    pub name: String,
    pub size: u64,
    pub content_type: String,
}

impl SelectedFile {
    /// Describe a file without touching the filesystem.
    pub fn new(path: impl Into<PathBuf>, size: u64) -> Self {
        let path = path.into();
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let content_type = content_type_for(&name).to_string();
        Self {
            path,
            name,
            size,
            content_type,
        }
    }

    /// Describe a file on disk, reading its size.
    pub fn from_path(path: &Path) -> std::io::Result<Self> {
        let meta = std::fs::metadata(path)?;
        if !meta.is_file() {
            return Err(std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                format!("{} is not a file", path.display()),
            ));
        }
        Ok(Self::new(path, meta.len()))
    }

    /// Human-readable size.
    #[must_use]
    pub fn size_text(&self) -> String {
        format_file_size(self.size)
    }
}

/// MIME type guessed from the extension, case-insensitively.
#[must_use]
pub fn content_type_for(name: &str) -> &'static str {
    let ext = Path::new(name)
        .extension()
        .map(|e| e.to_string_lossy().to_ascii_lowercase());
    match ext.as_deref() {
        Some("pdf") => PDF_CONTENT_TYPE,
        Some("csv") => CSV_CONTENT_TYPE,
        _ => OCTET_STREAM,
    }
}

/// PDFs are recognized by content type.
#[must_use]
pub fn is_pdf(file: &SelectedFile) -> bool {
    file.content_type == PDF_CONTENT_TYPE
}

/// CSVs are recognized by a literal `.csv` name suffix.
#[must_use]
pub fn is_csv(file: &SelectedFile) -> bool {
    file.name.ends_with(".csv")
}

// =============================================================================
// FIELDS
// =============================================================================

/// Clamp `top_k` into `[TOP_K_MIN, TOP_K_MAX]`.
#[must_use]
pub fn clamp_top_k(top_k: i64) -> u8 {
    top_k.clamp(TOP_K_MIN as i64, TOP_K_MAX as i64) as u8
}

/// Trimmed value of a required field, or a validation failure naming it.
pub fn require_text<'a>(field: &str, value: &'a str) -> Result<&'a str, Failure> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(Failure::validation(format!("{} is required", field)));
    }
    Ok(trimmed)
}

// =============================================================================
// FORMATTING
// =============================================================================

const SIZE_UNITS: [&str; 4] = ["Bytes", "KB", "MB", "GB"];

/// Format a byte count with base-1024 units and at most two decimals.
///
/// Integer-only: the value is carried in hundredths of a unit.
#[must_use]
pub fn format_file_size(bytes: u64) -> String {
    if bytes == 0 {
        return String::from("0 Bytes");
    }

    let mut unit = 0usize;
    let mut divisor: u128 = 1;
    while unit + 1 < SIZE_UNITS.len() && u128::from(bytes) >= divisor * 1024 {
        divisor *= 1024;
        unit += 1;
    }

    let hundredths = (u128::from(bytes) * 100 + divisor / 2) / divisor;
    let whole = hundredths / 100;
    let frac = hundredths % 100;

    let number = if frac == 0 {
        whole.to_string()
    } else if frac % 10 == 0 {
        format!("{}.{}", whole, frac / 10)
    } else {
        format!("{}.{:02}", whole, frac)
    };
    format!("{} {}", number, SIZE_UNITS[unit])
}

// =============================================================================
// TESTS
// =============================================================================
