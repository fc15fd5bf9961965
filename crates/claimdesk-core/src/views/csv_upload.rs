//! CSV ingestion view (administrators only).
//!
//! The role check is a plain guard evaluated on construction. A non-admin view
//! renders the access-denied panel and refuses to produce a request, whatever
//! else has happened to it.

use super::Status;
use crate::failure::Failure;
use crate::session::Role;
use crate::validate::{SelectedFile, is_csv};
use std::fmt;
use std::str::FromStr;

pub const TITLE: &str = "Upload Claims CSV Data";
pub const ACCESS_DENIED: &str = "Admin Access Required";
pub const ONLY_CSV: &str = "Only CSV files are allowed";
pub const UPLOADING: &str = "Uploading CSV file...";

// =============================================================================
// TARGET TABLE
// =============================================================================

/// Tables the backend accepts CSV data for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TargetTable {
    #[default]
    ClaimsList,
    ClaimsDetail,
}

impl TargetTable {
    pub const ALL: [Self; 2] = [Self::ClaimsList, Self::ClaimsDetail];

    /// Table name sent as `table_name`.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::ClaimsList => "claims_list",
            Self::ClaimsDetail => "claims_detail",
        }
    }

    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::ClaimsList => "Claims List",
            Self::ClaimsDetail => "Claims Detail",
        }
    }
}

impl fmt::Display for TargetTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TargetTable {
    type Err = Failure;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| {
                Failure::validation(format!(
                    "Unknown table '{}'. Expected one of: claims_list, claims_detail",
                    s
                ))
            })
    }
}

// =============================================================================
// VIEW
// =============================================================================

/// Body of a CSV upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CsvUploadRequest {
    pub file: SelectedFile,
    pub table: TargetTable,
}

#[derive(Debug, Clone)]
pub struct CsvUploadView {
    role: Option<Role>,
    selected: Option<SelectedFile>,
    table: TargetTable,
    uploading: bool,
    status: Option<Status>,
}

impl CsvUploadView {
    /// Build the view for the current role (`None` when signed out).
    #[must_use]
    pub fn new(role: Option<Role>) -> Self {
        Self {
            role,
            selected: None,
            table: TargetTable::default(),
            uploading: false,
            status: None,
        }
    }

    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.role.as_ref().is_some_and(Role::is_admin)
    }

    #[must_use]
    pub fn selected(&self) -> Option<&SelectedFile> {
        self.selected.as_ref()
    }

    #[must_use]
    pub fn table(&self) -> TargetTable {
        self.table
    }

    #[must_use]
    pub fn status(&self) -> Option<&Status> {
        self.status.as_ref()
    }

    fn denied() -> Failure {
        Failure::validation(ACCESS_DENIED)
    }

    pub fn set_table(&mut self, table: TargetTable) -> Result<(), Failure> {
        if !self.is_admin() {
            return Err(Self::denied());
        }
        self.table = table;
        Ok(())
    }

    /// Select the file to upload. Non-CSV files leave the selection unchanged.
    pub fn select(&mut self, file: SelectedFile) -> Result<(), Failure> {
        if !self.is_admin() {
            return Err(Self::denied());
        }
        if !is_csv(&file) {
            let failure = Failure::validation(ONLY_CSV);
            self.status = Some(Status::from_failure(&failure));
            return Err(failure);
        }
        self.selected = Some(file);
        self.status = None;
        Ok(())
    }

    pub fn clear(&mut self) {
        self.selected = None;
        self.status = None;
    }

    /// Start an upload.
    ///
    /// `Ok(None)` when nothing is selected or an upload is in flight; a
    /// non-admin always gets the access-denied failure.
    pub fn begin_upload(&mut self) -> Result<Option<CsvUploadRequest>, Failure> {
        if !self.is_admin() {
            return Err(Self::denied());
        }
        if self.uploading {
            return Ok(None);
        }
        let Some(file) = self.selected.clone() else {
            return Ok(None);
        };
        self.uploading = true;
        self.status = Some(Status::loading(UPLOADING));
        Ok(Some(CsvUploadRequest {
            file,
            table: self.table,
        }))
    }

    pub fn complete(&mut self, message: impl Into<String>) {
        self.uploading = false;
        self.selected = None;
        self.status = Some(Status::success(message));
    }

    pub fn fail(&mut self, failure: &Failure) {
        self.uploading = false;
        self.status = Some(Status::from_failure(failure));
    }

    #[must_use]
    pub fn render(&self) -> String {
        if !self.is_admin() {
            let role = self.role.as_ref().map_or("USER", Role::as_str);
            return format!(
                "{}\nOnly administrators can upload CSV files to the database.\nYour current role: {}\n",
                ACCESS_DENIED, role
            );
        }

        let mut out = String::new();
        out.push_str(TITLE);
        out.push('\n');
        out.push_str("Upload CSV files to populate the claims database tables (Admin only)\n");
        out.push_str("Supports pipe-delimited CSV files (|)\n");
        out.push_str(&format!(
            "Target table: {} ({})\n",
            self.table.label(),
            self.table
        ));
        match &self.selected {
            Some(file) => {
                out.push_str(&format!("Selected: {} ({})\n", file.name, file.size_text()));
                out.push_str(&format!("Ready: upload to {}\n", self.table));
            }
            None => out.push_str("No file selected.\n"),
        }
        if let Some(status) = &self.status {
            out.push_str(&status.to_line());
            out.push('\n');
        }
        out
    }
}

// =============================================================================
// TESTS
// =============================================================================
