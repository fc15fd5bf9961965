//! # View Drivers
//!
//! Glue between the sans-IO views and the SDK. Each driver asks its view for
//! a request, performs it once, and folds the outcome back into the view.
//!
//! Every driver returns `Ok(None)` when the view had nothing to send. A
//! failure is both recorded in the view and returned.

use chrono::Local;
use claimdesk_core::api::{CsvUploadResponse, Text2SqlResponse, UploadResponse};
use claimdesk_core::failure::{Failure, fallback};
use claimdesk_core::views::{ChatView, CsvUploadView, PdfUploadView, Text2SqlView};
use claimdesk_core::SelectedFile;
use claimdesk_sdk::{ClaimdeskClient, UploadFile};
use std::path::Path;

/// Describe a file on disk for selection.
pub fn describe(path: &Path) -> Result<SelectedFile, Failure> {
    SelectedFile::from_path(path)
        .map_err(|e| Failure::validation(format!("Cannot open {}: {}", path.display(), e)))
}

async fn read_for_upload(file: &SelectedFile) -> Result<UploadFile, Failure> {
    let bytes = tokio::fs::read(&file.path)
        .await
        .map_err(|e| Failure::validation(format!("Cannot read {}: {}", file.name, e)))?;
    Ok(UploadFile::from_selected(file, bytes))
}

/// Upload the PDFs selected in `view`.
pub async fn pdf_upload(
    view: &mut PdfUploadView,
    client: &ClaimdeskClient,
) -> Result<Option<UploadResponse>, Failure> {
    let Some(selected) = view.begin_upload() else {
        return Ok(None);
    };

    let mut files = Vec::with_capacity(selected.len());
    for file in &selected {
        match read_for_upload(file).await {
            Ok(f) => files.push(f),
            Err(failure) => {
                view.fail(&failure);
                return Err(failure);
            }
        }
    }

    match client.upload_pdfs(files).await {
        Ok(resp) => {
            tracing::info!(chunks = resp.chunks_count, "PDF upload processed");
            view.complete(resp.chunks_count);
            Ok(Some(resp))
        }
        Err(e) => {
            let failure = e.failure(fallback::PDF_UPLOAD);
            view.fail(&failure);
            Err(failure)
        }
    }
}

/// Ask `input` in the chat. Returns the answer.
pub async fn chat(
    view: &mut ChatView,
    client: &ClaimdeskClient,
    input: &str,
) -> Result<Option<String>, Failure> {
    let Some(question) = view.submit(input, Local::now()) else {
        return Ok(None);
    };

    match client.chat(&question).await {
        Ok(resp) => {
            view.receive(resp.answer.clone(), Local::now());
            Ok(Some(resp.answer))
        }
        Err(e) => {
            let failure = e.failure(fallback::CHAT);
            view.fail(&failure);
            Err(failure)
        }
    }
}

/// Run the question held in `view`.
pub async fn text2sql(
    view: &mut Text2SqlView,
    client: &ClaimdeskClient,
) -> Result<Option<Text2SqlResponse>, Failure> {
    let Some(request) = view.begin_query() else {
        return Ok(None);
    };

    match client.text2sql(&request).await {
        Ok(resp) => {
            tracing::info!(rows = resp.results.len(), "text-to-SQL query answered");
            view.complete(resp.clone());
            Ok(Some(resp))
        }
        Err(e) => {
            let failure = e.failure(fallback::TEXT2SQL);
            view.fail(&failure);
            Err(failure)
        }
    }
}

/// Upload the CSV selected in `view`.
///
/// A non-admin view fails before anything is read or sent.
pub async fn csv_upload(
    view: &mut CsvUploadView,
    client: &ClaimdeskClient,
) -> Result<Option<CsvUploadResponse>, Failure> {
    let Some(request) = view.begin_upload()? else {
        return Ok(None);
    };

    let file = match read_for_upload(&request.file).await {
        Ok(f) => f,
        Err(failure) => {
            view.fail(&failure);
            return Err(failure);
        }
    };

    match client.upload_csv(file, request.table).await {
        Ok(resp) => {
            tracing::info!(table = request.table.as_str(), "CSV ingested");
            view.complete(resp.message.clone());
            Ok(Some(resp))
        }
        Err(e) => {
            let failure = e.failure(fallback::CSV_UPLOAD);
            view.fail(&failure);
            Err(failure)
        }
    }
}
