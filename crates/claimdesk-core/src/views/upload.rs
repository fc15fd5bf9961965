//! PDF upload view.

use super::Status;
use crate::failure::Failure;
use crate::validate::{SelectedFile, is_pdf};

pub const TITLE: &str = "Upload PDF Documents";
pub const ONLY_PDF: &str = "Only PDF files are allowed";
pub const PROCESSING: &str = "Processing PDF files...";

/// Selection and status of the PDF upload form.
#[derive(Debug, Clone, Default)]
pub struct PdfUploadView {
    selected: Vec<SelectedFile>,
    uploading: bool,
    status: Option<Status>,
}

impl PdfUploadView {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn selected(&self) -> &[SelectedFile] {
        &self.selected
    }

    #[must_use]
    pub fn status(&self) -> Option<&Status> {
        self.status.as_ref()
    }

    #[must_use]
    pub fn is_uploading(&self) -> bool {
        self.uploading
    }

    /// Add files to the selection.
    ///
    /// All-or-nothing: one non-PDF rejects the whole batch and leaves the
    /// current selection untouched.
    pub fn select(&mut self, files: Vec<SelectedFile>) -> Result<(), Failure> {
        if files.iter().any(|f| !is_pdf(f)) {
            let failure = Failure::validation(ONLY_PDF);
            self.status = Some(Status::from_failure(&failure));
            return Err(failure);
        }
        self.selected.extend(files);
        self.status = None;
        Ok(())
    }

    /// Remove the file at `index`. Out-of-range indices are ignored.
    pub fn remove(&mut self, index: usize) -> Option<SelectedFile> {
        if index < self.selected.len() {
            Some(self.selected.remove(index))
        } else {
            None
        }
    }

    pub fn clear(&mut self) {
        self.selected.clear();
        self.status = None;
    }

    /// Start an upload. `None` when nothing is selected or one is in flight.
    pub fn begin_upload(&mut self) -> Option<Vec<SelectedFile>> {
        if self.selected.is_empty() || self.uploading {
            return None;
        }
        self.uploading = true;
        self.status = Some(Status::loading(PROCESSING));
        Some(self.selected.clone())
    }

    pub fn complete(&mut self, chunks_count: u64) {
        self.uploading = false;
        self.selected.clear();
        self.status = Some(Status::success(format!(
            "Successfully processed {} text chunks. You can now ask questions about your documents!",
            chunks_count
        )));
    }

    pub fn fail(&mut self, failure: &Failure) {
        self.uploading = false;
        self.status = Some(Status::from_failure(failure));
    }

    #[must_use]
    pub fn render(&self) -> String {
        let mut out = String::new();
        out.push_str(TITLE);
        out.push('\n');
        out.push_str("Upload your PDF files to start asking questions about their content\n");

        if self.selected.is_empty() {
            out.push_str("No files selected. Add PDF paths to select them.\n");
        } else {
            out.push_str(&format!("Selected files ({}):\n", self.selected.len()));
            for (i, file) in self.selected.iter().enumerate() {
                out.push_str(&format!("  [{}] {} ({})\n", i + 1, file.name, file.size_text()));
            }
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

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::views::StatusKind;

    fn pdf(name: &str) -> SelectedFile {
        SelectedFile::new(format!("/docs/{}", name), 2048)
    }

    #[test]
    fn selecting_pdfs_appends() {
        let mut view = PdfUploadView::new();
        view.select(vec![pdf("a.pdf")]).unwrap();
        view.select(vec![pdf("b.pdf"), pdf("c.pdf")]).unwrap();
        assert_eq!(view.selected().len(), 3);
        assert!(view.status().is_none());
    }

    #[test]
    fn non_pdf_rejects_batch_and_keeps_list() {
        let mut view = PdfUploadView::new();
        view.select(vec![pdf("a.pdf")]).unwrap();

        let err = view
            .select(vec![pdf("b.pdf"), SelectedFile::new("/docs/c.txt", 1)])
            .unwrap_err();
        assert_eq!(err.message(), ONLY_PDF);
        assert_eq!(view.selected().len(), 1);
        assert_eq!(view.selected()[0].name, "a.pdf");
        assert!(view.status().unwrap().is_error());
    }

    #[test]
    fn begin_upload_requires_selection() {
        let mut view = PdfUploadView::new();
        assert!(view.begin_upload().is_none());

        view.select(vec![pdf("a.pdf")]).unwrap();
        let files = view.begin_upload().unwrap();
        assert_eq!(files.len(), 1);
        assert_eq!(view.status().unwrap().kind, StatusKind::Loading);

        // Already in flight.
        assert!(view.begin_upload().is_none());
    }

    #[test]
    fn complete_clears_selection() {
        let mut view = PdfUploadView::new();
        view.select(vec![pdf("a.pdf")]).unwrap();
        view.begin_upload().unwrap();
        view.complete(17);

        assert!(view.selected().is_empty());
        assert!(!view.is_uploading());
        let status = view.status().unwrap();
        assert_eq!(status.kind, StatusKind::Success);
        assert!(status.message.contains("17 text chunks"));
    }

    #[test]
    fn fail_keeps_selection() {
        let mut view = PdfUploadView::new();
        view.select(vec![pdf("a.pdf")]).unwrap();
        view.begin_upload().unwrap();
        view.fail(&Failure::Backend("No text could be extracted".to_string()));

        assert_eq!(view.selected().len(), 1);
        assert_eq!(view.status().unwrap().message, "No text could be extracted");
    }

    #[test]
    fn remove_and_clear() {
        let mut view = PdfUploadView::new();
        view.select(vec![pdf("a.pdf"), pdf("b.pdf")]).unwrap();
        assert_eq!(view.remove(0).unwrap().name, "a.pdf");
        assert!(view.remove(5).is_none());
        view.clear();
        assert!(view.selected().is_empty());
    }

    #[test]
    fn render_lists_files_with_sizes() {
        let mut view = PdfUploadView::new();
        view.select(vec![pdf("a.pdf")]).unwrap();
        let text = view.render();
        assert!(text.contains("[1] a.pdf (2 KB)"));
    }
}
