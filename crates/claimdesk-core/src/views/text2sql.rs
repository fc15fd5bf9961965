//! Natural-language query view.

use crate::api::{Row, Text2SqlRequest, Text2SqlResponse};
use crate::failure::Failure;
use crate::validate::{DEFAULT_TOP_K, clamp_top_k};
use serde_json::Value;

pub const TITLE: &str = "Natural Language to SQL";
pub const NO_RESULTS: &str = "No results found";
pub const MISSING_CELL: &str = "N/A";

#[derive(Debug, Clone)]
pub struct Text2SqlView {
    question: String,
    top_k: u8,
    pending: bool,
    result: Option<Text2SqlResponse>,
    error: Option<String>,
}

impl Default for Text2SqlView {
    fn default() -> Self {
        Self {
            question: String::new(),
            top_k: DEFAULT_TOP_K,
            pending: false,
            result: None,
            error: None,
        }
    }
}

impl Text2SqlView {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_question(&mut self, question: impl Into<String>) {
        self.question = question.into();
    }

    /// Set `top_k`, clamped to the accepted range.
    pub fn set_top_k(&mut self, top_k: i64) {
        self.top_k = clamp_top_k(top_k);
    }

    #[must_use]
    pub fn top_k(&self) -> u8 {
        self.top_k
    }

    #[must_use]
    pub fn result(&self) -> Option<&Text2SqlResponse> {
        self.result.as_ref()
    }

    #[must_use]
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.pending
    }

    /// Start a query. `None` when the question is blank or one is pending.
    pub fn begin_query(&mut self) -> Option<Text2SqlRequest> {
        let question = self.question.trim();
        if question.is_empty() || self.pending {
            return None;
        }
        let request = Text2SqlRequest {
            question: question.to_string(),
            top_k: clamp_top_k(i64::from(self.top_k)),
        };
        self.pending = true;
        self.error = None;
        self.result = None;
        Some(request)
    }

    pub fn complete(&mut self, response: Text2SqlResponse) {
        self.pending = false;
        self.result = Some(response);
    }

    pub fn fail(&mut self, failure: &Failure) {
        self.pending = false;
        self.error = Some(failure.message().to_string());
    }

    #[must_use]
    pub fn render(&self) -> String {
        let mut out = String::new();
        out.push_str(TITLE);
        out.push('\n');
        out.push_str("Ask questions about your claims data in natural language\n");
        out.push_str(&format!("Query retries (top_k): {}\n", self.top_k));

        if let Some(err) = &self.error {
            out.push_str(&format!("Error: {}\n", err));
        }
        if self.pending {
            out.push_str("Processing...\n");
        }
        if let Some(result) = &self.result {
            out.push_str(&render_result(result));
        }
        out
    }
}

/// Render a query result: the generated SQL and a table of rows.
///
/// Columns come from the first row's keys, in order. A result with no rows
/// renders as [`NO_RESULTS`] instead of an empty table.
#[must_use]
pub fn render_result(result: &Text2SqlResponse) -> String {
    let Some(first) = result.results.first() else {
        return format!("{}\n", NO_RESULTS);
    };

    let columns: Vec<&str> = first.keys().map(String::as_str).collect();
    let rows: Vec<Vec<String>> = result
        .results
        .iter()
        .map(|row| columns.iter().map(|c| cell_text(row, c)).collect())
        .collect();

    let mut widths: Vec<usize> = columns.iter().map(|c| c.chars().count()).collect();
    for row in &rows {
        for (w, cell) in widths.iter_mut().zip(row) {
            *w = (*w).max(cell.chars().count());
        }
    }

    let mut out = String::new();
    out.push_str("Generated SQL Query:\n");
    out.push_str(&format!("  {}\n", result.sql_query));
    out.push_str(&format!("Results ({} rows):\n", result.results.len()));

    let header: Vec<String> = columns.iter().map(|c| c.to_string()).collect();
    out.push_str(&table_line(&header, &widths));
    let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
    out.push_str(&table_line(&rule, &widths));
    for row in &rows {
        out.push_str(&table_line(row, &widths));
    }
    out
}

fn table_line(cells: &[String], widths: &[usize]) -> String {
    let padded: Vec<String> = cells
        .iter()
        .zip(widths)
        .map(|(cell, w)| format!("{:<width$}", cell, width = *w))
        .collect();
    format!("| {} |\n", padded.join(" | "))
}

/// Cell text. Missing, null and empty values render as [`MISSING_CELL`].
fn cell_text(row: &Row, column: &str) -> String {
    match row.get(column) {
        None | Some(Value::Null) => MISSING_CELL.to_string(),
        Some(Value::String(s)) if s.is_empty() => MISSING_CELL.to_string(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    fn response(value: Value) -> Text2SqlResponse {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn default_top_k_is_three() {
        assert_eq!(Text2SqlView::new().top_k(), 3);
    }

    #[test]
    fn top_k_is_clamped_before_sending() {
        let mut view = Text2SqlView::new();
        view.set_question("How many claims are denied?");
        view.set_top_k(42);
        let req = view.begin_query().unwrap();
        assert_eq!(req.top_k, 10);

        let mut view = Text2SqlView::new();
        view.set_question("q");
        view.set_top_k(0);
        assert_eq!(view.begin_query().unwrap().top_k, 1);
    }

    #[test]
    fn blank_question_sends_nothing() {
        let mut view = Text2SqlView::new();
        view.set_question("   ");
        assert!(view.begin_query().is_none());
    }

    #[test]
    fn pending_query_blocks_another() {
        let mut view = Text2SqlView::new();
        view.set_question("q");
        assert!(view.begin_query().is_some());
        assert!(view.begin_query().is_none());
    }

    #[test]
    fn zero_rows_render_no_results() {
        let mut view = Text2SqlView::new();
        view.set_question("q");
        view.begin_query().unwrap();
        view.complete(response(json!({"sql_query": "SELECT * FROM claims_list WHERE 1=0", "results": []})));

        let text = view.render();
        assert!(text.contains(NO_RESULTS));
        assert!(!text.contains("Results ("));
    }

    #[test]
    fn rows_render_as_table_with_na_cells() {
        let result = response(json!({
            "sql_query": "SELECT status, COUNT(*) AS n FROM claims_list GROUP BY status",
            "results": [
                {"status": "DENIED", "n": 4},
                {"status": null, "n": 1},
                {"n": 2}
            ]
        }));
        let text = render_result(&result);
        assert!(text.contains("Generated SQL Query:"));
        assert!(text.contains("Results (3 rows):"));
        assert!(text.contains("| status | n |"));
        assert!(text.contains("| DENIED | 4 |"));
        assert!(text.contains("| N/A    | 1 |"));
        assert!(text.contains("| N/A    | 2 |"));
    }

    #[test]
    fn failure_is_rendered() {
        let mut view = Text2SqlView::new();
        view.set_question("q");
        view.begin_query().unwrap();
        view.fail(&Failure::Quota);
        assert!(view.render().contains("Out of Message Quota"));
        assert!(view.result().is_none());
    }

    #[test]
    fn new_query_clears_previous_result() {
        let mut view = Text2SqlView::new();
        view.set_question("q");
        view.begin_query().unwrap();
        view.complete(response(json!({"sql_query": "SELECT 1", "results": [{"a": 1}]})));
        assert!(view.result().is_some());
        view.begin_query().unwrap();
        assert!(view.result().is_none());
    }
}
