//! Integration tests for ClaimDesk CLI commands and the dashboard.
//!
//! Uses wiremock for the backend and tempfile for files to upload.

// Allow unwrap and panic in tests - these are standard for test code
#![allow(clippy::unwrap_used, clippy::panic)]

use claimdesk::auth::AuthContext;
use claimdesk::cli::{
    cmd_chat, cmd_logout, cmd_query, cmd_status, cmd_upload_csv, cmd_upload_pdf, cmd_whoami,
    run_dashboard,
};
use claimdesk::AppError;
use claimdesk_core::failure::QUOTA_MESSAGE;
use claimdesk_core::storage::{TOKEN_KEY, load_record};
use claimdesk_core::views::csv_upload::ACCESS_DENIED;
use claimdesk_core::views::text2sql::NO_RESULTS;
use claimdesk_core::views::{Tab, TargetTable};
use claimdesk_core::{KeyValueStore, MemoryStore};
use claimdesk_sdk::ClaimdeskClient;
use std::path::PathBuf;
use tempfile::TempDir;
use wiremock::matchers::{body_json, body_string_contains, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

// =============================================================================
// HELPER FUNCTIONS
// =============================================================================

/// A context signed in through `/login` with the given role.
async fn signed_in(server: &MockServer, role: &str) -> AuthContext<MemoryStore> {
    Mock::given(method("POST"))
        .and(path("/login"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "access_token": "tok-cli",
            "user_id": 5,
            "role": role
        })))
        .mount(server)
        .await;

    let mut ctx = AuthContext::new(MemoryStore::new(), ClaimdeskClient::new(server.uri()));
    ctx.login("ada@example.com", "pw").await.unwrap();
    ctx
}

fn signed_out(server: &MockServer) -> AuthContext<MemoryStore> {
    AuthContext::new(MemoryStore::new(), ClaimdeskClient::new(server.uri()))
}

fn write_file(dir: &TempDir, name: &str, content: &[u8]) -> PathBuf {
    let path = dir.path().join(name);
    std::fs::write(&path, content).unwrap();
    path
}

fn text(out: Vec<u8>) -> String {
    String::from_utf8(out).unwrap()
}

// =============================================================================
// SESSION COMMANDS
// =============================================================================

#[tokio::test]
async fn test_commands_need_a_session() {
    let server = MockServer::start().await;
    let ctx = signed_out(&server);
    let mut out = Vec::new();

    let err = cmd_whoami(&ctx, &mut out, false).unwrap_err();
    assert!(matches!(err, AppError::NotSignedIn));
    assert!(err.to_string().starts_with("Not signed in"));

    let err = cmd_query(&ctx, "anything", 3, &mut out, false).await.unwrap_err();
    assert!(matches!(err, AppError::NotSignedIn));
}

#[tokio::test]
async fn test_whoami_prints_user() {
    let server = MockServer::start().await;
    let ctx = signed_in(&server, "ADMIN").await;

    let mut out = Vec::new();
    cmd_whoami(&ctx, &mut out, false).unwrap();
    let out = text(out);
    assert!(out.contains("ID:    5"));
    assert!(out.contains("Role:  ADMIN"));
}

#[tokio::test]
async fn test_logout_command_clears_store() {
    let server = MockServer::start().await;
    let mut ctx = signed_in(&server, "USER").await;
    assert!(ctx.store().get(TOKEN_KEY).unwrap().is_some());

    let mut out = Vec::new();
    cmd_logout(&mut ctx, &mut out).unwrap();

    assert_eq!(text(out), "Signed out.\n");
    assert_eq!(load_record(ctx.store()).unwrap(), None);
}

#[tokio::test]
async fn test_status_renders_backend_health() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/status"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "database_connected": true,
            "document_chunks": 128,
            "chat_history_entries": 4,
            "api_key_configured": true
        })))
        .mount(&server)
        .await;

    let ctx = signed_out(&server);
    let mut out = Vec::new();
    cmd_status(&ctx, &mut out, false).await.unwrap();

    let out = text(out);
    assert!(out.contains("Database: connected"));
    assert!(out.contains("Document chunks: 128"));
}

// =============================================================================
// DOCUMENT COMMANDS
// =============================================================================

#[tokio::test]
async fn test_upload_pdf_reports_chunks() {
    let server = MockServer::start().await;
    let ctx = signed_in(&server, "USER").await;
    Mock::given(method("POST"))
        .and(path("/upload"))
        .and(header("authorization", "Bearer tok-cli"))
        .and(body_string_contains("policy.pdf"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "message": "Processed",
            "chunks_count": 12
        })))
        .expect(1)
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let pdf = write_file(&dir, "policy.pdf", b"%PDF-1.4 body");

    let mut out = Vec::new();
    cmd_upload_pdf(&ctx, &[pdf], &mut out, false).await.unwrap();
    assert!(text(out).contains("Successfully processed 12 text chunks"));
}

#[tokio::test]
async fn test_upload_pdf_rejects_non_pdf_without_request() {
    let server = MockServer::start().await;
    let ctx = signed_in(&server, "USER").await;
    Mock::given(method("POST"))
        .and(path("/upload"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let pdf = write_file(&dir, "a.pdf", b"%PDF");
    let txt = write_file(&dir, "notes.txt", b"hello");

    let mut out = Vec::new();
    let err = cmd_upload_pdf(&ctx, &[pdf, txt], &mut out, false)
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "Only PDF files are allowed");
    assert!(text(out).contains("No files selected"));
}

#[tokio::test]
async fn test_chat_quota_failure() {
    let server = MockServer::start().await;
    let ctx = signed_in(&server, "USER").await;
    Mock::given(method("POST"))
        .and(path("/chat"))
        .respond_with(ResponseTemplate::new(429).set_body_json(serde_json::json!({
            "detail": "Too many requests"
        })))
        .mount(&server)
        .await;

    let mut out = Vec::new();
    let err = cmd_chat(&ctx, "What is covered?", &mut out, false)
        .await
        .unwrap_err();

    assert!(err.as_failure().unwrap().is_quota());
    assert_eq!(err.to_string(), QUOTA_MESSAGE);
}

#[tokio::test]
async fn test_chat_json_prints_answer() {
    let server = MockServer::start().await;
    let ctx = signed_in(&server, "USER").await;
    Mock::given(method("POST"))
        .and(path("/chat"))
        .and(body_json(serde_json::json!({ "question": "Deductible?" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "answer": "$500"
        })))
        .mount(&server)
        .await;

    let mut out = Vec::new();
    cmd_chat(&ctx, "  Deductible?  ", &mut out, true).await.unwrap();

    let value: serde_json::Value = serde_json::from_slice(&out).unwrap();
    assert_eq!(value["answer"], "$500");
}

// =============================================================================
// ANALYTICS COMMANDS
// =============================================================================

#[tokio::test]
async fn test_query_zero_rows_prints_no_results() {
    let server = MockServer::start().await;
    let ctx = signed_in(&server, "USER").await;
    Mock::given(method("POST"))
        .and(path("/text2sql"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "sql_query": "SELECT * FROM claims_list WHERE 1 = 0",
            "results": []
        })))
        .mount(&server)
        .await;

    let mut out = Vec::new();
    cmd_query(&ctx, "show nothing", 3, &mut out, false).await.unwrap();

    let out = text(out);
    assert!(out.contains(NO_RESULTS));
    assert!(!out.contains("| "));
}

#[tokio::test]
async fn test_query_renders_rows_in_backend_order() {
    let server = MockServer::start().await;
    let ctx = signed_in(&server, "USER").await;
    Mock::given(method("POST"))
        .and(path("/text2sql"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "sql_query": "SELECT status, total FROM claims_list",
            "results": [
                { "status": "DENIED", "total": 3 },
                { "status": "PAID", "total": null }
            ]
        })))
        .mount(&server)
        .await;

    let mut out = Vec::new();
    cmd_query(&ctx, "totals by status", 3, &mut out, false).await.unwrap();

    let out = text(out);
    assert!(out.contains("Results (2 rows):"));
    assert!(out.contains("| status | total |"));
    assert!(out.contains("| PAID   | N/A   |"));
}

#[tokio::test]
async fn test_query_clamps_top_k() {
    let server = MockServer::start().await;
    let ctx = signed_in(&server, "USER").await;
    let empty = serde_json::json!({ "sql_query": "SELECT 1", "results": [] });

    Mock::given(method("POST"))
        .and(path("/text2sql"))
        .and(body_json(serde_json::json!({ "question": "high", "top_k": 10 })))
        .respond_with(ResponseTemplate::new(200).set_body_json(empty.clone()))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/text2sql"))
        .and(body_json(serde_json::json!({ "question": "low", "top_k": 1 })))
        .respond_with(ResponseTemplate::new(200).set_body_json(empty))
        .expect(1)
        .mount(&server)
        .await;

    let mut out = Vec::new();
    cmd_query(&ctx, "high", 50, &mut out, false).await.unwrap();
    cmd_query(&ctx, "low", -4, &mut out, false).await.unwrap();
}

#[tokio::test]
async fn test_upload_csv_denied_for_non_admin() {
    let server = MockServer::start().await;
    let ctx = signed_in(&server, "USER").await;
    Mock::given(method("POST"))
        .and(path("/upload-csv"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let mut out = Vec::new();
    let err = cmd_upload_csv(
        &ctx,
        std::path::Path::new("claims.csv"),
        TargetTable::ClaimsList,
        &mut out,
        false,
    )
    .await
    .unwrap_err();

    assert_eq!(err.to_string(), ACCESS_DENIED);
    let out = text(out);
    assert!(out.starts_with(ACCESS_DENIED));
    assert!(out.contains("Your current role: USER"));
}

#[tokio::test]
async fn test_upload_csv_as_admin() {
    let server = MockServer::start().await;
    let ctx = signed_in(&server, "ADMIN").await;
    Mock::given(method("POST"))
        .and(path("/upload-csv"))
        .and(body_string_contains("claims_detail"))
        .and(body_string_contains("claims.csv"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "message": "Inserted 2 rows into claims_detail"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let csv = write_file(&dir, "claims.csv", b"id|status\n1|PAID\n2|DENIED\n");

    let mut out = Vec::new();
    cmd_upload_csv(&ctx, &csv, TargetTable::ClaimsDetail, &mut out, false)
        .await
        .unwrap();
    assert!(text(out).contains("Inserted 2 rows into claims_detail"));
}

// =============================================================================
// DASHBOARD
// =============================================================================

#[tokio::test]
async fn test_dashboard_chat_flow() {
    let server = MockServer::start().await;
    let mut ctx = signed_in(&server, "USER").await;
    Mock::given(method("POST"))
        .and(path("/chat"))
        .and(body_json(serde_json::json!({ "question": "What is covered?" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "answer": "No documents have been uploaded yet."
        })))
        .expect(1)
        .mount(&server)
        .await;

    let mut input: &[u8] = b"/tab chat\nWhat is covered?\n/quit\n";
    let mut out = Vec::new();
    run_dashboard(&mut ctx, &mut input, &mut out, Tab::default())
        .await
        .unwrap();

    let out = text(out);
    assert!(out.starts_with("ClaimDesk |"));
    assert!(out.contains("[Upload PDF]"));
    assert!(out.contains("[Chat]"));

    let question = out.find("You: What is covered?").unwrap();
    let answer = out
        .find("Assistant: No documents have been uploaded yet.")
        .unwrap();
    assert!(question < answer);
}

#[tokio::test]
async fn test_dashboard_csv_tab_denied_for_non_admin() {
    let server = MockServer::start().await;
    let mut ctx = signed_in(&server, "USER").await;
    Mock::given(method("POST"))
        .and(path("/upload-csv"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let mut input: &[u8] = b"/tab csv\n/add claims.csv\n/upload\n";
    let mut out = Vec::new();
    run_dashboard(&mut ctx, &mut input, &mut out, Tab::default())
        .await
        .unwrap();

    assert!(text(out).contains(ACCESS_DENIED));
}

#[tokio::test]
async fn test_dashboard_rejects_non_pdf_selection() {
    let server = MockServer::start().await;
    let mut ctx = signed_in(&server, "USER").await;

    let dir = tempfile::tempdir().unwrap();
    let pdf = write_file(&dir, "a.pdf", b"%PDF");
    let txt = write_file(&dir, "b.txt", b"text");
    let script = format!("{}\n{}\n/show\n/quit\n", pdf.display(), txt.display());

    let mut input = script.as_bytes();
    let mut out = Vec::new();
    run_dashboard(&mut ctx, &mut input, &mut out, Tab::UploadPdf)
        .await
        .unwrap();

    let out = text(out);
    assert!(out.contains("Only PDF files are allowed"));
    // The earlier selection is still listed after the rejection.
    assert!(out.rfind("[1] a.pdf").unwrap() > out.find("Only PDF files are allowed").unwrap());
}

#[tokio::test]
async fn test_dashboard_selects_paths_with_spaces() {
    let server = MockServer::start().await;
    let mut ctx = signed_in(&server, "USER").await;

    let dir = tempfile::tempdir().unwrap();
    let first = write_file(&dir, "march policy.pdf", b"%PDF");
    let second = write_file(&dir, "april policy.pdf", b"%PDF");
    let third = write_file(&dir, "may.pdf", b"%PDF");
    let script = format!(
        "/add {}\n\"{}\" {}\n/quit\n",
        first.display(),
        second.display(),
        third.display()
    );

    let mut input = script.as_bytes();
    let mut out = Vec::new();
    run_dashboard(&mut ctx, &mut input, &mut out, Tab::UploadPdf)
        .await
        .unwrap();

    let out = text(out);
    assert!(!out.contains("Cannot open"));
    assert!(out.contains("[1] march policy.pdf"));
    assert!(out.contains("[2] april policy.pdf"));
    assert!(out.contains("[3] may.pdf"));
}

#[tokio::test]
async fn test_dashboard_top_k_is_clamped() {
    let server = MockServer::start().await;
    let mut ctx = signed_in(&server, "USER").await;
    Mock::given(method("POST"))
        .and(path("/text2sql"))
        .and(body_json(serde_json::json!({ "question": "count claims", "top_k": 10 })))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "sql_query": "SELECT COUNT(*) AS n FROM claims_list",
            "results": [{ "n": 7 }]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let mut input: &[u8] = b"/top-k 99\ncount claims\n";
    let mut out = Vec::new();
    run_dashboard(&mut ctx, &mut input, &mut out, Tab::Text2Sql)
        .await
        .unwrap();

    let out = text(out);
    assert!(out.contains("top_k set to 10"));
    assert!(out.contains("| 7 |"));
}

#[tokio::test]
async fn test_dashboard_logout_clears_session() {
    let server = MockServer::start().await;
    let mut ctx = signed_in(&server, "ADMIN").await;

    let mut input: &[u8] = b"/logout\nnever read\n";
    let mut out = Vec::new();
    run_dashboard(&mut ctx, &mut input, &mut out, Tab::Chat)
        .await
        .unwrap();

    assert!(text(out).contains("Signed out."));
    assert!(ctx.user().is_none());
    assert_eq!(load_record(ctx.store()).unwrap(), None);
}

#[tokio::test]
async fn test_dashboard_requires_session() {
    let server = MockServer::start().await;
    let mut ctx = signed_out(&server);

    let mut input: &[u8] = b"/quit\n";
    let mut out = Vec::new();
    let err = run_dashboard(&mut ctx, &mut input, &mut out, Tab::default())
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::NotSignedIn));
}
