//! # CLI Module
//!
//! Command-line interface for the ClaimDesk client.
//!
//! Each command performs its request once and prints the outcome. With
//! `--json` the raw backend response is printed instead of the rendered view.
//! The `cmd_*` functions take the session context and an output sink so they
//! can be driven from tests.

pub mod dashboard;

use crate::auth::AuthContext;
use crate::config::{Config, ConfigArgs};
use crate::drive;
use crate::error::AppError;
use claimdesk_core::failure::{Failure, fallback};
use claimdesk_core::validate::{DEFAULT_TOP_K, require_text};
use claimdesk_core::views::csv_upload::ACCESS_DENIED;
use claimdesk_core::views::text2sql::render_result;
use claimdesk_core::views::{ChatView, CsvUploadView, PdfUploadView, Tab, TargetTable, Text2SqlView};
use claimdesk_core::KeyValueStore;
use claimdesk_sdk::ClaimdeskClient;
use clap::{Parser, Subcommand};
use serde::Serialize;
use std::io::Write;
use std::path::PathBuf;

pub use dashboard::run_dashboard;

// =============================================================================
// ARGUMENTS
// =============================================================================

/// ClaimDesk - document chat and claims analytics from the terminal.
#[derive(Debug, Parser)]
#[command(name = "claimdesk", version, about)]
pub struct Cli {
    #[command(flatten)]
    pub config: ConfigArgs,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Print raw JSON responses
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Create an account
    Signup {
        #[arg(long)]
        username: String,
        #[arg(long)]
        email: String,
        #[arg(long, env = "CLAIMDESK_PASSWORD", hide_env_values = true)]
        password: String,
    },

    /// Sign in and store the session
    Login {
        #[arg(long)]
        email: String,
        #[arg(long, env = "CLAIMDESK_PASSWORD", hide_env_values = true)]
        password: String,
    },

    /// Clear the stored session
    Logout,

    /// Show the signed-in user
    Whoami,

    /// Show backend status
    Status,

    /// Upload PDF documents for chat
    UploadPdf {
        /// PDF files to upload
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },

    /// Ask a question about uploaded documents (interactive when omitted)
    Chat { question: Option<String> },

    /// Ask a question about the claims database
    Query {
        question: String,
        /// Query retries sent to the backend (1-10)
        #[arg(long, default_value_t = i64::from(DEFAULT_TOP_K), allow_negative_numbers = true)]
        top_k: i64,
    },

    /// Upload a CSV into a claims table (administrators only)
    UploadCsv {
        file: PathBuf,
        /// Target table: claims_list or claims_detail
        #[arg(long, default_value = "claims_list")]
        table: TargetTable,
    },

    /// Open the interactive tabbed dashboard
    Dashboard,
}

impl Command {
    /// Whether the stored session must be restored before running.
    #[must_use]
    pub fn restores_session(&self) -> bool {
        !matches!(
            self,
            Self::Signup { .. } | Self::Login { .. } | Self::Logout
        )
    }
}

// =============================================================================
// ENTRY POINT
// =============================================================================

/// Build the session context from configuration and run the command.
pub async fn run(cli: Cli) -> Result<(), AppError> {
    let config = Config::resolve(&cli.config);
    let store = config.open_store()?;
    let client = ClaimdeskClient::new(config.api_url.clone());
    let mut ctx = AuthContext::new(store, client);

    if cli.command.restores_session() {
        ctx.initialize().await?;
    }

    let mut stdout = std::io::stdout();
    dispatch(&mut ctx, cli.command, &mut stdout, cli.json).await
}

/// Run one command against an existing context.
pub async fn dispatch<S: KeyValueStore>(
    ctx: &mut AuthContext<S>,
    command: Command,
    out: &mut impl Write,
    json: bool,
) -> Result<(), AppError> {
    match command {
        Command::Signup {
            username,
            email,
            password,
        } => cmd_signup(ctx, &username, &email, &password, out, json).await,
        Command::Login { email, password } => cmd_login(ctx, &email, &password, out, json).await,
        Command::Logout => cmd_logout(ctx, out),
        Command::Whoami => cmd_whoami(ctx, out, json),
        Command::Status => cmd_status(ctx, out, json).await,
        Command::UploadPdf { files } => cmd_upload_pdf(ctx, &files, out, json).await,
        Command::Chat {
            question: Some(question),
        } => cmd_chat(ctx, &question, out, json).await,
        Command::Chat { question: None } => {
            let mut input = tokio::io::BufReader::new(tokio::io::stdin());
            run_dashboard(ctx, &mut input, out, Tab::Chat).await
        }
        Command::Query { question, top_k } => cmd_query(ctx, &question, top_k, out, json).await,
        Command::UploadCsv { file, table } => cmd_upload_csv(ctx, &file, table, out, json).await,
        Command::Dashboard => {
            let mut input = tokio::io::BufReader::new(tokio::io::stdin());
            run_dashboard(ctx, &mut input, out, Tab::default()).await
        }
    }
}

fn print_json<T: Serialize>(out: &mut impl Write, value: &T) -> Result<(), AppError> {
    writeln!(out, "{}", serde_json::to_string_pretty(value)?)?;
    Ok(())
}

// =============================================================================
// ACCOUNT COMMANDS
// =============================================================================

pub async fn cmd_signup<S: KeyValueStore>(
    ctx: &mut AuthContext<S>,
    username: &str,
    email: &str,
    password: &str,
    out: &mut impl Write,
    json: bool,
) -> Result<(), AppError> {
    let outcome = ctx.signup(username, email, password).await?;

    if json {
        return print_json(
            out,
            &serde_json::json!({
                "message": outcome.message,
                "signed_in": outcome.signed_in,
            }),
        );
    }

    if let Some(message) = &outcome.message {
        writeln!(out, "{}", message)?;
    }
    if outcome.signed_in {
        let user = ctx.require_user()?;
        writeln!(out, "Account created. Signed in as user {} ({}).", user.record.user_id, user.role())?;
    } else {
        writeln!(out, "Account created. Run `claimdesk login` to sign in.")?;
    }
    Ok(())
}

pub async fn cmd_login<S: KeyValueStore>(
    ctx: &mut AuthContext<S>,
    email: &str,
    password: &str,
    out: &mut impl Write,
    json: bool,
) -> Result<(), AppError> {
    let user = ctx.login(email, password).await?;

    if json {
        return print_json(
            out,
            &serde_json::json!({
                "user_id": user.record.user_id,
                "role": user.role(),
            }),
        );
    }
    writeln!(out, "Signed in as user {} ({}).", user.record.user_id, user.role())?;
    Ok(())
}

pub fn cmd_logout<S: KeyValueStore>(
    ctx: &mut AuthContext<S>,
    out: &mut impl Write,
) -> Result<(), AppError> {
    ctx.logout()?;
    writeln!(out, "Signed out.")?;
    Ok(())
}

pub fn cmd_whoami<S: KeyValueStore>(
    ctx: &AuthContext<S>,
    out: &mut impl Write,
    json: bool,
) -> Result<(), AppError> {
    let user = ctx.require_user()?;

    if json {
        return print_json(
            out,
            &serde_json::json!({
                "user_id": user.record.user_id,
                "role": user.role(),
                "profile": user.profile,
            }),
        );
    }

    writeln!(out, "User:  {}", user.display_name())?;
    writeln!(out, "ID:    {}", user.record.user_id)?;
    writeln!(out, "Role:  {}", user.role())?;
    if let Some(email) = user.profile.as_ref().and_then(|p| p.email.as_deref()) {
        writeln!(out, "Email: {}", email)?;
    }
    Ok(())
}

pub async fn cmd_status<S: KeyValueStore>(
    ctx: &AuthContext<S>,
    out: &mut impl Write,
    json: bool,
) -> Result<(), AppError> {
    let status = ctx
        .client()
        .status()
        .await
        .map_err(|e| e.failure(fallback::STATUS))?;

    if json {
        return print_json(out, &status);
    }
    write!(out, "{}", status.to_text())?;
    Ok(())
}

// =============================================================================
// DOCUMENT COMMANDS
// =============================================================================

pub async fn cmd_upload_pdf<S: KeyValueStore>(
    ctx: &AuthContext<S>,
    files: &[PathBuf],
    out: &mut impl Write,
    json: bool,
) -> Result<(), AppError> {
    ctx.require_user()?;

    let mut view = PdfUploadView::new();
    let selected = files
        .iter()
        .map(|p| drive::describe(p.as_path()))
        .collect::<Result<Vec<_>, Failure>>()?;
    if let Err(failure) = view.select(selected) {
        write!(out, "{}", view.render())?;
        return Err(failure.into());
    }

    let resp = drive::pdf_upload(&mut view, ctx.client()).await?;
    match resp {
        Some(resp) if json => print_json(out, &resp),
        _ => {
            write!(out, "{}", view.render())?;
            Ok(())
        }
    }
}

pub async fn cmd_chat<S: KeyValueStore>(
    ctx: &AuthContext<S>,
    question: &str,
    out: &mut impl Write,
    json: bool,
) -> Result<(), AppError> {
    ctx.require_user()?;
    let question = require_text("Question", question)?;

    let mut view = ChatView::new();
    let answer = drive::chat(&mut view, ctx.client(), question).await?;
    match answer {
        Some(answer) if json => print_json(out, &serde_json::json!({ "answer": answer })),
        _ => {
            write!(out, "{}", view.render())?;
            Ok(())
        }
    }
}

// =============================================================================
// ANALYTICS COMMANDS
// =============================================================================

pub async fn cmd_query<S: KeyValueStore>(
    ctx: &AuthContext<S>,
    question: &str,
    top_k: i64,
    out: &mut impl Write,
    json: bool,
) -> Result<(), AppError> {
    ctx.require_user()?;
    let question = require_text("Question", question)?;

    let mut view = Text2SqlView::new();
    view.set_question(question);
    view.set_top_k(top_k);

    let resp = drive::text2sql(&mut view, ctx.client()).await?;
    match resp {
        Some(resp) if json => print_json(out, &resp),
        Some(resp) => {
            write!(out, "{}", render_result(&resp))?;
            Ok(())
        }
        None => Ok(()),
    }
}

/// Upload a CSV. Non-administrators see the access-denied notice and no
/// request is made.
pub async fn cmd_upload_csv<S: KeyValueStore>(
    ctx: &AuthContext<S>,
    file: &std::path::Path,
    table: TargetTable,
    out: &mut impl Write,
    json: bool,
) -> Result<(), AppError> {
    let user = ctx.require_user()?;

    let mut view = CsvUploadView::new(Some(user.role().clone()));
    if !view.is_admin() {
        write!(out, "{}", view.render())?;
        return Err(Failure::validation(ACCESS_DENIED).into());
    }

    view.set_table(table)?;
    let selected = drive::describe(file)?;
    if let Err(failure) = view.select(selected) {
        write!(out, "{}", view.render())?;
        return Err(failure.into());
    }

    let resp = drive::csv_upload(&mut view, ctx.client()).await?;
    match resp {
        Some(resp) if json => print_json(out, &resp),
        _ => {
            write!(out, "{}", view.render())?;
            Ok(())
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================
