//! Interactive dashboard.
//!
//! A line-oriented shell over [`Dashboard`]. Lines starting with `/` are
//! commands; any other line is input for the active tab (a chat question, a
//! SQL question, or file paths to select).

use crate::auth::AuthContext;
use crate::drive;
use crate::error::AppError;
use claimdesk_core::failure::Failure;
use claimdesk_core::views::{Dashboard, Tab, TargetTable};
use claimdesk_core::KeyValueStore;
use std::io::Write;
use std::path::{Path, PathBuf};
use tokio::io::{AsyncBufRead, AsyncBufReadExt};

const PROMPT: &str = "> ";

const GENERAL_HELP: &str = "\
Commands:
  /tab <name>   switch tab (upload, chat, query, csv)
  /show         redraw the dashboard
  /logout       sign out and leave
  /quit         leave the dashboard
  /help         this help
";

fn tab_help(tab: Tab) -> &'static str {
    match tab {
        Tab::UploadPdf => {
            "\
Upload PDF:
  <paths...>    add PDF files (same as /add), quote paths with spaces
  /remove <n>   remove the n-th selected file
  /clear        clear the selection
  /upload       upload the selected files
"
        }
        Tab::Chat => {
            "\
Chat:
  <question>    ask about your uploaded documents
"
        }
        Tab::Text2Sql => {
            "\
Text to SQL:
  <question>    ask about the claims database
  /top-k <n>    query retries sent with each question (1-10)
"
        }
        Tab::CsvUpload => {
            "\
Upload CSV (administrators):
  <path>        select a CSV file (same as /add)
  /table <name> target table (claims_list, claims_detail)
  /clear        clear the selection
  /upload       upload the selected file
"
        }
    }
}

/// What the loop does after a line.
enum Next {
    Continue,
    Leave,
}

/// Run the dashboard until `/quit`, `/logout`, or end of input.
///
/// The dashboard and its views are dropped on return.
pub async fn run_dashboard<S, R, W>(
    ctx: &mut AuthContext<S>,
    input: &mut R,
    out: &mut W,
    start: Tab,
) -> Result<(), AppError>
where
    S: KeyValueStore,
    R: AsyncBufRead + Unpin,
    W: Write + ?Sized,
{
    let user = ctx.require_user()?.clone();
    let mut dash = Dashboard::new(user);
    dash.switch_to(start);

    write!(out, "{}", dash.render())?;
    writeln!(out, "Type /help for commands.")?;

    let mut line = String::new();
    loop {
        write!(out, "{}", PROMPT)?;
        out.flush()?;

        line.clear();
        if input.read_line(&mut line).await? == 0 {
            break;
        }
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }

        let next = if let Some(command) = trimmed.strip_prefix('/') {
            run_command(ctx, &mut dash, command, out).await?
        } else {
            submit(ctx, &mut dash, trimmed, out).await?;
            Next::Continue
        };
        if let Next::Leave = next {
            break;
        }
    }

    tracing::debug!("dashboard closed");
    Ok(())
}

async fn run_command<S, W>(
    ctx: &mut AuthContext<S>,
    dash: &mut Dashboard,
    command: &str,
    out: &mut W,
) -> Result<Next, AppError>
where
    S: KeyValueStore,
    W: Write + ?Sized,
{
    let (name, arg) = match command.split_once(char::is_whitespace) {
        Some((name, arg)) => (name, arg.trim()),
        None => (command, ""),
    };

    match name {
        "quit" | "exit" => return Ok(Next::Leave),
        "help" => {
            write!(out, "{}{}", GENERAL_HELP, tab_help(dash.active_tab()))?;
        }
        "show" => write!(out, "{}", dash.render())?,
        "logout" => {
            ctx.logout()?;
            writeln!(out, "Signed out.")?;
            return Ok(Next::Leave);
        }
        "tab" => match arg.parse::<Tab>() {
            Ok(tab) => {
                dash.switch_to(tab);
                write!(out, "{}", dash.render())?;
            }
            Err(failure) => writeln!(out, "{}", failure)?,
        },
        "add" => select(dash, arg, out)?,
        "remove" => remove(dash, arg, out)?,
        "clear" => {
            match dash.active_tab() {
                Tab::UploadPdf => dash.upload.clear(),
                Tab::CsvUpload => dash.csv.clear(),
                tab => return unsupported(tab, name, out),
            }
            render_active(dash, out)?;
        }
        "upload" => upload(ctx, dash, out).await?,
        "top-k" => {
            if dash.active_tab() != Tab::Text2Sql {
                return unsupported(dash.active_tab(), name, out);
            }
            match arg.parse::<i64>() {
                Ok(n) => {
                    dash.text2sql.set_top_k(n);
                    writeln!(out, "top_k set to {}", dash.text2sql.top_k())?;
                }
                Err(_) => writeln!(out, "Usage: /top-k <number>")?,
            }
        }
        "table" => {
            if dash.active_tab() != Tab::CsvUpload {
                return unsupported(dash.active_tab(), name, out);
            }
            let result = arg
                .parse::<TargetTable>()
                .and_then(|table| dash.csv.set_table(table));
            if let Err(failure) = result {
                writeln!(out, "{}", failure)?;
            }
            render_active(dash, out)?;
        }
        other => writeln!(out, "Unknown command: /{}. Type /help for commands.", other)?,
    }
    Ok(Next::Continue)
}

fn unsupported<W: Write + ?Sized>(tab: Tab, name: &str, out: &mut W) -> Result<Next, AppError> {
    writeln!(out, "/{} is not available on the {} tab.", name, tab)?;
    Ok(Next::Continue)
}

fn render_active<W: Write + ?Sized>(dash: &Dashboard, out: &mut W) -> Result<(), AppError> {
    let body = match dash.active_tab() {
        Tab::UploadPdf => dash.upload.render(),
        Tab::Chat => dash.chat.render(),
        Tab::Text2Sql => dash.text2sql.render(),
        Tab::CsvUpload => dash.csv.render(),
    };
    write!(out, "{}", body)?;
    Ok(())
}

/// Plain input for the active tab.
async fn submit<S, W>(
    ctx: &AuthContext<S>,
    dash: &mut Dashboard,
    text: &str,
    out: &mut W,
) -> Result<(), AppError>
where
    S: KeyValueStore,
    W: Write + ?Sized,
{
    match dash.active_tab() {
        Tab::UploadPdf | Tab::CsvUpload => return select(dash, text, out),
        Tab::Chat => {
            if let Err(failure) = drive::chat(&mut dash.chat, ctx.client(), text).await {
                tracing::debug!(error = %failure, "chat request failed");
            }
        }
        Tab::Text2Sql => {
            dash.text2sql.set_question(text);
            if let Err(failure) = drive::text2sql(&mut dash.text2sql, ctx.client()).await {
                tracing::debug!(error = %failure, "text-to-SQL request failed");
            }
        }
    }
    render_active(dash, out)
}

/// Paths named on one input line.
///
/// A line naming an existing file is taken whole, so unquoted paths with
/// spaces work. Otherwise paths are split on whitespace and double quotes
/// group a path that contains spaces.
fn split_paths(text: &str) -> Vec<PathBuf> {
    let whole = Path::new(text);
    if whole.is_file() {
        return vec![whole.to_path_buf()];
    }

    let mut paths = Vec::new();
    let mut current = String::new();
    let mut quoted = false;
    for c in text.chars() {
        match c {
            '"' => quoted = !quoted,
            c if c.is_whitespace() && !quoted => {
                if !current.is_empty() {
                    paths.push(PathBuf::from(std::mem::take(&mut current)));
                }
            }
            c => current.push(c),
        }
    }
    if !current.is_empty() {
        paths.push(PathBuf::from(current));
    }
    paths
}

/// Select files named in `paths` on the upload tabs.
fn select<W: Write + ?Sized>(dash: &mut Dashboard, paths: &str, out: &mut W) -> Result<(), AppError> {
    let tab = dash.active_tab();
    if !matches!(tab, Tab::UploadPdf | Tab::CsvUpload) {
        unsupported(tab, "add", out)?;
        return Ok(());
    }
    if paths.is_empty() {
        writeln!(out, "Usage: /add <path>")?;
        return Ok(());
    }

    let described = split_paths(paths)
        .iter()
        .map(|p| drive::describe(p))
        .collect::<Result<Vec<_>, Failure>>();

    let result = described.and_then(|mut files| match tab {
        Tab::CsvUpload => {
            if files.len() != 1 {
                return Err(Failure::validation("Select exactly one CSV file"));
            }
            let file = files.remove(0);
            dash.csv.select(file)
        }
        _ => dash.upload.select(files),
    });
    if let Err(failure) = result {
        tracing::debug!(error = %failure, "selection rejected");
        writeln!(out, "{}", failure)?;
    }
    render_active(dash, out)
}

fn remove<W: Write + ?Sized>(dash: &mut Dashboard, arg: &str, out: &mut W) -> Result<(), AppError> {
    if dash.active_tab() != Tab::UploadPdf {
        unsupported(dash.active_tab(), "remove", out)?;
        return Ok(());
    }
    match arg.parse::<usize>() {
        Ok(n) if n >= 1 && dash.upload.remove(n - 1).is_some() => render_active(dash, out),
        _ => {
            writeln!(out, "Usage: /remove <n> (1-{})", dash.upload.selected().len())?;
            Ok(())
        }
    }
}

async fn upload<S, W>(ctx: &AuthContext<S>, dash: &mut Dashboard, out: &mut W) -> Result<(), AppError>
where
    S: KeyValueStore,
    W: Write + ?Sized,
{
    let outcome = match dash.active_tab() {
        Tab::UploadPdf => drive::pdf_upload(&mut dash.upload, ctx.client())
            .await
            .map(|resp| resp.is_some()),
        Tab::CsvUpload => drive::csv_upload(&mut dash.csv, ctx.client())
            .await
            .map(|resp| resp.is_some()),
        tab => {
            unsupported(tab, "upload", out)?;
            return Ok(());
        }
    };

    match outcome {
        Ok(false) => writeln!(out, "Nothing to upload. Select files first.")?,
        Ok(true) => {}
        Err(failure) => tracing::debug!(error = %failure, "upload failed"),
    }
    render_active(dash, out)
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn split_paths_on_whitespace() {
        assert_eq!(
            split_paths("a.pdf  b.pdf"),
            vec![PathBuf::from("a.pdf"), PathBuf::from("b.pdf")]
        );
    }

    #[test]
    fn quotes_group_paths_with_spaces() {
        assert_eq!(
            split_paths(r#""my docs/policy 1.pdf" other.pdf"#),
            vec![PathBuf::from("my docs/policy 1.pdf"), PathBuf::from("other.pdf")]
        );
    }

    #[test]
    fn existing_file_is_taken_whole() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("claims march.csv");
        std::fs::write(&path, "id|status\n").unwrap();

        let line = path.display().to_string();
        assert_eq!(split_paths(&line), vec![path]);
    }
}
