//! Dashboard: tab navigation over the views, plus top-level routing.

use super::{ChatView, CsvUploadView, PdfUploadView, Text2SqlView};
use crate::failure::Failure;
use crate::session::CurrentUser;
use std::fmt;
use std::str::FromStr;

/// Dashboard tabs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Tab {
    #[default]
    UploadPdf,
    Chat,
    Text2Sql,
    CsvUpload,
}

impl Tab {
    pub const ALL: [Self; 4] = [Self::UploadPdf, Self::Chat, Self::Text2Sql, Self::CsvUpload];

    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::UploadPdf => "Upload PDF",
            Self::Chat => "Chat",
            Self::Text2Sql => "Text to SQL",
            Self::CsvUpload => "Upload CSV",
        }
    }

    /// Short name used on the command line.
    #[must_use]
    pub fn short_name(self) -> &'static str {
        match self {
            Self::UploadPdf => "upload",
            Self::Chat => "chat",
            Self::Text2Sql => "query",
            Self::CsvUpload => "csv",
        }
    }
}

impl fmt::Display for Tab {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Tab {
    type Err = Failure;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|t| t.short_name() == wanted || t.label().to_ascii_lowercase() == wanted)
            .ok_or_else(|| {
                Failure::validation(format!(
                    "Unknown tab '{}'. Expected one of: upload, chat, query, csv",
                    s.trim()
                ))
            })
    }
}

// =============================================================================
// ROUTING
// =============================================================================

/// Top-level screen for the current session state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    /// Session restore still in progress.
    Loading,
    /// Signed out: login or signup.
    Auth,
    /// Signed in.
    Dashboard,
}

impl Route {
    #[must_use]
    pub fn resolve(initializing: bool, user: Option<&CurrentUser>) -> Self {
        match (initializing, user) {
            (true, _) => Self::Loading,
            (false, Some(_)) => Self::Dashboard,
            (false, None) => Self::Auth,
        }
    }
}

// =============================================================================
// DASHBOARD
// =============================================================================

/// The signed-in screen. Owns one instance of every view.
#[derive(Debug, Clone)]
pub struct Dashboard {
    user: CurrentUser,
    active: Tab,
    pub upload: PdfUploadView,
    pub chat: ChatView,
    pub text2sql: Text2SqlView,
    pub csv: CsvUploadView,
}

impl Dashboard {
    #[must_use]
    pub fn new(user: CurrentUser) -> Self {
        let csv = CsvUploadView::new(Some(user.role().clone()));
        Self {
            user,
            active: Tab::default(),
            upload: PdfUploadView::new(),
            chat: ChatView::new(),
            text2sql: Text2SqlView::new(),
            csv,
        }
    }

    #[must_use]
    pub fn user(&self) -> &CurrentUser {
        &self.user
    }

    #[must_use]
    pub fn active_tab(&self) -> Tab {
        self.active
    }

    pub fn switch_to(&mut self, tab: Tab) {
        self.active = tab;
    }

    /// Header line plus the tab strip, active tab bracketed.
    #[must_use]
    pub fn render_header(&self) -> String {
        let tabs: Vec<String> = Tab::ALL
            .iter()
            .map(|t| {
                if *t == self.active {
                    format!("[{}]", t.label())
                } else {
                    format!(" {} ", t.label())
                }
            })
            .collect();
        format!(
            "ClaimDesk | {} ({})\n{}\n",
            self.user.display_name(),
            self.user.role(),
            tabs.join(" ")
        )
    }

    /// Header plus the active view.
    #[must_use]
    pub fn render(&self) -> String {
        let body = match self.active {
            Tab::UploadPdf => self.upload.render(),
            Tab::Chat => self.chat.render(),
            Tab::Text2Sql => self.text2sql.render(),
            Tab::CsvUpload => self.csv.render(),
        };
        format!("{}\n{}", self.render_header(), body)
    }
}

// =============================================================================
// TESTS
// =============================================================================
