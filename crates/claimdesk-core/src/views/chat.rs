//! Chat view: a transcript of questions and assistant answers.
//!
//! The transcript is ordered by arrival. A question is appended when it is
//! submitted and its answer is appended when the reply arrives. Only one
//! question may be in flight, so every answer directly follows the question
//! that produced it.

use crate::failure::Failure;
use chrono::{DateTime, Local};

pub const TITLE: &str = "Chat with your Documents";
pub const EMPTY_HINT: &str = "Upload a PDF document and start asking questions about its content!";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sender {
    User,
    Assistant,
}

impl Sender {
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::User => "You",
            Self::Assistant => "Assistant",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatMessage {
    /// Position in the transcript, starting at 1.
    pub id: u64,
    pub text: String,
    pub sender: Sender,
    pub timestamp: DateTime<Local>,
}

#[derive(Debug, Clone, Default)]
pub struct ChatView {
    messages: Vec<ChatMessage>,
    next_id: u64,
    pending: bool,
    error: Option<String>,
}

impl ChatView {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.pending
    }

    #[must_use]
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    fn push(&mut self, sender: Sender, text: String, now: DateTime<Local>) {
        self.next_id = self.next_id.saturating_add(1);
        self.messages.push(ChatMessage {
            id: self.next_id,
            text,
            sender,
            timestamp: now,
        });
    }

    /// Submit a question.
    ///
    /// Returns the trimmed question to send, or `None` when the input is blank
    /// or an answer is still pending.
    pub fn submit(&mut self, input: &str, now: DateTime<Local>) -> Option<String> {
        let question = input.trim();
        if question.is_empty() || self.pending {
            return None;
        }
        let question = question.to_string();
        self.push(Sender::User, question.clone(), now);
        self.pending = true;
        self.error = None;
        Some(question)
    }

    /// Append the assistant's answer to the pending question.
    pub fn receive(&mut self, answer: String, now: DateTime<Local>) {
        self.pending = false;
        self.push(Sender::Assistant, answer, now);
    }

    /// Record a failed question. The question stays in the transcript.
    pub fn fail(&mut self, failure: &Failure) {
        self.pending = false;
        self.error = Some(failure.message().to_string());
    }

    #[must_use]
    pub fn render(&self) -> String {
        let mut out = String::new();
        out.push_str(TITLE);
        out.push('\n');
        out.push_str("Ask questions about the content of your uploaded PDF files\n");

        if self.messages.is_empty() {
            out.push_str(EMPTY_HINT);
            out.push('\n');
        } else {
            for msg in &self.messages {
                out.push_str(&format_message(msg));
            }
        }

        if self.pending {
            out.push_str("Assistant is typing...\n");
        }
        if let Some(err) = &self.error {
            out.push_str(&format!("Error: {}\n", err));
        }
        out
    }
}

/// `[HH:MM] Sender: text`
#[must_use]
pub fn format_message(msg: &ChatMessage) -> String {
    format!(
        "[{}] {}: {}\n",
        msg.timestamp.format("%H:%M"),
        msg.sender.label(),
        msg.text
    )
}

// =============================================================================
// TESTS
// =============================================================================
