//! In-room chat with the AI tutor
//!
//! Messages live only in memory for the lifetime of the room view. Each user
//! message schedules a tutor reply that becomes visible after a short delay.

use std::time::{Duration, Instant};

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

/// Delay before the tutor's reply shows up
pub const REPLY_DELAY: Duration = Duration::from_millis(1500);

pub const WELCOME_MESSAGE: &str = "Welcome to your AI tutoring session! I'm here to help you learn. \
What would you like to work on today?";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Sender {
    User,
    Ai,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub id: String,
    pub text: String,
    pub sender: Sender,
    pub timestamp: DateTime<Local>,
}

impl ChatMessage {
    fn new(text: impl Into<String>, sender: Sender) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            text: text.into(),
            sender,
            timestamp: Local::now(),
        }
    }
}

#[derive(Debug)]
struct PendingReply {
    due: Instant,
    text: String,
}

#[derive(Debug)]
pub struct ChatLog {
    messages: Vec<ChatMessage>,
    pending: Vec<PendingReply>,
    reply_delay: Duration,
}

impl Default for ChatLog {
    fn default() -> Self {
        Self::new()
    }
}

impl ChatLog {
    /// Chat seeded with the tutor's welcome message
    pub fn new() -> Self {
        Self::with_reply_delay(REPLY_DELAY)
    }

    pub fn with_reply_delay(reply_delay: Duration) -> Self {
        Self {
            messages: vec![ChatMessage::new(WELCOME_MESSAGE, Sender::Ai)],
            pending: Vec::new(),
            reply_delay,
        }
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn is_awaiting_reply(&self) -> bool {
        !self.pending.is_empty()
    }

    /// Post a user message; blank input is ignored
    pub fn send(&mut self, text: &str, now: Instant) -> Option<&ChatMessage> {
        if text.trim().is_empty() {
            return None;
        }

        self.pending.push(PendingReply {
            due: now + self.reply_delay,
            text: tutor_reply(text),
        });
        self.messages.push(ChatMessage::new(text, Sender::User));
        self.messages.last()
    }

    /// Deliver every reply that is due; returns how many arrived
    pub fn poll_replies(&mut self, now: Instant) -> usize {
        let (due, waiting): (Vec<_>, Vec<_>) = self.pending.drain(..).partition(|p| p.due <= now);
        self.pending = waiting;

        let delivered = due.len();
        self.messages
            .extend(due.into_iter().map(|p| ChatMessage::new(p.text, Sender::Ai)));
        delivered
    }
}

fn tutor_reply(text: &str) -> String {
    format!(
        "I understand you said \"{}\". Let me help you with that. \
What specific aspect would you like to explore further?",
        text
    )
}
