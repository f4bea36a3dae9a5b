//! Chat panel: an append-only local log with a simulated reply.

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;

pub const AUTO_REPLY: &str = "Thanks for your message!";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageKind {
    Sent,
    Received,
    System,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessage {
    pub kind: MessageKind,
    pub text: String,
    pub posted_at: DateTime<Utc>,
}

/// Panel contents with the entry the page should scroll to.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatView {
    pub messages: Vec<ChatMessage>,
    pub scroll_to: Option<usize>,
}

/// A reply owed for a sent message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PendingReply {
    pub due_in: Duration,
}

pub struct ChatPanel {
    messages: Vec<ChatMessage>,
    reply_delay: Duration,
}

impl ChatPanel {
    pub fn new(reply_delay: Duration) -> Self {
        Self {
            messages: Vec::new(),
            reply_delay,
        }
    }

    /// Post the user's message. Blank input is ignored and owes no reply.
    pub fn send(&mut self, text: &str, now: DateTime<Utc>) -> Option<PendingReply> {
        let text = text.trim();
        if text.is_empty() {
            return None;
        }

        self.append(MessageKind::Sent, text, now);
        Some(PendingReply {
            due_in: self.reply_delay,
        })
    }

    /// Append the simulated reply.
    pub fn deliver_reply(&mut self, now: DateTime<Utc>) {
        self.append(MessageKind::Received, AUTO_REPLY, now);
    }

    pub fn system_message(&mut self, text: impl Into<String>, now: DateTime<Utc>) {
        self.append(MessageKind::System, text, now);
    }

    /// Announce a shared file by name. Returns false when no file was named.
    pub fn announce_file(&mut self, file_name: &str, now: DateTime<Utc>) -> bool {
        let file_name = file_name.trim();
        if file_name.is_empty() {
            return false;
        }
        self.system_message(format!("File shared: {}", file_name), now);
        true
    }

    fn append(&mut self, kind: MessageKind, text: impl Into<String>, now: DateTime<Utc>) {
        let text = text.into();
        tracing::debug!(?kind, "chat: {}", text);
        self.messages.push(ChatMessage {
            kind,
            text,
            posted_at: now,
        });
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn view(&self) -> ChatView {
        ChatView {
            messages: self.messages.clone(),
            scroll_to: self.messages.len().checked_sub(1),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_input_is_ignored() {
        let mut chat = ChatPanel::new(Duration::from_millis(1000));
        assert!(chat.send("   ", Utc::now()).is_none());
        assert!(chat.messages().is_empty());
        assert_eq!(chat.view().scroll_to, None);
    }

    #[test]
    fn test_send_then_reply() {
        let mut chat = ChatPanel::new(Duration::from_millis(250));
        let pending = chat.send("  hello class  ", Utc::now()).unwrap();
        assert_eq!(pending.due_in, Duration::from_millis(250));

        chat.deliver_reply(Utc::now());
        let view = chat.view();
        assert_eq!(view.messages[0].kind, MessageKind::Sent);
        assert_eq!(view.messages[0].text, "hello class");
        assert_eq!(view.messages[1].kind, MessageKind::Received);
        assert_eq!(view.messages[1].text, AUTO_REPLY);
        assert_eq!(view.scroll_to, Some(1));
    }

    #[test]
    fn test_system_messages_append() {
        let mut chat = ChatPanel::new(Duration::ZERO);
        chat.system_message("Ada has joined the classroom", Utc::now());
        assert_eq!(chat.messages()[0].kind, MessageKind::System);
    }

    #[test]
    fn test_announce_file() {
        let mut chat = ChatPanel::new(Duration::ZERO);
        assert!(!chat.announce_file("", Utc::now()));
        assert!(chat.announce_file("notes.pdf", Utc::now()));
        assert_eq!(chat.messages().len(), 1);
        assert_eq!(chat.messages()[0].text, "File shared: notes.pdf");
    }
}
