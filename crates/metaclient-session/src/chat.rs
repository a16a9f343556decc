//! The chat transcript.
//!
//! Everything the user sees about the session goes through here: messages
//! from other players, but also every system notice (connection lost,
//! player joined, server errors). There is no separate error channel.

use std::time::{SystemTime, UNIX_EPOCH};

use metaclient_protocol::ProtocolError;
use serde::{Deserialize, Serialize};

/// Shown as the sender of a non-system message that arrived without one.
pub const UNKNOWN_SENDER: &str = "<unknown>";

/// How a message was delivered. The UI decides how each one looks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChatChannel {
    /// Generated by the client or the metaserver itself.
    System,
    /// Addressed to one user.
    Private,
    /// Visible to the whole lobby.
    Public,
}

impl ChatChannel {
    /// Parses the type field of a server `CHAT` packet.
    ///
    /// # Errors
    /// [`ProtocolError::InvalidChatType`] for anything but `public`,
    /// `private` or `system`.
    pub fn from_wire(value: &str) -> Result<Self, ProtocolError> {
        match value {
            "public" => Ok(ChatChannel::Public),
            "private" => Ok(ChatChannel::Private),
            "system" => Ok(ChatChannel::System),
            other => Err(ProtocolError::InvalidChatType(other.to_owned())),
        }
    }
}

/// One line of the transcript. Never modified once created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Who wrote it. Empty for system messages.
    pub sender: String,
    /// Who it was addressed to. Empty for public and system messages.
    pub recipient: String,
    pub channel: ChatChannel,
    /// Local arrival time, seconds since the Unix epoch.
    pub timestamp: u64,
    pub body: String,
}

impl ChatMessage {
    /// A message generated locally or by the metaserver.
    pub fn system(body: impl Into<String>) -> Self {
        Self {
            sender: String::new(),
            recipient: String::new(),
            channel: ChatChannel::System,
            timestamp: unix_now(),
            body: body.into(),
        }
    }

    /// A message written by a user. An empty `recipient` means public.
    pub fn user(
        sender: impl Into<String>,
        recipient: impl Into<String>,
        body: impl Into<String>,
    ) -> Self {
        let sender = sender.into();
        let recipient = recipient.into();
        Self {
            sender: if sender.is_empty() {
                UNKNOWN_SENDER.to_string()
            } else {
                sender
            },
            channel: if recipient.is_empty() {
                ChatChannel::Public
            } else {
                ChatChannel::Private
            },
            recipient,
            timestamp: unix_now(),
            body: body.into(),
        }
    }

    /// `true` for system notices.
    pub fn is_system(&self) -> bool {
        self.channel == ChatChannel::System
    }
}

/// Append-only list of chat messages in arrival order.
#[derive(Debug, Clone, Default)]
pub struct ChatLog {
    messages: Vec<ChatMessage>,
}

impl ChatLog {
    pub fn push(&mut self, message: ChatMessage) {
        self.messages.push(message);
    }

    /// Every message so far.
    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    /// Messages after the first `seen`. Lets a UI keep a cursor instead of
    /// re-rendering the whole transcript.
    pub fn since(&self, seen: usize) -> &[ChatMessage] {
        self.messages.get(seen..).unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}

pub(crate) fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_wire_accepts_three_channels() {
        assert_eq!(ChatChannel::from_wire("public").unwrap(), ChatChannel::Public);
        assert_eq!(ChatChannel::from_wire("private").unwrap(), ChatChannel::Private);
        assert_eq!(ChatChannel::from_wire("system").unwrap(), ChatChannel::System);
    }

    #[test]
    fn test_from_wire_rejects_other_types() {
        let result = ChatChannel::from_wire("shout");
        assert!(matches!(result, Err(ProtocolError::InvalidChatType(t)) if t == "shout"));
    }

    #[test]
    fn test_user_message_with_recipient_is_private() {
        let msg = ChatMessage::user("alice", "bob", "psst");
        assert_eq!(msg.channel, ChatChannel::Private);
        assert_eq!(msg.recipient, "bob");
    }

    #[test]
    fn test_user_message_without_sender_is_unknown() {
        let msg = ChatMessage::user("", "", "who am i");
        assert_eq!(msg.sender, UNKNOWN_SENDER);
        assert_eq!(msg.channel, ChatChannel::Public);
    }

    #[test]
    fn test_system_message_has_no_sender() {
        let msg = ChatMessage::system("Connection lost");
        assert!(msg.is_system());
        assert!(msg.sender.is_empty());
        assert!(msg.timestamp > 0);
    }

    #[test]
    fn test_since_returns_tail_and_tolerates_overshoot() {
        let mut log = ChatLog::default();
        log.push(ChatMessage::system("one"));
        log.push(ChatMessage::system("two"));

        assert_eq!(log.since(1).len(), 1);
        assert_eq!(log.since(1)[0].body, "two");
        assert!(log.since(5).is_empty());
        assert_eq!(log.len(), 2);
    }
}
