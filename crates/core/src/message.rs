//! Message and Conversation domain types.
//!
//! These are the value objects that flow through a chat turn:
//! user types a line → session pushes it → agent loop sends it → provider replies.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a conversation (session).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ConversationId(pub String);

impl ConversationId {
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }
}

impl Default for ConversationId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ConversationId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The role of a message sender in a conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// The end user
    User,
    /// The persona speaking
    Assistant,
    /// System instructions (persona profile, modifiers, guidance)
    System,
    /// Tool execution result
    Tool,
}

/// A single message in a conversation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    /// Unique message ID
    pub id: String,

    /// Who sent this message
    pub role: Role,

    /// The text content
    pub content: String,

    /// Tool calls requested by the assistant (if any)
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tool_calls: Vec<MessageToolCall>,

    /// If this is a tool result, which tool call it responds to
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_call_id: Option<String>,

    /// Timestamp
    pub timestamp: DateTime<Utc>,
}

impl Message {
    fn with_role(role: Role, content: String) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            role,
            content,
            tool_calls: Vec::new(),
            tool_call_id: None,
            timestamp: Utc::now(),
        }
    }

    /// Create a new user message.
    pub fn user(content: impl Into<String>) -> Self {
        Self::with_role(Role::User, content.into())
    }

    /// Create a new assistant message.
    pub fn assistant(content: impl Into<String>) -> Self {
        Self::with_role(Role::Assistant, content.into())
    }

    /// Create a new system message.
    pub fn system(content: impl Into<String>) -> Self {
        Self::with_role(Role::System, content.into())
    }

    /// Create a tool result message.
    pub fn tool_result(tool_call_id: impl Into<String>, content: impl Into<String>) -> Self {
        let mut msg = Self::with_role(Role::Tool, content.into());
        msg.tool_call_id = Some(tool_call_id.into());
        msg
    }

    /// Text used when scanning the message for context clues.
    ///
    /// Tool calls contribute their arguments so that a name passed to a tool
    /// is visible to inference just like typed text.
    pub fn context_text(&self) -> String {
        if self.tool_calls.is_empty() {
            return self.content.clone();
        }
        let mut text = self.content.clone();
        for tc in &self.tool_calls {
            text.push(' ');
            text.push_str(&tc.arguments);
        }
        text
    }
}

/// A tool call embedded in an assistant message.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageToolCall {
    /// Unique ID for this tool call
    pub id: String,

    /// Name of the tool to invoke
    pub name: String,

    /// Arguments as JSON string
    pub arguments: String,
}

/// A conversation is an ordered sequence of messages with shared context.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Conversation {
    /// Unique conversation ID
    pub id: ConversationId,

    /// Ordered messages
    pub messages: Vec<Message>,

    /// When this conversation was created
    pub created_at: DateTime<Utc>,

    /// When the last message was added
    pub updated_at: DateTime<Utc>,
}

impl Conversation {
    /// Create a new empty conversation.
    pub fn new() -> Self {
        let now = Utc::now();
        Self {
            id: ConversationId::new(),
            messages: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Add a message to the conversation.
    pub fn push(&mut self, message: Message) {
        self.updated_at = Utc::now();
        self.messages.push(message);
    }

    /// Drop every message. The conversation keeps its ID.
    pub fn clear(&mut self) {
        self.updated_at = Utc::now();
        self.messages.clear();
    }

    /// Number of non-system messages (what the user thinks of as history).
    pub fn history_len(&self) -> usize {
        self.messages.iter().filter(|m| m.role != Role::System).count()
    }

    /// Joined text of the last `n` non-system messages, oldest first.
    pub fn recent_text(&self, n: usize) -> String {
        let recent: Vec<String> = self
            .messages
            .iter()
            .filter(|m| m.role != Role::System)
            .rev()
            .take(n)
            .map(Message::context_text)
            .collect();
        recent.into_iter().rev().collect::<Vec<_>>().join(" ")
    }

    /// Get the total token count estimate (rough: 4 chars ≈ 1 token).
    pub fn estimated_tokens(&self) -> usize {
        self.messages.iter().map(|m| m.content.len() / 4).sum()
    }
}

impl Default for Conversation {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_user_message() {
        let msg = Message::user("Hello, Lucan!");
        assert_eq!(msg.role, Role::User);
        assert_eq!(msg.content, "Hello, Lucan!");
        assert!(msg.tool_calls.is_empty());
    }

    #[test]
    fn conversation_tracks_updates() {
        let mut conv = Conversation::new();
        let created = conv.created_at;

        conv.push(Message::user("First message"));
        assert_eq!(conv.messages.len(), 1);
        assert!(conv.updated_at >= created);
    }

    #[test]
    fn history_len_ignores_system_prompt() {
        let mut conv = Conversation::new();
        conv.push(Message::system("You are Lucan"));
        conv.push(Message::user("hi"));
        conv.push(Message::assistant("hey"));
        assert_eq!(conv.history_len(), 2);

        conv.clear();
        assert_eq!(conv.history_len(), 0);
    }

    #[test]
    fn recent_text_takes_last_messages_in_order() {
        let mut conv = Conversation::new();
        conv.push(Message::system("system text"));
        conv.push(Message::user("one"));
        conv.push(Message::assistant("two"));
        conv.push(Message::user("three"));
        conv.push(Message::assistant("four"));

        assert_eq!(conv.recent_text(3), "two three four");
        assert_eq!(conv.recent_text(10), "one two three four");
    }

    #[test]
    fn context_text_includes_tool_arguments() {
        let mut msg = Message::assistant("noting that");
        msg.tool_calls.push(MessageToolCall {
            id: "call_1".into(),
            name: "add_relationship_note".into(),
            arguments: r#"{"name":"Mervin","relationship_type":"therapist"}"#.into(),
        });
        let text = msg.context_text();
        assert!(text.starts_with("noting that"));
        assert!(text.contains("Mervin"));
    }

    #[test]
    fn conversation_token_estimate() {
        let mut conv = Conversation::new();
        // 20 chars ≈ 5 tokens
        conv.push(Message::user("12345678901234567890"));
        assert_eq!(conv.estimated_tokens(), 5);
    }
}
