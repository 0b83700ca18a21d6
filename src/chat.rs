//! Assistant chat: the one-shot `POST /api/{user}/chat` exchange and the
//! in-memory conversation shown next to it.

use chrono::Utc;
use reqwest::Method;
use serde_json::json;

use crate::api::ApiClient;
use crate::error::Result;
use crate::models::{ChatMessage, ChatReply, Role, ToolCall};
use crate::session::Session;

pub const WELCOME_MESSAGE: &str =
    "Hello! I'm your AI Todo Assistant. How can I help you manage your tasks today?";

pub const ERROR_MESSAGE: &str =
    "Sorry, I encountered an error processing your request. Please try again.";

/// Canned prompts offered on the chat screen: (label, message).
pub const QUICK_ACTIONS: [(&str, &str); 4] = [
    ("Show my tasks", "Show me all my tasks"),
    ("Add a task", "Add a new task called "),
    ("Completed tasks", "Show my completed tasks"),
    ("Pending tasks", "Show my pending tasks"),
];

#[derive(Debug, Clone)]
pub struct ChatClient {
    api: ApiClient,
}

impl ChatClient {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    pub async fn send(&self, session: &Session, message: &str) -> Result<ChatReply> {
        let path = format!("/api/{}/chat", session.user_id());
        let request = self
            .api
            .authorized(Method::POST, &path, session)
            .json(&json!({ "message": message }));
        let reply: ChatReply = self.api.send_json(request, "Failed to send message").await?;
        tracing::debug!(tool_calls = reply.tool_calls.len(), "assistant replied");
        Ok(reply)
    }
}

/// Message history plus the in-flight flag.
///
/// Every accepted [`Conversation::begin`] is answered by exactly one
/// [`Conversation::finish`], which appends exactly one assistant message.
#[derive(Debug, Default)]
pub struct Conversation {
    messages: Vec<ChatMessage>,
    loading: bool,
    next_id: u64,
}

impl Conversation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    /// Greets the user the first time the conversation is shown.
    pub fn open(&mut self) {
        if self.messages.is_empty() {
            self.push(Role::Assistant, WELCOME_MESSAGE.to_string(), Vec::new(), false);
        }
    }

    /// Appends the user's message and marks a request as in flight.
    ///
    /// Returns the text to send, or `None` when the input is blank or a
    /// request is already pending.
    pub fn begin(&mut self, input: &str) -> Option<String> {
        let content = input.trim();
        if content.is_empty() || self.loading {
            return None;
        }
        self.push(Role::User, content.to_string(), Vec::new(), false);
        self.loading = true;
        Some(content.to_string())
    }

    /// Records the outcome of the pending request.
    ///
    /// Failures become an error bubble instead of propagating. Returns `false`
    /// (and changes nothing) if no request was pending.
    pub fn finish(&mut self, outcome: Result<ChatReply>) -> bool {
        if !self.loading {
            tracing::warn!("chat reply arrived with no request pending");
            return false;
        }
        self.loading = false;
        match outcome {
            Ok(reply) => self.push(Role::Assistant, reply.response, reply.tool_calls, false),
            Err(e) => {
                tracing::warn!(error = %e, "chat request failed");
                self.push(Role::Assistant, ERROR_MESSAGE.to_string(), Vec::new(), true);
            }
        }
        true
    }

    fn push(&mut self, role: Role, content: String, tool_calls: Vec<ToolCall>, is_error: bool) {
        self.next_id += 1;
        self.messages.push(ChatMessage {
            id: self.next_id,
            role,
            content,
            tool_calls,
            is_error,
            timestamp: Utc::now(),
        });
    }
}

pub fn tool_glyph(name: &str) -> &'static str {
    match name {
        "add_task" | "list_tasks" => "☰",
        "complete_task" => "✓",
        "delete_task" => "✗",
        "update_task" => "✎",
        _ => "⚡",
    }
}

/// "Actions performed: add_task, list_tasks", or `None` for no tool calls.
pub fn describe_tool_calls(calls: &[ToolCall]) -> Option<String> {
    if calls.is_empty() {
        return None;
    }
    let names: Vec<String> = calls
        .iter()
        .map(|c| format!("{} {}", tool_glyph(&c.name), c.name))
        .collect();
    Some(format!("Actions performed: {}", names.join(", ")))
}
