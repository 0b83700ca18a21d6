use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;

/// Priority of a task. Unknown or missing values read as `Medium`.
#[derive(Serialize, Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
}

impl Priority {
    pub const ALL: [Priority; 3] = [Priority::Low, Priority::Medium, Priority::High];

    pub fn label(self) -> &'static str {
        match self {
            Priority::Low => "Low",
            Priority::Medium => "Medium",
            Priority::High => "High",
        }
    }

    /// Cycles low -> medium -> high -> low, used by the editor's priority field.
    pub fn next(self) -> Priority {
        match self {
            Priority::Low => Priority::Medium,
            Priority::Medium => Priority::High,
            Priority::High => Priority::Low,
        }
    }
}

impl FromStr for Priority {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "low" => Ok(Priority::Low),
            "medium" => Ok(Priority::Medium),
            "high" => Ok(Priority::High),
            other => Err(format!("unknown priority '{}'. Supported: low, medium, high.", other)),
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl<'de> Deserialize<'de> for Priority {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = Option::<String>::deserialize(deserializer)?;
        Ok(raw.and_then(|p| p.parse().ok()).unwrap_or_default())
    }
}

/// A task as returned by the API.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Task {
    /// Server-assigned identifier.
    pub id: i64,
    /// Short title. Never empty.
    pub title: String,
    /// Optional free-form description.
    #[serde(default)]
    pub description: Option<String>,
    /// Whether the task has been completed.
    #[serde(default)]
    pub completed: bool,
    #[serde(default)]
    pub priority: Priority,
    /// Optional deadline.
    #[serde(default, deserialize_with = "timestamp::deserialize_option")]
    pub due_date: Option<DateTime<Utc>>,
    /// Overdue flag as computed by the server at read time.
    #[serde(default)]
    pub is_overdue: bool,
    #[serde(deserialize_with = "timestamp::deserialize")]
    pub created_at: DateTime<Utc>,
    #[serde(default, deserialize_with = "timestamp::deserialize_option")]
    pub updated_at: Option<DateTime<Utc>>,
    /// Owner. The client never relies on it; the session carries the user id.
    #[serde(default)]
    pub user_id: Option<String>,
}

impl Task {
    /// Overdue if the server says so, or if the deadline has passed and the
    /// task is still open.
    pub fn is_overdue_at(&self, now: DateTime<Utc>) -> bool {
        if self.completed {
            return false;
        }
        self.is_overdue || self.due_date.is_some_and(|due| due < now)
    }

    pub fn status_label(&self, now: DateTime<Utc>) -> &'static str {
        if self.completed {
            "Completed"
        } else if self.is_overdue_at(now) {
            "Overdue"
        } else {
            "Pending"
        }
    }
}

/// Payload for creating a task.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct TaskDraft {
    pub title: String,
    pub description: String,
    pub completed: bool,
    pub priority: Priority,
    pub due_date: Option<DateTime<Utc>>,
}

/// Partial update. Fields left as `None` are not sent.
///
/// `due_date` is doubly optional: `Some(None)` clears the deadline.
#[derive(Serialize, Debug, Clone, Default, PartialEq)]
pub struct TaskPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<Priority>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due_date: Option<Option<DateTime<Utc>>>,
}

impl TaskPatch {
    pub fn is_empty(&self) -> bool {
        *self == TaskPatch::default()
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// An action the assistant backend performed while answering.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ToolCall {
    pub name: String,
    #[serde(default)]
    pub result: serde_json::Value,
}

/// One bubble in the assistant conversation. Never persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct ChatMessage {
    pub id: u64,
    pub role: Role,
    pub content: String,
    pub tool_calls: Vec<ToolCall>,
    /// Set on the synthetic message shown when a send fails.
    pub is_error: bool,
    pub timestamp: DateTime<Utc>,
}

/// Reply of `POST /api/{user}/chat`.
#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct ChatReply {
    pub response: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub tool_calls: Vec<ToolCall>,
}

/// Identity decoded from the bearer token payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: String,
    pub email: Option<String>,
}

/// Account returned by sign-up.
#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct Account {
    pub id: String,
    pub email: String,
    #[serde(default, deserialize_with = "timestamp::deserialize_option")]
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Deserialize, Debug, Clone)]
pub struct TokenResponse {
    pub access_token: String,
    #[serde(default)]
    pub token_type: String,
}

#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct PasswordResetRequested {
    pub message: String,
    /// Only present when the server could not send the e-mail itself.
    #[serde(default)]
    pub reset_link: Option<String>,
}

#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct MessageResponse {
    pub message: String,
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// The API emits naive UTC timestamps (`2025-01-01T10:00:00.123`); RFC 3339 is
/// accepted as well.
pub(crate) mod timestamp {
    use super::*;
    use serde::de::Error as _;

    pub fn parse(raw: &str) -> Option<DateTime<Utc>> {
        DateTime::parse_from_rfc3339(raw)
            .map(|d| d.with_timezone(&Utc))
            .ok()
            .or_else(|| raw.parse::<NaiveDateTime>().ok().map(|n| n.and_utc()))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DateTime<Utc>, D::Error> {
        let raw = String::deserialize(deserializer)?;
        parse(&raw).ok_or_else(|| D::Error::custom(format!("invalid timestamp '{}'", raw)))
    }

    pub fn deserialize_option<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<DateTime<Utc>>, D::Error> {
        match Option::<String>::deserialize(deserializer)? {
            None => Ok(None),
            Some(raw) if raw.is_empty() => Ok(None),
            Some(raw) => parse(&raw)
                .map(Some)
                .ok_or_else(|| D::Error::custom(format!("invalid timestamp '{}'", raw))),
        }
    }
}
