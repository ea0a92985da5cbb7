//! Chat messages and session aggregation

use std::collections::HashMap;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::validation::{Validate, require_text};

/// Collection holding chat message documents
pub const CHAT_MESSAGES: &str = "chat_messages";

/// Session name for messages stored without one
pub const DEFAULT_SESSION: &str = "default";

pub const DEFAULT_HISTORY_LIMIT: usize = 50;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    User,
    Assistant,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessage {
    pub id: String,
    pub user_id: String,
    pub text: String,
    pub sender: Sender,
    #[serde(with = "docstore::timestamp")]
    pub timestamp: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
}

impl ChatMessage {
    pub fn from_user(user_id: &str, text: String, session_id: Option<String>) -> Self {
        Self {
            id: super::new_id(),
            user_id: user_id.to_string(),
            text,
            sender: Sender::User,
            timestamp: docstore::timestamp::now(),
            session_id,
        }
    }

    /// Assistant reply in the same session, stamped strictly after this message
    pub fn reply(&self, text: String) -> Self {
        let earliest = self.timestamp + Duration::milliseconds(1);
        Self {
            id: super::new_id(),
            user_id: self.user_id.clone(),
            text,
            sender: Sender::Assistant,
            timestamp: docstore::timestamp::now().max(earliest),
            session_id: self.session_id.clone(),
        }
    }

    pub fn session(&self) -> &str {
        self.session_id.as_deref().unwrap_or(DEFAULT_SESSION)
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendMessageRequest {
    pub message: String,
    #[serde(default)]
    pub session_id: Option<String>,
}

impl Validate for SendMessageRequest {
    fn validate(&self) -> Result<(), String> {
        require_text("Message", &self.message)
    }
}

impl SendMessageRequest {
    /// Session id with blank values treated as absent
    pub fn session(&self) -> Option<String> {
        self.session_id
            .as_ref()
            .map(|id| id.trim())
            .filter(|id| !id.is_empty())
            .map(str::to_string)
    }
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatResponse {
    pub user_message: ChatMessage,
    pub ai_message: ChatMessage,
}

/// Query string of `GET /chat/history`
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryQuery {
    pub session_id: Option<String>,
    pub limit: Option<String>,
}

impl HistoryQuery {
    pub fn limit(&self) -> Result<usize, String> {
        match self.limit.as_deref().map(str::trim) {
            None | Some("") => Ok(DEFAULT_HISTORY_LIMIT),
            Some(raw) => match raw.parse::<usize>() {
                Ok(limit) if limit > 0 => Ok(limit),
                _ => Err("Invalid limit parameter".to_string()),
            },
        }
    }

    pub fn session(&self) -> Option<&str> {
        self.session_id.as_deref().filter(|id| !id.is_empty())
    }
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatHistory {
    pub messages: Vec<ChatMessage>,
    pub count: usize,
    pub user_id: String,
}

/// Aggregate view of one conversation
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SessionSummary {
    pub session_id: String,
    pub message_count: usize,
    #[serde(with = "docstore::timestamp")]
    pub first_message: DateTime<Utc>,
    #[serde(with = "docstore::timestamp")]
    pub last_activity: DateTime<Utc>,
    pub last_message: ChatMessage,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionList {
    pub sessions: Vec<SessionSummary>,
    pub user_id: String,
}

/// Group messages by session, most recently active session first
pub fn group_sessions(messages: Vec<ChatMessage>) -> Vec<SessionSummary> {
    let mut sessions: HashMap<String, SessionSummary> = HashMap::new();

    for message in messages {
        match sessions.get_mut(message.session()) {
            Some(summary) => {
                summary.message_count += 1;
                summary.first_message = summary.first_message.min(message.timestamp);
                if message.timestamp > summary.last_activity {
                    summary.last_activity = message.timestamp;
                    summary.last_message = message;
                }
            }
            None => {
                sessions.insert(
                    message.session().to_string(),
                    SessionSummary {
                        session_id: message.session().to_string(),
                        message_count: 1,
                        first_message: message.timestamp,
                        last_activity: message.timestamp,
                        last_message: message,
                    },
                );
            }
        }
    }

    let mut sessions: Vec<SessionSummary> = sessions.into_values().collect();
    sessions.sort_by(|a, b| {
        b.last_activity
            .cmp(&a.last_activity)
            .then_with(|| a.session_id.cmp(&b.session_id))
    });
    sessions
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn message(session: Option<&str>, minute: u32) -> ChatMessage {
        ChatMessage {
            id: crate::models::new_id(),
            user_id: "u1".into(),
            text: format!("message at {}", minute),
            sender: Sender::User,
            timestamp: Utc.with_ymd_and_hms(2024, 5, 1, 12, minute, 0).unwrap(),
            session_id: session.map(str::to_string),
        }
    }

    #[test]
    fn test_reply_sorts_after_prompt() {
        let mut prompt = ChatMessage::from_user("u1", "hi".into(), Some("s1".into()));
        prompt.timestamp = Utc::now() + Duration::hours(1);
        let reply = prompt.reply("hello".into());
        assert!(reply.timestamp > prompt.timestamp);
        assert_eq!(reply.sender, Sender::Assistant);
        assert_eq!(reply.session_id.as_deref(), Some("s1"));
        assert_ne!(reply.id, prompt.id);
    }

    #[test]
    fn test_group_sessions_counts_and_order() {
        let messages = vec![
            message(Some("a"), 1),
            message(Some("b"), 2),
            message(Some("a"), 3),
            message(Some("b"), 4),
            message(Some("a"), 5),
        ];

        let sessions = group_sessions(messages);
        assert_eq!(sessions.len(), 2);

        assert_eq!(sessions[0].session_id, "a");
        assert_eq!(sessions[0].message_count, 3);
        assert_eq!(sessions[0].first_message.format("%M").to_string(), "01");
        assert_eq!(sessions[0].last_activity.format("%M").to_string(), "05");
        assert_eq!(sessions[0].last_message.text, "message at 5");

        assert_eq!(sessions[1].session_id, "b");
        assert_eq!(sessions[1].message_count, 2);
        assert_eq!(sessions[1].last_activity.format("%M").to_string(), "04");
    }

    #[test]
    fn test_messages_without_session_use_default() {
        let sessions = group_sessions(vec![message(None, 1), message(None, 2)]);
        assert_eq!(sessions.len(), 1);
        assert_eq!(sessions[0].session_id, DEFAULT_SESSION);
        assert_eq!(sessions[0].message_count, 2);
    }

    #[test]
    fn test_history_limit_parsing() {
        let limit = |raw: Option<&str>| {
            HistoryQuery {
                session_id: None,
                limit: raw.map(str::to_string),
            }
            .limit()
        };
        assert_eq!(limit(None), Ok(DEFAULT_HISTORY_LIMIT));
        assert_eq!(limit(Some("10")), Ok(10));
        assert!(limit(Some("0")).is_err());
        assert!(limit(Some("-3")).is_err());
        assert!(limit(Some("ten")).is_err());
    }
}
