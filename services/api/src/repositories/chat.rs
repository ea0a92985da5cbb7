//! Chat message repository for document store operations

use std::sync::Arc;

use docstore::{Direction, DocumentStore, Query, to_document};

use crate::{
    error::ApiResult,
    models::chat::{CHAT_MESSAGES, ChatMessage},
};

/// Chat message repository
#[derive(Clone)]
pub struct ChatRepository {
    store: Arc<dyn DocumentStore>,
}

impl ChatRepository {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    pub async fn save(&self, message: &ChatMessage) -> ApiResult<()> {
        self.store
            .set(CHAT_MESSAGES, &message.id, to_document(message)?)
            .await?;
        Ok(())
    }

    /// The newest `limit` messages of a user, returned oldest first
    pub async fn history(
        &self,
        user_id: &str,
        session_id: Option<&str>,
        limit: usize,
    ) -> ApiResult<Vec<ChatMessage>> {
        let mut query = Query::new().where_eq("userId", user_id);
        if let Some(session_id) = session_id {
            query = query.where_eq("sessionId", session_id);
        }
        let query = query.order_by("timestamp", Direction::Desc).limit(limit);

        let mut messages: Vec<ChatMessage> =
            self.store.query(CHAT_MESSAGES, &query).await?.decode()?;
        messages.reverse();
        Ok(messages)
    }

    /// Every message of a user, newest first
    pub async fn all_for_user(&self, user_id: &str) -> ApiResult<Vec<ChatMessage>> {
        let query = Query::new()
            .where_eq("userId", user_id)
            .order_by("timestamp", Direction::Desc);
        Ok(self.store.query(CHAT_MESSAGES, &query).await?.decode()?)
    }
}
