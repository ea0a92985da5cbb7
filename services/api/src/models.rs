//! API models for stored documents and request/response payloads

use uuid::Uuid;

pub mod activity;
pub mod chat;
pub mod health_record;
pub mod user;

/// Generate a document identifier: 16 random bytes as 32 hex characters
pub fn new_id() -> String {
    Uuid::new_v4().simple().to_string()
}
