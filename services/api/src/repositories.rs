//! Repositories for document store operations
//!
//! Each repository owns one collection and converts between typed models and
//! raw documents. They share a single [`DocumentStore`] handle.

pub mod activity;
pub mod chat;
pub mod health_record;
pub mod user;

pub use activity::ActivityRepository;
pub use chat::ChatRepository;
pub use health_record::HealthRecordRepository;
pub use user::UserRepository;
