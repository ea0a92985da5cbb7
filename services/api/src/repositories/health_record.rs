//! Health record repository for document store operations

use std::sync::Arc;

use docstore::{Direction, DocumentStore, Query, from_document, to_document};

use crate::{
    error::ApiResult,
    models::health_record::{HEALTH_RECORDS, HealthRecord},
};

/// Health record repository
#[derive(Clone)]
pub struct HealthRecordRepository {
    store: Arc<dyn DocumentStore>,
}

impl HealthRecordRepository {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    pub async fn create(&self, record: &HealthRecord) -> ApiResult<()> {
        self.store
            .set(HEALTH_RECORDS, &record.id, to_document(record)?)
            .await?;
        Ok(())
    }

    pub async fn find_by_id(&self, id: &str) -> ApiResult<Option<HealthRecord>> {
        match self.store.get(HEALTH_RECORDS, id).await? {
            Some(document) => Ok(Some(from_document(document)?)),
            None => Ok(None),
        }
    }

    /// All records of one user, newest first
    pub async fn list_for_user(&self, user_id: &str) -> ApiResult<Vec<HealthRecord>> {
        let query = Query::new()
            .where_eq("userId", user_id)
            .order_by("date", Direction::Desc);
        Ok(self.store.query(HEALTH_RECORDS, &query).await?.decode()?)
    }

    pub async fn delete(&self, id: &str) -> ApiResult<()> {
        self.store.delete(HEALTH_RECORDS, id).await?;
        Ok(())
    }
}
