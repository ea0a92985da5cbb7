//! Activity repository for document store operations

use std::sync::Arc;

use chrono::{DateTime, Utc};
use docstore::{Direction, DocumentStore, Filter, Query, to_document};

use crate::{
    error::ApiResult,
    models::activity::{ACTIVITIES, ActivityRecord, ActivityType},
};

/// Activity repository
#[derive(Clone)]
pub struct ActivityRepository {
    store: Arc<dyn DocumentStore>,
}

impl ActivityRepository {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    pub async fn create(&self, record: &ActivityRecord) -> ApiResult<()> {
        self.store
            .set(ACTIVITIES, &record.id, to_document(record)?)
            .await?;
        Ok(())
    }

    /// Records of one user dated in `[from, to)`, newest first
    pub async fn list(
        &self,
        user_id: &str,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
        kind: Option<ActivityType>,
        limit: Option<usize>,
    ) -> ApiResult<Vec<ActivityRecord>> {
        let mut query = Query::new()
            .where_eq("userId", user_id)
            .filter(Filter::gte("date", docstore::timestamp::value(&from)))
            .filter(Filter::lt("date", docstore::timestamp::value(&to)))
            .order_by("date", Direction::Desc);
        if let Some(kind) = kind {
            query = query.where_eq("type", kind.as_str());
        }
        if let Some(limit) = limit {
            query = query.limit(limit);
        }

        Ok(self.store.query(ACTIVITIES, &query).await?.decode()?)
    }
}
