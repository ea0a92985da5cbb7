//! In-memory document store
//!
//! Backs the API service in tests and in local development (`memory`
//! backend). Data lives for the lifetime of the process.

use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, PoisonError, RwLock};

use async_trait::async_trait;
use serde_json::Value;
use tracing::debug;

use crate::error::{StoreError, StoreResult};
use crate::store::{Document, DocumentStore, Documents, Query};

type Collection = BTreeMap<String, Document>;

/// Document store kept in process memory
#[derive(Clone, Default)]
pub struct MemoryStore {
    collections: Arc<RwLock<HashMap<String, Collection>>>,
    unique: Arc<Vec<(String, String)>>,
}

impl MemoryStore {
    /// Create an empty store without constraints
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare `field` unique across documents of `collection`
    pub fn with_unique(mut self, collection: impl Into<String>, field: impl Into<String>) -> Self {
        let mut unique = self.unique.as_ref().clone();
        unique.push((collection.into(), field.into()));
        self.unique = Arc::new(unique);
        self
    }

    /// Number of documents currently held in `collection`
    pub fn len(&self, collection: &str) -> usize {
        let collections = self
            .collections
            .read()
            .unwrap_or_else(PoisonError::into_inner);
        collections.get(collection).map_or(0, BTreeMap::len)
    }

    fn check_unique(
        &self,
        collection_name: &str,
        collection: &Collection,
        id: &str,
        candidate: &Document,
    ) -> StoreResult<()> {
        for (_, field) in self.unique.iter().filter(|(c, _)| c == collection_name) {
            let Some(value) = candidate.get(field).filter(|v| !v.is_null()) else {
                continue;
            };
            let taken = collection
                .iter()
                .any(|(other_id, other)| other_id != id && other.get(field) == Some(value));
            if taken {
                return Err(StoreError::Conflict(format!(
                    "{collection_name}.{field} already holds {}",
                    describe(value)
                )));
            }
        }
        Ok(())
    }
}

fn describe(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn get(&self, collection: &str, id: &str) -> StoreResult<Option<Document>> {
        let collections = self
            .collections
            .read()
            .unwrap_or_else(PoisonError::into_inner);
        Ok(collections
            .get(collection)
            .and_then(|documents| documents.get(id))
            .cloned())
    }

    async fn set(&self, collection: &str, id: &str, document: Document) -> StoreResult<()> {
        let mut collections = self
            .collections
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        let documents = collections.entry(collection.to_string()).or_default();
        self.check_unique(collection, documents, id, &document)?;
        documents.insert(id.to_string(), document);
        debug!(collection, id, "document stored");
        Ok(())
    }

    async fn update(&self, collection: &str, id: &str, fields: Document) -> StoreResult<()> {
        let mut collections = self
            .collections
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        let not_found = || StoreError::NotFound {
            collection: collection.to_string(),
            id: id.to_string(),
        };
        let documents = collections.get_mut(collection).ok_or_else(not_found)?;
        let mut merged = documents.get(id).cloned().ok_or_else(not_found)?;
        merged.extend(fields);
        self.check_unique(collection, documents, id, &merged)?;
        documents.insert(id.to_string(), merged);
        Ok(())
    }

    async fn delete(&self, collection: &str, id: &str) -> StoreResult<()> {
        let mut collections = self
            .collections
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        if let Some(documents) = collections.get_mut(collection) {
            documents.remove(id);
        }
        Ok(())
    }

    async fn query(&self, collection: &str, query: &Query) -> StoreResult<Documents> {
        let matched: Vec<Document> = {
            let collections = self
                .collections
                .read()
                .unwrap_or_else(PoisonError::into_inner);
            collections
                .get(collection)
                .map(|documents| {
                    documents
                        .values()
                        .filter(|document| query.matches(document))
                        .cloned()
                        .collect()
                })
                .unwrap_or_default()
        };
        Ok(Documents::new(query.arrange(matched)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{Direction, Filter};
    use serde_json::json;

    fn doc(value: Value) -> Document {
        match value {
            Value::Object(map) => map,
            _ => panic!("test documents must be objects"),
        }
    }

    #[tokio::test]
    async fn test_set_get_delete() -> StoreResult<()> {
        let store = MemoryStore::new();

        store.set("users", "u1", doc(json!({"id": "u1", "email": "a@x.io"}))).await?;
        let fetched = store.get("users", "u1").await?;
        assert_eq!(fetched, Some(doc(json!({"id": "u1", "email": "a@x.io"}))));

        store.delete("users", "u1").await?;
        assert_eq!(store.get("users", "u1").await?, None);

        // deleting twice is fine
        store.delete("users", "u1").await?;
        assert_eq!(store.get("nothing", "here").await?, None);
        Ok(())
    }

    #[tokio::test]
    async fn test_set_replaces_whole_document() -> StoreResult<()> {
        let store = MemoryStore::new();
        store.set("c", "1", doc(json!({"a": 1, "b": 2}))).await?;
        store.set("c", "1", doc(json!({"a": 3}))).await?;

        assert_eq!(store.get("c", "1").await?, Some(doc(json!({"a": 3}))));
        assert_eq!(store.len("c"), 1);
        Ok(())
    }

    #[tokio::test]
    async fn test_update_merges_top_level_fields() -> StoreResult<()> {
        let store = MemoryStore::new();
        store
            .set("users", "u1", doc(json!({"name": "A", "settings": {"x": true, "y": true}})))
            .await?;

        store
            .update("users", "u1", doc(json!({"settings": {"x": false}, "age": 4})))
            .await?;

        let updated = store.get("users", "u1").await?.unwrap();
        assert_eq!(
            updated,
            doc(json!({"name": "A", "settings": {"x": false}, "age": 4}))
        );
        Ok(())
    }

    #[tokio::test]
    async fn test_update_missing_document_is_not_found() {
        let store = MemoryStore::new();
        let result = store.update("users", "ghost", doc(json!({"a": 1}))).await;
        assert!(matches!(result, Err(StoreError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_unique_field_rejects_second_owner() -> StoreResult<()> {
        let store = MemoryStore::new().with_unique("users", "email");
        store.set("users", "u1", doc(json!({"email": "a@x.io"}))).await?;

        // rewriting the owner is allowed
        store.set("users", "u1", doc(json!({"email": "a@x.io", "n": 1}))).await?;

        let result = store.set("users", "u2", doc(json!({"email": "a@x.io"}))).await;
        assert!(matches!(result, Err(StoreError::Conflict(_))));

        // other collections are unconstrained
        store.set("audit", "x", doc(json!({"email": "a@x.io"}))).await?;
        store.set("audit", "y", doc(json!({"email": "a@x.io"}))).await?;
        Ok(())
    }

    #[tokio::test]
    async fn test_query_filters_orders_and_limits() -> StoreResult<()> {
        let store = MemoryStore::new();
        for (id, user, at) in [
            ("m1", "alice", "2024-01-01T10:00:00.000Z"),
            ("m2", "bob", "2024-01-01T11:00:00.000Z"),
            ("m3", "alice", "2024-01-01T12:00:00.000Z"),
            ("m4", "alice", "2024-01-01T09:00:00.000Z"),
        ] {
            store
                .set("chat", id, doc(json!({"id": id, "userId": user, "timestamp": at})))
                .await?;
        }

        let query = Query::new()
            .where_eq("userId", "alice")
            .filter(Filter::gte("timestamp", "2024-01-01T09:30:00.000Z"))
            .order_by("timestamp", Direction::Desc)
            .limit(5);
        let ids: Vec<String> = store
            .query("chat", &query)
            .await?
            .map(|d| d["id"].as_str().unwrap().to_string())
            .collect();
        assert_eq!(ids, vec!["m3", "m1"]);

        let limited = store
            .query("chat", &Query::new().order_by("timestamp", Direction::Asc).limit(1))
            .await?;
        assert_eq!(limited.len(), 1);

        let empty = store.query("unknown", &Query::new()).await?;
        assert_eq!(empty.count(), 0);
        Ok(())
    }

    #[tokio::test]
    async fn test_filters_never_match_across_json_types() -> StoreResult<()> {
        let store = MemoryStore::new();
        store.set("m", "num", doc(json!({"id": "num", "v": 5}))).await?;
        store.set("m", "text", doc(json!({"id": "text", "v": "5"}))).await?;
        store.set("m", "list", doc(json!({"id": "list", "v": [5]}))).await?;

        let above_text = store.query("m", &Query::new().filter(Filter::gt("v", ""))).await?;
        let ids: Vec<Value> = above_text.map(|d| d["id"].clone()).collect();
        assert_eq!(ids, vec![json!("text")]);

        let equal_number = store.query("m", &Query::new().where_eq("v", 5)).await?;
        assert_eq!(equal_number.len(), 1);

        let equal_list = store.query("m", &Query::new().where_eq("v", json!([5]))).await?;
        assert_eq!(equal_list.len(), 0);
        Ok(())
    }
}
