//! The `DocumentStore` trait and supporting query types.
//!
//! Documents are JSON objects addressed by `(collection, id)`. Higher layers
//! depend on this abstraction, never on a concrete backend, and receive the
//! store as an injected `Arc<dyn DocumentStore>`.

use std::cmp::Ordering;

use async_trait::async_trait;
use serde::{Serialize, de::DeserializeOwned};
use serde_json::{Map, Value};

use crate::error::{StoreError, StoreResult};

/// A stored document: a JSON object keyed by field name
pub type Document = Map<String, Value>;

// Query model

/// Comparison applied by a [`Filter`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Op {
    Eq,
    Lt,
    Lte,
    Gt,
    Gte,
}

impl Op {
    /// SQL operator used by the PostgreSQL backend
    pub(crate) fn as_sql(self) -> &'static str {
        match self {
            Op::Eq => "=",
            Op::Lt => "<",
            Op::Lte => "<=",
            Op::Gt => ">",
            Op::Gte => ">=",
        }
    }

    fn accepts(self, ordering: Ordering) -> bool {
        match self {
            Op::Eq => ordering == Ordering::Equal,
            Op::Lt => ordering == Ordering::Less,
            Op::Lte => ordering != Ordering::Greater,
            Op::Gt => ordering == Ordering::Greater,
            Op::Gte => ordering != Ordering::Less,
        }
    }
}

/// Predicate on a single top-level field
#[derive(Debug, Clone, PartialEq)]
pub struct Filter {
    pub field: String,
    pub op: Op,
    pub value: Value,
}

impl Filter {
    pub fn new(field: impl Into<String>, op: Op, value: impl Into<Value>) -> Self {
        Self {
            field: field.into(),
            op,
            value: value.into(),
        }
    }

    pub fn eq(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::new(field, Op::Eq, value)
    }

    pub fn lt(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::new(field, Op::Lt, value)
    }

    pub fn lte(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::new(field, Op::Lte, value)
    }

    pub fn gt(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::new(field, Op::Gt, value)
    }

    pub fn gte(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::new(field, Op::Gte, value)
    }

    /// Evaluate the predicate against a document. A missing field never matches,
    /// nor does a value of another JSON type, an array or an object.
    pub fn matches(&self, document: &Document) -> bool {
        document
            .get(&self.field)
            .and_then(|actual| compare_values(actual, &self.value))
            .is_some_and(|ordering| self.op.accepts(ordering))
    }
}

/// Sort direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Direction {
    #[default]
    Asc,
    Desc,
}

/// Single sort key
#[derive(Debug, Clone, PartialEq)]
pub struct OrderBy {
    pub field: String,
    pub direction: Direction,
}

/// Parameters for [`DocumentStore::query`]. All filters are conjoined.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Query {
    pub filters: Vec<Filter>,
    pub order_by: Option<OrderBy>,
    pub limit: Option<usize>,
}

impl Query {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn filter(mut self, filter: Filter) -> Self {
        self.filters.push(filter);
        self
    }

    /// Shorthand for an equality filter
    pub fn where_eq(self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.filter(Filter::eq(field, value))
    }

    pub fn order_by(mut self, field: impl Into<String>, direction: Direction) -> Self {
        self.order_by = Some(OrderBy {
            field: field.into(),
            direction,
        });
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Whether every filter accepts `document`
    pub fn matches(&self, document: &Document) -> bool {
        self.filters.iter().all(|filter| filter.matches(document))
    }

    /// Apply ordering and limit to an already filtered set
    pub(crate) fn arrange(&self, mut documents: Vec<Document>) -> Vec<Document> {
        if let Some(order) = &self.order_by {
            documents.sort_by(|a, b| {
                let ordering = order_values(a.get(&order.field), b.get(&order.field));
                match order.direction {
                    Direction::Asc => ordering,
                    Direction::Desc => ordering.reverse(),
                }
            });
        }
        if let Some(limit) = self.limit {
            documents.truncate(limit);
        }
        documents
    }
}

/// Compare two JSON values of the same kind. Values of different kinds, and
/// arrays or objects, are incomparable.
pub fn compare_values(a: &Value, b: &Value) -> Option<Ordering> {
    match (a, b) {
        (Value::Null, Value::Null) => Some(Ordering::Equal),
        (Value::Bool(a), Value::Bool(b)) => Some(a.cmp(b)),
        (Value::Number(a), Value::Number(b)) => a.as_f64()?.partial_cmp(&b.as_f64()?),
        (Value::String(a), Value::String(b)) => Some(a.cmp(b)),
        _ => None,
    }
}

// Total order used for sorting: null < string < number < bool < array <
// object, missing fields after everything.
fn order_values(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    fn rank(value: &Value) -> u8 {
        match value {
            Value::Null => 0,
            Value::String(_) => 1,
            Value::Number(_) => 2,
            Value::Bool(_) => 3,
            Value::Array(_) => 4,
            Value::Object(_) => 5,
        }
    }

    match (a, b) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Greater,
        (Some(_), None) => Ordering::Less,
        (Some(a), Some(b)) => rank(a)
            .cmp(&rank(b))
            .then_with(|| compare_values(a, b).unwrap_or(Ordering::Equal)),
    }
}

// Result sequence

/// Finite, consuming sequence of documents returned by a query.
///
/// It cannot be rewound; run the query again to read the results twice.
#[derive(Debug)]
pub struct Documents {
    inner: std::vec::IntoIter<Document>,
}

impl Documents {
    pub fn new(documents: Vec<Document>) -> Self {
        Self {
            inner: documents.into_iter(),
        }
    }

    /// Decode every remaining document into `T`
    pub fn decode<T: DeserializeOwned>(self) -> StoreResult<Vec<T>> {
        self.map(from_document::<T>).collect()
    }

    /// Decode the next document, if any
    pub fn decode_next<T: DeserializeOwned>(&mut self) -> StoreResult<Option<T>> {
        self.next().map(from_document::<T>).transpose()
    }
}

impl Iterator for Documents {
    type Item = Document;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl ExactSizeIterator for Documents {}

/// Encode a value as a document. Fails unless it serializes to a JSON object.
pub fn to_document<T: Serialize>(value: &T) -> StoreResult<Document> {
    match serde_json::to_value(value)? {
        Value::Object(map) => Ok(map),
        other => Err(StoreError::Configuration(format!(
            "documents must be JSON objects, got {}",
            kind_name(&other)
        ))),
    }
}

/// Decode a document into a typed value
pub fn from_document<T: DeserializeOwned>(document: Document) -> StoreResult<T> {
    Ok(serde_json::from_value(Value::Object(document))?)
}

fn kind_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

// Trait

/// Abstraction over a document database.
///
/// Implementations must be safe to share across request handlers; the API
/// service holds one behind an `Arc<dyn DocumentStore>`.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Fetch a document. `Ok(None)` when it does not exist.
    async fn get(&self, collection: &str, id: &str) -> StoreResult<Option<Document>>;

    /// Insert or replace a document.
    async fn set(&self, collection: &str, id: &str, document: Document) -> StoreResult<()>;

    /// Merge `fields` into the top level of an existing document. Nested
    /// objects are replaced as a unit. Fails with [`StoreError::NotFound`]
    /// when the document does not exist.
    async fn update(&self, collection: &str, id: &str, fields: Document) -> StoreResult<()>;

    /// Remove a document. Removing an absent document succeeds.
    async fn delete(&self, collection: &str, id: &str) -> StoreResult<()>;

    /// Run a filtered, optionally ordered and limited query.
    async fn query(&self, collection: &str, query: &Query) -> StoreResult<Documents>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn doc(value: Value) -> Document {
        match value {
            Value::Object(map) => map,
            _ => panic!("test documents must be objects"),
        }
    }

    #[test]
    fn test_filter_matches_by_kind() {
        let record = doc(json!({"userId": "a", "value": 12.5, "done": true, "at": "2024-01-02"}));

        assert!(Filter::eq("userId", "a").matches(&record));
        assert!(!Filter::eq("userId", "b").matches(&record));
        assert!(Filter::gt("value", 12).matches(&record));
        assert!(Filter::lte("value", 12.5).matches(&record));
        assert!(!Filter::lt("value", 12.5).matches(&record));
        assert!(Filter::eq("done", true).matches(&record));
        assert!(Filter::gte("at", "2024-01-01").matches(&record));
        assert!(!Filter::gte("at", "2024-01-03").matches(&record));
    }

    #[test]
    fn test_filter_never_matches_missing_or_mismatched_field() {
        let record = doc(json!({"value": 3}));

        assert!(!Filter::eq("sessionId", "x").matches(&record));
        assert!(!Filter::eq("value", "3").matches(&record));
    }

    #[test]
    fn test_query_arranges_and_limits() {
        let query = Query::new().order_by("n", Direction::Desc).limit(2);
        let arranged = query.arrange(vec![
            doc(json!({"n": 1})),
            doc(json!({"n": 3})),
            doc(json!({})),
            doc(json!({"n": 2})),
        ]);

        let values: Vec<Option<&Value>> = arranged.iter().map(|d| d.get("n")).collect();
        // missing sorts last ascending, so first when descending
        assert_eq!(values, vec![None, Some(&json!(3))]);
    }

    #[test]
    fn test_documents_is_consumed_once() {
        let mut documents = Documents::new(vec![doc(json!({"n": 1})), doc(json!({"n": 2}))]);

        let first: Option<Value> = documents.decode_next().unwrap();
        assert_eq!(first, Some(json!({"n": 1})));
        assert_eq!(documents.len(), 1);

        let rest: Vec<Value> = documents.decode().unwrap();
        assert_eq!(rest, vec![json!({"n": 2})]);
    }

    #[test]
    fn test_to_document_rejects_non_objects() {
        assert!(to_document(&json!({"ok": true})).is_ok());
        assert!(matches!(
            to_document(&vec![1, 2]),
            Err(StoreError::Configuration(_))
        ));
    }
}
