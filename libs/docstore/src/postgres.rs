//! PostgreSQL document store
//!
//! Every collection shares one `documents` table; each row holds a JSONB body
//! keyed by `(collection, id)`. Filters and ordering are evaluated on the
//! JSONB values, so numbers compare numerically and strings lexically.

use async_trait::async_trait;
use sqlx::{PgPool, Postgres, QueryBuilder, types::Json};
use tracing::{debug, info};

use crate::error::{StoreError, StoreResult};
use crate::store::{Direction, Document, DocumentStore, Documents, Query};

const SCHEMA: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS documents (
        collection TEXT NOT NULL,
        id TEXT NOT NULL,
        body JSONB NOT NULL,
        PRIMARY KEY (collection, id)
    )
    "#,
    r#"
    CREATE UNIQUE INDEX IF NOT EXISTS documents_users_email_key
        ON documents ((body->>'email'))
        WHERE collection = 'users'
    "#,
    r#"
    CREATE INDEX IF NOT EXISTS documents_owner_idx
        ON documents (collection, (body->>'userId'))
    "#,
];

/// Document store backed by a PostgreSQL JSONB table
#[derive(Clone)]
pub struct PgDocumentStore {
    pool: PgPool,
}

impl PgDocumentStore {
    /// Create a new store on top of an existing pool
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create the documents table and its indexes if they are missing.
    ///
    /// The unique index on `users.email` is what makes concurrent
    /// registrations with the same address fail with [`StoreError::Conflict`].
    pub async fn ensure_schema(&self) -> StoreResult<()> {
        for statement in SCHEMA {
            sqlx::query(statement)
                .execute(&self.pool)
                .await
                .map_err(StoreError::Query)?;
        }
        info!("Document schema ready");
        Ok(())
    }

    fn select<'q>(collection: &'q str, query: &'q Query) -> QueryBuilder<'q, Postgres> {
        let mut builder = QueryBuilder::new("SELECT body FROM documents WHERE collection = ");
        builder.push_bind(collection);

        // Only scalars of the same JSON type compare, as in the memory store
        for filter in &query.filters {
            builder
                .push(" AND jsonb_typeof(body -> ")
                .push_bind(filter.field.as_str())
                .push(") = jsonb_typeof(")
                .push_bind(Json(&filter.value))
                .push(") AND jsonb_typeof(")
                .push_bind(Json(&filter.value))
                .push(") IN ('string', 'number', 'boolean', 'null')")
                .push(" AND body -> ")
                .push_bind(filter.field.as_str())
                .push(" ")
                .push(filter.op.as_sql())
                .push(" ")
                .push_bind(Json(&filter.value));
        }

        if let Some(order) = &query.order_by {
            builder
                .push(" ORDER BY body -> ")
                .push_bind(order.field.as_str())
                .push(match order.direction {
                    Direction::Asc => " ASC",
                    Direction::Desc => " DESC",
                });
        }

        if let Some(limit) = query.limit {
            builder
                .push(" LIMIT ")
                .push_bind(i64::try_from(limit).unwrap_or(i64::MAX));
        }

        builder
    }
}

#[async_trait]
impl DocumentStore for PgDocumentStore {
    async fn get(&self, collection: &str, id: &str) -> StoreResult<Option<Document>> {
        let row: Option<(Json<Document>,)> =
            sqlx::query_as("SELECT body FROM documents WHERE collection = $1 AND id = $2")
                .bind(collection)
                .bind(id)
                .fetch_optional(&self.pool)
                .await
                .map_err(StoreError::Query)?;

        Ok(row.map(|(Json(body),)| body))
    }

    async fn set(&self, collection: &str, id: &str, document: Document) -> StoreResult<()> {
        sqlx::query(
            r#"
            INSERT INTO documents (collection, id, body)
            VALUES ($1, $2, $3)
            ON CONFLICT (collection, id) DO UPDATE SET body = EXCLUDED.body
            "#,
        )
        .bind(collection)
        .bind(id)
        .bind(Json(&document))
        .execute(&self.pool)
        .await
        .map_err(StoreError::from_query)?;

        debug!(collection, id, "document stored");
        Ok(())
    }

    async fn update(&self, collection: &str, id: &str, fields: Document) -> StoreResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE documents SET body = body || $3
            WHERE collection = $1 AND id = $2
            "#,
        )
        .bind(collection)
        .bind(id)
        .bind(Json(&fields))
        .execute(&self.pool)
        .await
        .map_err(StoreError::from_query)?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound {
                collection: collection.to_string(),
                id: id.to_string(),
            });
        }
        Ok(())
    }

    async fn delete(&self, collection: &str, id: &str) -> StoreResult<()> {
        sqlx::query("DELETE FROM documents WHERE collection = $1 AND id = $2")
            .bind(collection)
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(StoreError::Query)?;
        Ok(())
    }

    async fn query(&self, collection: &str, query: &Query) -> StoreResult<Documents> {
        let mut builder = Self::select(collection, query);
        let rows: Vec<(Json<Document>,)> = builder
            .build_query_as()
            .fetch_all(&self.pool)
            .await
            .map_err(StoreError::Query)?;

        Ok(Documents::new(
            rows.into_iter().map(|(Json(body),)| body).collect(),
        ))
    }
}
