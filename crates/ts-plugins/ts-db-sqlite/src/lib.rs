//! # ts-db-sqlite Implementation
//!
//! Threads and collections are stored as JSON documents, one row each. The
//! columns beside `doc` exist only for lookups and for the version check.

use std::str::FromStr;

use anyhow::Context;
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use sqlx::{QueryBuilder, Row, Sqlite};
use tracing::info;
use ts_core::{
    AppError, Collection, CollectionRepo, DraftState, Result, Thread, ThreadFilter, ThreadRepo,
    UserId,
};
use uuid::Uuid;

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS threads (
    id              TEXT PRIMARY KEY,
    author          TEXT NOT NULL,
    is_draft        INTEGER NOT NULL,
    original_thread TEXT,
    created_at      TEXT NOT NULL,
    version         INTEGER NOT NULL,
    doc             TEXT NOT NULL
);
CREATE INDEX IF NOT EXISTS threads_author ON threads (author);
CREATE INDEX IF NOT EXISTS threads_original ON threads (original_thread);

CREATE TABLE IF NOT EXISTS collections (
    id      TEXT PRIMARY KEY,
    owner   TEXT NOT NULL,
    version INTEGER NOT NULL,
    doc     TEXT NOT NULL
);
CREATE INDEX IF NOT EXISTS collections_owner ON collections (owner);
"#;

#[derive(Clone)]
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    /// Opens (creating if needed) the database at `url` and applies the schema.
    /// An in-memory database is pinned to a single connection so it survives.
    pub async fn new(url: &str) -> Result<Self> {
        let options = SqliteConnectOptions::from_str(url)
            .with_context(|| format!("invalid sqlite url {url}"))?
            .create_if_missing(true);
        let in_memory = url.contains(":memory:");
        let pool = if in_memory {
            SqlitePoolOptions::new()
                .max_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
        } else {
            SqlitePoolOptions::new().max_connections(5)
        }
        .connect_with(options)
        .await
        .context("failed to open sqlite database")?;

        sqlx::raw_sql(SCHEMA)
            .execute(&pool)
            .await
            .context("failed to apply schema")?;
        info!(in_memory, "sqlite store ready");
        Ok(Self { pool })
    }

    async fn stored_version(&self, table: &str, id: Uuid) -> Result<Option<i64>> {
        let row = sqlx::query(&format!("SELECT version FROM {table} WHERE id = ?"))
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await
            .context("failed to read version")?;
        Ok(row.map(|row| row.get("version")))
    }
}

fn encode<T: Serialize>(doc: &T) -> Result<String> {
    Ok(serde_json::to_string(doc).context("failed to encode document")?)
}

fn decode<T: DeserializeOwned>(doc: &str) -> Result<T> {
    Ok(serde_json::from_str(doc).context("corrupt document")?)
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db) if db.is_unique_violation())
}

#[async_trait]
impl ThreadRepo for SqliteStore {
    async fn insert_thread(&self, thread: &Thread) -> Result<Thread> {
        let inserted = sqlx::query(
            "INSERT INTO threads (id, author, is_draft, original_thread, created_at, version, doc) VALUES (?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(thread.id.to_string())
        .bind(thread.author.as_str())
        .bind(thread.is_draft)
        .bind(thread.original_thread.map(|id| id.to_string()))
        .bind(thread.created_at)
        .bind(thread.version as i64)
        .bind(encode(thread)?)
        .execute(&self.pool)
        .await;

        match inserted {
            Ok(_) => Ok(thread.clone()),
            Err(err) if is_unique_violation(&err) => {
                Err(AppError::Conflict(format!("thread {} already exists", thread.id)))
            }
            Err(err) => Err(anyhow::Error::new(err).context("failed to insert thread").into()),
        }
    }

    async fn get_thread(&self, id: Uuid) -> Result<Option<Thread>> {
        let row = sqlx::query("SELECT doc FROM threads WHERE id = ?")
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await
            .context("failed to fetch thread")?;
        row.map(|row| decode(row.get::<&str, _>("doc"))).transpose()
    }

    async fn get_threads(&self, ids: &[Uuid]) -> Result<Vec<Thread>> {
        let mut found = Vec::with_capacity(ids.len());
        for id in ids {
            if let Some(thread) = self.get_thread(*id).await? {
                found.push(thread);
            }
        }
        Ok(found)
    }

    /// Author, draft state and fork source are filtered in SQL; tags and
    /// bookmarks live inside the document and are matched after decoding.
    async fn list_threads(&self, filter: &ThreadFilter) -> Result<Vec<Thread>> {
        let mut query = QueryBuilder::<Sqlite>::new("SELECT doc FROM threads WHERE 1 = 1");
        if let Some(author) = &filter.author {
            query.push(" AND author = ").push_bind(author.as_str().to_string());
        }
        if let Some(state) = filter.draft_state {
            query
                .push(" AND is_draft = ")
                .push_bind(state == DraftState::Draft);
        }
        if let Some(source) = filter.forked_from {
            query.push(" AND original_thread = ").push_bind(source.to_string());
        }

        let rows = query
            .build()
            .fetch_all(&self.pool)
            .await
            .context("failed to list threads")?;

        let mut threads = Vec::with_capacity(rows.len());
        for row in rows {
            let thread: Thread = decode(row.get::<&str, _>("doc"))?;
            if filter.matches(&thread) {
                threads.push(thread);
            }
        }
        Ok(threads)
    }

    async fn replace_thread(&self, thread: &Thread) -> Result<Thread> {
        let mut next = thread.clone();
        next.version += 1;
        let updated = sqlx::query(
            "UPDATE threads SET is_draft = ?, version = ?, doc = ? WHERE id = ? AND version = ?",
        )
        .bind(next.is_draft)
        .bind(next.version as i64)
        .bind(encode(&next)?)
        .bind(thread.id.to_string())
        .bind(thread.version as i64)
        .execute(&self.pool)
        .await
        .context("failed to replace thread")?;

        if updated.rows_affected() == 1 {
            return Ok(next);
        }
        match self.stored_version("threads", thread.id).await? {
            None => Err(AppError::not_found("thread", thread.id)),
            Some(stored) => Err(AppError::Conflict(format!(
                "thread {} is at version {stored}, not {}",
                thread.id, thread.version
            ))),
        }
    }

    async fn delete_thread(&self, id: Uuid) -> Result<bool> {
        let deleted = sqlx::query("DELETE FROM threads WHERE id = ?")
            .bind(id.to_string())
            .execute(&self.pool)
            .await
            .context("failed to delete thread")?;
        Ok(deleted.rows_affected() > 0)
    }
}

#[async_trait]
impl CollectionRepo for SqliteStore {
    async fn insert_collection(&self, collection: &Collection) -> Result<Collection> {
        let inserted = sqlx::query("INSERT INTO collections (id, owner, version, doc) VALUES (?, ?, ?, ?)")
            .bind(collection.id.to_string())
            .bind(collection.owner.as_str())
            .bind(collection.version as i64)
            .bind(encode(collection)?)
            .execute(&self.pool)
            .await;

        match inserted {
            Ok(_) => Ok(collection.clone()),
            Err(err) if is_unique_violation(&err) => Err(AppError::Conflict(format!(
                "collection {} already exists",
                collection.id
            ))),
            Err(err) => Err(anyhow::Error::new(err).context("failed to insert collection").into()),
        }
    }

    async fn get_collection(&self, id: Uuid) -> Result<Option<Collection>> {
        let row = sqlx::query("SELECT doc FROM collections WHERE id = ?")
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await
            .context("failed to fetch collection")?;
        row.map(|row| decode(row.get::<&str, _>("doc"))).transpose()
    }

    async fn list_collections(&self, owner: &UserId) -> Result<Vec<Collection>> {
        let rows = sqlx::query("SELECT doc FROM collections WHERE owner = ?")
            .bind(owner.as_str())
            .fetch_all(&self.pool)
            .await
            .context("failed to list collections")?;
        rows.iter()
            .map(|row| decode(row.get::<&str, _>("doc")))
            .collect()
    }

    async fn replace_collection(&self, collection: &Collection) -> Result<Collection> {
        let mut next = collection.clone();
        next.version += 1;
        let updated = sqlx::query("UPDATE collections SET version = ?, doc = ? WHERE id = ? AND version = ?")
            .bind(next.version as i64)
            .bind(encode(&next)?)
            .bind(collection.id.to_string())
            .bind(collection.version as i64)
            .execute(&self.pool)
            .await
            .context("failed to replace collection")?;

        if updated.rows_affected() == 1 {
            return Ok(next);
        }
        match self.stored_version("collections", collection.id).await? {
            None => Err(AppError::not_found("collection", collection.id)),
            Some(stored) => Err(AppError::Conflict(format!(
                "collection {} is at version {stored}, not {}",
                collection.id, collection.version
            ))),
        }
    }

    async fn delete_collection(&self, id: Uuid) -> Result<bool> {
        let deleted = sqlx::query("DELETE FROM collections WHERE id = ?")
            .bind(id.to_string())
            .execute(&self.pool)
            .await
            .context("failed to delete collection")?;
        Ok(deleted.rows_affected() > 0)
    }
}
