//! # Core Traits (Ports)
//!
//! Any storage plugin must implement these traits to be used by the binary.
//! The store is document shaped: one document per thread or collection,
//! atomic per document, no multi-document transactions.

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::Result;
use crate::models::{Collection, Thread, UserId};
use crate::query::ThreadFilter;

/// Persistence contract for thread documents (segments and reactions included).
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait ThreadRepo: Send + Sync {
    /// Fails with `Conflict` if the id is already taken.
    async fn insert_thread(&self, thread: &Thread) -> Result<Thread>;

    async fn get_thread(&self, id: Uuid) -> Result<Option<Thread>>;

    /// Returns the threads that exist, in the order of `ids`. Missing ids are skipped.
    async fn get_threads(&self, ids: &[Uuid]) -> Result<Vec<Thread>>;

    /// Unordered; callers apply a `ThreadSort`.
    async fn list_threads(&self, filter: &ThreadFilter) -> Result<Vec<Thread>>;

    /// Conditional replace: succeeds only if the stored version equals
    /// `thread.version`, and returns the stored document with the bumped version.
    /// `NotFound` if the document is gone, `Conflict` if someone wrote first.
    async fn replace_thread(&self, thread: &Thread) -> Result<Thread>;

    /// Returns false if there was nothing to delete.
    async fn delete_thread(&self, id: Uuid) -> Result<bool>;
}

/// Persistence contract for collection documents.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait CollectionRepo: Send + Sync {
    async fn insert_collection(&self, collection: &Collection) -> Result<Collection>;

    async fn get_collection(&self, id: Uuid) -> Result<Option<Collection>>;

    async fn list_collections(&self, owner: &UserId) -> Result<Vec<Collection>>;

    /// Same conditional semantics as [`ThreadRepo::replace_thread`].
    async fn replace_collection(&self, collection: &Collection) -> Result<Collection>;

    async fn delete_collection(&self, id: Uuid) -> Result<bool>;
}
