//! # ts-db-memory
//!
//! Process-local document store backed by `DashMap`. The version check and the
//! write happen under the same shard lock, so a replace is atomic per document.

use std::sync::Arc;

use async_trait::async_trait;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use ts_core::{
    AppError, Collection, CollectionRepo, Result, Thread, ThreadFilter, ThreadRepo, UserId,
};
use uuid::Uuid;

#[derive(Clone, Default)]
pub struct MemoryStore {
    threads: Arc<DashMap<Uuid, Thread>>,
    collections: Arc<DashMap<Uuid, Collection>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ThreadRepo for MemoryStore {
    async fn insert_thread(&self, thread: &Thread) -> Result<Thread> {
        match self.threads.entry(thread.id) {
            Entry::Occupied(_) => Err(AppError::Conflict(format!("thread {} already exists", thread.id))),
            Entry::Vacant(slot) => {
                slot.insert(thread.clone());
                Ok(thread.clone())
            }
        }
    }

    async fn get_thread(&self, id: Uuid) -> Result<Option<Thread>> {
        Ok(self.threads.get(&id).map(|entry| entry.value().clone()))
    }

    async fn get_threads(&self, ids: &[Uuid]) -> Result<Vec<Thread>> {
        Ok(ids
            .iter()
            .filter_map(|id| self.threads.get(id).map(|entry| entry.value().clone()))
            .collect())
    }

    async fn list_threads(&self, filter: &ThreadFilter) -> Result<Vec<Thread>> {
        Ok(self
            .threads
            .iter()
            .filter(|entry| filter.matches(entry.value()))
            .map(|entry| entry.value().clone())
            .collect())
    }

    async fn replace_thread(&self, thread: &Thread) -> Result<Thread> {
        let mut stored = self
            .threads
            .get_mut(&thread.id)
            .ok_or_else(|| AppError::not_found("thread", thread.id))?;
        if stored.version != thread.version {
            return Err(AppError::Conflict(format!(
                "thread {} is at version {}, not {}",
                thread.id, stored.version, thread.version
            )));
        }
        let mut next = thread.clone();
        next.version += 1;
        *stored = next.clone();
        Ok(next)
    }

    async fn delete_thread(&self, id: Uuid) -> Result<bool> {
        Ok(self.threads.remove(&id).is_some())
    }
}

#[async_trait]
impl CollectionRepo for MemoryStore {
    async fn insert_collection(&self, collection: &Collection) -> Result<Collection> {
        match self.collections.entry(collection.id) {
            Entry::Occupied(_) => Err(AppError::Conflict(format!(
                "collection {} already exists",
                collection.id
            ))),
            Entry::Vacant(slot) => {
                slot.insert(collection.clone());
                Ok(collection.clone())
            }
        }
    }

    async fn get_collection(&self, id: Uuid) -> Result<Option<Collection>> {
        Ok(self.collections.get(&id).map(|entry| entry.value().clone()))
    }

    async fn list_collections(&self, owner: &UserId) -> Result<Vec<Collection>> {
        Ok(self
            .collections
            .iter()
            .filter(|entry| &entry.owner == owner)
            .map(|entry| entry.value().clone())
            .collect())
    }

    async fn replace_collection(&self, collection: &Collection) -> Result<Collection> {
        let mut stored = self
            .collections
            .get_mut(&collection.id)
            .ok_or_else(|| AppError::not_found("collection", collection.id))?;
        if stored.version != collection.version {
            return Err(AppError::Conflict(format!(
                "collection {} is at version {}, not {}",
                collection.id, stored.version, collection.version
            )));
        }
        let mut next = collection.clone();
        next.version += 1;
        *stored = next.clone();
        Ok(next)
    }

    async fn delete_collection(&self, id: Uuid) -> Result<bool> {
        Ok(self.collections.remove(&id).is_some())
    }
}
