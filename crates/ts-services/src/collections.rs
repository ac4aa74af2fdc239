//! Collection Membership Sync.
//!
//! Collections hold weak thread references: membership is never validated
//! against the thread store, and dangling ids are dropped when resolving.

use std::sync::Arc;

use chrono::Utc;
use tracing::{info, instrument};
use ts_core::{
    AppError, Collection, CollectionPatch, CollectionRepo, NewCollection, ResolvedCollection,
    Result, ThreadRepo, UserId,
};
use uuid::Uuid;

use crate::write::mutate_collection;
use crate::ServiceConfig;

#[derive(Clone)]
pub struct CollectionService {
    collections: Arc<dyn CollectionRepo>,
    threads: Arc<dyn ThreadRepo>,
    config: ServiceConfig,
}

impl CollectionService {
    pub fn new(
        collections: Arc<dyn CollectionRepo>,
        threads: Arc<dyn ThreadRepo>,
        config: ServiceConfig,
    ) -> Self {
        Self {
            collections,
            threads,
            config,
        }
    }

    #[instrument(skip(self, owner, input), fields(owner = %owner))]
    pub async fn create(&self, owner: &UserId, input: NewCollection) -> Result<Collection> {
        let collection = Collection::new(owner.clone(), input, Utc::now())?;
        let collection = self.collections.insert_collection(&collection).await?;
        info!(collection_id = %collection.id, "collection created");
        Ok(collection)
    }

    pub async fn get(&self, collection_id: Uuid, caller: &UserId) -> Result<ResolvedCollection> {
        let collection = self.owned(collection_id, caller).await?;
        let threads = self.threads.get_threads(&collection.threads).await?;
        Ok(ResolvedCollection::join(collection, threads))
    }

    /// The owner's collections, oldest first, each joined to its live threads.
    pub async fn list(&self, owner: &UserId) -> Result<Vec<ResolvedCollection>> {
        let mut collections = self.collections.list_collections(owner).await?;
        collections.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.id.cmp(&b.id)));

        let mut referenced: Vec<Uuid> = Vec::new();
        for id in collections.iter().flat_map(|c| c.threads.iter()) {
            if !referenced.contains(id) {
                referenced.push(*id);
            }
        }
        let threads = self.threads.get_threads(&referenced).await?;

        Ok(collections
            .into_iter()
            .map(|collection| {
                let members = threads
                    .iter()
                    .filter(|thread| collection.threads.contains(&thread.id))
                    .cloned()
                    .collect();
                ResolvedCollection::join(collection, members)
            })
            .collect())
    }

    #[instrument(skip(self, caller, patch), fields(caller = %caller))]
    pub async fn update(
        &self,
        collection_id: Uuid,
        caller: &UserId,
        patch: CollectionPatch,
    ) -> Result<Collection> {
        mutate_collection(self.collections.as_ref(), collection_id, self.config.attempts(), |collection| {
            collection.ensure_owner(caller)?;
            collection.apply_patch(patch.clone())?;
            Ok(true)
        })
        .await
    }

    #[instrument(skip(self, caller), fields(caller = %caller))]
    pub async fn delete(&self, collection_id: Uuid, caller: &UserId) -> Result<()> {
        self.owned(collection_id, caller).await?;
        if !self.collections.delete_collection(collection_id).await? {
            return Err(AppError::not_found("collection", collection_id));
        }
        info!(%collection_id, "collection deleted");
        Ok(())
    }

    /// Idempotent; the thread id is not checked for existence.
    #[instrument(skip(self, caller), fields(caller = %caller))]
    pub async fn add_thread(
        &self,
        collection_id: Uuid,
        caller: &UserId,
        thread_id: Uuid,
    ) -> Result<Collection> {
        mutate_collection(self.collections.as_ref(), collection_id, self.config.attempts(), |collection| {
            collection.ensure_owner(caller)?;
            Ok(collection.add_thread(thread_id))
        })
        .await
    }

    /// Idempotent; removing an absent reference is not an error.
    #[instrument(skip(self, caller), fields(caller = %caller))]
    pub async fn remove_thread(
        &self,
        collection_id: Uuid,
        caller: &UserId,
        thread_id: Uuid,
    ) -> Result<Collection> {
        mutate_collection(self.collections.as_ref(), collection_id, self.config.attempts(), |collection| {
            collection.ensure_owner(caller)?;
            Ok(collection.remove_thread(thread_id))
        })
        .await
    }

    async fn owned(&self, collection_id: Uuid, caller: &UserId) -> Result<Collection> {
        let collection = self
            .collections
            .get_collection(collection_id)
            .await?
            .ok_or_else(|| AppError::not_found("collection", collection_id))?;
        collection.ensure_owner(caller)?;
        Ok(collection)
    }
}
