//! Version-checked read-modify-write over a single document.
//!
//! The closure returns whether the document changed; unchanged documents are not
//! written back. On `Conflict` the document is re-read and the closure re-applied
//! to the fresh state, so an action is never applied to stale data.

use chrono::Utc;
use tracing::debug;
use ts_core::{AppError, Collection, CollectionRepo, Result, Thread, ThreadRepo};
use uuid::Uuid;

pub(crate) async fn mutate_thread<F>(
    repo: &dyn ThreadRepo,
    thread_id: Uuid,
    max_attempts: u32,
    mut apply: F,
) -> Result<Thread>
where
    F: FnMut(&mut Thread) -> Result<bool> + Send,
{
    let mut attempt = 1;
    loop {
        let mut thread = repo
            .get_thread(thread_id)
            .await?
            .ok_or_else(|| AppError::not_found("thread", thread_id))?;
        if !apply(&mut thread)? {
            return Ok(thread);
        }
        thread.touch(Utc::now());
        match repo.replace_thread(&thread).await {
            Err(AppError::Conflict(reason)) if attempt < max_attempts => {
                debug!(%thread_id, attempt, %reason, "thread changed concurrently, retrying");
                attempt += 1;
            }
            result => return result,
        }
    }
}

pub(crate) async fn mutate_collection<F>(
    repo: &dyn CollectionRepo,
    collection_id: Uuid,
    max_attempts: u32,
    mut apply: F,
) -> Result<Collection>
where
    F: FnMut(&mut Collection) -> Result<bool> + Send,
{
    let mut attempt = 1;
    loop {
        let mut collection = repo
            .get_collection(collection_id)
            .await?
            .ok_or_else(|| AppError::not_found("collection", collection_id))?;
        if !apply(&mut collection)? {
            return Ok(collection);
        }
        collection.touch(Utc::now());
        match repo.replace_collection(&collection).await {
            Err(AppError::Conflict(reason)) if attempt < max_attempts => {
                debug!(%collection_id, attempt, %reason, "collection changed concurrently, retrying");
                attempt += 1;
            }
            result => return result,
        }
    }
}
