//! Fork/Remix Manager.
//!
//! A fork is two separate writes: the new draft, then the source's counter.
//! If the second write fails the fork is kept and the counter under-reports
//! until [`ForkManager::reconcile_fork_count`] recounts it.

use std::sync::Arc;

use chrono::Utc;
use tracing::{info, instrument, warn};
use ts_core::{AppError, LineageRef, Result, Thread, ThreadFilter, ThreadRepo, UserId};
use uuid::Uuid;

use crate::write::mutate_thread;
use crate::ServiceConfig;

#[derive(Clone)]
pub struct ForkManager {
    repo: Arc<dyn ThreadRepo>,
    config: ServiceConfig,
}

impl ForkManager {
    pub fn new(repo: Arc<dyn ThreadRepo>, config: ServiceConfig) -> Self {
        Self { repo, config }
    }

    #[instrument(skip(self, caller), fields(caller = %caller))]
    pub async fn fork(&self, source_id: Uuid, caller: &UserId) -> Result<Thread> {
        let source = self
            .repo
            .get_thread(source_id)
            .await?
            .ok_or_else(|| AppError::not_found("thread", source_id))?;

        let fork = source.fork_for(caller.clone(), Utc::now());
        let fork = self.repo.insert_thread(&fork).await?;
        info!(%source_id, fork_id = %fork.id, "thread forked");

        let incremented = mutate_thread(self.repo.as_ref(), source_id, self.config.attempts(), |source| {
            source.fork_count += 1;
            Ok(true)
        })
        .await;
        if let Err(err) = incremented {
            warn!(
                %source_id,
                fork_id = %fork.id,
                error = %err,
                "fork stored but the source fork count was not incremented"
            );
        }
        Ok(fork)
    }

    /// Recomputes `forkCount` from the forks that actually reference the source.
    #[instrument(skip(self))]
    pub async fn reconcile_fork_count(&self, source_id: Uuid) -> Result<Thread> {
        let filter = ThreadFilter {
            forked_from: Some(source_id),
            ..ThreadFilter::default()
        };
        let actual = u32::try_from(self.repo.list_threads(&filter).await?.len())
            .map_err(|_| AppError::InvalidState("fork count overflow".to_string()))?;

        mutate_thread(self.repo.as_ref(), source_id, self.config.attempts(), |source| {
            if source.fork_count == actual {
                return Ok(false);
            }
            info!(%source_id, recorded = source.fork_count, actual, "fork count repaired");
            source.fork_count = actual;
            Ok(true)
        })
        .await
    }

    /// One-level attribution: who wrote the thread this one was forked from.
    /// Grandparents are not followed. A deleted source yields `None`.
    pub async fn lineage(&self, thread: &Thread) -> Result<Option<LineageRef>> {
        let Some(source_id) = thread.original_thread else {
            return Ok(None);
        };
        Ok(self.repo.get_thread(source_id).await?.map(|source| LineageRef {
            thread_id: source.id,
            author: source.author,
            title: source.title,
        }))
    }
}
