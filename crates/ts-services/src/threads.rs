//! Thread Store: create, read, patch, publish, delete and list threads.

use std::sync::Arc;

use chrono::Utc;
use tracing::{info, instrument};
use ts_core::{
    AppError, NewThread, Result, Thread, ThreadDetail, ThreadFilter, ThreadPatch, ThreadRepo,
    ThreadSort, UserId,
};
use uuid::Uuid;

use crate::forks::ForkManager;
use crate::write::mutate_thread;
use crate::ServiceConfig;

const RELATED_THREAD_LIMIT: usize = 5;

#[derive(Clone)]
pub struct ThreadService {
    repo: Arc<dyn ThreadRepo>,
    forks: ForkManager,
    config: ServiceConfig,
}

impl ThreadService {
    pub fn new(repo: Arc<dyn ThreadRepo>, config: ServiceConfig) -> Self {
        let forks = ForkManager::new(repo.clone(), config);
        Self { repo, forks, config }
    }

    #[instrument(skip(self, author, input), fields(author = %author))]
    pub async fn create(&self, author: &UserId, input: NewThread) -> Result<Thread> {
        let thread = Thread::new(author.clone(), input, Utc::now())?;
        let thread = self.repo.insert_thread(&thread).await?;
        info!(thread_id = %thread.id, segments = thread.segments.len(), "thread created");
        Ok(thread)
    }

    pub async fn get(&self, thread_id: Uuid) -> Result<Thread> {
        self.repo
            .get_thread(thread_id)
            .await?
            .ok_or_else(|| AppError::not_found("thread", thread_id))
    }

    /// The thread, its one-level fork attribution, and up to five published
    /// threads sharing a tag with it (newest first).
    #[instrument(skip(self))]
    pub async fn get_detail(&self, thread_id: Uuid) -> Result<ThreadDetail> {
        let thread = self.get(thread_id).await?;
        let lineage = self.forks.lineage(&thread).await?;
        let related_threads = self.related(&thread).await?;
        Ok(ThreadDetail {
            thread,
            lineage,
            related_threads,
        })
    }

    async fn related(&self, thread: &Thread) -> Result<Vec<Thread>> {
        if thread.tags.is_empty() {
            return Ok(Vec::new());
        }
        let mut related: Vec<Thread> = self
            .repo
            .list_threads(&ThreadFilter::published())
            .await?
            .into_iter()
            .filter(|candidate| candidate.id != thread.id && candidate.shares_tag_with(thread))
            .collect();
        ThreadSort::Newest.apply(&mut related);
        related.truncate(RELATED_THREAD_LIMIT);
        Ok(related)
    }

    #[instrument(skip(self, caller, patch), fields(caller = %caller))]
    pub async fn update(&self, thread_id: Uuid, caller: &UserId, patch: ThreadPatch) -> Result<Thread> {
        mutate_thread(self.repo.as_ref(), thread_id, self.config.attempts(), |thread| {
            thread.ensure_author(caller, "update")?;
            thread.apply_patch(patch.clone())?;
            Ok(true)
        })
        .await
    }

    #[instrument(skip(self, caller), fields(caller = %caller))]
    pub async fn publish(&self, thread_id: Uuid, caller: &UserId) -> Result<Thread> {
        let thread = mutate_thread(self.repo.as_ref(), thread_id, self.config.attempts(), |thread| {
            thread.ensure_author(caller, "publish")?;
            thread.publish()?;
            Ok(true)
        })
        .await?;
        info!(%thread_id, "thread published");
        Ok(thread)
    }

    /// Segments and reactions go with the thread. Collections keep their
    /// references and filter them out on read.
    #[instrument(skip(self, caller), fields(caller = %caller))]
    pub async fn delete(&self, thread_id: Uuid, caller: &UserId) -> Result<()> {
        let thread = self.get(thread_id).await?;
        thread.ensure_author(caller, "delete")?;
        if !self.repo.delete_thread(thread_id).await? {
            return Err(AppError::not_found("thread", thread_id));
        }
        info!(%thread_id, "thread deleted");
        Ok(())
    }

    pub async fn list(&self, filter: &ThreadFilter, sort: ThreadSort) -> Result<Vec<Thread>> {
        let mut threads = self.repo.list_threads(filter).await?;
        sort.apply(&mut threads);
        Ok(threads)
    }

    /// Published threads, `popular` or `newest`.
    pub async fn list_public(&self, tag: Option<String>, sort: Option<&str>) -> Result<Vec<Thread>> {
        let filter = ThreadFilter::published().with_tag(tag);
        self.list(&filter, ThreadSort::for_public_listing(sort)).await
    }

    /// Published threads, `popular`, `forked` or `newest`.
    pub async fn list_featured(&self, tag: Option<String>, sort: Option<&str>) -> Result<Vec<Thread>> {
        let filter = ThreadFilter::published().with_tag(tag);
        self.list(&filter, ThreadSort::for_featured_listing(sort)).await
    }

    /// The caller's own threads, drafts included, newest first.
    pub async fn list_for_author(&self, caller: &UserId) -> Result<Vec<Thread>> {
        let filter = ThreadFilter {
            author: Some(caller.clone()),
            ..ThreadFilter::default()
        };
        self.list(&filter, ThreadSort::Newest).await
    }
}
