//! Bookmarks are the `bookmarks` user set on each thread; there is no separate
//! bookmark document. Add and remove are idempotent and safe to retry.

use std::sync::Arc;

use tracing::instrument;
use ts_core::{Bookmark, Result, ThreadFilter, ThreadRepo, ThreadSort, UserId};
use uuid::Uuid;

use crate::write::mutate_thread;
use crate::ServiceConfig;

#[derive(Clone)]
pub struct BookmarkService {
    repo: Arc<dyn ThreadRepo>,
    config: ServiceConfig,
}

impl BookmarkService {
    pub fn new(repo: Arc<dyn ThreadRepo>, config: ServiceConfig) -> Self {
        Self { repo, config }
    }

    pub async fn list(&self, user: &UserId) -> Result<Vec<Bookmark>> {
        let filter = ThreadFilter {
            bookmarked_by: Some(user.clone()),
            ..ThreadFilter::default()
        };
        let mut threads = self.repo.list_threads(&filter).await?;
        ThreadSort::Newest.apply(&mut threads);
        Ok(threads
            .into_iter()
            .map(|thread| Bookmark::new(thread, user.clone()))
            .collect())
    }

    #[instrument(skip(self, user), fields(user = %user))]
    pub async fn add(&self, user: &UserId, thread_id: Uuid) -> Result<Bookmark> {
        let thread = mutate_thread(self.repo.as_ref(), thread_id, self.config.attempts(), |thread| {
            Ok(thread.add_bookmark(user))
        })
        .await?;
        Ok(Bookmark::new(thread, user.clone()))
    }

    #[instrument(skip(self, user), fields(user = %user))]
    pub async fn remove(&self, user: &UserId, thread_id: Uuid) -> Result<()> {
        mutate_thread(self.repo.as_ref(), thread_id, self.config.attempts(), |thread| {
            Ok(thread.remove_bookmark(user))
        })
        .await?;
        Ok(())
    }
}
