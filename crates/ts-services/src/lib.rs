//! # ts-services
//!
//! Use cases over the Thread aggregate and collections. Every operation takes the
//! caller's id explicitly; nothing here reads ambient authentication state.

pub mod analytics;
pub mod bookmarks;
pub mod collections;
pub mod forks;
pub mod reactions;
pub mod threads;

mod write;

use std::sync::Arc;

use ts_core::{CollectionRepo, ThreadRepo};

pub use analytics::AnalyticsService;
pub use bookmarks::BookmarkService;
pub use collections::CollectionService;
pub use forks::ForkManager;
pub use reactions::ReactionEngine;
pub use threads::ThreadService;

/// Tuning shared by every service.
#[derive(Debug, Clone, Copy)]
pub struct ServiceConfig {
    /// How many times a conditional write is attempted before `Conflict` is surfaced.
    pub max_write_attempts: u32,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            max_write_attempts: 3,
        }
    }
}

impl ServiceConfig {
    fn attempts(&self) -> u32 {
        self.max_write_attempts.max(1)
    }
}

/// All services wired over one pair of repositories.
#[derive(Clone)]
pub struct Services {
    pub threads: ThreadService,
    pub reactions: ReactionEngine,
    pub forks: ForkManager,
    pub bookmarks: BookmarkService,
    pub collections: CollectionService,
    pub analytics: AnalyticsService,
}

impl Services {
    pub fn new(
        threads: Arc<dyn ThreadRepo>,
        collections: Arc<dyn CollectionRepo>,
        config: ServiceConfig,
    ) -> Self {
        Self {
            threads: ThreadService::new(threads.clone(), config),
            reactions: ReactionEngine::new(threads.clone(), config),
            forks: ForkManager::new(threads.clone(), config),
            bookmarks: BookmarkService::new(threads.clone(), config),
            collections: CollectionService::new(collections, threads.clone(), config),
            analytics: AnalyticsService::new(threads),
        }
    }
}
