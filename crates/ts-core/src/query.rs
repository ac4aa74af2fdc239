//! Listing filters and orderings shared by every storage backend.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::{Thread, UserId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DraftState {
    Draft,
    Published,
}

/// Conjunctive filter; `None` fields match everything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ThreadFilter {
    pub tag: Option<String>,
    pub draft_state: Option<DraftState>,
    pub author: Option<UserId>,
    pub bookmarked_by: Option<UserId>,
    pub forked_from: Option<Uuid>,
}

impl ThreadFilter {
    pub fn published() -> Self {
        Self {
            draft_state: Some(DraftState::Published),
            ..Self::default()
        }
    }

    pub fn with_tag(mut self, tag: Option<String>) -> Self {
        self.tag = tag.map(|tag| tag.trim().to_string()).filter(|tag| !tag.is_empty());
        self
    }

    pub fn matches(&self, thread: &Thread) -> bool {
        if let Some(tag) = &self.tag {
            if !thread.has_tag(tag) {
                return false;
            }
        }
        match self.draft_state {
            Some(DraftState::Draft) if !thread.is_draft => return false,
            Some(DraftState::Published) if thread.is_draft => return false,
            _ => {}
        }
        if let Some(author) = &self.author {
            if &thread.author != author {
                return false;
            }
        }
        if let Some(user) = &self.bookmarked_by {
            if !thread.is_bookmarked_by(user) {
                return false;
            }
        }
        if let Some(source) = self.forked_from {
            if thread.original_thread != Some(source) {
                return false;
            }
        }
        true
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThreadSort {
    /// Most bookmarked first
    Popular,
    /// Highest fork count first
    Forked,
    Newest,
}

impl ThreadSort {
    /// The public listing knows `popular` and `newest`; absent means popular,
    /// anything unrecognised means newest.
    pub fn for_public_listing(raw: Option<&str>) -> Self {
        match raw {
            None | Some("popular") => ThreadSort::Popular,
            _ => ThreadSort::Newest,
        }
    }

    /// The featured listing also knows `forked`; anything else means popular.
    pub fn for_featured_listing(raw: Option<&str>) -> Self {
        match raw {
            Some("forked") => ThreadSort::Forked,
            Some("newest") => ThreadSort::Newest,
            _ => ThreadSort::Popular,
        }
    }

    /// Ties fall back to newest first, then to id for a total order.
    pub fn apply(self, threads: &mut [Thread]) {
        threads.sort_by(|a, b| self.primary(a, b).then_with(|| newest_first(a, b)));
    }

    fn primary(self, a: &Thread, b: &Thread) -> Ordering {
        match self {
            ThreadSort::Popular => b.bookmark_count().cmp(&a.bookmark_count()),
            ThreadSort::Forked => b.fork_count.cmp(&a.fork_count),
            ThreadSort::Newest => Ordering::Equal,
        }
    }
}

pub fn newest_first(a: &Thread, b: &Thread) -> Ordering {
    b.created_at
        .cmp(&a.created_at)
        .then_with(|| b.id.cmp(&a.id))
}
