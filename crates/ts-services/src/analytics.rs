//! Read-only reporting over an author's threads.

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::Serialize;
use tracing::instrument;
use ts_core::{AppError, Result, Thread, ThreadFilter, ThreadRepo, UserId};
use uuid::Uuid;

const TOP_THREAD_LIMIT: usize = 10;
const TOP_SEGMENT_LIMIT: usize = 5;
const TIMELINE_DAYS: i64 = 30;
const EXCERPT_LENGTH: usize = 100;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthorAnalytics {
    pub thread_count: usize,
    pub published_thread_count: usize,
    pub draft_thread_count: usize,
    pub bookmarks_received: usize,
    pub reaction_count: usize,
    pub fork_count: u64,
    /// Keyed by canonical reaction token.
    pub reactions_by_type: BTreeMap<String, usize>,
    pub top_threads: Vec<ThreadPerformance>,
    pub most_forked_thread: Option<ThreadPerformance>,
    pub top_reacted_segments: Vec<SegmentPerformance>,
    pub activity_timeline: Vec<TimelineDay>,
    pub average_reactions_per_thread: f64,
    pub average_bookmarks_per_thread: f64,
    pub average_forks_per_thread: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ThreadPerformance {
    pub id: Uuid,
    pub title: String,
    pub bookmarks: usize,
    pub reactions: usize,
    pub forks: u32,
    pub segments: usize,
    pub created_at: DateTime<Utc>,
}

impl ThreadPerformance {
    fn of(thread: &Thread) -> Self {
        Self {
            id: thread.id,
            title: thread.title.clone(),
            bookmarks: thread.bookmark_count(),
            reactions: thread.reaction_count(),
            forks: thread.fork_count,
            segments: thread.segments.len(),
            created_at: thread.created_at,
        }
    }

    fn engagement(&self) -> usize {
        self.bookmarks + self.reactions + self.forks as usize
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SegmentPerformance {
    pub thread_id: Uuid,
    pub thread_title: String,
    /// 1-based position within the thread.
    pub segment_index: usize,
    pub excerpt: String,
    pub reaction_count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimelineDay {
    pub date: NaiveDate,
    pub count: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ThreadStats {
    pub reaction_count: usize,
    pub bookmark_count: usize,
}

#[derive(Clone)]
pub struct AnalyticsService {
    repo: Arc<dyn ThreadRepo>,
}

impl AnalyticsService {
    pub fn new(repo: Arc<dyn ThreadRepo>) -> Self {
        Self { repo }
    }

    #[instrument(skip(self, caller), fields(caller = %caller))]
    pub async fn for_author(&self, caller: &UserId, now: DateTime<Utc>) -> Result<AuthorAnalytics> {
        let filter = ThreadFilter {
            author: Some(caller.clone()),
            ..ThreadFilter::default()
        };
        let threads = self.repo.list_threads(&filter).await?;
        Ok(summarize(&threads, now))
    }

    pub async fn for_thread(&self, thread_id: Uuid) -> Result<ThreadStats> {
        let thread = self
            .repo
            .get_thread(thread_id)
            .await?
            .ok_or_else(|| AppError::not_found("thread", thread_id))?;
        Ok(ThreadStats {
            reaction_count: thread.reaction_count(),
            bookmark_count: thread.bookmark_count(),
        })
    }
}

fn summarize(threads: &[Thread], now: DateTime<Utc>) -> AuthorAnalytics {
    let thread_count = threads.len();
    let published_thread_count = threads.iter().filter(|t| !t.is_draft).count();
    let bookmarks_received: usize = threads.iter().map(Thread::bookmark_count).sum();
    let reaction_count: usize = threads.iter().map(Thread::reaction_count).sum();
    let fork_count: u64 = threads.iter().map(|t| u64::from(t.fork_count)).sum();

    let mut reactions_by_type = BTreeMap::new();
    for reaction in threads
        .iter()
        .flat_map(|t| t.segments.iter())
        .flat_map(|s| s.reactions.iter())
    {
        *reactions_by_type.entry(reaction.kind.token().to_string()).or_insert(0) += 1;
    }

    let published: Vec<ThreadPerformance> = threads
        .iter()
        .filter(|t| !t.is_draft)
        .map(ThreadPerformance::of)
        .collect();

    let mut top_threads = published.clone();
    top_threads.sort_by(|a, b| b.engagement().cmp(&a.engagement()));
    top_threads.truncate(TOP_THREAD_LIMIT);

    let most_forked_thread = published
        .into_iter()
        .filter(|p| p.forks > 0)
        .reduce(|best, p| if p.forks > best.forks { p } else { best });

    AuthorAnalytics {
        thread_count,
        published_thread_count,
        draft_thread_count: thread_count - published_thread_count,
        bookmarks_received,
        reaction_count,
        fork_count,
        reactions_by_type,
        top_threads,
        most_forked_thread,
        top_reacted_segments: top_segments(threads),
        activity_timeline: timeline(threads, now),
        average_reactions_per_thread: average(reaction_count as f64, thread_count),
        average_bookmarks_per_thread: average(bookmarks_received as f64, thread_count),
        average_forks_per_thread: average(fork_count as f64, thread_count),
    }
}

fn top_segments(threads: &[Thread]) -> Vec<SegmentPerformance> {
    let mut segments: Vec<SegmentPerformance> = threads
        .iter()
        .flat_map(|thread| {
            thread
                .segments
                .iter()
                .enumerate()
                .filter(|(_, segment)| !segment.reactions.is_empty())
                .map(move |(index, segment)| SegmentPerformance {
                    thread_id: thread.id,
                    thread_title: thread.title.clone(),
                    segment_index: index + 1,
                    excerpt: excerpt(&segment.content),
                    reaction_count: segment.reactions.len(),
                })
        })
        .collect();
    segments.sort_by(|a, b| b.reaction_count.cmp(&a.reaction_count));
    segments.truncate(TOP_SEGMENT_LIMIT);
    segments
}

/// Daily creation counts for the window ending on `now`'s date, oldest first.
fn timeline(threads: &[Thread], now: DateTime<Utc>) -> Vec<TimelineDay> {
    let today = now.date_naive();
    (0..TIMELINE_DAYS)
        .rev()
        .map(|days_back| {
            let date = today - Duration::days(days_back);
            let count = threads
                .iter()
                .filter(|t| t.created_at.date_naive() == date)
                .count();
            TimelineDay { date, count }
        })
        .collect()
}

fn average(total: f64, threads: usize) -> f64 {
    if threads == 0 {
        return 0.0;
    }
    (total / threads as f64 * 10.0).round() / 10.0
}

/// Drops anything between `<` and `>` and cuts to the excerpt length.
fn excerpt(content: &str) -> String {
    let mut plain = String::with_capacity(content.len());
    let mut in_tag = false;
    for c in content.chars() {
        match c {
            '<' => in_tag = true,
            '>' if in_tag => in_tag = false,
            _ if !in_tag => plain.push(c),
            _ => {}
        }
    }
    if plain.chars().count() <= EXCERPT_LENGTH {
        return plain;
    }
    let mut cut: String = plain.chars().take(EXCERPT_LENGTH).collect();
    cut.push_str("...");
    cut
}
