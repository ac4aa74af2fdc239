mod common;

use std::collections::HashSet;

use common::{bob, memory_services, memory_services_with, published_focus};
use ts_core::UserId;
use ts_services::ServiceConfig;

const READERS: usize = 16;

/// Enough attempts for every writer to eventually win its race.
fn contended() -> ServiceConfig {
    ServiceConfig {
        max_write_attempts: 64,
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_reactions_from_different_users_all_land() {
    let services = memory_services_with(contended());
    let thread = published_focus(&services).await;
    let (thread_id, segment_id) = (thread.id, thread.segments[0].id);

    let mut tasks = Vec::new();
    for i in 0..READERS {
        let reactions = services.reactions.clone();
        tasks.push(tokio::spawn(async move {
            let user = UserId::from(format!("reader-{i}"));
            reactions
                .apply_reaction(thread_id, segment_id, &user, "FIRE")
                .await
        }));
    }
    for task in tasks {
        task.await.expect("task").expect("reaction");
    }

    let stored = services.threads.get(thread_id).await.unwrap();
    let users: HashSet<_> = stored.segments[0].reactions.iter().map(|r| r.user.clone()).collect();
    assert_eq!(stored.segments[0].reactions.len(), READERS);
    assert_eq!(users.len(), READERS);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_bookmarks_never_duplicate() {
    let services = memory_services_with(contended());
    let thread_id = published_focus(&services).await.id;

    let mut tasks = Vec::new();
    for _ in 0..8 {
        let bookmarks = services.bookmarks.clone();
        tasks.push(tokio::spawn(async move { bookmarks.add(&bob(), thread_id).await }));
    }
    for task in tasks {
        task.await.expect("task").expect("bookmark");
    }

    let stored = services.threads.get(thread_id).await.unwrap();
    assert_eq!(stored.bookmarks, vec![bob()]);
}

#[tokio::test]
async fn reconcile_counts_the_stored_forks() {
    let services = memory_services();
    let thread = published_focus(&services).await;
    for i in 0..3 {
        services
            .forks
            .fork(thread.id, &UserId::from(format!("remixer-{i}")))
            .await
            .unwrap();
    }
    let reconciled = services.forks.reconcile_fork_count(thread.id).await.unwrap();
    assert_eq!(reconciled.fork_count, 3);
}
