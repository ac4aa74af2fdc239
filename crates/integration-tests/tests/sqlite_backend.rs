//! The same service flows over the SQLite document store.

mod common;

use std::sync::Arc;

use common::{alice, bob, carol, focus};
use ts_core::{AppError, NewCollection};
use ts_db_sqlite::SqliteStore;
use ts_services::{ServiceConfig, Services};

async fn sqlite_services() -> Services {
    let store = Arc::new(SqliteStore::new("sqlite::memory:").await.expect("sqlite"));
    Services::new(store.clone(), store, ServiceConfig::default())
}

#[tokio::test]
async fn full_flow_persists_through_sqlite() {
    let services = sqlite_services().await;
    let thread = services.threads.create(&alice(), focus()).await.unwrap();
    let thread = services.threads.publish(thread.id, &alice()).await.unwrap();
    let segment_id = thread.segments[0].id;

    services
        .reactions
        .apply_reaction(thread.id, segment_id, &bob(), "FIRE")
        .await
        .unwrap();
    services
        .reactions
        .apply_reaction(thread.id, segment_id, &bob(), "LIGHT_BULB")
        .await
        .unwrap();
    let fork = services.forks.fork(thread.id, &carol()).await.unwrap();
    services.bookmarks.add(&bob(), thread.id).await.unwrap();

    let stored = services.threads.get(thread.id).await.unwrap();
    assert_eq!(stored.fork_count, 1);
    assert_eq!(stored.segments[0].reactions.len(), 1);
    assert_eq!(stored.segments[0].reactions[0].kind.token(), "💡");
    assert_eq!(stored.bookmarks, vec![bob()]);

    let public = services.threads.list_public(None, Some("newest")).await.unwrap();
    assert_eq!(public.iter().map(|t| t.id).collect::<Vec<_>>(), vec![thread.id]);
    let bookmarks = services.bookmarks.list(&bob()).await.unwrap();
    assert_eq!(bookmarks.len(), 1);

    let collection = services
        .collections
        .create(
            &bob(),
            NewCollection {
                name: "Career Wisdom".to_string(),
                description: None,
            },
        )
        .await
        .unwrap();
    services.collections.add_thread(collection.id, &bob(), fork.id).await.unwrap();
    services.threads.delete(fork.id, &carol()).await.unwrap();
    let resolved = services.collections.get(collection.id, &bob()).await.unwrap();
    assert!(resolved.threads.is_empty());

    let err = services.threads.get(fork.id).await.unwrap_err();
    assert!(matches!(err, AppError::NotFound("thread", _)));
}
