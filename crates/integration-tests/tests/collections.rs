mod common;

use common::{alice, bob, memory_services, published_focus};
use ts_core::{AppError, CollectionPatch, NewCollection};

fn career_wisdom() -> NewCollection {
    NewCollection {
        name: "Career Wisdom".to_string(),
        description: Some("Things worth rereading".to_string()),
    }
}

#[tokio::test]
async fn membership_is_idempotent_and_tolerates_deleted_threads() {
    let services = memory_services();
    let thread = published_focus(&services).await;
    let collection = services.collections.create(&bob(), career_wisdom()).await.unwrap();

    services.collections.add_thread(collection.id, &bob(), thread.id).await.unwrap();
    let twice = services.collections.add_thread(collection.id, &bob(), thread.id).await.unwrap();
    assert_eq!(twice.threads, vec![thread.id]);

    services.threads.delete(thread.id, &alice()).await.unwrap();

    let resolved = services.collections.get(collection.id, &bob()).await.unwrap();
    assert_eq!(resolved.name, "Career Wisdom");
    assert!(resolved.threads.is_empty());

    let removed = services
        .collections
        .remove_thread(collection.id, &bob(), thread.id)
        .await
        .unwrap();
    assert!(removed.threads.is_empty());
    let again = services
        .collections
        .remove_thread(collection.id, &bob(), thread.id)
        .await
        .unwrap();
    assert!(again.threads.is_empty());
}

#[tokio::test]
async fn only_the_owner_manages_a_collection() {
    let services = memory_services();
    let collection = services.collections.create(&bob(), career_wisdom()).await.unwrap();

    let err = services
        .collections
        .update(
            collection.id,
            &alice(),
            CollectionPatch {
                name: Some("Mine".to_string()),
                description: None,
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Forbidden(_)));

    let err = services.collections.delete(collection.id, &alice()).await.unwrap_err();
    assert!(matches!(err, AppError::Forbidden(_)));

    services.collections.delete(collection.id, &bob()).await.unwrap();
    assert!(services.collections.list(&bob()).await.unwrap().is_empty());
}

#[tokio::test]
async fn update_renames_and_clears_the_description() {
    let services = memory_services();
    let collection = services.collections.create(&bob(), career_wisdom()).await.unwrap();

    let updated = services
        .collections
        .update(
            collection.id,
            &bob(),
            CollectionPatch {
                name: Some("  Keepers  ".to_string()),
                description: Some(String::new()),
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.name, "Keepers");
    assert_eq!(updated.description, None);
    assert_eq!(updated.version, collection.version + 1);
}

#[tokio::test]
async fn list_resolves_each_collection_in_creation_order() {
    let services = memory_services();
    let thread = published_focus(&services).await;
    let first = services.collections.create(&bob(), career_wisdom()).await.unwrap();
    let second = services
        .collections
        .create(
            &bob(),
            NewCollection {
                name: "Later".to_string(),
                description: None,
            },
        )
        .await
        .unwrap();
    services.collections.add_thread(second.id, &bob(), thread.id).await.unwrap();

    let listed = services.collections.list(&bob()).await.unwrap();
    assert_eq!(listed.iter().map(|c| c.id).collect::<Vec<_>>(), vec![first.id, second.id]);
    assert!(listed[0].threads.is_empty());
    assert_eq!(listed[1].threads[0].id, thread.id);
}
