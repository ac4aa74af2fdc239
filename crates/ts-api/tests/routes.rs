use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;
use ts_api::{router, AppState};
use ts_db_memory::MemoryStore;
use ts_services::ServiceConfig;

fn app() -> Router {
    let store = Arc::new(MemoryStore::new());
    router(AppState::new(store.clone(), store, ServiceConfig::default()))
}

async fn send(app: &Router, method: &str, uri: &str, user: Option<&str>, body: Option<Value>) -> (StatusCode, Value) {
    let mut request = Request::builder().method(method).uri(uri);
    if let Some(user) = user {
        request = request.header("x-user-id", user);
    }
    let body = match body {
        Some(body) => {
            request = request.header("content-type", "application/json");
            Body::from(body.to_string())
        }
        None => Body::empty(),
    };
    let response = app
        .clone()
        .oneshot(request.body(body).expect("request"))
        .await
        .expect("response");
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.expect("body");
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).expect("json")
    };
    (status, json)
}

async fn create_focus_thread(app: &Router) -> Value {
    let (status, thread) = send(
        app,
        "POST",
        "/api/threads",
        Some("alice"),
        Some(json!({
            "title": "Focus",
            "segments": [{ "content": "Do one thing." }, { "content": "Then rest." }],
            "tags": ["Productivity"]
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    thread
}

#[tokio::test]
async fn health_is_public() {
    let (status, body) = send(&app(), "GET", "/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn writes_without_a_user_header_are_unauthorized() {
    let (status, body) = send(
        &app(),
        "POST",
        "/api/threads",
        Some("   "),
        Some(json!({ "title": "Nope", "segments": [{ "content": "x" }] })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"]["code"], "unauthorized");
}

#[tokio::test]
async fn created_threads_start_as_drafts_and_stay_out_of_listings() {
    let app = app();
    let thread = create_focus_thread(&app).await;
    assert_eq!(thread["isDraft"], true);
    assert_eq!(thread["forkCount"], 0);

    let (_, listed) = send(&app, "GET", "/api/threads", None, None).await;
    assert_eq!(listed, json!([]));

    let (_, mine) = send(&app, "GET", "/api/threads/user", Some("alice"), None).await;
    assert_eq!(mine.as_array().map(Vec::len), Some(1));
}

#[tokio::test]
async fn publish_then_react_then_fork() {
    let app = app();
    let thread = create_focus_thread(&app).await;
    let id = thread["id"].as_str().unwrap().to_string();
    let segment = thread["segments"][0]["id"].as_str().unwrap().to_string();

    let (status, _) = send(&app, "PATCH", &format!("/api/threads/{id}/publish"), Some("bob"), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    let (status, published) = send(&app, "PATCH", &format!("/api/threads/{id}/publish"), Some("alice"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(published["isDraft"], false);
    let (status, body) = send(&app, "PATCH", &format!("/api/threads/{id}/publish"), Some("alice"), None).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"]["code"], "invalid_state");

    let reactions = format!("/api/threads/{id}/segments/{segment}/reactions");
    send(&app, "POST", &reactions, Some("bob"), Some(json!({ "type": "FIRE" }))).await;
    let (status, reacted) = send(&app, "POST", &reactions, Some("bob"), Some(json!({ "reactionType": "💡" }))).await;
    assert_eq!(status, StatusCode::OK);
    let stored = &reacted["segments"][0]["reactions"];
    assert_eq!(stored.as_array().map(Vec::len), Some(1));
    assert_eq!(stored[0]["type"], "💡");

    let (status, body) = send(&app, "POST", &reactions, Some("bob"), Some(json!({ "type": "THUMBS_UP" }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "validation_error");

    let (status, fork) = send(&app, "POST", &format!("/api/threads/{id}/fork"), Some("carol"), None).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(fork["isDraft"], true);
    assert_eq!(fork["originalThread"], id.as_str());
    assert_eq!(fork["segments"][0]["reactions"], json!([]));

    let (_, detail) = send(&app, "GET", &format!("/api/threads/{id}"), None, None).await;
    assert_eq!(detail["forkCount"], 1);

    let fork_id = fork["id"].as_str().unwrap();
    let (_, fork_detail) = send(&app, "GET", &format!("/api/threads/{fork_id}"), None, None).await;
    assert_eq!(fork_detail["lineage"]["author"], "alice");
}

#[tokio::test]
async fn unknown_thread_is_a_not_found_envelope() {
    let (status, body) = send(
        &app(),
        "GET",
        "/api/threads/0190a8a4-7a36-7c3e-9a51-5d2f0e2b7c11",
        None,
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["code"], "not_found");
}

#[tokio::test]
async fn bookmarks_are_idempotent() {
    let app = app();
    let thread = create_focus_thread(&app).await;
    let id = thread["id"].as_str().unwrap();

    for _ in 0..2 {
        let (status, _) = send(&app, "POST", "/api/bookmarks", Some("bob"), Some(json!({ "threadId": id }))).await;
        assert_eq!(status, StatusCode::CREATED);
    }
    let (_, listed) = send(&app, "GET", "/api/bookmarks", Some("bob"), None).await;
    assert_eq!(listed.as_array().map(Vec::len), Some(1));
    assert_eq!(listed[0]["thread"]["bookmarks"], json!(["bob"]));

    let (status, _) = send(&app, "DELETE", &format!("/api/bookmarks/{id}"), Some("bob"), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (_, listed) = send(&app, "GET", "/api/bookmarks", Some("bob"), None).await;
    assert_eq!(listed, json!([]));
}

#[tokio::test]
async fn collections_drop_deleted_threads_on_read() {
    let app = app();
    let thread = create_focus_thread(&app).await;
    let thread_id = thread["id"].as_str().unwrap();

    let (status, collection) = send(
        &app,
        "POST",
        "/api/collections",
        Some("bob"),
        Some(json!({ "name": "Career Wisdom" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let collection_id = collection["id"].as_str().unwrap();
    let members = format!("/api/collections/{collection_id}/threads");

    send(&app, "POST", &members, Some("bob"), Some(json!({ "threadId": thread_id }))).await;
    let (_, updated) = send(&app, "POST", &members, Some("bob"), Some(json!({ "threadId": thread_id }))).await;
    assert_eq!(updated["threads"], json!([thread_id]));

    let (status, _) = send(&app, "GET", &format!("/api/collections/{collection_id}"), Some("carol"), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = send(&app, "DELETE", &format!("/api/threads/{thread_id}"), Some("alice"), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, resolved) = send(&app, "GET", &format!("/api/collections/{collection_id}"), Some("bob"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(resolved["threads"], json!([]));
}

#[tokio::test]
async fn analytics_report_on_the_callers_threads() {
    let app = app();
    let thread = create_focus_thread(&app).await;
    let id = thread["id"].as_str().unwrap();
    let segment = thread["segments"][1]["id"].as_str().unwrap();
    send(
        &app,
        "POST",
        &format!("/api/threads/{id}/segments/{segment}/reactions"),
        Some("bob"),
        Some(json!({ "type": "LOVE" })),
    )
    .await;

    let (status, report) = send(&app, "GET", "/api/analytics", Some("alice"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(report["threadCount"], 1);
    assert_eq!(report["draftThreadCount"], 1);
    assert_eq!(report["reactionsByType"]["🫶"], 1);
    assert_eq!(report["topReactedSegments"][0]["segmentIndex"], 2);

    let (_, stats) = send(&app, "GET", &format!("/api/analytics/threads/{id}"), Some("alice"), None).await;
    assert_eq!(stats, json!({ "reactionCount": 1, "bookmarkCount": 0 }));
}

#[tokio::test]
async fn malformed_ids_use_the_error_envelope() {
    let (status, body) = send(&app(), "GET", "/api/threads/not-a-uuid", None, None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "bad_request");
    assert!(body["error"]["message"].as_str().is_some_and(|m| !m.is_empty()));
}

#[tokio::test]
async fn unparseable_bodies_use_the_error_envelope() {
    let (status, body) = send(
        &app(),
        "POST",
        "/api/threads",
        Some("alice"),
        Some(json!({ "segments": [{ "content": "No title here." }] })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "bad_request");
}

#[tokio::test]
async fn type_wins_over_reaction_type_when_both_are_sent() {
    let app = app();
    let thread = create_focus_thread(&app).await;
    let id = thread["id"].as_str().unwrap();
    let segment = thread["segments"][0]["id"].as_str().unwrap();
    let reactions = format!("/api/threads/{id}/segments/{segment}/reactions");

    let (status, reacted) = send(
        &app,
        "POST",
        &reactions,
        Some("bob"),
        Some(json!({ "type": "FIRE", "reactionType": "LOVE" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(reacted["segments"][0]["reactions"][0]["type"], "🔥");

    let (status, reacted) = send(
        &app,
        "POST",
        &reactions,
        Some("carol"),
        Some(json!({ "type": "", "reactionType": "LOVE" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(reacted["segments"][0]["reactions"][1]["type"], "🫶");
}
