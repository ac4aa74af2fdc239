//! # ts-api
//!
//! HTTP surface for ThreadSpire. Handlers stay thin; all rules live in
//! `ts-services`.

pub mod error;
pub mod extract;
pub mod handlers;
pub mod middleware;
pub mod state;

use axum::{
    routing::{delete, get, patch, post},
    Router,
};

use handlers::{analytics, bookmarks, collections, threads};
pub use state::AppState;

pub fn router(state: AppState) -> Router {
    let api = Router::new()
        .route("/threads", get(threads::list_threads).post(threads::create_thread))
        .route("/threads/featured", get(threads::list_featured))
        .route("/threads/user", get(threads::list_user_threads))
        .route(
            "/threads/{id}",
            get(threads::get_thread)
                .put(threads::update_thread)
                .delete(threads::delete_thread),
        )
        .route("/threads/{id}/publish", patch(threads::publish_thread))
        .route("/threads/{id}/fork", post(threads::fork_thread))
        .route(
            "/threads/{id}/segments/{segment_id}/reactions",
            post(threads::react_to_segment),
        )
        .route(
            "/threads/{id}/segments/{segment_id}/reactions/{reaction_id}",
            delete(threads::remove_reaction),
        )
        .route(
            "/bookmarks",
            get(bookmarks::list_bookmarks).post(bookmarks::add_bookmark),
        )
        .route("/bookmarks/{thread_id}", delete(bookmarks::remove_bookmark))
        .route(
            "/collections",
            get(collections::list_collections).post(collections::create_collection),
        )
        .route(
            "/collections/{id}",
            get(collections::get_collection)
                .put(collections::update_collection)
                .delete(collections::delete_collection),
        )
        .route("/collections/{id}/threads", post(collections::add_thread))
        .route(
            "/collections/{id}/threads/{thread_id}",
            delete(collections::remove_thread),
        )
        .route("/analytics", get(analytics::author_analytics))
        .route("/analytics/threads/{id}", get(analytics::thread_analytics));

    Router::new()
        .route("/health", get(handlers::health))
        .nest("/api", api)
        .layer(middleware::cors_policy())
        .layer(middleware::propagate_request_id_layer())
        .layer(middleware::trace_layer())
        .layer(middleware::set_request_id_layer())
        .with_state(state)
}
