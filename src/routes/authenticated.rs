use crate::{AppState, handlers};
use axum::{
    Router,
    routing::{delete, post},
};

/// Authenticated Router Module
///
/// The two ownership-sensitive blog mutations. Every handler here relies on
/// the `AuthUser` extractor middleware being present on the router layer
/// above this module, and extracts `AuthUser` again itself to obtain the
/// caller's id: create binds the new blog to it, delete compares it against
/// the recorded owner.
pub fn authenticated_routes() -> Router<AppState> {
    Router::<AppState>::new()
        // POST /api/blogs
        // Creates a blog owned by the caller, then appends its id to the
        // caller's blogs list as a second, dependent write.
        .route("/api/blogs", post(handlers::create_blog))
        // DELETE /api/blogs/{id}
        // Owner-only removal. 404 for a missing blog, 401 for a caller that
        // is not the recorded owner (including blogs with no owner at all).
        .route("/api/blogs/{id}", delete(handlers::delete_blog))
}
