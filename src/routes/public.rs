use crate::{AppState, handlers};
use axum::{
    Router,
    routing::{get, post},
};

/// Public Router Module
///
/// Endpoints that are **unauthenticated** and accessible to any client.
/// Besides the read-only listings this includes registration, login, and —
/// an inherited quirk of the policy, preserved rather than fixed — the blog
/// update endpoint, which checks neither a token nor ownership.
pub fn public_routes() -> Router<AppState> {
    Router::new()
        // GET /health
        // Liveness probe for monitoring and load balancer checks.
        .route("/health", get(|| async { "ok" }))
        // GET /api/blogs
        // Lists all blogs, owner username/name populated.
        .route("/api/blogs", get(handlers::get_blogs))
        // GET /api/blogs/{id}
        // Single blog by id, 404 when absent.
        // PUT /api/blogs/{id}
        // Replaces title/author/url/likes. No ownership check; the owner
        // field itself is immutable through this endpoint.
        .route(
            "/api/blogs/{id}",
            get(handlers::get_blog).put(handlers::update_blog),
        )
        // GET /api/users
        // Lists all users with their blogs populated.
        // POST /api/users
        // Registration with username/password validation.
        .route(
            "/api/users",
            get(handlers::get_users).post(handlers::create_user),
        )
        // POST /api/login
        // Credential verification and bearer token issuance.
        .route("/api/login", post(handlers::login))
}
