use axum::{
    http::StatusCode,
    routing::{delete, get, post},
    Json, Router,
};
use serde_json::{json, Value};
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::middleware::request_id::{make_span_with_request_id, request_id_middleware};

pub mod auth;
pub mod extract;
pub mod movies;
pub mod recommendations;
pub mod reviews;
mod state;
pub mod users;

pub use state::AppState;

/// Creates the application router with all routes
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .nest("/api", api_routes())
        .layer(
            ServiceBuilder::new()
                .layer(axum::middleware::from_fn(request_id_middleware))
                .layer(TraceLayer::new_for_http().make_span_with(make_span_with_request_id))
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}

/// API routes under /api
fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login))
        .route("/auth/logout", post(auth::logout))
        .route("/movies", get(movies::list).post(movies::create))
        .route("/movies/:id", get(movies::detail).delete(movies::delete))
        .route(
            "/movies/:id/recommendations",
            get(recommendations::recommend),
        )
        .route(
            "/movies/:id/reviews",
            get(reviews::list).post(reviews::submit),
        )
        .route("/reviews/:id", delete(reviews::delete))
        .route("/users/:id", get(users::profile).put(users::update))
        .route(
            "/users/:id/watchlist",
            get(users::get_watchlist).post(users::add_to_watchlist),
        )
        .route(
            "/users/:id/watchlist/:movie_id",
            delete(users::remove_from_watchlist),
        )
}

/// Health check endpoint
async fn health_check() -> (StatusCode, Json<Value>) {
    (StatusCode::OK, Json(json!({ "status": "healthy" })))
}
