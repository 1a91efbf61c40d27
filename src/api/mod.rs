//! API handlers for Biblos REST endpoints

pub mod books;
pub mod borrowings;
pub mod health;
pub mod jobs;
pub mod librarians;
pub mod members;
pub mod openapi;
pub mod stats;

use axum::{
    routing::{delete, get, post, put},
    Router,
};
use serde::Serialize;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use utoipa::ToSchema;

/// Envelope for paginated list responses
#[derive(Serialize, ToSchema)]
pub struct PaginatedResponse<T>
where
    T: for<'a> ToSchema<'a>,
{
    /// Matches on this page
    pub items: Vec<T>,
    /// Total number of matches across all pages
    pub total: i64,
    /// Current page number
    pub page: u32,
    /// Items per page
    pub per_page: u32,
}

/// Create the application router with all routes
pub fn create_router(state: crate::AppState) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // API v1 routes
    let api_v1 = Router::new()
        // Health check
        .route("/health", get(health::health_check))
        .route("/ready", get(health::readiness_check))
        // Members
        .route("/members", get(members::list_members))
        .route("/members", post(members::create_member))
        .route("/members/:id", get(members::get_member))
        .route("/members/:id", put(members::update_member))
        .route("/members/:id", delete(members::delete_member))
        .route("/members/:id/stats", get(members::get_member_stats))
        .route(
            "/members/:id/borrowings",
            get(borrowings::get_member_borrowings),
        )
        // Books (catalog)
        .route("/books", get(books::list_books))
        .route("/books", post(books::create_book))
        .route("/books/:id", get(books::get_book))
        .route("/books/:id", put(books::update_book))
        .route("/books/:id", delete(books::delete_book))
        // Librarians (staff)
        .route("/librarians", get(librarians::list_librarians))
        .route("/librarians", post(librarians::create_librarian))
        .route("/librarians/:id", get(librarians::get_librarian))
        .route("/librarians/:id", put(librarians::update_librarian))
        .route("/librarians/:id", delete(librarians::delete_librarian))
        // Borrowings (circulation)
        .route("/borrowings", get(borrowings::list_borrowings))
        .route("/borrowings", post(borrowings::create_borrowing))
        .route("/borrowings/:id", get(borrowings::get_borrowing))
        .route("/borrowings/:id", delete(borrowings::delete_borrowing))
        .route("/borrowings/:id/return", post(borrowings::return_borrowing))
        .route("/borrowings/:id/extend", post(borrowings::extend_borrowing))
        // Maintenance jobs, runnable on demand
        .route("/jobs/sweep", post(jobs::run_sweep))
        .route("/jobs/member-review", post(jobs::run_member_review))
        // Statistics
        .route("/stats", get(stats::get_stats))
        .with_state(state);

    // OpenAPI documentation
    let openapi = openapi::create_openapi_router();

    Router::new()
        .nest("/api/v1", api_v1)
        .merge(openapi)
        .layer(TraceLayer::new_for_http())
        .layer(CompressionLayer::new())
        .layer(cors)
}
