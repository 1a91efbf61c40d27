//! OpenAPI documentation

use axum::Router;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::api::{books, borrowings, health, jobs, librarians, members, stats};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Biblos API",
        version = "1.0.0",
        description = "Library Circulation Management REST API",
        license(name = "AGPL-3.0", url = "https://www.gnu.org/licenses/agpl-3.0.html")
    ),
    servers(
        (url = "/api/v1", description = "API v1")
    ),
    paths(
        // Health
        health::health_check,
        health::readiness_check,
        // Members
        members::list_members,
        members::get_member,
        members::get_member_stats,
        members::create_member,
        members::update_member,
        members::delete_member,
        // Books
        books::list_books,
        books::get_book,
        books::create_book,
        books::update_book,
        books::delete_book,
        // Librarians
        librarians::list_librarians,
        librarians::get_librarian,
        librarians::create_librarian,
        librarians::update_librarian,
        librarians::delete_librarian,
        // Borrowings
        borrowings::list_borrowings,
        borrowings::get_borrowing,
        borrowings::get_member_borrowings,
        borrowings::create_borrowing,
        borrowings::return_borrowing,
        borrowings::extend_borrowing,
        borrowings::delete_borrowing,
        // Jobs
        jobs::run_sweep,
        jobs::run_member_review,
        // Stats
        stats::get_stats,
    ),
    components(
        schemas(
            // Members
            crate::models::member::Member,
            crate::models::member::MemberStatus,
            crate::models::member::MemberStats,
            crate::models::member::MemberDetails,
            crate::models::member::MemberSummary,
            crate::models::member::CreateMember,
            crate::models::member::UpdateMember,
            // Books
            crate::models::book::Book,
            crate::models::book::BookCategory,
            crate::models::book::BookDetails,
            crate::models::book::CreateBook,
            crate::models::book::UpdateBook,
            // Librarians
            crate::models::librarian::Librarian,
            crate::models::librarian::Department,
            crate::models::librarian::Position,
            crate::models::librarian::LibrarianDetails,
            crate::models::librarian::CreateLibrarian,
            crate::models::librarian::UpdateLibrarian,
            // Borrowings
            crate::models::borrowing::BorrowingRecord,
            crate::models::borrowing::BorrowingStatus,
            crate::models::borrowing::BorrowingDetails,
            crate::models::borrowing::CreateBorrowing,
            borrowings::ExtendDueDateRequest,
            borrowings::ReturnResponse,
            // Jobs
            crate::services::sweeper::SweepReport,
            crate::services::sweeper::SweepFailure,
            crate::services::sweeper::MemberReviewReport,
            crate::services::sweeper::FlaggedMember,
            // Stats
            stats::StatsResponse,
            stats::MemberTotals,
            stats::BookTotals,
            stats::CirculationTotals,
            stats::StatEntry,
            // Health
            health::HealthResponse,
            // Errors
            crate::error::ErrorResponse,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "members", description = "Member registry"),
        (name = "books", description = "Book catalog"),
        (name = "librarians", description = "Staff registry"),
        (name = "borrowings", description = "Borrowing ledger and circulation"),
        (name = "jobs", description = "Scheduled maintenance jobs"),
        (name = "stats", description = "Statistics")
    )
)]
pub struct ApiDoc;

/// Create the OpenAPI documentation router
pub fn create_openapi_router() -> Router {
    Router::new().merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
}
