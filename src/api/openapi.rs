//! OpenAPI documentation

use axum::Router;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::api::{auth, books, borrows, health, stats};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Perpus API",
        version = "1.0.0",
        description = "Library Borrowing Service REST API",
        license(name = "AGPL-3.0", url = "https://www.gnu.org/licenses/agpl-3.0.html")
    ),
    servers(
        (url = "/api/v1", description = "API v1")
    ),
    paths(
        // Health
        health::health_check,
        health::readiness_check,
        // Auth
        auth::register,
        auth::login,
        auth::me,
        auth::update_profile,
        // Books
        books::list_books,
        books::get_book,
        books::create_book,
        books::update_book,
        books::delete_book,
        // Borrows
        borrows::borrow_book,
        borrows::return_book,
        borrows::extend_borrow,
        borrows::history,
        borrows::rate_book,
        borrows::list_ratings,
        // Admin
        stats::dashboard,
        stats::report,
    ),
    components(
        schemas(
            // Auth
            auth::LoginResponse,
            auth::RegisterResponse,
            crate::models::user::User,
            crate::models::user::Role,
            crate::models::user::CreateUser,
            crate::models::user::LoginRequest,
            crate::models::user::UpdateProfile,
            // Books
            crate::models::book::Book,
            crate::models::book::BookSummary,
            crate::models::book::BookDetails,
            crate::models::book::Genre,
            crate::models::book::BookStatus,
            crate::models::book::CreateBook,
            crate::models::book::UpdateBook,
            books::MessageResponse,
            // Borrows
            borrows::BorrowRequest,
            borrows::BorrowResponse,
            borrows::ReturnRequest,
            borrows::ReturnResponse,
            borrows::ExtendResponse,
            borrows::RatingResponse,
            crate::models::borrow::BorrowDetails,
            crate::models::borrow::BorrowStatus,
            crate::models::rating::Rating,
            crate::models::rating::CreateRating,
            // Stats
            crate::services::stats::DashboardResponse,
            crate::services::stats::DashboardStatistics,
            crate::services::stats::CategoryCount,
            // Health
            health::HealthResponse,
            // Errors
            crate::error::ErrorResponse,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "auth", description = "Authentication endpoints"),
        (name = "books", description = "Book catalog"),
        (name = "borrows", description = "Borrow workflow"),
        (name = "admin", description = "Admin dashboard and reports")
    )
)]
pub struct ApiDoc;

/// Create the OpenAPI documentation router
pub fn create_openapi_router() -> Router {
    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
}
