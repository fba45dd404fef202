//! OpenAPI documentation

use axum::Router;
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};
use utoipa_swagger_ui::SwaggerUi;

use crate::api::{auth, books, borrowers, borrowings, health};

/// Registers the `bearer_auth` scheme referenced by the protected paths
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Biblio API",
        version = "0.1.0",
        description = "Library borrowing and circulation REST API",
        license(name = "AGPL-3.0", url = "https://www.gnu.org/licenses/agpl-3.0.html")
    ),
    servers(
        (url = "/api/v1", description = "API v1")
    ),
    paths(
        // Health
        health::health_check,
        // Auth
        auth::login,
        // Books
        books::list_books,
        books::list_overdue_books,
        books::export_overdue_books,
        books::get_books_by_title,
        books::get_books_by_author,
        books::get_book_by_isbn,
        books::get_book,
        books::create_book,
        books::update_book,
        books::delete_book,
        // Borrowers
        borrowers::list_borrowers,
        borrowers::get_borrower,
        borrowers::get_borrower_books,
        borrowers::create_borrower,
        borrowers::update_borrower,
        borrowers::delete_borrower,
        // Borrowings
        borrowings::checkout,
        borrowings::return_book,
        borrowings::analytics_reports,
        borrowings::export_borrowings,
    ),
    components(
        schemas(
            // Auth
            auth::LoginRequest,
            auth::LoginResponse,
            // Books
            crate::models::book::Book,
            crate::models::book::CreateBook,
            crate::models::book::UpdateBook,
            // Borrowers
            crate::models::borrower::Borrower,
            crate::models::borrower::CreateBorrower,
            crate::models::borrower::UpdateBorrower,
            // Borrowings
            borrowings::CheckoutRequest,
            borrowings::ReturnRequest,
            borrowings::BorrowingResponse,
            crate::models::borrowing::Borrowing,
            crate::models::borrowing::BorrowedBook,
            crate::models::borrowing::OverdueLoan,
            // Reports
            crate::models::report::AnalyticsReport,
            crate::models::report::BookBorrowCount,
            crate::models::report::BorrowerBorrowCount,
            // Health
            health::HealthResponse,
            // Errors
            crate::error::ErrorResponse,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "auth", description = "Authentication endpoints"),
        (name = "books", description = "Book catalog and overdue tracking"),
        (name = "borrowers", description = "Borrower management"),
        (name = "borrowings", description = "Checkout, return and analytics")
    )
)]
pub struct ApiDoc;

/// Create the OpenAPI documentation router
pub fn create_openapi_router() -> Router {
    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bearer_auth_scheme_is_registered() {
        let doc = ApiDoc::openapi();
        let components = doc.components.expect("document has components");
        assert!(components.security_schemes.contains_key("bearer_auth"));
    }
}
