//! Biblio Server - Library Borrowing System
//!
//! A Rust REST API server for library circulation.

use axum::{
    routing::{delete, get, post, put},
    Router,
};
use sqlx::postgres::PgPoolOptions;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use biblio_server::{api, config::AppConfig, repository::Repository, services::Services, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    // Load configuration
    let config = AppConfig::load().expect("Failed to load configuration");

    // Initialize tracing
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| format!("biblio_server={},tower_http=debug", config.logging.level).into());

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Biblio Server v{}", env!("CARGO_PKG_VERSION"));

    // Create database connection pool
    let pool = PgPoolOptions::new()
        .max_connections(config.database.max_connections)
        .min_connections(config.database.min_connections)
        .connect(&config.database.url)
        .await
        .expect("Failed to connect to database");

    tracing::info!("Connected to database");

    // Run migrations
    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("Failed to run database migrations");

    tracing::info!("Database migrations completed");

    // Save server address before moving config
    let server_host = config.server.host.clone();
    let server_port = config.server.port;

    // Create repository and services
    let repository = Repository::new(pool);
    let services = Services::new(repository, config.auth.clone());

    // Create application state
    let state = AppState {
        config: Arc::new(config),
        services: Arc::new(services),
    };

    // Build router
    let app = create_router(state);

    // Start server
    let addr = SocketAddr::new(
        server_host.parse().expect("Invalid host address"),
        server_port,
    );

    tracing::info!("Server listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Create the application router with all routes
fn create_router(state: AppState) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // API v1 routes. Literal book routes are registered before /books/:id
    // so "overdue" and the lookup prefixes are not captured as IDs.
    let api_v1 = Router::new()
        // Health check
        .route("/health", get(api::health::health_check))
        // Authentication
        .route("/auth/login", post(api::auth::login))
        // Books (catalog)
        .route("/books", get(api::books::list_books))
        .route("/books", post(api::books::create_book))
        .route("/books/overdue", get(api::books::list_overdue_books))
        .route("/books/overdue/export", get(api::books::export_overdue_books))
        .route("/books/by-title/:title", get(api::books::get_books_by_title))
        .route("/books/by-author/:author", get(api::books::get_books_by_author))
        .route("/books/by-isbn/:isbn", get(api::books::get_book_by_isbn))
        .route("/books/:id", get(api::books::get_book))
        .route("/books/:id", put(api::books::update_book))
        .route("/books/:id", delete(api::books::delete_book))
        // Borrowers
        .route("/borrowers", get(api::borrowers::list_borrowers))
        .route("/borrowers", post(api::borrowers::create_borrower))
        .route("/borrowers/:id", get(api::borrowers::get_borrower))
        .route("/borrowers/:id", put(api::borrowers::update_borrower))
        .route("/borrowers/:id", delete(api::borrowers::delete_borrower))
        .route("/borrowers/:id/books", get(api::borrowers::get_borrower_books))
        // Borrowings (circulation)
        .route("/borrowings/checkout", post(api::borrowings::checkout))
        .route("/borrowings/return", post(api::borrowings::return_book))
        .route("/borrowings/reports", get(api::borrowings::analytics_reports))
        .route("/borrowings/export", get(api::borrowings::export_borrowings))
        .with_state(state.clone());

    // OpenAPI documentation
    let openapi = api::openapi::create_openapi_router();

    Router::new()
        .nest("/api/v1", api_v1)
        .merge(openapi)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}
