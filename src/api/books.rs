//! Book catalog and overdue endpoints

use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;
use utoipa::IntoParams;
use uuid::Uuid;
use validator::Validate;

use crate::{
    error::{AppError, AppResult},
    models::{
        book::{Book, CreateBook, UpdateBook},
        borrowing::OverdueLoan,
    },
};

use super::AuthenticatedBorrower;

/// Date window query for the overdue export (defaults to previous month)
#[derive(Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct OverdueExportQuery {
    pub start_date: Option<chrono::NaiveDate>,
    pub end_date: Option<chrono::NaiveDate>,
}

/// List all books
#[utoipa::path(
    get,
    path = "/books",
    tag = "books",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "All catalog books", body = Vec<Book>)
    )
)]
pub async fn list_books(
    State(state): State<crate::AppState>,
    AuthenticatedBorrower(_claims): AuthenticatedBorrower,
) -> AppResult<Json<Vec<Book>>> {
    let books = state.services.catalog.list_books().await?;
    Ok(Json(books))
}

/// List every open loan past its due date
#[utoipa::path(
    get,
    path = "/books/overdue",
    tag = "books",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Overdue loans with book and borrower", body = Vec<OverdueLoan>)
    )
)]
pub async fn list_overdue_books(
    State(state): State<crate::AppState>,
    AuthenticatedBorrower(_claims): AuthenticatedBorrower,
) -> AppResult<Json<Vec<OverdueLoan>>> {
    let loans = state.services.overdue.list_overdue().await?;
    Ok(Json(loans))
}

/// Export overdue loans of a period as CSV (previous month by default)
#[utoipa::path(
    get,
    path = "/books/overdue/export",
    tag = "books",
    security(("bearer_auth" = [])),
    params(OverdueExportQuery),
    responses(
        (status = 200, description = "CSV export of overdue loans", content_type = "text/csv")
    )
)]
pub async fn export_overdue_books(
    State(state): State<crate::AppState>,
    AuthenticatedBorrower(_claims): AuthenticatedBorrower,
    Query(query): Query<OverdueExportQuery>,
) -> AppResult<Response> {
    let csv = state
        .services
        .overdue
        .export_overdue_csv(query.start_date, query.end_date)
        .await?;

    Ok((
        [
            (header::CONTENT_TYPE, "text/csv"),
            (
                header::CONTENT_DISPOSITION,
                "attachment; filename=borrowing_data.csv",
            ),
        ],
        csv,
    )
        .into_response())
}

/// Get books by exact title
#[utoipa::path(
    get,
    path = "/books/by-title/{title}",
    tag = "books",
    security(("bearer_auth" = [])),
    params(("title" = String, Path, description = "Book title")),
    responses(
        (status = 200, description = "Matching books", body = Vec<Book>),
        (status = 404, description = "No book found by that title")
    )
)]
pub async fn get_books_by_title(
    State(state): State<crate::AppState>,
    AuthenticatedBorrower(_claims): AuthenticatedBorrower,
    Path(title): Path<String>,
) -> AppResult<Json<Vec<Book>>> {
    let books = state.services.catalog.get_books_by_title(&title).await?;
    Ok(Json(books))
}

/// Get books by exact author
#[utoipa::path(
    get,
    path = "/books/by-author/{author}",
    tag = "books",
    security(("bearer_auth" = [])),
    params(("author" = String, Path, description = "Book author")),
    responses(
        (status = 200, description = "Matching books", body = Vec<Book>),
        (status = 404, description = "No book found by that author")
    )
)]
pub async fn get_books_by_author(
    State(state): State<crate::AppState>,
    AuthenticatedBorrower(_claims): AuthenticatedBorrower,
    Path(author): Path<String>,
) -> AppResult<Json<Vec<Book>>> {
    let books = state.services.catalog.get_books_by_author(&author).await?;
    Ok(Json(books))
}

/// Get a book by ISBN
#[utoipa::path(
    get,
    path = "/books/by-isbn/{isbn}",
    tag = "books",
    security(("bearer_auth" = [])),
    params(("isbn" = String, Path, description = "Book ISBN")),
    responses(
        (status = 200, description = "The book", body = Book),
        (status = 404, description = "Book does not exist")
    )
)]
pub async fn get_book_by_isbn(
    State(state): State<crate::AppState>,
    AuthenticatedBorrower(_claims): AuthenticatedBorrower,
    Path(isbn): Path<String>,
) -> AppResult<Json<Book>> {
    let book = state.services.catalog.get_book_by_isbn(&isbn).await?;
    Ok(Json(book))
}

/// Get a book by ID
#[utoipa::path(
    get,
    path = "/books/{id}",
    tag = "books",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Book ID")),
    responses(
        (status = 200, description = "The book", body = Book),
        (status = 404, description = "Book not found")
    )
)]
pub async fn get_book(
    State(state): State<crate::AppState>,
    AuthenticatedBorrower(_claims): AuthenticatedBorrower,
    Path(id): Path<Uuid>,
) -> AppResult<Json<Book>> {
    let book = state.services.catalog.get_book(id).await?;
    Ok(Json(book))
}

/// Add a book to the catalog
#[utoipa::path(
    post,
    path = "/books",
    tag = "books",
    security(("bearer_auth" = [])),
    request_body = CreateBook,
    responses(
        (status = 201, description = "Book created", body = Book),
        (status = 400, description = "Invalid request"),
        (status = 409, description = "ISBN already exists")
    )
)]
pub async fn create_book(
    State(state): State<crate::AppState>,
    AuthenticatedBorrower(_claims): AuthenticatedBorrower,
    Json(request): Json<CreateBook>,
) -> AppResult<(StatusCode, Json<Book>)> {
    request
        .validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let book = state.services.catalog.create_book(request).await?;
    Ok((StatusCode::CREATED, Json(book)))
}

/// Update a book's catalog fields
#[utoipa::path(
    put,
    path = "/books/{id}",
    tag = "books",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Book ID")),
    request_body = UpdateBook,
    responses(
        (status = 200, description = "Book updated", body = Book),
        (status = 404, description = "Book not found"),
        (status = 409, description = "ISBN already exists")
    )
)]
pub async fn update_book(
    State(state): State<crate::AppState>,
    AuthenticatedBorrower(_claims): AuthenticatedBorrower,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateBook>,
) -> AppResult<Json<Book>> {
    request
        .validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let book = state.services.catalog.update_book(id, request).await?;
    Ok(Json(book))
}

/// Delete a book
#[utoipa::path(
    delete,
    path = "/books/{id}",
    tag = "books",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Book ID")),
    responses(
        (status = 204, description = "Book deleted"),
        (status = 404, description = "Book not found")
    )
)]
pub async fn delete_book(
    State(state): State<crate::AppState>,
    AuthenticatedBorrower(_claims): AuthenticatedBorrower,
    Path(id): Path<Uuid>,
) -> AppResult<StatusCode> {
    state.services.catalog.delete_book(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
