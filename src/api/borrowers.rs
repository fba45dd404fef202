//! Borrower management endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    error::{AppError, AppResult},
    models::{
        borrower::{Borrower, CreateBorrower, UpdateBorrower},
        borrowing::BorrowedBook,
    },
};

use super::AuthenticatedBorrower;

/// List all borrowers
#[utoipa::path(
    get,
    path = "/borrowers",
    tag = "borrowers",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "All registered borrowers", body = Vec<Borrower>)
    )
)]
pub async fn list_borrowers(
    State(state): State<crate::AppState>,
    AuthenticatedBorrower(_claims): AuthenticatedBorrower,
) -> AppResult<Json<Vec<Borrower>>> {
    let borrowers = state.services.borrowers.list_borrowers().await?;
    Ok(Json(borrowers))
}

/// Get a borrower by ID
#[utoipa::path(
    get,
    path = "/borrowers/{id}",
    tag = "borrowers",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Borrower ID")),
    responses(
        (status = 200, description = "The borrower", body = Borrower),
        (status = 404, description = "Borrower not found")
    )
)]
pub async fn get_borrower(
    State(state): State<crate::AppState>,
    AuthenticatedBorrower(_claims): AuthenticatedBorrower,
    Path(id): Path<Uuid>,
) -> AppResult<Json<Borrower>> {
    let borrower = state.services.borrowers.get_borrower(id).await?;
    Ok(Json(borrower))
}

/// Books currently held by a borrower
#[utoipa::path(
    get,
    path = "/borrowers/{id}/books",
    tag = "borrowers",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Borrower ID")),
    responses(
        (status = 200, description = "Open loans of the borrower", body = Vec<BorrowedBook>),
        (status = 404, description = "Borrower not found")
    )
)]
pub async fn get_borrower_books(
    State(state): State<crate::AppState>,
    AuthenticatedBorrower(_claims): AuthenticatedBorrower,
    Path(id): Path<Uuid>,
) -> AppResult<Json<Vec<BorrowedBook>>> {
    let books = state.services.borrowers.get_borrower_books(id).await?;
    Ok(Json(books))
}

/// Register a new borrower (no authentication required)
#[utoipa::path(
    post,
    path = "/borrowers",
    tag = "borrowers",
    request_body = CreateBorrower,
    responses(
        (status = 201, description = "Borrower created", body = Borrower),
        (status = 400, description = "Invalid request"),
        (status = 409, description = "Email already exists")
    )
)]
pub async fn create_borrower(
    State(state): State<crate::AppState>,
    Json(request): Json<CreateBorrower>,
) -> AppResult<(StatusCode, Json<Borrower>)> {
    request
        .validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let borrower = state.services.borrowers.create_borrower(request).await?;
    Ok((StatusCode::CREATED, Json(borrower)))
}

/// Update a borrower
#[utoipa::path(
    put,
    path = "/borrowers/{id}",
    tag = "borrowers",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Borrower ID")),
    request_body = UpdateBorrower,
    responses(
        (status = 200, description = "Borrower updated", body = Borrower),
        (status = 404, description = "Borrower not found"),
        (status = 409, description = "Email already exists")
    )
)]
pub async fn update_borrower(
    State(state): State<crate::AppState>,
    AuthenticatedBorrower(_claims): AuthenticatedBorrower,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateBorrower>,
) -> AppResult<Json<Borrower>> {
    request
        .validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let borrower = state.services.borrowers.update_borrower(id, request).await?;
    Ok(Json(borrower))
}

/// Delete a borrower
#[utoipa::path(
    delete,
    path = "/borrowers/{id}",
    tag = "borrowers",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Borrower ID")),
    responses(
        (status = 204, description = "Borrower deleted"),
        (status = 404, description = "Borrower not found")
    )
)]
pub async fn delete_borrower(
    State(state): State<crate::AppState>,
    AuthenticatedBorrower(_claims): AuthenticatedBorrower,
    Path(id): Path<Uuid>,
) -> AppResult<StatusCode> {
    state.services.borrowers.delete_borrower(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
