//! Circulation endpoints: checkout, return, analytics and export

use axum::{
    extract::{Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    models::{borrowing::Borrowing, report::AnalyticsReport},
};

use super::AuthenticatedBorrower;

/// Checkout request
#[derive(Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutRequest {
    pub borrower_id: Uuid,
    pub book_id: Uuid,
    /// Must not be in the past
    pub due_date: NaiveDate,
}

/// Return request
#[derive(Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReturnRequest {
    pub borrower_id: Uuid,
    pub book_id: Uuid,
}

/// Checkout/return confirmation with the affected loan
#[derive(Serialize, ToSchema)]
pub struct BorrowingResponse {
    pub message: String,
    pub borrowing: Borrowing,
}

/// Date window query shared by the analytics and export endpoints
#[derive(Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct DateRangeQuery {
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

/// Check out a book for a borrower
#[utoipa::path(
    post,
    path = "/borrowings/checkout",
    tag = "borrowings",
    security(("bearer_auth" = [])),
    request_body = CheckoutRequest,
    responses(
        (status = 200, description = "Book checked out", body = BorrowingResponse),
        (status = 400, description = "Due date already passed"),
        (status = 404, description = "Book or borrower not found"),
        (status = 409, description = "No copies available or pair already has an open loan")
    )
)]
pub async fn checkout(
    State(state): State<crate::AppState>,
    AuthenticatedBorrower(_claims): AuthenticatedBorrower,
    Json(request): Json<CheckoutRequest>,
) -> AppResult<Json<BorrowingResponse>> {
    let borrowing = state
        .services
        .circulation
        .checkout(request.borrower_id, request.book_id, request.due_date)
        .await?;

    Ok(Json(BorrowingResponse {
        message: "Book checked out successfully".to_string(),
        borrowing,
    }))
}

/// Return a borrowed book
#[utoipa::path(
    post,
    path = "/borrowings/return",
    tag = "borrowings",
    security(("bearer_auth" = [])),
    request_body = ReturnRequest,
    responses(
        (status = 200, description = "Book returned", body = BorrowingResponse),
        (status = 404, description = "Book or borrower not found"),
        (status = 422, description = "No open loan for this pair")
    )
)]
pub async fn return_book(
    State(state): State<crate::AppState>,
    AuthenticatedBorrower(_claims): AuthenticatedBorrower,
    Json(request): Json<ReturnRequest>,
) -> AppResult<Json<BorrowingResponse>> {
    let borrowing = state
        .services
        .circulation
        .return_book(request.borrower_id, request.book_id)
        .await?;

    Ok(Json(BorrowingResponse {
        message: "Book returned successfully".to_string(),
        borrowing,
    }))
}

/// Analytics report for a borrowed-date window (both bounds required)
#[utoipa::path(
    get,
    path = "/borrowings/reports",
    tag = "borrowings",
    security(("bearer_auth" = [])),
    params(DateRangeQuery),
    responses(
        (status = 200, description = "Analytics report", body = AnalyticsReport),
        (status = 400, description = "Missing start or end date")
    )
)]
pub async fn analytics_reports(
    State(state): State<crate::AppState>,
    AuthenticatedBorrower(_claims): AuthenticatedBorrower,
    Query(query): Query<DateRangeQuery>,
) -> AppResult<Json<AnalyticsReport>> {
    let (start, end) = match (query.start_date, query.end_date) {
        (Some(s), Some(e)) => (s, e),
        _ => {
            return Err(AppError::Validation(
                "Please add start and end date".to_string(),
            ))
        }
    };

    let report = state.services.reports.analytics_report(start, end).await?;
    Ok(Json(report))
}

/// Export borrowing episodes of a window as CSV (previous month by default)
#[utoipa::path(
    get,
    path = "/borrowings/export",
    tag = "borrowings",
    security(("bearer_auth" = [])),
    params(DateRangeQuery),
    responses(
        (status = 200, description = "CSV export of borrowings", content_type = "text/csv")
    )
)]
pub async fn export_borrowings(
    State(state): State<crate::AppState>,
    AuthenticatedBorrower(_claims): AuthenticatedBorrower,
    Query(query): Query<DateRangeQuery>,
) -> AppResult<Response> {
    let csv = state
        .services
        .reports
        .export_borrowings_csv(query.start_date, query.end_date)
        .await?;

    Ok((
        StatusCode::OK,
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
