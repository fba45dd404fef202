//! Authentication endpoints

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::error::AppResult;

/// Login request
#[derive(Deserialize, ToSchema)]
pub struct LoginRequest {
    /// Borrower email
    pub email: String,
    /// Borrower password
    pub password: String,
}

/// Login response
#[derive(Serialize, ToSchema)]
pub struct LoginResponse {
    pub message: String,
    /// JWT bearer token
    pub token: String,
}

/// Authenticate a borrower and issue a JWT token
#[utoipa::path(
    post,
    path = "/auth/login",
    tag = "auth",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Logged in", body = LoginResponse),
        (status = 401, description = "Invalid email or password")
    )
)]
pub async fn login(
    State(state): State<crate::AppState>,
    Json(request): Json<LoginRequest>,
) -> AppResult<Json<LoginResponse>> {
    let (token, _borrower) = state.services.auth.login(&request.email, &request.password).await?;

    Ok(Json(LoginResponse {
        message: "Logged in successfully".to_string(),
        token,
    }))
}
