//! Authentication service

use chrono::Utc;

use crate::{
    config::AuthConfig,
    error::{AppError, AppResult},
    models::borrower::{Borrower, BorrowerClaims},
    repository::Repository,
};

#[derive(Clone)]
pub struct AuthService {
    repository: Repository,
    config: AuthConfig,
}

impl AuthService {
    pub fn new(repository: Repository, config: AuthConfig) -> Self {
        Self { repository, config }
    }

    /// Authenticate a borrower by email and password, returning a JWT token.
    ///
    /// The credential is an opaque string compared by equality; hashing is
    /// the responsibility of whatever provisions the accounts.
    pub async fn login(&self, email: &str, password: &str) -> AppResult<(String, Borrower)> {
        let borrower = self
            .repository
            .borrowers
            .get_by_email(email)
            .await?
            .ok_or_else(|| AppError::Authentication("Invalid email or password".to_string()))?;

        if borrower.password != password {
            return Err(AppError::Authentication("Invalid email or password".to_string()));
        }

        let now = Utc::now().timestamp();
        let claims = BorrowerClaims {
            sub: borrower.email.clone(),
            borrower_id: borrower.id,
            exp: now + (self.config.jwt_expiration_hours as i64 * 3600),
            iat: now,
        };

        let token = claims
            .create_token(&self.config.jwt_secret)
            .map_err(|e| AppError::Internal(format!("Failed to create token: {}", e)))?;

        Ok((token, borrower))
    }
}
