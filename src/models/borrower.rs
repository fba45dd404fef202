//! Borrower model, request types and JWT claims

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

/// Borrower model from database
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Borrower {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    /// Opaque credential, compared by equality at login; never serialized.
    #[serde(skip_serializing)]
    pub password: String,
    pub registered_date: NaiveDate,
}

/// Create borrower request (public registration)
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateBorrower {
    #[validate(length(min = 1, message = "Name must not be empty"))]
    pub name: String,
    #[validate(email(message = "Please enter a valid email"))]
    pub email: String,
    #[validate(length(min = 4, message = "Password must be at least 4 characters"))]
    pub password: String,
    pub registered_date: Option<NaiveDate>,
}

/// Update borrower request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateBorrower {
    pub name: Option<String>,
    #[validate(email(message = "Please enter a valid email"))]
    pub email: Option<String>,
    pub password: Option<String>,
}

/// JWT claims for an authenticated borrower
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BorrowerClaims {
    /// Borrower email
    pub sub: String,
    pub borrower_id: Uuid,
    pub exp: i64,
    pub iat: i64,
}

impl BorrowerClaims {
    /// Create a new JWT token
    pub fn create_token(&self, secret: &str) -> Result<String, jsonwebtoken::errors::Error> {
        use jsonwebtoken::{encode, EncodingKey, Header};
        encode(
            &Header::default(),
            self,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
    }

    /// Parse JWT token
    pub fn from_token(token: &str, secret: &str) -> Result<Self, jsonwebtoken::errors::Error> {
        use jsonwebtoken::{decode, DecodingKey, Validation};
        let token_data = decode::<Self>(
            token,
            &DecodingKey::from_secret(secret.as_bytes()),
            &Validation::default(),
        )?;
        Ok(token_data.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn claims_round_trip_through_token() {
        let now = Utc::now().timestamp();
        let claims = BorrowerClaims {
            sub: "reader@example.org".to_string(),
            borrower_id: Uuid::new_v4(),
            exp: now + 3600,
            iat: now,
        };

        let token = claims.create_token("test-secret").unwrap();
        let parsed = BorrowerClaims::from_token(&token, "test-secret").unwrap();

        assert_eq!(parsed.sub, claims.sub);
        assert_eq!(parsed.borrower_id, claims.borrower_id);
    }

    #[test]
    fn token_with_wrong_secret_is_rejected() {
        let now = Utc::now().timestamp();
        let claims = BorrowerClaims {
            sub: "reader@example.org".to_string(),
            borrower_id: Uuid::new_v4(),
            exp: now + 3600,
            iat: now,
        };

        let token = claims.create_token("test-secret").unwrap();
        assert!(BorrowerClaims::from_token(&token, "other-secret").is_err());
    }
}
