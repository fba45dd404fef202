//! Book model and related types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

/// Book model from database
///
/// `available_quantity` is a live counter: it reflects stock minus open
/// loans and is only ever changed through the checkout/return flow.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Book {
    pub id: Uuid,
    pub title: String,
    pub author: String,
    pub isbn: String,
    pub available_quantity: i32,
    pub shelf_location: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

/// Create book request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateBook {
    #[validate(length(min = 1, message = "Title must not be empty"))]
    pub title: String,
    #[validate(length(min = 1, message = "Author must not be empty"))]
    pub author: String,
    #[validate(length(min = 1, message = "ISBN must not be empty"))]
    pub isbn: String,
    #[validate(range(min = 0, message = "Quantity must not be negative"))]
    pub available_quantity: i32,
    #[validate(length(min = 1, message = "Shelf location must not be empty"))]
    pub shelf_location: String,
}

/// Update book request
///
/// Deliberately has no quantity field: the counter belongs to the
/// circulation flow and must not be edited through catalog updates.
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateBook {
    pub title: Option<String>,
    pub author: Option<String>,
    pub isbn: Option<String>,
    pub shelf_location: Option<String>,
}
