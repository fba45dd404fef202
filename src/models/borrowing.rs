//! Borrowing (loan) model and joined row types

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

/// Borrowing record from database
///
/// A borrowing ties one borrower to one book for one episode. A NULL
/// `return_date` means the loan is open; once set it is never changed.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Borrowing {
    pub id: Uuid,
    pub book_id: Uuid,
    pub borrower_id: Uuid,
    pub borrowed_date: NaiveDate,
    pub due_date: NaiveDate,
    pub return_date: Option<NaiveDate>,
}

/// A book currently held by a borrower, joined with the loan dates
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct BorrowedBook {
    pub id: Uuid,
    pub title: String,
    pub author: String,
    pub isbn: String,
    pub due_date: NaiveDate,
    pub borrowed_date: NaiveDate,
}

/// An overdue open loan joined with book and borrower identity
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct OverdueLoan {
    pub id: Uuid,
    pub title: String,
    pub author: String,
    pub isbn: String,
    pub borrower_id: Uuid,
    pub borrower_name: String,
    pub borrower_email: String,
    pub due_date: NaiveDate,
    pub borrowed_date: NaiveDate,
}
