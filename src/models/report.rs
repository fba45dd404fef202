//! Analytics report types and CSV export rendering
//!
//! The CSV header text and field order are a compatibility surface consumed
//! by downstream tooling; they must not change.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

/// Per-book borrow count for the top-N query
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct BookBorrowCount {
    pub id: Uuid,
    pub title: String,
    pub author: String,
    pub isbn: String,
    pub borrow_count: i64,
}

/// Per-borrower borrow count
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct BorrowerBorrowCount {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub borrow_count: i64,
}

/// Analytics report over a borrowed-date window
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AnalyticsReport {
    /// Loans begun in the window and still open
    pub total_books_borrowed: i64,
    pub most_borrowed_books: Vec<BookBorrowCount>,
    pub books_borrowed_by_borrower: Vec<BorrowerBorrowCount>,
    /// Average of (return date - borrowed date) in days over returned loans
    /// in the window; null when no loan in the window has been returned.
    pub average_borrowing_duration: Option<f64>,
}

/// One borrowing episode shaped for the CSV export
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct BorrowingExportRow {
    pub id: Uuid,
    pub title: String,
    pub borrower_name: String,
    pub borrowed_date: NaiveDate,
    pub due_date: NaiveDate,
    pub return_date: Option<NaiveDate>,
}

/// One overdue loan shaped for the CSV export (no return date column)
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct OverdueExportRow {
    pub id: Uuid,
    pub title: String,
    pub borrower_name: String,
    pub borrowed_date: NaiveDate,
    pub due_date: NaiveDate,
}

const BORROWINGS_CSV_HEADER: &str = "ID,Book Title,Borrower Name,Borrowed Date,Due Date,Return Date";
const OVERDUE_CSV_HEADER: &str = "ID,Book Title,Borrower Name,Borrowed Date,Due Date";

/// Render the borrowing export as CSV
pub fn borrowings_to_csv(rows: &[BorrowingExportRow]) -> String {
    let mut lines = Vec::with_capacity(rows.len() + 1);
    lines.push(BORROWINGS_CSV_HEADER.to_string());
    for row in rows {
        let return_date = row
            .return_date
            .map(|d| d.to_string())
            .unwrap_or_default();
        lines.push(format!(
            "{},{},{},{},{},{}",
            row.id, row.title, row.borrower_name, row.borrowed_date, row.due_date, return_date
        ));
    }
    lines.join("\n")
}

/// Render the overdue export as CSV
pub fn overdue_to_csv(rows: &[OverdueExportRow]) -> String {
    let mut lines = Vec::with_capacity(rows.len() + 1);
    lines.push(OVERDUE_CSV_HEADER.to_string());
    for row in rows {
        lines.push(format!(
            "{},{},{},{},{}",
            row.id, row.title, row.borrower_name, row.borrowed_date, row.due_date
        ));
    }
    lines.join("\n")
}
