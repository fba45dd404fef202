//! Circulation service driving the checkout/return lifecycle

use chrono::NaiveDate;
use uuid::Uuid;

use crate::{error::AppResult, models::borrowing::Borrowing, repository::Repository};

#[derive(Clone)]
pub struct CirculationService {
    repository: Repository,
}

impl CirculationService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// Check out a book for a borrower.
    ///
    /// Preconditions fail in a fixed order: due date in the past, book
    /// missing or out of copies, borrower missing, pair already open.
    /// All of them are checked inside the repository transaction against
    /// the database clock, so "today" is the same date the loan records.
    /// A failed checkout leaves both the counter and the ledger untouched.
    pub async fn checkout(
        &self,
        borrower_id: Uuid,
        book_id: Uuid,
        due_date: NaiveDate,
    ) -> AppResult<Borrowing> {
        self.repository
            .borrowings
            .checkout(borrower_id, book_id, due_date)
            .await
    }

    /// Return a borrowed book
    pub async fn return_book(&self, borrower_id: Uuid, book_id: Uuid) -> AppResult<Borrowing> {
        self.repository.borrowings.return_book(borrower_id, book_id).await
    }
}
