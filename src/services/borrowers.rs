//! Borrower management service

use uuid::Uuid;

use crate::{
    error::AppResult,
    models::{
        borrower::{Borrower, CreateBorrower, UpdateBorrower},
        borrowing::BorrowedBook,
    },
    repository::Repository,
};

#[derive(Clone)]
pub struct BorrowersService {
    repository: Repository,
}

impl BorrowersService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// List all borrowers
    pub async fn list_borrowers(&self) -> AppResult<Vec<Borrower>> {
        self.repository.borrowers.list().await
    }

    /// Get a borrower by ID
    pub async fn get_borrower(&self, id: Uuid) -> AppResult<Borrower> {
        self.repository.borrowers.get_by_id(id).await
    }

    /// Register a new borrower
    pub async fn create_borrower(&self, borrower: CreateBorrower) -> AppResult<Borrower> {
        self.repository.borrowers.create(&borrower).await
    }

    /// Update a borrower
    pub async fn update_borrower(&self, id: Uuid, borrower: UpdateBorrower) -> AppResult<Borrower> {
        // Verify borrower exists
        self.repository.borrowers.get_by_id(id).await?;
        self.repository.borrowers.update(id, &borrower).await
    }

    /// Delete a borrower
    pub async fn delete_borrower(&self, id: Uuid) -> AppResult<()> {
        self.repository.borrowers.delete(id).await
    }

    /// Books currently held by a borrower
    pub async fn get_borrower_books(&self, id: Uuid) -> AppResult<Vec<BorrowedBook>> {
        // Verify borrower exists
        self.repository.borrowers.get_by_id(id).await?;
        self.repository.borrowings.get_borrower_books(id).await
    }
}
