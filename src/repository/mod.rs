//! Repository layer for database operations

pub mod books;
pub mod borrowers;
pub mod borrowings;

use sqlx::{Pool, Postgres};

/// Main repository struct holding database connection pool
#[derive(Clone)]
pub struct Repository {
    pub pool: Pool<Postgres>,
    pub books: books::BooksRepository,
    pub borrowers: borrowers::BorrowersRepository,
    pub borrowings: borrowings::BorrowingsRepository,
}

impl Repository {
    /// Create a new repository with the given database pool
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self {
            books: books::BooksRepository::new(pool.clone()),
            borrowers: borrowers::BorrowersRepository::new(pool.clone()),
            borrowings: borrowings::BorrowingsRepository::new(pool.clone()),
            pool,
        }
    }
}
