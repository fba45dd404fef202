//! Books repository for database operations

use sqlx::{PgConnection, Pool, Postgres};
use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    models::book::{Book, CreateBook, UpdateBook},
};

/// Atomically adjust a book's available quantity by `delta` (+1 or -1).
///
/// This is the only statement in the codebase that writes
/// `available_quantity`. The guard is a single read-modify-write: the row
/// lock it takes serializes concurrent adjustments per book, and the
/// predicate refuses to drive the counter below zero, so a losing
/// concurrent decrement observes `ItemUnavailable` instead of underflow.
pub(crate) async fn adjust_quantity(
    conn: &mut PgConnection,
    book_id: Uuid,
    delta: i32,
) -> AppResult<i32> {
    let new_quantity: Option<i32> = sqlx::query_scalar(
        r#"
        UPDATE books
        SET available_quantity = available_quantity + $2, updated_at = NOW()
        WHERE id = $1 AND available_quantity + $2 >= 0
        RETURNING available_quantity
        "#,
    )
    .bind(book_id)
    .bind(delta)
    .fetch_optional(&mut *conn)
    .await?;

    match new_quantity {
        Some(quantity) => Ok(quantity),
        None => {
            let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM books WHERE id = $1)")
                .bind(book_id)
                .fetch_one(&mut *conn)
                .await?;
            if exists {
                Err(AppError::ItemUnavailable(format!(
                    "Book {} has no available copies",
                    book_id
                )))
            } else {
                Err(AppError::NotFound(format!("Book with id {} not found", book_id)))
            }
        }
    }
}

#[derive(Clone)]
pub struct BooksRepository {
    pool: Pool<Postgres>,
}

impl BooksRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// List all books
    pub async fn list(&self) -> AppResult<Vec<Book>> {
        let books = sqlx::query_as::<_, Book>("SELECT * FROM books ORDER BY title, id")
            .fetch_all(&self.pool)
            .await?;
        Ok(books)
    }

    /// Get book by ID
    pub async fn get_by_id(&self, id: Uuid) -> AppResult<Book> {
        sqlx::query_as::<_, Book>("SELECT * FROM books WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Book with id {} not found", id)))
    }

    /// Get books by exact title
    pub async fn get_by_title(&self, title: &str) -> AppResult<Vec<Book>> {
        let books = sqlx::query_as::<_, Book>("SELECT * FROM books WHERE title = $1 ORDER BY id")
            .bind(title)
            .fetch_all(&self.pool)
            .await?;
        if books.is_empty() {
            return Err(AppError::NotFound(format!("No book found with title {}", title)));
        }
        Ok(books)
    }

    /// Get books by exact author
    pub async fn get_by_author(&self, author: &str) -> AppResult<Vec<Book>> {
        let books = sqlx::query_as::<_, Book>("SELECT * FROM books WHERE author = $1 ORDER BY id")
            .bind(author)
            .fetch_all(&self.pool)
            .await?;
        if books.is_empty() {
            return Err(AppError::NotFound(format!("No book found by author {}", author)));
        }
        Ok(books)
    }

    /// Get book by ISBN
    pub async fn get_by_isbn(&self, isbn: &str) -> AppResult<Book> {
        sqlx::query_as::<_, Book>("SELECT * FROM books WHERE isbn = $1")
            .bind(isbn)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("No book found with ISBN {}", isbn)))
    }

    /// Create a new book
    pub async fn create(&self, book: &CreateBook) -> AppResult<Book> {
        let created = sqlx::query_as::<_, Book>(
            r#"
            INSERT INTO books (title, author, isbn, available_quantity, shelf_location)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(&book.title)
        .bind(&book.author)
        .bind(&book.isbn)
        .bind(book.available_quantity)
        .bind(&book.shelf_location)
        .fetch_one(&self.pool)
        .await?;
        Ok(created)
    }

    /// Update a book's catalog fields (never the quantity counter)
    pub async fn update(&self, id: Uuid, book: &UpdateBook) -> AppResult<Book> {
        let updated = sqlx::query_as::<_, Book>(
            r#"
            UPDATE books
            SET title = COALESCE($2, title),
                author = COALESCE($3, author),
                isbn = COALESCE($4, isbn),
                shelf_location = COALESCE($5, shelf_location),
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(&book.title)
        .bind(&book.author)
        .bind(&book.isbn)
        .bind(&book.shelf_location)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Book with id {} not found", id)))?;
        Ok(updated)
    }

    /// Delete a book
    pub async fn delete(&self, id: Uuid) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM books WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Book with id {} not found", id)));
        }
        Ok(())
    }
}
