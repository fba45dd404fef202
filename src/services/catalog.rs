//! Book catalog service

use uuid::Uuid;

use crate::{
    error::AppResult,
    models::book::{Book, CreateBook, UpdateBook},
    repository::Repository,
};

#[derive(Clone)]
pub struct CatalogService {
    repository: Repository,
}

impl CatalogService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// List all books
    pub async fn list_books(&self) -> AppResult<Vec<Book>> {
        self.repository.books.list().await
    }

    /// Get a book by ID
    pub async fn get_book(&self, id: Uuid) -> AppResult<Book> {
        self.repository.books.get_by_id(id).await
    }

    /// Get books by exact title
    pub async fn get_books_by_title(&self, title: &str) -> AppResult<Vec<Book>> {
        self.repository.books.get_by_title(title).await
    }

    /// Get books by exact author
    pub async fn get_books_by_author(&self, author: &str) -> AppResult<Vec<Book>> {
        self.repository.books.get_by_author(author).await
    }

    /// Get a book by ISBN
    pub async fn get_book_by_isbn(&self, isbn: &str) -> AppResult<Book> {
        self.repository.books.get_by_isbn(isbn).await
    }

    /// Create a new book
    pub async fn create_book(&self, book: CreateBook) -> AppResult<Book> {
        self.repository.books.create(&book).await
    }

    /// Update a book's catalog fields
    pub async fn update_book(&self, id: Uuid, book: UpdateBook) -> AppResult<Book> {
        self.repository.books.update(id, &book).await
    }

    /// Delete a book
    pub async fn delete_book(&self, id: Uuid) -> AppResult<()> {
        self.repository.books.delete(id).await
    }
}
