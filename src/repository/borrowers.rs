//! Borrowers repository for database operations

use sqlx::{Pool, Postgres};
use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    models::borrower::{Borrower, CreateBorrower, UpdateBorrower},
};

#[derive(Clone)]
pub struct BorrowersRepository {
    pool: Pool<Postgres>,
}

impl BorrowersRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// List all borrowers
    pub async fn list(&self) -> AppResult<Vec<Borrower>> {
        let borrowers = sqlx::query_as::<_, Borrower>(
            "SELECT id, name, email, password, registered_date FROM borrowers ORDER BY name, id",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(borrowers)
    }

    /// Get borrower by ID
    pub async fn get_by_id(&self, id: Uuid) -> AppResult<Borrower> {
        sqlx::query_as::<_, Borrower>(
            "SELECT id, name, email, password, registered_date FROM borrowers WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Borrower with id {} not found", id)))
    }

    /// Get borrower by email (login identifier)
    pub async fn get_by_email(&self, email: &str) -> AppResult<Option<Borrower>> {
        let borrower = sqlx::query_as::<_, Borrower>(
            "SELECT id, name, email, password, registered_date FROM borrowers WHERE LOWER(email) = LOWER($1)",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;
        Ok(borrower)
    }

    /// Create a new borrower
    ///
    /// A duplicate email surfaces as ConstraintViolation from the unique index.
    pub async fn create(&self, borrower: &CreateBorrower) -> AppResult<Borrower> {
        let created = sqlx::query_as::<_, Borrower>(
            r#"
            INSERT INTO borrowers (name, email, password, registered_date)
            VALUES ($1, $2, $3, COALESCE($4, CURRENT_DATE))
            RETURNING id, name, email, password, registered_date
            "#,
        )
        .bind(&borrower.name)
        .bind(&borrower.email)
        .bind(&borrower.password)
        .bind(borrower.registered_date)
        .fetch_one(&self.pool)
        .await?;
        Ok(created)
    }

    /// Update a borrower
    pub async fn update(&self, id: Uuid, borrower: &UpdateBorrower) -> AppResult<Borrower> {
        let updated = sqlx::query_as::<_, Borrower>(
            r#"
            UPDATE borrowers
            SET name = COALESCE($2, name),
                email = COALESCE($3, email),
                password = COALESCE($4, password),
                updated_at = NOW()
            WHERE id = $1
            RETURNING id, name, email, password, registered_date
            "#,
        )
        .bind(id)
        .bind(&borrower.name)
        .bind(&borrower.email)
        .bind(&borrower.password)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Borrower with id {} not found", id)))?;
        Ok(updated)
    }

    /// Delete a borrower
    pub async fn delete(&self, id: Uuid) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM borrowers WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Borrower with id {} not found", id)));
        }
        Ok(())
    }
}
