//! Borrowings repository: circulation transactions, overdue scans and
//! analytics queries over the loan ledger

use chrono::NaiveDate;
use sqlx::{Pool, Postgres};
use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    models::{
        borrowing::{BorrowedBook, Borrowing, OverdueLoan},
        report::{BookBorrowCount, BorrowerBorrowCount, BorrowingExportRow, OverdueExportRow},
    },
    repository::books,
};

/// Partial unique index guaranteeing at most one open loan per pair
const OPEN_PAIR_INDEX: &str = "uniq_borrowings_open_pair";

/// A due date may not precede the day the loan is created.
fn check_due_date(due_date: NaiveDate, today: NaiveDate) -> AppResult<()> {
    if due_date < today {
        return Err(AppError::InvalidDueDate(format!(
            "Due date {} already passed",
            due_date
        )));
    }
    Ok(())
}

#[derive(Clone)]
pub struct BorrowingsRepository {
    pool: Pool<Postgres>,
}

impl BorrowingsRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Check out a book for a borrower.
    ///
    /// The quantity decrement and the loan insert run in one transaction;
    /// either both commit or neither does. The guarded decrement comes
    /// first: its row lock serializes concurrent checkouts of the same
    /// book, so by the time the open-pair check runs, any competing
    /// checkout for this pair has already committed or rolled back.
    pub async fn checkout(
        &self,
        borrower_id: Uuid,
        book_id: Uuid,
        due_date: NaiveDate,
    ) -> AppResult<Borrowing> {
        let mut tx = self.pool.begin().await?;

        // CURRENT_DATE is fixed at transaction start, so the date validated
        // here is the same date the loan row records as borrowed_date.
        let today: NaiveDate = sqlx::query_scalar("SELECT CURRENT_DATE")
            .fetch_one(&mut *tx)
            .await?;
        check_due_date(due_date, today)?;

        books::adjust_quantity(&mut tx, book_id, -1).await?;

        let borrower_exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM borrowers WHERE id = $1)")
                .bind(borrower_id)
                .fetch_one(&mut *tx)
                .await?;
        if !borrower_exists {
            return Err(AppError::NotFound(format!(
                "Borrower with id {} not found",
                borrower_id
            )));
        }

        let open_loan: Option<Uuid> = sqlx::query_scalar(
            "SELECT id FROM borrowings WHERE borrower_id = $1 AND book_id = $2 AND return_date IS NULL",
        )
        .bind(borrower_id)
        .bind(book_id)
        .fetch_optional(&mut *tx)
        .await?;
        if open_loan.is_some() {
            return Err(AppError::DuplicateLoan(format!(
                "Borrower {} already holds book {}",
                borrower_id, book_id
            )));
        }

        // The partial unique index backstops the check above for writers
        // that raced past it.
        let borrowing = sqlx::query_as::<_, Borrowing>(
            r#"
            INSERT INTO borrowings (book_id, borrower_id, borrowed_date, due_date)
            VALUES ($1, $2, CURRENT_DATE, $3)
            RETURNING *
            "#,
        )
        .bind(book_id)
        .bind(borrower_id)
        .bind(due_date)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| {
            let err = AppError::from(e);
            if err.is_unique_violation(OPEN_PAIR_INDEX) {
                AppError::DuplicateLoan(format!(
                    "Borrower {} already holds book {}",
                    borrower_id, book_id
                ))
            } else {
                err
            }
        })?;

        tx.commit().await?;
        Ok(borrowing)
    }

    /// Return a book held by a borrower.
    ///
    /// Sets `return_date` on the single open loan for the pair and restores
    /// the quantity, atomically. More than one open loan for the pair is an
    /// integrity violation, never silently resolved by picking one.
    pub async fn return_book(&self, borrower_id: Uuid, book_id: Uuid) -> AppResult<Borrowing> {
        let mut tx = self.pool.begin().await?;

        let book_exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM books WHERE id = $1)")
                .bind(book_id)
                .fetch_one(&mut *tx)
                .await?;
        if !book_exists {
            return Err(AppError::NotFound(format!("Book with id {} not found", book_id)));
        }

        let borrower_exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM borrowers WHERE id = $1)")
                .bind(borrower_id)
                .fetch_one(&mut *tx)
                .await?;
        if !borrower_exists {
            return Err(AppError::NotFound(format!(
                "Borrower with id {} not found",
                borrower_id
            )));
        }

        let open_loans: Vec<Uuid> = sqlx::query_scalar(
            r#"
            SELECT id FROM borrowings
            WHERE borrower_id = $1 AND book_id = $2 AND return_date IS NULL
            FOR UPDATE
            "#,
        )
        .bind(borrower_id)
        .bind(book_id)
        .fetch_all(&mut *tx)
        .await?;

        let loan_id = match open_loans.as_slice() {
            [] => {
                return Err(AppError::NoOpenLoan(format!(
                    "No open loan of book {} by borrower {}",
                    book_id, borrower_id
                )))
            }
            [id] => *id,
            _ => {
                return Err(AppError::ConstraintViolation(format!(
                    "Multiple open loans of book {} by borrower {}",
                    book_id, borrower_id
                )))
            }
        };

        // The predicate keeps an already-set return date immutable.
        let borrowing = sqlx::query_as::<_, Borrowing>(
            r#"
            UPDATE borrowings SET return_date = CURRENT_DATE
            WHERE id = $1 AND return_date IS NULL
            RETURNING *
            "#,
        )
        .bind(loan_id)
        .fetch_one(&mut *tx)
        .await?;

        books::adjust_quantity(&mut tx, book_id, 1).await?;

        tx.commit().await?;
        Ok(borrowing)
    }

    /// Books currently held by a borrower, oldest loan first
    pub async fn get_borrower_books(&self, borrower_id: Uuid) -> AppResult<Vec<BorrowedBook>> {
        let books = sqlx::query_as::<_, BorrowedBook>(
            r#"
            SELECT b.id, b.title, b.author, b.isbn, bw.due_date, bw.borrowed_date
            FROM borrowings bw
            JOIN books b ON bw.book_id = b.id
            WHERE bw.borrower_id = $1 AND bw.return_date IS NULL
            ORDER BY bw.borrowed_date, bw.id
            "#,
        )
        .bind(borrower_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(books)
    }

    /// Open loans past their due date as of the given date.
    /// Ordered by due date ascending, then loan id, for a stable listing.
    pub async fn list_overdue(&self, as_of: NaiveDate) -> AppResult<Vec<OverdueLoan>> {
        let loans = sqlx::query_as::<_, OverdueLoan>(
            r#"
            SELECT b.id, b.title, b.author, b.isbn,
                   br.id AS borrower_id, br.name AS borrower_name, br.email AS borrower_email,
                   bw.due_date, bw.borrowed_date
            FROM borrowings bw
            JOIN books b ON bw.book_id = b.id
            JOIN borrowers br ON bw.borrower_id = br.id
            WHERE bw.return_date IS NULL AND bw.due_date < $1
            ORDER BY bw.due_date, bw.id
            "#,
        )
        .bind(as_of)
        .fetch_all(&self.pool)
        .await?;
        Ok(loans)
    }

    /// Overdue loans whose borrowing began inside the closed window,
    /// shaped for the CSV export. Each row is one loan: the ID column
    /// carries the borrowing id, not the book id.
    pub async fn export_overdue(
        &self,
        as_of: NaiveDate,
        start: NaiveDate,
        end: NaiveDate,
    ) -> AppResult<Vec<OverdueExportRow>> {
        let rows = sqlx::query_as::<_, OverdueExportRow>(
            r#"
            SELECT bw.id, b.title, br.name AS borrower_name, bw.borrowed_date, bw.due_date
            FROM borrowings bw
            JOIN books b ON bw.book_id = b.id
            JOIN borrowers br ON bw.borrower_id = br.id
            WHERE bw.return_date IS NULL AND bw.due_date < $1
              AND bw.borrowed_date BETWEEN $2 AND $3
            ORDER BY bw.due_date, bw.id
            "#,
        )
        .bind(as_of)
        .bind(start)
        .bind(end)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    /// All borrowing episodes begun inside the closed window, shaped for
    /// the CSV export
    pub async fn export_borrowings(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> AppResult<Vec<BorrowingExportRow>> {
        let rows = sqlx::query_as::<_, BorrowingExportRow>(
            r#"
            SELECT bw.id, b.title, br.name AS borrower_name,
                   bw.borrowed_date, bw.due_date, bw.return_date
            FROM borrowings bw
            JOIN books b ON bw.book_id = b.id
            JOIN borrowers br ON bw.borrower_id = br.id
            WHERE bw.borrowed_date BETWEEN $1 AND $2
            ORDER BY bw.borrowed_date, bw.id
            "#,
        )
        .bind(start)
        .bind(end)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    /// Count of loans begun in the window that are still open.
    /// Loans begun and already returned inside the window do not count.
    pub async fn total_borrowed(&self, start: NaiveDate, end: NaiveDate) -> AppResult<i64> {
        let count: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*) FROM borrowings
            WHERE borrowed_date BETWEEN $1 AND $2 AND return_date IS NULL
            "#,
        )
        .bind(start)
        .bind(end)
        .fetch_one(&self.pool)
        .await?;
        Ok(count)
    }

    /// Most borrowed books in the window.
    /// Ties are broken by book id ascending.
    pub async fn top_borrowed_books(
        &self,
        start: NaiveDate,
        end: NaiveDate,
        limit: i64,
    ) -> AppResult<Vec<BookBorrowCount>> {
        let rows = sqlx::query_as::<_, BookBorrowCount>(
            r#"
            SELECT b.id, b.title, b.author, b.isbn, COUNT(*) AS borrow_count
            FROM borrowings bw
            JOIN books b ON bw.book_id = b.id
            WHERE bw.borrowed_date BETWEEN $1 AND $2
            GROUP BY b.id, b.title, b.author, b.isbn
            ORDER BY borrow_count DESC, b.id
            LIMIT $3
            "#,
        )
        .bind(start)
        .bind(end)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    /// Borrow counts grouped by borrower, ordered by borrower id
    pub async fn borrow_counts_by_borrower(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> AppResult<Vec<BorrowerBorrowCount>> {
        let rows = sqlx::query_as::<_, BorrowerBorrowCount>(
            r#"
            SELECT br.id, br.name, br.email, COUNT(*) AS borrow_count
            FROM borrowings bw
            JOIN borrowers br ON bw.borrower_id = br.id
            WHERE bw.borrowed_date BETWEEN $1 AND $2
            GROUP BY br.id, br.name, br.email
            ORDER BY br.id
            "#,
        )
        .bind(start)
        .bind(end)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    /// Average loan duration in days over returned loans in the window.
    /// None when nothing in the window has been returned; callers must
    /// treat that as "no data", not zero.
    pub async fn average_borrowing_duration(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> AppResult<Option<f64>> {
        let avg: Option<f64> = sqlx::query_scalar(
            r#"
            SELECT AVG((return_date - borrowed_date))::float8
            FROM borrowings
            WHERE borrowed_date BETWEEN $1 AND $2 AND return_date IS NOT NULL
            "#,
        )
        .bind(start)
        .bind(end)
        .fetch_one(&self.pool)
        .await?;
        Ok(avg)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn due_date_in_the_past_is_rejected() {
        let err = check_due_date(date(2024, 1, 9), date(2024, 1, 10)).unwrap_err();
        assert!(matches!(err, AppError::InvalidDueDate(_)));
    }

    #[test]
    fn due_date_today_or_later_is_accepted() {
        assert!(check_due_date(date(2024, 1, 10), date(2024, 1, 10)).is_ok());
        assert!(check_due_date(date(2024, 1, 17), date(2024, 1, 10)).is_ok());
    }
}
