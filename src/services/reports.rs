//! Analytics reports over the loan ledger

use chrono::{Datelike, Duration, NaiveDate, Utc};

use crate::{
    error::AppResult,
    models::report::{borrowings_to_csv, AnalyticsReport},
    repository::Repository,
};

/// Default number of books in the top-borrowed list
pub const DEFAULT_TOP_LIMIT: i64 = 5;

/// Closed date range covering the calendar month before `today`:
/// first day of the previous month through its last day.
pub(crate) fn previous_month_range(today: NaiveDate) -> (NaiveDate, NaiveDate) {
    // Safe: day 1 exists in every month.
    let first_of_current = today.with_day(1).expect("day 1 is always valid");
    let last_of_previous = first_of_current - Duration::days(1);
    let first_of_previous = last_of_previous.with_day(1).expect("day 1 is always valid");
    (first_of_previous, last_of_previous)
}

#[derive(Clone)]
pub struct ReportsService {
    repository: Repository,
}

impl ReportsService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// Build the analytics report for a closed borrowed-date window
    pub async fn analytics_report(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> AppResult<AnalyticsReport> {
        let total_books_borrowed = self.repository.borrowings.total_borrowed(start, end).await?;
        let most_borrowed_books = self
            .repository
            .borrowings
            .top_borrowed_books(start, end, DEFAULT_TOP_LIMIT)
            .await?;
        let books_borrowed_by_borrower = self
            .repository
            .borrowings
            .borrow_counts_by_borrower(start, end)
            .await?;
        let average_borrowing_duration = self
            .repository
            .borrowings
            .average_borrowing_duration(start, end)
            .await?;

        Ok(AnalyticsReport {
            total_books_borrowed,
            most_borrowed_books,
            books_borrowed_by_borrower,
            average_borrowing_duration,
        })
    }

    /// CSV export of borrowing episodes for a window; when no window is
    /// given, exports the previous calendar month.
    pub async fn export_borrowings_csv(
        &self,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    ) -> AppResult<String> {
        let (start, end) = match (start, end) {
            (Some(s), Some(e)) => (s, e),
            _ => previous_month_range(Utc::now().date_naive()),
        };
        let rows = self.repository.borrowings.export_borrowings(start, end).await?;
        Ok(borrowings_to_csv(&rows))
    }
}
