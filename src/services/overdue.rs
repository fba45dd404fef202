//! Overdue loan queries and exports
//!
//! Read-only: overdue status is derived from open loans past their due
//! date at query time, never stored.

use chrono::{NaiveDate, Utc};

use crate::{
    error::AppResult,
    models::{borrowing::OverdueLoan, report::overdue_to_csv},
    repository::Repository,
    services::reports::previous_month_range,
};

#[derive(Clone)]
pub struct OverdueService {
    repository: Repository,
}

impl OverdueService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// Every open loan past its due date, as of today
    pub async fn list_overdue(&self) -> AppResult<Vec<OverdueLoan>> {
        self.repository
            .borrowings
            .list_overdue(Utc::now().date_naive())
            .await
    }

    /// CSV export of overdue loans whose borrowing began in the window;
    /// defaults to the previous calendar month.
    pub async fn export_overdue_csv(
        &self,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    ) -> AppResult<String> {
        let today = Utc::now().date_naive();
        let (start, end) = match (start, end) {
            (Some(s), Some(e)) => (s, e),
            _ => previous_month_range(today),
        };
        let rows = self.repository.borrowings.export_overdue(today, start, end).await?;
        Ok(overdue_to_csv(&rows))
    }
}
