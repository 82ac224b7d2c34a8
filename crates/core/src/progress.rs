//! Reading-progress projections derived from a reading log.
//!
//! Everything here is recomputed from the log on every read and never stored.
//! Percentage and pace round down, days-left rounds up, so a projection never
//! overstates progress nor understates the effort still required.

use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::model::{BookId, ReadingLog};
use crate::time::days_between;

//
// ─── RESULT STATES ─────────────────────────────────────────────────────────────
//

/// How the finish estimate was obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Projection {
    /// Nothing recorded yet.
    NoEntries,
    /// Entries exist but the measured pace floors to zero pages per day.
    NoPace,
    /// The last recorded page reaches the end of the book.
    Finished,
    /// Extrapolated from the average pace.
    OnPace,
}

impl Projection {
    /// True when there is no basis for a finish estimate.
    #[must_use]
    pub fn is_degenerate(self) -> bool {
        matches!(self, Projection::NoEntries | Projection::NoPace)
    }
}

/// Projection reconciled against the reader's deadline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DeadlineStatus {
    NoDeadline,
    /// Finished on or before the deadline.
    Met,
    /// Projected to finish on or before the deadline.
    OnTrack,
    /// Projected past the deadline, or no pace to project from.
    AtRisk,
    /// The deadline passed before the book was finished.
    Overdue,
}

/// Derived view of a reading log at a given day.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReadingProgress {
    pub book_id: BookId,
    pub last_read_page: u32,
    pub pages_total: u32,
    /// 0..=100
    pub read_percentage: u8,
    pub average_pages_per_day: u32,
    /// `None` for degenerate projections.
    pub estimated_read_days_left: Option<u32>,
    /// Days from today until the deadline; negative once it has passed.
    pub estimated_days_left: Option<i64>,
    pub estimated_finish_date: NaiveDate,
    pub deadline: Option<NaiveDate>,
    pub projection: Projection,
    pub deadline_status: DeadlineStatus,
}

impl ReadingProgress {
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.projection == Projection::Finished
    }
}

//
// ─── CALCULATOR ────────────────────────────────────────────────────────────────
//

/// Project a reading log as of `today`.
///
/// Pace is the last recorded page divided by the days between the first and
/// the last entry, with a floor of one day. The log is taken as a snapshot and
/// never modified.
#[must_use]
pub fn compute(log: &ReadingLog, today: NaiveDate) -> ReadingProgress {
    let pages_total = log.total_pages();
    let deadline = log.deadline();
    let estimated_days_left = deadline.map(|d| days_between(today, d));

    let (Some(first), Some(last)) = (log.first_entry(), log.last_entry()) else {
        return ReadingProgress {
            book_id: log.book_id(),
            last_read_page: 0,
            pages_total,
            read_percentage: 0,
            average_pages_per_day: 0,
            estimated_read_days_left: None,
            estimated_days_left,
            estimated_finish_date: today,
            deadline,
            projection: Projection::NoEntries,
            deadline_status: deadline_status(deadline, today, Projection::NoEntries, today),
        };
    };

    let last_read_page = last.last_read_page();
    let elapsed_days = days_between(first.date(), last.date()).max(1).unsigned_abs();
    let average_pages_per_day =
        u32::try_from(u64::from(last_read_page) / elapsed_days).unwrap_or(u32::MAX);
    let remaining_pages = pages_total.saturating_sub(last_read_page);

    let (projection, estimated_read_days_left, estimated_finish_date) = if remaining_pages == 0 {
        (Projection::Finished, Some(0), last.date())
    } else if average_pages_per_day == 0 {
        (Projection::NoPace, None, today)
    } else {
        let days = remaining_pages.div_ceil(average_pages_per_day);
        let finish = last
            .date()
            .checked_add_days(Days::new(u64::from(days)))
            .unwrap_or(NaiveDate::MAX);
        (Projection::OnPace, Some(days), finish)
    };

    ReadingProgress {
        book_id: log.book_id(),
        last_read_page,
        pages_total,
        read_percentage: read_percentage(last_read_page, pages_total),
        average_pages_per_day,
        estimated_read_days_left,
        estimated_days_left,
        estimated_finish_date,
        deadline,
        projection,
        deadline_status: deadline_status(deadline, today, projection, estimated_finish_date),
    }
}

fn read_percentage(last_read_page: u32, pages_total: u32) -> u8 {
    if pages_total == 0 {
        return 0;
    }
    let pct = (u64::from(last_read_page) * 100 / u64::from(pages_total)).min(100);
    u8::try_from(pct).unwrap_or(100)
}

fn deadline_status(
    deadline: Option<NaiveDate>,
    today: NaiveDate,
    projection: Projection,
    finish: NaiveDate,
) -> DeadlineStatus {
    let Some(deadline) = deadline else {
        return DeadlineStatus::NoDeadline;
    };
    match projection {
        Projection::Finished if finish <= deadline => DeadlineStatus::Met,
        Projection::Finished => DeadlineStatus::Overdue,
        _ if deadline < today => DeadlineStatus::Overdue,
        Projection::NoEntries | Projection::NoPace => DeadlineStatus::AtRisk,
        Projection::OnPace if finish <= deadline => DeadlineStatus::OnTrack,
        Projection::OnPace => DeadlineStatus::AtRisk,
    }
}
