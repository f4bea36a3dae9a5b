//! Dashboard projections.
//!
//! Every function here is a pure projection of the class list, the calendar
//! cursor and the current instant. Nothing in this module mutates state.

mod calendar;
mod detail;
mod greeting;
mod upcoming;

pub use calendar::*;
pub use detail::*;
pub use greeting::*;
pub use upcoming::*;

use chrono::{DateTime, FixedOffset, Utc};
use serde::Serialize;

use crate::models::ClassRecord;

/// Calendar and upcoming list together, returned after every schedule
/// mutation so the page re-renders both.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardView {
    pub calendar: MonthView,
    pub upcoming: UpcomingList,
}

impl DashboardView {
    pub fn render(
        cursor: CalendarCursor,
        classes: &[ClassRecord],
        now: DateTime<Utc>,
        offset: FixedOffset,
    ) -> Self {
        Self {
            calendar: render_month(cursor, classes, now, offset),
            upcoming: upcoming_preview(classes, now, offset),
        }
    }
}

/// Convert a stored instant to the classroom's local wall clock.
pub(crate) fn local(at: DateTime<Utc>, offset: FixedOffset) -> DateTime<FixedOffset> {
    at.with_timezone(&offset)
}
