//! Month grid projection and cursor navigation.

use chrono::{DateTime, Datelike, FixedOffset, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::local;
use crate::models::ClassRecord;

/// Titles shown inside a day cell before collapsing into "N more".
pub const TITLES_PER_DAY: usize = 2;

/// The month the calendar is showing. `month` is zero-based (0 = January).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalendarCursor {
    pub month: u32,
    pub year: i32,
}

impl CalendarCursor {
    /// Build a cursor, rejecting months outside `0..=11`.
    #[cfg(test)]
    pub fn new(month: u32, year: i32) -> Option<Self> {
        (month < 12 && first_of_month(year, month).is_some()).then_some(Self { month, year })
    }

    /// Cursor for the month containing `now` in the classroom's local time.
    pub fn containing(now: DateTime<Utc>, offset: FixedOffset) -> Self {
        let today = local(now, offset).date_naive();
        Self {
            month: today.month0(),
            year: today.year(),
        }
    }

    pub fn previous(self) -> Self {
        if self.month == 0 {
            Self {
                month: 11,
                year: self.year - 1,
            }
        } else {
            Self {
                month: self.month - 1,
                ..self
            }
        }
    }

    pub fn next(self) -> Self {
        if self.month == 11 {
            Self {
                month: 0,
                year: self.year + 1,
            }
        } else {
            Self {
                month: self.month + 1,
                ..self
            }
        }
    }

    /// Weekday of the 1st, 0 = Sunday.
    pub fn leading_blanks(&self) -> u32 {
        first_of_month(self.year, self.month)
            .map(|d| d.weekday().num_days_from_sunday())
            .unwrap_or(0)
    }

    pub fn days_in_month(&self) -> u32 {
        let next = self.next();
        match (
            first_of_month(self.year, self.month),
            first_of_month(next.year, next.month),
        ) {
            (Some(first), Some(following)) => (following - first).num_days() as u32,
            _ => 0,
        }
    }

    /// "March 2024"
    pub fn label(&self) -> String {
        first_of_month(self.year, self.month)
            .map(|d| d.format("%B %Y").to_string())
            .unwrap_or_default()
    }
}

fn first_of_month(year: i32, month0: u32) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(year, month0 + 1, 1)
}

/// One cell of the month grid.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum CalendarCell {
    Empty,
    Day(CalendarDay),
}

/// A day cell with its markers.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CalendarDay {
    pub day: u32,
    pub date: NaiveDate,
    pub is_today: bool,
    pub has_class: bool,
    /// "Algebra, Biology, 3 more"; absent when the day has no classes
    pub indicator: Option<String>,
    /// Ids of the day's classes, in store order
    pub class_ids: Vec<String>,
}

/// The rendered month.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthView {
    pub month: u32,
    pub year: i32,
    pub label: String,
    pub leading_blanks: u32,
    pub days_in_month: u32,
    pub cells: Vec<CalendarCell>,
}

/// Render the month at `cursor`.
pub fn render_month(
    cursor: CalendarCursor,
    classes: &[ClassRecord],
    now: DateTime<Utc>,
    offset: FixedOffset,
) -> MonthView {
    let leading_blanks = cursor.leading_blanks();
    let days_in_month = cursor.days_in_month();
    let today = local(now, offset).date_naive();

    let mut cells = Vec::with_capacity((leading_blanks + days_in_month) as usize);
    cells.extend((0..leading_blanks).map(|_| CalendarCell::Empty));

    for day in 1..=days_in_month {
        let Some(date) = NaiveDate::from_ymd_opt(cursor.year, cursor.month + 1, day) else {
            continue;
        };
        let day_classes = classes_for_date(classes, date, offset);

        cells.push(CalendarCell::Day(CalendarDay {
            day,
            date,
            is_today: date == today,
            has_class: !day_classes.is_empty(),
            indicator: indicator_text(&day_classes),
            class_ids: day_classes.iter().map(|c| c.id.clone()).collect(),
        }));
    }

    MonthView {
        month: cursor.month,
        year: cursor.year,
        label: cursor.label(),
        leading_blanks,
        days_in_month,
        cells,
    }
}

fn indicator_text(day_classes: &[&ClassRecord]) -> Option<String> {
    if day_classes.is_empty() {
        return None;
    }

    let mut parts: Vec<String> = day_classes
        .iter()
        .take(TITLES_PER_DAY)
        .map(|c| c.title.clone())
        .collect();
    if day_classes.len() > TITLES_PER_DAY {
        parts.push(format!("{} more", day_classes.len() - TITLES_PER_DAY));
    }
    Some(parts.join(", "))
}

/// Records whose local calendar date is `date`, in store order.
pub fn classes_for_date<'a>(
    classes: &'a [ClassRecord],
    date: NaiveDate,
    offset: FixedOffset,
) -> Vec<&'a ClassRecord> {
    classes
        .iter()
        .filter(|c| local(c.date_time, offset).date_naive() == date)
        .collect()
}

/// The list shown when a flagged day is clicked.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DayListing {
    pub date: NaiveDate,
    pub heading: String,
    pub entries: Vec<DayListingEntry>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DayListingEntry {
    pub id: String,
    /// "• Algebra (10:00)"
    pub text: String,
}

pub fn day_listing(classes: &[ClassRecord], date: NaiveDate, offset: FixedOffset) -> DayListing {
    let entries = classes_for_date(classes, date, offset)
        .into_iter()
        .map(|c| DayListingEntry {
            id: c.id.clone(),
            text: format!(
                "\u{2022} {} ({})",
                c.title,
                local(c.date_time, offset).format("%H:%M")
            ),
        })
        .collect();

    DayListing {
        date,
        heading: format!("Classes on {}", date.format("%-m/%-d/%Y")),
        entries,
    }
}
