//! Upcoming class cards.

use chrono::{DateTime, FixedOffset, Utc};
use serde::Serialize;

use super::local;
use crate::models::ClassRecord;

/// Cards shown on the dashboard before "view all".
pub const PREVIEW_LIMIT: usize = 3;
/// Placeholder text when nothing is upcoming.
pub const NO_UPCOMING: &str = "No upcoming classes scheduled";

/// A class starting at exactly `now` still counts as upcoming.
pub fn is_upcoming(record: &ClassRecord, now: DateTime<Utc>) -> bool {
    record.date_time >= now
}

/// A class card.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ClassCard {
    pub id: String,
    pub title: String,
    /// "Fri, Mar 15" on the dashboard, "Friday, March 15" in the full list
    pub date_label: String,
    pub time_label: String,
    pub instructor: String,
}

/// A rendered list of upcoming classes.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpcomingList {
    pub cards: Vec<ClassCard>,
    /// Upcoming classes in total, including those past the preview cap
    pub total: usize,
    pub empty_message: Option<&'static str>,
}

#[derive(Clone, Copy)]
enum CardStyle {
    Short,
    Long,
}

/// The capped dashboard list, in store order.
pub fn upcoming_preview(
    classes: &[ClassRecord],
    now: DateTime<Utc>,
    offset: FixedOffset,
) -> UpcomingList {
    build(classes, now, offset, Some(PREVIEW_LIMIT), CardStyle::Short)
}

/// Every upcoming class, in store order.
pub fn all_upcoming(classes: &[ClassRecord], now: DateTime<Utc>, offset: FixedOffset) -> UpcomingList {
    build(classes, now, offset, None, CardStyle::Long)
}

fn build(
    classes: &[ClassRecord],
    now: DateTime<Utc>,
    offset: FixedOffset,
    cap: Option<usize>,
    style: CardStyle,
) -> UpcomingList {
    let upcoming: Vec<&ClassRecord> = classes.iter().filter(|c| is_upcoming(c, now)).collect();
    let total = upcoming.len();

    let cards = upcoming
        .into_iter()
        .take(cap.unwrap_or(usize::MAX))
        .map(|c| card(c, offset, style))
        .collect();

    UpcomingList {
        cards,
        total,
        empty_message: (total == 0).then_some(NO_UPCOMING),
    }
}

fn card(record: &ClassRecord, offset: FixedOffset, style: CardStyle) -> ClassCard {
    let at = local(record.date_time, offset);
    let date_format = match style {
        CardStyle::Short => "%a, %b %-d",
        CardStyle::Long => "%A, %B %-d",
    };

    ClassCard {
        id: record.id.clone(),
        title: record.title.clone(),
        date_label: at.format(date_format).to_string(),
        time_label: at.format("%H:%M").to_string(),
        instructor: record.instructor.clone(),
    }
}
