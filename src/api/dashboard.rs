//! Calendar and upcoming-list endpoints.

use axum::extract::{Path, State};
use chrono::NaiveDate;

use super::{error, revision, success, ApiResult};
use crate::errors::AppError;
use crate::views::{self, CalendarCursor, DayListing, MonthView, UpcomingList};
use crate::AppState;

async fn render_calendar(state: &AppState) -> MonthView {
    let schedule = state.schedule.lock().await;
    let cursor = *state.cursor.lock().await;
    views::render_month(
        cursor,
        schedule.classes(),
        state.clock.now(),
        state.config.utc_offset,
    )
}

/// Move the cursor and render the month it lands on.
async fn navigate(state: &AppState, step: fn(CalendarCursor) -> CalendarCursor) -> MonthView {
    {
        let mut cursor = state.cursor.lock().await;
        *cursor = step(*cursor);
        tracing::debug!("Calendar moved to {}", cursor.label());
    }
    render_calendar(state).await
}

/// GET /api/calendar - Month grid at the cursor.
pub async fn get_calendar(State(state): State<AppState>) -> ApiResult<MonthView> {
    let view = render_calendar(&state).await;
    success(view, revision(&state).await)
}

/// POST /api/calendar/prev
pub async fn previous_month(State(state): State<AppState>) -> ApiResult<MonthView> {
    let view = navigate(&state, CalendarCursor::previous).await;
    success(view, revision(&state).await)
}

/// POST /api/calendar/next
pub async fn next_month(State(state): State<AppState>) -> ApiResult<MonthView> {
    let view = navigate(&state, CalendarCursor::next).await;
    success(view, revision(&state).await)
}

/// GET /api/calendar/days/{date} - Classes on a local date (`YYYY-MM-DD`).
pub async fn classes_on_day(
    State(state): State<AppState>,
    Path(date): Path<String>,
) -> ApiResult<DayListing> {
    let revision_id = revision(&state).await;

    let Ok(date) = NaiveDate::parse_from_str(&date, "%Y-%m-%d") else {
        return error(
            AppError::BadRequest(format!("Invalid date: {}", date)),
            revision_id,
        );
    };

    let schedule = state.schedule.lock().await;
    success(
        views::day_listing(schedule.classes(), date, state.config.utc_offset),
        revision_id,
    )
}

/// GET /api/upcoming - The capped dashboard preview.
pub async fn upcoming_preview(State(state): State<AppState>) -> ApiResult<UpcomingList> {
    let schedule = state.schedule.lock().await;
    let list = views::upcoming_preview(schedule.classes(), state.clock.now(), state.config.utc_offset);
    drop(schedule);
    success(list, revision(&state).await)
}

/// GET /api/upcoming/all - Every upcoming class.
pub async fn all_upcoming(State(state): State<AppState>) -> ApiResult<UpcomingList> {
    let schedule = state.schedule.lock().await;
    let list = views::all_upcoming(schedule.classes(), state.clock.now(), state.config.utc_offset);
    drop(schedule);
    success(list, revision(&state).await)
}
