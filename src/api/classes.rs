//! Class endpoints: list, schedule, detail and delete.

use axum::{
    extract::{Path, State},
    Json,
};

use super::{error, respond, revision, success, ApiResult};
use crate::db::USERNAME_KEY;
use crate::errors::AppError;
use crate::models::{ClassRecord, ScheduleClassRequest};
use crate::views::{self, ClassDetail, DashboardView};
use crate::AppState;

/// Calendar and preview after a schedule mutation.
async fn render_dashboard(state: &AppState, classes: &[ClassRecord]) -> DashboardView {
    let cursor = *state.cursor.lock().await;
    DashboardView::render(cursor, classes, state.clock.now(), state.config.utc_offset)
}

/// GET /api/classes - All records in store order.
pub async fn list_classes(State(state): State<AppState>) -> ApiResult<Vec<ClassRecord>> {
    let classes = state.schedule.lock().await.classes().to_vec();
    success(classes, revision(&state).await)
}

/// POST /api/classes - Schedule a class from the form.
pub async fn schedule_class(
    State(state): State<AppState>,
    Json(request): Json<ScheduleClassRequest>,
) -> ApiResult<DashboardView> {
    let revision_id = revision(&state).await;

    let username = match state.kv.get_item(USERNAME_KEY).await {
        Ok(username) => username,
        Err(e) => return error(e, revision_id),
    };

    let record = match request.into_record(state.clock.now(), state.config.utc_offset, username) {
        Ok(record) => record,
        Err(e) => return error(e, revision_id),
    };

    let mut schedule = state.schedule.lock().await;
    if let Err(e) = schedule.add(record).await {
        return error(e, revision_id);
    }

    let view = render_dashboard(&state, schedule.classes()).await;
    drop(schedule);
    respond(&state, Ok(view)).await
}

/// GET /api/classes/{id} - Detail modal for one class.
pub async fn get_class(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<ClassDetail> {
    let result = state
        .schedule
        .lock()
        .await
        .get(&id)
        .map(|record| views::class_detail(record, state.clock.now(), state.config.utc_offset))
        .ok_or_else(|| AppError::NotFound(format!("Class {} not found", id)));

    respond(&state, result).await
}

/// DELETE /api/classes/{id} - Delete a class and re-render the dashboard.
pub async fn delete_class(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<DashboardView> {
    let mut schedule = state.schedule.lock().await;

    let result = match schedule.delete(&id).await {
        Ok(true) => Ok(render_dashboard(&state, schedule.classes()).await),
        Ok(false) => Err(AppError::NotFound(format!("Class {} not found", id))),
        Err(e) => Err(e),
    };
    drop(schedule);

    respond(&state, result).await
}
