//! Whiteboard endpoints. Each input event answers with the canvas render.

use axum::{extract::State, Json};

use super::{error, revision, success, ApiResult};
use crate::models::{BrushRequest, PointerInput, ResizeRequest, TouchInput};
use crate::whiteboard::{CanvasRender, Whiteboard};
use crate::AppState;

/// Apply `op` to the board and render it.
async fn apply(state: &AppState, op: impl FnOnce(&mut Whiteboard)) -> ApiResult<CanvasRender> {
    let render = {
        let mut board = state.whiteboard.lock().await;
        op(&mut board);
        board.render()
    };
    success(render, revision(state).await)
}

/// GET /api/whiteboard
pub async fn get_whiteboard(State(state): State<AppState>) -> ApiResult<CanvasRender> {
    apply(&state, |_| {}).await
}

/// POST /api/whiteboard/pointer/down
pub async fn pointer_down(
    State(state): State<AppState>,
    Json(input): Json<PointerInput>,
) -> ApiResult<CanvasRender> {
    apply(&state, |board| board.pointer_down(input)).await
}

/// POST /api/whiteboard/pointer/move
pub async fn pointer_move(
    State(state): State<AppState>,
    Json(input): Json<PointerInput>,
) -> ApiResult<CanvasRender> {
    apply(&state, |board| board.pointer_move(input)).await
}

/// POST /api/whiteboard/pointer/up
pub async fn pointer_up(State(state): State<AppState>) -> ApiResult<CanvasRender> {
    apply(&state, |board| {
        board.pointer_up();
    })
    .await
}

/// POST /api/whiteboard/touch/start
pub async fn touch_start(
    State(state): State<AppState>,
    Json(touch): Json<TouchInput>,
) -> ApiResult<CanvasRender> {
    apply(&state, |board| board.touch_start(&touch)).await
}

/// POST /api/whiteboard/touch/move
pub async fn touch_move(
    State(state): State<AppState>,
    Json(touch): Json<TouchInput>,
) -> ApiResult<CanvasRender> {
    apply(&state, |board| board.touch_move(&touch)).await
}

/// POST /api/whiteboard/touch/end
pub async fn touch_end(State(state): State<AppState>) -> ApiResult<CanvasRender> {
    apply(&state, |board| {
        board.touch_end();
    })
    .await
}

/// POST /api/whiteboard/undo
pub async fn undo(State(state): State<AppState>) -> ApiResult<CanvasRender> {
    apply(&state, |board| {
        board.undo();
    })
    .await
}

/// POST /api/whiteboard/redo
pub async fn redo(State(state): State<AppState>) -> ApiResult<CanvasRender> {
    apply(&state, |board| {
        board.redo();
    })
    .await
}

/// POST /api/whiteboard/clear
pub async fn clear(State(state): State<AppState>) -> ApiResult<CanvasRender> {
    apply(&state, Whiteboard::clear).await
}

/// POST /api/whiteboard/resize - Container geometry changed.
pub async fn resize(
    State(state): State<AppState>,
    Json(request): Json<ResizeRequest>,
) -> ApiResult<CanvasRender> {
    apply(&state, |board| board.resize(&request)).await
}

/// POST /api/whiteboard/eraser - Toggle the eraser.
pub async fn toggle_eraser(State(state): State<AppState>) -> ApiResult<CanvasRender> {
    apply(&state, |board| {
        let on = board.toggle_eraser();
        tracing::debug!("Eraser {}", if on { "on" } else { "off" });
    })
    .await
}

/// PUT /api/whiteboard/brush - Change color and/or size.
pub async fn set_brush(
    State(state): State<AppState>,
    Json(request): Json<BrushRequest>,
) -> ApiResult<CanvasRender> {
    let revision_id = revision(&state).await;

    let mut board = state.whiteboard.lock().await;
    match board.set_brush(&request) {
        Ok(()) => success(board.render(), revision_id),
        Err(e) => error(e, revision_id),
    }
}
