//! Chat endpoints.

use axum::{extract::State, Json};

use super::{revision, success, ApiResult};
use crate::chat::ChatView;
use crate::models::{SendMessageRequest, ShareFileRequest};
use crate::AppState;

/// GET /api/chat
pub async fn get_chat(State(state): State<AppState>) -> ApiResult<ChatView> {
    let view = state.chat.lock().await.view();
    success(view, revision(&state).await)
}

/// POST /api/chat - Post a message; the simulated reply lands after the
/// configured delay.
pub async fn send_message(
    State(state): State<AppState>,
    Json(request): Json<SendMessageRequest>,
) -> ApiResult<ChatView> {
    let (pending, view) = {
        let mut chat = state.chat.lock().await;
        let pending = chat.send(&request.text, state.clock.now());
        (pending, chat.view())
    };

    if let Some(pending) = pending {
        let chat = state.chat.clone();
        let clock = state.clock.clone();
        tokio::spawn(async move {
            tokio::time::sleep(pending.due_in).await;
            chat.lock().await.deliver_reply(clock.now());
        });
    }

    success(view, revision(&state).await)
}

/// POST /api/chat/files - Announce a shared file.
pub async fn share_file(
    State(state): State<AppState>,
    Json(request): Json<ShareFileRequest>,
) -> ApiResult<ChatView> {
    let view = {
        let mut chat = state.chat.lock().await;
        if chat.announce_file(&request.file_name, state.clock.now()) {
            tracing::info!("File shared: {}", request.file_name.trim());
        }
        chat.view()
    };
    success(view, revision(&state).await)
}
