//! Conference endpoints: local controls, roster and invitations.
//!
//! Capture requests run with the session unlocked; see
//! [`crate::conference`] for the two-step toggle protocol.

use axum::{
    extract::{Path, State},
    Json,
};

use super::{respond, revision, success, ApiResult};
use crate::conference::{
    ConferenceView, Invitation, JoinOutcome, Participant, ParticipantView, ScreenStep, ToggleStep,
    TrackKind,
};
use crate::errors::AppError;
use crate::models::{AddParticipantRequest, JoinClassroomRequest};
use crate::AppState;

/// GET /api/conference - Controls, video grid and roster.
pub async fn get_conference(State(state): State<AppState>) -> ApiResult<ConferenceView> {
    let view = state.conference.lock().await.view();
    success(view, revision(&state).await)
}

async fn toggle_local(state: &AppState, kind: TrackKind) -> Result<ConferenceView, AppError> {
    let step = state.conference.lock().await.begin_local_toggle(kind);

    if let ToggleStep::Acquire(constraints) = step {
        let result = state.devices.get_user_media(constraints).await;
        state
            .conference
            .lock()
            .await
            .complete_local_toggle(kind, result)?;
    }

    Ok(state.conference.lock().await.view())
}

/// POST /api/conference/mic
pub async fn toggle_mic(State(state): State<AppState>) -> ApiResult<ConferenceView> {
    let result = toggle_local(&state, TrackKind::Audio).await;
    respond(&state, result).await
}

/// POST /api/conference/camera
pub async fn toggle_camera(State(state): State<AppState>) -> ApiResult<ConferenceView> {
    let result = toggle_local(&state, TrackKind::Video).await;
    respond(&state, result).await
}

/// POST /api/conference/screen-share - Start or stop sharing.
pub async fn toggle_screen_share(State(state): State<AppState>) -> ApiResult<ConferenceView> {
    let result = async {
        let step = state.conference.lock().await.begin_screen_share();
        if step == ScreenStep::Acquire {
            let capture = state.devices.get_display_media().await;
            state
                .conference
                .lock()
                .await
                .complete_screen_share(capture)?;
        }
        Ok::<_, AppError>(state.conference.lock().await.view())
    }
    .await;

    respond(&state, result).await
}

/// POST /api/conference/screen-share/ended - Capture stopped outside the app.
pub async fn screen_share_ended(State(state): State<AppState>) -> ApiResult<ConferenceView> {
    let view = {
        let mut session = state.conference.lock().await;
        if session.screen_share_ended() {
            tracing::info!("Screen share ended");
        }
        session.view()
    };
    success(view, revision(&state).await)
}

/// POST /api/conference/leave
pub async fn leave_call(State(state): State<AppState>) -> ApiResult<ConferenceView> {
    let view = {
        let mut session = state.conference.lock().await;
        let mut chat = state.chat.lock().await;
        session.leave_call(&mut chat, state.clock.now());
        session.view()
    };
    success(view, revision(&state).await)
}

/// GET /api/conference/invite - Invite link and share targets.
pub async fn get_invite(State(state): State<AppState>) -> ApiResult<Invitation> {
    let invitation = state
        .conference
        .lock()
        .await
        .invitation(&state.config.public_base_url);
    success(invitation, revision(&state).await)
}

/// POST /api/conference/join - The join dialog.
pub async fn join_classroom(
    State(state): State<AppState>,
    Json(request): Json<JoinClassroomRequest>,
) -> ApiResult<JoinOutcome> {
    let result = {
        let mut session = state.conference.lock().await;
        let mut chat = state.chat.lock().await;
        session.join_classroom(&request.link, &request.name, &mut chat, state.clock.now())
    };
    respond(&state, result).await
}

/// POST /api/conference/participants - Add a participant by name.
pub async fn add_participant(
    State(state): State<AppState>,
    Json(request): Json<AddParticipantRequest>,
) -> ApiResult<ParticipantView> {
    let result = {
        let mut session = state.conference.lock().await;
        let mut chat = state.chat.lock().await;
        session.join(&request.name, &mut chat, state.clock.now())
    };
    respond(&state, result).await
}

/// DELETE /api/conference/participants/{id}
pub async fn remove_participant(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<ConferenceView> {
    let result = {
        let mut session = state.conference.lock().await;
        let mut chat = state.chat.lock().await;
        session
            .leave(&id, &mut chat, state.clock.now())
            .map(|()| session.view())
    };
    respond(&state, result).await
}

async fn participant_view(state: &AppState, id: &str) -> Result<ParticipantView, AppError> {
    state
        .conference
        .lock()
        .await
        .participant(id)
        .map(Participant::view)
        .ok_or_else(|| AppError::NotFound(format!("Participant {} not found", id)))
}

async fn toggle_participant(
    state: &AppState,
    id: &str,
    kind: TrackKind,
) -> Result<ParticipantView, AppError> {
    let step = state
        .conference
        .lock()
        .await
        .begin_participant_toggle(id, kind)?;

    if let ToggleStep::Acquire(constraints) = step {
        let result = state.devices.get_user_media(constraints).await;
        state
            .conference
            .lock()
            .await
            .complete_participant_toggle(id, kind, result)?;
    }

    participant_view(state, id).await
}

/// POST /api/conference/participants/{id}/mic
pub async fn toggle_participant_mic(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<ParticipantView> {
    let result = toggle_participant(&state, &id, TrackKind::Audio).await;
    respond(&state, result).await
}

/// POST /api/conference/participants/{id}/camera
pub async fn toggle_participant_camera(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<ParticipantView> {
    let result = toggle_participant(&state, &id, TrackKind::Video).await;
    respond(&state, result).await
}

/// POST /api/conference/participants/{id}/screen-share
pub async fn participant_screen_share(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<ParticipantView> {
    let result = async {
        let step = state
            .conference
            .lock()
            .await
            .begin_participant_screen_share(&id)?;
        if step == ScreenStep::Acquire {
            let capture = state.devices.get_display_media().await;
            state
                .conference
                .lock()
                .await
                .complete_participant_screen_share(&id, capture)?;
        }
        participant_view(&state, &id).await
    }
    .await;

    respond(&state, result).await
}

/// POST /api/conference/participants/{id}/screen-share/ended
pub async fn participant_screen_share_ended(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<ParticipantView> {
    let result = async {
        state
            .conference
            .lock()
            .await
            .participant_screen_share_ended(&id)?;
        participant_view(&state, &id).await
    }
    .await;

    respond(&state, result).await
}
