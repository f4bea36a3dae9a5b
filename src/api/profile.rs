//! Profile endpoints backing the dashboard greeting.

use axum::{extract::State, Json};

use super::{respond, ApiResult};
use crate::db::{KeyValueStore, USERNAME_KEY, USER_EMAIL_KEY};
use crate::errors::AppError;
use crate::models::{Greeting, UpdateProfileRequest};
use crate::views;
use crate::AppState;

async fn current_greeting(state: &AppState) -> Result<Greeting, AppError> {
    let email = state.kv.get_item(USER_EMAIL_KEY).await?;
    let username = state.kv.get_item(USERNAME_KEY).await?;

    Ok(views::greeting(
        email.as_deref(),
        username.as_deref(),
        state.clock.now(),
        state.config.utc_offset,
    ))
}

/// GET /api/profile - Greeting for the dashboard header.
pub async fn get_profile(State(state): State<AppState>) -> ApiResult<Greeting> {
    let result = current_greeting(&state).await;
    respond(&state, result).await
}

/// Store or clear one profile key. Blank values remove the key.
async fn store_key(kv: &dyn KeyValueStore, key: &str, value: Option<&str>) -> Result<(), AppError> {
    match value.map(str::trim) {
        None => Ok(()),
        Some("") => kv.remove_item(key).await,
        Some(v) => kv.set_item(key, v).await,
    }
}

/// Write both profile keys. If the name cannot be stored the e-mail address
/// is put back, so a failed update leaves the profile as it was.
async fn apply_profile(
    kv: &dyn KeyValueStore,
    request: &UpdateProfileRequest,
) -> Result<(), AppError> {
    let previous_email = kv.get_item(USER_EMAIL_KEY).await?;
    store_key(kv, USER_EMAIL_KEY, request.user_email.as_deref()).await?;

    if let Err(e) = store_key(kv, USERNAME_KEY, request.username.as_deref()).await {
        if request.user_email.is_some() {
            let restored = match previous_email.as_deref() {
                Some(email) => kv.set_item(USER_EMAIL_KEY, email).await,
                None => kv.remove_item(USER_EMAIL_KEY).await,
            };
            if let Err(restore_err) = restored {
                tracing::warn!("Failed to restore e-mail after profile error: {}", restore_err);
            }
        }
        return Err(e);
    }
    Ok(())
}

/// PUT /api/profile - Store the user's e-mail address and/or display name.
pub async fn update_profile(
    State(state): State<AppState>,
    Json(request): Json<UpdateProfileRequest>,
) -> ApiResult<Greeting> {
    let result = async {
        apply_profile(state.kv.as_ref(), &request).await?;
        tracing::info!("Profile updated");
        current_greeting(&state).await
    }
    .await;

    respond(&state, result).await
}
