//! Activity services - everyone reads, admins edit

use crate::core::{AppError, AppJson, AppPath, AppState, require_admin};
use crate::dtos::{ActivityDTO, CreateActivityDTO, UpdateActivityDTO};
use crate::entities::User;
use crate::repositories::{Create, Delete, Read, Update};
use axum::{
    Extension,
    Json,
    extract::State,
    http::StatusCode,
};
use std::sync::Arc;
use tracing::{info, instrument, warn};
use validator::Validate;

#[instrument(skip(state))]
pub async fn list_activities(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<ActivityDTO>>, AppError> {
    let activities = state.activity.find_all().await?;
    Ok(Json(activities.into_iter().map(ActivityDTO::from).collect()))
}

#[instrument(skip(state), fields(activity_id = %activity_id))]
pub async fn get_activity(
    State(state): State<Arc<AppState>>,
    AppPath(activity_id): AppPath<i32>,
) -> Result<Json<ActivityDTO>, AppError> {
    state
        .activity
        .read(&activity_id)
        .await?
        .map(|a| Json(ActivityDTO::from(a)))
        .ok_or_else(|| AppError::not_found("Activity not found"))
}

#[instrument(skip(state, current_user, body))]
pub async fn create_activity(
    State(state): State<Arc<AppState>>,
    Extension(current_user): Extension<User>,
    AppJson(body): AppJson<CreateActivityDTO>,
) -> Result<(StatusCode, Json<ActivityDTO>), AppError> {
    require_admin(&current_user)?;
    body.validate()?;

    let activity = state.activity.create(&body).await?;
    info!("Activity {} created", activity.activity_id);

    Ok((StatusCode::CREATED, Json(ActivityDTO::from(activity))))
}

#[instrument(skip(state, current_user, body), fields(activity_id = %activity_id))]
pub async fn update_activity(
    State(state): State<Arc<AppState>>,
    AppPath(activity_id): AppPath<i32>,
    Extension(current_user): Extension<User>,
    AppJson(body): AppJson<UpdateActivityDTO>,
) -> Result<Json<ActivityDTO>, AppError> {
    require_admin(&current_user)?;
    body.validate()?;

    // RowNotFound becomes 404
    let activity = state.activity.update(&activity_id, &body).await?;
    info!("Activity updated");

    Ok(Json(ActivityDTO::from(activity)))
}

#[instrument(skip(state, current_user), fields(activity_id = %activity_id))]
pub async fn delete_activity(
    State(state): State<Arc<AppState>>,
    AppPath(activity_id): AppPath<i32>,
    Extension(current_user): Extension<User>,
) -> Result<StatusCode, AppError> {
    require_admin(&current_user)?;

    if !state.activity.delete(&activity_id).await? {
        warn!("Activity not found");
        return Err(AppError::not_found("Activity not found"));
    }

    info!("Activity deleted");
    Ok(StatusCode::NO_CONTENT)
}
