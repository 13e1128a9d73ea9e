//! User services - participants table, profile and own team

use super::team::load_team_details;
use crate::core::{AppError, AppPath, AppQuery, AppState, parse_json_body};
use crate::dtos::{
    PageQuery, TeamDetailsDTO, TeamSummaryDTO, UpdateUserDTO, UserDTO, UserPageDTO,
    UserUpdatedDTO, UserWithTeamDTO,
};
use crate::entities::{Team, User};
use crate::repositories::{Read, ReadMany};
use axum::{
    Extension,
    Json,
    body::Bytes,
    extract::State,
};
use axum_macros::debug_handler;
use futures::future::try_join;
use serde_json::{Value, json};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};
use validator::Validate;

/// Admin listing: one page of users with their team, plus the total count
#[instrument(skip(state))]
pub async fn list_users(
    State(state): State<Arc<AppState>>,
    AppQuery(params): AppQuery<PageQuery>, // /api/users?skip=0&take=10
) -> Result<Json<UserPageDTO>, AppError> {
    let page = params.page();
    debug!("Listing users, skip {} take {}", page.skip, page.take);

    let (users, count) = try_join(state.user.find_page(page), state.user.count()).await?;

    let mut team_ids: Vec<i32> = users.iter().filter_map(|u| u.team_id).collect();
    team_ids.sort_unstable();
    team_ids.dedup();
    let teams: HashMap<i32, Team> = state
        .team
        .read_many(&team_ids)
        .await?
        .into_iter()
        .map(|t| (t.team_id, t))
        .collect();

    let users = users
        .into_iter()
        .map(|user| {
            let team = user
                .team_id
                .and_then(|id| teams.get(&id))
                .cloned()
                .map(TeamSummaryDTO::from);
            UserWithTeamDTO {
                user: UserDTO::from(user),
                team,
            }
        })
        .collect::<Vec<_>>();

    info!("Returning {} of {} users", users.len(), count);
    Ok(Json(UserPageDTO { users, count }))
}

#[instrument(skip(current_user), fields(user_id = %current_user.user_id))]
pub async fn get_me(Extension(current_user): Extension<User>) -> Json<UserDTO> {
    Json(UserDTO::from(current_user))
}

/// The caller's team, or `null` when they are not in one
#[instrument(skip(state, current_user), fields(user_id = %current_user.user_id))]
pub async fn get_my_team(
    State(state): State<Arc<AppState>>,
    Extension(current_user): Extension<User>,
) -> Result<Json<Option<TeamDetailsDTO>>, AppError> {
    let Some(team_id) = current_user.team_id else {
        debug!("User has no team");
        return Ok(Json(None));
    };

    Ok(Json(load_team_details(&state, team_id).await?))
}

#[instrument(skip(state, current_user), fields(user_id = %current_user.user_id))]
pub async fn leave_my_team(
    State(state): State<Arc<AppState>>,
    Extension(current_user): Extension<User>,
) -> Result<Json<Value>, AppError> {
    let team_id = state
        .membership
        .leave_team(&current_user.user_id)
        .await??;

    Ok(Json(json!({ "message": "You left the team", "teamId": team_id })))
}

#[instrument(skip(state), fields(user_id = %user_id))]
pub async fn get_user_by_id(
    State(state): State<Arc<AppState>>,
    AppPath(user_id): AppPath<i32>,
) -> Result<Json<UserWithTeamDTO>, AppError> {
    let user = state.user.read(&user_id).await?.ok_or_else(|| {
        warn!("User not found");
        AppError::not_found("User not found")
    })?;

    let team = match user.team_id {
        Some(team_id) => state.team.read(&team_id).await?.map(TeamSummaryDTO::from),
        None => None,
    };

    Ok(Json(UserWithTeamDTO {
        user: UserDTO::from(user),
        team,
    }))
}

/// Admin edit of a participant's name, points or team.
/// The body is read as JSON whatever its `Content-Type`.
#[debug_handler]
#[instrument(skip(state, body), fields(user_id = %user_id))]
pub async fn update_user(
    State(state): State<Arc<AppState>>,
    AppPath(user_id): AppPath<i32>,
    body: Bytes,
) -> Result<Json<UserUpdatedDTO>, AppError> {
    let body: UpdateUserDTO = parse_json_body(&body)?;
    body.validate()?;
    if body.is_empty() {
        return Err(AppError::bad_request("Nothing to update"));
    }

    let user = state
        .membership
        .update_participant(&user_id, &body)
        .await??;

    info!("User {} updated", user.user_id);
    Ok(Json(UserUpdatedDTO {
        message: "User updated".to_string(),
        user: UserDTO::from(user),
    }))
}
