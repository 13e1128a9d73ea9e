//! Team services - leaderboard, creation, details and admin edits

use crate::core::{AppError, AppJson, AppPath, AppQuery, AppState, require_admin};
use crate::dtos::{
    CreateTeamDTO, PageQuery, SentTeamRequestDTO, TeamDTO, TeamDetailsDTO, TeamListItemDTO,
    TeamPageDTO, TeamRequestDTO, UpdateTeamDTO, UserDTO,
};
use crate::entities::User;
use crate::repositories::{Delete, Read, ReadMany};
use axum::{
    Extension,
    Json,
    extract::State,
    http::StatusCode,
};
use futures::future::try_join;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};
use validator::Validate;

/// Team with its members and the pending requests its members sent
pub(crate) async fn load_team_details(
    state: &AppState,
    team_id: i32,
) -> Result<Option<TeamDetailsDTO>, AppError> {
    let Some(team) = state.team.read(&team_id).await? else {
        return Ok(None);
    };

    let (members, requests) = try_join(
        state.user.find_many_by_team_id(&team_id),
        state.request.find_pending_for_team(&team_id),
    )
    .await?;

    let requestee_ids: Vec<i32> = requests.iter().map(|r| r.requestee_id).collect();
    let requestees: HashMap<i32, User> = state
        .user
        .read_many(&requestee_ids)
        .await?
        .into_iter()
        .map(|u| (u.user_id, u))
        .collect();

    let team_requests = requests
        .into_iter()
        .map(|request| SentTeamRequestDTO {
            requestee: requestees
                .get(&request.requestee_id)
                .cloned()
                .map(UserDTO::from),
            request: TeamRequestDTO::from(request),
        })
        .collect();

    Ok(Some(TeamDetailsDTO {
        team: TeamDTO::from(team),
        users: members.into_iter().map(UserDTO::from).collect(),
        team_requests,
    }))
}

#[instrument(skip(state))]
pub async fn list_teams(
    State(state): State<Arc<AppState>>,
    AppQuery(params): AppQuery<PageQuery>, // /api/teams?skip=0&take=10
) -> Result<Json<TeamPageDTO>, AppError> {
    let page = params.page();
    debug!("Listing teams, skip {} take {}", page.skip, page.take);

    let (teams, count) = try_join(state.team.find_page(page), state.team.count()).await?;

    let teams = teams
        .into_iter()
        .map(|row| TeamListItemDTO {
            team: TeamDTO::from(row.team),
            member_count: row.member_count,
        })
        .collect();

    Ok(Json(TeamPageDTO { teams, count }))
}

/// The caller founds a new team and becomes its first member
#[instrument(skip(state, current_user, body), fields(user_id = %current_user.user_id))]
pub async fn create_team(
    State(state): State<Arc<AppState>>,
    Extension(current_user): Extension<User>,
    AppJson(body): AppJson<CreateTeamDTO>,
) -> Result<(StatusCode, Json<TeamDTO>), AppError> {
    body.validate()?;

    if current_user.team_id.is_some() {
        warn!("User already belongs to a team");
        return Err(AppError::conflict("User is already in a team"));
    }

    let team = state
        .membership
        .create_team(&current_user.user_id, body.name.trim())
        .await??;

    info!("Team {} created", team.team_id);
    Ok((StatusCode::CREATED, Json(TeamDTO::from(team))))
}

#[instrument(skip(state), fields(team_id = %team_id))]
pub async fn get_team(
    State(state): State<Arc<AppState>>,
    AppPath(team_id): AppPath<i32>,
) -> Result<Json<TeamDetailsDTO>, AppError> {
    load_team_details(&state, team_id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::not_found("Team not found"))
}

/// Admin rename or (un)verification of a team
#[instrument(skip(state, current_user, body), fields(team_id = %team_id))]
pub async fn update_team(
    State(state): State<Arc<AppState>>,
    AppPath(team_id): AppPath<i32>,
    Extension(current_user): Extension<User>,
    AppJson(body): AppJson<UpdateTeamDTO>,
) -> Result<Json<TeamDTO>, AppError> {
    require_admin(&current_user)?;
    body.validate()?;

    let body = UpdateTeamDTO {
        name: body.name.map(|n| n.trim().to_string()),
        ..body
    };

    let team = state.membership.update_team(&team_id, &body).await??;

    info!("Team {} updated (verified: {})", team.team_id, team.verified);
    Ok(Json(TeamDTO::from(team)))
}

#[instrument(skip(state, current_user), fields(team_id = %team_id))]
pub async fn delete_team(
    State(state): State<Arc<AppState>>,
    AppPath(team_id): AppPath<i32>,
    Extension(current_user): Extension<User>,
) -> Result<StatusCode, AppError> {
    require_admin(&current_user)?;

    if !state.team.delete(&team_id).await? {
        warn!("Team not found");
        return Err(AppError::not_found("Team not found"));
    }

    info!("Team deleted");
    Ok(StatusCode::NO_CONTENT)
}
