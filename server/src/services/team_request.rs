//! Team request services - inviting users into a team and answering invitations

use crate::core::{AppError, AppJson, AppPath, AppState};
use crate::dtos::{
    CreateTeamRequestDTO, InviteMemberDTO, PendingTeamRequestDTO, TeamRequestDTO,
    TeamSummaryDTO, UserDTO,
};
use crate::entities::{RequestState, Team, TeamRequest, User};
use crate::repositories::{Create, Delete, MembershipConflict, Read, ReadMany};
use axum::{
    Extension,
    Json,
    extract::State,
    http::StatusCode,
};
use futures::future::try_join;
use serde::Deserialize;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};
use validator::Validate;

/// Second path segment of `POST /requests/{request_id}/{action}`
#[derive(Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum RequestAction {
    Accept,
    Reject,
}

#[instrument(skip(state, current_user, body), fields(team_id = %team_id, requester = %current_user.user_id))]
pub async fn invite_to_team(
    State(state): State<Arc<AppState>>,
    AppPath(team_id): AppPath<i32>,
    Extension(current_user): Extension<User>,
    AppJson(body): AppJson<InviteMemberDTO>,
) -> Result<(StatusCode, Json<TeamRequestDTO>), AppError> {
    body.validate()?;

    if current_user.team_id != Some(team_id) {
        warn!("User is not a member of team {}", team_id);
        return Err(AppError::forbidden("You are not a member of this team"));
    }

    let email = body.email.trim().to_lowercase();
    let requestee = state.user.find_by_email(&email).await?.ok_or_else(|| {
        warn!("Invited user not found");
        AppError::not_found("User not found")
    })?;

    if requestee.user_id == current_user.user_id {
        return Err(AppError::bad_request("You cannot invite yourself"));
    }

    if requestee.team_id.is_some() {
        warn!("User {} already has a team", requestee.user_id);
        return Err(AppError::conflict("User is already in a team"));
    }

    if state.request.has_pending(&team_id, &requestee.user_id).await? {
        warn!(
            "Pending request already exists for user {} to team {}",
            requestee.user_id, team_id
        );
        return Err(AppError::conflict(
            "There is already a pending request for this user to this team",
        ));
    }

    if !Team::has_room(state.team.member_count(&team_id).await?) {
        return Err(MembershipConflict::TeamFull.into());
    }

    let request = state
        .request
        .create(&CreateTeamRequestDTO {
            team_id,
            requestee_id: requestee.user_id,
            requester_id: current_user.user_id,
        })
        .await?;

    info!("Team request {} created", request.request_id);
    Ok((StatusCode::CREATED, Json(TeamRequestDTO::from(request))))
}

/// Pending requests addressed to the caller, with team and sender
#[instrument(skip(state, current_user), fields(user_id = %current_user.user_id))]
pub async fn list_pending_requests(
    State(state): State<Arc<AppState>>,
    Extension(current_user): Extension<User>,
) -> Result<Json<Vec<PendingTeamRequestDTO>>, AppError> {
    let requests = state
        .request
        .find_pending_for_user(&current_user.user_id)
        .await?;
    debug!("Found {} pending requests", requests.len());

    let team_ids: Vec<i32> = requests.iter().map(|r| r.team_id).collect();
    let requester_ids: Vec<i32> = requests.iter().map(|r| r.requester_id).collect();

    let (teams, requesters) = try_join(
        state.team.read_many(&team_ids),
        state.user.read_many(&requester_ids),
    )
    .await?;

    let teams: HashMap<i32, Team> = teams.into_iter().map(|t| (t.team_id, t)).collect();
    let requesters: HashMap<i32, User> =
        requesters.into_iter().map(|u| (u.user_id, u)).collect();

    let enriched = requests
        .into_iter()
        .map(|request| PendingTeamRequestDTO {
            team: teams.get(&request.team_id).cloned().map(TeamSummaryDTO::from),
            requester: requesters
                .get(&request.requester_id)
                .cloned()
                .map(UserDTO::from),
            request: TeamRequestDTO::from(request),
        })
        .collect();

    Ok(Json(enriched))
}

#[instrument(skip(state, current_user), fields(request_id = %request_id, user_id = %current_user.user_id))]
pub async fn respond_to_request(
    State(state): State<Arc<AppState>>,
    AppPath((request_id, action)): AppPath<(i32, RequestAction)>,
    Extension(current_user): Extension<User>,
) -> Result<Json<TeamRequestDTO>, AppError> {
    let request = state.request.read(&request_id).await?.ok_or_else(|| {
        warn!("Team request not found");
        AppError::not_found("Team request not found")
    })?;

    if request.requestee_id != current_user.user_id {
        warn!("User is not the requestee of request {}", request_id);
        return Err(AppError::forbidden("This request is not addressed to you"));
    }

    let settled = match action {
        RequestAction::Accept => state.membership.accept_request(&request_id).await??,
        RequestAction::Reject => {
            if !state
                .request
                .settle(&request_id, RequestState::Rejected)
                .await?
            {
                return Err(MembershipConflict::NotPending.into());
            }
            info!("Team request rejected");
            TeamRequest {
                state: RequestState::Rejected,
                ..request
            }
        }
    };

    Ok(Json(TeamRequestDTO::from(settled)))
}

/// A member of the sending team withdraws a pending request
#[instrument(skip(state, current_user), fields(request_id = %request_id, user_id = %current_user.user_id))]
pub async fn cancel_team_request(
    State(state): State<Arc<AppState>>,
    AppPath(request_id): AppPath<i32>,
    Extension(current_user): Extension<User>,
) -> Result<StatusCode, AppError> {
    let request = state.request.read(&request_id).await?.ok_or_else(|| {
        warn!("Team request not found");
        AppError::not_found("Team request not found")
    })?;

    if current_user.team_id != Some(request.team_id) {
        warn!("User is not a member of team {}", request.team_id);
        return Err(AppError::forbidden("You are not a member of this team"));
    }

    if request.state != RequestState::Pending {
        return Err(MembershipConflict::NotPending.into());
    }

    state.request.delete(&request_id).await?;
    info!("Team request cancelled");
    Ok(StatusCode::NO_CONTENT)
}
