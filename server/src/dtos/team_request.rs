//! TeamRequest DTOs

use super::team::TeamSummaryDTO;
use super::user::UserDTO;
use crate::entities::{RequestState, TeamRequest};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct TeamRequestDTO {
    pub id: i32,
    pub team_id: i32,
    pub requestee_id: i32,
    pub requester_id: i32,
    pub state: RequestState,
    pub created_at: DateTime<Utc>,
}

impl From<TeamRequest> for TeamRequestDTO {
    fn from(value: TeamRequest) -> Self {
        Self {
            id: value.request_id,
            team_id: value.team_id,
            requestee_id: value.requestee_id,
            requester_id: value.requester_id,
            state: value.state,
            created_at: value.created_at,
        }
    }
}

/// A request as seen by the sending team, with the invited user
#[derive(Serialize, Deserialize, Debug)]
pub struct SentTeamRequestDTO {
    #[serde(flatten)]
    pub request: TeamRequestDTO,
    pub requestee: Option<UserDTO>,
}

/// A request as seen by the invited user, with the team and who sent it
#[derive(Serialize, Deserialize, Debug)]
pub struct PendingTeamRequestDTO {
    #[serde(flatten)]
    pub request: TeamRequestDTO,
    pub team: Option<TeamSummaryDTO>,
    pub requester: Option<UserDTO>,
}

/// Body of `POST /teams/{team_id}/requests`
#[derive(Serialize, Deserialize, Debug, Clone, Validate)]
pub struct InviteMemberDTO {
    #[validate(email(message = "Email address is not valid"))]
    pub email: String,
}

/// Insert payload for a new pending request
#[derive(Debug, Clone)]
pub struct CreateTeamRequestDTO {
    pub team_id: i32,
    pub requestee_id: i32,
    pub requester_id: i32,
}
