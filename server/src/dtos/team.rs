//! Team DTOs

use super::team_request::SentTeamRequestDTO;
use super::user::UserDTO;
use crate::entities::Team;
use chrono::{DateTime, Utc};
use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use validator::Validate;

lazy_static! {
    // letters, digits, spaces, dash and underscore; must start with a letter or digit
    static ref TEAM_NAME: Regex = Regex::new(r"^[\p{L}\p{N}][\p{L}\p{N} _-]*$").unwrap();
}

#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct TeamDTO {
    pub id: i32,
    pub name: String,
    pub points: i32,
    pub verified: bool,
    pub created_at: DateTime<Utc>,
}

impl From<Team> for TeamDTO {
    fn from(value: Team) -> Self {
        Self {
            id: value.team_id,
            name: value.name,
            points: value.points,
            verified: value.verified,
            created_at: value.created_at,
        }
    }
}

/// Just enough of a team to link to it
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct TeamSummaryDTO {
    pub id: i32,
    pub name: String,
}

impl From<Team> for TeamSummaryDTO {
    fn from(value: Team) -> Self {
        Self {
            id: value.team_id,
            name: value.name,
        }
    }
}

#[derive(Serialize, Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct TeamListItemDTO {
    #[serde(flatten)]
    pub team: TeamDTO,
    pub member_count: i64,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct TeamPageDTO {
    pub teams: Vec<TeamListItemDTO>,
    pub count: i64,
}

/// Full team view: members and the requests its members have sent
#[derive(Serialize, Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct TeamDetailsDTO {
    #[serde(flatten)]
    pub team: TeamDTO,
    pub users: Vec<UserDTO>,
    pub team_requests: Vec<SentTeamRequestDTO>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Validate)]
pub struct CreateTeamDTO {
    #[validate(
        length(min = 3, max = 64, message = "Team name must be between 3 and 64 characters"),
        regex(path = *TEAM_NAME, message = "Team name contains invalid characters")
    )]
    pub name: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, Validate)]
pub struct UpdateTeamDTO {
    #[validate(
        length(min = 3, max = 64, message = "Team name must be between 3 and 64 characters"),
        regex(path = *TEAM_NAME, message = "Team name contains invalid characters")
    )]
    pub name: Option<String>,
    pub verified: Option<bool>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create(name: &str) -> CreateTeamDTO {
        CreateTeamDTO {
            name: name.to_string(),
        }
    }

    #[test]
    fn accepts_ordinary_names() {
        assert!(create("Night Owls").validate().is_ok());
        assert!(create("team_42-b").validate().is_ok());
    }

    #[test]
    fn rejects_short_or_odd_names() {
        assert!(create("ab").validate().is_err());
        assert!(create(" leading space").validate().is_err());
        assert!(create("drop;table").validate().is_err());
    }

    #[test]
    fn update_without_name_is_valid() {
        let dto = UpdateTeamDTO {
            name: None,
            verified: Some(true),
        };
        assert!(dto.validate().is_ok());
    }
}
