//! User DTOs

use super::team::TeamSummaryDTO;
use crate::entities::{Role, User};
use serde::{Deserialize, Deserializer, Serialize};
use validator::Validate;

/// Public view of a user; the password hash is never part of it
#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct UserDTO {
    pub id: i32,
    pub name: Option<String>,
    pub email: String,
    pub points: i32,
    pub team_id: Option<i32>,
    pub role: Role,
}

impl From<User> for UserDTO {
    fn from(value: User) -> Self {
        Self {
            id: value.user_id,
            name: value.name,
            email: value.email,
            points: value.points,
            team_id: value.team_id,
            role: value.role,
        }
    }
}

/// Row of the participants table: the user plus the team it belongs to
#[derive(Serialize, Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct UserWithTeamDTO {
    #[serde(flatten)]
    pub user: UserDTO,
    pub team: Option<TeamSummaryDTO>,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct UserPageDTO {
    pub users: Vec<UserWithTeamDTO>,
    pub count: i64,
}

/// Registration payload; the service replaces `password` with its hash before storing
#[derive(Serialize, Deserialize, Debug, Clone, Validate)]
pub struct CreateUserDTO {
    #[validate(length(min = 1, max = 100, message = "Name must be between 1 and 100 characters"))]
    pub name: Option<String>,
    #[validate(email(message = "Email address is not valid"))]
    pub email: String,
    #[validate(length(min = 8, max = 128, message = "Password must be between 8 and 128 characters"))]
    pub password: String,
}

/// Admin edit of a participant. `teamId: null` removes the user from its team,
/// a missing `teamId` leaves membership untouched.
#[derive(Serialize, Deserialize, Debug, Clone, Default, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUserDTO {
    #[validate(length(min = 1, max = 100, message = "Name must be between 1 and 100 characters"))]
    pub name: Option<String>,
    #[validate(range(min = 0, max = 1_000_000, message = "Points must be between 0 and 1000000"))]
    pub points: Option<i32>,
    #[serde(default, deserialize_with = "present")]
    pub team_id: Option<Option<i32>>,
}

impl UpdateUserDTO {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.points.is_none() && self.team_id.is_none()
    }
}

fn present<'de, T, D>(deserializer: D) -> Result<Option<T>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    T::deserialize(deserializer).map(Some)
}

#[derive(Serialize, Deserialize, Debug)]
pub struct UserUpdatedDTO {
    pub message: String,
    pub user: UserDTO,
}
