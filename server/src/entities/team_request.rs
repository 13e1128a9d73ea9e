//! TeamRequest entity - a pending or settled invitation into a team

use super::enums::RequestState;
use chrono::{DateTime, Utc};
use serde::Serialize;

#[derive(Serialize, Debug, Clone, sqlx::FromRow)]
pub struct TeamRequest {
    pub request_id: i32,
    pub team_id: i32,
    pub requestee_id: i32, // invited user
    pub requester_id: i32, // team member who sent it
    #[sqlx(try_from = "String")]
    pub state: RequestState,
    pub created_at: DateTime<Utc>,
}
