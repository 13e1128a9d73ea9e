//! Team entity and membership rules

use chrono::{DateTime, Utc};
use serde::Serialize;

#[derive(Serialize, Debug, Clone, sqlx::FromRow)]
pub struct Team {
    pub team_id: i32,
    pub name: String,
    /// Sum of the members' points, kept in sync on every membership or points change.
    pub points: i32,
    pub verified: bool,
    pub created_at: DateTime<Utc>,
}

impl Team {
    pub const MIN_MEMBERS: i64 = 2;
    pub const MAX_MEMBERS: i64 = 4;

    /// Whether a team with `member_count` members can take one more.
    pub fn has_room(member_count: i64) -> bool {
        member_count < Self::MAX_MEMBERS
    }

    /// Verification is only allowed for complete teams.
    pub fn can_be_verified(member_count: i64) -> bool {
        (Self::MIN_MEMBERS..=Self::MAX_MEMBERS).contains(&member_count)
    }
}
