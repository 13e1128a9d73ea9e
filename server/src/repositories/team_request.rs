//! TeamRequestRepository - team_requests table

use super::{Create, Delete, Read};
use crate::dtos::CreateTeamRequestDTO;
use crate::entities::{RequestState, TeamRequest};
use chrono::Utc;
use sqlx::{Error, MySqlPool};

pub struct TeamRequestRepository {
    connection_pool: MySqlPool,
}

impl TeamRequestRepository {
    pub fn new(connection_pool: MySqlPool) -> Self {
        Self { connection_pool }
    }

    /// Pending requests addressed to a user, newest first
    pub async fn find_pending_for_user(&self, user_id: &i32) -> Result<Vec<TeamRequest>, Error> {
        sqlx::query_as::<_, TeamRequest>(
            r#"
            SELECT request_id, team_id, requestee_id, requester_id, state, created_at
            FROM team_requests
            WHERE requestee_id = ? AND state = 'PENDING'
            ORDER BY created_at DESC, request_id DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.connection_pool)
        .await
    }

    /// Pending requests sent by the members of a team
    pub async fn find_pending_for_team(&self, team_id: &i32) -> Result<Vec<TeamRequest>, Error> {
        sqlx::query_as::<_, TeamRequest>(
            r#"
            SELECT request_id, team_id, requestee_id, requester_id, state, created_at
            FROM team_requests
            WHERE team_id = ? AND state = 'PENDING'
            ORDER BY created_at, request_id
            "#,
        )
        .bind(team_id)
        .fetch_all(&self.connection_pool)
        .await
    }

    /// Check if there's already a pending request for user into team
    pub async fn has_pending(&self, team_id: &i32, user_id: &i32) -> Result<bool, Error> {
        let (count,): (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM team_requests WHERE team_id = ? AND requestee_id = ? AND state = 'PENDING'",
        )
        .bind(team_id)
        .bind(user_id)
        .fetch_one(&self.connection_pool)
        .await?;

        Ok(count > 0)
    }

    /// Moves a pending request to `new_state`. Returns false when the request
    /// was not pending anymore.
    pub async fn settle(&self, request_id: &i32, new_state: RequestState) -> Result<bool, Error> {
        let result = sqlx::query(
            "UPDATE team_requests SET state = ? WHERE request_id = ? AND state = 'PENDING'",
        )
        .bind(new_state.as_str())
        .bind(request_id)
        .execute(&self.connection_pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }
}

impl Create<TeamRequest, CreateTeamRequestDTO> for TeamRequestRepository {
    async fn create(&self, data: &CreateTeamRequestDTO) -> Result<TeamRequest, Error> {
        let now = Utc::now();
        let state = RequestState::Pending;

        let result = sqlx::query(
            r#"
            INSERT INTO team_requests (team_id, requestee_id, requester_id, state, created_at)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(data.team_id)
        .bind(data.requestee_id)
        .bind(data.requester_id)
        .bind(state.as_str())
        .bind(now)
        .execute(&self.connection_pool)
        .await?;

        Ok(TeamRequest {
            request_id: result.last_insert_id() as i32,
            team_id: data.team_id,
            requestee_id: data.requestee_id,
            requester_id: data.requester_id,
            state,
            created_at: now,
        })
    }
}

impl Read<TeamRequest, i32> for TeamRequestRepository {
    async fn read(&self, id: &i32) -> Result<Option<TeamRequest>, Error> {
        sqlx::query_as::<_, TeamRequest>(
            r#"
            SELECT request_id, team_id, requestee_id, requester_id, state, created_at
            FROM team_requests
            WHERE request_id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(&self.connection_pool)
        .await
    }
}

impl Delete<i32> for TeamRequestRepository {
    async fn delete(&self, id: &i32) -> Result<bool, Error> {
        let result = sqlx::query("DELETE FROM team_requests WHERE request_id = ?")
            .bind(id)
            .execute(&self.connection_pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
