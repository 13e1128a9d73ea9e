//! MembershipRepository - statements that change who belongs to which team
//!
//! Every public method runs in one transaction and keeps the team invariants
//! in the same commit: stored team points equal the sum of the members'
//! points, a team never exceeds `Team::MAX_MEMBERS`, a team below
//! `Team::MIN_MEMBERS` is not verified, and an empty team is deleted.
//!
//! Business-rule failures are returned as `Ok(Err(MembershipConflict))` so the
//! caller can tell them apart from database errors; the transaction is rolled
//! back when it is dropped without commit.

use crate::dtos::{UpdateTeamDTO, UpdateUserDTO};
use crate::entities::{RequestState, Team, TeamRequest, User};
use chrono::Utc;
use sqlx::{Error, MySql, MySqlConnection, MySqlPool, QueryBuilder};
use tracing::{debug, info, warn};

/// A membership rule that prevented the change
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MembershipConflict {
    TeamFull,
    AlreadyInTeam,
    NotInTeam,
    TeamNotFound,
    NotPending,
    CannotVerify,
    /// The user kept switching teams while their rows were being locked
    Contended,
}

/// Reads of a user's team are retried this many times before giving up
const LOCK_ATTEMPTS: usize = 3;

const SELECT_REQUEST: &str =
    "SELECT request_id, team_id, requestee_id, requester_id, state, created_at FROM team_requests WHERE request_id = ?";

pub type Guarded<T> = Result<T, MembershipConflict>;

pub struct MembershipRepository {
    connection_pool: MySqlPool,
}

impl MembershipRepository {
    pub fn new(connection_pool: MySqlPool) -> Self {
        Self { connection_pool }
    }

    /// Creates a team with `founder_id` as its first member.
    /// The founder's other pending requests are rejected.
    pub async fn create_team(&self, founder_id: &i32, name: &str) -> Result<Guarded<Team>, Error> {
        let mut tx = self.connection_pool.begin().await?;

        let founder = lock_user(&mut tx, *founder_id)
            .await?
            .ok_or(Error::RowNotFound)?;
        if founder.team_id.is_some() {
            return Ok(Err(MembershipConflict::AlreadyInTeam));
        }

        let result = sqlx::query(
            "INSERT INTO teams (name, points, verified, created_at) VALUES (?, 0, FALSE, ?)",
        )
        .bind(name)
        .bind(Utc::now())
        .execute(&mut *tx)
        .await?;
        let team_id = result.last_insert_id() as i32;

        sqlx::query("UPDATE users SET team_id = ? WHERE user_id = ?")
            .bind(team_id)
            .bind(founder_id)
            .execute(&mut *tx)
            .await?;

        reject_pending_for(&mut tx, *founder_id, None).await?;
        settle_team(&mut tx, team_id).await?;

        let team = fetch_team(&mut tx, team_id)
            .await?
            .ok_or(Error::RowNotFound)?;
        tx.commit().await?;

        info!("Team {} created by user {}", team_id, founder_id);
        Ok(Ok(team))
    }

    /// Accepts a pending request: the requestee joins the team and every other
    /// pending request addressed to them is rejected.
    pub async fn accept_request(&self, request_id: &i32) -> Result<Guarded<TeamRequest>, Error> {
        // team and requestee of a request never change, so they can be read
        // before anything is locked
        let request = sqlx::query_as::<_, TeamRequest>(SELECT_REQUEST)
            .bind(request_id)
            .fetch_optional(&self.connection_pool)
            .await?
            .ok_or(Error::RowNotFound)?;

        if request.state != RequestState::Pending {
            return Ok(Err(MembershipConflict::NotPending));
        }

        let mut tx = self.connection_pool.begin().await?;

        if !lock_team(&mut tx, request.team_id).await? {
            return Ok(Err(MembershipConflict::TeamNotFound));
        }

        let requestee = lock_user(&mut tx, request.requestee_id)
            .await?
            .ok_or(Error::RowNotFound)?;

        let request = lock_request(&mut tx, request.request_id)
            .await?
            .ok_or(Error::RowNotFound)?;
        if request.state != RequestState::Pending {
            return Ok(Err(MembershipConflict::NotPending));
        }

        if requestee.team_id.is_some() {
            return Ok(Err(MembershipConflict::AlreadyInTeam));
        }

        if !Team::has_room(member_count(&mut tx, request.team_id).await?) {
            return Ok(Err(MembershipConflict::TeamFull));
        }

        sqlx::query("UPDATE users SET team_id = ? WHERE user_id = ?")
            .bind(request.team_id)
            .bind(request.requestee_id)
            .execute(&mut *tx)
            .await?;

        sqlx::query("UPDATE team_requests SET state = ? WHERE request_id = ?")
            .bind(RequestState::Accepted.as_str())
            .bind(request.request_id)
            .execute(&mut *tx)
            .await?;

        reject_pending_for(&mut tx, request.requestee_id, Some(request.request_id)).await?;
        settle_team(&mut tx, request.team_id).await?;
        tx.commit().await?;

        info!(
            "User {} joined team {} through request {}",
            request.requestee_id, request.team_id, request.request_id
        );
        Ok(Ok(TeamRequest {
            state: RequestState::Accepted,
            ..request
        }))
    }

    /// Removes a user from their team. Returns the id of the team left.
    pub async fn leave_team(&self, user_id: &i32) -> Result<Guarded<i32>, Error> {
        for _ in 0..LOCK_ATTEMPTS {
            let Some(team_id) = self.current_team_of(user_id).await? else {
                return Ok(Err(MembershipConflict::NotInTeam));
            };

            let mut tx = self.connection_pool.begin().await?;
            lock_team(&mut tx, team_id).await?;
            let user = lock_user(&mut tx, *user_id)
                .await?
                .ok_or(Error::RowNotFound)?;
            if user.team_id != Some(team_id) {
                debug!("User {} changed team while locking, retrying", user_id);
                continue;
            }

            sqlx::query("UPDATE users SET team_id = NULL WHERE user_id = ?")
                .bind(user_id)
                .execute(&mut *tx)
                .await?;

            settle_team(&mut tx, team_id).await?;
            tx.commit().await?;

            info!("User {} left team {}", user_id, team_id);
            return Ok(Ok(team_id));
        }

        warn!("Gave up locking the team of user {}", user_id);
        Ok(Err(MembershipConflict::Contended))
    }

    /// Admin edit of a participant: name, points and team can change together.
    pub async fn update_participant(
        &self,
        user_id: &i32,
        data: &UpdateUserDTO,
    ) -> Result<Guarded<User>, Error> {
        for _ in 0..LOCK_ATTEMPTS {
            let old_team = self.current_team_of(user_id).await?;
            let new_team = match data.team_id {
                Some(target) if target != old_team => Some(target),
                _ => None,
            };

            let mut tx = self.connection_pool.begin().await?;

            let mut to_lock: Vec<i32> = old_team.into_iter().chain(new_team.flatten()).collect();
            to_lock.sort_unstable();
            to_lock.dedup();
            for team_id in &to_lock {
                let exists = lock_team(&mut tx, *team_id).await?;
                if !exists && new_team.flatten() == Some(*team_id) {
                    return Ok(Err(MembershipConflict::TeamNotFound));
                }
            }

            let user = lock_user(&mut tx, *user_id)
                .await?
                .ok_or(Error::RowNotFound)?;
            if user.team_id != old_team {
                debug!("User {} changed team while locking, retrying", user_id);
                continue;
            }

            if let Some(Some(target)) = new_team {
                if !Team::has_room(member_count(&mut tx, target).await?) {
                    return Ok(Err(MembershipConflict::TeamFull));
                }
            }

            if data.name.is_some() || data.points.is_some() || new_team.is_some() {
                let mut query_builder: QueryBuilder<MySql> =
                    QueryBuilder::new("UPDATE users SET ");
                let mut separated = query_builder.separated(", ");
                if let Some(ref name) = data.name {
                    separated.push("name = ");
                    separated.push_bind_unseparated(name);
                }
                if let Some(points) = data.points {
                    separated.push("points = ");
                    separated.push_bind_unseparated(points);
                }
                if let Some(target) = new_team {
                    separated.push("team_id = ");
                    separated.push_bind_unseparated(target);
                }
                query_builder.push(" WHERE user_id = ");
                query_builder.push_bind(user_id);
                query_builder.build().execute(&mut *tx).await?;
            }

            if let Some(Some(_)) = new_team {
                reject_pending_for(&mut tx, *user_id, None).await?;
            }

            for team_id in to_lock {
                settle_team(&mut tx, team_id).await?;
            }

            let updated = lock_user(&mut tx, *user_id)
                .await?
                .ok_or(Error::RowNotFound)?;
            tx.commit().await?;

            debug!("Participant {} updated", user_id);
            return Ok(Ok(updated));
        }

        warn!("Gave up locking the teams of user {}", user_id);
        Ok(Err(MembershipConflict::Contended))
    }

    /// Admin edit of a team. Verification is refused outside 2..=4 members.
    pub async fn update_team(
        &self,
        team_id: &i32,
        data: &UpdateTeamDTO,
    ) -> Result<Guarded<Team>, Error> {
        let mut tx = self.connection_pool.begin().await?;

        if !lock_team(&mut tx, *team_id).await? {
            return Err(Error::RowNotFound);
        }

        if data.verified == Some(true)
            && !Team::can_be_verified(member_count(&mut tx, *team_id).await?)
        {
            return Ok(Err(MembershipConflict::CannotVerify));
        }

        if data.name.is_some() || data.verified.is_some() {
            let mut query_builder: QueryBuilder<MySql> = QueryBuilder::new("UPDATE teams SET ");
            let mut separated = query_builder.separated(", ");
            if let Some(ref name) = data.name {
                separated.push("name = ");
                separated.push_bind_unseparated(name);
            }
            if let Some(verified) = data.verified {
                separated.push("verified = ");
                separated.push_bind_unseparated(verified);
            }
            query_builder.push(" WHERE team_id = ");
            query_builder.push_bind(team_id);
            query_builder.build().execute(&mut *tx).await?;
        }

        let team = fetch_team(&mut tx, *team_id)
            .await?
            .ok_or(Error::RowNotFound)?;
        tx.commit().await?;

        Ok(Ok(team))
    }

    async fn current_team_of(&self, user_id: &i32) -> Result<Option<i32>, Error> {
        let row: Option<(Option<i32>,)> =
            sqlx::query_as("SELECT team_id FROM users WHERE user_id = ?")
                .bind(user_id)
                .fetch_optional(&self.connection_pool)
                .await?;

        match row {
            Some((team_id,)) => Ok(team_id),
            None => Err(Error::RowNotFound),
        }
    }
}

// ************************* HELPERS ************************* //

/// Locks a team row; false when the team does not exist
async fn lock_team(conn: &mut MySqlConnection, team_id: i32) -> Result<bool, Error> {
    let row: Option<(i32,)> =
        sqlx::query_as("SELECT team_id FROM teams WHERE team_id = ? FOR UPDATE")
            .bind(team_id)
            .fetch_optional(&mut *conn)
            .await?;
    Ok(row.is_some())
}

async fn lock_request(
    conn: &mut MySqlConnection,
    request_id: i32,
) -> Result<Option<TeamRequest>, Error> {
    let sql = format!("{} FOR UPDATE", SELECT_REQUEST);
    sqlx::query_as::<_, TeamRequest>(&sql)
        .bind(request_id)
        .fetch_optional(&mut *conn)
        .await
}

async fn lock_user(conn: &mut MySqlConnection, user_id: i32) -> Result<Option<User>, Error> {
    sqlx::query_as::<_, User>(
        r#"
        SELECT user_id, name, email, password, points, team_id, role
        FROM users
        WHERE user_id = ?
        FOR UPDATE
        "#,
    )
    .bind(user_id)
    .fetch_optional(&mut *conn)
    .await
}

async fn fetch_team(conn: &mut MySqlConnection, team_id: i32) -> Result<Option<Team>, Error> {
    sqlx::query_as::<_, Team>(
        "SELECT team_id, name, points, verified, created_at FROM teams WHERE team_id = ?",
    )
    .bind(team_id)
    .fetch_optional(&mut *conn)
    .await
}

async fn member_count(conn: &mut MySqlConnection, team_id: i32) -> Result<i64, Error> {
    let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM users WHERE team_id = ?")
        .bind(team_id)
        .fetch_one(&mut *conn)
        .await?;
    Ok(count)
}

/// Rejects the user's pending requests, optionally sparing one
async fn reject_pending_for(
    conn: &mut MySqlConnection,
    user_id: i32,
    except: Option<i32>,
) -> Result<(), Error> {
    sqlx::query(
        r#"
        UPDATE team_requests
        SET state = ?
        WHERE requestee_id = ? AND state = 'PENDING' AND request_id <> ?
        "#,
    )
    .bind(RequestState::Rejected.as_str())
    .bind(user_id)
    .bind(except.unwrap_or(0))
    .execute(&mut *conn)
    .await?;
    Ok(())
}

/// Re-derives team points from the members, clears `verified` on teams that
/// are too small and deletes teams without members.
async fn settle_team(conn: &mut MySqlConnection, team_id: i32) -> Result<(), Error> {
    let count = member_count(conn, team_id).await?;

    if count == 0 {
        sqlx::query("DELETE FROM teams WHERE team_id = ?")
            .bind(team_id)
            .execute(&mut *conn)
            .await?;
        info!("Team {} deleted after its last member left", team_id);
        return Ok(());
    }

    sqlx::query(
        r#"
        UPDATE teams
        SET points = (SELECT COALESCE(SUM(u.points), 0) FROM users u WHERE u.team_id = ?),
            verified = verified AND ?
        WHERE team_id = ?
        "#,
    )
    .bind(team_id)
    .bind(count >= Team::MIN_MEMBERS)
    .bind(team_id)
    .execute(&mut *conn)
    .await?;

    Ok(())
}
