//! TeamRepository - teams table
//!
//! Creation and any change that depends on membership go through
//! `MembershipRepository`; this repository only reads and deletes.

use super::{Delete, Read, ReadMany};
use crate::dtos::Page;
use crate::entities::Team;
use sqlx::{Error, MySql, MySqlPool, QueryBuilder};

/// A team together with its current number of members
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct TeamWithMembers {
    #[sqlx(flatten)]
    pub team: Team,
    pub member_count: i64,
}

pub struct TeamRepository {
    connection_pool: MySqlPool,
}

impl TeamRepository {
    pub fn new(connection_pool: MySqlPool) -> Self {
        Self { connection_pool }
    }

    /// Leaderboard page: highest points first, ties broken by id
    pub async fn find_page(&self, page: Page) -> Result<Vec<TeamWithMembers>, Error> {
        sqlx::query_as::<_, TeamWithMembers>(
            r#"
            SELECT
                t.team_id,
                t.name,
                t.points,
                t.verified,
                t.created_at,
                (SELECT COUNT(*) FROM users u WHERE u.team_id = t.team_id) AS member_count
            FROM teams t
            ORDER BY t.points DESC, t.team_id
            LIMIT ? OFFSET ?
            "#,
        )
        .bind(page.take)
        .bind(page.skip)
        .fetch_all(&self.connection_pool)
        .await
    }

    pub async fn count(&self) -> Result<i64, Error> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM teams")
            .fetch_one(&self.connection_pool)
            .await?;
        Ok(count)
    }

    pub async fn member_count(&self, team_id: &i32) -> Result<i64, Error> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM users WHERE team_id = ?")
            .bind(team_id)
            .fetch_one(&self.connection_pool)
            .await?;
        Ok(count)
    }
}

impl Read<Team, i32> for TeamRepository {
    async fn read(&self, id: &i32) -> Result<Option<Team>, Error> {
        sqlx::query_as::<_, Team>(
            "SELECT team_id, name, points, verified, created_at FROM teams WHERE team_id = ?",
        )
        .bind(id)
        .fetch_optional(&self.connection_pool)
        .await
    }
}

impl ReadMany<Team, i32> for TeamRepository {
    async fn read_many(&self, ids: &[i32]) -> Result<Vec<Team>, Error> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let mut query_builder: QueryBuilder<MySql> = QueryBuilder::new(
            "SELECT team_id, name, points, verified, created_at FROM teams WHERE team_id IN (",
        );
        let mut separated = query_builder.separated(", ");
        for id in ids {
            separated.push_bind(*id);
        }
        separated.push_unseparated(")");

        query_builder
            .build_query_as::<Team>()
            .fetch_all(&self.connection_pool)
            .await
    }
}

impl Delete<i32> for TeamRepository {
    /// Members are detached (ON DELETE SET NULL) and requests removed (ON DELETE CASCADE)
    async fn delete(&self, id: &i32) -> Result<bool, Error> {
        let result = sqlx::query("DELETE FROM teams WHERE team_id = ?")
            .bind(id)
            .execute(&self.connection_pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
