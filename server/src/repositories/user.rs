//! UserRepository - users table

use super::{Create, Read, ReadMany};
use crate::dtos::{CreateUserDTO, Page};
use crate::entities::User;
use sqlx::{Error, MySql, MySqlPool, QueryBuilder};

pub struct UserRepository {
    connection_pool: MySqlPool,
}

impl UserRepository {
    pub fn new(connection_pool: MySqlPool) -> UserRepository {
        Self { connection_pool }
    }

    /// Emails are unique, lookups are exact
    pub async fn find_by_email(&self, email: &str) -> Result<Option<User>, Error> {
        sqlx::query_as::<_, User>(
            "SELECT user_id, name, email, password, points, team_id, role FROM users WHERE email = ?",
        )
        .bind(email)
        .fetch_optional(&self.connection_pool)
        .await
    }

    /// One page of users ordered by id
    pub async fn find_page(&self, page: Page) -> Result<Vec<User>, Error> {
        sqlx::query_as::<_, User>(
            r#"
            SELECT user_id, name, email, password, points, team_id, role
            FROM users
            ORDER BY user_id
            LIMIT ? OFFSET ?
            "#,
        )
        .bind(page.take)
        .bind(page.skip)
        .fetch_all(&self.connection_pool)
        .await
    }

    pub async fn count(&self) -> Result<i64, Error> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM users")
            .fetch_one(&self.connection_pool)
            .await?;
        Ok(count)
    }

    /// Members of a team, highest score first
    pub async fn find_many_by_team_id(&self, team_id: &i32) -> Result<Vec<User>, Error> {
        sqlx::query_as::<_, User>(
            r#"
            SELECT user_id, name, email, password, points, team_id, role
            FROM users
            WHERE team_id = ?
            ORDER BY points DESC, user_id
            "#,
        )
        .bind(team_id)
        .fetch_all(&self.connection_pool)
        .await
    }
}

impl Create<User, CreateUserDTO> for UserRepository {
    /// `data.password` must already be hashed
    async fn create(&self, data: &CreateUserDTO) -> Result<User, Error> {
        let result = sqlx::query("INSERT INTO users (name, email, password) VALUES (?, ?, ?)")
            .bind(&data.name)
            .bind(&data.email)
            .bind(&data.password)
            .execute(&self.connection_pool)
            .await?;

        let new_id = result.last_insert_id() as i32;

        self.read(&new_id).await?.ok_or(Error::RowNotFound)
    }
}

impl Read<User, i32> for UserRepository {
    async fn read(&self, id: &i32) -> Result<Option<User>, Error> {
        sqlx::query_as::<_, User>(
            "SELECT user_id, name, email, password, points, team_id, role FROM users WHERE user_id = ?",
        )
        .bind(id)
        .fetch_optional(&self.connection_pool)
        .await
    }
}

impl ReadMany<User, i32> for UserRepository {
    async fn read_many(&self, ids: &[i32]) -> Result<Vec<User>, Error> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let mut query_builder: QueryBuilder<MySql> = QueryBuilder::new(
            "SELECT user_id, name, email, password, points, team_id, role FROM users WHERE user_id IN (",
        );
        let mut separated = query_builder.separated(", ");
        for id in ids {
            separated.push_bind(*id);
        }
        separated.push_unseparated(")");

        query_builder
            .build_query_as::<User>()
            .fetch_all(&self.connection_pool)
            .await
    }
}
