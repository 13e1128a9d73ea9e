//! ActivityRepository - activities table

use super::{Create, Delete, Read, Update};
use crate::dtos::{CreateActivityDTO, UpdateActivityDTO};
use crate::entities::Activity;
use chrono::Utc;
use sqlx::{Error, MySql, MySqlPool, QueryBuilder};

pub struct ActivityRepository {
    connection_pool: MySqlPool,
}

impl ActivityRepository {
    pub fn new(connection_pool: MySqlPool) -> Self {
        Self { connection_pool }
    }

    pub async fn find_all(&self) -> Result<Vec<Activity>, Error> {
        sqlx::query_as::<_, Activity>(
            "SELECT activity_id, title, description, points, created_at FROM activities ORDER BY created_at DESC, activity_id DESC",
        )
        .fetch_all(&self.connection_pool)
        .await
    }
}

impl Create<Activity, CreateActivityDTO> for ActivityRepository {
    async fn create(&self, data: &CreateActivityDTO) -> Result<Activity, Error> {
        let now = Utc::now();

        let result = sqlx::query(
            "INSERT INTO activities (title, description, points, created_at) VALUES (?, ?, ?, ?)",
        )
        .bind(&data.title)
        .bind(&data.description)
        .bind(data.points)
        .bind(now)
        .execute(&self.connection_pool)
        .await?;

        Ok(Activity {
            activity_id: result.last_insert_id() as i32,
            title: data.title.clone(),
            description: data.description.clone(),
            points: data.points,
            created_at: now,
        })
    }
}

impl Read<Activity, i32> for ActivityRepository {
    async fn read(&self, id: &i32) -> Result<Option<Activity>, Error> {
        sqlx::query_as::<_, Activity>(
            "SELECT activity_id, title, description, points, created_at FROM activities WHERE activity_id = ?",
        )
        .bind(id)
        .fetch_optional(&self.connection_pool)
        .await
    }
}

impl Update<Activity, UpdateActivityDTO, i32> for ActivityRepository {
    async fn update(&self, id: &i32, data: &UpdateActivityDTO) -> Result<Activity, Error> {
        let current = self.read(id).await?.ok_or(Error::RowNotFound)?;

        if data.is_empty() {
            return Ok(current);
        }

        let mut query_builder: QueryBuilder<MySql> = QueryBuilder::new("UPDATE activities SET ");
        let mut separated = query_builder.separated(", ");
        if let Some(ref title) = data.title {
            separated.push("title = ");
            separated.push_bind_unseparated(title);
        }
        if let Some(ref description) = data.description {
            separated.push("description = ");
            separated.push_bind_unseparated(description);
        }
        if let Some(points) = data.points {
            separated.push("points = ");
            separated.push_bind_unseparated(points);
        }
        query_builder.push(" WHERE activity_id = ");
        query_builder.push_bind(id);

        query_builder.build().execute(&self.connection_pool).await?;

        self.read(id).await?.ok_or(Error::RowNotFound)
    }
}

impl Delete<i32> for ActivityRepository {
    async fn delete(&self, id: &i32) -> Result<bool, Error> {
        let result = sqlx::query("DELETE FROM activities WHERE activity_id = ?")
            .bind(id)
            .execute(&self.connection_pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
