//! Activity entity

use chrono::{DateTime, Utc};
use serde::Serialize;

#[derive(Serialize, Debug, Clone, sqlx::FromRow)]
pub struct Activity {
    pub activity_id: i32,
    pub title: String,
    pub description: Option<String>,
    pub points: i32,
    pub created_at: DateTime<Utc>,
}
