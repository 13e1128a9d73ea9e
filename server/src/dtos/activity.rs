//! Activity DTOs

use crate::entities::Activity;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct ActivityDTO {
    pub id: i32,
    pub title: String,
    pub description: Option<String>,
    pub points: i32,
    pub created_at: DateTime<Utc>,
}

impl From<Activity> for ActivityDTO {
    fn from(value: Activity) -> Self {
        Self {
            id: value.activity_id,
            title: value.title,
            description: value.description,
            points: value.points,
            created_at: value.created_at,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Validate)]
pub struct CreateActivityDTO {
    #[validate(length(min = 1, max = 100, message = "Title must be between 1 and 100 characters"))]
    pub title: String,
    #[validate(length(max = 2000, message = "Description must be at most 2000 characters"))]
    pub description: Option<String>,
    #[validate(range(min = 0, max = 1_000_000, message = "Points must be between 0 and 1000000"))]
    pub points: i32,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, Validate)]
pub struct UpdateActivityDTO {
    #[validate(length(min = 1, max = 100, message = "Title must be between 1 and 100 characters"))]
    pub title: Option<String>,
    #[validate(length(max = 2000, message = "Description must be at most 2000 characters"))]
    pub description: Option<String>,
    #[validate(range(min = 0, max = 1_000_000, message = "Points must be between 0 and 1000000"))]
    pub points: Option<i32>,
}

impl UpdateActivityDTO {
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.description.is_none() && self.points.is_none()
    }
}
