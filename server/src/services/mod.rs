//! Services module - HTTP handlers, one sub-module per resource

pub mod activity;
pub mod auth;
pub mod team;
pub mod team_request;
pub mod user;

pub use activity::{
    create_activity, delete_activity, get_activity, list_activities, update_activity,
};
pub use auth::{login_user, logout_user, register_user};
pub use team::{create_team, delete_team, get_team, list_teams, update_team};
pub use team_request::{
    cancel_team_request, invite_to_team, list_pending_requests, respond_to_request,
};
pub use user::{get_me, get_my_team, get_user_by_id, leave_my_team, list_users, update_user};

use axum::{http::StatusCode, response::IntoResponse};

/// Root endpoint - health check
pub async fn root() -> impl IntoResponse {
    (StatusCode::OK, "Server is running!")
}
