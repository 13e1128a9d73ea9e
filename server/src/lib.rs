//! Teamboard server library - exposes the modules for the binary and the tests

pub mod core;
pub mod dtos;
pub mod entities;
pub mod repositories;
pub mod services;

pub use crate::core::{AppError, AppState, auth, config};
pub use services::root;

use axum::{
    Router, middleware,
    routing::{delete, get, post},
};
use std::sync::Arc;

/// Builds the application router: the health check at `/`, every resource under `/api`
pub fn create_router(state: Arc<AppState>) -> Router {
    let api = Router::new()
        .nest("/auth", configure_auth_routes())
        .nest("/users", configure_user_routes(state.clone()))
        .nest("/teams", configure_team_routes(state.clone()))
        .nest("/requests", configure_request_routes(state.clone()))
        .nest("/activities", configure_activity_routes(state.clone()));

    Router::new()
        .route("/", get(root))
        .nest("/api", api)
        .with_state(state)
}

/// Registration, login and logout
fn configure_auth_routes() -> Router<Arc<AppState>> {
    use services::*;
    Router::new()
        .route("/register", post(register_user))
        .route("/login", post(login_user))
        .route("/logout", post(logout_user))
}

/// Participants: admin listing and editing, plus the caller's own profile and team
fn configure_user_routes(state: Arc<AppState>) -> Router<Arc<AppState>> {
    use crate::core::{admin_middleware, authentication_middleware};
    use services::*;

    // Routes for any authenticated user
    let own_routes = Router::new()
        .route("/me", get(get_me))
        .route("/team", get(get_my_team))
        .route("/team/leave", post(leave_my_team));

    // Routes that require the ADMIN role
    let admin_routes = Router::new()
        .route("/", get(list_users))
        .route("/{user_id}", get(get_user_by_id).patch(update_user))
        .layer(middleware::from_fn(admin_middleware));

    own_routes
        .merge(admin_routes)
        .layer(middleware::from_fn_with_state(
            state,
            authentication_middleware,
        ))
}

/// Teams: listing, creation, details, invitations; edits are admin-only
fn configure_team_routes(state: Arc<AppState>) -> Router<Arc<AppState>> {
    use crate::core::authentication_middleware;
    use services::*;

    Router::new()
        .route("/", get(list_teams).post(create_team))
        .route(
            "/{team_id}",
            get(get_team).patch(update_team).delete(delete_team),
        )
        .route("/{team_id}/requests", post(invite_to_team))
        .layer(middleware::from_fn_with_state(
            state,
            authentication_middleware,
        ))
}

/// Team requests addressed to or sent by the caller
fn configure_request_routes(state: Arc<AppState>) -> Router<Arc<AppState>> {
    use crate::core::authentication_middleware;
    use services::*;

    Router::new()
        .route("/pending", get(list_pending_requests))
        .route("/{request_id}", delete(cancel_team_request))
        .route("/{request_id}/{action}", post(respond_to_request))
        .layer(middleware::from_fn_with_state(
            state,
            authentication_middleware,
        ))
}

/// Activities: readable by everyone signed in, editable by admins
fn configure_activity_routes(state: Arc<AppState>) -> Router<Arc<AppState>> {
    use crate::core::authentication_middleware;
    use services::*;

    Router::new()
        .route("/", get(list_activities).post(create_activity))
        .route(
            "/{activity_id}",
            get(get_activity)
                .patch(update_activity)
                .delete(delete_activity),
        )
        .layer(middleware::from_fn_with_state(
            state,
            authentication_middleware,
        ))
}
