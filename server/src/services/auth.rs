//! Auth services - registration, login and logout

use crate::core::auth::TOKEN_COOKIE;
use crate::core::{AppError, AppJson, AppState, encode_jwt};
use crate::dtos::{CreateUserDTO, UserDTO};
use crate::entities::User;
use crate::repositories::Create;
use axum::{
    Json,
    extract::State,
    http::{HeaderMap, HeaderValue, StatusCode, header},
    response::IntoResponse,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, instrument, warn};
use validator::Validate;

#[derive(Deserialize)]
pub struct LoginDTO {
    pub email: String,
    pub password: String,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct TokenDTO {
    pub token: String,
}

#[instrument(skip(state, body), fields(email = %body.email))]
pub async fn register_user(
    State(state): State<Arc<AppState>>,
    AppJson(body): AppJson<CreateUserDTO>,
) -> Result<(StatusCode, Json<UserDTO>), AppError> {
    body.validate()?;

    let email = body.email.trim().to_lowercase();
    if state.user.find_by_email(&email).await?.is_some() {
        warn!("Email already registered");
        return Err(AppError::conflict("Email already registered"));
    }

    let new_user = CreateUserDTO {
        name: body.name,
        email,
        password: User::hash_password(&body.password)?,
    };

    let created_user = state.user.create(&new_user).await?;
    info!("User {} registered", created_user.user_id);

    Ok((StatusCode::CREATED, Json(UserDTO::from(created_user))))
}

#[instrument(skip(state, body), fields(email = %body.email))]
pub async fn login_user(
    State(state): State<Arc<AppState>>,
    AppJson(body): AppJson<LoginDTO>,
) -> Result<impl IntoResponse, AppError> {
    let email = body.email.trim().to_lowercase();

    let user = match state.user.find_by_email(&email).await? {
        Some(user) if user.verify_password(&body.password) => user,
        _ => {
            warn!("Login refused");
            return Err(AppError::unauthorized("Email or password are not correct"));
        }
    };

    let token = encode_jwt(&user, &state.auth)?;

    let cookie = format!(
        "{}={}; HttpOnly; Secure; SameSite=Lax; Path=/; Max-Age={}",
        TOKEN_COOKIE,
        token,
        state.auth.token_ttl_hours * 60 * 60
    );

    let mut headers = HeaderMap::new();
    headers.insert(
        header::SET_COOKIE,
        HeaderValue::from_str(&cookie)
            .map_err(|_| AppError::internal_server_error("Failed to build session cookie"))?,
    );
    headers.insert(
        header::AUTHORIZATION,
        HeaderValue::from_str(&format!("Bearer {}", token))
            .map_err(|_| AppError::internal_server_error("Failed to build session header"))?,
    );

    info!("User {} logged in", user.user_id);
    Ok((StatusCode::OK, headers, Json(TokenDTO { token })))
}

/// Expires the session cookie; bearer tokens simply run out
pub async fn logout_user() -> impl IntoResponse {
    let cookie = format!(
        "{}=; HttpOnly; Secure; SameSite=Lax; Path=/; Max-Age=0",
        TOKEN_COOKIE
    );
    ([(header::SET_COOKIE, cookie)], StatusCode::OK)
}
