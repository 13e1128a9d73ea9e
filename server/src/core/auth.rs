use crate::core::{AppError, AppState};
use crate::entities::{Role, User};
use crate::repositories::Read;
use axum::extract::State;
use axum::{
    body::Body,
    extract::Request,
    http::{HeaderMap, Response, header},
    middleware::Next,
};
use chrono::{Duration, Utc};
use jsonwebtoken::{
    Algorithm, DecodingKey, EncodingKey, Header, TokenData, Validation, decode, encode,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

/// Name of the cookie carrying the session token
pub const TOKEN_COOKIE: &str = "token";

/// Token signing and validation parameters
#[derive(Debug, Clone)]
pub struct AuthSettings {
    pub secret: String,
    pub audience: String,
    pub issuer: String,
    pub token_ttl_hours: i64,
}

// content of the session token
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String, // user id
    pub email: String,
    pub role: Role,
    pub iss: String,
    pub aud: String,
    pub iat: usize,
    pub exp: usize,
}

#[instrument(skip(user, settings), fields(user_id = %user.user_id))]
pub fn encode_jwt(user: &User, settings: &AuthSettings) -> Result<String, jsonwebtoken::errors::Error> {
    debug!("Encoding session token");
    let now = Utc::now();
    let claims = Claims {
        sub: user.user_id.to_string(),
        email: user.email.clone(),
        role: user.role,
        iss: settings.issuer.clone(),
        aud: settings.audience.clone(),
        iat: now.timestamp() as usize,
        exp: (now + Duration::hours(settings.token_ttl_hours)).timestamp() as usize,
    };

    encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(settings.secret.as_bytes()),
    )
}

/// Checks signature, expiry, issuer and audience
#[instrument(skip(token, settings))]
pub fn decode_jwt(
    token: &str,
    settings: &AuthSettings,
) -> Result<TokenData<Claims>, jsonwebtoken::errors::Error> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.set_audience(&[settings.audience.as_str()]);
    validation.set_issuer(&[settings.issuer.as_str()]);

    decode::<Claims>(
        token,
        &DecodingKey::from_secret(settings.secret.as_bytes()),
        &validation,
    )
}

/// Reads the token from `Authorization: Bearer <token>`, falling back to the
/// `token` cookie.
pub fn extract_token(headers: &HeaderMap) -> Option<String> {
    if let Some(value) = headers.get(header::AUTHORIZATION) {
        let value = value.to_str().ok()?;
        let mut parts = value.split_whitespace();
        return match (parts.next(), parts.next(), parts.next()) {
            (Some(scheme), Some(token), None) if scheme.eq_ignore_ascii_case("bearer") => {
                Some(token.to_string())
            }
            _ => None,
        };
    }

    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, value)| *name == TOKEN_COOKIE && !value.is_empty())
        .map(|(_, value)| value.to_string())
}

/// Validates the session and stores the current `User` in the request extensions
#[instrument(skip(state, req, next))]
pub async fn authentication_middleware(
    State(state): State<Arc<AppState>>,
    mut req: Request,
    next: Next,
) -> Result<Response<Body>, AppError> {
    debug!("Running authentication middleware");
    let token = extract_token(req.headers()).ok_or_else(|| {
        warn!("Missing or malformed session token");
        AppError::unauthorized("Please provide a Bearer token")
    })?;

    let token_data = decode_jwt(&token, &state.auth).map_err(|e| {
        warn!("Rejected session token: {}", e);
        AppError::unauthorized("Invalid or expired token")
    })?;

    let user_id: i32 = token_data.claims.sub.parse().map_err(|_| {
        warn!("Token subject is not a user id: {}", token_data.claims.sub);
        AppError::unauthorized("Invalid or expired token")
    })?;

    let current_user = state.user.read(&user_id).await?.ok_or_else(|| {
        warn!("User {} from token not found", user_id);
        AppError::unauthorized("You are not an authorized user")
    })?;

    debug!("User authenticated: {}", current_user.user_id);
    req.extensions_mut().insert(current_user);
    Ok(next.run(req).await)
}

/// Admin-only routes. Must run after `authentication_middleware`.
#[instrument(skip(req, next))]
pub async fn admin_middleware(req: Request, next: Next) -> Result<Response<Body>, AppError> {
    let current_user = req.extensions().get::<User>().ok_or_else(|| {
        warn!("User not found in request extensions");
        AppError::unauthorized("User not authenticated")
    })?;

    require_admin(current_user)?;
    Ok(next.run(req).await)
}

pub fn require_admin(user: &User) -> Result<(), AppError> {
    if !user.is_admin() {
        warn!("User {} is not an admin", user.user_id);
        return Err(AppError::forbidden("Admin role required"));
    }

    info!("Admin check passed for user {}", user.user_id);
    Ok(())
}
