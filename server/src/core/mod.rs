//! Core Module - infrastructure shared by every route
//!
//! - Session tokens and access middleware
//! - Configuration
//! - Error handling
//! - Request extractors with JSON rejections
//! - Application state

pub mod auth;
pub mod config;
pub mod error;
pub mod extract;
pub mod state;

pub use auth::{
    AuthSettings, Claims, admin_middleware, authentication_middleware, decode_jwt, encode_jwt,
    require_admin,
};
pub use config::Config;
pub use error::AppError;
pub use extract::{AppJson, AppPath, AppQuery, parse_json_body};
pub use state::AppState;
