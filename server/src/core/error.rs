use crate::repositories::MembershipConflict;
use axum::{Json, http::StatusCode, response::IntoResponse};
use serde::Serialize;
use sqlx::mysql::MySqlDatabaseError;
use tracing::{error, warn};

// MySQL server error numbers for lock contention
const ER_LOCK_WAIT_TIMEOUT: u16 = 1205;
const ER_LOCK_DEADLOCK: u16 = 1213;

#[derive(Serialize)]
struct ErrorBody {
    message: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<String>,
}

// {"error": {"message": ..., "details": ...}}
#[derive(Serialize)]
struct ErrorResponse {
    error: ErrorBody,
}

#[derive(Debug)]
pub struct AppError {
    status: StatusCode,
    message: &'static str,
    details: Option<String>,
}

impl AppError {
    pub fn new(status: StatusCode, message: &'static str) -> Self {
        Self {
            status,
            message,
            details: None,
        }
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn message(&self) -> &'static str {
        self.message
    }

    // Common error constructors
    pub fn not_found(message: &'static str) -> Self {
        Self::new(StatusCode::NOT_FOUND, message)
    }

    pub fn bad_request(message: &'static str) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn unauthorized(message: &'static str) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, message)
    }

    pub fn forbidden(message: &'static str) -> Self {
        Self::new(StatusCode::FORBIDDEN, message)
    }

    pub fn conflict(message: &'static str) -> Self {
        Self::new(StatusCode::CONFLICT, message)
    }

    pub fn internal_server_error(message: &'static str) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, message)
    }

    pub fn service_unavailable(message: &'static str) -> Self {
        Self::new(StatusCode::SERVICE_UNAVAILABLE, message)
    }
}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => Self::not_found("Resource not found"),

            sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
                Self::conflict("Resource already exists")
            }

            sqlx::Error::Database(db_err) if db_err.is_foreign_key_violation() => {
                Self::bad_request("Referenced resource does not exist")
            }

            sqlx::Error::Database(db_err) => {
                let number = db_err
                    .try_downcast_ref::<MySqlDatabaseError>()
                    .map(|e| e.number());
                match number {
                    Some(ER_LOCK_WAIT_TIMEOUT | ER_LOCK_DEADLOCK) => {
                        warn!("Lock contention: {}", db_err);
                        Self::service_unavailable("Database busy, try again")
                    }
                    _ => {
                        error!("Database error: {}", db_err);
                        Self::internal_server_error("Database error")
                    }
                }
            }

            sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed => {
                Self::service_unavailable("Database unavailable")
            }

            other => {
                error!("Unexpected database failure: {}", other);
                Self::internal_server_error("Internal server error")
            }
        }
    }
}

impl From<MembershipConflict> for AppError {
    fn from(conflict: MembershipConflict) -> Self {
        match conflict {
            MembershipConflict::TeamFull => {
                Self::conflict("Team is full").with_details("A team can have at most 4 members")
            }
            MembershipConflict::AlreadyInTeam => Self::conflict("User is already in a team"),
            MembershipConflict::NotInTeam => Self::bad_request("User is not in a team"),
            MembershipConflict::TeamNotFound => Self::not_found("Team not found"),
            MembershipConflict::NotPending => Self::conflict("Team request is no longer pending"),
            MembershipConflict::CannotVerify => Self::conflict("Team cannot be verified")
                .with_details("Only teams with 2 to 4 members can be verified"),
            MembershipConflict::Contended => {
                Self::service_unavailable("Membership changed concurrently, try again")
            }
        }
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(err: validator::ValidationErrors) -> Self {
        Self::bad_request("Validation error").with_details(err.to_string())
    }
}

impl From<bcrypt::BcryptError> for AppError {
    fn from(err: bcrypt::BcryptError) -> Self {
        error!("Password hashing failed: {}", err);
        Self::internal_server_error("Failed to process password")
    }
}

impl From<jsonwebtoken::errors::Error> for AppError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        error!("Token handling failed: {}", err);
        Self::internal_server_error("Failed to issue session token")
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let body = Json(ErrorResponse {
            error: ErrorBody {
                message: self.message,
                details: self.details,
            },
        });
        (self.status, body).into_response()
    }
}
