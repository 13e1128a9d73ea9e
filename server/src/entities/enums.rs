//! Enumerations stored as MySQL ENUM columns

use serde::{Deserialize, Serialize};
use std::fmt;

/// Returned when a column holds a value no variant matches.
#[derive(Debug)]
pub struct UnknownVariant(pub String);

impl fmt::Display for UnknownVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown enum value '{}'", self.0)
    }
}

impl std::error::Error for UnknownVariant {}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "UPPERCASE")]
pub enum Role {
    User,
    Admin,
}

impl TryFrom<String> for Role {
    type Error = UnknownVariant;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        match value.as_str() {
            "USER" => Ok(Role::User),
            "ADMIN" => Ok(Role::Admin),
            _ => Err(UnknownVariant(value)),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "UPPERCASE")]
pub enum RequestState {
    Pending,
    Accepted,
    Rejected,
}

impl RequestState {
    pub fn as_str(&self) -> &'static str {
        match self {
            RequestState::Pending => "PENDING",
            RequestState::Accepted => "ACCEPTED",
            RequestState::Rejected => "REJECTED",
        }
    }
}

impl TryFrom<String> for RequestState {
    type Error = UnknownVariant;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        match value.as_str() {
            "PENDING" => Ok(RequestState::Pending),
            "ACCEPTED" => Ok(RequestState::Accepted),
            "REJECTED" => Ok(RequestState::Rejected),
            _ => Err(UnknownVariant(value)),
        }
    }
}
