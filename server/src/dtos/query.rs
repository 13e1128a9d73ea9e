//! Query DTOs - pagination parameters

use serde::{Deserialize, Serialize};

pub const DEFAULT_TAKE: i64 = 10;
pub const MAX_TAKE: i64 = 100;

/// Query parameters `?skip=&take=` used by the paginated listings
#[derive(Serialize, Deserialize, Debug, Default)]
pub struct PageQuery {
    #[serde(default)]
    pub skip: Option<i64>,
    #[serde(default)]
    pub take: Option<i64>,
}

/// Normalized offset/limit pair
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub skip: i64,
    pub take: i64,
}

impl PageQuery {
    /// `skip` never goes below zero and `take` is kept within `1..=MAX_TAKE`.
    pub fn page(&self) -> Page {
        Page {
            skip: self.skip.unwrap_or(0).max(0),
            take: self.take.unwrap_or(DEFAULT_TAKE).clamp(1, MAX_TAKE),
        }
    }
}
