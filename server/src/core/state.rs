//! Application State - repositories and settings shared by all routes

use crate::core::{AuthSettings, Config};
use crate::repositories::{
    ActivityRepository, MembershipRepository, TeamRepository, TeamRequestRepository,
    UserRepository,
};
use sqlx::MySqlPool;

pub struct AppState {
    pub user: UserRepository,

    pub team: TeamRepository,

    pub request: TeamRequestRepository,

    pub activity: ActivityRepository,

    /// Multi-table, transactional membership changes
    pub membership: MembershipRepository,

    /// Token signing and validation parameters
    pub auth: AuthSettings,
}

impl AppState {
    /// Builds every repository over the same connection pool.
    ///
    /// # Arguments
    /// * `pool` - Shared MySQL pool
    /// * `auth` - Token signing and validation parameters
    pub fn new(pool: MySqlPool, auth: AuthSettings) -> Self {
        Self {
            user: UserRepository::new(pool.clone()),
            team: TeamRepository::new(pool.clone()),
            request: TeamRequestRepository::new(pool.clone()),
            activity: ActivityRepository::new(pool.clone()),
            membership: MembershipRepository::new(pool),
            auth,
        }
    }
}

impl From<&Config> for AuthSettings {
    fn from(config: &Config) -> Self {
        Self {
            secret: config.jwt_secret.clone(),
            audience: config.auth_audience.clone(),
            issuer: config.auth_issuer_base_url.clone(),
            token_ttl_hours: config.token_ttl_hours,
        }
    }
}
