use axum_test::TestServer;
use server::core::{AppState, AuthSettings, encode_jwt};
use server::repositories::Read;
use sqlx::MySqlPool;
use std::sync::Arc;

pub const ADMIN_ID: i32 = 1;
pub const ALICE_ID: i32 = 2; // team 1
pub const BOB_ID: i32 = 3; // team 1
pub const CAROL_ID: i32 = 4; // team 2
pub const DAVE_ID: i32 = 5; // no team, two pending requests
pub const ERIN_ID: i32 = 6; // no team
pub const FRANK_ID: i32 = 7; // team 3, which is full

/// Session settings shared by every test server
pub fn test_auth_settings() -> AuthSettings {
    AuthSettings {
        secret: "teamboard-test-secret".to_string(),
        audience: "https://api.teamboard.test".to_string(),
        issuer: "https://auth.teamboard.test/".to_string(),
        token_ttl_hours: 1,
    }
}

pub fn create_test_state(pool: MySqlPool) -> Arc<AppState> {
    Arc::new(AppState::new(pool, test_auth_settings()))
}

pub fn create_test_server(state: Arc<AppState>) -> TestServer {
    let app = server::create_router(state);
    TestServer::new(app).expect("Failed to create test server")
}

/// Signs a session token for a user loaded from the fixtures
pub async fn create_test_jwt(state: &AppState, user_id: i32) -> String {
    let user = state
        .user
        .read(&user_id)
        .await
        .expect("Failed to read user")
        .expect("User missing from fixtures");
    encode_jwt(&user, &state.auth).expect("Failed to create JWT token")
}

/// Points and verification flag of a team straight from the database
pub async fn team_row(pool: &MySqlPool, team_id: i32) -> Option<(i32, bool)> {
    sqlx::query_as("SELECT points, verified FROM teams WHERE team_id = ?")
        .bind(team_id)
        .fetch_optional(pool)
        .await
        .expect("Failed to read team")
}
