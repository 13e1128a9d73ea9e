//! Integration tests for the auth endpoints
//!
//! - POST /api/auth/register
//! - POST /api/auth/login
//! - POST /api/auth/logout
//! - session handling of the protected routes
//!
//! `#[sqlx::test]` creates an isolated database, applies `migrations/` and
//! loads the listed scripts from `fixtures/`.

mod common;

#[cfg(test)]
mod auth_tests {
    use super::common::*;
    use axum::http::{HeaderName, StatusCode, header::AUTHORIZATION};
    use serde_json::{Value, json};
    use server::core::{AuthSettings, encode_jwt};
    use server::repositories::Read;
    use sqlx::MySqlPool;

    // ============================================================
    // POST /auth/register - register_user
    // ============================================================

    #[sqlx::test(fixtures(path = "../fixtures", scripts("teams", "users")))]
    async fn test_register_creates_user(pool: MySqlPool) -> sqlx::Result<()> {
        let server = create_test_server(create_test_state(pool));

        let response = server
            .post("/api/auth/register")
            .json(&json!({
                "name": "Zoe",
                "email": "  Zoe@Example.com ",
                "password": "correct-horse"
            }))
            .await;

        response.assert_status(StatusCode::CREATED);
        let body: Value = response.json();
        assert_eq!(body["email"], "zoe@example.com");
        assert_eq!(body["name"], "Zoe");
        assert_eq!(body["points"], 0);
        assert_eq!(body["role"], "USER");
        assert!(body["teamId"].is_null());
        assert!(body.get("password").is_none());

        Ok(())
    }

    #[sqlx::test(fixtures(path = "../fixtures", scripts("teams", "users")))]
    async fn test_register_duplicate_email(pool: MySqlPool) -> sqlx::Result<()> {
        let server = create_test_server(create_test_state(pool));

        let response = server
            .post("/api/auth/register")
            .json(&json!({ "email": "ALICE@example.com", "password": "password123" }))
            .await;

        response.assert_status_conflict();
        let body: Value = response.json();
        assert_eq!(body["error"]["message"], "Email already registered");

        Ok(())
    }

    #[sqlx::test(fixtures(path = "../fixtures", scripts("teams", "users")))]
    async fn test_register_short_password(pool: MySqlPool) -> sqlx::Result<()> {
        let server = create_test_server(create_test_state(pool));

        let response = server
            .post("/api/auth/register")
            .json(&json!({ "email": "short@example.com", "password": "short" }))
            .await;

        response.assert_status(StatusCode::BAD_REQUEST);
        let body: Value = response.json();
        assert_eq!(body["error"]["message"], "Validation error");

        Ok(())
    }

    #[sqlx::test(fixtures(path = "../fixtures", scripts("teams", "users")))]
    async fn test_register_invalid_email(pool: MySqlPool) -> sqlx::Result<()> {
        let server = create_test_server(create_test_state(pool));

        let response = server
            .post("/api/auth/register")
            .json(&json!({ "email": "not-an-email", "password": "password123" }))
            .await;

        response.assert_status(StatusCode::BAD_REQUEST);

        Ok(())
    }

    // ============================================================
    // POST /auth/login - login_user
    // ============================================================

    #[sqlx::test(fixtures(path = "../fixtures", scripts("teams", "users")))]
    async fn test_login_success(pool: MySqlPool) -> sqlx::Result<()> {
        let server = create_test_server(create_test_state(pool));

        server
            .post("/api/auth/register")
            .json(&json!({ "email": "login@example.com", "password": "TestLogin123" }))
            .await
            .assert_status(StatusCode::CREATED);

        let response = server
            .post("/api/auth/login")
            .json(&json!({ "email": "Login@Example.com", "password": "TestLogin123" }))
            .await;

        response.assert_status_ok();

        let headers = response.headers();
        let cookie = headers
            .get("set-cookie")
            .expect("Set-Cookie header should be present")
            .to_str()
            .unwrap();
        assert!(cookie.starts_with("token="));
        assert!(cookie.contains("HttpOnly"));

        let auth_header = headers
            .get("authorization")
            .expect("Authorization header should be present")
            .to_str()
            .unwrap()
            .to_string();
        assert!(auth_header.starts_with("Bearer "));

        let body: Value = response.json();
        let token = body["token"].as_str().unwrap();
        assert_eq!(auth_header, format!("Bearer {}", token));

        Ok(())
    }

    #[sqlx::test(fixtures(path = "../fixtures", scripts("teams", "users")))]
    async fn test_login_wrong_password(pool: MySqlPool) -> sqlx::Result<()> {
        let server = create_test_server(create_test_state(pool));

        server
            .post("/api/auth/register")
            .json(&json!({ "email": "wrong@example.com", "password": "TestLogin123" }))
            .await
            .assert_status(StatusCode::CREATED);

        let response = server
            .post("/api/auth/login")
            .json(&json!({ "email": "wrong@example.com", "password": "NotThePassword" }))
            .await;

        response.assert_status_unauthorized();
        assert!(response.headers().get("set-cookie").is_none());

        Ok(())
    }

    #[sqlx::test(fixtures(path = "../fixtures", scripts("teams", "users")))]
    async fn test_login_unknown_email(pool: MySqlPool) -> sqlx::Result<()> {
        let server = create_test_server(create_test_state(pool));

        let response = server
            .post("/api/auth/login")
            .json(&json!({ "email": "nobody@example.com", "password": "whatever123" }))
            .await;

        response.assert_status_unauthorized();

        Ok(())
    }

    #[sqlx::test(fixtures(path = "../fixtures", scripts("teams", "users")))]
    async fn test_login_token_opens_protected_routes(pool: MySqlPool) -> sqlx::Result<()> {
        let server = create_test_server(create_test_state(pool));

        server
            .post("/api/auth/register")
            .json(&json!({ "name": "Tess", "email": "tess@example.com", "password": "password123" }))
            .await
            .assert_status(StatusCode::CREATED);

        let login: Value = server
            .post("/api/auth/login")
            .json(&json!({ "email": "tess@example.com", "password": "password123" }))
            .await
            .json();
        let token = login["token"].as_str().unwrap();

        let response = server
            .get("/api/users/me")
            .add_header(AUTHORIZATION, format!("Bearer {}", token))
            .await;

        response.assert_status_ok();
        let body: Value = response.json();
        assert_eq!(body["email"], "tess@example.com");

        Ok(())
    }

    // ============================================================
    // POST /auth/logout - logout_user
    // ============================================================

    #[sqlx::test]
    async fn test_logout_expires_cookie(pool: MySqlPool) -> sqlx::Result<()> {
        let server = create_test_server(create_test_state(pool));

        let response = server.post("/api/auth/logout").await;

        response.assert_status_ok();
        let cookie = response
            .headers()
            .get("set-cookie")
            .expect("Set-Cookie header should be present")
            .to_str()
            .unwrap();
        assert!(cookie.starts_with("token=;"));
        assert!(cookie.contains("Max-Age=0"));

        Ok(())
    }

    // ============================================================
    // Session middleware
    // ============================================================

    #[sqlx::test(fixtures(path = "../fixtures", scripts("teams", "users")))]
    async fn test_missing_token_is_unauthorized(pool: MySqlPool) -> sqlx::Result<()> {
        let server = create_test_server(create_test_state(pool));

        let response = server.get("/api/users/me").await;

        response.assert_status_unauthorized();
        let body: Value = response.json();
        assert_eq!(body["error"]["message"], "Please provide a Bearer token");

        Ok(())
    }

    #[sqlx::test(fixtures(path = "../fixtures", scripts("teams", "users")))]
    async fn test_invalid_token_is_unauthorized(pool: MySqlPool) -> sqlx::Result<()> {
        let server = create_test_server(create_test_state(pool));

        let response = server
            .get("/api/users/me")
            .add_header(AUTHORIZATION, "Bearer not.a.token")
            .await;

        response.assert_status_unauthorized();

        Ok(())
    }

    #[sqlx::test(fixtures(path = "../fixtures", scripts("teams", "users")))]
    async fn test_token_for_other_audience_is_unauthorized(pool: MySqlPool) -> sqlx::Result<()> {
        let state = create_test_state(pool);
        let server = create_test_server(state.clone());

        let foreign = AuthSettings {
            audience: "https://someone-else.test".to_string(),
            ..test_auth_settings()
        };
        let alice = state.user.read(&ALICE_ID).await?.unwrap();
        let token = encode_jwt(&alice, &foreign).unwrap();

        let response = server
            .get("/api/users/me")
            .add_header(AUTHORIZATION, format!("Bearer {}", token))
            .await;

        response.assert_status_unauthorized();

        Ok(())
    }

    #[sqlx::test(fixtures(path = "../fixtures", scripts("teams", "users")))]
    async fn test_token_cookie_is_accepted(pool: MySqlPool) -> sqlx::Result<()> {
        let state = create_test_state(pool);
        let server = create_test_server(state.clone());
        let token = create_test_jwt(&state, ALICE_ID).await;

        let response = server
            .get("/api/users/me")
            .add_header(
                HeaderName::from_static("cookie"),
                format!("token={}", token),
            )
            .await;

        response.assert_status_ok();
        let body: Value = response.json();
        assert_eq!(body["id"], ALICE_ID);

        Ok(())
    }

    #[sqlx::test(fixtures(path = "../fixtures", scripts("teams", "users")))]
    async fn test_token_of_deleted_user_is_unauthorized(pool: MySqlPool) -> sqlx::Result<()> {
        let state = create_test_state(pool.clone());
        let server = create_test_server(state.clone());
        let token = create_test_jwt(&state, ERIN_ID).await;

        sqlx::query("DELETE FROM users WHERE user_id = ?")
            .bind(ERIN_ID)
            .execute(&pool)
            .await?;

        let response = server
            .get("/api/users/me")
            .add_header(AUTHORIZATION, format!("Bearer {}", token))
            .await;

        response.assert_status_unauthorized();

        Ok(())
    }
}
