//! Integration tests for row locking and database failures
//!
//! - membership changes racing with an admin move
//! - lock wait timeouts and failing statements as HTTP statuses

mod common;

#[cfg(test)]
mod membership_locking_tests {
    use super::common::*;
    use axum::http::StatusCode;
    use server::core::AppError;
    use server::repositories::MembershipConflict;
    use sqlx::MySqlPool;
    use std::time::Duration;

    async fn move_bob_to_team_2(tx: &mut sqlx::MySqlConnection) -> sqlx::Result<()> {
        sqlx::query("SELECT team_id FROM teams WHERE team_id IN (1, 2) ORDER BY team_id FOR UPDATE")
            .execute(&mut *tx)
            .await?;
        sqlx::query("SELECT user_id FROM users WHERE user_id = ? FOR UPDATE")
            .bind(BOB_ID)
            .execute(&mut *tx)
            .await?;
        sqlx::query("UPDATE users SET team_id = 2 WHERE user_id = ?")
            .bind(BOB_ID)
            .execute(&mut *tx)
            .await?;
        sqlx::query("UPDATE teams SET points = 30 WHERE team_id = 1")
            .execute(&mut *tx)
            .await?;
        sqlx::query("UPDATE teams SET points = 35 WHERE team_id = 2")
            .execute(&mut *tx)
            .await?;
        Ok(())
    }

    // ============================================================
    // Team changes while waiting for locks
    // ============================================================

    #[sqlx::test(fixtures(path = "../fixtures", scripts("teams", "users")))]
    async fn test_leave_follows_a_concurrent_move(pool: MySqlPool) -> sqlx::Result<()> {
        let state = create_test_state(pool.clone());

        let mut mover = pool.begin().await?;
        move_bob_to_team_2(&mut mover).await?;

        let leaving = {
            let state = state.clone();
            tokio::spawn(async move { state.membership.leave_team(&BOB_ID).await })
        };
        tokio::time::sleep(Duration::from_millis(300)).await;
        mover.commit().await?;

        let left = leaving.await.expect("Leave task panicked")?;
        assert_eq!(left, Ok(2));

        // Bob left team 2, not the team he was in when the call started
        assert_eq!(team_row(&pool, 1).await, Some((30, false)));
        assert_eq!(team_row(&pool, 2).await, Some((15, false)));

        Ok(())
    }

    #[sqlx::test(fixtures(path = "../fixtures", scripts("teams", "users")))]
    async fn test_points_update_follows_a_concurrent_move(pool: MySqlPool) -> sqlx::Result<()> {
        let state = create_test_state(pool.clone());

        let mut mover = pool.begin().await?;
        move_bob_to_team_2(&mut mover).await?;

        let updating = {
            let state = state.clone();
            tokio::spawn(async move {
                let data = server::dtos::UpdateUserDTO {
                    points: Some(25),
                    ..Default::default()
                };
                state.membership.update_participant(&BOB_ID, &data).await
            })
        };
        tokio::time::sleep(Duration::from_millis(300)).await;
        mover.commit().await?;

        let updated = updating
            .await
            .expect("Update task panicked")?
            .expect("Update was refused");
        assert_eq!(updated.team_id, Some(2));
        assert_eq!(updated.points, 25);

        assert_eq!(team_row(&pool, 1).await, Some((30, false)));
        assert_eq!(team_row(&pool, 2).await, Some((40, false)));

        Ok(())
    }

    #[sqlx::test(fixtures(
        path = "../fixtures",
        scripts("teams", "users", "team_requests")
    ))]
    async fn test_accepting_two_invitations_at_once(pool: MySqlPool) -> sqlx::Result<()> {
        let state = create_test_state(pool.clone());

        // requests 1 and 2 both invite Dave
        let (first, second) = tokio::join!(
            state.membership.accept_request(&1),
            state.membership.accept_request(&2)
        );
        let outcomes = [first?, second?];

        let joined: Vec<i32> = outcomes
            .iter()
            .filter_map(|outcome| outcome.as_ref().ok().map(|request| request.team_id))
            .collect();
        assert_eq!(joined.len(), 1);
        assert!(outcomes.iter().any(|outcome| matches!(
            outcome,
            Err(MembershipConflict::NotPending | MembershipConflict::AlreadyInTeam)
        )));

        let (team_id,): (Option<i32>,) =
            sqlx::query_as("SELECT team_id FROM users WHERE user_id = ?")
                .bind(DAVE_ID)
                .fetch_one(&pool)
                .await?;
        assert_eq!(team_id, Some(joined[0]));

        Ok(())
    }

    // ============================================================
    // Database errors as HTTP statuses
    // ============================================================

    #[sqlx::test(fixtures(path = "../fixtures", scripts("teams", "users")))]
    async fn test_lock_wait_timeout_is_503(pool: MySqlPool) -> sqlx::Result<()> {
        let mut holder = pool.begin().await?;
        sqlx::query("SELECT team_id FROM teams WHERE team_id = 1 FOR UPDATE")
            .execute(&mut *holder)
            .await?;

        let mut waiter = pool.acquire().await?;
        sqlx::query("SET SESSION innodb_lock_wait_timeout = 1")
            .execute(&mut *waiter)
            .await?;
        let err = sqlx::query("UPDATE teams SET name = 'Night Hawks' WHERE team_id = 1")
            .execute(&mut *waiter)
            .await
            .expect_err("Update went through a held row lock");

        assert_eq!(
            AppError::from(err).status(),
            StatusCode::SERVICE_UNAVAILABLE
        );

        holder.rollback().await?;

        Ok(())
    }

    #[sqlx::test(fixtures(path = "../fixtures", scripts("teams", "users")))]
    async fn test_failing_statement_is_500(pool: MySqlPool) -> sqlx::Result<()> {
        let err = sqlx::query("SELECT * FROM scoreboard")
            .execute(&pool)
            .await
            .expect_err("Query on a missing table succeeded");

        let err = AppError::from(err);
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.message(), "Database error");

        Ok(())
    }
}
