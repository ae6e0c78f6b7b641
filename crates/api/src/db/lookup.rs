//! Reference data (states lookup).

use sqlx::PgPool;

use super::RepositoryError;
use crate::models::StateRecord;

/// Read-only access to the `states` lookup table.
pub struct StateRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> StateRepository<'a> {
    /// Create a new state repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List all active states in storage order.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_active(&self) -> Result<Vec<StateRecord>, RepositoryError> {
        let states = sqlx::query_as::<_, StateRecord>(
            r"
            SELECT state_title AS title, state_code AS code, state_flag AS flag
            FROM states
            WHERE state_status = TRUE
            ORDER BY state_id
            ",
        )
        .fetch_all(self.pool)
        .await?;

        Ok(states)
    }

    /// Insert or refresh a state by code. Used by the seeding CLI.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the statement fails.
    pub async fn upsert(&self, state: &StateRecord, active: bool) -> Result<(), RepositoryError> {
        sqlx::query(
            r"
            INSERT INTO states (state_title, state_code, state_flag, state_status)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (state_code) DO UPDATE
            SET state_title = EXCLUDED.state_title,
                state_flag = EXCLUDED.state_flag,
                state_status = EXCLUDED.state_status
            ",
        )
        .bind(&state.title)
        .bind(&state.code)
        .bind(&state.flag)
        .bind(active)
        .execute(self.pool)
        .await?;

        Ok(())
    }
}
