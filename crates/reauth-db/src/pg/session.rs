//! PostgreSQL session repository implementation

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use crate::models::SessionRow;
use crate::repo::{CreateSession, SessionRepository};

/// PostgreSQL session repository
#[derive(Clone)]
pub struct PgSessionRepository {
    pool: PgPool,
}

impl PgSessionRepository {
    /// Create a new session repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create the `sessions` table if it does not exist
    pub async fn migrate(&self) -> DbResult<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS sessions (
                id            UUID PRIMARY KEY,
                mac_key       BYTEA  NOT NULL,
                created_at    BIGINT NOT NULL,
                valid_for_ms  BIGINT NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        tracing::debug!("sessions table ready");
        Ok(())
    }

    /// Underlying pool
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl SessionRepository for PgSessionRepository {
    async fn create(&self, session: CreateSession) -> DbResult<SessionRow> {
        let mut tx = self.pool.begin().await?;

        let row = sqlx::query_as::<_, SessionRow>(
            r#"
            INSERT INTO sessions (id, mac_key, created_at, valid_for_ms)
            VALUES ($1, $2, $3, $4)
            RETURNING id, mac_key, created_at, valid_for_ms
            "#,
        )
        .bind(session.id)
        .bind(&session.mac_key)
        .bind(session.created_at)
        .bind(session.valid_for_ms)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| DbError::from_insert(session.id, e))?;

        tx.commit().await?;
        Ok(row)
    }

    async fn find_by_id(&self, id: Uuid) -> DbResult<Option<SessionRow>> {
        let mut tx = self.pool.begin().await?;

        let session = sqlx::query_as::<_, SessionRow>(
            r#"
            SELECT id, mac_key, created_at, valid_for_ms
            FROM sessions
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(session)
    }

    async fn existing_ids(&self, ids: &[Uuid]) -> DbResult<Vec<Uuid>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let rows: Vec<(Uuid,)> = sqlx::query_as("SELECT id FROM sessions WHERE id = ANY($1)")
            .bind(ids)
            .fetch_all(&self.pool)
            .await?;

        Ok(rows.into_iter().map(|(id,)| id).collect())
    }

    async fn delete(&self, id: Uuid) -> DbResult<bool> {
        let mut tx = self.pool.begin().await?;

        let result = sqlx::query("DELETE FROM sessions WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(result.rows_affected() > 0)
    }

    async fn count(&self) -> DbResult<i64> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM sessions")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}
