use async_trait::async_trait;
use sqlx::PgPool;

use chapter_application::ScopeDirectory;
use chapter_core::{AppError, AppResult};
use chapter_domain::{ChapterId, EventId, ScopeRef};

/// PostgreSQL-backed lookup of the chapter/event hierarchy.
#[derive(Clone)]
pub struct PostgresScopeDirectory {
    pool: PgPool,
}

impl PostgresScopeDirectory {
    /// Creates a directory with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ScopeDirectory for PostgresScopeDirectory {
    async fn parent_chapter_of(&self, event_id: EventId) -> AppResult<Option<ChapterId>> {
        let chapter_id = sqlx::query_scalar::<_, uuid::Uuid>(
            r#"
            SELECT chapter_id
            FROM events
            WHERE id = $1
            "#,
        )
        .bind(event_id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!(
                "failed to resolve parent chapter of event '{event_id}': {error}"
            ))
        })?;

        Ok(chapter_id.map(ChapterId::from_uuid))
    }

    async fn scope_exists(&self, scope: ScopeRef) -> AppResult<bool> {
        let (query, id) = match scope {
            ScopeRef::Instance => return Ok(true),
            ScopeRef::Chapter(chapter_id) => (
                "SELECT EXISTS (SELECT 1 FROM chapters WHERE id = $1)",
                chapter_id.as_uuid(),
            ),
            ScopeRef::Event(event_id) => (
                "SELECT EXISTS (SELECT 1 FROM events WHERE id = $1)",
                event_id.as_uuid(),
            ),
        };

        sqlx::query_scalar::<_, bool>(query)
            .bind(id)
            .fetch_one(&self.pool)
            .await
            .map_err(|error| {
                AppError::Internal(format!("failed to resolve scope '{scope}': {error}"))
            })
    }
}
