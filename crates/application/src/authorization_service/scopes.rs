use chapter_domain::{ChapterId, EventId, ScopeContext};
use tracing::warn;

use super::*;

impl AuthorizationService {
    /// Resolves the scope chain a request is evaluated on, outermost first.
    ///
    /// An event resolves through its parent chapter; an event whose chapter
    /// cannot be determined is an invalid context, never a silent narrowing.
    pub async fn resolve_scopes(&self, context: ScopeContext) -> AppResult<Vec<ScopeRef>> {
        self.resolve_scopes_before(context, self.default_deadline())
            .await
    }

    pub(super) async fn resolve_scopes_before(
        &self,
        context: ScopeContext,
        deadline: Instant,
    ) -> AppResult<Vec<ScopeRef>> {
        match (context.chapter_id, context.event_id) {
            (None, None) => Ok(vec![ScopeRef::Instance]),
            (Some(chapter_id), None) => {
                Ok(vec![ScopeRef::Instance, ScopeRef::Chapter(chapter_id)])
            }
            (claimed_chapter_id, Some(event_id)) => {
                let chapter_id = self.parent_chapter_before(event_id, deadline).await?;

                if let Some(claimed_chapter_id) = claimed_chapter_id
                    && claimed_chapter_id != chapter_id
                {
                    warn!(%event_id, %claimed_chapter_id, %chapter_id, "event does not belong to the requested chapter");
                    return Err(AppError::InvalidContext(format!(
                        "event '{event_id}' does not belong to chapter '{claimed_chapter_id}'"
                    )));
                }

                Ok(vec![
                    ScopeRef::Instance,
                    ScopeRef::Chapter(chapter_id),
                    ScopeRef::Event(event_id),
                ])
            }
        }
    }

    async fn parent_chapter_before(
        &self,
        event_id: EventId,
        deadline: Instant,
    ) -> AppResult<ChapterId> {
        let parent = timeout_at(deadline, self.scope_directory.parent_chapter_of(event_id))
            .await
            .map_err(|_| {
                warn!(%event_id, "event parent lookup exceeded its deadline");
                AppError::LookupTimeout(format!(
                    "parent chapter lookup for event '{event_id}' exceeded its deadline"
                ))
            })??;

        parent.ok_or_else(|| {
            warn!(%event_id, "event has no resolvable parent chapter");
            AppError::InvalidContext(format!(
                "event '{event_id}' has no resolvable parent chapter"
            ))
        })
    }
}
