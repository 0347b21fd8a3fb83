use super::*;

impl PostgresRoleAssignmentRepository {
    /// Reads every requested tier in one statement so the result is a single
    /// snapshot.
    pub(super) async fn memberships_of_impl(
        &self,
        user_id: UserId,
        scopes: &[ScopeRef],
    ) -> AppResult<ScopeMemberships> {
        let include_instance = scopes.contains(&ScopeRef::Instance);
        let mut chapter_ids = Vec::new();
        let mut event_ids = Vec::new();
        for scope in scopes {
            match scope {
                ScopeRef::Instance => {}
                ScopeRef::Chapter(chapter_id) => chapter_ids.push(chapter_id.as_uuid()),
                ScopeRef::Event(event_id) => event_ids.push(event_id.as_uuid()),
            }
        }

        let rows = sqlx::query_as::<_, ScopedRoleRow>(
            r#"
            SELECT tier, chapter_id, event_id, role_name
            FROM role_assignments
            WHERE user_id = $1
                AND (
                    ($2 AND tier = 'instance')
                    OR (tier = 'chapter' AND chapter_id = ANY($3))
                    OR (tier = 'event' AND event_id = ANY($4))
                )
            "#,
        )
        .bind(user_id.as_uuid())
        .bind(include_instance)
        .bind(chapter_ids)
        .bind(event_ids)
        .fetch_all(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!(
                "failed to load memberships for user '{user_id}': {error}"
            ))
        })?;

        let mut memberships = ScopeMemberships::covering(scopes);
        for row in rows {
            let scope = decode_scope(row.tier.as_str(), row.chapter_id, row.event_id)?;
            memberships.insert(scope, decode_role_name(row.role_name.as_str())?);
        }

        Ok(memberships)
    }
}
