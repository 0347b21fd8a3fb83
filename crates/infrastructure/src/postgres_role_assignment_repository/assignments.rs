use super::*;

impl PostgresRoleAssignmentRepository {
    pub(super) async fn assign_role_impl(&self, input: &RoleAssignmentInput) -> AppResult<bool> {
        let (tier, chapter_id, event_id) = scope_columns(input.scope);

        let rows_affected = sqlx::query(
            r#"
            INSERT INTO role_assignments (user_id, tier, chapter_id, event_id, role_name)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT DO NOTHING
            "#,
        )
        .bind(input.user_id.as_uuid())
        .bind(tier)
        .bind(chapter_id)
        .bind(event_id)
        .bind(input.role_name.as_str())
        .execute(&self.pool)
        .await
        .map_err(|error| map_scope_violation(error, input.scope))?
        .rows_affected();

        Ok(rows_affected > 0)
    }

    pub(super) async fn remove_role_impl(&self, input: &RoleAssignmentInput) -> AppResult<()> {
        let (tier, chapter_id, event_id) = scope_columns(input.scope);

        let rows_affected = sqlx::query(
            r#"
            DELETE FROM role_assignments
            WHERE user_id = $1
                AND tier = $2
                AND chapter_id IS NOT DISTINCT FROM $3
                AND event_id IS NOT DISTINCT FROM $4
                AND role_name = $5
            "#,
        )
        .bind(input.user_id.as_uuid())
        .bind(tier)
        .bind(chapter_id)
        .bind(event_id)
        .bind(input.role_name.as_str())
        .execute(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to remove role assignment: {error}")))?
        .rows_affected();

        if rows_affected == 0 {
            return Err(AppError::NotFound(format!(
                "role assignment '{}:{}:{}' was not found",
                input.user_id, input.scope, input.role_name
            )));
        }

        Ok(())
    }

    pub(super) async fn list_roles_for_user_impl(
        &self,
        user_id: UserId,
    ) -> AppResult<Vec<RoleAssignment>> {
        let rows = sqlx::query_as::<_, RoleAssignmentRow>(
            r#"
            SELECT
                user_id,
                tier,
                chapter_id,
                event_id,
                role_name,
                to_char(created_at AT TIME ZONE 'UTC', 'YYYY-MM-DD"T"HH24:MI:SS"Z"') AS assigned_at
            FROM role_assignments
            WHERE user_id = $1
            ORDER BY tier, chapter_id NULLS FIRST, event_id NULLS FIRST, role_name
            "#,
        )
        .bind(user_id.as_uuid())
        .fetch_all(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to list role assignments: {error}")))?;

        rows.into_iter()
            .map(|row| {
                Ok(RoleAssignment {
                    user_id: UserId::from_uuid(row.user_id),
                    scope: decode_scope(row.tier.as_str(), row.chapter_id, row.event_id)?,
                    role_name: decode_role_name(row.role_name.as_str())?,
                    assigned_at: row.assigned_at,
                })
            })
            .collect()
    }

    pub(super) async fn list_assigned_roles_impl(&self) -> AppResult<Vec<(ScopeTier, RoleName)>> {
        let rows = sqlx::query_as::<_, AssignedRoleRow>(
            r#"
            SELECT DISTINCT tier, role_name
            FROM role_assignments
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to list assigned roles: {error}")))?;

        let mut pairs = rows
            .into_iter()
            .map(|row| {
                Ok((
                    decode_tier(row.tier.as_str())?,
                    decode_role_name(row.role_name.as_str())?,
                ))
            })
            .collect::<AppResult<Vec<_>>>()?;
        pairs.sort();
        Ok(pairs)
    }
}

/// Foreign-key violations mean the chapter or event vanished before the insert.
fn map_scope_violation(error: sqlx::Error, scope: ScopeRef) -> AppError {
    if let sqlx::Error::Database(database_error) = &error
        && database_error.code().as_deref() == Some("23503")
    {
        return AppError::NotFound(format!("scope '{scope}' was not found"));
    }

    AppError::Internal(format!("failed to assign role: {error}"))
}
