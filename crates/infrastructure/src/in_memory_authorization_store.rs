use std::collections::{BTreeMap, HashMap, HashSet};

use async_trait::async_trait;
use chapter_application::{
    AuditEvent, AuditRepository, MembershipRepository, RoleAssignment, RoleAssignmentInput,
    RoleAssignmentRepository, ScopeDirectory,
};
use chapter_core::{AppError, AppResult, UserId};
use chapter_domain::{ChapterId, EventId, RoleName, ScopeMemberships, ScopeRef, ScopeTier};
use chrono::{SecondsFormat, Utc};
use tokio::sync::RwLock;

#[cfg(test)]
mod tests;

type AssignmentKey = (UserId, ScopeRef, RoleName);

#[derive(Debug, Default)]
struct StoreState {
    chapters: HashSet<ChapterId>,
    events: HashMap<EventId, ChapterId>,
    assignments: BTreeMap<AssignmentKey, String>,
    audit_events: Vec<AuditEvent>,
}

/// In-memory scope, role assignment and audit store.
///
/// All state sits behind one lock so a membership read is a consistent
/// snapshot of every tier.
#[derive(Debug, Default)]
pub struct InMemoryAuthorizationStore {
    state: RwLock<StoreState>,
}

impl InMemoryAuthorizationStore {
    /// Creates an empty in-memory store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a chapter.
    pub async fn add_chapter(&self, chapter_id: ChapterId) {
        self.state.write().await.chapters.insert(chapter_id);
    }

    /// Registers an event under an existing chapter.
    pub async fn add_event(&self, event_id: EventId, chapter_id: ChapterId) -> AppResult<()> {
        let mut state = self.state.write().await;
        if !state.chapters.contains(&chapter_id) {
            return Err(AppError::NotFound(format!(
                "chapter '{chapter_id}' was not found"
            )));
        }

        state.events.insert(event_id, chapter_id);
        Ok(())
    }

    /// Deletes a chapter with its events and every assignment scoped to them.
    pub async fn delete_chapter(&self, chapter_id: ChapterId) -> AppResult<()> {
        let mut state = self.state.write().await;
        if !state.chapters.remove(&chapter_id) {
            return Err(AppError::NotFound(format!(
                "chapter '{chapter_id}' was not found"
            )));
        }

        let removed_events: HashSet<EventId> = state
            .events
            .iter()
            .filter_map(|(event_id, parent)| (*parent == chapter_id).then_some(*event_id))
            .collect();
        state
            .events
            .retain(|event_id, _| !removed_events.contains(event_id));
        state.assignments.retain(|(_, scope, _), _| match scope {
            ScopeRef::Instance => true,
            ScopeRef::Chapter(id) => *id != chapter_id,
            ScopeRef::Event(id) => !removed_events.contains(id),
        });

        Ok(())
    }

    /// Deletes an event and every assignment scoped to it.
    pub async fn delete_event(&self, event_id: EventId) -> AppResult<()> {
        let mut state = self.state.write().await;
        if state.events.remove(&event_id).is_none() {
            return Err(AppError::NotFound(format!("event '{event_id}' was not found")));
        }

        state
            .assignments
            .retain(|(_, scope, _), _| *scope != ScopeRef::Event(event_id));
        Ok(())
    }

    /// Returns a copy of every appended audit event, oldest first.
    pub async fn audit_events(&self) -> Vec<AuditEvent> {
        self.state.read().await.audit_events.clone()
    }
}

#[async_trait]
impl ScopeDirectory for InMemoryAuthorizationStore {
    async fn parent_chapter_of(&self, event_id: EventId) -> AppResult<Option<ChapterId>> {
        Ok(self.state.read().await.events.get(&event_id).copied())
    }

    async fn scope_exists(&self, scope: ScopeRef) -> AppResult<bool> {
        let state = self.state.read().await;
        Ok(match scope {
            ScopeRef::Instance => true,
            ScopeRef::Chapter(chapter_id) => state.chapters.contains(&chapter_id),
            ScopeRef::Event(event_id) => state.events.contains_key(&event_id),
        })
    }
}

#[async_trait]
impl MembershipRepository for InMemoryAuthorizationStore {
    async fn memberships_of(
        &self,
        user_id: UserId,
        scopes: &[ScopeRef],
    ) -> AppResult<ScopeMemberships> {
        let state = self.state.read().await;

        let mut memberships = ScopeMemberships::covering(scopes);
        for (stored_user, scope, role) in state.assignments.keys() {
            if *stored_user == user_id && scopes.contains(scope) {
                memberships.insert(*scope, role.clone());
            }
        }

        Ok(memberships)
    }
}

#[async_trait]
impl RoleAssignmentRepository for InMemoryAuthorizationStore {
    async fn assign_role(&self, input: &RoleAssignmentInput) -> AppResult<bool> {
        let mut state = self.state.write().await;
        let key = (input.user_id, input.scope, input.role_name.clone());
        if state.assignments.contains_key(&key) {
            return Ok(false);
        }

        state.assignments.insert(
            key,
            Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true),
        );
        Ok(true)
    }

    async fn remove_role(&self, input: &RoleAssignmentInput) -> AppResult<()> {
        let key = (input.user_id, input.scope, input.role_name.clone());
        if self.state.write().await.assignments.remove(&key).is_none() {
            return Err(AppError::NotFound(format!(
                "role assignment '{}:{}:{}' was not found",
                input.user_id, input.scope, input.role_name
            )));
        }

        Ok(())
    }

    async fn list_roles_for_user(&self, user_id: UserId) -> AppResult<Vec<RoleAssignment>> {
        Ok(self
            .state
            .read()
            .await
            .assignments
            .iter()
            .filter(|((stored_user, _, _), _)| *stored_user == user_id)
            .map(|((stored_user, scope, role_name), assigned_at)| RoleAssignment {
                user_id: *stored_user,
                scope: *scope,
                role_name: role_name.clone(),
                assigned_at: assigned_at.clone(),
            })
            .collect())
    }

    async fn list_assigned_roles(&self) -> AppResult<Vec<(ScopeTier, RoleName)>> {
        let state = self.state.read().await;
        let mut pairs: Vec<(ScopeTier, RoleName)> = state
            .assignments
            .keys()
            .map(|(_, scope, role)| (scope.tier(), role.clone()))
            .collect();
        pairs.sort();
        pairs.dedup();
        Ok(pairs)
    }
}

#[async_trait]
impl AuditRepository for InMemoryAuthorizationStore {
    async fn append_event(&self, event: AuditEvent) -> AppResult<()> {
        self.state.write().await.audit_events.push(event);
        Ok(())
    }
}
