use std::sync::Arc;

use chapter_application::{
    AuthorizationService, MembershipRepository, RoleAssignmentInput, RoleAssignmentRepository,
    ScopeDirectory,
};
use chapter_core::{AppError, UserId};
use chapter_domain::{
    ChapterId, EventId, Permission, RoleCatalog, RoleName, ScopeContext, ScopeRef, ScopeTier,
};

use super::InMemoryAuthorizationStore;

fn input(user_id: UserId, scope: ScopeRef, role: &str) -> RoleAssignmentInput {
    RoleAssignmentInput {
        user_id,
        scope,
        role_name: RoleName::new(role).unwrap_or_else(|_| unreachable!()),
    }
}

async fn store_with_event() -> (Arc<InMemoryAuthorizationStore>, ChapterId, EventId) {
    let store = Arc::new(InMemoryAuthorizationStore::new());
    let chapter_id = ChapterId::new();
    let event_id = EventId::new();
    store.add_chapter(chapter_id).await;
    let added = store.add_event(event_id, chapter_id).await;
    assert!(added.is_ok());
    (store, chapter_id, event_id)
}

#[tokio::test]
async fn memberships_cover_requested_scopes_only() {
    let (store, chapter_id, event_id) = store_with_event().await;
    let user_id = UserId::new();
    let other_chapter = ScopeRef::Chapter(ChapterId::new());

    for assignment in [
        input(user_id, ScopeRef::Instance, "member"),
        input(user_id, ScopeRef::Chapter(chapter_id), "organizer"),
        input(user_id, ScopeRef::Event(event_id), "attendee"),
        input(user_id, other_chapter, "administrator"),
        input(UserId::new(), ScopeRef::Chapter(chapter_id), "administrator"),
    ] {
        assert_eq!(store.assign_role(&assignment).await.ok(), Some(true));
    }

    let scopes = [ScopeRef::Instance, ScopeRef::Chapter(chapter_id)];
    let memberships = store.memberships_of(user_id, &scopes).await;
    assert!(memberships.is_ok());
    let memberships = memberships.unwrap_or_default();

    let chapter_roles: Vec<&str> = memberships
        .roles_at(&ScopeRef::Chapter(chapter_id))
        .map(RoleName::as_str)
        .collect();
    assert_eq!(chapter_roles, vec!["organizer"]);
    assert_eq!(memberships.roles_at(&other_chapter).count(), 0);
    assert_eq!(memberships.roles_at(&ScopeRef::Event(event_id)).count(), 0);
}

#[tokio::test]
async fn duplicate_assignment_is_reported_as_existing() {
    let store = InMemoryAuthorizationStore::new();
    let assignment = input(UserId::new(), ScopeRef::Instance, "member");

    assert_eq!(store.assign_role(&assignment).await.ok(), Some(true));
    assert_eq!(store.assign_role(&assignment).await.ok(), Some(false));
}

#[tokio::test]
async fn removing_missing_assignment_is_not_found() {
    let store = InMemoryAuthorizationStore::new();
    let result = store
        .remove_role(&input(UserId::new(), ScopeRef::Instance, "member"))
        .await;
    assert!(matches!(result, Err(AppError::NotFound(_))));
}

#[tokio::test]
async fn event_requires_existing_chapter() {
    let store = InMemoryAuthorizationStore::new();
    let result = store.add_event(EventId::new(), ChapterId::new()).await;
    assert!(matches!(result, Err(AppError::NotFound(_))));
}

#[tokio::test]
async fn deleting_chapter_cascades_to_events_and_assignments() {
    let (store, chapter_id, event_id) = store_with_event().await;
    let user_id = UserId::new();
    let _ = store
        .assign_role(&input(user_id, ScopeRef::Instance, "member"))
        .await;
    let _ = store
        .assign_role(&input(user_id, ScopeRef::Chapter(chapter_id), "organizer"))
        .await;
    let _ = store
        .assign_role(&input(user_id, ScopeRef::Event(event_id), "attendee"))
        .await;

    assert!(store.delete_chapter(chapter_id).await.is_ok());

    assert_eq!(store.parent_chapter_of(event_id).await.ok(), Some(None));
    let remaining = store.list_roles_for_user(user_id).await.unwrap_or_default();
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0].scope, ScopeRef::Instance);
}

#[tokio::test]
async fn deleted_event_becomes_an_invalid_context() {
    let (store, chapter_id, event_id) = store_with_event().await;
    let user_id = UserId::new();
    let _ = store
        .assign_role(&input(user_id, ScopeRef::Event(event_id), "organizer"))
        .await;
    let service = AuthorizationService::new(
        Arc::new(RoleCatalog::standard()),
        store.clone(),
        store.clone(),
    );
    let context = ScopeContext::event(event_id);

    assert!(
        service
            .ensure(user_id, Permission::EventSendInvite, context)
            .await
            .is_ok()
    );

    assert!(store.delete_event(event_id).await.is_ok());

    let result = service
        .ensure(user_id, Permission::EventSendInvite, context)
        .await;
    assert!(matches!(result, Err(AppError::InvalidContext(_))));
    assert_eq!(
        store.scope_exists(ScopeRef::Chapter(chapter_id)).await.ok(),
        Some(true)
    );
    assert!(store.list_roles_for_user(user_id).await.unwrap_or_default().is_empty());
}

#[tokio::test]
async fn assigned_roles_are_distinct_pairs() {
    let store = InMemoryAuthorizationStore::new();
    let _ = store
        .assign_role(&input(UserId::new(), ScopeRef::Instance, "member"))
        .await;
    let _ = store
        .assign_role(&input(UserId::new(), ScopeRef::Instance, "member"))
        .await;

    let pairs = store.list_assigned_roles().await.unwrap_or_default();
    assert_eq!(
        pairs,
        vec![(
            ScopeTier::Instance,
            RoleName::new("member").unwrap_or_else(|_| unreachable!())
        )]
    );
}
