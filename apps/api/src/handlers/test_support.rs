use std::sync::Arc;

use chapter_application::{AuthorizationService, RoleAdminService};
use chapter_core::{UserId, UserIdentity};
use chapter_domain::{ChapterId, EventId, RoleCatalog};
use chapter_infrastructure::InMemoryAuthorizationStore;

use crate::state::AppState;

/// In-memory state with one chapter holding one event.
pub(crate) struct Fixture {
    pub state: AppState,
    pub store: Arc<InMemoryAuthorizationStore>,
    pub chapter_id: ChapterId,
    pub event_id: EventId,
}

pub(crate) async fn fixture() -> Fixture {
    let store = Arc::new(InMemoryAuthorizationStore::new());
    let chapter_id = ChapterId::new();
    let event_id = EventId::new();
    store.add_chapter(chapter_id).await;
    assert!(store.add_event(event_id, chapter_id).await.is_ok());

    let authorization_service = AuthorizationService::new(
        Arc::new(RoleCatalog::standard()),
        store.clone(),
        store.clone(),
    );
    let role_admin_service = RoleAdminService::new(
        authorization_service.clone(),
        store.clone(),
        store.clone(),
        store.clone(),
    );

    Fixture {
        state: AppState {
            authorization_service,
            role_admin_service,
            frontend_url: "http://localhost:3000".to_owned(),
            bootstrap_token: "bootstrap-token".to_owned(),
        },
        store,
        chapter_id,
        event_id,
    }
}

pub(crate) fn user(name: &str) -> UserIdentity {
    UserIdentity::new(UserId::new(), name, None)
}
