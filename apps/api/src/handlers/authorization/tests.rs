use axum::Json;
use axum::extract::{Extension, State};
use chapter_application::{RoleAssignmentInput, RoleAssignmentRepository};
use chapter_core::AppError;
use chapter_domain::{EventId, RoleName, ScopeRef};

use crate::dto::AuthorizationCheckRequest;
use crate::handlers::test_support::{fixture, user};

use super::check_permissions_handler;

fn request(
    permissions: &[&str],
    chapter_id: Option<String>,
    event_id: Option<String>,
) -> AuthorizationCheckRequest {
    AuthorizationCheckRequest {
        permissions: permissions.iter().map(|value| (*value).to_owned()).collect(),
        chapter_id,
        event_id,
    }
}

#[tokio::test]
async fn chapter_organizer_results_follow_request_order() {
    let fixture = fixture().await;
    let organizer = user("Grace");
    let granted = fixture
        .store
        .assign_role(&RoleAssignmentInput {
            user_id: organizer.user_id(),
            scope: ScopeRef::Chapter(fixture.chapter_id),
            role_name: RoleName::new("organizer").unwrap_or_else(|_| unreachable!()),
        })
        .await;
    assert!(granted.is_ok());

    let response = check_permissions_handler(
        State(fixture.state.clone()),
        Extension(organizer),
        Json(request(
            &["chapter:delete", "event:create", "event:edit"],
            Some(fixture.chapter_id.to_string()),
            None,
        )),
    )
    .await;

    let Ok(Json(body)) = response else {
        panic!("check should succeed");
    };
    let results: Vec<(&str, bool)> = body
        .results
        .iter()
        .map(|result| (result.permission.as_str(), result.allowed))
        .collect();
    assert_eq!(
        results,
        vec![
            ("chapter:delete", false),
            ("event:create", true),
            ("event:edit", true),
        ]
    );
}

#[tokio::test]
async fn event_context_inherits_chapter_roles() {
    let fixture = fixture().await;
    let organizer = user("Grace");
    let _ = fixture
        .store
        .assign_role(&RoleAssignmentInput {
            user_id: organizer.user_id(),
            scope: ScopeRef::Chapter(fixture.chapter_id),
            role_name: RoleName::new("organizer").unwrap_or_else(|_| unreachable!()),
        })
        .await;

    let response = check_permissions_handler(
        State(fixture.state.clone()),
        Extension(organizer),
        Json(request(
            &["event:edit", "event:send-invite"],
            None,
            Some(fixture.event_id.to_string()),
        )),
    )
    .await;

    let allowed: Vec<bool> = response
        .map(|Json(body)| body.results.iter().map(|result| result.allowed).collect())
        .unwrap_or_default();
    assert_eq!(allowed, vec![true, false]);
}

#[tokio::test]
async fn unknown_event_is_rejected_as_invalid_context() {
    let fixture = fixture().await;

    let response = check_permissions_handler(
        State(fixture.state.clone()),
        Extension(user("Ada")),
        Json(request(
            &["event:edit"],
            None,
            Some(EventId::new().to_string()),
        )),
    )
    .await;

    assert!(matches!(response, Err(error) if matches!(error.0, AppError::InvalidContext(_))));
}

#[tokio::test]
async fn malformed_input_is_a_validation_error() {
    let fixture = fixture().await;

    let unknown_permission = check_permissions_handler(
        State(fixture.state.clone()),
        Extension(user("Ada")),
        Json(request(&["venue:burn"], None, None)),
    )
    .await;
    assert!(
        matches!(unknown_permission, Err(error) if matches!(error.0, AppError::Validation(_)))
    );

    let bad_chapter = check_permissions_handler(
        State(fixture.state.clone()),
        Extension(user("Ada")),
        Json(request(&["event:edit"], Some("not-a-uuid".to_owned()), None)),
    )
    .await;
    assert!(matches!(bad_chapter, Err(error) if matches!(error.0, AppError::Validation(_))));
}

#[tokio::test]
async fn user_without_roles_is_denied_everywhere() {
    let fixture = fixture().await;

    let response = check_permissions_handler(
        State(fixture.state.clone()),
        Extension(user("Ada")),
        Json(request(
            &["chapters:view", "rsvp:create"],
            Some(fixture.chapter_id.to_string()),
            None,
        )),
    )
    .await;

    let allowed: Vec<bool> = response
        .map(|Json(body)| body.results.iter().map(|result| result.allowed).collect())
        .unwrap_or_default();
    assert_eq!(allowed, vec![false, false]);
}
