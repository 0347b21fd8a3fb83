use std::path::Path;
use std::sync::Arc;

use chapter_application::{AuthorizationService, RoleAdminService};
use chapter_core::AppError;
use chapter_domain::RoleCatalog;
use chapter_infrastructure::{
    PostgresAuditRepository, PostgresRoleAssignmentRepository, PostgresScopeDirectory,
};
use sqlx::PgPool;
use tracing::info;

use crate::api_config::ApiConfig;
use crate::state::AppState;

pub async fn build_app_state(pool: PgPool, config: &ApiConfig) -> Result<AppState, AppError> {
    let catalog = match &config.role_catalog_path {
        Some(path) => load_role_catalog(path)?,
        None => RoleCatalog::standard(),
    };
    info!(roles = catalog.len(), "role catalog loaded");

    let scope_directory = Arc::new(PostgresScopeDirectory::new(pool.clone()));
    let role_assignment_repository = Arc::new(PostgresRoleAssignmentRepository::new(pool.clone()));
    let audit_repository = Arc::new(PostgresAuditRepository::new(pool));

    let authorization_service = AuthorizationService::new(
        Arc::new(catalog),
        scope_directory.clone(),
        role_assignment_repository.clone(),
    )
    .with_lookup_timeout(config.lookup_timeout);
    let role_admin_service = RoleAdminService::new(
        authorization_service.clone(),
        scope_directory,
        role_assignment_repository,
        audit_repository,
    );

    role_admin_service.validate_persisted_assignments().await?;
    if let Some(user_id) = config.bootstrap_admin_user_id {
        role_admin_service.bootstrap_instance_admin(user_id).await?;
    }

    Ok(AppState {
        authorization_service,
        role_admin_service,
        frontend_url: config.frontend_url.clone(),
        bootstrap_token: config.bootstrap_token.clone(),
    })
}

/// Reads a JSON role catalog document from disk.
fn load_role_catalog(path: &Path) -> Result<RoleCatalog, AppError> {
    let document = std::fs::read_to_string(path).map_err(|error| {
        AppError::Internal(format!(
            "failed to read role catalog '{}': {error}",
            path.display()
        ))
    })?;

    RoleCatalog::from_json(document.as_str())
}
