use std::sync::Arc;
use std::time::Duration;

use chapter_core::{AppError, AppResult, UserId};
use chapter_domain::{RoleCatalog, ScopeMemberships, ScopeRef};
use tokio::time::{Instant, timeout_at};
use tracing::warn;

use crate::{MembershipRepository, ScopeDirectory};

mod permissions;
mod scopes;


/// Default bound for storage reads made during one authorization check.
pub const DEFAULT_LOOKUP_TIMEOUT: Duration = Duration::from_secs(2);

/// Application service for scope-aware authorization checks.
///
/// Each check resolves the scope chain, reads the user's memberships once and
/// evaluates them against the role catalog. Nothing is cached between checks.
#[derive(Clone)]
pub struct AuthorizationService {
    catalog: Arc<RoleCatalog>,
    scope_directory: Arc<dyn ScopeDirectory>,
    membership_repository: Arc<dyn MembershipRepository>,
    lookup_timeout: Duration,
}

impl AuthorizationService {
    /// Creates a new authorization service from a catalog and storage ports.
    #[must_use]
    pub fn new(
        catalog: Arc<RoleCatalog>,
        scope_directory: Arc<dyn ScopeDirectory>,
        membership_repository: Arc<dyn MembershipRepository>,
    ) -> Self {
        Self {
            catalog,
            scope_directory,
            membership_repository,
            lookup_timeout: DEFAULT_LOOKUP_TIMEOUT,
        }
    }

    /// Overrides the storage lookup bound used by `ensure` and `has_permission`.
    #[must_use]
    pub fn with_lookup_timeout(mut self, lookup_timeout: Duration) -> Self {
        self.lookup_timeout = lookup_timeout;
        self
    }

    /// Returns the role catalog checks are evaluated against.
    #[must_use]
    pub fn catalog(&self) -> &RoleCatalog {
        self.catalog.as_ref()
    }

    fn default_deadline(&self) -> Instant {
        Instant::now() + self.lookup_timeout
    }

    async fn lookup_memberships(
        &self,
        user_id: UserId,
        scopes: &[ScopeRef],
        deadline: Instant,
    ) -> AppResult<ScopeMemberships> {
        timeout_at(
            deadline,
            self.membership_repository.memberships_of(user_id, scopes),
        )
        .await
        .map_err(|_| {
            warn!(%user_id, "role membership lookup exceeded its deadline");
            AppError::LookupTimeout(format!(
                "role membership lookup for user '{user_id}' exceeded its deadline"
            ))
        })?
    }
}
