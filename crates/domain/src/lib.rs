//! Domain entities and invariants.

#![forbid(unsafe_code)]

mod authorization;
mod catalog;
mod scope;
mod security;

pub use authorization::{Decision, ScopeMemberships, effective_permissions, evaluate};
pub use catalog::{RoleCatalog, RoleCatalogBuilder, RoleCatalogEntry};
pub use scope::{ChapterId, EventId, ScopeContext, ScopeRef, ScopeTier};
pub use security::{AuditAction, Permission, ROLE_NAME_MAX_LENGTH, RoleName};
