//! Infrastructure adapters for application ports.

#![forbid(unsafe_code)]

mod in_memory_authorization_store;
mod postgres_audit_repository;
mod postgres_role_assignment_repository;
mod postgres_scope_directory;

pub use in_memory_authorization_store::InMemoryAuthorizationStore;
pub use postgres_audit_repository::PostgresAuditRepository;
pub use postgres_role_assignment_repository::PostgresRoleAssignmentRepository;
pub use postgres_scope_directory::PostgresScopeDirectory;
