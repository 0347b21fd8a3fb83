//! Application services and ports.

#![forbid(unsafe_code)]

mod audit_ports;
mod authorization_ports;
mod authorization_service;
mod role_admin_service;

pub use audit_ports::{AuditEvent, AuditRepository};
pub use authorization_ports::{
    MembershipRepository, RoleAssignment, RoleAssignmentInput, RoleAssignmentRepository,
    ScopeDirectory,
};
pub use authorization_service::{AuthorizationService, DEFAULT_LOOKUP_TIMEOUT};
pub use role_admin_service::{CatalogRole, RoleAdminService};
