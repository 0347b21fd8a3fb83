use std::fmt::{Display, Formatter};
use std::str::FromStr;

use chapter_core::{AppError, AppResult};
use serde::{Deserialize, Serialize};

/// Maximum accepted role name length.
pub const ROLE_NAME_MAX_LENGTH: usize = 64;

/// Capabilities enforced by authorization checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Permission {
    /// Allows creating chapters.
    ChapterCreate,
    /// Allows editing chapter details.
    ChapterEdit,
    /// Allows deleting chapters.
    ChapterDelete,
    /// Allows joining a chapter as a member.
    ChapterJoin,
    /// Allows banning users from a chapter.
    ChapterBanUser,
    /// Allows changing the chapter roles of other users.
    ChapterUserRoleChange,
    /// Allows listing chapters in the dashboard.
    ChaptersView,
    /// Allows creating events.
    EventCreate,
    /// Allows editing events.
    EventEdit,
    /// Allows deleting events.
    EventDelete,
    /// Allows sending event invitations.
    EventSendInvite,
    /// Allows managing event notification subscriptions.
    EventSubscriptionManage,
    /// Allows RSVPing to events.
    RsvpCreate,
    /// Allows removing RSVPs.
    RsvpDelete,
    /// Allows confirming waitlisted RSVPs.
    RsvpConfirm,
    /// Allows managing sponsors.
    SponsorManage,
    /// Allows viewing sponsors.
    SponsorView,
    /// Allows creating venues.
    VenueCreate,
    /// Allows editing venues.
    VenueEdit,
    /// Allows deleting venues.
    VenueDelete,
    /// Allows listing users and their roles.
    UsersView,
    /// Allows changing instance roles of users.
    UserInstanceRoleChange,
}

impl Permission {
    /// Returns a stable storage value for this permission.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ChapterCreate => "chapter:create",
            Self::ChapterEdit => "chapter:edit",
            Self::ChapterDelete => "chapter:delete",
            Self::ChapterJoin => "chapter:join",
            Self::ChapterBanUser => "chapter:ban-user",
            Self::ChapterUserRoleChange => "chapter:user-role-change",
            Self::ChaptersView => "chapters:view",
            Self::EventCreate => "event:create",
            Self::EventEdit => "event:edit",
            Self::EventDelete => "event:delete",
            Self::EventSendInvite => "event:send-invite",
            Self::EventSubscriptionManage => "event:subscription-manage",
            Self::RsvpCreate => "rsvp:create",
            Self::RsvpDelete => "rsvp:delete",
            Self::RsvpConfirm => "rsvp:confirm",
            Self::SponsorManage => "sponsor:manage",
            Self::SponsorView => "sponsor:view",
            Self::VenueCreate => "venue:create",
            Self::VenueEdit => "venue:edit",
            Self::VenueDelete => "venue:delete",
            Self::UsersView => "users:view",
            Self::UserInstanceRoleChange => "user:instance-role-change",
        }
    }

    /// Returns all known permissions.
    #[must_use]
    pub fn all() -> &'static [Self] {
        const ALL: &[Permission] = &[
            Permission::ChapterCreate,
            Permission::ChapterEdit,
            Permission::ChapterDelete,
            Permission::ChapterJoin,
            Permission::ChapterBanUser,
            Permission::ChapterUserRoleChange,
            Permission::ChaptersView,
            Permission::EventCreate,
            Permission::EventEdit,
            Permission::EventDelete,
            Permission::EventSendInvite,
            Permission::EventSubscriptionManage,
            Permission::RsvpCreate,
            Permission::RsvpDelete,
            Permission::RsvpConfirm,
            Permission::SponsorManage,
            Permission::SponsorView,
            Permission::VenueCreate,
            Permission::VenueEdit,
            Permission::VenueDelete,
            Permission::UsersView,
            Permission::UserInstanceRoleChange,
        ];

        ALL
    }

    /// Parses a transport value into a permission.
    pub fn from_transport(value: &str) -> Result<Self, AppError> {
        Self::from_str(value)
    }
}

impl Display for Permission {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        formatter.write_str(self.as_str())
    }
}

impl FromStr for Permission {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::all()
            .iter()
            .copied()
            .find(|permission| permission.as_str() == value)
            .ok_or_else(|| AppError::Validation(format!("unknown permission value '{value}'")))
    }
}

impl TryFrom<String> for Permission {
    type Error = AppError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::from_str(value.as_str())
    }
}

impl From<Permission> for String {
    fn from(value: Permission) -> Self {
        value.as_str().to_owned()
    }
}

/// Validated role name, unique within one scope tier.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct RoleName(String);

impl RoleName {
    /// Creates a role name, normalized to lowercase.
    ///
    /// Accepts ascii letters, digits, `_` and `-`.
    pub fn new(value: impl Into<String>) -> AppResult<Self> {
        let value = value.into().trim().to_ascii_lowercase();

        if value.is_empty() {
            return Err(AppError::Validation(
                "role name must not be empty".to_owned(),
            ));
        }

        if value.len() > ROLE_NAME_MAX_LENGTH {
            return Err(AppError::Validation(format!(
                "role name must not exceed {ROLE_NAME_MAX_LENGTH} characters"
            )));
        }

        if !value
            .chars()
            .all(|character| character.is_ascii_alphanumeric() || matches!(character, '_' | '-'))
        {
            return Err(AppError::Validation(format!(
                "role name '{value}' contains unsupported characters"
            )));
        }

        Ok(Self(value))
    }

    /// Role names for the built-in catalog, checked by tests.
    pub(crate) fn builtin(value: &'static str) -> Self {
        Self(value.to_owned())
    }

    /// Returns the role name as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl Display for RoleName {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        formatter.write_str(self.0.as_str())
    }
}

impl TryFrom<String> for RoleName {
    type Error = AppError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<RoleName> for String {
    fn from(value: RoleName) -> Self {
        value.0
    }
}

/// Stable audit actions emitted by application use-cases.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditAction {
    /// Emitted when a role is granted to a user at a scope.
    SecurityRoleAssigned,
    /// Emitted when a role is revoked from a user at a scope.
    SecurityRoleUnassigned,
    /// Emitted when the bootstrap administrator is seeded.
    SecurityBootstrapAdminSeeded,
}

impl AuditAction {
    /// Returns a stable storage value for this action.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::SecurityRoleAssigned => "security.role.assigned",
            Self::SecurityRoleUnassigned => "security.role.unassigned",
            Self::SecurityBootstrapAdminSeeded => "security.bootstrap_admin.seeded",
        }
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use super::{Permission, RoleName};

    #[test]
    fn permission_roundtrip_storage_value() {
        for permission in Permission::all() {
            let restored = Permission::from_str(permission.as_str());
            assert_eq!(restored.ok(), Some(*permission));
        }
    }

    #[test]
    fn unknown_permission_is_rejected() {
        let parsed = Permission::from_str("venue:burn");
        assert!(parsed.is_err());
    }

    #[test]
    fn permission_serializes_as_storage_value() {
        let encoded = serde_json::to_string(&Permission::EventCreate);
        assert_eq!(encoded.ok().as_deref(), Some("\"event:create\""));
    }

    #[test]
    fn role_name_is_normalized() {
        let role = RoleName::new("  Organizer ");
        assert_eq!(role.ok().map(String::from).as_deref(), Some("organizer"));
    }

    #[test]
    fn role_name_rejects_blank_and_symbols() {
        assert!(RoleName::new("   ").is_err());
        assert!(RoleName::new("chapter admin").is_err());
        assert!(RoleName::new("x".repeat(65)).is_err());
    }
}
