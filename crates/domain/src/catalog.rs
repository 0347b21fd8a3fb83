//! Static role catalog: role names and their permission sets per tier.
//!
//! The catalog is built once at startup and never mutated afterwards. A role
//! is identified by `(tier, name)`, so an instance `administrator` and a
//! chapter `administrator` are unrelated entries.

use std::collections::{BTreeMap, BTreeSet};
use std::str::FromStr;

use chapter_core::{AppError, AppResult};
use serde::Deserialize;

use crate::scope::ScopeTier;
use crate::security::{Permission, RoleName};

/// Immutable lookup table from `(tier, role)` to permissions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoleCatalog {
    roles: BTreeMap<(ScopeTier, RoleName), BTreeSet<Permission>>,
}

/// One enumerated catalog entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoleCatalogEntry<'a> {
    /// Tier the role is defined for.
    pub tier: ScopeTier,
    /// Role name within the tier.
    pub name: &'a RoleName,
    /// Permissions granted by the role.
    pub permissions: &'a BTreeSet<Permission>,
}

impl RoleCatalog {
    /// Starts an empty catalog builder.
    #[must_use]
    pub fn builder() -> RoleCatalogBuilder {
        RoleCatalogBuilder::default()
    }

    /// Returns the built-in catalog seeded for new installations.
    #[must_use]
    pub fn standard() -> Self {
        use Permission::*;

        let chapter_administrator = [
            ChapterEdit,
            ChapterDelete,
            ChapterBanUser,
            ChapterUserRoleChange,
            EventCreate,
            EventEdit,
            EventDelete,
            EventSendInvite,
            EventSubscriptionManage,
            RsvpDelete,
            RsvpConfirm,
            SponsorView,
            VenueCreate,
            VenueEdit,
            VenueDelete,
            UsersView,
        ];

        let entries: [(ScopeTier, &'static str, &[Permission]); 7] = [
            (ScopeTier::Instance, "administrator", Permission::all()),
            (
                ScopeTier::Instance,
                "member",
                &[ChaptersView, ChapterJoin, RsvpCreate],
            ),
            (
                ScopeTier::Chapter,
                "administrator",
                &chapter_administrator,
            ),
            (ScopeTier::Chapter, "organizer", &[EventCreate, EventEdit]),
            (ScopeTier::Chapter, "member", &[RsvpCreate]),
            (
                ScopeTier::Event,
                "organizer",
                &[EventEdit, EventSendInvite, RsvpConfirm, RsvpDelete],
            ),
            (ScopeTier::Event, "attendee", &[EventSubscriptionManage]),
        ];

        let roles = entries
            .into_iter()
            .map(|(tier, name, permissions)| {
                (
                    (tier, RoleName::builtin(name)),
                    permissions.iter().copied().collect(),
                )
            })
            .collect();

        Self { roles }
    }

    /// Parses a catalog document.
    ///
    /// Expected shape:
    /// `{"roles": [{"tier": "chapter", "name": "organizer", "permissions": ["event:create"]}]}`
    pub fn from_json(document: &str) -> AppResult<Self> {
        let document: CatalogDocument = serde_json::from_str(document)
            .map_err(|error| AppError::Validation(format!("invalid role catalog: {error}")))?;

        let mut builder = Self::builder();
        for role in document.roles {
            let permissions = role
                .permissions
                .iter()
                .map(|value| Permission::from_str(value.as_str()))
                .collect::<AppResult<Vec<_>>>()?;
            builder = builder.role(role.tier, RoleName::new(role.name)?, permissions)?;
        }

        builder.build()
    }

    /// Returns the permissions granted by `role` at `tier`.
    pub fn permissions_of(
        &self,
        role: &RoleName,
        tier: ScopeTier,
    ) -> AppResult<&BTreeSet<Permission>> {
        self.roles
            .get(&(tier, role.clone()))
            .ok_or_else(|| AppError::UnknownRole(format!("{tier} role '{role}' is not defined")))
    }

    /// Returns whether `(tier, role)` is defined.
    #[must_use]
    pub fn contains(&self, role: &RoleName, tier: ScopeTier) -> bool {
        self.roles.contains_key(&(tier, role.clone()))
    }

    /// Lists role names defined for one tier, sorted by name.
    pub fn roles_for(&self, tier: ScopeTier) -> impl Iterator<Item = &RoleName> {
        self.roles
            .keys()
            .filter(move |(entry_tier, _)| *entry_tier == tier)
            .map(|(_, name)| name)
    }

    /// Enumerates every entry ordered by tier then name.
    pub fn entries(&self) -> impl Iterator<Item = RoleCatalogEntry<'_>> {
        self.roles
            .iter()
            .map(|((tier, name), permissions)| RoleCatalogEntry {
                tier: *tier,
                name,
                permissions,
            })
    }

    /// Checks that every persisted `(tier, role)` pair exists in the catalog.
    pub fn validate_assignments<'a>(
        &self,
        assignments: impl IntoIterator<Item = (ScopeTier, &'a RoleName)>,
    ) -> AppResult<()> {
        let missing: BTreeSet<String> = assignments
            .into_iter()
            .filter(|(tier, role)| !self.contains(role, *tier))
            .map(|(tier, role)| format!("{tier}:{role}"))
            .collect();

        if missing.is_empty() {
            return Ok(());
        }

        Err(AppError::UnknownRole(format!(
            "role assignments reference undefined roles: {}",
            missing.into_iter().collect::<Vec<_>>().join(", ")
        )))
    }

    /// Returns the number of defined roles across all tiers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.roles.len()
    }

    /// Returns true when no role is defined.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.roles.is_empty()
    }
}

impl Default for RoleCatalog {
    fn default() -> Self {
        Self::standard()
    }
}

/// Incremental catalog construction with duplicate detection.
#[derive(Debug, Default)]
pub struct RoleCatalogBuilder {
    roles: BTreeMap<(ScopeTier, RoleName), BTreeSet<Permission>>,
}

impl RoleCatalogBuilder {
    /// Adds one role definition.
    pub fn role(
        mut self,
        tier: ScopeTier,
        name: RoleName,
        permissions: impl IntoIterator<Item = Permission>,
    ) -> AppResult<Self> {
        let key = (tier, name);
        if self.roles.contains_key(&key) {
            return Err(AppError::Conflict(format!(
                "{} role '{}' is defined more than once",
                key.0, key.1
            )));
        }

        self.roles.insert(key, permissions.into_iter().collect());
        Ok(self)
    }

    /// Finishes the catalog.
    pub fn build(self) -> AppResult<RoleCatalog> {
        if self.roles.is_empty() {
            return Err(AppError::Validation(
                "role catalog must define at least one role".to_owned(),
            ));
        }

        Ok(RoleCatalog { roles: self.roles })
    }
}

#[derive(Debug, Deserialize)]
struct CatalogDocument {
    roles: Vec<CatalogDocumentRole>,
}

#[derive(Debug, Deserialize)]
struct CatalogDocumentRole {
    tier: ScopeTier,
    name: String,
    #[serde(default)]
    permissions: Vec<String>,
}
