//! Pure permission evaluation over resolved scopes and memberships.

use std::collections::{BTreeMap, BTreeSet};

use chapter_core::AppResult;
use serde::{Deserialize, Serialize};

use crate::catalog::RoleCatalog;
use crate::scope::ScopeRef;
use crate::security::{Permission, RoleName};

/// Outcome of one permission evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Decision {
    /// The requested permission is in the effective set.
    Allow,
    /// The requested permission is absent.
    Deny,
}

impl Decision {
    /// Returns true for `Allow`.
    #[must_use]
    pub fn is_allowed(&self) -> bool {
        matches!(self, Self::Allow)
    }
}

/// Roles one user holds, keyed by scope.
///
/// Scopes without roles are either absent or map to an empty set; both read
/// the same.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ScopeMemberships {
    roles: BTreeMap<ScopeRef, BTreeSet<RoleName>>,
}

impl ScopeMemberships {
    /// Creates an empty membership map.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a map with an empty entry for each scope.
    #[must_use]
    pub fn covering(scopes: &[ScopeRef]) -> Self {
        Self {
            roles: scopes
                .iter()
                .map(|scope| (*scope, BTreeSet::new()))
                .collect(),
        }
    }

    /// Records one role held at one scope.
    pub fn insert(&mut self, scope: ScopeRef, role: RoleName) {
        self.roles.entry(scope).or_default().insert(role);
    }

    /// Iterates roles held at `scope`.
    pub fn roles_at(&self, scope: &ScopeRef) -> impl Iterator<Item = &RoleName> {
        self.roles.get(scope).into_iter().flatten()
    }

    /// Iterates every scope and its roles.
    pub fn iter(&self) -> impl Iterator<Item = (&ScopeRef, &BTreeSet<RoleName>)> {
        self.roles.iter()
    }

    /// Returns true when no role is held anywhere.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.roles.values().all(BTreeSet::is_empty)
    }
}

impl FromIterator<(ScopeRef, RoleName)> for ScopeMemberships {
    fn from_iter<T: IntoIterator<Item = (ScopeRef, RoleName)>>(iter: T) -> Self {
        let mut memberships = Self::new();
        for (scope, role) in iter {
            memberships.insert(scope, role);
        }
        memberships
    }
}

/// Unions the permissions of every role held on the resolved scope chain.
///
/// Roles held at scopes outside `scopes` are ignored.
pub fn effective_permissions(
    catalog: &RoleCatalog,
    scopes: &[ScopeRef],
    memberships: &ScopeMemberships,
) -> AppResult<BTreeSet<Permission>> {
    let mut effective = BTreeSet::new();

    for scope in scopes {
        for role in memberships.roles_at(scope) {
            effective.extend(catalog.permissions_of(role, scope.tier())?);
        }
    }

    Ok(effective)
}

/// Decides whether `requested` is granted on the resolved scope chain.
pub fn evaluate(
    catalog: &RoleCatalog,
    requested: Permission,
    scopes: &[ScopeRef],
    memberships: &ScopeMemberships,
) -> AppResult<Decision> {
    let effective = effective_permissions(catalog, scopes, memberships)?;

    Ok(if effective.contains(&requested) {
        Decision::Allow
    } else {
        Decision::Deny
    })
}

#[cfg(test)]
mod tests {
    use chapter_core::AppError;
    use proptest::prelude::*;

    use super::{Decision, ScopeMemberships, effective_permissions, evaluate};
    use crate::catalog::RoleCatalog;
    use crate::scope::{ChapterId, EventId, ScopeRef, ScopeTier};
    use crate::security::{Permission, RoleName};

    fn role(value: &str) -> RoleName {
        RoleName::new(value).unwrap_or_else(|_| unreachable!())
    }

    #[test]
    fn empty_memberships_deny_everything() {
        let catalog = RoleCatalog::standard();
        let chapter = ScopeRef::Chapter(ChapterId::new());
        let scopes = [ScopeRef::Instance, chapter];

        for permission in Permission::all() {
            let decision = evaluate(&catalog, *permission, &scopes, &ScopeMemberships::new());
            assert_eq!(decision.ok(), Some(Decision::Deny));
        }
    }

    #[test]
    fn chapter_organizer_example() {
        let catalog = RoleCatalog::standard();
        let c7 = ScopeRef::Chapter(ChapterId::new());
        let c9 = ScopeRef::Chapter(ChapterId::new());
        let memberships = ScopeMemberships::from_iter([(c7, role("organizer"))]);

        let allowed = evaluate(
            &catalog,
            Permission::EventCreate,
            &[ScopeRef::Instance, c7],
            &memberships,
        );
        let other_chapter = evaluate(
            &catalog,
            Permission::EventCreate,
            &[ScopeRef::Instance, c9],
            &memberships,
        );
        let missing = evaluate(
            &catalog,
            Permission::VenueDelete,
            &[ScopeRef::Instance, c7],
            &memberships,
        );

        assert_eq!(allowed.ok(), Some(Decision::Allow));
        assert_eq!(other_chapter.ok(), Some(Decision::Deny));
        assert_eq!(missing.ok(), Some(Decision::Deny));
    }

    #[test]
    fn instance_and_chapter_roles_union() {
        let catalog = RoleCatalog::standard();
        let chapter = ScopeRef::Chapter(ChapterId::new());
        let memberships = ScopeMemberships::from_iter([
            (ScopeRef::Instance, role("member")),
            (chapter, role("organizer")),
        ]);

        let inside = effective_permissions(&catalog, &[ScopeRef::Instance, chapter], &memberships)
            .unwrap_or_default();
        let outside =
            effective_permissions(&catalog, &[ScopeRef::Instance], &memberships).unwrap_or_default();

        assert!(inside.contains(&Permission::ChapterJoin));
        assert!(inside.contains(&Permission::EventCreate));
        assert!(outside.contains(&Permission::ChapterJoin));
        assert!(!outside.contains(&Permission::EventCreate));
    }

    #[test]
    fn event_roles_apply_only_to_their_event() {
        let catalog = RoleCatalog::standard();
        let chapter = ScopeRef::Chapter(ChapterId::new());
        let event = ScopeRef::Event(EventId::new());
        let sibling = ScopeRef::Event(EventId::new());
        let memberships = ScopeMemberships::from_iter([(event, role("organizer"))]);

        let on_event = evaluate(
            &catalog,
            Permission::EventSendInvite,
            &[ScopeRef::Instance, chapter, event],
            &memberships,
        );
        let on_sibling = evaluate(
            &catalog,
            Permission::EventSendInvite,
            &[ScopeRef::Instance, chapter, sibling],
            &memberships,
        );

        assert_eq!(on_event.ok(), Some(Decision::Allow));
        assert_eq!(on_sibling.ok(), Some(Decision::Deny));
    }

    #[test]
    fn role_missing_from_catalog_is_an_error_not_a_deny() {
        let catalog = RoleCatalog::standard();
        let memberships = ScopeMemberships::from_iter([(ScopeRef::Instance, role("organizer"))]);

        let result = evaluate(
            &catalog,
            Permission::EventCreate,
            &[ScopeRef::Instance],
            &memberships,
        );
        assert!(matches!(result, Err(AppError::UnknownRole(_))));
    }

    #[test]
    fn covering_map_reads_as_empty() {
        let scopes = [ScopeRef::Instance, ScopeRef::Chapter(ChapterId::new())];
        let memberships = ScopeMemberships::covering(&scopes);
        assert!(memberships.is_empty());
        assert_eq!(memberships.roles_at(&scopes[1]).count(), 0);
    }

    fn catalog_role() -> impl Strategy<Value = (ScopeTier, RoleName)> {
        let roles: Vec<(ScopeTier, RoleName)> = RoleCatalog::standard()
            .entries()
            .map(|entry| (entry.tier, entry.name.clone()))
            .collect();
        proptest::sample::select(roles)
    }

    fn scope_for(tier: ScopeTier, chapter: ChapterId, event: EventId) -> ScopeRef {
        match tier {
            ScopeTier::Instance => ScopeRef::Instance,
            ScopeTier::Chapter => ScopeRef::Chapter(chapter),
            ScopeTier::Event => ScopeRef::Event(event),
        }
    }

    proptest! {
        #[test]
        fn granted_permissions_allow_at_matching_scope_and_deny_at_sibling(
            (tier, name) in catalog_role(),
        ) {
            let catalog = RoleCatalog::standard();
            let chapter = ChapterId::new();
            let event = EventId::new();
            let other_chapter = ChapterId::new();
            let other_event = EventId::new();
            let scope = scope_for(tier, chapter, event);
            let memberships = ScopeMemberships::from_iter([(scope, name.clone())]);
            let chain = [ScopeRef::Instance, ScopeRef::Chapter(chapter), ScopeRef::Event(event)];
            let sibling_chain = [
                ScopeRef::Instance,
                ScopeRef::Chapter(other_chapter),
                ScopeRef::Event(other_event),
            ];

            let granted = catalog.permissions_of(&name, tier).cloned().unwrap_or_default();
            for permission in granted {
                let decision = evaluate(&catalog, permission, &chain, &memberships);
                prop_assert_eq!(decision.ok(), Some(Decision::Allow));

                if tier != ScopeTier::Instance {
                    let sibling = evaluate(&catalog, permission, &sibling_chain, &memberships);
                    prop_assert_eq!(sibling.ok(), Some(Decision::Deny));
                }
            }
        }

        #[test]
        fn effective_set_is_union_of_role_sets(
            held in proptest::collection::vec(catalog_role(), 0..6),
        ) {
            let catalog = RoleCatalog::standard();
            let chapter = ChapterId::new();
            let event = EventId::new();
            let chain = [ScopeRef::Instance, ScopeRef::Chapter(chapter), ScopeRef::Event(event)];
            let memberships: ScopeMemberships = held
                .iter()
                .map(|(tier, name)| (scope_for(*tier, chapter, event), name.clone()))
                .collect();

            let mut expected = std::collections::BTreeSet::new();
            for (tier, name) in &held {
                expected.extend(catalog.permissions_of(name, *tier).cloned().unwrap_or_default());
            }

            let first = effective_permissions(&catalog, &chain, &memberships);
            let second = effective_permissions(&catalog, &chain, &memberships);
            prop_assert_eq!(first.as_ref().ok(), Some(&expected));
            prop_assert_eq!(first.ok(), second.ok());
        }

        #[test]
        fn adding_a_role_never_revokes_a_permission(
            held in proptest::collection::vec(catalog_role(), 0..4),
            extra in catalog_role(),
            permission in proptest::sample::select(Permission::all().to_vec()),
        ) {
            let catalog = RoleCatalog::standard();
            let chapter = ChapterId::new();
            let event = EventId::new();
            let chain = [ScopeRef::Instance, ScopeRef::Chapter(chapter), ScopeRef::Event(event)];
            let mut memberships: ScopeMemberships = held
                .iter()
                .map(|(tier, name)| (scope_for(*tier, chapter, event), name.clone()))
                .collect();

            let before = evaluate(&catalog, permission, &chain, &memberships);
            memberships.insert(scope_for(extra.0, chapter, event), extra.1);
            let after = evaluate(&catalog, permission, &chain, &memberships);

            if before.ok() == Some(Decision::Allow) {
                prop_assert_eq!(after.ok(), Some(Decision::Allow));
            }
        }
    }
}
