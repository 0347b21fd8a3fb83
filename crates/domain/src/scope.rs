//! Scope hierarchy for role assignments.
//!
//! Scopes nest strictly: every event belongs to one chapter and every chapter
//! belongs to the instance.

use std::fmt::{Display, Formatter};
use std::str::FromStr;

use chapter_core::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a chapter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ChapterId(Uuid);

impl ChapterId {
    /// Creates a random chapter identifier.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Creates a chapter identifier from an existing UUID value.
    #[must_use]
    pub fn from_uuid(value: Uuid) -> Self {
        Self(value)
    }

    /// Returns the underlying UUID value.
    #[must_use]
    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for ChapterId {
    fn default() -> Self {
        Self::new()
    }
}

impl Display for ChapterId {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        write!(formatter, "{}", self.0)
    }
}

/// Unique identifier for an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EventId(Uuid);

impl EventId {
    /// Creates a random event identifier.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Creates an event identifier from an existing UUID value.
    #[must_use]
    pub fn from_uuid(value: Uuid) -> Self {
        Self(value)
    }

    /// Returns the underlying UUID value.
    #[must_use]
    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for EventId {
    fn default() -> Self {
        Self::new()
    }
}

impl Display for EventId {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        write!(formatter, "{}", self.0)
    }
}

/// Level at which roles are defined and assigned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScopeTier {
    /// The whole installation.
    Instance,
    /// One chapter.
    Chapter,
    /// One event inside a chapter.
    Event,
}

impl ScopeTier {
    /// Returns a stable storage value for this tier.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Instance => "instance",
            Self::Chapter => "chapter",
            Self::Event => "event",
        }
    }

    /// Returns all tiers, outermost first.
    #[must_use]
    pub fn all() -> &'static [Self] {
        &[Self::Instance, Self::Chapter, Self::Event]
    }
}

impl Display for ScopeTier {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        formatter.write_str(self.as_str())
    }
}

impl FromStr for ScopeTier {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "instance" => Ok(Self::Instance),
            "chapter" => Ok(Self::Chapter),
            "event" => Ok(Self::Event),
            _ => Err(AppError::Validation(format!("unknown scope tier '{value}'"))),
        }
    }
}

/// Concrete scope a role can be held at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(tag = "tier", content = "id", rename_all = "snake_case")]
pub enum ScopeRef {
    /// Global scope.
    Instance,
    /// A single chapter.
    Chapter(ChapterId),
    /// A single event.
    Event(EventId),
}

impl ScopeRef {
    /// Returns the tier of this scope.
    #[must_use]
    pub fn tier(&self) -> ScopeTier {
        match self {
            Self::Instance => ScopeTier::Instance,
            Self::Chapter(_) => ScopeTier::Chapter,
            Self::Event(_) => ScopeTier::Event,
        }
    }

    /// Builds a scope from a tier and an optional raw identifier.
    pub fn from_parts(tier: ScopeTier, id: Option<Uuid>) -> AppResult<Self> {
        match (tier, id) {
            (ScopeTier::Instance, None) => Ok(Self::Instance),
            (ScopeTier::Chapter, Some(id)) => Ok(Self::Chapter(ChapterId::from_uuid(id))),
            (ScopeTier::Event, Some(id)) => Ok(Self::Event(EventId::from_uuid(id))),
            (ScopeTier::Instance, Some(_)) => Err(AppError::Validation(
                "instance scope does not take an id".to_owned(),
            )),
            (tier, None) => Err(AppError::Validation(format!(
                "{tier} scope requires an id"
            ))),
        }
    }
}

impl Display for ScopeRef {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Instance => formatter.write_str("instance"),
            Self::Chapter(chapter_id) => write!(formatter, "chapter:{chapter_id}"),
            Self::Event(event_id) => write!(formatter, "event:{event_id}"),
        }
    }
}

/// Optional chapter/event identifiers attached to an authorization request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ScopeContext {
    /// Chapter the request operates in.
    pub chapter_id: Option<ChapterId>,
    /// Event the request operates on.
    pub event_id: Option<EventId>,
}

impl ScopeContext {
    /// Context for instance-wide operations.
    #[must_use]
    pub fn instance() -> Self {
        Self::default()
    }

    /// Context for an operation inside one chapter.
    #[must_use]
    pub fn chapter(chapter_id: ChapterId) -> Self {
        Self {
            chapter_id: Some(chapter_id),
            event_id: None,
        }
    }

    /// Context for an operation on one event.
    #[must_use]
    pub fn event(event_id: EventId) -> Self {
        Self {
            chapter_id: None,
            event_id: Some(event_id),
        }
    }
}

impl Display for ScopeContext {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        match (self.chapter_id, self.event_id) {
            (_, Some(event_id)) => write!(formatter, "event:{event_id}"),
            (Some(chapter_id), None) => write!(formatter, "chapter:{chapter_id}"),
            (None, None) => formatter.write_str("instance"),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use uuid::Uuid;

    use super::{ChapterId, EventId, ScopeRef, ScopeTier};

    #[test]
    fn scope_refs_order_outermost_first() {
        let mut scopes = vec![
            ScopeRef::Event(EventId::new()),
            ScopeRef::Instance,
            ScopeRef::Chapter(ChapterId::new()),
        ];
        scopes.sort();
        let tiers: Vec<ScopeTier> = scopes.iter().map(ScopeRef::tier).collect();
        assert_eq!(tiers, ScopeTier::all().to_vec());
    }

    #[test]
    fn tier_roundtrip_storage_value() {
        for tier in ScopeTier::all() {
            assert_eq!(ScopeTier::from_str(tier.as_str()).ok(), Some(*tier));
        }
        assert!(ScopeTier::from_str("venue").is_err());
    }

    #[test]
    fn from_parts_rejects_mismatched_ids() {
        assert!(ScopeRef::from_parts(ScopeTier::Instance, Some(Uuid::new_v4())).is_err());
        assert!(ScopeRef::from_parts(ScopeTier::Chapter, None).is_err());

        let id = Uuid::new_v4();
        assert_eq!(
            ScopeRef::from_parts(ScopeTier::Event, Some(id)).ok(),
            Some(ScopeRef::Event(EventId::from_uuid(id)))
        );
    }
}
