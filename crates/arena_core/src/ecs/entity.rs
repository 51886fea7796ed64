//! # Entity Management
//!
//! An entity is an id plus the bookkeeping needed to answer "what is this
//! and who simulates it" without touching component columns.

use std::fmt;

use arena_shared::EntityType;

use super::component::{ComponentMask, ComponentType};

/// Unique identifier for an entity.
///
/// The id doubles as the index into every component column. Ids are
/// recycled after destruction, so a late packet may name an id that now
/// belongs to a different entity or to nothing at all.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(transparent)]
pub struct EntityId(pub u32);

impl EntityId {
    /// Returns the index into component arrays.
    #[inline]
    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }

    /// Returns the raw id as sent on the wire.
    #[inline]
    #[must_use]
    pub const fn raw(self) -> u32 {
        self.0
    }
}

impl From<u32> for EntityId {
    fn from(raw: u32) -> Self {
        Self(raw)
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Which process is allowed to move an entity.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SimulationAuthority {
    /// Simulated by this process and trusted (the server).
    #[default]
    Authoritative,
    /// Simulated locally ahead of the server, then reconciled (own player).
    PredictedLocal,
    /// Only displayed from buffered server snapshots.
    Interpolated,
}

impl SimulationAuthority {
    /// True if input, physics, collision and bounds systems may act.
    #[inline]
    #[must_use]
    pub const fn simulates(self) -> bool {
        matches!(self, Self::Authoritative | Self::PredictedLocal)
    }
}

/// A live entity.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Entity {
    /// The unique identifier for this entity.
    pub id: EntityId,
    /// Attached components.
    pub mask: ComponentMask,
    /// Gameplay kind.
    pub kind: EntityType,
    /// Who simulates this entity.
    pub authority: SimulationAuthority,
}

impl Entity {
    /// Checks if this entity has a specific component.
    #[inline]
    #[must_use]
    pub const fn has(self, component: ComponentType) -> bool {
        self.mask.contains(component)
    }

    /// Checks if this entity has all of `components`.
    #[inline]
    #[must_use]
    pub const fn has_all(self, components: ComponentMask) -> bool {
        self.mask.contains_all(components)
    }

    /// Shorthand for `self.authority.simulates()`.
    #[inline]
    #[must_use]
    pub const fn simulated(self) -> bool {
        self.authority.simulates()
    }
}
