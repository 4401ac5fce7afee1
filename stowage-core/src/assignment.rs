//! Cargo-side assignment records.
//!
//! An [`Assignment`] lives on the cargo unit and names the carrier and slot it
//! rides in. Saved games store only identifiers (the carrier id and a slot
//! hash), so a freshly deserialized record holds [`CarrierRef::Pending`] and
//! [`SlotRef::Pending`] until [`Assignment::fix_references`] checks them
//! against the live hangar.
use serde::{Deserialize, Serialize};

use crate::hangar::Hangar;
use crate::slot::{SlotInstance, SlotTarget, SlotType};
use crate::unit::{TransportKind, UnitId};

/// Carrier reference that is either verified or still waiting on the
/// post-load resolution pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CarrierRef {
    Pending(UnitId),
    Live(UnitId),
}

impl CarrierRef {
    #[must_use]
    pub const fn id(self) -> UnitId {
        match self {
            Self::Pending(id) | Self::Live(id) => id,
        }
    }
}

/// Concrete slot reference; saved games only know the slot's hash.
#[derive(Debug, Clone, PartialEq)]
pub enum SlotRef {
    Pending(u64),
    Live(SlotInstance),
}

/// Result of resolving an assignment after load.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    /// Carrier exists; the record is usable.
    Resolved,
    /// Carrier is gone; the owner must drop the record.
    Dangling,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "PersistedAssignment", into = "PersistedAssignment")]
pub struct Assignment {
    carrier: CarrierRef,
    slot_type: Option<SlotType>,
    slot: Option<SlotRef>,
}

impl Assignment {
    /// Record for a live carrier. A concrete instance overrides `slot_type`.
    #[must_use]
    pub fn new(carrier: UnitId, target: Option<SlotTarget>) -> Self {
        match target {
            Some(SlotTarget::Instance(slot)) => Self {
                carrier: CarrierRef::Live(carrier),
                slot_type: Some(slot.slot_type),
                slot: Some(SlotRef::Live(slot)),
            },
            Some(SlotTarget::Type(slot_type)) => Self {
                carrier: CarrierRef::Live(carrier),
                slot_type: Some(slot_type),
                slot: None,
            },
            None => Self {
                carrier: CarrierRef::Live(carrier),
                slot_type: None,
                slot: None,
            },
        }
    }

    /// Live carrier id, `None` while the reference is still pending.
    #[must_use]
    pub const fn carrier(&self) -> Option<UnitId> {
        match self.carrier {
            CarrierRef::Live(id) => Some(id),
            CarrierRef::Pending(_) => None,
        }
    }

    /// Carrier id regardless of resolution state.
    #[must_use]
    pub const fn carrier_ref(&self) -> CarrierRef {
        self.carrier
    }

    #[must_use]
    pub const fn has_carrier(&self) -> bool {
        matches!(self.carrier, CarrierRef::Live(_))
    }

    /// Slot type, taken from the concrete instance when one is known.
    #[must_use]
    pub fn slot_type(&self) -> Option<SlotType> {
        match &self.slot {
            Some(SlotRef::Live(slot)) => Some(slot.slot_type),
            _ => self.slot_type,
        }
    }

    #[must_use]
    pub fn has_slot_type(&self) -> bool {
        self.slot_type().is_some()
    }

    #[must_use]
    pub const fn slot_instance(&self) -> Option<&SlotInstance> {
        match &self.slot {
            Some(SlotRef::Live(slot)) => Some(slot),
            _ => None,
        }
    }

    #[must_use]
    pub const fn has_slot_instance(&self) -> bool {
        self.slot_instance().is_some()
    }

    /// Stable stand-in for the slot instance in saved games.
    #[must_use]
    pub fn hash_of_slot_instance(&self) -> Option<u64> {
        match &self.slot {
            Some(SlotRef::Live(slot)) => Some(slot.stable_hash()),
            Some(SlotRef::Pending(hash)) => Some(*hash),
            None => None,
        }
    }

    /// Most specific load target this record can reproduce.
    #[must_use]
    pub fn target(&self) -> Option<SlotTarget> {
        self.slot_instance()
            .cloned()
            .map(SlotTarget::Instance)
            .or_else(|| self.slot_type().map(SlotTarget::Type))
    }

    /// Resolve pending references against the live hangar.
    ///
    /// A missing carrier is logged and reported as [`Resolution::Dangling`]
    /// so the owner can clear the record. A slot hash that no longer matches
    /// any installed slot degrades to the persisted slot type.
    pub fn fix_references(
        &mut self,
        hangar: &Hangar,
        owner: UnitId,
        kind: TransportKind,
    ) -> Resolution {
        let carrier_id = self.carrier.id();
        let Some(carrier) = hangar.unit(carrier_id) else {
            log::error!(
                "{owner} has a {kind} assignment to {carrier_id}, which is not in the hangar; dropping it"
            );
            return Resolution::Dangling;
        };
        self.carrier = CarrierRef::Live(carrier_id);

        if let Some(SlotRef::Pending(hash)) = self.slot {
            match carrier.slots().iter().find(|slot| slot.stable_hash() == hash) {
                Some(slot) => {
                    self.slot_type = Some(slot.slot_type);
                    self.slot = Some(SlotRef::Live(slot.clone()));
                }
                None => {
                    log::warn!(
                        "{owner}: slot {hash:#018x} on {carrier_id} no longer exists, keeping slot type {:?}",
                        self.slot_type
                    );
                    self.slot = None;
                }
            }
        }
        Resolution::Resolved
    }
}

/// Saved-game shape of an assignment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct PersistedAssignment {
    carrier: UnitId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    slot_type: Option<SlotType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    slot_hash: Option<u64>,
}

impl From<PersistedAssignment> for Assignment {
    fn from(value: PersistedAssignment) -> Self {
        Self {
            carrier: CarrierRef::Pending(value.carrier),
            slot_type: value.slot_type,
            slot: value.slot_hash.map(SlotRef::Pending),
        }
    }
}

impl From<Assignment> for PersistedAssignment {
    fn from(value: Assignment) -> Self {
        Self {
            carrier: value.carrier.id(),
            slot_type: value.slot_type(),
            slot_hash: value.hash_of_slot_instance(),
        }
    }
}
