//! Units, unit kinds and the per-relationship containers they own.
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::assignment::Assignment;
use crate::config::TransportConfig;
use crate::constants::COUNT_USAGE_PER_UNIT;
use crate::slot::{CapacityBasis, SlotInstance, SlotType};
use crate::summary::TransportSummary;

/// Arena index of a unit inside the hangar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UnitId(pub u32);

impl fmt::Display for UnitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unit#{}", self.0)
    }
}

/// The three independent carrying relationships.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransportKind {
    /// Bay transport aboard a large vessel.
    Ship,
    /// Ad-hoc carrier/cargo pairing.
    Tactical,
    /// Tow-hitch convoying.
    Tow,
}

impl TransportKind {
    pub const ALL: [Self; 3] = [Self::Ship, Self::Tactical, Self::Tow];

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Ship => "ship transport",
            Self::Tactical => "tactical transport",
            Self::Tow => "tow transport",
        }
    }
}

impl fmt::Display for TransportKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One value per relationship kind.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PerKind<T> {
    pub ship: T,
    pub tactical: T,
    pub tow: T,
}

impl<T> PerKind<T> {
    #[must_use]
    pub const fn get(&self, kind: TransportKind) -> &T {
        match kind {
            TransportKind::Ship => &self.ship,
            TransportKind::Tactical => &self.tactical,
            TransportKind::Tow => &self.tow,
        }
    }

    pub const fn get_mut(&mut self, kind: TransportKind) -> &mut T {
        match kind {
            TransportKind::Ship => &mut self.ship,
            TransportKind::Tactical => &mut self.tactical,
            TransportKind::Tow => &mut self.tow,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VehicleClass {
    Light,
    Heavy,
    SuperHeavy,
}

/// Infantry movement mode; selects the platoon weight used in infantry bays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlatoonType {
    Foot,
    Jump,
    Motorized,
    Mechanized,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum UnitKind {
    Mek,
    ProtoMek,
    Vehicle { class: VehicleClass },
    Trailer { class: VehicleClass },
    Infantry { platoon: PlatoonType, troopers: u32 },
    BattleArmor,
    Fighter,
    SmallCraft,
    DropShip,
    JumpShip,
    WarShip,
    SpaceStation,
}

impl UnitKind {
    /// Trailers need a tractor to move and so cannot root a tow chain.
    #[must_use]
    pub const fn is_trailer(&self) -> bool {
        matches!(self, Self::Trailer { .. })
    }

    /// Vessels large enough to mount docking collars.
    #[must_use]
    pub const fn is_large_vessel(&self) -> bool {
        matches!(self, Self::JumpShip | Self::WarShip | Self::SpaceStation)
    }
}

/// A unit in the campaign's hangar.
///
/// Relationship state is split by ownership: `assignments` is this unit's
/// record of who carries it, `summaries` is its own carrier-side bookkeeping.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Unit {
    pub id: UnitId,
    pub name: String,
    pub kind: UnitKind,
    /// Mass in tons.
    pub weight: f64,
    #[serde(default)]
    pub(crate) slots: Vec<SlotInstance>,
    #[serde(default)]
    pub(crate) assignments: PerKind<Option<Assignment>>,
    #[serde(default)]
    pub(crate) summaries: PerKind<TransportSummary>,
}

impl Unit {
    #[must_use]
    pub fn new(id: UnitId, name: impl Into<String>, kind: UnitKind, weight: f64) -> Self {
        Self {
            id,
            name: name.into(),
            kind,
            weight,
            slots: Vec::new(),
            assignments: PerKind::default(),
            summaries: PerKind::default(),
        }
    }

    #[must_use]
    pub fn with_slots<I>(mut self, slots: I) -> Self
    where
        I: IntoIterator<Item = SlotInstance>,
    {
        self.slots = slots.into_iter().collect();
        self
    }

    /// Installed slot inventory.
    #[must_use]
    pub fn slots(&self) -> &[SlotInstance] {
        &self.slots
    }

    /// Installed slot matching the given type and number.
    #[must_use]
    pub fn find_slot(&self, slot_type: SlotType, number: u16) -> Option<&SlotInstance> {
        self.slots
            .iter()
            .find(|slot| slot.slot_type == slot_type && slot.number == number)
    }

    #[must_use]
    pub fn has_slot_type(&self, slot_type: SlotType) -> bool {
        self.slots.iter().any(|slot| slot.slot_type == slot_type)
    }

    #[must_use]
    pub const fn assignment(&self, kind: TransportKind) -> Option<&Assignment> {
        self.assignments.get(kind).as_ref()
    }

    pub(crate) fn set_assignment(&mut self, kind: TransportKind, assignment: Assignment) {
        *self.assignments.get_mut(kind) = Some(assignment);
    }

    pub(crate) fn clear_assignment(&mut self, kind: TransportKind) -> Option<Assignment> {
        self.assignments.get_mut(kind).take()
    }

    /// Live carrier of this unit under the given relationship.
    #[must_use]
    pub fn carrier(&self, kind: TransportKind) -> Option<UnitId> {
        self.assignment(kind).and_then(Assignment::carrier)
    }

    #[must_use]
    pub const fn summary(&self, kind: TransportKind) -> &TransportSummary {
        self.summaries.get(kind)
    }

    pub(crate) const fn summary_mut(&mut self, kind: TransportKind) -> &mut TransportSummary {
        self.summaries.get_mut(kind)
    }

    /// Capacity this unit consumes when riding in the given slot type.
    ///
    /// Count pools charge one per unit. Infantry bays charge whole platoons by
    /// movement mode; every other weight pool charges raw tonnage.
    #[must_use]
    pub fn usage_in(&self, slot_type: SlotType, config: &TransportConfig) -> f64 {
        match (slot_type.basis(), slot_type, &self.kind) {
            (CapacityBasis::Count, _, _) => COUNT_USAGE_PER_UNIT,
            (
                CapacityBasis::Weight,
                SlotType::InfantryBay,
                UnitKind::Infantry { platoon, troopers },
            ) => config.platoons.bay_weight(*platoon, *troopers),
            (CapacityBasis::Weight, _, _) => self.weight,
        }
    }
}
