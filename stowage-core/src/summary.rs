//! Carrier-side bookkeeping shared by every relationship kind.
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::ledger::CapacityLedger;
use crate::slot::SlotType;
use crate::unit::UnitId;

/// Remaining capacity plus the set of cargo currently aboard.
///
/// Only the cargo set is persisted; the ledger is derived state and is
/// rebuilt from installed slots after every load.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TransportSummary {
    #[serde(skip)]
    ledger: CapacityLedger,
    #[serde(default)]
    cargo: BTreeSet<UnitId>,
}

impl TransportSummary {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub const fn ledger(&self) -> &CapacityLedger {
        &self.ledger
    }

    pub(crate) const fn ledger_mut(&mut self) -> &mut CapacityLedger {
        &mut self.ledger
    }

    pub(crate) fn replace_ledger(&mut self, ledger: CapacityLedger) {
        self.ledger = ledger;
    }

    /// Returns true if the unit was not already aboard.
    pub fn add_cargo(&mut self, unit: UnitId) -> bool {
        self.cargo.insert(unit)
    }

    pub fn remove_cargo(&mut self, unit: UnitId) -> bool {
        self.cargo.remove(&unit)
    }

    pub fn clear_cargo(&mut self) {
        self.cargo.clear();
    }

    #[must_use]
    pub const fn cargo(&self) -> &BTreeSet<UnitId> {
        &self.cargo
    }

    #[must_use]
    pub fn carries(&self, unit: UnitId) -> bool {
        self.cargo.contains(&unit)
    }

    /// Clear the cargo set, then add every unit from the new set.
    pub fn replace_cargo<I>(&mut self, cargo: I)
    where
        I: IntoIterator<Item = UnitId>,
    {
        self.cargo.clear();
        self.cargo.extend(cargo);
    }

    #[must_use]
    pub fn has_capacity(&self) -> bool {
        self.ledger.has_any_capacity()
    }

    #[must_use]
    pub fn has_capacity_for(&self, slot_type: SlotType) -> bool {
        self.ledger.has_capacity(slot_type)
    }

    #[must_use]
    pub fn remaining_capacity(&self, slot_type: SlotType) -> f64 {
        self.ledger.remaining(slot_type)
    }

    pub fn set_remaining_capacity(&mut self, slot_type: SlotType, value: f64) {
        self.ledger.set_remaining(slot_type, value);
    }
}
