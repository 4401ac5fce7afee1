//! Remaining-capacity bookkeeping keyed by slot type.
use std::collections::{BTreeMap, BTreeSet};

use crate::numbers::{finite_or_zero, is_positive_capacity};
use crate::slot::{SlotInstance, SlotType};
use crate::unit::TransportKind;

/// Per-carrier remaining capacity.
///
/// Values are plain numbers: weight pools hold tons, count pools hold whole
/// units. Nothing here stops a value from going negative; callers decide
/// whether that is allowed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CapacityLedger {
    remaining: BTreeMap<SlotType, f64>,
}

impl CapacityLedger {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Installed capacity of every slot the relationship kind accounts for,
    /// summed per slot type.
    #[must_use]
    pub fn installed_for(slots: &[SlotInstance], kind: TransportKind) -> Self {
        let mut ledger = Self::new();
        for slot in slots.iter().filter(|slot| slot.slot_type.serves(kind)) {
            ledger.add_installed(slot.slot_type, slot.capacity);
        }
        ledger
    }

    /// Seed a slot type with its installed capacity, overwriting any entry.
    pub fn install(&mut self, slot_type: SlotType, capacity: f64) {
        self.remaining.insert(slot_type, finite_or_zero(capacity));
    }

    /// Accumulate installed capacity for one more instance of a slot type.
    pub fn add_installed(&mut self, slot_type: SlotType, capacity: f64) {
        *self.remaining.entry(slot_type).or_insert(0.0) += finite_or_zero(capacity);
    }

    /// Remaining capacity, zero when the slot type is absent.
    #[must_use]
    pub fn remaining(&self, slot_type: SlotType) -> f64 {
        self.remaining.get(&slot_type).copied().unwrap_or(0.0)
    }

    pub fn set_remaining(&mut self, slot_type: SlotType, value: f64) {
        self.remaining.insert(slot_type, value);
    }

    /// Subtract usage from a slot type. Absent types start from zero.
    pub fn deduct(&mut self, slot_type: SlotType, amount: f64) {
        *self.remaining.entry(slot_type).or_insert(0.0) -= amount;
    }

    #[must_use]
    pub fn has_capacity(&self, slot_type: SlotType) -> bool {
        is_positive_capacity(self.remaining(slot_type))
    }

    #[must_use]
    pub fn has_any_capacity(&self) -> bool {
        self.remaining.values().any(|value| is_positive_capacity(*value))
    }

    #[must_use]
    pub fn slot_types_present(&self) -> BTreeSet<SlotType> {
        self.remaining.keys().copied().collect()
    }

    /// Entries that went below zero.
    #[must_use]
    pub fn oversubscribed(&self) -> Vec<(SlotType, f64)> {
        self.remaining
            .iter()
            .filter(|(_, value)| **value < 0.0 && is_positive_capacity(-**value))
            .map(|(slot_type, value)| (*slot_type, *value))
            .collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (SlotType, f64)> + '_ {
        self.remaining.iter().map(|(slot_type, value)| (*slot_type, *value))
    }

    pub fn clear(&mut self) {
        self.remaining.clear();
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.remaining.is_empty()
    }
}
