//! Relationship policies plugged into the shared summary bookkeeping.
//!
//! Every relationship kind uses the same ledger and cargo-set code; a policy
//! only supplies the few decisions that differ between kinds.
use std::collections::BTreeSet;

use crate::hangar::Hangar;
use crate::ledger::CapacityLedger;
use crate::slot::SlotTarget;
use crate::tow::TowCapacity;
use crate::unit::{TransportKind, Unit, UnitId};

pub trait TransportPolicy: Sized {
    const KIND: TransportKind;

    /// Turn installed capacity (already summed into `ledger`) into remaining
    /// capacity for the given occupants.
    fn recompute_from_installed(
        hangar: &Hangar,
        carrier: &Unit,
        cargo: &BTreeSet<UnitId>,
        ledger: &mut CapacityLedger,
    );

    /// Slot to use when the caller did not name one.
    fn select_slot(_hangar: &Hangar, _carrier: &Unit, _cargo: &Unit) -> Option<SlotTarget> {
        None
    }

    /// Capacity derived from a chain of carriers, for kinds that have one.
    fn chain_capacity(_hangar: &Hangar, _carrier: UnitId) -> Option<TowCapacity> {
        None
    }

    /// Bring a carrier's ledger and cargo set back in line with live state.
    fn refresh(hangar: &mut Hangar, carrier: UnitId) {
        hangar.rebuild_ledger_and_reload::<Self>(carrier);
    }
}

/// Deduct every occupant's usage from the slot type its assignment names.
pub(crate) fn deduct_occupants(
    hangar: &Hangar,
    kind: TransportKind,
    cargo: &BTreeSet<UnitId>,
    ledger: &mut CapacityLedger,
) {
    for unit in cargo.iter().filter_map(|id| hangar.unit(*id)) {
        let Some(slot_type) = unit.assignment(kind).and_then(|record| record.slot_type()) else {
            continue;
        };
        ledger.deduct(slot_type, unit.usage_in(slot_type, hangar.config()));
    }
}
