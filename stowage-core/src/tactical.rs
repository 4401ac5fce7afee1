//! Ad-hoc carrier/cargo pairings: infantry riding in a transport, battle armor
//! on handles, vehicles in a vehicle bay for a single engagement.
use std::collections::BTreeSet;

use crate::error::{TransportError, reject};
use crate::hangar::{Hangar, LoadOutcome};
use crate::ledger::CapacityLedger;
use crate::policy::{TransportPolicy, deduct_occupants};
use crate::slot::SlotTarget;
use crate::unit::{TransportKind, Unit, UnitId};

#[derive(Debug, Clone, Copy, Default)]
pub struct TacticalTransport;

impl TransportPolicy for TacticalTransport {
    const KIND: TransportKind = TransportKind::Tactical;

    fn recompute_from_installed(
        hangar: &Hangar,
        _carrier: &Unit,
        cargo: &BTreeSet<UnitId>,
        ledger: &mut CapacityLedger,
    ) {
        deduct_occupants(hangar, Self::KIND, cargo, ledger);
    }
}

impl Hangar {
    /// Assign cargo to a carrier for tactical transport.
    ///
    /// Cargo held by a different carrier is unloaded there first; those
    /// carriers are returned in [`LoadOutcome::previous_carriers`]. Cargo
    /// already aboard this carrier is moved to the new target.
    ///
    /// # Errors
    ///
    /// Nothing changes if no target is given, if the target is not installed
    /// or does not serve tactical transport, or if any unit is unknown. Under
    /// the strict capacity policy, cargo that does not fit is listed in
    /// [`LoadOutcome::rejected`].
    pub fn load_tactical(
        &mut self,
        carrier: UnitId,
        target: Option<SlotTarget>,
        cargo: &[UnitId],
    ) -> Result<LoadOutcome, TransportError> {
        let Some(target) = target else {
            return reject(TransportError::MissingSlot {
                carrier,
                kind: TransportKind::Tactical,
            });
        };
        self.check_participants(carrier, cargo)?;
        let target = self.resolve_target(carrier, target, TransportKind::Tactical)?;
        let mut outcome = LoadOutcome::default();
        let mut seen = BTreeSet::new();

        for &id in cargo {
            if !seen.insert(id) {
                continue;
            }
            if let Err(error) =
                self.check_capacity(TransportKind::Tactical, carrier, id, &target)
            {
                outcome.rejected.push((id, error));
                continue;
            }
            if self.carrier_of(id, TransportKind::Tactical) == Some(carrier) {
                self.release::<TacticalTransport>(carrier, id);
            }
            if let Some(previous) = self.board::<TacticalTransport>(carrier, id, target.clone()) {
                outcome.previous_carriers.insert(previous);
            }
            outcome.loaded.push(id);
        }
        Ok(outcome)
    }

    /// Clear a tactical assignment. Stale calls return `false` but still
    /// rebuild the carrier's ledger.
    pub fn unload_tactical(&mut self, carrier: UnitId, cargo: UnitId) -> bool {
        self.release::<TacticalTransport>(carrier, cargo)
    }
}
