//! Bay transport aboard large vessels.
use std::collections::BTreeSet;

use crate::bay_selection::{BaySelector, SmallestFitSelector, collar_allowed};
use crate::error::{TransportError, reject};
use crate::hangar::{Hangar, LoadOutcome};
use crate::ledger::CapacityLedger;
use crate::policy::{TransportPolicy, deduct_occupants};
use crate::slot::{SlotTarget, SlotType, capable_slot_types};
use crate::unit::{TransportKind, Unit, UnitId};

/// Ship-transport policy: bays and docking collars, cargo placed by the bay
/// selector.
#[derive(Debug, Clone, Copy, Default)]
pub struct ShipTransport;

impl TransportPolicy for ShipTransport {
    const KIND: TransportKind = TransportKind::Ship;

    fn recompute_from_installed(
        hangar: &Hangar,
        _carrier: &Unit,
        cargo: &BTreeSet<UnitId>,
        ledger: &mut CapacityLedger,
    ) {
        deduct_occupants(hangar, Self::KIND, cargo, ledger);
    }

    fn select_slot(hangar: &Hangar, carrier: &Unit, cargo: &Unit) -> Option<SlotTarget> {
        SmallestFitSelector
            .select_bay(hangar, carrier, cargo)
            .map(SlotTarget::Instance)
    }
}

impl Hangar {
    /// Load cargo into the best-fitting bays using the default selector.
    ///
    /// # Errors
    ///
    /// Fails without changing anything if the carrier or any cargo is not in
    /// the hangar, or if a unit is asked to carry itself. Per-cargo failures
    /// are reported in [`LoadOutcome::rejected`].
    pub fn load_into_bay(
        &mut self,
        carrier: UnitId,
        cargo: &[UnitId],
    ) -> Result<LoadOutcome, TransportError> {
        self.load_into_bay_with(&SmallestFitSelector, carrier, cargo)
    }

    /// Load cargo into bays chosen by a caller-supplied selector.
    ///
    /// # Errors
    ///
    /// See [`Hangar::load_into_bay`].
    pub fn load_into_bay_with<S>(
        &mut self,
        selector: &S,
        carrier: UnitId,
        cargo: &[UnitId],
    ) -> Result<LoadOutcome, TransportError>
    where
        S: BaySelector + ?Sized,
    {
        self.check_participants(carrier, cargo)?;
        let mut outcome = LoadOutcome::default();
        let mut seen = BTreeSet::new();

        for &id in cargo {
            if !seen.insert(id) {
                continue;
            }
            if self.carrier_of(id, TransportKind::Ship) == Some(carrier) {
                outcome.loaded.push(id);
                continue;
            }
            let bay = match (self.unit(carrier), self.unit(id)) {
                (Some(carrier_unit), Some(cargo_unit)) => {
                    selector.select_bay(self, carrier_unit, cargo_unit)
                }
                _ => None,
            };
            let Some(bay) = bay else {
                let error = TransportError::NoSuitableBay { carrier, cargo: id };
                log::error!("{error}");
                outcome.rejected.push((id, error));
                continue;
            };
            let target = SlotTarget::Instance(bay);
            if let Err(error) = self.check_capacity(TransportKind::Ship, carrier, id, &target) {
                outcome.rejected.push((id, error));
                continue;
            }
            if let Some(previous) = self.board::<ShipTransport>(carrier, id, target) {
                outcome.previous_carriers.insert(previous);
            }
            outcome.loaded.push(id);
        }
        Ok(outcome)
    }

    /// Load one cargo unit into a bay the caller already chose by number.
    ///
    /// Returns the previous ship-transport carrier, if any.
    ///
    /// # Errors
    ///
    /// Rejects unknown units, bays that are not installed, bays the cargo
    /// cannot use, collars on carriers that may not dock DropShips and, under
    /// the strict capacity policy, bays without room.
    pub fn load_into_specific_bay(
        &mut self,
        carrier: UnitId,
        slot_type: SlotType,
        number: u16,
        cargo: UnitId,
    ) -> Result<Option<UnitId>, TransportError> {
        self.check_participants(carrier, &[cargo])?;
        let (Some(carrier_unit), Some(cargo_unit)) = (self.unit(carrier), self.unit(cargo)) else {
            return reject(TransportError::UnknownUnit(cargo));
        };
        let Some(bay) = carrier_unit.find_slot(slot_type, number).cloned() else {
            return reject(TransportError::SlotNotInstalled {
                carrier,
                slot: format!("{slot_type} #{number}"),
            });
        };
        if !slot_type.serves(TransportKind::Ship) {
            return reject(TransportError::WrongSlotKind {
                slot_type,
                kind: TransportKind::Ship,
            });
        }
        let collar_blocked =
            slot_type == SlotType::DockingCollar && !collar_allowed(self.config(), carrier_unit);
        if collar_blocked || !capable_slot_types(&cargo_unit.kind).contains(&slot_type) {
            return reject(TransportError::NoSuitableBay { carrier, cargo });
        }
        let target = SlotTarget::Instance(bay);
        self.check_capacity(TransportKind::Ship, carrier, cargo, &target)?;

        if self.carrier_of(cargo, TransportKind::Ship) == Some(carrier) {
            // Moving between bays on the same ship.
            self.release::<ShipTransport>(carrier, cargo);
        }
        Ok(self.board::<ShipTransport>(carrier, cargo, target))
    }

    /// Unload one cargo unit. Stale calls return `false`.
    pub fn unload_from_bay(&mut self, carrier: UnitId, cargo: UnitId) -> bool {
        self.release::<ShipTransport>(carrier, cargo)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::slot::SlotInstance;
    use crate::unit::{UnitKind, VehicleClass};

    fn hangar() -> Hangar {
        let mut hangar = Hangar::new();
        hangar.add_unit(
            Unit::new(UnitId(1), "Union", UnitKind::DropShip, 3600.0).with_slots([
                SlotInstance::new(SlotType::MekBay, 1, 2.0),
                SlotInstance::new(SlotType::MekBay, 2, 2.0),
            ]),
        );
        hangar.add_unit(
            Unit::new(UnitId(2), "Overlord", UnitKind::DropShip, 9700.0)
                .with_slots([SlotInstance::new(SlotType::MekBay, 1, 6.0)]),
        );
        for id in 10..15 {
            hangar.add_unit(Unit::new(UnitId(id), format!("Mek {id}"), UnitKind::Mek, 55.0));
        }
        hangar
    }

    #[test]
    fn load_records_the_chosen_bay() {
        let mut hangar = hangar();
        let outcome = hangar.load_into_bay(UnitId(1), &[UnitId(10)]).unwrap();
        assert!(outcome.all_loaded());
        assert!(outcome.previous_carriers.is_empty());

        let record = hangar
            .unit(UnitId(10))
            .and_then(|unit| unit.assignment(TransportKind::Ship))
            .unwrap();
        assert_eq!(record.carrier(), Some(UnitId(1)));
        assert_eq!(record.slot_instance().map(|bay| bay.number), Some(1));
        assert!(
            (hangar.remaining_capacity(UnitId(1), TransportKind::Ship, SlotType::MekBay) - 3.0)
                .abs()
                < f64::EPSILON
        );
    }

    #[test]
    fn repeated_ids_load_once() {
        let mut hangar = hangar();
        let outcome = hangar
            .load_into_bay(UnitId(1), &[UnitId(10), UnitId(10), UnitId(11), UnitId(10)])
            .unwrap();
        assert_eq!(outcome.loaded, vec![UnitId(10), UnitId(11)]);
        assert!(
            (hangar.remaining_capacity(UnitId(1), TransportKind::Ship, SlotType::MekBay) - 2.0)
                .abs()
                < f64::EPSILON
        );
    }

    #[test]
    fn reloading_elsewhere_reports_the_old_carrier() {
        let mut hangar = hangar();
        hangar.load_into_bay(UnitId(1), &[UnitId(10)]).unwrap();
        let outcome = hangar.load_into_bay(UnitId(2), &[UnitId(10)]).unwrap();
        assert_eq!(
            outcome.previous_carriers.into_iter().collect::<Vec<_>>(),
            vec![UnitId(1)]
        );
        let old = hangar.summary(UnitId(1), TransportKind::Ship).unwrap();
        assert!(!old.carries(UnitId(10)));
        assert!((old.remaining_capacity(SlotType::MekBay) - 4.0).abs() < f64::EPSILON);
    }

    #[test]
    fn reloading_onto_the_same_carrier_is_a_no_op() {
        let mut hangar = hangar();
        hangar.load_into_bay(UnitId(1), &[UnitId(10)]).unwrap();
        let outcome = hangar.load_into_bay(UnitId(1), &[UnitId(10)]).unwrap();
        assert_eq!(outcome.loaded, vec![UnitId(10)]);
        assert!(
            (hangar.remaining_capacity(UnitId(1), TransportKind::Ship, SlotType::MekBay) - 3.0)
                .abs()
                < f64::EPSILON
        );
    }

    #[test]
    fn overflow_cargo_is_rejected_individually() {
        let mut hangar = hangar();
        let cargo = [UnitId(10), UnitId(11), UnitId(12), UnitId(13), UnitId(14)];
        let outcome = hangar.load_into_bay(UnitId(1), &cargo).unwrap();
        assert_eq!(outcome.loaded.len(), 4);
        assert_eq!(
            outcome.rejected,
            vec![(
                UnitId(14),
                TransportError::NoSuitableBay {
                    carrier: UnitId(1),
                    cargo: UnitId(14)
                }
            )]
        );
        assert!(hangar.carrier_of(UnitId(14), TransportKind::Ship).is_none());
    }

    #[test]
    fn unknown_cargo_aborts_the_whole_call() {
        let mut hangar = hangar();
        let result = hangar.load_into_bay(UnitId(1), &[UnitId(10), UnitId(99)]);
        assert_eq!(result, Err(TransportError::UnknownUnit(UnitId(99))));
        assert!(hangar.carrier_of(UnitId(10), TransportKind::Ship).is_none());
    }

    #[test]
    fn specific_bay_checks_capability() {
        let mut hangar = hangar();
        hangar.add_unit(Unit::new(
            UnitId(20),
            "Scorpion",
            UnitKind::Vehicle {
                class: VehicleClass::Light,
            },
            25.0,
        ));
        assert_eq!(
            hangar.load_into_specific_bay(UnitId(1), SlotType::MekBay, 2, UnitId(20)),
            Err(TransportError::NoSuitableBay {
                carrier: UnitId(1),
                cargo: UnitId(20)
            })
        );
        assert!(matches!(
            hangar.load_into_specific_bay(UnitId(1), SlotType::MekBay, 9, UnitId(10)),
            Err(TransportError::SlotNotInstalled { .. })
        ));

        assert_eq!(
            hangar.load_into_specific_bay(UnitId(1), SlotType::MekBay, 2, UnitId(10)),
            Ok(None)
        );
        let record = hangar
            .unit(UnitId(10))
            .and_then(|unit| unit.assignment(TransportKind::Ship))
            .unwrap();
        assert_eq!(record.slot_instance().map(|bay| bay.number), Some(2));
    }

    #[test]
    fn unload_is_idempotent() {
        let mut hangar = hangar();
        hangar.load_into_bay(UnitId(1), &[UnitId(10)]).unwrap();
        assert!(hangar.unload_from_bay(UnitId(1), UnitId(10)));
        assert!(!hangar.unload_from_bay(UnitId(1), UnitId(10)));
        assert!(
            (hangar.remaining_capacity(UnitId(1), TransportKind::Ship, SlotType::MekBay) - 4.0)
                .abs()
                < f64::EPSILON
        );
    }
}
