//! Post-load reference repair.
//!
//! Saved games keep ids where live data keeps references. After bulk load the
//! hangar runs two phases: every assignment record is resolved against the
//! registry, then every carrier replays its recorded cargo through the normal
//! load path so ledgers and cargo sets agree with the assignments again.
use serde::Serialize;

use crate::assignment::Resolution;
use crate::hangar::Hangar;
use crate::policy::TransportPolicy;
use crate::ship::ShipTransport;
use crate::tactical::TacticalTransport;
use crate::tow::TowTransport;
use crate::unit::{TransportKind, UnitId};

/// A relationship dropped during repair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DroppedLink {
    pub kind: TransportKind,
    pub carrier: UnitId,
    pub cargo: UnitId,
}

/// What the repair pass had to throw away.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RepairReport {
    /// Cargo-side records whose carrier no longer exists.
    pub dropped_assignments: Vec<DroppedLink>,
    /// Carrier-side entries that could not be restored.
    pub dropped_cargo: Vec<DroppedLink>,
}

impl RepairReport {
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.dropped_assignments.is_empty() && self.dropped_cargo.is_empty()
    }
}

impl Hangar {
    /// Resolve every placeholder reference and rebuild every carrier.
    ///
    /// Running this on already-resolved data changes nothing.
    pub fn fix_references(&mut self) -> RepairReport {
        let mut report = RepairReport::default();
        for id in self.ids() {
            for kind in TransportKind::ALL {
                self.fix_assignment(id, kind, &mut report);
            }
        }
        for id in self.ids() {
            self.repair_carrier::<ShipTransport>(id, &mut report);
            self.repair_carrier::<TacticalTransport>(id, &mut report);
            self.repair_carrier::<TowTransport>(id, &mut report);
        }
        if !report.is_clean() {
            log::warn!(
                "reference repair dropped {} assignments and {} cargo entries",
                report.dropped_assignments.len(),
                report.dropped_cargo.len()
            );
        }
        report
    }

    fn fix_assignment(&mut self, owner: UnitId, kind: TransportKind, report: &mut RepairReport) {
        let Some(mut record) = self
            .unit(owner)
            .and_then(|unit| unit.assignment(kind))
            .cloned()
        else {
            return;
        };
        let resolution = record.fix_references(self, owner, kind);
        let carrier = record.carrier_ref().id();
        let Some(unit) = self.unit_mut(owner) else {
            return;
        };
        match resolution {
            Resolution::Resolved => unit.set_assignment(kind, record),
            Resolution::Dangling => {
                unit.clear_assignment(kind);
                report.dropped_assignments.push(DroppedLink {
                    kind,
                    carrier,
                    cargo: owner,
                });
            }
        }
    }

    /// Replay one carrier's recorded cargo for one relationship kind.
    fn repair_carrier<P: TransportPolicy>(&mut self, carrier: UnitId, report: &mut RepairReport) {
        let Some(unit) = self.unit_mut(carrier) else {
            return;
        };
        let summary = unit.summary_mut(P::KIND);
        let recorded: Vec<UnitId> = summary.cargo().iter().copied().collect();
        summary.clear_cargo();

        for cargo in recorded {
            let Some(cargo_unit) = self.unit(cargo) else {
                log::error!(
                    "{carrier} lists {cargo} as {} cargo, but {cargo} is not in the hangar",
                    P::KIND
                );
                report.dropped_cargo.push(DroppedLink {
                    kind: P::KIND,
                    carrier,
                    cargo,
                });
                continue;
            };
            let Some(record) = cargo_unit.assignment(P::KIND) else {
                log::warn!("{carrier} lists {cargo} as {} cargo, but {cargo} has no assignment", P::KIND);
                report.dropped_cargo.push(DroppedLink {
                    kind: P::KIND,
                    carrier,
                    cargo,
                });
                continue;
            };
            if record.carrier() != Some(carrier) {
                log::warn!(
                    "{carrier} lists {cargo} as {} cargo, but {cargo} is assigned elsewhere",
                    P::KIND
                );
                report.dropped_cargo.push(DroppedLink {
                    kind: P::KIND,
                    carrier,
                    cargo,
                });
                continue;
            }
            let target = record.target().or_else(|| {
                self.unit(carrier)
                    .and_then(|carrier_unit| P::select_slot(self, carrier_unit, cargo_unit))
            });
            match target {
                Some(target) => self.attach(P::KIND, carrier, cargo, target),
                None => {
                    log::error!(
                        "{cargo} has no slot on {carrier} for {}; clearing its assignment",
                        P::KIND
                    );
                    if let Some(unit) = self.unit_mut(cargo) {
                        unit.clear_assignment(P::KIND);
                    }
                    report.dropped_cargo.push(DroppedLink {
                        kind: P::KIND,
                        carrier,
                        cargo,
                    });
                }
            }
        }
        P::refresh(self, carrier);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::slot::{SlotInstance, SlotType};
    use crate::unit::{Unit, UnitKind};

    fn saved_hangar() -> String {
        let mut hangar = Hangar::new();
        hangar.add_unit(
            Unit::new(UnitId(1), "Union", UnitKind::DropShip, 3600.0)
                .with_slots([SlotInstance::new(SlotType::MekBay, 1, 2.0)]),
        );
        hangar.add_unit(Unit::new(UnitId(2), "Atlas", UnitKind::Mek, 100.0));
        hangar.add_unit(Unit::new(UnitId(3), "Locust", UnitKind::Mek, 20.0));
        hangar
            .load_into_bay(UnitId(1), &[UnitId(2), UnitId(3)])
            .unwrap();
        hangar.to_json().unwrap()
    }

    #[test]
    fn clean_save_restores_every_link() {
        let mut hangar = Hangar::from_json(&saved_hangar()).unwrap();
        assert!(hangar.carrier_of(UnitId(2), TransportKind::Ship).is_none());

        let report = hangar.fix_references();
        assert!(report.is_clean());
        assert_eq!(
            hangar.carrier_of(UnitId(2), TransportKind::Ship),
            Some(UnitId(1))
        );
        let summary = hangar.summary(UnitId(1), TransportKind::Ship).unwrap();
        assert_eq!(summary.cargo().len(), 2);
        assert!(summary.remaining_capacity(SlotType::MekBay).abs() < f64::EPSILON);
    }

    #[test]
    fn second_pass_is_a_no_op() {
        let mut hangar = Hangar::from_json(&saved_hangar()).unwrap();
        hangar.fix_references();
        let before = hangar.clone();
        let report = hangar.fix_references();
        assert!(report.is_clean());
        assert_eq!(hangar.to_json().unwrap(), before.to_json().unwrap());
        assert_eq!(
            hangar.summary(UnitId(1), TransportKind::Ship),
            before.summary(UnitId(1), TransportKind::Ship)
        );
    }

    #[test]
    fn missing_carrier_drops_the_assignment() {
        let mut value: serde_json::Value = serde_json::from_str(&saved_hangar()).unwrap();
        let units = value["units"].as_array_mut().unwrap();
        units.retain(|unit| unit["id"] != 1);
        let mut hangar = Hangar::from_json(&value.to_string()).unwrap();

        let report = hangar.fix_references();
        assert_eq!(report.dropped_assignments.len(), 2);
        assert!(hangar.unit(UnitId(2)).unwrap().assignment(TransportKind::Ship).is_none());
    }

    #[test]
    fn missing_cargo_is_dropped_from_the_carrier() {
        let mut value: serde_json::Value = serde_json::from_str(&saved_hangar()).unwrap();
        let units = value["units"].as_array_mut().unwrap();
        units.retain(|unit| unit["id"] != 3);
        let mut hangar = Hangar::from_json(&value.to_string()).unwrap();

        let report = hangar.fix_references();
        assert_eq!(
            report.dropped_cargo,
            vec![DroppedLink {
                kind: TransportKind::Ship,
                carrier: UnitId(1),
                cargo: UnitId(3)
            }]
        );
        let summary = hangar.summary(UnitId(1), TransportKind::Ship).unwrap();
        assert_eq!(summary.cargo().iter().copied().collect::<Vec<_>>(), vec![UnitId(2)]);
        assert!((summary.remaining_capacity(SlotType::MekBay) - 1.0).abs() < f64::EPSILON);
    }
}
