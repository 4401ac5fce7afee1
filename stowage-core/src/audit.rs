//! Consistency checks over a whole hangar.
//!
//! Recomputes every ledger independently of the cached copy and cross-checks
//! both sides of every relationship.
use serde::Serialize;
use std::fmt;

use crate::hangar::Hangar;
use crate::ledger::CapacityLedger;
use crate::numbers::capacity_eq;
use crate::slot::SlotType;
use crate::unit::{TransportKind, Unit, UnitId};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "violation", rename_all = "snake_case")]
pub enum Violation {
    /// Listed in a carrier's cargo set without a matching assignment.
    CargoWithoutAssignment {
        kind: TransportKind,
        carrier: UnitId,
        cargo: UnitId,
    },
    /// Assigned to a carrier that does not list it.
    AssignmentNotListed {
        kind: TransportKind,
        carrier: UnitId,
        cargo: UnitId,
    },
    /// Assignment still holds a placeholder carrier.
    UnresolvedCarrier { kind: TransportKind, cargo: UnitId },
    /// Cached remaining capacity disagrees with a fresh computation.
    LedgerDrift {
        kind: TransportKind,
        carrier: UnitId,
        slot_type: SlotType,
        expected: f64,
        actual: f64,
    },
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CargoWithoutAssignment {
                kind,
                carrier,
                cargo,
            } => write!(f, "{carrier} lists {cargo} for {kind} but {cargo} is not assigned to it"),
            Self::AssignmentNotListed {
                kind,
                carrier,
                cargo,
            } => write!(f, "{cargo} is assigned to {carrier} for {kind} but is not listed"),
            Self::UnresolvedCarrier { kind, cargo } => {
                write!(f, "{cargo} has an unresolved {kind} carrier")
            }
            Self::LedgerDrift {
                kind,
                carrier,
                slot_type,
                expected,
                actual,
            } => write!(
                f,
                "{carrier} {kind} {slot_type}: expected {expected:.2}, ledger holds {actual:.2}"
            ),
        }
    }
}

/// Every inconsistency found, in unit id order.
#[must_use]
pub fn audit(hangar: &Hangar) -> Vec<Violation> {
    let mut violations = Vec::new();
    for unit in hangar.units() {
        for kind in TransportKind::ALL {
            check_links(hangar, unit, kind, &mut violations);
            check_ledger(hangar, unit, kind, &mut violations);
        }
    }
    violations
}

fn check_links(hangar: &Hangar, unit: &Unit, kind: TransportKind, out: &mut Vec<Violation>) {
    for &cargo in unit.summary(kind).cargo() {
        if hangar.carrier_of(cargo, kind) != Some(unit.id) {
            out.push(Violation::CargoWithoutAssignment {
                kind,
                carrier: unit.id,
                cargo,
            });
        }
    }
    let Some(record) = unit.assignment(kind) else {
        return;
    };
    let Some(carrier) = record.carrier() else {
        out.push(Violation::UnresolvedCarrier {
            kind,
            cargo: unit.id,
        });
        return;
    };
    let listed = hangar
        .summary(carrier, kind)
        .is_some_and(|summary| summary.carries(unit.id));
    if !listed {
        out.push(Violation::AssignmentNotListed {
            kind,
            carrier,
            cargo: unit.id,
        });
    }
}

fn expected_ledger(hangar: &Hangar, unit: &Unit, kind: TransportKind) -> CapacityLedger {
    let mut ledger = CapacityLedger::installed_for(unit.slots(), kind);
    if kind == TransportKind::Tow {
        if unit.has_slot_type(SlotType::TrailerHitch) {
            ledger.install(SlotType::TrailerHitch, hangar.tow_capacity(unit.id).amount());
        }
        return ledger;
    }
    for cargo in hangar
        .units()
        .filter(|cargo| cargo.carrier(kind) == Some(unit.id))
    {
        if let Some(slot_type) = cargo.assignment(kind).and_then(|record| record.slot_type()) {
            ledger.deduct(slot_type, cargo.usage_in(slot_type, hangar.config()));
        }
    }
    ledger
}

fn check_ledger(hangar: &Hangar, unit: &Unit, kind: TransportKind, out: &mut Vec<Violation>) {
    let expected = expected_ledger(hangar, unit, kind);
    let actual = unit.summary(kind).ledger();
    let slot_types = expected
        .slot_types_present()
        .into_iter()
        .chain(actual.slot_types_present());
    let mut reported = Vec::new();
    for slot_type in slot_types {
        if reported.contains(&slot_type) {
            continue;
        }
        let (want, got) = (expected.remaining(slot_type), actual.remaining(slot_type));
        if !capacity_eq(want, got) {
            reported.push(slot_type);
            out.push(Violation::LedgerDrift {
                kind,
                carrier: unit.id,
                slot_type,
                expected: want,
                actual: got,
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::slot::SlotInstance;
    use crate::unit::UnitKind;

    fn hangar() -> Hangar {
        let mut hangar = Hangar::new();
        hangar.add_unit(
            Unit::new(UnitId(1), "Union", UnitKind::DropShip, 3600.0)
                .with_slots([SlotInstance::new(SlotType::MekBay, 1, 2.0)]),
        );
        hangar.add_unit(Unit::new(UnitId(2), "Atlas", UnitKind::Mek, 100.0));
        hangar
    }

    #[test]
    fn consistent_hangar_has_no_violations() {
        let mut hangar = hangar();
        hangar.load_into_bay(UnitId(1), &[UnitId(2)]).unwrap();
        assert!(audit(&hangar).is_empty());
    }

    #[test]
    fn tampered_ledger_is_reported() {
        let mut hangar = hangar();
        hangar.load_into_bay(UnitId(1), &[UnitId(2)]).unwrap();
        if let Some(unit) = hangar.unit_mut(UnitId(1)) {
            unit.summary_mut(TransportKind::Ship)
                .set_remaining_capacity(SlotType::MekBay, 2.0);
        }
        let violations = audit(&hangar);
        assert_eq!(violations.len(), 1);
        assert!(violations[0].to_string().contains("expected 1.00"));
    }

    #[test]
    fn one_sided_links_are_reported() {
        let mut hangar = hangar();
        hangar.load_into_bay(UnitId(1), &[UnitId(2)]).unwrap();
        if let Some(unit) = hangar.unit_mut(UnitId(1)) {
            unit.summary_mut(TransportKind::Ship).clear_cargo();
        }
        assert!(audit(&hangar).contains(&Violation::AssignmentNotListed {
            kind: TransportKind::Ship,
            carrier: UnitId(1),
            cargo: UnitId(2)
        }));

        let pending = Hangar::from_json(&hangar.to_json().unwrap()).unwrap();
        assert!(audit(&pending).contains(&Violation::UnresolvedCarrier {
            kind: TransportKind::Ship,
            cargo: UnitId(2)
        }));
    }
}
