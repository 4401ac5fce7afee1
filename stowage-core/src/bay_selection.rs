//! Picking the installed bay a cargo unit should ride in.
use crate::config::TransportConfig;
use crate::constants::CAPACITY_EPSILON;
use crate::hangar::Hangar;
use crate::slot::{SlotInstance, SlotType, capable_slot_types};
use crate::unit::{TransportKind, Unit};

/// Chooses a concrete bay for ship transport.
pub trait BaySelector {
    fn select_bay(&self, hangar: &Hangar, carrier: &Unit, cargo: &Unit) -> Option<SlotInstance>;
}

/// Walks the cargo's capable slot types in preference order and, within the
/// first type that fits, takes the instance with the least free capacity.
///
/// Ties go to the lower bay number.
#[derive(Debug, Clone, Copy, Default)]
pub struct SmallestFitSelector;

impl BaySelector for SmallestFitSelector {
    fn select_bay(&self, hangar: &Hangar, carrier: &Unit, cargo: &Unit) -> Option<SlotInstance> {
        let config = hangar.config();
        for slot_type in capable_slot_types(&cargo.kind) {
            if !slot_type.serves(TransportKind::Ship) {
                continue;
            }
            if slot_type == SlotType::DockingCollar && !collar_allowed(config, carrier) {
                continue;
            }
            let needed = cargo.usage_in(slot_type, config);
            // Type-level room covers cargo recorded without a concrete bay.
            let pooled = carrier.summary(TransportKind::Ship).remaining_capacity(slot_type);
            if pooled + CAPACITY_EPSILON < needed {
                continue;
            }
            let best = carrier
                .slots()
                .iter()
                .filter(|slot| slot.slot_type == slot_type)
                .map(|slot| (slot, slot.capacity - bay_occupancy(hangar, carrier, slot)))
                .filter(|(_, free)| *free + CAPACITY_EPSILON >= needed)
                .min_by(|(a, a_free), (b, b_free)| {
                    a_free.total_cmp(b_free).then(a.number.cmp(&b.number))
                });
            if let Some((slot, _)) = best {
                return Some(slot.clone());
            }
        }
        None
    }
}

/// Capacity already used in one bay by ship cargo recorded against it.
#[must_use]
pub fn bay_occupancy(hangar: &Hangar, carrier: &Unit, bay: &SlotInstance) -> f64 {
    carrier
        .summary(TransportKind::Ship)
        .cargo()
        .iter()
        .filter_map(|id| hangar.unit(*id))
        .filter(|unit| {
            unit.assignment(TransportKind::Ship)
                .and_then(|record| record.slot_instance())
                .is_some_and(|slot| slot.same_slot(bay))
        })
        .map(|unit| unit.usage_in(bay.slot_type, hangar.config()))
        .sum()
}

/// Whether DropShips may dock at this carrier's collars.
#[must_use]
pub const fn collar_allowed(config: &TransportConfig, carrier: &Unit) -> bool {
    !config.collars_on_large_vessels_only || carrier.kind.is_large_vessel()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::unit::{PlatoonType, UnitId, UnitKind, VehicleClass};

    fn light_tank(id: u32) -> Unit {
        Unit::new(
            UnitId(id),
            "Scorpion",
            UnitKind::Vehicle {
                class: VehicleClass::Light,
            },
            25.0,
        )
    }

    #[test]
    fn tightest_bay_wins() {
        let mut hangar = Hangar::new();
        hangar.add_unit(
            Unit::new(UnitId(1), "Triumph", UnitKind::DropShip, 4200.0).with_slots([
                SlotInstance::new(SlotType::LightVehicleBay, 1, 6.0),
                SlotInstance::new(SlotType::LightVehicleBay, 2, 2.0),
                SlotInstance::new(SlotType::LightVehicleBay, 3, 2.0),
            ]),
        );
        hangar.add_unit(light_tank(2));
        let carrier = hangar.unit(UnitId(1)).unwrap();
        let cargo = hangar.unit(UnitId(2)).unwrap();
        let bay = SmallestFitSelector.select_bay(&hangar, carrier, cargo).unwrap();
        assert_eq!(bay.number, 2);
    }

    #[test]
    fn full_bays_are_skipped_for_the_next_capable_type() {
        let mut hangar = Hangar::new();
        hangar.add_unit(
            Unit::new(UnitId(1), "Triumph", UnitKind::DropShip, 4200.0).with_slots([
                SlotInstance::new(SlotType::LightVehicleBay, 1, 1.0),
                SlotInstance::new(SlotType::HeavyVehicleBay, 2, 1.0),
            ]),
        );
        hangar.add_unit(light_tank(2));
        hangar.add_unit(light_tank(3));
        hangar.load_into_bay(UnitId(1), &[UnitId(2)]).unwrap();

        let carrier = hangar.unit(UnitId(1)).unwrap();
        let cargo = hangar.unit(UnitId(3)).unwrap();
        let bay = SmallestFitSelector.select_bay(&hangar, carrier, cargo).unwrap();
        assert_eq!(bay.slot_type, SlotType::HeavyVehicleBay);
    }

    #[test]
    fn infantry_bays_are_sized_by_platoon() {
        let mut hangar = Hangar::new();
        hangar.add_unit(
            Unit::new(UnitId(1), "Leopard", UnitKind::DropShip, 1900.0).with_slots([
                SlotInstance::new(SlotType::InfantryBay, 1, 8.0),
                SlotInstance::new(SlotType::InfantryBay, 2, 16.0),
            ]),
        );
        // 40 mechanized troopers make two platoons of eight tons.
        hangar.add_unit(Unit::new(
            UnitId(2),
            "Mech Rifles",
            UnitKind::Infantry {
                platoon: PlatoonType::Mechanized,
                troopers: 40,
            },
            4.0,
        ));
        let carrier = hangar.unit(UnitId(1)).unwrap();
        let cargo = hangar.unit(UnitId(2)).unwrap();
        let bay = SmallestFitSelector.select_bay(&hangar, carrier, cargo).unwrap();
        assert_eq!(bay.number, 2);
    }

    #[test]
    fn collars_need_a_large_vessel() {
        let collar = SlotInstance::new(SlotType::DockingCollar, 1, 1.0);
        let mut hangar = Hangar::new();
        hangar.add_unit(
            Unit::new(UnitId(1), "Odd DropShip", UnitKind::DropShip, 5000.0)
                .with_slots([collar.clone()]),
        );
        hangar.add_unit(
            Unit::new(UnitId(2), "Invader", UnitKind::JumpShip, 152_000.0).with_slots([collar]),
        );
        hangar.add_unit(Unit::new(UnitId(3), "Union", UnitKind::DropShip, 3600.0));

        let cargo = hangar.unit(UnitId(3)).unwrap();
        let dropship = hangar.unit(UnitId(1)).unwrap();
        assert!(SmallestFitSelector.select_bay(&hangar, dropship, cargo).is_none());
        let jumpship = hangar.unit(UnitId(2)).unwrap();
        assert!(SmallestFitSelector.select_bay(&hangar, jumpship, cargo).is_some());
        assert!(collar_allowed(
            &TransportConfig {
                collars_on_large_vessels_only: false,
                ..TransportConfig::default()
            },
            dropship
        ));
    }
}
