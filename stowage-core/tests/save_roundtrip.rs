use stowage_core::{
    Hangar, PlatoonType, SlotInstance, SlotType, TransportConfig, TransportKind, Unit, UnitId,
    UnitKind, VehicleClass, audit,
};

fn campaign() -> Hangar {
    let mut hangar = Hangar::new();
    hangar.add_unit(
        Unit::new(UnitId(1), "Invader", UnitKind::JumpShip, 152_000.0)
            .with_slots([SlotInstance::new(SlotType::DockingCollar, 1, 3.0)]),
    );
    hangar.add_unit(
        Unit::new(UnitId(2), "Union", UnitKind::DropShip, 3600.0).with_slots([
            SlotInstance::new(SlotType::MekBay, 1, 2.0).with_doors(2),
            SlotInstance::new(SlotType::MekBay, 2, 2.0),
            SlotInstance::new(SlotType::InfantryBay, 3, 10.0),
        ]),
    );
    hangar.add_unit(Unit::new(UnitId(3), "Atlas", UnitKind::Mek, 100.0));
    hangar.add_unit(Unit::new(UnitId(4), "Griffin", UnitKind::Mek, 55.0));
    hangar.add_unit(Unit::new(
        UnitId(5),
        "Rifles",
        UnitKind::Infantry {
            platoon: PlatoonType::Foot,
            troopers: 28,
        },
        3.0,
    ));
    hangar.add_unit(
        Unit::new(
            UnitId(6),
            "Hauler",
            UnitKind::Vehicle {
                class: VehicleClass::Heavy,
            },
            60.0,
        )
        .with_slots([SlotInstance::new(SlotType::TrailerHitch, 1, 0.0)]),
    );
    hangar.add_unit(Unit::new(
        UnitId(7),
        "Supply Trailer",
        UnitKind::Trailer {
            class: VehicleClass::Heavy,
        },
        20.0,
    ));

    hangar.load_into_bay(UnitId(1), &[UnitId(2)]).unwrap();
    hangar
        .load_into_bay(UnitId(2), &[UnitId(3), UnitId(4), UnitId(5)])
        .unwrap();
    hangar.tow_trailer(UnitId(6), UnitId(7), None).unwrap();
    hangar
}

#[test]
fn saved_campaign_comes_back_identical() {
    let hangar = campaign();
    assert!(audit(&hangar).is_empty());

    let json = hangar.to_json().unwrap();
    let (restored, report) = Hangar::load_json(&json, TransportConfig::default()).unwrap();
    assert!(report.is_clean());
    assert!(audit(&restored).is_empty());
    for unit in hangar.units() {
        let twin = restored.unit(unit.id).unwrap();
        assert_eq!(twin, unit, "{} changed across save/load", unit.name);
    }
}

#[test]
fn bay_numbers_survive_the_slot_hash() {
    let hangar = campaign();
    let bay_of = |hangar: &Hangar, id: u32| {
        hangar
            .unit(UnitId(id))
            .and_then(|unit| unit.assignment(TransportKind::Ship))
            .and_then(|record| record.slot_instance())
            .map(|bay| (bay.slot_type, bay.number, bay.doors))
    };
    let (restored, _) =
        Hangar::load_json(&hangar.to_json().unwrap(), TransportConfig::default()).unwrap();
    for id in [2, 3, 4, 5] {
        assert_eq!(bay_of(&restored, id), bay_of(&hangar, id));
    }
    assert_eq!(bay_of(&restored, 3), Some((SlotType::MekBay, 1, 2)));
}

#[test]
fn repair_is_idempotent() {
    let json = campaign().to_json().unwrap();
    let (mut restored, _) = Hangar::load_json(&json, TransportConfig::default()).unwrap();
    let snapshot = restored.clone();
    let report = restored.fix_references();
    assert!(report.is_clean());
    for unit in snapshot.units() {
        assert_eq!(restored.unit(unit.id), Some(unit));
    }
}

#[test]
fn refit_between_save_and_load_falls_back_to_slot_type() {
    let hangar = campaign();
    let mut value: serde_json::Value = serde_json::from_str(&hangar.to_json().unwrap()).unwrap();
    // Bay 1 gets a second door fitted out of band, changing its hash.
    for unit in value["units"].as_array_mut().unwrap() {
        if unit["id"] == 2 {
            unit["slots"][0]["doors"] = serde_json::json!(3);
        }
    }
    let (restored, report) =
        Hangar::load_json(&value.to_string(), TransportConfig::default()).unwrap();
    assert!(report.is_clean());
    let record = restored
        .unit(UnitId(3))
        .and_then(|unit| unit.assignment(TransportKind::Ship))
        .unwrap();
    assert_eq!(record.carrier(), Some(UnitId(2)));
    assert!(!record.has_slot_instance());
    assert_eq!(record.slot_type(), Some(SlotType::MekBay));
    assert!(audit(&restored).is_empty());
}

#[test]
fn dangling_links_are_dropped_and_reported() {
    let hangar = campaign();
    let mut value: serde_json::Value = serde_json::from_str(&hangar.to_json().unwrap()).unwrap();
    value["units"]
        .as_array_mut()
        .unwrap()
        .retain(|unit| unit["id"] != 4 && unit["id"] != 6);

    let (restored, report) =
        Hangar::load_json(&value.to_string(), TransportConfig::default()).unwrap();
    assert_eq!(report.dropped_assignments.len(), 1);
    assert_eq!(report.dropped_assignments[0].cargo, UnitId(7));
    assert_eq!(report.dropped_cargo.len(), 1);
    assert_eq!(report.dropped_cargo[0].cargo, UnitId(4));

    assert!(restored.carrier_of(UnitId(7), TransportKind::Tow).is_none());
    let union = restored.summary(UnitId(2), TransportKind::Ship).unwrap();
    assert!(!union.carries(UnitId(4)));
    assert!((union.remaining_capacity(SlotType::MekBay) - 3.0).abs() < 1e-9);
    assert!(audit(&restored).is_empty());
}
