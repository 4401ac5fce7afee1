//! Random hangar builders shared by the scenarios.
use rand::Rng;
use rand_chacha::ChaCha8Rng;
use stowage_core::{
    Hangar, PlatoonType, SlotInstance, SlotType, TransportConfig, Unit, UnitId, UnitKind,
    VehicleClass,
};

/// Ids of the units a builder created, grouped by role.
#[derive(Debug, Clone, Default)]
pub struct Fleet {
    pub ships: Vec<UnitId>,
    pub transports: Vec<UnitId>,
    pub tractors: Vec<UnitId>,
    pub trailers: Vec<UnitId>,
    pub cargo: Vec<UnitId>,
    pub infantry: Vec<UnitId>,
}

impl Fleet {
    pub fn everyone(&self) -> Vec<UnitId> {
        let mut ids: Vec<UnitId> = self
            .ships
            .iter()
            .chain(&self.transports)
            .chain(&self.tractors)
            .chain(&self.trailers)
            .chain(&self.cargo)
            .chain(&self.infantry)
            .copied()
            .collect();
        ids.sort();
        ids.dedup();
        ids
    }
}

pub fn pick(rng: &mut ChaCha8Rng, ids: &[UnitId]) -> Option<UnitId> {
    if ids.is_empty() {
        None
    } else {
        Some(ids[rng.gen_range(0..ids.len())])
    }
}

const PLATOONS: [PlatoonType; 4] = [
    PlatoonType::Foot,
    PlatoonType::Jump,
    PlatoonType::Motorized,
    PlatoonType::Mechanized,
];

const CLASSES: [VehicleClass; 3] = [
    VehicleClass::Light,
    VehicleClass::Heavy,
    VehicleClass::SuperHeavy,
];

struct Builder<'a> {
    hangar: Hangar,
    fleet: Fleet,
    next_id: u32,
    rng: &'a mut ChaCha8Rng,
}

impl Builder<'_> {
    fn add(&mut self, name: &str, kind: UnitKind, weight: f64, slots: Vec<SlotInstance>) -> UnitId {
        let id = UnitId(self.next_id);
        self.next_id += 1;
        self.hangar
            .add_unit(Unit::new(id, format!("{name} {}", id.0), kind, weight).with_slots(slots));
        id
    }

    fn class(&mut self) -> VehicleClass {
        CLASSES[self.rng.gen_range(0..CLASSES.len())]
    }

    fn dropship(&mut self) -> UnitId {
        let mut slots = Vec::new();
        let mut number = 1;
        for slot_type in [
            SlotType::MekBay,
            SlotType::LightVehicleBay,
            SlotType::HeavyVehicleBay,
            SlotType::InfantryBay,
            SlotType::FighterBay,
        ] {
            for _ in 0..self.rng.gen_range(0..3) {
                let capacity = if slot_type == SlotType::InfantryBay {
                    f64::from(self.rng.gen_range(2..6_u32)) * 8.0
                } else {
                    f64::from(self.rng.gen_range(1..4_u32))
                };
                slots.push(SlotInstance::new(slot_type, number, capacity));
                number += 1;
            }
        }
        let weight = f64::from(self.rng.gen_range(1_500..10_000_u32));
        self.add("DropShip", UnitKind::DropShip, weight, slots)
    }

    fn apc(&mut self) -> UnitId {
        let capacity = f64::from(self.rng.gen_range(2..8_u32));
        let weight = f64::from(self.rng.gen_range(20..60_u32));
        self.add(
            "APC",
            UnitKind::Vehicle {
                class: VehicleClass::Light,
            },
            weight,
            vec![
                SlotInstance::new(SlotType::InfantryCompartment, 1, capacity),
                SlotInstance::new(SlotType::TrailerHitch, 2, 0.0),
            ],
        )
    }

    fn trailer(&mut self) -> UnitId {
        let class = self.class();
        let weight = f64::from(self.rng.gen_range(5..40_u32));
        self.add(
            "Trailer",
            UnitKind::Trailer { class },
            weight,
            vec![SlotInstance::new(SlotType::TrailerHitch, 1, 0.0)],
        )
    }

    fn mek(&mut self) -> UnitId {
        let weight = f64::from(self.rng.gen_range(4..21_u32)) * 5.0;
        self.add("Mek", UnitKind::Mek, weight, Vec::new())
    }

    fn tank(&mut self) -> UnitId {
        let class = self.class();
        let weight = f64::from(self.rng.gen_range(10..80_u32));
        self.add("Tank", UnitKind::Vehicle { class }, weight, Vec::new())
    }

    fn squad(&mut self) -> UnitId {
        let platoon = PLATOONS[self.rng.gen_range(0..PLATOONS.len())];
        let troopers = self.rng.gen_range(5..45_u32);
        let weight = f64::from(troopers) * 0.1;
        self.add("Squad", UnitKind::Infantry { platoon, troopers }, weight, Vec::new())
    }

    fn fighter(&mut self) -> UnitId {
        let weight = f64::from(self.rng.gen_range(20..100_u32));
        self.add("Fighter", UnitKind::Fighter, weight, Vec::new())
    }
}

/// A mixed hangar: DropShips with random bays, APCs with compartments and
/// hitches, trailers, and an assortment of cargo.
pub fn random_fleet(rng: &mut ChaCha8Rng, config: TransportConfig) -> (Hangar, Fleet) {
    let mut builder = Builder {
        hangar: Hangar::with_config(config),
        fleet: Fleet::default(),
        next_id: 1,
        rng,
    };
    for _ in 0..builder.rng.gen_range(1..4) {
        let id = builder.dropship();
        builder.fleet.ships.push(id);
    }
    for _ in 0..builder.rng.gen_range(1..4) {
        let id = builder.apc();
        builder.fleet.transports.push(id);
        builder.fleet.tractors.push(id);
        builder.fleet.cargo.push(id);
    }
    for _ in 0..builder.rng.gen_range(1..5) {
        let id = builder.trailer();
        builder.fleet.trailers.push(id);
    }
    for _ in 0..builder.rng.gen_range(2..8) {
        let id = match builder.rng.gen_range(0..3) {
            0 => builder.mek(),
            1 => builder.tank(),
            _ => builder.fighter(),
        };
        builder.fleet.cargo.push(id);
    }
    for _ in 0..builder.rng.gen_range(1..6) {
        let id = builder.squad();
        builder.fleet.infantry.push(id);
        builder.fleet.cargo.push(id);
    }
    (builder.hangar, builder.fleet)
}
