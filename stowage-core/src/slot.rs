//! Slot types, concrete slot instances and the capability mapping.
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::fmt;
use std::hash::Hasher;
use twox_hash::XxHash64;

use crate::constants::SLOT_HASH_SEED;
use crate::unit::{TransportKind, UnitKind, VehicleClass};

/// Slot types a single cargo unit could occupy, most specific first.
pub type SlotTypeSet = SmallVec<[SlotType; 4]>;

/// How a slot type's capacity is measured.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CapacityBasis {
    /// Tons of cargo.
    Weight,
    /// Whole units, one per occupant.
    Count,
}

/// Category of carrying capacity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SlotType {
    MekBay,
    ProtoMekBay,
    LightVehicleBay,
    HeavyVehicleBay,
    SuperHeavyVehicleBay,
    InfantryBay,
    BattleArmorBay,
    FighterBay,
    SmallCraftBay,
    DockingCollar,
    InfantryCompartment,
    BattleArmorHandles,
    TrailerHitch,
}

impl SlotType {
    pub const ALL: [Self; 13] = [
        Self::MekBay,
        Self::ProtoMekBay,
        Self::LightVehicleBay,
        Self::HeavyVehicleBay,
        Self::SuperHeavyVehicleBay,
        Self::InfantryBay,
        Self::BattleArmorBay,
        Self::FighterBay,
        Self::SmallCraftBay,
        Self::DockingCollar,
        Self::InfantryCompartment,
        Self::BattleArmorHandles,
        Self::TrailerHitch,
    ];

    /// Stable key used for labels and slot hashes.
    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::MekBay => "mek_bay",
            Self::ProtoMekBay => "protomek_bay",
            Self::LightVehicleBay => "light_vehicle_bay",
            Self::HeavyVehicleBay => "heavy_vehicle_bay",
            Self::SuperHeavyVehicleBay => "super_heavy_vehicle_bay",
            Self::InfantryBay => "infantry_bay",
            Self::BattleArmorBay => "battle_armor_bay",
            Self::FighterBay => "fighter_bay",
            Self::SmallCraftBay => "small_craft_bay",
            Self::DockingCollar => "docking_collar",
            Self::InfantryCompartment => "infantry_compartment",
            Self::BattleArmorHandles => "battle_armor_handles",
            Self::TrailerHitch => "trailer_hitch",
        }
    }

    #[must_use]
    pub const fn basis(self) -> CapacityBasis {
        match self {
            Self::InfantryBay | Self::InfantryCompartment | Self::TrailerHitch => {
                CapacityBasis::Weight
            }
            _ => CapacityBasis::Count,
        }
    }

    /// Bays and docking collars found on large vessels.
    #[must_use]
    pub const fn is_bay(self) -> bool {
        !matches!(
            self,
            Self::InfantryCompartment | Self::BattleArmorHandles | Self::TrailerHitch
        )
    }

    /// Whether capacity of this type is accounted under the given relationship.
    #[must_use]
    pub const fn serves(self, kind: TransportKind) -> bool {
        match kind {
            TransportKind::Ship => self.is_bay(),
            TransportKind::Tactical => !matches!(self, Self::TrailerHitch | Self::DockingCollar),
            TransportKind::Tow => matches!(self, Self::TrailerHitch),
        }
    }
}

impl fmt::Display for SlotType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// One concrete, addressable slot installed on a carrier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SlotInstance {
    pub slot_type: SlotType,
    /// Bay number shown to players; unique per slot type on a carrier.
    pub number: u16,
    /// Installed capacity in the slot type's basis.
    pub capacity: f64,
    #[serde(default)]
    pub doors: u8,
}

impl SlotInstance {
    #[must_use]
    pub const fn new(slot_type: SlotType, number: u16, capacity: f64) -> Self {
        Self {
            slot_type,
            number,
            capacity,
            doors: 1,
        }
    }

    #[must_use]
    pub const fn with_doors(mut self, doors: u8) -> Self {
        self.doors = doors;
        self
    }

    /// Stable hash standing in for the instance in saved games.
    #[must_use]
    pub fn stable_hash(&self) -> u64 {
        let mut hasher = XxHash64::with_seed(SLOT_HASH_SEED);
        hasher.write(self.slot_type.key().as_bytes());
        hasher.write(&self.number.to_le_bytes());
        hasher.write(&self.capacity.to_bits().to_le_bytes());
        hasher.write(&[self.doors]);
        hasher.finish()
    }

    /// Same physical slot (type and number), ignoring capacity changes.
    #[must_use]
    pub fn same_slot(&self, other: &Self) -> bool {
        self.slot_type == other.slot_type && self.number == other.number
    }
}

impl fmt::Display for SlotInstance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} #{}", self.slot_type, self.number)
    }
}

/// Caller's choice of where cargo should ride.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SlotTarget {
    Instance(SlotInstance),
    Type(SlotType),
}

impl SlotTarget {
    #[must_use]
    pub const fn slot_type(&self) -> SlotType {
        match self {
            Self::Instance(slot) => slot.slot_type,
            Self::Type(slot_type) => *slot_type,
        }
    }

    #[must_use]
    pub const fn instance(&self) -> Option<&SlotInstance> {
        match self {
            Self::Instance(slot) => Some(slot),
            Self::Type(_) => None,
        }
    }
}

impl From<SlotType> for SlotTarget {
    fn from(value: SlotType) -> Self {
        Self::Type(value)
    }
}

impl From<SlotInstance> for SlotTarget {
    fn from(value: SlotInstance) -> Self {
        Self::Instance(value)
    }
}

/// Every slot type that could ever carry a unit of the given kind.
///
/// Used to keep impossible load targets out of menus; ordering is preference
/// order for bay selection.
#[must_use]
pub fn capable_slot_types(kind: &UnitKind) -> SlotTypeSet {
    let mut types = SlotTypeSet::new();
    match kind {
        UnitKind::Mek => types.push(SlotType::MekBay),
        UnitKind::ProtoMek => types.push(SlotType::ProtoMekBay),
        UnitKind::Vehicle { class } => {
            types.extend(vehicle_bays(*class).iter().copied());
            types.push(SlotType::TrailerHitch);
        }
        UnitKind::Trailer { class } => {
            types.push(SlotType::TrailerHitch);
            types.extend(vehicle_bays(*class).iter().copied());
        }
        UnitKind::Infantry { .. } => {
            types.push(SlotType::InfantryBay);
            types.push(SlotType::InfantryCompartment);
        }
        UnitKind::BattleArmor => {
            types.push(SlotType::BattleArmorBay);
            types.push(SlotType::BattleArmorHandles);
            types.push(SlotType::InfantryCompartment);
        }
        UnitKind::Fighter => {
            types.push(SlotType::FighterBay);
            types.push(SlotType::SmallCraftBay);
        }
        UnitKind::SmallCraft => types.push(SlotType::SmallCraftBay),
        UnitKind::DropShip => types.push(SlotType::DockingCollar),
        UnitKind::JumpShip | UnitKind::WarShip | UnitKind::SpaceStation => {}
    }
    types
}

fn vehicle_bays(class: VehicleClass) -> &'static [SlotType] {
    match class {
        VehicleClass::Light => &[
            SlotType::LightVehicleBay,
            SlotType::HeavyVehicleBay,
            SlotType::SuperHeavyVehicleBay,
        ],
        VehicleClass::Heavy => &[SlotType::HeavyVehicleBay, SlotType::SuperHeavyVehicleBay],
        VehicleClass::SuperHeavy => &[SlotType::SuperHeavyVehicleBay],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::unit::PlatoonType;

    #[test]
    fn stable_hash_tracks_identity_fields() {
        let bay = SlotInstance::new(SlotType::LightVehicleBay, 4, 2.0);
        assert_eq!(bay.stable_hash(), bay.clone().stable_hash());
        assert_ne!(
            bay.stable_hash(),
            SlotInstance::new(SlotType::LightVehicleBay, 5, 2.0).stable_hash()
        );
        assert_ne!(
            bay.stable_hash(),
            SlotInstance::new(SlotType::HeavyVehicleBay, 4, 2.0).stable_hash()
        );
        assert_ne!(bay.stable_hash(), bay.clone().with_doors(2).stable_hash());
    }

    #[test]
    fn light_vehicles_fit_in_heavier_bays_but_not_the_reverse() {
        let light = capable_slot_types(&UnitKind::Vehicle {
            class: VehicleClass::Light,
        });
        assert_eq!(light[0], SlotType::LightVehicleBay);
        assert!(light.contains(&SlotType::SuperHeavyVehicleBay));

        let heavy = capable_slot_types(&UnitKind::Vehicle {
            class: VehicleClass::Heavy,
        });
        assert!(!heavy.contains(&SlotType::LightVehicleBay));
    }

    #[test]
    fn capital_ships_are_never_cargo() {
        assert!(capable_slot_types(&UnitKind::WarShip).is_empty());
        assert_eq!(
            capable_slot_types(&UnitKind::DropShip).as_slice(),
            &[SlotType::DockingCollar]
        );
        let infantry = capable_slot_types(&UnitKind::Infantry {
            platoon: PlatoonType::Foot,
            troopers: 28,
        });
        assert_eq!(infantry[0], SlotType::InfantryBay);
    }

    #[test]
    fn relationship_kinds_partition_slot_types() {
        assert!(SlotType::DockingCollar.serves(TransportKind::Ship));
        assert!(!SlotType::DockingCollar.serves(TransportKind::Tactical));
        assert!(SlotType::InfantryCompartment.serves(TransportKind::Tactical));
        assert!(!SlotType::InfantryCompartment.serves(TransportKind::Ship));
        assert!(SlotType::TrailerHitch.serves(TransportKind::Tow));
        let tow_slots: Vec<SlotType> = SlotType::ALL
            .into_iter()
            .filter(|slot| slot.serves(TransportKind::Tow))
            .collect();
        assert_eq!(tow_slots, vec![SlotType::TrailerHitch]);
        assert_eq!(SlotType::DockingCollar.basis(), CapacityBasis::Count);
        assert_eq!(SlotType::InfantryBay.basis(), CapacityBasis::Weight);
    }
}
