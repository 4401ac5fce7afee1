//! Unit registry and the bookkeeping shared by every relationship kind.
//!
//! The hangar is an arena: units refer to each other only by [`UnitId`], so a
//! carrier and its cargo never own one another. Every operation that touches
//! both sides of a relationship goes through `&mut Hangar`.
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

use crate::assignment::Assignment;
use crate::config::{CapacityPolicy, TransportConfig};
use crate::error::{TransportError, reject};
use crate::ledger::CapacityLedger;
use crate::numbers::is_positive_capacity;
use crate::policy::TransportPolicy;
use crate::repair::RepairReport;
use crate::ship::ShipTransport;
use crate::slot::{SlotInstance, SlotTarget, SlotType};
use crate::summary::TransportSummary;
use crate::tactical::TacticalTransport;
use crate::tow::TowTransport;
use crate::unit::{TransportKind, Unit, UnitId};

/// Outcome of loading several cargo units in one call.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LoadOutcome {
    /// Carriers the cargo was taken away from.
    pub previous_carriers: BTreeSet<UnitId>,
    pub loaded: Vec<UnitId>,
    /// Cargo that could not be placed, with the logged reason.
    pub rejected: Vec<(UnitId, TransportError)>,
}

impl LoadOutcome {
    #[must_use]
    pub fn all_loaded(&self) -> bool {
        self.rejected.is_empty()
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Hangar {
    #[serde(with = "units_serde")]
    units: BTreeMap<UnitId, Unit>,
    #[serde(skip)]
    config: TransportConfig,
}

impl Hangar {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_config(config: TransportConfig) -> Self {
        Self {
            units: BTreeMap::new(),
            config,
        }
    }

    #[must_use]
    pub const fn config(&self) -> &TransportConfig {
        &self.config
    }

    pub fn set_config(&mut self, config: TransportConfig) {
        self.config = config;
    }

    /// Register a unit and seed its ledgers from its installed slots.
    ///
    /// A unit already registered under the same id is removed first (detached
    /// from its carriers, its cargo unloaded) and returned.
    pub fn add_unit(&mut self, unit: Unit) -> Option<Unit> {
        let id = unit.id;
        let replaced = self.remove_unit(id);
        let carriers: Vec<(TransportKind, UnitId)> = TransportKind::ALL
            .into_iter()
            .filter_map(|kind| unit.carrier(kind).map(|carrier| (kind, carrier)))
            .collect();
        self.units.insert(id, unit);
        self.refresh_all_kinds(id);
        for (kind, carrier) in carriers {
            self.refresh_kind(kind, carrier);
        }
        replaced
    }

    #[must_use]
    pub fn unit(&self, id: UnitId) -> Option<&Unit> {
        self.units.get(&id)
    }

    pub(crate) fn unit_mut(&mut self, id: UnitId) -> Option<&mut Unit> {
        self.units.get_mut(&id)
    }

    #[must_use]
    pub fn contains(&self, id: UnitId) -> bool {
        self.units.contains_key(&id)
    }

    pub fn units(&self) -> impl Iterator<Item = &Unit> {
        self.units.values()
    }

    #[must_use]
    pub fn ids(&self) -> Vec<UnitId> {
        self.units.keys().copied().collect()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.units.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    /// Apply a function to every registered unit.
    pub fn for_each_unit_mut<F>(&mut self, mut f: F)
    where
        F: FnMut(&mut Unit),
    {
        for unit in self.units.values_mut() {
            f(unit);
        }
    }

    #[must_use]
    pub fn summary(&self, carrier: UnitId, kind: TransportKind) -> Option<&TransportSummary> {
        self.unit(carrier).map(|unit| unit.summary(kind))
    }

    /// Live carrier of a unit under the given relationship.
    #[must_use]
    pub fn carrier_of(&self, cargo: UnitId, kind: TransportKind) -> Option<UnitId> {
        self.unit(cargo).and_then(|unit| unit.carrier(kind))
    }

    #[must_use]
    pub fn remaining_capacity(
        &self,
        carrier: UnitId,
        kind: TransportKind,
        slot_type: SlotType,
    ) -> f64 {
        self.summary(carrier, kind)
            .map_or(0.0, |summary| summary.remaining_capacity(slot_type))
    }

    /// Units whose own assignment names `carrier`.
    fn live_cargo_of(&self, carrier: UnitId, kind: TransportKind) -> BTreeSet<UnitId> {
        self.units
            .values()
            .filter(|unit| unit.carrier(kind) == Some(carrier))
            .map(|unit| unit.id)
            .collect()
    }

    /// Rebuild one carrier's ledger and cargo set from scratch.
    ///
    /// The cargo set is reloaded from the cargo side (every unit whose
    /// assignment names this carrier), installed capacity is summed per slot
    /// type, and the policy derives what remains.
    pub fn rebuild_ledger_and_reload<P: TransportPolicy>(&mut self, carrier: UnitId) {
        let Some(unit) = self.units.get(&carrier) else {
            return;
        };
        let cargo = self.live_cargo_of(carrier, P::KIND);
        let mut ledger = CapacityLedger::installed_for(unit.slots(), P::KIND);
        P::recompute_from_installed(self, unit, &cargo, &mut ledger);

        if let Some(unit) = self.units.get_mut(&carrier) {
            let summary = unit.summary_mut(P::KIND);
            summary.replace_cargo(cargo);
            summary.replace_ledger(ledger);
        }
    }

    pub(crate) fn refresh_kind(&mut self, kind: TransportKind, carrier: UnitId) {
        match kind {
            TransportKind::Ship => ShipTransport::refresh(self, carrier),
            TransportKind::Tactical => TacticalTransport::refresh(self, carrier),
            TransportKind::Tow => TowTransport::refresh(self, carrier),
        }
    }

    fn refresh_all_kinds(&mut self, carrier: UnitId) {
        for kind in TransportKind::ALL {
            self.refresh_kind(kind, carrier);
        }
    }

    /// Replace a unit's installed slots (refit, battle damage) and rebuild
    /// every ledger it owns.
    ///
    /// Cargo riding in a slot that survives keeps it; cargo whose slot is gone
    /// keeps only the slot type.
    ///
    /// # Errors
    ///
    /// Returns `TransportError::UnknownUnit` if the unit is not registered.
    pub fn set_installed_slots(
        &mut self,
        id: UnitId,
        slots: Vec<SlotInstance>,
    ) -> Result<(), TransportError> {
        let Some(unit) = self.units.get_mut(&id) else {
            return reject(TransportError::UnknownUnit(id));
        };
        unit.slots = slots;
        let installed = unit.slots.clone();

        for kind in TransportKind::ALL {
            for cargo in self.live_cargo_of(id, kind) {
                let Some(cargo_unit) = self.units.get_mut(&cargo) else {
                    continue;
                };
                let Some(old) = cargo_unit
                    .assignment(kind)
                    .and_then(|record| record.slot_instance())
                    .cloned()
                else {
                    continue;
                };
                let target = installed
                    .iter()
                    .find(|slot| slot.same_slot(&old))
                    .cloned()
                    .map_or(SlotTarget::Type(old.slot_type), SlotTarget::Instance);
                cargo_unit.set_assignment(kind, Assignment::new(id, Some(target)));
            }
        }
        self.refresh_all_kinds(id);
        Ok(())
    }

    /// Change a unit's mass and refresh every ledger that depends on it.
    ///
    /// # Errors
    ///
    /// Returns `TransportError::UnknownUnit` if the unit is not registered.
    pub fn set_weight(&mut self, id: UnitId, weight: f64) -> Result<(), TransportError> {
        let Some(unit) = self.units.get_mut(&id) else {
            return reject(TransportError::UnknownUnit(id));
        };
        unit.weight = weight;
        let carriers: Vec<(TransportKind, UnitId)> = TransportKind::ALL
            .into_iter()
            .filter_map(|kind| unit.carrier(kind).map(|carrier| (kind, carrier)))
            .collect();
        for (kind, carrier) in carriers {
            self.refresh_kind(kind, carrier);
        }
        self.refresh_kind(TransportKind::Tow, id);
        Ok(())
    }

    /// Unload everything a carrier holds under one relationship kind.
    pub fn clear_transported_units(&mut self, carrier: UnitId, kind: TransportKind) {
        let mut released = Vec::new();
        self.for_each_unit_mut(|unit| {
            if unit.carrier(kind) == Some(carrier) {
                unit.clear_assignment(kind);
                released.push(unit.id);
            }
        });
        if let Some(unit) = self.units.get_mut(&carrier) {
            unit.summary_mut(kind).clear_cargo();
        }
        self.refresh_kind(kind, carrier);
        if kind == TransportKind::Tow {
            for trailer in released {
                self.refresh_kind(kind, trailer);
            }
        }
    }

    /// Remove a unit, detaching it from its carriers and unloading its cargo.
    pub fn remove_unit(&mut self, id: UnitId) -> Option<Unit> {
        let carriers: Vec<(TransportKind, UnitId)> = {
            let unit = self.units.get(&id)?;
            TransportKind::ALL
                .into_iter()
                .filter_map(|kind| unit.carrier(kind).map(|carrier| (kind, carrier)))
                .collect()
        };
        for (kind, carrier) in carriers {
            self.unload(kind, carrier, id);
        }
        for kind in TransportKind::ALL {
            self.clear_transported_units(id, kind);
        }
        log::debug!("{id} removed from the hangar");
        self.units.remove(&id)
    }

    /// Unload through the variant that owns the relationship kind.
    pub fn unload(&mut self, kind: TransportKind, carrier: UnitId, cargo: UnitId) -> bool {
        match kind {
            TransportKind::Ship => self.unload_from_bay(carrier, cargo),
            TransportKind::Tactical => self.unload_tactical(carrier, cargo),
            TransportKind::Tow => self.untow(carrier, cargo),
        }
    }

    /// Reject calls naming unknown units or a unit carrying itself.
    pub(crate) fn check_participants(
        &self,
        carrier: UnitId,
        cargo: &[UnitId],
    ) -> Result<(), TransportError> {
        if !self.contains(carrier) {
            return reject(TransportError::UnknownUnit(carrier));
        }
        for &id in cargo {
            if id == carrier {
                return reject(TransportError::SelfTransport(id));
            }
            if !self.contains(id) {
                return reject(TransportError::UnknownUnit(id));
            }
        }
        Ok(())
    }

    /// Validate a caller-supplied target against the carrier's inventory.
    ///
    /// Instances are swapped for the installed copy so the recorded hash
    /// matches what a later load will find.
    pub(crate) fn resolve_target(
        &self,
        carrier: UnitId,
        target: SlotTarget,
        kind: TransportKind,
    ) -> Result<SlotTarget, TransportError> {
        let slot_type = target.slot_type();
        if !slot_type.serves(kind) {
            return reject(TransportError::WrongSlotKind { slot_type, kind });
        }
        match target {
            SlotTarget::Type(_) => Ok(target),
            SlotTarget::Instance(slot) => {
                let installed = self
                    .unit(carrier)
                    .and_then(|unit| unit.find_slot(slot.slot_type, slot.number));
                match installed {
                    Some(found) => Ok(SlotTarget::Instance(found.clone())),
                    None => reject(TransportError::SlotNotInstalled {
                        carrier,
                        slot: slot.to_string(),
                    }),
                }
            }
        }
    }

    /// Apply the capacity policy to a prospective load.
    ///
    /// Cargo already aboard the same carrier in the same slot type is credited
    /// back first, since reloading it frees its current usage.
    pub(crate) fn check_capacity(
        &self,
        kind: TransportKind,
        carrier: UnitId,
        cargo: UnitId,
        target: &SlotTarget,
    ) -> Result<(), TransportError> {
        let (Some(carrier_unit), Some(cargo_unit)) = (self.unit(carrier), self.unit(cargo)) else {
            return reject(TransportError::UnknownUnit(cargo));
        };
        let slot_type = target.slot_type();
        let needed = cargo_unit.usage_in(slot_type, &self.config);
        let credit = cargo_unit
            .assignment(kind)
            .filter(|record| {
                record.carrier() == Some(carrier) && record.slot_type() == Some(slot_type)
            })
            .map_or(0.0, |_| needed);
        let remaining = carrier_unit.summary(kind).remaining_capacity(slot_type) + credit;
        if !is_positive_capacity(needed - remaining) {
            return Ok(());
        }
        let error = TransportError::InsufficientCapacity {
            carrier,
            cargo,
            slot_type,
            remaining,
            needed,
        };
        match self.config.capacity_policy {
            CapacityPolicy::Strict => reject(error),
            CapacityPolicy::Soft => {
                log::warn!("{error}; loading anyway");
                Ok(())
            }
        }
    }

    /// Detach `cargo` from whatever other carrier holds it under `P`.
    pub(crate) fn detach<P: TransportPolicy>(
        &mut self,
        cargo: UnitId,
        new_carrier: UnitId,
    ) -> Option<UnitId> {
        let previous = self.carrier_of(cargo, P::KIND)?;
        if previous == new_carrier {
            return None;
        }
        self.release::<P>(previous, cargo);
        log::debug!("{cargo} detached from {previous} ({})", P::KIND);
        Some(previous)
    }

    /// Write the assignment, add to the cargo set and deduct usage.
    pub(crate) fn attach(
        &mut self,
        kind: TransportKind,
        carrier: UnitId,
        cargo: UnitId,
        target: SlotTarget,
    ) {
        let slot_type = target.slot_type();
        let Some(cargo_unit) = self.units.get_mut(&cargo) else {
            return;
        };
        let usage = cargo_unit.usage_in(slot_type, &self.config);
        cargo_unit.set_assignment(kind, Assignment::new(carrier, Some(target)));

        if let Some(carrier_unit) = self.units.get_mut(&carrier) {
            let summary = carrier_unit.summary_mut(kind);
            summary.add_cargo(cargo);
            summary.ledger_mut().deduct(slot_type, usage);
            let remaining = summary.remaining_capacity(slot_type);
            if remaining < 0.0 && is_positive_capacity(-remaining) {
                log::warn!("{carrier} {slot_type} oversubscribed: {remaining:.2} remaining");
            }
        }
        log::debug!("{cargo} loaded onto {carrier} in {slot_type} ({kind})");
    }

    /// Shared load path: detach from the old carrier, then attach.
    pub(crate) fn board<P: TransportPolicy>(
        &mut self,
        carrier: UnitId,
        cargo: UnitId,
        target: SlotTarget,
    ) -> Option<UnitId> {
        let previous = self.detach::<P>(cargo, carrier);
        self.attach(P::KIND, carrier, cargo, target);
        previous
    }

    /// Shared unload path.
    ///
    /// The assignment is cleared only if it still names `carrier`; stale
    /// calls leave the cargo's newer relationship alone. The carrier is always
    /// refreshed afterwards.
    pub(crate) fn release<P: TransportPolicy>(&mut self, carrier: UnitId, cargo: UnitId) -> bool {
        let removed = self
            .units
            .get_mut(&carrier)
            .is_some_and(|unit| unit.summary_mut(P::KIND).remove_cargo(cargo));
        let cleared = self.units.get_mut(&cargo).is_some_and(|unit| {
            if unit.carrier(P::KIND) == Some(carrier) {
                unit.clear_assignment(P::KIND);
                true
            } else {
                false
            }
        });
        P::refresh(self, carrier);
        if removed || cleared {
            log::debug!("{cargo} unloaded from {carrier} ({})", P::KIND);
        }
        removed || cleared
    }

    /// Serialize for a saved game. Ledgers are left out.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Deserialize a saved game without resolving references.
    ///
    /// Assignments come back pending and ledgers empty until
    /// [`Hangar::fix_references`] runs.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON does not describe a hangar.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Deserialize and run the reference-repair pass.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON does not describe a hangar.
    pub fn load_json(
        json: &str,
        config: TransportConfig,
    ) -> Result<(Self, RepairReport), serde_json::Error> {
        let mut hangar = Self::from_json(json)?;
        hangar.set_config(config);
        let report = hangar.fix_references();
        Ok((hangar, report))
    }
}

/// Units are saved as a list; the map key is rebuilt from each unit's id.
mod units_serde {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::collections::BTreeMap;

    use crate::unit::{Unit, UnitId};

    pub fn serialize<S>(units: &BTreeMap<UnitId, Unit>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let list: Vec<&Unit> = units.values().collect();
        list.serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<BTreeMap<UnitId, Unit>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let list = Vec::<Unit>::deserialize(deserializer)?;
        Ok(list.into_iter().map(|unit| (unit.id, unit)).collect())
    }
}
