//! Tow-hitch convoys.
//!
//! A tow chain starts at a tractor (a unit nobody tows) and runs through each
//! trailer hitched behind it. Each installed hitch pulls one trailer. Every
//! unit's free tow capacity is the root's weight minus the weight of every
//! towed unit in the convoy except those hitched behind it, so capacity
//! shrinks down the chain and across sibling trailers.
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

use crate::config::CapacityPolicy;
use crate::constants::CAPACITY_EPSILON;
use crate::error::{TransportError, reject};
use crate::hangar::Hangar;
use crate::ledger::CapacityLedger;
use crate::numbers::is_positive_capacity;
use crate::policy::TransportPolicy;
use crate::slot::{SlotInstance, SlotTarget, SlotType};
use crate::unit::{TransportKind, Unit, UnitId};

/// Free tow capacity of a unit.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "state", content = "tons", rename_all = "snake_case")]
pub enum TowCapacity {
    Available(f64),
    /// Trailer with nothing pulling it.
    NoTractor,
    /// The chain already weighs as much as the root can pull.
    Exhausted,
}

impl TowCapacity {
    /// Tons free, `0.0` unless available.
    #[must_use]
    pub const fn amount(self) -> f64 {
        match self {
            Self::Available(tons) => tons,
            Self::NoTractor | Self::Exhausted => 0.0,
        }
    }

    #[must_use]
    pub const fn can_tow(self) -> bool {
        matches!(self, Self::Available(_))
    }
}

impl fmt::Display for TowCapacity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Available(tons) => write!(f, "{tons:.2} tons free"),
            Self::NoTractor => f.write_str("no tractor"),
            Self::Exhausted => f.write_str("no capacity left"),
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct TowTransport;

impl TransportPolicy for TowTransport {
    const KIND: TransportKind = TransportKind::Tow;

    /// The hitch entry holds the chain-derived amount instead of installed
    /// capacity minus occupants.
    fn recompute_from_installed(
        hangar: &Hangar,
        carrier: &Unit,
        _cargo: &BTreeSet<UnitId>,
        ledger: &mut CapacityLedger,
    ) {
        if carrier.has_slot_type(SlotType::TrailerHitch) {
            let capacity = Self::chain_capacity(hangar, carrier.id)
                .map_or(0.0, TowCapacity::amount);
            ledger.install(SlotType::TrailerHitch, capacity);
        }
    }

    fn select_slot(hangar: &Hangar, carrier: &Unit, cargo: &Unit) -> Option<SlotTarget> {
        free_hitches(hangar, carrier, cargo.id)
            .into_iter()
            .next()
            .map(SlotTarget::Instance)
    }

    fn chain_capacity(hangar: &Hangar, carrier: UnitId) -> Option<TowCapacity> {
        Some(hangar.tow_capacity(carrier))
    }

    fn refresh(hangar: &mut Hangar, carrier: UnitId) {
        hangar.refresh_tow_chain(carrier);
    }
}

/// Hitches on `tractor` not pulling anything but `trailer`.
///
/// Trailers whose record lost its instance (after a refit) still occupy a
/// hitch; they are charged against the lowest free ones.
fn free_hitches(hangar: &Hangar, tractor: &Unit, trailer: UnitId) -> Vec<SlotInstance> {
    let mut unplaced = 0;
    let mut taken = BTreeSet::new();
    for towed in hangar.units().filter(|unit| {
        unit.id != trailer && unit.carrier(TransportKind::Tow) == Some(tractor.id)
    }) {
        match towed
            .assignment(TransportKind::Tow)
            .and_then(|record| record.slot_instance())
        {
            Some(slot) => {
                taken.insert(slot.number);
            }
            None => unplaced += 1,
        }
    }
    tractor
        .slots()
        .iter()
        .filter(|slot| slot.slot_type == SlotType::TrailerHitch && !taken.contains(&slot.number))
        .skip(unplaced)
        .cloned()
        .collect()
}

impl Hangar {
    /// Units from the root tractor down to `unit`, root first.
    ///
    /// A loop in saved data is cut where it closes and logged.
    #[must_use]
    pub fn tow_path(&self, unit: UnitId) -> Vec<UnitId> {
        let mut path = vec![unit];
        let mut seen = BTreeSet::from([unit]);
        let mut current = unit;
        while let Some(tractor) = self.carrier_of(current, TransportKind::Tow) {
            if !seen.insert(tractor) {
                log::warn!("tow chain through {unit} loops back to {tractor}; cutting the walk");
                break;
            }
            path.push(tractor);
            current = tractor;
        }
        path.reverse();
        path
    }

    /// The unit at the head of `unit`'s tow chain.
    #[must_use]
    pub fn tow_root(&self, unit: UnitId) -> UnitId {
        self.tow_path(unit).first().copied().unwrap_or(unit)
    }

    /// Units towed directly by `tractor`.
    #[must_use]
    pub fn towed_by(&self, tractor: UnitId) -> Vec<UnitId> {
        self.units()
            .filter(|unit| unit.carrier(TransportKind::Tow) == Some(tractor))
            .map(|unit| unit.id)
            .collect()
    }

    /// `unit` and everything towed behind it, depth first.
    #[must_use]
    pub fn tow_subtree(&self, unit: UnitId) -> Vec<UnitId> {
        let mut order = Vec::new();
        let mut seen = BTreeSet::new();
        let mut stack = vec![unit];
        while let Some(next) = stack.pop() {
            if !seen.insert(next) {
                continue;
            }
            order.push(next);
            let mut children = self.towed_by(next);
            children.reverse();
            stack.extend(children);
        }
        order
    }

    /// The whole convoy `unit` belongs to, root first.
    #[must_use]
    pub fn tow_chain(&self, unit: UnitId) -> Vec<UnitId> {
        self.tow_subtree(self.tow_root(unit))
    }

    /// Free tow capacity of a unit: the root's weight less every towed unit
    /// in the convoy that is not hitched behind `unit`.
    #[must_use]
    pub fn tow_capacity(&self, unit: UnitId) -> TowCapacity {
        let root_id = self.tow_root(unit);
        let Some(root) = self.unit(root_id) else {
            return TowCapacity::NoTractor;
        };
        if root.kind.is_trailer() {
            return TowCapacity::NoTractor;
        }
        let behind: BTreeSet<UnitId> = self
            .tow_subtree(unit)
            .into_iter()
            .filter(|id| *id != unit)
            .collect();
        let free = root.weight - self.convoy_load(root_id, &behind);
        if is_positive_capacity(free) {
            TowCapacity::Available(free)
        } else {
            TowCapacity::Exhausted
        }
    }

    /// Rebuild the tow ledger of every unit in `unit`'s convoy.
    pub fn refresh_tow_chain(&mut self, unit: UnitId) {
        for member in self.tow_chain(unit) {
            self.rebuild_ledger_and_reload::<TowTransport>(member);
        }
    }

    /// Weight of every towed unit in `root`'s convoy outside `skip`.
    fn convoy_load(&self, root: UnitId, skip: &BTreeSet<UnitId>) -> f64 {
        self.tow_subtree(root)
            .iter()
            .filter(|id| **id != root && !skip.contains(id))
            .filter_map(|id| self.unit(*id))
            .map(|member| member.weight)
            .sum()
    }

    /// Pulling power `tractor`'s convoy has left once `trailer` (and what it
    /// tows) is taken out of it.
    fn spare_pull(&self, tractor: UnitId, trailer: UnitId) -> f64 {
        let root = self.tow_root(tractor);
        let moving: BTreeSet<UnitId> = self.tow_subtree(trailer).into_iter().collect();
        self.unit(root)
            .map_or(0.0, |unit| unit.weight - self.convoy_load(root, &moving))
    }

    /// Pick or validate the hitch `trailer` will ride on.
    fn claim_hitch(
        &self,
        tractor: UnitId,
        trailer: UnitId,
        target: Option<SlotTarget>,
    ) -> Result<SlotTarget, TransportError> {
        let Some(tractor_unit) = self.unit(tractor) else {
            return reject(TransportError::UnknownUnit(tractor));
        };
        if !tractor_unit.has_slot_type(SlotType::TrailerHitch) {
            return reject(TransportError::MissingSlot {
                carrier: tractor,
                kind: TransportKind::Tow,
            });
        }
        let free = free_hitches(self, tractor_unit, trailer);
        let target = match target {
            Some(target) => self.resolve_target(tractor, target, TransportKind::Tow)?,
            None => match free.first() {
                Some(slot) => SlotTarget::Instance(slot.clone()),
                None => return reject(TransportError::HitchInUse { tractor, trailer }),
            },
        };
        let open = match &target {
            SlotTarget::Instance(slot) => free.iter().any(|hitch| hitch.same_slot(slot)),
            SlotTarget::Type(_) => !free.is_empty(),
        };
        if open {
            Ok(target)
        } else {
            reject(TransportError::HitchInUse { tractor, trailer })
        }
    }

    fn subtree_weight(&self, unit: UnitId) -> f64 {
        self.tow_subtree(unit)
            .iter()
            .filter_map(|id| self.unit(*id))
            .map(|member| member.weight)
            .sum()
    }

    /// Hitch `trailer` behind `tractor`.
    ///
    /// The trailer leaves any previous tractor first; that tractor is
    /// returned. Hitching a trailer to the tractor already pulling it changes
    /// nothing.
    ///
    /// # Errors
    ///
    /// Rejects unknown units, self-towing, loops, tractors without free tow
    /// capacity (including untowed trailers), targets that are not installed
    /// hitches, hitches already pulling another trailer and, under the strict
    /// capacity policy, trailers heavier than the convoy can still pull.
    pub fn tow_trailer(
        &mut self,
        tractor: UnitId,
        trailer: UnitId,
        target: Option<SlotTarget>,
    ) -> Result<Option<UnitId>, TransportError> {
        self.check_participants(tractor, &[trailer])?;
        if self.carrier_of(trailer, TransportKind::Tow) == Some(tractor) {
            return Ok(None);
        }
        if self.tow_path(tractor).contains(&trailer) {
            return reject(TransportError::TowCycle { tractor, trailer });
        }
        let capacity = self.tow_capacity(tractor);
        if !capacity.can_tow() {
            return reject(TransportError::NoTowCapacity {
                carrier: tractor,
                state: capacity,
            });
        }
        let target = self.claim_hitch(tractor, trailer, target)?;

        let needed = self.subtree_weight(trailer);
        let spare = self.spare_pull(tractor, trailer);
        if needed > spare + CAPACITY_EPSILON {
            let error = TransportError::InsufficientCapacity {
                carrier: tractor,
                cargo: trailer,
                slot_type: SlotType::TrailerHitch,
                remaining: spare,
                needed,
            };
            match self.config().capacity_policy {
                CapacityPolicy::Strict => return reject(error),
                CapacityPolicy::Soft => log::warn!("{error}; towing anyway"),
            }
        }

        let previous = self.board::<TowTransport>(tractor, trailer, target);
        self.refresh_tow_chain(tractor);
        Ok(previous)
    }

    /// Unhitch `trailer` from `tractor`. Both halves of the broken chain are
    /// refreshed. Stale calls return `false`.
    pub fn untow(&mut self, tractor: UnitId, trailer: UnitId) -> bool {
        let released = self.release::<TowTransport>(tractor, trailer);
        self.refresh_tow_chain(trailer);
        released
    }
}
