//! Errors raised by load, unload and tow operations.
use thiserror::Error;

use crate::slot::SlotType;
use crate::tow::TowCapacity;
use crate::unit::{TransportKind, UnitId};

/// Why a transport operation was rejected. A rejected operation leaves the
/// hangar unchanged.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum TransportError {
    #[error("{0} is not in the hangar")]
    UnknownUnit(UnitId),
    #[error("{0} cannot carry itself")]
    SelfTransport(UnitId),
    #[error("{kind} onto {carrier} needs a slot instance or a slot type")]
    MissingSlot {
        carrier: UnitId,
        kind: TransportKind,
    },
    #[error("{slot} is not installed on {carrier}")]
    SlotNotInstalled { carrier: UnitId, slot: String },
    #[error("{slot_type} cannot be used for {kind}")]
    WrongSlotKind {
        slot_type: SlotType,
        kind: TransportKind,
    },
    #[error("no bay on {carrier} can take {cargo}")]
    NoSuitableBay { carrier: UnitId, cargo: UnitId },
    #[error("{slot_type} on {carrier} has {remaining:.2} left but {cargo} needs {needed:.2}")]
    InsufficientCapacity {
        carrier: UnitId,
        cargo: UnitId,
        slot_type: SlotType,
        remaining: f64,
        needed: f64,
    },
    #[error("{carrier} cannot tow: {state}")]
    NoTowCapacity { carrier: UnitId, state: TowCapacity },
    #[error("every hitch on {tractor} is in use; cannot take {trailer}")]
    HitchInUse { tractor: UnitId, trailer: UnitId },
    #[error("towing {trailer} behind {tractor} would close a loop")]
    TowCycle { tractor: UnitId, trailer: UnitId },
}

/// Log a rejection and hand it back as an `Err`.
pub(crate) fn reject<T>(error: TransportError) -> Result<T, TransportError> {
    log::error!("{error}");
    Err(error)
}
