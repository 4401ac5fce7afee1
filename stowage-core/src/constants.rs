//! Centralized tuning constants for transport bookkeeping.
//!
//! Platoon weights here only seed `TransportConfig` defaults; campaigns that
//! need different figures override them through configuration.

// Arithmetic ---------------------------------------------------------------
/// Tolerance used whenever remaining capacity is compared against zero.
pub(crate) const CAPACITY_EPSILON: f64 = 1e-9;

/// Usage charged against count-based pools per cargo unit.
pub(crate) const COUNT_USAGE_PER_UNIT: f64 = 1.0;

// Persistence --------------------------------------------------------------
/// Seed for slot-instance hashes. Changing it invalidates saved bay numbers.
pub(crate) const SLOT_HASH_SEED: u64 = 0x5704_A6E0_B4E5_0001;

// Infantry platoons (tons per platoon, troopers per platoon) ---------------
pub(crate) const PLATOON_FOOT_TONS: f64 = 5.0;
pub(crate) const PLATOON_FOOT_TROOPERS: u32 = 28;
pub(crate) const PLATOON_JUMP_TONS: f64 = 6.0;
pub(crate) const PLATOON_JUMP_TROOPERS: u32 = 21;
pub(crate) const PLATOON_MOTORIZED_TONS: f64 = 7.0;
pub(crate) const PLATOON_MOTORIZED_TROOPERS: u32 = 28;
pub(crate) const PLATOON_MECHANIZED_TONS: f64 = 8.0;
pub(crate) const PLATOON_MECHANIZED_TROOPERS: u32 = 20;
