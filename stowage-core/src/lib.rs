//! Stowage
//!
//! Unit transport bookkeeping for the campaign simulator: which unit carries
//! which, in what slot, and how much capacity is left. Three independent
//! relationships are tracked (ship bays, tactical pairings and tow hitches),
//! each with a carrier-side cargo set and ledger and a cargo-side assignment.

pub mod assignment;
pub mod audit;
pub mod bay_selection;
pub mod config;
pub mod constants;
pub mod error;
pub mod hangar;
pub mod ledger;
pub mod numbers;
pub mod policy;
pub mod repair;
pub mod ship;
pub mod slot;
pub mod summary;
pub mod tactical;
pub mod tow;
pub mod unit;

// Re-export commonly used types
pub use assignment::{Assignment, CarrierRef, Resolution, SlotRef};
pub use audit::{Violation, audit};
pub use bay_selection::{BaySelector, SmallestFitSelector};
pub use config::{CapacityPolicy, ConfigError, PlatoonSpec, PlatoonTable, TransportConfig};
pub use error::TransportError;
pub use hangar::{Hangar, LoadOutcome};
pub use ledger::CapacityLedger;
pub use policy::TransportPolicy;
pub use repair::{DroppedLink, RepairReport};
pub use ship::ShipTransport;
pub use slot::{
    CapacityBasis, SlotInstance, SlotTarget, SlotType, SlotTypeSet, capable_slot_types,
};
pub use summary::TransportSummary;
pub use tactical::TacticalTransport;
pub use tow::{TowCapacity, TowTransport};
pub use unit::{PerKind, PlatoonType, TransportKind, Unit, UnitId, UnitKind, VehicleClass};

/// Source of campaign transport options.
/// Platform-specific implementations should provide this
pub trait ConfigLoader {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Load the transport options for the running campaign
    ///
    /// # Errors
    ///
    /// Returns an error if the options cannot be read or are invalid.
    fn load_config(&self) -> Result<TransportConfig, Self::Error>;
}

/// Trait for abstracting save/load of hangars
pub trait HangarStorage {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Save a hangar
    ///
    /// # Errors
    ///
    /// Returns an error if the hangar cannot be saved.
    fn save_hangar(&self, save_name: &str, hangar: &Hangar) -> Result<(), Self::Error>;

    /// Load a hangar exactly as saved; references are still unresolved.
    ///
    /// # Errors
    ///
    /// Returns an error if the hangar cannot be loaded.
    fn load_hangar(&self, save_name: &str) -> Result<Option<Hangar>, Self::Error>;

    /// Delete a saved hangar
    ///
    /// # Errors
    ///
    /// Returns an error if the save cannot be deleted.
    fn delete_save(&self, save_name: &str) -> Result<(), Self::Error>;
}

/// Ties option loading and storage to the hangar lifecycle.
pub struct StowageEngine<L, S>
where
    L: ConfigLoader,
    S: HangarStorage,
{
    config_loader: L,
    storage: S,
}

impl<L, S> StowageEngine<L, S>
where
    L: ConfigLoader,
    S: HangarStorage,
{
    pub const fn new(config_loader: L, storage: S) -> Self {
        Self {
            config_loader,
            storage,
        }
    }

    /// Create an empty hangar using the campaign's transport options
    ///
    /// # Errors
    ///
    /// Returns an error if the options cannot be loaded.
    pub fn create_hangar(&self) -> Result<Hangar, L::Error> {
        self.config_loader.load_config().map(Hangar::with_config)
    }

    /// # Errors
    ///
    /// Returns an error if the hangar cannot be saved.
    pub fn save_hangar(&self, save_name: &str, hangar: &Hangar) -> Result<(), S::Error> {
        self.storage.save_hangar(save_name, hangar)
    }

    /// Load a hangar, apply current options and run reference repair
    ///
    /// # Errors
    ///
    /// Returns an error if the options or the save cannot be loaded.
    pub fn load_hangar(
        &self,
        save_name: &str,
    ) -> Result<Option<(Hangar, RepairReport)>, anyhow::Error>
    where
        L::Error: Into<anyhow::Error>,
        S::Error: Into<anyhow::Error>,
    {
        let Some(mut hangar) = self.storage.load_hangar(save_name).map_err(Into::into)? else {
            return Ok(None);
        };
        let config = self.config_loader.load_config().map_err(Into::into)?;
        hangar.set_config(config);
        let report = hangar.fix_references();
        if !report.is_clean() {
            log::warn!("save {save_name} needed repair: {report:?}");
        }
        Ok(Some((hangar, report)))
    }

    /// # Errors
    ///
    /// Returns an error if the save cannot be deleted.
    pub fn delete_save(&self, save_name: &str) -> Result<(), S::Error> {
        self.storage.delete_save(save_name)
    }
}
