use anyhow::{Result, ensure};
use rand_chacha::ChaCha8Rng;
use stowage_core::{TransportConfig, TransportKind};

use super::fleet::random_fleet;
use super::{IterationStats, ensure_consistent};

/// Load every piece of cargo into the first ship with room, then unload it
/// all and expect the original ledgers back.
pub fn run(rng: &mut ChaCha8Rng) -> Result<IterationStats> {
    let (mut hangar, fleet) = random_fleet(rng, TransportConfig::default());
    let mut stats = IterationStats {
        units: hangar.len(),
        ..IterationStats::default()
    };
    let before: Vec<_> = fleet
        .ships
        .iter()
        .map(|ship| hangar.summary(*ship, TransportKind::Ship).cloned())
        .collect();

    for &cargo in &fleet.cargo {
        for &ship in &fleet.ships {
            stats.operations += 1;
            let outcome = hangar.load_into_bay(ship, &[cargo])?;
            if outcome.all_loaded() {
                break;
            }
        }
        ensure_consistent(&hangar, "after bay load")?;
    }

    for &ship in &fleet.ships {
        let aboard: Vec<_> = hangar
            .summary(ship, TransportKind::Ship)
            .map(|summary| summary.cargo().iter().copied().collect())
            .unwrap_or_default();
        for cargo in aboard {
            stats.operations += 1;
            ensure!(
                hangar.unload_from_bay(ship, cargo),
                "{cargo} was listed on {ship} but unload found nothing"
            );
        }
    }
    ensure_consistent(&hangar, "after unloading")?;

    for (ship, expected) in fleet.ships.iter().zip(before) {
        ensure!(
            hangar.summary(*ship, TransportKind::Ship).cloned() == expected,
            "{ship} ledger did not return to its empty state"
        );
    }
    Ok(stats)
}
