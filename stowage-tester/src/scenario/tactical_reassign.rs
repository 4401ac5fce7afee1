use anyhow::{Result, ensure};
use rand::Rng;
use rand_chacha::ChaCha8Rng;
use stowage_core::{SlotType, TransportConfig, TransportKind};

use super::fleet::{pick, random_fleet};
use super::{IterationStats, ensure_consistent};

const ROUNDS: usize = 40;

/// Move squads between APCs at random. A squad must never be listed by more
/// than one transport, and the transport it left must have its capacity back.
pub fn run(rng: &mut ChaCha8Rng) -> Result<IterationStats> {
    let (mut hangar, fleet) = random_fleet(rng, TransportConfig::default());
    let mut stats = IterationStats {
        units: hangar.len(),
        ..IterationStats::default()
    };

    for _ in 0..ROUNDS {
        let (Some(carrier), Some(squad)) =
            (pick(rng, &fleet.transports), pick(rng, &fleet.infantry))
        else {
            break;
        };
        stats.operations += 1;
        if rng.gen_bool(0.2) {
            hangar.unload_tactical(carrier, squad);
        } else {
            let before = hangar.carrier_of(squad, TransportKind::Tactical);
            let outcome = hangar.load_tactical(
                carrier,
                Some(SlotType::InfantryCompartment.into()),
                &[squad],
            )?;
            if let Some(previous) = before.filter(|previous| *previous != carrier) {
                ensure!(
                    outcome.previous_carriers.contains(&previous),
                    "{squad} left {previous} but it was not reported"
                );
                let still_listed = hangar
                    .summary(previous, TransportKind::Tactical)
                    .is_some_and(|summary| summary.carries(squad));
                ensure!(!still_listed, "{previous} still lists {squad}");
            }
        }
        let holders = fleet
            .transports
            .iter()
            .filter(|transport| {
                hangar
                    .summary(**transport, TransportKind::Tactical)
                    .is_some_and(|summary| summary.carries(squad))
            })
            .count();
        ensure!(holders <= 1, "{squad} is listed by {holders} transports");
        ensure_consistent(&hangar, "after tactical move")?;
    }
    Ok(stats)
}
