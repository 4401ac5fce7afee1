use anyhow::{Context, Result, ensure};
use rand::Rng;
use rand_chacha::ChaCha8Rng;
use stowage_core::{SlotType, TowCapacity, TransportConfig, TransportKind};

use super::fleet::random_fleet;
use super::{IterationStats, ensure_consistent};

/// Hitch every trailer behind the first APC in one long chain, check each
/// link's capacity against the path formula, then cut the chain at random.
pub fn run(rng: &mut ChaCha8Rng) -> Result<IterationStats> {
    let (mut hangar, fleet) = random_fleet(rng, TransportConfig::default());
    let mut stats = IterationStats {
        units: hangar.len(),
        ..IterationStats::default()
    };
    let tractor = *fleet.tractors.first().context("fleet has no tractor")?;

    let mut chain = vec![tractor];
    for &trailer in &fleet.trailers {
        let tail = *chain.last().context("chain is never empty")?;
        stats.operations += 1;
        match hangar.tow_trailer(tail, trailer, None) {
            Ok(_) => chain.push(trailer),
            // The root is out of pulling power; the rest stay parked.
            Err(_) => break,
        }
    }
    ensure_consistent(&hangar, "after building the chain")?;
    ensure!(hangar.tow_chain(tractor) == chain, "chain order differs");

    let root_weight = hangar.unit(tractor).context("tractor vanished")?.weight;
    let mut towed = 0.0;
    for &link in chain.iter().skip(1) {
        towed += hangar.unit(link).context("link vanished")?.weight;
        let expected = root_weight - towed;
        let actual = hangar.tow_capacity(link);
        if expected > 1e-9 {
            ensure!(
                actual == TowCapacity::Available(expected),
                "{link}: expected {expected:.2} free, found {actual}"
            );
        } else {
            ensure!(actual == TowCapacity::Exhausted, "{link}: expected exhausted, found {actual}");
        }
        let ledger = hangar.remaining_capacity(link, TransportKind::Tow, SlotType::TrailerHitch);
        ensure!(
            (ledger - actual.amount()).abs() < 1e-9,
            "{link}: hitch ledger {ledger:.2} disagrees with {actual}"
        );
    }

    if chain.len() > 1 {
        let cut = rng.gen_range(1..chain.len());
        stats.operations += 1;
        ensure!(
            hangar.untow(chain[cut - 1], chain[cut]),
            "untow of {} reported nothing",
            chain[cut]
        );
        ensure!(
            hangar.tow_capacity(chain[cut]) == TowCapacity::NoTractor,
            "{} still has a tractor",
            chain[cut]
        );
        ensure_consistent(&hangar, "after cutting the chain")?;
    }
    Ok(stats)
}
