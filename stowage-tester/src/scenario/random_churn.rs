use anyhow::{Context, Result};
use rand::Rng;
use rand_chacha::ChaCha8Rng;
use stowage_core::{Hangar, SlotType, TransportConfig, TransportKind};

use super::fleet::{Fleet, pick, random_fleet};
use super::{IterationStats, ensure_consistent};

const STEPS: usize = 120;

/// Apply one random operation. Rejections are expected and ignored; only the
/// hangar's consistency matters.
pub fn random_step(hangar: &mut Hangar, fleet: &Fleet, rng: &mut ChaCha8Rng) -> Result<&'static str> {
    let everyone = fleet.everyone();
    let any = |rng: &mut ChaCha8Rng| pick(rng, &everyone).context("empty fleet");
    let label = match rng.gen_range(0..8) {
        0 => {
            let ship = pick(rng, &fleet.ships).context("no ships")?;
            let _ = hangar.load_into_bay(ship, &[any(rng)?]);
            "load_into_bay"
        }
        1 => {
            let ship = pick(rng, &fleet.ships).context("no ships")?;
            hangar.unload_from_bay(ship, any(rng)?);
            "unload_from_bay"
        }
        2 => {
            let carrier = pick(rng, &fleet.transports).context("no transports")?;
            let squad = pick(rng, &fleet.infantry).context("no infantry")?;
            let _ = hangar.load_tactical(
                carrier,
                Some(SlotType::InfantryCompartment.into()),
                &[squad],
            );
            "load_tactical"
        }
        3 => {
            let carrier = pick(rng, &fleet.transports).context("no transports")?;
            hangar.unload_tactical(carrier, any(rng)?);
            "unload_tactical"
        }
        4 => {
            let tractor = any(rng)?;
            let trailer = pick(rng, &fleet.trailers).context("no trailers")?;
            let _ = hangar.tow_trailer(tractor, trailer, None);
            "tow_trailer"
        }
        5 => {
            let tractor = any(rng)?;
            let trailer = any(rng)?;
            hangar.untow(tractor, trailer);
            "untow"
        }
        6 => {
            let kind = TransportKind::ALL[rng.gen_range(0..TransportKind::ALL.len())];
            hangar.clear_transported_units(any(rng)?, kind);
            "clear_transported_units"
        }
        _ => {
            let unit = any(rng)?;
            let weight = f64::from(rng.gen_range(5..90_u32));
            hangar.set_weight(unit, weight)?;
            "set_weight"
        }
    };
    Ok(label)
}

pub fn run(rng: &mut ChaCha8Rng) -> Result<IterationStats> {
    let (mut hangar, fleet) = random_fleet(rng, TransportConfig::default());
    let mut stats = IterationStats {
        units: hangar.len(),
        ..IterationStats::default()
    };
    for index in 0..STEPS {
        let label = random_step(&mut hangar, &fleet, rng)?;
        stats.operations += 1;
        ensure_consistent(&hangar, &format!("step {index} ({label})"))?;
    }
    Ok(stats)
}
