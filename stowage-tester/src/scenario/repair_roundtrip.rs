use anyhow::{Context, Result, ensure};
use rand_chacha::ChaCha8Rng;
use stowage_core::numbers::capacity_eq;
use stowage_core::{Hangar, TransportConfig, TransportKind, TransportSummary};

use super::fleet::random_fleet;
use super::random_churn::random_step;
use super::{IterationStats, ensure_consistent};

const STEPS: usize = 60;

/// Churn a hangar, save it, load it back through the repair pass and expect
/// every relationship to survive. A second repair must change nothing.
pub fn run(rng: &mut ChaCha8Rng) -> Result<IterationStats> {
    let config = TransportConfig::default();
    let (mut hangar, fleet) = random_fleet(rng, config.clone());
    let mut stats = IterationStats {
        units: hangar.len(),
        ..IterationStats::default()
    };
    for _ in 0..STEPS {
        random_step(&mut hangar, &fleet, rng)?;
        stats.operations += 1;
    }

    let json = hangar.to_json().context("saving hangar")?;
    let (mut restored, report) = Hangar::load_json(&json, config).context("loading hangar")?;
    stats.operations += 1;
    ensure!(report.is_clean(), "clean save needed repair: {report:?}");
    ensure_consistent(&restored, "after reload")?;

    for unit in hangar.units() {
        let twin = restored
            .unit(unit.id)
            .with_context(|| format!("{} missing after reload", unit.id))?;
        for kind in TransportKind::ALL {
            ensure!(
                twin.carrier(kind) == unit.carrier(kind),
                "{} {kind} carrier changed across reload",
                unit.id
            );
            ensure!(
                summaries_match(twin.summary(kind), unit.summary(kind)),
                "{} {kind} summary changed across reload",
                unit.id
            );
        }
    }

    let snapshot = restored.to_json()?;
    let second = restored.fix_references();
    stats.operations += 1;
    ensure!(second.is_clean(), "second repair dropped links: {second:?}");
    ensure!(restored.to_json()? == snapshot, "second repair changed the hangar");
    Ok(stats)
}

/// Same cargo, and ledgers equal up to rounding from a different deduction
/// order.
fn summaries_match(left: &TransportSummary, right: &TransportSummary) -> bool {
    let mut slot_types = left
        .ledger()
        .slot_types_present()
        .into_iter()
        .chain(right.ledger().slot_types_present());
    left.cargo() == right.cargo()
        && slot_types.all(|slot_type| {
            capacity_eq(
                left.remaining_capacity(slot_type),
                right.remaining_capacity(slot_type),
            )
        })
}
