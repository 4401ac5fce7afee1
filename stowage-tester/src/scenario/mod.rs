use anyhow::{Result, bail};
use rand_chacha::ChaCha8Rng;
use stowage_core::{Hangar, audit};

pub mod bay_roundtrip;
pub mod fleet;
pub mod random_churn;
pub mod repair_roundtrip;
pub mod tactical_reassign;
pub mod tow_chain;

/// What one iteration of a scenario did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IterationStats {
    pub operations: usize,
    pub units: usize,
}

pub type ScenarioFn = fn(&mut ChaCha8Rng) -> Result<IterationStats>;

// Scenario catalog entry
#[derive(Debug, Clone, Copy)]
pub struct TestScenario {
    pub key: &'static str,
    pub description: &'static str,
    pub run: ScenarioFn,
}

const CATALOG: [TestScenario; 5] = [
    TestScenario {
        key: "bay-roundtrip",
        description: "Load a random fleet into bays, then unload and compare ledgers",
        run: bay_roundtrip::run,
    },
    TestScenario {
        key: "tactical-reassign",
        description: "Shuffle infantry between transports and check both sides",
        run: tactical_reassign::run,
    },
    TestScenario {
        key: "tow-chain",
        description: "Build random tow chains and verify path capacities",
        run: tow_chain::run,
    },
    TestScenario {
        key: "repair-roundtrip",
        description: "Save, reload and repair a churned hangar",
        run: repair_roundtrip::run,
    },
    TestScenario {
        key: "random-churn",
        description: "Random loads, unloads, tows and clears with an audit after each",
        run: random_churn::run,
    },
];

#[must_use]
pub fn list_scenarios() -> Vec<(&'static str, &'static str)> {
    CATALOG
        .iter()
        .map(|scenario| (scenario.key, scenario.description))
        .collect()
}

#[must_use]
pub fn all_scenario_keys() -> Vec<String> {
    CATALOG.iter().map(|scenario| scenario.key.to_string()).collect()
}

#[must_use]
pub fn get_scenario(name: &str) -> Option<TestScenario> {
    let name = name.to_lowercase();
    CATALOG.iter().find(|scenario| scenario.key == name).copied()
}

/// Fail with every violation the audit finds.
pub fn ensure_consistent(hangar: &Hangar, context: &str) -> Result<()> {
    let violations = audit(hangar);
    if violations.is_empty() {
        return Ok(());
    }
    let listed: Vec<String> = violations.iter().map(ToString::to_string).collect();
    bail!("{context}: {}", listed.join("; "))
}
