//! Runs a grid of independent scenarios, for comparing release policies and
//! sequencing rules on the same order stream.

use crate::config::{ConcurrencyMode, ExecutionConfig, ShopConfig};
use crate::core::error::Result;
use crate::core::simulation_builder::SimulationBuilder;
use crate::core::types::SimTime;
use crate::release::{ReleasePolicy, SequencingRule};
use crate::stats::{ExportRow, PerformanceSummary};
use log::info;
use rayon::prelude::*;

#[derive(Debug, Clone)]
pub struct Scenario {
    pub name: String,
    pub config: ShopConfig,
}

impl Scenario {
    pub fn new(name: impl Into<String>, config: ShopConfig) -> Self {
        Self {
            name: name.into(),
            config,
        }
    }

    /// Name the scenario after its policy and rule, e.g. `BIL_PRD`
    pub fn labelled(config: ShopConfig) -> Self {
        Self::new(config.scenario_label(), config)
    }
}

/// Immediate release with EDD, then bucketed release under both rules
pub fn standard_scenarios(base: &ShopConfig) -> Vec<Scenario> {
    [
        (ReleasePolicy::Immediate, SequencingRule::EarliestDueDate),
        (ReleasePolicy::Bucketed, SequencingRule::EarliestDueDate),
        (ReleasePolicy::Bucketed, SequencingRule::EarliestPlannedRelease),
    ]
    .into_iter()
    .map(|(policy, rule)| {
        Scenario::labelled(
            base.clone()
                .with_release_policy(policy)
                .with_sequencing_rule(rule),
        )
    })
    .collect()
}

#[derive(Debug, Clone)]
pub struct ScenarioOutcome {
    pub name: String,
    pub final_time: SimTime,
    pub summary: PerformanceSummary,
    pub rows: Vec<ExportRow>,
}

pub fn run_scenario(scenario: &Scenario) -> Result<ScenarioOutcome> {
    // Outcomes only need the tracker's records
    let mut engine = SimulationBuilder::new(scenario.config.clone())
        .with_finished_order_retention(false)
        .build()?;
    let final_time = engine.run()?;
    engine.tracker().log_summary(&scenario.name);

    Ok(ScenarioOutcome {
        name: scenario.name.clone(),
        final_time,
        summary: engine.summary(),
        rows: engine.export_rows(),
    })
}

/// Run every scenario; outcomes come back in input order
pub fn run_scenarios(scenarios: &[Scenario], execution: &ExecutionConfig) -> Result<Vec<ScenarioOutcome>> {
    info!(
        "[Experiment] Running {} scenarios ({:?})",
        scenarios.len(),
        execution.concurrency_mode
    );

    match execution.concurrency_mode {
        ConcurrencyMode::Sequential => scenarios.iter().map(run_scenario).collect(),
        ConcurrencyMode::Rayon => match execution.thread_pool_size {
            Some(size) => {
                let pool = rayon::ThreadPoolBuilder::new().num_threads(size).build()?;
                pool.install(|| scenarios.par_iter().map(run_scenario).collect())
            }
            None => scenarios.par_iter().map(run_scenario).collect(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_grid_labels() {
        let names: Vec<String> = standard_scenarios(&ShopConfig::default())
            .into_iter()
            .map(|scenario| scenario.name)
            .collect();
        assert_eq!(names, vec!["IR_EDD", "BIL_EDD", "BIL_PRD"]);
    }

    #[test]
    fn test_rayon_matches_sequential() {
        let base = ShopConfig::default().with_sim_time(20_000).with_random_seed(11);
        let scenarios = standard_scenarios(&base);

        let sequential = run_scenarios(&scenarios, &ExecutionConfig::default()).unwrap();
        let parallel = run_scenarios(
            &scenarios,
            &ExecutionConfig::new()
                .with_concurrency(ConcurrencyMode::Rayon)
                .with_thread_pool_size(2),
        )
        .unwrap();

        assert_eq!(sequential.len(), 3);
        for (a, b) in sequential.iter().zip(&parallel) {
            assert_eq!(a.name, b.name);
            assert_eq!(a.summary, b.summary);
            assert_eq!(a.rows, b.rows);
        }
    }

    #[test]
    fn test_invalid_scenario_aborts_grid() {
        let scenarios = vec![
            Scenario::labelled(ShopConfig::default().with_sim_time(1000)),
            Scenario::new("broken", ShopConfig::default().with_period_length(0)),
        ];
        assert!(run_scenarios(&scenarios, &ExecutionConfig::default()).is_err());
    }
}
