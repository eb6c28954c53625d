//! End-to-end run pipeline
//!
//! One run: generate and validate a topology, precompute shortest-path
//! forwarding, pick the surveillance node, then simulate. A single seeded
//! `ChaCha8Rng` drives all three random steps in that order, so a seed
//! reproduces the run exactly.

use detour_core::{DetourResult, GraphView, NodeId, RunReport, TopologyError};
use detour_logging::{RunContextGuard, run_span};
use detour_routing::{ForwardingTable, RoutePrecomputer, optimal_path, select_surveillance};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing::{debug, info};

use crate::config::ExperimentConfig;
use crate::simulation::{SimStats, Simulation};
use crate::topology::{GeneratorConfig, Network, Rejection, TopologyGenerator};

/// An accepted topology with its routes and surveillance node
#[derive(Debug, Clone)]
pub struct PreparedTopology {
    pub network: Network,
    pub table: ForwardingTable,
    /// Interior nodes of the optimal path, Start and End excluded
    pub path: Vec<NodeId>,
    pub surveillance: NodeId,
    /// Generation attempts used, including the accepted one
    pub attempts: u64,
}

/// Everything a finished run produced
#[derive(Debug, Clone)]
pub struct RunOutcome {
    pub report: RunReport,
    pub stats: SimStats,
    pub network: Network,
    pub path: Vec<NodeId>,
    pub surveillance: NodeId,
    pub attempts: u64,
}

impl RunOutcome {
    /// Input for a [`GraphExporter`](detour_core::GraphExporter)
    pub fn graph_view(&self) -> GraphView {
        GraphView::from_topology(&self.network, &self.path, Some(self.surveillance))
    }
}

/// The run pipeline
pub struct Experiment;

impl Experiment {
    /// Run one experiment from configuration to report
    pub fn run(config: &ExperimentConfig) -> DetourResult<RunOutcome> {
        config.validate()?;

        let seed = match config.seed {
            Some(seed) => seed,
            None => {
                let seed = rand::random();
                info!("No seed given, drew {} from the OS", seed);
                seed
            }
        };

        let context = RunContextGuard::new(seed);
        let _enter = run_span().entered();
        debug!("Run {} started", context.run_id());

        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let prepared = Self::prepare(&config.generator, &mut rng)?;
        let optimal_path_length = prepared.path.len() + 1;

        let (ticks, stats) = {
            let mut sim = Simulation::new(
                &prepared.network,
                &prepared.table,
                prepared.surveillance,
                config.simulation.clone(),
                &mut rng,
            )?;
            let ticks = sim.run()?;
            (ticks, sim.stats.clone())
        };

        let report = RunReport::new(
            config.generator.network_size,
            config.simulation.packet_count,
            config.simulation.randomness,
            ticks,
            optimal_path_length,
            stats.interceptions,
            seed,
        );
        info!(
            ticks = report.ticks,
            interceptions = report.interceptions,
            security = report.security_percent,
            "Run complete"
        );

        Ok(RunOutcome {
            report,
            stats,
            network: prepared.network,
            path: prepared.path,
            surveillance: prepared.surveillance,
            attempts: prepared.attempts,
        })
    }

    /// Regenerate until a topology passes every check, including a path
    /// long enough to hold a surveillance node
    ///
    /// Structural rejections and short paths count against the same
    /// `max_attempts` budget.
    pub fn prepare<R: Rng + ?Sized>(
        config: &GeneratorConfig,
        rng: &mut R,
    ) -> DetourResult<PreparedTopology> {
        let generator = TopologyGenerator::new(config.clone())?;
        let mut network = generator.empty_network();
        let mut attempts: u64 = 0;

        loop {
            if config.max_attempts.is_some_and(|max| attempts >= max) {
                return Err(TopologyError::AttemptsExhausted(attempts).into());
            }
            attempts += 1;

            if let Err(rejection) = generator.attempt(&mut network, rng) {
                debug!("Attempt {} rejected: {}", attempts, rejection);
                continue;
            }

            let table = RoutePrecomputer::precompute(&network);
            let path = optimal_path(&network, &table)?;

            match select_surveillance(&path, rng) {
                Ok(surveillance) => {
                    info!(
                        "Accepted topology after {} attempts: {} edges, optimal path length {}, surveillance node {}",
                        attempts,
                        network.edge_count(),
                        path.len() + 1,
                        surveillance
                    );
                    return Ok(PreparedTopology {
                        network,
                        table,
                        path,
                        surveillance,
                        attempts,
                    });
                }
                Err(err) => debug!("Attempt {} rejected: {}", attempts, Rejection::from(err)),
            }
        }
    }
}

/// Randomness used at step `index` of a sweep with `steps` intervals
pub fn sweep_randomness(index: u32, steps: u32) -> f64 {
    if steps == 0 {
        return 0.0;
    }
    f64::from(index) / f64::from(steps)
}

/// Run the pipeline for `steps + 1` randomness values spread over 0.0..=1.0
///
/// Step `i` uses seed `base + i`, where `base` is the configured seed or one
/// drawn from the OS. `on_run` sees each outcome as soon as it finishes.
pub fn sweep(
    config: &ExperimentConfig,
    steps: u32,
    mut on_run: impl FnMut(&RunOutcome),
) -> DetourResult<Vec<RunOutcome>> {
    let base = config.seed.unwrap_or_else(rand::random);
    info!("Sweeping randomness over {} steps from seed {}", steps, base);

    let mut outcomes = Vec::with_capacity(steps as usize + 1);
    for index in 0..=steps {
        let mut step_config = config.clone();
        step_config.simulation.randomness = sweep_randomness(index, steps);
        step_config.seed = Some(base.wrapping_add(u64::from(index)));

        let outcome = Experiment::run(&step_config)?;
        on_run(&outcome);
        outcomes.push(outcome);
    }
    Ok(outcomes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use detour_core::{ConfigError, DetourError, Topology};

    fn small_config() -> ExperimentConfig {
        ExperimentConfig::new(10, 3, 0.0)
            .with_sparseness(3)
            .with_max_attempts(100_000)
    }

    #[test]
    fn test_prepare_yields_selectable_path() {
        let mut rng = ChaCha8Rng::seed_from_u64(11);
        let prepared = Experiment::prepare(&small_config().generator, &mut rng).unwrap();

        assert!(prepared.path.len() >= 3);
        assert!(prepared.attempts >= 1);
        let interior = &prepared.path[1..prepared.path.len() - 1];
        assert!(interior.contains(&prepared.surveillance));
        assert_eq!(
            prepared.path[0],
            prepared.network.neighbors(prepared.network.start())[0]
        );
    }

    #[test]
    fn test_run_fills_report() {
        let outcome = Experiment::run(&small_config().with_seed(3)).unwrap();
        let report = &outcome.report;

        assert_eq!(report.network_size, 10);
        assert_eq!(report.packet_count, 3);
        assert_eq!(report.seed, 3);
        assert_eq!(report.optimal_path_length, outcome.path.len() + 1);
        // Without detours every packet crosses the surveillance node
        assert_eq!(report.interceptions, 3);
        assert_eq!(report.security_percent, 0.0);
    }

    #[test]
    fn test_run_context_released_after_run() {
        Experiment::run(&small_config().with_seed(21)).unwrap();
        assert!(RunContextGuard::current().is_none());
    }

    #[test]
    fn test_invalid_config_fails_before_generation() {
        let err = Experiment::run(&ExperimentConfig::new(4, 1, 0.0)).unwrap_err();
        assert!(matches!(
            err,
            DetourError::Config(ConfigError::NetworkTooSmall { .. })
        ));
    }

    #[test]
    fn test_attempt_budget_applies_to_whole_pipeline() {
        let config = ExperimentConfig::new(40, 1, 0.0)
            .with_sparseness(39)
            .with_max_attempts(2);
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        assert!(matches!(
            Experiment::prepare(&config.generator, &mut rng),
            Err(DetourError::Topology(TopologyError::AttemptsExhausted(2)))
        ));
    }

    #[test]
    fn test_graph_view_highlights_run() {
        let outcome = Experiment::run(&small_config().with_seed(5)).unwrap();
        let view = outcome.graph_view();

        assert_eq!(view.path, outcome.path);
        assert_eq!(view.surveillance, Some(outcome.surveillance));
        assert_eq!(view.edges.len(), outcome.network.edge_count() * 2);
    }

    #[test]
    fn test_sweep_randomness_spacing() {
        assert_eq!(sweep_randomness(0, 4), 0.0);
        assert_eq!(sweep_randomness(2, 4), 0.5);
        assert_eq!(sweep_randomness(4, 4), 1.0);
        assert_eq!(sweep_randomness(0, 0), 0.0);
    }

    #[test]
    fn test_sweep_runs_every_step() {
        let mut seen = Vec::new();
        let outcomes = sweep(&small_config().with_seed(100), 2, |outcome| {
            seen.push(outcome.report.randomness)
        })
        .unwrap();

        assert_eq!(outcomes.len(), 3);
        assert_eq!(seen, vec![0.0, 0.5, 1.0]);
        let seeds: Vec<u64> = outcomes.iter().map(|o| o.report.seed).collect();
        assert_eq!(seeds, vec![100, 101, 102]);
    }
}
