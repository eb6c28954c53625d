//! Detour - randomized routing versus an on-path surveillance node
//!
//! Runs one experiment (or a randomness sweep), prints the summary and
//! appends the result to the metrics file.

use std::path::{Path, PathBuf};

use clap::Parser;
use detour_logging::{DetourSubscriberBuilder, FileConfig, LogConfig};
use tracing::warn;

use detour_simulation::{
    CsvMetricsSink, DotExporter, Experiment, ExperimentConfig, GeneratorConfig, GraphExporter,
    RunOutcome, RunReport, SimConfig, record_or_warn, sweep,
};

#[derive(Parser)]
#[command(
    name = "detour",
    about = "Measure how randomized routing evades a surveillance node on the shortest path",
    version
)]
struct Cli {
    /// Number of nodes, including Start and End
    #[arg(default_value_t = 16)]
    network_size: usize,

    /// Packets sent from Start
    #[arg(default_value_t = 3)]
    packets: usize,

    /// Probability of forwarding to a random neighbor instead of the next hop
    #[arg(default_value_t = 0.0)]
    randomness: f64,

    /// Write the topology as a DOT graph
    #[arg(long)]
    graph: bool,

    /// Where to write the DOT graph
    #[arg(long, default_value = "graph.dot")]
    graph_path: PathBuf,

    /// Seed for a reproducible run (drawn from the OS when omitted)
    #[arg(long)]
    seed: Option<u64>,

    /// Divisor applied to the complete-graph edge count
    #[arg(long, default_value_t = 6)]
    sparseness: usize,

    /// Give up after this many generation attempts
    #[arg(long)]
    max_attempts: Option<u64>,

    /// CSV file that collects one row per run
    #[arg(long, default_value = "data.csv")]
    metrics: PathBuf,

    /// Do not append to the metrics file
    #[arg(long)]
    no_metrics: bool,

    /// Print the run report as JSON
    #[arg(long)]
    json: bool,

    /// Run STEPS + 1 experiments with randomness spread over 0.0..=1.0
    #[arg(long, value_name = "STEPS")]
    sweep: Option<u32>,

    /// Also write JSONL logs to this directory
    #[arg(long)]
    log_dir: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

impl Cli {
    fn experiment_config(&self) -> ExperimentConfig {
        ExperimentConfig {
            generator: GeneratorConfig {
                network_size: self.network_size,
                sparseness: self.sparseness,
                max_attempts: self.max_attempts,
            },
            simulation: SimConfig {
                packet_count: self.packets,
                randomness: self.randomness,
            },
            seed: self.seed,
        }
    }

    fn log_config(&self) -> LogConfig {
        if self.verbose {
            LogConfig::development()
        } else {
            LogConfig::cli()
        }
    }

    fn subscriber(&self) -> DetourSubscriberBuilder {
        let builder = DetourSubscriberBuilder::new().with_config(self.log_config());
        match &self.log_dir {
            Some(dir) => builder.with_file_output(FileConfig {
                directory: dir.clone(),
                ..Default::default()
            }),
            None => builder,
        }
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let _guard = cli.subscriber().init();
    run(&cli)
}

fn run(cli: &Cli) -> anyhow::Result<()> {
    let config = cli.experiment_config();
    let mut metrics = (!cli.no_metrics).then(|| CsvMetricsSink::new(&cli.metrics));

    if let Some(steps) = cli.sweep {
        let outcomes = sweep(&config, steps, |outcome| {
            if let Some(sink) = metrics.as_mut() {
                record_or_warn(sink, &outcome.report);
            }
        })?;
        for outcome in &outcomes {
            print_report(&outcome.report, cli.json)?;
        }
        // Steps share a generator config, so only the last topology is written
        if cli.graph {
            if let Some(outcome) = outcomes.last() {
                export_graph(&cli.graph_path, outcome);
            }
        }
        return Ok(());
    }

    let outcome = Experiment::run(&config)?;
    if let Some(sink) = metrics.as_mut() {
        record_or_warn(sink, &outcome.report);
    }
    print_report(&outcome.report, cli.json)?;

    if cli.graph {
        export_graph(&cli.graph_path, &outcome);
    }

    Ok(())
}

fn export_graph(path: &Path, outcome: &RunOutcome) {
    let mut exporter = DotExporter::new(path);
    if let Err(e) = exporter.export(&outcome.graph_view()) {
        warn!("Failed to export graph: {}", e);
    }
}

fn print_report(report: &RunReport, json: bool) -> anyhow::Result<()> {
    if json {
        println!("{}", serde_json::to_string(report)?);
        return Ok(());
    }

    println!();
    println!(
        "took {} ticks to send {} packets.",
        report.ticks, report.packet_count
    );
    println!(
        "{} packets captured by insecure node meaning",
        report.interceptions
    );
    println!(
        "{}% security in a network with an optimal path of length {}",
        report.security_percent, report.optimal_path_length
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cli(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("detour").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn test_defaults() {
        let cli = cli(&[]);
        let config = cli.experiment_config();
        assert_eq!(config.generator.network_size, 16);
        assert_eq!(config.generator.sparseness, 6);
        assert_eq!(config.simulation.packet_count, 3);
        assert_eq!(config.simulation.randomness, 0.0);
        assert!(!cli.graph);
        assert_eq!(cli.graph_path, PathBuf::from("graph.dot"));
    }

    #[test]
    fn test_sweep_writes_graph() {
        let dir = tempfile::tempdir().unwrap();
        let graph = dir.path().join("sweep.dot");
        let metrics = dir.path().join("sweep.csv");
        let cli = cli(&[
            "10",
            "2",
            "0.5",
            "--sweep",
            "1",
            "--graph",
            "--graph-path",
            graph.to_str().unwrap(),
            "--metrics",
            metrics.to_str().unwrap(),
            "--seed",
            "5",
            "--sparseness",
            "3",
            "--max-attempts",
            "100000",
        ]);

        run(&cli).unwrap();

        let dot = std::fs::read_to_string(&graph).unwrap();
        assert!(dot.starts_with("digraph G {"));
        assert!(dot.contains("fillcolor=red"));
        // Header plus one row per sweep step
        assert_eq!(std::fs::read_to_string(&metrics).unwrap().lines().count(), 3);
    }
}
