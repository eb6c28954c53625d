//! # Detour
//!
//! Measures how well randomized routing protects packets from a
//! surveillance node sitting on the shortest path.
//!
//! ## Overview
//!
//! Packets travel from a fixed Start node to a fixed End node across a
//! random undirected network. One interior node of the shortest path copies
//! every packet that passes it. With probability `randomness` each
//! forwarding decision detours to a random neighbor instead of the
//! shortest-path next hop, trading delivery time for a chance to avoid the
//! surveillance node.
//!
//! ## Architecture
//!
//! - **Topology** (`topology.rs`): node store and rejection-sampling generator
//! - **Simulation** (`simulation.rs`): tick-driven forwarding loop
//! - **Experiment** (`experiment.rs`): seeded run pipeline and randomness sweep
//! - **Export** (`export.rs`, `metrics.rs`): DOT graph and CSV metrics
//!
//! Routing tables and surveillance selection live in `detour-routing`;
//! shared types and collaborator traits in `detour-core`.
//!
//! ## Example
//!
//! ```rust,ignore
//! use detour_simulation::*;
//!
//! let config = ExperimentConfig::new(16, 3, 0.25).with_seed(42);
//! let outcome = Experiment::run(&config)?;
//!
//! println!("{} of {} packets intercepted",
//!     outcome.report.interceptions, outcome.report.packet_count);
//!
//! DotExporter::default().export(&outcome.graph_view())?;
//! ```

pub mod config;
pub mod experiment;
pub mod export;
pub mod metrics;
pub mod simulation;
pub mod topology;

pub use config::ExperimentConfig;
pub use experiment::{Experiment, PreparedTopology, RunOutcome, sweep, sweep_randomness};
pub use export::{DotExporter, render_dot};
pub use metrics::{CsvMetricsSink, format_row, record_or_warn};
pub use simulation::{SimConfig, SimStats, Simulation};
pub use topology::{GeneratorConfig, Network, Node, Rejection, TopologyGenerator};

pub use detour_core::{
    DetourError, GraphExporter, GraphView, MetricsSink, NodeId, RunReport, Topology,
};
