//! Tick-driven packet simulator
//!
//! Every node holds a queue of [`PacketToken`]s. Each tick sweeps the nodes
//! in descending id order (End excluded) and lets every node forward at most
//! one due packet. The remaining due packets only age, which models a
//! per-node throughput cap of one packet per tick.

use detour_core::{ConfigError, NodeId, PacketToken, SimulationError, Topology};
use detour_routing::ForwardingTable;
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, trace};

/// Configuration for the simulation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimConfig {
    /// Packets injected at Start before the first tick
    pub packet_count: usize,
    /// Probability that a forwarding decision picks a random neighbor
    pub randomness: f64,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            packet_count: 3,
            randomness: 0.0,
        }
    }
}

impl SimConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.packet_count == 0 {
            return Err(ConfigError::NoPackets);
        }
        if !(0.0..=1.0).contains(&self.randomness) {
            return Err(ConfigError::InvalidRandomness(self.randomness));
        }
        Ok(())
    }
}

/// Simulation statistics
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimStats {
    /// Packets copied by the surveillance node
    pub interceptions: usize,
    /// Packets moved from one node to another
    pub forwards: u64,
    /// Forwards that took a random neighbor instead of the table target
    pub random_forwards: u64,
    /// Due packets held back by the one-per-tick cap
    pub deferrals: u64,
}

/// The simulation state
///
/// Borrows the topology and its forwarding table; owns the packet queues
/// and the random source used for detours.
#[derive(Debug)]
pub struct Simulation<'a, T: Topology + ?Sized, R: Rng> {
    topology: &'a T,
    table: &'a ForwardingTable,
    surveillance: NodeId,
    config: SimConfig,
    queues: Vec<Vec<PacketToken>>,
    rng: R,
    /// Current simulation tick
    pub tick: u64,
    /// Statistics
    pub stats: SimStats,
}

impl<'a, T: Topology + ?Sized, R: Rng> Simulation<'a, T, R> {
    /// Create a simulation with all packets queued at Start
    pub fn new(
        topology: &'a T,
        table: &'a ForwardingTable,
        surveillance: NodeId,
        config: SimConfig,
        rng: R,
    ) -> Result<Self, ConfigError> {
        config.validate()?;

        let mut queues = vec![Vec::new(); topology.node_count()];
        if let Some(start) = queues.get_mut(topology.start().index()) {
            start.extend(std::iter::repeat_n(PacketToken::new(), config.packet_count));
        }

        info!(
            "Simulation initialized: {} packets, randomness {}, surveillance node {}",
            config.packet_count, config.randomness, surveillance
        );

        Ok(Self {
            topology,
            table,
            surveillance,
            config,
            queues,
            rng,
            tick: 0,
            stats: SimStats::default(),
        })
    }

    /// Run one tick: sweep every non-End node once, then advance the clock
    pub fn step(&mut self) -> Result<(), SimulationError> {
        trace!("=== Tick {} ===", self.tick);

        let end = self.topology.end();
        for node in NodeId::range(self.topology.node_count()).rev() {
            if node == end || self.queues[node.index()].is_empty() {
                continue;
            }
            self.process_node(node)?;
        }

        self.tick += 1;
        trace!("{}", self.state_summary());
        Ok(())
    }

    /// Run until every packet has reached End, returning the tick count
    pub fn run(&mut self) -> Result<u64, SimulationError> {
        while !self.is_complete() {
            self.step()?;
        }

        info!(
            "Simulation complete at tick {}: {} interceptions",
            self.tick, self.stats.interceptions
        );
        debug!("Stats: {:?}", self.stats);
        Ok(self.tick)
    }

    /// Whether every packet has arrived at End
    pub fn is_complete(&self) -> bool {
        self.delivered() == self.config.packet_count
    }

    /// Packets currently held at End
    pub fn delivered(&self) -> usize {
        self.queue(self.topology.end()).len()
    }

    /// Packets currently held at a node, in arrival order
    pub fn queue(&self, node: NodeId) -> &[PacketToken] {
        self.queues.get(node.index()).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Packets not yet at End
    pub fn in_flight(&self) -> usize {
        self.config.packet_count - self.delivered()
    }

    pub fn surveillance(&self) -> NodeId {
        self.surveillance
    }

    /// Get a summary of the current state
    pub fn state_summary(&self) -> String {
        format!(
            "Tick {}: {} delivered, {} in flight, {} intercepted",
            self.tick,
            self.delivered(),
            self.in_flight(),
            self.stats.interceptions
        )
    }

    /// Forward the first due packet at `node` and age the other due ones
    fn process_node(&mut self, node: NodeId) -> Result<(), SimulationError> {
        let tick = self.tick;
        let mut admitted = None;

        for (index, token) in self.queues[node.index()].iter_mut().enumerate() {
            if !token.is_due(tick) {
                continue;
            }
            token.advance();
            if admitted.is_none() {
                admitted = Some(index);
            } else {
                self.stats.deferrals += 1;
            }
        }

        let Some(index) = admitted else {
            return Ok(());
        };

        if self.topology.degree(node) == 0 {
            return Err(SimulationError::NoOutlet { node, tick });
        }

        let mut token = self.queues[node.index()].remove(index);
        if node == self.surveillance && token.capture() {
            self.stats.interceptions += 1;
            debug!("Packet captured at node {} on tick {}", node, tick);
        }

        let next = self.next_hop(node)?;
        trace!("Forwarding {} from {} to {}", token, node, next);
        self.queues[next.index()].push(token);
        self.stats.forwards += 1;
        Ok(())
    }

    /// Random neighbor with probability `randomness`, else the table target
    fn next_hop(&mut self, node: NodeId) -> Result<NodeId, SimulationError> {
        if self.rng.random_bool(self.config.randomness) {
            let neighbors = self.topology.neighbors(node);
            self.stats.random_forwards += 1;
            return Ok(neighbors[self.rng.random_range(0..neighbors.len())]);
        }

        self.table
            .target(node)
            .ok_or(SimulationError::MissingForwardingTarget {
                node,
                tick: self.tick,
            })
    }
}
