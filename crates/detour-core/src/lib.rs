//! # Detour Core
//!
//! Core traits, types, and errors shared by the Detour crates.
//!
//! The routing crate and the simulation engine only talk to each other
//! through the abstractions defined here, so the route precomputer can run
//! over any graph that implements [`Topology`], and the output collaborators
//! (graph rendering, metrics logging) are plain trait objects.
//!
//! ## Key Traits
//!
//! - [`Topology`]: Read-only view of an undirected graph with a Start and an End node
//! - [`GraphExporter`]: Sink for a rendered view of the accepted topology
//! - [`MetricsSink`]: Sink for the per-run metrics record
//!
//! ## Key Types
//!
//! - [`NodeId`]: Stable dense index of a node
//! - [`PacketToken`]: Signed step counter carrying the capture marker
//! - [`RunReport`]: Final values of one simulation run
//! - [`GraphView`]: Edge list and highlight sets handed to exporters

pub mod error;
pub mod identity;
pub mod packet;
pub mod report;
pub mod traits;

// Re-export main types
pub use error::*;
pub use identity::*;
pub use packet::*;
pub use report::*;
pub use traits::*;
