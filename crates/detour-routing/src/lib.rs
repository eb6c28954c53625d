//! # Detour Routing
//!
//! Shortest-path forwarding for Detour.
//!
//! Every node forwards traffic to a single precomputed neighbor that lies on
//! a shortest path to the sink. The table is built once per accepted topology
//! with a breadth-first traversal seeded at End, then reused for every tick of
//! the simulation.
//!
//! ## Core Components
//!
//! - [`RoutePrecomputer`]: BFS from End that fills a [`ForwardingTable`]
//! - [`ForwardingTable`]: First-writer-wins next hops plus hop distances
//! - [`optimal_path`]: Reconstructs the interior of the Start → End path
//! - [`select_surveillance`]: Places the eavesdropper on that path
//!
//! ## Example
//!
//! ```rust,ignore
//! use detour_routing::{RoutePrecomputer, optimal_path, select_surveillance};
//!
//! let table = RoutePrecomputer::precompute(&network);
//! let path = optimal_path(&network, &table)?;
//! let spy = select_surveillance(&path, &mut rng)?;
//! ```

pub mod error;
pub mod router;
pub mod surveillance;
pub mod table;

// Re-export main types
pub use error::{RoutingError, RoutingResult, SelectionError};
pub use router::{RoutePrecomputer, optimal_path};
pub use surveillance::select_surveillance;
pub use table::ForwardingTable;
