//! Routing error types
//!
//! Re-exports core routing errors and adds selection errors.

use thiserror::Error;

// Re-export core routing errors
pub use detour_core::RoutingError;

/// Why no surveillance node could be placed on a path
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SelectionError {
    /// Fewer than three interior nodes, so nothing remains once the
    /// first and last entries are excluded
    #[error("Optimal path of {0} interior nodes is too short for a surveillance node")]
    PathTooShort(usize),
}

/// Result type for routing operations
pub type RoutingResult<T> = Result<T, RoutingError>;
