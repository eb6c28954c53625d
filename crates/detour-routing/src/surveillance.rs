//! Surveillance node placement
//!
//! The eavesdropper sits on the optimal path, but never on its first or last
//! interior node: those are Start's and End's only neighbors, and every
//! packet has to pass through them regardless of routing randomness.

use detour_core::NodeId;
use rand::Rng;
use tracing::debug;

use crate::error::SelectionError;

/// Pick the surveillance node uniformly among the path's inner entries
///
/// `path` is the interior of the optimal path as returned by
/// [`optimal_path`](crate::optimal_path). Fails with
/// [`SelectionError::PathTooShort`] when fewer than three entries exist,
/// which tells the caller to regenerate the topology.
pub fn select_surveillance<R: Rng + ?Sized>(
    path: &[NodeId],
    rng: &mut R,
) -> Result<NodeId, SelectionError> {
    if path.len() < 3 {
        return Err(SelectionError::PathTooShort(path.len()));
    }

    let chosen = path[rng.random_range(1..path.len() - 1)];
    debug!("Surveillance node {} chosen from path {:?}", chosen, path);
    Ok(chosen)
}
