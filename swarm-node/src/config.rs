//! Startup parameter validation (spec.md §6, §7). Invalid parameters are
//! fatal before the tick loop starts; everything else the core tolerates
//! at runtime by design.

use swarm_core::{NodeId, SwarmError};

/// Validate and narrow a CLI-supplied node id into the core's `NodeId`
/// (spec.md §3: "a small unsigned integer in [0, 255]"). clap hands us a
/// `u32` so out-of-range values produce a typed error instead of a silent
/// truncation.
pub fn validate_node_id(raw: u32) -> Result<NodeId, SwarmError> {
    u8::try_from(raw).map_err(|_| SwarmError::InvalidNodeId(raw))
}
