//! Error types for the swarm core.
//!
//! Mirrors the error taxonomy of spec.md §7: almost everything at the wire
//! boundary is tolerated and dropped rather than surfaced as an error. The
//! two genuinely fatal conditions are startup validation and (for callers
//! that want it) a typed view of why a frame was rejected.

use thiserror::Error;

/// Errors that can occur while constructing or configuring a node.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SwarmError {
    /// Startup parameter out of range. Fatal at process start, before the
    /// tick loop runs (spec.md §7).
    #[error("node id {0} out of range (expected 0-255)")]
    InvalidNodeId(u32),

    /// A frame failed to decode. Never raised by the tick loop itself
    /// (malformed frames are silently dropped per spec.md §7); exists for
    /// callers that want to log what was discarded.
    #[error("codec error: {0}")]
    Codec(#[from] CodecError),
}

/// Reasons a frame failed to decode. Never propagated as a hard failure by
/// the node itself; used only for diagnostics before the frame is dropped.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum CodecError {
    #[error("frame shorter than the 6-byte header")]
    TooShort,
    #[error("unknown message type code")]
    UnknownType,
    #[error("payload shorter than the message type requires")]
    TruncatedPayload,
}

pub type Result<T> = std::result::Result<T, SwarmError>;
