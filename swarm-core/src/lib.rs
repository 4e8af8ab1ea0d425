//! Transport-agnostic core of a swarm coordination node: leader election,
//! task allocation, and potential-field motion, driven by a single
//! fixed-period tick loop. No networking, sensor fusion, or process
//! wiring lives here — see the `swarm-node` binary for that.

pub mod codec;
pub mod election;
pub mod error;
pub mod motion;
pub mod node;
pub mod rng;
pub mod tasks;
pub mod types;

pub use codec::{Frame, Message};
pub use election::{Election, ElectionIntent};
pub use error::{CodecError, Result, SwarmError};
pub use node::{Node, TICK_PERIOD};
pub use tasks::{TaskEngine, TaskIntent};
pub use types::{
    Capabilities, ClaimEntry, KinematicState, LeaderView, Neighbor, NodeId, Obstacle, Point2, Role,
    SensorSnapshot, Task, TaskId, TaskStatus, Tick,
};
