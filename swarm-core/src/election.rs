//! Quiet-bully leader election (spec.md §4.2).
//!
//! Lower IDs concede the moment they see evidence of a higher ID; the
//! jitter window collapses ties when many followers time out together. The
//! optimistic COORDINATOR sent right after ACCLAIM minimizes the window
//! where peers keep counting down. Suppression-by-heartbeat lets a
//! dominant node win silently, with no formal contest round.
//!
//! Grounded on `roj-core-rs/src/election.rs`'s `Election` struct shape
//! (node id + role + tick/handle_message split), generalized from Raft's
//! term-based voting to the ID-priority rules below.

use crate::rng::JitterRng;
use crate::types::{LeaderView, NodeId, Point2, Role, Tick};
use std::time::{Duration, Instant};
use tracing::{debug, info};

const HEARTBEAT_TIMEOUT: Duration = Duration::from_secs(3);
const HEARTBEAT_EMISSION_TICKS: Tick = 10;

/// What the election FSM wants sent, expressed independently of the wire
/// codec — the tick driver fills in the concrete [`crate::codec::Message`]
/// using its own identity and kinematics (election never touches position
/// except as the payload it's handed).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElectionIntent {
    /// Announce candidacy with our own id.
    Acclaim,
    /// Immediately follow an acclamation to cement leadership.
    Coordinator,
    /// Emit a heartbeat carrying our current position.
    Heartbeat,
}

/// The quiet-bully state machine for one node.
pub struct Election {
    node_id: NodeId,
    role: Role,
    leader_id: Option<NodeId>,
    leader_pos: Option<Point2>,
    last_heartbeat: Instant,
    rng: JitterRng,
}

impl Election {
    pub fn new(node_id: NodeId, now: Instant, start_time_seed: u64) -> Self {
        Self {
            node_id,
            role: Role::Follower,
            leader_id: None,
            leader_pos: None,
            last_heartbeat: now,
            rng: JitterRng::new(node_id, start_time_seed),
        }
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn is_leader(&self) -> bool {
        self.role.is_leader()
    }

    /// The locally observed leader, present only once both its identity and
    /// a position have been learned (spec.md §3).
    pub fn leader(&self) -> Option<LeaderView> {
        match (self.leader_id, self.leader_pos) {
            (Some(leader_id), Some(leader_pos)) => Some(LeaderView { leader_id, leader_pos }),
            _ => None,
        }
    }

    /// Advance the state machine by one scheduler tick.
    pub fn tick(&mut self, now: Instant, tick: Tick) -> Vec<ElectionIntent> {
        match self.role {
            Role::Follower => {
                if now.duration_since(self.last_heartbeat) > HEARTBEAT_TIMEOUT {
                    let delay = self.rng.election_delay();
                    debug!(node_id = self.node_id, delay_ms = delay.as_millis() as u64, "election: heartbeat timeout, entering ElectionWait");
                    self.role = Role::ElectionWait { started_at: now, delay };
                    self.leader_id = None;
                    self.leader_pos = None;
                }
                Vec::new()
            }
            Role::ElectionWait { started_at, delay } => {
                if now.duration_since(started_at) > delay {
                    self.become_leader();
                    info!(node_id = self.node_id, "election: jitter window elapsed, acclaiming leadership");
                    vec![ElectionIntent::Acclaim, ElectionIntent::Coordinator]
                } else {
                    Vec::new()
                }
            }
            Role::Leader => {
                if tick % HEARTBEAT_EMISSION_TICKS == 0 {
                    vec![ElectionIntent::Heartbeat]
                } else {
                    Vec::new()
                }
            }
        }
    }

    /// Handle an inbound HEARTBEAT from `sender` carrying its position.
    pub fn handle_heartbeat(&mut self, sender: NodeId, leader_pos: Point2, now: Instant) -> Vec<ElectionIntent> {
        if let Role::Leader = self.role {
            if sender < self.node_id {
                // A weaker node is still heartbeating; reassert dominance
                // without yielding or adopting it as leader.
                debug!(node_id = self.node_id, sender, "election: suppressing heartbeat from lower id");
                return vec![ElectionIntent::Heartbeat];
            }
            if sender > self.node_id {
                info!(node_id = self.node_id, sender, "election: yielding leadership to higher id");
                self.role = Role::Follower;
            }
            // sender == self.node_id: an echo of our own broadcast, harmless.
        }

        self.leader_id = Some(sender);
        self.leader_pos = Some(leader_pos);
        self.last_heartbeat = now;

        if self.role.is_election_wait() {
            self.role = Role::Follower;
        }

        Vec::new()
    }

    /// Handle an inbound ELECTION_ACCLAIM from `sender`.
    pub fn handle_acclaim(&mut self, sender: NodeId, now: Instant) -> Vec<ElectionIntent> {
        if sender > self.node_id {
            info!(node_id = self.node_id, sender, "election: conceding to higher id's acclamation");
            self.role = Role::Follower;
            self.leader_id = Some(sender);
            self.leader_pos = None;
            self.last_heartbeat = now;
            return Vec::new();
        }

        if sender < self.node_id && (self.role.is_leader() || self.role.is_election_wait()) {
            if self.role.is_election_wait() {
                info!(node_id = self.node_id, sender, "election: promoting on lower id's acclamation");
                self.become_leader();
            } else {
                debug!(node_id = self.node_id, sender, "election: retaliating against lower id's acclamation");
            }
            return vec![ElectionIntent::Heartbeat];
        }

        Vec::new()
    }

    /// Handle an inbound COORDINATOR from `sender`.
    pub fn handle_coordinator(&mut self, sender: NodeId, now: Instant) {
        debug!(node_id = self.node_id, sender, "election: adopting coordinator");
        self.role = Role::Follower;
        self.leader_id = Some(sender);
        self.leader_pos = None;
        self.last_heartbeat = now;
    }

    fn become_leader(&mut self) {
        self.role = Role::Leader;
        self.leader_id = Some(self.node_id);
        self.leader_pos = None;
    }
}
