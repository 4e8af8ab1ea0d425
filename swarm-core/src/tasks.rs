//! Distributed task allocation (spec.md §4.3).
//!
//! Every node runs the same greedy claim scan; only the current leader
//! arbitrates conflicts, using a hysteresis margin so near-tied challengers
//! don't thrash the claim table back and forth.
//!
//! Grounded on `roj-core-rs/src/consensus.rs`'s propose/vote/commit table
//! (a map keyed by proposal id holding a current winner, updated by
//! threshold) generalized from consensus rounds to a single utility-ranked
//! winner per task, and on `stigmergy.rs`'s per-tick scan-and-broadcast loop
//! shape.

use crate::types::{Capabilities, ClaimEntry, NodeId, Point2, Task, TaskId, TaskStatus};
use std::collections::HashMap;
use tracing::{debug, info};

const CLAIM_THRESHOLD: f32 = 20.0;
const HYSTERESIS_MARGIN: f32 = 5.0;

/// What the task engine wants sent; the tick driver wraps these into
/// [`crate::codec::Message`] values.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TaskIntent {
    Claim { task_id: TaskId, utility: f32 },
    Conflict { task_id: TaskId, winner_id: NodeId },
}

/// Utility of `task` for an agent at `position` with `capabilities`
/// (spec.md §4.3). Zero whenever the required capability is missing.
pub fn utility(task: &Task, position: Point2, capabilities: &Capabilities) -> f32 {
    let capability_match = match &task.required_capability {
        Some(cap) if !capabilities.contains(cap) => 0.0,
        _ => 1.0,
    };
    let distance = position.distance(&task.position);
    (100.0 / (1.0 + distance)) * capability_match
}

/// Local task map plus (if this node is leader) the authoritative claim
/// table. Both live on every node; only the leader's claim table is ever
/// consulted for arbitration (spec.md §3, §4.3).
#[derive(Default)]
pub struct TaskEngine {
    tasks: HashMap<TaskId, Task>,
    claim_table: HashMap<TaskId, ClaimEntry>,
    /// Disabled (`None`) by default; reverting a stuck Tentative task to
    /// Open after N ticks is a permitted extension, not part of the core
    /// (spec.md §7).
    tentative_timeout_ticks: Option<u32>,
}

impl TaskEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_tentative_timeout(mut self, ticks: u32) -> Self {
        self.tentative_timeout_ticks = Some(ticks);
        self
    }

    /// Task ingestion: external code adds tasks with local status Open; the
    /// engine never discovers tasks on its own (spec.md §6).
    pub fn add_task(&mut self, task: Task) {
        self.tasks.insert(task.id, task);
    }

    pub fn task(&self, id: TaskId) -> Option<&Task> {
        self.tasks.get(&id)
    }

    pub fn claim_table_entry(&self, id: TaskId) -> Option<ClaimEntry> {
        self.claim_table.get(&id).copied()
    }

    /// Run once per tick on every node: for every locally Open task, compute
    /// utility and claim it if above threshold.
    pub fn claim_scan(&mut self, position: Point2, capabilities: &Capabilities) -> Vec<TaskIntent> {
        let mut intents = Vec::new();
        for task in self.tasks.values_mut() {
            if task.status != TaskStatus::Open {
                continue;
            }
            let u = utility(task, position, capabilities);
            if u > CLAIM_THRESHOLD {
                task.status = TaskStatus::Tentative;
                task.tentative_age = 0;
                debug!(task_id = task.id, utility = u, "tasks: claiming open task");
                intents.push(TaskIntent::Claim { task_id: task.id, utility: u });
            }
        }
        intents
    }

    /// If tentative-timeout is enabled, age every Tentative task by one tick
    /// and revert it to Open once it exceeds the configured limit.
    pub fn age_tentative_tasks(&mut self) {
        let Some(limit) = self.tentative_timeout_ticks else { return };
        for task in self.tasks.values_mut() {
            if task.status != TaskStatus::Tentative {
                continue;
            }
            task.tentative_age += 1;
            if task.tentative_age > limit {
                task.status = TaskStatus::Open;
                task.tentative_age = 0;
            }
        }
    }

    /// Leader-only arbitration on an inbound TASK_CLAIM. Non-leaders must
    /// not arbitrate (spec.md §4.3); passing `is_leader = false` is a no-op
    /// rather than trusting the caller to have checked.
    pub fn handle_task_claim(
        &mut self,
        is_leader: bool,
        sender: NodeId,
        task_id: TaskId,
        utility: f32,
    ) -> Vec<TaskIntent> {
        if !is_leader {
            return Vec::new();
        }

        match self.claim_table.get(&task_id).copied() {
            None => {
                info!(task_id, winner = sender, utility, "tasks: first claim accepted");
                self.claim_table.insert(task_id, ClaimEntry { winner: sender, utility });
                vec![TaskIntent::Conflict { task_id, winner_id: sender }]
            }
            Some(current) => {
                if utility > current.utility + HYSTERESIS_MARGIN {
                    info!(
                        task_id,
                        old_winner = current.winner,
                        new_winner = sender,
                        old_utility = current.utility,
                        new_utility = utility,
                        "tasks: arbitration replaced winner past hysteresis margin"
                    );
                    self.claim_table.insert(task_id, ClaimEntry { winner: sender, utility });
                    vec![TaskIntent::Conflict { task_id, winner_id: sender }]
                } else if current.winner != sender {
                    debug!(task_id, winner = current.winner, challenger = sender, "tasks: reaffirming incumbent winner");
                    vec![TaskIntent::Conflict { task_id, winner_id: current.winner }]
                } else {
                    Vec::new()
                }
            }
        }
    }

    /// Resolution on an inbound TASK_CONFLICT, run by every node (spec.md
    /// §4.3). Tasks this node has never heard of are left untouched.
    pub fn handle_task_conflict(&mut self, own_id: NodeId, task_id: TaskId, winner_id: NodeId) {
        if let Some(task) = self.tasks.get_mut(&task_id) {
            task.status = if winner_id == own_id { TaskStatus::Assigned } else { TaskStatus::Locked };
            task.tentative_age = 0;
            debug!(task_id, winner_id, own_id, status = ?task.status, "tasks: conflict resolved");
        }
    }
}
