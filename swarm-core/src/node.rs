//! The per-node state object and fixed-order tick driver (spec.md §4.1).
//!
//! Owns every subsystem and is the only thing that touches the wire codec;
//! election, tasks, and motion never see raw bytes. Grounded on
//! `roj-node-rs/src/main.rs`'s state-plus-tick-loop shape, restructured so
//! the state object itself (not the binary) owns the fixed per-tick
//! ordering, per spec.md §9's note against global-singleton state.

use crate::codec::{self, Frame, Message};
use crate::election::{Election, ElectionIntent};
use crate::motion;
use crate::tasks::{TaskEngine, TaskIntent};
use crate::types::{Capabilities, KinematicState, NodeId, Point2, Role, SensorSnapshot, Task, TaskId, Tick};
use std::time::{Duration, Instant};

/// Scheduler period: 10 Hz (spec.md §2).
pub const TICK_PERIOD: Duration = Duration::from_millis(100);

/// One node's full state: election, tasks, kinematics, and the inputs the
/// external collaborators feed it. Passed by exclusive reference into every
/// subsystem call rather than shared globally (spec.md §9).
pub struct Node {
    id: NodeId,
    election: Election,
    tasks: TaskEngine,
    kinematics: KinematicState,
    capabilities: Capabilities,
    sensors: SensorSnapshot,
    tick_count: Tick,
}

impl Node {
    pub fn new(id: NodeId, capabilities: Capabilities, now: Instant, start_time_seed: u64) -> Self {
        Self {
            id,
            election: Election::new(id, now, start_time_seed),
            tasks: TaskEngine::new(),
            kinematics: KinematicState::default(),
            capabilities,
            sensors: SensorSnapshot::default(),
            tick_count: 0,
        }
    }

    pub fn with_tentative_timeout(mut self, ticks: u32) -> Self {
        self.tasks = TaskEngine::new().with_tentative_timeout(ticks);
        self
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn role(&self) -> Role {
        self.election.role()
    }

    pub fn is_leader(&self) -> bool {
        self.election.is_leader()
    }

    pub fn tick_count(&self) -> Tick {
        self.tick_count
    }

    pub fn kinematics(&self) -> &KinematicState {
        &self.kinematics
    }

    /// Externally set the navigation target (the leader has no formation
    /// slot to derive one from; spec.md §4.4).
    pub fn set_target(&mut self, target: Point2) {
        self.kinematics.target = Some(target);
    }

    pub fn set_position(&mut self, position: Point2) {
        self.kinematics.position = position;
    }

    /// Task ingestion: external code adds entries with status Open (spec.md §6).
    pub fn add_task(&mut self, task: Task) {
        self.tasks.add_task(task);
    }

    pub fn task(&self, id: TaskId) -> Option<&Task> {
        self.tasks.task(id)
    }

    /// Atomically replace the obstacle/neighbor snapshot (spec.md §6).
    pub fn update_sensors(&mut self, snapshot: SensorSnapshot) {
        self.sensors = snapshot;
    }

    /// Handle one complete inbound frame (spec.md §6's `deliver` contract).
    /// Returns any outbound frames the reaction produces, already encoded.
    pub fn deliver(&mut self, frame: Frame, now: Instant) -> Vec<Vec<u8>> {
        let mut out = Vec::new();
        match frame.message {
            Message::Heartbeat { leader_x, leader_y } => {
                let intents = self.election.handle_heartbeat(frame.sender, Point2::new(leader_x, leader_y), now);
                self.emit_election(intents, &mut out);
            }
            Message::ElectionAcclaim { claimant_id } => {
                let intents = self.election.handle_acclaim(claimant_id, now);
                self.emit_election(intents, &mut out);
            }
            Message::Coordinator => {
                self.election.handle_coordinator(frame.sender, now);
            }
            Message::TaskClaim { task_id, utility } => {
                let intents = self.tasks.handle_task_claim(self.election.is_leader(), frame.sender, task_id, utility);
                self.emit_tasks(intents, &mut out);
            }
            Message::TaskConflict { task_id, winner_id } => {
                self.tasks.handle_task_conflict(self.id, task_id, winner_id);
            }
        }
        out
    }

    /// Advance by one scheduler period: election check, heartbeat emission,
    /// task scan, physics step, in that fixed order (spec.md §2, §5).
    pub fn tick(&mut self, now: Instant) -> Vec<Vec<u8>> {
        self.tick_count = self.tick_count.wrapping_add(1);
        let mut out = Vec::new();

        let election_intents = self.election.tick(now, self.tick_count);
        self.emit_election(election_intents, &mut out);

        motion::update_target(&mut self.kinematics, self.id, self.election.role(), self.election.leader());

        let task_intents = self.tasks.claim_scan(self.kinematics.position, &self.capabilities);
        self.emit_tasks(task_intents, &mut out);
        self.tasks.age_tentative_tasks();

        motion::physics_step(&mut self.kinematics, &self.sensors, TICK_PERIOD.as_secs_f32());

        out
    }

    fn emit_election(&self, intents: Vec<ElectionIntent>, out: &mut Vec<Vec<u8>>) {
        for intent in intents {
            let message = match intent {
                ElectionIntent::Acclaim => Message::ElectionAcclaim { claimant_id: self.id },
                ElectionIntent::Coordinator => Message::Coordinator,
                ElectionIntent::Heartbeat => Message::Heartbeat {
                    leader_x: self.kinematics.position.x,
                    leader_y: self.kinematics.position.y,
                },
            };
            out.push(codec::encode(self.id, self.tick_count, &message));
        }
    }

    fn emit_tasks(&self, intents: Vec<TaskIntent>, out: &mut Vec<Vec<u8>>) {
        for intent in intents {
            let message = match intent {
                TaskIntent::Claim { task_id, utility } => Message::TaskClaim { task_id, utility },
                TaskIntent::Conflict { task_id, winner_id } => Message::TaskConflict { task_id, winner_id },
            };
            out.push(codec::encode(self.id, self.tick_count, &message));
        }
    }
}
