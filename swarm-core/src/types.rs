//! Core data types for the swarm coordination node (spec.md §3).

use std::collections::HashSet;
use std::time::{Duration, Instant};

/// Small unsigned integer identity, unique per node, doubling as routing tag
/// and election priority (higher wins).
pub type NodeId = u8;

/// Monotonic tick counter, incremented once per scheduler period.
pub type Tick = u32;

/// 32-bit task identifier.
pub type TaskId = u32;

/// A point in the 2D plane, meters.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point2 {
    pub x: f32,
    pub y: f32,
}

impl Point2 {
    pub const ZERO: Point2 = Point2 { x: 0.0, y: 0.0 };

    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn distance(&self, other: &Point2) -> f32 {
        (*self - *other).norm()
    }

    pub fn norm(&self) -> f32 {
        (self.x * self.x + self.y * self.y).sqrt()
    }

    /// Unit vector in this direction, or the zero vector if too small.
    pub fn normalized(&self) -> Point2 {
        let n = self.norm();
        if n < 1e-6 {
            Point2::ZERO
        } else {
            Point2::new(self.x / n, self.y / n)
        }
    }

    pub fn scaled(&self, k: f32) -> Point2 {
        Point2::new(self.x * k, self.y * k)
    }
}

impl std::ops::Add for Point2 {
    type Output = Point2;
    fn add(self, rhs: Point2) -> Point2 {
        Point2::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl std::ops::Sub for Point2 {
    type Output = Point2;
    fn sub(self, rhs: Point2) -> Point2 {
        Point2::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl std::iter::Sum for Point2 {
    fn sum<I: Iterator<Item = Point2>>(iter: I) -> Point2 {
        iter.fold(Point2::ZERO, |acc, p| acc + p)
    }
}

/// Role in the election state machine. `ElectionWait`'s timing fields live
/// on the variant itself (spec.md §9's design note) rather than as nullable
/// top-level fields, so "valid only in ElectionWait" is a type-level fact.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Role {
    Follower,
    ElectionWait { started_at: Instant, delay: Duration },
    Leader,
}

impl Role {
    pub fn is_leader(&self) -> bool {
        matches!(self, Role::Leader)
    }

    pub fn is_follower(&self) -> bool {
        matches!(self, Role::Follower)
    }

    pub fn is_election_wait(&self) -> bool {
        matches!(self, Role::ElectionWait { .. })
    }
}

/// The locally observed leader: who it is and where it last reported being.
/// Present whenever role != Leader and a heartbeat has been observed; absent
/// after timeout (spec.md §3).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LeaderView {
    pub leader_id: NodeId,
    pub leader_pos: Point2,
}

/// Local opinion on a task's allocation state. Authoritative assignment
/// lives only in the leader's claim table (spec.md §3).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskStatus {
    Open,
    Tentative,
    Assigned,
    Locked,
}

/// A unit of work a node may claim.
#[derive(Debug, Clone, PartialEq)]
pub struct Task {
    pub id: TaskId,
    pub position: Point2,
    pub required_capability: Option<String>,
    pub status: TaskStatus,
    /// Ticks since this task entered `Tentative`, used only if a
    /// tentative-timeout extension is enabled (spec.md §7). Reset whenever
    /// the task leaves `Tentative`.
    pub(crate) tentative_age: u32,
}

impl Task {
    pub fn new(id: TaskId, position: Point2, required_capability: Option<String>) -> Self {
        Self {
            id,
            position,
            required_capability,
            status: TaskStatus::Open,
            tentative_age: 0,
        }
    }
}

/// Leader-only bookkeeping: the current winner and winning utility for a
/// task, monotonically non-decreasing in utility by at least 5.0 per winner
/// change (spec.md §3's hysteresis invariant).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClaimEntry {
    pub winner: NodeId,
    pub utility: f32,
}

/// Immutable set of capability tags assigned at startup.
pub type Capabilities = HashSet<String>;

/// Position, velocity, and navigation target for one agent.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KinematicState {
    pub position: Point2,
    pub velocity: Point2,
    pub target: Option<Point2>,
    pub max_speed: f32,
}

impl Default for KinematicState {
    fn default() -> Self {
        Self {
            position: Point2::ZERO,
            velocity: Point2::ZERO,
            target: None,
            max_speed: 5.0,
        }
    }
}

/// A circular obstacle reported by the sensor collaborator.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Obstacle {
    pub x: f32,
    pub y: f32,
    pub radius: f32,
}

impl Obstacle {
    pub fn center(&self) -> Point2 {
        Point2::new(self.x, self.y)
    }
}

/// A peer position reported by the sensor collaborator.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Neighbor {
    pub id: NodeId,
    pub x: f32,
    pub y: f32,
}

impl Neighbor {
    pub fn position(&self) -> Point2 {
        Point2::new(self.x, self.y)
    }
}

/// Obstacle and neighbor lists, replaced wholesale by the sensor
/// collaborator (spec.md §3, §6).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SensorSnapshot {
    pub obstacles: Vec<Obstacle>,
    pub neighbors: Vec<Neighbor>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn point_distance_and_normalize() {
        let a = Point2::new(0.0, 0.0);
        let b = Point2::new(3.0, 4.0);
        assert!((a.distance(&b) - 5.0).abs() < 1e-6);
        let u = (b - a).normalized();
        assert!((u.norm() - 1.0).abs() < 1e-6);
    }

    #[test]
    fn normalized_zero_vector_stays_zero() {
        assert_eq!(Point2::ZERO.normalized(), Point2::ZERO);
    }

    #[test]
    fn role_predicates() {
        assert!(Role::Leader.is_leader());
        assert!(Role::Follower.is_follower());
        let wait = Role::ElectionWait {
            started_at: Instant::now(),
            delay: Duration::from_millis(50),
        };
        assert!(wait.is_election_wait());
    }
}
