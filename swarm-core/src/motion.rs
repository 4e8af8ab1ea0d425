//! Formation target derivation and potential-field motion (spec.md §4.4).
//!
//! Grounded on `roj-core-rs/src/stigmergy.rs`'s gradient-summation
//! controller (sum independent force contributions, clamp to a speed limit,
//! integrate position) generalized from its thermal-gradient-following
//! single force to three named forces, plus a formation target.

use crate::types::{KinematicState, LeaderView, NodeId, Neighbor, Obstacle, Point2, Role, SensorSnapshot};

const K_ATT: f32 = 1.0;
const ARRIVAL_TOLERANCE: f32 = 0.5;

const RHO_0: f32 = 5.0;
const K_REP: f32 = 50.0;

const SEPARATION_RADIUS: f32 = 2.0;
const K_SEP: f32 = 20.0;

const MIN_DISTANCE: f32 = 0.001;

const FORMATION_SPACING: f32 = 2.0;

/// V-formation slot for `node_id` behind and to the side of the leader,
/// parameterized by id as rank (spec.md §4.4).
pub fn derive_target(node_id: NodeId, leader: LeaderView) -> Point2 {
    let rank = node_id as f32;
    let offset_x = -FORMATION_SPACING * rank;
    let offset_y = if node_id % 2 == 0 { FORMATION_SPACING * rank } else { -FORMATION_SPACING * rank };
    leader.leader_pos + Point2::new(offset_x, offset_y)
}

/// Refresh the navigation target for a Follower with a known leader
/// position. Leaders (and Followers without a leader view yet) keep
/// whatever target external code has set (spec.md §4.4).
pub fn update_target(kinematics: &mut KinematicState, node_id: NodeId, role: Role, leader: Option<LeaderView>) {
    if role.is_follower() {
        if let Some(leader) = leader {
            kinematics.target = Some(derive_target(node_id, leader));
        }
    }
}

fn attractive_force(position: Point2, target: Point2) -> Point2 {
    let delta = target - position;
    if delta.norm() <= ARRIVAL_TOLERANCE {
        Point2::ZERO
    } else {
        delta.scaled(K_ATT)
    }
}

fn repulsive_force(position: Point2, obstacles: &[Obstacle]) -> Point2 {
    obstacles
        .iter()
        .map(|obstacle| {
            let center = obstacle.center();
            let d = (position.distance(&center) - obstacle.radius).max(MIN_DISTANCE);
            if d >= RHO_0 {
                return Point2::ZERO;
            }
            let magnitude = K_REP * (1.0 / d - 1.0 / RHO_0) / (d * d);
            (position - center).normalized().scaled(magnitude)
        })
        .sum()
}

fn separation_force(position: Point2, neighbors: &[Neighbor]) -> Point2 {
    neighbors
        .iter()
        .map(|neighbor| (position, neighbor.position()))
        .filter(|(position, npos)| position.distance(npos) < SEPARATION_RADIUS)
        .map(|(position, npos)| {
            let d = position.distance(&npos).max(MIN_DISTANCE);
            let magnitude = K_SEP / (d * d);
            (position - npos).normalized().scaled(magnitude)
        })
        .sum()
}

/// Sum the attractive, repulsive, and separation forces, clamp to
/// `max_speed`, and integrate position by `dt` (spec.md §4.4). A no-op when
/// no target is set.
pub fn physics_step(kinematics: &mut KinematicState, sensors: &SensorSnapshot, dt: f32) {
    let Some(target) = kinematics.target else { return };

    let total = attractive_force(kinematics.position, target)
        + repulsive_force(kinematics.position, &sensors.obstacles)
        + separation_force(kinematics.position, &sensors.neighbors);

    let speed = total.norm();
    kinematics.velocity = if speed > kinematics.max_speed {
        total.scaled(kinematics.max_speed / speed)
    } else {
        total
    };

    kinematics.position = kinematics.position + kinematics.velocity.scaled(dt);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Obstacle;

    #[test]
    fn even_rank_offsets_to_positive_y() {
        let leader = LeaderView { leader_id: 9, leader_pos: Point2::ZERO };
        let t = derive_target(2, leader);
        assert_eq!(t, Point2::new(-4.0, 4.0));
    }

    #[test]
    fn odd_rank_offsets_to_negative_y() {
        let leader = LeaderView { leader_id: 9, leader_pos: Point2::ZERO };
        let t = derive_target(3, leader);
        assert_eq!(t, Point2::new(-6.0, -6.0));
    }

    #[test]
    fn leader_role_keeps_externally_set_target() {
        let mut k = KinematicState { target: Some(Point2::new(1.0, 1.0)), ..Default::default() };
        update_target(&mut k, 1, Role::Leader, Some(LeaderView { leader_id: 1, leader_pos: Point2::ZERO }));
        assert_eq!(k.target, Some(Point2::new(1.0, 1.0)));
    }

    #[test]
    fn follower_without_leader_view_keeps_target_unset() {
        let mut k = KinematicState::default();
        update_target(&mut k, 2, Role::Follower, None);
        assert_eq!(k.target, None);
    }

    #[test]
    fn physics_step_without_target_is_a_no_op() {
        let mut k = KinematicState::default();
        let before = k;
        physics_step(&mut k, &SensorSnapshot::default(), 0.1);
        assert_eq!(k, before);
    }

    #[test]
    fn attraction_is_zeroed_within_arrival_tolerance() {
        let mut k = KinematicState {
            position: Point2::new(0.4, 0.0),
            target: Some(Point2::ZERO),
            ..Default::default()
        };
        physics_step(&mut k, &SensorSnapshot::default(), 0.1);
        assert_eq!(k.velocity, Point2::ZERO);
    }

    #[test]
    fn velocity_is_clamped_to_max_speed() {
        let mut k = KinematicState {
            position: Point2::ZERO,
            target: Some(Point2::new(1000.0, 0.0)),
            max_speed: 5.0,
            ..Default::default()
        };
        physics_step(&mut k, &SensorSnapshot::default(), 0.1);
        assert!(k.velocity.norm() <= 5.0 + 1e-4);
    }

    #[test]
    fn obstacle_within_influence_radius_pushes_away() {
        let mut k = KinematicState { position: Point2::new(2.0, 0.0), target: Some(Point2::new(10.0, 0.0)), ..Default::default() };
        let sensors = SensorSnapshot {
            obstacles: vec![Obstacle { x: 2.0, y: 0.0, radius: 0.1 }],
            neighbors: vec![],
        };
        physics_step(&mut k, &sensors, 0.01);
        // The obstacle sits exactly on the agent; the repulsive force must
        // dominate and not be NaN despite the near-zero separation.
        assert!(k.velocity.x.is_finite() && k.velocity.y.is_finite());
    }

    #[test]
    fn distant_obstacle_has_no_effect() {
        let k_before = KinematicState { position: Point2::ZERO, target: Some(Point2::new(10.0, 0.0)), ..Default::default() };
        let mut with_obstacle = k_before;
        let sensors = SensorSnapshot {
            obstacles: vec![Obstacle { x: 100.0, y: 100.0, radius: 1.0 }],
            neighbors: vec![],
        };
        physics_step(&mut with_obstacle, &sensors, 0.1);

        let mut without_obstacle = k_before;
        physics_step(&mut without_obstacle, &SensorSnapshot::default(), 0.1);

        assert_eq!(with_obstacle.velocity, without_obstacle.velocity);
    }

    #[test]
    fn nearby_neighbor_adds_separation_force() {
        let mut k = KinematicState { position: Point2::ZERO, target: Some(Point2::new(0.0, 0.0)), ..Default::default() };
        let sensors = SensorSnapshot {
            obstacles: vec![],
            neighbors: vec![Neighbor { id: 2, x: 1.0, y: 0.0 }],
        };
        physics_step(&mut k, &sensors, 0.1);
        // Pushed in -x away from the neighbor even with target == position.
        assert!(k.velocity.x < 0.0);
    }
}
