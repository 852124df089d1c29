//! Unit tests for agv-physics.

use agv_core::{CellId, ControlCommand, Kinematics, NavCode, RobotId, SimConfig, Tick};
use agv_layout::{FleetLayout, GridMap, Path};
use agv_transport::{bulk_channel, BulkSender, Endpoint, Handshake};

use crate::{Body, PhysStatus, PhysicsEngine};

// ── Helpers ───────────────────────────────────────────────────────────────────

const R0: RobotId = RobotId(0);

fn path(cells: &[u32]) -> Path {
    cells.iter().map(|&c| CellId(c)).collect()
}

/// Two rows of four cells:
///
/// ```text
///   1 2 3 4
///   5 6 7 8
/// ```
fn grid() -> GridMap {
    GridMap::from_rows(&[[1i64, 2, 3, 4], [5, 6, 7, 8]][..]).unwrap()
}

fn layout(obstacles: Vec<Path>) -> FleetLayout {
    FleetLayout {
        grid:            grid(),
        robot_routes:    vec![path(&[1, 2, 3, 4])],
        obstacle_paths:  obstacles,
        intersections:   vec![],
        robot_crossings: vec![vec![]],
        handoffs:        vec![],
    }
}

fn engine(obstacles: Vec<Path>) -> (PhysicsEngine, BulkSender) {
    let (tx, rx) = bulk_channel(80);
    let engine = PhysicsEngine::new(
        &layout(obstacles),
        Kinematics::default(),
        &SimConfig::default(),
        vec![rx],
    )
    .unwrap();
    (engine, tx)
}

fn deliver(engine: &mut PhysicsEngine, code: impl Into<NavCode>) {
    assert!(engine.accept_inbound(R0, code.into()));
}

/// Pull robot 0's outbound code off the engine as if it were delivered.
fn sent(engine: &mut PhysicsEngine) -> Option<NavCode> {
    let code = engine.poll_outbound(R0)?;
    engine.outbound_settled(R0, Handshake::Delivered(code));
    Some(code)
}

/// Hand robot 0 `route` and apply it at tick 1.
fn start_route(engine: &mut PhysicsEngine, tx: &BulkSender, route: &[u32]) {
    tx.send_cells(route.iter().map(|&c| CellId(c))).unwrap();
    deliver(engine, ControlCommand::Route);
    engine.tick(Tick(1));
}

fn status(engine: &PhysicsEngine) -> PhysStatus {
    engine.robot(R0).unwrap().status
}

fn body(engine: &PhysicsEngine) -> Body {
    engine.robot(R0).unwrap().body.clone()
}

// ── Movement primitives ───────────────────────────────────────────────────────

#[cfg(test)]
mod motion {
    use super::*;
    use crate::{step, walk_to_center, Heading, Move};

    fn k() -> Kinematics {
        Kinematics::default()
    }

    #[test]
    fn heading_compares_x_then_y() {
        let g = grid();
        assert_eq!(Heading::between(&g, CellId(1), CellId(2)), Some(Heading::East));
        assert_eq!(Heading::between(&g, CellId(2), CellId(1)), Some(Heading::West));
        assert_eq!(Heading::between(&g, CellId(2), CellId(6)), Some(Heading::South));
        assert_eq!(Heading::between(&g, CellId(6), CellId(2)), Some(Heading::North));
        assert_eq!(Heading::between(&g, CellId(2), CellId::INVALID), None);
    }

    #[test]
    fn step_inside_cell() {
        let k = k();
        let mut b = Body::centered(CellId(1), CellId(2), 2_000, &k);
        let mv = step(&mut b, &path(&[1, 2]), &grid(), &k, false);
        assert_eq!(mv, Move::Moved { advanced: false });
        assert_eq!(b.x, 102_000);
    }

    #[test]
    fn crossing_wraps_and_advances() {
        let k = k();
        let mut b = Body { x: 199_000, y: 100_000, current: CellId(1), next: CellId(2), speed: 2_000 };
        let mv = step(&mut b, &path(&[1, 2, 3]), &grid(), &k, true);
        assert!(mv.advanced());
        assert_eq!((b.x, b.current, b.next), (1_000, CellId(2), CellId(3)));
    }

    #[test]
    fn exact_edge_wraps_to_zero() {
        let k = k();
        let mut b = Body { x: 198_000, y: 100_000, current: CellId(1), next: CellId(2), speed: 2_000 };
        step(&mut b, &path(&[1, 2]), &grid(), &k, true);
        assert_eq!(b.x, 0);
        assert_eq!(b.next, CellId::INVALID);
        assert!(b.in_bounds(&k));
    }

    #[test]
    fn backward_crossing_wraps_high() {
        let k = k();
        let mut b = Body { x: 1_000, y: 100_000, current: CellId(2), next: CellId(1), speed: 2_000 };
        step(&mut b, &path(&[2, 1]), &grid(), &k, true);
        assert_eq!(b.x, 199_000);
        assert_eq!(b.current, CellId(1));
    }

    #[test]
    fn edge_step_advances_while_path_continues() {
        let k = k();
        let mut b = Body { x: 199_000, y: 100_000, current: CellId(1), next: CellId(2), speed: 2_000 };
        let mv = step(&mut b, &path(&[1, 2, 3]), &grid(), &k, false);
        assert_eq!(mv, Move::Moved { advanced: true });
        assert_eq!((b.x, b.current, b.next), (1_000, CellId(2), CellId(3)));
    }

    #[test]
    fn edge_step_at_path_end_changes_nothing() {
        let k = k();
        let before = Body { x: 199_000, y: 100_000, current: CellId(1), next: CellId(2), speed: 2_000 };
        let mut b = before.clone();
        assert_eq!(step(&mut b, &path(&[1, 2]), &grid(), &k, false), Move::Refused);
        assert_eq!(b, before);
    }

    #[test]
    fn walk_to_center_picks_farthest_axis() {
        let k = k();
        let mut b = Body { x: 90_000, y: 40_000, current: CellId(1), next: CellId(2), speed: 0 };
        assert!(walk_to_center(&mut b, &k, 2_000, 2_000));
        assert_eq!((b.x, b.y), (90_000, 42_000));
    }

    #[test]
    fn walk_to_center_clamps_at_center() {
        let k = k();
        let mut b = Body { x: 98_000, y: 100_000, current: CellId(1), next: CellId(2), speed: 4_000 };
        assert!(walk_to_center(&mut b, &k, 4_000, 0));
        assert_eq!(b.x, 100_000);
        assert!(!walk_to_center(&mut b, &k, 4_000, 0));
    }
}

// ── Obstacles ─────────────────────────────────────────────────────────────────

#[cfg(test)]
mod obstacles {
    use super::*;
    use crate::ObstaclePhase;

    #[test]
    fn loop_of_four_cells_takes_two_hundred_ticks() {
        let (mut e, _tx) = engine(vec![path(&[7, 8, 4, 3, 7])]);
        let k = Kinematics::default();
        for t in 1..=200 {
            e.tick(Tick(t));
            assert!(e.obstacles()[0].body.in_bounds(&k), "out of bounds at tick {t}");
        }
        let o = &e.obstacles()[0];
        assert_eq!((o.body.current, o.body.next), (CellId(7), CellId(8)));
        assert_eq!((o.body.x, o.body.y), (k.center(), k.center()));
        assert_eq!(o.phase, ObstaclePhase::Resume);
    }

    #[test]
    fn phase_toggles_on_entry_and_center() {
        let (mut e, _tx) = engine(vec![path(&[7, 8, 4, 3, 7])]);
        for t in 1..=24 {
            e.tick(Tick(t));
        }
        assert_eq!(e.obstacles()[0].phase, ObstaclePhase::Resume);
        e.tick(Tick(25));
        assert_eq!(e.obstacles()[0].phase, ObstaclePhase::Crossed);
        assert_eq!(e.obstacles()[0].body.current, CellId(8));
        for t in 26..=50 {
            e.tick(Tick(t));
        }
        assert_eq!(e.obstacles()[0].phase, ObstaclePhase::Resume);
    }
}

// ── Command table ─────────────────────────────────────────────────────────────

#[cfg(test)]
mod commands {
    use super::*;
    use agv_core::SpeedStep;

    #[test]
    fn route_frame_round_trips() {
        let (mut e, tx) = engine(vec![]);
        start_route(&mut e, &tx, &[1, 2, 3, 4]);
        let robot = e.robot(R0).unwrap();
        assert_eq!(robot.route, path(&[1, 2, 3, 4]));
        assert_eq!((robot.body.current, robot.body.next), (CellId(1), CellId(2)));
        assert_eq!(robot.status, PhysStatus::Resume);
        assert_eq!(robot.prev_status, PhysStatus::Stopped);
        assert!(tx.is_empty());
    }

    #[test]
    fn clear_activate_and_resume() {
        let (mut e, tx) = engine(vec![]);
        start_route(&mut e, &tx, &[1, 2, 3, 4]);

        deliver(&mut e, ControlCommand::ClearToCross);
        e.tick(Tick(2));
        assert_eq!(status(&e), PhysStatus::Crossing);
        assert_eq!(e.robot(R0).unwrap().prev_status, PhysStatus::Resume);

        deliver(&mut e, ControlCommand::Hold);
        e.tick(Tick(3));
        assert_eq!(status(&e), PhysStatus::Stopped);

        // A second stop keeps the remembered status.
        deliver(&mut e, ControlCommand::Halt);
        e.tick(Tick(4));
        assert_eq!(e.robot(R0).unwrap().prev_status, PhysStatus::Crossing);

        deliver(&mut e, ControlCommand::Resume);
        e.tick(Tick(5));
        assert_eq!(status(&e), PhysStatus::Crossing);

        deliver(&mut e, ControlCommand::Activate);
        e.tick(Tick(6));
        assert_eq!(status(&e), PhysStatus::Resume);
    }

    #[test]
    fn hold_drops_speed_and_tokens() {
        let (mut e, tx) = engine(vec![]);
        start_route(&mut e, &tx, &[1, 2, 3, 4]);
        tx.send_steps([SpeedStep::Accelerate; 5]).unwrap();
        deliver(&mut e, ControlCommand::SpeedProfile);
        e.tick(Tick(10));
        assert_eq!(body(&e).speed, 100);
        assert_eq!(e.robot(R0).unwrap().tokens.len(), 4);

        deliver(&mut e, ControlCommand::Hold);
        e.tick(Tick(11));
        let robot = e.robot(R0).unwrap();
        assert_eq!(robot.body.speed, 0);
        assert!(robot.tokens.is_empty());
    }

    #[test]
    fn tokens_apply_every_hundred_ms() {
        let (mut e, tx) = engine(vec![]);
        start_route(&mut e, &tx, &[1, 2, 3, 4]);
        tx.send_steps([SpeedStep::Accelerate, SpeedStep::Accelerate, SpeedStep::Decelerate])
            .unwrap();
        deliver(&mut e, ControlCommand::SpeedProfile);
        for t in 2..10 {
            e.tick(Tick(t));
        }
        assert_eq!(body(&e).speed, 0);
        e.tick(Tick(10));
        assert_eq!(body(&e).speed, 100);
        for t in 11..=20 {
            e.tick(Tick(t));
        }
        assert_eq!(body(&e).speed, 200);
        for t in 21..=30 {
            e.tick(Tick(t));
        }
        assert_eq!(body(&e).speed, 150);
        assert!(e.robot(R0).unwrap().tokens.is_empty());
    }

    #[test]
    fn second_profile_appends() {
        let (mut e, tx) = engine(vec![]);
        start_route(&mut e, &tx, &[1, 2, 3, 4]);
        tx.send_steps([SpeedStep::Accelerate; 2]).unwrap();
        deliver(&mut e, ControlCommand::SpeedProfile);
        e.tick(Tick(2));
        tx.send_steps([SpeedStep::Decelerate; 3]).unwrap();
        deliver(&mut e, ControlCommand::SpeedProfile);
        e.tick(Tick(3));
        assert_eq!(e.robot(R0).unwrap().tokens.len(), 5);
    }

    #[test]
    fn movement_codes_are_ignored() {
        let (mut e, tx) = engine(vec![]);
        start_route(&mut e, &tx, &[1, 2, 3, 4]);
        deliver(&mut e, NavCode(2));
        e.tick(Tick(2));
        assert_eq!(status(&e), PhysStatus::Resume);
    }

    #[test]
    fn one_inbound_code_per_tick() {
        let (mut e, _tx) = engine(vec![]);
        assert!(e.accept_inbound(R0, NavCode(7)));
        assert!(!e.accept_inbound(R0, NavCode(8)));
        e.tick(Tick(1));
        assert!(e.accept_inbound(R0, NavCode(8)));
    }
}

// ── Status table ──────────────────────────────────────────────────────────────

#[cfg(test)]
mod status_table {
    use super::*;

    /// Drives R0 east from the center of cell 1 to the last step before
    /// the edge; the crossing request goes out once on the way.
    fn approach_edge(route: &[u32]) -> PhysicsEngine {
        let (mut e, tx) = engine(vec![]);
        start_route(&mut e, &tx, route);
        e.robot_mut(R0).body.speed = 2_000;

        // 39 steps take the robot to 178 000, short of the margin.
        for t in 2..=40 {
            e.tick(Tick(t));
        }
        assert_eq!(sent(&mut e), None);

        e.tick(Tick(41));
        assert_eq!(body(&e).x, 180_000);
        assert_eq!(sent(&mut e), Some(NavCode(2)));

        for t in 42..=50 {
            e.tick(Tick(t));
        }
        assert_eq!(sent(&mut e), None);
        assert_eq!(body(&e).x, 198_000);
        e
    }

    #[test]
    fn crossing_request_once_then_refused_at_route_end() {
        let mut e = approach_edge(&[1, 2]);
        e.tick(Tick(51));
        assert_eq!(status(&e), PhysStatus::Stopped);
        assert_eq!(body(&e).x, 198_000);
        assert_eq!(body(&e).current, CellId(1));
        assert_eq!(sent(&mut e), Some(NavCode(0)));
    }

    #[test]
    fn uncleared_robot_still_enters_next_cell() {
        let mut e = approach_edge(&[1, 2, 3, 4]);
        e.tick(Tick(51));
        assert_eq!(status(&e), PhysStatus::Resume);
        assert_eq!(body(&e).x, 0);
        assert_eq!((body(&e).current, body(&e).next), (CellId(2), CellId(3)));
        assert!(!e.robot(R0).unwrap().cell_advanced);
        assert_eq!(sent(&mut e), None);
    }

    #[test]
    fn stopped_robot_asks_to_restart() {
        let (mut e, tx) = engine(vec![]);
        start_route(&mut e, &tx, &[1, 2, 3, 4]);
        deliver(&mut e, ControlCommand::Halt);
        e.tick(Tick(2));
        // Nothing blocks it, so the (zero-speed) move succeeds.
        assert_eq!(sent(&mut e), Some(NavCode(1)));
        e.tick(Tick(3));
        assert_eq!(sent(&mut e), Some(NavCode(1)));
    }

    #[test]
    fn crossing_then_recentering() {
        let (mut e, tx) = engine(vec![]);
        start_route(&mut e, &tx, &[1, 2, 3, 4]);
        e.robot_mut(R0).body.speed = 2_000;
        deliver(&mut e, ControlCommand::ClearToCross);

        let mut t = 2;
        while status(&e) == PhysStatus::Crossing && t < 200 {
            e.tick(Tick(t));
            t += 1;
        }
        assert_eq!(status(&e), PhysStatus::Crossed);
        let b = body(&e);
        assert_eq!((b.current, b.next, b.x), (CellId(2), CellId(3), 0));
        assert_eq!(sent(&mut e), Some(NavCode(4)));

        while status(&e) == PhysStatus::Crossed && t < 400 {
            e.tick(Tick(t));
            t += 1;
        }
        assert_eq!(status(&e), PhysStatus::Resume);
        assert_eq!(body(&e).x, 98_000);
        assert!(!e.robot(R0).unwrap().crossing_reported);
    }

    #[test]
    fn obstacle_in_next_cell_stops_robot() {
        let (mut e, tx) = engine(vec![path(&[2, 6, 5, 1, 2])]);
        start_route(&mut e, &tx, &[1, 2, 3, 4]);
        // The obstacle sat on cell 2 at the start of tick 1.
        assert_eq!(status(&e), PhysStatus::Stopped);
        assert_eq!(sent(&mut e), Some(NavCode(0)));
    }

    #[test]
    fn final_cell_ends_all_motion() {
        let (mut e, tx) = engine(vec![]);
        start_route(&mut e, &tx, &[1, 2]);
        e.robot_mut(R0).body.speed = 2_000;
        deliver(&mut e, ControlCommand::ClearToCross);

        let mut t = 2;
        while status(&e) != PhysStatus::Stopped && t < 400 {
            e.tick(Tick(t));
            t += 1;
        }
        let parked = body(&e);
        assert_eq!((parked.current, parked.next), (CellId(2), CellId::INVALID));
        assert!(parked.near_center(&Kinematics::default()));

        for _ in 0..50 {
            e.tick(Tick(t));
            t += 1;
        }
        assert_eq!(body(&e), parked);
        assert_eq!(status(&e), PhysStatus::Stopped);
    }
}
