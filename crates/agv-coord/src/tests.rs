//! Unit tests for agv-coord.

use agv_core::{
    CellId, ControlCommand, Kinematics, MovementStatus, NavCode, RobotId, Tick, TokenStream,
};
use agv_layout::{FleetLayout, GridMap, Handoff, IntersectionSeed, Path, SeedEntry};
use agv_transport::{bulk_channel, BulkReceiver, Endpoint, Handshake};

use crate::{CoordEngine, CoordStatus, RobotRecord};

// ── Helpers ───────────────────────────────────────────────────────────────────

const R0: RobotId = RobotId(0);
const R1: RobotId = RobotId(1);
const X: CellId = CellId(5);

fn path(cells: &[u32]) -> Path {
    cells.iter().map(|&c| CellId(c)).collect()
}

fn seed(cell: u32, entries: &[(u32, u32, u32)]) -> IntersectionSeed {
    IntersectionSeed {
        cell:    CellId(cell),
        entries: entries
            .iter()
            .map(|&(r, distance, expected_time)| SeedEntry {
                robot: RobotId(r),
                distance,
                expected_time,
            })
            .collect(),
    }
}

/// A 3×3 grid with one intersection at the middle cell:
///
/// ```text
///   1 2 3
///   4 5 6
///   7 8 9
/// ```
///
/// Robot 0 drives 4 → 5 → 6 and heads the queue at 5.  Robot 1 drives
/// 3 → 2 → 5 → 8 and comes second.
fn crossing_layout() -> FleetLayout {
    FleetLayout {
        grid:            GridMap::from_rows(&[[1i64, 2, 3], [4, 5, 6], [7, 8, 9]][..]).unwrap(),
        robot_routes:    vec![path(&[4, 5, 6]), path(&[3, 2, 5, 8])],
        obstacle_paths:  vec![],
        intersections:   vec![seed(5, &[(0, 1, 1), (1, 2, 2)])],
        robot_crossings: vec![vec![X], vec![X]],
        handoffs:        vec![
            Handoff { tick: Tick(0), robot: R0 },
            Handoff { tick: Tick(0), robot: R1 },
        ],
    }
}

fn engine(layout: &FleetLayout) -> (CoordEngine, Vec<BulkReceiver>) {
    let (txs, rxs): (Vec<_>, Vec<_>) = (0..layout.robot_count()).map(|_| bulk_channel(80)).unzip();
    let engine = CoordEngine::new(layout, Kinematics::default(), txs).unwrap();
    (engine, rxs)
}

fn report(engine: &mut CoordEngine, robot: RobotId, status: MovementStatus) {
    assert!(engine.accept_inbound(robot, status.into()));
}

/// Take `robot`'s outbound code as if the relay acknowledged it.
fn sent(engine: &mut CoordEngine, robot: RobotId) -> Option<NavCode> {
    let code = engine.poll_outbound(robot)?;
    engine.outbound_settled(robot, Handshake::Delivered(code));
    Some(code)
}

fn status(engine: &CoordEngine, robot: RobotId) -> CoordStatus {
    engine.robot(robot).unwrap().status
}

fn speed(engine: &CoordEngine, robot: RobotId) -> i64 {
    engine.robot(robot).unwrap().speed
}

fn expected_time(engine: &CoordEngine, robot: RobotId) -> u32 {
    engine
        .admission()
        .queue_at(X)
        .and_then(|q| q.entry(robot))
        .map(|e| e.expected_time)
        .unwrap()
}

fn frame_total(rx: &BulkReceiver) -> i64 {
    let stream: TokenStream = rx.drain_frame().steps().collect();
    stream.signed_total(&Kinematics::default())
}

/// Hand off both routes, activate both robots and stream their first
/// profiles.  Leaves the engine at the end of tick 2 with both ports idle.
fn started() -> (CoordEngine, Vec<BulkReceiver>) {
    let (mut e, rxs) = engine(&crossing_layout());
    e.tick(Tick(0)).unwrap();
    assert_eq!(sent(&mut e, R0), Some(ControlCommand::Route.into()));
    assert_eq!(sent(&mut e, R1), Some(ControlCommand::Route.into()));
    for rx in &rxs {
        assert!(rx.drain_frame().terminated);
    }
    e.tick(Tick(1)).unwrap();
    assert_eq!(sent(&mut e, R0), Some(ControlCommand::Activate.into()));
    assert_eq!(sent(&mut e, R1), Some(ControlCommand::Activate.into()));
    let stats = e.tick(Tick(2)).unwrap();
    assert_eq!(stats.profiles, 2);
    assert_eq!(sent(&mut e, R0), Some(ControlCommand::SpeedProfile.into()));
    assert_eq!(sent(&mut e, R1), Some(ControlCommand::SpeedProfile.into()));
    (e, rxs)
}

// ── Target speed ──────────────────────────────────────────────────────────────

#[cfg(test)]
mod target {
    use super::*;
    use crate::target_speed;

    #[test]
    fn four_cells_over_three_units() {
        let k = Kinematics::default();
        let target = target_speed(4, 3, &k);
        assert_eq!(target, 2_650);
        assert_eq!(TokenStream::between(0, target, &k).signed_total(&k), 2_650);
    }

    #[test]
    fn one_cell_one_unit_is_cruise() {
        assert_eq!(target_speed(1, 1, &Kinematics::default()), 2_000);
    }

    #[test]
    fn floor_is_min_speed() {
        let k = Kinematics::default();
        assert_eq!(target_speed(1, 1_000, &k), 50);
        assert_eq!(target_speed(0, 1, &k), 50);
    }
}

// ── Admission queues ──────────────────────────────────────────────────────────

#[cfg(test)]
mod admission {
    use super::*;
    use crate::{Admission, AdmissionQueue};

    #[test]
    fn remove_steps_down_followers_only() {
        let mut q = AdmissionQueue::from_seed(&seed(5, &[(0, 3, 3), (1, 4, 5), (2, 1, 1)]));
        let removed = q.remove(R0).unwrap();
        assert_eq!((removed.distance, removed.expected_time), (3, 3));
        assert_eq!(q.head(), Some(R1));
        let e1 = q.entry(R1).unwrap();
        assert_eq!((e1.distance, e1.expected_time), (3, 4));
        // Never below 1.
        let e2 = q.entry(RobotId(2)).unwrap();
        assert_eq!((e2.distance, e2.expected_time), (1, 1));
    }

    #[test]
    fn remove_from_middle_keeps_head() {
        let mut q = AdmissionQueue::from_seed(&seed(5, &[(0, 3, 3), (1, 4, 5), (2, 6, 6)]));
        q.remove(R1).unwrap();
        assert_eq!(q.head(), Some(R0));
        assert_eq!(q.entry(R0).unwrap().distance, 3);
        assert_eq!(q.entry(RobotId(2)).unwrap().distance, 5);
        assert!(q.remove(R1).is_none());
    }

    #[test]
    fn bump_and_step_down() {
        let mut q = AdmissionQueue::from_seed(&seed(5, &[(0, 2, 2)]));
        assert!(q.bump(R0));
        assert_eq!(q.entry(R0).unwrap().expected_time, 3);
        assert!(q.step_down(R0));
        assert_eq!((q.entry(R0).unwrap().distance, q.entry(R0).unwrap().expected_time), (1, 2));
        assert!(!q.bump(R1));
    }

    #[test]
    fn lookup_by_cell() {
        let a = Admission::from_seeds(&[seed(5, &[(0, 1, 1)]), seed(9, &[(1, 2, 2)])]);
        assert_eq!(a.len(), 2);
        assert_eq!(a.head_at(CellId(9)), Some(R1));
        assert_eq!(a.head_at(CellId(4)), None);
        assert_eq!(a.lookup(CellId(5)).map(|ix| ix.index()), Some(0));
    }
}

// ── Scheduler ─────────────────────────────────────────────────────────────────

#[cfg(test)]
mod scheduler {
    use super::*;
    use crate::{restore_cruise, schedule, AdmissionQueue};

    /// `n` robots, all in `Standby` and due at cell 5.
    fn records(n: u32) -> (Vec<RobotRecord>, Vec<BulkReceiver>) {
        let mut robots = Vec::new();
        let mut rxs = Vec::new();
        for r in 0..n {
            let (tx, rx) = bulk_channel(80);
            let mut rec = RobotRecord::new(RobotId(r), path(&[4, 5, 6]), vec![X], tx);
            rec.status = CoordStatus::Standby;
            robots.push(rec);
            rxs.push(rx);
        }
        (robots, rxs)
    }

    fn settle_all(robots: &mut [RobotRecord]) {
        for rec in robots {
            if let Some(code) = rec.outbox.poll() {
                rec.outbox.settle(Handshake::Delivered(code));
            }
        }
    }

    fn queue() -> AdmissionQueue {
        AdmissionQueue::from_seed(&seed(5, &[(0, 4, 3), (1, 6, 2), (2, 2, 4)]))
    }

    #[test]
    fn targets_accumulate_down_the_queue() {
        let k = Kinematics::default();
        let (mut robots, rxs) = records(3);
        assert_eq!(schedule(&mut robots, &queue(), &k, None).unwrap(), 3);
        let speeds: Vec<i64> = robots.iter().map(|r| r.speed).collect();
        assert_eq!(speeds, vec![2_650, 2_400, 400]);
        for (rec, rx) in robots.iter().zip(&rxs) {
            assert_eq!(frame_total(rx), rec.speed);
            assert_eq!(rec.outbound(), Some(ControlCommand::SpeedProfile.into()));
        }
    }

    #[test]
    fn static_queue_converges() {
        let k = Kinematics::default();
        let (mut robots, _rxs) = records(3);
        schedule(&mut robots, &queue(), &k, None).unwrap();
        settle_all(&mut robots);
        assert_eq!(schedule(&mut robots, &queue(), &k, None).unwrap(), 0);
    }

    #[test]
    fn excluded_robot_still_counts() {
        let k = Kinematics::default();
        let (mut robots, _rxs) = records(3);
        assert_eq!(schedule(&mut robots, &queue(), &k, Some(R1)).unwrap(), 2);
        assert_eq!(robots[1].speed, 0);
        assert_eq!(robots[2].speed, 400);
    }

    #[test]
    fn held_and_elsewhere_robots_are_skipped() {
        let k = Kinematics::default();
        let (mut robots, _rxs) = records(3);
        robots[0].status = CoordStatus::Held;
        robots[2].cursor = 1;
        assert_eq!(schedule(&mut robots, &queue(), &k, None).unwrap(), 1);
        // 6 cells over robot 1's own 2 units.
        assert_eq!(robots[1].speed, 6_000);
        assert_eq!(robots[0].speed, 0);
        assert_eq!(robots[2].speed, 0);
    }

    #[test]
    fn busy_or_blocked_robots_get_nothing() {
        let k = Kinematics::default();
        let (mut robots, _rxs) = records(3);
        robots[0].post(ControlCommand::Resume);
        robots[1].status = CoordStatus::Blocked;
        assert_eq!(schedule(&mut robots, &queue(), &k, None).unwrap(), 1);
        assert_eq!((robots[0].speed, robots[1].speed, robots[2].speed), (0, 0, 400));
    }

    #[test]
    fn restore_cruise_after_last_crossing() {
        let k = Kinematics::default();
        let (mut robots, rxs) = records(1);
        let rec = &mut robots[0];
        rec.status = CoordStatus::Moving;
        rec.speed = 2_650;
        rec.cursor = 1;
        assert!(restore_cruise(rec, &k).unwrap());
        assert_eq!(rec.speed, 2_000);
        assert_eq!(frame_total(&rxs[0]), -650);
        // Port now busy.
        assert!(!restore_cruise(rec, &k).unwrap());
    }

    #[test]
    fn restore_cruise_skips_held() {
        let k = Kinematics::default();
        let (mut robots, _rxs) = records(1);
        robots[0].status = CoordStatus::Held;
        assert!(!restore_cruise(&mut robots[0], &k).unwrap());
    }

    #[test]
    fn overflow_is_an_error() {
        let k = Kinematics::default();
        let (tx, _rx) = bulk_channel(8);
        let mut rec = RobotRecord::new(R0, path(&[4, 5, 6]), vec![X], tx);
        rec.status = CoordStatus::Standby;
        assert!(restore_cruise(&mut rec, &k).is_err());
    }
}

// ── Engine ────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod engine {
    use super::*;
    use crate::CoordError;

    #[test]
    fn handoff_streams_route() {
        let (mut e, rxs) = engine(&crossing_layout());
        assert_eq!(status(&e, R0), CoordStatus::Dormant);
        let stats = e.tick(Tick(0)).unwrap();
        assert_eq!(stats.handoffs, 2);
        assert_eq!(status(&e, R1), CoordStatus::Starting);
        let rec = e.robot(R1).unwrap();
        assert_eq!((rec.current, rec.next), (CellId(3), CellId(2)));
        let frame = rxs[1].drain_frame();
        assert!(frame.terminated);
        assert_eq!(frame.cells().collect::<Path>(), path(&[3, 2, 5, 8]));
    }

    #[test]
    fn starting_robot_waits_for_its_turn() {
        let mut layout = crossing_layout();
        // Robot 1 now starts right next to the intersection.
        layout.robot_routes[1] = path(&[2, 5, 8]);
        let (mut e, _rxs) = engine(&layout);
        e.tick(Tick(0)).unwrap();
        sent(&mut e, R0);
        sent(&mut e, R1);
        e.tick(Tick(1)).unwrap();
        assert_eq!(status(&e, R0), CoordStatus::Standby);
        assert_eq!(status(&e, R1), CoordStatus::Starting);
        assert!(!e.may_enter(R1));
    }

    #[test]
    fn first_profiles_follow_the_queue() {
        let (e, rxs) = started();
        assert_eq!((speed(&e, R0), speed(&e, R1)), (2_000, 1_300));
        assert_eq!(frame_total(&rxs[0]), 2_000);
        assert_eq!(frame_total(&rxs[1]), 1_300);
    }

    #[test]
    fn reports_from_dormant_robots_are_ignored() {
        let (mut e, _rxs) = engine(&crossing_layout());
        report(&mut e, R0, MovementStatus::Stopped);
        let stats = e.tick(Tick(0)).unwrap();
        assert_eq!(stats.reports, 1);
        assert_eq!(expected_time(&e, R0), 1);
    }

    #[test]
    fn crossing_request_answers() {
        let (mut e, _rxs) = started();
        report(&mut e, R0, MovementStatus::CrossingBegin);
        e.tick(Tick(3)).unwrap();
        assert_eq!(status(&e, R0), CoordStatus::Moving);
        assert_eq!(sent(&mut e, R0), Some(ControlCommand::ClearToCross.into()));
    }

    #[test]
    fn every_stop_report_bumps_estimate() {
        let (mut e, _rxs) = started();
        report(&mut e, R1, MovementStatus::Stopped);
        e.tick(Tick(3)).unwrap();
        assert_eq!(status(&e, R1), CoordStatus::Held);
        assert_eq!(speed(&e, R1), 0);
        assert_eq!(expected_time(&e, R1), 3);

        report(&mut e, R1, MovementStatus::RelayStopped);
        e.tick(Tick(4)).unwrap();
        assert_eq!(status(&e, R1), CoordStatus::Held);
        assert_eq!(expected_time(&e, R1), 4);
    }

    /// Robot 1 reaches the intersection while robot 0 is still its head,
    /// waits, and resumes once robot 0 has passed through and finished.
    #[test]
    fn admission_scenario() {
        let (mut e, rxs) = started();
        frame_total(&rxs[1]);

        // Robot 1 enters cell 2; its next cell is the intersection.
        report(&mut e, R1, MovementStatus::Crossed);
        e.tick(Tick(3)).unwrap();
        assert_eq!(status(&e, R1), CoordStatus::Blocked);
        assert_eq!(speed(&e, R1), 0);
        assert_eq!(sent(&mut e, R1), Some(ControlCommand::Hold.into()));
        // Robot 0 was in standby with a speed: it is told to go.
        assert_eq!(status(&e, R0), CoordStatus::Moving);
        assert_eq!(sent(&mut e, R0), Some(ControlCommand::Resume.into()));
        let own = engine_entry(&e, R1);
        assert_eq!(own, (1, 1));

        // Each refused restart request grows the estimate.
        for t in 4..6 {
            report(&mut e, R1, MovementStatus::RestartRequest);
            e.tick(Tick(t)).unwrap();
            assert_eq!(status(&e, R1), CoordStatus::Blocked);
            assert_eq!(sent(&mut e, R1), Some(ControlCommand::Hold.into()));
        }
        assert_eq!(engine_entry(&e, R1), (1, 3));

        // Robot 0 enters the intersection and leaves the queue.
        report(&mut e, R0, MovementStatus::Crossed);
        e.tick(Tick(6)).unwrap();
        assert_eq!(e.queue_head(X), Some(R1));
        assert_eq!(e.robot(R0).unwrap().cursor, 1);
        // Robot 0 still sits on the cell.
        assert!(!e.may_enter(R1));
        assert_eq!(engine_entry(&e, R1), (1, 2));
        report(&mut e, R1, MovementStatus::RestartRequest);
        e.tick(Tick(7)).unwrap();
        assert_eq!(sent(&mut e, R1), Some(ControlCommand::Hold.into()));
        assert_eq!(engine_entry(&e, R1), (1, 3));

        // Robot 0 enters its last cell and finishes.
        report(&mut e, R0, MovementStatus::Crossed);
        e.tick(Tick(8)).unwrap();
        assert_eq!(status(&e, R0), CoordStatus::Finished);
        assert_eq!(sent(&mut e, R0), Some(ControlCommand::Halt.into()));
        assert!(e.may_enter(R1));

        report(&mut e, R1, MovementStatus::RestartRequest);
        e.tick(Tick(9)).unwrap();
        assert_eq!(status(&e, R1), CoordStatus::Moving);
        assert_eq!(sent(&mut e, R1), Some(ControlCommand::Resume.into()));
        // A permitted restart leaves the estimate alone.
        assert_eq!(engine_entry(&e, R1), (1, 3));

        // Moving at zero speed: one cell over three units is 666, cut to 650.
        e.tick(Tick(10)).unwrap();
        assert_eq!(speed(&e, R1), 650);
        assert_eq!(sent(&mut e, R1), Some(ControlCommand::SpeedProfile.into()));
        assert_eq!(frame_total(&rxs[1]), 650);
    }

    fn engine_entry(e: &CoordEngine, robot: RobotId) -> (u32, u32) {
        let entry = e.admission().queue_at(X).and_then(|q| q.entry(robot)).unwrap();
        (entry.distance, entry.expected_time)
    }

    #[test]
    fn terminal_report_finishes_robot() {
        let (mut e, _rxs) = started();
        report(&mut e, R0, MovementStatus::Crossed);
        e.tick(Tick(3)).unwrap();
        sent(&mut e, R0);
        report(&mut e, R0, MovementStatus::Crossed);
        e.tick(Tick(4)).unwrap();
        assert_eq!(status(&e, R0), CoordStatus::Finished);
        assert_eq!(sent(&mut e, R0), Some(ControlCommand::Halt.into()));
        let rec = e.robot(R0).unwrap();
        assert_eq!((rec.current, rec.next), (CellId(6), CellId::INVALID));

        // Nothing more is said to a finished robot.
        report(&mut e, R0, MovementStatus::Stopped);
        e.tick(Tick(5)).unwrap();
        assert_eq!(status(&e, R0), CoordStatus::Finished);
        assert_eq!(sent(&mut e, R0), None);
    }

    #[test]
    fn non_movement_codes_are_ignored() {
        let (mut e, _rxs) = started();
        assert!(e.accept_inbound(R0, NavCode(9)));
        e.tick(Tick(3)).unwrap();
        assert_eq!(status(&e, R0), CoordStatus::Moving);
    }

    #[test]
    fn one_report_per_tick() {
        let (mut e, _rxs) = engine(&crossing_layout());
        assert!(e.accept_inbound(R0, NavCode(0)));
        assert!(!e.accept_inbound(R0, NavCode(1)));
    }

    #[test]
    fn sender_count_must_match() {
        let layout = crossing_layout();
        let (tx, _rx) = bulk_channel(80);
        let err = CoordEngine::new(&layout, Kinematics::default(), vec![tx]);
        assert!(matches!(err, Err(CoordError::BulkSenders { expected: 2, got: 1 })));
    }
}
