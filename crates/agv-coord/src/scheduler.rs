//! Speed scheduling.
//!
//! Robots queued at the same intersection are given speeds that spread
//! their arrivals out: each robot's target is its remaining distance over
//! the summed estimates of everyone ahead of it plus its own.  Speeds reach
//! the robot as a token stream, never as an absolute value.

use tracing::debug;

use agv_core::{ControlCommand, Kinematics, RobotId, TokenStream};

use crate::{AdmissionQueue, CoordResult, RobotRecord};

/// Target speed for a robot `distance` cells away with `cumulative` time
/// units of traffic at or ahead of it.
///
/// Truncated to `speed_quantum`, never below `min_speed`.
pub fn target_speed(distance: u32, cumulative: u32, k: &Kinematics) -> i64 {
    let time = i64::from(cumulative.max(1)) * k.time_scale;
    let raw = i64::from(distance) * k.distance_scale / time;
    (raw / k.speed_quantum * k.speed_quantum).max(k.min_speed)
}

/// Re-plan every robot waiting on `queue`.
///
/// Entries whose robot is currently heading for a different intersection are
/// skipped entirely.  `exclude` still contributes to the cumulative time but
/// is never sent a profile.  Returns the number of profiles sent.
pub fn schedule(
    robots:  &mut [RobotRecord],
    queue:   &AdmissionQueue,
    k:       &Kinematics,
    exclude: Option<RobotId>,
) -> CoordResult<u32> {
    let mut cumulative = 0u32;
    let mut sent = 0;
    for entry in queue.entries() {
        let Some(rec) = robots.get_mut(entry.robot.index()) else {
            continue;
        };
        if rec.pending_crossing() != queue.cell() || !rec.status.is_scheduled() {
            continue;
        }
        cumulative += entry.expected_time;
        let target = target_speed(entry.distance, cumulative, k);

        if Some(rec.id) != exclude
            && rec.port_idle()
            && rec.status.accepts_profile()
            && target != rec.speed
        {
            send_profile(rec, target, k)?;
            sent += 1;
        }
    }
    Ok(sent)
}

/// Bring a robot with no intersections left back to cruise speed.
pub fn restore_cruise(rec: &mut RobotRecord, k: &Kinematics) -> CoordResult<bool> {
    if !rec.port_idle() || rec.speed == k.cruise_speed || !rec.status.is_scheduled() {
        return Ok(false);
    }
    send_profile(rec, k.cruise_speed, k)?;
    Ok(true)
}

fn send_profile(rec: &mut RobotRecord, target: i64, k: &Kinematics) -> CoordResult<()> {
    let stream = TokenStream::between(rec.speed, target, k);
    rec.bulk.send_steps(stream.iter())?;
    debug!(robot = %rec.id, from = rec.speed, to = target, steps = stream.len(), "speed profile");
    rec.post(ControlCommand::SpeedProfile);
    rec.speed = target;
    Ok(())
}
