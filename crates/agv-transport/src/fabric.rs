//! Per-robot lanes and the two exchange passes.
//!
//! A [`Lane`] owns the relay and the four links of one robot.  The
//! [`Fabric`] runs every lane through an uplink pass (physical → relay →
//! coordination) and a downlink pass (coordination → relay → physical).
//! Each pass touches each of its two links once, so every link carries at
//! most one send per tick.

use agv_core::{NavCode, RobotId, Tick};

use crate::{Handshake, Link, Relay, TransportResult};

/// One side of the fabric: an engine that sends and receives codes per robot.
pub trait Endpoint {
    /// Next code to send for `robot`, moved into flight.  Called only when
    /// the outbound link is idle.
    fn poll_outbound(&mut self, robot: RobotId) -> Option<NavCode>;

    /// Outcome of the code last returned by `poll_outbound`.
    fn outbound_settled(&mut self, robot: RobotId, outcome: Handshake);

    /// Offer an inbound code.  Return `false` to refuse (no acknowledge).
    fn accept_inbound(&mut self, robot: RobotId, code: NavCode) -> bool;
}

/// Counters for one exchange pass.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct ExchangeStats {
    /// Codes acknowledged by their receiver.
    pub delivered: u32,
    /// Handshakes that timed out.
    pub nacks:     u32,
    /// Pending codes the receiver declined this pass.
    pub refused:   u32,
}

impl ExchangeStats {
    fn record(&mut self, outcome: Handshake) {
        match outcome {
            Handshake::Delivered(_) => self.delivered += 1,
            Handshake::Nacked(_) => self.nacks += 1,
            Handshake::Idle | Handshake::Waiting => {}
        }
    }
}

impl std::ops::AddAssign for ExchangeStats {
    fn add_assign(&mut self, rhs: Self) {
        self.delivered += rhs.delivered;
        self.nacks += rhs.nacks;
        self.refused += rhs.refused;
    }
}

// ── Lane ──────────────────────────────────────────────────────────────────────

#[derive(Clone, Debug)]
pub struct Lane {
    robot:          RobotId,
    pub relay:      Relay,
    phys_to_relay:  Link,
    relay_to_coord: Link,
    coord_to_relay: Link,
    relay_to_phys:  Link,
}

impl Lane {
    pub fn new(robot: RobotId, ack_timeout_ticks: u64) -> Self {
        Self {
            robot,
            relay:          Relay::new(robot),
            phys_to_relay:  Link::new(ack_timeout_ticks),
            relay_to_coord: Link::new(ack_timeout_ticks),
            coord_to_relay: Link::new(ack_timeout_ticks),
            relay_to_phys:  Link::new(ack_timeout_ticks),
        }
    }

    pub fn robot(&self) -> RobotId {
        self.robot
    }

    /// `true` when no link holds a code and the relay has nothing waiting.
    pub fn is_quiet(&self) -> bool {
        self.relay.is_idle()
            && self.phys_to_relay.is_idle()
            && self.relay_to_coord.is_idle()
            && self.coord_to_relay.is_idle()
            && self.relay_to_phys.is_idle()
    }

    pub fn uplink<P, C>(&mut self, now: Tick, phys: &mut P, coord: &mut C) -> TransportResult<ExchangeStats>
    where
        P: Endpoint + ?Sized,
        C: Endpoint + ?Sized,
    {
        let robot = self.robot;
        let mut stats = ExchangeStats::default();

        // Hop 1: engine → relay.
        if self.phys_to_relay.is_idle() {
            if let Some(code) = phys.poll_outbound(robot) {
                self.phys_to_relay.send(code, now)?;
            }
        }
        if self.phys_to_relay.pending().is_some() {
            if self.relay.can_accept_uplink() {
                if let Some(code) = self.phys_to_relay.observe() {
                    self.relay.accept_uplink(code);
                }
            } else {
                stats.refused += 1;
            }
        }
        let outcome = self.phys_to_relay.settle(now);
        stats.record(outcome);
        if outcome != Handshake::Idle {
            phys.outbound_settled(robot, outcome);
        }

        // Hop 2: relay → engine.
        if self.relay_to_coord.is_idle() {
            if let Some(code) = self.relay.poll_uplink() {
                self.relay_to_coord.send(code, now)?;
            }
        }
        if let Some(code) = self.relay_to_coord.pending() {
            if coord.accept_inbound(robot, code) {
                self.relay_to_coord.observe();
            } else {
                stats.refused += 1;
            }
        }
        let outcome = self.relay_to_coord.settle(now);
        stats.record(outcome);
        self.relay.uplink_settled(outcome);

        Ok(stats)
    }

    pub fn downlink<C, P>(&mut self, now: Tick, coord: &mut C, phys: &mut P) -> TransportResult<ExchangeStats>
    where
        C: Endpoint + ?Sized,
        P: Endpoint + ?Sized,
    {
        let robot = self.robot;
        let mut stats = ExchangeStats::default();

        if self.coord_to_relay.is_idle() {
            if let Some(code) = coord.poll_outbound(robot) {
                self.coord_to_relay.send(code, now)?;
            }
        }
        if self.coord_to_relay.pending().is_some() {
            if self.relay.can_accept_downlink() {
                if let Some(code) = self.coord_to_relay.observe() {
                    self.relay.accept_downlink(code);
                }
            } else {
                stats.refused += 1;
            }
        }
        let outcome = self.coord_to_relay.settle(now);
        stats.record(outcome);
        if outcome != Handshake::Idle {
            coord.outbound_settled(robot, outcome);
        }

        if self.relay_to_phys.is_idle() {
            if let Some(code) = self.relay.poll_downlink() {
                self.relay_to_phys.send(code, now)?;
            }
        }
        if let Some(code) = self.relay_to_phys.pending() {
            if phys.accept_inbound(robot, code) {
                self.relay_to_phys.observe();
            } else {
                stats.refused += 1;
            }
        }
        let outcome = self.relay_to_phys.settle(now);
        stats.record(outcome);
        self.relay.downlink_settled(outcome);

        Ok(stats)
    }
}

// ── Fabric ────────────────────────────────────────────────────────────────────

/// All lanes, indexed by `RobotId`.
#[derive(Clone, Debug)]
pub struct Fabric {
    lanes: Vec<Lane>,
}

impl Fabric {
    pub fn new(robot_count: usize, ack_timeout_ticks: u64) -> Self {
        let lanes = (0..robot_count)
            .map(|r| Lane::new(RobotId(r as u32), ack_timeout_ticks))
            .collect();
        Self { lanes }
    }

    pub fn lane(&self, robot: RobotId) -> Option<&Lane> {
        self.lanes.get(robot.index())
    }

    pub fn lanes(&self) -> &[Lane] {
        &self.lanes
    }

    pub fn len(&self) -> usize {
        self.lanes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lanes.is_empty()
    }

    /// Physical → relay → coordination for every robot.
    pub fn uplink<P, C>(&mut self, now: Tick, phys: &mut P, coord: &mut C) -> TransportResult<ExchangeStats>
    where
        P: Endpoint + ?Sized,
        C: Endpoint + ?Sized,
    {
        let mut total = ExchangeStats::default();
        for lane in &mut self.lanes {
            total += lane.uplink(now, phys, coord)?;
        }
        Ok(total)
    }

    /// Coordination → relay → physical for every robot.
    pub fn downlink<C, P>(&mut self, now: Tick, coord: &mut C, phys: &mut P) -> TransportResult<ExchangeStats>
    where
        C: Endpoint + ?Sized,
        P: Endpoint + ?Sized,
    {
        let mut total = ExchangeStats::default();
        for lane in &mut self.lanes {
            total += lane.downlink(now, coord, phys)?;
        }
        Ok(total)
    }

    /// Stop pairs synthesized across all relays.
    pub fn stop_pairs(&self) -> u64 {
        self.lanes.iter().map(|l| l.relay.stop_pairs()).sum()
    }
}
