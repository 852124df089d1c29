//! Navigation codes exchanged between the engines through the relays.
//!
//! A code is a small integer on the wire ([`NavCode`]).  Its meaning depends
//! only on which range it falls in:
//!
//! | Range  | Producer            | Type               |
//! |--------|---------------------|--------------------|
//! | 0 – 4  | physical engine     | [`MovementStatus`] |
//! | 5 – 11 | coordination engine | [`ControlCommand`] |
//!
//! The relay moves `NavCode`s without decoding them.

use std::fmt;

use crate::{AgvError, AgvResult};

/// Raw wire code.
#[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct NavCode(pub u16);

/// Motion outcome reported by the physical engine.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(u16)]
pub enum MovementStatus {
    /// Robot stopped on its own (blocked or refused at an edge).
    Stopped        = 0,
    /// Stopped robot is able to move again and asks to go.
    RestartRequest = 1,
    /// Robot is within the boundary margin and asks to cross.
    CrossingBegin  = 2,
    /// Stop synthesized by a relay after a failed handshake.
    RelayStopped   = 3,
    /// Robot has entered its next cell.
    Crossed        = 4,
}

/// Instruction issued by the coordination engine.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(u16)]
pub enum ControlCommand {
    ClearToCross = 5,
    /// Startup go-ahead after a route handoff.
    Activate     = 6,
    /// Hard stop; also the terminal code at route end.
    Halt         = 7,
    Hold         = 8,
    /// Restore the status the robot had before it was stopped.
    Resume       = 9,
    /// A speed token stream is waiting on the bulk channel.
    SpeedProfile = 10,
    /// A route is waiting on the bulk channel.
    Route        = 11,
}

/// A [`NavCode`] resolved to its range.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum Decoded {
    Movement(MovementStatus),
    Control(ControlCommand),
}

impl NavCode {
    /// Resolve the code to its typed meaning, or `None` if out of range.
    pub fn decode(self) -> Option<Decoded> {
        use ControlCommand as C;
        use MovementStatus as M;
        Some(match self.0 {
            0  => Decoded::Movement(M::Stopped),
            1  => Decoded::Movement(M::RestartRequest),
            2  => Decoded::Movement(M::CrossingBegin),
            3  => Decoded::Movement(M::RelayStopped),
            4  => Decoded::Movement(M::Crossed),
            5  => Decoded::Control(C::ClearToCross),
            6  => Decoded::Control(C::Activate),
            7  => Decoded::Control(C::Halt),
            8  => Decoded::Control(C::Hold),
            9  => Decoded::Control(C::Resume),
            10 => Decoded::Control(C::SpeedProfile),
            11 => Decoded::Control(C::Route),
            _  => return None,
        })
    }

    /// Short protocol name used in logs, e.g. `"STOP1"`.
    pub fn name(self) -> &'static str {
        const NAMES: [&str; 12] = [
            "STOPPED1", "RESTART", "CROSSING", "STOPPED2", "CROSSED",
            "OK1", "OK2", "STOP1", "STOP2", "RESUME", "SPEED", "PATH",
        ];
        NAMES.get(self.0 as usize).copied().unwrap_or("UNKNOWN")
    }
}

impl From<MovementStatus> for NavCode {
    #[inline]
    fn from(s: MovementStatus) -> NavCode {
        NavCode(s as u16)
    }
}

impl From<ControlCommand> for NavCode {
    #[inline]
    fn from(c: ControlCommand) -> NavCode {
        NavCode(c as u16)
    }
}

impl TryFrom<NavCode> for MovementStatus {
    type Error = AgvError;

    fn try_from(code: NavCode) -> AgvResult<Self> {
        match code.decode() {
            Some(Decoded::Movement(s)) => Ok(s),
            Some(Decoded::Control(_)) => Err(AgvError::WrongRange { code, expected: "movement status" }),
            None => Err(AgvError::UnknownCode(code)),
        }
    }
}

impl TryFrom<NavCode> for ControlCommand {
    type Error = AgvError;

    fn try_from(code: NavCode) -> AgvResult<Self> {
        match code.decode() {
            Some(Decoded::Control(c)) => Ok(c),
            Some(Decoded::Movement(_)) => Err(AgvError::WrongRange { code, expected: "control command" }),
            None => Err(AgvError::UnknownCode(code)),
        }
    }
}

impl fmt::Display for NavCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", self.name(), self.0)
    }
}
