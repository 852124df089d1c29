//! Single-in-flight request/acknowledge link.
//!
//! ```text
//!            send()             observe()
//!   Idle ───────────▶ Pending ────────────▶ Acknowledged
//!    ▲                   │                       │
//!    │   settle(): nack  │    settle(): deliver  │
//!    └───────────────────┴───────────────────────┘
//! ```
//!
//! The sender calls [`Link::send`] and later [`Link::settle`]; the receiver
//! calls [`Link::observe`] in between if it is willing to take the code.
//! A nack is declared by `settle` once `ack_timeout_ticks` have passed since
//! the send without an observe.

use agv_core::{NavCode, Tick};

use crate::{TransportError, TransportResult};

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum LinkState {
    Idle,
    Pending { code: NavCode, sent_at: Tick },
    Acknowledged { code: NavCode },
}

/// Sender-side result of [`Link::settle`].
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Handshake {
    /// Nothing was in flight.
    Idle,
    /// Sent, not yet observed, still inside the timeout.
    Waiting,
    Delivered(NavCode),
    Nacked(NavCode),
}

#[derive(Clone, Debug)]
pub struct Link {
    state:             LinkState,
    ack_timeout_ticks: u64,
}

impl Link {
    pub fn new(ack_timeout_ticks: u64) -> Self {
        Self { state: LinkState::Idle, ack_timeout_ticks }
    }

    pub fn state(&self) -> LinkState {
        self.state
    }

    #[inline]
    pub fn is_idle(&self) -> bool {
        self.state == LinkState::Idle
    }

    /// Put `code` on the link.  Fails unless the link is idle.
    pub fn send(&mut self, code: NavCode, now: Tick) -> TransportResult<()> {
        match self.state {
            LinkState::Idle => {
                self.state = LinkState::Pending { code, sent_at: now };
                Ok(())
            }
            LinkState::Pending { code: pending, .. }
            | LinkState::Acknowledged { code: pending } => Err(TransportError::LinkBusy { pending }),
        }
    }

    /// The code awaiting an acknowledge, without acknowledging it.
    pub fn pending(&self) -> Option<NavCode> {
        match self.state {
            LinkState::Pending { code, .. } => Some(code),
            _ => None,
        }
    }

    /// Receiver side: take the pending code and acknowledge it.
    pub fn observe(&mut self) -> Option<NavCode> {
        let code = self.pending()?;
        self.state = LinkState::Acknowledged { code };
        Some(code)
    }

    /// Sender side: close out the handshake if it has finished.
    pub fn settle(&mut self, now: Tick) -> Handshake {
        match self.state {
            LinkState::Idle => Handshake::Idle,
            LinkState::Acknowledged { code } => {
                self.state = LinkState::Idle;
                Handshake::Delivered(code)
            }
            LinkState::Pending { code, sent_at } => {
                if now.since(sent_at) >= self.ack_timeout_ticks {
                    self.state = LinkState::Idle;
                    Handshake::Nacked(code)
                } else {
                    Handshake::Waiting
                }
            }
        }
    }
}
