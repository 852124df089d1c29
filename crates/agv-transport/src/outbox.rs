//! Per-destination send slot.
//!
//! An outbox holds at most one queued code and one code in flight.  Posting
//! while a code is queued replaces it: only the newest instruction matters.

use agv_core::NavCode;

use crate::Handshake;

#[derive(Clone, Debug, Default)]
pub struct Outbox {
    queued:    Option<NavCode>,
    in_flight: Option<NavCode>,
}

impl Outbox {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue `code`, returning the queued code it replaced.
    pub fn post(&mut self, code: impl Into<NavCode>) -> Option<NavCode> {
        self.queued.replace(code.into())
    }

    /// Move the queued code into flight.  `None` while a code is already in
    /// flight or nothing is queued.
    pub fn poll(&mut self) -> Option<NavCode> {
        if self.in_flight.is_some() {
            return None;
        }
        self.in_flight = self.queued.take();
        self.in_flight
    }

    /// Apply the outcome of the in-flight handshake.
    ///
    /// A nacked code goes back to the queue unless something newer was
    /// posted meanwhile.
    pub fn settle(&mut self, outcome: Handshake) {
        match outcome {
            Handshake::Delivered(_) => self.in_flight = None,
            Handshake::Nacked(code) => {
                self.in_flight = None;
                if self.queued.is_none() {
                    self.queued = Some(code);
                }
            }
            Handshake::Idle | Handshake::Waiting => {}
        }
    }

    /// Drop the in-flight code without requeueing it.
    pub fn abandon(&mut self) -> Option<NavCode> {
        self.in_flight.take()
    }

    pub fn queued(&self) -> Option<NavCode> {
        self.queued
    }

    pub fn in_flight(&self) -> Option<NavCode> {
        self.in_flight
    }

    #[inline]
    pub fn has_queued(&self) -> bool {
        self.queued.is_some()
    }

    /// `true` while anything is queued or awaiting its acknowledge.
    #[inline]
    pub fn is_busy(&self) -> bool {
        self.queued.is_some() || self.in_flight.is_some()
    }

    pub fn clear(&mut self) {
        self.queued = None;
        self.in_flight = None;
    }
}
