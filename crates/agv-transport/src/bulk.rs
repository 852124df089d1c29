//! Bulk side-channel: routes and speed-token streams.
//!
//! A bounded single-producer/single-consumer queue per robot.  Data travels
//! in frames terminated by [`BulkWord::End`]; the control code that tells the
//! receiver to drain a frame (`Route` or `SpeedProfile`) goes over the
//! acknowledged link separately.
//!
//! A frame is written whole or not at all.  Running out of room is a
//! configuration error, never a retry condition.

use crossbeam_channel::{Receiver, Sender, TryRecvError, TrySendError};
use tracing::warn;

use agv_core::{CellId, SpeedStep};

use crate::{TransportError, TransportResult};

/// One slot on the bulk channel.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum BulkWord {
    Cell(CellId),
    Step(SpeedStep),
    /// Frame terminator.
    End,
}

/// Create a bulk channel holding `capacity` words.
pub fn bulk_channel(capacity: usize) -> (BulkSender, BulkReceiver) {
    let (tx, rx) = crossbeam_channel::bounded(capacity);
    (BulkSender { tx, capacity }, BulkReceiver { rx })
}

// ── Sender ────────────────────────────────────────────────────────────────────

#[derive(Clone, Debug)]
pub struct BulkSender {
    tx:       Sender<BulkWord>,
    capacity: usize,
}

impl BulkSender {
    /// Write `words` followed by `End`.
    pub fn send_frame<I>(&self, words: I) -> TransportResult<()>
    where
        I: IntoIterator<Item = BulkWord>,
    {
        let frame: Vec<BulkWord> = words
            .into_iter()
            .filter(|w| *w != BulkWord::End)
            .chain(std::iter::once(BulkWord::End))
            .collect();
        let free = self.capacity.saturating_sub(self.tx.len());
        if frame.len() > free {
            return Err(TransportError::BulkOverflow { needed: frame.len(), free });
        }
        for word in frame {
            self.tx.try_send(word).map_err(|e| match e {
                TrySendError::Full(_) => TransportError::BulkOverflow { needed: 1, free: 0 },
                TrySendError::Disconnected(_) => TransportError::BulkDisconnected,
            })?;
        }
        Ok(())
    }

    pub fn send_cells<I: IntoIterator<Item = CellId>>(&self, cells: I) -> TransportResult<()> {
        self.send_frame(cells.into_iter().map(BulkWord::Cell))
    }

    pub fn send_steps<I: IntoIterator<Item = SpeedStep>>(&self, steps: I) -> TransportResult<()> {
        self.send_frame(steps.into_iter().map(BulkWord::Step))
    }

    /// Words currently waiting to be drained.
    pub fn len(&self) -> usize {
        self.tx.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tx.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

// ── Receiver ──────────────────────────────────────────────────────────────────

/// Words drained from one frame.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BulkFrame {
    pub words:      Vec<BulkWord>,
    /// `false` if the channel ran dry before `End`.
    pub terminated: bool,
}

impl BulkFrame {
    pub fn cells(&self) -> impl Iterator<Item = CellId> + '_ {
        self.words.iter().filter_map(|w| match w {
            BulkWord::Cell(c) => Some(*c),
            _ => None,
        })
    }

    pub fn steps(&self) -> impl Iterator<Item = SpeedStep> + '_ {
        self.words.iter().filter_map(|w| match w {
            BulkWord::Step(s) => Some(*s),
            _ => None,
        })
    }
}

#[derive(Debug)]
pub struct BulkReceiver {
    rx: Receiver<BulkWord>,
}

impl BulkReceiver {
    /// Read words up to and including the next `End`.
    ///
    /// Never blocks.  A frame cut short by an empty channel is returned with
    /// `terminated == false`.
    pub fn drain_frame(&self) -> BulkFrame {
        let mut frame = BulkFrame::default();
        loop {
            match self.rx.try_recv() {
                Ok(BulkWord::End) => {
                    frame.terminated = true;
                    break;
                }
                Ok(word) => frame.words.push(word),
                Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => break,
            }
        }
        if !frame.terminated {
            warn!(words = frame.words.len(), "bulk frame ended without terminator");
        }
        frame
    }

    pub fn len(&self) -> usize {
        self.rx.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rx.is_empty()
    }
}
