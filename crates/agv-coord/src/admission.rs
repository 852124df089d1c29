//! Intersection admission queues.
//!
//! Each contested cell has a fixed priority order.  Only the head of a queue
//! may enter the cell; a robot leaves its queue once it is inside.

use agv_core::{CellId, IntersectionId, RobotId};
use agv_layout::IntersectionSeed;

#[cfg(feature = "fx-hash")]
type CellIndex = rustc_hash::FxHashMap<CellId, IntersectionId>;
#[cfg(not(feature = "fx-hash"))]
type CellIndex = std::collections::HashMap<CellId, IntersectionId>;

/// One robot's place in a queue.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct AdmissionEntry {
    pub robot:         RobotId,
    /// Cells still to travel before the intersection.
    pub distance:      u32,
    /// Time units still expected before the intersection.
    pub expected_time: u32,
}

impl AdmissionEntry {
    /// Count one cell down, never below 1.
    fn step_down(&mut self) {
        self.distance = self.distance.saturating_sub(1).max(1);
        self.expected_time = self.expected_time.saturating_sub(1).max(1);
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AdmissionQueue {
    cell:    CellId,
    entries: Vec<AdmissionEntry>,
}

impl AdmissionQueue {
    pub fn from_seed(seed: &IntersectionSeed) -> Self {
        Self {
            cell:    seed.cell,
            entries: seed
                .entries
                .iter()
                .map(|e| AdmissionEntry {
                    robot:         e.robot,
                    distance:      e.distance,
                    expected_time: e.expected_time,
                })
                .collect(),
        }
    }

    pub fn cell(&self) -> CellId {
        self.cell
    }

    pub fn head(&self) -> Option<RobotId> {
        self.entries.first().map(|e| e.robot)
    }

    pub fn entries(&self) -> &[AdmissionEntry] {
        &self.entries
    }

    pub fn entry(&self, robot: RobotId) -> Option<&AdmissionEntry> {
        self.entries.iter().find(|e| e.robot == robot)
    }

    pub fn position(&self, robot: RobotId) -> Option<usize> {
        self.entries.iter().position(|e| e.robot == robot)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Add one time unit to `robot`'s estimate.
    pub fn bump(&mut self, robot: RobotId) -> bool {
        match self.entries.iter_mut().find(|e| e.robot == robot) {
            Some(e) => {
                e.expected_time += 1;
                true
            }
            None => false,
        }
    }

    /// `robot` moved one cell closer.
    pub fn step_down(&mut self, robot: RobotId) -> bool {
        match self.entries.iter_mut().find(|e| e.robot == robot) {
            Some(e) => {
                e.step_down();
                true
            }
            None => false,
        }
    }

    /// Take `robot` out of the queue.  Every robot behind it steps down.
    pub fn remove(&mut self, robot: RobotId) -> Option<AdmissionEntry> {
        let at = self.position(robot)?;
        let removed = self.entries.remove(at);
        for e in &mut self.entries[at..] {
            e.step_down();
        }
        Some(removed)
    }
}

// ── Admission ─────────────────────────────────────────────────────────────────

/// All queues, indexed by `IntersectionId` and looked up by cell.
#[derive(Clone, Debug, Default)]
pub struct Admission {
    queues:  Vec<AdmissionQueue>,
    by_cell: CellIndex,
}

impl Admission {
    pub fn from_seeds(seeds: &[IntersectionSeed]) -> Self {
        let queues: Vec<AdmissionQueue> = seeds.iter().map(AdmissionQueue::from_seed).collect();
        let by_cell = queues
            .iter()
            .enumerate()
            .map(|(i, q)| (q.cell, IntersectionId(i as u16)))
            .collect();
        Self { queues, by_cell }
    }

    pub fn lookup(&self, cell: CellId) -> Option<IntersectionId> {
        self.by_cell.get(&cell).copied()
    }

    pub fn queue(&self, ix: IntersectionId) -> Option<&AdmissionQueue> {
        self.queues.get(ix.index())
    }

    pub fn queue_at(&self, cell: CellId) -> Option<&AdmissionQueue> {
        self.lookup(cell).and_then(|ix| self.queue(ix))
    }

    pub(crate) fn queue_at_mut(&mut self, cell: CellId) -> Option<&mut AdmissionQueue> {
        let ix = self.lookup(cell)?;
        self.queues.get_mut(ix.index())
    }

    pub fn queues(&self) -> &[AdmissionQueue] {
        &self.queues
    }

    /// Head of the queue at `cell`, if `cell` is an intersection.
    pub fn head_at(&self, cell: CellId) -> Option<RobotId> {
        self.queue_at(cell).and_then(AdmissionQueue::head)
    }

    pub fn len(&self) -> usize {
        self.queues.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queues.is_empty()
    }
}
