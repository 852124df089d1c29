//! Ordered cell sequences.

use agv_core::CellId;

use crate::{LayoutError, LayoutResult};

/// A route or obstacle loop.
///
/// Stored without the terminating sentinel.  A cyclic path repeats its first
/// cell at the end, so [`Path::after`] on the last cell finds the first
/// occurrence and the loop closes by itself.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Path {
    cells: Vec<CellId>,
}

impl Path {
    pub fn new(cells: Vec<CellId>) -> Self {
        Self { cells }
    }

    /// Build from a configuration sequence, stopping at the first negative
    /// entry (the sentinel).  Ids past the cell id range are rejected.
    pub fn from_terminated(raw: &[i64]) -> LayoutResult<Self> {
        let cells = raw
            .iter()
            .take_while(|&&c| c >= 0)
            .map(|&c| {
                u32::try_from(c)
                    .map(CellId)
                    .ok()
                    .filter(|cell| cell.is_valid())
                    .ok_or_else(|| LayoutError::Parse(format!("cell id {c} out of range")))
            })
            .collect::<LayoutResult<_>>()?;
        Ok(Self { cells })
    }

    /// The cell following the first occurrence of `cell`.
    ///
    /// Returns `CellId::INVALID` when `cell` is the last entry or is not on
    /// the path.
    pub fn after(&self, cell: CellId) -> CellId {
        self.position(cell)
            .and_then(|i| self.cells.get(i + 1))
            .copied()
            .unwrap_or(CellId::INVALID)
    }

    #[inline]
    pub fn first(&self) -> CellId {
        self.cells.first().copied().unwrap_or(CellId::INVALID)
    }

    #[inline]
    pub fn second(&self) -> CellId {
        self.cells.get(1).copied().unwrap_or(CellId::INVALID)
    }

    pub fn position(&self, cell: CellId) -> Option<usize> {
        self.cells.iter().position(|&c| c == cell)
    }

    pub fn contains(&self, cell: CellId) -> bool {
        self.cells.contains(&cell)
    }

    /// `true` if the path has at least one step and returns to its start.
    pub fn is_cyclic(&self) -> bool {
        self.cells.len() > 1 && self.cells.first() == self.cells.last()
    }

    pub fn cells(&self) -> &[CellId] {
        &self.cells
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = CellId> + '_ {
        self.cells.iter().copied()
    }
}

impl FromIterator<CellId> for Path {
    fn from_iter<I: IntoIterator<Item = CellId>>(iter: I) -> Self {
        Self { cells: iter.into_iter().collect() }
    }
}
