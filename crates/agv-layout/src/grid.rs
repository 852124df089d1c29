//! Cell ids to grid coordinates.
//!
//! The map is a rectangle of slots, `x` along a row and `y` down the rows.
//! A slot holds either a cell id or a wall (`-1` in configuration).  Cell ids
//! are arbitrary labels; only their coordinates carry geometry.

use std::collections::HashMap;

use agv_core::CellId;

use crate::{LayoutError, LayoutResult};

/// Column/row of a cell on the map.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
pub struct CellCoord {
    pub x: u16,
    pub y: u16,
}

impl CellCoord {
    /// Manhattan distance between two slots.
    #[inline]
    pub fn manhattan(self, other: CellCoord) -> u32 {
        (self.x.abs_diff(other.x) + self.y.abs_diff(other.y)) as u32
    }
}

/// Rectangular map of cells and walls.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GridMap {
    width:  u16,
    height: u16,
    /// Row-major slots; `CellId::INVALID` marks a wall.
    slots:  Vec<CellId>,
    coords: HashMap<CellId, CellCoord>,
}

impl GridMap {
    /// Build from map rows as written in configuration (`-1` = wall).
    ///
    /// All rows must have the same length and every cell id must be unique.
    pub fn from_rows<R: AsRef<[i64]>>(rows: &[R]) -> LayoutResult<Self> {
        let height = rows.len();
        let width = rows.first().map(|r| r.as_ref().len()).unwrap_or(0);
        if width == 0 || height == 0 {
            return Err(LayoutError::Parse("grid has no cells".into()));
        }
        if width > u16::MAX as usize || height > u16::MAX as usize {
            return Err(LayoutError::Parse(format!("grid {width}x{height} is too large")));
        }

        let mut slots = Vec::with_capacity(width * height);
        let mut coords = HashMap::new();
        for (y, row) in rows.iter().enumerate() {
            let row = row.as_ref();
            if row.len() != width {
                return Err(LayoutError::Parse(format!(
                    "grid row {y} has {} slots, expected {width}",
                    row.len()
                )));
            }
            for (x, &raw) in row.iter().enumerate() {
                if raw < 0 {
                    slots.push(CellId::INVALID);
                    continue;
                }
                let cell = u32::try_from(raw)
                    .map(CellId)
                    .map_err(|_| LayoutError::Parse(format!("cell id {raw} out of range")))?;
                let coord = CellCoord { x: x as u16, y: y as u16 };
                if coords.insert(cell, coord).is_some() {
                    return Err(LayoutError::DuplicateCell(cell));
                }
                slots.push(cell);
            }
        }

        Ok(Self { width: width as u16, height: height as u16, slots, coords })
    }

    #[inline]
    pub fn coord(&self, cell: CellId) -> Option<CellCoord> {
        self.coords.get(&cell).copied()
    }

    /// Cell at `(x, y)`, or `None` for a wall or an out-of-range slot.
    pub fn cell_at(&self, x: u16, y: u16) -> Option<CellId> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let cell = self.slots[y as usize * self.width as usize + x as usize];
        cell.is_valid().then_some(cell)
    }

    #[inline]
    pub fn contains(&self, cell: CellId) -> bool {
        self.coords.contains_key(&cell)
    }

    /// `true` if both cells exist and share an edge.
    pub fn adjacent(&self, a: CellId, b: CellId) -> bool {
        match (self.coord(a), self.coord(b)) {
            (Some(ca), Some(cb)) => ca.manhattan(cb) == 1,
            _ => false,
        }
    }

    pub fn width(&self) -> u16 {
        self.width
    }

    pub fn height(&self) -> u16 {
        self.height
    }

    /// Number of non-wall slots.
    pub fn cell_count(&self) -> usize {
        self.coords.len()
    }

    /// Map rows in configuration form (`-1` = wall).
    pub fn to_rows(&self) -> Vec<Vec<i64>> {
        self.slots
            .chunks(self.width as usize)
            .map(|row| {
                row.iter()
                    .map(|c| if c.is_valid() { c.0 as i64 } else { -1 })
                    .collect()
            })
            .collect()
    }
}
