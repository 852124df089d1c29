//! Movement shared by robots and obstacles.

use agv_core::Kinematics;
use agv_layout::{GridMap, Path};

use crate::{Body, Heading};

/// Result of one movement attempt.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum Move {
    Refused,
    /// `advanced` is set when the body entered its next cell.
    Moved { advanced: bool },
}

impl Move {
    #[inline]
    pub fn moved(self) -> bool {
        matches!(self, Move::Moved { .. })
    }

    #[inline]
    pub fn advanced(self) -> bool {
        matches!(self, Move::Moved { advanced: true })
    }
}

/// Move `body` by its speed toward its next cell.
///
/// Leaving the cell advances the cursor along `path` and wraps the offset.
/// When the path has nothing after the next cell the step is refused and the
/// body left untouched, unless `may_cross` is set, in which case the body
/// still enters that last cell.
pub fn step(body: &mut Body, path: &Path, grid: &GridMap, k: &Kinematics, may_cross: bool) -> Move {
    let Some(heading) = Heading::between(grid, body.current, body.next) else {
        return Move::Refused;
    };
    let speed = body.speed;
    let (pos, delta) = match heading {
        Heading::West  => (&mut body.x, -speed),
        Heading::East  => (&mut body.x, speed),
        Heading::North => (&mut body.y, -speed),
        Heading::South => (&mut body.y, speed),
    };
    let target = *pos + delta;
    if (0..k.cell_width).contains(&target) {
        *pos = target;
        return Move::Moved { advanced: false };
    }
    let after = path.after(body.next);
    if !after.is_valid() && !may_cross {
        return Move::Refused;
    }
    *pos = target.rem_euclid(k.cell_width);
    body.current = body.next;
    body.next = after;
    Move::Moved { advanced: true }
}

/// Move `body` toward the cell center on the axis farthest from it.
///
/// Axes within `window` of the center are left alone.  The step never
/// overshoots the center.  Returns `false` if both axes were already
/// inside the window.
pub fn walk_to_center(body: &mut Body, k: &Kinematics, stride: i64, window: i64) -> bool {
    let c = k.center();
    let dx = body.x - c;
    let dy = body.y - c;
    let (pos, d) = if dx.abs() >= dy.abs() {
        (&mut body.x, dx)
    } else {
        (&mut body.y, dy)
    };
    if d.abs() <= window {
        return false;
    }
    *pos -= d.signum() * stride.min(d.abs());
    true
}
