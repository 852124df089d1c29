//! Physical and scheduling constants shared by both engines.
//!
//! Positions are integer units of 1/100 mm inside a cell, so at a 10 ms tick
//! a speed expressed in mm/s is also the per-tick displacement in position
//! units.  The scheduler's `distance_scale`/`time_scale` pair converts
//! admission estimates (cells, time units) into that same speed unit.

/// Grid and speed constants.  `Default` is the reference warehouse.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Kinematics {
    /// Width of a square cell in position units (2,000 mm).
    pub cell_width: i64,

    /// Distance from an edge at which a robot asks to cross.
    pub boundary_margin: i64,

    /// Half-width of the "at center" window, also the re-centering step.
    pub center_tolerance: i64,

    /// Fixed obstacle speed.
    pub obstacle_speed: i64,

    /// Speed a robot returns to after its last intersection.
    pub cruise_speed: i64,

    /// Speed change of one accelerate token.
    pub accel_step: i64,

    /// Speed change of one decelerate token.
    pub decel_step: i64,

    /// Scheduled speeds are truncated to multiples of this.
    pub speed_quantum: i64,

    /// Floor for a scheduled speed.
    pub min_speed: i64,

    /// Position units per cell of admission distance.
    pub distance_scale: i64,

    /// Ticks per unit of admission expected time.
    pub time_scale: i64,

    /// Simulated milliseconds between two speed tokens.
    pub speed_step_interval_ms: u64,
}

impl Default for Kinematics {
    fn default() -> Self {
        let cell_width = 200_000;
        Self {
            cell_width,
            boundary_margin:        cell_width / 10,
            center_tolerance:       2_000,
            obstacle_speed:         4_000,
            cruise_speed:           2_000,
            accel_step:             100,
            decel_step:             50,
            speed_quantum:          50,
            min_speed:              50,
            distance_scale:         cell_width,
            time_scale:             100,
            speed_step_interval_ms: 100,
        }
    }
}

impl Kinematics {
    /// Coordinate of a cell's center on either axis.
    #[inline]
    pub fn center(&self) -> i64 {
        self.cell_width / 2
    }

    /// `true` if `pos` lies within `boundary_margin` of either cell edge.
    #[inline]
    pub fn near_edge(&self, pos: i64) -> bool {
        pos <= self.boundary_margin || pos >= self.cell_width - self.boundary_margin
    }

    /// `true` if `(x, y)` lies inside the center window.
    #[inline]
    pub fn near_center(&self, x: i64, y: i64) -> bool {
        let c = self.center();
        let t = self.center_tolerance;
        (c - t..=c + t).contains(&x) && (c - t..=c + t).contains(&y)
    }
}
