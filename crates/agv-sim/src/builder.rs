//! Fluent builder for constructing a [`Sim`].

use tracing::info;

use agv_coord::CoordEngine;
use agv_core::{Kinematics, SimConfig};
use agv_layout::FleetLayout;
use agv_physics::PhysicsEngine;
use agv_transport::{bulk_channel, Fabric};

use crate::{Sim, SimError, SimResult};

/// Fluent builder for [`Sim`].
///
/// # Required inputs
///
/// - [`SimConfig`]: tick length, run length, link timeout, bulk capacity
/// - [`FleetLayout`]: e.g. [`agv_layout::reference_layout`] or
///   [`agv_layout::load_layout_dir`]
///
/// # Optional inputs (have defaults)
///
/// | Method              | Default                      |
/// |---------------------|------------------------------|
/// | `.kinematics(k)`    | `Kinematics::default()`      |
/// | `.skip_validation()`| layout is validated          |
///
/// # Example
///
/// ```rust,ignore
/// let mut sim = SimBuilder::new(SimConfig::default(), reference_layout()?).build()?;
/// sim.run(&mut NoopObserver)?;
/// ```
pub struct SimBuilder {
    config:     SimConfig,
    layout:     FleetLayout,
    kinematics: Option<Kinematics>,
    validate:   bool,
}

impl SimBuilder {
    pub fn new(config: SimConfig, layout: FleetLayout) -> Self {
        Self {
            config,
            layout,
            kinematics: None,
            validate:   true,
        }
    }

    pub fn kinematics(mut self, kinematics: Kinematics) -> Self {
        self.kinematics = Some(kinematics);
        self
    }

    /// Build without checking the layout.  Meant for hand-made test layouts.
    pub fn skip_validation(mut self) -> Self {
        self.validate = false;
        self
    }

    /// Validate inputs, wire one bulk channel and one lane per robot, and
    /// return a ready-to-run [`Sim`].
    pub fn build(self) -> SimResult<Sim> {
        if self.config.tick_duration_ms == 0 {
            return Err(SimError::Config("tick_duration_ms must be positive".into()));
        }
        if self.config.ack_timeout_ticks == 0 {
            return Err(SimError::Config("ack_timeout_ticks must be positive".into()));
        }
        if self.validate {
            self.layout.validate(self.config.bulk_capacity)?;
        }

        let kinematics = self.kinematics.unwrap_or_default();
        let robot_count = self.layout.robot_count();

        // ── Bulk channels: coordination sends, physics receives ───────────
        let (senders, receivers): (Vec<_>, Vec<_>) = (0..robot_count)
            .map(|_| bulk_channel(self.config.bulk_capacity))
            .unzip();

        let physics = PhysicsEngine::new(&self.layout, kinematics.clone(), &self.config, receivers)?;
        let coord = CoordEngine::new(&self.layout, kinematics, senders)?;
        let fabric = Fabric::new(robot_count, self.config.ack_timeout_ticks);

        info!(
            robots        = robot_count,
            obstacles     = self.layout.obstacle_count(),
            intersections = self.layout.intersections.len(),
            ticks         = self.config.total_ticks,
            "simulation built"
        );

        Ok(Sim {
            clock:   self.config.make_clock(),
            config:  self.config,
            layout:  self.layout,
            physics,
            coord,
            fabric,
        })
    }
}
