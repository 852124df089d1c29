//! warehouse: runs a guided-vehicle fleet through a grid warehouse.
//!
//! Without `--layout` the built-in reference floor is used: 4 robots, 6
//! looping obstacles and 6 gated intersections on a 10 × 9 grid, for 5,400
//! ticks of 10 ms.  Output lands as CSV under `--out`.
//!
//! ```text
//! cargo run -p warehouse --release -- --summary-every 500
//! RUST_LOG=agv_coord=debug cargo run -p warehouse -- --ticks 1200
//! ```

use std::path::PathBuf;
use std::time::Instant;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use agv_core::{CellId, SimConfig, Tick};
use agv_layout::{load_layout_dir, reference_layout, FleetLayout};
use agv_output::{CsvWriter, OutputWriter, SimOutputObserver};
use agv_sim::{FleetSnapshot, SimBuilder, SimObserver, TickStats};

#[derive(Parser)]
#[command(name = "warehouse")]
#[command(about = "Guided-vehicle fleet simulation with intersection admission")]
struct Cli {
    /// Ticks to simulate (default: the reference run length)
    #[arg(long)]
    ticks: Option<u64>,

    /// Directory holding grid.csv, paths.csv, intersections.csv, handoffs.csv
    #[arg(long)]
    layout: Option<PathBuf>,

    /// Output directory for the CSV files
    #[arg(long, default_value = "output/warehouse")]
    out: PathBuf,

    /// Snapshot every N ticks
    #[arg(long, default_value = "1")]
    snapshot_every: u64,

    /// Log a fleet summary every N ticks (0 = never)
    #[arg(long, default_value = "100")]
    summary_every: u64,

    /// Debug-level logging when RUST_LOG is unset
    #[arg(long, short)]
    verbose: bool,
}

// ── Observer ──────────────────────────────────────────────────────────────────

/// Forwards to the output observer and logs a fleet table now and then.
struct FleetLog<W: OutputWriter> {
    inner:         SimOutputObserver<W>,
    summary_every: u64,
    next_summary:  u64,
    nacks:         u64,
    snapshot_rows: usize,
    summary_rows:  usize,
}

impl<W: OutputWriter> FleetLog<W> {
    fn new(inner: SimOutputObserver<W>, summary_every: u64) -> Self {
        Self {
            inner,
            summary_every,
            next_summary:  0,
            nacks:         0,
            snapshot_rows: 0,
            summary_rows:  0,
        }
    }
}

fn cell(c: CellId) -> String {
    if c.is_valid() { c.0.to_string() } else { "-".to_owned() }
}

fn log_fleet(snapshot: &FleetSnapshot) {
    info!(
        tick     = snapshot.tick.0,
        finished = snapshot.finished(),
        "fleet summary"
    );
    for r in &snapshot.robots {
        info!(
            robot   = r.robot.0,
            cell    = %cell(r.current),
            next    = %cell(r.next),
            speed   = r.speed,
            physics = %r.phys_status,
            coord   = %r.coord_status,
            "  robot"
        );
    }
    for q in &snapshot.queues {
        let head = q.head.map_or_else(|| "-".to_owned(), |h| h.0.to_string());
        info!(cell = q.cell.0, head = %head, waiting = q.len, "  queue");
    }
}

impl<W: OutputWriter> SimObserver for FleetLog<W> {
    fn on_tick_end(&mut self, tick: Tick, stats: &TickStats) {
        self.summary_rows += 1;
        self.nacks += u64::from(stats.nacks());
        self.inner.on_tick_end(tick, stats);
    }

    fn on_snapshot(&mut self, tick: Tick, snapshot: &FleetSnapshot) {
        self.snapshot_rows += snapshot.robots.len() + snapshot.obstacles.len();
        if self.summary_every > 0 && tick.0 >= self.next_summary {
            log_fleet(snapshot);
            self.next_summary = (tick.0 / self.summary_every + 1) * self.summary_every;
        }
        self.inner.on_snapshot(tick, snapshot);
    }

    fn on_sim_end(&mut self, final_tick: Tick) {
        self.inner.on_sim_end(final_tick);
    }
}

// ── main ──────────────────────────────────────────────────────────────────────

fn load(cli: &Cli) -> Result<FleetLayout> {
    match &cli.layout {
        Some(dir) => load_layout_dir(dir)
            .with_context(|| format!("loading layout from {}", dir.display())),
        None => Ok(reference_layout()?),
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(if cli.verbose { "debug" } else { "info" })
    });
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let layout = load(&cli)?;
    let defaults = SimConfig::default();
    let config = SimConfig {
        total_ticks:             cli.ticks.unwrap_or(defaults.total_ticks),
        snapshot_interval_ticks: cli.snapshot_every,
        ..defaults
    };

    info!(
        robots        = layout.robot_count(),
        obstacles     = layout.obstacle_count(),
        intersections = layout.intersections.len(),
        ticks         = config.total_ticks,
        "starting warehouse run"
    );

    let mut sim = SimBuilder::new(config.clone(), layout).build()?;

    std::fs::create_dir_all(&cli.out)
        .with_context(|| format!("creating {}", cli.out.display()))?;
    let writer = CsvWriter::new(&cli.out)?;
    let mut obs = FleetLog::new(SimOutputObserver::new(writer, &config), cli.summary_every);

    let t0 = Instant::now();
    sim.run(&mut obs)?;
    let elapsed = t0.elapsed();

    if let Some(e) = obs.inner.take_error() {
        warn!(error = %e, "output error");
    }
    if obs.nacks > 0 {
        warn!(nacks = obs.nacks, "handshakes timed out during the run");
    }

    let last = sim.snapshot();
    info!(
        elapsed_ms    = elapsed.as_millis() as u64,
        snapshot_rows = obs.snapshot_rows,
        summary_rows  = obs.summary_rows,
        finished      = last.finished(),
        stop_pairs    = sim.fabric.stop_pairs(),
        out           = %cli.out.display(),
        "simulation complete"
    );
    log_fleet(&last);

    Ok(())
}
