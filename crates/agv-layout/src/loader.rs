//! CSV layout loader.
//!
//! A layout directory holds four files:
//!
//! | File                | Shape                                                 |
//! |---------------------|-------------------------------------------------------|
//! | `grid.csv`          | headerless matrix, one map row per line, `-1` = wall  |
//! | `paths.csv`         | `kind,id,seq,cell`, `kind` ∈ {`robot`, `obstacle`}    |
//! | `intersections.csv` | `cell,rank,robot,distance,expected_time`              |
//! | `handoffs.csv`      | `tick,robot`                                          |
//!
//! ```csv
//! kind,id,seq,cell
//! robot,0,0,1
//! robot,0,1,11
//! obstacle,0,0,6
//! ```
//!
//! Path rows may appear in any order; each path is sorted by `seq`.
//! Intersection entries are sorted by `rank` (0 = head of the queue).
//! Crossing lists are not stored; they are derived from route order with
//! [`FleetLayout::derive_crossings`].

use std::collections::BTreeMap;
use std::io::Read;

use serde::Deserialize;

use agv_core::{CellId, RobotId, Tick};

use crate::{FleetLayout, GridMap, Handoff, IntersectionSeed, LayoutError, LayoutResult, Path, SeedEntry};

// ── CSV records ───────────────────────────────────────────────────────────────

#[derive(Deserialize)]
#[serde(rename_all = "lowercase")]
enum PathKind {
    Robot,
    Obstacle,
}

#[derive(Deserialize)]
struct PathRecord {
    kind: PathKind,
    id:   u32,
    seq:  u32,
    cell: u32,
}

#[derive(Deserialize)]
struct IntersectionRecord {
    cell:          u32,
    rank:          u32,
    robot:         u32,
    distance:      u32,
    expected_time: u32,
}

#[derive(Deserialize)]
struct HandoffRecord {
    tick:  u64,
    robot: u32,
}

fn parse_err(file: &str, e: csv::Error) -> LayoutError {
    LayoutError::Parse(format!("{file}: {e}"))
}

// ── Public API ────────────────────────────────────────────────────────────────

/// Load a layout from a directory of CSV files (see the module docs).
pub fn load_layout_dir(dir: &std::path::Path) -> LayoutResult<FleetLayout> {
    let open = |name: &str| std::fs::File::open(dir.join(name)).map_err(LayoutError::Io);
    load_layout_readers(
        open("grid.csv")?,
        open("paths.csv")?,
        open("intersections.csv")?,
        open("handoffs.csv")?,
    )
}

/// Like [`load_layout_dir`] but reads from arbitrary sources.
///
/// The result has its crossing lists derived but is not validated.
pub fn load_layout_readers<G, P, I, H>(
    grid: G,
    paths: P,
    intersections: I,
    handoffs: H,
) -> LayoutResult<FleetLayout>
where
    G: Read,
    P: Read,
    I: Read,
    H: Read,
{
    let grid = read_grid(grid)?;
    let (robot_routes, obstacle_paths) = read_paths(paths)?;
    let mut layout = FleetLayout {
        grid,
        robot_routes,
        obstacle_paths,
        intersections:   read_intersections(intersections)?,
        robot_crossings: Vec::new(),
        handoffs:        read_handoffs(handoffs)?,
    };
    layout.derive_crossings();
    Ok(layout)
}

/// Parse a headerless map matrix.
pub fn read_grid<R: Read>(reader: R) -> LayoutResult<GridMap> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .trim(csv::Trim::All)
        .from_reader(reader);
    let rows = csv_reader
        .deserialize::<Vec<i64>>()
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| parse_err("grid.csv", e))?;
    GridMap::from_rows(rows.as_slice())
}

/// Parse robot routes and obstacle paths.
///
/// Returns `(robot_routes, obstacle_paths)`, each indexed by id.  Ids with
/// no rows get an empty path, which validation rejects.
pub fn read_paths<R: Read>(reader: R) -> LayoutResult<(Vec<Path>, Vec<Path>)> {
    let mut csv_reader = csv::Reader::from_reader(reader);
    let mut robots: BTreeMap<u32, Vec<(u32, CellId)>> = BTreeMap::new();
    let mut obstacles: BTreeMap<u32, Vec<(u32, CellId)>> = BTreeMap::new();

    for result in csv_reader.deserialize::<PathRecord>() {
        let row = result.map_err(|e| parse_err("paths.csv", e))?;
        let target = match row.kind {
            PathKind::Robot => &mut robots,
            PathKind::Obstacle => &mut obstacles,
        };
        target.entry(row.id).or_default().push((row.seq, CellId(row.cell)));
    }

    Ok((collect_paths(robots), collect_paths(obstacles)))
}

/// Parse intersection queues, keeping the order cells first appear in.
pub fn read_intersections<R: Read>(reader: R) -> LayoutResult<Vec<IntersectionSeed>> {
    let mut csv_reader = csv::Reader::from_reader(reader);
    let mut seeds: Vec<(IntersectionSeed, Vec<u32>)> = Vec::new();

    for result in csv_reader.deserialize::<IntersectionRecord>() {
        let row = result.map_err(|e| parse_err("intersections.csv", e))?;
        let cell = CellId(row.cell);
        let slot = match seeds.iter().position(|(s, _)| s.cell == cell) {
            Some(i) => i,
            None => {
                seeds.push((IntersectionSeed { cell, entries: Vec::new() }, Vec::new()));
                seeds.len() - 1
            }
        };
        let (seed, ranks) = &mut seeds[slot];
        seed.entries.push(SeedEntry {
            robot:         RobotId(row.robot),
            distance:      row.distance,
            expected_time: row.expected_time,
        });
        ranks.push(row.rank);
    }

    Ok(seeds
        .into_iter()
        .map(|(mut seed, ranks)| {
            let mut ranked: Vec<_> = ranks.into_iter().zip(seed.entries).collect();
            ranked.sort_by_key(|(rank, _)| *rank);
            seed.entries = ranked.into_iter().map(|(_, e)| e).collect();
            seed
        })
        .collect())
}

/// Parse the handoff schedule, sorted by tick.
pub fn read_handoffs<R: Read>(reader: R) -> LayoutResult<Vec<Handoff>> {
    let mut csv_reader = csv::Reader::from_reader(reader);
    let mut handoffs = csv_reader
        .deserialize::<HandoffRecord>()
        .map(|r| {
            r.map(|row| Handoff { tick: Tick(row.tick), robot: RobotId(row.robot) })
                .map_err(|e| parse_err("handoffs.csv", e))
        })
        .collect::<LayoutResult<Vec<_>>>()?;
    handoffs.sort_by_key(|h| h.tick);
    Ok(handoffs)
}

// ── Helpers ───────────────────────────────────────────────────────────────────

fn collect_paths(by_id: BTreeMap<u32, Vec<(u32, CellId)>>) -> Vec<Path> {
    let count = by_id.keys().next_back().map_or(0, |&max| max as usize + 1);
    let mut paths = vec![Path::default(); count];
    for (id, mut steps) in by_id {
        steps.sort_by_key(|(seq, _)| *seq);
        paths[id as usize] = steps.into_iter().map(|(_, cell)| cell).collect();
    }
    paths
}
