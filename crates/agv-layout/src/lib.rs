//! `agv-layout`: the static description of a warehouse run.
//!
//! # Crate layout
//!
//! | Module        | Contents                                                   |
//! |---------------|------------------------------------------------------------|
//! | [`grid`]      | `GridMap`, `CellCoord`                                     |
//! | [`path`]      | `Path`: ordered cells, sentinel-free                       |
//! | [`layout`]    | `FleetLayout`, `IntersectionSeed`, `SeedEntry`, `Handoff`  |
//! | [`loader`]    | `load_layout_dir` and the per-file `read_*` functions      |
//! | [`reference`] | `reference_layout()`: the 4-robot, 6-obstacle warehouse    |
//! | [`error`]     | `LayoutError`, `LayoutResult<T>`                           |
//!
//! A layout is pure data.  Both engines are built from the same
//! `FleetLayout`; neither mutates it.

pub mod error;
pub mod grid;
pub mod layout;
pub mod loader;
pub mod path;
pub mod reference;


pub use error::{LayoutError, LayoutResult};
pub use grid::{CellCoord, GridMap};
pub use layout::{FleetLayout, Handoff, IntersectionSeed, SeedEntry};
pub use loader::{
    load_layout_dir, load_layout_readers, read_grid, read_handoffs, read_intersections,
    read_paths,
};
pub use path::Path;
pub use reference::reference_layout;
