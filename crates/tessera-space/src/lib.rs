//! Spatial data structures for Tessera grids.
//!
//! The central type is [`Region`], a compressed set of grid coordinates
//! stored as hierarchically indexed [`Streak`]s. Regions describe what a
//! node owns, which ghost cells it exchanges with its neighbors, and which
//! rows move between nodes when the partition is rebalanced.
//!
//! # Types
//!
//! - [`Streak`]: a half-open run of cells along axis 0
//! - [`CoordBox`]: an axis-aligned box, convertible into a region
//! - [`Region`]: run-length coordinate set with ordered streak iteration
//! - [`Topology`]: per-axis periodic or bounded edges

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod coord_box;
pub mod region;
pub mod streak;
pub mod topology;

pub use coord_box::CoordBox;
pub use region::{Region, StreakIter};
pub use streak::Streak;
pub use topology::{Boundary, Topology};
