//! Core types and traits for the Tessera distributed stencil engine.
//!
//! This is the leaf crate with zero internal dependencies. It defines
//! the fundamental abstractions used throughout the Tessera workspace:
//! coordinates, node identifiers, the cell-update kernel contract, and
//! the error types shared by the grid, transport, and stepper layers.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod coord;
pub mod error;
pub mod id;
pub mod traits;

pub use coord::Coord;
pub use error::{CommError, GridError, StepError};
pub use id::{NodeId, StepId};
pub use traits::{CellKernel, Neighborhood};
