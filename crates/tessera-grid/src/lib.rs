//! Grid storage for Tessera stripes.
//!
//! A node keeps two [`DisplacedGrid`]s in a [`DoubleBuffer`]: the
//! published buffer holds the previous nano-step and is read through a
//! [`GridNeighborhood`], the staging buffer receives the cells written by
//! [`update_region`] and the incoming ghost rows. The buffers swap roles
//! once per nano-step.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod displaced;
pub mod double_buffer;
pub mod neighborhood;
pub mod storage;

pub use displaced::DisplacedGrid;
pub use double_buffer::{BufferSlot, DoubleBuffer};
pub use neighborhood::{update_region, GridNeighborhood};
pub use storage::GridStorage;
