//! Distributed stepping for Tessera grids.
//!
//! A grid is striped along its outermost axis across the nodes of a
//! cluster. Each node runs a [`StripingStepper`] that updates its own rows
//! with a cell kernel, swaps ghost rows with its neighbors, and takes part
//! in periodic rebalancing: the root gathers every node's measured load,
//! asks its [`LoadBalancer`] for new workloads, and broadcasts the
//! resulting [`Partition`]; rows then migrate to their new owners.
//!
//! ```
//! use tessera_engine::balancer::apportion;
//!
//! // Twelve rows for three nodes, the first twice as fast as the others.
//! assert_eq!(apportion(12, &[2.0, 1.0, 1.0]), vec![6, 3, 3]);
//! ```

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod balancer;
pub mod chronometer;
pub mod config;
pub mod ghost;
pub mod io;
pub mod message;
pub mod partition;
pub mod patch;
pub mod stepper;
pub mod writers;

pub use balancer::{LoadBalancer, NoOpBalancer, ProportionalBalancer, RandomBalancer};
pub use chronometer::{Chronometer, TimeKind};
pub use config::{ConfigError, Role, StepperConfig};
pub use ghost::{GhostGeometry, GHOST_WIDTH};
pub use io::{
    Initializer, Steerer, SteererContext, SteererEvent, Writer, WriterContext, WriterEvent,
};
pub use message::Message;
pub use partition::Partition;
pub use patch::PatchRequests;
pub use stepper::{MigrationReport, StepperState, StripingStepper, Transfers};
pub use writers::{CollectingWriter, Frame, FrameLog, MemoryWriter};
