//! Tessera: a distributed stencil engine.
//!
//! A grid of cells is cut into contiguous stripes along its last axis,
//! one stripe per node. Each node updates its own cells with a
//! [`CellKernel`](prelude::CellKernel), trades one row of ghost cells with
//! its neighbors per nano-step, and periodically hands rows to other nodes
//! when the root's load balancer redraws the stripes.
//!
//! This is the facade crate that re-exports the public API of the Tessera
//! sub-crates.
//!
//! # Quick start
//!
//! ```rust
//! use tessera::prelude::*;
//!
//! // Every cell becomes the sum of its two neighbors on a ring.
//! struct Spread;
//! impl CellKernel<u64, 1> for Spread {
//!     fn name(&self) -> &str { "spread" }
//!     fn update<N: Neighborhood<u64, 1>>(&self, hood: &N, _nano_step: u32) -> u64 {
//!         hood.at(Coord([-1])) + hood.at(Coord([1]))
//!     }
//! }
//!
//! struct Pulse;
//! impl Initializer<u64, 1> for Pulse {
//!     fn grid_dimensions(&self) -> Coord<1> { Coord([10]) }
//!     fn cell(&self, coord: &Coord<1>) -> u64 { u64::from(coord.x() == 0) }
//!     fn edge_cell(&self) -> u64 { 0 }
//!     fn max_steps(&self) -> StepId { StepId(4) }
//! }
//!
//! let totals = LocalCluster::run(2, |transport: LocalTransport<Message<u64, 1>>| {
//!     let role = if transport.rank().is_root() {
//!         Role::Root { balancer: Box::new(ProportionalBalancer) }
//!     } else {
//!         Role::Worker
//!     };
//!     let config = StepperConfig { rebalance_period: 2, topology: Topology::torus() };
//!     let mut stepper = StripingStepper::new(config, role, Spread, Box::new(Pulse), transport)
//!         .unwrap();
//!     stepper.run().unwrap();
//!     stepper.grid().pack(&stepper.geometry().owned).iter().sum::<u64>()
//! })
//! .unwrap();
//!
//! // The pulse doubles every step.
//! assert_eq!(totals.iter().sum::<u64>(), 16);
//! ```
//!
//! # Modules
//!
//! | Module | Sub-crate | Contents |
//! |--------|-----------|----------|
//! | [`types`] | `tessera-core` | Coordinates, IDs, errors, kernel traits |
//! | [`space`] | `tessera-space` | Streaks, boxes, regions, topologies |
//! | [`grid`] | `tessera-grid` | Displaced storage and double buffering |
//! | [`comm`] | `tessera-comm` | Tagged transports and the local cluster |
//! | [`engine`] | `tessera-engine` | Partitions, balancers, the striping stepper |

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

/// Coordinates, identifiers, errors and kernel traits (`tessera-core`).
pub use tessera_core as types;

/// Streaks, boxes, sparse regions and topologies (`tessera-space`).
///
/// [`space::Region`] is the sparse cell set every partition, ghost band
/// and migration is expressed in.
pub use tessera_space as space;

/// Cell storage (`tessera-grid`).
///
/// [`grid::DisplacedGrid`] holds one stripe plus its ghost rows;
/// [`grid::DoubleBuffer`] pairs the published and staging copies.
pub use tessera_grid as grid;

/// Message passing (`tessera-comm`).
///
/// The [`comm::Transport`] trait and its in-process implementation,
/// [`comm::LocalTransport`], with [`comm::LocalCluster`] to run one
/// thread per node.
pub use tessera_comm as comm;

/// The distributed stepper (`tessera-engine`).
///
/// [`engine::StripingStepper`] drives one node; [`engine::Partition`],
/// [`engine::GhostGeometry`] and the [`engine::LoadBalancer`]s describe
/// how the grid is striped.
pub use tessera_engine as engine;

/// Common imports for typical Tessera usage.
///
/// ```rust
/// use tessera::prelude::*;
/// ```
pub mod prelude {
    // Core types and traits
    pub use tessera_core::{CellKernel, Coord, Neighborhood, NodeId, StepId};

    // Errors
    pub use tessera_core::{CommError, GridError, StepError};
    pub use tessera_engine::ConfigError;

    // Space
    pub use tessera_space::{Boundary, CoordBox, Region, Streak, Topology};

    // Grid
    pub use tessera_grid::GridStorage;

    // Communication
    pub use tessera_comm::{LocalCluster, LocalTransport, Transport};

    // Engine
    pub use tessera_engine::{
        Initializer, LoadBalancer, Message, NoOpBalancer, ProportionalBalancer, RandomBalancer,
        Role, Steerer, SteererContext, SteererEvent, StepperConfig, StripingStepper, Writer,
        WriterContext, WriterEvent,
    };
}
