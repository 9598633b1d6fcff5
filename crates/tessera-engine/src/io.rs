//! Contracts for the stepper's external collaborators: the initializer
//! that seeds the grid, writers that observe it, and steerers that may
//! edit it between steps.

use tessera_comm::Transport;
use tessera_core::{Coord, NodeId, StepError, StepId};
use tessera_grid::DisplacedGrid;
use tessera_space::Region;

use crate::config::ConfigError;
use crate::message::Message;

// ── Initializer ────────────────────────────────────────────────────

/// Provides the global grid and its initial state.
///
/// Every node builds its own initializer; all of them must describe the
/// same grid.
pub trait Initializer<C, const D: usize>: Send {
    /// Extent of the global grid.
    fn grid_dimensions(&self) -> Coord<D>;

    /// Initial state of the cell at `coord`, which lies inside the grid.
    fn cell(&self, coord: &Coord<D>) -> C;

    /// Value read for coordinates beyond a bounded edge.
    fn edge_cell(&self) -> C;

    /// Step the simulation starts at.
    fn start_step(&self) -> StepId {
        StepId(0)
    }

    /// Step at which [`run`](crate::StripingStepper::run) stops.
    fn max_steps(&self) -> StepId;
}

// ── Writers ────────────────────────────────────────────────────────

/// When a writer is being called.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum WriterEvent {
    /// Once, before the first step. Not period-gated.
    Initialized,
    /// After a step, when the step number is a multiple of the writer's
    /// period.
    StepFinished,
    /// Once, after the last step. Not period-gated.
    AllDone,
}

/// What a writer sees.
pub struct WriterContext<'a, C, const D: usize> {
    /// Storage holding the cells of `region`.
    pub grid: &'a DisplacedGrid<C, D>,
    /// Cells to write: the node's owned rows.
    pub region: &'a Region<D>,
    /// Extent of the global grid.
    pub global_dimensions: Coord<D>,
    /// Current step.
    pub step: StepId,
    /// Why the writer is being called.
    pub event: WriterEvent,
    /// Node the call happens on.
    pub node: NodeId,
    /// Whether this is the last call for this event on this node. The
    /// stepper delivers each event in a single call, so this is always
    /// `true` for calls it makes.
    pub last_call: bool,
}

/// Observes the grid after steps.
///
/// Writers run on every node. Every node must register the same writers
/// in the same order, since a writer may use collectives.
pub trait Writer<C, const D: usize>: Send {
    /// Write every this many steps. Must be at least 1.
    fn period(&self) -> u64 {
        1
    }

    /// Called once when the writer is registered, on every node.
    fn prepare(&mut self, _transport: &mut dyn Transport<Message<C, D>>) -> Result<(), ConfigError> {
        Ok(())
    }

    /// Observe the grid.
    fn write(
        &mut self,
        ctx: &WriterContext<'_, C, D>,
        transport: &mut dyn Transport<Message<C, D>>,
    ) -> Result<(), StepError>;
}

// ── Steerers ───────────────────────────────────────────────────────

/// When a steerer is being called.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SteererEvent {
    /// Once, before the first step. Not period-gated.
    Initialized,
    /// Before the nano-steps of a step whose number is a multiple of the
    /// steerer's period.
    NextStep,
    /// Once, after the last step. Not period-gated.
    AllDone,
}

/// What a steerer sees, and may edit.
pub struct SteererContext<'a, C, const D: usize> {
    /// The node's current buffer.
    pub grid: &'a mut DisplacedGrid<C, D>,
    /// Owned rows plus outer ghosts.
    ///
    /// A cell next to a stripe boundary is held by its owner and, as an
    /// outer ghost, by the neighbor. The first nano-step reads whichever
    /// copy the node holds, so a steerer must edit every node's copy of a
    /// cell to behave like a serial run.
    pub region: &'a Region<D>,
    /// Extent of the global grid.
    pub global_dimensions: Coord<D>,
    /// Current step.
    pub step: StepId,
    /// Why the steerer is being called.
    pub event: SteererEvent,
    /// Node the call happens on.
    pub node: NodeId,
    /// Whether this is the last call for this event on this node.
    pub last_call: bool,
}

/// Edits the grid between steps.
pub trait Steerer<C, const D: usize>: Send {
    /// Steer every this many steps. Must be at least 1.
    fn period(&self) -> u64 {
        1
    }

    /// Inspect or modify the grid.
    fn steer(&mut self, ctx: &mut SteererContext<'_, C, D>) -> Result<(), StepError>;
}
