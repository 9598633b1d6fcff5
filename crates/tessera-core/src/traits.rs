//! The cell-update kernel contract and the neighborhood view it reads.

use crate::coord::Coord;

/// Read-only view of the cells surrounding the cell being updated.
///
/// Offsets are relative to [`center`](Neighborhood::center). Reads that
/// fall outside the local stripe resolve through the grid storage's own
/// addressing: periodic axes wrap, bounded axes yield the edge cell.
pub trait Neighborhood<C, const D: usize> {
    /// Absolute coordinate of the cell being updated.
    fn center(&self) -> Coord<D>;

    /// Cell at `offset` relative to the center.
    fn at(&self, offset: Coord<D>) -> &C;

    /// The cell being updated, as of the previous nano-step.
    fn this(&self) -> &C {
        self.at(Coord::origin())
    }
}

/// A pure cell-update function.
///
/// The stepper invokes [`update`](CellKernel::update) once per owned cell
/// per nano-step, reading from the previous buffer and writing into the
/// next one. Implementations must be deterministic and free of side
/// effects: the same neighborhood and nano-step always produce the same
/// cell, and invocations for different cells may happen in any order.
///
/// Kernels in this crate family depend on neighbors at most one cell
/// away along the striped axis; the ghost zone width is fixed at 1.
///
/// # Examples
///
/// ```
/// use tessera_core::{CellKernel, Coord, Neighborhood};
///
/// /// Each cell becomes the sum of its left and right neighbors.
/// struct SumNeighbors;
///
/// impl CellKernel<i64, 1> for SumNeighbors {
///     fn name(&self) -> &str { "sum_neighbors" }
///
///     fn update<N: Neighborhood<i64, 1>>(&self, hood: &N, _nano_step: u32) -> i64 {
///         hood.at(Coord([-1])) + hood.at(Coord([1]))
///     }
/// }
///
/// assert_eq!(SumNeighbors.nano_steps(), 1);
/// ```
pub trait CellKernel<C, const D: usize>: Send {
    /// Human-readable name for logging.
    fn name(&self) -> &str;

    /// Number of nano-steps that make up one simulation step.
    ///
    /// Zero is rejected when a stepper is constructed.
    fn nano_steps(&self) -> u32 {
        1
    }

    /// Compute the next state of `hood.center()` for sub-step `nano_step`.
    fn update<N: Neighborhood<C, D>>(&self, hood: &N, nano_step: u32) -> C;
}
