//! Per-axis edge behavior of a grid.

use tessera_core::Coord;

/// How one axis of the global grid treats its edges.
///
/// # Examples
///
/// ```
/// use tessera_core::Coord;
/// use tessera_space::{Boundary, Topology};
///
/// let torus = Topology::<2>::torus();
/// let dims = Coord([4, 3]);
/// assert_eq!(torus.normalize(&Coord([-1, 3]), &dims), Some(Coord([3, 0])));
///
/// let cube = Topology::<2>::cube();
/// assert_eq!(cube.normalize(&Coord([-1, 0]), &dims), None);
/// assert_eq!(cube.boundary(1), Boundary::Bounded);
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Boundary {
    /// Coordinates wrap around to the opposite side.
    Periodic,
    /// Coordinates past the edge do not exist; reads yield the edge cell.
    Bounded,
}

/// Edge behavior for each axis of a `D`-dimensional grid.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Topology<const D: usize> {
    axes: [Boundary; D],
}

impl<const D: usize> Topology<D> {
    /// Build a topology from explicit per-axis behavior.
    pub fn new(axes: [Boundary; D]) -> Self {
        Self { axes }
    }

    /// Every axis wraps.
    pub fn torus() -> Self {
        Self::new([Boundary::Periodic; D])
    }

    /// No axis wraps.
    pub fn cube() -> Self {
        Self::new([Boundary::Bounded; D])
    }

    /// Return a copy with `axis` set to `boundary`.
    pub fn with_axis(mut self, axis: usize, boundary: Boundary) -> Self {
        self.axes[axis] = boundary;
        self
    }

    /// Edge behavior of `axis`.
    pub fn boundary(&self, axis: usize) -> Boundary {
        self.axes[axis]
    }

    /// Returns `true` if `axis` is periodic.
    pub fn wraps(&self, axis: usize) -> bool {
        self.axes[axis] == Boundary::Periodic
    }

    /// Map `coord` into the global box `[0, dims)`.
    ///
    /// Periodic axes wrap; a bounded axis that is out of range makes the
    /// whole coordinate invalid.
    pub fn normalize(&self, coord: &Coord<D>, dims: &Coord<D>) -> Option<Coord<D>> {
        let mut out = *coord;
        for d in 0..D {
            let extent = dims[d];
            if extent <= 0 {
                return None;
            }
            if self.wraps(d) {
                out[d] = coord[d].rem_euclid(extent);
            } else if coord[d] < 0 || coord[d] >= extent {
                return None;
            }
        }
        Some(out)
    }
}

impl<const D: usize> Default for Topology<D> {
    fn default() -> Self {
        Self::cube()
    }
}
