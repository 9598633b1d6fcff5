//! Half-open runs of cells along the fastest-varying axis.

use std::fmt;

use tessera_core::Coord;

/// Cells `origin[0] .. end_x` along axis 0, at the fixed position
/// `origin[1..]` in the remaining axes.
///
/// A streak with `end_x <= origin.x()` is degenerate: it covers no cells
/// and every [`Region`](crate::Region) mutation ignores it.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Streak<const D: usize> {
    /// First cell of the run.
    pub origin: Coord<D>,
    /// One past the last cell along axis 0.
    pub end_x: i32,
}

impl<const D: usize> Streak<D> {
    /// Create a streak starting at `origin` and ending before `end_x`.
    pub fn new(origin: Coord<D>, end_x: i32) -> Self {
        Self { origin, end_x }
    }

    /// Number of cells covered. Zero for degenerate streaks.
    pub fn len(&self) -> u64 {
        (self.end_x as i64 - self.origin.x() as i64).max(0) as u64
    }

    /// Returns `true` if the streak covers no cells.
    pub fn is_empty(&self) -> bool {
        self.end_x <= self.origin.x()
    }

    /// Returns `true` if `coord` lies on this streak.
    pub fn contains(&self, coord: &Coord<D>) -> bool {
        coord.0[1..] == self.origin.0[1..] && self.origin.x() <= coord.x() && coord.x() < self.end_x
    }

    /// Iterate over the coordinates this streak covers, in ascending x.
    pub fn coords(&self) -> impl Iterator<Item = Coord<D>> + '_ {
        (self.origin.x()..self.end_x).map(move |x| self.origin.with(0, x))
    }
}

impl<const D: usize> fmt::Debug for Streak<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Streak(origin: {}, end_x: {})", self.origin, self.end_x)
    }
}
