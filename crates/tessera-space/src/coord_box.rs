//! Axis-aligned coordinate boxes.

use tessera_core::Coord;

use crate::streak::Streak;

/// An axis-aligned box: `origin[d] .. origin[d] + dimensions[d]` on every
/// axis `d`.
///
/// A box with any non-positive dimension is empty.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct CoordBox<const D: usize> {
    /// Lowest corner (inclusive).
    pub origin: Coord<D>,
    /// Extent along each axis.
    pub dimensions: Coord<D>,
}

impl<const D: usize> CoordBox<D> {
    /// Create a box from its lowest corner and extents.
    pub fn new(origin: Coord<D>, dimensions: Coord<D>) -> Self {
        Self { origin, dimensions }
    }

    /// Returns `true` if the box covers no cells.
    pub fn is_empty(&self) -> bool {
        self.dimensions.0.iter().any(|&d| d <= 0)
    }

    /// Number of cells covered.
    pub fn size(&self) -> u64 {
        self.dimensions.prod()
    }

    /// Returns `true` if `coord` lies inside the box.
    pub fn contains(&self, coord: &Coord<D>) -> bool {
        (0..D).all(|d| {
            let rel = coord[d] - self.origin[d];
            rel >= 0 && rel < self.dimensions[d]
        })
    }

    /// Iterate over the box as one streak per row, in region order
    /// (outermost axis slowest).
    pub fn streaks(&self) -> BoxStreaks<D> {
        BoxStreaks {
            bbox: *self,
            cursor: (!self.is_empty()).then_some(self.origin),
        }
    }
}

/// Iterator over the rows of a [`CoordBox`], created by
/// [`CoordBox::streaks`].
#[derive(Clone, Debug)]
pub struct BoxStreaks<const D: usize> {
    bbox: CoordBox<D>,
    cursor: Option<Coord<D>>,
}

impl<const D: usize> Iterator for BoxStreaks<D> {
    type Item = Streak<D>;

    fn next(&mut self) -> Option<Streak<D>> {
        let current = self.cursor?;
        let origin = self.bbox.origin;
        let dims = self.bbox.dimensions;

        let mut next = current;
        self.cursor = None;
        for d in 1..D {
            next[d] += 1;
            if next[d] < origin[d] + dims[d] {
                self.cursor = Some(next);
                break;
            }
            next[d] = origin[d];
        }

        Some(Streak::new(current, current.x() + dims.x()))
    }
}
