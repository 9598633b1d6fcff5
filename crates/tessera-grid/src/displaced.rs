//! Dense storage over an arbitrarily placed box.

use tessera_core::Coord;
use tessera_space::{CoordBox, Topology};

use crate::storage::GridStorage;

/// Dense row-major storage for the cells of one [`CoordBox`], which may
/// sit anywhere in (or partly outside) the global grid.
///
/// Lookups outside the box are normalized against the global dimensions
/// and topology; a coordinate that still misses the box reads as the
/// edge cell.
///
/// # Examples
///
/// ```
/// use tessera_core::Coord;
/// use tessera_grid::{DisplacedGrid, GridStorage};
/// use tessera_space::{CoordBox, Topology};
///
/// let dims = Coord([4, 4]);
/// let stripe = CoordBox::new(Coord([0, -1]), Coord([4, 3]));
/// let mut grid = DisplacedGrid::new(stripe, 0u8, Topology::torus(), dims);
///
/// grid.set(&Coord([3, 1]), 7);
/// assert_eq!(*grid.get(&Coord([-1, 1])), 7); // x wraps onto the stored row
/// assert_eq!(*grid.get(&Coord([0, 2])), 0); // outside the stripe: edge cell
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct DisplacedGrid<C, const D: usize> {
    bbox: CoordBox<D>,
    cells: Vec<C>,
    edge: C,
    topology: Topology<D>,
    global_dims: Coord<D>,
}

impl<C: Clone, const D: usize> DisplacedGrid<C, D> {
    /// Create storage for `bbox` with every cell (and the edge cell) set
    /// to `fill`.
    pub fn new(bbox: CoordBox<D>, fill: C, topology: Topology<D>, global_dims: Coord<D>) -> Self {
        Self {
            bbox,
            cells: vec![fill.clone(); bbox.size() as usize],
            edge: fill,
            topology,
            global_dims,
        }
    }

    /// Value returned for reads that resolve to no stored cell.
    pub fn edge(&self) -> &C {
        &self.edge
    }

    /// Replace the edge cell.
    pub fn set_edge(&mut self, cell: C) {
        self.edge = cell;
    }

    /// The grid's topology.
    pub fn topology(&self) -> &Topology<D> {
        &self.topology
    }

    /// Extent of the whole simulation grid.
    pub fn global_dimensions(&self) -> Coord<D> {
        self.global_dims
    }

    /// Stored cells in row-major order (axis 0 fastest).
    pub fn cells(&self) -> &[C] {
        &self.cells
    }

    /// Linear index of `coord`, if it lies inside the box.
    fn offset(&self, coord: &Coord<D>) -> Option<usize> {
        if !self.bbox.contains(coord) {
            return None;
        }
        let mut index = 0usize;
        for d in (0..D).rev() {
            let rel = (coord[d] - self.bbox.origin[d]) as usize;
            index = index * self.bbox.dimensions[d] as usize + rel;
        }
        Some(index)
    }

    /// Linear index of `coord`, trying the wrapped position when the
    /// literal one misses.
    ///
    /// Each periodic axis that misses the box is shifted by whole periods
    /// into it, so a box hanging over the global edge (a stripe with an
    /// outer ghost row at `-1`) still resolves wrapped reads on the other
    /// axes.
    fn resolve(&self, coord: &Coord<D>) -> Option<usize> {
        self.offset(coord).or_else(|| {
            let mut wrapped = *coord;
            for d in 0..D {
                let lo = self.bbox.origin[d];
                let hi = lo + self.bbox.dimensions[d];
                if (lo..hi).contains(&coord[d]) {
                    continue;
                }
                let extent = self.global_dims[d];
                if !self.topology.wraps(d) || extent <= 0 {
                    return None;
                }
                wrapped[d] = lo + (coord[d] - lo).rem_euclid(extent);
            }
            self.offset(&wrapped)
        })
    }
}

impl<C: Clone, const D: usize> GridStorage<C, D> for DisplacedGrid<C, D> {
    fn get(&self, coord: &Coord<D>) -> &C {
        match self.resolve(coord) {
            Some(i) => &self.cells[i],
            None => &self.edge,
        }
    }

    fn set(&mut self, coord: &Coord<D>, cell: C) {
        if let Some(i) = self.resolve(coord) {
            self.cells[i] = cell;
        }
    }

    /// Cells inside both the old and the new box keep their value; the
    /// rest start as the edge cell.
    fn resize(&mut self, bbox: CoordBox<D>) {
        if bbox == self.bbox {
            return;
        }
        let mut cells = Vec::with_capacity(bbox.size() as usize);
        for streak in bbox.streaks() {
            for coord in streak.coords() {
                let cell = match self.offset(&coord) {
                    Some(i) => self.cells[i].clone(),
                    None => self.edge.clone(),
                };
                cells.push(cell);
            }
        }
        self.bbox = bbox;
        self.cells = cells;
    }

    fn bounding_box(&self) -> CoordBox<D> {
        self.bbox
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use tessera_core::GridError;
    use tessera_space::{Region, Streak};

    fn stripe(rows: std::ops::Range<i32>, width: i32, topology: Topology<2>) -> DisplacedGrid<i32, 2> {
        let bbox = CoordBox::new(Coord([0, rows.start]), Coord([width, rows.end - rows.start]));
        DisplacedGrid::new(bbox, -1, topology, Coord([width, 10]))
    }

    #[test]
    fn row_major_layout() {
        let mut g = stripe(2..4, 3, Topology::cube());
        g.set(&Coord([1, 2]), 10);
        g.set(&Coord([0, 3]), 20);
        assert_eq!(g.cells(), &[-1, 10, -1, 20, -1, -1]);
    }

    #[test]
    fn bounded_reads_outside_fall_back_to_edge() {
        let mut g = stripe(0..2, 3, Topology::cube());
        g.set_edge(99);
        assert_eq!(*g.get(&Coord([-1, 0])), 99);
        assert_eq!(*g.get(&Coord([0, 5])), 99);
        g.set(&Coord([0, 5]), 3);
        assert!(g.cells().iter().all(|&c| c == -1));
    }

    #[test]
    fn periodic_reads_wrap_into_the_box() {
        let mut g = stripe(0..10, 3, Topology::torus());
        g.set(&Coord([2, 9]), 5);
        assert_eq!(*g.get(&Coord([-1, -1])), 5);
        assert_eq!(*g.get(&Coord([2, 19])), 5);
    }

    #[test]
    fn negative_rows_are_stored_directly() {
        let mut g = stripe(-1..3, 2, Topology::torus());
        g.set(&Coord([0, -1]), 4);
        assert_eq!(g.cells()[0], 4);
        assert_eq!(*g.get(&Coord([0, 9])), 4);

        g.set(&Coord([0, 9]), 8);
        assert_eq!(*g.get(&Coord([0, -1])), 8);
    }

    #[test]
    fn ghost_rows_wrap_along_other_axes() {
        let mut g = stripe(-1..3, 2, Topology::torus());
        g.set(&Coord([1, -1]), 6);
        assert_eq!(*g.get(&Coord([-1, -1])), 6);
        assert_eq!(*g.get(&Coord([3, 9])), 6);
    }

    #[test]
    fn resize_keeps_overlapping_cells() {
        let mut g = stripe(0..3, 2, Topology::cube());
        for y in 0..3 {
            g.set(&Coord([0, y]), y * 10);
        }
        g.resize(CoordBox::new(Coord([0, 1]), Coord([2, 4])));
        assert_eq!(g.bounding_box().origin, Coord([0, 1]));
        assert_eq!(*g.get(&Coord([0, 1])), 10);
        assert_eq!(*g.get(&Coord([0, 2])), 20);
        assert_eq!(*g.get(&Coord([0, 4])), -1);
        assert_eq!(g.cells().len(), 8);
    }

    #[test]
    fn pack_and_unpack_follow_streak_order() {
        let mut src = stripe(0..3, 4, Topology::cube());
        for y in 0..3 {
            for x in 0..4 {
                src.set(&Coord([x, y]), y * 4 + x);
            }
        }
        let region: Region<2> = [Streak::new(Coord([1, 2]), 3), Streak::new(Coord([0, 0]), 2)]
            .into_iter()
            .collect();
        let payload = src.pack(&region);
        assert_eq!(payload, vec![0, 1, 9, 10]);

        let mut dst = stripe(0..3, 4, Topology::cube());
        dst.unpack(&region, &payload).unwrap();
        assert_eq!(*dst.get(&Coord([2, 2])), 10);
        assert_eq!(*dst.get(&Coord([3, 2])), -1);
    }

    #[test]
    fn unpack_rejects_wrong_payload_length() {
        let mut g = stripe(0..2, 4, Topology::cube());
        let region = Region::from(CoordBox::new(Coord([0, 0]), Coord([4, 1])));
        match g.unpack(&region, &[1, 2, 3]) {
            Err(GridError::PayloadSizeMismatch { expected: 4, got: 3 }) => {}
            other => panic!("expected PayloadSizeMismatch, got {other:?}"),
        }
        assert!(g.cells().iter().all(|&c| c == -1));
    }

    #[test]
    fn paste_copies_only_the_region() {
        let mut src = stripe(0..2, 2, Topology::cube());
        src.set(&Coord([0, 0]), 1);
        src.set(&Coord([1, 1]), 2);
        let mut dst = stripe(0..2, 2, Topology::cube());
        dst.paste(&src, &Region::from(CoordBox::new(Coord([0, 1]), Coord([2, 1]))));
        assert_eq!(dst.cells(), &[-1, -1, -1, 2]);
    }

    proptest! {
        #[test]
        fn periodic_reads_agree_with_normalized_reads(
            x in -12i32..12,
            y in -25i32..25,
            lo in -1i32..8,
        ) {
            // A stripe of three rows (plus wrap) under a torus; every read
            // must see the same cell as its normalized coordinate.
            let dims = Coord([4, 10]);
            let mut g = DisplacedGrid::new(
                CoordBox::new(Coord([0, lo]), Coord([4, 3])),
                -1,
                Topology::torus(),
                dims,
            );
            for row in lo..lo + 3 {
                for col in 0..4 {
                    let c = Coord([col, row]);
                    let n = Topology::torus().normalize(&c, &dims).unwrap();
                    g.set(&c, n[1] * 4 + n[0]);
                }
            }
            let coord = Coord([x, y]);
            let norm = Topology::torus().normalize(&coord, &dims).unwrap();
            let stored = (lo..lo + 3).any(|row| row.rem_euclid(10) == norm[1]);
            let expected = if stored { norm[1] * 4 + norm[0] } else { -1 };
            prop_assert_eq!(*g.get(&coord), expected);
        }
    }
}
