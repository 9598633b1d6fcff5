//! The grid storage contract.

use tessera_core::{Coord, GridError};
use tessera_space::{CoordBox, Region};

/// Cell storage covering a bounding box of the global grid.
///
/// Coordinates outside the bounding box are still addressable:
/// implementations resolve them through the grid's topology (periodic
/// axes wrap) and fall back to an edge cell when nothing matches. Writes
/// that resolve to no stored cell are discarded.
pub trait GridStorage<C: Clone, const D: usize> {
    /// Cell at `coord`.
    fn get(&self, coord: &Coord<D>) -> &C;

    /// Overwrite the cell at `coord`.
    fn set(&mut self, coord: &Coord<D>, cell: C);

    /// Move the storage to cover `bbox`.
    fn resize(&mut self, bbox: CoordBox<D>);

    /// The box currently covered.
    fn bounding_box(&self) -> CoordBox<D>;

    /// Copy the cells of `region` out in streak order.
    fn pack(&self, region: &Region<D>) -> Vec<C> {
        region.coords().map(|c| self.get(&c).clone()).collect()
    }

    /// Write `cells` back over `region`, in streak order.
    ///
    /// Fails without writing anything if `cells` does not hold exactly
    /// one cell per coordinate of `region`.
    fn unpack(&mut self, region: &Region<D>, cells: &[C]) -> Result<(), GridError> {
        let expected = region.cell_count() as usize;
        if cells.len() != expected {
            return Err(GridError::PayloadSizeMismatch {
                expected,
                got: cells.len(),
            });
        }
        for (coord, cell) in region.coords().zip(cells) {
            self.set(&coord, cell.clone());
        }
        Ok(())
    }

    /// Copy the cells of `region` from `source`.
    fn paste<S: GridStorage<C, D>>(&mut self, source: &S, region: &Region<D>)
    where
        Self: Sized,
    {
        for coord in region.coords() {
            self.set(&coord, source.get(&coord).clone());
        }
    }
}
