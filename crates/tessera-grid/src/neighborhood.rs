//! Kernel invocation over regions of a grid.

use std::marker::PhantomData;

use tessera_core::{CellKernel, Coord, Neighborhood};
use tessera_space::Region;

use crate::storage::GridStorage;

/// A [`Neighborhood`] reading from any [`GridStorage`].
pub struct GridNeighborhood<'a, G, C, const D: usize> {
    grid: &'a G,
    center: Coord<D>,
    _cell: PhantomData<fn() -> C>,
}

impl<'a, G, C, const D: usize> GridNeighborhood<'a, G, C, D>
where
    C: Clone,
    G: GridStorage<C, D>,
{
    /// View `grid` around `center`.
    pub fn new(grid: &'a G, center: Coord<D>) -> Self {
        Self {
            grid,
            center,
            _cell: PhantomData,
        }
    }
}

impl<G, C, const D: usize> Neighborhood<C, D> for GridNeighborhood<'_, G, C, D>
where
    C: Clone,
    G: GridStorage<C, D>,
{
    fn center(&self) -> Coord<D> {
        self.center
    }

    fn at(&self, offset: Coord<D>) -> &C {
        self.grid.get(&(self.center + offset))
    }
}

/// Run `kernel` for every cell of `region`, reading `old` and writing
/// `new`. Returns the number of cells updated.
pub fn update_region<C, G, K, const D: usize>(
    region: &Region<D>,
    old: &G,
    new: &mut G,
    kernel: &K,
    nano_step: u32,
) -> u64
where
    C: Clone,
    G: GridStorage<C, D>,
    K: CellKernel<C, D>,
{
    let mut updated = 0;
    for coord in region.coords() {
        let hood = GridNeighborhood::new(old, coord);
        new.set(&coord, kernel.update(&hood, nano_step));
        updated += 1;
    }
    updated
}
