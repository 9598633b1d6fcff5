//! Per-node ownership and ghost-zone geometry.
//!
//! The grid is striped along its outermost axis (`D - 1`). Each node owns
//! a slab of rows; the rows at the edges of that slab (inner ghosts) are
//! sent to the neighboring nodes, and the rows just outside it (outer
//! ghosts) are received from them.
//!
//! "Upper" is the side facing lower row indices, "lower" the side facing
//! higher ones:
//!
//! ```text
//!   start - 1      outer_upper   <- received from the upper neighbor
//!   start          inner_upper   -> sent to the upper neighbor
//!   ...            interior
//!   end - 1        inner_lower   -> sent to the lower neighbor
//!   end            outer_lower   <- received from the lower neighbor
//! ```

use std::ops::Range;

use tessera_core::{Coord, NodeId};
use tessera_space::{CoordBox, Region, Topology};

use crate::partition::Partition;

/// Rows of dependency a kernel may reach across a stripe boundary.
pub const GHOST_WIDTH: usize = 1;

/// Regions and neighbors of one node under one partition.
#[derive(Clone, Debug, PartialEq)]
pub struct GhostGeometry<const D: usize> {
    /// Rows this node owns.
    pub owned: Region<D>,
    /// Owned rows that are not inner ghosts.
    pub interior: Region<D>,
    /// Owned rows at the upper edge, sent to the upper neighbor.
    pub inner_upper: Region<D>,
    /// Owned rows at the lower edge, sent to the lower neighbor.
    pub inner_lower: Region<D>,
    /// Union of both inner ghost slabs.
    pub inner_ghosts: Region<D>,
    /// Rows above the owned slab, received from the upper neighbor.
    pub outer_upper: Region<D>,
    /// Rows below the owned slab, received from the lower neighbor.
    pub outer_lower: Region<D>,
    /// Owned rows plus both outer ghost slabs.
    pub with_outer_ghosts: Region<D>,
    /// Height of the upper ghost slabs.
    pub upper_ghost_height: usize,
    /// Height of the lower ghost slabs.
    pub lower_ghost_height: usize,
    /// Nearest populated node above, if any.
    pub upper_neighbor: Option<NodeId>,
    /// Nearest populated node below, if any.
    pub lower_neighbor: Option<NodeId>,
    /// Box covering owned rows and outer ghosts; the node's storage.
    pub stripe: CoordBox<D>,
}

impl<const D: usize> GhostGeometry<D> {
    /// Derive the geometry of `node` from `partition`.
    pub fn new(
        node: NodeId,
        partition: &Partition,
        dims: Coord<D>,
        topology: &Topology<D>,
    ) -> Self {
        let axis = D - 1;
        let wraps = topology.wraps(axis);
        let Range { start, end } = partition.range(node);
        let extent = partition.extent();

        let has_peers = start < end && partition.populated() > 1;
        let upper_ghost_height = if has_peers && (wraps || start > 0) {
            GHOST_WIDTH
        } else {
            0
        };
        let lower_ghost_height = if has_peers && (wraps || end < extent) {
            GHOST_WIDTH
        } else {
            0
        };

        let upper_neighbor = (upper_ghost_height > 0)
            .then(|| find_neighbor(node, partition, wraps, Direction::Up))
            .flatten();
        let lower_neighbor = (lower_ghost_height > 0)
            .then(|| find_neighbor(node, partition, wraps, Direction::Down))
            .flatten();

        let (start, end) = (start as i32, end as i32);
        let (hu, hl) = (upper_ghost_height as i32, lower_ghost_height as i32);
        let slab = |rows: Range<i32>| Region::from(slab_box(&dims, rows));

        let owned = slab(start..end);
        let inner_upper = slab(start..start + hu);
        let inner_lower = slab(end - hl..end);
        let outer_upper = slab(start - hu..start);
        let outer_lower = slab(end..end + hl);

        let inner_ghosts = &inner_upper + &inner_lower;
        let interior = &owned - &inner_ghosts;
        let with_outer_ghosts = &(&owned + &outer_upper) + &outer_lower;
        let stripe = if start < end {
            slab_box(&dims, start - hu..end + hl)
        } else {
            slab_box(&dims, start..start)
        };

        Self {
            owned,
            interior,
            inner_upper,
            inner_lower,
            inner_ghosts,
            outer_upper,
            outer_lower,
            with_outer_ghosts,
            upper_ghost_height,
            lower_ghost_height,
            upper_neighbor,
            lower_neighbor,
            stripe,
        }
    }
}

/// Full-width box spanning `rows` of the striped axis.
pub fn slab_box<const D: usize>(dims: &Coord<D>, rows: Range<i32>) -> CoordBox<D> {
    let axis = D - 1;
    let mut origin = Coord::origin();
    origin[axis] = rows.start;
    let mut extent = *dims;
    extent[axis] = (rows.end - rows.start).max(0);
    CoordBox::new(origin, extent)
}

#[derive(Clone, Copy)]
enum Direction {
    Up,
    Down,
}

/// Walk away from `node` until a populated partition turns up. Wraps
/// around on periodic topologies; gives up at a bounded edge or on
/// returning to `node`.
fn find_neighbor(
    node: NodeId,
    partition: &Partition,
    wraps: bool,
    direction: Direction,
) -> Option<NodeId> {
    let n = partition.nodes();
    let mut i = node.index();
    loop {
        i = match direction {
            Direction::Up if i == 0 => {
                if !wraps {
                    return None;
                }
                n - 1
            }
            Direction::Up => i - 1,
            Direction::Down if i + 1 == n => {
                if !wraps {
                    return None;
                }
                0
            }
            Direction::Down => i + 1,
        };
        if i == node.index() {
            return None;
        }
        if !partition.is_degenerate(NodeId(i)) {
            return Some(NodeId(i));
        }
    }
}
