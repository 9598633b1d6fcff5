//! Row-range partitions of the striped axis.

use std::ops::Range;

use tessera_core::{NodeId, StepError};

/// Boundaries of the row ranges assigned to each node.
///
/// Holds `nodes + 1` non-decreasing entries: entry `i` is the first row
/// owned by node `i`, entry `0` is `0`, and the last entry is the extent
/// of the striped axis. Node `i` owns rows `b[i]..b[i + 1]`, which may be
/// empty.
///
/// # Examples
///
/// ```
/// use tessera_engine::Partition;
///
/// let p = Partition::even(12, 3);
/// assert_eq!(p.boundaries(), &[0, 4, 8, 12]);
///
/// let q = Partition::from_workloads(&[5, 4, 3]);
/// assert_eq!(q.boundaries(), &[0, 5, 9, 12]);
/// assert_eq!(q.workloads(), vec![5, 4, 3]);
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Partition {
    boundaries: Vec<usize>,
}

impl Partition {
    /// Split `extent` rows as evenly as possible across `nodes` nodes:
    /// `b[i] = floor(extent * i / nodes)`.
    ///
    /// # Panics
    ///
    /// Panics if `nodes` is zero.
    pub fn even(extent: usize, nodes: usize) -> Self {
        assert!(nodes > 0, "cannot partition across zero nodes");
        let boundaries = (0..=nodes)
            .map(|i| (extent as u128 * i as u128 / nodes as u128) as usize)
            .collect();
        Self { boundaries }
    }

    /// Build the partition whose node `i` owns `workloads[i]` rows.
    pub fn from_workloads(workloads: &[usize]) -> Self {
        let mut boundaries = Vec::with_capacity(workloads.len() + 1);
        let mut acc = 0;
        boundaries.push(acc);
        for &w in workloads {
            acc += w;
            boundaries.push(acc);
        }
        Self { boundaries }
    }

    /// Rows owned by each node.
    pub fn workloads(&self) -> Vec<usize> {
        self.boundaries.windows(2).map(|w| w[1] - w[0]).collect()
    }

    /// The raw boundary vector.
    pub fn boundaries(&self) -> &[usize] {
        &self.boundaries
    }

    /// Number of nodes.
    pub fn nodes(&self) -> usize {
        self.boundaries.len() - 1
    }

    /// Extent of the striped axis.
    pub fn extent(&self) -> usize {
        self.boundaries.last().copied().unwrap_or(0)
    }

    /// Rows owned by `node`.
    pub fn range(&self, node: NodeId) -> Range<usize> {
        let i = node.index();
        self.boundaries[i]..self.boundaries[i + 1]
    }

    /// Returns `true` if `node` owns no rows.
    pub fn is_degenerate(&self, node: NodeId) -> bool {
        self.range(node).is_empty()
    }

    /// Number of nodes that own at least one row.
    pub fn populated(&self) -> usize {
        self.boundaries.windows(2).filter(|w| w[0] < w[1]).count()
    }
}

/// Rows in both `a` and `b`.
pub fn overlap(a: &Range<usize>, b: &Range<usize>) -> Range<usize> {
    a.start.max(b.start)..a.end.min(b.end)
}

/// Check that a balancer kept the node count and the total workload.
pub fn validate_workloads(old: &[usize], new: &[usize]) -> Result<(), StepError> {
    if old.len() != new.len() {
        return Err(StepError::InvariantViolation {
            reason: format!(
                "balancer returned {} workloads for {} nodes",
                new.len(),
                old.len()
            ),
        });
    }
    let (before, after): (usize, usize) = (old.iter().sum(), new.iter().sum());
    if before != after {
        return Err(StepError::InvariantViolation {
            reason: format!("balancer changed the total workload from {before} to {after}"),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn even_split_of_twelve_rows() {
        assert_eq!(Partition::even(12, 3).boundaries(), &[0, 4, 8, 12]);
        assert_eq!(Partition::even(10, 4).boundaries(), &[0, 2, 5, 7, 10]);
    }

    #[test]
    fn more_nodes_than_rows_leaves_some_degenerate() {
        let p = Partition::even(2, 4);
        assert_eq!(p.boundaries(), &[0, 0, 1, 1, 2]);
        assert!(p.is_degenerate(NodeId(0)));
        assert!(!p.is_degenerate(NodeId(1)));
        assert_eq!(p.populated(), 2);
    }

    #[test]
    fn ranges_and_overlaps() {
        let old = Partition::even(12, 3);
        let new = Partition::from_workloads(&[5, 4, 3]);
        assert_eq!(new.range(NodeId(1)), 5..9);
        assert_eq!(overlap(&old.range(NodeId(0)), &new.range(NodeId(1))), 5..4);
        assert_eq!(overlap(&old.range(NodeId(1)), &new.range(NodeId(0))), 4..5);
    }

    #[test]
    fn workload_length_change_is_fatal() {
        match validate_workloads(&[4, 4, 4], &[6, 6]) {
            Err(StepError::InvariantViolation { reason }) => assert!(reason.contains("3 nodes")),
            other => panic!("expected InvariantViolation, got {other:?}"),
        }
    }

    #[test]
    fn workload_sum_change_is_fatal() {
        match validate_workloads(&[4, 4, 4], &[5, 4, 4]) {
            Err(StepError::InvariantViolation { reason }) => {
                assert!(reason.contains("12 to 13"))
            }
            other => panic!("expected InvariantViolation, got {other:?}"),
        }
        assert!(validate_workloads(&[4, 4, 4], &[5, 4, 3]).is_ok());
    }

    proptest! {
        #[test]
        fn even_partition_is_well_formed(extent in 0usize..10_000, nodes in 1usize..64) {
            let p = Partition::even(extent, nodes);
            let b = p.boundaries();
            prop_assert_eq!(b.len(), nodes + 1);
            prop_assert_eq!(b[0], 0);
            prop_assert_eq!(b[nodes], extent);
            prop_assert!(b.windows(2).all(|w| w[0] <= w[1]));
        }

        #[test]
        fn workloads_round_trip(workloads in prop::collection::vec(0usize..50, 1..16)) {
            let p = Partition::from_workloads(&workloads);
            prop_assert_eq!(p.workloads(), workloads.clone());
            prop_assert_eq!(p.extent(), workloads.iter().sum::<usize>());
        }
    }
}
