//! Strongly-typed identifiers for nodes and simulation steps.

use std::fmt;

/// Identifies a worker node within a cluster.
///
/// Nodes are numbered `0..size`. Node `0` is the root: it is the only
/// node that owns a load-balancer policy and it is the target of every
/// gather collective.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub usize);

impl NodeId {
    /// The distinguished root node.
    pub const ROOT: NodeId = NodeId(0);

    /// Returns `true` if this is the root node.
    pub fn is_root(self) -> bool {
        self == Self::ROOT
    }

    /// The node's index into per-node vectors.
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<usize> for NodeId {
    fn from(v: usize) -> Self {
        Self(v)
    }
}

/// Monotonically increasing simulation step counter.
///
/// Incremented once per completed `step()`, after all nano-steps of that
/// step have run.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StepId(pub u64);

impl StepId {
    /// The step after this one.
    pub fn next(self) -> Self {
        Self(self.0 + 1)
    }

    /// Returns `true` if this step falls on a multiple of `period`.
    ///
    /// A zero period never matches.
    pub fn is_multiple_of(self, period: u64) -> bool {
        period != 0 && self.0 % period == 0
    }
}

impl fmt::Display for StepId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for StepId {
    fn from(v: u64) -> Self {
        Self(v)
    }
}
