//! Message tags.

use std::fmt;

/// Channel a message travels on.
///
/// Each protocol phase uses its own tag, so a [`wait`](crate::Transport::wait)
/// on one phase never consumes the messages of another.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Tag {
    /// Load reports and partition broadcasts during rebalancing.
    Balance,
    /// Ghost rows travelling from a node to its lower neighbor.
    GhostAlpha,
    /// Ghost rows travelling from a node to its upper neighbor.
    GhostBeta,
    /// Owned rows moving between nodes after a rebalance.
    Migration,
    /// Owned regions gathered for output at a root.
    Collect,
    /// Timing statistics gathered at a root.
    Stats,
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Balance => "balance",
            Self::GhostAlpha => "ghost-alpha",
            Self::GhostBeta => "ghost-beta",
            Self::Migration => "migration",
            Self::Collect => "collect",
            Self::Stats => "stats",
        };
        f.write_str(name)
    }
}
