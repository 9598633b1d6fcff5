//! Error types for the Tessera engine.
//!
//! Organized by subsystem: transport ([`CommError`]), grid storage
//! ([`GridError`]), and the per-step protocol ([`StepError`]). All of
//! them are fatal for the enclosing operation; nothing is retried.

use std::error::Error;
use std::fmt;

use crate::id::NodeId;

/// Errors from the communication transport.
///
/// The transport is assumed reliable, so every variant signals a broken
/// cluster rather than a condition worth retrying.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CommError {
    /// The channel to or from `node` is closed (its worker has exited).
    Disconnected {
        /// Node whose endpoint went away.
        node: NodeId,
    },
    /// A message was addressed to a node outside the cluster.
    UnknownNode {
        /// The offending destination or source.
        node: NodeId,
        /// Number of nodes in the cluster.
        size: usize,
    },
    /// A collective that only the root may call was invoked elsewhere,
    /// or vice versa.
    RootMismatch {
        /// Node that made the call.
        node: NodeId,
        /// Expected root of the collective.
        root: NodeId,
    },
}

impl fmt::Display for CommError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Disconnected { node } => write!(f, "channel to node {node} disconnected"),
            Self::UnknownNode { node, size } => {
                write!(f, "node {node} is not part of a cluster of {size} nodes")
            }
            Self::RootMismatch { node, root } => {
                write!(f, "node {node} cannot act as root {root} of this collective")
            }
        }
    }
}

impl Error for CommError {}

/// Errors from grid storage operations.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GridError {
    /// A packed payload does not hold one cell per coordinate of the
    /// region it is being unpacked into.
    PayloadSizeMismatch {
        /// Cells the region covers.
        expected: usize,
        /// Cells the payload carried.
        got: usize,
    },
}

impl fmt::Display for GridError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PayloadSizeMismatch { expected, got } => {
                write!(f, "payload holds {got} cells, region covers {expected}")
            }
        }
    }
}

impl Error for GridError {}

/// Errors from a stepper's `step()` or `run()`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StepError {
    /// An external collaborator broke a contract, e.g. a load balancer
    /// that changed the total workload or the number of nodes.
    InvariantViolation {
        /// Description of the violated invariant.
        reason: String,
    },
    /// A ghost payload arrived for a later nano-step than the one that
    /// was requested next from that neighbor.
    GhostOutOfOrder {
        /// Neighbor that sent the payload.
        source: NodeId,
        /// Nano-step that was expected.
        expected: u64,
        /// Nano-step the payload was stamped with.
        got: u64,
    },
    /// A message of the wrong kind arrived on a tag.
    UnexpectedMessage {
        /// Node that sent it.
        source: NodeId,
        /// What the receiver was waiting for.
        expected: &'static str,
    },
    /// The transport failed.
    Comm(CommError),
    /// Grid storage rejected a payload.
    Grid(GridError),
}

impl fmt::Display for StepError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvariantViolation { reason } => write!(f, "invariant violated: {reason}"),
            Self::GhostOutOfOrder {
                source,
                expected,
                got,
            } => write!(
                f,
                "ghost payload from node {source} is for nano-step {got}, expected {expected}"
            ),
            Self::UnexpectedMessage { source, expected } => {
                write!(f, "unexpected message from node {source}, expected {expected}")
            }
            Self::Comm(e) => write!(f, "transport: {e}"),
            Self::Grid(e) => write!(f, "grid: {e}"),
        }
    }
}

impl Error for StepError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Comm(e) => Some(e),
            Self::Grid(e) => Some(e),
            _ => None,
        }
    }
}

impl From<CommError> for StepError {
    fn from(e: CommError) -> Self {
        Self::Comm(e)
    }
}

impl From<GridError> for StepError {
    fn from(e: GridError) -> Self {
        Self::Grid(e)
    }
}
