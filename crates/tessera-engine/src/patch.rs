//! Ordering guard for ghost payloads.

use std::collections::BTreeSet;

use tessera_core::{NodeId, StepError};

/// Tracks which nano-steps have been requested from one neighbor link and
/// checks that payloads arrive for them in order.
///
/// Every ghost payload carries the nano-step it was computed for. A
/// payload must answer the oldest outstanding request; anything else
/// (a skipped request, a stale or unrequested payload) is reported as
/// [`StepError::GhostOutOfOrder`].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PatchRequests {
    requested: BTreeSet<u64>,
}

impl PatchRequests {
    /// No outstanding requests.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record that a payload for `nano_step` is expected.
    pub fn request(&mut self, nano_step: u64) {
        self.requested.insert(nano_step);
    }

    /// The oldest outstanding request.
    pub fn next_required(&self) -> Option<u64> {
        self.requested.first().copied()
    }

    /// Number of outstanding requests.
    pub fn outstanding(&self) -> usize {
        self.requested.len()
    }

    /// Accept a payload stamped `nano_step` from `source`.
    pub fn accept(&mut self, source: NodeId, nano_step: u64) -> Result<(), StepError> {
        match self.requested.first().copied() {
            Some(expected) if expected == nano_step => {
                self.requested.remove(&expected);
                Ok(())
            }
            Some(expected) => Err(StepError::GhostOutOfOrder {
                source,
                expected,
                got: nano_step,
            }),
            None => Err(StepError::UnexpectedMessage {
                source,
                expected: "no ghost payload",
            }),
        }
    }
}
