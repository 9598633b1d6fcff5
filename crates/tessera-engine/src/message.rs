//! The payloads nodes exchange.

use tessera_space::Region;

use crate::chronometer::Chronometer;
use crate::partition::Partition;

/// Everything a stepper sends over its transport.
///
/// Cell payloads are packed in the streak order of a region both sides
/// derive independently, so only the cells travel.
#[derive(Clone, Debug, PartialEq)]
pub enum Message<C, const D: usize> {
    /// Inner ghost rows computed for a nano-step.
    Ghost {
        /// Global nano-step the rows were computed for.
        nano_step: u64,
        /// The rows, packed.
        cells: Vec<C>,
    },
    /// Owned rows handed over after a rebalance.
    Migration(Vec<C>),
    /// A node's measured load.
    Load(f64),
    /// The partition decided by the root.
    Partition(Partition),
    /// A node's owned cells, for output at the root.
    Owned {
        /// What the node owns.
        region: Region<D>,
        /// Its cells, packed.
        cells: Vec<C>,
    },
    /// Period of a collecting writer, decided by the root.
    WriterPeriod(u64),
    /// A node's timing statistics.
    Stats(Chronometer),
}

impl<C, const D: usize> Message<C, D> {
    /// Short name of the variant, for error reports.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Ghost { .. } => "ghost rows",
            Self::Migration(_) => "migrated rows",
            Self::Load(_) => "load report",
            Self::Partition(_) => "partition",
            Self::Owned { .. } => "owned region",
            Self::WriterPeriod(_) => "writer period",
            Self::Stats(_) => "statistics",
        }
    }
}
