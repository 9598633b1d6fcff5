//! Stepper configuration, node roles, and construction errors.
//!
//! [`StepperConfig::validate`] checks the plain settings; the stepper
//! constructor adds the checks that need the transport (role vs. rank)
//! and the kernel (nano-step count).

use std::error::Error;
use std::fmt;

use tessera_core::{CommError, Coord, NodeId, StepError};
use tessera_space::Topology;

use crate::balancer::LoadBalancer;

// ── StepperConfig ──────────────────────────────────────────────────

/// Settings shared by every node of a striped simulation.
///
/// All nodes must be built from equal configurations.
#[derive(Clone, Debug, PartialEq)]
pub struct StepperConfig<const D: usize> {
    /// Rebalance every this many steps. Default: 1. Minimum: 1.
    pub rebalance_period: u64,
    /// Edge behavior of the global grid. Default: bounded on every axis.
    pub topology: Topology<D>,
}

impl<const D: usize> Default for StepperConfig<D> {
    fn default() -> Self {
        Self {
            rebalance_period: 1,
            topology: Topology::cube(),
        }
    }
}

impl<const D: usize> StepperConfig<D> {
    /// Check the settings that do not depend on other collaborators.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.rebalance_period == 0 {
            return Err(ConfigError::InvalidRebalancePeriod {
                value: self.rebalance_period,
            });
        }
        Ok(())
    }
}

/// Reject global dimensions with a non-positive extent.
pub(crate) fn validate_dimensions<const D: usize>(dims: &Coord<D>) -> Result<(), ConfigError> {
    if dims.0.iter().any(|&d| d <= 0) {
        return Err(ConfigError::EmptyGrid {
            dimensions: dims.to_string(),
        });
    }
    Ok(())
}

// ── Role ───────────────────────────────────────────────────────────

/// What a node does during rebalancing.
///
/// Exactly one node, the root, owns the load-balancer policy and decides
/// the new partition; every other node is a worker.
pub enum Role {
    /// The deciding node. Must run on [`NodeId::ROOT`].
    Root {
        /// The policy that turns measured loads into new workloads.
        balancer: Box<dyn LoadBalancer>,
    },
    /// Any other node.
    Worker,
}

impl Role {
    /// Returns `true` for [`Role::Root`].
    pub fn is_root(&self) -> bool {
        matches!(self, Self::Root { .. })
    }

    /// Check that this role fits the node it runs on.
    pub fn validate(&self, node: NodeId) -> Result<(), ConfigError> {
        match (self, node.is_root()) {
            (Self::Root { .. }, true) | (Self::Worker, false) => Ok(()),
            (Self::Root { .. }, false) => Err(ConfigError::WorkerWithBalancer { node }),
            (Self::Worker, true) => Err(ConfigError::RootWithoutBalancer),
        }
    }
}

impl fmt::Debug for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Root { balancer } => f
                .debug_struct("Root")
                .field("balancer", &balancer.name())
                .finish(),
            Self::Worker => f.write_str("Worker"),
        }
    }
}

// ── ConfigError ────────────────────────────────────────────────────

/// Errors detected while constructing a stepper or one of its writers.
#[derive(Clone, Debug, PartialEq)]
pub enum ConfigError {
    /// The rebalance period is below 1.
    InvalidRebalancePeriod {
        /// The configured period.
        value: u64,
    },
    /// The root node was given no load balancer.
    RootWithoutBalancer,
    /// A non-root node was given a load balancer.
    WorkerWithBalancer {
        /// The offending node.
        node: NodeId,
    },
    /// The cell kernel declares zero nano-steps per step.
    ZeroNanoSteps {
        /// Name of the kernel.
        kernel: String,
    },
    /// The global grid has a non-positive extent.
    EmptyGrid {
        /// The dimensions, formatted.
        dimensions: String,
    },
    /// A writer declares a period of zero.
    InvalidWriterPeriod {
        /// The configured period.
        value: u64,
    },
    /// A steerer declares a period of zero.
    InvalidSteererPeriod {
        /// The configured period.
        value: u64,
    },
    /// A collecting writer on the root was given no delegate.
    RootWithoutDelegate,
    /// A collecting writer on a non-root node was given a delegate.
    WorkerWithDelegate {
        /// The offending node.
        node: NodeId,
    },
    /// The transport failed during a constructor collective.
    Comm(CommError),
    /// A constructor collective received something it did not expect.
    Step(StepError),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidRebalancePeriod { value } => {
                write!(f, "rebalance_period must be at least 1, got {value}")
            }
            Self::RootWithoutBalancer => write!(f, "root node requires a load balancer"),
            Self::WorkerWithBalancer { node } => {
                write!(f, "node {node} is not the root but was given a load balancer")
            }
            Self::ZeroNanoSteps { kernel } => {
                write!(f, "kernel '{kernel}' declares zero nano-steps per step")
            }
            Self::EmptyGrid { dimensions } => {
                write!(f, "grid dimensions {dimensions} cover no cells")
            }
            Self::InvalidWriterPeriod { value } => {
                write!(f, "writer period must be at least 1, got {value}")
            }
            Self::InvalidSteererPeriod { value } => {
                write!(f, "steerer period must be at least 1, got {value}")
            }
            Self::RootWithoutDelegate => {
                write!(f, "collecting writer on the root requires a delegate")
            }
            Self::WorkerWithDelegate { node } => {
                write!(f, "collecting writer on node {node} must not have a delegate")
            }
            Self::Comm(e) => write!(f, "transport: {e}"),
            Self::Step(e) => write!(f, "setup: {e}"),
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Comm(e) => Some(e),
            Self::Step(e) => Some(e),
            _ => None,
        }
    }
}

impl From<CommError> for ConfigError {
    fn from(e: CommError) -> Self {
        Self::Comm(e)
    }
}

impl From<StepError> for ConfigError {
    fn from(e: StepError) -> Self {
        match e {
            StepError::Comm(e) => Self::Comm(e),
            other => Self::Step(other),
        }
    }
}
