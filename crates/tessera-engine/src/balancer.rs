//! Load-balancing policies.
//!
//! A policy runs on the root only. It receives the current workload of
//! every node (rows owned) and the load each node measured since the last
//! rebalance (its compute time divided by its total time), and returns
//! new workloads. The stepper rejects any answer that changes the node
//! count or the total number of rows.

use rand_chacha::rand_core::{RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::partition::Partition;

/// Decides how many rows each node should own next.
pub trait LoadBalancer: Send {
    /// Human-readable name for logging.
    fn name(&self) -> &str;

    /// Compute new workloads.
    ///
    /// Must return a vector of the same length as `workloads` with the same
    /// sum.
    fn balance(&mut self, workloads: &[usize], loads: &[f64]) -> Vec<usize>;
}

/// Keeps the current partition.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoOpBalancer;

impl LoadBalancer for NoOpBalancer {
    fn name(&self) -> &str {
        "noop"
    }

    fn balance(&mut self, workloads: &[usize], _loads: &[f64]) -> Vec<usize> {
        workloads.to_vec()
    }
}

/// Redistributes rows in random proportions, ignoring the loads.
///
/// Deterministic for a given seed. Useful for exercising migration.
#[derive(Clone, Debug)]
pub struct RandomBalancer {
    rng: ChaCha8Rng,
}

impl RandomBalancer {
    /// Create a balancer drawing from a ChaCha8 stream seeded with `seed`.
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }
}

impl LoadBalancer for RandomBalancer {
    fn name(&self) -> &str {
        "random"
    }

    fn balance(&mut self, workloads: &[usize], _loads: &[f64]) -> Vec<usize> {
        let total = workloads.iter().sum();
        let weights: Vec<f64> = workloads
            .iter()
            .map(|_| f64::from(self.rng.next_u32() % 1024 + 1))
            .collect();
        apportion(total, &weights)
    }
}

/// Gives each node rows in proportion to its measured throughput.
///
/// A node's throughput is its current workload divided by its load.
/// Nodes without a usable measurement (no rows, or a load that is zero,
/// negative, or not finite) are assumed to run at the average throughput
/// of the others. When no node has a usable measurement the partition is
/// kept.
#[derive(Clone, Copy, Debug, Default)]
pub struct ProportionalBalancer;

impl LoadBalancer for ProportionalBalancer {
    fn name(&self) -> &str {
        "proportional"
    }

    fn balance(&mut self, workloads: &[usize], loads: &[f64]) -> Vec<usize> {
        if loads.len() != workloads.len() {
            return workloads.to_vec();
        }
        let throughput: Vec<Option<f64>> = workloads
            .iter()
            .zip(loads)
            .map(|(&w, &l)| (w > 0 && l.is_finite() && l > 0.0).then(|| w as f64 / l))
            .collect();

        let measured: Vec<f64> = throughput.iter().flatten().copied().collect();
        if measured.is_empty() {
            return workloads.to_vec();
        }
        let mean = measured.iter().sum::<f64>() / measured.len() as f64;
        let weights: Vec<f64> = throughput.iter().map(|t| t.unwrap_or(mean)).collect();

        apportion(workloads.iter().sum(), &weights)
    }
}

/// Split `total` units in proportion to `weights`, rounding with the
/// largest-remainder method so the shares always sum to `total`.
///
/// Non-finite and non-positive weights count as zero. If no weight is
/// positive the units are split evenly.
///
/// # Examples
///
/// ```
/// use tessera_engine::balancer::apportion;
///
/// assert_eq!(apportion(12, &[1.0, 1.0, 1.0]), vec![4, 4, 4]);
/// assert_eq!(apportion(10, &[1.0, 1.0, 1.0]), vec![4, 3, 3]);
/// assert_eq!(apportion(7, &[0.0, 0.0]), vec![3, 4]);
/// ```
pub fn apportion(total: usize, weights: &[f64]) -> Vec<usize> {
    if weights.is_empty() {
        return Vec::new();
    }
    let clean: Vec<f64> = weights
        .iter()
        .map(|&w| if w.is_finite() && w > 0.0 { w } else { 0.0 })
        .collect();
    let sum: f64 = clean.iter().sum();
    if sum <= 0.0 {
        return Partition::even(total, weights.len()).workloads();
    }

    let quotas: Vec<f64> = clean.iter().map(|w| w / sum * total as f64).collect();
    let mut shares: Vec<usize> = quotas.iter().map(|q| q.floor() as usize).collect();
    let assigned: usize = shares.iter().sum();

    let mut order: Vec<usize> = (0..shares.len()).collect();
    order.sort_by(|&a, &b| {
        let ra = quotas[a] - quotas[a].floor();
        let rb = quotas[b] - quotas[b].floor();
        rb.total_cmp(&ra).then(a.cmp(&b))
    });

    if assigned <= total {
        for &i in order.iter().cycle().take(total - assigned) {
            shares[i] += 1;
        }
    } else {
        // Float error pushed the floors past the total; take the excess
        // back from the smallest remainders.
        let mut excess = assigned - total;
        for &i in order.iter().rev().cycle() {
            if excess == 0 {
                break;
            }
            if shares[i] > 0 {
                shares[i] -= 1;
                excess -= 1;
            }
        }
    }
    shares
}
