//! Benchmark profiles for the Tessera distributed stencil engine.
//!
//! - [`comb_region`]: a deliberately fragmented region, one short streak
//!   per gap, for stressing region algebra
//! - [`HeatKernel`]: a five-point averaging stencil over `f64` cells
//! - [`heat_profile`]: a hot-spot initializer for [`HeatKernel`]
//! - [`run_heat`]: a full multi-node run over a local cluster

#![forbid(unsafe_code)]
#![deny(rustdoc::broken_intra_doc_links)]

use std::error::Error;

use tessera_comm::{LocalCluster, LocalTransport, Transport};
use tessera_core::{CellKernel, Coord, Neighborhood, NodeId, StepId};
use tessera_engine::{
    Initializer, LoadBalancer, Message, ProportionalBalancer, Role, StepperConfig,
    StripingStepper,
};
use tessera_space::{Region, Streak, Topology};

/// `height` rows of `width / (2 * tooth)` streaks, each `tooth` cells long
/// and separated by `tooth` empty cells. Odd rows are shifted by one
/// tooth so no two rows share a streak layout.
pub fn comb_region(width: i32, height: i32, tooth: i32) -> Region<2> {
    let mut region = Region::new();
    for y in 0..height {
        let shift = if y % 2 == 0 { 0 } else { tooth };
        let mut x = shift;
        while x + tooth <= width {
            region.insert(Streak::new(Coord([x, y]), x + tooth));
            x += 2 * tooth;
        }
    }
    region
}

/// Each cell moves a fraction `alpha` of the way toward the mean of its
/// four neighbors.
#[derive(Clone, Copy, Debug)]
pub struct HeatKernel {
    pub alpha: f64,
}

impl CellKernel<f64, 2> for HeatKernel {
    fn name(&self) -> &str {
        "heat"
    }

    fn update<N: Neighborhood<f64, 2>>(&self, hood: &N, _nano_step: u32) -> f64 {
        let here = *hood.this();
        let mean = (hood.at(Coord([-1, 0]))
            + hood.at(Coord([1, 0]))
            + hood.at(Coord([0, -1]))
            + hood.at(Coord([0, 1])))
            / 4.0;
        here + self.alpha * (mean - here)
    }
}

/// A `width` x `height` plate at zero with a hot square in the upper
/// left quarter, run for `steps` steps.
pub struct HeatProfile {
    pub width: i32,
    pub height: i32,
    pub steps: u64,
}

impl Initializer<f64, 2> for HeatProfile {
    fn grid_dimensions(&self) -> Coord<2> {
        Coord([self.width, self.height])
    }

    fn cell(&self, coord: &Coord<2>) -> f64 {
        let hot = coord[0] < self.width / 4 && coord[1] < self.height / 4;
        if hot {
            100.0
        } else {
            0.0
        }
    }

    fn edge_cell(&self) -> f64 {
        0.0
    }

    fn max_steps(&self) -> StepId {
        StepId(self.steps)
    }
}

/// The profile used by the stepper benchmarks.
pub fn heat_profile(width: i32, height: i32, steps: u64) -> HeatProfile {
    HeatProfile {
        width,
        height,
        steps,
    }
}

/// Run the heat profile on `nodes` threads, rebalancing every
/// `rebalance_period` steps with a [`ProportionalBalancer`]. Returns the
/// number of nano-steps each node completed.
pub fn run_heat(
    nodes: usize,
    width: i32,
    height: i32,
    steps: u64,
    rebalance_period: u64,
) -> Result<Vec<u64>, Box<dyn Error>> {
    let results = LocalCluster::run(
        nodes,
        |transport: LocalTransport<Message<f64, 2>>| -> Result<u64, String> {
            let node = transport.rank();
            let config = StepperConfig {
                rebalance_period,
                topology: Topology::cube(),
            };
            let mut stepper = StripingStepper::new(
                config,
                role(node, || Box::new(ProportionalBalancer)),
                HeatKernel { alpha: 0.5 },
                Box::new(heat_profile(width, height, steps)),
                transport,
            )
            .map_err(|e| e.to_string())?;
            stepper.run().map_err(|e| e.to_string())?;
            Ok(stepper.nano_steps_done())
        },
    )?;
    results.into_iter().map(|r| r.map_err(Into::into)).collect()
}

fn role(node: NodeId, balancer: impl FnOnce() -> Box<dyn LoadBalancer>) -> Role {
    if node.is_root() {
        Role::Root {
            balancer: balancer(),
        }
    } else {
        Role::Worker
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn comb_has_one_streak_per_tooth() {
        let region = comb_region(16, 2, 2);
        assert_eq!(region.size(), 8);
        assert_eq!(region.cell_count(), 16);
        assert!(region.contains(&Coord([0, 0])));
        assert!(!region.contains(&Coord([0, 1])));
        assert!(region.contains(&Coord([2, 1])));
    }

    #[test]
    fn heat_run_completes_on_two_nodes() {
        let done = run_heat(2, 8, 8, 3, 1).unwrap();
        assert_eq!(done, vec![3, 3]);
    }
}
