//! Reusable stepper test fixtures.
//!
//! Kernels:
//!
//! - [`IdentityKernel`] keeps every cell.
//! - [`ShiftKernel`] copies the cell at a fixed offset.
//! - [`SumKernel`] adds a cell to its axis neighbors, modulo a prime.
//! - [`CountingKernel`] increments every cell once per nano-step.
//!
//! Collaborators:
//!
//! - [`FnInitializer`] seeds cells from a closure.
//! - [`ScriptedBalancer`] replays fixed workload vectors.
//! - [`BrokenBalancer`] violates the workload-sum contract.
//! - [`PokeSteerer`] logs its calls and can overwrite one cell.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, PoisonError};

use tessera_core::{CellKernel, Coord, NodeId, Neighborhood, StepError, StepId};
use tessera_engine::{Initializer, LoadBalancer, Role, Steerer, SteererContext, SteererEvent};
use tessera_grid::GridStorage;

// ── Kernels ────────────────────────────────────────────────────────

/// Leaves every cell unchanged.
#[derive(Clone, Copy, Debug, Default)]
pub struct IdentityKernel;

impl<C: Clone, const D: usize> CellKernel<C, D> for IdentityKernel {
    fn name(&self) -> &str {
        "identity"
    }

    fn update<N: Neighborhood<C, D>>(&self, hood: &N, _nano_step: u32) -> C {
        hood.this().clone()
    }
}

/// Each cell takes the value at `offset` from itself.
///
/// With `offset = -1` along the striped axis, a value travels one row
/// toward higher indices per nano-step.
#[derive(Clone, Copy, Debug)]
pub struct ShiftKernel<const D: usize> {
    pub offset: Coord<D>,
}

impl<const D: usize> ShiftKernel<D> {
    /// Shift by one row along the striped axis, toward higher indices.
    pub fn down() -> Self {
        let mut offset = Coord::origin();
        offset[D - 1] = -1;
        Self { offset }
    }
}

impl<C: Clone, const D: usize> CellKernel<C, D> for ShiftKernel<D> {
    fn name(&self) -> &str {
        "shift"
    }

    fn update<N: Neighborhood<C, D>>(&self, hood: &N, _nano_step: u32) -> C {
        hood.at(self.offset).clone()
    }
}

/// Each cell becomes the sum of itself and its neighbors at distance one
/// along every axis, modulo [`SumKernel::MODULUS`].
///
/// Integer arithmetic keeps results exact, so distributed and serial runs
/// can be compared cell for cell.
#[derive(Clone, Copy, Debug, Default)]
pub struct SumKernel;

impl SumKernel {
    pub const MODULUS: i64 = 1_000_003;
}

impl<const D: usize> CellKernel<i64, D> for SumKernel {
    fn name(&self) -> &str {
        "sum"
    }

    fn update<N: Neighborhood<i64, D>>(&self, hood: &N, _nano_step: u32) -> i64 {
        let mut sum = *hood.this();
        for axis in 0..D {
            for delta in [-1, 1] {
                let mut offset = Coord::origin();
                offset[axis] = delta;
                sum += *hood.at(offset);
            }
        }
        sum.rem_euclid(Self::MODULUS)
    }
}

/// Adds one to every cell per nano-step, over a configurable number of
/// nano-steps per step.
#[derive(Clone, Copy, Debug)]
pub struct CountingKernel {
    pub nano_steps: u32,
}

impl<const D: usize> CellKernel<i64, D> for CountingKernel {
    fn name(&self) -> &str {
        "counting"
    }

    fn nano_steps(&self) -> u32 {
        self.nano_steps
    }

    fn update<N: Neighborhood<i64, D>>(&self, hood: &N, _nano_step: u32) -> i64 {
        hood.this() + 1
    }
}

// ── Initializer ────────────────────────────────────────────────────

/// Initializer seeding each cell from a closure over its global
/// coordinate.
pub struct FnInitializer<F, C, const D: usize> {
    pub dimensions: Coord<D>,
    pub edge: C,
    pub max_steps: StepId,
    pub start_step: StepId,
    pub cell: F,
}

impl<F, C, const D: usize> FnInitializer<F, C, D>
where
    F: Fn(&Coord<D>) -> C,
{
    /// Run from step 0 to `max_steps`.
    pub fn new(dimensions: Coord<D>, edge: C, max_steps: u64, cell: F) -> Self {
        Self {
            dimensions,
            edge,
            max_steps: StepId(max_steps),
            start_step: StepId(0),
            cell,
        }
    }

    /// Start at `step` instead of 0.
    pub fn starting_at(mut self, step: u64) -> Self {
        self.start_step = StepId(step);
        self
    }
}

impl<F, C, const D: usize> Initializer<C, D> for FnInitializer<F, C, D>
where
    F: Fn(&Coord<D>) -> C + Send,
    C: Clone + Send,
{
    fn grid_dimensions(&self) -> Coord<D> {
        self.dimensions
    }

    fn cell(&self, coord: &Coord<D>) -> C {
        (self.cell)(coord)
    }

    fn edge_cell(&self) -> C {
        self.edge.clone()
    }

    fn start_step(&self) -> StepId {
        self.start_step
    }

    fn max_steps(&self) -> StepId {
        self.max_steps
    }
}

// ── Balancers ──────────────────────────────────────────────────────

/// Replays a fixed sequence of workload vectors, one per rebalance, then
/// keeps the partition.
#[derive(Clone, Debug, Default)]
pub struct ScriptedBalancer {
    script: VecDeque<Vec<usize>>,
    pub calls: usize,
}

impl ScriptedBalancer {
    pub fn new(script: impl IntoIterator<Item = Vec<usize>>) -> Self {
        Self {
            script: script.into_iter().collect(),
            calls: 0,
        }
    }
}

impl LoadBalancer for ScriptedBalancer {
    fn name(&self) -> &str {
        "scripted"
    }

    fn balance(&mut self, workloads: &[usize], _loads: &[f64]) -> Vec<usize> {
        self.calls += 1;
        self.script.pop_front().unwrap_or_else(|| workloads.to_vec())
    }
}

/// Hands one extra row to the first node, changing the total.
#[derive(Clone, Copy, Debug, Default)]
pub struct BrokenBalancer;

impl LoadBalancer for BrokenBalancer {
    fn name(&self) -> &str {
        "broken"
    }

    fn balance(&mut self, workloads: &[usize], _loads: &[f64]) -> Vec<usize> {
        let mut out = workloads.to_vec();
        if let Some(first) = out.first_mut() {
            *first += 1;
        }
        out
    }
}

/// The role a node should take: root with the given balancer on node 0,
/// worker elsewhere.
pub fn role_for(node: NodeId, balancer: impl FnOnce() -> Box<dyn LoadBalancer>) -> Role {
    if node.is_root() {
        Role::Root {
            balancer: balancer(),
        }
    } else {
        Role::Worker
    }
}

// ── Steerer ────────────────────────────────────────────────────────

/// Shared log of `(event, step)` pairs a [`PokeSteerer`] saw.
pub type SteerLog = Arc<Mutex<Vec<(SteererEvent, StepId)>>>;

/// Logs every call and, at one step, overwrites one cell if this node
/// holds it.
pub struct PokeSteerer<C, const D: usize> {
    pub period: u64,
    pub poke: Option<(StepId, Coord<D>, C)>,
    log: SteerLog,
}

impl<C, const D: usize> PokeSteerer<C, D> {
    pub fn new(period: u64) -> Self {
        Self {
            period,
            poke: None,
            log: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Overwrite `coord` with `value` before `step` runs.
    pub fn poking(mut self, step: u64, coord: Coord<D>, value: C) -> Self {
        self.poke = Some((StepId(step), coord, value));
        self
    }

    pub fn log(&self) -> SteerLog {
        Arc::clone(&self.log)
    }
}

impl<C: Clone + Send, const D: usize> Steerer<C, D> for PokeSteerer<C, D> {
    fn period(&self) -> u64 {
        self.period
    }

    fn steer(&mut self, ctx: &mut SteererContext<'_, C, D>) -> Result<(), StepError> {
        self.log
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push((ctx.event, ctx.step));
        if let Some((step, coord, value)) = &self.poke {
            if ctx.event == SteererEvent::NextStep && ctx.step == *step && ctx.region.contains(coord)
            {
                ctx.grid.set(coord, value.clone());
            }
        }
        Ok(())
    }
}
