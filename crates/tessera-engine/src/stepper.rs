//! The striping stepper.
//!
//! [`StripingStepper`] advances one node's stripe of a distributed grid.
//! Every node of the cluster runs its own stepper over its own transport
//! endpoint; the steppers coordinate purely by message passing.
//!
//! # Per-step protocol
//!
//! 1. Outstanding ghost rows from the previous nano-step are received.
//! 2. Every `rebalance_period` steps, loads are gathered at the root, the
//!    root's balancer decides new workloads, the partition is broadcast,
//!    and rows migrate between nodes by interval overlap.
//! 3. Steerers run on the published buffer.
//! 4. The kernel's nano-steps run, each one software pipelined: inner
//!    ghost rows are computed and sent first, then the interior is
//!    computed while they travel.
//! 5. The step counter advances and writers observe the owned rows.
//!
//! A nano-step reads ghost rows the neighbor computed one nano-step
//! earlier, so a distributed run produces exactly the cells a single node
//! would.

use std::ops::Range;
use std::time::Instant;

use smallvec::SmallVec;
use tessera_comm::{Tag, Transport};
use tessera_core::{CellKernel, Coord, NodeId, StepError, StepId};
use tessera_grid::{update_region, BufferSlot, DisplacedGrid, DoubleBuffer, GridStorage};
use tessera_space::{Region, Topology};
use tracing::{debug, info, trace};

use crate::chronometer::{Chronometer, TimeKind};
use crate::config::{validate_dimensions, ConfigError, Role, StepperConfig};
use crate::ghost::{slab_box, GhostGeometry};
use crate::io::{
    Initializer, Steerer, SteererContext, SteererEvent, Writer, WriterContext, WriterEvent,
};
use crate::message::Message;
use crate::partition::{overlap, validate_workloads, Partition};
use crate::patch::PatchRequests;

// ── StepperState ───────────────────────────────────────────────────

/// Phase a stepper is in.
///
/// Between calls the stepper is [`Idle`](StepperState::Idle). If a step
/// fails, the state records the phase the failure happened in.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum StepperState {
    /// Not inside `step()`.
    Idle,
    /// Gathering loads, deciding the partition, or migrating rows.
    Rebalancing,
    /// Waiting for ghost rows.
    GhostExchanging,
    /// Running the kernel.
    Updating,
}

// ── MigrationReport ────────────────────────────────────────────────

/// Row transfers with one peer each.
pub type Transfers = SmallVec<[(NodeId, Range<usize>); 4]>;

/// Rows a node exchanged with other nodes during its last migration.
/// Rows a node keeps are not listed.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MigrationReport {
    /// Rows handed over, per destination, in node order.
    pub sent: Transfers,
    /// Rows taken over, per source, in node order.
    pub received: Transfers,
}

// ── Ghost bookkeeping ──────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Side {
    Upper,
    Lower,
}

impl Side {
    /// Tag the rows for this side's outer ghosts arrive on. The upper
    /// neighbor sends its inner-lower rows on [`Tag::GhostAlpha`], the
    /// lower neighbor its inner-upper rows on [`Tag::GhostBeta`], so a node
    /// whose neighbors coincide can still tell the two apart.
    fn incoming(self) -> Tag {
        match self {
            Self::Upper => Tag::GhostAlpha,
            Self::Lower => Tag::GhostBeta,
        }
    }

    /// Tag this node's rows facing this side travel on.
    fn outgoing(self) -> Tag {
        match self {
            Self::Upper => Tag::GhostBeta,
            Self::Lower => Tag::GhostAlpha,
        }
    }
}

/// A posted ghost receive and the buffer its rows land in.
#[derive(Clone, Copy, Debug)]
struct PendingGhost {
    side: Side,
    slot: BufferSlot,
}

// ── StripingStepper ────────────────────────────────────────────────

/// Advances one node's stripe of a grid striped across a cluster.
///
/// # Examples
///
/// ```
/// use tessera_comm::{LocalCluster, LocalTransport, Transport};
/// use tessera_core::{CellKernel, Coord, Neighborhood, StepId};
/// use tessera_engine::{Initializer, Message, NoOpBalancer, Role, StepperConfig, StripingStepper};
///
/// struct Decay;
///
/// impl CellKernel<u32, 1> for Decay {
///     fn name(&self) -> &str { "decay" }
///
///     fn update<N: Neighborhood<u32, 1>>(&self, hood: &N, _nano_step: u32) -> u32 {
///         hood.this().saturating_sub(1)
///     }
/// }
///
/// struct Ramp;
///
/// impl Initializer<u32, 1> for Ramp {
///     fn grid_dimensions(&self) -> Coord<1> { Coord([8]) }
///     fn cell(&self, coord: &Coord<1>) -> u32 { coord.x() as u32 }
///     fn edge_cell(&self) -> u32 { 0 }
///     fn max_steps(&self) -> StepId { StepId(3) }
/// }
///
/// let steps = LocalCluster::run(2, |transport: LocalTransport<Message<u32, 1>>| {
///     let role = if transport.rank().is_root() {
///         Role::Root { balancer: Box::new(NoOpBalancer) }
///     } else {
///         Role::Worker
///     };
///     let mut stepper =
///         StripingStepper::new(StepperConfig::default(), role, Decay, Box::new(Ramp), transport)
///             .unwrap();
///     stepper.run().unwrap();
///     stepper.current_step()
/// })
/// .unwrap();
/// assert_eq!(steps, vec![StepId(3), StepId(3)]);
/// ```
pub struct StripingStepper<C, K, T, const D: usize> {
    config: StepperConfig<D>,
    role: Role,
    kernel: K,
    initializer: Box<dyn Initializer<C, D>>,
    transport: T,
    global_dimensions: Coord<D>,
    partition: Partition,
    geometry: GhostGeometry<D>,
    buffers: DoubleBuffer<DisplacedGrid<C, D>>,
    pending: Vec<PendingGhost>,
    upper_requests: PatchRequests,
    lower_requests: PatchRequests,
    step: StepId,
    nano_clock: u64,
    state: StepperState,
    chronometer: Chronometer,
    writers: Vec<Box<dyn Writer<C, D>>>,
    steerers: Vec<Box<dyn Steerer<C, D>>>,
    last_migration: Option<MigrationReport>,
}

impl<C, K, T, const D: usize> StripingStepper<C, K, T, D>
where
    C: Clone + Send,
    K: CellKernel<C, D>,
    T: Transport<Message<C, D>>,
{
    /// Build the stepper for the node `transport` belongs to.
    ///
    /// The grid starts evenly striped across all nodes and is seeded from
    /// `initializer`, which also sets the first step. No communication
    /// happens here.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if `config` is invalid, if `role` does not
    /// fit the node (a balancer must be given to the root and only to the
    /// root), if the kernel declares zero nano-steps, or if the grid is
    /// empty.
    pub fn new(
        config: StepperConfig<D>,
        role: Role,
        kernel: K,
        initializer: Box<dyn Initializer<C, D>>,
        transport: T,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        let node = transport.rank();
        role.validate(node)?;
        if kernel.nano_steps() == 0 {
            return Err(ConfigError::ZeroNanoSteps {
                kernel: kernel.name().to_string(),
            });
        }
        let dims = initializer.grid_dimensions();
        validate_dimensions(&dims)?;

        let partition = Partition::even(dims[D - 1] as usize, transport.size());
        let geometry = GhostGeometry::new(node, &partition, dims, &config.topology);
        let published = seed_stripe(initializer.as_ref(), &geometry, config.topology, dims);
        let staging = published.clone();
        let step = initializer.start_step();

        debug!(
            node = %node,
            kernel = kernel.name(),
            role = ?role,
            rows = ?partition.range(node),
            start = %step,
            "stepper created"
        );

        Ok(Self {
            config,
            role,
            kernel,
            initializer,
            transport,
            global_dimensions: dims,
            partition,
            geometry,
            buffers: DoubleBuffer::new(published, staging),
            pending: Vec::new(),
            upper_requests: PatchRequests::new(),
            lower_requests: PatchRequests::new(),
            step,
            nano_clock: 0,
            state: StepperState::Idle,
            chronometer: Chronometer::new(),
            writers: Vec::new(),
            steerers: Vec::new(),
            last_migration: None,
        })
    }

    // ── Collaborators ──────────────────────────────────────────────

    /// Register a writer.
    ///
    /// Calls the writer's [`prepare`](Writer::prepare), which may use
    /// collectives, so every node must register the same writers in the
    /// same order.
    pub fn add_writer(&mut self, mut writer: Box<dyn Writer<C, D>>) -> Result<(), ConfigError> {
        writer.prepare(&mut self.transport)?;
        let period = writer.period();
        if period == 0 {
            return Err(ConfigError::InvalidWriterPeriod { value: period });
        }
        self.writers.push(writer);
        Ok(())
    }

    /// Register a steerer.
    pub fn add_steerer(&mut self, steerer: Box<dyn Steerer<C, D>>) -> Result<(), ConfigError> {
        let period = steerer.period();
        if period == 0 {
            return Err(ConfigError::InvalidSteererPeriod { value: period });
        }
        self.steerers.push(steerer);
        Ok(())
    }

    // ── Accessors ──────────────────────────────────────────────────

    /// This node.
    pub fn node(&self) -> NodeId {
        self.transport.rank()
    }

    /// The step the next call to [`step`](Self::step) performs.
    pub fn current_step(&self) -> StepId {
        self.step
    }

    /// Nano-steps completed since construction.
    pub fn nano_steps_done(&self) -> u64 {
        self.nano_clock
    }

    /// Current phase.
    pub fn state(&self) -> StepperState {
        self.state
    }

    /// Current partition of the striped axis.
    pub fn partition(&self) -> &Partition {
        &self.partition
    }

    /// Current ghost geometry of this node.
    pub fn geometry(&self) -> &GhostGeometry<D> {
        &self.geometry
    }

    /// Extent of the global grid.
    pub fn global_dimensions(&self) -> Coord<D> {
        self.global_dimensions
    }

    /// Storage holding the latest state of the owned rows.
    pub fn grid(&self) -> &DisplacedGrid<C, D> {
        self.buffers.published()
    }

    /// Time accounting since the last rebalance.
    pub fn chronometer(&self) -> &Chronometer {
        &self.chronometer
    }

    /// Transfers made by the most recent migration, if any happened.
    pub fn last_migration(&self) -> Option<&MigrationReport> {
        self.last_migration.as_ref()
    }

    /// Whether this node decides rebalances.
    pub fn is_root(&self) -> bool {
        self.role.is_root()
    }

    // ── Driving ────────────────────────────────────────────────────

    /// Run from the current step until the initializer's `max_steps`.
    ///
    /// Writers and steerers see an [`Initialized`](WriterEvent::Initialized)
    /// event first and an [`AllDone`](WriterEvent::AllDone) event last.
    pub fn run(&mut self) -> Result<(), StepError> {
        self.steer(SteererEvent::Initialized)?;
        self.write(WriterEvent::Initialized)?;

        let max = self.initializer.max_steps();
        while self.step < max {
            self.step()?;
        }
        self.finish()?;

        self.steer(SteererEvent::AllDone)?;
        self.write(WriterEvent::AllDone)?;
        info!(node = %self.node(), step = %self.step, timings = %self.chronometer, "run finished");
        Ok(())
    }

    /// Perform one step.
    pub fn step(&mut self) -> Result<(), StepError> {
        self.wait_for_ghosts()?;
        if self.step.is_multiple_of(self.config.rebalance_period) {
            self.rebalance()?;
        }
        self.steer(SteererEvent::NextStep)?;

        for k in 0..self.kernel.nano_steps() {
            self.nano_step(k)?;
        }
        self.step = self.step.next();
        self.state = StepperState::Idle;

        self.write(WriterEvent::StepFinished)
    }

    /// Complete the ghost exchange the last nano-step started.
    ///
    /// [`step`](Self::step) returns with its final ghost rows still in
    /// flight. A node that drives the stepper by hand must call this
    /// before dropping it, or neighbors still sending to it see the
    /// link disconnect. [`run`](Self::run) calls it for you. Calling it
    /// again is a no-op.
    pub fn finish(&mut self) -> Result<(), StepError> {
        self.wait_for_ghosts()?;
        self.state = StepperState::Idle;
        Ok(())
    }

    /// One pipelined nano-step.
    fn nano_step(&mut self, k: u32) -> Result<(), StepError> {
        self.wait_for_ghosts()?;

        let target = self.buffers.staging_slot();
        self.post_ghost_receives(target)?;

        self.state = StepperState::Updating;
        let (buffers, geometry, kernel) = (&mut self.buffers, &self.geometry, &self.kernel);
        let mut updated = self.chronometer.time(TimeKind::Compute, || {
            let (old, new) = buffers.split();
            update_region(&geometry.inner_ghosts, old, new, kernel, k)
        });

        self.send_ghosts(target)?;

        let (buffers, geometry, kernel) = (&mut self.buffers, &self.geometry, &self.kernel);
        updated += self.chronometer.time(TimeKind::Compute, || {
            let (old, new) = buffers.split();
            update_region(&geometry.interior, old, new, kernel, k)
        });

        self.buffers.swap();
        self.nano_clock += 1;
        trace!(node = %self.node(), step = %self.step, nano_step = k, updated, "nano-step done");
        Ok(())
    }

    // ── Ghost exchange ─────────────────────────────────────────────

    /// Post receives for both outer ghost slabs into `slot`, requesting
    /// the rows computed at the current nano-step.
    fn post_ghost_receives(&mut self, slot: BufferSlot) -> Result<(), StepError> {
        for side in [Side::Upper, Side::Lower] {
            let Some(neighbor) = self.neighbor(side) else {
                continue;
            };
            self.transport.post_recv(neighbor, side.incoming())?;
            let requests = match side {
                Side::Upper => &mut self.upper_requests,
                Side::Lower => &mut self.lower_requests,
            };
            requests.request(self.nano_clock);
            self.pending.push(PendingGhost { side, slot });
        }
        Ok(())
    }

    /// Send both inner ghost slabs of the buffer in `slot`.
    fn send_ghosts(&mut self, slot: BufferSlot) -> Result<(), StepError> {
        for side in [Side::Upper, Side::Lower] {
            let Some(neighbor) = self.neighbor(side) else {
                continue;
            };
            let rows = match side {
                Side::Upper => &self.geometry.inner_upper,
                Side::Lower => &self.geometry.inner_lower,
            };
            let message = Message::Ghost {
                nano_step: self.nano_clock,
                cells: self.buffers.slot(slot).pack(rows),
            };
            self.transport.send(neighbor, side.outgoing(), message)?;
        }
        Ok(())
    }

    /// Complete every posted ghost receive and unpack the rows into the
    /// buffers they were posted for.
    fn wait_for_ghosts(&mut self) -> Result<(), StepError> {
        if self.pending.is_empty() {
            return Ok(());
        }
        self.state = StepperState::GhostExchanging;
        let started = Instant::now();
        let pending = std::mem::take(&mut self.pending);

        for side in [Side::Upper, Side::Lower] {
            let entries: Vec<&PendingGhost> = pending.iter().filter(|p| p.side == side).collect();
            if entries.is_empty() {
                continue;
            }
            let received = self.transport.wait(side.incoming())?;
            if received.len() != entries.len() {
                return Err(StepError::InvariantViolation {
                    reason: format!(
                        "{} ghost receives completed on {}, {} were posted",
                        received.len(),
                        side.incoming(),
                        entries.len()
                    ),
                });
            }
            for (r, entry) in received.into_iter().zip(entries) {
                let Message::Ghost { nano_step, cells } = r.message else {
                    return Err(StepError::UnexpectedMessage {
                        source: r.source,
                        expected: "ghost rows",
                    });
                };
                let (requests, rows) = match side {
                    Side::Upper => (&mut self.upper_requests, &self.geometry.outer_upper),
                    Side::Lower => (&mut self.lower_requests, &self.geometry.outer_lower),
                };
                requests.accept(r.source, nano_step)?;
                self.buffers.slot_mut(entry.slot).unpack(rows, &cells)?;
            }
        }

        self.chronometer.add(TimeKind::Ghost, started.elapsed());
        Ok(())
    }

    fn neighbor(&self, side: Side) -> Option<NodeId> {
        match side {
            Side::Upper => self.geometry.upper_neighbor,
            Side::Lower => self.geometry.lower_neighbor,
        }
    }

    // ── Rebalancing ────────────────────────────────────────────────

    /// Decide a new partition at the root, broadcast it, and migrate rows
    /// if it changed.
    fn rebalance(&mut self) -> Result<(), StepError> {
        self.state = StepperState::Rebalancing;
        let started = Instant::now();

        let load = self.chronometer.ratio(TimeKind::Compute);
        let gathered = self
            .transport
            .gather(Tag::Balance, Message::Load(load), NodeId::ROOT)?;
        self.chronometer.reset();

        let decided = match (&mut self.role, gathered) {
            (Role::Root { balancer }, Some(reports)) => {
                let loads = reports
                    .into_iter()
                    .enumerate()
                    .map(|(source, m)| match m {
                        Message::Load(load) => Ok(load),
                        _ => Err(StepError::UnexpectedMessage {
                            source: NodeId(source),
                            expected: "load report",
                        }),
                    })
                    .collect::<Result<Vec<f64>, StepError>>()?;
                let old = self.partition.workloads();
                let new = balancer.balance(&old, &loads);
                validate_workloads(&old, &new)?;
                trace!(balancer = balancer.name(), ?loads, ?new, "balancer decided");
                Some(Message::Partition(Partition::from_workloads(&new)))
            }
            _ => None,
        };

        let partition = match self.transport.broadcast(Tag::Balance, decided, NodeId::ROOT)? {
            Message::Partition(p) => p,
            other => {
                debug!(node = %self.node(), got = other.kind(), "expected a partition");
                return Err(StepError::UnexpectedMessage {
                    source: NodeId::ROOT,
                    expected: "partition",
                });
            }
        };
        if partition.nodes() != self.partition.nodes()
            || partition.extent() != self.partition.extent()
        {
            return Err(StepError::InvariantViolation {
                reason: format!(
                    "broadcast partition {:?} does not cover {} rows on {} nodes",
                    partition.boundaries(),
                    self.partition.extent(),
                    self.partition.nodes()
                ),
            });
        }

        if partition != self.partition {
            info!(
                node = %self.node(),
                step = %self.step,
                old = ?self.partition.boundaries(),
                new = ?partition.boundaries(),
                "repartitioning"
            );
            self.migrate(partition)?;
        }

        self.chronometer.add(TimeKind::Balance, started.elapsed());
        Ok(())
    }

    /// Hand rows over to their new owners, then refresh the outer ghosts.
    fn migrate(&mut self, partition: Partition) -> Result<(), StepError> {
        let me = self.node();
        let geometry = GhostGeometry::new(
            me,
            &partition,
            self.global_dimensions,
            &self.config.topology,
        );
        let old_rows = self.partition.range(me);
        let new_rows = partition.range(me);
        let mut report = MigrationReport::default();

        self.buffers.staging_mut().resize(geometry.stripe);

        let mut incoming = Vec::new();
        for n in (0..self.partition.nodes()).map(NodeId) {
            let rows = overlap(&new_rows, &self.partition.range(n));
            if rows.is_empty() {
                continue;
            }
            self.transport.post_recv(n, Tag::Migration)?;
            if n != me {
                report.received.push((n, rows.clone()));
            }
            incoming.push(rows);
        }

        for n in (0..partition.nodes()).map(NodeId) {
            let rows = overlap(&old_rows, &partition.range(n));
            if rows.is_empty() {
                continue;
            }
            let cells = self.buffers.published().pack(&self.rows_region(&rows));
            self.transport.send(n, Tag::Migration, Message::Migration(cells))?;
            if n != me {
                report.sent.push((n, rows));
            }
        }

        let received = self.transport.wait(Tag::Migration)?;
        for (r, rows) in received.into_iter().zip(&incoming) {
            let Message::Migration(cells) = r.message else {
                return Err(StepError::UnexpectedMessage {
                    source: r.source,
                    expected: "migrated rows",
                });
            };
            let region = self.rows_region(rows);
            self.buffers.staging_mut().unpack(&region, &cells)?;
        }

        self.buffers.published_mut().resize(geometry.stripe);
        self.buffers.swap();
        self.partition = partition;
        self.geometry = geometry;

        // The migrated stripe has no outer ghosts yet.
        let published = self.buffers.published_slot();
        self.post_ghost_receives(published)?;
        self.send_ghosts(published)?;
        self.wait_for_ghosts()?;
        self.state = StepperState::Rebalancing;

        debug!(
            node = %me,
            sent = report.sent.len(),
            received = report.received.len(),
            rows = ?new_rows,
            "migration done"
        );
        self.last_migration = Some(report);
        Ok(())
    }

    fn rows_region(&self, rows: &Range<usize>) -> Region<D> {
        Region::from(slab_box(
            &self.global_dimensions,
            rows.start as i32..rows.end as i32,
        ))
    }

    // ── Writers and steerers ───────────────────────────────────────

    fn write(&mut self, event: WriterEvent) -> Result<(), StepError> {
        let started = Instant::now();
        let node = self.transport.rank();
        for writer in &mut self.writers {
            if event == WriterEvent::StepFinished && !self.step.is_multiple_of(writer.period()) {
                continue;
            }
            trace!(node = %node, step = %self.step, ?event, "writer");
            let ctx = WriterContext {
                grid: self.buffers.published(),
                region: &self.geometry.owned,
                global_dimensions: self.global_dimensions,
                step: self.step,
                event,
                node,
                last_call: true,
            };
            writer.write(&ctx, &mut self.transport)?;
        }
        self.chronometer.add(TimeKind::Io, started.elapsed());
        Ok(())
    }

    fn steer(&mut self, event: SteererEvent) -> Result<(), StepError> {
        let started = Instant::now();
        let node = self.transport.rank();
        for steerer in &mut self.steerers {
            if event == SteererEvent::NextStep && !self.step.is_multiple_of(steerer.period()) {
                continue;
            }
            trace!(node = %node, step = %self.step, ?event, "steerer");
            let mut ctx = SteererContext {
                grid: self.buffers.published_mut(),
                region: &self.geometry.with_outer_ghosts,
                global_dimensions: self.global_dimensions,
                step: self.step,
                event,
                node,
                last_call: true,
            };
            steerer.steer(&mut ctx)?;
        }
        self.chronometer.add(TimeKind::Io, started.elapsed());
        Ok(())
    }

    // ── Statistics ─────────────────────────────────────────────────

    /// Collect every node's chronometer at the root, in node order.
    ///
    /// A collective: every node must call it. Returns `None` on nodes
    /// other than the root.
    pub fn gather_statistics(&mut self) -> Result<Option<Vec<Chronometer>>, StepError> {
        let Some(all) = self.transport.gather(
            Tag::Stats,
            Message::Stats(self.chronometer.clone()),
            NodeId::ROOT,
        )?
        else {
            return Ok(None);
        };
        all.into_iter()
            .enumerate()
            .map(|(source, m)| match m {
                Message::Stats(c) => Ok(c),
                _ => Err(StepError::UnexpectedMessage {
                    source: NodeId(source),
                    expected: "statistics",
                }),
            })
            .collect::<Result<Vec<_>, _>>()
            .map(Some)
    }
}

/// Storage for `geometry.stripe` with owned rows and outer ghosts filled
/// from `initializer`.
fn seed_stripe<C: Clone, const D: usize>(
    initializer: &dyn Initializer<C, D>,
    geometry: &GhostGeometry<D>,
    topology: Topology<D>,
    dims: Coord<D>,
) -> DisplacedGrid<C, D> {
    let mut grid = DisplacedGrid::new(geometry.stripe, initializer.edge_cell(), topology, dims);
    for coord in geometry.with_outer_ghosts.coords() {
        if let Some(global) = topology.normalize(&coord, &dims) {
            grid.set(&coord, initializer.cell(&global));
        }
    }
    grid
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::balancer::NoOpBalancer;
    use tessera_comm::LocalTransport;
    use tessera_core::Neighborhood;

    struct Identity;

    impl CellKernel<i64, 1> for Identity {
        fn name(&self) -> &str {
            "identity"
        }

        fn update<N: Neighborhood<i64, 1>>(&self, hood: &N, _nano_step: u32) -> i64 {
            *hood.this()
        }
    }

    struct Stalled;

    impl CellKernel<i64, 1> for Stalled {
        fn name(&self) -> &str {
            "stalled"
        }

        fn nano_steps(&self) -> u32 {
            0
        }

        fn update<N: Neighborhood<i64, 1>>(&self, hood: &N, _nano_step: u32) -> i64 {
            *hood.this()
        }
    }

    struct Line(i32);

    impl Initializer<i64, 1> for Line {
        fn grid_dimensions(&self) -> Coord<1> {
            Coord([self.0])
        }

        fn cell(&self, coord: &Coord<1>) -> i64 {
            coord.x() as i64
        }

        fn edge_cell(&self) -> i64 {
            -1
        }

        fn max_steps(&self) -> StepId {
            StepId(2)
        }
    }

    fn single() -> LocalTransport<Message<i64, 1>> {
        LocalTransport::mesh(1).remove(0)
    }

    fn root() -> Role {
        Role::Root {
            balancer: Box::new(NoOpBalancer),
        }
    }

    #[test]
    fn single_node_owns_everything() {
        let stepper =
            StripingStepper::new(StepperConfig::default(), root(), Identity, Box::new(Line(6)), single())
                .unwrap();
        assert_eq!(stepper.partition().boundaries(), &[0, 6]);
        assert_eq!(stepper.geometry().owned.cell_count(), 6);
        assert_eq!(stepper.state(), StepperState::Idle);
        assert_eq!(stepper.grid().pack(&stepper.geometry().owned), vec![0, 1, 2, 3, 4, 5]);
    }

    #[test]
    fn run_stops_at_max_steps() {
        let mut stepper =
            StripingStepper::new(StepperConfig::default(), root(), Identity, Box::new(Line(4)), single())
                .unwrap();
        stepper.run().unwrap();
        assert_eq!(stepper.current_step(), StepId(2));
        assert_eq!(stepper.nano_steps_done(), 2);
        assert_eq!(stepper.state(), StepperState::Idle);
        assert!(stepper.last_migration().is_none());
    }

    #[test]
    fn zero_nano_steps_is_rejected() {
        match StripingStepper::new(StepperConfig::default(), root(), Stalled, Box::new(Line(4)), single()) {
            Err(ConfigError::ZeroNanoSteps { kernel }) => assert_eq!(kernel, "stalled"),
            Err(other) => panic!("expected ZeroNanoSteps, got {other:?}"),
            Ok(_) => panic!("expected ZeroNanoSteps"),
        }
    }

    #[test]
    fn root_needs_a_balancer() {
        match StripingStepper::new(StepperConfig::default(), Role::Worker, Identity, Box::new(Line(4)), single()) {
            Err(ConfigError::RootWithoutBalancer) => {}
            Err(other) => panic!("expected RootWithoutBalancer, got {other:?}"),
            Ok(_) => panic!("expected RootWithoutBalancer"),
        }
    }

    #[test]
    fn empty_grid_is_rejected() {
        match StripingStepper::new(StepperConfig::default(), root(), Identity, Box::new(Line(0)), single()) {
            Err(ConfigError::EmptyGrid { .. }) => {}
            Err(other) => panic!("expected EmptyGrid, got {other:?}"),
            Ok(_) => panic!("expected EmptyGrid"),
        }
    }

    #[test]
    fn bounded_edges_read_the_edge_cell() {
        let stepper =
            StripingStepper::new(StepperConfig::default(), root(), Identity, Box::new(Line(3)), single())
                .unwrap();
        assert_eq!(*stepper.grid().get(&Coord([-1])), -1);
        assert_eq!(*stepper.grid().get(&Coord([3])), -1);
    }
}
