//! Writers and steerers driven by a multi-node run.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use tessera_comm::{LocalCluster, LocalTransport, Transport};
use tessera_core::{Coord, NodeId, StepError, StepId};
use tessera_engine::{
    CollectingWriter, MemoryWriter, Message, NoOpBalancer, Steerer, SteererContext,
    SteererEvent, StepperConfig, StripingStepper, Writer, WriterEvent,
};
use tessera_grid::GridStorage;
use tessera_space::Topology;
use tessera_test_utils::{
    role_for, CountingKernel, FnInitializer, PokeSteerer, ScriptedBalancer, SumKernel,
};

type Link = LocalTransport<Message<i64, 2>>;

#[test]
fn collecting_writer_assembles_the_global_grid_at_the_root() {
    let results = LocalCluster::run(3, |transport: Link| {
        let node = transport.rank();
        let role = role_for(node, || Box::new(ScriptedBalancer::new([vec![1, 4, 4]])));
        let init = FnInitializer::new(Coord([3, 9]), -1, 4, |c: &Coord<2>| {
            i64::from(c[1] * 3 + c[0])
        });
        let mut stepper: StripingStepper<i64, _, _, 2> = StripingStepper::new(
            StepperConfig::default(),
            role,
            CountingKernel { nano_steps: 2 },
            Box::new(init),
            transport,
        )
        .unwrap();

        let delegate = MemoryWriter::<i64, 2>::new(2).unwrap();
        let frames = delegate.frames();
        let delegate: Option<Box<dyn Writer<i64, 2>>> = if node.is_root() {
            Some(Box::new(delegate))
        } else {
            None
        };
        let collecting = CollectingWriter::new(node, delegate).unwrap();
        stepper.add_writer(Box::new(collecting)).unwrap();
        stepper.run().unwrap();

        let recorded = frames.lock().unwrap_or_else(PoisonError::into_inner).clone();
        recorded
    })
    .unwrap();

    assert!(results[1].is_empty());
    assert!(results[2].is_empty());

    let frames = &results[0];
    let seen: Vec<(WriterEvent, StepId)> = frames.iter().map(|f| (f.event, f.step)).collect();
    assert_eq!(
        seen,
        vec![
            (WriterEvent::Initialized, StepId(0)),
            (WriterEvent::StepFinished, StepId(2)),
            (WriterEvent::StepFinished, StepId(4)),
            (WriterEvent::AllDone, StepId(4)),
        ]
    );

    for frame in frames {
        assert_eq!(frame.node, NodeId::ROOT);
        assert_eq!(frame.region.cell_count(), 27);
        let expected: Vec<i64> = (0..27).map(|i| i + 2 * frame.step.0 as i64).collect();
        assert_eq!(frame.cells, expected, "global grid at {:?}", frame.event);
    }
}

/// Run the sum stencil on a bounded 4x9 grid, poking one cell before
/// step 2, and return all owned cells plus the root's steering log.
fn poked_sum(nodes: usize) -> (HashMap<Coord<2>, i64>, Vec<(SteererEvent, StepId)>) {
    let parts = LocalCluster::run(nodes, |transport: Link| {
        let node = transport.rank();
        let role = role_for(node, || Box::new(NoOpBalancer));
        let init = FnInitializer::new(Coord([4, 9]), 1, 4, |c: &Coord<2>| i64::from(c[0] + c[1]));
        let config = StepperConfig {
            rebalance_period: 1,
            topology: Topology::cube(),
        };
        let mut stepper: StripingStepper<i64, _, _, 2> =
            StripingStepper::new(config, role, SumKernel, Box::new(init), transport).unwrap();
        // Row 2 is the last row of node 0 when three nodes share the grid.
        let steerer = PokeSteerer::<i64, 2>::new(2).poking(2, Coord([1, 2]), 1000);
        let log = steerer.log();
        stepper.add_steerer(Box::new(steerer)).unwrap();
        stepper.run().unwrap();

        let owned = stepper.geometry().owned.clone();
        let cells: Vec<(Coord<2>, i64)> =
            owned.coords().map(|c| (c, *stepper.grid().get(&c))).collect();
        let calls = log.lock().unwrap_or_else(PoisonError::into_inner).clone();
        (cells, calls)
    })
    .unwrap();

    let calls = parts[0].1.clone();
    let cells = parts.into_iter().flat_map(|(cells, _)| cells).collect();
    (cells, calls)
}

#[test]
fn steered_edits_propagate_like_a_serial_run() {
    let (serial, calls) = poked_sum(1);
    assert_eq!(
        calls,
        vec![
            (SteererEvent::Initialized, StepId(0)),
            (SteererEvent::NextStep, StepId(0)),
            (SteererEvent::NextStep, StepId(2)),
            (SteererEvent::AllDone, StepId(4)),
        ]
    );

    let (distributed, _) = poked_sum(3);
    assert_eq!(distributed.len(), 36);
    assert_eq!(distributed, serial);
}

#[test]
fn gathered_statistics_cover_every_node() {
    let stats = LocalCluster::run(2, |transport: Link| {
        let role = role_for(transport.rank(), || Box::new(NoOpBalancer));
        let init = FnInitializer::new(Coord([2, 6]), 0, 2, |_: &Coord<2>| 0i64);
        let mut stepper: StripingStepper<i64, _, _, 2> = StripingStepper::new(
            StepperConfig::default(),
            role,
            CountingKernel { nano_steps: 1 },
            Box::new(init),
            transport,
        )
        .unwrap();
        stepper.run().unwrap();
        stepper.gather_statistics().unwrap()
    })
    .unwrap();

    assert_eq!(stats[0].as_ref().map(Vec::len), Some(2));
    assert!(stats[1].is_none());
}

/// Records whether the steering region reaches `target` when the run
/// starts.
struct Reach {
    target: Coord<2>,
    seen: Arc<Mutex<Option<bool>>>,
}

impl Steerer<i64, 2> for Reach {
    fn period(&self) -> u64 {
        1
    }

    fn steer(&mut self, ctx: &mut SteererContext<'_, i64, 2>) -> Result<(), StepError> {
        if ctx.event == SteererEvent::Initialized {
            *self.seen.lock().unwrap_or_else(PoisonError::into_inner) =
                Some(ctx.region.contains(&self.target));
        }
        Ok(())
    }
}

#[test]
fn boundary_cells_are_steerable_on_every_node_holding_a_copy() {
    let reach = LocalCluster::run(3, |transport: Link| {
        let role = role_for(transport.rank(), || Box::new(NoOpBalancer));
        let init = FnInitializer::new(Coord([4, 9]), 0, 1, |_: &Coord<2>| 0i64);
        let mut stepper: StripingStepper<i64, _, _, 2> = StripingStepper::new(
            StepperConfig::default(),
            role,
            SumKernel,
            Box::new(init),
            transport,
        )
        .unwrap();
        // Row 2 is owned by node 0 and is an outer ghost of node 1.
        let seen = Arc::new(Mutex::new(None));
        let steerer = Reach {
            target: Coord([1, 2]),
            seen: Arc::clone(&seen),
        };
        stepper.add_steerer(Box::new(steerer)).unwrap();
        stepper.run().unwrap();
        let out = *seen.lock().unwrap_or_else(PoisonError::into_inner);
        out
    })
    .unwrap();

    assert_eq!(reach, vec![Some(true), Some(true), Some(false)]);
}
