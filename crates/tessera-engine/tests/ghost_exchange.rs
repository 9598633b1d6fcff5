//! Ghost rows cross node boundaries one nano-step after they are written.

use std::sync::PoisonError;

use tessera_comm::{LocalCluster, LocalTransport, Transport};
use tessera_core::{Coord, StepId};
use tessera_engine::{
    Frame, MemoryWriter, Message, NoOpBalancer, StepperConfig, StripingStepper, WriterEvent,
};
use tessera_grid::GridStorage;
use tessera_space::Topology;
use tessera_test_utils::{role_for, CountingKernel, FnInitializer, ShiftKernel};

type Link = LocalTransport<Message<i64, 1>>;

/// Shift a single marker down an 8-cell line for `steps` steps on
/// `nodes` nodes, recording every node's owned cells after each step.
fn shift_marker(nodes: usize, steps: u64, topology: Topology<1>) -> Vec<Vec<Frame<i64, 1>>> {
    LocalCluster::run(nodes, |transport: Link| {
        let role = role_for(transport.rank(), || Box::new(NoOpBalancer));
        let init = FnInitializer::new(Coord([8]), 0, steps, |c: &Coord<1>| i64::from(c.x() == 2));
        let config = StepperConfig {
            rebalance_period: 1000,
            topology,
        };
        let mut stepper: StripingStepper<i64, _, _, 1> =
            StripingStepper::new(config, role, ShiftKernel::down(), Box::new(init), transport)
                .unwrap();
        let writer = MemoryWriter::<i64, 1>::new(1).unwrap();
        let frames = writer.frames();
        stepper.add_writer(Box::new(writer)).unwrap();
        stepper.run().unwrap();
        let recorded = frames.lock().unwrap_or_else(PoisonError::into_inner).clone();
        recorded
    })
    .unwrap()
}

fn at(frames: &[Frame<i64, 1>], step: u64, x: i32) -> Option<i64> {
    frames
        .iter()
        .find(|f| f.event == WriterEvent::StepFinished && f.step == StepId(step))
        .and_then(|f| f.get(&Coord([x])).copied())
}

#[test]
fn boundary_update_is_seen_one_nano_step_later() {
    let frames = shift_marker(2, 4, Topology::cube());
    let (upper, lower) = (&frames[0], &frames[1]);

    // Node 0 owns 0..4 and writes the marker into its last row at step 1.
    assert_eq!(at(upper, 1, 3), Some(1));
    // Node 1 reads that row as an outer ghost during the next nano-step.
    assert_eq!(at(lower, 1, 4), Some(0));
    assert_eq!(at(lower, 2, 4), Some(1));
    assert_eq!(at(lower, 3, 5), Some(1));
    assert_eq!(at(lower, 3, 4), Some(0));
}

#[test]
fn distributed_shift_matches_a_single_node() {
    for topology in [Topology::cube(), Topology::torus()] {
        let serial = shift_marker(1, 10, topology);
        let split = shift_marker(2, 10, topology);
        for step in 1..=10 {
            for x in 0..8 {
                let owner = if x < 4 { &split[0] } else { &split[1] };
                assert_eq!(
                    at(owner, step, x),
                    at(&serial[0], step, x),
                    "cell {x} at step {step} under {topology:?}"
                );
            }
        }
    }
}

#[test]
fn periodic_marker_wraps_across_nodes() {
    let frames = shift_marker(2, 6, Topology::torus());
    // 2 -> 3 -> 4 -> 5 -> 6 -> 7 -> 0
    assert_eq!(at(&frames[1], 5, 7), Some(1));
    assert_eq!(at(&frames[0], 6, 0), Some(1));
}

#[test]
fn every_nano_step_runs_on_every_node() {
    let grids = LocalCluster::run(3, |transport: Link| {
        let role = role_for(transport.rank(), || Box::new(NoOpBalancer));
        let init = FnInitializer::new(Coord([9]), 0, 4, |c: &Coord<1>| i64::from(c.x()));
        let mut stepper: StripingStepper<i64, _, _, 1> = StripingStepper::new(
            StepperConfig::default(),
            role,
            CountingKernel { nano_steps: 3 },
            Box::new(init),
            transport,
        )
        .unwrap();
        stepper.run().unwrap();
        assert_eq!(stepper.nano_steps_done(), 12);
        stepper.grid().pack(&stepper.geometry().owned)
    })
    .unwrap();
    let all: Vec<i64> = grids.into_iter().flatten().collect();
    assert_eq!(all, (0..9).map(|x| x + 12).collect::<Vec<i64>>());
}

#[test]
fn resumed_run_starts_at_the_initializer_step() {
    let grids = LocalCluster::run(2, |transport: Link| {
        let role = role_for(transport.rank(), || Box::new(NoOpBalancer));
        let init =
            FnInitializer::new(Coord([6]), 0, 5, |c: &Coord<1>| i64::from(c.x())).starting_at(3);
        let mut stepper: StripingStepper<i64, _, _, 1> = StripingStepper::new(
            StepperConfig::default(),
            role,
            CountingKernel { nano_steps: 1 },
            Box::new(init),
            transport,
        )
        .unwrap();
        assert_eq!(stepper.current_step(), StepId(3));
        stepper.run().unwrap();
        assert_eq!(stepper.current_step(), StepId(5));
        assert_eq!(stepper.nano_steps_done(), 2);
        stepper.grid().pack(&stepper.geometry().owned)
    })
    .unwrap();
    let all: Vec<i64> = grids.into_iter().flatten().collect();
    assert_eq!(all, (0..6).map(|x| x + 2).collect::<Vec<i64>>());
}

#[test]
fn hand_driven_steps_finish_cleanly() {
    let owned = LocalCluster::run(3, |transport: Link| {
        let role = role_for(transport.rank(), || Box::new(NoOpBalancer));
        let init = FnInitializer::new(Coord([9]), 0, 10, |c: &Coord<1>| i64::from(c.x() == 0));
        let config = StepperConfig {
            rebalance_period: 1000,
            topology: Topology::torus(),
        };
        let mut stepper: StripingStepper<i64, _, _, 1> =
            StripingStepper::new(config, role, ShiftKernel::down(), Box::new(init), transport)
                .unwrap();
        for _ in 0..3 {
            stepper.step().unwrap();
        }
        stepper.finish().unwrap();
        stepper.finish().unwrap();
        assert_eq!(stepper.current_step(), StepId(3));
        stepper.grid().pack(&stepper.geometry().owned)
    })
    .unwrap();
    let all: Vec<i64> = owned.into_iter().flatten().collect();
    assert_eq!(all, vec![0, 0, 0, 1, 0, 0, 0, 0, 0]);
}
