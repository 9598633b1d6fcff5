//! Fatal configurations and broken collaborators.

use tessera_comm::{LocalCluster, LocalTransport, Transport};
use tessera_core::{CommError, Coord, NodeId, StepError};
use tessera_engine::{
    CollectingWriter, ConfigError, Initializer, MemoryWriter, Message, NoOpBalancer, Role,
    StepperConfig, StepperState, StripingStepper, Writer, WriterContext,
};
use tessera_test_utils::{role_for, BrokenBalancer, FnInitializer, IdentityKernel, PokeSteerer};

type Link = LocalTransport<Message<i64, 1>>;
type Stepper = StripingStepper<i64, IdentityKernel, Link, 1>;

fn line(rows: i32) -> Box<dyn Initializer<i64, 1>> {
    Box::new(FnInitializer::new(Coord([rows]), 0, 3, |c: &Coord<1>| i64::from(c.x())))
}

fn endpoint(rank: usize, size: usize) -> Link {
    LocalTransport::mesh(size).remove(rank)
}

#[test]
fn balancer_that_changes_the_total_is_fatal() {
    let results = LocalCluster::run(3, |transport: Link| {
        let role = role_for(transport.rank(), || Box::new(BrokenBalancer));
        let mut stepper: Stepper =
            StripingStepper::new(StepperConfig::default(), role, IdentityKernel, line(9), transport)
                .unwrap();
        let result = stepper.step();
        (result, stepper.state())
    })
    .unwrap();

    match &results[0].0 {
        Err(StepError::InvariantViolation { reason }) => {
            assert!(reason.contains("total workload"), "{reason}");
        }
        other => panic!("expected InvariantViolation, got {other:?}"),
    }
    assert_eq!(results[0].1, StepperState::Rebalancing);

    for (result, _) in &results[1..] {
        match result {
            Err(StepError::Comm(CommError::Disconnected { node })) => {
                assert_eq!(*node, NodeId::ROOT)
            }
            other => panic!("expected Disconnected, got {other:?}"),
        }
    }
}

#[test]
fn worker_with_a_balancer_is_rejected() {
    let role = Role::Root {
        balancer: Box::new(NoOpBalancer),
    };
    let result: Result<Stepper, _> =
        StripingStepper::new(StepperConfig::default(), role, IdentityKernel, line(4), endpoint(1, 2));
    match result {
        Err(ConfigError::WorkerWithBalancer { node }) => assert_eq!(node, NodeId(1)),
        Err(other) => panic!("expected WorkerWithBalancer, got {other:?}"),
        Ok(_) => panic!("expected WorkerWithBalancer"),
    }
}

#[test]
fn zero_rebalance_period_is_rejected() {
    let config = StepperConfig {
        rebalance_period: 0,
        ..Default::default()
    };
    let role = Role::Root {
        balancer: Box::new(NoOpBalancer),
    };
    let result: Result<Stepper, _> =
        StripingStepper::new(config, role, IdentityKernel, line(4), endpoint(0, 1));
    match result {
        Err(ConfigError::InvalidRebalancePeriod { value: 0 }) => {}
        Err(other) => panic!("expected InvalidRebalancePeriod, got {other:?}"),
        Ok(_) => panic!("expected InvalidRebalancePeriod"),
    }
}

#[test]
fn zero_period_collaborators_are_rejected() {
    let role = Role::Root {
        balancer: Box::new(NoOpBalancer),
    };
    let mut stepper: Stepper =
        StripingStepper::new(StepperConfig::default(), role, IdentityKernel, line(4), endpoint(0, 1))
            .unwrap();

    match stepper.add_steerer(Box::new(PokeSteerer::<i64, 1>::new(0))) {
        Err(ConfigError::InvalidSteererPeriod { value: 0 }) => {}
        other => panic!("expected InvalidSteererPeriod, got {other:?}"),
    }

    struct Never;

    impl Writer<i64, 1> for Never {
        fn period(&self) -> u64 {
            0
        }

        fn write(
            &mut self,
            _ctx: &WriterContext<'_, i64, 1>,
            _transport: &mut dyn Transport<Message<i64, 1>>,
        ) -> Result<(), StepError> {
            Ok(())
        }
    }

    match stepper.add_writer(Box::new(Never)) {
        Err(ConfigError::InvalidWriterPeriod { value: 0 }) => {}
        other => panic!("expected InvalidWriterPeriod, got {other:?}"),
    }
}

#[test]
fn collecting_writer_delegate_belongs_on_the_root() {
    let delegate: Box<dyn Writer<i64, 1>> = Box::new(MemoryWriter::<i64, 1>::new(1).unwrap());
    match CollectingWriter::new(NodeId(2), Some(delegate)) {
        Err(ConfigError::WorkerWithDelegate { node }) => assert_eq!(node, NodeId(2)),
        Err(other) => panic!("expected WorkerWithDelegate, got {other:?}"),
        Ok(_) => panic!("expected WorkerWithDelegate"),
    }
}
