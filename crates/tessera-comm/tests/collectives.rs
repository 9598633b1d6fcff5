//! Collectives across real node threads.

use tessera_comm::{LocalCluster, LocalTransport, Tag, Transport};
use tessera_core::{CommError, NodeId};

#[test]
fn gather_collects_in_rank_order_at_any_root() {
    let results = LocalCluster::run(4, |mut t: LocalTransport<usize>| {
        let rank = t.rank().index();
        t.gather(Tag::Balance, rank * rank, NodeId(2)).unwrap()
    })
    .unwrap();

    assert_eq!(results[2], Some(vec![0, 1, 4, 9]));
    for (rank, r) in results.iter().enumerate() {
        if rank != 2 {
            assert_eq!(*r, None);
        }
    }
}

#[test]
fn broadcast_reaches_every_node() {
    let results = LocalCluster::run(3, |mut t: LocalTransport<Vec<usize>>| {
        let value = t.rank().is_root().then(|| vec![0, 5, 9, 12]);
        t.broadcast(Tag::Balance, value, NodeId::ROOT).unwrap()
    })
    .unwrap();

    assert!(results.iter().all(|v| v == &vec![0, 5, 9, 12]));
}

#[test]
fn gather_then_broadcast_round_trip() {
    // The load-balancing handshake: everyone reports, the root decides,
    // everyone learns the decision.
    let results = LocalCluster::run(3, |mut t: LocalTransport<f64>| {
        let load = (t.rank().index() + 1) as f64;
        let all = t.gather(Tag::Balance, load, NodeId::ROOT).unwrap();
        let decision = all.map(|loads| loads.iter().sum::<f64>());
        t.broadcast(Tag::Balance, decision, NodeId::ROOT).unwrap()
    })
    .unwrap();

    assert_eq!(results, vec![6.0, 6.0, 6.0]);
}

#[test]
fn root_without_value_cannot_broadcast() {
    let results = LocalCluster::run(1, |mut t: LocalTransport<u8>| {
        t.broadcast(Tag::Balance, None, NodeId::ROOT)
    })
    .unwrap();

    match &results[0] {
        Err(CommError::RootMismatch { .. }) => {}
        other => panic!("expected RootMismatch, got {other:?}"),
    }
}

#[test]
fn ring_exchange_uses_both_ghost_tags() {
    let results = LocalCluster::run(3, |mut t: LocalTransport<usize>| {
        let n = t.size();
        let me = t.rank().index();
        let upper = NodeId((me + n - 1) % n);
        let lower = NodeId((me + 1) % n);

        t.post_recv(upper, Tag::GhostAlpha).unwrap();
        t.post_recv(lower, Tag::GhostBeta).unwrap();
        t.send(upper, Tag::GhostBeta, me).unwrap();
        t.send(lower, Tag::GhostAlpha, me).unwrap();

        let from_upper = t.wait(Tag::GhostAlpha).unwrap()[0].message;
        let from_lower = t.wait(Tag::GhostBeta).unwrap()[0].message;
        (from_upper, from_lower)
    })
    .unwrap();

    assert_eq!(results, vec![(2, 1), (0, 2), (1, 0)]);
}
