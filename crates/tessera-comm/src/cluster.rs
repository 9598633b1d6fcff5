//! One thread per node over a local mesh.

use std::io;
use std::panic;
use std::thread;

use tracing::debug;

use crate::local::LocalTransport;

/// Runs a closure once per node, each on its own named thread, connected
/// by a [`LocalTransport`] mesh.
///
/// # Examples
///
/// ```
/// use tessera_comm::{LocalCluster, LocalTransport, Tag, Transport};
/// use tessera_core::NodeId;
///
/// let sums = LocalCluster::run(3, |mut t: LocalTransport<u64>| {
///     let rank = t.rank().index() as u64;
///     t.gather(Tag::Stats, rank * 10, NodeId::ROOT)
///         .unwrap()
///         .map(|all| all.iter().sum::<u64>())
/// })
/// .unwrap();
/// assert_eq!(sums, vec![Some(30), None, None]);
/// ```
pub struct LocalCluster;

impl LocalCluster {
    /// Run `node` on `size` threads and collect the results in rank order.
    ///
    /// A panic on any node thread is resumed on the caller once every
    /// thread has finished.
    pub fn run<M, R, F>(size: usize, node: F) -> io::Result<Vec<R>>
    where
        M: Send,
        R: Send,
        F: Fn(LocalTransport<M>) -> R + Sync,
    {
        let endpoints = LocalTransport::<M>::mesh(size);
        debug!(size, "starting local cluster");

        thread::scope(|scope| {
            let node = &node;
            let mut handles = Vec::with_capacity(size);
            for (rank, transport) in endpoints.into_iter().enumerate() {
                let handle = thread::Builder::new()
                    .name(format!("tessera-node-{rank}"))
                    .spawn_scoped(scope, move || node(transport))?;
                handles.push(handle);
            }

            let mut results = Vec::with_capacity(size);
            let mut first_panic = None;
            for handle in handles {
                match handle.join() {
                    Ok(r) => results.push(r),
                    Err(payload) => {
                        first_panic.get_or_insert(payload);
                    }
                }
            }
            if let Some(payload) = first_panic {
                panic::resume_unwind(payload);
            }
            Ok(results)
        })
    }
}
