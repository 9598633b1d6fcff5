//! Message passing between Tessera nodes.
//!
//! Nodes exchange tagged messages through a [`Transport`]: asynchronous
//! sends, posted receives that complete on a blocking
//! [`wait`](Transport::wait) per tag, and the two collectives the stepper
//! needs (gather to a root, broadcast from a root).
//!
//! [`LocalTransport`] connects the nodes of one process over crossbeam
//! channels; [`LocalCluster`] runs one thread per node on top of it.
//!
//! # Delivery guarantees
//!
//! Delivery is reliable and FIFO per `(source, destination)` pair and
//! tag. Receives posted for the same source and tag complete in the order
//! they were posted.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod cluster;
pub mod local;
pub mod tag;
pub mod transport;

pub use cluster::LocalCluster;
pub use local::LocalTransport;
pub use tag::Tag;
pub use transport::{Received, Transport};
