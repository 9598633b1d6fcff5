//! In-process transport over crossbeam channels.

use std::collections::VecDeque;

use crossbeam_channel::{Receiver, Sender};
use indexmap::IndexMap;
use tessera_core::{CommError, NodeId};
use tracing::trace;

use crate::tag::Tag;
use crate::transport::{check_node, Received, Transport};

/// What travels over a link: the tag and the payload. The source is
/// implied by the link.
struct Envelope<M> {
    tag: Tag,
    message: M,
}

/// One endpoint of a fully connected in-process mesh.
///
/// Every ordered pair of nodes, including a node and itself, gets its own
/// unbounded channel. Messages that arrive for a tag nobody is waiting on
/// yet are parked in a per-`(source, tag)` mailbox, which keeps delivery
/// FIFO per pair and tag no matter how tags interleave on the link.
///
/// # Examples
///
/// ```
/// use tessera_comm::{LocalTransport, Tag, Transport};
/// use tessera_core::NodeId;
///
/// let mut nodes = LocalTransport::<u32>::mesh(2);
/// let mut b = nodes.pop().unwrap();
/// let mut a = nodes.pop().unwrap();
///
/// a.send(NodeId(1), Tag::Migration, 7).unwrap();
/// b.post_recv(NodeId(0), Tag::Migration).unwrap();
/// let got = b.wait(Tag::Migration).unwrap();
/// assert_eq!(got[0].message, 7);
/// assert_eq!(got[0].source, NodeId(0));
/// ```
pub struct LocalTransport<M> {
    rank: NodeId,
    /// `outgoing[dest]` carries messages from this node to `dest`.
    outgoing: Vec<Sender<Envelope<M>>>,
    /// `incoming[source]` carries messages from `source` to this node.
    incoming: Vec<Receiver<Envelope<M>>>,
    /// Messages that arrived before a matching receive was waited on.
    mailbox: IndexMap<(NodeId, Tag), VecDeque<M>>,
    /// Posted receives, in post order.
    posted: Vec<(NodeId, Tag)>,
}

impl<M> LocalTransport<M> {
    /// Build a fully connected mesh of `size` endpoints. Endpoint `i` has
    /// rank `i`.
    pub fn mesh(size: usize) -> Vec<Self> {
        let mut outgoing: Vec<Vec<Sender<Envelope<M>>>> =
            (0..size).map(|_| Vec::with_capacity(size)).collect();
        let mut incoming: Vec<Vec<Receiver<Envelope<M>>>> =
            (0..size).map(|_| Vec::with_capacity(size)).collect();

        for source in 0..size {
            for dest in 0..size {
                let (tx, rx) = crossbeam_channel::unbounded();
                outgoing[source].push(tx);
                incoming[dest].push(rx);
            }
        }
        // incoming[dest] was filled in source order, so incoming[dest][source]
        // is the link from source to dest.

        outgoing
            .into_iter()
            .zip(incoming)
            .enumerate()
            .map(|(rank, (outgoing, incoming))| Self {
                rank: NodeId(rank),
                outgoing,
                incoming,
                mailbox: IndexMap::new(),
                posted: Vec::new(),
            })
            .collect()
    }

    /// Take the next message from `source` on `tag`, blocking on the link
    /// and parking messages for other tags until one arrives.
    fn receive(&mut self, source: NodeId, tag: Tag) -> Result<M, CommError> {
        if let Some(message) = self
            .mailbox
            .get_mut(&(source, tag))
            .and_then(VecDeque::pop_front)
        {
            return Ok(message);
        }

        let link = &self.incoming[source.index()];
        loop {
            let envelope = link
                .recv()
                .map_err(|_| CommError::Disconnected { node: source })?;
            if envelope.tag == tag {
                return Ok(envelope.message);
            }
            self.mailbox
                .entry((source, envelope.tag))
                .or_default()
                .push_back(envelope.message);
        }
    }
}

impl<M> Transport<M> for LocalTransport<M> {
    fn rank(&self) -> NodeId {
        self.rank
    }

    fn size(&self) -> usize {
        self.outgoing.len()
    }

    fn send(&mut self, dest: NodeId, tag: Tag, message: M) -> Result<(), CommError> {
        check_node(dest, self.size())?;
        trace!(from = %self.rank, to = %dest, %tag, "send");
        self.outgoing[dest.index()]
            .send(Envelope { tag, message })
            .map_err(|_| CommError::Disconnected { node: dest })
    }

    fn post_recv(&mut self, source: NodeId, tag: Tag) -> Result<(), CommError> {
        check_node(source, self.size())?;
        self.posted.push((source, tag));
        Ok(())
    }

    fn wait(&mut self, tag: Tag) -> Result<Vec<Received<M>>, CommError> {
        let (matching, rest): (Vec<_>, Vec<_>) =
            self.posted.drain(..).partition(|&(_, t)| t == tag);
        self.posted = rest;

        let mut out = Vec::with_capacity(matching.len());
        for (source, tag) in matching {
            let message = self.receive(source, tag)?;
            out.push(Received {
                source,
                tag,
                message,
            });
        }
        trace!(node = %self.rank, %tag, completed = out.len(), "wait");
        Ok(out)
    }

    fn pending(&self, tag: Tag) -> usize {
        self.posted.iter().filter(|&&(_, t)| t == tag).count()
    }
}
