//! The transport contract.

use tessera_core::{CommError, NodeId};

use crate::tag::Tag;

/// A message delivered by [`Transport::wait`].
#[derive(Clone, Debug, PartialEq)]
pub struct Received<M> {
    /// Node that sent it.
    pub source: NodeId,
    /// Tag it travelled on.
    pub tag: Tag,
    /// The payload.
    pub message: M,
}

/// Point-to-point messaging between the nodes of a cluster.
///
/// Sends never block. Receives are posted with
/// [`post_recv`](Transport::post_recv) and complete together on the next
/// [`wait`](Transport::wait) for their tag. Every error is fatal: the
/// transport is assumed reliable, so a failure means the cluster is
/// broken.
pub trait Transport<M> {
    /// This node's identifier.
    fn rank(&self) -> NodeId;

    /// Number of nodes in the cluster.
    fn size(&self) -> usize;

    /// Send `message` to `dest` on `tag`. Sending to oneself is allowed.
    fn send(&mut self, dest: NodeId, tag: Tag, message: M) -> Result<(), CommError>;

    /// Post a receive for the next message from `source` on `tag`.
    fn post_recv(&mut self, source: NodeId, tag: Tag) -> Result<(), CommError>;

    /// Block until every receive posted on `tag` has completed.
    ///
    /// Returns the messages in the order their receives were posted. Receives
    /// on other tags stay pending.
    fn wait(&mut self, tag: Tag) -> Result<Vec<Received<M>>, CommError>;

    /// Number of receives posted on `tag` that have not been waited for.
    fn pending(&self, tag: Tag) -> usize;

    /// Collect one value from every node at `root`.
    ///
    /// Returns the values in node order on the root and `None` elsewhere.
    /// Every node of the cluster must call this with the same `root` and
    /// `tag`.
    fn gather(&mut self, tag: Tag, value: M, root: NodeId) -> Result<Option<Vec<M>>, CommError> {
        check_node(root, self.size())?;
        self.send(root, tag, value)?;
        if self.rank() != root {
            return Ok(None);
        }
        for source in 0..self.size() {
            self.post_recv(NodeId(source), tag)?;
        }
        let values = self.wait(tag)?;
        Ok(Some(values.into_iter().map(|r| r.message).collect()))
    }

    /// Distribute the root's value to every node.
    ///
    /// The root passes `Some(value)`; all other nodes pass `None` and
    /// receive the root's value. A root without a value is rejected with
    /// [`CommError::RootMismatch`].
    fn broadcast(&mut self, tag: Tag, value: Option<M>, root: NodeId) -> Result<M, CommError>
    where
        M: Clone,
    {
        check_node(root, self.size())?;
        let rank = self.rank();
        if rank == root {
            let value = value.ok_or(CommError::RootMismatch { node: rank, root })?;
            for dest in (0..self.size()).map(NodeId).filter(|&n| n != root) {
                self.send(dest, tag, value.clone())?;
            }
            return Ok(value);
        }

        self.post_recv(root, tag)?;
        let mut received = self.wait(tag)?;
        match received.pop() {
            Some(r) => Ok(r.message),
            None => Err(CommError::Disconnected { node: root }),
        }
    }
}

/// Reject node identifiers outside a cluster of `size` nodes.
pub(crate) fn check_node(node: NodeId, size: usize) -> Result<(), CommError> {
    if node.index() < size {
        Ok(())
    } else {
        Err(CommError::UnknownNode { node, size })
    }
}
