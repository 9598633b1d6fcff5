//! Two buffers that trade the published and staging roles.

/// Identifies one of the two buffers of a [`DoubleBuffer`] independently
/// of its current role.
///
/// Pending ghost receives remember the slot they target, so a payload
/// that completes after a swap still lands in the buffer it was posted
/// for.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BufferSlot {
    /// The first buffer.
    A,
    /// The second buffer.
    B,
}

impl BufferSlot {
    fn index(self) -> usize {
        match self {
            Self::A => 0,
            Self::B => 1,
        }
    }
}

/// A pair of uniquely owned buffers swapped by index.
///
/// The published buffer holds the state of the previous nano-step and is
/// only read; the staging buffer is written. [`swap`](DoubleBuffer::swap)
/// flips the roles without moving any data.
#[derive(Clone, Debug)]
pub struct DoubleBuffer<G> {
    buffers: [G; 2],
    /// Whether buffer B is currently staging.
    b_is_staging: bool,
}

impl<G> DoubleBuffer<G> {
    /// Start with `published` readable and `staging` writable.
    pub fn new(published: G, staging: G) -> Self {
        Self {
            buffers: [published, staging],
            b_is_staging: true,
        }
    }

    /// Slot currently playing the staging role.
    pub fn staging_slot(&self) -> BufferSlot {
        if self.b_is_staging {
            BufferSlot::B
        } else {
            BufferSlot::A
        }
    }

    /// Slot currently playing the published role.
    pub fn published_slot(&self) -> BufferSlot {
        if self.b_is_staging {
            BufferSlot::A
        } else {
            BufferSlot::B
        }
    }

    /// The buffer holding the previous nano-step.
    pub fn published(&self) -> &G {
        &self.buffers[self.published_slot().index()]
    }

    /// Mutable access to the published buffer, for steering and
    /// migration.
    pub fn published_mut(&mut self) -> &mut G {
        let i = self.published_slot().index();
        &mut self.buffers[i]
    }

    /// The buffer being written.
    pub fn staging(&self) -> &G {
        &self.buffers[self.staging_slot().index()]
    }

    /// Mutable access to the buffer being written.
    pub fn staging_mut(&mut self) -> &mut G {
        let i = self.staging_slot().index();
        &mut self.buffers[i]
    }

    /// Borrow the published buffer for reading and the staging buffer for
    /// writing at the same time.
    pub fn split(&mut self) -> (&G, &mut G) {
        let [a, b] = &mut self.buffers;
        if self.b_is_staging {
            (a, b)
        } else {
            (b, a)
        }
    }

    /// Read a buffer by slot, whatever its current role.
    pub fn slot(&self, slot: BufferSlot) -> &G {
        &self.buffers[slot.index()]
    }

    /// Access a buffer by slot, whatever its current role.
    pub fn slot_mut(&mut self, slot: BufferSlot) -> &mut G {
        &mut self.buffers[slot.index()]
    }

    /// Make the staging buffer the published one and vice versa.
    pub fn swap(&mut self) {
        self.b_is_staging = !self.b_is_staging;
    }
}
