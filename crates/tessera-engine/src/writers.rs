//! Reference writers.

use std::sync::{Arc, Mutex, PoisonError};

use tessera_comm::{Tag, Transport};
use tessera_core::{Coord, NodeId, StepError, StepId};
use tessera_grid::{DisplacedGrid, GridStorage};
use tessera_space::{CoordBox, Region};
use tracing::debug;

use crate::config::ConfigError;
use crate::io::{Writer, WriterContext, WriterEvent};
use crate::message::Message;

// ── MemoryWriter ───────────────────────────────────────────────────

/// One observation recorded by a [`MemoryWriter`].
#[derive(Clone, Debug, PartialEq)]
pub struct Frame<C, const D: usize> {
    /// Step the observation was made at.
    pub step: StepId,
    /// Why the writer was called.
    pub event: WriterEvent,
    /// Node that made the observation.
    pub node: NodeId,
    /// Cells observed.
    pub region: Region<D>,
    /// Their values, in the region's streak order.
    pub cells: Vec<C>,
}

impl<C, const D: usize> Frame<C, D> {
    /// Value recorded for `coord`, if it was observed.
    pub fn get(&self, coord: &Coord<D>) -> Option<&C> {
        let pos = self.region.coords().position(|c| c == *coord)?;
        self.cells.get(pos)
    }
}

/// Shared handle to the frames a [`MemoryWriter`] records.
pub type FrameLog<C, const D: usize> = Arc<Mutex<Vec<Frame<C, D>>>>;

/// Records every observation in memory.
pub struct MemoryWriter<C, const D: usize> {
    period: u64,
    frames: FrameLog<C, D>,
}

impl<C, const D: usize> MemoryWriter<C, D> {
    /// Record every `period` steps.
    pub fn new(period: u64) -> Result<Self, ConfigError> {
        if period == 0 {
            return Err(ConfigError::InvalidWriterPeriod { value: period });
        }
        Ok(Self {
            period,
            frames: Arc::new(Mutex::new(Vec::new())),
        })
    }

    /// Handle for reading the recorded frames after the writer has been
    /// handed to a stepper.
    pub fn frames(&self) -> FrameLog<C, D> {
        Arc::clone(&self.frames)
    }
}

impl<C: Clone + Send, const D: usize> Writer<C, D> for MemoryWriter<C, D> {
    fn period(&self) -> u64 {
        self.period
    }

    fn write(
        &mut self,
        ctx: &WriterContext<'_, C, D>,
        _transport: &mut dyn Transport<Message<C, D>>,
    ) -> Result<(), StepError> {
        let frame = Frame {
            step: ctx.step,
            event: ctx.event,
            node: ctx.node,
            region: ctx.region.clone(),
            cells: ctx.grid.pack(ctx.region),
        };
        self.frames
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(frame);
        Ok(())
    }
}

// ── CollectingWriter ───────────────────────────────────────────────

/// Assembles the global grid at the root and hands it to a delegate.
///
/// Every node registers a `CollectingWriter`; only the root's carries the
/// delegate. On each call every node ships its owned cells to the root,
/// which stitches them into one grid covering the whole simulation and
/// calls the delegate with it. The delegate's period is broadcast from
/// the root when the writer is registered, so all nodes gather on the
/// same steps.
pub struct CollectingWriter<C, const D: usize> {
    delegate: Option<Box<dyn Writer<C, D>>>,
    period: u64,
}

impl<C, const D: usize> CollectingWriter<C, D> {
    /// Create the collecting writer for `node`. The delegate must be
    /// present on the root and absent everywhere else.
    pub fn new(node: NodeId, delegate: Option<Box<dyn Writer<C, D>>>) -> Result<Self, ConfigError> {
        match (&delegate, node.is_root()) {
            (None, true) => return Err(ConfigError::RootWithoutDelegate),
            (Some(_), false) => return Err(ConfigError::WorkerWithDelegate { node }),
            _ => {}
        }
        let period = delegate.as_ref().map_or(1, |d| d.period());
        if period == 0 {
            return Err(ConfigError::InvalidWriterPeriod { value: period });
        }
        Ok(Self { delegate, period })
    }
}

impl<C, const D: usize> Writer<C, D> for CollectingWriter<C, D>
where
    C: Clone + Send,
{
    fn period(&self) -> u64 {
        self.period
    }

    fn prepare(&mut self, transport: &mut dyn Transport<Message<C, D>>) -> Result<(), ConfigError> {
        if let Some(delegate) = self.delegate.as_mut() {
            delegate.prepare(transport)?;
        }
        let decided = self
            .delegate
            .as_ref()
            .map(|d| Message::WriterPeriod(d.period()));
        match transport.broadcast(Tag::Collect, decided, NodeId::ROOT)? {
            Message::WriterPeriod(period) => {
                self.period = period;
                Ok(())
            }
            _ => Err(ConfigError::Step(StepError::UnexpectedMessage {
                source: NodeId::ROOT,
                expected: "writer period",
            })),
        }
    }

    fn write(
        &mut self,
        ctx: &WriterContext<'_, C, D>,
        transport: &mut dyn Transport<Message<C, D>>,
    ) -> Result<(), StepError> {
        let part = Message::Owned {
            region: ctx.region.clone(),
            cells: ctx.grid.pack(ctx.region),
        };
        let gathered = transport.gather(Tag::Collect, part, NodeId::ROOT)?;
        let (Some(parts), Some(delegate)) = (gathered, self.delegate.as_mut()) else {
            return Ok(());
        };

        let dims = ctx.global_dimensions;
        let whole = CoordBox::new(Coord::origin(), dims);
        let mut global = DisplacedGrid::new(whole, ctx.grid.edge().clone(), *ctx.grid.topology(), dims);
        for (source, part) in parts.into_iter().enumerate() {
            match part {
                Message::Owned { region, cells } => global.unpack(&region, &cells)?,
                _ => {
                    return Err(StepError::UnexpectedMessage {
                        source: NodeId(source),
                        expected: "owned region",
                    })
                }
            }
        }
        debug!(step = %ctx.step, event = ?ctx.event, "collected global grid");

        let region = Region::from(whole);
        let assembled = WriterContext {
            grid: &global,
            region: &region,
            global_dimensions: dims,
            step: ctx.step,
            event: ctx.event,
            node: ctx.node,
            last_call: true,
        };
        delegate.write(&assembled, transport)
    }
}
