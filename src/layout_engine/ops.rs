//! Geometry operation batches.
//!
//! A layout strategy answers a [`LayoutCommand`] by filling an [`OpBatch`].
//! The batch is sized up front from the views the workspace can arrange, so a
//! strategy that honours the bound never allocates:
//!
//! `capacity = floating views + tiling views + (2 for Add, 1 otherwise)`
//!
//! The batch ends at its length; there is no terminator entry.

use smallvec::SmallVec;
use tracing::{trace, warn};

use super::WorkspaceError;
use crate::model::output::OutputId;
use crate::model::view::{ViewId, ViewMap};
use crate::sys::geometry::{Point, Size};
use crate::sys::surface::SurfaceHost;

/// Batches up to this many entries live on the stack.
pub const INLINE_OPS: usize = 16;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayoutCommand {
    Add,
    Delete,
    /// Interactive resize by a per-pixel delta.
    Resize { dx: i32, dy: i32 },
    /// The usable area of an output changed; retile everything on it.
    OutputResize(OutputId),
    /// Move the view into the first tiling slot of its output.
    Promote,
    /// Flip the orientation of the first split on the view's output.
    Rotate,
}

impl LayoutCommand {
    pub fn is_add(&self) -> bool { matches!(self, LayoutCommand::Add) }
}

pub fn batch_capacity(floating: usize, tiling: usize, command: LayoutCommand) -> usize {
    floating + tiling + if command.is_add() { 2 } else { 1 }
}

/// Place the view's content at `pos` and, if `size` is set in both
/// dimensions, resize it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LayoutOp {
    pub view: ViewId,
    pub pos: Point,
    pub size: Size,
}

impl LayoutOp {
    pub fn new(view: ViewId, pos: Point, size: Size) -> Self { Self { view, pos, size } }

    pub fn move_to(view: ViewId, pos: Point) -> Self { Self::new(view, pos, Size::default()) }
}

#[derive(Debug)]
pub struct OpBatch {
    ops: SmallVec<[LayoutOp; INLINE_OPS]>,
    capacity: usize,
}

impl OpBatch {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            ops: SmallVec::new(),
            capacity,
        }
    }

    pub fn push(&mut self, op: LayoutOp) {
        debug_assert!(
            self.ops.len() < self.capacity,
            "layout batch overflow: capacity {} exceeded by {:?}",
            self.capacity,
            op
        );
        debug_assert!(
            !self.ops.iter().any(|o| o.view == op.view),
            "layout batch touches {:?} twice",
            op.view
        );
        self.ops.push(op);
    }

    pub fn capacity(&self) -> usize { self.capacity }

    pub fn len(&self) -> usize { self.ops.len() }

    pub fn is_empty(&self) -> bool { self.ops.is_empty() }

    pub fn iter(&self) -> impl Iterator<Item = &LayoutOp> { self.ops.iter() }

    pub fn spilled(&self) -> bool { self.ops.spilled() }
}

/// Applies a batch in order. Nothing is touched unless every entry refers to
/// a live view that carries its metadata.
pub fn apply_ops<H: SurfaceHost>(
    ops: &OpBatch,
    views: &mut ViewMap,
    host: &mut H,
) -> Result<(), WorkspaceError> {
    for op in ops.iter() {
        let view = views.get(op.view).ok_or(WorkspaceError::UnknownView(op.view))?;
        if view.recent.is_none() {
            return Err(WorkspaceError::MissingMetadata(op.view));
        }
    }

    for op in ops.iter() {
        let Some(view) = views.get_mut(op.view) else { continue };
        let Some(rv) = view.recent.as_mut() else { continue };

        view.position = op.pos - rv.content_offset();
        if op.size.is_set() {
            host.set_size(view.surface, op.size);
            rv.visible_geometry.size = op.size;
        } else if op.size.is_partial() {
            debug_assert!(false, "layout strategy emitted a partial size {:?}", op);
            warn!(view = ?op.view, size = ?op.size, "ignoring partial size from layout");
        }
        host.geometry_dirty(view.surface);
        trace!(view = ?op.view, pos = ?op.pos, size = ?op.size, "applied layout op");
    }
    Ok(())
}
