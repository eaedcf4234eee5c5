use enum_dispatch::enum_dispatch;

use super::floating::FloatingLayout;
use super::ops::{LayoutCommand, OpBatch};
use super::tiling::TilingLayout;
use crate::model::output::OutputId;
use crate::model::view::{ViewId, ViewMap};
use crate::sys::geometry::Rect;

/// A placement algorithm for one layouted layer of a workspace.
///
/// `compute` answers a command by pushing at most `batch.capacity()` ops and
/// never touches the views directly. The same command against the same state
/// always yields the same batch.
#[enum_dispatch]
pub trait LayoutStrategy {
    fn name(&self) -> &'static str;

    fn compute(
        &mut self,
        command: LayoutCommand,
        target: Option<ViewId>,
        views: &ViewMap,
        batch: &mut OpBatch,
    );

    /// Whether the strategy holds per-view state for `view`.
    fn tracks(&self, view: ViewId) -> bool;

    fn add_output(&mut self, output: OutputId, area: Rect);

    fn resize_output(&mut self, output: OutputId, area: Rect);

    /// Drops the output's sub-state and returns the views it still held.
    fn remove_output(&mut self, output: OutputId) -> Vec<ViewId>;
}

#[enum_dispatch(LayoutStrategy)]
#[derive(Debug, Clone)]
pub enum Layout {
    Tiling(TilingLayout),
    Floating(FloatingLayout),
}
