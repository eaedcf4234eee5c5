//! Tiling strategy.
//!
//! Each output keeps its own ordered slot list and split ratios, cut by the
//! configured partition scheme. A command only retiles the output it touches,
//! so a batch holds at most one op per tiling view.

use indexmap::IndexMap;
use tracing::debug;

use super::ops::{LayoutCommand, LayoutOp, OpBatch};
use super::strategy::LayoutStrategy;
use super::systems::{Dwindle, Partition, PartitionKind, SplitState};
use crate::model::output::OutputId;
use crate::model::view::{ViewId, ViewMap};
use crate::sys::geometry::{Point, Rect};

/// The slot a view left behind, so the same view can take it back.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Vacated {
    view: ViewId,
    slot: usize,
    ratio: Option<f32>,
}

#[derive(Debug, Clone)]
struct OutputTiling {
    area: Rect,
    views: Vec<ViewId>,
    splits: SplitState,
    vacated: Option<Vacated>,
}

impl OutputTiling {
    fn new(area: Rect, split_ratio: f32) -> Self {
        Self {
            area,
            views: Vec::new(),
            splits: SplitState::new(split_ratio),
            vacated: None,
        }
    }

    fn retile(&self, scheme: &PartitionKind, batch: &mut OpBatch) {
        let views = &self.views;
        if self.area.is_degenerate() {
            // Nothing to share; keep sizes and park everything at the origin.
            for &view in views {
                batch.push(LayoutOp::move_to(view, self.area.origin));
            }
            return;
        }
        scheme.partition(self.area, views.len(), &self.splits, &mut |slot, rect| {
            batch.push(LayoutOp::new(views[slot], rect.origin, rect.size))
        });
    }
}

#[derive(Debug, Clone)]
pub struct TilingLayout {
    scheme: PartitionKind,
    split_ratio: f32,
    min_ratio: f32,
    outputs: IndexMap<OutputId, OutputTiling>,
}

impl Default for TilingLayout {
    fn default() -> Self { Self::new(Dwindle.into(), 0.5, 0.1) }
}

impl TilingLayout {
    /// Ratios are forced into a usable range: `min_ratio` into `0.0..=0.5`
    /// and `split_ratio` between `min_ratio` and `1.0 - min_ratio`.
    pub fn new(scheme: PartitionKind, split_ratio: f32, min_ratio: f32) -> Self {
        let min_ratio = if min_ratio.is_nan() { 0.0 } else { min_ratio.clamp(0.0, 0.5) };
        let split_ratio = if split_ratio.is_nan() {
            0.5
        } else {
            split_ratio.clamp(min_ratio, 1.0 - min_ratio)
        };
        Self {
            scheme,
            split_ratio,
            min_ratio,
            outputs: IndexMap::new(),
        }
    }

    pub fn scheme(&self) -> &PartitionKind { &self.scheme }

    /// Slot order of the views tiled on `output`.
    pub fn views_on(&self, output: OutputId) -> &[ViewId] {
        self.outputs.get(&output).map(|o| o.views.as_slice()).unwrap_or_default()
    }

    fn locate(&self, view: ViewId) -> Option<(OutputId, usize)> {
        self.outputs.iter().find_map(|(&id, output)| {
            output.views.iter().position(|&v| v == view).map(|slot| (id, slot))
        })
    }

    fn retile(&self, output: OutputId, batch: &mut OpBatch) {
        if let Some(state) = self.outputs.get(&output) {
            state.retile(&self.scheme, batch);
        }
    }

    fn add(&mut self, view: ViewId, views: &ViewMap, batch: &mut OpBatch) {
        if let Some((output, _)) = self.locate(view) {
            self.retile(output, batch);
            return;
        }
        let preferred = views
            .get(view)
            .and_then(|v| v.output)
            .filter(|o| self.outputs.contains_key(o));
        let Some(output) = preferred.or_else(|| self.outputs.keys().next().copied()) else {
            debug!(?view, "no output to tile on");
            return;
        };
        let Some(state) = self.outputs.get_mut(&output) else { return };

        let (slot, ratio) = match state.vacated {
            Some(vacated) if vacated.view == view => {
                state.vacated = None;
                (vacated.slot.min(state.views.len()), vacated.ratio)
            }
            _ => (state.views.len(), None),
        };
        state.views.insert(slot, view);
        state.splits.insert_slot(slot, state.views.len(), ratio);
        state.retile(&self.scheme, batch);
    }

    fn delete(&mut self, view: ViewId, batch: &mut OpBatch) {
        let Some((output, slot)) = self.locate(view) else { return };
        let Some(state) = self.outputs.get_mut(&output) else { return };
        let count = state.views.len();
        state.views.remove(slot);
        let ratio = state.splits.remove_slot(slot, count);
        state.vacated = Some(Vacated { view, slot, ratio });
        state.retile(&self.scheme, batch);
    }

    fn resize(&mut self, view: ViewId, delta: Point, batch: &mut OpBatch) {
        let Some((output, slot)) = self.locate(view) else { return };
        let Some(state) = self.outputs.get_mut(&output) else { return };
        let count = state.views.len();
        if self.scheme.resize(state.area, count, slot, delta, &mut state.splits, self.min_ratio) {
            state.retile(&self.scheme, batch);
        }
    }

    fn promote(&mut self, view: ViewId, batch: &mut OpBatch) {
        let Some((output, slot)) = self.locate(view) else { return };
        let Some(state) = self.outputs.get_mut(&output) else { return };
        let moved = state.views.remove(slot);
        state.views.insert(0, moved);
        state.retile(&self.scheme, batch);
    }

    fn rotate(&mut self, view: ViewId, batch: &mut OpBatch) {
        let Some((output, _)) = self.locate(view) else { return };
        let Some(state) = self.outputs.get_mut(&output) else { return };
        state.splits.rotated = !state.splits.rotated;
        state.retile(&self.scheme, batch);
    }
}

impl LayoutStrategy for TilingLayout {
    fn name(&self) -> &'static str { "tiling" }

    fn compute(
        &mut self,
        command: LayoutCommand,
        target: Option<ViewId>,
        views: &ViewMap,
        batch: &mut OpBatch,
    ) {
        match (command, target) {
            (LayoutCommand::Add, Some(view)) => self.add(view, views, batch),
            (LayoutCommand::Add, None) => {
                for state in self.outputs.values() {
                    state.retile(&self.scheme, batch);
                }
            }
            (LayoutCommand::Delete, Some(view)) => self.delete(view, batch),
            (LayoutCommand::Resize { dx, dy }, Some(view)) => {
                self.resize(view, Point::new(dx, dy), batch)
            }
            (LayoutCommand::OutputResize(output), _) => self.retile(output, batch),
            (LayoutCommand::Promote, Some(view)) => self.promote(view, batch),
            (LayoutCommand::Rotate, Some(view)) => self.rotate(view, batch),
            _ => {}
        }
    }

    fn tracks(&self, view: ViewId) -> bool { self.locate(view).is_some() }

    fn add_output(&mut self, output: OutputId, area: Rect) {
        let split_ratio = self.split_ratio;
        self.outputs
            .entry(output)
            .and_modify(|state| state.area = area)
            .or_insert_with(|| OutputTiling::new(area, split_ratio));
    }

    fn resize_output(&mut self, output: OutputId, area: Rect) { self.add_output(output, area) }

    fn remove_output(&mut self, output: OutputId) -> Vec<ViewId> {
        self.outputs.shift_remove(&output).map(|state| state.views).unwrap_or_default()
    }
}
