use tracing::trace;

use super::ops::{LayoutCommand, LayoutOp, OpBatch};
use super::strategy::LayoutStrategy;
use crate::model::output::OutputId;
use crate::model::view::{ViewId, ViewMap};
use crate::sys::geometry::{Rect, Size};

/// Floating views stay where the user put them. Only an interactive resize
/// produces geometry, and only for the view being resized.
#[derive(Debug, Clone, Default)]
pub struct FloatingLayout;

impl LayoutStrategy for FloatingLayout {
    fn name(&self) -> &'static str { "floating" }

    fn compute(
        &mut self,
        command: LayoutCommand,
        target: Option<ViewId>,
        views: &ViewMap,
        batch: &mut OpBatch,
    ) {
        let LayoutCommand::Resize { dx, dy } = command else { return };
        let Some(id) = target else { return };
        let Some(view) = views.get(id) else { return };
        let Some(recent) = view.recent() else { return };

        let size = recent.visible_geometry.size;
        let size = Size::new(
            size.width.saturating_add(dx).max(1),
            size.height.saturating_add(dy).max(1),
        );
        trace!(view = ?id, ?size, "floating resize");
        batch.push(LayoutOp::new(id, view.geometry().origin, size));
    }

    fn tracks(&self, _view: ViewId) -> bool { true }

    fn add_output(&mut self, _output: OutputId, _area: Rect) {}

    fn resize_output(&mut self, _output: OutputId, _area: Rect) {}

    fn remove_output(&mut self, _output: OutputId) -> Vec<ViewId> { Vec::new() }
}
