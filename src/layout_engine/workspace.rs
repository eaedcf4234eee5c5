//! A workspace owns four layers, an MRU list, and one state per layout
//! strategy.
//!
//! Every operation checks its precondition before touching anything, so an
//! `Err` means the workspace, the views and the host are as they were.

use tracing::{debug, trace};

use super::error::WorkspaceError;
use super::floating::FloatingLayout;
use super::ops::{LayoutCommand, LayoutOp, OpBatch, apply_ops, batch_capacity};
use super::strategy::{Layout, LayoutStrategy};
use super::tiling::TilingLayout;
use crate::common::collections::VecDeque;
use crate::model::layer::{Layer, LayerKind, LayerPosition};
use crate::model::output::{OutputId, OutputMap};
use crate::model::view::{LayoutType, Placement, RecentView, ViewId, ViewMap};
use crate::sys::geometry::{Point, Rect};
use crate::sys::surface::{SurfaceHost, SurfaceId};

/// Everything outside the workspace an operation may read or mutate.
pub struct Ctx<'a, H> {
    pub views: &'a mut ViewMap,
    pub outputs: &'a OutputMap,
    pub host: &'a mut H,
}

impl<'a, H: SurfaceHost> Ctx<'a, H> {
    pub fn new(views: &'a mut ViewMap, outputs: &'a OutputMap, host: &'a mut H) -> Self {
        Self { views, outputs, host }
    }
}

fn layout_for(kind: LayerKind) -> Option<LayoutType> {
    match kind {
        LayerKind::Tiling => Some(LayoutType::Tiling),
        LayerKind::Floating => Some(LayoutType::Floating),
        LayerKind::Hidden | LayerKind::Fullscreen => None,
    }
}

fn slot(layout: LayoutType) -> usize {
    match layout {
        LayoutType::Tiling => 0,
        LayoutType::Floating => 1,
    }
}

fn surface_of(views: &ViewMap, view: ViewId) -> Result<SurfaceId, WorkspaceError> {
    let v = views.get(view).ok_or(WorkspaceError::UnknownView(view))?;
    if v.recent.is_none() {
        return Err(WorkspaceError::MissingMetadata(view));
    }
    Ok(v.surface)
}

/// Records the view's current geometry so it can be restored later.
fn snapshot(views: &mut ViewMap, view: ViewId) {
    let Some(v) = views.get_mut(view) else { return };
    let geometry = v.geometry();
    if let Some(rv) = v.recent.as_mut() {
        rv.saved_geometry = Some(geometry);
    }
}

fn apply_single<H: SurfaceHost>(
    cx: &mut Ctx<'_, H>,
    view: ViewId,
    rect: Rect,
) -> Result<(), WorkspaceError> {
    let mut batch = OpBatch::with_capacity(2);
    batch.push(LayoutOp::new(view, rect.origin, rect.size));
    apply_ops(&batch, cx.views, cx.host)
}

#[derive(Debug, Clone)]
pub struct Workspace {
    id: usize,
    layers: [Layer; 4],
    /// Most recently focused first.
    recent: VecDeque<ViewId>,
    current_layout: LayoutType,
    layouts: [Layout; 2],
}

impl Workspace {
    pub fn new(id: usize, current_layout: LayoutType, tiling: TilingLayout) -> Self {
        Self {
            id,
            layers: std::array::from_fn(|_| Layer::new()),
            recent: VecDeque::new(),
            current_layout,
            layouts: [tiling.into(), FloatingLayout.into()],
        }
    }

    pub fn id(&self) -> usize { self.id }

    pub fn layer(&self, kind: LayerKind) -> &Layer { &self.layers[kind.index()] }

    fn layer_mut(&mut self, kind: LayerKind) -> &mut Layer { &mut self.layers[kind.index()] }

    pub fn layout(&self, layout: LayoutType) -> &Layout { &self.layouts[slot(layout)] }

    pub fn mru(&self) -> impl Iterator<Item = ViewId> + '_ { self.recent.iter().copied() }

    /// Layout type given to views that enter the workspace without one.
    pub fn current_layout(&self) -> LayoutType { self.current_layout }

    pub fn set_current_layout(&mut self, layout: LayoutType) { self.current_layout = layout; }

    pub fn layout_name(&self) -> &'static str { self.current_layout.name() }

    pub fn is_empty(&self) -> bool { self.layers.iter().all(Layer::is_empty) }

    pub fn is_view_on_workspace(&self, view: ViewId) -> bool {
        self.layers.iter().any(|layer| layer.contains(view))
    }

    /// A workspace is shown while its fullscreen layer holds a stacking slot.
    pub fn is_active(&self) -> bool {
        self.layer(LayerKind::Fullscreen).position() != LayerPosition::Unset
    }

    /// The frontmost view: fullscreen first, then the front layouted layer,
    /// then the other one.
    pub fn top_view(&self) -> Option<ViewId> {
        let (front, back) = if self.layer(LayerKind::Floating).position() == LayerPosition::Front {
            (LayerKind::Floating, LayerKind::Tiling)
        } else {
            (LayerKind::Tiling, LayerKind::Floating)
        };
        [LayerKind::Fullscreen, front, back]
            .into_iter()
            .find_map(|kind| self.layer(kind).top())
    }

    fn placement_of(&self, views: &ViewMap, view: ViewId) -> Result<LayerKind, WorkspaceError> {
        let v = views.get(view).ok_or(WorkspaceError::UnknownView(view))?;
        match v.placement {
            Some(Placement { workspace, layer }) if workspace == self.id => {
                debug_assert!(self.layer(layer).contains(view));
                Ok(layer)
            }
            _ => Err(WorkspaceError::NotOnWorkspace(view, self.id)),
        }
    }

    fn attach(&mut self, views: &mut ViewMap, view: ViewId, kind: LayerKind) {
        self.layer_mut(kind).insert_front(view);
        if let Some(v) = views.get_mut(view) {
            v.placement = Some(Placement { workspace: self.id, layer: kind });
        }
        debug!(?view, workspace = self.id, layer = ?kind, "attached view");
    }

    fn detach(&mut self, views: &mut ViewMap, view: ViewId) {
        let Some(placement) = views.get_mut(view).and_then(|v| v.placement.take()) else {
            return;
        };
        self.layer_mut(placement.layer).remove(view);
        debug!(?view, workspace = self.id, layer = ?placement.layer, "detached view");
    }

    fn arrange<H: SurfaceHost>(
        &mut self,
        cx: &mut Ctx<'_, H>,
        layout: LayoutType,
        target: Option<ViewId>,
        command: LayoutCommand,
    ) -> Result<(), WorkspaceError> {
        let capacity = batch_capacity(
            self.layer(LayerKind::Floating).len(),
            self.layer(LayerKind::Tiling).len(),
            command,
        );
        let mut batch = OpBatch::with_capacity(capacity);
        self.layouts[slot(layout)].compute(command, target, cx.views, &mut batch);
        trace!(?command, ?target, layout = layout.name(), ops = batch.len(), "arranged");
        apply_ops(&batch, cx.views, cx.host)
    }

    fn arrange_all<H: SurfaceHost>(
        &mut self,
        cx: &mut Ctx<'_, H>,
        command: LayoutCommand,
    ) -> Result<(), WorkspaceError> {
        self.arrange(cx, LayoutType::Floating, None, command)?;
        self.arrange(cx, LayoutType::Tiling, None, command)
    }

    /// Leaves the layer the view is in, letting its strategy close the gap.
    fn take_out<H: SurfaceHost>(
        &mut self,
        cx: &mut Ctx<'_, H>,
        view: ViewId,
        kind: LayerKind,
    ) -> Result<(), WorkspaceError> {
        if let Some(layout) = layout_for(kind) {
            self.arrange(cx, layout, Some(view), LayoutCommand::Delete)?;
        }
        self.detach(cx.views, view);
        Ok(())
    }

    /// Puts a detached view back into the layer its layout type names.
    fn reinsert<H: SurfaceHost>(
        &mut self,
        cx: &mut Ctx<'_, H>,
        view: ViewId,
    ) -> Result<(), WorkspaceError> {
        let layout = cx
            .views
            .get(view)
            .and_then(|v| v.recent())
            .map(|rv| rv.layout_type)
            .ok_or(WorkspaceError::MissingMetadata(view))?;
        self.attach(cx.views, view, layout.layer());
        self.arrange(cx, layout, Some(view), LayoutCommand::Add)
    }

    fn restore_snapshot<H: SurfaceHost>(
        cx: &mut Ctx<'_, H>,
        view: ViewId,
        clear: bool,
    ) -> Result<(), WorkspaceError> {
        let saved = cx.views.get(view).and_then(|v| v.recent()).and_then(|rv| rv.saved_geometry);
        let Some(saved) = saved else { return Ok(()) };
        apply_single(cx, view, saved)?;
        if clear && let Some(rv) = cx.views.get_mut(view).and_then(|v| v.recent.as_mut()) {
            rv.saved_geometry = None;
        }
        Ok(())
    }

    pub fn add_view<H: SurfaceHost>(
        &mut self,
        cx: &mut Ctx<'_, H>,
        view: ViewId,
    ) -> Result<(), WorkspaceError> {
        let v = cx.views.get_mut(view).ok_or(WorkspaceError::UnknownView(view))?;
        if let Some(placement) = v.placement {
            return Err(WorkspaceError::AlreadyPlaced(view, placement.workspace));
        }
        let default_layout = self.current_layout;
        let visible = cx.host.desktop_geometry(v.surface);
        let external = v.is_external_origin;
        let layout = v
            .recent
            .get_or_insert_with(|| RecentView::new(default_layout, visible, external))
            .layout_type;

        self.attach(cx.views, view, layout.layer());
        self.arrange(cx, layout, Some(view), LayoutCommand::Add)?;
        self.focus_view(cx, view)
    }

    pub fn remove_view<H: SurfaceHost>(
        &mut self,
        cx: &mut Ctx<'_, H>,
        view: ViewId,
    ) -> Result<(), WorkspaceError> {
        let kind = self.placement_of(cx.views, view)?;
        self.take_out(cx, view, kind)?;
        self.recent.retain(|&v| v != view);
        if let Some(v) = cx.views.get(view) {
            cx.host.schedule_repaint(v.surface);
        }
        Ok(())
    }

    /// Places the outer surface of a floating view at `pos`.
    pub fn move_view<H: SurfaceHost>(
        &mut self,
        cx: &mut Ctx<'_, H>,
        view: ViewId,
        pos: Point,
    ) -> Result<(), WorkspaceError> {
        if self.placement_of(cx.views, view)? != LayerKind::Floating {
            return Err(WorkspaceError::NotFloating(view));
        }
        let v = cx.views.get_mut(view).ok_or(WorkspaceError::UnknownView(view))?;
        if cx.host.is_maximized(v.surface) {
            return Err(WorkspaceError::Maximized(view));
        }
        if cx.host.is_fullscreen(v.surface) {
            return Err(WorkspaceError::Fullscreen(view));
        }
        v.position = pos;
        cx.host.geometry_dirty(v.surface);
        cx.host.schedule_repaint(v.surface);
        Ok(())
    }

    /// Interactive resize. Views outside the layouted layers ignore it.
    pub fn resize_view<H: SurfaceHost>(
        &mut self,
        cx: &mut Ctx<'_, H>,
        view: ViewId,
        dx: i32,
        dy: i32,
    ) -> Result<(), WorkspaceError> {
        let kind = self.placement_of(cx.views, view)?;
        match layout_for(kind) {
            Some(layout) => self.arrange(cx, layout, Some(view), LayoutCommand::Resize { dx, dy }),
            None => Ok(()),
        }
    }

    /// Runs a strategy-specific command such as `Promote` or `Rotate`.
    pub fn run_command<H: SurfaceHost>(
        &mut self,
        cx: &mut Ctx<'_, H>,
        view: ViewId,
        command: LayoutCommand,
    ) -> Result<(), WorkspaceError> {
        let kind = self.placement_of(cx.views, view)?;
        let layout = layout_for(kind).ok_or(WorkspaceError::NotLayouted(view))?;
        self.arrange(cx, layout, Some(view), command)
    }

    pub fn fullscreen_view<H: SurfaceHost>(
        &mut self,
        cx: &mut Ctx<'_, H>,
        view: ViewId,
        fullscreen: bool,
    ) -> Result<(), WorkspaceError> {
        let kind = self.placement_of(cx.views, view)?;
        let surface = surface_of(cx.views, view)?;

        if fullscreen {
            if kind == LayerKind::Fullscreen {
                return Err(WorkspaceError::Fullscreen(view));
            }
            let geometry = cx
                .views
                .get(view)
                .and_then(|v| v.output)
                .and_then(|o| cx.outputs.get(o))
                .map(|o| o.geometry)
                .ok_or(WorkspaceError::NoOutput(view))?;

            if !cx.host.is_maximized(surface) {
                snapshot(cx.views, view);
            }
            cx.host.set_fullscreen(surface, true);
            apply_single(cx, view, geometry)?;
            self.take_out(cx, view, kind)?;
            self.attach(cx.views, view, LayerKind::Fullscreen);
        } else {
            if kind != LayerKind::Fullscreen {
                return Err(WorkspaceError::NotFullscreen(view));
            }
            cx.host.set_fullscreen(surface, false);
            let maximized = cx
                .views
                .get(view)
                .and_then(|v| v.recent())
                .and_then(|rv| rv.maximized_geometry)
                .filter(|_| cx.host.is_maximized(surface));
            // A still maximized view keeps its snapshot for the un-maximize.
            if maximized.is_none() {
                Self::restore_snapshot(cx, view, true)?;
            }
            self.detach(cx.views, view);
            self.reinsert(cx, view)?;
            if let Some(geometry) = maximized {
                apply_single(cx, view, geometry)?;
            }
        }
        cx.host.schedule_repaint(surface);
        Ok(())
    }

    /// `Some(geometry)` maximizes the view to `geometry`; `None` restores
    /// what it had before.
    pub fn maximize_view<H: SurfaceHost>(
        &mut self,
        cx: &mut Ctx<'_, H>,
        view: ViewId,
        target: Option<Rect>,
    ) -> Result<(), WorkspaceError> {
        let kind = self.placement_of(cx.views, view)?;
        let surface = surface_of(cx.views, view)?;

        match target {
            Some(geometry) => {
                if !cx.host.is_maximized(surface) && !cx.host.is_fullscreen(surface) {
                    snapshot(cx.views, view);
                }
                cx.host.set_maximized(surface, true);
                if let Some(rv) = cx.views.get_mut(view).and_then(|v| v.recent.as_mut()) {
                    rv.maximized_geometry = Some(geometry);
                }
                if kind != LayerKind::Fullscreen {
                    apply_single(cx, view, geometry)?;
                }
            }
            None => {
                if !cx.host.is_maximized(surface) {
                    return Err(WorkspaceError::NotMaximized(view));
                }
                cx.host.set_maximized(surface, false);
                if let Some(rv) = cx.views.get_mut(view).and_then(|v| v.recent.as_mut()) {
                    rv.maximized_geometry = None;
                }
                // Leaving fullscreen restores the snapshot later.
                if kind != LayerKind::Fullscreen {
                    Self::restore_snapshot(cx, view, true)?;
                    if kind.is_layouted() {
                        self.take_out(cx, view, kind)?;
                        self.reinsert(cx, view)?;
                    }
                }
            }
        }
        cx.host.schedule_repaint(surface);
        Ok(())
    }

    pub fn minimize_view<H: SurfaceHost>(
        &mut self,
        cx: &mut Ctx<'_, H>,
        view: ViewId,
    ) -> Result<(), WorkspaceError> {
        let kind = self.placement_of(cx.views, view)?;
        if kind == LayerKind::Hidden {
            return Err(WorkspaceError::Hidden(view));
        }
        let surface = surface_of(cx.views, view)?;
        self.take_out(cx, view, kind)?;
        self.attach(cx.views, view, LayerKind::Hidden);
        cx.host.schedule_repaint(surface);
        Ok(())
    }

    /// Brings a minimized view back into its layout layer.
    pub fn restore_view<H: SurfaceHost>(
        &mut self,
        cx: &mut Ctx<'_, H>,
        view: ViewId,
    ) -> Result<(), WorkspaceError> {
        if self.placement_of(cx.views, view)? != LayerKind::Hidden {
            return Err(WorkspaceError::NotHidden(view));
        }
        let surface = surface_of(cx.views, view)?;
        self.detach(cx.views, view);
        self.reinsert(cx, view)?;
        cx.host.schedule_repaint(surface);
        Ok(())
    }

    /// Moves a view between tiling and floating. The MRU list is untouched.
    pub fn switch_layout<H: SurfaceHost>(
        &mut self,
        cx: &mut Ctx<'_, H>,
        view: ViewId,
    ) -> Result<(), WorkspaceError> {
        let kind = self.placement_of(cx.views, view)?;
        if !kind.is_layouted() {
            return Err(WorkspaceError::NotLayouted(view));
        }
        surface_of(cx.views, view)?;
        self.take_out(cx, view, kind)?;
        if let Some(rv) = cx.views.get_mut(view).and_then(|v| v.recent.as_mut()) {
            rv.layout_type = rv.layout_type.toggled();
        }
        self.reinsert(cx, view)
    }

    pub fn focus_view<H: SurfaceHost>(
        &mut self,
        cx: &mut Ctx<'_, H>,
        view: ViewId,
    ) -> Result<(), WorkspaceError> {
        let kind = self.placement_of(cx.views, view)?;
        self.layer_mut(kind).raise(view);
        if self.is_active()
            && let Some(sibling) = kind.sibling()
        {
            self.layer_mut(kind).set_position(LayerPosition::Front);
            self.layer_mut(sibling).set_position(LayerPosition::Back);
        }
        if self.recent.front() != Some(&view) {
            self.recent.retain(|&v| v != view);
            self.recent.push_front(view);
        }
        if let Some(v) = cx.views.get(view) {
            cx.host.schedule_repaint(v.surface);
        }
        Ok(())
    }

    /// Gives the layers their stacking slots and returns the view to focus.
    pub fn activate(&mut self) -> Option<ViewId> {
        self.layer_mut(LayerKind::Tiling).set_position(LayerPosition::Back);
        self.layer_mut(LayerKind::Floating).set_position(LayerPosition::Front);
        self.layer_mut(LayerKind::Fullscreen).set_position(LayerPosition::Fullscreen);
        self.top_view()
    }

    pub fn deactivate(&mut self) {
        for kind in [LayerKind::Floating, LayerKind::Tiling, LayerKind::Fullscreen] {
            self.layer_mut(kind).unset_position();
        }
    }

    pub fn switch(to: &mut Workspace, from: &mut Workspace) -> Option<ViewId> {
        debug!(from = from.id, to = to.id, "switching workspace");
        from.deactivate();
        to.activate()
    }

    pub fn add_output<H: SurfaceHost>(
        &mut self,
        cx: &mut Ctx<'_, H>,
        output: OutputId,
        area: Rect,
    ) -> Result<(), WorkspaceError> {
        for layout in &mut self.layouts {
            layout.add_output(output, area);
        }
        // Tiling views that arrived while there was nowhere to put them.
        let tiling = &self.layouts[slot(LayoutType::Tiling)];
        let waiting: Vec<ViewId> = self
            .layer(LayerKind::Tiling)
            .iter_back_to_front()
            .filter(|&v| !tiling.tracks(v))
            .collect();
        for view in waiting {
            self.arrange(cx, LayoutType::Tiling, Some(view), LayoutCommand::Add)?;
        }
        Ok(())
    }

    pub fn resize_output<H: SurfaceHost>(
        &mut self,
        cx: &mut Ctx<'_, H>,
        output: OutputId,
        area: Rect,
    ) -> Result<(), WorkspaceError> {
        for layout in &mut self.layouts {
            layout.resize_output(output, area);
        }
        self.arrange_all(cx, LayoutCommand::OutputResize(output))
    }

    /// Drops the output's tiling state and retiles its views elsewhere.
    pub fn remove_output<H: SurfaceHost>(
        &mut self,
        cx: &mut Ctx<'_, H>,
        output: OutputId,
    ) -> Result<(), WorkspaceError> {
        let mut orphans = Vec::new();
        for layout in &mut self.layouts {
            orphans.extend(layout.remove_output(output));
        }
        for view in orphans {
            if self.layer(LayerKind::Tiling).contains(view) {
                self.arrange(cx, LayoutType::Tiling, Some(view), LayoutCommand::Add)?;
            }
        }
        Ok(())
    }

    /// Tears the workspace down, destroying every surface still on it.
    pub fn release<H: SurfaceHost>(self, cx: &mut Ctx<'_, H>) {
        for kind in [LayerKind::Floating, LayerKind::Tiling, LayerKind::Hidden, LayerKind::Fullscreen]
        {
            for view in self.layer(kind).iter_back_to_front() {
                if let Some(v) = cx.views.remove(view) {
                    cx.host.destroy_surface(v.surface);
                }
            }
        }
        debug!(workspace = self.id, "released workspace");
    }
}
