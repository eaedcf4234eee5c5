//! The shell-side owner of views, outputs and workspaces.
//!
//! [`Desktop`] is the one place that holds everything a workspace operation
//! needs. Entry points resolve which workspace a view lives on and hand the
//! workspace a [`Ctx`] borrowed from the desktop.

use indexmap::IndexSet;
use tracing::{debug, instrument, warn};

use crate::common::config::Config;
use crate::layout_engine::{Ctx, LayoutCommand, Workspace, WorkspaceError};
use crate::model::layer::LayerKind;
use crate::model::output::{Output, OutputId, OutputMap, PanelPosition};
use crate::model::view::{View, ViewId, ViewMap};
use crate::sys::geometry::{Point, Rect};
use crate::sys::surface::{SurfaceHost, SurfaceId};

pub mod idle;
pub mod script;

fn pair_mut<T>(items: &mut [T], a: usize, b: usize) -> (&mut T, &mut T) {
    debug_assert_ne!(a, b);
    if a < b {
        let (left, right) = items.split_at_mut(b);
        (&mut left[a], &mut right[0])
    } else {
        let (left, right) = items.split_at_mut(a);
        (&mut right[0], &mut left[b])
    }
}

pub struct Desktop<H> {
    config: Config,
    views: ViewMap,
    outputs: OutputMap,
    workspaces: Vec<Workspace>,
    active: usize,
    /// Outputs whose usable area changed since the last flush.
    pending_areas: IndexSet<OutputId>,
    /// A flush is queued on the event loop and will drain `pending_areas`.
    flush_scheduled: bool,
    host: H,
}

impl<H: SurfaceHost> Desktop<H> {
    pub fn new(config: Config, host: H) -> Self {
        let count = config.desktop.workspace_count.max(1);
        let mut workspaces: Vec<Workspace> = (0..count)
            .map(|id| Workspace::new(id, config.layout.default_layout, config.layout.tiling()))
            .collect();
        let active = config.desktop.default_workspace.min(count - 1);
        workspaces[active].activate();
        Self {
            config,
            views: ViewMap::default(),
            outputs: OutputMap::default(),
            workspaces,
            active,
            pending_areas: IndexSet::new(),
            flush_scheduled: false,
            host,
        }
    }

    pub fn config(&self) -> &Config { &self.config }

    pub fn host(&self) -> &H { &self.host }

    pub fn host_mut(&mut self) -> &mut H { &mut self.host }

    pub fn views(&self) -> &ViewMap { &self.views }

    pub fn view(&self, view: ViewId) -> Option<&View> { self.views.get(view) }

    pub fn outputs(&self) -> &OutputMap { &self.outputs }

    pub fn workspace(&self, index: usize) -> Option<&Workspace> { self.workspaces.get(index) }

    pub fn workspaces(&self) -> &[Workspace] { &self.workspaces }

    pub fn active_workspace(&self) -> usize { self.active }

    pub fn view_by_surface(&self, surface: SurfaceId) -> Option<ViewId> {
        self.views.iter().find(|(_, v)| v.surface == surface).map(|(id, _)| id)
    }

    /// Window-manager area of an output: its geometry minus the panel strip.
    pub fn available_space(&self, output: OutputId) -> Option<Rect> {
        self.outputs
            .get(output)
            .map(|o| o.available_space(self.config.desktop.panel_position))
    }

    fn workspace_of(&self, view: ViewId) -> Result<usize, WorkspaceError> {
        let v = self.views.get(view).ok_or(WorkspaceError::UnknownView(view))?;
        v.placement()
            .map(|p| p.workspace)
            .ok_or(WorkspaceError::NotOnWorkspace(view, self.active))
    }

    fn with_workspace<R>(
        &mut self,
        index: usize,
        f: impl FnOnce(&mut Workspace, &mut Ctx<'_, H>) -> Result<R, WorkspaceError>,
    ) -> Result<R, WorkspaceError> {
        let ws = self
            .workspaces
            .get_mut(index)
            .ok_or(WorkspaceError::UnknownWorkspace(index))?;
        let mut cx = Ctx::new(&mut self.views, &self.outputs, &mut self.host);
        f(ws, &mut cx)
    }

    fn with_view_workspace<R>(
        &mut self,
        view: ViewId,
        f: impl FnOnce(&mut Workspace, &mut Ctx<'_, H>) -> Result<R, WorkspaceError>,
    ) -> Result<R, WorkspaceError> {
        let result = self
            .workspace_of(view)
            .and_then(|index| self.with_workspace(index, f));
        if let Err(err) = &result {
            warn!(?view, %err, "rejected view operation");
        }
        result
    }

    fn for_each_workspace(
        &mut self,
        mut f: impl FnMut(&mut Workspace, &mut Ctx<'_, H>) -> Result<(), WorkspaceError>,
    ) -> Result<(), WorkspaceError> {
        for ws in &mut self.workspaces {
            let mut cx = Ctx::new(&mut self.views, &self.outputs, &mut self.host);
            f(ws, &mut cx)?;
        }
        Ok(())
    }

    /// Registers a view for `surface`. Without an explicit output the view
    /// lands on the first one.
    #[instrument(skip(self))]
    pub fn create_view(
        &mut self,
        surface: SurfaceId,
        output: Option<OutputId>,
        external: bool,
    ) -> Result<ViewId, WorkspaceError> {
        if self.view_by_surface(surface).is_some() {
            return Err(WorkspaceError::SurfaceInUse(surface));
        }
        if let Some(output) = output
            && !self.outputs.contains_key(output)
        {
            return Err(WorkspaceError::UnknownOutput(output));
        }
        let output = output.or_else(|| self.outputs.keys().next());
        let mut view = View::new(surface, output);
        if external {
            view = view.external();
        }
        Ok(self.views.insert(view))
    }

    /// Puts a view on `workspace`, or on the active one.
    #[instrument(skip(self))]
    pub fn map_view(&mut self, view: ViewId, workspace: Option<usize>) -> Result<(), WorkspaceError> {
        let index = workspace.unwrap_or(self.active);
        self.with_workspace(index, |ws, cx| ws.add_view(cx, view))
    }

    /// Takes a view off its workspace but keeps it registered.
    #[instrument(skip(self))]
    pub fn unmap_view(&mut self, view: ViewId) -> Result<(), WorkspaceError> {
        self.with_view_workspace(view, |ws, cx| ws.remove_view(cx, view))
    }

    #[instrument(skip(self))]
    pub fn destroy_view(&mut self, view: ViewId) -> Result<View, WorkspaceError> {
        let placed = self
            .views
            .get(view)
            .ok_or(WorkspaceError::UnknownView(view))?
            .placement()
            .is_some();
        if placed {
            self.unmap_view(view)?;
        }
        self.views.remove(view).ok_or(WorkspaceError::UnknownView(view))
    }

    #[instrument(skip(self))]
    pub fn focus_view(&mut self, view: ViewId) -> Result<(), WorkspaceError> {
        self.with_view_workspace(view, |ws, cx| ws.focus_view(cx, view))
    }

    #[instrument(skip(self))]
    pub fn move_view(&mut self, view: ViewId, pos: Point) -> Result<(), WorkspaceError> {
        self.with_view_workspace(view, |ws, cx| ws.move_view(cx, view, pos))
    }

    #[instrument(skip(self))]
    pub fn resize_view(&mut self, view: ViewId, dx: i32, dy: i32) -> Result<(), WorkspaceError> {
        self.with_view_workspace(view, |ws, cx| ws.resize_view(cx, view, dx, dy))
    }

    #[instrument(skip(self))]
    pub fn run_command(&mut self, view: ViewId, command: LayoutCommand) -> Result<(), WorkspaceError> {
        self.with_view_workspace(view, |ws, cx| ws.run_command(cx, view, command))
    }

    #[instrument(skip(self))]
    pub fn fullscreen_view(&mut self, view: ViewId, fullscreen: bool) -> Result<(), WorkspaceError> {
        self.with_view_workspace(view, |ws, cx| ws.fullscreen_view(cx, view, fullscreen))
    }

    /// Maximizes a view over the available space of its output, or restores it.
    #[instrument(skip(self))]
    pub fn maximize_view(&mut self, view: ViewId, maximized: bool) -> Result<(), WorkspaceError> {
        let target = if maximized {
            let v = self.views.get(view).ok_or(WorkspaceError::UnknownView(view))?;
            let area = v
                .output
                .and_then(|o| self.available_space(o))
                .ok_or(WorkspaceError::NoOutput(view))?;
            Some(area)
        } else {
            None
        };
        self.with_view_workspace(view, |ws, cx| ws.maximize_view(cx, view, target))
    }

    #[instrument(skip(self))]
    pub fn minimize_view(&mut self, view: ViewId) -> Result<(), WorkspaceError> {
        self.with_view_workspace(view, |ws, cx| ws.minimize_view(cx, view))
    }

    #[instrument(skip(self))]
    pub fn restore_view(&mut self, view: ViewId) -> Result<(), WorkspaceError> {
        self.with_view_workspace(view, |ws, cx| ws.restore_view(cx, view))
    }

    #[instrument(skip(self))]
    pub fn switch_layout(&mut self, view: ViewId) -> Result<(), WorkspaceError> {
        self.with_view_workspace(view, |ws, cx| ws.switch_layout(cx, view))
    }

    /// Shows workspace `to` and returns the view that should get focus.
    #[instrument(skip(self))]
    pub fn switch_workspace(&mut self, to: usize) -> Result<Option<ViewId>, WorkspaceError> {
        if to >= self.workspaces.len() {
            return Err(WorkspaceError::UnknownWorkspace(to));
        }
        if to == self.active {
            return Ok(self.workspaces[to].activate());
        }
        let (to_ws, from_ws) = pair_mut(&mut self.workspaces, to, self.active);
        let top = Workspace::switch(to_ws, from_ws);
        self.active = to;
        Ok(top)
    }

    #[instrument(skip(self))]
    pub fn move_view_to_workspace(&mut self, view: ViewId, to: usize) -> Result<(), WorkspaceError> {
        if to >= self.workspaces.len() {
            return Err(WorkspaceError::UnknownWorkspace(to));
        }
        let from = self.workspace_of(view)?;
        if from == to {
            return Ok(());
        }
        self.with_workspace(from, |ws, cx| ws.remove_view(cx, view))?;
        self.with_workspace(to, |ws, cx| ws.add_view(cx, view))
    }

    pub fn is_workspace_empty(&self, index: usize) -> Result<bool, WorkspaceError> {
        self.workspaces
            .get(index)
            .map(Workspace::is_empty)
            .ok_or(WorkspaceError::UnknownWorkspace(index))
    }

    pub fn top_view(&self) -> Option<ViewId> { self.workspaces[self.active].top_view() }

    /// Layer a view sits in on its workspace, if it is placed.
    pub fn layer_of(&self, view: ViewId) -> Option<(usize, LayerKind)> {
        self.views
            .get(view)
            .and_then(View::placement)
            .map(|p| (p.workspace, p.layer))
    }

    #[instrument(skip(self))]
    pub fn add_output(&mut self, name: &str, geometry: Rect) -> Result<OutputId, WorkspaceError> {
        let id = self.outputs.insert(Output::new(name, geometry));
        let area = self.available_space(id).unwrap_or(geometry);
        self.for_each_workspace(|ws, cx| ws.add_output(cx, id, area))?;
        Ok(id)
    }

    #[instrument(skip(self))]
    pub fn resize_output(&mut self, output: OutputId, geometry: Rect) -> Result<(), WorkspaceError> {
        let o = self
            .outputs
            .get_mut(output)
            .ok_or(WorkspaceError::UnknownOutput(output))?;
        o.geometry = geometry;
        self.pending_areas.shift_remove(&output);
        self.retile_output(output)
    }

    /// Removes an output and hands its views to the first remaining one.
    #[instrument(skip(self))]
    pub fn remove_output(&mut self, output: OutputId) -> Result<(), WorkspaceError> {
        self.outputs
            .remove(output)
            .ok_or(WorkspaceError::UnknownOutput(output))?;
        self.pending_areas.shift_remove(&output);
        let fallback = self.outputs.keys().next();
        for view in self.views.values_mut() {
            if view.output == Some(output) {
                view.output = fallback;
            }
        }
        self.for_each_workspace(|ws, cx| ws.remove_output(cx, output))
    }

    fn retile_output(&mut self, output: OutputId) -> Result<(), WorkspaceError> {
        let area = self
            .available_space(output)
            .ok_or(WorkspaceError::UnknownOutput(output))?;
        self.for_each_workspace(|ws, cx| ws.resize_output(cx, output, area))
    }

    /// Records the panel height of an output. The retile is deferred to
    /// [`Desktop::flush_pending_areas`]; returns true when the caller has to
    /// schedule that flush.
    #[instrument(skip(self))]
    pub fn set_panel_height(&mut self, output: OutputId, height: i32) -> Result<bool, WorkspaceError> {
        let o = self
            .outputs
            .get_mut(output)
            .ok_or(WorkspaceError::UnknownOutput(output))?;
        if o.panel_height == height {
            return Ok(false);
        }
        o.panel_height = height;
        Ok(self.queue_area(output))
    }

    /// Moves the panel to another edge of every output. Returns true when a
    /// flush has to be scheduled.
    #[instrument(skip(self))]
    pub fn set_panel_position(&mut self, position: PanelPosition) -> bool {
        if self.config.desktop.panel_position == position {
            return false;
        }
        self.config.desktop.panel_position = position;
        let outputs: Vec<OutputId> = self.outputs.keys().collect();
        outputs.into_iter().fold(false, |schedule, o| self.queue_area(o) || schedule)
    }

    fn queue_area(&mut self, output: OutputId) -> bool {
        self.pending_areas.insert(output);
        !std::mem::replace(&mut self.flush_scheduled, true)
    }

    /// The scheduled flush was dropped before it ran. The next queued change
    /// asks for a new one.
    pub fn area_flush_cancelled(&mut self) { self.flush_scheduled = false; }

    pub fn has_pending_areas(&self) -> bool { !self.pending_areas.is_empty() }

    /// Retiles every output whose usable area changed. Returns how many
    /// outputs were retiled.
    pub fn flush_pending_areas(&mut self) -> Result<usize, WorkspaceError> {
        self.flush_scheduled = false;
        let pending = std::mem::take(&mut self.pending_areas);
        debug!(outputs = pending.len(), "flushing available space changes");
        for &output in &pending {
            self.retile_output(output)?;
        }
        Ok(pending.len())
    }

    /// Releases every workspace, destroying the surfaces still on them, and
    /// hands the host back.
    pub fn shutdown(mut self) -> H {
        for ws in std::mem::take(&mut self.workspaces) {
            let mut cx = Ctx::new(&mut self.views, &self.outputs, &mut self.host);
            ws.release(&mut cx);
        }
        self.host
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::model::view::LayoutType;
    use crate::sys::geometry::Size;
    use crate::sys::headless::HeadlessHost;

    fn desktop() -> Desktop<HeadlessHost> {
        let mut config = Config::default();
        config.desktop.workspace_count = 3;
        Desktop::new(config, HeadlessHost::new())
    }

    fn spawn(desktop: &mut Desktop<HeadlessHost>) -> ViewId {
        let surface = desktop.host_mut().create_surface(Point::default(), Size::new(400, 300));
        let view = desktop.create_view(surface, None, false).unwrap();
        desktop.map_view(view, None).unwrap();
        view
    }

    #[test]
    fn test_new_desktop_activates_default_workspace() {
        let mut config = Config::default();
        config.desktop.workspace_count = 2;
        config.desktop.default_workspace = 1;
        let desktop = Desktop::new(config, HeadlessHost::new());
        assert_eq!(desktop.active_workspace(), 1);
        assert!(desktop.workspace(1).unwrap().is_active());
        assert!(!desktop.workspace(0).unwrap().is_active());
    }

    #[test]
    fn test_surface_backs_one_view() {
        let mut desktop = desktop();
        let surface = desktop.host_mut().create_surface(Point::default(), Size::new(1, 1));
        desktop.create_view(surface, None, false).unwrap();
        assert_eq!(
            desktop.create_view(surface, None, false),
            Err(WorkspaceError::SurfaceInUse(surface))
        );
    }

    #[test]
    fn test_create_view_rejects_unknown_output() {
        let mut desktop = desktop();
        let out = desktop.add_output("gone", Rect::new(0, 0, 10, 10)).unwrap();
        desktop.remove_output(out).unwrap();
        assert_eq!(
            desktop.create_view(SurfaceId(7), Some(out), false),
            Err(WorkspaceError::UnknownOutput(out))
        );
    }

    #[test]
    fn test_panel_height_is_deferred() {
        let mut desktop = desktop();
        let out = desktop.add_output("DP-1", Rect::new(0, 0, 1920, 1080)).unwrap();
        let view = spawn(&mut desktop);
        assert_eq!(desktop.view(view).unwrap().geometry(), Rect::new(0, 0, 1920, 1080));

        assert!(desktop.set_panel_height(out, 32).unwrap());
        assert!(!desktop.set_panel_height(out, 30).unwrap());
        assert!(!desktop.set_panel_height(out, 30).unwrap());
        assert_eq!(desktop.view(view).unwrap().geometry(), Rect::new(0, 0, 1920, 1080));

        assert_eq!(desktop.flush_pending_areas().unwrap(), 1);
        assert!(!desktop.has_pending_areas());
        assert_eq!(desktop.view(view).unwrap().geometry(), Rect::new(0, 30, 1920, 1050));
    }

    #[test]
    fn test_panel_position_requeues_outputs() {
        let mut desktop = desktop();
        let out = desktop.add_output("DP-1", Rect::new(0, 0, 1920, 1080)).unwrap();
        desktop.set_panel_height(out, 40).unwrap();
        desktop.flush_pending_areas().unwrap();
        let view = spawn(&mut desktop);

        assert!(desktop.set_panel_position(PanelPosition::Bottom));
        assert!(!desktop.set_panel_position(PanelPosition::Bottom));
        desktop.flush_pending_areas().unwrap();
        assert_eq!(desktop.view(view).unwrap().geometry(), Rect::new(0, 0, 1920, 1040));
    }

    #[test]
    fn test_maximize_uses_available_space() {
        let mut desktop = desktop();
        let out = desktop.add_output("DP-1", Rect::new(0, 0, 1920, 1080)).unwrap();
        desktop.set_panel_height(out, 24).unwrap();
        desktop.flush_pending_areas().unwrap();
        let view = spawn(&mut desktop);
        desktop.switch_layout(view).unwrap();
        desktop.move_view(view, Point::new(100, 100)).unwrap();
        desktop.resize_view(view, -1520, -756).unwrap();
        assert_eq!(desktop.view(view).unwrap().geometry(), Rect::new(100, 100, 400, 300));

        desktop.maximize_view(view, true).unwrap();
        assert_eq!(desktop.view(view).unwrap().geometry(), Rect::new(0, 24, 1920, 1056));
        assert_eq!(
            desktop.move_view(view, Point::default()),
            Err(WorkspaceError::Maximized(view))
        );
        desktop.maximize_view(view, false).unwrap();
        assert_eq!(desktop.view(view).unwrap().geometry(), Rect::new(100, 100, 400, 300));
    }

    #[test]
    fn test_switch_workspace_returns_top_view() {
        let mut desktop = desktop();
        desktop.add_output("DP-1", Rect::new(0, 0, 1920, 1080)).unwrap();
        let a = spawn(&mut desktop);

        assert_eq!(desktop.switch_workspace(1).unwrap(), None);
        assert!(!desktop.workspace(0).unwrap().is_active());
        let b = spawn(&mut desktop);
        assert_eq!(desktop.layer_of(b), Some((1, LayerKind::Tiling)));

        assert_eq!(desktop.switch_workspace(0).unwrap(), Some(a));
        assert_eq!(desktop.switch_workspace(0).unwrap(), Some(a));
        assert_eq!(desktop.switch_workspace(5), Err(WorkspaceError::UnknownWorkspace(5)));
    }

    #[test]
    fn test_move_view_to_workspace() {
        let mut desktop = desktop();
        desktop.add_output("DP-1", Rect::new(0, 0, 1920, 1080)).unwrap();
        let a = spawn(&mut desktop);
        let b = spawn(&mut desktop);

        desktop.move_view_to_workspace(b, 2).unwrap();
        assert_eq!(desktop.layer_of(b), Some((2, LayerKind::Tiling)));
        assert_eq!(desktop.view(a).unwrap().geometry(), Rect::new(0, 0, 1920, 1080));
        assert!(!desktop.workspace(2).unwrap().is_active());
        assert_eq!(desktop.workspace(2).unwrap().top_view(), Some(b));
        assert!(!desktop.is_workspace_empty(2).unwrap());
    }

    #[test]
    fn test_rejected_operation_reports_error() {
        let mut desktop = desktop();
        let surface = desktop.host_mut().create_surface(Point::default(), Size::new(1, 1));
        let view = desktop.create_view(surface, None, false).unwrap();
        assert_eq!(
            desktop.focus_view(view),
            Err(WorkspaceError::NotOnWorkspace(view, 0))
        );
    }

    #[test]
    fn test_remove_output_moves_views() {
        let mut desktop = desktop();
        let left = desktop.add_output("DP-1", Rect::new(0, 0, 1920, 1080)).unwrap();
        let right = desktop.add_output("DP-2", Rect::new(1920, 0, 1920, 1080)).unwrap();
        let surface = desktop.host_mut().create_surface(Point::default(), Size::new(10, 10));
        let view = desktop.create_view(surface, Some(right), false).unwrap();
        desktop.map_view(view, None).unwrap();
        assert_eq!(desktop.view(view).unwrap().geometry(), Rect::new(1920, 0, 1920, 1080));

        desktop.remove_output(right).unwrap();
        assert_eq!(desktop.view(view).unwrap().output, Some(left));
        assert_eq!(desktop.view(view).unwrap().geometry(), Rect::new(0, 0, 1920, 1080));
    }

    #[test]
    fn test_destroy_view_retiles_neighbours() {
        let mut desktop = desktop();
        desktop.add_output("DP-1", Rect::new(0, 0, 1920, 1080)).unwrap();
        let a = spawn(&mut desktop);
        let b = spawn(&mut desktop);
        let removed = desktop.destroy_view(b).unwrap();
        assert_eq!(removed.placement(), None);
        assert!(desktop.view(b).is_none());
        assert_eq!(desktop.view(a).unwrap().geometry(), Rect::new(0, 0, 1920, 1080));
    }

    #[test]
    fn test_default_layout_from_config() {
        let mut config = Config::default();
        config.layout.default_layout = LayoutType::Floating;
        let mut desktop = Desktop::new(config, HeadlessHost::new());
        desktop.add_output("DP-1", Rect::new(0, 0, 800, 600)).unwrap();
        let view = spawn(&mut desktop);
        assert_eq!(desktop.layer_of(view), Some((0, LayerKind::Floating)));
    }

    #[test]
    fn test_resize_survives_unvalidated_min_ratio() {
        let config = Config::parse("[layout]\nmin_ratio = 0.6\n").unwrap();
        assert!(!config.validate().is_empty());
        let mut desktop = Desktop::new(config, HeadlessHost::new());
        desktop.add_output("DP-1", Rect::new(0, 0, 1920, 1080)).unwrap();
        let a = spawn(&mut desktop);
        let b = spawn(&mut desktop);

        desktop.resize_view(a, 10, 0).unwrap();
        assert_eq!(desktop.view(a).unwrap().geometry(), Rect::new(0, 0, 960, 1080));
        assert_eq!(desktop.view(b).unwrap().geometry(), Rect::new(960, 0, 960, 1080));
    }

    #[test]
    fn test_cancelled_flush_can_be_requested_again() {
        let mut desktop = desktop();
        let out = desktop.add_output("DP-1", Rect::new(0, 0, 1920, 1080)).unwrap();
        assert!(desktop.set_panel_height(out, 30).unwrap());
        desktop.area_flush_cancelled();
        assert!(desktop.has_pending_areas());
        assert!(desktop.set_panel_height(out, 32).unwrap());
        assert!(!desktop.set_panel_position(PanelPosition::Bottom));
    }

    #[test]
    fn test_shutdown_destroys_surfaces() {
        let mut desktop = desktop();
        desktop.add_output("DP-1", Rect::new(0, 0, 1920, 1080)).unwrap();
        let view = spawn(&mut desktop);
        let surface = desktop.view(view).unwrap().surface;
        let host = desktop.shutdown();
        assert!(host.surface(surface).unwrap().destroyed);
    }
}
