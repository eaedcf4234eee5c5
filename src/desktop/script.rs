//! Scripted sessions against a [`HeadlessHost`].
//!
//! A script names its outputs and views; commands refer to them by name. Each
//! command stands for one event loop iteration, so queued available-space
//! changes are flushed after it the way the idle callback would.

use std::fmt;
use std::path::Path;

use anyhow::{Context, bail};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::Desktop;
use crate::common::config::Config;
use crate::layout_engine::{LayoutCommand, WorkspaceError};
use crate::model::layer::LayerKind;
use crate::model::output::{OutputId, PanelPosition};
use crate::model::view::ViewId;
use crate::sys::geometry::{Point, Rect, Size};
use crate::sys::headless::HeadlessHost;
use crate::sys::surface::SurfaceHost;

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ScriptOutput {
    pub name: String,
    pub geometry: Rect,
    #[serde(default)]
    pub panel_height: i32,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub enum ScriptCommand {
    Open {
        view: String,
        size: Size,
        #[serde(default)]
        inset: Point,
        #[serde(default)]
        output: Option<String>,
        #[serde(default)]
        workspace: Option<usize>,
        #[serde(default)]
        external: bool,
    },
    Close(String),
    Focus(String),
    Move { view: String, to: Point },
    Resize { view: String, dx: i32, dy: i32 },
    Fullscreen { view: String, on: bool },
    Maximize { view: String, on: bool },
    Minimize(String),
    Restore(String),
    SwitchLayout(String),
    Promote(String),
    Rotate(String),
    SwitchWorkspace(usize),
    SendToWorkspace { view: String, workspace: usize },
    PanelHeight { output: String, height: i32 },
    PanelPosition(PanelPosition),
    ResizeOutput { output: String, geometry: Rect },
    RemoveOutput(String),
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
pub struct Script {
    pub outputs: Vec<ScriptOutput>,
    #[serde(default)]
    pub commands: Vec<ScriptCommand>,
}

impl Script {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let buf = std::fs::read_to_string(path)
            .with_context(|| format!("reading script {}", path.display()))?;
        Self::parse(&buf)
    }

    pub fn parse(buf: &str) -> anyhow::Result<Self> {
        let script: Script = ron::from_str(buf)?;
        if script.outputs.is_empty() {
            bail!("script declares no outputs");
        }
        Ok(script)
    }

    pub fn run(&self, config: Config) -> anyhow::Result<Session> {
        let mut session = Session {
            desktop: Desktop::new(config, HeadlessHost::new()),
            outputs: IndexMap::new(),
            views: IndexMap::new(),
        };
        for output in &self.outputs {
            session.add_output(output)?;
        }
        for (index, command) in self.commands.iter().enumerate() {
            session
                .apply(command)
                .with_context(|| format!("command {index} ({command:?}) failed"))?;
        }
        info!(
            views = session.views.len(),
            commands = self.commands.len(),
            "script replayed"
        );
        Ok(session)
    }
}

/// Where a named view ended up.
#[derive(Debug, Clone, PartialEq)]
pub struct Report {
    pub view: String,
    pub workspace: Option<usize>,
    pub layer: Option<LayerKind>,
    pub geometry: Rect,
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Rect { origin, size } = self.geometry;
        match (self.workspace, self.layer) {
            (Some(ws), Some(layer)) => {
                let layer: &'static str = layer.into();
                write!(f, "{} workspace={ws} layer={layer}", self.view)?
            }
            _ => write!(f, "{} unmapped", self.view)?,
        }
        write!(f, " {}x{}+{}+{}", size.width, size.height, origin.x, origin.y)
    }
}

pub struct Session {
    desktop: Desktop<HeadlessHost>,
    outputs: IndexMap<String, OutputId>,
    views: IndexMap<String, ViewId>,
}

impl Session {
    pub fn desktop(&self) -> &Desktop<HeadlessHost> { &self.desktop }

    pub fn view(&self, name: &str) -> Option<ViewId> { self.views.get(name).copied() }

    pub fn reports(&self) -> Vec<Report> {
        self.views
            .iter()
            .filter_map(|(name, &id)| {
                let view = self.desktop.view(id)?;
                let placement = view.placement();
                Some(Report {
                    view: name.clone(),
                    workspace: placement.map(|p| p.workspace),
                    layer: placement.map(|p| p.layer),
                    geometry: view.geometry(),
                })
            })
            .collect()
    }

    pub fn into_host(self) -> HeadlessHost { self.desktop.shutdown() }

    fn add_output(&mut self, output: &ScriptOutput) -> anyhow::Result<()> {
        if self.outputs.contains_key(&output.name) {
            bail!("output {} declared twice", output.name);
        }
        let id = self.desktop.add_output(&output.name, output.geometry)?;
        if output.panel_height != 0 {
            self.desktop.set_panel_height(id, output.panel_height)?;
        }
        self.outputs.insert(output.name.clone(), id);
        self.settle()
    }

    fn output(&self, name: &str) -> anyhow::Result<OutputId> {
        match self.outputs.get(name) {
            Some(&id) => Ok(id),
            None => bail!("unknown output {name}"),
        }
    }

    fn lookup(&self, name: &str) -> anyhow::Result<ViewId> {
        match self.views.get(name) {
            Some(&id) => Ok(id),
            None => bail!("unknown view {name}"),
        }
    }

    fn settle(&mut self) -> anyhow::Result<()> {
        if self.desktop.has_pending_areas() {
            self.desktop.flush_pending_areas()?;
        }
        Ok(())
    }

    fn on_view(
        &mut self,
        name: &str,
        f: impl FnOnce(&mut Desktop<HeadlessHost>, ViewId) -> Result<(), WorkspaceError>,
    ) -> anyhow::Result<()> {
        let id = self.lookup(name)?;
        f(&mut self.desktop, id)?;
        Ok(())
    }

    fn apply(&mut self, command: &ScriptCommand) -> anyhow::Result<()> {
        debug!(?command, "replaying");
        match command {
            ScriptCommand::Open {
                view,
                size,
                inset,
                output,
                workspace,
                external,
            } => {
                if self.views.contains_key(view) {
                    bail!("view {view} is already open");
                }
                let output = output.as_deref().map(|o| self.output(o)).transpose()?;
                let surface = self.desktop.host_mut().create_surface(*inset, *size);
                let id = self.desktop.create_view(surface, output, *external)?;
                self.desktop.map_view(id, *workspace)?;
                self.views.insert(view.clone(), id);
            }
            ScriptCommand::Close(view) => {
                let id = self.lookup(view)?;
                let closed = self.desktop.destroy_view(id)?;
                self.desktop.host_mut().destroy_surface(closed.surface);
                self.views.shift_remove(view);
            }
            ScriptCommand::Focus(view) => self.on_view(view, |d, v| d.focus_view(v))?,
            ScriptCommand::Move { view, to } => self.on_view(view, |d, v| d.move_view(v, *to))?,
            ScriptCommand::Resize { view, dx, dy } => {
                self.on_view(view, |d, v| d.resize_view(v, *dx, *dy))?
            }
            ScriptCommand::Fullscreen { view, on } => {
                self.on_view(view, |d, v| d.fullscreen_view(v, *on))?
            }
            ScriptCommand::Maximize { view, on } => {
                self.on_view(view, |d, v| d.maximize_view(v, *on))?
            }
            ScriptCommand::Minimize(view) => self.on_view(view, |d, v| d.minimize_view(v))?,
            ScriptCommand::Restore(view) => self.on_view(view, |d, v| d.restore_view(v))?,
            ScriptCommand::SwitchLayout(view) => self.on_view(view, |d, v| d.switch_layout(v))?,
            ScriptCommand::Promote(view) => {
                self.on_view(view, |d, v| d.run_command(v, LayoutCommand::Promote))?
            }
            ScriptCommand::Rotate(view) => {
                self.on_view(view, |d, v| d.run_command(v, LayoutCommand::Rotate))?
            }
            ScriptCommand::SwitchWorkspace(to) => {
                if let Some(top) = self.desktop.switch_workspace(*to)? {
                    self.desktop.focus_view(top)?;
                }
            }
            ScriptCommand::SendToWorkspace { view, workspace } => {
                self.on_view(view, |d, v| d.move_view_to_workspace(v, *workspace))?
            }
            ScriptCommand::PanelHeight { output, height } => {
                let id = self.output(output)?;
                self.desktop.set_panel_height(id, *height)?;
            }
            ScriptCommand::PanelPosition(position) => {
                self.desktop.set_panel_position(*position);
            }
            ScriptCommand::ResizeOutput { output, geometry } => {
                let id = self.output(output)?;
                self.desktop.resize_output(id, *geometry)?;
            }
            ScriptCommand::RemoveOutput(output) => {
                let id = self.output(output)?;
                self.desktop.remove_output(id)?;
                self.outputs.shift_remove(output);
            }
        }
        self.settle()
    }
}
