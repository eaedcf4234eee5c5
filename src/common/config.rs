use std::path::{Path, PathBuf};

use anyhow::bail;
use serde::{Deserialize, Serialize};

use crate::layout_engine::{Dwindle, MasterStack, PartitionKind, TilingLayout};
use crate::model::output::PanelPosition;
use crate::model::view::LayoutType;

const MAX_WORKSPACES: usize = 32;

pub fn config_file() -> PathBuf {
    dirs::config_dir()
        .or_else(|| dirs::home_dir().map(|home| home.join(".config")))
        .unwrap_or_default()
        .join("deskshell")
        .join("config.toml")
}

#[derive(Serialize, Deserialize, Debug, PartialEq, Clone, Default)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default)]
    pub desktop: DesktopSettings,
    #[serde(default)]
    pub layout: LayoutSettings,
}

#[derive(Serialize, Deserialize, Debug, PartialEq, Clone)]
#[serde(deny_unknown_fields)]
pub struct DesktopSettings {
    #[serde(default = "default_workspace_count")]
    pub workspace_count: usize,
    #[serde(default)]
    pub default_workspace: usize,
    #[serde(default)]
    pub panel_position: PanelPosition,
}

impl Default for DesktopSettings {
    fn default() -> Self {
        Self {
            workspace_count: default_workspace_count(),
            default_workspace: 0,
            panel_position: PanelPosition::default(),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, PartialEq, Clone, Copy, Default)]
#[serde(rename_all = "snake_case")]
pub enum TilingScheme {
    #[default]
    Dwindle,
    MasterStack,
}

impl TilingScheme {
    pub fn partition(self) -> PartitionKind {
        match self {
            TilingScheme::Dwindle => Dwindle.into(),
            TilingScheme::MasterStack => MasterStack.into(),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, PartialEq, Clone)]
#[serde(deny_unknown_fields)]
pub struct LayoutSettings {
    /// Layout type given to views that enter a workspace without one.
    #[serde(default)]
    pub default_layout: LayoutType,
    #[serde(default)]
    pub tiling_scheme: TilingScheme,
    #[serde(default = "default_split_ratio")]
    pub split_ratio: f32,
    #[serde(default = "default_min_ratio")]
    pub min_ratio: f32,
}

impl Default for LayoutSettings {
    fn default() -> Self {
        Self {
            default_layout: LayoutType::default(),
            tiling_scheme: TilingScheme::default(),
            split_ratio: default_split_ratio(),
            min_ratio: default_min_ratio(),
        }
    }
}

impl LayoutSettings {
    /// A fresh tiling strategy configured from these settings.
    pub fn tiling(&self) -> TilingLayout {
        TilingLayout::new(self.tiling_scheme.partition(), self.split_ratio, self.min_ratio)
    }

    pub fn validate(&self) -> Vec<String> {
        let mut issues = Vec::new();

        let split_ok = (0.1..=0.9).contains(&self.split_ratio);
        if !split_ok {
            issues.push(format!(
                "layout.split_ratio must be between 0.1 and 0.9, got {}",
                self.split_ratio
            ));
        }

        if !(0.05..0.5).contains(&self.min_ratio) {
            issues.push(format!(
                "layout.min_ratio must be at least 0.05 and below 0.5, got {}",
                self.min_ratio
            ));
        } else if split_ok
            && (self.split_ratio < self.min_ratio || self.split_ratio > 1.0 - self.min_ratio)
        {
            issues.push(format!(
                "layout.split_ratio {} lies outside the resize range allowed by min_ratio {}",
                self.split_ratio, self.min_ratio
            ));
        }

        issues
    }
}

impl DesktopSettings {
    pub fn validate(&self) -> Vec<String> {
        let mut issues = Vec::new();

        if self.workspace_count == 0 {
            issues.push("desktop.workspace_count must be at least 1".to_string());
        } else if self.workspace_count > MAX_WORKSPACES {
            issues.push(format!(
                "desktop.workspace_count should not exceed {}, got {}",
                MAX_WORKSPACES, self.workspace_count
            ));
        }

        if self.default_workspace >= self.workspace_count.max(1) {
            issues.push(format!(
                "desktop.default_workspace ({}) must be less than workspace_count ({})",
                self.default_workspace, self.workspace_count
            ));
        }

        issues
    }
}

fn default_workspace_count() -> usize { 9 }

fn default_split_ratio() -> f32 { 0.5 }

fn default_min_ratio() -> f32 { 0.1 }

impl Config {
    pub fn read(path: &Path) -> anyhow::Result<Config> {
        let buf = std::fs::read_to_string(path)?;
        Self::parse(&buf)
    }

    pub fn parse(buf: &str) -> anyhow::Result<Config> {
        match toml::from_str::<Config>(buf) {
            Ok(config) => Ok(config),
            Err(e) => bail!("{e}"),
        }
    }

    pub fn save(&self, path: &Path) -> anyhow::Result<()> {
        let toml_string = toml::to_string_pretty(self)?;
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, toml_string.as_bytes())?;
        Ok(())
    }

    /// Validates the entire configuration and returns a list of issues found.
    pub fn validate(&self) -> Vec<String> {
        let mut issues = Vec::new();
        issues.extend(self.desktop.validate());
        issues.extend(self.layout.validate());
        issues
    }
}
